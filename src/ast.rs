//! Arena-allocated abstract syntax tree.
//!
//! The parser allocates every node into a `NodeArena` and hands the root to
//! the evaluator; children are plain references into the same arena, so the
//! tree is immutable and free of reference counting.

use bumpalo::Bump;

use crate::intern::Symbol;
use crate::token::TypeTag;

/// Binary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Xor,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Plus,
    Negate,
    Not,
}

/// Which output primitive an `IoOut` node drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutKind {
    Cout,
    Putchar,
}

/// Function parameter: declared name plus type keyword.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeTag,
}

/// One `if` or `else if` arm.
#[derive(Debug, Clone, Copy)]
pub struct IfArm<'a> {
    pub cond: &'a Node<'a>,
    pub body: &'a Node<'a>,
}

#[derive(Debug)]
pub enum Node<'a> {
    /// Integer literal, already parsed from its decimal lexeme.
    Num(i32),
    /// Raw body of a character literal, or the identifier `endl`. Only
    /// `cout` gives these a meaning.
    Char(Symbol),
    /// Variable reference.
    Var(Symbol),
    VarDecl {
        name: Symbol,
        ty: TypeTag,
        init: &'a Node<'a>,
    },
    ArrDecl {
        name: Symbol,
        ty: TypeTag,
        dims: &'a [&'a Node<'a>],
    },
    ArrAccess {
        name: Symbol,
        indices: &'a [&'a Node<'a>],
    },
    /// `target` must evaluate to storage: a `Var`, an `ArrAccess`, or
    /// another `Assign`.
    Assign {
        target: &'a Node<'a>,
        value: &'a Node<'a>,
    },
    Bin {
        op: BinOpKind,
        lhs: &'a Node<'a>,
        rhs: &'a Node<'a>,
    },
    Unary {
        op: UnaryOpKind,
        operand: &'a Node<'a>,
    },
    FnDecl {
        ret: TypeTag,
        name: Symbol,
        params: &'a [Param],
        body: &'a Node<'a>,
    },
    FnCall {
        name: Symbol,
        args: &'a [&'a Node<'a>],
    },
    Ret(&'a Node<'a>),
    /// Statement sequence without a frame of its own.
    Block(&'a [&'a Node<'a>]),
    /// Block behind a lexical frame boundary.
    Scope(&'a Node<'a>),
    For {
        init: &'a [&'a Node<'a>],
        cond: Option<&'a Node<'a>>,
        update: &'a [&'a Node<'a>],
        body: &'a Node<'a>,
    },
    While {
        cond: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    If {
        arms: &'a [IfArm<'a>],
        else_body: Option<&'a Node<'a>>,
    },
    /// `cin >> target >> ...`; each target must be an lvalue form.
    IoIn { targets: &'a [&'a Node<'a>] },
    /// `cout << item << ...` or `putchar(expr)`.
    IoOut {
        kind: OutKind,
        items: &'a [&'a Node<'a>],
    },
}

/// Bump arena owning every node of one parse.
pub struct NodeArena {
    bump: Bump,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { bump: Bump::new() }
    }

    pub fn node<'a>(&'a self, node: Node<'a>) -> &'a Node<'a> {
        self.bump.alloc(node)
    }

    pub fn nodes<'a>(&'a self, nodes: Vec<&'a Node<'a>>) -> &'a [&'a Node<'a>] {
        self.bump.alloc_slice_fill_iter(nodes)
    }

    pub fn params(&self, params: Vec<Param>) -> &[Param] {
        self.bump.alloc_slice_fill_iter(params)
    }

    pub fn arms<'a>(&'a self, arms: Vec<IfArm<'a>>) -> &'a [IfArm<'a>] {
        self.bump.alloc_slice_fill_iter(arms)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
