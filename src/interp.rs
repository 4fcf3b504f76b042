//! Tree-walking evaluator.
//!
//! Statements run through `exec` and answer with a `Flow`; expressions run
//! through `eval` and answer with an integer. Lvalue contexts (assignment,
//! `cin`) go through `place`, which resolves storage up front instead of
//! handing references out of the call stack.

use std::io::{self, BufRead, Write};

use crate::ast::{BinOpKind, Node, OutKind, UnaryOpKind};
use crate::callstack::{CallStack, FrameLabel};
use crate::error::RuntimeError;
use crate::intern::{Interner, Symbol};
use crate::value::{Array, ArrayRef, Slot, Value};

pub type EvalResult<T> = Result<T, RuntimeError>;

/// Statement result: fall through, or unwind with a return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Return(i32),
}

/// Resolved storage location. Valid until the owning frame pops; the array
/// form stays valid for as long as the handle does.
#[derive(Debug, Clone)]
pub enum Place {
    Var(Symbol),
    Elem(ArrayRef, usize),
}

pub struct Interpreter<'a, R, W> {
    interner: &'a Interner,
    stack: CallStack<'a>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Interpreter<'a, R, W> {
    pub fn new(interner: &'a Interner, input: R, output: W) -> Self {
        Interpreter {
            interner,
            stack: CallStack::new(),
            input,
            output,
        }
    }

    /// Run a parsed program to completion.
    pub fn run(&mut self, root: &'a Node<'a>) -> EvalResult<()> {
        self.exec(root)?;
        self.output.flush()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn exec(&mut self, node: &'a Node<'a>) -> EvalResult<Flow> {
        match *node {
            Node::Block(children) => {
                for &child in children {
                    if let Flow::Return(value) = self.exec(child)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Node::Scope(block) => {
                let level = self.stack.top_level() + 1;
                self.stack.push_frame(FrameLabel::Scope, level);
                let flow = self.exec(block);
                self.stack.pop_frame();
                flow
            }
            Node::VarDecl { name, init, .. } => {
                let value = self.eval(init)?;
                self.stack.declare(name, Value::Int(value));
                Ok(Flow::Normal)
            }
            Node::ArrDecl { name, dims, .. } => {
                self.declare_array(name, dims)?;
                Ok(Flow::Normal)
            }
            Node::FnDecl { name, .. } => {
                self.stack.declare(name, Value::Fn(node));
                Ok(Flow::Normal)
            }
            Node::Ret(expr) => Ok(Flow::Return(self.eval(expr)?)),
            Node::For {
                init,
                cond,
                update,
                body,
            } => {
                let level = self.stack.top_level() + 1;
                self.stack.push_frame(FrameLabel::Loop, level);
                let flow = self.run_for(init, cond, update, body);
                self.stack.pop_frame();
                flow
            }
            Node::While { cond, body } => {
                let level = self.stack.top_level() + 1;
                self.stack.push_frame(FrameLabel::Loop, level);
                let flow = self.run_while(cond, body);
                self.stack.pop_frame();
                flow
            }
            Node::If { arms, else_body } => {
                let level = self.stack.top_level() + 1;
                for arm in arms {
                    if self.eval(arm.cond)? != 0 {
                        self.stack.push_frame(FrameLabel::Branch, level);
                        let flow = self.exec(arm.body);
                        self.stack.pop_frame();
                        return flow;
                    }
                }
                if let Some(body) = else_body {
                    self.stack.push_frame(FrameLabel::Branch, level);
                    let flow = self.exec(body);
                    self.stack.pop_frame();
                    return flow;
                }
                Ok(Flow::Normal)
            }
            Node::IoIn { targets } => {
                self.read_targets(targets)?;
                Ok(Flow::Normal)
            }
            _ => {
                self.eval(node)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn run_for(
        &mut self,
        init: &'a [&'a Node<'a>],
        cond: Option<&'a Node<'a>>,
        update: &'a [&'a Node<'a>],
        body: &'a Node<'a>,
    ) -> EvalResult<Flow> {
        for &stmt in init {
            self.exec(stmt)?;
        }
        loop {
            if let Some(cond) = cond {
                if self.eval(cond)? == 0 {
                    break;
                }
            }
            if let Flow::Return(value) = self.exec(body)? {
                return Ok(Flow::Return(value));
            }
            for &stmt in update {
                self.exec(stmt)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn run_while(&mut self, cond: &'a Node<'a>, body: &'a Node<'a>) -> EvalResult<Flow> {
        while self.eval(cond)? != 0 {
            if let Flow::Return(value) = self.exec(body)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn eval(&mut self, node: &'a Node<'a>) -> EvalResult<i32> {
        match *node {
            Node::Num(value) => Ok(value),
            // Char payloads only mean something to `cout`; elsewhere they
            // read as zero.
            Node::Char(_) => Ok(0),
            Node::Var(name) => self.int_value(name),
            Node::Bin { op, lhs, rhs } => {
                // Both sides always evaluate; && and || do not short-circuit.
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                apply_binary(op, lhs, rhs)
            }
            Node::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOpKind::Plus => value,
                    UnaryOpKind::Negate => value.wrapping_neg(),
                    UnaryOpKind::Not => i32::from(value == 0),
                })
            }
            Node::Assign { target, value } => Ok(self.assign(target, value)?.1),
            Node::FnCall { name, args } => self.call(name, args),
            Node::ArrAccess { .. } => {
                let place = self.place(node)?;
                self.read_place(&place)
            }
            Node::IoOut { kind, items } => self.write_out(kind, items),
            _ => Ok(match self.exec(node)? {
                Flow::Return(value) => value,
                Flow::Normal => 0,
            }),
        }
    }

    /// Evaluate the right-hand side, resolve the target, store. The stored
    /// integer and the target's place both come back so assignment works as
    /// an expression and as a `cin` target.
    fn assign(&mut self, target: &'a Node<'a>, value: &'a Node<'a>) -> EvalResult<(Place, i32)> {
        let value = self.eval(value)?;
        let place = self.place(target)?;
        self.write_place(&place, value)?;
        Ok((place, value))
    }

    fn call(&mut self, name: Symbol, args: &'a [&'a Node<'a>]) -> EvalResult<i32> {
        let decl = match self.stack.lookup(name) {
            Some(Value::Fn(decl)) => *decl,
            Some(_) => return Err(self.invalid_type(name)),
            None => return Err(self.undefined(name)),
        };
        let Node::FnDecl { params, body, .. } = *decl else {
            return Err(self.invalid_type(name));
        };

        // Arguments evaluate in the caller's frames, left to right. Extra
        // arguments are dropped; unbound parameters fail on first use.
        let mut values = Vec::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval(arg)?);
        }

        let level = self.stack.top_level() + 1;
        self.stack.push_frame(FrameLabel::Call(name), level);
        for (param, value) in params.iter().zip(values) {
            self.stack.declare(param.name, Value::Int(value));
        }
        let flow = self.exec(body);
        self.stack.pop_frame();

        Ok(match flow? {
            Flow::Return(value) => value,
            Flow::Normal => 0,
        })
    }

    fn declare_array(&mut self, name: Symbol, dims: &'a [&'a Node<'a>]) -> EvalResult<()> {
        let Some((&last, outer)) = dims.split_last() else {
            return Ok(());
        };
        let len = self.array_len(name, last)?;
        let mut array = Array::of_ints(len);
        for &dim in outer.iter().rev() {
            let len = self.array_len(name, dim)?;
            array = Array::of_arrays(len, &array);
        }
        self.stack.declare(name, Value::Array(array));
        Ok(())
    }

    fn array_len(&mut self, name: Symbol, dim: &'a Node<'a>) -> EvalResult<usize> {
        let len = self.eval(dim)?;
        usize::try_from(len).map_err(|_| RuntimeError::TypeMismatch {
            context: format!(
                "negative length for array '{}'",
                self.interner.resolve(name)
            ),
        })
    }

    // ------------------------------------------------------------------
    // Places
    // ------------------------------------------------------------------

    fn place(&mut self, node: &'a Node<'a>) -> EvalResult<Place> {
        match *node {
            Node::Var(name) => match self.stack.lookup(name) {
                Some(Value::Int(_)) => Ok(Place::Var(name)),
                Some(_) => Err(self.invalid_type(name)),
                None => Err(self.undefined(name)),
            },
            Node::ArrAccess { name, indices } => self.element_place(name, indices),
            Node::Assign { target, value } => Ok(self.assign(target, value)?.0),
            _ => Err(RuntimeError::TypeMismatch {
                context: "expression does not name a storage location".to_string(),
            }),
        }
    }

    /// Walk the index list down the array levels. The walk stops at the
    /// first integer cell it reaches; running out of indices while still on
    /// an array level is an error.
    fn element_place(&mut self, name: Symbol, indices: &'a [&'a Node<'a>]) -> EvalResult<Place> {
        let mut array = match self.stack.lookup(name) {
            Some(Value::Array(handle)) => handle.clone(),
            Some(_) => return Err(self.invalid_type(name)),
            None => return Err(self.undefined(name)),
        };
        for &index in indices {
            let raw = self.eval(index)?;
            let found = usize::try_from(raw)
                .ok()
                .and_then(|idx| array.borrow().slot(idx).cloned().map(|slot| (idx, slot)));
            let Some((idx, slot)) = found else {
                return Err(self.bad_index(name, raw));
            };
            match slot {
                Slot::Int(_) => return Ok(Place::Elem(array, idx)),
                Slot::Nested(inner) => array = inner,
            }
        }
        Err(RuntimeError::TypeMismatch {
            context: format!(
                "array '{}' indexed with too few dimensions",
                self.interner.resolve(name)
            ),
        })
    }

    fn read_place(&self, place: &Place) -> EvalResult<i32> {
        match place {
            Place::Var(name) => self.int_value(*name),
            Place::Elem(array, index) => match array.borrow().slot(*index) {
                Some(Slot::Int(value)) => Ok(*value),
                _ => Err(RuntimeError::TypeMismatch {
                    context: "array element is not an integer".to_string(),
                }),
            },
        }
    }

    fn write_place(&mut self, place: &Place, value: i32) -> EvalResult<()> {
        match place {
            Place::Var(name) => match self.stack.lookup_mut(*name) {
                Some(Value::Int(slot)) => {
                    *slot = value;
                    Ok(())
                }
                Some(_) => Err(self.invalid_type(*name)),
                None => Err(self.undefined(*name)),
            },
            Place::Elem(array, index) => {
                array.borrow_mut().set_int(*index, value);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // I/O
    // ------------------------------------------------------------------

    fn write_out(&mut self, kind: OutKind, items: &'a [&'a Node<'a>]) -> EvalResult<i32> {
        match kind {
            OutKind::Putchar => {
                let mut sum = 0i32;
                for &item in items {
                    sum = sum.wrapping_add(self.eval(item)?);
                }
                self.output.write_all(&[sum as u8])?;
                Ok(sum)
            }
            OutKind::Cout => {
                for &item in items {
                    match *item {
                        Node::Char(text) => {
                            let text = self.interner.resolve(text);
                            if text == "endl" {
                                self.output.write_all(b"\n")?;
                                self.output.flush()?;
                            } else if text == "\\n" {
                                self.output.write_all(b"\n")?;
                            } else {
                                self.output.write_all(text.as_bytes())?;
                            }
                        }
                        _ => {
                            let value = self.eval(item)?;
                            write!(self.output, "{value}")?;
                        }
                    }
                }
                Ok(0)
            }
        }
    }

    fn read_targets(&mut self, targets: &'a [&'a Node<'a>]) -> EvalResult<()> {
        for &target in targets {
            let place = self.place(target)?;
            // EOF or an unparseable token leaves the target unchanged.
            if let Some(value) = read_int(&mut self.input)? {
                self.write_place(&place, value)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn int_value(&self, name: Symbol) -> EvalResult<i32> {
        match self.stack.lookup(name) {
            Some(Value::Int(value)) => Ok(*value),
            Some(_) => Err(self.invalid_type(name)),
            None => Err(self.undefined(name)),
        }
    }

    fn undefined(&self, name: Symbol) -> RuntimeError {
        RuntimeError::UndefinedVariable {
            name: self.interner.resolve(name).to_string(),
        }
    }

    fn invalid_type(&self, name: Symbol) -> RuntimeError {
        RuntimeError::InvalidDataType {
            name: self.interner.resolve(name).to_string(),
        }
    }

    fn bad_index(&self, name: Symbol, index: i32) -> RuntimeError {
        RuntimeError::TypeMismatch {
            context: format!(
                "index {index} out of bounds for array '{}'",
                self.interner.resolve(name)
            ),
        }
    }
}

fn apply_binary(op: BinOpKind, lhs: i32, rhs: i32) -> EvalResult<i32> {
    Ok(match op {
        BinOpKind::Add => lhs.wrapping_add(rhs),
        BinOpKind::Subtract => lhs.wrapping_sub(rhs),
        BinOpKind::Multiply => lhs.wrapping_mul(rhs),
        BinOpKind::Divide => {
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            lhs.wrapping_div(rhs)
        }
        BinOpKind::Modulo => {
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            lhs.wrapping_rem(rhs)
        }
        BinOpKind::Eq => i32::from(lhs == rhs),
        BinOpKind::NotEq => i32::from(lhs != rhs),
        BinOpKind::Lt => i32::from(lhs < rhs),
        BinOpKind::LtEq => i32::from(lhs <= rhs),
        BinOpKind::Gt => i32::from(lhs > rhs),
        BinOpKind::GtEq => i32::from(lhs >= rhs),
        BinOpKind::Xor => lhs ^ rhs,
        BinOpKind::And => i32::from(lhs != 0 && rhs != 0),
        BinOpKind::Or => i32::from(lhs != 0 || rhs != 0),
    })
}

/// Read one whitespace-delimited integer. `Ok(None)` means end of input or
/// a token that does not parse as a 32-bit integer.
fn read_int<R: BufRead>(input: &mut R) -> io::Result<Option<i32>> {
    // Skip leading whitespace.
    loop {
        let buf = input.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(skip) => {
                input.consume(skip);
                break;
            }
            None => {
                let len = buf.len();
                input.consume(len);
            }
        }
    }

    let mut text = String::new();
    {
        let buf = input.fill_buf()?;
        if let Some(&sign) = buf.first() {
            if sign == b'+' || sign == b'-' {
                text.push(sign as char);
                input.consume(1);
            }
        }
    }
    loop {
        let buf = input.fill_buf()?;
        let digits = buf
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(buf.len());
        if digits == 0 {
            break;
        }
        for &b in &buf[..digits] {
            text.push(b as char);
        }
        input.consume(digits);
    }
    Ok(text.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeArena;
    use crate::intern::Interner;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use std::io::Cursor;

    /// Full pipeline over a bare program: no driver prelude, no appended
    /// entry call.
    fn run(source: &str, stdin: &str) -> Result<String, RuntimeError> {
        let mut interner = Interner::new();
        let arena = NodeArena::new();
        let root = Parser::new(Lexer::new(source, &mut interner), &arena)
            .expect("lexing failed")
            .parse()
            .expect("parsing failed");
        let mut out = Vec::new();
        {
            let mut interp =
                Interpreter::new(&interner, Cursor::new(stdin.as_bytes().to_vec()), &mut out);
            interp.run(root)?;
        }
        Ok(String::from_utf8(out).expect("output was not UTF-8"))
    }

    #[test]
    fn arithmetic_follows_precedence() {
        assert_eq!(run("cout << 1 + 2 * 3;", "").unwrap(), "7");
        assert_eq!(run("cout << (1 + 2) * 3;", "").unwrap(), "9");
        assert_eq!(run("cout << 7 / 2 << 7 % 2;", "").unwrap(), "31");
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(run("cout << (2 < 3) << (2 > 3) << (2 == 2);", "").unwrap(), "101");
        assert_eq!(run("cout << (2 != 2) << (2 <= 2) << (3 >= 4);", "").unwrap(), "010");
    }

    #[test]
    fn unary_operators_apply() {
        assert_eq!(run("cout << -3 + 5 << !0 << !7 << +4;", "").unwrap(), "2104");
    }

    #[test]
    fn xor_is_bitwise() {
        assert_eq!(run("cout << (6 ^ 3);", "").unwrap(), "5");
    }

    #[test]
    fn logical_operators_do_not_short_circuit() {
        // The right-hand side runs even when the left already decides.
        assert_eq!(run("cout << (0 && putchar(65));", "").unwrap(), "A0");
        assert_eq!(run("cout << (1 || putchar(66));", "").unwrap(), "B1");
    }

    #[test]
    fn declarations_default_to_zero() {
        assert_eq!(run("int x; cout << x;", "").unwrap(), "0");
        assert_eq!(run("int a = 2, b, c = 5; cout << a << b << c;", "").unwrap(), "205");
    }

    #[test]
    fn assignment_is_an_expression_with_the_stored_value() {
        assert_eq!(run("int x; int y; y = x = 4; cout << x << y;", "").unwrap(), "44");
        assert_eq!(run("int x = 1; cout << (x = 9);", "").unwrap(), "9");
    }

    #[test]
    fn branch_picks_the_first_true_arm() {
        let src = "int x = 2;
            if (x == 1) { cout << 1; }
            else if (x == 2) { cout << 2; }
            else { cout << 3; }";
        assert_eq!(run(src, "").unwrap(), "2");
    }

    #[test]
    fn else_runs_when_every_condition_fails() {
        let src = "int x = 9;
            if (x == 1) cout << 1;
            else if (x == 2) cout << 2;
            else cout << 3;";
        assert_eq!(run(src, "").unwrap(), "3");
    }

    #[test]
    fn for_loop_accumulates() {
        let src = "int s = 0; for (int i = 1; i <= 4; i = i + 1) { s = s + i; } cout << s;";
        assert_eq!(run(src, "").unwrap(), "10");
    }

    #[test]
    fn while_loop_counts_down() {
        let src = "int n = 3; while (n > 0) { cout << n; n = n - 1; }";
        assert_eq!(run(src, "").unwrap(), "321");
    }

    #[test]
    fn function_call_binds_parameters_in_a_fresh_frame() {
        let src = "int add(int a, int b) { return a + b; } cout << add(3, 4);";
        assert_eq!(run(src, "").unwrap(), "7");
    }

    #[test]
    fn function_without_return_yields_zero() {
        let src = "int noop(int a) { a = a + 1; } cout << noop(5);";
        assert_eq!(run(src, "").unwrap(), "0");
    }

    #[test]
    fn early_return_unwinds_nested_loops() {
        let src = "int find() {
                for (int i = 0; i < 10; i = i + 1) {
                    while (1) {
                        if (i == 2) { return i; }
                        i = i + 1;
                    }
                }
                return 99;
            }
            cout << find();";
        assert_eq!(run(src, "").unwrap(), "2");
    }

    #[test]
    fn recursion_works() {
        let src = "int fact(int n) {
                if (n <= 1) { return 1; }
                return n * fact(n - 1);
            }
            cout << fact(5);";
        assert_eq!(run(src, "").unwrap(), "120");
    }

    #[test]
    fn scope_locals_die_with_their_frame() {
        let err = run("{ int x = 5; } cout << x;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name } if name == "x"));
    }

    #[test]
    fn inner_shadowing_leaves_the_outer_binding_alone() {
        let src = "int x = 1; { int x = 2; cout << x; } cout << x;";
        assert_eq!(run(src, "").unwrap(), "21");
    }

    #[test]
    fn array_elements_start_at_zero_and_store_independently() {
        let src = "int a[2][3]; a[1][2] = 9; cout << a[1][2] << a[0][0];";
        assert_eq!(run(src, "").unwrap(), "90");
    }

    #[test]
    fn three_dimensional_rows_have_their_own_storage() {
        let src = "int a[2][2][2]; a[0][0][0] = 5; cout << a[1][0][0] << a[0][1][0] << a[0][0][1];";
        assert_eq!(run(src, "").unwrap(), "000");
    }

    #[test]
    fn array_dimension_expressions_are_evaluated() {
        let src = "int n = 3; int a[n + 1]; a[3] = 8; cout << a[3] << a[0];";
        assert_eq!(run(src, "").unwrap(), "80");
    }

    #[test]
    fn too_few_indices_is_a_type_mismatch() {
        let err = run("int a[2][2]; cout << a[0];", "").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn out_of_bounds_index_is_reported() {
        let err = run("int a[2]; a[5] = 1;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
        let err = run("int a[2]; a[0 - 1] = 1;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn putchar_sums_and_emits_one_byte() {
        assert_eq!(run("putchar(65); putchar(66 + 1);", "").unwrap(), "AC");
    }

    #[test]
    fn putchar_yields_its_sum_as_a_value() {
        assert_eq!(run("cout << putchar(66);", "").unwrap(), "B66");
    }

    #[test]
    fn cout_renders_chars_escapes_and_endl() {
        assert_eq!(run(r"cout << 'a' << '\n' << 'b' << endl << 'cd';", "").unwrap(), "a\nb\ncd");
    }

    #[test]
    fn cin_reads_whitespace_delimited_integers() {
        let src = "int x; int y; cin >> x >> y; cout << x + y;";
        assert_eq!(run(src, "3 4").unwrap(), "7");
        assert_eq!(run(src, "  -2\n 12 ").unwrap(), "10");
    }

    #[test]
    fn cin_into_array_element() {
        let src = "int a[2]; cin >> a[1]; cout << a[1] << a[0];";
        assert_eq!(run(src, "5").unwrap(), "50");
    }

    #[test]
    fn cin_at_eof_leaves_the_target_unchanged() {
        let src = "int x = 7; cin >> x; cout << x;";
        assert_eq!(run(src, "").unwrap(), "7");
    }

    #[test]
    fn cin_through_an_assignment_target() {
        // The assignment stores first, then the read overwrites it.
        let src = "int x; cin >> x = 5; cout << x;";
        assert_eq!(run(src, "9").unwrap(), "9");
        assert_eq!(run(src, "").unwrap(), "5");
    }

    #[test]
    fn cin_target_must_be_defined_even_at_eof() {
        let err = run("cin >> ghost;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }

    #[test]
    fn undefined_variable_is_reported_by_name() {
        let err = run("cout << missing;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name } if name == "missing"));
    }

    #[test]
    fn calling_a_non_function_is_an_invalid_data_type() {
        let err = run("int f = 1; f(2);", "").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidDataType { .. }));
    }

    #[test]
    fn reading_an_array_as_a_scalar_is_an_invalid_data_type() {
        let err = run("int a[2]; cout << a + 1;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidDataType { .. }));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let err = run("int x = 0; cout << 1 / x;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero));
        let err = run("int x = 0; cout << 1 % x;", "").unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero));
    }

    #[test]
    fn extra_call_arguments_are_ignored() {
        let src = "int first(int a) { return a; } cout << first(1, 2, 3);";
        assert_eq!(run(src, "").unwrap(), "1");
    }

    #[test]
    fn missing_argument_fails_on_first_use() {
        let src = "int second(int a, int b) { return b; } cout << second(1);";
        let err = run(src, "").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name } if name == "b"));
    }

    #[test]
    fn redeclaration_in_the_same_frame_overwrites() {
        assert_eq!(run("int x = 1; int x = 2; cout << x;", "").unwrap(), "2");
    }

    #[test]
    fn functions_see_outer_bindings_through_the_stack() {
        let src = "int g = 10; int addg(int a) { return a + g; } cout << addg(5);";
        assert_eq!(run(src, "").unwrap(), "15");
    }

    #[test]
    fn empty_for_condition_loops_until_return() {
        let src = "int spin() {
                int i = 0;
                for (;;) {
                    i = i + 1;
                    if (i == 3) { return i; }
                }
            }
            cout << spin();";
        assert_eq!(run(src, "").unwrap(), "3");
    }

    #[test]
    fn assignment_to_a_literal_is_a_type_mismatch() {
        let err = run("int x; x = (1 = 2);", "").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn block_without_output_or_return_is_silent() {
        assert_eq!(run("int x = 1; { int y = x + 1; y = y * 2; }", "").unwrap(), "");
    }
}
