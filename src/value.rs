//! Runtime values and multi-dimensional array storage.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Node;

/// Refcounted handle to an array object. The surface language has no way to
/// alias a handle, but the evaluator never relies on the count being one.
pub type ArrayRef = Rc<RefCell<Array>>;

/// One storage slot: an integer at the innermost dimension, a nested array
/// everywhere above it.
#[derive(Debug, Clone)]
pub enum Slot {
    Int(i32),
    Nested(ArrayRef),
}

/// Rectangular array storage, built right-to-left from the declared
/// dimension list. Every outer level holds independent copies of its inner
/// level, so no two index paths share an integer cell.
#[derive(Debug)]
pub struct Array {
    slots: Vec<Slot>,
}

impl Array {
    /// Innermost level: `len` zero-filled integers.
    pub fn of_ints(len: usize) -> ArrayRef {
        Rc::new(RefCell::new(Array {
            slots: vec![Slot::Int(0); len],
        }))
    }

    /// Outer level: `len` independent copies of `inner`.
    pub fn of_arrays(len: usize, inner: &ArrayRef) -> ArrayRef {
        let slots = (0..len).map(|_| Slot::Nested(Array::duplicate(inner))).collect();
        Rc::new(RefCell::new(Array { slots }))
    }

    /// Recursive deep copy; shares no storage with the source.
    pub fn duplicate(array: &ArrayRef) -> ArrayRef {
        let slots = array
            .borrow()
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Int(value) => Slot::Int(*value),
                Slot::Nested(inner) => Slot::Nested(Array::duplicate(inner)),
            })
            .collect();
        Rc::new(RefCell::new(Array { slots }))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Store an integer, replacing whatever the slot held. Callers validate
    /// the index when they resolve the place.
    pub fn set_int(&mut self, index: usize, value: i32) {
        self.slots[index] = Slot::Int(value);
    }
}

/// A value bound in a call-stack frame.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// 32-bit integer; also carries booleans (0 = false) and byte codes.
    Int(i32),
    /// Non-owning reference to a `FnDecl` node resident in the AST.
    Fn(&'a Node<'a>),
    /// Shared array handle.
    Array(ArrayRef),
}
