//! Runtime values.
//!
//! `Value` is a closed tagged union: every operator and cast matches on it
//! exhaustively. Scalars are copied on assignment; arrays are shared
//! handles, so a copy of an `Array` value aliases the same buffer.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use ryc_types::ast::{FuncDecl, TypeName};

use crate::env::ScopeId;
use crate::natives::NativeFn;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Float(f64),
    Bool(bool),
    String(String),
    Char(u8),
    Array(ArrayRef),
    Null,
    Function(Closure),
    Native(NativeFunction),
}

impl Value {
    /// The kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Char(_) => "char",
            Value::Array(_) => "array",
            Value::Null => "null",
            Value::Function(_) => "function",
            Value::Native(_) => "native function",
        }
    }

    /// The scalar type a value carries, used to infer `auto` declarations.
    pub fn type_name(&self) -> Option<TypeName> {
        match self {
            Value::Int(_) => Some(TypeName::Int),
            Value::Float(_) => Some(TypeName::Float),
            Value::Bool(_) => Some(TypeName::Bool),
            Value::String(_) => Some(TypeName::String),
            Value::Char(_) => Some(TypeName::Char),
            Value::Array(_) | Value::Null | Value::Function(_) | Value::Native(_) => None,
        }
    }

    /// Truthiness for conditions and `!`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Char(c) => *c != 0,
            Value::Null => false,
            Value::Array(_) | Value::Function(_) | Value::Native(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wrap elements in a fresh array with no element type.
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(ArrayRef::new(None, elements))
    }

    /// Render as `static_cast<string>` does; `None` for functions.
    pub fn render(&self) -> Option<String> {
        Some(match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Char(c) => char::from(*c).to_string(),
            Value::Null => "null".to_string(),
            Value::Array(array) => {
                let parts = array
                    .borrow()
                    .iter()
                    .map(|v| v.render().unwrap_or_else(|| v.kind_name().to_string()))
                    .collect::<Vec<_>>();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(_) | Value::Native(_) => return None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Function(closure) => write!(f, "<func {}>", closure.name()),
            Value::Native(native) => write!(f, "<native {}>", native.name()),
            other => f.write_str(&other.render().unwrap_or_default()),
        }
    }
}

/// Structural equality, used by tests and by array comparison.
///
/// Arrays compare element-wise, functions by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => {
                a.ptr_eq(b) || *a.borrow() == *b.borrow()
            }
            (Value::Function(a), Value::Function(b)) => {
                Rc::ptr_eq(&a.decl, &b.decl) && a.scope == b.scope
            }
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Arrays
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct ArrayData {
    /// Element type recorded by the declaration the array was bound to.
    element: Cell<Option<TypeName>>,
    items: RefCell<Vec<Value>>,
}

/// Shared handle to a mutable array buffer.
#[derive(Debug, Clone)]
pub struct ArrayRef(Rc<ArrayData>);

impl ArrayRef {
    pub fn new(element: Option<TypeName>, items: Vec<Value>) -> Self {
        Self(Rc::new(ArrayData {
            element: Cell::new(element),
            items: RefCell::new(items),
        }))
    }

    pub fn element_type(&self) -> Option<TypeName> {
        self.0.element.get()
    }

    pub fn set_element_type(&self, element: TypeName) {
        self.0.element.set(Some(element));
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.items.borrow()
    }

    /// Whether `other` is this array or is reachable through its elements.
    pub fn reaches(&self, other: &ArrayRef) -> bool {
        self.ptr_eq(other)
            || self.borrow().iter().any(|item| match item {
                Value::Array(inner) => inner.reaches(other),
                _ => false,
            })
    }

    /// Store into an existing slot. Returns `false` when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Callables
// ══════════════════════════════════════════════════════════════════════════════

/// A user function paired with the scope it was declared in.
#[derive(Debug, Clone)]
pub struct Closure {
    pub decl: Rc<FuncDecl>,
    pub scope: ScopeId,
}

impl Closure {
    pub fn name(&self) -> &str {
        &self.decl.name.name
    }
}

/// A host callback registered in the native registry.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(3).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::String("x".into()).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(!Value::Char(0).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Float(2.5).render().as_deref(), Some("2.5"));
        assert_eq!(Value::Float(3.0).render().as_deref(), Some("3"));
        assert_eq!(Value::Char(b'z').render().as_deref(), Some("z"));
        assert_eq!(Value::Null.render().as_deref(), Some("null"));
        let nested = Value::array(vec![Value::Int(1), Value::array(vec![Value::Bool(true)])]);
        assert_eq!(nested.to_string(), "{1, {true}}");
    }

    #[test]
    fn test_array_copies_alias() {
        let a = ArrayRef::new(None, vec![Value::Int(1)]);
        let b = a.clone();
        assert!(b.set(0, Value::Int(9)));
        assert_eq!(a.get(0), Some(Value::Int(9)));
        assert!(!a.set(1, Value::Int(0)));
    }

    #[test]
    fn test_reaches_nested_arrays() {
        let inner = ArrayRef::new(None, vec![Value::Int(1)]);
        let outer = ArrayRef::new(None, vec![Value::Int(0), Value::Array(inner.clone())]);
        assert!(outer.reaches(&inner));
        assert!(outer.reaches(&outer));
        assert!(!inner.reaches(&outer));
    }

    #[test]
    fn test_equality_is_structural_for_arrays() {
        let a = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::array(vec![Value::Int(1)]));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }
}
