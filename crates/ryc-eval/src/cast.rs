//! Casting and implicit coercion.
//!
//! `cast` implements `static_cast<T>(e)` and always builds a fresh array.
//! `coerce` is applied at declaration, assignment, parameter binding and
//! `return`. An array that already holds the target element type is shared
//! as is; any other array is converted into a fresh buffer, so no alias
//! ever sees its elements change kind or its length change.

use ryc_types::ast::{ArraySuffix, TypeAnnotation, TypeName};
use ryc_types::{ErrorCode, Result, RycError, Span};

use crate::value::{ArrayRef, Value};

/// Explicit `static_cast<target>(value)`.
pub fn cast(value: &Value, target: &TypeAnnotation, line: u32) -> Result<Value> {
    if target.is_array() {
        cast_to_array(value, target.base, line)
    } else {
        cast_scalar(value, target.base, line)
    }
}

/// Implicit conversion to a declared type.
pub fn coerce(value: Value, target: &TypeAnnotation, line: u32) -> Result<Value> {
    if !target.is_array() {
        return match target.base {
            TypeName::Auto | TypeName::Void => Ok(value),
            base => cast_scalar(&value, base, line),
        };
    }

    let element = element_tag(target.base);
    let array = match value {
        Value::Array(array) if conforms(&array, target.base) => {
            if let Some(tag) = element {
                adopt(&array, tag);
            }
            array
        }
        Value::Array(array) => convert(&array, target.base, line)?,
        Value::Null => ArrayRef::new(element, Vec::new()),
        Value::Function(_) | Value::Native(_) => {
            return Err(invalid_cast(&value, &target.to_string(), line))
        }
        scalar => ArrayRef::new(element, vec![cast_scalar(&scalar, target.base, line)?]),
    };

    match target.size() {
        Some(size) => fit_to_size(array, size, target.base, line).map(Value::Array),
        None => Ok(Value::Array(array)),
    }
}

/// Coerce a value stored into an array slot with element type `element`.
/// Nested arrays keep their shape and have their own elements converted.
pub fn coerce_element(value: Value, element: TypeName, line: u32) -> Result<Value> {
    let target = TypeAnnotation {
        base: element,
        array: matches!(value, Value::Array(_)).then_some(ArraySuffix { size: None }),
        span: Span::point(line, 1),
    };
    coerce(value, &target, line)
}

/// Convert a scalar (or render an array) to `target`.
pub fn cast_scalar(value: &Value, target: TypeName, line: u32) -> Result<Value> {
    let cast = match target {
        TypeName::Auto | TypeName::Void => return Ok(value.clone()),
        TypeName::Bool => Value::Bool(value.is_truthy()),
        TypeName::Int => match value {
            Value::Null => Value::Int(0),
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Int(*f as i32),
            Value::Bool(b) => Value::Int(i32::from(*b)),
            Value::Char(c) => Value::Int(i32::from(*c)),
            Value::String(s) => parse_int(s),
            Value::Array(_) | Value::Function(_) | Value::Native(_) => {
                return Err(invalid_cast(value, "int", line))
            }
        },
        TypeName::Float => match value {
            Value::Null => Value::Float(0.0),
            Value::Int(i) => Value::Float(f64::from(*i)),
            Value::Float(f) => Value::Float(*f),
            Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Value::Char(c) => Value::Float(f64::from(*c)),
            Value::String(s) => parse_float(s),
            Value::Array(_) | Value::Function(_) | Value::Native(_) => {
                return Err(invalid_cast(value, "float", line))
            }
        },
        TypeName::String => match value.render() {
            Some(s) => Value::String(s),
            None => return Err(invalid_cast(value, "string", line)),
        },
        TypeName::Char => match value {
            Value::Null => Value::Char(0),
            Value::Int(i) => Value::Char(*i as u8),
            Value::Float(f) => Value::Char(*f as i32 as u8),
            Value::Bool(b) => Value::Char(u8::from(*b)),
            Value::Char(c) => Value::Char(*c),
            Value::String(s) if s.len() == 1 => Value::Char(s.as_bytes()[0]),
            Value::String(s) => {
                return Err(RycError::runtime(
                    ErrorCode::INVALID_CAST,
                    format!("cannot cast string \"{s}\" to char: expected exactly one character"),
                    line,
                ))
            }
            Value::Array(_) | Value::Function(_) | Value::Native(_) => {
                return Err(invalid_cast(value, "char", line))
            }
        },
    };
    Ok(cast)
}

/// The zero value of a declared type, before any size padding.
pub fn default_value(target: &TypeAnnotation) -> Value {
    if target.is_array() {
        Value::Array(ArrayRef::new(element_tag(target.base), Vec::new()))
    } else {
        default_scalar(target.base)
    }
}

/// Resolve an `auto` annotation against the value it is initialized with.
pub fn infer(declared: &TypeAnnotation, value: &Value) -> TypeAnnotation {
    if declared.base != TypeName::Auto {
        return declared.clone();
    }
    match value {
        Value::Array(array) => TypeAnnotation {
            base: array.element_type().unwrap_or_else(|| unify(&array.borrow())),
            array: Some(ArraySuffix {
                size: declared.size(),
            }),
            span: declared.span,
        },
        scalar => TypeAnnotation {
            base: scalar.type_name().unwrap_or(TypeName::Auto),
            array: declared.array,
            span: declared.span,
        },
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn default_scalar(base: TypeName) -> Value {
    match base {
        TypeName::Int => Value::Int(0),
        TypeName::Float => Value::Float(0.0),
        TypeName::Bool => Value::Bool(false),
        TypeName::String => Value::String(String::new()),
        TypeName::Char => Value::Char(0),
        TypeName::Auto | TypeName::Void => Value::Null,
    }
}

fn element_tag(base: TypeName) -> Option<TypeName> {
    match base {
        TypeName::Auto | TypeName::Void => None,
        other => Some(other),
    }
}

/// A common element type for literal elements, or `auto` when mixed.
fn unify(items: &[Value]) -> TypeName {
    let mut kinds = items.iter().map(Value::type_name);
    let Some(Some(mut common)) = kinds.next() else {
        return TypeName::Auto;
    };
    for kind in kinds {
        common = match (common, kind) {
            (a, Some(b)) if a == b => a,
            (TypeName::Int | TypeName::Float, Some(TypeName::Int | TypeName::Float)) => {
                TypeName::Float
            }
            _ => return TypeName::Auto,
        };
    }
    common
}

fn cast_to_array(value: &Value, element: TypeName, line: u32) -> Result<Value> {
    let items = match value {
        Value::Array(array) => {
            let items = array.borrow().clone();
            items
                .iter()
                .map(|item| cast_element(item, element, line))
                .collect::<Result<Vec<_>>>()?
        }
        Value::Null => Vec::new(),
        Value::Function(_) | Value::Native(_) => {
            return Err(invalid_cast(value, &format!("{element}[]"), line))
        }
        scalar => vec![cast_scalar(scalar, element, line)?],
    };
    Ok(Value::Array(ArrayRef::new(element_tag(element), items)))
}

fn cast_element(item: &Value, element: TypeName, line: u32) -> Result<Value> {
    match item {
        Value::Array(_) => cast_to_array(item, element, line),
        scalar => cast_scalar(scalar, element, line),
    }
}

/// Whether `array` can be shared under element type `base` unchanged.
fn conforms(array: &ArrayRef, base: TypeName) -> bool {
    match (element_tag(base), array.element_type()) {
        (None, _) => true,
        (Some(want), Some(have)) => want == have,
        (Some(want), None) => array.borrow().iter().all(|item| match item {
            Value::Array(inner) => conforms(inner, base),
            scalar => scalar.type_name() == Some(want),
        }),
    }
}

/// Record `tag` on a conforming array and its untagged nested arrays.
fn adopt(array: &ArrayRef, tag: TypeName) {
    if array.element_type().is_some() {
        return;
    }
    array.set_element_type(tag);
    for item in array.borrow().iter() {
        if let Value::Array(inner) = item {
            adopt(inner, tag);
        }
    }
}

/// A new buffer holding the elements of `array` coerced to `base`.
fn convert(array: &ArrayRef, base: TypeName, line: u32) -> Result<ArrayRef> {
    let items = array.borrow().clone();
    let converted = items
        .into_iter()
        .map(|item| match item {
            Value::Array(_) => coerce_element(item, base, line),
            scalar => cast_scalar(&scalar, base, line),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ArrayRef::new(element_tag(base), converted))
}

/// Enforce a declared size. A shorter array is padded into a new buffer.
fn fit_to_size(array: ArrayRef, size: usize, element: TypeName, line: u32) -> Result<ArrayRef> {
    let len = array.len();
    if len > size {
        return Err(RycError::runtime(
            ErrorCode::TOO_MANY_INITIALIZERS,
            format!("too many initializers: array of size {size} given {len} elements"),
            line,
        ));
    }
    if len == size {
        return Ok(array);
    }
    let mut items = array.borrow().clone();
    items.resize(size, default_scalar(element));
    Ok(ArrayRef::new(element_tag(element), items))
}

fn parse_int(text: &str) -> Value {
    let text = text.trim();
    if let Ok(i) = text.parse::<i32>() {
        return Value::Int(i);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Int(f as i32),
        _ => Value::Null,
    }
}

fn parse_float(text: &str) -> Value {
    match text.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => Value::Null,
    }
}

fn invalid_cast(value: &Value, target: &str, line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::INVALID_CAST,
        format!("cannot cast {} to {target}", value.kind_name()),
        line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(base: TypeName) -> TypeAnnotation {
        TypeAnnotation::scalar(base, Span::point(1, 1))
    }

    fn array_ty(base: TypeName, size: Option<usize>) -> TypeAnnotation {
        TypeAnnotation {
            base,
            array: Some(ArraySuffix { size }),
            span: Span::point(1, 1),
        }
    }

    fn to(value: Value, base: TypeName) -> Value {
        cast(&value, &ty(base), 1).unwrap()
    }

    #[test]
    fn test_null_casts_to_defaults() {
        assert_eq!(to(Value::Null, TypeName::Int), Value::Int(0));
        assert_eq!(to(Value::Null, TypeName::Float), Value::Float(0.0));
        assert_eq!(to(Value::Null, TypeName::Bool), Value::Bool(false));
        assert_eq!(to(Value::Null, TypeName::String), Value::String("null".into()));
        assert_eq!(to(Value::Null, TypeName::Char), Value::Char(0));
        assert_eq!(
            cast(&Value::Null, &array_ty(TypeName::Int, None), 1).unwrap(),
            Value::array(vec![])
        );
    }

    #[test]
    fn test_float_to_int_truncates_and_saturates() {
        assert_eq!(to(Value::Float(3.9), TypeName::Int), Value::Int(3));
        assert_eq!(to(Value::Float(-3.9), TypeName::Int), Value::Int(-3));
        assert_eq!(to(Value::Float(1e20), TypeName::Int), Value::Int(i32::MAX));
    }

    #[test]
    fn test_string_parsing_is_lenient() {
        assert_eq!(to(Value::String("42".into()), TypeName::Int), Value::Int(42));
        assert_eq!(to(Value::String(" 2.5 ".into()), TypeName::Float), Value::Float(2.5));
        assert_eq!(to(Value::String("abc".into()), TypeName::Int), Value::Null);
        assert_eq!(to(Value::String("inf".into()), TypeName::Float), Value::Null);
    }

    #[test]
    fn test_char_conversions() {
        assert_eq!(to(Value::Char(b'A'), TypeName::Int), Value::Int(65));
        assert_eq!(to(Value::Int(0x141), TypeName::Char), Value::Char(0x41));
        assert_eq!(to(Value::String("q".into()), TypeName::Char), Value::Char(b'q'));
        let err = cast(&Value::String("qq".into()), &ty(TypeName::Char), 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_CAST);
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn test_array_casts() {
        let arr = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(to(arr.clone(), TypeName::String), Value::String("{1, 2}".into()));
        assert_eq!(to(arr.clone(), TypeName::Bool), Value::Bool(true));
        assert!(cast(&arr, &ty(TypeName::Int), 1).is_err());
        assert_eq!(
            cast(&Value::Int(7), &array_ty(TypeName::Float, None), 1).unwrap(),
            Value::array(vec![Value::Float(7.0)])
        );
    }

    #[test]
    fn test_explicit_array_cast_copies() {
        let original = Value::array(vec![Value::Int(1), Value::array(vec![Value::Int(2)])]);
        let copy = cast(&original, &array_ty(TypeName::Float, None), 1).unwrap();
        assert_eq!(
            copy,
            Value::array(vec![Value::Float(1.0), Value::array(vec![Value::Float(2.0)])])
        );
        assert_eq!(
            original,
            Value::array(vec![Value::Int(1), Value::array(vec![Value::Int(2)])])
        );
    }

    #[test]
    fn test_coerce_shares_conforming_arrays() {
        let handle = ArrayRef::new(None, vec![Value::Int(1), Value::Int(2)]);
        let Value::Array(result) =
            coerce(Value::Array(handle.clone()), &array_ty(TypeName::Int, None), 1).unwrap()
        else {
            panic!("expected array");
        };
        assert!(result.ptr_eq(&handle));
        assert_eq!(handle.element_type(), Some(TypeName::Int));
    }

    #[test]
    fn test_coerce_copies_other_arrays() {
        let handle = ArrayRef::new(Some(TypeName::Float), vec![Value::Float(1.5), Value::Float(2.7)]);
        let Value::Array(result) =
            coerce(Value::Array(handle.clone()), &array_ty(TypeName::Int, None), 1).unwrap()
        else {
            panic!("expected array");
        };
        assert!(!result.ptr_eq(&handle));
        assert_eq!(*result.borrow(), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(*handle.borrow(), vec![Value::Float(1.5), Value::Float(2.7)]);
        assert_eq!(handle.element_type(), Some(TypeName::Float));
    }

    #[test]
    fn test_padding_never_grows_the_source() {
        let handle = ArrayRef::new(Some(TypeName::Int), vec![Value::Int(1)]);
        let padded = coerce(Value::Array(handle.clone()), &array_ty(TypeName::Int, Some(3)), 1).unwrap();
        assert_eq!(padded, Value::array(vec![Value::Int(1), Value::Int(0), Value::Int(0)]));
        assert_eq!(handle.len(), 1);

        let exact = coerce(Value::Array(handle.clone()), &array_ty(TypeName::Int, Some(1)), 1).unwrap();
        let Value::Array(exact) = exact else {
            panic!("expected array");
        };
        assert!(exact.ptr_eq(&handle));
    }

    #[test]
    fn test_coerce_rejects_too_many_initializers() {
        let arr = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let err = coerce(arr, &array_ty(TypeName::Int, Some(1)), 9).unwrap_err();
        assert_eq!(err.code, ErrorCode::TOO_MANY_INITIALIZERS);
        assert_eq!(err.line(), 9);
    }

    #[test]
    fn test_coerce_element() {
        assert_eq!(coerce_element(Value::Float(2.9), TypeName::Int, 1).unwrap(), Value::Int(2));
        let nested = coerce_element(Value::array(vec![Value::Float(1.5)]), TypeName::Int, 1).unwrap();
        assert_eq!(nested, Value::array(vec![Value::Int(1)]));
    }

    #[test]
    fn test_coerce_auto_keeps_value() {
        assert_eq!(
            coerce(Value::String("s".into()), &ty(TypeName::Auto), 1).unwrap(),
            Value::String("s".into())
        );
    }

    #[test]
    fn test_infer_auto() {
        assert_eq!(infer(&ty(TypeName::Auto), &Value::Float(1.5)).base, TypeName::Float);
        let mixed = Value::array(vec![Value::Int(1), Value::Float(2.5)]);
        let inferred = infer(&ty(TypeName::Auto), &mixed);
        assert_eq!(inferred.base, TypeName::Float);
        assert!(inferred.is_array());
        let strings = Value::array(vec![Value::String("a".into()), Value::Int(1)]);
        assert_eq!(infer(&ty(TypeName::Auto), &strings).base, TypeName::Auto);
        assert_eq!(infer(&ty(TypeName::Int), &Value::Float(1.0)).base, TypeName::Int);
    }
}
