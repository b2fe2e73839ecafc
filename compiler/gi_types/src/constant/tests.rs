use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_integer_arithmetic() {
    let v = fold_binary(BinaryOp::Div, &ConstValue::Int(7), &ConstValue::Int(2));
    assert_eq!(v, Ok(ConstValue::Int(3)));
    let v = fold_binary(BinaryOp::AndNot, &ConstValue::Int(0b1111), &ConstValue::Int(0b0101));
    assert_eq!(v, Ok(ConstValue::Int(0b1010)));
}

#[test]
fn test_mixed_int_float_uses_float() {
    let v = fold_binary(BinaryOp::Div, &ConstValue::Int(7), &ConstValue::Float(2.0));
    assert_eq!(v, Ok(ConstValue::Float(3.5)));
}

#[test]
fn test_division_by_zero() {
    let v = fold_binary(BinaryOp::Rem, &ConstValue::Int(1), &ConstValue::Int(0));
    assert_eq!(v, Err(ConstError::DivisionByZero));
    let v = fold_binary(BinaryOp::Div, &ConstValue::Float(1.0), &ConstValue::Int(0));
    assert_eq!(v, Err(ConstError::DivisionByZero));
}

#[test]
fn test_shifts() {
    let v = fold_binary(BinaryOp::Shl, &ConstValue::Int(1), &ConstValue::Int(10));
    assert_eq!(v, Ok(ConstValue::Int(1024)));
    let v = fold_binary(BinaryOp::Shr, &ConstValue::Int(-8), &ConstValue::Int(200));
    assert_eq!(v, Ok(ConstValue::Int(-1)));
    let v = fold_binary(BinaryOp::Shl, &ConstValue::Int(1), &ConstValue::Int(130));
    assert_eq!(v, Err(ConstError::Overflow));
}

#[test]
fn test_string_concat_and_compare() {
    let a = ConstValue::String("go".into());
    let b = ConstValue::String("pher".into());
    assert_eq!(
        fold_binary(BinaryOp::Add, &a, &b),
        Ok(ConstValue::String("gopher".into()))
    );
    assert_eq!(fold_binary(BinaryOp::Lt, &a, &b), Ok(ConstValue::Bool(true)));
}

#[test]
fn test_complement_respects_unsigned_width() {
    let v = fold_unary(UnaryOp::Complement, &ConstValue::Int(1), Some(8));
    assert_eq!(v, Ok(ConstValue::Int(254)));
    let v = fold_unary(UnaryOp::Complement, &ConstValue::Int(1), None);
    assert_eq!(v, Ok(ConstValue::Int(-2)));
}

#[test]
fn test_represent() {
    assert_eq!(
        ConstValue::Int(300).represent(BasicKind::Uint8),
        Err(ConstError::Overflow)
    );
    assert_eq!(
        ConstValue::Float(2.0).represent(BasicKind::Int),
        Ok(ConstValue::Int(2))
    );
    assert_eq!(
        ConstValue::Float(2.5).represent(BasicKind::Int),
        Err(ConstError::Truncated)
    );
    assert_eq!(
        ConstValue::Int(3).represent(BasicKind::Float64),
        Ok(ConstValue::Float(3.0))
    );
    assert_eq!(
        ConstValue::Int(-1).represent(BasicKind::Uint),
        Err(ConstError::Overflow)
    );
}
