//! Compile-time constant values and folding.
//!
//! Integers are folded in `i128`, wide enough for every sized Go integer
//! kind plus overflow detection. Floats use `f64`.

use crate::BasicKind;
use gi_ir::ast::{BinaryOp, UnaryOp};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstError {
    DivisionByZero,
    Overflow,
    /// A float constant with a fractional part used as an integer.
    Truncated,
    /// The operator does not apply to these operands.
    Mismatch,
}

impl fmt::Display for ConstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstError::DivisionByZero => "division by zero",
            ConstError::Overflow => "constant overflow",
            ConstError::Truncated => "constant truncated to integer",
            ConstError::Mismatch => "invalid constant operation",
        })
    }
}

impl ConstValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value, accepting floats with no fractional part.
    pub fn as_int(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(*v),
            #[allow(clippy::cast_possible_truncation)]
            ConstValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e38 => Some(*f as i128),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to the representation used for constants of `kind`, checking
    /// that the value fits.
    pub fn represent(&self, kind: BasicKind) -> Result<ConstValue, ConstError> {
        if kind.is_integer() {
            let v = match self {
                ConstValue::Int(v) => *v,
                ConstValue::Float(_) => self.as_int().ok_or(ConstError::Truncated)?,
                _ => return Err(ConstError::Mismatch),
            };
            if let Some((lo, hi)) = kind.int_range() {
                if v < lo || v > hi {
                    return Err(ConstError::Overflow);
                }
            }
            return Ok(ConstValue::Int(v));
        }
        if kind.is_float() || kind.is_complex() {
            let f = self.as_float().ok_or(ConstError::Mismatch)?;
            if kind == BasicKind::Float32 && f.is_finite() && f.abs() > f64::from(f32::MAX) {
                return Err(ConstError::Overflow);
            }
            return Ok(ConstValue::Float(f));
        }
        match (kind, self) {
            (BasicKind::String | BasicKind::UntypedString, ConstValue::String(_))
            | (BasicKind::Bool | BasicKind::UntypedBool, ConstValue::Bool(_)) => Ok(self.clone()),
            _ => Err(ConstError::Mismatch),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Fold a unary operator. `unsigned_bits` is the width of the operand's type
/// when it is a sized unsigned integer, which `^x` needs.
pub fn fold_unary(
    op: UnaryOp,
    value: &ConstValue,
    unsigned_bits: Option<u32>,
) -> Result<ConstValue, ConstError> {
    match (op, value) {
        (UnaryOp::Pos, ConstValue::Int(_) | ConstValue::Float(_)) => Ok(value.clone()),
        (UnaryOp::Neg, ConstValue::Int(v)) => {
            v.checked_neg().map(ConstValue::Int).ok_or(ConstError::Overflow)
        }
        (UnaryOp::Neg, ConstValue::Float(v)) => Ok(ConstValue::Float(-v)),
        (UnaryOp::Not, ConstValue::Bool(b)) => Ok(ConstValue::Bool(!b)),
        (UnaryOp::Complement, ConstValue::Int(v)) => Ok(ConstValue::Int(match unsigned_bits {
            Some(bits) => !v & ((1i128 << bits) - 1),
            None => !v,
        })),
        _ => Err(ConstError::Mismatch),
    }
}

pub fn fold_binary(
    op: BinaryOp,
    left: &ConstValue,
    right: &ConstValue,
) -> Result<ConstValue, ConstError> {
    use ConstValue::{Bool, Float, Int, String};

    if op.is_shift() {
        let (Some(l), Some(r)) = (left.as_int(), right.as_int()) else {
            return Err(ConstError::Mismatch);
        };
        if r < 0 {
            return Err(ConstError::Mismatch);
        }
        return match op {
            BinaryOp::Shl => {
                let count = u32::try_from(r).map_err(|_| ConstError::Overflow)?;
                if count >= 127 || (l != 0 && l.unsigned_abs().leading_zeros() <= count + 1) {
                    return Err(ConstError::Overflow);
                }
                Ok(Int(l << count))
            }
            _ => Ok(Int(if r >= 127 {
                if l < 0 {
                    -1
                } else {
                    0
                }
            } else {
                l >> r
            })),
        };
    }

    match (left, right) {
        (Bool(l), Bool(r)) => Ok(Bool(match op {
            BinaryOp::LogAnd => *l && *r,
            BinaryOp::LogOr => *l || *r,
            BinaryOp::Eq => l == r,
            BinaryOp::NotEq => l != r,
            _ => return Err(ConstError::Mismatch),
        })),
        (String(l), String(r)) => match op {
            BinaryOp::Add => Ok(String(format!("{l}{r}"))),
            _ if op.is_comparison() => Ok(Bool(compare(op, l.cmp(r)))),
            _ => Err(ConstError::Mismatch),
        },
        (Int(l), Int(r)) => fold_int(op, *l, *r),
        (Int(_) | Float(_), Int(_) | Float(_)) => {
            let (Some(l), Some(r)) = (left.as_float(), right.as_float()) else {
                return Err(ConstError::Mismatch);
            };
            fold_float(op, l, r)
        }
        _ => Err(ConstError::Mismatch),
    }
}

fn fold_int(op: BinaryOp, l: i128, r: i128) -> Result<ConstValue, ConstError> {
    let v = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Div | BinaryOp::Rem if r == 0 => return Err(ConstError::DivisionByZero),
        BinaryOp::Div => l.checked_div(r),
        BinaryOp::Rem => l.checked_rem(r),
        BinaryOp::And => Some(l & r),
        BinaryOp::Or => Some(l | r),
        BinaryOp::Xor => Some(l ^ r),
        BinaryOp::AndNot => Some(l & !r),
        _ if op.is_comparison() => return Ok(ConstValue::Bool(compare(op, l.cmp(&r)))),
        _ => return Err(ConstError::Mismatch),
    };
    v.map(ConstValue::Int).ok_or(ConstError::Overflow)
}

fn fold_float(op: BinaryOp, l: f64, r: f64) -> Result<ConstValue, ConstError> {
    let v = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div if r == 0.0 => return Err(ConstError::DivisionByZero),
        BinaryOp::Div => l / r,
        _ if op.is_comparison() => {
            let ord = l.partial_cmp(&r).ok_or(ConstError::Mismatch)?;
            return Ok(ConstValue::Bool(compare(op, ord)));
        }
        _ => return Err(ConstError::Mismatch),
    };
    if v.is_finite() {
        Ok(ConstValue::Float(v))
    } else {
        Err(ConstError::Overflow)
    }
}

fn compare(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match op {
        BinaryOp::Eq => ord == Equal,
        BinaryOp::NotEq => ord != Equal,
        BinaryOp::Lt => ord == Less,
        BinaryOp::LtEq => ord != Greater,
        BinaryOp::Gt => ord == Greater,
        BinaryOp::GtEq => ord != Less,
        _ => false,
    }
}

#[cfg(test)]
mod tests;
