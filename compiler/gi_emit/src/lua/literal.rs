//! Constants as Lua literals.

use gi_types::{ConstValue, TypeId, TypePool};
use std::fmt::Write;

/// Quote a string as a Lua double-quoted literal. Bytes outside printable
/// ASCII are written as decimal escapes so the literal survives any source
/// encoding.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for b in s.bytes() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\{b}");
            }
        }
    }
    out.push('"');
    out
}

pub fn float(f: f64) -> String {
    if f.is_nan() {
        "(0/0)".to_string()
    } else if f.is_infinite() {
        if f.is_sign_positive() { "math.huge" } else { "-math.huge" }.to_string()
    } else {
        // Debug keeps a trailing `.0` and round-trips exactly.
        format!("{f:?}")
    }
}

/// A constant of type `ty` as a Lua expression. Integers become LuaJIT
/// 64-bit cdata literals (`LL`, or `ULL` for unsigned types).
pub fn constant(pool: &TypePool, ty: TypeId, value: &ConstValue) -> String {
    let kind = pool.basic(pool.default_type(ty));
    match value {
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::String(s) => quote(s),
        ConstValue::Int(v) => match kind {
            Some(k) if k.is_float() => float(value.as_float().unwrap_or_default()),
            Some(k) if k.is_unsigned() => format!("{v}ULL"),
            _ => format!("{v}LL"),
        },
        ConstValue::Float(f) => match kind {
            Some(k) if k.is_integer() => match value.as_int() {
                Some(v) if k.is_unsigned() => format!("{v}ULL"),
                Some(v) => format!("{v}LL"),
                None => float(*f),
            },
            _ => float(*f),
        },
    }
}

/// `1` in the representation of `ty`, for `++` and `--`.
pub fn one(pool: &TypePool, ty: TypeId) -> &'static str {
    match pool.basic(ty) {
        Some(k) if k.is_unsigned() => "1ULL",
        Some(k) if k.is_float() || k.is_complex() => "1",
        _ => "1LL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\n"), r#""a\"b\\c\n""#);
        assert_eq!(quote("é"), r#""\195\169""#);
    }

    #[test]
    fn test_constant_by_type() {
        let pool = TypePool::new();
        assert_eq!(constant(&pool, TypeId::INT, &ConstValue::Int(10)), "10LL");
        assert_eq!(constant(&pool, TypeId::UINT8, &ConstValue::Int(7)), "7ULL");
        assert_eq!(constant(&pool, TypeId::FLOAT64, &ConstValue::Int(2)), "2.0");
        assert_eq!(constant(&pool, TypeId::UNTYPED_FLOAT, &ConstValue::Float(2.5)), "2.5");
        assert_eq!(constant(&pool, TypeId::INT, &ConstValue::Float(3.0)), "3LL");
        assert_eq!(
            constant(&pool, TypeId::STRING, &ConstValue::String("hi".into())),
            "\"hi\""
        );
    }
}
