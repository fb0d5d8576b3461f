use bytes::{BufMut, BytesMut};
use serde_json::Value;

use crate::error::EncodeError;

/// One typed argument attached to an outbound command.
///
/// Zero and the empty string are real arguments; only an empty argument
/// list means "no arguments".
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// 32-bit big-endian signed integer, tag `i`.
    Int(i32),
    /// 32-bit big-endian IEEE float, tag `f`.
    Float(f32),
    /// NUL-terminated string padded to 4 bytes, tag `s`.
    Str(String),
}

impl Argument {
    /// The OSC type tag for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::Str(_) => 's',
        }
    }

    /// Append the big-endian binary form, padded to a 4-byte boundary.
    pub(crate) fn encode_into(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        match self {
            Self::Int(value) => dst.put_i32(*value),
            Self::Float(value) => dst.put_f32(*value),
            Self::Str(value) => {
                if value.contains('\0') {
                    return Err(EncodeError::InvalidString(value.clone()));
                }
                put_osc_string(dst, value.as_bytes());
            }
        }
        Ok(())
    }
}

/// Append an OSC string: the bytes, then 1 to 4 NULs up to a 4-byte boundary.
pub(crate) fn put_osc_string(dst: &mut BytesMut, bytes: &[u8]) {
    dst.put_slice(bytes);
    dst.put_bytes(0, 4 - bytes.len() % 4);
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl TryFrom<&Value> for Argument {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Str(s.clone())),
            Value::Number(n) => {
                if let Some(int) = n.as_i64() {
                    return i32::try_from(int).map(Self::Int).map_err(|_| {
                        EncodeError::UnsupportedArgument(format!("integer {int} exceeds 32 bits"))
                    });
                }
                n.as_f64()
                    .map(|float| Self::Float(float as f32))
                    .ok_or_else(|| EncodeError::UnsupportedArgument(format!("number {n}")))
            }
            Value::Null => Err(EncodeError::UnsupportedArgument("null".to_string())),
            Value::Bool(_) => Err(EncodeError::UnsupportedArgument("boolean".to_string())),
            Value::Array(_) => Err(EncodeError::UnsupportedArgument("array".to_string())),
            Value::Object(_) => Err(EncodeError::UnsupportedArgument("object".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encoded(arg: &Argument) -> Vec<u8> {
        let mut dst = BytesMut::new();
        arg.encode_into(&mut dst).unwrap();
        dst.to_vec()
    }

    #[test]
    fn int_is_big_endian() {
        assert_eq!(encoded(&Argument::Int(1)), vec![0, 0, 0, 1]);
        assert_eq!(encoded(&Argument::Int(-2)), vec![0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn float_is_big_endian() {
        assert_eq!(encoded(&Argument::Float(1.0)), vec![0x3F, 0x80, 0, 0]);
    }

    #[test]
    fn string_is_nul_terminated_and_padded() {
        assert_eq!(encoded(&Argument::from("abc")), b"abc\0".to_vec());
        assert_eq!(encoded(&Argument::from("abcd")), b"abcd\0\0\0\0".to_vec());
        assert_eq!(encoded(&Argument::from("")), b"\0\0\0\0".to_vec());
    }

    #[test]
    fn string_with_nul_is_rejected() {
        let mut dst = BytesMut::new();
        let err = Argument::from("a\0b").encode_into(&mut dst).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidString(_)));
    }

    #[test]
    fn type_tags() {
        assert_eq!(Argument::from(0).type_tag(), 'i');
        assert_eq!(Argument::from(0.5f32).type_tag(), 'f');
        assert_eq!(Argument::from(String::new()).type_tag(), 's');
    }

    #[test]
    fn from_json_values() {
        assert_eq!(Argument::try_from(&json!(7)).unwrap(), Argument::Int(7));
        assert_eq!(Argument::try_from(&json!(2.5)).unwrap(), Argument::Float(2.5));
        assert_eq!(
            Argument::try_from(&json!("Lights")).unwrap(),
            Argument::Str("Lights".to_string())
        );
    }

    #[test]
    fn from_json_rejects_unsupported_types() {
        for value in [json!(null), json!(true), json!([1]), json!({"a": 1})] {
            assert!(matches!(
                Argument::try_from(&value),
                Err(EncodeError::UnsupportedArgument(_))
            ));
        }
        assert!(matches!(
            Argument::try_from(&json!(1_i64 << 40)),
            Err(EncodeError::UnsupportedArgument(_))
        ));
    }
}
