//! Decoder for the older binary reply shape.
//!
//! Before replies carried JSON, the device answered with plain OSC messages
//! whose arguments were numbers. This path recovers the address and those
//! numbers so the command can be logged as text. The request/response path
//! does not use it.

use std::fmt;

use crate::address::Address;
use crate::error::DecodeError;

/// A numeric argument from a binary argument block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Float(f32),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Address segments and numeric arguments decoded from a binary payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyCommand {
    pub address: Address,
    pub args: Vec<Number>,
}

impl LegacyCommand {
    pub fn into_parts(self) -> (Address, Vec<Number>) {
        (self.address, self.args)
    }
}

/// Renders as a call: first segment is the name, the rest are quoted
/// parameters, then the numbers. `/cue/5` with `[1, 2]` is `cue('5', 1, 2)`.
impl fmt::Display for LegacyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, params) = match self.address.segments().split_first() {
            Some(split) => split,
            None => return Ok(()),
        };
        write!(f, "{name}(")?;
        let mut first = true;
        let quoted = params.iter().map(|p| format!("'{p}'"));
        let numbers = self.args.iter().map(ToString::to_string);
        for part in quoted.chain(numbers) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(&part)?;
            first = false;
        }
        f.write_str(")")
    }
}

/// Decode an unframed binary OSC payload into address and numbers.
///
/// The address is everything before the first `,`. After the `,` sits the
/// tag field (`ii`, `f`, ...) NUL-padded so that values start on the next
/// 4-byte boundary: for one or two tags that is 3 bytes past the tag field's
/// start. Trailing zero bytes the frame decoder trimmed are restored.
pub fn legacy_decode_binary(payload: &[u8]) -> Result<LegacyCommand, DecodeError> {
    let (address_part, block) = match payload.iter().position(|&b| b == b',') {
        Some(comma) => (&payload[..comma], Some(&payload[comma + 1..])),
        None => (payload, None),
    };

    let address = decode_address(address_part)?;
    let args = match block {
        Some(block) => decode_numbers(block)?,
        None => Vec::new(),
    };

    Ok(LegacyCommand { address, args })
}

fn decode_address(part: &[u8]) -> Result<Address, DecodeError> {
    let mut segments = Vec::new();
    for raw in part.split(|&b| b == b'/') {
        let trimmed = trim_trailing_nul(raw);
        if trimmed.is_empty() {
            continue;
        }
        let segment = std::str::from_utf8(trimmed)
            .map_err(|_| DecodeError::InvalidAddress(String::from_utf8_lossy(raw).into_owned()))?;
        segments.push(segment.to_string());
    }
    Address::from_segments(segments).map_err(|err| DecodeError::InvalidAddress(err.to_string()))
}

fn decode_numbers(block: &[u8]) -> Result<Vec<Number>, DecodeError> {
    let tags: Vec<char> = block
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();

    // `,` + tags + at least one NUL, rounded up to 4; minus the `,` already consumed.
    let values_start = (tags.len() + 2).div_ceil(4) * 4 - 1;
    let values = block.get(values_start..).unwrap_or(&[]);

    let expected = tags.len() * 4;
    if values.len() > expected && values[expected..].iter().any(|&b| b != 0) {
        return Err(DecodeError::ArgumentLength {
            tags: tags.iter().collect(),
            expected,
            actual: values.len(),
        });
    }

    let mut padded = values[..values.len().min(expected)].to_vec();
    padded.resize(expected, 0);

    tags.iter()
        .zip(padded.chunks_exact(4))
        .map(|(&tag, word)| {
            let word = [word[0], word[1], word[2], word[3]];
            match tag {
                'i' => Ok(Number::Int(i32::from_be_bytes(word))),
                'f' => Ok(Number::Float(f32::from_be_bytes(word))),
                other => Err(DecodeError::UnsupportedTag { tag: other }),
            }
        })
        .collect()
}

fn trim_trailing_nul(bytes: &[u8]) -> &[u8] {
    let keep = bytes.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    &bytes[..keep]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OscMessage;

    #[test]
    fn decodes_two_ints() {
        let mut payload = b"/cue/5\0\0,ii\0".to_vec();
        payload.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 2]);

        let command = legacy_decode_binary(&payload).unwrap();
        assert_eq!(command.address.segments(), &["cue", "5"]);
        assert_eq!(command.args, vec![Number::Int(1), Number::Int(2)]);
    }

    #[test]
    fn decodes_single_float() {
        let mut payload = b"/level\0\0,f\0\0".to_vec();
        payload.extend_from_slice(&0.5f32.to_be_bytes());

        let (address, args) = legacy_decode_binary(&payload).unwrap().into_parts();
        assert_eq!(address.path(), "/level");
        assert_eq!(args, vec![Number::Float(0.5)]);
    }

    #[test]
    fn restores_trimmed_trailing_zero() {
        // A frame decoder strips the trailing NULs of a final zero argument.
        let payload = b"/cue/1\0\0,ii\0\0\0\0\x09".to_vec();
        let command = legacy_decode_binary(&payload).unwrap();
        assert_eq!(command.args, vec![Number::Int(9), Number::Int(0)]);
    }

    #[test]
    fn decodes_output_of_encoder() {
        let payload = OscMessage::new(Address::parse("/cue/3/go").unwrap())
            .with_args([1, 2, 3])
            .encode_payload()
            .unwrap();

        let command = legacy_decode_binary(&payload).unwrap();
        assert_eq!(command.address.path(), "/cue/3/go");
        assert_eq!(
            command.args,
            vec![Number::Int(1), Number::Int(2), Number::Int(3)]
        );
    }

    #[test]
    fn no_argument_block() {
        let command = legacy_decode_binary(b"/go\0").unwrap();
        assert_eq!(command.address.path(), "/go");
        assert!(command.args.is_empty());

        let command = legacy_decode_binary(b"/go\0,\0\0\0").unwrap();
        assert!(command.args.is_empty());
    }

    #[test]
    fn unsupported_tag_is_error() {
        let payload = b"/x\0\0,s\0\0abc\0".to_vec();
        assert!(matches!(
            legacy_decode_binary(&payload),
            Err(DecodeError::UnsupportedTag { tag: 's' })
        ));
    }

    #[test]
    fn extra_bytes_are_error() {
        let mut payload = b"/x\0\0,i\0\0".to_vec();
        payload.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 2]);
        assert!(matches!(
            legacy_decode_binary(&payload),
            Err(DecodeError::ArgumentLength { .. })
        ));
    }

    #[test]
    fn missing_address_is_error() {
        assert!(matches!(
            legacy_decode_binary(b",i\0\0\0\0\0\x01"),
            Err(DecodeError::InvalidAddress(_))
        ));
    }

    #[test]
    fn renders_as_call_text() {
        let mut payload = b"/cue/5\0\0,ii\0".to_vec();
        payload.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 2]);

        let command = legacy_decode_binary(&payload).unwrap();
        assert_eq!(command.to_string(), "cue('5', 1, 2)");
    }
}
