use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::address::Address;
use crate::argument::{put_osc_string, Argument};
use crate::error::EncodeError;

/// An outbound OSC command: an address and zero or more typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    address: Address,
    args: Vec<Argument>,
}

impl OscMessage {
    /// Create a message with no arguments.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn with_arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Target address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Arguments in send order.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// The type-tag string: `,` followed by one tag per argument.
    pub fn type_tags(&self) -> String {
        std::iter::once(',')
            .chain(self.args.iter().map(Argument::type_tag))
            .collect()
    }

    /// Encode the unframed OSC 1.0 body.
    ///
    /// Layout: padded address string, padded type-tag string, then each
    /// argument big-endian and padded to 4 bytes.
    pub fn encode_payload(&self) -> Result<Bytes, EncodeError> {
        let mut dst = BytesMut::with_capacity(64);
        put_osc_string(&mut dst, self.address.path().as_bytes());
        put_osc_string(&mut dst, self.type_tags().as_bytes());
        for arg in &self.args {
            arg.encode_into(&mut dst)?;
        }
        Ok(dst.freeze())
    }

    /// Encode and SLIP-frame the message, ready to write to the stream.
    pub fn build(&self) -> Result<Bytes, EncodeError> {
        let payload = self.encode_payload()?;
        let frame = cuewire_frame::encode(&payload);
        trace!(address = %self.address, args = self.args.len(), bytes = frame.len(), "built frame");
        Ok(frame)
    }
}

/// Build a framed command from an address and its arguments.
pub fn build(address: &Address, args: &[Argument]) -> Result<Bytes, EncodeError> {
    OscMessage::new(address.clone())
        .with_args(args.iter().cloned())
        .build()
}

#[cfg(test)]
mod tests {
    use cuewire_frame::{decode_frame, END};

    use super::*;

    fn addr(path: &str) -> Address {
        Address::parse(path).unwrap()
    }

    #[test]
    fn payload_without_arguments() {
        let payload = OscMessage::new(addr("/go")).encode_payload().unwrap();
        assert_eq!(payload.as_ref(), b"/go\0,\0\0\0");
    }

    #[test]
    fn payload_with_mixed_arguments() {
        let payload = OscMessage::new(addr("/cue/5/start"))
            .with_arg(1)
            .with_arg(1.0f32)
            .with_arg("ab")
            .encode_payload()
            .unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"/cue/5/start\0\0\0\0");
        expected.extend_from_slice(b",ifs\0\0\0\0");
        expected.extend_from_slice(&[0, 0, 0, 1]);
        expected.extend_from_slice(&[0x3F, 0x80, 0, 0]);
        expected.extend_from_slice(b"ab\0\0");
        assert_eq!(payload.as_ref(), expected.as_slice());
        assert_eq!(payload.len() % 4, 0);
    }

    #[test]
    fn zero_and_empty_string_are_sent() {
        let zero = OscMessage::new(addr("/cue/1/number"))
            .with_arg(0)
            .encode_payload()
            .unwrap();
        assert_eq!(&zero[16..20], b",i\0\0");
        assert_eq!(&zero[20..], &[0, 0, 0, 0]);

        let empty = OscMessage::new(addr("/cue/1/name"))
            .with_arg("")
            .encode_payload()
            .unwrap();
        assert!(empty.ends_with(b",s\0\0\0\0\0\0"));
    }

    #[test]
    fn build_frames_the_payload() {
        let message = OscMessage::new(addr("/cue/5/start")).with_arg(7);
        let frame = message.build().unwrap();

        assert_eq!(frame[0], END);
        assert_eq!(frame[frame.len() - 1], END);
        assert_eq!(
            decode_frame(&frame).unwrap(),
            message.encode_payload().unwrap()
        );
    }

    #[test]
    fn build_function_matches_builder() {
        let address = addr("/cue/2/colorName");
        let args = vec![Argument::from("red")];
        assert_eq!(
            build(&address, &args).unwrap(),
            OscMessage::new(address.clone()).with_arg("red").build().unwrap()
        );
    }

    #[test]
    fn build_is_deterministic() {
        let address = addr("/cue/3/notes");
        let args = vec![Argument::Int(4), Argument::Float(0.25), Argument::from("x")];
        assert_eq!(build(&address, &args).unwrap(), build(&address, &args).unwrap());
    }

    #[test]
    fn bad_string_argument_fails_before_framing() {
        let err = OscMessage::new(addr("/cue/1/name"))
            .with_arg("bad\0name")
            .build()
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidString(_)));
    }

    #[test]
    fn type_tags_follow_argument_order() {
        let message = OscMessage::new(addr("/x")).with_args([
            Argument::from("s"),
            Argument::from(1),
            Argument::from(2.0f32),
        ]);
        assert_eq!(message.type_tags(), ",sif");
    }
}
