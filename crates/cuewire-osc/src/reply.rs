use bytes::Bytes;
use cuewire_frame::{split_frames, PAD};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;

/// What one received buffer decoded to.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedReply {
    /// One frame: the JSON document that followed the address label.
    Value(Value),
    /// Several frames batched into one delivery, unframed but not parsed.
    Frames(Vec<Bytes>),
}

/// The fields the device puts in every JSON reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl DecodedReply {
    /// The structured value, if this was a single-frame reply.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Frames(_) => None,
        }
    }

    /// Consume into the structured value, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Frames(_) => None,
        }
    }

    /// The raw frame payloads, if this was a batched delivery.
    pub fn frames(&self) -> Option<&[Bytes]> {
        match self {
            Self::Value(_) => None,
            Self::Frames(frames) => Some(frames),
        }
    }

    /// True for the batched-frames shape.
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Frames(_))
    }

    /// The `"data"` member of a structured reply.
    pub fn data(&self) -> Option<&Value> {
        self.as_value()?.get("data")
    }

    /// The `"status"` member of a structured reply.
    pub fn status(&self) -> Option<&str> {
        self.as_value()?.get("status")?.as_str()
    }

    /// Deserialize the structured value into the common reply envelope.
    pub fn envelope(&self) -> Option<ReplyEnvelope> {
        serde_json::from_value(self.as_value()?.clone()).ok()
    }
}

/// Decode one stream delivery.
///
/// A buffer holding several frames yields [`DecodedReply::Frames`] without
/// further parsing; a single frame is parsed with [`parse_reply_payload`]
/// and its address label dropped.
pub fn decode_reply(buffer: &[u8]) -> Result<DecodedReply, DecodeError> {
    let mut frames = split_frames(buffer)?;
    if frames.len() > 1 {
        debug!(frames = frames.len(), "batched delivery left unparsed");
        return Ok(DecodedReply::Frames(frames));
    }

    let payload = frames.pop().ok_or(DecodeError::Frame(cuewire_frame::FrameError::Empty))?;
    let (_address, value) = parse_reply_payload(&payload)?;
    Ok(DecodedReply::Value(value))
}

/// Decode one notification datagram.
///
/// Datagrams are not SLIP-framed; only the trailing NUL padding is removed
/// before the payload is parsed.
pub fn decode_datagram(datagram: &[u8]) -> Result<DecodedReply, DecodeError> {
    let keep = datagram
        .iter()
        .rposition(|&b| b != PAD)
        .map_or(0, |last| last + 1);
    let (_address, value) = parse_reply_payload(&datagram[..keep])?;
    Ok(DecodedReply::Value(value))
}

/// Split an unframed reply into its address label and JSON value.
///
/// The label is everything before the first `{`; the value is everything
/// from it onward.
pub fn parse_reply_payload(payload: &[u8]) -> Result<(String, Value), DecodeError> {
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8 {
        raw: Bytes::copy_from_slice(payload),
    })?;

    let split = text.find('{').ok_or_else(|| DecodeError::MissingPayload {
        raw: Bytes::copy_from_slice(payload),
    })?;

    let (label, body) = text.split_at(split);
    let value = serde_json::from_str(body).map_err(|source| DecodeError::MalformedPayload {
        raw: Bytes::copy_from_slice(payload),
        source,
    })?;

    Ok((label.to_string(), value))
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use cuewire_frame::{encode, encode_frame, FrameError, END};
    use serde_json::json;

    use super::*;

    #[test]
    fn single_frame_decodes_to_value() {
        let wire = encode(br#"/cue/1/number{"data":"5"}"#);
        let reply = decode_reply(&wire).unwrap();
        assert_eq!(reply, DecodedReply::Value(json!({"data": "5"})));
        assert_eq!(reply.data(), Some(&json!("5")));
    }

    #[test]
    fn literal_reply_bytes_decode() {
        let mut wire = vec![END];
        wire.extend_from_slice(br#"/cue/1/number{"data":"5"}"#);
        wire.push(END);
        let reply = decode_reply(&wire).unwrap();
        assert_eq!(reply.as_value(), Some(&json!({"data": "5"})));
        assert!(!reply.is_batch());
    }

    #[test]
    fn full_device_reply_envelope() {
        let body = br#"/reply/cue/1/number{"workspace_id":"W1","address":"/cue/1/number","status":"ok","data":"1"}"#;
        let reply = decode_reply(&encode(body)).unwrap();

        assert_eq!(reply.status(), Some("ok"));
        let envelope = reply.envelope().unwrap();
        assert_eq!(envelope.workspace_id.as_deref(), Some("W1"));
        assert_eq!(envelope.address.as_deref(), Some("/cue/1/number"));
        assert_eq!(envelope.data, Some(json!("1")));
    }

    #[test]
    fn osc_tag_bytes_before_brace_are_discarded() {
        let body = b"/reply/cueLists\0,s\0\0{\"status\":\"ok\",\"data\":[]}";
        let reply = decode_reply(&encode(body)).unwrap();
        assert_eq!(reply.data(), Some(&json!([])));
    }

    #[test]
    fn batched_frames_are_returned_raw() {
        let mut wire = BytesMut::new();
        encode_frame(br#"/a{"data":1}"#, &mut wire);
        encode_frame(br#"/b{"data":2}"#, &mut wire);

        let reply = decode_reply(&wire).unwrap();
        let frames = reply.frames().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), br#"/a{"data":1}"#);
        assert_eq!(frames[1].as_ref(), br#"/b{"data":2}"#);
        assert!(reply.as_value().is_none());
        assert!(reply.data().is_none());
    }

    #[test]
    fn parse_keeps_address_label() {
        let (label, value) = parse_reply_payload(br#"/cue/1/number{"data":"5"}"#).unwrap();
        assert_eq!(label, "/cue/1/number");
        assert_eq!(value, json!({"data": "5"}));
    }

    #[test]
    fn missing_brace_is_error() {
        let err = decode_reply(&encode(b"/reply/go")).unwrap_err();
        assert!(matches!(err, DecodeError::MissingPayload { .. }));
        assert_eq!(err.raw().unwrap().as_ref(), b"/reply/go");
    }

    #[test]
    fn invalid_utf8_is_error() {
        let err = decode_reply(&encode(&[b'/', 0xFF, b'{', b'}'])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8 { .. }));
        assert_eq!(err.raw().unwrap().as_ref(), &[b'/', 0xFF, b'{', b'}']);
    }

    #[test]
    fn malformed_json_is_error() {
        let err = decode_reply(&encode(br#"/cue{"data":"#)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { .. }));
        assert!(err.raw().is_some());
    }

    #[test]
    fn frame_errors_propagate() {
        let err = decode_reply(&[END, END]).unwrap_err();
        assert!(matches!(err, DecodeError::Frame(FrameError::Empty)));
    }

    #[test]
    fn datagram_decodes_without_unescaping() {
        let datagram = b"/reply/cue/1/name\0\0\0,s\0\0{\"status\":\"ok\",\"data\":\"Intro\"}\0\0";
        let reply = decode_datagram(datagram).unwrap();
        assert_eq!(reply.data(), Some(&json!("Intro")));
    }
}
