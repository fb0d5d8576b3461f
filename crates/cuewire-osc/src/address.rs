use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;

/// A `/`-separated OSC address such as `/cue/5/start`.
///
/// Segments are opaque to this crate; only their shape is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// Parse a path. The leading `/` is optional.
    pub fn parse(path: &str) -> Result<Self, EncodeError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(EncodeError::EmptyAddress);
        }
        Self::from_segments(trimmed.split('/'))
    }

    /// Build an address from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(EncodeError::EmptyAddress);
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// The ordered path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The wire form, with a leading `/`.
    pub fn path(&self) -> String {
        let mut out = String::with_capacity(self.segments.iter().map(|s| s.len() + 1).sum());
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }

    /// Append one segment.
    pub fn join(&self, segment: impl Into<String>) -> Result<Self, EncodeError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }
}

fn validate_segment(segment: &str) -> Result<(), EncodeError> {
    let reason = if segment.is_empty() {
        "segment is empty"
    } else if segment.contains('/') {
        "segment contains '/'"
    } else if segment.contains('\0') {
        "segment contains NUL"
    } else {
        return Ok(());
    };
    Err(EncodeError::InvalidSegment {
        segment: segment.to_string(),
        reason,
    })
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_and_without_leading_slash() {
        let a = Address::parse("/cue/5/start").unwrap();
        let b = Address::parse("cue/5/start").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.segments(), &["cue", "5", "start"]);
        assert_eq!(a.path(), "/cue/5/start");
        assert_eq!(a.to_string(), "/cue/5/start");
    }

    #[test]
    fn from_segments_matches_parse() {
        let a = Address::from_segments(["select", "next"]).unwrap();
        assert_eq!(a, "/select/next".parse().unwrap());
    }

    #[test]
    fn rejects_empty_address() {
        assert!(matches!(Address::parse(""), Err(EncodeError::EmptyAddress)));
        assert!(matches!(Address::parse("/"), Err(EncodeError::EmptyAddress)));
        assert!(matches!(
            Address::from_segments(Vec::<String>::new()),
            Err(EncodeError::EmptyAddress)
        ));
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(matches!(
            Address::parse("/cue//start"),
            Err(EncodeError::InvalidSegment { .. })
        ));
        assert!(matches!(
            Address::parse("/cue/5/"),
            Err(EncodeError::InvalidSegment { .. })
        ));
        assert!(matches!(
            Address::from_segments(["cue", "a/b"]),
            Err(EncodeError::InvalidSegment { .. })
        ));
        assert!(matches!(
            Address::from_segments(["cue\0"]),
            Err(EncodeError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn join_appends_segment() {
        let cue = Address::parse("/cue/12").unwrap();
        assert_eq!(cue.join("number").unwrap().path(), "/cue/12/number");
        assert!(cue.join("").is_err());
    }
}
