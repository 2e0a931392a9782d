use ::std::fmt;
use ::std::str::FromStr;

use crate::Error;

///
/// The MIME type part of a `Content-Type` header.
///
/// Anything after the first `;` (charset, boundary, etc) is dropped,
/// and the remainder is trimmed and lower cased. Two `MediaType`s are equal
/// when those normalised strings are equal.
///
/// ```rust
/// use ::resttest::MediaType;
///
/// let a = MediaType::new("TEXT/PLAIN").unwrap();
/// let b = MediaType::new(" text/plain; charset=utf-8").unwrap();
///
/// assert_eq!(a, b);
/// ```
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    media_type: String,
}

impl MediaType {
    pub fn new(content_type: &str) -> Result<Self, Error> {
        if content_type.is_empty() {
            return Err(Error::EmptyContentType);
        }

        let first_part = content_type.split(';').next().unwrap_or_default().trim();
        if first_part.is_empty() {
            return Err(Error::EmptyMediaType);
        }

        Ok(Self {
            media_type: first_part.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.media_type
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(content_type: &str) -> Result<Self, Self::Err> {
        Self::new(content_type)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)
    }
}
