use ::serde::Serialize;
use ::serde_json::Value;
use ::std::fmt::Debug;

use crate::Error;
use crate::MediaType;

mod string_body_converter;
pub use self::string_body_converter::*;

mod json_body_converter;
pub use self::json_body_converter::*;

///
/// The body attached to a `MockRequest`, before it is rendered to text.
///
/// Bodies are either raw text, or a structured value which a
/// `BodyConverter` will serialise.
///
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Structured(Value),
}

impl RequestBody {
    /// Builds a structured body from anything Serde can serialise.
    pub fn structured<S>(body: &S) -> Result<Self, Error>
    where
        S: ?Sized + Serialize,
    {
        ::serde_json::to_value(body)
            .map(RequestBody::Structured)
            .map_err(|source| Error::BodyConversion {
                message: source.to_string(),
                source,
            })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestBody::Text(text) => Some(text),
            RequestBody::Structured(_) => None,
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Structured(value)
    }
}

///
/// Turns a `RequestBody` into the text sent on the wire.
///
/// A request holds an ordered list of converters,
/// and the first one where `is_convertible` returns true is used.
///
pub trait BodyConverter: Debug + Send + Sync {
    fn is_convertible(&self, body: &RequestBody, media_type: &MediaType) -> bool;

    fn convert(&self, body: &RequestBody, media_type: &MediaType) -> Result<String, Error>;
}

/// Finds the first converter able to render the body as the given media type.
pub fn find_body_converter<'a>(
    converters: &'a [Box<dyn BodyConverter>],
    body: &RequestBody,
    media_type: &MediaType,
) -> Result<&'a dyn BodyConverter, Error> {
    converters
        .iter()
        .find(|converter| converter.is_convertible(body, media_type))
        .map(|converter| converter.as_ref())
        .ok_or_else(|| Error::UnsupportedMediaType {
            media_type: media_type.to_string(),
        })
}

/// The converters used when none are configured: text first, then JSON.
pub fn default_body_converters() -> Vec<Box<dyn BodyConverter>> {
    vec![
        Box::new(StringBodyConverter),
        Box::new(JsonBodyConverter::new()),
    ]
}
