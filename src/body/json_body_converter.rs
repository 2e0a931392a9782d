use ::serde::Serialize;
use ::serde_json::ser::CompactFormatter;
use ::serde_json::ser::Formatter;
use ::serde_json::Map;
use ::serde_json::Serializer;
use ::serde_json::Value;
use ::std::io;

use crate::BodyConverter;
use crate::Error;
use crate::MediaType;
use crate::RequestBody;

const JSON_MEDIA_TYPE: &'static str = &"application/json";

/// How object keys are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyNaming {
    /// Keys are written as they were serialised.
    #[default]
    AsDeclared,

    /// `propertyName` is written as `property_name`.
    ///
    /// Bodies are renamed after serialisation, so this applies to every
    /// object key, including the keys of maps held as data.
    SnakeCase,
}

/// Serialiser settings for the `JsonBodyConverter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Write anything outside of ASCII as `\uXXXX`.
    pub escape_non_ascii: bool,
    pub property_naming: PropertyNaming,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            escape_non_ascii: true,
            property_naming: PropertyNaming::AsDeclared,
        }
    }
}

///
/// Renders bodies as compact JSON, for the `application/json` media type.
///
/// It accepts any body. Text is written out as a JSON string,
/// so place a `StringBodyConverter` first if raw JSON text should pass through.
///
#[derive(Debug, Clone, Default)]
pub struct JsonBodyConverter {
    options: JsonOptions,
}

impl JsonBodyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> JsonOptions {
        self.options
    }

    fn write_json(&self, value: &Value) -> Result<String, serde_json::Error> {
        let mut bytes = Vec::new();
        if self.options.escape_non_ascii {
            let mut serializer = Serializer::with_formatter(&mut bytes, AsciiFormatter);
            value.serialize(&mut serializer)?;
        } else {
            let mut serializer = Serializer::new(&mut bytes);
            value.serialize(&mut serializer)?;
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl BodyConverter for JsonBodyConverter {
    fn is_convertible(&self, _body: &RequestBody, media_type: &MediaType) -> bool {
        media_type.as_str() == JSON_MEDIA_TYPE
    }

    fn convert(&self, body: &RequestBody, _media_type: &MediaType) -> Result<String, Error> {
        let value = match body {
            RequestBody::Text(text) => Value::String(text.clone()),
            RequestBody::Structured(value) => match self.options.property_naming {
                PropertyNaming::AsDeclared => value.clone(),
                PropertyNaming::SnakeCase => rename_keys(value, &to_snake_case),
            },
        };

        self.write_json(&value)
            .map_err(|source| Error::BodyConversion {
                message: source.to_string(),
                source,
            })
    }
}

/// A compact formatter which escapes every non-ASCII character.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return CompactFormatter.write_string_fragment(writer, fragment);
        }

        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                let mut ascii = [0u8; 1];
                writer.write_all(c.encode_utf8(&mut ascii).as_bytes())?;
                continue;
            }

            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04X}", unit)?;
            }
        }

        Ok(())
    }
}

fn rename_keys(value: &Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let renamed: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (rename(key), rename_keys(value, rename)))
                .collect();

            Value::Object(renamed)
        }
        Value::Array(values) => Value::Array(
            values
                .iter()
                .map(|value| rename_keys(value, rename))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn to_snake_case(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 4);
    let mut previous_is_lower = false;

    for c in key.chars() {
        if c.is_uppercase() {
            if previous_is_lower {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
            previous_is_lower = false;
        } else {
            snake.push(c);
            previous_is_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    snake
}
