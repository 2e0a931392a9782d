use crate::BodyConverter;
use crate::Error;
use crate::MediaType;
use crate::RequestBody;

/// Passes text bodies through untouched, whatever the media type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringBodyConverter;

impl BodyConverter for StringBodyConverter {
    fn is_convertible(&self, body: &RequestBody, _media_type: &MediaType) -> bool {
        matches!(body, RequestBody::Text(_))
    }

    fn convert(&self, body: &RequestBody, media_type: &MediaType) -> Result<String, Error> {
        body.as_text()
            .map(ToString::to_string)
            .ok_or_else(|| Error::UnsupportedMediaType {
                media_type: media_type.to_string(),
            })
    }
}
