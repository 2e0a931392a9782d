use ::std::io;
use ::thiserror::Error as ThisError;

/// Every failure raised while building, rendering, or post-processing a mock request.
///
/// The `Display` text of each variant is the exact diagnostic a failing test prints.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("content type must not be empty.")]
    EmptyContentType,

    #[error("media type must not be empty.")]
    EmptyMediaType,

    #[error("body cannot convert to String. cause[{message}].")]
    BodyConversion {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported media type requested. MIME type = [ {media_type} ]")]
    UnsupportedMediaType { media_type: String },

    #[error("set only one of paramMap or body.")]
    ParamsAndBody,

    #[error("url encoding failed. cause[{message}]")]
    UrlEncoding {
        message: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{fragment} must be name=value format.")]
    InvalidQueryFragment { fragment: String },

    #[error("there was no Content-Type header but body was not empty.")]
    MissingContentType,

    #[error("wrong Content-Length[{actual}] was set.correct length is [{expected}].")]
    WrongContentLength { actual: String, expected: usize },

    #[error("cookieName must be set.")]
    CookieNameNotSet,

    #[error("could not find component. name=[{key}].")]
    MissingComponent { key: String },

    #[error("couldn't find resource [{file_name}].")]
    ResourceNotFound { file_name: String },

    #[error("couldn't read resource [{file_name}]. cause [{source}].")]
    ResourceRead {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = Error> = ::std::result::Result<T, E>;
