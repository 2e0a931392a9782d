use ::hyper::http::Method;
use ::std::sync::Arc;

use crate::default_body_converters;
use crate::BodyConverter;
use crate::MockRequest;

const DEFAULT_CONTENT_TYPE: &'static str = &"application/json";

///
/// Creates `MockRequest`s which share the same body converters,
/// and the same default content type.
///
/// By default text bodies are passed through, structured bodies are written as JSON,
/// and `application/json` is used when a body is set without a content type.
///
/// ```rust
/// use ::resttest::RestMockRequestBuilder;
///
/// let builder = RestMockRequestBuilder::new()
///     .default_content_type(Some("text/plain"));
///
/// let text = builder
///     .put("/notes/1")
///     .text("hello")
///     .to_request_string()
///     .unwrap();
///
/// assert_eq!(
///     text,
///     "PUT /notes/1 HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
/// );
/// ```
///
#[derive(Debug, Clone)]
pub struct RestMockRequestBuilder {
    body_converters: Arc<Vec<Box<dyn BodyConverter>>>,
    default_content_type: Option<String>,
}

impl RestMockRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the converters. They are tried in the order given.
    pub fn body_converters(mut self, body_converters: Vec<Box<dyn BodyConverter>>) -> Self {
        self.body_converters = Arc::new(body_converters);
        self
    }

    /// The content type applied when a body is set without one.
    /// `None` turns this off.
    pub fn default_content_type(mut self, default_content_type: Option<&str>) -> Self {
        self.default_content_type = default_content_type.map(ToString::to_string);
        self
    }

    /// Creates a HTTP GET request to the path.
    pub fn get(&self, uri: &str) -> MockRequest {
        self.method(Method::GET, uri)
    }

    /// Creates a HTTP POST request to the given path.
    pub fn post(&self, uri: &str) -> MockRequest {
        self.method(Method::POST, uri)
    }

    /// Creates a HTTP PATCH request to the path.
    pub fn patch(&self, uri: &str) -> MockRequest {
        self.method(Method::PATCH, uri)
    }

    /// Creates a HTTP PUT request to the path.
    pub fn put(&self, uri: &str) -> MockRequest {
        self.method(Method::PUT, uri)
    }

    /// Creates a HTTP DELETE request to the path.
    pub fn delete(&self, uri: &str) -> MockRequest {
        self.method(Method::DELETE, uri)
    }

    /// Creates a HTTP request, to the path given, using the given method.
    pub fn method(&self, method: Method, uri: &str) -> MockRequest {
        MockRequest::new(
            self.body_converters.clone(),
            self.default_content_type.clone(),
        )
        .method(method)
        .uri(uri)
    }
}

impl Default for RestMockRequestBuilder {
    fn default() -> Self {
        Self {
            body_converters: Arc::new(default_body_converters()),
            default_content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
        }
    }
}
