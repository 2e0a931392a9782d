use ::hyper::http::HeaderName;
use ::hyper::http::HeaderValue;
use ::hyper::http::Method;
use ::hyper::http::Request as PlainRequest;

use crate::MockRequest;

///
/// Any request which can be sent through a `RestTestSupport`.
///
/// Processors only act on `HttpRequest::Mock`.
/// A `HttpRequest::Plain` is passed along untouched.
///
#[derive(Debug)]
pub enum HttpRequest {
    Mock(MockRequest),
    Plain(PlainRequest<String>),
}

impl HttpRequest {
    pub fn method(&self) -> &Method {
        match self {
            HttpRequest::Mock(request) => request.request_method(),
            HttpRequest::Plain(request) => request.method(),
        }
    }

    pub fn uri(&self) -> String {
        match self {
            HttpRequest::Mock(request) => request.request_uri().to_string(),
            HttpRequest::Plain(request) => request.uri().to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            HttpRequest::Mock(request) => request.header_value(name),
            HttpRequest::Plain(request) => request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok()),
        }
    }

    pub fn as_mock(&self) -> Option<&MockRequest> {
        match self {
            HttpRequest::Mock(request) => Some(request),
            HttpRequest::Plain(_) => None,
        }
    }

    pub fn into_mock(self) -> Option<MockRequest> {
        match self {
            HttpRequest::Mock(request) => Some(request),
            HttpRequest::Plain(_) => None,
        }
    }

    /// Applies the given function if this is a mock request.
    pub fn map_mock<F>(self, f: F) -> Self
    where
        F: FnOnce(MockRequest) -> MockRequest,
    {
        match self {
            HttpRequest::Mock(request) => HttpRequest::Mock(f(request)),
            plain => plain,
        }
    }

    /// Sets a header on either kind of request.
    ///
    /// Invalid header names or values are ignored on plain requests.
    pub fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            HttpRequest::Mock(request) => HttpRequest::Mock(request.header(name, value)),
            HttpRequest::Plain(mut request) => {
                if let (Ok(name), Ok(value)) = (
                    name.parse::<HeaderName>(),
                    HeaderValue::from_str(value),
                ) {
                    request.headers_mut().insert(name, value);
                }
                HttpRequest::Plain(request)
            }
        }
    }
}

impl From<MockRequest> for HttpRequest {
    fn from(request: MockRequest) -> Self {
        HttpRequest::Mock(request)
    }
}

impl From<PlainRequest<String>> for HttpRequest {
    fn from(request: PlainRequest<String>) -> Self {
        HttpRequest::Plain(request)
    }
}

#[cfg(test)]
mod test_with_header {
    use super::*;

    use crate::RestMockRequestBuilder;

    #[test]
    fn it_should_set_headers_on_mock_requests() {
        let request = HttpRequest::from(RestMockRequestBuilder::new().get("/"))
            .with_header("test", "processor");

        assert_eq!(request.header("test"), Some("processor"));
        assert_eq!(request.method(), &Method::GET);
    }

    #[test]
    fn it_should_set_headers_on_plain_requests() {
        let plain = PlainRequest::builder()
            .method(Method::POST)
            .uri("/plain")
            .body(String::new())
            .unwrap();
        let request = HttpRequest::from(plain).with_header("test", "processor");

        assert_eq!(request.header("test"), Some("processor"));
        assert_eq!(request.uri(), "/plain");
        assert!(request.as_mock().is_none());
    }

    #[test]
    fn it_should_only_map_mock_requests() {
        let plain = PlainRequest::builder().uri("/plain").body(String::new()).unwrap();
        let request = HttpRequest::from(plain).map_mock(|request| request.header("a", "b"));

        assert_eq!(request.header("a"), None);
    }
}
