use ::cookie::Cookie;
use ::cookie::CookieJar;
use ::hyper::http::Method;
use ::serde::Serialize;
use ::std::fmt::Display;
use ::std::sync::Arc;

use crate::BodyConverter;
use crate::Error;
use crate::RequestBody;

mod headers;
pub use self::headers::*;

mod rendered_request;
pub use self::rendered_request::*;

mod request_builder;
pub use self::request_builder::*;

mod http_request;
pub use self::http_request::*;

pub(crate) const CONTENT_TYPE: &'static str = &"Content-Type";
pub(crate) const CONTENT_LENGTH: &'static str = &"Content-Length";
pub(crate) const COOKIE: &'static str = &"Cookie";

pub(crate) const DEFAULT_HTTP_VERSION: &'static str = &"HTTP/1.1";

///
/// A `MockRequest` is a HTTP request under construction,
/// which is rendered to raw HTTP text when it is sent.
///
/// ## Creating
///
/// Requests are normally created by a `RestMockRequestBuilder`
/// (or the `RestTestSupport` that owns one).
/// The builder decides which `BodyConverter`s the request uses,
/// and which content type is applied when a body is set without one.
///
/// ```rust
/// use ::resttest::RestMockRequestBuilder;
///
/// let request = RestMockRequestBuilder::new()
///     .post("/users")
///     .text(r#"{"name":"Terrance"}"#);
///
/// assert_eq!(request.content_type_value(), Some("application/json"));
/// ```
///
/// ## Rendering
///
/// `MockRequest::render` validates the request and produces the final
/// request line, headers, and body. Rendering does not change the request,
/// and will give the same output each time.
///
/// ```text
/// POST /users HTTP/1.1\r\n
/// Content-Type: application/json\r\n
/// Content-Length: 19\r\n
/// \r\n
/// {"name":"Terrance"}
/// ```
///
/// A body and parameters cannot both be set. For a GET parameters become the
/// query string, for everything else they are sent as the body.
///
#[derive(Debug, Clone)]
pub struct MockRequest {
    body_converters: Arc<Vec<Box<dyn BodyConverter>>>,
    default_content_type: Option<String>,

    method: Method,
    request_uri: String,
    http_version: String,
    headers: Headers,
    cookies: CookieJar,
    params: Vec<(String, Vec<String>)>,
    body: Option<RequestBody>,
}

impl MockRequest {
    pub fn new(
        body_converters: Arc<Vec<Box<dyn BodyConverter>>>,
        default_content_type: Option<String>,
    ) -> Self {
        Self {
            body_converters,
            default_content_type,
            method: Method::GET,
            request_uri: "/".to_string(),
            http_version: DEFAULT_HTTP_VERSION.to_string(),
            headers: Headers::new(),
            cookies: CookieJar::new(),
            params: vec![],
            body: None,
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request URI. It may include a query string.
    pub fn uri(mut self, request_uri: &str) -> Self {
        self.request_uri = request_uri.to_string();
        self
    }

    /// Sets the version written on the request line, i.e. `HTTP/1.1`.
    pub fn http_version(mut self, http_version: &str) -> Self {
        self.http_version = http_version.to_string();
        self
    }

    /// Adds a header, replacing any existing header of the same name.
    pub fn header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all of the headers.
    pub fn replace_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the content type to use for this request in the header.
    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE, content_type)
    }

    /// Adds values for a parameter.
    ///
    /// Each value is sent as its own `name=value` pair,
    /// and calling this again with the same name adds more values.
    pub fn param<V>(mut self, name: &str, values: &[V]) -> Self
    where
        V: AsRef<str>,
    {
        let values = values.iter().map(|value| value.as_ref().to_string());
        match self.params.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing_values)) => existing_values.extend(values),
            None => self.params.push((name.to_string(), values.collect())),
        }

        self
    }

    /// Set the body, to be rendered by a `BodyConverter`.
    ///
    /// If there isn't a content type set, the default content type is used.
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<RequestBody>,
    {
        self.body = Some(body.into());

        if !self.headers.contains(CONTENT_TYPE) {
            if let Some(default_content_type) = self.default_content_type.clone() {
                self.headers.insert(CONTENT_TYPE, default_content_type);
            }
        }

        self
    }

    /// Set raw text as the body of the request.
    pub fn text<T>(self, raw_text: T) -> Self
    where
        T: Display,
    {
        self.body(RequestBody::Text(format!("{}", raw_text)))
    }

    /// Set the body to a value which is serialised when rendered.
    ///
    /// This panics if the value cannot be serialised. See `MockRequest::try_json`.
    pub fn json<J>(self, body: &J) -> Self
    where
        J: ?Sized + Serialize,
    {
        self.try_json(body)
            .expect("It should serialize the content into JSON")
    }

    /// Set the body to a value which is serialised when rendered.
    pub fn try_json<J>(self, body: &J) -> Result<Self, Error>
    where
        J: ?Sized + Serialize,
    {
        let body = RequestBody::structured(body)?;
        Ok(self.body(body))
    }

    /// Adds a Cookie to be sent with this request.
    pub fn add_cookie<'c>(mut self, cookie: Cookie<'c>) -> Self {
        self.cookies.add(cookie.into_owned());
        self
    }

    /// Clears all cookies used internally within this request.
    pub fn clear_cookies(mut self) -> Self {
        self.cookies = CookieJar::new();
        self
    }

    pub fn request_method(&self) -> &Method {
        &self.method
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn version(&self) -> &str {
        &self.http_version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_type_value(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)
    }

    pub fn request_body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn params(&self) -> &[(String, Vec<String>)] {
        &self.params
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// The cookies on this request, as the value of a `Cookie` header.
    ///
    /// Cookies are sorted by name. Returns `None` when there are no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        let mut pairs: Vec<(&str, &str)> = self
            .cookies
            .iter()
            .map(|cookie| (cookie.name(), cookie.value()))
            .collect();

        if pairs.is_empty() {
            return None;
        }

        pairs.sort();
        let cookie_header = pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<String>>()
            .join("; ");

        Some(cookie_header)
    }

    /// Validates the request, and builds the text that would be sent.
    pub fn render(&self) -> Result<RenderedRequest, Error> {
        RenderedRequest::render(self)
    }

    /// Renders the request as raw HTTP text.
    pub fn to_request_string(&self) -> Result<String, Error> {
        self.render().map(|rendered| rendered.to_string())
    }

    pub(crate) fn body_converters(&self) -> &[Box<dyn BodyConverter>] {
        &self.body_converters
    }
}




#[cfg(test)]
mod test_cookie_header {
    use super::*;

    use crate::default_body_converters;

    #[test]
    fn it_should_be_none_without_cookies() {
        let request = MockRequest::new(Arc::new(default_body_converters()), None);

        assert_eq!(request.cookie_header(), None);
    }

    #[test]
    fn it_should_join_cookies_sorted_by_name() {
        let request = MockRequest::new(Arc::new(default_body_converters()), None)
            .add_cookie(Cookie::new("b", "2"))
            .add_cookie(Cookie::new("a", "1"))
            .add_cookie(Cookie::new("b", "3"));

        assert_eq!(request.cookie_header(), Some("a=1; b=3".to_string()));
    }

    #[test]
    fn it_should_clear_cookies() {
        let request = MockRequest::new(Arc::new(default_body_converters()), None)
            .add_cookie(Cookie::new("a", "1"))
            .clear_cookies();

        assert_eq!(request.cookie_header(), None);
    }
}
