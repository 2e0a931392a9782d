use ::anyhow::Context;
use ::anyhow::Result;
use ::cookie::Cookie;
use ::hyper::body::Bytes;
use ::hyper::http::header::SET_COOKIE;
use ::hyper::http::response::Parts;
use ::hyper::http::HeaderMap;
use ::hyper::http::HeaderName;
use ::hyper::http::HeaderValue;
use ::hyper::http::StatusCode;
use ::serde::de::DeserializeOwned;

///
/// The `Response` returned by a server, for a request sent to it.
///
/// It holds the status code, the headers, and the raw body.
/// Cookies are parsed lazily from the `Set-Cookie` headers.
///
#[derive(Debug, Clone)]
pub struct Response {
    request_uri: String,
    status_code: StatusCode,
    headers: HeaderMap<HeaderValue>,
    body: Bytes,
}

impl Response {
    /// An empty response with the given status code.
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            request_uri: String::new(),
            status_code,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(request_uri: String, parts: Parts, body: Bytes) -> Self {
        Self {
            request_uri,
            status_code: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// The URI of the request which produced this response.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.headers
    }

    /// Returns the first header with the given name, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserialises the body as JSON.
    ///
    /// This panics if the body is not valid JSON for `T`. See `Response::try_json`.
    pub fn json<T>(&self) -> T
    where
        T: DeserializeOwned,
    {
        self.try_json()
            .with_context(|| format!("Deserializing response from {}", self.request_uri))
            .unwrap()
    }

    pub fn try_json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = ::serde_json::from_slice::<T>(&self.body)?;
        Ok(value)
    }

    /// Every cookie set through a `Set-Cookie` header.
    ///
    /// Headers which cannot be parsed are skipped.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| {
                let parsed = header
                    .to_str()
                    .ok()
                    .and_then(|raw| Cookie::parse(raw.to_string()).ok());
                if parsed.is_none() {
                    ::tracing::warn!(?header, "Skipping unparsable Set-Cookie header");
                }
                parsed
            })
            .collect()
    }

    /// Finds the cookie with the given name.
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies()
            .into_iter()
            .find(|cookie| cookie.name() == name)
    }

    pub fn set_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Appends a header. Invalid values are ignored.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    /// Appends a `Set-Cookie` header for the cookie.
    pub fn add_cookie<'c>(self, cookie: Cookie<'c>) -> Self {
        let raw_cookie = cookie.to_string();
        self.with_header(SET_COOKIE, &raw_cookie)
    }

    pub fn with_body<B>(mut self, body: B) -> Self
    where
        B: Into<Bytes>,
    {
        self.body = body.into();
        self
    }
}
