use ::cookie::Cookie;

use crate::Error;
use crate::HttpRequest;
use crate::RequestResponseProcessor;
use crate::RequestResponseProcessorFactory;
use crate::Response;

/// The cookie holding the application's session id.
pub const SESSION_ID_COOKIE_NAME: &'static str = &"NABLARCH_SID";

///
/// Carries a cookie from responses over to the following requests.
///
/// When a response sets the named cookie its value is remembered,
/// and every later mock request is sent with it. A response without
/// the cookie leaves the remembered value alone. Only `reset` clears it.
///
/// ```rust
/// use ::resttest::RequestResponseCookieManager;
///
/// let manager = RequestResponseCookieManager::new().cookie_name("JSESSIONID");
/// ```
///
#[derive(Debug, Clone, Default)]
pub struct RequestResponseCookieManager {
    cookie_name: Option<String>,
    cookie_value: Option<String>,
}

impl RequestResponseCookieManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the cookie to carry over.
    pub fn cookie_name(mut self, cookie_name: &str) -> Self {
        self.cookie_name = Some(cookie_name.to_string());
        self
    }

    /// The value remembered from the last response which had the cookie.
    pub fn cookie_value(&self) -> Option<&str> {
        self.cookie_value.as_deref()
    }
}

impl RequestResponseProcessor for RequestResponseCookieManager {
    fn process_request(&mut self, request: HttpRequest) -> HttpRequest {
        let (cookie_name, cookie_value) = match (&self.cookie_name, &self.cookie_value) {
            (Some(name), Some(value)) => (name.clone(), value.clone()),
            _ => return request,
        };

        request.map_mock(|request| {
            ::tracing::debug!("Set cookie: {} = {}", cookie_name, cookie_value);
            request.add_cookie(Cookie::new(cookie_name, cookie_value))
        })
    }

    fn process_response(
        &mut self,
        _request: &HttpRequest,
        response: Response,
    ) -> Result<Response, Error> {
        let cookie_name = self.cookie_name.as_deref().ok_or(Error::CookieNameNotSet)?;

        match response.cookie(cookie_name) {
            Some(cookie) => {
                ::tracing::debug!("Get cookie: {} = {}", cookie_name, cookie.value());
                self.cookie_value = Some(cookie.value().to_string());
            }
            None => {
                ::tracing::debug!("Set-Cookie header value does not contain {}.", cookie_name);
            }
        }

        Ok(response)
    }

    fn reset(&mut self) {
        self.cookie_value = None;
    }
}

impl RequestResponseProcessorFactory for RequestResponseCookieManager {
    fn create(&self) -> Box<dyn RequestResponseProcessor> {
        Box::new(Self {
            cookie_name: self.cookie_name.clone(),
            cookie_value: None,
        })
    }
}

///
/// Carries the session id cookie, `NABLARCH_SID`, across requests.
///
#[derive(Debug, Clone)]
pub struct SessionIdManager {
    inner: RequestResponseCookieManager,
}

impl SessionIdManager {
    pub fn new() -> Self {
        Self {
            inner: RequestResponseCookieManager::new().cookie_name(SESSION_ID_COOKIE_NAME),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.inner.cookie_value()
    }
}

impl Default for SessionIdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestResponseProcessor for SessionIdManager {
    fn process_request(&mut self, request: HttpRequest) -> HttpRequest {
        self.inner.process_request(request)
    }

    fn process_response(
        &mut self,
        request: &HttpRequest,
        response: Response,
    ) -> Result<Response, Error> {
        self.inner.process_response(request, response)
    }

    fn reset(&mut self) {
        self.inner.reset()
    }
}

impl RequestResponseProcessorFactory for SessionIdManager {
    fn create(&self) -> Box<dyn RequestResponseProcessor> {
        Box::new(SessionIdManager::new())
    }
}
