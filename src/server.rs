use ::anyhow::Result;
use ::async_trait::async_trait;
use ::std::collections::HashMap;
use ::std::fmt;
use ::std::fmt::Debug;

use crate::HttpRequest;
use crate::Response;

mod hyper_server;
pub use self::hyper_server::*;

///
/// The server a `RestTestSupport` sends its requests to.
///
/// This is normally a `HyperServer`, which sends requests over HTTP
/// to your application. Use `server_fn` to answer requests in process.
///
#[async_trait]
pub trait HttpServer: Debug + Send + Sync {
    async fn handle(&self, request: &HttpRequest, context: &ExecutionContext) -> Result<Response>;
}

/// Creates the `HttpServer` used by a `RestTestSupport`.
pub trait HttpServerFactory: Debug + Send + Sync {
    fn create(&self) -> Result<Box<dyn HttpServer>>;
}

///
/// Values which live for a single request, handed to the server along with it.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    attributes: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// An in process `HttpServer`, which answers every request with the given function.
///
/// ```rust
/// use ::resttest::server_fn;
/// use ::resttest::Response;
/// use ::resttest::http::StatusCode;
///
/// let server = server_fn(|_request, _context| Response::new(StatusCode::NO_CONTENT));
/// ```
pub fn server_fn<F>(handler: F) -> FnServer<F>
where
    F: Fn(&HttpRequest, &ExecutionContext) -> Response + Send + Sync,
{
    FnServer { handler }
}

/// See `server_fn`.
pub struct FnServer<F> {
    handler: F,
}

impl<F> Debug for FnServer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnServer").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> HttpServer for FnServer<F>
where
    F: Fn(&HttpRequest, &ExecutionContext) -> Response + Send + Sync,
{
    async fn handle(&self, request: &HttpRequest, context: &ExecutionContext) -> Result<Response> {
        Ok((self.handler)(request, context))
    }
}
