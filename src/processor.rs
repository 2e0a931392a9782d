use ::std::fmt::Debug;

use crate::Error;
use crate::HttpRequest;
use crate::Response;

mod cookie_manager;
pub use self::cookie_manager::*;

mod complex_processor;
pub use self::complex_processor::*;

///
/// A hook run around every request sent by a `RestTestSupport`.
///
/// `process_request` runs before the request is sent,
/// and `process_response` runs on the response which came back.
/// This is used to carry state, such as a session cookie, from one request to the next.
///
pub trait RequestResponseProcessor: Debug + Send {
    fn process_request(&mut self, request: HttpRequest) -> HttpRequest;

    fn process_response(
        &mut self,
        request: &HttpRequest,
        response: Response,
    ) -> Result<Response, Error>;

    /// Clears anything remembered from previous requests.
    ///
    /// Stateless processors do nothing here.
    fn reset(&mut self);
}

/// Creates a fresh `RequestResponseProcessor` for each test.
pub trait RequestResponseProcessorFactory: Debug + Send + Sync {
    fn create(&self) -> Box<dyn RequestResponseProcessor>;
}

/// Passes requests and responses through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl RequestResponseProcessor for NoopProcessor {
    fn process_request(&mut self, request: HttpRequest) -> HttpRequest {
        request
    }

    fn process_response(
        &mut self,
        _request: &HttpRequest,
        response: Response,
    ) -> Result<Response, Error> {
        Ok(response)
    }

    fn reset(&mut self) {}
}

impl RequestResponseProcessorFactory for NoopProcessor {
    fn create(&self) -> Box<dyn RequestResponseProcessor> {
        Box::new(NoopProcessor)
    }
}
