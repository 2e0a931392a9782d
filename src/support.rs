use ::anyhow::Context;
use ::anyhow::Result;
use ::hyper::http::Method;
use ::hyper::http::StatusCode;
use ::std::fs;
use ::std::sync::Arc;

use crate::Error;
use crate::ExecutionContext;
use crate::HttpRequest;
use crate::HttpServer;
use crate::HttpServerFactory;
use crate::HyperServer;
use crate::MockRequest;
use crate::NoopProcessor;
use crate::RequestResponseProcessor;
use crate::RequestResponseProcessorFactory;
use crate::Response;
use crate::RestMockRequestBuilder;

mod config;
pub use self::config::*;

mod registry;
pub use self::registry::*;

mod logging;
pub use self::logging::*;

///
/// The entry point for a test. It builds requests, sends them to a server,
/// and runs the default processor around each one.
///
/// Call `set_up` at the start of each test, so nothing remembered
/// by the processor (like a session cookie) leaks between tests.
///
/// ```rust
/// # ::tokio_test::block_on(async {
/// use ::resttest::http::StatusCode;
/// use ::resttest::server_fn;
/// use ::resttest::Response;
/// use ::resttest::RestTestConfig;
/// use ::resttest::RestTestSupport;
///
/// let server = server_fn(|_request, _context| Response::new(StatusCode::OK).with_body("pong!"));
/// let mut support = RestTestSupport::new(RestTestConfig::default(), server);
/// support.set_up();
///
/// let request = support.get("/ping");
/// let response = support.send_request(request).await;
///
/// support.assert_status_code("ping", StatusCode::OK, &response);
/// assert_eq!(response.text(), "pong!");
/// # })
/// ```
///
#[derive(Debug)]
pub struct RestTestSupport {
    config: RestTestConfig,
    server: Arc<dyn HttpServer>,
    request_builder: RestMockRequestBuilder,
    processor_factory: Arc<dyn RequestResponseProcessorFactory>,
    default_processor: Box<dyn RequestResponseProcessor>,
}

impl RestTestSupport {
    /// Creates a support sending requests to the server given.
    /// No processor is used until one is set with `with_processor_factory`.
    pub fn new<S>(config: RestTestConfig, server: S) -> Self
    where
        S: HttpServer + 'static,
    {
        Self::from_parts(config, Arc::new(server), None, None)
    }

    /// Creates a support which sends requests over HTTP to `config.server_address`.
    pub fn connect(config: RestTestConfig) -> Result<Self> {
        let server = HyperServer::new(config.server_address.clone())
            .with_context(|| format!("Connecting to {}", config.server_address))?;

        Ok(Self::new(config, server))
    }

    ///
    /// Assembles a support from the components in the registry.
    ///
    /// The configuration and the server factory must be present.
    /// The request builder and the processor factory are optional.
    ///
    pub fn from_registry(registry: &ComponentRegistry) -> Result<Self> {
        let config = registry.get::<RestTestConfig>(REST_TEST_CONFIGURATION_KEY)?;
        let server_factory = registry.get::<Arc<dyn HttpServerFactory>>(HTTP_SERVER_FACTORY_KEY)?;
        let request_builder = registry
            .find::<RestMockRequestBuilder>(HTTP_REQUEST_BUILDER_KEY)
            .map(|builder| builder.as_ref().clone());
        let processor_factory = registry
            .find::<Arc<dyn RequestResponseProcessorFactory>>(PROCESSOR_FACTORY_KEY)
            .map(|factory| factory.as_ref().clone());

        let server = server_factory
            .create()
            .context("Creating the HttpServer from the registry")?;

        Ok(Self::from_parts(
            config.as_ref().clone(),
            Arc::from(server),
            request_builder,
            processor_factory,
        ))
    }

    fn from_parts(
        config: RestTestConfig,
        server: Arc<dyn HttpServer>,
        request_builder: Option<RestMockRequestBuilder>,
        processor_factory: Option<Arc<dyn RequestResponseProcessorFactory>>,
    ) -> Self {
        let request_builder = request_builder.unwrap_or_else(|| {
            RestMockRequestBuilder::new()
                .default_content_type(config.default_content_type.as_deref())
        });
        let processor_factory = processor_factory.unwrap_or_else(|| Arc::new(NoopProcessor));
        let default_processor = processor_factory.create();

        Self {
            config,
            server,
            request_builder,
            processor_factory,
            default_processor,
        }
    }

    /// Sets the factory the default processor is created from.
    pub fn with_processor_factory<F>(mut self, processor_factory: F) -> Self
    where
        F: RequestResponseProcessorFactory + 'static,
    {
        self.processor_factory = Arc::new(processor_factory);
        self.default_processor = self.processor_factory.create();
        self
    }

    pub fn with_request_builder(mut self, request_builder: RestMockRequestBuilder) -> Self {
        self.request_builder = request_builder;
        self
    }

    /// Prepares for a new test, replacing the default processor with a fresh one.
    pub fn set_up(&mut self) {
        init_logging();

        self.default_processor = self.processor_factory.create();
        ::tracing::debug!(processor = ?self.default_processor, "Set up default processor");
    }

    pub fn config(&self) -> &RestTestConfig {
        &self.config
    }

    pub fn request_builder(&self) -> &RestMockRequestBuilder {
        &self.request_builder
    }

    /// Creates a HTTP GET request to the path.
    pub fn get(&self, uri: &str) -> MockRequest {
        self.method(Method::GET, uri)
    }

    /// Creates a HTTP POST request to the given path.
    pub fn post(&self, uri: &str) -> MockRequest {
        self.method(Method::POST, uri)
    }

    /// Creates a HTTP PUT request to the path.
    pub fn put(&self, uri: &str) -> MockRequest {
        self.method(Method::PUT, uri)
    }

    /// Creates a HTTP PATCH request to the path.
    pub fn patch(&self, uri: &str) -> MockRequest {
        self.method(Method::PATCH, uri)
    }

    /// Creates a HTTP DELETE request to the path.
    pub fn delete(&self, uri: &str) -> MockRequest {
        self.method(Method::DELETE, uri)
    }

    /// Creates a HTTP request, to the path given, using the given method.
    pub fn method(&self, method: Method, uri: &str) -> MockRequest {
        self.request_builder
            .method(method, uri)
            .http_version(&self.config.http_version)
    }

    /// Sends the request through the default processor.
    ///
    /// This will panic if the request cannot be sent. See `RestTestSupport::try_send_request`.
    pub async fn send_request<R>(&mut self, request: R) -> Response
    where
        R: Into<HttpRequest>,
    {
        let request = request.into();
        let request_uri = request.uri();

        self.try_send_request(request)
            .await
            .with_context(|| format!("Sending request to {}", request_uri))
            .unwrap()
    }

    pub async fn try_send_request<R>(&mut self, request: R) -> Result<Response>
    where
        R: Into<HttpRequest>,
    {
        self.try_send_request_with_context(request, &ExecutionContext::new())
            .await
    }

    pub async fn send_request_with_context<R>(
        &mut self,
        request: R,
        context: &ExecutionContext,
    ) -> Response
    where
        R: Into<HttpRequest>,
    {
        let request = request.into();
        let request_uri = request.uri();

        self.try_send_request_with_context(request, context)
            .await
            .with_context(|| format!("Sending request to {}", request_uri))
            .unwrap()
    }

    pub async fn try_send_request_with_context<R>(
        &mut self,
        request: R,
        context: &ExecutionContext,
    ) -> Result<Response>
    where
        R: Into<HttpRequest>,
    {
        dispatch(
            self.server.as_ref(),
            self.default_processor.as_mut(),
            request.into(),
            context,
        )
        .await
    }

    /// Sends the request through the processor given, instead of the default one.
    ///
    /// This will panic if the request cannot be sent.
    pub async fn send_request_with<R>(
        &self,
        request: R,
        processor: &mut dyn RequestResponseProcessor,
    ) -> Response
    where
        R: Into<HttpRequest>,
    {
        let request = request.into();
        let request_uri = request.uri();

        dispatch(
            self.server.as_ref(),
            processor,
            request,
            &ExecutionContext::new(),
        )
        .await
        .with_context(|| format!("Sending request to {}", request_uri))
        .unwrap()
    }

    /// Panics with `<message> [HTTP STATUS]` if the response has a different status code.
    pub fn assert_status_code(&self, message: &str, expected: StatusCode, response: &Response) {
        assert_eq!(
            response.status_code(),
            expected,
            "{} [HTTP STATUS]",
            message
        );
    }

    /// Reads the UTF-8 file at `<resource_dir>/<test_name>/<file_name>`.
    pub fn read_text_resource(&self, test_name: &str, file_name: &str) -> Result<String, Error> {
        let path = self.config.resource_dir.join(test_name).join(file_name);
        if !path.is_file() {
            return Err(Error::ResourceNotFound {
                file_name: file_name.to_string(),
            });
        }

        fs::read_to_string(&path).map_err(|source| Error::ResourceRead {
            file_name: file_name.to_string(),
            source,
        })
    }
}

async fn dispatch(
    server: &dyn HttpServer,
    processor: &mut dyn RequestResponseProcessor,
    request: HttpRequest,
    context: &ExecutionContext,
) -> Result<Response> {
    let request = processor.process_request(request);
    let response = server.handle(&request, context).await?;
    let response = processor.process_response(&request, response)?;

    Ok(response)
}


#[cfg(test)]
mod test_from_registry {
    use super::*;

    use crate::HyperServerFactory;
    use crate::SessionIdManager;

    #[test]
    fn it_should_build_from_registered_components() {
        let config = RestTestConfig {
            http_version: "HTTP/2".to_string(),
            ..RestTestConfig::default()
        };
        let registry = ComponentRegistry::new()
            .register(REST_TEST_CONFIGURATION_KEY, config.clone())
            .register_server_factory(HyperServerFactory::new("http://127.0.0.1:3000"))
            .register_processor_factory(SessionIdManager::new());

        let support = RestTestSupport::from_registry(&registry).unwrap();

        assert_eq!(support.config(), &config);
        assert_eq!(support.get("/").version(), "HTTP/2");
    }

    #[test]
    fn it_should_use_the_registered_request_builder() {
        let registry = ComponentRegistry::new()
            .register(REST_TEST_CONFIGURATION_KEY, RestTestConfig::default())
            .register(
                HTTP_REQUEST_BUILDER_KEY,
                RestMockRequestBuilder::new().default_content_type(Some("text/plain")),
            )
            .register_server_factory(HyperServerFactory::new("http://127.0.0.1:3000"));

        let support = RestTestSupport::from_registry(&registry).unwrap();
        let request = support.post("/").text("hello");

        assert_eq!(request.content_type_value(), Some("text/plain"));
    }

    #[test]
    fn it_should_fail_without_a_configuration() {
        let registry = ComponentRegistry::new()
            .register_server_factory(HyperServerFactory::new("http://127.0.0.1:3000"));

        let err = RestTestSupport::from_registry(&registry).unwrap_err();

        assert_eq!(
            err.to_string(),
            "could not find component. name=[restTestConfiguration]."
        );
    }

    #[test]
    fn it_should_fail_without_a_server_factory() {
        let registry = ComponentRegistry::new()
            .register(REST_TEST_CONFIGURATION_KEY, RestTestConfig::default());

        let err = RestTestSupport::from_registry(&registry).unwrap_err();

        assert_eq!(
            err.to_string(),
            "could not find component. name=[httpServerFactory]."
        );
    }
}

#[cfg(test)]
mod test_assert_status_code {
    use super::*;

    use crate::server_fn;

    fn new_support() -> RestTestSupport {
        let server = server_fn(|_request, _context| Response::new(StatusCode::OK));
        RestTestSupport::new(RestTestConfig::default(), server)
    }

    #[test]
    fn it_should_pass_on_a_matching_status() {
        let response = Response::new(StatusCode::CREATED);

        new_support().assert_status_code("create user", StatusCode::CREATED, &response);
    }

    #[test]
    #[should_panic(expected = "create user [HTTP STATUS]")]
    fn it_should_panic_on_a_different_status() {
        let response = Response::new(StatusCode::BAD_REQUEST);

        new_support().assert_status_code("create user", StatusCode::CREATED, &response);
    }
}
