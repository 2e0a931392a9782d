use ::anyhow::bail;
use ::anyhow::Context;
use ::anyhow::Result;
use ::async_trait::async_trait;
use ::hyper::body::to_bytes;
use ::hyper::body::Body;
use ::hyper::client::HttpConnector;
use ::hyper::header::HeaderName;
use ::hyper::http::HeaderValue;
use ::hyper::http::Request as HyperRequest;
use ::hyper::http::Uri;
use ::hyper::http::Version;
use ::hyper::Client;
use ::hyper_tls::HttpsConnector;

use crate::has_scheme;
use crate::ExecutionContext;
use crate::HttpRequest;
use crate::HttpServer;
use crate::HttpServerFactory;
use crate::Response;

///
/// A `HttpServer` which sends each request over HTTP to a running application.
///
/// Mock requests are rendered first, so the application receives exactly
/// the method, URI, headers, and body `MockRequest::render` produced.
/// Relative URIs are sent to the server address given.
///
#[derive(Debug, Clone)]
pub struct HyperServer {
    server_address: String,
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl HyperServer {
    /// Creates a server sending requests to the given address, i.e. `http://127.0.0.1:3000`.
    pub fn new(server_address: String) -> Result<Self> {
        if server_address.is_empty() {
            bail!("The server address must not be empty");
        }

        let https = HttpsConnector::new();
        let client = Client::builder().build::<_, Body>(https);

        Ok(Self {
            server_address,
            client,
        })
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    fn build_hyper_request(&self, request: &HttpRequest) -> Result<HyperRequest<Body>> {
        match request {
            HttpRequest::Mock(mock_request) => {
                let rendered = mock_request.render()?;
                let request_path = build_request_path(&self.server_address, rendered.uri())?;
                let mut request_builder = HyperRequest::builder()
                    .method(rendered.method().clone())
                    .uri(request_path)
                    .version(parse_version(rendered.http_version())?);

                for (name, value) in rendered.headers().iter() {
                    let header_name = HeaderName::from_bytes(name.as_bytes())
                        .with_context(|| format!("Invalid header name '{}'", name))?;
                    let header_value = HeaderValue::from_str(value)
                        .with_context(|| format!("Invalid value for header '{}'", name))?;
                    request_builder = request_builder.header(header_name, header_value);
                }

                let body = Body::from(rendered.body().to_string());
                request_builder.body(body).with_context(|| {
                    format!(
                        "Expect valid hyper Request to be built on request to {}",
                        rendered.uri()
                    )
                })
            }
            HttpRequest::Plain(plain_request) => {
                let request_path =
                    build_request_path(&self.server_address, &plain_request.uri().to_string())?;
                let mut request_builder = HyperRequest::builder()
                    .method(plain_request.method().clone())
                    .uri(request_path)
                    .version(plain_request.version());

                for (header_name, header_value) in plain_request.headers() {
                    request_builder = request_builder.header(header_name, header_value);
                }

                let body = Body::from(plain_request.body().clone());
                request_builder.body(body).with_context(|| {
                    format!(
                        "Expect valid hyper Request to be built on request to {}",
                        plain_request.uri()
                    )
                })
            }
        }
    }
}

#[async_trait]
impl HttpServer for HyperServer {
    async fn handle(&self, request: &HttpRequest, _context: &ExecutionContext) -> Result<Response> {
        let hyper_request = self.build_hyper_request(request)?;
        let request_path = hyper_request.uri().to_string();

        ::tracing::debug!(method = %hyper_request.method(), uri = %request_path, "Sending request");
        let hyper_response = self
            .client
            .request(hyper_request)
            .await
            .with_context(|| {
                format!(
                    "Expect Hyper Response to succeed on request to {}",
                    request_path
                )
            })?;

        let (parts, response_body) = hyper_response.into_parts();
        let response_bytes = to_bytes(response_body).await?;

        Ok(Response::from_parts(request_path, parts, response_bytes))
    }
}

/// Creates `HyperServer`s for a fixed address.
#[derive(Debug, Clone)]
pub struct HyperServerFactory {
    server_address: String,
}

impl HyperServerFactory {
    pub fn new(server_address: &str) -> Self {
        Self {
            server_address: server_address.to_string(),
        }
    }
}

impl HttpServerFactory for HyperServerFactory {
    fn create(&self) -> Result<Box<dyn HttpServer>> {
        let server = HyperServer::new(self.server_address.clone())?;
        Ok(Box::new(server))
    }
}

fn build_request_path(root: &str, sub_path: &str) -> Result<Uri> {
    if has_scheme(sub_path) {
        return Ok(sub_path.try_into()?);
    }

    let root = root.trim_end_matches('/');
    if sub_path.is_empty() {
        return Ok(root.try_into()?);
    }

    if sub_path.starts_with("/") {
        let full_path = format!("{}{}", root, sub_path).try_into()?;
        return Ok(full_path);
    }

    let full_path = format!("{}/{}", root, sub_path).try_into()?;
    Ok(full_path)
}

fn parse_version(http_version: &str) -> Result<Version> {
    match http_version {
        "HTTP/1.0" => Ok(Version::HTTP_10),
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/2" | "HTTP/2.0" => Ok(Version::HTTP_2),
        other => bail!("Unsupported HTTP version '{}'", other),
    }
}


#[cfg(test)]
mod test_build_hyper_request {
    use super::*;

    use ::hyper::http::Method;

    use crate::RestMockRequestBuilder;

    #[tokio::test]
    async fn it_should_send_the_rendered_request() {
        let server = HyperServer::new("http://127.0.0.1:3000".to_string()).unwrap();
        let request = HttpRequest::from(
            RestMockRequestBuilder::new()
                .post("/users")
                .text(r#"{"name":"テスト"}"#),
        );

        let hyper_request = server.build_hyper_request(&request).unwrap();

        assert_eq!(hyper_request.method(), Method::POST);
        assert_eq!(hyper_request.uri(), "http://127.0.0.1:3000/users");
        assert_eq!(
            hyper_request.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(hyper_request.headers().get("content-length").unwrap(), "20");

        let body = to_bytes(hyper_request.into_body()).await.unwrap();
        assert_eq!(&body[..], r#"{"name":"テスト"}"#.as_bytes());
    }

    #[test]
    fn it_should_fail_on_invalid_mock_requests() {
        let server = HyperServer::new("http://127.0.0.1:3000".to_string()).unwrap();
        let request = HttpRequest::from(RestMockRequestBuilder::new().get("/test?name"));

        let err = server.build_hyper_request(&request).unwrap_err();

        assert_eq!(err.to_string(), "name must be name=value format.");
    }

    #[test]
    fn it_should_fail_on_unknown_versions() {
        let server = HyperServer::new("http://127.0.0.1:3000".to_string()).unwrap();
        let request =
            HttpRequest::from(RestMockRequestBuilder::new().get("/").http_version("HTTP/9"));

        let err = server.build_hyper_request(&request).unwrap_err();

        assert_eq!(err.to_string(), "Unsupported HTTP version 'HTTP/9'");
    }

    #[test]
    fn it_should_not_accept_an_empty_address() {
        assert!(HyperServer::new(String::new()).is_err());
    }
}
