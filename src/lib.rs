//!
//! Resttest is a library for testing REST applications.
//!
//!  * Build mock requests with a method, a URI, headers, params, and a body.
//!  * Render them as the raw HTTP text which is sent.
//!  * Send them to your application, through processors which can carry
//!    things like a session cookie from one request to the next.
//!  * Assert that the response works how you expect.
//!
//! ## Getting Started
//!
//! Create a `RestTestSupport` pointing at your server,
//! and then make requests against it.
//!
//! ```rust
//! # ::tokio_test::block_on(async {
//! use ::resttest::http::StatusCode;
//! use ::resttest::server_fn;
//! use ::resttest::Response;
//! use ::resttest::RestTestConfig;
//! use ::resttest::RestTestSupport;
//! use ::serde_json::json;
//!
//! let server = server_fn(|_request, _context| Response::new(StatusCode::CREATED));
//! let mut support = RestTestSupport::new(RestTestConfig::default(), server);
//! support.set_up();
//!
//! let request = support.post("/users").json(&json!({
//!     "username": "Terrance Pencilworth",
//! }));
//! let response = support.send_request(request).await;
//!
//! support.assert_status_code("create user", StatusCode::CREATED, &response);
//! # })
//! ```
//!
//! Use `RestTestSupport::connect` to send requests over HTTP,
//! to an application running at `RestTestConfig::server_address`.
//!
//! ## Features
//!
//! ### Raw Requests 📜
//!
//! Every `MockRequest` can be rendered into the text sent over the wire.
//! The path and query are URL encoded as UTF-8, and a `Content-Length` is added for the body.
//!
//! ```rust
//! use ::resttest::RestMockRequestBuilder;
//!
//! let text = RestMockRequestBuilder::new()
//!     .get("/users?name=テスト")
//!     .to_request_string()
//!     .unwrap();
//!
//! assert_eq!(text, "GET /users?name=%E3%83%86%E3%82%B9%E3%83%88 HTTP/1.1\r\n\r\n");
//! ```
//!
//! ### Session Cookies 🍪
//!
//! Processors run around every request. A `SessionIdManager` remembers the
//! session id cookie a response sets, and sends it on each request afterwards.
//!
//! ```rust
//! use ::resttest::server_fn;
//! use ::resttest::http::StatusCode;
//! use ::resttest::Response;
//! use ::resttest::RestTestConfig;
//! use ::resttest::RestTestSupport;
//! use ::resttest::SessionIdManager;
//!
//! let server = server_fn(|_request, _context| Response::new(StatusCode::OK));
//! let support = RestTestSupport::new(RestTestConfig::default(), server)
//!     .with_processor_factory(SessionIdManager::new());
//! ```
//!
//! The processor is replaced with a new one on `RestTestSupport::set_up`,
//! so sessions are not shared between tests.
//!
//! ### Content Type 📇
//!
//! When a body is set without a content type, `application/json` is used.
//! This can be changed through `RestTestConfig::default_content_type`.
//!
//! Text bodies are sent as is. Structured bodies are written as JSON,
//! with non-ASCII characters escaped.
//!
//! ### Fail Fast
//!
//! This library is written to panic quickly. For example `RestTestSupport::send_request`
//! will panic if the request cannot be sent, and `RestTestSupport::assert_status_code`
//! panics when the status does not match.
//!
//! This behaviour is unorthodox for Rust, however it is intentional to aid with writing tests.
//! Where you want the test to fail as quickly, and skip on writing error handling code.
//! Functions starting with `try_` return a `Result` instead.
//!

mod error;
pub use self::error::*;

mod media_type;
pub use self::media_type::*;

mod body;
pub use self::body::*;

mod request;
pub use self::request::*;

mod response;
pub use self::response::*;

mod processor;
pub use self::processor::*;

mod server;
pub use self::server::*;

mod support;
pub use self::support::*;

pub use ::hyper::http;
