use ::hyper::http::Method;
use ::percent_encoding::utf8_percent_encode;
use ::percent_encoding::AsciiSet;
use ::percent_encoding::CONTROLS;
use ::std::fmt;
use ::url::form_urlencoded;
use ::url::Position;
use ::url::Url;

use crate::find_body_converter;
use crate::request::CONTENT_LENGTH;
use crate::request::CONTENT_TYPE;
use crate::request::COOKIE;
use crate::Error;
use crate::Headers;
use crate::MediaType;
use crate::MockRequest;

/// Characters which cannot appear as is in a request path. Non-ASCII is always encoded.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

///
/// A `MockRequest` after validation, with everything encoded.
///
/// `Display` writes the exact HTTP text:
/// the request line, each header in order, a blank line, then the body.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRequest {
    method: Method,
    uri: String,
    http_version: String,
    headers: Headers,
    body: String,
}

impl RenderedRequest {
    pub(crate) fn render(request: &MockRequest) -> Result<Self, Error> {
        if request.request_body().is_some() && !request.params().is_empty() {
            return Err(Error::ParamsAndBody);
        }

        let (raw_path, raw_query) = split_query(request.request_uri());
        let path = encode_path(raw_path)?;
        let uri_query = match raw_query {
            Some(raw_query) => encode_query_string(raw_query)?,
            None => String::new(),
        };
        let params = encode_params(request.params());

        let is_get = request.request_method() == Method::GET;
        let mut body = render_body(request)?;
        let query = if is_get {
            join_queries(&uri_query, &params)
        } else {
            if !params.is_empty() {
                body = params;
            }
            uri_query
        };

        let uri = if query.is_empty() {
            path
        } else {
            format!("{}?{}", path, query)
        };

        let mut headers = request.headers().clone();
        if let Some(cookie_header) = request.cookie_header() {
            let cookie_header = match headers.get(COOKIE) {
                Some(existing) => merge_cookie_header(existing, request, &cookie_header),
                None => cookie_header,
            };
            headers.insert(COOKIE, cookie_header);
        }

        if !body.is_empty() {
            let content_length = body.len();
            if let Some(existing) = headers.get(CONTENT_LENGTH) {
                if existing.trim() != content_length.to_string() {
                    return Err(Error::WrongContentLength {
                        actual: existing.to_string(),
                        expected: content_length,
                    });
                }
            }
            headers.insert(CONTENT_LENGTH, content_length.to_string());
        }

        Ok(Self {
            method: request.request_method().clone(),
            uri,
            http_version: request.version().to_string(),
            headers,
            body,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The encoded request target, including the query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// The final headers, including `Content-Length` and `Cookie`.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for RenderedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}\r\n{}\r\n{}",
            self.method, self.uri, self.http_version, self.headers, self.body
        )
    }
}

/// Joins an explicit `Cookie` header with the request's cookies.
/// Pairs in the explicit header are dropped when the request has a cookie of the same name.
fn merge_cookie_header(existing: &str, request: &MockRequest, cookie_header: &str) -> String {
    let kept = existing
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split_once('=').map_or(*pair, |(name, _)| name).trim();
            request.cookies().get(name).is_none()
        })
        .collect::<Vec<&str>>();

    if kept.is_empty() {
        return cookie_header.to_string();
    }

    format!("{}; {}", kept.join("; "), cookie_header)
}

fn render_body(request: &MockRequest) -> Result<String, Error> {
    let body = match request.request_body() {
        Some(body) => body,
        None => return Ok(String::new()),
    };

    let content_type = request
        .header_value(CONTENT_TYPE)
        .ok_or(Error::MissingContentType)?;
    let media_type = MediaType::new(content_type)?;
    let converter = find_body_converter(request.body_converters(), body, &media_type)?;

    converter.convert(body, &media_type)
}

fn split_query(request_uri: &str) -> (&str, Option<&str>) {
    match request_uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (request_uri, None),
    }
}

/// Percent encodes the path as given, without resolving `.` or `..` segments.
/// Absolute URIs keep their scheme and authority.
fn encode_path(raw_path: &str) -> Result<String, Error> {
    if !has_scheme(raw_path) {
        return Ok(utf8_percent_encode(raw_path, PATH_ENCODE_SET).to_string());
    }

    let url = Url::parse(raw_path).map_err(|source| Error::UrlEncoding {
        message: source.to_string(),
        source,
    })?;

    let raw_url_path = raw_path
        .split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|index| &rest[index..]))
        .unwrap_or("");

    Ok(format!(
        "{}{}",
        &url[..Position::BeforePath],
        utf8_percent_encode(raw_url_path, PATH_ENCODE_SET)
    ))
}

/// True when the URI starts with `scheme://`.
pub(crate) fn has_scheme(uri: &str) -> bool {
    let scheme = match uri.split_once("://") {
        Some((scheme, _)) => scheme,
        None => return false,
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}

/// Re-encodes a query string taken from the request URI.
///
/// Every fragment must be `name=value`. Values are decoded first,
/// so a query that is already encoded is not encoded twice.
fn encode_query_string(raw_query: &str) -> Result<String, Error> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for fragment in raw_query.split('&').filter(|fragment| !fragment.is_empty()) {
        if !fragment.contains('=') {
            return Err(Error::InvalidQueryFragment {
                fragment: fragment.to_string(),
            });
        }

        for (name, value) in form_urlencoded::parse(fragment.as_bytes()) {
            serializer.append_pair(&name, &value);
        }
    }

    Ok(serializer.finish())
}

fn encode_params(params: &[(String, Vec<String>)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, values) in params {
        for value in values {
            serializer.append_pair(name, value);
        }
    }

    serializer.finish()
}

fn join_queries(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{}&{}", first, second),
    }
}

#[cfg(test)]
mod test_render {
    use super::*;

    use ::cookie::Cookie;
    use ::std::sync::Arc;

    use crate::BodyConverter;
    use crate::RequestBody;

    const LS: &'static str = &"\r\n";
    const ENCODED_QUERY: &'static str = &"name=%E3%83%86%E3%82%B9%E3%83%88&value=%E3%82%B2%E3%83%83%E3%83%88%E3%83%AA%E3%82%AF%E3%82%A8%E3%82%B9%E3%83%88";
    const ENCODED_QUERY_SAME_NAME: &'static str = &"name=%E3%83%86%E3%82%B9%E3%83%88&name=%E3%82%B2%E3%83%83%E3%83%88%E3%83%AA%E3%82%AF%E3%82%A8%E3%82%B9%E3%83%88";

    /// Accepts any body, and writes text as is.
    #[derive(Debug)]
    struct MockConverter;

    impl BodyConverter for MockConverter {
        fn is_convertible(&self, _body: &RequestBody, _media_type: &MediaType) -> bool {
            true
        }

        fn convert(&self, body: &RequestBody, _media_type: &MediaType) -> Result<String, Error> {
            Ok(body.as_text().unwrap_or_default().to_string())
        }
    }

    #[derive(Debug)]
    struct NoContentConverter;

    impl BodyConverter for NoContentConverter {
        fn is_convertible(&self, _body: &RequestBody, _media_type: &MediaType) -> bool {
            false
        }

        fn convert(&self, _body: &RequestBody, _media_type: &MediaType) -> Result<String, Error> {
            Ok(String::new())
        }
    }

    fn new_request(default_content_type: Option<&str>) -> MockRequest {
        let converters: Vec<Box<dyn BodyConverter>> = vec![Box::new(MockConverter)];

        MockRequest::new(
            Arc::new(converters),
            default_content_type.map(ToString::to_string),
        )
    }

    #[test]
    fn it_should_render_the_default_request() {
        let text = new_request(Some("testType")).to_request_string().unwrap();

        assert_eq!(text, format!("GET / HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_render_a_get_with_a_path() {
        let text = new_request(Some("testType"))
            .uri("/test")
            .to_request_string()
            .unwrap();

        assert_eq!(text, format!("GET /test HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_encode_a_query_in_the_uri() {
        let text = new_request(None)
            .uri("/test?name=テスト&value=ゲットリクエスト")
            .to_request_string()
            .unwrap();

        assert_eq!(text, format!("GET /test?{ENCODED_QUERY} HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_append_params_to_a_query_in_the_uri() {
        let text = new_request(None)
            .uri("/test?name=テスト")
            .param("value", &["ゲットリクエスト"])
            .to_request_string()
            .unwrap();

        assert_eq!(text, format!("GET /test?{ENCODED_QUERY} HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_render_params_as_the_query_for_get() {
        let text = new_request(None)
            .uri("/test")
            .param("name", &["テスト"])
            .param("value", &["ゲットリクエスト"])
            .to_request_string()
            .unwrap();

        assert_eq!(text, format!("GET /test?{ENCODED_QUERY} HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_keep_repeated_names() {
        let from_uri = new_request(None)
            .uri("/test?name=テスト&name=ゲットリクエスト")
            .to_request_string()
            .unwrap();
        let from_uri_and_param = new_request(None)
            .uri("/test?name=テスト")
            .param("name", &["ゲットリクエスト"])
            .to_request_string()
            .unwrap();
        let from_param = new_request(None)
            .uri("/test")
            .param("name", &["テスト", "ゲットリクエスト"])
            .to_request_string()
            .unwrap();

        let expected = format!("GET /test?{ENCODED_QUERY_SAME_NAME} HTTP/1.1{LS}{LS}");
        assert_eq!(from_uri, expected);
        assert_eq!(from_uri_and_param, expected);
        assert_eq!(from_param, expected);
    }

    #[test]
    fn it_should_not_encode_an_encoded_query_twice() {
        let text = new_request(None)
            .uri("/test?name=%E3%83%86%E3%82%B9%E3%83%88&value=a+b")
            .to_request_string()
            .unwrap();

        assert_eq!(
            text,
            format!("GET /test?name=%E3%83%86%E3%82%B9%E3%83%88&value=a+b HTTP/1.1{LS}{LS}")
        );
    }

    #[test]
    fn it_should_encode_the_path() {
        let text = new_request(None)
            .uri("/テスト/a b")
            .to_request_string()
            .unwrap();

        assert_eq!(
            text,
            format!("GET /%E3%83%86%E3%82%B9%E3%83%88/a%20b HTTP/1.1{LS}{LS}")
        );
    }

    #[test]
    fn it_should_keep_the_path_as_written() {
        let render = |uri: &str| new_request(None).uri(uri).render().unwrap().uri().to_string();

        assert_eq!(render("/a/../b"), "/a/../b");
        assert_eq!(render("/a/./b"), "/a/./b");
        assert_eq!(render("test"), "test");
    }

    #[test]
    fn it_should_encode_reserved_path_characters() {
        let render = |uri: &str| new_request(None).uri(uri).render().unwrap().uri().to_string();

        assert_eq!(render("/a#frag"), "/a%23frag");
        assert_eq!(render("/files/100%"), "/files/100%25");
        assert_eq!(render("/a\\b"), "/a%5Cb");
    }

    #[test]
    fn it_should_treat_paths_containing_a_scheme_as_relative() {
        let text = new_request(None)
            .uri("/proxy/http://example.com")
            .to_request_string()
            .unwrap();

        assert_eq!(text, format!("GET /proxy/http://example.com HTTP/1.1{LS}{LS}"));
    }

    #[test]
    fn it_should_keep_the_scheme_and_host_of_absolute_uris() {
        let text = new_request(None)
            .uri("http://example.com/a/../テスト?q=1")
            .to_request_string()
            .unwrap();

        assert_eq!(
            text,
            format!("GET http://example.com/a/../%E3%83%86%E3%82%B9%E3%83%88?q=1 HTTP/1.1{LS}{LS}")
        );
    }

    #[test]
    fn it_should_render_a_post_with_a_body() {
        let text = new_request(Some("testType"))
            .text("test body")
            .content_type("application/json")
            .header("test", "OK")
            .method(Method::POST)
            .uri("/test")
            .to_request_string()
            .unwrap();

        assert_eq!(
            text,
            format!(
                "POST /test HTTP/1.1{LS}Content-Type: application/json{LS}test: OK{LS}Content-Length: 9{LS}{LS}test body"
            )
        );
    }

    #[test]
    fn it_should_render_params_as_the_body_for_post() {
        let text = new_request(Some("testType"))
            .method(Method::POST)
            .uri("/test")
            .content_type("application/x-www-form-urlencoded")
            .param("name", &["テスト"])
            .to_request_string()
            .unwrap();

        assert_eq!(
            text,
            format!(
                "POST /test HTTP/1.1{LS}Content-Type: application/x-www-form-urlencoded{LS}Content-Length: 32{LS}{LS}name=%E3%83%86%E3%82%B9%E3%83%88"
            )
        );
    }

    #[test]
    fn it_should_count_content_length_in_bytes() {
        let rendered = new_request(Some("text/plain"))
            .method(Method::PUT)
            .text("テスト")
            .render()
            .unwrap();

        assert_eq!(rendered.headers().get("Content-Length"), Some("9"));
    }

    #[test]
    fn it_should_render_cookies_as_a_header() {
        let rendered = new_request(None)
            .header("Cookie", "first=0")
            .add_cookie(Cookie::new("JSESSIONID", "jsessionid"))
            .render()
            .unwrap();

        assert_eq!(
            rendered.headers().get("Cookie"),
            Some("first=0; JSESSIONID=jsessionid")
        );
    }

    #[test]
    fn it_should_replace_explicit_cookies_with_the_same_name() {
        let rendered = new_request(None)
            .header("Cookie", "first=0; NABLARCH_SID=old")
            .add_cookie(Cookie::new("NABLARCH_SID", "new"))
            .render()
            .unwrap();

        assert_eq!(
            rendered.headers().get("Cookie"),
            Some("first=0; NABLARCH_SID=new")
        );
    }

    #[test]
    fn it_should_render_the_same_text_twice() {
        let request = new_request(Some("application/json"))
            .method(Method::POST)
            .uri("/test?a=1")
            .text(r#"{"field" : "value"}"#);

        assert_eq!(
            request.to_request_string().unwrap(),
            request.to_request_string().unwrap()
        );
    }

    #[test]
    fn it_should_accept_a_matching_content_length() {
        let text = new_request(Some("application/json"))
            .method(Method::POST)
            .text(r#"{"field" : "value"}"#)
            .header("Content-Length", "19")
            .to_request_string()
            .unwrap();

        assert!(text.contains("Content-Length: 19\r\n"));
    }

    #[test]
    fn it_should_fail_on_a_wrong_content_length() {
        let err = new_request(None)
            .method(Method::POST)
            .content_type("application/json")
            .text(r#"{"field" : "value"}"#)
            .header("Content-Length", "1")
            .render()
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "wrong Content-Length[1] was set.correct length is [19]."
        );
    }

    #[test]
    fn it_should_fail_when_both_params_and_body_are_set() {
        let err = new_request(Some("application/json"))
            .method(Method::POST)
            .text("test body")
            .param("name", &["value"])
            .render()
            .unwrap_err();

        assert_eq!(err.to_string(), "set only one of paramMap or body.");
    }

    #[test]
    fn it_should_fail_on_a_query_fragment_without_a_value() {
        let err = new_request(None).uri("/test?name").render().unwrap_err();

        assert_eq!(err.to_string(), "name must be name=value format.");
    }

    #[test]
    fn it_should_fail_on_a_body_without_a_content_type() {
        let err = new_request(None).text("test body").render().unwrap_err();

        assert_eq!(
            err.to_string(),
            "there was no Content-Type header but body was not empty."
        );
    }

    #[test]
    fn it_should_fail_when_no_converter_matches() {
        let converters: Vec<Box<dyn BodyConverter>> = vec![Box::new(NoContentConverter)];
        let err = MockRequest::new(Arc::new(converters), Some("text/plain".to_string()))
        .text("test body")
        .render()
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "unsupported media type requested. MIME type = [ text/plain ]"
        );
    }

    #[test]
    fn it_should_wrap_uri_parse_failures() {
        let err = new_request(None)
            .uri("http://[::1/test")
            .render()
            .unwrap_err();

        assert!(matches!(err, Error::UrlEncoding { .. }));
        assert!(err.to_string().starts_with("url encoding failed. cause["));
        assert!(::std::error::Error::source(&err).is_some());
    }
}
