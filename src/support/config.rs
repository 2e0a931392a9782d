use ::anyhow::Context;
use ::anyhow::Result;
use ::serde::Deserialize;
use ::serde::Serialize;
use ::std::path::PathBuf;

use crate::DEFAULT_HTTP_VERSION;

const DEFAULT_SERVER_ADDRESS: &'static str = &"http://127.0.0.1:3000";
const DEFAULT_CONTENT_TYPE: &'static str = &"application/json";
const DEFAULT_RESOURCE_DIR: &'static str = &"tests/resources";

///
/// This is for customising a `RestTestSupport` on construction.
///
/// It implements `Default` to ease building configurations:
///
/// ```rust
/// use ::resttest::RestTestConfig;
///
/// let config = RestTestConfig {
///     server_address: "http://127.0.0.1:8080".to_string(),
///     ..RestTestConfig::default()
/// };
/// ```
///
/// It can also be loaded from JSON, where missing fields keep their defaults.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RestTestConfig {
    /// Where requests with relative URIs are sent.
    pub server_address: String,

    /// The content type used when a body is set without one.
    ///
    /// **Defaults** to `application/json`.
    pub default_content_type: Option<String>,

    /// Test resources are read from `<resource_dir>/<test name>/<file>`.
    pub resource_dir: PathBuf,

    pub http_version: String,
}

impl RestTestConfig {
    pub fn from_json_str(raw_json: &str) -> Result<Self> {
        ::serde_json::from_str(raw_json).context("Reading RestTestConfig from JSON")
    }
}

impl Default for RestTestConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            default_content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            resource_dir: PathBuf::from(DEFAULT_RESOURCE_DIR),
            http_version: DEFAULT_HTTP_VERSION.to_string(),
        }
    }
}
