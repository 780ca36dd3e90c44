use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

/// Location of the backend the front end talks to.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the backend API, the test endpoint is `{api_url}/test`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds. When absent, the transport defaults apply.
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            api_url: default_api_url(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JaegerSettings {
    pub endpoint: String,
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingSettings {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    pub jaeger: Option<JaegerSettings>,
}

impl Default for TracingSettings {
    fn default() -> Self {
        TracingSettings {
            level: "info".to_string(),
            jaeger: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub backend: BackendSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    pub mode: String,
}
