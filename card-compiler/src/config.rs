//! Compiler configuration resolved from flags and the environment.

use crate::cli::CompileArgs;

/// Default `OpenAI`-compatible API base.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Text generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Bearer token. Requests fail with `MissingApiKey` when absent.
    pub api_key: Option<String>,
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Access key id.
    pub secret_id: Option<String>,
    /// Secret access key.
    pub secret_key: Option<String>,
    /// Bucket name, including any app-id suffix.
    pub bucket: Option<String>,
    /// Region, e.g. `ap-guangzhou`.
    pub region: Option<String>,
    /// Endpoint override. Switches to path-style URLs.
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Names of required settings that are unset.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("COS_SECRET_ID", &self.secret_id),
            ("COS_SECRET_KEY", &self.secret_key),
            ("COS_BUCKET", &self.bucket),
            ("COS_REGION", &self.region),
        ]
        .into_iter()
        .filter(|(_, value)| !value.as_deref().is_some_and(|v| !v.is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Full compiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Text generation.
    pub llm: LlmConfig,
    /// Object storage.
    pub storage: StorageConfig,
}

impl From<&CompileArgs> for CompilerConfig {
    fn from(args: &CompileArgs) -> Self {
        Self {
            llm: LlmConfig {
                api_key: args.openai_api_key.clone(),
                base_url: args.openai_base_url.clone(),
                model: args.openai_model.clone(),
            },
            storage: StorageConfig {
                secret_id: args.cos_secret_id.clone(),
                secret_key: args.cos_secret_key.clone(),
                bucket: args.cos_bucket.clone(),
                region: args.cos_region.clone(),
                endpoint: args.cos_endpoint.clone(),
            },
        }
    }
}
