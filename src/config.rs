use std::collections::HashMap;

/// Kubernetes refuses TokenRequests shorter than ten minutes
pub const MIN_TOKEN_EXPIRATION_SECONDS: i64 = 600;

/// TokenRequest validation rejects anything above 2^32 seconds
pub const MAX_TOKEN_EXPIRATION_SECONDS: i64 = 1 << 32;

const DEFAULT_TOKEN_EXPIRATION_SECONDS: i64 = MIN_TOKEN_EXPIRATION_SECONDS;
const DEFAULT_AWS_REGION: &str = "us-east-1";

const ENV_TOKEN_EXPIRATION: &str = "VSO_TOKEN_EXPIRATION_SECONDS";
const ENV_DEFAULT_AUDIENCES: &str = "VSO_DEFAULT_AUDIENCES";
const ENV_AWS_REGION: &str = "AWS_REGION";
const ENV_AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Process-wide fallbacks for values an auth spec may leave out
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDefaults {
    pub token_expiration_seconds: i64,
    pub audiences: Vec<String>,
    pub aws_region: String,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            token_expiration_seconds: DEFAULT_TOKEN_EXPIRATION_SECONDS,
            audiences: Vec::new(),
            aws_region: DEFAULT_AWS_REGION.to_string(),
        }
    }
}

impl ProviderDefaults {
    pub fn builder() -> ProviderDefaultsBuilder {
        ProviderDefaultsBuilder::new()
    }

    pub fn from_env() -> Self {
        ProviderDefaultsBuilder::new().build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderDefaultsBuilder {
    token_expiration_seconds: Option<i64>,
    audiences: Option<Vec<String>>,
    aws_region: Option<String>,
}

impl ProviderDefaultsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_expiration_seconds(mut self, seconds: i64) -> Self {
        self.token_expiration_seconds = Some(seconds);
        self
    }

    pub fn audiences<I, S>(mut self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audiences = Some(audiences.into_iter().map(Into::into).collect());
        self
    }

    pub fn aws_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = Some(region.into());
        self
    }

    /// Resolve against the process environment
    pub fn build(self) -> ProviderDefaults {
        self.resolve(|key| std::env::var(key).ok())
    }

    /// Resolve against a custom environment (for testing)
    pub fn build_with_env(self, environ: &HashMap<String, String>) -> ProviderDefaults {
        self.resolve(|key| environ.get(key).cloned())
    }

    fn resolve<F>(self, env: F) -> ProviderDefaults
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_expiration_seconds = self
            .token_expiration_seconds
            .or_else(|| {
                env(ENV_TOKEN_EXPIRATION).and_then(|value| match value.trim().parse() {
                    Ok(seconds) => Some(seconds),
                    Err(e) => {
                        tracing::warn!(
                            variable = ENV_TOKEN_EXPIRATION,
                            value = %value,
                            error = %e,
                            "Ignoring invalid token expiration"
                        );
                        None
                    }
                })
            })
            .unwrap_or(DEFAULT_TOKEN_EXPIRATION_SECONDS)
            .clamp(MIN_TOKEN_EXPIRATION_SECONDS, MAX_TOKEN_EXPIRATION_SECONDS);

        let audiences = self
            .audiences
            .or_else(|| {
                env(ENV_DEFAULT_AUDIENCES).map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
            })
            .unwrap_or_default();

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let aws_region = non_empty(self.aws_region)
            .or_else(|| non_empty(env(ENV_AWS_REGION)))
            .or_else(|| non_empty(env(ENV_AWS_DEFAULT_REGION)))
            .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());

        ProviderDefaults {
            token_expiration_seconds,
            audiences,
            aws_region,
        }
    }
}
