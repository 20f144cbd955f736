use shared_utils::env::MissingEnvVarError;
use thiserror::Error;

/// Errors that can occur within a provider implementation.
///
/// The variants are coarse on purpose: callers only need to tell an
/// unreachable or failing endpoint apart from one that answered with nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status code.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The endpoint was reachable but returned no usable data.
    #[error("No {what} returned for {symbol}")]
    Empty { symbol: String, what: String },

    /// The response body could not be interpreted.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),
}

impl FetchError {
    pub(crate) fn empty(symbol: &str, what: &str) -> Self {
        FetchError::Empty {
            symbol: symbol.to_string(),
            what: what.to_string(),
        }
    }

    /// `true` when the endpoint answered but had nothing for the request.
    pub fn is_data_absent(&self) -> bool {
        matches!(self, FetchError::Empty { .. })
    }
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// missed environment variable.
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    /// failed to init reqwest client
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// Base URL is not an http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Trims a trailing slash and checks the scheme of a provider base URL.
pub(crate) fn normalize_base_url(base: &str) -> Result<String, ProviderInitError> {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ProviderInitError::InvalidBaseUrl(base.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_data_absent() {
        assert!(FetchError::empty("AAPL", "bars").is_data_absent());
        assert!(!FetchError::Decode("bad".into()).is_data_absent());
        assert_eq!(
            FetchError::empty("AAPL", "bars").to_string(),
            "No bars returned for AAPL"
        );
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(
            normalize_base_url(" http://localhost:8000/ ").unwrap(),
            "http://localhost:8000"
        );
        assert!(matches!(
            normalize_base_url("localhost:8000"),
            Err(ProviderInitError::InvalidBaseUrl(_))
        ));
    }
}
