// ABOUTME: Error types for image embedding with messages suitable for diagnostics
// ABOUTME: Separates retrieval failures from media-type rejections

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("fail to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fail to get image from {url}: {message}")]
    Network { url: String, message: String },

    #[error("Timeout: request took too long to complete: {0}")]
    Timeout(String),

    #[error("request for {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("image too large: {size} bytes (max: {max} bytes): {location}")]
    TooLarge {
        location: String,
        size: u64,
        max: u64,
    },

    #[error("can not embed the filetype {0}")]
    UnsupportedMediaType(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EmbedError {
    /// True when the bytes could not be obtained at all, as opposed to
    /// bytes that were obtained but rejected.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            EmbedError::Io { .. }
                | EmbedError::Network { .. }
                | EmbedError::Timeout(_)
                | EmbedError::HttpStatus { .. }
                | EmbedError::TooLarge { .. }
        )
    }
}

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if err.is_timeout() {
            EmbedError::Timeout(url)
        } else if let Some(status) = err.status() {
            EmbedError::HttpStatus {
                url,
                status: status.as_u16(),
            }
        } else {
            EmbedError::Network {
                url,
                message: err.to_string(),
            }
        }
    }
}
