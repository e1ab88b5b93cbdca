// ABOUTME: Byte readers that load image contents from disk or over HTTP
// ABOUTME: Readers fully buffer a resource or report that it should be left as a reference

use crate::constants::{prefixes, remote};
use crate::error::EmbedError;
use reqwest::blocking::Client;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Loads the bytes behind a resolved location.
///
/// `Ok(None)` means "not applicable": the reference is left as-is and the
/// node is not treated as failed. Errors degrade the node to its original
/// reference as well, but are logged as failures.
pub trait ByteReader: Send + Sync {
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, EmbedError>;
}

impl<F> ByteReader for F
where
    F: Fn(&str) -> Result<Option<Vec<u8>>, EmbedError> + Send + Sync,
{
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, EmbedError> {
        self(location)
    }
}

/// Default reader. Remote URLs are not applicable, since embedding remote
/// images has to be enabled explicitly with [`RemoteFileReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileReader;

impl ByteReader for LocalFileReader {
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, EmbedError> {
        if prefixes::is_remote(location) {
            log::debug!("Not embedding remote image with local reader: {}", location);
            return Ok(None);
        }
        read_local(location).map(Some)
    }
}

/// Reads a local file after lexically cleaning its path
pub fn read_local(location: &str) -> Result<Vec<u8>, EmbedError> {
    let path = clean_path(Path::new(location));
    std::fs::read(&path).map_err(|source| EmbedError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Lexically normalizes a path: drops `.` segments and folds `..` into
/// the preceding segment. Never consults the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RemoteReaderConfig {
    #[builder(default = remote::DEFAULT_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default = remote::USER_AGENT.to_string(), setter(into))]
    pub user_agent: String,

    #[builder(default = remote::DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    #[builder(default = remote::DEFAULT_MAX_SIZE_BYTES)]
    pub max_size_bytes: u64,
}

impl Default for RemoteReaderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Reader that downloads remote images and falls back to local files.
///
/// Only use this when every referenced image is trusted: the document
/// decides which hosts get contacted.
#[derive(Debug, Clone)]
pub struct RemoteFileReader {
    client: Client,
    max_size_bytes: u64,
}

impl RemoteFileReader {
    pub fn new(config: RemoteReaderConfig) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| EmbedError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_size_bytes: config.max_size_bytes,
        })
    }

    /// Wraps a caller-built client; its timeout and redirect policy are used as-is
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_size_bytes: remote::DEFAULT_MAX_SIZE_BYTES,
        }
    }

    pub fn max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Blocking GET with status and size checks
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, EmbedError> {
        log::debug!("Fetching {}", url);

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbedError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size_bytes {
                return Err(EmbedError::TooLarge {
                    location: url.to_string(),
                    size: content_length,
                    max: self.max_size_bytes,
                });
            }
        }

        // Read one byte past the limit so an oversized body without a
        // content-length header is still caught
        let mut body = Vec::new();
        response
            .take(self.max_size_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| EmbedError::Network {
                url: url.to_string(),
                message: format!("Failed to read response body: {}", e),
            })?;

        if body.len() as u64 > self.max_size_bytes {
            return Err(EmbedError::TooLarge {
                location: url.to_string(),
                size: body.len() as u64,
                max: self.max_size_bytes,
            });
        }

        log::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl ByteReader for RemoteFileReader {
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, EmbedError> {
        if prefixes::is_remote(location) {
            return self.fetch(location).map(Some);
        }
        read_local(location).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("./a/../b.png")), PathBuf::from("b.png"));
        assert_eq!(clean_path(Path::new("a//b/./c.png")), PathBuf::from("a/b/c.png"));
        assert_eq!(clean_path(Path::new("../x.png")), PathBuf::from("../x.png"));
        assert_eq!(clean_path(Path::new("a/b/../../..")), PathBuf::from(".."));
        assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_path_stops_at_root() {
        assert_eq!(clean_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_local_reader_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.png");
        std::fs::write(&path, PNG_SIGNATURE).unwrap();

        let bytes = LocalFileReader.read(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, Some(PNG_SIGNATURE.to_vec()));
    }

    #[test]
    fn test_local_reader_skips_remote() {
        let result = LocalFileReader.read("https://example.com/x.png").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_local_reader_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.png");

        let result = LocalFileReader.read(path.to_str().unwrap());
        match result {
            Err(EmbedError::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_reader_downloads() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/image.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(PNG_SIGNATURE)
            .create();

        let reader = RemoteFileReader::new(RemoteReaderConfig::default()).unwrap();
        let url = format!("{}/image.png", server.url());
        let result = reader.read(&url).unwrap();

        mock.assert();
        assert_eq!(result, Some(PNG_SIGNATURE.to_vec()));
    }

    #[test]
    fn test_remote_reader_http_error() {
        let mut server = Server::new();
        let mock = server.mock("GET", "/missing.png").with_status(404).create();

        let reader = RemoteFileReader::with_client(Client::new());
        let url = format!("{}/missing.png", server.url());
        let result = reader.read(&url);

        mock.assert();
        match result {
            Err(EmbedError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_reader_rejects_oversized_body() {
        let mut server = Server::new();
        let large = vec![0xFF; 4096];
        let mock = server
            .mock("GET", "/large.png")
            .with_status(200)
            .with_body(&large)
            .create();

        let config = RemoteReaderConfig::builder().max_size_bytes(1024).build();
        let reader = RemoteFileReader::new(config).unwrap();
        let url = format!("{}/large.png", server.url());
        let result = reader.read(&url);

        mock.assert();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_remote_reader_unbounded_limit() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/small.png")
            .with_status(200)
            .with_body(&PNG_SIGNATURE[..3])
            .create();

        let reader = RemoteFileReader::with_client(Client::new()).max_size_bytes(u64::MAX);
        let url = format!("{}/small.png", server.url());
        let result = reader.read(&url).unwrap();

        mock.assert();
        assert_eq!(result, Some(PNG_SIGNATURE[..3].to_vec()));
    }

    #[test]
    fn test_remote_reader_connection_failure() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let config = RemoteReaderConfig::builder()
            .timeout(Duration::from_secs(2))
            .build();
        let reader = RemoteFileReader::new(config).unwrap();

        let err = reader.read("http://127.0.0.1:9/x.png").unwrap_err();
        assert!(err.is_retrieval());
    }

    #[test]
    fn test_remote_reader_falls_back_to_local() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("local.png");
        std::fs::write(&path, PNG_SIGNATURE).unwrap();

        let reader = RemoteFileReader::with_client(Client::new());
        let bytes = reader.read(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, Some(PNG_SIGNATURE.to_vec()));
    }

    #[test]
    fn test_closure_reader() {
        let reader = |location: &str| -> Result<Option<Vec<u8>>, EmbedError> {
            Ok(Some(location.as_bytes().to_vec()))
        };
        assert_eq!(reader.read("abc").unwrap(), Some(b"abc".to_vec()));
    }
}
