use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::debug;

use crate::error::FetchError;

/// Total time allowed for one download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves an attachment location into raw bytes, refusing anything over `max_bytes`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<Bytes, FetchError>;
}

/// Downloads over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).send().await.map_err(map_request_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > max_bytes {
                return Err(FetchError::TooLarge { limit: max_bytes });
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_request_error)?;
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(FetchError::TooLarge { limit: max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, bytes = body.len(), "downloaded");
        Ok(body.freeze())
    }
}

fn map_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Request(err)
    }
}

/// Reads local files given as `file://` URLs or plain paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_of(url: &str) -> Result<PathBuf, FetchError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.is_empty() || path.contains("://") {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }
        Ok(PathBuf::from(path))
    }
}

#[async_trait]
impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<Bytes, FetchError> {
        let path = Self::path_of(url)?;
        let io_error = |source| FetchError::Io {
            path: path.clone(),
            source,
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(io_error)?;
        if metadata.len() > max_bytes {
            return Err(FetchError::TooLarge { limit: max_bytes });
        }

        let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
        if bytes.len() as u64 > max_bytes {
            return Err(FetchError::TooLarge { limit: max_bytes });
        }

        Ok(Bytes::from(bytes))
    }
}

/// Sends `http(s)://` locations to [`HttpFetcher`].
///
/// Local files are read only when built with [`RoutingFetcher::with_local_files`],
/// which is meant for the console host. Platform adapters keep the default so
/// that user-supplied locations never reach the local filesystem.
#[derive(Debug, Clone)]
pub struct RoutingFetcher {
    http: HttpFetcher,
    file: Option<FileFetcher>,
}

impl RoutingFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: None,
        })
    }

    /// Also accepts `file://` URLs and plain paths.
    pub fn with_local_files(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: Some(FileFetcher),
        })
    }
}

fn is_http(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl ImageFetcher for RoutingFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<Bytes, FetchError> {
        if is_http(url) {
            return self.http.fetch(url, max_bytes).await;
        }
        match &self.file {
            Some(file) => file.fetch(url, max_bytes).await,
            None => Err(FetchError::UnsupportedUrl(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one connection with a canned response and returns the URL to fetch.
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            // the client may hang up early once it hits the limit
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/image.png")
    }

    fn http_fetcher(timeout: Duration) -> HttpFetcher {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpFetcher { client }
    }

    fn response(status: &str, headers: &str, body: &[u8]) -> Vec<u8> {
        let mut bytes =
            format!("HTTP/1.1 {status}\r\n{headers}Connection: close\r\n\r\n").into_bytes();
        bytes.extend_from_slice(body);
        bytes
    }

    fn chunked_body(chunk_len: usize, chunks: usize) -> Vec<u8> {
        let mut body = Vec::new();
        for _ in 0..chunks {
            body.extend_from_slice(format!("{chunk_len:x}\r\n").as_bytes());
            body.extend_from_slice(&vec![7u8; chunk_len]);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(b"0\r\n\r\n");
        body
    }

    #[tokio::test]
    async fn http_fetcher_downloads_body_under_limit() {
        let url = serve_once(response("200 OK", "Content-Length: 5\r\n", b"hello")).await;

        let bytes = http_fetcher(DOWNLOAD_TIMEOUT).fetch(&url, 10).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn http_fetcher_rejects_declared_length_over_limit() {
        let body = vec![0u8; 4096];
        let url = serve_once(response("200 OK", "Content-Length: 4096\r\n", &body)).await;

        let result = http_fetcher(DOWNLOAD_TIMEOUT).fetch(&url, 1024).await;
        assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024 })));
    }

    #[tokio::test]
    async fn http_fetcher_stops_streamed_body_over_limit() {
        let url = serve_once(response(
            "200 OK",
            "Transfer-Encoding: chunked\r\n",
            &chunked_body(1024, 4),
        ))
        .await;

        let result = http_fetcher(DOWNLOAD_TIMEOUT).fetch(&url, 1024 + 512).await;
        assert!(matches!(result, Err(FetchError::TooLarge { limit: 1536 })));
    }

    #[tokio::test]
    async fn http_fetcher_rejects_non_ok_status() {
        let url = serve_once(response("404 Not Found", "Content-Length: 0\r\n", b"")).await;

        let result = http_fetcher(DOWNLOAD_TIMEOUT).fetch(&url, 1024).await;
        assert!(matches!(result, Err(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn http_fetcher_maps_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/slow.png", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let result = http_fetcher(Duration::from_millis(200)).fetch(&url, 1024).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
        server.abort();
    }

    #[tokio::test]
    async fn routing_fetcher_reads_local_files_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.png");
        std::fs::write(&path, b"12345").unwrap();
        let location = path.to_str().unwrap();

        let remote_only = RoutingFetcher::new(DOWNLOAD_TIMEOUT).unwrap();
        let result = remote_only.fetch(location, 10).await;
        assert!(matches!(result, Err(FetchError::UnsupportedUrl(_))));

        let console = RoutingFetcher::with_local_files(DOWNLOAD_TIMEOUT).unwrap();
        assert_eq!(&console.fetch(location, 10).await.unwrap()[..], b"12345");
    }

    #[tokio::test]
    async fn file_fetcher_reads_plain_paths_and_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.png");
        std::fs::write(&path, b"12345").unwrap();

        let bytes = FileFetcher.fetch(path.to_str().unwrap(), 10).await.unwrap();
        assert_eq!(&bytes[..], b"12345");

        let url = format!("file://{}", path.display());
        let bytes = FileFetcher.fetch(&url, 10).await.unwrap();
        assert_eq!(bytes.len(), 5);
    }

    #[tokio::test]
    async fn file_fetcher_enforces_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let result = FileFetcher.fetch(path.to_str().unwrap(), 63).await;
        assert!(matches!(result, Err(FetchError::TooLarge { limit: 63 })));
    }

    #[tokio::test]
    async fn file_fetcher_reports_missing_file() {
        let result = FileFetcher.fetch("/definitely/not/here.png", 10).await;
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }

    #[tokio::test]
    async fn file_fetcher_rejects_other_schemes() {
        let result = FileFetcher.fetch("ftp://host/a.png", 10).await;
        assert!(matches!(result, Err(FetchError::UnsupportedUrl(_))));
    }

    #[test]
    fn routes_by_scheme() {
        assert!(is_http("https://example.com/a.png"));
        assert!(is_http("HTTP://example.com/a.png"));
        assert!(!is_http("file:///tmp/a.png"));
        assert!(!is_http("/tmp/a.png"));
    }
}
