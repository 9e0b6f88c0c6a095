use std::future::Future;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::parser::ParsedDocument;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Request failed with status code: {0}")]
    Status(u16),
    #[error("Request to {0} was cancelled")]
    Cancelled(String),
}

impl FetchError {
    /// The HTTP status code, when the server answered with anything but 200.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Retrieves a page and parses it into a [`ParsedDocument`].
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<ParsedDocument, FetchError>>;
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Upper bound on the whole round trip, body included.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client_builder(&self) -> ClientBuilder {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
    }
}

/// Fetches pages over HTTP with a single GET per call. There is no retry.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
    cancel: CancellationToken,
}

impl HttpDocumentFetcher {
    /// Builds a fetcher whose in-flight requests are abandoned as soon as
    /// `cancel` is cancelled.
    pub fn new(config: &FetcherConfig, cancel: CancellationToken) -> Result<Self, FetchError> {
        let client = config.client_builder().build()?;
        Ok(Self::with_client(client, cancel))
    }

    pub fn with_client(client: Client, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::error!("{} responded with {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedDocument, FetchError> {
        log::info!("Fetching {}...", url);

        let html = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                log::warn!("Fetch of {} cancelled", url);
                return Err(FetchError::Cancelled(url.to_string()));
            }
            result = self.get_html(url) => result?,
        };

        log::debug!("Received {} bytes from {}", html.len(), url);
        Ok(ParsedDocument::parse(&html))
    }
}

/// Serves the same canned response for every URL.
///
/// Useful for offline runs against a saved page and for exercising the
/// pipeline without a network.
#[derive(Debug)]
pub struct StaticDocumentFetcher {
    status: u16,
    body: String,
    requested: Mutex<Vec<String>>,
}

impl StaticDocumentFetcher {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            body: body.into(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::new(String::new())
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// URLs passed to [`DocumentFetcher::fetch`] so far, oldest first.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

impl DocumentFetcher for StaticDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedDocument, FetchError> {
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(url.to_string());
        }

        if self.status != StatusCode::OK.as_u16() {
            return Err(FetchError::Status(self.status));
        }

        Ok(ParsedDocument::parse(&self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rankings;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAGE: &str = r#"<div class="schedule"><table><tbody><tr><td>1</td><td>Alyssa</td></tr></tbody></table></div>"#;

    /// Accepts a single connection and answers it with `status_line` and
    /// `body`. Returns the URL to request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}/pvp/schedule")
    }

    /// Accepts a single connection and never answers it.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(10)).await;
                drop(socket);
            }
        });

        format!("http://{addr}/pvp/schedule")
    }

    fn local_fetcher(config: &FetcherConfig, cancel: CancellationToken) -> HttpDocumentFetcher {
        let client = config
            .client_builder()
            .no_proxy()
            .build()
            .expect("Failed to build client");
        HttpDocumentFetcher::with_client(client, cancel)
    }

    #[tokio::test]
    async fn test_http_fetch_ok() {
        let url = serve_once("200 OK", PAGE).await;
        let fetcher = local_fetcher(&FetcherConfig::default(), CancellationToken::new());

        let document = fetcher.fetch(&url).await.expect("Fetch should succeed");
        let rankings = parse_rankings(&document);

        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].name, "Alyssa");
    }

    #[tokio::test]
    async fn test_http_fetch_not_found() {
        let url = serve_once("404 Not Found", "<h1>Page Not Found</h1>").await;
        let fetcher = local_fetcher(&FetcherConfig::default(), CancellationToken::new());

        let err = fetcher.fetch(&url).await.expect_err("404 should fail");

        assert!(matches!(err, FetchError::Status(404)));
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_http_fetch_non_ok_success_status() {
        let url = serve_once("204 No Content", "").await;
        let fetcher = local_fetcher(&FetcherConfig::default(), CancellationToken::new());

        let err = fetcher.fetch(&url).await.expect_err("204 should fail");

        assert_eq!(err.status(), Some(204));
    }

    #[tokio::test]
    async fn test_http_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        drop(listener);

        let fetcher = local_fetcher(&FetcherConfig::default(), CancellationToken::new());
        let err = fetcher
            .fetch(&format!("http://{addr}/"))
            .await
            .expect_err("Closed port should fail");

        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_http_fetch_times_out() {
        let url = serve_silence().await;
        let config = FetcherConfig::default().with_timeout(Duration::from_millis(200));
        let fetcher = local_fetcher(&config, CancellationToken::new());

        let err = fetcher.fetch(&url).await.expect_err("Should time out");

        match err {
            FetchError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("Expected transport timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_fetch_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let fetcher = local_fetcher(&FetcherConfig::default(), cancel);

        let err = fetcher
            .fetch("http://127.0.0.1:9/")
            .await
            .expect_err("Cancelled fetch should fail");

        assert!(matches!(err, FetchError::Cancelled(ref url) if url == "http://127.0.0.1:9/"));
    }

    #[tokio::test]
    async fn test_http_fetch_cancelled_in_flight() {
        let url = serve_silence().await;
        let cancel = CancellationToken::new();
        let fetcher = local_fetcher(&FetcherConfig::default(), cancel.clone());

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = fetcher.fetch(&url).await.expect_err("Should be cancelled");

        assert!(matches!(err, FetchError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_static_fetcher_records_urls() {
        let fetcher = StaticDocumentFetcher::new(PAGE);

        fetcher.fetch("https://a.example/").await.expect("Fetch should succeed");
        fetcher.fetch("https://b.example/").await.expect("Fetch should succeed");

        assert_eq!(
            fetcher.requested_urls(),
            ["https://a.example/", "https://b.example/"]
        );
    }

    #[tokio::test]
    async fn test_static_fetcher_status() {
        let fetcher = StaticDocumentFetcher::with_status(503);

        let err = fetcher
            .fetch("https://a.example/")
            .await
            .expect_err("503 should fail");

        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_static_fetcher_from_missing_file() {
        assert!(StaticDocumentFetcher::from_file("fixtures/does-not-exist.html").is_err());
    }
}
