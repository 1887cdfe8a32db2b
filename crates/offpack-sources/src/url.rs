use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::handler::{ConnectivityCheck, CheckResult};
use crate::{CheckError, Result};

/// Checks a source with a single HEAD request, no retries
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("offpack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CheckError::Client)?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// A 405 still proves the server answered
    fn is_reachable(status: StatusCode) -> bool {
        status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED
    }
}

#[async_trait]
impl ConnectivityCheck for HttpChecker {
    async fn check(&self, url: &str) -> Result<CheckResult> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CheckError::EmptyUrl);
        }

        let result = match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                if Self::is_reachable(status) {
                    CheckResult::reachable(status.as_u16())
                } else {
                    CheckResult::rejected(status.as_u16())
                }
            }
            Err(e) => CheckResult::unreachable(e),
        };

        debug!(url, success = result.success, status = ?result.status, "Checked source");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn checker() -> HttpChecker {
        // Local test servers must not go through a proxy from the environment
        HttpChecker::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    /// Serve a single request with the given status line, return the URL
    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            assert!(request.starts_with(b"HEAD "));

            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/kylin")
    }

    #[tokio::test]
    async fn test_success_status() {
        let url = serve_once("200 OK").await;
        let result = checker().check(&url).await.unwrap();

        assert!(result.success);
        assert_eq!(result.status, Some(200));
    }

    #[tokio::test]
    async fn test_method_not_allowed_counts_as_reachable() {
        let url = serve_once("405 Method Not Allowed").await;
        let result = checker().check(&url).await.unwrap();

        assert!(result.success);
        assert_eq!(result.status, Some(405));
    }

    #[tokio::test]
    async fn test_error_status_reports_code() {
        let url = serve_once("404 Not Found").await;
        let result = checker().check(&url).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.status, Some(404));
        assert!(result.message.contains("404"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = checker()
            .check(&format!("http://{addr}/"))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.status, None);
        assert!(result.message.starts_with("Connection failed"));
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected() {
        let err = HttpChecker::new().unwrap().check("   ").await.unwrap_err();
        assert!(matches!(err, CheckError::EmptyUrl));
    }
}
