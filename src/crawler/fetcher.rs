use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::crawler::models::SearchQuery;
use crate::error::FetchError;

/// Retrieves the raw results document for a query.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<String, FetchError>;
}

pub fn build_client(user_agent: &str, timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, query: &SearchQuery) -> Result<String, FetchError> {
        let url = query.to_url();
        debug!(%url, "Fetching search page");

        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(e, url.as_str()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.into(),
            });
        }

        res.text().await.map_err(|e| classify(e, url.as_str()))
    }
}

fn classify(err: reqwest::Error, url: &str) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { url: url.to_string() }
    } else {
        FetchError::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    fn query_for(addr: SocketAddr) -> SearchQuery {
        SearchQuery {
            endpoint: Url::parse(&format!("http://{addr}/sch/i.html")).unwrap(),
            params: vec![("_nkw".into(), "laptop".into())],
        }
    }

    /// Answers a single request with `response` and hangs up.
    async fn serve_once(response: String) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let _ = sock.write_all(response.as_bytes()).await;
            let _ = sock.shutdown().await;
        });

        addr
    }

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(build_client("test-agent", timeout).unwrap())
    }

    #[tokio::test]
    async fn success_returns_body() {
        let body = r#"<html><body><li class="s-item"></li></body></html>"#;
        let addr = serve_once(format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let html = fetcher(Duration::from_secs(5))
            .fetch(&query_for(addr))
            .await
            .unwrap();

        assert_eq!(html, body);
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let addr = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".into(),
        )
        .await;

        let err = fetcher(Duration::from_secs(5))
            .fetch(&query_for(addr))
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert!(url.contains("_nkw=laptop"), "{url}");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stalled_server_is_timeout_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let err = fetcher(Duration::from_millis(200))
            .fetch(&query_for(addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(Duration::from_secs(5))
            .fetch(&query_for(addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)), "{err:?}");
    }
}
