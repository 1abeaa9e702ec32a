use anyhow::{bail, Context};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::telegram::models::{ApiResponse, GetUpdates, SendMessage, Update, User};

/// Bot API client. The token is part of every request path, so request
/// errors are stripped of their URL before they are reported.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> anyhow::Result<Self> {
        // Long polls must be allowed to outlive the server-side wait.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .context("failed to build telegram http client")?;

        Ok(Self {
            client,
            base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout_secs,
        })
    }

    /// Validates the token.
    pub async fn get_me(&self) -> anyhow::Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        let _: serde_json::Value = self.call("sendMessage", &body).await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base, method);

        let res: ApiResponse<T> = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("telegram {method} request failed"))?
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("telegram {method} returned malformed json"))?;

        match (res.ok, res.result) {
            (true, Some(result)) => Ok(result),
            _ => bail!(
                "telegram {} failed: {}",
                method,
                res.description.unwrap_or_else(|| "no description".into())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const TOKEN: &str = "123456:SECRET-TOKEN";

    #[tokio::test]
    async fn connection_errors_do_not_reveal_token() {
        // bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TelegramClient::new(&format!("http://{addr}"), TOKEN, 1).unwrap();
        let err = client.get_me().await.unwrap_err();

        assert!(!format!("{err:?}").contains("SECRET"), "{err:?}");
        assert!(!format!("{err:#}").contains("SECRET"), "{err:#}");
        assert!(format!("{err:#}").contains("getMe"));
    }

    #[tokio::test]
    async fn malformed_body_errors_do_not_reveal_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let body = "not json";
            let res = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = sock.write_all(res.as_bytes()).await;
        });

        let client = TelegramClient::new(&format!("http://{addr}/"), TOKEN, 1).unwrap();
        let err = client.get_me().await.unwrap_err();

        assert!(!format!("{err:?}").contains("SECRET"), "{err:?}");
        assert!(format!("{err:#}").contains("malformed json"));
    }

    #[tokio::test]
    async fn api_rejection_reports_description() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let body = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
            let res = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = sock.write_all(res.as_bytes()).await;
        });

        let client = TelegramClient::new(&format!("http://{addr}"), TOKEN, 1).unwrap();
        let err = client.get_me().await.unwrap_err();

        assert_eq!(err.to_string(), "telegram getMe failed: Unauthorized");
    }
}
