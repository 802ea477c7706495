//! HTTP transport used to deliver push requests

use crate::{LokiError, Result};
use async_trait::async_trait;
use http::{Request, Response};

/// Sends one HTTP request and returns the complete response
///
/// Implementations must be safe to call from many tasks at once. Timeouts
/// and cancellation belong to the implementation; the hook enforces none.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute `request`; any failure to obtain a full response is
    /// [`LokiError::Transport`]
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let request = reqwest::Request::try_from(request)?;
        let response = self.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let mut out = Response::new(body.to_vec());
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn test_reqwest_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_body("ping")
            .with_status(202)
            .with_header("x-test", "yes")
            .with_body("pong")
            .create_async()
            .await;

        let request = Request::post(format!("{}/echo", server.url()))
            .body(b"ping".to_vec())
            .unwrap();
        let response = reqwest::Client::new().send(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-test"], "yes");
        assert_eq!(response.body(), b"pong");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = Request::post(format!("http://{}/loki/api/v1/push", addr))
            .body(Vec::new())
            .unwrap();
        let result = reqwest::Client::new().send(request).await;
        assert!(matches!(result, Err(LokiError::Transport(_))));
    }
}
