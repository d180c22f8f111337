use async_trait::async_trait;
use envpick_context::{EnvironmentLookup, LookupError};
use envpick_protocol::NavigationResult;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated lookup against the navigation service.
///
/// One GET per call with `Authorization: Bearer <token>`. Non-2xx responses
/// and undecodable bodies are errors; nothing is retried.
#[derive(Clone)]
pub struct HttpEnvironmentLookup {
    http: Client,
}

impl HttpEnvironmentLookup {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LookupError::Transport {
                url: String::new(),
                reason: err.to_string(),
            })?;
        Ok(Self { http })
    }

    fn headers(url: &str, token: &str) -> Result<HeaderMap, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
            LookupError::Transport {
                url: url.to_string(),
                reason: format!("invalid token header: {err}"),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[async_trait]
impl EnvironmentLookup for HttpEnvironmentLookup {
    async fn request_with_token(
        &self,
        url: &str,
        token: &str,
    ) -> Result<NavigationResult, LookupError> {
        let transport = |err: reqwest::Error| LookupError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        };

        let response = self
            .http
            .get(url)
            .headers(Self::headers(url, token)?)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let navigation: NavigationResult = serde_json::from_slice(&body)
            .map_err(|err| LookupError::Decode(err.to_string()))?;
        debug!(url, candidates = navigation.len(), "lookup response decoded");
        Ok(navigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned response and hand back the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read request");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}/user/services?svcid=s1"), handle)
    }

    #[tokio::test]
    async fn sends_bearer_token_and_decodes_environments() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"environments":[{"id":"e1","name":"Dev"},{"id":"e2"}],"services":[]}"#,
        );
        let lookup = HttpEnvironmentLookup::new().expect("client should build");

        let navigation = lookup
            .request_with_token(&url, "tok-1")
            .await
            .expect("lookup should succeed");
        assert_eq!(navigation.len(), 2);
        assert_eq!(navigation.environments[0].id, "e1");
        assert!(navigation.extra.contains_key("services"));

        let request = server.join().expect("server thread").to_ascii_lowercase();
        assert!(request.starts_with("get /user/services?svcid=s1 "));
        assert!(request.contains("authorization: bearer tok-1\r\n"));
        assert!(request.contains("accept: application/json\r\n"));
    }

    #[tokio::test]
    async fn null_environment_list_decodes_as_no_candidates() {
        let (url, server) = serve_once("200 OK", r#"{"environments":null}"#);
        let lookup = HttpEnvironmentLookup::new().expect("client should build");

        let navigation = lookup
            .request_with_token(&url, "tok")
            .await
            .expect("null list should decode");
        assert!(navigation.is_empty());
        server.join().expect("server thread");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (url, server) = serve_once("503 Service Unavailable", "{}");
        let lookup = HttpEnvironmentLookup::new().expect("client should build");

        let err = lookup
            .request_with_token(&url, "tok")
            .await
            .expect_err("503 should fail");
        assert!(matches!(err, LookupError::Status { status: 503, .. }));
        server.join().expect("server thread");
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", "not json");
        let lookup = HttpEnvironmentLookup::new().expect("client should build");

        let err = lookup
            .request_with_token(&url, "tok")
            .await
            .expect_err("bad body should fail");
        assert!(matches!(err, LookupError::Decode(_)));
        server.join().expect("server thread");
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
            listener.local_addr().expect("local addr")
        };
        let lookup = HttpEnvironmentLookup::new().expect("client should build");

        let err = lookup
            .request_with_token(&format!("http://{addr}/user/services"), "tok")
            .await
            .expect_err("closed port should fail");
        assert!(matches!(err, LookupError::Transport { .. }));
    }

    #[test]
    fn header_injection_in_token_is_rejected() {
        let err = HttpEnvironmentLookup::headers("https://x.example.com", "bad\ntoken")
            .expect_err("newline is not a valid header value");
        assert!(err.to_string().contains("invalid token header"));
    }
}
