//! HTTP client for UniProt entries.

use crate::fetch::{FetchError, RecordSource};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// Placeholder replaced by the accession in URL templates.
pub const ACCESSION_PLACEHOLDER: &str = "{accession}";

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL template containing `{accession}`.
    pub url_template: String,
    /// Request timeout; `None` keeps the transport default.
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url_template: "https://rest.uniprot.org/uniprotkb/{accession}.xml".to_string(),
            timeout_seconds: None,
            user_agent: format!("locscout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fetches UniProt XML records over HTTP, one request per accession.
pub struct UniProtClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl UniProtClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !config.url_template.contains(ACCESSION_PLACEHOLDER) {
            anyhow::bail!(
                "URL template must contain {}: {}",
                ACCESSION_PLACEHOLDER,
                config.url_template
            );
        }

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// URL for one accession.
    pub fn record_url(&self, accession: &str) -> String {
        record_url(&self.config.url_template, accession)
    }
}

impl RecordSource for UniProtClient {
    async fn fetch(&self, accession: &str) -> Result<String, FetchError> {
        let url = self.record_url(accession);
        debug!("GET {}", url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    accession: accession.to_string(),
                }
            } else if e.is_connect() {
                FetchError::Connect {
                    url: url.clone(),
                    source: e,
                }
            } else {
                FetchError::Transport {
                    accession: accession.to_string(),
                    source: e,
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            accession: accession.to_string(),
            source: e,
        })
    }

    fn describe(&self) -> String {
        self.config.url_template.clone()
    }
}

/// Substitute the accession into a URL template.
pub fn record_url(template: &str, accession: &str) -> String {
    template.replace(ACCESSION_PLACEHOLDER, accession.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_subcellular_locations;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Answer one connection per canned response, in order.
    async fn serve(responses: Vec<String>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for response in responses {
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
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        addr
    }

    fn client_for(template: String, timeout_seconds: Option<u64>) -> UniProtClient {
        UniProtClient::new(ClientConfig {
            url_template: template,
            timeout_seconds,
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_status_error_then_body() {
        let body = r#"<entry><comment type="subcellular location"><subcellularLocation><location>Membrane</location></subcellularLocation></comment></entry>"#;
        let addr = serve(vec![
            http_response("404 Not Found", ""),
            http_response("200 OK", body),
        ])
        .await;
        let client = client_for(format!("http://{}/{{accession}}.xml", addr), Some(5));

        let missing = client.fetch("P1").await;
        match missing {
            Err(FetchError::Status { url, status }) => {
                assert_eq!(url, format!("http://{}/P1.xml", addr));
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("expected status error, got {:?}", other),
        }

        let document = client.fetch("P1").await.unwrap();
        assert_eq!(
            extract_subcellular_locations(&document).unwrap(),
            vec!["Membrane"]
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = client_for("http://127.0.0.1:1/{accession}".to_string(), Some(5));

        let err = client.fetch("P1").await.unwrap_err();
        assert!(
            matches!(err, FetchError::Connect { ref url, .. } if url == "http://127.0.0.1:1/P1"),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and never answer.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });
        let client = client_for(format!("http://{}/{{accession}}", addr), Some(1));

        let err = client.fetch("P2").await.unwrap_err();
        assert!(
            matches!(err, FetchError::Timeout { ref accession } if accession == "P2"),
            "unexpected error: {:?}",
            err
        );
        server.abort();
    }

    #[test]
    fn test_record_url() {
        let config = ClientConfig::default();
        assert_eq!(
            record_url(&config.url_template, "P19338"),
            "https://rest.uniprot.org/uniprotkb/P19338.xml"
        );
        assert_eq!(
            record_url("https://www.uniprot.org/uniprot/{accession}.xml", " Q9Y6K9 "),
            "https://www.uniprot.org/uniprot/Q9Y6K9.xml"
        );
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let config = ClientConfig {
            url_template: "https://rest.uniprot.org/uniprotkb/".to_string(),
            ..ClientConfig::default()
        };
        assert!(UniProtClient::new(config).is_err());
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.timeout_seconds.is_none());
        assert!(config.user_agent.starts_with("locscout/"));
    }
}
