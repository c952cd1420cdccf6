//! Remote record retrieval.
//!
//! This module provides the [`RecordSource`] seam used by the aggregator,
//! and the HTTP client that implements it against the UniProt REST API.

pub mod client;

pub use client::{ClientConfig, UniProtClient};

use thiserror::Error;

/// Errors raised while fetching a record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {accession} timed out")]
    Timeout { accession: String },

    #[error("cannot connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request for {accession} failed: {source}")]
    Transport {
        accession: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Something that turns an accession into a raw record document.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// Fetch the raw document for `accession`.
    async fn fetch(&self, accession: &str) -> Result<String, FetchError>;

    /// Human-readable description of where records come from.
    fn describe(&self) -> String;
}

/// Source backed by a fixed map of documents. Unknown accessions answer
/// like a 404 from the server.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StaticSource {
    pub documents: std::collections::HashMap<String, String>,
    pub calls: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl StaticSource {
    pub fn with<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            documents: documents
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            calls: Default::default(),
        }
    }
}

#[cfg(test)]
impl RecordSource for StaticSource {
    async fn fetch(&self, accession: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(accession.to_string());
        self.documents
            .get(accession)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("static://{}", accession),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_records_calls() {
        let source = StaticSource::with([("P19338", "<entry/>")]);

        let document = tokio_test::block_on(source.fetch("P19338")).unwrap();
        assert_eq!(document, "<entry/>");

        let missing = tokio_test::block_on(source.fetch("Q00000"));
        assert!(matches!(
            missing,
            Err(FetchError::Status { ref url, status }) if url == "static://Q00000" && status == 404
        ));
        assert_eq!(*source.calls.borrow(), vec!["P19338", "Q00000"]);
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://rest.uniprot.org/uniprotkb/BAD.xml".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(
            err.to_string(),
            "https://rest.uniprot.org/uniprotkb/BAD.xml returned HTTP 404 Not Found"
        );
    }
}
