//! REST client for the muse generation endpoint.

use serde::{Deserialize, Serialize};
use sonnet_core::poem::{validate_for_publish, Poem, PoemSetDoc, PoemSetIssue};

/// Request body for `POST /v1/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Theme tags steering the generation.
    pub tags: Vec<String>,
    /// Optional free-form description; see [`crate::prompt`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw response body from the generation endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    title: String,
    tags: Vec<String>,
    poems: Vec<Vec<String>>,
}

/// Errors from the muse generation client.
#[derive(Debug, thiserror::Error)]
pub enum MuseError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Muse API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The endpoint returned 2xx but the document is structurally invalid.
    #[error("Generated document is invalid: {0}")]
    InvalidDocument(PoemSetIssue),
}

/// HTTP client for a single muse generation service.
pub struct MuseClient {
    client: reqwest::Client,
    api_url: String,
}

impl MuseClient {
    /// Create a new client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://muse.example.com`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Base HTTP URL of the generation service.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Generate a complete poem set.
    ///
    /// Sends a `POST /v1/generate` request and validates the returned
    /// document structure (exactly ten sonnets of fourteen non-blank
    /// lines) before returning it. A structurally invalid response is a
    /// [`MuseError::InvalidDocument`] naming the first failing sonnet.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<PoemSetDoc, MuseError> {
        let response = self
            .client
            .post(format!("{}/v1/generate", self.api_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MuseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let generated = response.json::<GenerateResponse>().await?;
        let doc = Self::validate(generated)?;

        tracing::info!(
            title = %doc.title,
            tags = ?doc.tags,
            "Generated poem set accepted"
        );
        Ok(doc)
    }

    /// Convert a raw response into a document, rejecting anything that
    /// does not meet the published-set structure.
    fn validate(generated: GenerateResponse) -> Result<PoemSetDoc, MuseError> {
        let doc = PoemSetDoc {
            title: generated.title,
            tags: generated.tags,
            poems: generated
                .poems
                .into_iter()
                .map(|lines| Poem { lines })
                .collect(),
        };

        validate_for_publish(&doc).map_err(MuseError::InvalidDocument)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonnet_core::poem::{LINES_PER_SONNET, POEMS_PER_SET};

    fn response(poems: Vec<Vec<String>>) -> GenerateResponse {
        GenerateResponse {
            title: "Generated".to_string(),
            tags: vec!["sea".to_string()],
            poems,
        }
    }

    fn full_poems() -> Vec<Vec<String>> {
        (0..POEMS_PER_SET)
            .map(|p| {
                (0..LINES_PER_SONNET)
                    .map(|l| format!("poem {p} line {l}"))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_valid_response_accepted() {
        let doc = MuseClient::validate(response(full_poems())).unwrap();
        assert_eq!(doc.title, "Generated");
        assert_eq!(doc.poems.len(), POEMS_PER_SET);
    }

    #[test]
    fn test_nine_poems_rejected() {
        let mut poems = full_poems();
        poems.pop();
        let err = MuseClient::validate(response(poems)).unwrap_err();
        assert!(matches!(
            err,
            MuseError::InvalidDocument(PoemSetIssue::WrongPoemCount { found: 9 })
        ));
    }

    #[test]
    fn test_blank_line_rejected_naming_first_failing_poem() {
        let mut poems = full_poems();
        poems[4][2] = "  ".to_string();
        let err = MuseClient::validate(response(poems)).unwrap_err();
        assert!(matches!(
            err,
            MuseError::InvalidDocument(PoemSetIssue::BlankLine { sonnet: 4, line: 2 })
        ));
    }

    #[test]
    fn test_request_serialization_omits_empty_description() {
        let request = GenerateRequest {
            tags: vec!["autumn".to_string()],
            description: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["tags"][0], "autumn");
    }
}
