//! Hosted inference backend.
//!
//! Each stage posts message texts to its own endpoint and reads back
//! label scores. Two response shapes are understood:
//!
//! - text classification: `[{"label": "...", "score": 0.9}, ...]`, optionally
//!   nested one level (`[[...]]`)
//! - zero-shot classification: `{"labels": [...], "scores": [...]}`
//!
//! Labels of the form `LABEL_<n>` are mapped by class index: through
//! [`Sentiment::CLASS_ORDER`] for sentiment and through the
//! [`SensitiveTopicTable`] for sensitive topics.

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{
    Classifier, ClassifierBackend, Prediction, SensitiveTopicTable, Stage, StageKind, argmax,
};
use crate::error::{ChatlensError, Result};
use crate::message::Sentiment;

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "CHATLENS_API_TOKEN";

/// Endpoints and credentials of the hosted models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Text-classification endpoint of the sentiment model
    pub sentiment_url: Option<String>,
    /// Zero-shot endpoint of the topic model
    pub topic_url: Option<String>,
    /// Text-classification endpoint of the sensitive-topic model
    pub sensitive_url: Option<String>,
    /// Bearer token; falls back to `CHATLENS_API_TOKEN`
    pub token: Option<String>,
    /// Per-request timeout in seconds; no timeout when unset
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sentiment_url(mut self, url: impl Into<String>) -> Self {
        self.sentiment_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_topic_url(mut self, url: impl Into<String>) -> Self {
        self.topic_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_sensitive_url(mut self, url: impl Into<String>) -> Self {
        self.sensitive_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Endpoint configured for `kind`.
    pub fn url_for(&self, kind: StageKind) -> Option<&str> {
        match kind {
            StageKind::Sentiment => self.sentiment_url.as_deref(),
            StageKind::Topic => self.topic_url.as_deref(),
            StageKind::SensitiveTopic => self.sensitive_url.as_deref(),
        }
    }
}

/// [`ClassifierBackend`] calling hosted inference endpoints.
pub struct HttpBackend {
    config: HttpConfig,
    token: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// Builds the HTTP client. The token is resolved once, here.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| ChatlensError::config(format!("failed to create HTTP client: {}", e)))?;
        let token = config
            .token
            .clone()
            .or_else(|| env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()));
        Ok(Self {
            config,
            token,
            client,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl ClassifierBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    fn acquire(&self, stage: &Stage) -> Result<Box<dyn Classifier + '_>> {
        let kind = stage.kind();
        let url = self.config.url_for(kind).ok_or_else(|| {
            ChatlensError::model_unavailable(kind, "no endpoint configured")
        })?;
        let url = reqwest::Url::parse(url).map_err(|e| {
            ChatlensError::model_unavailable(kind, format!("invalid endpoint '{}': {}", url, e))
        })?;
        debug!(stage = %kind, endpoint = %url, "HTTP classifier ready");
        Ok(Box::new(HttpClassifier {
            client: &self.client,
            token: self.token.as_deref(),
            url,
            stage: stage.clone(),
        }))
    }
}

struct HttpClassifier<'a> {
    client: &'a Client,
    token: Option<&'a str>,
    url: reqwest::Url,
    stage: Stage,
}

impl HttpClassifier<'_> {
    fn post(&self, body: &serde_json::Value) -> Result<String> {
        let kind = self.stage.kind();
        let mut request = self.client.post(self.url.clone()).json(body);
        if let Some(token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            let message = if e.is_connect() {
                format!("cannot connect to {}", self.url)
            } else if e.is_timeout() {
                format!("request to {} timed out", self.url)
            } else {
                e.to_string()
            };
            ChatlensError::classification(kind, message)
        })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ChatlensError::classification(kind, e.to_string()))?;
        if !status.is_success() {
            return Err(ChatlensError::classification(
                kind,
                format!("endpoint returned {}: {}", status.as_u16(), text),
            ));
        }
        Ok(text)
    }
}

impl Classifier for HttpClassifier<'_> {
    fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    fn classify(&mut self, text: &str) -> Result<Prediction> {
        let kind = self.stage.kind();
        let prediction = match &self.stage {
            Stage::Sentiment => {
                let body = self.post(&json!({ "inputs": text }))?;
                let best = best_label(&parse_label_scores(&body)?)
                    .ok_or_else(|| ChatlensError::classification(kind, "empty response"))?;
                Prediction::Sentiment(resolve_sentiment(&best)?)
            }
            Stage::Topic(vocabulary) => {
                let body = self.post(&json!({
                    "inputs": text,
                    "parameters": {
                        "candidate_labels": vocabulary.labels,
                        "multi_label": false,
                    },
                }))?;
                Prediction::Topic(parse_zero_shot(&body)?)
            }
            Stage::SensitiveTopic(table) => {
                let body = self.post(&json!({ "inputs": text }))?;
                let best = best_label(&parse_label_scores(&body)?)
                    .ok_or_else(|| ChatlensError::classification(kind, "empty response"))?;
                Prediction::SensitiveTopic(resolve_sensitive(&best, table)?)
            }
        };
        Ok(prediction)
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// One `{label, score}` entry of a text-classification response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextClassificationResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// Parses a text-classification response body.
pub fn parse_label_scores(body: &str) -> Result<Vec<LabelScore>> {
    let parsed: TextClassificationResponse = serde_json::from_str(body)?;
    Ok(match parsed {
        TextClassificationResponse::Flat(scores) => scores,
        TextClassificationResponse::Nested(batches) => {
            batches.into_iter().next().unwrap_or_default()
        }
    })
}

/// Highest-scoring label, first one on ties.
pub fn best_label(scores: &[LabelScore]) -> Option<String> {
    let values: Vec<f32> = scores.iter().map(|s| s.score).collect();
    argmax(&values).map(|i| scores[i].label.clone())
}

/// Parses a zero-shot response body and returns the best candidate label.
pub fn parse_zero_shot(body: &str) -> Result<String> {
    let parsed: ZeroShotResponse = serde_json::from_str(body)?;
    if parsed.labels.len() != parsed.scores.len() {
        return Err(ChatlensError::classification(
            StageKind::Topic,
            format!(
                "response has {} labels but {} scores",
                parsed.labels.len(),
                parsed.scores.len()
            ),
        ));
    }
    argmax(&parsed.scores)
        .map(|i| parsed.labels[i].clone())
        .ok_or_else(|| ChatlensError::classification(StageKind::Topic, "empty response"))
}

/// Extracts `n` from a `LABEL_<n>` label.
pub fn label_index(label: &str) -> Option<usize> {
    label.strip_prefix("LABEL_")?.parse().ok()
}

/// Maps a sentiment model label to a [`Sentiment`].
pub fn resolve_sentiment(label: &str) -> Result<Sentiment> {
    let resolved = match label_index(label) {
        Some(index) => Sentiment::from_class_index(index),
        None => label.parse().ok(),
    };
    resolved.ok_or_else(|| {
        ChatlensError::classification(
            StageKind::Sentiment,
            format!("unknown sentiment label '{}'", label),
        )
    })
}

/// Maps a sensitive-topic model label to a table label.
pub fn resolve_sensitive(label: &str, table: &SensitiveTopicTable) -> Result<String> {
    if let Some(mapped) = label_index(label).and_then(|id| table.label_for(id)) {
        return Ok(mapped.to_string());
    }
    if table.contains_label(label) {
        return Ok(label.to_string());
    }
    Err(ChatlensError::classification(
        StageKind::SensitiveTopic,
        format!("label '{}' is not in the sensitive topic table", label),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_and_nested() {
        let flat = r#"[{"label": "LABEL_1", "score": 0.8}, {"label": "LABEL_0", "score": 0.2}]"#;
        let nested = r#"[[{"label": "LABEL_1", "score": 0.8}, {"label": "LABEL_0", "score": 0.2}]]"#;
        assert_eq!(parse_label_scores(flat).unwrap().len(), 2);
        assert_eq!(parse_label_scores(flat).unwrap(), parse_label_scores(nested).unwrap());
        assert_eq!(best_label(&parse_label_scores(flat).unwrap()).as_deref(), Some("LABEL_1"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_label_scores(r#"{"error": "loading"}"#).is_err());
        assert!(parse_zero_shot("[]").is_err());
    }

    #[test]
    fn test_zero_shot_best_label() {
        let body = r#"{"sequence": "x", "labels": ["Economy", "Politics"], "scores": [0.3, 0.7]}"#;
        assert_eq!(parse_zero_shot(body).unwrap(), "Politics");
    }

    #[test]
    fn test_zero_shot_length_mismatch() {
        let body = r#"{"labels": ["Economy", "Politics"], "scores": [0.3]}"#;
        assert!(parse_zero_shot(body).unwrap_err().is_stage_failure());
    }

    #[test]
    fn test_resolve_sentiment() {
        assert_eq!(resolve_sentiment("LABEL_0").unwrap(), Sentiment::Neutral);
        assert_eq!(resolve_sentiment("LABEL_2").unwrap(), Sentiment::Negative);
        assert_eq!(resolve_sentiment("positive").unwrap(), Sentiment::Positive);
        assert!(resolve_sentiment("LABEL_7").is_err());
        assert!(resolve_sentiment("joy").is_err());
    }

    #[test]
    fn test_resolve_sensitive() {
        let table = SensitiveTopicTable::from_pairs([(0, "none"), (4, "gambling")]).unwrap();
        assert_eq!(resolve_sensitive("LABEL_4", &table).unwrap(), "gambling");
        assert_eq!(resolve_sensitive("none", &table).unwrap(), "none");
        assert!(resolve_sensitive("LABEL_9", &table).is_err());
    }

    #[test]
    fn test_acquire_without_endpoint_fails() {
        let backend = HttpBackend::new(HttpConfig::new().with_topic_url("http://localhost:1/topic"))
            .unwrap();
        let err = backend.acquire(&Stage::Sentiment).err().unwrap();
        assert!(matches!(
            err,
            ChatlensError::ModelUnavailable {
                stage: StageKind::Sentiment,
                ..
            }
        ));
        assert!(backend.acquire(&Stage::Topic(Default::default())).is_ok());
    }

    #[test]
    fn test_acquire_invalid_url() {
        let backend = HttpBackend::new(HttpConfig::new().with_sentiment_url("not a url")).unwrap();
        assert!(backend.acquire(&Stage::Sentiment).is_err());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: HttpConfig = serde_json::from_str(r#"{"topic_url": "http://x"}"#).unwrap();
        assert_eq!(config.url_for(StageKind::Topic), Some("http://x"));
        assert!(config.timeout_secs.is_none());
        assert!(config.url_for(StageKind::Sentiment).is_none());
    }
}
