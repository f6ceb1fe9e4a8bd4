use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::feeds::TextGenerator;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text of the first candidate.
pub fn normalize_completion(body: &str) -> Result<String, FeedError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or(FeedError::MissingField("candidates"))?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(FeedError::MissingField("text"));
    }
    Ok(text)
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        GeminiClient {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, FeedError> {
        if self.api_key.is_empty() {
            return Err(FeedError::Disabled("GEMINI_API_KEY"));
        }
        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let transport = |source| FeedError::Transport {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(transport)?;
        normalize_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_parts_of_first_candidate() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "India|A|Batsman\n"}, {"text": "India|B|Bowler"}]}}]}"#;
        assert_eq!(normalize_completion(body).unwrap(), "India|A|Batsman\nIndia|B|Bowler");
    }

    #[test]
    fn blocked_prompt_has_no_candidates() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(matches!(
            normalize_completion(body),
            Err(FeedError::MissingField("candidates"))
        ));
    }
}
