use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_prompt, parse_reply, ExtractError, Extraction, TransactionExtractor};
use crate::config::ExtractorSection;

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiExtractor {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Req<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentOut>,
}

#[derive(Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    text: Option<String>,
}

impl GeminiExtractor {
    pub fn new(config: &ExtractorSection) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl TransactionExtractor for GeminiExtractor {
    fn extract(&self, text: &str, today: NaiveDate) -> Result<Extraction, ExtractError> {
        let key = self.api_key.as_deref().ok_or(ExtractError::MissingApiKey)?;

        let prompt = build_prompt(text, today);
        let body = Req {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let out: Resp = resp
            .json()
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        let mut reply = String::new();
        for candidate in out.candidates.into_iter().take(1) {
            for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                if let Some(t) = part.text {
                    reply.push_str(&t);
                }
            }
        }

        parse_reply(&reply, today)
    }
}
