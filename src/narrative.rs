use reqwest::blocking::Client;
use serde_json::{json, Value as JsonValue};

use crate::analysis::Analysis;
use crate::chart::ChartArtifact;
use crate::config::Config;
use crate::error::NarrativeError;

const PROMPT_PREAMBLE: &str = "Write a story-based analysis of the dataset based on the following summary. \
Integrate any patterns, trends, or anomalies into a creative narrative:\n";

/// Longest error body echoed into the story text.
const MAX_ERROR_BODY: usize = 500;

// ---------------------------------------------------------------------------
// Narrative client
// ---------------------------------------------------------------------------

/// Asks a chat-completion endpoint to turn the analysis into a story.
pub struct NarrativeClient {
    http: Client,
    api_url: String,
    api_token: String,
    model: String,
}

impl NarrativeClient {
    pub fn new(config: &Config) -> Result<Self, NarrativeError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            model: config.model.clone(),
        })
    }

    /// Produce the story text. Never fails: any error becomes the text
    /// `Error generating story: <cause>` so that a report is still written.
    ///
    /// Charts are accepted for symmetry with the report but are not sent.
    pub fn narrate(&self, analysis: &Analysis, _charts: &[ChartArtifact]) -> String {
        let prompt = build_prompt(analysis);
        match self.request_story(&prompt) {
            Ok(story) => {
                log::info!("Received narrative ({} chars)", story.len());
                story
            }
            Err(e) => {
                log::warn!("Narrative request failed [{}]: {e}", e.kind());
                format!("Error generating story: {e}")
            }
        }
    }

    /// One POST to the completion endpoint; returns
    /// `choices[0].message.content`.
    pub fn request_story(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().unwrap_or_default();
            truncate_chars(&mut text, MAX_ERROR_BODY);
            return Err(NarrativeError::Status { status, body: text });
        }

        let json: JsonValue = response.json()?;
        extract_content(&json)
    }
}

/// Prompt text: fixed preamble plus the analysis as pretty JSON.
pub fn build_prompt(analysis: &Analysis) -> String {
    let summary = serde_json::to_string_pretty(analysis)
        .unwrap_or_else(|e| format!("<analysis could not be serialized: {e}>"));
    format!("{PROMPT_PREAMBLE}{summary}")
}

fn extract_content(json: &JsonValue) -> Result<String, NarrativeError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            NarrativeError::MalformedBody("missing choices[0].message.content".to_string())
        })
}

fn truncate_chars(s: &mut String, max: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
        s.push('…');
    }
}
