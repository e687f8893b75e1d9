//! OpenAI-backed extraction collaborator.
//!
//! # Responsibility
//! - Turn one raw note into an `ExtractedEntry` via chat-completion
//!   function calling.
//! - Retry rate-limited requests with bounded exponential backoff.
//!
//! # Invariants
//! - Requests force the extraction function at temperature 0.
//! - Failures map onto `ExtractError`; the caller decides how to degrade.

use dealnote_core::{ExtractError, ExtractedEntry, Extractor};
use log::warn;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const BACKOFF_FACTOR: u32 = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const EXTRACTION_FUNCTION: &str = "extract_deal_metadata";

/// Connection settings for the OpenAI chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    /// Endpoint root, e.g. `https://api.openai.com`. Overridable for
    /// compatible gateways and tests.
    pub base_url: String,
}

/// Blocking OpenAI client implementing the core `Extractor` contract.
pub struct OpenAiExtractor {
    config: OpenAiConfig,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

impl OpenAiExtractor {
    pub fn new(config: OpenAiConfig) -> Result<Self, ExtractError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ExtractError::Unavailable(format!("client setup failed: {err}")))?;

        Ok(Self { config, client })
    }

    fn request_body(&self, raw_text: &str) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": "Extract project_name, entry_type, notes, deliverables, \
                                dates, owners, and dependencies from the following \
                                journal entry."
                },
                { "role": "user", "content": raw_text }
            ],
            "functions": [extraction_schema()],
            "function_call": { "name": EXTRACTION_FUNCTION },
            "temperature": 0
        })
    }

    fn send_once(&self, raw_text: &str) -> Result<reqwest::blocking::Response, ExtractError> {
        self.client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(raw_text))
            .send()
            .map_err(|err| ExtractError::Unavailable(err.to_string()))
    }
}

impl Extractor for OpenAiExtractor {
    fn extract(&self, raw_text: &str) -> Result<ExtractedEntry, ExtractError> {
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 1..=MAX_RETRIES {
            let response = self.send_once(raw_text)?;
            let status = response.status();

            if status.as_u16() == 429 && attempt < MAX_RETRIES {
                warn!(
                    "event=extract_rate_limited module=openai status=retry attempt={attempt} \
                     backoff_s={}",
                    backoff.as_secs()
                );
                std::thread::sleep(backoff);
                backoff *= BACKOFF_FACTOR;
                continue;
            }

            if !status.is_success() {
                return Err(ExtractError::Unavailable(format!(
                    "chat completion returned HTTP {status}"
                )));
            }

            let parsed: ChatResponse = response
                .json()
                .map_err(|err| ExtractError::Decode(format!("invalid response body: {err}")))?;
            let arguments = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.function_call)
                .map(|call| call.arguments)
                .ok_or_else(|| {
                    ExtractError::Decode("response carries no function call".to_string())
                })?;

            return ExtractedEntry::from_json_str(&arguments);
        }

        Err(ExtractError::Unavailable(
            "rate limit persisted after retries".to_string(),
        ))
    }
}

fn extraction_schema() -> serde_json::Value {
    json!({
        "name": EXTRACTION_FUNCTION,
        "description": "Extract structured deal and scheduling information from a journal entry.",
        "parameters": {
            "type": "object",
            "properties": {
                "project_name": { "type": "string" },
                "entry_type": { "type": "string" },
                "notes": { "type": "string" },
                "deliverables": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Key actions or deliverables mentioned."
                },
                "dates": {
                    "type": "array",
                    "items": { "type": "string", "format": "date" },
                    "description": "Due dates in ISO format (YYYY-MM-DD), aligned with deliverables."
                },
                "owners": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Responsible agents, aligned with deliverables."
                },
                "dependencies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tasks each deliverable depends on, aligned with deliverables."
                }
            },
            "required": ["project_name", "entry_type", "notes"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{OpenAiConfig, OpenAiExtractor};
    use dealnote_core::{ExtractError, Extractor};
    use httpmock::prelude::*;
    use serde_json::json;

    fn extractor_for(server: &MockServer) -> OpenAiExtractor {
        OpenAiExtractor::new(OpenAiConfig {
            api_key: "test-key".to_string(),
            model: "gpt-4o".to_string(),
            base_url: server.base_url(),
        })
        .unwrap()
    }

    #[test]
    fn extract_decodes_the_function_call_arguments() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{
                    "message": {
                        "function_call": {
                            "name": "extract_deal_metadata",
                            "arguments": "{\"project_name\": \"Titan\", \
                                           \"entry_type\": \"Meeting\", \
                                           \"notes\": \"Timeline discussion\", \
                                           \"deliverables\": [\"Draft NDA\"], \
                                           \"dates\": [\"2025-01-03\"]}"
                        }
                    }
                }]
            }));
        });

        let entry = extractor_for(&server).extract("raw note").unwrap();

        mock.assert();
        assert_eq!(entry.project_name, "Titan");
        assert_eq!(entry.deliverables, vec!["Draft NDA".to_string()]);
        assert_eq!(entry.dates, vec!["2025-01-03".to_string()]);
        assert!(entry.owners.is_empty());
    }

    #[test]
    fn extract_maps_server_errors_to_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500);
        });

        let err = extractor_for(&server).extract("raw note").unwrap_err();
        assert!(matches!(err, ExtractError::Unavailable(_)));
    }

    #[test]
    fn extract_rejects_responses_without_a_function_call() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(json!({ "choices": [{ "message": {} }] }));
        });

        let err = extractor_for(&server).extract("raw note").unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }
}
