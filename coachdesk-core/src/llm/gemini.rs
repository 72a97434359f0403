//! Google Gemini `generateContent` over plain HTTPS.
//!
//! Unlike the chat backends, Gemini accepts the response schema and the
//! Google Search grounding tool natively, so both are forwarded as-is.

use anyhow::{Result, anyhow};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::CompletionRequest;

pub(super) const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

static HTTP_CLIENT: OnceCell<Client> = OnceCell::const_new();

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

fn text_content(text: &str, role: Option<&str>) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![ContentPart {
            text: Some(text.to_string()),
        }],
    }
}

fn build_request(request: &CompletionRequest<'_>) -> GeminiRequest {
    let generation_config = request.response_schema.map(|schema| GenerationConfig {
        response_mime_type: "application/json".to_string(),
        response_schema: Some(schema.clone()),
    });
    let tools = request.web_search.then(|| {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    });
    GeminiRequest {
        contents: vec![text_content(request.user, Some("user"))],
        system_instruction: Some(text_content(request.system, None)),
        generation_config,
        tools,
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(err) = response.error {
        return Err(anyhow!("Gemini API error: {}", err.message));
    }
    let content = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .ok_or_else(|| anyhow!("No content in Gemini response"))?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(anyhow!("Gemini response carried no text"));
    }
    Ok(text)
}

pub(super) async fn generate_content(
    api_key: &str,
    model: &str,
    request: &CompletionRequest<'_>,
) -> Result<String> {
    let client = HTTP_CLIENT.get_or_init(|| async { Client::new() }).await;
    let url = format!("{API_BASE_URL}/models/{model}:generateContent");
    let body = build_request(request);
    debug!(
        "Sending Gemini request model={} tools={} schema={}",
        model,
        body.tools.is_some(),
        body.generation_config.is_some()
    );

    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| anyhow!("Gemini HTTP request failed: {}", e))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read Gemini response: {}", e))?;

    if !status.is_success() {
        error!("Gemini API error status={} body={}", status, response_text);
        return Err(anyhow!("Gemini API error ({}): {}", status, response_text));
    }

    let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
        error!("Failed to parse Gemini response: {}", e);
        anyhow!("Failed to parse Gemini response: {}", e)
    })?;
    extract_text(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_search_tool_and_schema() {
        let schema = json!({"type": "ARRAY", "items": {"type": "STRING"}});
        let req = CompletionRequest::new("be brief", "list days")
            .with_schema(&schema)
            .with_web_search(true);
        let body = serde_json::to_value(build_request(&req)).unwrap();

        assert_eq!(body["tools"], json!([{"google_search": {}}]));
        assert_eq!(
            body["generation_config"]["response_mime_type"],
            "application/json"
        );
        assert_eq!(body["generation_config"]["response_schema"], schema);
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "list days");
    }

    #[test]
    fn plain_request_omits_optional_sections() {
        let body = serde_json::to_value(build_request(&CompletionRequest::new("s", "u"))).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("generation_config").is_none());
    }

    #[test]
    fn extracts_and_joins_text_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[{\"a\":"},{"text":"1}]"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), r#"[{"a":1}]"#);
    }

    #[test]
    fn api_error_and_empty_candidates_fail() {
        let err: GeminiResponse =
            serde_json::from_str(r#"{"error":{"message":"quota exceeded"}}"#).unwrap();
        assert!(extract_text(err).unwrap_err().to_string().contains("quota"));

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(empty).is_err());
    }
}
