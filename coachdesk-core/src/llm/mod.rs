mod gemini;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use ollama_rs::generation::parameters::TimeUnit;
use openai::{Credentials, chat::*};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

use log::{debug, error, info};

fn strip_code_fences(s: &str) -> &str {
    let mut trimmed = s.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        trimmed = stripped;
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        trimmed = stripped;
    }
    if let Some(stripped) = trimmed.strip_suffix("```") {
        trimmed = stripped;
    }
    trimmed.trim()
}

/// Parses a model reply as `T`, tolerating a surrounding markdown fence.
pub(crate) fn parse_json<T>(raw: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = strip_code_fences(raw);
    serde_json::from_str(body).map_err(|e| {
        error!("model reply does not match the expected JSON: {} -- {}", body, e);
        anyhow!("model reply does not match the expected JSON: {}", e)
    })
}

/// One completion round trip. `response_schema` and `web_search` are honoured
/// natively by backends that support them; the others rely on the prompt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub response_schema: Option<&'a Value>,
    pub web_search: bool,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            response_schema: None,
            web_search: false,
        }
    }

    pub fn with_schema(mut self, schema: &'a Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }
}

type MockFn = Arc<dyn Fn(&str, &str) -> Result<String> + Send + Sync>;

enum LlmBackend {
    OpenAi {
        model: String,
        api_key: Option<String>,
    },
    Ollama {
        model: String,
    },
    Gemini {
        model: String,
        api_key: String,
    },
    Mock {
        responder: MockFn,
    },
}

pub struct LlmInterface {
    backend: LlmBackend,
}

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

static OLLAMA_CLIENT: OnceCell<Arc<ollama_rs::Ollama>> = OnceCell::const_new();
const OLLAMA_DEFAULT_MODEL: &str = "llama3.2:3b";

impl LlmInterface {
    pub fn new_openai(api_key: Option<String>, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
        info!("LlmInterface::new_openai selected model={}", model);
        Self {
            backend: LlmBackend::OpenAi { model, api_key },
        }
    }

    pub fn new_ollama(model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.to_string());
        info!("LlmInterface::new_ollama selected model={}", model);
        Self {
            backend: LlmBackend::Ollama { model },
        }
    }

    pub fn new_gemini(api_key: String, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
        info!("LlmInterface::new_gemini selected model={}", model);
        Self {
            backend: LlmBackend::Gemini { model, api_key },
        }
    }

    pub fn new_mock_fn(f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        debug!("LlmInterface::new_mock_fn creating mock backend");
        Self::new_mock_fallible(move |system, user| Ok(f(system, user)))
    }

    /// Mock whose responder can fail, standing in for transport errors.
    pub fn new_mock_fallible(
        f: impl Fn(&str, &str) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            backend: LlmBackend::Mock {
                responder: Arc::new(f),
            },
        }
    }

    pub fn describe(&self) -> String {
        match &self.backend {
            LlmBackend::OpenAi { model, .. } => format!("openai({})", model),
            LlmBackend::Ollama { model } => format!("ollama({})", model),
            LlmBackend::Gemini { model, .. } => format!("gemini({})", model),
            LlmBackend::Mock { .. } => "mock".to_string(),
        }
    }

    fn openai_creds(api_key: &Option<String>) -> Credentials {
        match api_key {
            Some(key) => {
                debug!("LlmInterface::openai_creds using provided API key");
                Credentials::new(key, "")
            }
            None => {
                debug!("LlmInterface::openai_creds loading from env");
                Credentials::from_env()
            }
        }
    }

    async fn get_ollama_client() -> Result<Arc<ollama_rs::Ollama>> {
        debug!("LlmInterface::get_ollama_client called");
        Ok(OLLAMA_CLIENT
            .get_or_init(|| async { Arc::new(ollama_rs::Ollama::default()) })
            .await
            .clone())
    }

    pub async fn call(&self, request: &CompletionRequest<'_>) -> Result<String> {
        debug!(
            "LlmInterface::call invoked backend={} schema={} web_search={}",
            self.describe(),
            request.response_schema.is_some(),
            request.web_search
        );

        match &self.backend {
            LlmBackend::OpenAi { model, api_key } => {
                if request.web_search {
                    debug!("OpenAI chat completions has no search tool; relying on prompt");
                }
                let creds = Self::openai_creds(api_key);
                let messages = vec![
                    ChatCompletionMessage {
                        role: ChatCompletionMessageRole::System,
                        content: Some(request.system.to_string()),
                        name: None,
                        function_call: None,
                        tool_call_id: None,
                        tool_calls: None,
                    },
                    ChatCompletionMessage {
                        role: ChatCompletionMessageRole::User,
                        content: Some(request.user.to_string()),
                        name: None,
                        function_call: None,
                        tool_call_id: None,
                        tool_calls: None,
                    },
                ];
                let result_completion = ChatCompletion::builder(model, messages)
                    .credentials(creds)
                    .create()
                    .await
                    .map_err(|e| {
                        error!("OpenAI ChatCompletion.create() failed: {}", e);
                        e
                    })?;
                let result_message = result_completion
                    .choices
                    .first()
                    .ok_or_else(|| anyhow!("OpenAI returned no choices"))?
                    .message
                    .clone();
                let content = result_message
                    .content
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                debug!("OpenAI response length={}", content.len());
                Ok(content)
            }
            LlmBackend::Ollama { model } => {
                debug!("Ollama call using model={}", model);
                let client = Self::get_ollama_client().await?;
                let options = ollama_rs::models::ModelOptions::default().temperature(0.2);
                let res = client
                    .generate(
                        ollama_rs::generation::completion::request::GenerationRequest::new(
                            model.clone(),
                            request.user.to_string(),
                        )
                        .options(options)
                        .system(request.system.to_string())
                        .keep_alive(
                            ollama_rs::generation::parameters::KeepAlive::Until {
                                time: 30,
                                unit: TimeUnit::Minutes,
                            },
                        ),
                    )
                    .await
                    .map_err(|e| {
                        error!("Ollama generate failed: {}", e);
                        e
                    })?;
                debug!("Ollama response length={}", res.response.len());
                Ok(res.response.trim().to_string())
            }
            LlmBackend::Gemini { model, api_key } => {
                let content = gemini::generate_content(api_key, model, request).await?;
                debug!("Gemini response length={}", content.len());
                Ok(content.trim().to_string())
            }
            LlmBackend::Mock { responder } => {
                debug!("Mock LLM responder invoked");
                let r = responder(request.system, request.user)?;
                debug!("Mock response length={}", r.len());
                Ok(r.trim().to_string())
            }
        }
    }

    pub async fn call_json<T>(&self, request: &CompletionRequest<'_>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let raw = self.call(request).await?;
        parse_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        ok: bool,
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  [] "), "[]");
    }

    #[tokio::test]
    async fn mock_call_json_passes_prompts_through() {
        let llm = LlmInterface::new_mock_fn(|system, user| {
            assert_eq!(system, "sys");
            assert_eq!(user, "usr");
            "```json\n{\"ok\": true}\n```".to_string()
        });
        let reply: Reply = llm
            .call_json(&CompletionRequest::new("sys", "usr"))
            .await
            .unwrap();
        assert_eq!(reply, Reply { ok: true });
    }

    #[tokio::test]
    async fn call_json_reports_unparseable_output() {
        let llm = LlmInterface::new_mock_fn(|_s, _u| "Sure! Here is your plan.".to_string());
        let err = llm
            .call_json::<Reply>(&CompletionRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not match the expected JSON"));
    }

    #[tokio::test]
    async fn fallible_mock_propagates_errors() {
        let llm = LlmInterface::new_mock_fallible(|_s, _u| Err(anyhow!("connection reset")));
        let err = llm.call(&CompletionRequest::new("s", "u")).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(llm.describe(), "mock");
    }
}
