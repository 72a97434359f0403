use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use log::debug;

use crate::llm::LlmInterface;

pub const BACKEND_ENV: &str = "COACHDESK_BACKEND";
pub const MODEL_ENV: &str = "COACHDESK_MODEL";
const OPENAI_KEY_ENVS: &[&str] = &["OPENAI_KEY", "OPENAI_API_KEY"];
const GEMINI_KEY_ENVS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Gemini,
    OpenAi,
    Ollama,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => write!(f, "gemini"),
            Backend::OpenAi => write!(f, "openai"),
            Backend::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Backend::Gemini),
            "openai" => Ok(Backend::OpenAi),
            "ollama" => Ok(Backend::Ollama),
            other => Err(anyhow!("unknown LLM backend '{}'", other)),
        }
    }
}

/// Which LLM to talk to and with what credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub backend: Backend,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl LlmConfig {
    /// Explicit arguments win over the environment.
    pub fn resolve(backend: Option<Backend>, model: Option<String>) -> Result<Self> {
        Self::resolve_with(backend, model, |key| env::var(key).ok())
    }

    pub fn resolve_with(
        backend: Option<Backend>,
        model: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let backend = match backend {
            Some(b) => b,
            None => match lookup(BACKEND_ENV) {
                Some(raw) => raw.parse()?,
                None => Backend::default(),
            },
        };
        let model = model.or_else(|| lookup(MODEL_ENV)).filter(|m| !m.is_empty());
        let key_envs: &[&str] = match backend {
            Backend::OpenAi => OPENAI_KEY_ENVS,
            Backend::Gemini => GEMINI_KEY_ENVS,
            Backend::Ollama => &[],
        };
        let api_key = key_envs
            .iter()
            .find_map(|k| lookup(*k))
            .filter(|k| !k.is_empty());
        debug!(
            "LlmConfig resolved backend={} model={:?} api_key_present={}",
            backend,
            model,
            api_key.is_some()
        );
        Ok(Self {
            backend,
            model,
            api_key,
        })
    }

    pub fn into_interface(self) -> Result<LlmInterface> {
        match self.backend {
            Backend::OpenAi => Ok(LlmInterface::new_openai(self.api_key, self.model)),
            Backend::Ollama => Ok(LlmInterface::new_ollama(self.model)),
            Backend::Gemini => {
                let key = self.api_key.ok_or_else(|| {
                    anyhow!(
                        "Gemini backend needs an API key in {}",
                        GEMINI_KEY_ENVS.join(" or ")
                    )
                })?;
                Ok(LlmInterface::new_gemini(key, self.model))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_to_gemini_with_env_key() {
        let cfg = LlmConfig::resolve_with(None, None, lookup(&[("API_KEY", "g-key")])).unwrap();
        assert_eq!(cfg.backend, Backend::Gemini);
        assert_eq!(cfg.api_key.as_deref(), Some("g-key"));
        assert_eq!(cfg.model, None);
    }

    #[test]
    fn arguments_override_environment() {
        let env = lookup(&[
            (BACKEND_ENV, "ollama"),
            (MODEL_ENV, "llama3.2:3b"),
            ("OPENAI_KEY", "sk-test"),
        ]);
        let cfg =
            LlmConfig::resolve_with(Some(Backend::OpenAi), Some("gpt-4o".into()), env).unwrap();
        assert_eq!(cfg.backend, Backend::OpenAi);
        assert_eq!(cfg.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn backend_and_model_from_environment() {
        let env = lookup(&[(BACKEND_ENV, "Ollama"), (MODEL_ENV, "qwen2.5")]);
        let cfg = LlmConfig::resolve_with(None, None, env).unwrap();
        assert_eq!(cfg.backend, Backend::Ollama);
        assert_eq!(cfg.model.as_deref(), Some("qwen2.5"));
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(LlmConfig::resolve_with(None, None, lookup(&[(BACKEND_ENV, "bard")])).is_err());
    }

    #[test]
    fn gemini_without_key_cannot_build_interface() {
        let cfg = LlmConfig::resolve_with(Some(Backend::Gemini), None, lookup(&[])).unwrap();
        assert!(cfg.into_interface().is_err());

        let cfg = LlmConfig::resolve_with(
            Some(Backend::Gemini),
            None,
            lookup(&[("GEMINI_API_KEY", "k")]),
        )
        .unwrap();
        let llm = cfg.into_interface().unwrap();
        assert_eq!(llm.describe(), "gemini(gemini-3-flash-preview)");
    }
}
