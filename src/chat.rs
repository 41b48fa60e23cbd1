//! Companion chat backed by an external text-generation service.
//!
//! The service is opaque: a prompt goes in, free text comes out. Everything
//! here is glue around that call, including the fixed persona preamble and
//! the canned replies used when the service is missing or failing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::{AppError, ChatError};

pub const PERSONA_PREAMBLE: &str = concat!(
    "You are 'Hayya', a caring, discreet, and knowledgeable AI assistant for a women's health app. ",
    "Your personality is like a wise, empathetic older sister or a trusted friend. ",
    "Your communication style must be in clear, simple, and gentle English. ",
    "You are designed to be a safe space for users. ",
    "CRITICAL RULE: Always include a short, friendly disclaimer in your responses that you are an AI ",
    "and not a medical professional, and users should consult a doctor for medical advice. ",
    "Example: '(Remember, I'm an AI friend, so please consult a doctor for medical advice!)' ",
    "NEVER provide a medical diagnosis. You can provide general, well-known health information but not specific diagnoses. ",
    "Here is the user's question, respond to it according to this personality: ",
);

pub const WELCOME_PROMPT: &str = concat!(
    "As 'Hayya', your defined AI personality, generate a warm, single-paragraph welcome message ",
    "inviting the user to talk about their health and wellness. ",
    "Start with 'Hello!' or 'Assalamu Alaikum!'.",
);

pub const OFFLINE_WELCOME: &str = "Hello! I'm Hayya. It seems my AI connection is having a little trouble right now, but I'm here to chat.";
pub const FALLBACK_WELCOME: &str = "Hello, I'm Hayya! Welcome to our safe space.";
pub const UNAVAILABLE_REPLY: &str = "I'm sorry, I'm unable to process messages right now.";
pub const GENERATION_FAILED_REPLY: &str =
    "I'm having a little trouble thinking. Could you try rephrasing?";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            endpoint,
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self::new(
            api_key,
            config.model.clone(),
            config.endpoint.clone(),
        ))
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, ChatError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or(ChatError::EmptyResponse)?;
    Ok(content.parts.into_iter().map(|p| p.text).collect())
}

/// Chat front-end over an optional generator.
#[derive(Clone, Default)]
pub struct ChatService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ChatService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        let generator = GeminiClient::from_config(config)
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        if generator.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, chat replies are disabled");
        }
        Self::new(generator)
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    /// Opening message for a new chat. Never fails.
    pub async fn welcome(&self) -> String {
        let Some(generator) = &self.generator else {
            return OFFLINE_WELCOME.to_string();
        };
        match generator.generate(WELCOME_PROMPT).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error generating initial message: {}", e);
                FALLBACK_WELCOME.to_string()
            }
        }
    }

    pub async fn reply(&self, message: &str) -> Result<String, AppError> {
        let generator = match &self.generator {
            Some(g) if !message.is_empty() => g,
            _ => return Err(AppError::ChatUnavailable(UNAVAILABLE_REPLY)),
        };

        let prompt = format!("{PERSONA_PREAMBLE}{message}");
        generator.generate(&prompt).await.map_err(|e| {
            tracing::error!("Error during AI generation: {}", e);
            AppError::ChatUnavailable(GENERATION_FAILED_REPLY)
        })
    }
}
