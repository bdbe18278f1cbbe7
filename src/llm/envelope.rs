//! Request envelope for the generateContent API
//!
//! The envelope is derived, never stored: it is rebuilt from the persona
//! preamble, the retained history and the new user input for every call.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::{AuraError, ImageAttachment, Result, Role, Turn};

/// Role names the completion service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    User,
    Model,
}

impl From<Role> for ServiceRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => ServiceRole::User,
            Role::Assistant => ServiceRole::Model,
        }
    }
}

/// Inline binary payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded)
    pub data: String,
}

/// One part of a content entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Base64-encode an image into an inline part
    pub fn image(image: &ImageAttachment) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: STANDARD.encode(&image.bytes),
            },
        }
    }

    /// Text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        }
    }
}

/// A role-tagged list of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: ServiceRole,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: ServiceRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(alias = "top_k")]
    pub top_k: u32,
    #[serde(alias = "top_p")]
    pub top_p: f64,
    #[serde(alias = "max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Harm categories with a configurable threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Blocking threshold for a harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// One content-safety threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Medium-and-above blocking for every category
    pub fn defaults() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        })
        .collect()
    }
}

/// Body of one generateContent call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl RequestEnvelope {
    /// Final content entry, which always carries the new user input
    pub fn latest(&self) -> Option<&Content> {
        self.contents.last()
    }

    /// Whether any part carries an image
    pub fn has_image(&self) -> bool {
        self.contents
            .iter()
            .flat_map(|c| &c.parts)
            .any(|p| matches!(p, Part::InlineData { .. }))
    }
}

/// Assemble the envelope for one completion call.
///
/// Layout: persona instruction (user role), persona acknowledgment (model
/// role), `history` in order with roles mapped, then the new user content.
/// `history` must not already contain the new user turn. History turns are
/// sent as text only.
pub fn build_request<'a>(
    config: &Config,
    history: impl IntoIterator<Item = &'a Turn>,
    text: &str,
    image: Option<&ImageAttachment>,
) -> RequestEnvelope {
    let mut contents = vec![
        Content::text(ServiceRole::User, config.persona.system_prompt.clone()),
        Content::text(ServiceRole::Model, config.persona.acknowledgment.clone()),
    ];

    contents.extend(
        history
            .into_iter()
            .map(|turn| Content::text(turn.role.into(), turn.text.clone())),
    );

    let mut parts = Vec::with_capacity(2);
    if !text.is_empty() || image.is_none() {
        parts.push(Part::text(text));
    }
    if let Some(image) = image {
        parts.push(Part::image(image));
    }
    contents.push(Content {
        role: ServiceRole::User,
        parts,
    });

    RequestEnvelope {
        contents,
        generation_config: config.generation.clone(),
        safety_settings: config.safety.clone(),
    }
}

/// generateContent response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

/// One generated candidate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Parts of a candidate
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part; only text parts are used
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Why a prompt was refused outright
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first text part
    pub fn into_text(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AuraError::empty_response(block_reason))?;

        candidate
            .content
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| AuraError::empty_response(candidate.finish_reason))
    }
}
