//! Client for the remote text-generation endpoint.
//!
//! One best-effort POST per question: no retry, no deduplication, and no
//! timeout unless one is configured. `ask` never fails; any error is logged
//! and replaced by a fixed apology.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::AssistantConfig;
use crate::error::{AdvisorError, Result};
use crate::types::Product;

/// Returned by `ask` when the request or its response fails.
pub const APOLOGY: &str =
    "Sorry, there was an error connecting to our service. Please try again later.";

/// Returned when the response carries no recognizable reply text.
pub const NO_RESPONSE: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Stands in for a missing description in the request payload.
pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Selected product trimmed to what the endpoint needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            description: product
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        }
    }
}

/// Request body sent to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "selectedProducts")]
    pub selected_products: Vec<ProductSummary>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Prefix the user's message with an enumeration of the selected products.
pub fn user_prompt(message: &str, products: &[ProductSummary]) -> String {
    if products.is_empty() {
        return message.to_string();
    }
    let listing = products
        .iter()
        .map(|p| format!("{} by {} ({}): {}", p.name, p.brand, p.category, p.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Create a detailed beauty routine using these L'Oréal products: {}. User question: {}",
        listing, message
    )
}

/// Message asking for a complete routine over every selected product.
pub fn routine_request(selected: &[Product]) -> String {
    let names = selected
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Create a comprehensive step-by-step beauty routine using these {} L'Oréal products: {}. \
         Include application order, timing, and specific tips for optimal results.",
        selected.len(),
        names
    )
}

type Extractor = fn(&Value) -> Option<&str>;

fn chat_completion_content(doc: &Value) -> Option<&str> {
    doc.pointer("/choices/0/message/content").and_then(Value::as_str)
}

fn response_field(doc: &Value) -> Option<&str> {
    doc.get("response").and_then(Value::as_str)
}

fn message_field(doc: &Value) -> Option<&str> {
    doc.get("message").and_then(Value::as_str)
}

fn content_field(doc: &Value) -> Option<&str> {
    doc.get("content").and_then(Value::as_str)
}

fn bare_string(doc: &Value) -> Option<&str> {
    doc.as_str()
}

/// Reply locations, tried in order. Empty strings count as absent.
const REPLY_EXTRACTORS: &[Extractor] = &[
    chat_completion_content,
    response_field,
    message_field,
    content_field,
    bare_string,
];

/// Pull the reply text out of a response document.
pub fn extract_reply(doc: &Value) -> Option<&str> {
    REPLY_EXTRACTORS
        .iter()
        .filter_map(|extract| extract(doc))
        .find(|text| !text.is_empty())
}

pub struct AssistantClient {
    client: reqwest::Client,
    endpoint: Url,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl AssistantClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AdvisorError::Config(format!(
                    "Assistant endpoint scheme '{}' is not supported",
                    other
                )))
            }
        }

        let mut builder = reqwest::Client::builder().user_agent("routine-advisor/0.1");
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Assemble the request body for `message` and the current selection.
    pub fn build_request(&self, message: &str, selected: &[Product]) -> AssistantRequest {
        let summaries: Vec<ProductSummary> = selected.iter().map(ProductSummary::from).collect();
        AssistantRequest {
            messages: vec![
                ChatMessage::system(&self.system_prompt),
                ChatMessage::user(user_prompt(message, &summaries)),
            ],
            selected_products: summaries,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Send one request and return the reply text, surfacing failures.
    pub async fn request(&self, message: &str, selected: &[Product]) -> Result<String> {
        let body = self.build_request(message, selected);
        debug!(
            "Asking assistant at {} with {} selected products",
            self.endpoint,
            body.selected_products.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Assistant(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let doc: Value = response.json().await?;
        Ok(extract_reply(&doc).unwrap_or(NO_RESPONSE).to_string())
    }

    /// Like `request`, but degrades every failure to `APOLOGY`.
    pub async fn ask(&self, message: &str, selected: &[Product]) -> String {
        match self.request(message, selected).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error calling assistant endpoint: {}", e);
                APOLOGY.to_string()
            }
        }
    }
}
