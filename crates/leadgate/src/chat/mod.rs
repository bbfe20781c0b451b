//! Visitor chat backed by a hosted generative model. The client is a thin
//! pass-through: catalog-derived system prompt plus the widget's
//! conversation history, one answer back.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog;

/// Conversation role as exchanged with the site widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    const fn wire_name(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of widget conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat model unreachable: {0}")]
    Transport(String),
    #[error("chat model rejected the request: {0}")]
    Upstream(String),
}

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";

const GENERATE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Reply used when the model returns no usable candidate.
const FALLBACK_REPLY: &str = "I apologize, could you please repeat that?";

/// Client for the hosted generative-AI chat endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("http client builds"),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Answer a visitor question given the prior widget conversation.
    pub async fn answer(
        &self,
        history: &[ChatMessage],
        question: &str,
    ) -> Result<String, ChatError> {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|message| {
                json!({
                    "role": message.role.wire_name(),
                    "parts": [{ "text": message.text.as_str() }],
                })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": question }] }));

        let url = format!(
            "{GENERATE_ENDPOINT}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let payload = json!({
            "system_instruction": { "parts": [{ "text": sales_context() }] },
            "contents": contents,
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ChatError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream(format!("{status}: {detail}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ChatError::Upstream(err.to_string()))?;
        Ok(extract_reply(&body))
    }
}

/// System prompt assembled from the catalog, matching the deployed widget.
pub fn sales_context() -> String {
    let mut context = String::new();
    writeln!(
        context,
        "You are an AI sales engineer for {}.",
        catalog::COMPANY_NAME
    )
    .expect("write role");
    writeln!(context, "\nCompany Info:").expect("write header");
    writeln!(context, "Name: {}", catalog::COMPANY_NAME).expect("write name");
    writeln!(context, "Addr: {}", catalog::COMPANY_ADDRESS).expect("write address");
    writeln!(context, "Phone: {}", catalog::COMPANY_PHONE).expect("write phone");
    writeln!(context, "Email: {}", catalog::COMPANY_EMAIL).expect("write email");

    writeln!(context, "\nProducts:").expect("write header");
    for product in catalog::PRODUCTS {
        writeln!(
            context,
            "- {} ({}): {}",
            product.name, product.category, product.description
        )
        .expect("write product");
    }

    writeln!(context, "\nServices:").expect("write header");
    for service in catalog::SERVICES {
        writeln!(context, "- {}: {}", service.title, service.description).expect("write service");
    }

    writeln!(
        context,
        "\nGoal: Answer customer queries instantly and accurately."
    )
    .expect("write goal");
    writeln!(context, "\nCRITICAL INSTRUCTIONS FOR SPEED:").expect("write header");
    writeln!(
        context,
        "1. KEEP RESPONSES UNDER 3 SENTENCES unless a detailed technical spec is requested."
    )
    .expect("write rule");
    writeln!(context, "2. BE DIRECT. Do not fluff.").expect("write rule");
    writeln!(
        context,
        "3. If asked for price -> \"Please contact us for a quote.\""
    )
    .expect("write rule");
    writeln!(context, "4. Speak professionally but concisely.").expect("write rule");

    context
}

fn extract_reply(body: &Value) -> String {
    let text: String = body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_context_covers_the_catalog() {
        let context = sales_context();
        assert!(context.contains(catalog::COMPANY_NAME));
        for product in catalog::PRODUCTS {
            assert!(context.contains(product.name));
        }
        for service in catalog::SERVICES {
            assert!(context.contains(service.title));
        }
        assert!(context.contains("UNDER 3 SENTENCES"));
    }

    #[test]
    fn extract_reply_joins_candidate_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "We ship " }, { "text": "nationwide." }]
                }
            }]
        });
        assert_eq!(extract_reply(&body), "We ship nationwide.");
    }

    #[test]
    fn extract_reply_falls_back_on_empty_candidates() {
        assert_eq!(extract_reply(&json!({})), FALLBACK_REPLY);
        let blank = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        });
        assert_eq!(extract_reply(&blank), FALLBACK_REPLY);
    }

    #[test]
    fn chat_message_uses_lowercase_roles() {
        let message = ChatMessage {
            role: ChatRole::Model,
            text: "Hello".to_string(),
        };
        let value = serde_json::to_value(&message).expect("serializes");
        assert_eq!(value["role"], json!("model"));
    }
}
