//! The host-injected chat capability.
//!
//! The application never talks to an AI provider itself; the embedding host
//! may install an object implementing [`ChatCapability`] into a
//! [`CapabilitySlot`] at any point before or after startup. When no capability
//! is ever installed, dispatch falls back to the offline demo responder.

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reply text used when a capability returns an envelope without content.
pub const NO_REPLY_FALLBACK: &str = "No reply received.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

/// One turn of the conversation payload handed to the capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model: String,
}

/// What a capability may hand back: either the reply text directly, or an
/// envelope exposing the text at `message.content`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CapabilityReply {
    Text(String),
    Envelope { message: ReplyMessage },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMessage {
    pub content: Option<String>,
}

impl CapabilityReply {
    /// Extracts the reply text, degrading to [`NO_REPLY_FALLBACK`] when an
    /// envelope carries no content.
    pub fn into_text(self) -> String {
        match self {
            CapabilityReply::Text(text) => text,
            CapabilityReply::Envelope { message } => message
                .content
                .unwrap_or_else(|| NO_REPLY_FALLBACK.to_string()),
        }
    }
}

impl From<&str> for CapabilityReply {
    fn from(text: &str) -> Self {
        CapabilityReply::Text(text.to_string())
    }
}

/// An external chat service. Opaque to this application: transport, provider
/// schema, and authentication all live on the other side of this trait.
#[async_trait]
pub trait ChatCapability: Send + Sync {
    async fn chat(&self, conversation: &[Turn], options: ChatOptions) -> Result<CapabilityReply>;
}

/// Shared slot through which the host hands a capability to the session.
///
/// Install-once: the first `install` wins and later calls are ignored, so
/// readiness has exactly one definitive transition to observe.
#[derive(Clone, Default)]
pub struct CapabilitySlot {
    inner: Arc<OnceLock<Arc<dyn ChatCapability>>>,
}

impl CapabilitySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, capability: Arc<dyn ChatCapability>) {
        let _ = self.inner.set(capability);
    }

    pub fn get(&self) -> Option<Arc<dyn ChatCapability>> {
        self.inner.get().cloned()
    }

    pub fn is_present(&self) -> bool {
        self.inner.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_from_plain_text() {
        let reply: CapabilityReply = "Hi there".into();
        assert_eq!(reply.into_text(), "Hi there");
    }

    #[test]
    fn reply_from_envelope() {
        let reply = CapabilityReply::Envelope {
            message: ReplyMessage {
                content: Some("Hi there".to_string()),
            },
        };
        assert_eq!(reply.into_text(), "Hi there");
    }

    #[test]
    fn empty_envelope_degrades_to_fallback() {
        let reply = CapabilityReply::Envelope {
            message: ReplyMessage { content: None },
        };
        assert_eq!(reply.into_text(), NO_REPLY_FALLBACK);
    }

    #[test]
    fn reply_deserializes_from_either_shape() {
        let text: CapabilityReply = serde_json::from_str("\"Hi there\"").unwrap();
        assert_eq!(text.into_text(), "Hi there");

        let envelope: CapabilityReply =
            serde_json::from_str(r#"{"message":{"content":"Hi there"}}"#).unwrap();
        assert_eq!(envelope.into_text(), "Hi there");
    }

    #[test]
    fn turn_serializes_with_lowercase_role() {
        let turn = Turn::new(TurnRole::Assistant, "ok");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }

    #[tokio::test]
    async fn slot_install_is_first_wins() {
        struct Fixed(&'static str);

        #[async_trait]
        impl ChatCapability for Fixed {
            async fn chat(
                &self,
                _conversation: &[Turn],
                _options: ChatOptions,
            ) -> Result<CapabilityReply> {
                Ok(self.0.into())
            }
        }

        let slot = CapabilitySlot::new();
        assert!(!slot.is_present());

        slot.install(Arc::new(Fixed("first")));
        slot.install(Arc::new(Fixed("second")));
        assert!(slot.is_present());

        let capability = slot.get().unwrap();
        let reply = capability
            .chat(&[], ChatOptions { model: "m".into() })
            .await
            .unwrap();
        assert_eq!(reply.into_text(), "first");
    }
}
