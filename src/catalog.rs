//! Static model catalog.
//!
//! The set of selectable models is fixed at compile time; nothing in the
//! application adds to or reorders it at runtime.

/// A selectable chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
}

impl ModelInfo {
    /// Label shown in the model picker, e.g. `GPT-4o (OpenAI)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.provider)
    }
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o",
        name: "GPT-4o",
        provider: "OpenAI",
    },
    ModelInfo {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        provider: "OpenAI",
    },
    ModelInfo {
        id: "gemini-1.5-flash",
        name: "Gemini Flash",
        provider: "Google",
    },
    ModelInfo {
        id: "mistral-large-latest",
        name: "Mistral Large",
        provider: "Mistral",
    },
    ModelInfo {
        id: "deepseek-chat",
        name: "DeepSeek Chat",
        provider: "DeepSeek",
    },
];

/// Looks up a model by id, falling back to the first catalog entry for ids
/// that are not (or no longer) in the catalog.
pub fn resolve(id: &str) -> &'static ModelInfo {
    MODELS.iter().find(|m| m.id == id).unwrap_or(&MODELS[0])
}

/// The model selected when no configuration exists.
pub fn default_model() -> &'static ModelInfo {
    &MODELS[0]
}
