//! Offline demo responder.
//!
//! When no chat capability has been installed, dispatch still produces a
//! reply: after a fixed simulated delay, one of four templated strings naming
//! the current model and echoing the user's text. The template picker is
//! injectable so tests can pin the choice.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::catalog::ModelInfo;

pub const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

type ReplyPicker = Box<dyn Fn(usize) -> usize + Send + Sync>;

pub struct DemoResponder {
    pick: ReplyPicker,
}

impl Default for DemoResponder {
    fn default() -> Self {
        Self::with_picker(Box::new(|len| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            nanos as usize % len
        }))
    }
}

impl DemoResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A responder with a fixed template choice, for deterministic tests.
    pub fn with_picker(pick: ReplyPicker) -> Self {
        Self { pick }
    }

    /// Waits out the simulated delay and returns one templated reply. Every
    /// template names the model and its provider and echoes `message`.
    pub async fn reply(&self, model: &ModelInfo, message: &str) -> String {
        tokio::time::sleep(SIMULATED_DELAY).await;
        let templates = Self::templates(model, message);
        let index = (self.pick)(templates.len()) % templates.len();
        templates.into_iter().nth(index).unwrap_or_default()
    }

    fn templates(model: &ModelInfo, message: &str) -> Vec<String> {
        vec![
            format!(
                "Hello! I'm {} from {}. This is demo mode because no AI service \
                 was detected. Your message \"{}\" has been received.",
                model.name, model.provider, message
            ),
            format!(
                "{} here, speaking for {}! No AI service is connected, so I'm \
                 running in simulation mode. You said: \"{}\".",
                model.name, model.provider, message
            ),
            format!(
                "Thanks for your message \"{}\". I'm {} ({}) in demo mode; \
                 connect an AI service for real responses.",
                message, model.name, model.provider
            ),
            format!(
                "Simulation mode active. {} ({}) received your question \"{}\". \
                 Responses are canned until an AI service is attached.",
                model.name, model.provider, message
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[tokio::test(start_paused = true)]
    async fn reply_waits_out_the_simulated_delay() {
        let responder = DemoResponder::with_picker(Box::new(|_| 0));
        let model = catalog::resolve("gpt-4o");

        let start = tokio::time::Instant::now();
        let _ = responder.reply(model, "hello").await;
        assert_eq!(start.elapsed(), SIMULATED_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn every_template_names_model_and_echoes_text() {
        let model = catalog::resolve("mistral-large-latest");
        for index in 0..4 {
            let responder = DemoResponder::with_picker(Box::new(move |_| index));
            let reply = responder.reply(model, "hello").await;
            assert!(reply.contains("hello"), "template {index}: {reply}");
            assert!(reply.contains("Mistral Large"), "template {index}: {reply}");
            assert!(reply.contains("Mistral"), "template {index}: {reply}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_picks_are_clamped() {
        let responder = DemoResponder::with_picker(Box::new(|_| 13));
        let model = catalog::resolve("gpt-4o");
        let reply = responder.reply(model, "hi").await;
        assert!(reply.contains("hi"));
    }
}
