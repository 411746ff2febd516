//! UI-agnostic conversation session state.
//!
//! The session owns the message log and the flags that gate dispatch. It
//! never touches the terminal or the async runtime; the app layer drives it
//! and runs the awaited half of a dispatch on a spawned task.

use anyhow::Error;

use crate::capability::{Turn, TurnRole};
use crate::catalog::{self, ModelInfo};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Reply used when a failed dispatch carries no error text of its own.
const GENERIC_FAILURE: &str = "Could not get a response from the AI service.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}

/// The in-memory state of one chat conversation for the lifetime of the
/// process. Dispatch is serialized by `busy`: a second send while a dispatch
/// is in flight is rejected, not queued.
pub struct Session {
    pub messages: Vec<Message>,
    pub pending_input: String,
    pub busy: bool,
    pub ready: bool,
    selected_model: String,
    system_prompt: String,
    next_id: u64,
}

impl Session {
    pub fn new(selected_model: &str, system_prompt: Option<String>) -> Self {
        Self {
            messages: Vec::new(),
            pending_input: String::new(),
            busy: false,
            ready: false,
            // Unknown ids resolve to the catalog head; store the resolved id
            // so the invariant holds from construction on.
            selected_model: catalog::resolve(selected_model).id.to_string(),
            system_prompt: system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            next_id: 0,
        }
    }

    /// One definitive transition; readiness never goes back to false.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn selected_model_id(&self) -> &str {
        &self.selected_model
    }

    pub fn current_model(&self) -> &'static ModelInfo {
        catalog::resolve(&self.selected_model)
    }

    /// Whether a send of the current pending input would be accepted.
    pub fn can_send(&self) -> bool {
        self.ready && !self.busy && !self.pending_input.trim().is_empty()
    }

    /// Accepts the pending input as a new user turn.
    ///
    /// Returns the trimmed text when the send is accepted, after appending the
    /// user message, clearing the input buffer, and setting `busy`. Returns
    /// `None` without mutating anything when a precondition fails: empty or
    /// whitespace-only input, not ready, or a dispatch already in flight.
    pub fn begin_dispatch(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let text = self.pending_input.trim().to_string();
        self.pending_input.clear();
        self.push(ChatRole::User, text.clone());
        self.busy = true;
        Some(text)
    }

    /// Records the outcome of the in-flight dispatch.
    ///
    /// Appends at most one reply message and always clears `busy`, so the
    /// session stays usable after a failure.
    pub fn complete_dispatch(&mut self, outcome: Result<String, Error>) {
        match outcome {
            Ok(reply) => self.push(ChatRole::Assistant, reply),
            Err(err) => {
                let text = err.to_string();
                let detail = if text.trim().is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    text
                };
                self.push(ChatRole::Assistant, format!("Error: {detail}"));
            }
        }
        self.busy = false;
    }

    /// The payload handed to the chat capability: the system instruction
    /// followed by every message of the log in append order.
    pub fn conversation(&self) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(self.messages.len() + 1);
        turns.push(Turn::new(TurnRole::System, self.system_prompt.clone()));
        for msg in &self.messages {
            let role = match msg.role {
                ChatRole::User => TurnRole::User,
                ChatRole::Assistant => TurnRole::Assistant,
            };
            turns.push(Turn::new(role, msg.content.clone()));
        }
        turns
    }

    /// Switches the selected model and announces the switch in the log.
    ///
    /// Ids are resolved against the catalog; an unknown id lands on the
    /// catalog's first entry.
    pub fn switch_model(&mut self, id: &str) {
        let model = catalog::resolve(id);
        self.selected_model = model.id.to_string();
        self.push(
            ChatRole::Assistant,
            format!("Switched to {} ({})", model.name, model.provider),
        );
    }

    fn push(&mut self, role: ChatRole, content: String) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message { id, role, content });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn ready_session() -> Session {
        let mut session = Session::new("gpt-4o", None);
        session.mark_ready();
        session
    }

    #[test]
    fn starts_not_ready_and_empty() {
        let session = Session::new("gpt-4o", None);
        assert!(!session.ready);
        assert!(!session.busy);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn accepted_sends_append_in_pairs() {
        let mut session = ready_session();
        for i in 0..4 {
            session.pending_input = format!("question {i}");
            let text = session.begin_dispatch().expect("send accepted");
            assert!(session.busy);
            session.complete_dispatch(Ok(format!("answer to {text}")));
        }
        assert_eq!(session.messages.len(), 8);
        for pair in session.messages.chunks(2) {
            assert!(pair[0].is_user());
            assert!(!pair[1].is_user());
        }
    }

    #[test]
    fn rejects_empty_and_whitespace_input() {
        let mut session = ready_session();
        assert!(session.begin_dispatch().is_none());

        session.pending_input = "   \t ".to_string();
        assert!(session.begin_dispatch().is_none());
        // Rejection is a no-op: the buffer is untouched.
        assert_eq!(session.pending_input, "   \t ");
        assert!(session.messages.is_empty());
        assert!(!session.busy);
    }

    #[test]
    fn rejects_while_not_ready() {
        let mut session = Session::new("gpt-4o", None);
        session.pending_input = "hello".to_string();
        assert!(session.begin_dispatch().is_none());
        assert_eq!(session.pending_input, "hello");
        assert!(session.messages.is_empty());
    }

    #[test]
    fn rejects_while_busy() {
        let mut session = ready_session();
        session.pending_input = "first".to_string();
        assert!(session.begin_dispatch().is_some());

        session.pending_input = "second".to_string();
        assert!(session.begin_dispatch().is_none());
        assert_eq!(session.pending_input, "second");
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn input_is_trimmed_on_accept() {
        let mut session = ready_session();
        session.pending_input = "  hello  ".to_string();
        assert_eq!(session.begin_dispatch().as_deref(), Some("hello"));
        assert_eq!(session.messages[0].content, "hello");
        assert!(session.pending_input.is_empty());
    }

    #[test]
    fn busy_clears_on_success_and_failure() {
        let mut session = ready_session();
        session.pending_input = "hi".to_string();
        session.begin_dispatch().unwrap();
        session.complete_dispatch(Ok("Hi there".to_string()));
        assert!(!session.busy);

        session.pending_input = "hi again".to_string();
        session.begin_dispatch().unwrap();
        session.complete_dispatch(Err(anyhow!("timeout")));
        assert!(!session.busy);
    }

    #[test]
    fn failure_is_surfaced_as_prefixed_message() {
        let mut session = ready_session();
        session.pending_input = "hi".to_string();
        session.begin_dispatch().unwrap();
        session.complete_dispatch(Err(anyhow!("timeout")));

        let reply = session.messages.last().unwrap();
        assert!(!reply.is_user());
        assert!(reply.content.starts_with("Error:"));
        assert!(reply.content.contains("timeout"));
    }

    #[test]
    fn blank_failure_uses_generic_text() {
        let mut session = ready_session();
        session.pending_input = "hi".to_string();
        session.begin_dispatch().unwrap();
        session.complete_dispatch(Err(anyhow!(" ")));

        let reply = session.messages.last().unwrap();
        assert_eq!(reply.content, format!("Error: {GENERIC_FAILURE}"));
    }

    #[test]
    fn conversation_leads_with_system_then_maps_roles() {
        let mut session = ready_session();
        session.pending_input = "hi".to_string();
        session.begin_dispatch().unwrap();
        session.complete_dispatch(Ok("Hi there".to_string()));
        session.pending_input = "how are you?".to_string();
        session.begin_dispatch().unwrap();

        let turns = session.conversation();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, TurnRole::System);
        assert_eq!(turns[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(turns[1].role, TurnRole::User);
        assert_eq!(turns[2].role, TurnRole::Assistant);
        assert_eq!(turns[3].role, TurnRole::User);
        assert_eq!(turns[3].content, "how are you?");
    }

    #[test]
    fn custom_system_prompt_is_used() {
        let session = Session::new("gpt-4o", Some("Answer briefly.".to_string()));
        assert_eq!(session.conversation()[0].content, "Answer briefly.");
    }

    #[test]
    fn switch_model_updates_id_and_announces_once() {
        let mut session = ready_session();
        session.switch_model("mistral-large-latest");

        assert_eq!(session.selected_model_id(), "mistral-large-latest");
        assert_eq!(session.messages.len(), 1);
        let notice = &session.messages[0];
        assert!(!notice.is_user());
        assert!(notice.content.contains("Mistral Large"));
        assert!(notice.content.contains("Mistral"));
    }

    #[test]
    fn switch_to_unknown_model_falls_back_to_catalog_head() {
        let mut session = ready_session();
        session.switch_model("not-a-model");
        assert_eq!(session.selected_model_id(), crate::catalog::MODELS[0].id);
    }

    #[test]
    fn unknown_model_at_construction_falls_back() {
        let session = Session::new("definitely-unknown", None);
        assert_eq!(session.selected_model_id(), crate::catalog::MODELS[0].id);
    }

    #[test]
    fn message_ids_are_unique_and_increasing() {
        let mut session = ready_session();
        for text in ["a", "b", "c"] {
            session.pending_input = text.to_string();
            session.begin_dispatch().unwrap();
            session.complete_dispatch(Ok("ok".to_string()));
        }
        let ids: Vec<u64> = session.messages.iter().map(|m| m.id).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
