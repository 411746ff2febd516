use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::capability::{CapabilityReply, CapabilitySlot, ChatOptions};
use crate::catalog::{self, ModelInfo};
use crate::config::Config;
use crate::demo::DemoResponder;
use crate::session::Session;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Input state
    pub input_cursor: usize, // cursor position in session.pending_input, in chars

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Model picker state
    pub show_model_picker: bool,
    pub model_picker_state: ListState,

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Dispatch wiring
    capability: CapabilitySlot,
    responder: Arc<DemoResponder>,
    events_tx: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        capability: CapabilitySlot,
        events_tx: UnboundedSender<AppEvent>,
        config: Config,
    ) -> Self {
        let selected_model = config
            .default_model
            .as_deref()
            .unwrap_or(catalog::default_model().id);
        let session = Session::new(selected_model, config.system_prompt);

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            show_model_picker: false,
            model_picker_state: ListState::default(),
            chat_area: None,
            capability,
            responder: Arc::new(DemoResponder::new()),
            events_tx,
        }
    }

    /// Responder override for deterministic tests.
    pub fn set_responder(&mut self, responder: DemoResponder) {
        self.responder = Arc::new(responder);
    }

    pub fn current_model(&self) -> &'static ModelInfo {
        self.session.current_model()
    }

    /// Accepts the pending input and spawns the async half of the dispatch.
    ///
    /// The spawned task reports back with `AppEvent::Reply`; until that event
    /// is applied via [`App::finish_dispatch`] the session stays busy and
    /// further sends are rejected. A rejected send changes nothing.
    pub fn submit(&mut self) {
        let Some(text) = self.session.begin_dispatch() else {
            return;
        };
        self.input_cursor = 0;
        self.scroll_to_bottom();

        let events = self.events_tx.clone();
        if let Some(capability) = self.capability.get() {
            let conversation = self.session.conversation();
            let options = ChatOptions {
                model: self.session.selected_model_id().to_string(),
            };
            tokio::spawn(async move {
                let outcome = capability
                    .chat(&conversation, options)
                    .await
                    .map(CapabilityReply::into_text);
                let _ = events.send(AppEvent::Reply(outcome));
            });
        } else {
            let responder = Arc::clone(&self.responder);
            let model = *self.session.current_model();
            tokio::spawn(async move {
                let reply = responder.reply(&model, &text).await;
                let _ = events.send(AppEvent::Reply(Ok(reply)));
            });
        }
    }

    /// Applies a finished dispatch to the session.
    pub fn finish_dispatch(&mut self, outcome: anyhow::Result<String>) {
        self.session.complete_dispatch(outcome);
        self.scroll_to_bottom();
    }

    pub fn on_ready(&mut self) {
        self.session.mark_ready();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll chat to the newest message so it (or "Thinking...") is visible.
    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.session.messages {
            total_lines += 1; // Role line ("You:" or "AI:")
            // Calculate wrapped lines for each line of content
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        // Add lines for the "Thinking..." indicator
        total_lines += 2; // "AI:" + "Thinking..."

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    // Model picker methods
    pub fn open_model_picker(&mut self) {
        // The picker is gated on readiness, like sends.
        if !self.session.ready {
            return;
        }
        let current_idx = catalog::MODELS
            .iter()
            .position(|m| m.id == self.session.selected_model_id())
            .unwrap_or(0);
        self.model_picker_state.select(Some(current_idx));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = catalog::MODELS.len();
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(i) = self.model_picker_state.selected() {
            if let Some(model) = catalog::MODELS.get(i) {
                self.session.switch_model(model.id);
                self.show_model_picker = false;
                self.scroll_to_bottom();
                // Save to config
                let _ = Config::save_default_model(model.id);
            }
        }
    }
}
