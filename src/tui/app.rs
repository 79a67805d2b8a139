use async_channel::{Receiver, TryRecvError};
use std::time::Instant;

use crate::config::Config;
use crate::core::{FormField, GenerationResult, MockupForm, Session};
use crate::output::SavedRun;

use super::preview::FramePreview;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigating the form
    Form,
    /// Typing into a text field
    Editing,
}

/// Messages from the background generation task
#[derive(Debug)]
pub enum GenerationEvent {
    Progress(u8),
    Finished {
        result: GenerationResult,
        saved: Option<SavedRun>,
        save_error: Option<String>,
    },
    Failed(String),
}

/// TUI application state
pub struct App {
    pub mode: AppMode,

    pub config: Config,

    /// Current form selections
    pub form: MockupForm,

    /// Index into the visible form fields
    pub selected: usize,

    /// Edit buffer for text fields
    pub edit_buffer: String,

    /// Progress, result and frame cycle
    pub session: Session,

    /// Files written for the last successful run
    pub saved: Option<SavedRun>,

    /// Decoded frames for the result panel; None when images are not shown
    pub preview: Option<FramePreview>,

    /// Events from the in-flight generation, if any
    pub events: Option<Receiver<GenerationEvent>>,

    /// Status message
    pub status_message: Option<String>,

    /// Error message shown in the status bar
    pub error_message: Option<String>,

    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let form = config.form_defaults();
        let session = Session::new(config.frame_interval());
        Self {
            mode: AppMode::Form,
            config,
            form,
            selected: 0,
            edit_buffer: String::new(),
            session,
            saved: None,
            preview: None,
            events: None,
            status_message: None,
            error_message: None,
            should_quit: false,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
        self.status_message = None;
    }

    /// Show generated frames as images using the given picker
    pub fn with_preview(mut self, preview: FramePreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    pub fn visible_fields(&self) -> Vec<FormField> {
        self.form.visible_fields()
    }

    /// Currently highlighted field
    pub fn selected_field(&self) -> FormField {
        let fields = self.visible_fields();
        fields[self.selected.min(fields.len() - 1)]
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected < self.visible_fields().len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    /// Keep the selection on the same field after the visible set changes
    pub fn reselect(&mut self, field: FormField) {
        let fields = self.visible_fields();
        self.selected = fields.iter().position(|f| *f == field).unwrap_or(0);
    }

    /// Apply everything the background task has reported so far
    pub fn drain_events(&mut self) {
        let Some(rx) = self.events.clone() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    // The task went away without reporting a result
                    if self.session.is_generating() {
                        tracing::warn!("Generation task ended without a result");
                        self.session.fail("Generation stopped unexpectedly");
                        self.set_error("Generation stopped unexpectedly");
                    }
                    self.events = None;
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: GenerationEvent) {
        match event {
            GenerationEvent::Progress(percent) => self.session.set_progress(percent),
            GenerationEvent::Finished {
                result,
                saved,
                save_error,
            } => {
                let count = result.len();
                if let Some(preview) = &mut self.preview {
                    preview.load(&result);
                }
                self.session.succeed(result);
                match (&saved, save_error) {
                    (_, Some(err)) => self.set_error(format!("Generated {} frame(s), saving failed: {}", count, err)),
                    (Some(run), None) => {
                        tracing::info!("Run {} saved", run.run_id);
                        let dir = self.config.output.directory.clone();
                        self.set_status(format!("Generated {} frame(s) in {} ({})", count, dir, run.run_id));
                    }
                    (None, None) => self.set_status(format!("Generated {} frame(s)", count)),
                }
                self.saved = saved;
                self.events = None;
            }
            GenerationEvent::Failed(message) => {
                self.session.fail(message.clone());
                self.set_error(message);
                self.events = None;
            }
        }
    }

    /// Advance the frame animation
    pub fn tick(&mut self, now: Instant) -> bool {
        self.session.tick(now)
    }
}
