//! Application state for the edit screen

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use projdesk_core::edit::{
    LoadTicket, Notification, ProjectEditView, SaveRequest, ViewState, project_sections,
};
use projdesk_core::form::FieldKind;
use projdesk_core::{Error, Result};
use serde_json::Value;
use tracing::debug;

/// How long a notification stays on screen
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Results delivered by background requests
#[derive(Debug)]
pub enum AppMessage {
    Loaded(LoadTicket, Result<Value>),
    Saved(Result<Value>),
}

/// What the event loop should do after a key press
#[derive(Debug, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Save(SaveRequest),
}

pub struct App {
    pub view: ProjectEditView,
    /// Field names in navigation order
    pub order: Vec<&'static str>,
    pub selected: usize,
    /// Text being typed into the selected field
    pub editing: Option<String>,
    /// Last rejected input or blocked action
    pub status_line: Option<String>,
    pub notifications: Vec<(Notification, Instant)>,
}

impl App {
    pub fn new(view: ProjectEditView) -> Self {
        let order = project_sections()
            .iter()
            .flat_map(|section| section.fields.iter().copied())
            .collect();
        Self {
            view,
            order,
            selected: 0,
            editing: None,
            status_line: None,
            notifications: Vec::new(),
        }
    }

    pub fn selected_field(&self) -> &'static str {
        self.order[self.selected]
    }

    fn selected_kind(&self) -> Option<&FieldKind> {
        self.view
            .form()
            .field(self.selected_field())
            .map(|spec| &spec.kind)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        if self.editing.is_some() {
            self.handle_edit_key(key);
            return AppCommand::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.view.unmount();
                AppCommand::Quit
            }
            KeyCode::Char('s') if ctrl => self.request_save(),
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Down | KeyCode::Tab => {
                self.selected = (self.selected + 1) % self.order.len();
                AppCommand::None
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.selected = (self.selected + self.order.len() - 1) % self.order.len();
                AppCommand::None
            }
            KeyCode::Enter => {
                match self.selected_kind() {
                    Some(FieldKind::Select { .. }) => self.adjust(1),
                    Some(_) => self.start_editing(),
                    None => {}
                }
                AppCommand::None
            }
            KeyCode::Right | KeyCode::Char('+') => {
                self.adjust(1);
                AppCommand::None
            }
            KeyCode::Left | KeyCode::Char('-') => {
                self.adjust(-1);
                AppCommand::None
            }
            KeyCode::Delete => {
                let field = self.selected_field();
                let result = self.view.clear(field);
                self.report(result);
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let multiline = matches!(self.selected_kind(), Some(FieldKind::TextArea { .. }));
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                self.status_line = None;
            }
            KeyCode::Enter if multiline && key.modifiers.contains(KeyModifiers::ALT) => {
                buffer.push('\n');
            }
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => buffer.push(c),
            _ => {}
        }
    }

    fn start_editing(&mut self) {
        if self.view.state() != ViewState::Ready {
            return;
        }
        self.editing = Some(self.view.form().display(self.selected_field()));
        self.status_line = None;
    }

    fn commit_edit(&mut self) {
        let Some(buffer) = self.editing.take() else {
            return;
        };
        let field = self.selected_field();
        match self.view.set_input(field, &buffer) {
            Ok(()) => self.status_line = None,
            Err(e) => {
                // Keep the buffer so the input can be corrected
                self.status_line = Some(e.to_string());
                self.editing = Some(buffer);
            }
        }
    }

    /// Step a number field or cycle a select field
    fn adjust(&mut self, direction: i32) {
        let field = self.selected_field();
        let result = match self.selected_kind() {
            Some(FieldKind::Number { .. }) => self.view.step(field, direction),
            Some(FieldKind::Select { .. }) => self.view.cycle_option(field, direction),
            _ => return,
        };
        self.report(result);
    }

    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.status_line = None,
            Err(Error::NotReady) | Err(Error::SaveInProgress) => {}
            Err(e) => self.status_line = Some(e.to_string()),
        }
    }

    fn request_save(&mut self) -> AppCommand {
        match self.view.begin_save() {
            Ok(request) => {
                self.status_line = None;
                AppCommand::Save(request)
            }
            Err(Error::Validation(errors)) => {
                // Jump to the first field that needs attention
                if let Some(first) = errors.iter().next() {
                    if let Some(index) = self.order.iter().position(|f| *f == first.field) {
                        self.selected = index;
                    }
                }
                self.status_line = Some("Заполните обязательные поля".to_string());
                AppCommand::None
            }
            Err(e) => {
                debug!(error = %e, "Save ignored");
                AppCommand::None
            }
        }
    }

    /// Leave the screen unless a save is still in flight
    fn quit(&mut self) -> AppCommand {
        if self.view.state() == ViewState::Submitting {
            self.status_line = Some("Дождитесь завершения сохранения".to_string());
            return AppCommand::None;
        }
        self.view.unmount();
        AppCommand::Quit
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Loaded(ticket, result) => {
                self.view.finish_load(ticket, result);
            }
            AppMessage::Saved(result) => {
                self.view.finish_save(result);
            }
        }
        let now = Instant::now();
        self.notifications.extend(
            self.view
                .take_notifications()
                .into_iter()
                .map(|note| (note, now)),
        );
    }

    /// Drop notifications older than `ttl`
    pub fn expire_notifications(&mut self, now: Instant, ttl: Duration) {
        self.notifications
            .retain(|(_, shown)| now.duration_since(*shown) < ttl);
    }
}
