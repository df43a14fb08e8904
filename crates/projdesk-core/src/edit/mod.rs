//! Project edit view
//!
//! Controller behind the edit screens. It owns the form state and the view
//! state machine (`Loading` -> `Ready` -> `Submitting` -> `Ready`) and leaves
//! I/O to the caller: the `begin_*`/`finish_*` pairs let an event loop run
//! requests in the background, while [`ProjectEditView::load`] and
//! [`ProjectEditView::save`] do the whole round trip inline.

mod fields;

pub use fields::{BUDGET_STEP, Section, project_fields, project_sections};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::form::FormState;
use crate::resource::ResourceProvider;

/// Observable state of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Record not fetched yet; fields are inert
    Loading,
    /// Fields editable, save enabled
    Ready,
    /// Save request in flight
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-visible, non-fatal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Identifies one fetch started by [`ProjectEditView::begin_load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// An update request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub resource: String,
    pub id: i64,
    pub payload: Value,
}

/// Edit session for one project record
#[derive(Debug)]
pub struct ProjectEditView {
    resource: String,
    id: i64,
    state: ViewState,
    form: FormState,
    notifications: Vec<Notification>,
    load_error: Option<String>,
    load_generation: u64,
    mounted: bool,
}

impl ProjectEditView {
    pub fn new(resource: impl Into<String>, id: i64) -> Self {
        Self {
            resource: resource.into(),
            id,
            state: ViewState::Loading,
            form: FormState::new(project_fields()),
            notifications: Vec::new(),
            load_error: None,
            load_generation: 0,
            mounted: true,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Last fetch failure, shown by the host in place of the form
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Detach the view; results arriving afterwards are discarded
    pub fn unmount(&mut self) {
        debug!(id = self.id, "Edit view unmounted");
        self.mounted = false;
    }

    /// Start a fetch. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.state = ViewState::Loading;
        self.load_error = None;
        debug!(id = self.id, generation = self.load_generation, "Loading record");
        LoadTicket(self.load_generation)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.mounted && ticket.0 == self.load_generation
    }

    /// Deliver a fetch result. Returns `false` if it was discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Value>) -> bool {
        if !self.is_current(ticket) {
            debug!(id = self.id, "Discarding stale fetch result");
            return false;
        }
        match result {
            Ok(record) => {
                if let Err(e) = self.apply_record(&record) {
                    warn!(id = self.id, error = %e, "Fetched record could not be bound");
                }
            }
            Err(e) => {
                warn!(id = self.id, error = %e, "Failed to fetch record");
                self.load_error = Some(e.to_string());
            }
        }
        true
    }

    fn apply_record(&mut self, record: &Value) -> Result<()> {
        match self.form.populate(record) {
            Ok(()) => {
                self.state = ViewState::Ready;
                info!(id = self.id, resource = %self.resource, "Record loaded");
                Ok(())
            }
            Err(e) => {
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the record and bind it to the form
    pub async fn load<P>(&mut self, provider: &P) -> Result<()>
    where
        P: ResourceProvider + ?Sized,
    {
        let ticket = self.begin_load();
        match provider.get_one(&self.resource, self.id).await {
            Ok(record) if self.is_current(ticket) => self.apply_record(&record),
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(id = self.id, error = %e, "Failed to fetch record");
                if self.is_current(ticket) {
                    self.load_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.state {
            ViewState::Ready => Ok(()),
            ViewState::Loading => Err(Error::NotReady),
            ViewState::Submitting => Err(Error::SaveInProgress),
        }
    }

    /// Set a field from typed text
    pub fn set_input(&mut self, field: &str, input: &str) -> Result<()> {
        self.ensure_editable()?;
        self.form.set_input(field, input)
    }

    /// Step a number field
    pub fn step(&mut self, field: &str, direction: i32) -> Result<()> {
        self.ensure_editable()?;
        self.form.step(field, direction)
    }

    /// Move a select field through its options
    pub fn cycle_option(&mut self, field: &str, direction: i32) -> Result<()> {
        self.ensure_editable()?;
        self.form.cycle_option(field, direction)
    }

    /// Empty a field
    pub fn clear(&mut self, field: &str) -> Result<()> {
        self.ensure_editable()?;
        self.form.clear(field)
    }

    /// Whether the save action is enabled
    pub fn can_save(&self) -> bool {
        self.mounted && self.state == ViewState::Ready
    }

    /// Validate and build the update request
    ///
    /// On success the view moves to `Submitting` until [`finish_save`] is
    /// called. Validation failures leave the view `Ready` with field errors.
    ///
    /// [`finish_save`]: ProjectEditView::finish_save
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        self.ensure_editable()?;
        if let Err(errors) = self.form.validate() {
            info!(id = self.id, errors = errors.len(), "Save blocked by validation");
            return Err(Error::Validation(errors));
        }

        self.state = ViewState::Submitting;
        debug!(id = self.id, "Submitting record");
        Ok(SaveRequest {
            resource: self.resource.clone(),
            id: self.id,
            payload: Value::Object(self.form.values()),
        })
    }

    /// Deliver an update result. Returns `false` if it was discarded.
    ///
    /// Form values are kept whatever the outcome.
    pub fn finish_save(&mut self, result: Result<Value>) -> bool {
        self.complete_save(result.map(|_| ()).map_err(|e| e.to_string()))
    }

    fn complete_save(&mut self, outcome: std::result::Result<(), String>) -> bool {
        if !self.mounted || self.state != ViewState::Submitting {
            debug!(id = self.id, "Discarding save result");
            return false;
        }
        self.state = ViewState::Ready;
        match outcome {
            Ok(()) => {
                info!(id = self.id, resource = %self.resource, "Record saved");
                self.notifications
                    .push(Notification::success("Проект успешно сохранён"));
            }
            Err(message) => {
                warn!(id = self.id, error = %message, "Failed to save record");
                self.notifications
                    .push(Notification::error(format!("Не удалось сохранить проект: {}", message)));
            }
        }
        true
    }

    /// Validate, send one update request and record the outcome
    pub async fn save<P>(&mut self, provider: &P) -> Result<Value>
    where
        P: ResourceProvider + ?Sized,
    {
        let request = self.begin_save()?;
        match provider
            .update(&request.resource, request.id, request.payload)
            .await
        {
            Ok(record) => {
                self.complete_save(Ok(()));
                Ok(record)
            }
            Err(e) => {
                self.complete_save(Err(e.to_string()));
                Err(e)
            }
        }
    }
}
