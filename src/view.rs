//! The form/list side of the UI as seen by the controller.
//!
//! `ViewModel` is a plain data snapshot; the Yew components render from it
//! after every event, so the controller never touches the DOM directly.

use crate::workout::{WorkoutKind, WorkoutRecord};

/// Commands the controller sends to the form and workout list.
pub trait WorkoutView {
    fn show_form(&mut self);
    fn hide_form(&mut self);
    /// Show the cadence row for running or the elevation row for cycling.
    fn toggle_extra_field(&mut self, kind: WorkoutKind);
    fn render_entry(&mut self, record: &WorkoutRecord);
    fn clear_entries(&mut self);
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub visible: bool,
    pub extra_field: WorkoutKind,
    /// Bumped whenever the inputs must be emptied.
    pub generation: u32,
    /// Set right after hiding so the form disappears without sliding.
    pub transition_suppressed: bool,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            visible: false,
            extra_field: WorkoutKind::Running,
            generation: 0,
            transition_suppressed: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    form: FormState,
    entries: Vec<WorkoutRecord>,
    error: Option<String>,
}

impl ViewModel {
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Newest first, the way entries stack under the form.
    pub fn entries(&self) -> impl Iterator<Item = &WorkoutRecord> {
        self.entries.iter().rev()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn restore_form_transition(&mut self) {
        self.form.transition_suppressed = false;
    }
}

impl WorkoutView for ViewModel {
    fn show_form(&mut self) {
        self.form.visible = true;
        self.form.transition_suppressed = false;
        self.form.generation = self.form.generation.wrapping_add(1);
        self.error = None;
    }

    fn hide_form(&mut self) {
        self.form.visible = false;
        self.form.transition_suppressed = true;
        self.form.generation = self.form.generation.wrapping_add(1);
        self.error = None;
    }

    fn toggle_extra_field(&mut self, kind: WorkoutKind) {
        self.form.extra_field = kind;
    }

    fn render_entry(&mut self, record: &WorkoutRecord) {
        self.entries.push(record.clone());
    }

    fn clear_entries(&mut self) {
        self.entries.clear();
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}
