//! Capabilities the show-balance command needs from whatever hosts it.

pub mod terminal;

use crate::error::AppError;

pub struct ProgressOptions<'a> {
    pub title: &'a str,
    pub cancellable: bool,
}

/// An indeterminate progress indicator.
pub trait ProgressReporter {
    fn start(&self, options: &ProgressOptions<'_>);

    /// Reports `increment` percent of additional progress.
    fn report(&self, increment: u8);

    fn finish(&self);
}

pub trait Notifier {
    /// Shows an error and returns the action the user picked, if any.
    fn show_error(&self, message: &str, actions: &[&str]) -> Option<String>;

    /// Opens the settings UI at `section`.
    fn open_settings(&self, section: &str);
}

pub struct PanelContent<'a> {
    pub view_type: &'a str,
    pub title: &'a str,
    pub html: &'a str,
    pub enable_scripts: bool,
}

/// Creates a new display surface per call. Surfaces are never reused.
pub trait PanelRenderer {
    /// # Errors
    /// Returns an error if the surface cannot be created.
    fn create_panel(&self, panel: &PanelContent<'_>) -> Result<(), AppError>;
}
