use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cursor credentials are not configured")]
    MissingCredentials,

    #[error("{}", fetch_failed_message(.status, .message))]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("{0}")]
    Unexpected(String),

    #[error("Config error: {0}")]
    Config(String),
}

#[allow(clippy::ref_option)]
fn fetch_failed_message(status: &Option<u16>, message: &str) -> String {
    status.map_or_else(|| message.to_string(), |code| format!("{code} - {message}"))
}

impl AppError {
    /// Text shown to the user when a command ends on this error.
    #[must_use]
    pub fn notification(&self) -> String {
        match self {
            Self::MissingCredentials => {
                "Please configure your Cursor session token in the settings first".to_string()
            }
            Self::FetchFailed { .. } => format!("Failed to fetch usage: {self}"),
            _ => format!("An error occurred: {self}"),
        }
    }
}
