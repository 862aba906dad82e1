use crate::config::{read_credentials, AppConfig, Language};
use crate::error::AppError;
use crate::state::AppState;

/// Changes requested through the settings command.
#[derive(Debug, Default)]
pub struct SettingsUpdate {
    pub token: Option<String>,
    pub clear_token: bool,
    pub language: Option<String>,
}

impl SettingsUpdate {
    const fn is_empty(&self) -> bool {
        self.token.is_none() && !self.clear_token && self.language.is_none()
    }
}

fn validate_token(token: &str) -> Result<(), AppError> {
    let candidate = AppConfig {
        token: Some(token.to_string()),
        language: None,
    };
    read_credentials(&candidate)
        .map(|_| ())
        .map_err(|_| AppError::Config("token must look like <prefix>::<userId>".to_string()))
}

fn validate_language(code: &str) -> Result<(), AppError> {
    match code.trim().to_ascii_lowercase().as_str() {
        "en" | "zh" | "zh-cn" => Ok(()),
        other => Err(AppError::Config(format!(
            "unsupported language '{other}', expected 'en' or 'zh'"
        ))),
    }
}

/// Applies `update` and persists it. An empty update changes nothing.
///
/// # Errors
/// Returns `AppError::Config` for an invalid token or language, or when the
/// settings file cannot be written.
pub fn apply_settings(state: &mut AppState, update: SettingsUpdate) -> Result<(), AppError> {
    if update.is_empty() {
        return Ok(());
    }

    let mut config = state.config.clone();
    if update.clear_token {
        config.token = None;
    }
    if let Some(token) = update.token {
        let token = token.trim().to_string();
        validate_token(&token)?;
        config.token = Some(token);
    }
    if let Some(language) = update.language {
        validate_language(&language)?;
        config.language = Some(language.trim().to_ascii_lowercase());
    }

    state
        .save_config(config)
        .map_err(|e| AppError::Config(e.to_string()))
}

/// Hides all but the first few characters of a token.
fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if visible.len() == token.len() {
        "*".repeat(token.chars().count())
    } else {
        format!("{visible}…")
    }
}

/// Human-readable summary of the current settings.
#[must_use]
pub fn describe_settings(state: &AppState) -> String {
    let token = match (&state.config.token, read_credentials(state)) {
        (Some(token), Ok(credentials)) => {
            format!("{} (user {})", mask_token(token), credentials.user_id)
        }
        (Some(token), Err(_)) => format!("{} (invalid: no user id)", mask_token(token)),
        (None, _) => "not set".to_string(),
    };
    let language = match Language::from_source(state) {
        Language::En => "en",
        Language::Zh => "zh",
    };
    format!(
        "Settings file: {}\ntoken: {token}\nlanguage: {language}",
        state.config_path().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::with_dir(dir.path().to_path_buf()).expect("state");
        (dir, state)
    }

    #[test]
    fn test_set_and_clear_token() {
        let (dir, mut state) = state();
        apply_settings(
            &mut state,
            SettingsUpdate {
                token: Some(" sess::user123 ".into()),
                ..SettingsUpdate::default()
            },
        )
        .expect("valid token");

        let reloaded = AppState::with_dir(dir.path().to_path_buf()).expect("state");
        assert_eq!(reloaded.config.token.as_deref(), Some("sess::user123"));

        apply_settings(
            &mut state,
            SettingsUpdate {
                clear_token: true,
                ..SettingsUpdate::default()
            },
        )
        .expect("clear");
        let reloaded = AppState::with_dir(dir.path().to_path_buf()).expect("state");
        assert!(reloaded.config.token.is_none());
    }

    #[test]
    fn test_rejects_token_without_user_id() {
        let (_dir, mut state) = state();
        let result = apply_settings(
            &mut state,
            SettingsUpdate {
                token: Some("sess".into()),
                ..SettingsUpdate::default()
            },
        );
        assert!(matches!(result, Err(AppError::Config(_))));
        assert!(state.config.token.is_none());
        assert!(!state.config_path().exists());
    }

    #[test]
    fn test_language() {
        let (_dir, mut state) = state();
        apply_settings(
            &mut state,
            SettingsUpdate {
                language: Some("ZH".into()),
                ..SettingsUpdate::default()
            },
        )
        .expect("valid language");
        assert_eq!(state.config.language.as_deref(), Some("zh"));

        let result = apply_settings(
            &mut state,
            SettingsUpdate {
                language: Some("klingon".into()),
                ..SettingsUpdate::default()
            },
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_describe_settings() {
        let (_dir, mut state) = state();
        assert!(describe_settings(&state).contains("token: not set"));

        apply_settings(
            &mut state,
            SettingsUpdate {
                token: Some("secret-session::user123".into()),
                ..SettingsUpdate::default()
            },
        )
        .expect("valid token");
        let text = describe_settings(&state);
        assert!(text.contains("token: secret… (user user123)"), "{text}");
        assert!(!text.contains("secret-session"));
        assert!(text.contains("language: en"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("abcdefgh"), "abcdef…");
    }
}
