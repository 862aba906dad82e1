use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings section the "configure now" action deep-links into.
pub const SETTINGS_SECTION: &str = "cursorBalance";

pub const TOKEN_KEY: &str = "token";
pub const LANGUAGE_KEY: &str = "language";

/// Separator between the session prefix and the user id inside a token.
const TOKEN_DELIMITER: &str = "::";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Read-only key/value view over the user's settings.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for AppConfig {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            TOKEN_KEY => self.token.clone(),
            LANGUAGE_KEY => self.language.clone(),
            _ => None,
        }
    }
}

impl<S: std::hash::BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    /// Parses a language code, falling back to English for anything unknown.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        if code == "zh" || code.starts_with("zh-") || code.starts_with("zh_") {
            Self::Zh
        } else {
            Self::En
        }
    }

    #[must_use]
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        source
            .get(LANGUAGE_KEY)
            .map_or_else(Self::default, |code| Self::from_code(&code))
    }

    #[must_use]
    pub const fn html_lang(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh-CN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

/// Derives the credentials from the `token` setting.
///
/// # Errors
/// Returns `AppError::MissingCredentials` if the token is absent, empty, or
/// carries no user id after the `::` delimiter.
pub fn read_credentials(source: &dyn ConfigSource) -> Result<Credentials, AppError> {
    let token = source
        .get(TOKEN_KEY)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingCredentials)?;

    let user_id = token
        .split(TOKEN_DELIMITER)
        .nth(1)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(AppError::MissingCredentials)?;

    Ok(Credentials { token, user_id })
}
