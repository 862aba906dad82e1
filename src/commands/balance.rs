use crate::config::{read_credentials, ConfigSource, Language, SETTINGS_SECTION};
use crate::error::AppError;
use crate::host::{Notifier, PanelContent, PanelRenderer, ProgressOptions, ProgressReporter};
use crate::services::cursor_api::UsageClient;
use crate::services::usage_html::{panel_title, render_usage_html};
use chrono::{DateTime, Utc};
use tracing::debug;

pub const CONFIGURE_NOW: &str = "Configure now";
pub const PANEL_VIEW_TYPE: &str = "cursorBalance";
const PROGRESS_TITLE: &str = "Fetching Cursor usage...";

#[derive(Debug)]
pub enum CommandState {
    AwaitingCredentials,
    Fetching,
    Displaying,
    Failed(AppError),
}

impl CommandState {
    const fn name(&self) -> &'static str {
        match self {
            Self::AwaitingCredentials => "awaiting-credentials",
            Self::Fetching => "fetching",
            Self::Displaying => "displaying",
            Self::Failed(_) => "failed",
        }
    }
}

/// The show-balance command: read credentials, fetch usage, show a panel.
pub struct ShowBalance<'a> {
    pub config: &'a dyn ConfigSource,
    pub client: &'a dyn UsageClient,
    pub progress: &'a dyn ProgressReporter,
    pub notifier: &'a dyn Notifier,
    pub panels: &'a dyn PanelRenderer,
}

impl ShowBalance<'_> {
    /// Runs the command once and returns the state it ended in.
    pub async fn run(&self) -> CommandState {
        self.run_with_clock(Utc::now).await
    }

    /// Like [`Self::run`], with the rendering time supplied by `now`.
    pub async fn run_with_clock(&self, now: impl FnOnce() -> DateTime<Utc>) -> CommandState {
        let state = CommandState::AwaitingCredentials;

        let credentials = match read_credentials(self.config) {
            Ok(credentials) => credentials,
            Err(e) => {
                let choice = self.notifier.show_error(&e.notification(), &[CONFIGURE_NOW]);
                if choice.as_deref() == Some(CONFIGURE_NOW) {
                    self.notifier.open_settings(SETTINGS_SECTION);
                }
                return transition(&state, CommandState::Failed(e));
            }
        };

        let state = transition(&state, CommandState::Fetching);
        self.progress.start(&ProgressOptions {
            title: PROGRESS_TITLE,
            cancellable: false,
        });
        self.progress.report(0);

        let result = self.client.fetch_usage(&credentials).await;
        let snapshot = match result {
            Ok(snapshot) => {
                self.progress.report(100);
                self.progress.finish();
                snapshot
            }
            Err(e) => {
                self.progress.finish();
                return self.fail(&state, e);
            }
        };

        let language = Language::from_source(self.config);
        let html = render_usage_html(&snapshot, now(), language);
        let state = transition(&state, CommandState::Displaying);

        let panel = PanelContent {
            view_type: PANEL_VIEW_TYPE,
            title: panel_title(language),
            html: &html,
            enable_scripts: true,
        };
        match self.panels.create_panel(&panel) {
            Ok(()) => state,
            Err(e) => self.fail(&state, e),
        }
    }

    fn fail(&self, from: &CommandState, error: AppError) -> CommandState {
        self.notifier.show_error(&error.notification(), &[]);
        transition(from, CommandState::Failed(error))
    }
}

fn transition(from: &CommandState, to: CommandState) -> CommandState {
    match &to {
        CommandState::Failed(e) => debug!(from = from.name(), "Command failed: {e}"),
        _ => debug!(from = from.name(), to = to.name(), "Command transition"),
    }
    to
}
