use super::{Notifier, PanelContent, PanelRenderer, ProgressOptions, ProgressReporter};
use crate::error::AppError;
use crate::storage;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

const SPINNER_TICK_MS: u64 = 100;
const KEEP_PANELS: usize = 20;

/// Spinner on stderr. Hidden when stderr is not a terminal.
#[derive(Default)]
pub struct SpinnerProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter for SpinnerProgress {
    fn start(&self, options: &ProgressOptions<'_>) {
        debug!(title = options.title, cancellable = options.cancellable, "Progress started");
        let bar = if std::io::stderr().is_terminal() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(options.title.to_string());
        bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn report(&self, increment: u8) {
        debug!(increment, "Progress");
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.inc(u64::from(increment));
            }
        }
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

/// Prints notifications to stderr and offers actions through a prompt when
/// running interactively.
pub struct TerminalNotifier {
    config_path: PathBuf,
    interactive: bool,
}

impl TerminalNotifier {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            interactive: std::io::stdin().is_terminal() && std::io::stderr().is_terminal(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn show_error(&self, message: &str, actions: &[&str]) -> Option<String> {
        eprintln!("error: {message}");
        if actions.is_empty() || !self.interactive {
            return None;
        }

        let mut items: Vec<&str> = actions.to_vec();
        items.push("Dismiss");
        let choice = dialoguer::Select::new()
            .items(&items)
            .default(0)
            .interact_opt()
            .inspect_err(|e| warn!("Prompt failed: {e}"))
            .ok()
            .flatten()?;

        actions.get(choice).map(|a| (*a).to_string())
    }

    fn open_settings(&self, section: &str) {
        info!(section, "Opening settings");
        eprintln!("Settings file: {}", self.config_path.display());
        eprintln!("Set your session token with: cursor-balance settings --token '<token>'");
    }
}

/// Writes each panel to a new HTML file and opens it in the browser.
pub struct HtmlFilePanel {
    dir: PathBuf,
    open: bool,
}

impl HtmlFilePanel {
    #[must_use]
    pub const fn new(dir: PathBuf, open: bool) -> Self {
        Self { dir, open }
    }

    fn file_name(view_type: &str) -> String {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        format!("{stamp}-{view_type}.html")
    }
}

impl PanelRenderer for HtmlFilePanel {
    fn create_panel(&self, panel: &PanelContent<'_>) -> Result<(), AppError> {
        // A file opened in the browser always runs whatever scripts it carries.
        debug!(enable_scripts = panel.enable_scripts, "Creating panel");
        let path = storage::save_panel(&self.dir, &Self::file_name(panel.view_type), panel.html)
            .map_err(|e| AppError::Unexpected(format!("Failed to write panel: {e}")))?;
        info!(title = panel.title, path = %path.display(), "Panel created");

        if let Err(e) = storage::prune_panels(&self.dir, KEEP_PANELS) {
            warn!("Failed to prune old panels: {e}");
        }

        if self.open {
            webbrowser::open(&path.to_string_lossy())
                .map_err(|e| AppError::Unexpected(format!("Failed to open panel: {e}")))?;
        } else {
            println!("{}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_html_file_panel_writes_new_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = HtmlFilePanel::new(dir.path().to_path_buf(), false);
        let panel = PanelContent {
            view_type: "cursorBalance",
            title: "Cursor Balance",
            html: "<html><head></head><body>ok</body></html>",
            enable_scripts: true,
        };

        renderer.create_panel(&panel).expect("panel");

        let files: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|e| e.path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("-cursorBalance.html"), "{name}");
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), panel.html);
    }

    #[test]
    fn test_notifier_non_interactive_returns_none() {
        let notifier = TerminalNotifier {
            config_path: PathBuf::from("/tmp/config.json"),
            interactive: false,
        };
        assert_eq!(notifier.show_error("boom", &["Configure now"]), None);
    }

    #[test]
    fn test_spinner_lifecycle() {
        let progress = SpinnerProgress::default();
        progress.start(&ProgressOptions {
            title: "Fetching",
            cancellable: false,
        });
        progress.report(0);
        progress.report(100);
        progress.finish();
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
