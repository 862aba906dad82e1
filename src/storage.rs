use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a rendered panel into `dir` atomically and returns its path.
pub fn save_panel(dir: &Path, file_name: &str, html: &str) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let panel_path = dir.join(file_name);
    let tmp_path = dir.join(format!("{file_name}.tmp"));

    // Write to temp file first
    fs::write(&tmp_path, html)?;

    // Atomically rename. On Windows, rename fails if target exists, so remove first.
    #[cfg(windows)]
    if panel_path.exists() {
        fs::remove_file(&panel_path)?;
    }

    fs::rename(&tmp_path, &panel_path)?;

    Ok(panel_path)
}

/// Deletes all but the `keep` most recent panels in `dir`.
pub fn prune_panels(dir: &Path, keep: usize) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut panels: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();

    // File names start with a sortable timestamp.
    panels.sort();

    let excess = panels.len().saturating_sub(keep);
    for path in &panels[..excess] {
        fs::remove_file(path)?;
    }
    Ok(excess)
}
