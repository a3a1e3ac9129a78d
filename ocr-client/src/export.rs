//! Actions on a finished result: clipboard copy and file exports
//!
//! Nothing here touches the workflow phase; the presenter only reads the
//! result set it is given.

use crate::error::{OcrClientError, Result};
use crate::traits::Clipboard;
use crate::types::OcrResultSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Suffixed names tried before giving up on a collision
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Export actions over an immutable result set
pub struct ResultsPresenter<C: Clipboard> {
    clipboard: C,
}

impl<C: Clipboard> ResultsPresenter<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    /// Put the concatenated text on the clipboard
    pub fn copy_text(&self, results: &OcrResultSet) -> Result<()> {
        self.clipboard.set_text(&results.concatenated_text)?;
        debug!(chars = results.character_count(), "copied text to clipboard");
        Ok(())
    }

    /// Write the concatenated text to `ocr-text-<millis>.txt` in `dir`
    pub fn export_text(&self, results: &OcrResultSet, dir: &Path) -> Result<PathBuf> {
        let (path, mut file) = create_unique(dir, "ocr-text", "txt")?;
        file.write_all(results.concatenated_text.as_bytes())?;
        info!(path = %path.display(), "exported text");
        Ok(path)
    }

    /// Write the full result to `ocr-results-<millis>.json` in `dir`
    pub fn export_json(&self, results: &OcrResultSet, dir: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(results)?;
        let (path, mut file) = create_unique(dir, "ocr-results", "json")?;
        file.write_all(json.as_bytes())?;
        info!(path = %path.display(), "exported JSON");
        Ok(path)
    }
}

/// Create `<prefix>-<millis>.<ext>`, adding `-N` until the name is free
fn create_unique(dir: &Path, prefix: &str, extension: &str) -> Result<(PathBuf, File)> {
    let stamp = chrono::Utc::now().timestamp_millis();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => format!("{prefix}-{stamp}.{extension}"),
            n => format!("{prefix}-{stamp}-{n}.{extension}"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(OcrClientError::general(format!(
        "Could not find a free file name for {prefix} in {}",
        dir.display()
    )))
}

/// Copy utilities tried in order, with their arguments
#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Clipboard backed by the platform's copy utility
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut failures = Vec::new();

        for (program, args) in CLIPBOARD_COMMANDS {
            match pipe_to(program, args, text) {
                Ok(()) => return Ok(()),
                Err(failure) => failures.push(failure),
            }
        }

        Err(OcrClientError::clipboard(failures.join("; ")))
    }
}

/// Feed `text` to one copy utility; the child is always waited on
fn pipe_to(program: &str, args: &[&str], text: &str) -> std::result::Result<(), String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{program}: {e}"))?;

    // stdin is closed at the end of the match so the utility sees EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait().map_err(|e| format!("{program}: {e}"))?;

    written.map_err(|e| format!("{program}: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{program}: exited with {status}"))
    }
}
