//! Filter chain applied to every change before debouncing.

use std::path::Path;

use super::event::ChangeEvent;

/// Suffixes editors and file managers use for scratch copies.
pub const TRANSIENT_SUFFIXES: &[&str] = &["~", ".tmp", ".bak", ".swp"];

/// Why an event was dropped. Rejections are expected and never logged above trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Directory,
    MissingDestination,
    WrongExtension,
    Transient,
    Debounced,
}

/// Accepts file-level changes to one file type, skipping scratch files.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// `.qml` for extension `qml`.
    suffix: String,
}

impl FileFilter {
    pub fn new(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// Run the chain: directory, destination, extension, transient name.
    pub fn check<'a>(&self, event: &'a ChangeEvent) -> Result<&'a Path, Rejection> {
        if event.is_directory {
            return Err(Rejection::Directory);
        }

        let path = event.path.as_deref().ok_or(Rejection::MissingDestination)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .ok_or(Rejection::WrongExtension)?;

        if !name.ends_with(&self.suffix) {
            return Err(Rejection::WrongExtension);
        }
        if is_transient(&name) {
            return Err(Rejection::Transient);
        }

        Ok(path)
    }
}

/// Hidden files and backup/temporary names.
pub fn is_transient(name: &str) -> bool {
    name.starts_with('.') || TRANSIENT_SUFFIXES.iter().any(|s| name.ends_with(s))
}
