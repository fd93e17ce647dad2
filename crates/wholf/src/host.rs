//! Host services: console output and file storage
//!
//! The interpreter never touches stdout or the filesystem directly. The
//! `print`, `readFile` and `writeFile` built-ins go through the [`Host`]
//! carried by the [`crate::EvalContext`], so output can be captured and
//! storage sandboxed or disabled.

use std::collections::HashMap;
use std::io::Write;

use parking_lot::Mutex;
use thiserror::Error;

/// Failure reported by a host service.
#[derive(Error, Debug)]
pub enum HostError {
    /// Underlying I/O failure
    #[error("{path}: {source}")]
    Io {
        /// File involved (`<stdout>` for console output)
        path: String,
        /// The I/O error
        #[source]
        source: std::io::Error,
    },

    /// Requested file does not exist in an in-memory store
    #[error("{0}: file not found")]
    NotFound(String),

    /// The host offers no file storage
    #[error("file storage is not available")]
    StorageUnavailable,
}

/// Services the interpreter may call out to.
pub trait Host: Send + Sync {
    /// Write one line of output.
    fn write_line(&self, text: &str) -> Result<(), HostError>;

    /// Read a whole file as text.
    fn read_file(&self, path: &str) -> Result<String, HostError>;

    /// Create or replace a file with `contents`.
    fn write_file(&self, path: &str, contents: &str) -> Result<(), HostError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Standard Host
// ═══════════════════════════════════════════════════════════════════════

/// Host backed by the process's stdout and the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHost;

impl Host for StdHost {
    fn write_line(&self, text: &str) -> Result<(), HostError> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{text}").map_err(|source| HostError::Io {
            path: "<stdout>".to_string(),
            source,
        })
    }

    fn read_file(&self, path: &str) -> Result<String, HostError> {
        std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_string(),
            source,
        })
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), HostError> {
        std::fs::write(path, contents).map_err(|source| HostError::Io {
            path: path.to_string(),
            source,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Buffer Host
// ═══════════════════════════════════════════════════════════════════════

/// Host that captures output in memory and keeps files in a map.
///
/// Used by tests and embedders that need to inspect what a program printed.
#[derive(Debug)]
pub struct BufferHost {
    output: Mutex<String>,
    files: Option<Mutex<HashMap<String, String>>>,
}

impl BufferHost {
    /// Create a buffer host with an empty in-memory file store.
    pub fn new() -> Self {
        Self {
            output: Mutex::new(String::new()),
            files: Some(Mutex::new(HashMap::new())),
        }
    }

    /// Create a buffer host that rejects every file operation.
    pub fn without_storage() -> Self {
        Self {
            output: Mutex::new(String::new()),
            files: None,
        }
    }

    /// Pre-populate a file.
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        if let Some(files) = &self.files {
            files.lock().insert(path.into(), contents.into());
        }
        self
    }

    /// Everything written so far, one `\n`-terminated line per call.
    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    /// Discard captured output.
    pub fn clear(&self) {
        self.output.lock().clear();
    }

    /// Current contents of an in-memory file.
    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .as_ref()
            .and_then(|files| files.lock().get(path).cloned())
    }
}

impl Default for BufferHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for BufferHost {
    fn write_line(&self, text: &str) -> Result<(), HostError> {
        let mut buf = self.output.lock();
        buf.push_str(text);
        buf.push('\n');
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<String, HostError> {
        let files = self.files.as_ref().ok_or(HostError::StorageUnavailable)?;
        files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound(path.to_string()))
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), HostError> {
        let files = self.files.as_ref().ok_or(HostError::StorageUnavailable)?;
        files.lock().insert(path.to_string(), contents.to_string());
        Ok(())
    }
}
