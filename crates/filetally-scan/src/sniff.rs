//! File type sniffing backends.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use filetally_core::SniffError;

/// Produces a human-readable description of a file's contents.
pub trait Sniffer {
    /// Describe the file at `path`.
    fn describe(&self, path: &Path) -> Result<String, SniffError>;
}

impl<F> Sniffer for F
where
    F: Fn(&Path) -> Result<String, SniffError>,
{
    fn describe(&self, path: &Path) -> Result<String, SniffError> {
        self(path)
    }
}

/// Sniffer backed by the `file(1)` command.
///
/// Runs `file --brief -- <path>` once per file and uses its first output
/// line as the description.
#[derive(Debug, Clone)]
pub struct FileCommandSniffer {
    program: OsString,
}

impl FileCommandSniffer {
    /// Use `file` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("file")
    }

    /// Use a specific program with `file`-compatible arguments.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the program can be run at all.
    pub fn probe(&self) -> Result<(), SniffError> {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|_| ())
            .map_err(|e| self.unavailable(e))
    }

    fn unavailable(&self, error: std::io::Error) -> SniffError {
        SniffError::Unavailable {
            program: self.program.to_string_lossy().into_owned(),
            message: error.to_string(),
        }
    }
}

impl Default for FileCommandSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sniffer for FileCommandSniffer {
    fn describe(&self, path: &Path) -> Result<String, SniffError> {
        let output = Command::new(&self.program)
            .arg("--brief")
            .arg("--")
            .arg(path)
            .output()
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => output.status.to_string(),
                text => text.to_string(),
            };
            return Err(SniffError::failed(path, message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let description = stdout.lines().next().unwrap_or_default().trim_end();
        if description.is_empty() {
            return Err(SniffError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(description.to_string())
    }
}
