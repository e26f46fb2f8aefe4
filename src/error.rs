use std::path::PathBuf;
use thiserror::Error;

use crate::identity::IdentityFile;

#[derive(Error, Debug)]
pub enum CloneAsError {
    #[error("Invalid source '{url}': expected git@github.com:<owner>/<repo>.git")]
    InvalidSourceFormat { url: String },

    #[error("Identity '{name}' is missing files in {}: {}", .ssh_dir.display(), list_files(.missing))]
    MissingIdentityFiles {
        name: String,
        ssh_dir: PathBuf,
        missing: Vec<IdentityFile>,
    },

    #[error("Invalid identity '{name}': {reason}")]
    InvalidIdentityName { name: String, reason: &'static str },

    #[error("Parent directory of destination does not exist: {}", .path.display())]
    ParentNotFound { path: PathBuf },

    #[error("Parent directory of destination is not writable: {}", .path.display())]
    ParentNotWritable { path: PathBuf },

    #[error("Invalid option: {option}")]
    UnknownOption { option: String },

    #[error("Missing required option {option}")]
    MissingOption { option: &'static str },

    #[error("Cannot determine home directory")]
    HomeNotFound,

    #[error("Backup directory already exists: {}", .path.display())]
    BackupExists { path: PathBuf },

    #[error("Git command failed: {command} (exit code: {}): {stderr}", display_code(.code))]
    ExternalCommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run {command}: {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloneAsError {
    /// Process exit status for this error. A failed child's own exit code
    /// is passed through; everything else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CloneAsError::ExternalCommandFailed { code: Some(code), .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }

    pub(crate) fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> CloneAsError {
        let path = path.into();
        move |source| CloneAsError::Filesystem {
            action,
            path,
            source,
        }
    }
}

fn list_files(files: &[IdentityFile]) -> String {
    files
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}
