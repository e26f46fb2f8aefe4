use std::path::PathBuf;

use crate::error::CloneAsError;

pub const SSH_DIR_ENV: &str = "GIT_CLONE_AS_SSH_DIR";
pub const GIT_PATH_ENV: &str = "GIT_CLONE_AS_GIT_PATH";

#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Directory holding identity key pairs and their metadata files.
    pub ssh_dir: PathBuf,
    /// git executable used when none is given on the command line.
    pub git_path: String,
}

impl SystemConfig {
    pub fn from_env() -> Result<Self, CloneAsError> {
        let ssh_dir = match std::env::var_os(SSH_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or(CloneAsError::HomeNotFound)?
                .join(".ssh"),
        };

        let git_path = std::env::var(GIT_PATH_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| "git".to_string());

        Ok(Self { ssh_dir, git_path })
    }
}
