use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::command_utils::run_checked;
use crate::error::CloneAsError;
use crate::identity::Identity;

const BACKUP_SUFFIX: &str = "-tmpbkup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The destination did not exist and was cloned into directly.
    Cloned,
    /// The destination existed; its previous contents were merged over the
    /// fresh clone.
    Merged { merged_entries: usize },
}

#[derive(Debug, Clone)]
pub struct RepositoryImporter {
    git_path: String,
}

impl RepositoryImporter {
    pub fn new(git_path: impl Into<String>) -> Self {
        Self {
            git_path: git_path.into(),
        }
    }

    /// Clone `source` into `destination` bound to `identity`.
    ///
    /// An existing destination directory is moved aside, the clone made in
    /// its place and the old contents moved back over it. Every step aborts
    /// on the first failure. If that happens after the move, the previous
    /// contents stay in `<destination>-tmpbkup`.
    pub fn import(
        &self,
        source: &str,
        identity: &Identity,
        destination: &Path,
    ) -> Result<ImportOutcome, CloneAsError> {
        let outcome = if destination.is_dir() {
            let backup = backup_path(destination);
            if fs::symlink_metadata(&backup).is_ok() {
                return Err(CloneAsError::BackupExists { path: backup });
            }

            info!(
                "Moving existing {} to {}",
                destination.display(),
                backup.display()
            );
            fs::rename(destination, &backup)
                .map_err(CloneAsError::filesystem("rename", destination))?;

            let merged = self
                .clone_repo(source, identity, destination)
                .and_then(|()| merge_tree(&backup, destination));
            let merged_entries = match merged {
                Ok(count) => count,
                Err(err) => {
                    warn!("Previous contents left in {}", backup.display());
                    return Err(err);
                }
            };

            fs::remove_dir_all(&backup).map_err(CloneAsError::filesystem("remove", &backup))?;
            ImportOutcome::Merged { merged_entries }
        } else {
            self.clone_repo(source, identity, destination)?;
            ImportOutcome::Cloned
        };

        self.configure(identity, destination)?;
        Ok(outcome)
    }

    fn clone_repo(
        &self,
        source: &str,
        identity: &Identity,
        destination: &Path,
    ) -> Result<(), CloneAsError> {
        info!("Cloning {} into {}", source, destination.display());
        let ssh_config = format!("core.sshCommand={}", identity.ssh_command());
        let args: [&OsStr; 5] = [
            OsStr::new("clone"),
            OsStr::new("--config"),
            OsStr::new(&ssh_config),
            OsStr::new(source),
            destination.as_os_str(),
        ];
        run_checked(&self.git_path, &args, None)?;
        Ok(())
    }

    /// Set the repository-local ssh command, user name and email.
    fn configure(&self, identity: &Identity, destination: &Path) -> Result<(), CloneAsError> {
        let settings = [
            ("core.sshCommand", identity.ssh_command()),
            ("user.name", identity.username()?),
            ("user.email", identity.noreply_email()?),
        ];

        for (key, value) in &settings {
            run_checked(
                &self.git_path,
                &["config", "--local", *key, value.as_str()],
                Some(destination),
            )?;
        }

        info!(
            "Configured {} for identity '{}'",
            destination.display(),
            identity.name()
        );
        Ok(())
    }
}

/// `<destination>-tmpbkup`, next to the destination.
pub fn backup_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    destination.with_file_name(name)
}

/// Move everything under `from` into `into`, recursing into directories
/// present on both sides. Entries from `from` replace conflicting entries in
/// `into`. Returns how many entries were moved.
pub fn merge_tree(from: &Path, into: &Path) -> Result<usize, CloneAsError> {
    let mut moved = 0;
    let mut entries = WalkDir::new(from)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry?;
        // Every entry walked from `from` lives under it.
        let relative = entry.path().strip_prefix(from).map_err(|_| {
            std::io::Error::other(format!(
                "{} is outside {}",
                entry.path().display(),
                from.display()
            ))
        })?;
        let target = into.join(relative);
        let existing = fs::symlink_metadata(&target).ok();

        if entry.file_type().is_dir() {
            match existing {
                Some(meta) if meta.is_dir() => continue,
                Some(_) => fs::remove_file(&target)
                    .map_err(CloneAsError::filesystem("remove", &target))?,
                None => {}
            }
            fs::rename(entry.path(), &target)
                .map_err(CloneAsError::filesystem("move", entry.path()))?;
            entries.skip_current_dir();
        } else {
            match existing {
                Some(meta) if meta.is_dir() => fs::remove_dir_all(&target)
                    .map_err(CloneAsError::filesystem("remove", &target))?,
                Some(_) => fs::remove_file(&target)
                    .map_err(CloneAsError::filesystem("remove", &target))?,
                None => {}
            }
            fs::rename(entry.path(), &target)
                .map_err(CloneAsError::filesystem("move", entry.path()))?;
        }
        moved += 1;
    }

    Ok(moved)
}
