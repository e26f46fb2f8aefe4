//! SSH identities: a key pair plus the GitHub user name and no-reply email
//! stored next to it in the SSH directory.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CloneAsError;

/// File names in the SSH directory that belong to ssh itself and must never
/// be treated as an identity.
const RESERVED_NAMES: &[&str] = &[
    "id_rsa",
    "id_dsa",
    "id_ecdsa",
    "id_ecdsa_sk",
    "id_ed25519",
    "id_ed25519_sk",
    "known_hosts",
    "known_hosts.old",
    "config",
    "authorized_keys",
    "authorized_keys2",
    "environment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityFile {
    PrivateKey,
    PublicKey,
    Username,
    NoReplyEmail,
}

impl IdentityFile {
    pub const ALL: [IdentityFile; 4] = [
        IdentityFile::PrivateKey,
        IdentityFile::PublicKey,
        IdentityFile::Username,
        IdentityFile::NoReplyEmail,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            IdentityFile::PrivateKey => "",
            IdentityFile::PublicKey => ".pub",
            IdentityFile::Username => ".username",
            IdentityFile::NoReplyEmail => ".noreplyemail",
        }
    }
}

impl fmt::Display for IdentityFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdentityFile::PrivateKey => "private key",
            IdentityFile::PublicKey => "public key",
            IdentityFile::Username => "username",
            IdentityFile::NoReplyEmail => "no-reply email",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    name: String,
    ssh_dir: PathBuf,
}

impl Identity {
    /// Validate `name` against the files present in `ssh_dir`.
    ///
    /// All four files are checked; the error lists every one that is absent.
    pub fn validate(name: &str, ssh_dir: &Path) -> Result<Self, CloneAsError> {
        check_name(name)?;

        let entries = list_entries(ssh_dir)?;
        let missing: Vec<IdentityFile> = IdentityFile::ALL
            .into_iter()
            .filter(|kind| !entries.contains(&OsString::from(file_name(name, *kind))))
            .collect();

        if !missing.is_empty() {
            return Err(CloneAsError::MissingIdentityFiles {
                name: name.to_string(),
                ssh_dir: ssh_dir.to_path_buf(),
                missing,
            });
        }

        debug!("Identity '{}' found in {}", name, ssh_dir.display());
        Ok(Self {
            name: name.to_string(),
            ssh_dir: ssh_dir.to_path_buf(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_path(&self, kind: IdentityFile) -> PathBuf {
        self.ssh_dir.join(file_name(&self.name, kind))
    }

    pub fn private_key(&self) -> PathBuf {
        self.file_path(IdentityFile::PrivateKey)
    }

    /// Value for `core.sshCommand` that pins ssh to this identity's key.
    pub fn ssh_command(&self) -> String {
        format!(
            "ssh -i {} -o IdentitiesOnly=yes",
            shell_quote(&self.private_key().to_string_lossy())
        )
    }

    pub fn username(&self) -> Result<String, CloneAsError> {
        self.read(IdentityFile::Username)
    }

    pub fn noreply_email(&self) -> Result<String, CloneAsError> {
        self.read(IdentityFile::NoReplyEmail)
    }

    fn read(&self, kind: IdentityFile) -> Result<String, CloneAsError> {
        let path = self.file_path(kind);
        let contents =
            fs::read_to_string(&path).map_err(CloneAsError::filesystem("read", &path))?;
        Ok(contents.trim().to_string())
    }
}

fn file_name(name: &str, kind: IdentityFile) -> String {
    format!("{}{}", name, kind.suffix())
}

fn check_name(name: &str) -> Result<(), CloneAsError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        Some("name must not contain a path separator")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else if RESERVED_NAMES.contains(&name) {
        Some("name is reserved for ssh's own files")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CloneAsError::InvalidIdentityName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn list_entries(dir: &Path) -> Result<HashSet<OsString>, CloneAsError> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(err) => return Err(CloneAsError::filesystem("list", dir)(err)),
    };

    let mut entries = HashSet::new();
    for entry in read_dir {
        let entry = entry.map_err(CloneAsError::filesystem("list", dir))?;
        entries.insert(entry.file_name());
    }
    Ok(entries)
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
