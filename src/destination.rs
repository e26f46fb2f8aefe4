use std::path::{Component, Path, PathBuf};

use crate::error::CloneAsError;

/// Resolve `destination` to an absolute path and check that its parent
/// directory exists and is writable. The destination itself may exist.
pub fn validate_destination(destination: &str) -> Result<PathBuf, CloneAsError> {
    let resolved = resolve(destination)?;

    let parent = match resolved.parent() {
        Some(parent) => parent,
        None => return Err(CloneAsError::ParentNotFound { path: resolved }),
    };

    if !parent.is_dir() {
        return Err(CloneAsError::ParentNotFound {
            path: parent.to_path_buf(),
        });
    }

    if !is_writable(parent) {
        return Err(CloneAsError::ParentNotWritable {
            path: parent.to_path_buf(),
        });
    }

    Ok(resolved)
}

/// Expand `~`, make absolute against the current directory and fold away
/// `.` and `..` without touching the filesystem.
pub fn resolve(destination: &str) -> Result<PathBuf, CloneAsError> {
    let expanded = expand_home(destination)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(normalize(&absolute))
}

fn expand_home(path: &str) -> Result<PathBuf, CloneAsError> {
    if path == "~" {
        return dirs::home_dir().ok_or(CloneAsError::HomeNotFound);
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(CloneAsError::HomeNotFound)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(unix)]
fn is_writable(dir: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(dir.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(dir: &Path) -> bool {
    std::fs::metadata(dir)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false)
}
