use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::CloneAsError;

static SOURCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@github\.com:[A-Za-z0-9-]{1,39}/[A-Za-z0-9._-]{1,100}\.git$").unwrap()
});

/// Check that `source` is a GitHub SSH address of the form
/// `git@github.com:<owner>/<repo>.git`. Returns it unchanged.
pub fn validate_source(source: &str) -> Result<String, CloneAsError> {
    if SOURCE_PATTERN.is_match(source) {
        Ok(source.to_string())
    } else {
        Err(CloneAsError::InvalidSourceFormat {
            url: source.to_string(),
        })
    }
}
