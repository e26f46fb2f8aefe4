//! Clone GitHub repositories over SSH bound to a named identity.
//!
//! An identity is a key pair in the SSH directory plus two sidecar files,
//! `<name>.username` and `<name>.noreplyemail`, holding the values written
//! to the clone's `user.name` and `user.email`.

pub mod command_utils;
pub mod destination;
pub mod error;
pub mod identity;
pub mod import;
pub mod source;
pub mod system_config;

pub use destination::validate_destination;
pub use error::CloneAsError;
pub use identity::{Identity, IdentityFile};
pub use import::{ImportOutcome, RepositoryImporter};
pub use source::validate_source;
pub use system_config::SystemConfig;
