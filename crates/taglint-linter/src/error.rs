//! Configuration errors, all surfaced before any traversal begins.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown checker name(s): {names}\n\nValid checker names are:\n{valid}")]
    UnknownCheckers { names: String, valid: String },

    #[error("checker `{checker}` declares unknown or disabled prerequisite `{prerequisite}`")]
    UnknownPrerequisite {
        checker: String,
        prerequisite: String,
    },

    #[error("checker prerequisites form a cycle involving: {members}")]
    PrerequisiteCycle { members: String },
}
