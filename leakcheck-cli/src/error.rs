//! Hard (environment-level) error handling for the CLI (spec.md §7).
//!
//! Soft, analysis-level errors -- unknown tokens, unterminated literals,
//! constructs the parser can't place -- never reach this type; the
//! lexer and parser recover from those silently. This enum only covers
//! the "hard" taxonomy: a top-level directory-walk failure, or the
//! usage error of being given no paths at all.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeakcheckError {
    #[error("no paths specified")]
    NoPaths,

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: std::path::PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, LeakcheckError>;
