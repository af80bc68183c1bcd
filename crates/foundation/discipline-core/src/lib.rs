//! # Discipline Core
//!
//! Data model and pure logic for project-scoped discipline records.
//!
//! - **Model**: [`Discipline`], [`DisciplineDraft`], [`Project`]
//! - **Allocator**: next `DISC` code + duplicate-name pre-check
//! - **Validation**: form rules applied before any request leaves the process
//! - **Search**: the list-view filter
//!
//! Nothing in this crate performs I/O.
//!
//! ## Usage
//!
//! ```
//! use discipline_core::{allocate_code, DisciplineDraft};
//!
//! let allocated = allocate_code(&[], DisciplineDraft::named("Structural")).unwrap();
//! assert_eq!(allocated.code, "DISC01");
//! ```

pub mod allocator;
pub mod model;
pub mod search;
pub mod validate;

pub use allocator::{allocate_code, next_code, normalize_name, parse_code_number, AllocatedDiscipline, DuplicateNameError, CODE_PREFIX};
pub use model::{Discipline, DisciplineDraft, Project, ProjectRef};
pub use search::filter_disciplines;
pub use validate::{validate_draft, validate_record};

/// Result type for discipline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by discipline operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Errors the user can fix by changing the input and retrying
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::DuplicateName(_) | Self::Validation(_))
    }
}
