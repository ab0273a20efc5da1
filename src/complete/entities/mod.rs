//! Entity resolvers
//!
//! Concrete completion compositions for the domain concepts commands
//! decorate their arguments with: labels, owners and repositories, and
//! local files. Each resolver is built from the engine primitives and
//! degrades to an empty candidate set when its context or its query
//! falls through.

pub mod files;
pub mod label;
pub mod repository;

pub use files::local_files;
pub use label::{labels, multi_labels};
pub use repository::owner_repositories;
