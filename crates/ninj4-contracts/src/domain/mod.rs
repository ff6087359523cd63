//! # Domain Layer
//!
//! Collection state, claim conditions, sale rules and errors.
//! No I/O and no async code lives here.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ipfs;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use ipfs::*;
pub use services::*;
pub use value_objects::*;
