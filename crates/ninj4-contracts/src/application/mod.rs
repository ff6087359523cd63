//! # Application Layer
//!
//! `CollectionService` orchestrates bindings, read fallbacks, ownership
//! scans and the mint flow on top of the contract variants.

pub mod binding;
pub mod service;

pub use binding::{ReadBinding, WriteBinding};
pub use service::{CollectionService, Connector};
