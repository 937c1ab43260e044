//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the domain model shared by the code generator, the
//! storage backends and the shortener service: the validated [`ShortCode`],
//! the persisted [`ShortLink`] and the repository contract storage backends
//! must honour.

pub mod error;
pub mod link;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, StorageError};
pub use link::{LinkId, NewShortLink, ShortLink};
pub use repository::{InsertOutcome, ReadRepository, Repository};
pub use shortcode::ShortCode;
