//! URL shortener service implementation.
//!
//! [`ShortLinkStore`] is the encode/decode facade. It finds or creates the
//! link for a URL, drawing fresh codes through a [`CodeAllocator`] with a
//! bounded attempt budget, and resolves short codes or full short URLs back
//! to their links.

pub mod allocator;
pub mod error;
pub mod normalize;
pub mod service;
pub mod shortener;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use allocator::{AllocationPolicy, AttemptBudget, CodeAllocator, MAX_ATTEMPTS};
pub use error::{AllocationError, DecodeError, EncodeError, ValidationError, ValidationErrors};
pub use service::ShortLinkStore;
pub use shortener::Shortener;
