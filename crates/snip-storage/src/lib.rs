//! Storage backends for short links.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use snip_core::repository::{InsertOutcome, ReadRepository, Repository};
pub use snip_core::StorageError;
