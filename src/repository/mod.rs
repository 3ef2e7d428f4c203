//! Repository Layer
//!
//! Data access abstractions and implementations.

mod item_repo;
mod memory_repo;
mod rest_repo;
mod traits;

#[cfg(test)]
mod tests;

pub use item_repo::ItemRepository;
pub use memory_repo::MemoryRepository;
pub use rest_repo::RestRepository;
pub use traits::Repository;
