//! Content repository implementations.

mod cached;
mod memory;

pub use cached::CachedContentRepository;
pub use memory::InMemoryContentRepository;
