//! Cache implementations.

mod memory;

pub use memory::InMemoryContentCache;
