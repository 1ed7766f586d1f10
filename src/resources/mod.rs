//! Resource resolution: path guarding, raw reads, and the store.

mod layouts;
pub mod paths;
pub mod reader;
mod store;

pub use store::ResourceStore;
