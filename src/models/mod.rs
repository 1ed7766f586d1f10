//! Core data models for formtree.

mod application;
mod config;
mod error;
mod layout;
mod text;

pub use application::*;
pub use config::*;
pub use error::*;
pub use layout::*;
pub use text::*;
