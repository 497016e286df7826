//! Storage module for map persistence.

mod format;

pub use format::{MapFormat, MapHeader};
