//! Schema-driven field resolution
//!
//! Leaves first: [`flatten`], [`defaults`], [`options`]; [`resolver`]
//! composes them.

pub mod defaults;
pub mod flatten;
pub mod options;
pub mod resolver;

pub use defaults::{DefaultPolicy, CUSTOM_DATA_PREFIX};
pub use flatten::DEFAULT_MAX_DEPTH;
pub use resolver::SchemaResolutionEngine;
