//! Task storage for the todo service.
//!
//! This crate provides the [`TaskStore`] abstraction and one adapter per
//! backend: an in-memory map for tests and local development, Amazon DynamoDB
//! as a key-value store, and MongoDB as a document store.

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
mod error;
mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
mod traits;

pub use error::*;
pub use memory::*;
pub use traits::*;
