//! Core entity definitions for the todo service.
//!
//! This crate defines the data types shared between the storage layer and the
//! HTTP server.

mod todo;

pub use todo::*;
