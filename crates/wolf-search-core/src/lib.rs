//! # Wolf Search Core
//!
//! Shared, WASM-safe logic for Wolf Search: query classification, search
//! dispatch with fallback, the backend trait, the in-memory index, document
//! models, and HTML rendering.
//!
//! This crate contains no tokio, filesystem I/O, or network code. Loading
//! documents, talking to a remote backend, and debouncing input live in the
//! `wolf-search` app crate.

pub mod backend;
pub mod classify;
pub mod dispatch;
pub mod models;
pub mod query;
pub mod render;
pub mod session;
