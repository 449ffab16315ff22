//! # Wolf Search
//!
//! A private, local-first search box. Input that looks like a URL or a bare
//! domain is navigated to; anything else is searched, first as a prefix query
//! and, if the backend rejects it, once more with special characters
//! stripped.
//!
//! The decision logic, in-memory index and HTML renderer live in
//! `wolf-search-core`, which has no I/O. This crate adds the parts that
//! touch the outside world.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ docs/*.html│──▶│ corpus (build)│──▶│documents.json│
//! └────────────┘   └───────────────┘   └──────┬───────┘
//!                                             │ documents
//!                        ┌────────────────────┤
//!                        ▼                    ▼
//!                  ┌───────────┐        ┌───────────┐
//!  input ─▶ ctrl ─▶│  Session  │──HTTP─▶│  server   │
//!                  │ (local or │        │/api/search│
//!                  │  remote)  │        └───────────┘
//!                  └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`documents`] | Loading `documents.json` from disk or HTTP |
//! | [`corpus`] | Building `documents.json` from a docs directory |
//! | [`remote`] | HTTP search backend |
//! | [`server`] | `/api/search` HTTP server |
//! | [`debounce`] | Trailing-edge debouncer |
//! | [`controller`] | Input event loop with stale-response guard |
//! | [`search`] | One-shot CLI search and session setup |
//! | [`repl`] | Interactive stdin front end |

pub mod config;
pub mod controller;
pub mod corpus;
pub mod debounce;
pub mod documents;
pub mod remote;
pub mod repl;
pub mod search;
pub mod server;
