//! Library crate for userdesk.
//!
//! This crate exposes the building blocks of the TUI:
//! - Remote users API client and wire types (`api`)
//! - Query/mutation cache with key-prefix invalidation (`cache`)
//! - Application state, panels and the update loop (`app`)
//! - Debounce and one-shot timers (`timer`), search box (`search`), pagination (`pagination`)
//! - Draft validation (`validate`)
//! - Flags and config files (`config`), file logging (`logging`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod search;
pub mod timer;
pub mod ui;
pub mod validate;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{ApiError, DynError, Result};
