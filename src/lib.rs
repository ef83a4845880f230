//! Core library surface for the personal library manager.
//!
//! `models`, `catalog`, `store` and `error` hold the domain and know nothing
//! about terminals or argument parsing; the remaining modules are the glue
//! used by the `library-manager` binary.
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

/// The domain type every other layer manipulates.
pub use models::Book;

/// JSON persistence and what a load reports back.
pub use store::{LibraryStore, LoadOutcome, Recovery};

pub use error::{ParseFieldError, StoreError, ValidationError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
