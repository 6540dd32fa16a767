//! `permfind` - find filesystem entries by exact permission string.
//!
//! The scanner ([`crawler`]) walks a tree and prints matching paths; the
//! orchestrator ([`orchestrator`]) runs it through `sort`, forwards its
//! diagnostics and totals the matches.

#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod crawler;
pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod orchestrator;
pub mod permissions;
pub mod process;
pub mod report;
pub mod stream;
pub mod types;
