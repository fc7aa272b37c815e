//! `almirah-admin` library crate.
//!
//! The state controller, the catalog seam it talks through, terminal
//! rendering, and the line-driven event loop. The binary entrypoint
//! lives in `main.rs`.

pub mod catalog;
pub mod command;
pub mod config;
pub mod controller;
pub mod shell;
pub mod view;
