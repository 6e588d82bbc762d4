// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! envship command-line interface.
//!
//! Argument parsing, configuration layering, logging setup and the
//! subcommand handlers behind the `envship` binary. The install workflow
//! itself lives in `envship-core`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod tools;
pub mod tracing;
