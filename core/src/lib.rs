//! FakeFs: a hierarchical namespace store with linked entities.
//!
//! Values live in named entities inside a tree of namespaces. Entities may
//! be shared between namespaces by linking, and are handed to a
//! `Liberator` once the last link is gone. The tree saves to and loads
//! from a brace-delimited text format.
//!
//! # Modules
//!
//! - [`namespace`]: the store (paths, tree, entities, save/load)
//! - [`error`]: `FsError`, returned by every fallible operation
//! - [`settings`]: separator, indentation and load/save options
//! - [`command`]: typed commands for the `ffs` tool
//! - [`cli`]: command-line parsing into `Command`
//! - [`shell`]: executes commands against a save file
//! - [`help`]: usage text

pub mod cli;
pub mod command;
pub mod error;
pub mod help;
pub mod namespace;
pub mod settings;
pub mod shell;

pub use error::FsError;
pub use namespace::{
    DropLiberator, FakeFs, Liberator, LoadReport, Loader, NoopLiberator, NodeId, Release,
    ReleaseLiberator, Saver, TextCodec,
};
pub use settings::FsSettings;
