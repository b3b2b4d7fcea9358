//! Fake filesystem: a hierarchical namespace store.
//!
//! A tree of namespaces addressed by `/`-separated paths, each holding
//! named entities. Entities can be linked (aliased) from several
//! namespaces and are released through a pluggable `Liberator` when the
//! last link goes away. The whole tree saves to and loads from a small
//! brace-delimited text format.

pub mod path;
pub mod tree;
pub mod entity;
pub mod liberator;
pub mod codec;
pub mod serialize;

pub use path::{NamespacePath, Resolution, validate_name};
pub use tree::{FakeFs, NodeId};
pub use liberator::{DropLiberator, Liberator, NoopLiberator, Release, ReleaseLiberator};
pub use codec::{Loader, Saver, TextCodec};
pub use serialize::{LoadReport, SkippedLine};
