//! Command-line argument parsing for `ffs`.

pub mod parse;

pub use parse::{parse_args, parse_invocation, Invocation};
