//! Path parsing for namespace addressing.
//!
//! Parses paths like `/chars/hero` or `audio/music` into a list of segment
//! names plus an absolute/relative flag. Resolution against a live tree
//! happens in `tree.rs`; this module never looks at the tree.

use crate::error::FsError;


/// A parsed separator-delimited path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePath {
    /// Starts at the root rather than the cursor.
    pub absolute: bool,
    pub segments: Vec<String>,
}

impl NamespacePath {
    /// Parse a path string.
    ///
    /// Empty segments are dropped, so `a//b/` is the same as `a/b`. The
    /// relative segments `.` and `..` are rejected.
    pub fn parse(input: &str, separator: char) -> Result<Self, FsError> {
        let absolute = input.starts_with(separator);
        let mut segments = Vec::new();

        for part in input.split(separator) {
            if part.is_empty() {
                continue;
            }
            if part == "." || part == ".." {
                return Err(FsError::invalid(input, "relative segments are not supported"));
            }
            segments.push(part.to_string());
        }

        Ok(NamespacePath { absolute, segments })
    }

    /// True for `/` (and `//`, ...).
    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    /// Format back to a path string.
    pub fn to_path_string(&self, separator: char) -> String {
        let mut out = String::new();
        if self.absolute {
            out.push(separator);
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(seg);
        }
        out
    }

    /// Split off the last segment, used to address an entity by path.
    ///
    /// Returns `None` for a path with no segments.
    pub fn split_last(&self) -> Option<(NamespacePath, String)> {
        let (last, init) = self.segments.split_last()?;
        Some((
            NamespacePath {
                absolute: self.absolute,
                segments: init.to_vec(),
            },
            last.clone(),
        ))
    }
}

/// Check that `name` can be used as a single entity or namespace name.
pub fn validate_name(name: &str, separator: char) -> Result<(), FsError> {
    if name.is_empty() {
        return Err(FsError::invalid(name, "empty name"));
    }
    if name.contains(separator) {
        return Err(FsError::invalid(name, "a name cannot contain the path separator"));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid(name, "relative segments are not supported"));
    }
    Ok(())
}


/// The outcome of resolving a path against the tree: the deepest existing
/// namespace reached, plus the segments that could not be consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<N> {
    pub node: N,
    pub rest: Vec<String>,
}

impl<N> Resolution<N> {
    /// The path named an existing namespace.
    pub fn is_complete(&self) -> bool {
        self.rest.is_empty()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
