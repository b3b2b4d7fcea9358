//! Command: the typed interface for every `ffs` operation.
//!
//! Each variant is executed by `Shell::execute()`. The enum doubles as a
//! JSON wire format with a `"command"` discriminant:
//!
//! ```json
//! {"command": "set", "path": "/chars/hero", "value": "sword"}
//! {"command": "ls"}
//! ```
//!
//! | Group | Commands |
//! |-------|----------|
//! | Read | `show`, `ls`, `get` |
//! | Write | `set`, `mkdir`, `rm`, `link`, `mv` |
//! | Misc | `help` |

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    // -----------------------------------------------------------------
    // Read commands
    // -----------------------------------------------------------------

    /// Print a namespace (the root by default) in save-file format.
    #[serde(rename = "show")]
    Show {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// List child namespaces and entities of a namespace.
    #[serde(rename = "ls")]
    Ls {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        /// "json" for JSON output, omit for plain lines.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },

    /// Print one entity's value.
    #[serde(rename = "get")]
    Get { path: String },

    // -----------------------------------------------------------------
    // Write commands
    // -----------------------------------------------------------------

    /// Set an entity, creating it and any missing namespaces.
    #[serde(rename = "set")]
    Set { path: String, value: String },

    /// Create a namespace and any missing parents.
    #[serde(rename = "mkdir")]
    Mkdir { path: String },

    /// Remove a namespace (recursively) or an entity slot.
    #[serde(rename = "rm")]
    Rm { path: String },

    /// Create `path` as an alias of the entity at `target`. A relative
    /// target resolves from the namespace `path` lives in.
    #[serde(rename = "link")]
    Link { path: String, target: String },

    /// Rename an entity within its namespace.
    #[serde(rename = "mv")]
    Mv { path: String, to: String },

    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}

impl Command {
    /// True if executing this command can change the tree.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Set { .. }
                | Command::Mkdir { .. }
                | Command::Rm { .. }
                | Command::Link { .. }
                | Command::Mv { .. }
        )
    }
}


/// Outcome of executing a command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { output: String },
    Error { message: String },
}

impl Response {
    pub fn ok(output: impl Into<String>) -> Self {
        Response::Ok { output: output.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}
