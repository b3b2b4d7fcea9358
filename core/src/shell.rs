//! Command executor behind the `ffs` binary.
//!
//! `Shell` wraps a `FakeFs<String>` loaded from a save file. Every command
//! takes paths from the root; entity paths are split into their namespace
//! part and the entity name.

use std::path::Path;

use log::{info, warn};

use crate::command::{Command, Response};
use crate::error::FsError;
use crate::help::help_text;
use crate::namespace::{FakeFs, NoopLiberator, TextCodec};
use crate::settings::FsSettings;


pub struct Shell {
    fs: FakeFs<String>,
    dirty: bool,
}


impl Shell {
    /// Empty tree. Fails if `settings` do not validate.
    pub fn new(settings: FsSettings) -> Result<Shell, FsError> {
        Ok(Shell {
            fs: FakeFs::with_settings(NoopLiberator, settings)?,
            dirty: false,
        })
    }

    /// Load `path` if it exists; a missing file is an empty tree.
    pub fn open(path: &Path, settings: FsSettings) -> Result<Shell, FsError> {
        let mut shell = Shell::new(settings)?;
        if path.exists() {
            let report = shell.fs.load_file(path, TextCodec)?;
            if !report.is_clean() {
                warn!(
                    "{}: {} line(s) skipped while loading",
                    path.display(),
                    report.skipped.len()
                );
            }
        } else {
            info!("{} does not exist yet, starting empty", path.display());
        }
        Ok(shell)
    }

    pub fn save(&self, path: &Path) -> Result<(), FsError> {
        self.fs.save_file(path, TextCodec)
    }

    /// The tree changed since it was opened.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn fs(&self) -> &FakeFs<String> {
        &self.fs
    }

    /// The single dispatch method. Every command enters here.
    pub fn execute(&mut self, cmd: Command) -> Response {
        let mutates = cmd.mutates();
        let result = match cmd {
            Command::Show { path } => self.cmd_show(path),
            Command::Ls { path, format } => self.cmd_ls(path, format),
            Command::Get { path } => self.cmd_get(&path),
            Command::Set { path, value } => self.cmd_set(&path, value),
            Command::Mkdir { path } => self.cmd_mkdir(&path),
            Command::Rm { path } => self.cmd_rm(&path),
            Command::Link { path, target } => self.cmd_link(&path, &target),
            Command::Mv { path, to } => self.cmd_mv(&path, &to),
            Command::Help { topic } => Ok(help_text(topic.as_deref())),
        };
        // Commands run from the root and always leave the cursor there.
        let root = self.fs.root();
        let _ = self.fs.enter_node(root);

        match result {
            Ok(output) => {
                if mutates {
                    self.dirty = true;
                }
                Response::ok(output)
            }
            Err(e) => Response::error(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    fn cmd_show(&mut self, path: Option<String>) -> Result<String, FsError> {
        let path = path.unwrap_or_else(|| self.root_path());
        let mut buf = Vec::new();
        self.fs.save_namespace(&path, &mut buf, TextCodec)?;
        Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
    }

    fn cmd_ls(&mut self, path: Option<String>, format: Option<String>) -> Result<String, FsError> {
        let path = path.unwrap_or_else(|| self.root_path());
        self.fs.enter_namespace(&path)?;
        let namespaces = self.fs.list_namespaces();
        let entities: Vec<(String, String)> = self
            .fs
            .list_entities()
            .into_iter()
            .map(|name| {
                let value = self.fs.entity_value(&name);
                (name, value)
            })
            .collect();

        if format.as_deref() == Some("json") {
            let values: serde_json::Map<String, serde_json::Value> = entities
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            let obj = serde_json::json!({
                "namespace": self.fs.actual_namespace(),
                "namespaces": namespaces,
                "entities": values,
            });
            return Ok(serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".into()));
        }

        if namespaces.is_empty() && entities.is_empty() {
            return Ok("(empty)".into());
        }
        let sep = self.fs.settings().separator;
        let mut lines: Vec<String> = namespaces.iter().map(|n| format!("{}{}", n, sep)).collect();
        for (name, value) in entities {
            lines.push(format!("{:<20} {}", name, value));
        }
        Ok(lines.join("\n"))
    }

    fn cmd_get(&mut self, path: &str) -> Result<String, FsError> {
        let name = self.enter_parent(path)?;
        self.fs
            .get_entity(&name)
            .map(|v| v.clone())
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    fn cmd_set(&mut self, path: &str, value: String) -> Result<String, FsError> {
        let existed = self.in_created_parent(path, |fs, name| {
            if fs.exists_entity(name) {
                fs.set_entity_value(name, value).map(|_| true)
            } else {
                fs.create_entity(name, value).map(|()| false)
            }
        })?;
        if existed {
            Ok(format!("Updated {}", path))
        } else {
            Ok(format!("Created {}", path))
        }
    }

    fn cmd_mkdir(&mut self, path: &str) -> Result<String, FsError> {
        self.fs.create_namespace(path)?;
        Ok(format!("Created namespace {}", path))
    }

    fn cmd_rm(&mut self, path: &str) -> Result<String, FsError> {
        if self.fs.exists_namespace(path) {
            self.fs.delete_namespace(path)?;
            return Ok(format!("Removed namespace {}", path));
        }
        let name = self.enter_parent(path)?;
        if self.fs.delete_entity(&name) {
            Ok(format!("Removed {}", path))
        } else {
            Err(FsError::NotFound(path.to_string()))
        }
    }

    fn cmd_link(&mut self, path: &str, target: &str) -> Result<String, FsError> {
        self.in_created_parent(path, |fs, name| fs.link(name, target))?;
        Ok(format!("Linked {} -> {}", path, target))
    }

    fn cmd_mv(&mut self, path: &str, to: &str) -> Result<String, FsError> {
        let name = self.enter_parent(path)?;
        self.fs.rename_entity(&name, to)?;
        Ok(format!("Renamed {} to {}", path, to))
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn root_path(&self) -> String {
        self.fs.settings().separator.to_string()
    }

    /// Split an entity path into its namespace path and entity name.
    fn split_entity_path(&self, path: &str) -> Result<(String, String), FsError> {
        let sep = self.fs.settings().separator;
        let parsed = self.fs.parse_path(path)?;
        let (parent, name) = parsed
            .split_last()
            .ok_or_else(|| FsError::invalid(path, "path names no entity"))?;

        let mut parent_path = parent.to_path_string(sep);
        if parent_path.is_empty() {
            parent_path = sep.to_string();
        }
        Ok((parent_path, name))
    }

    /// Move the cursor to the namespace holding the entity at `path` and
    /// return the entity name.
    fn enter_parent(&mut self, path: &str) -> Result<String, FsError> {
        let (parent_path, name) = self.split_entity_path(path)?;
        self.fs.enter_namespace(&parent_path)?;
        Ok(name)
    }

    /// Like `enter_parent`, but missing namespaces are created and `op`
    /// runs on the entity name there. If `op` fails, the namespaces created
    /// for it are removed again.
    fn in_created_parent<R>(
        &mut self,
        path: &str,
        op: impl FnOnce(&mut FakeFs<String>, &str) -> Result<R, FsError>,
    ) -> Result<R, FsError> {
        let sep = self.fs.settings().separator;
        let (parent_path, name) = self.split_entity_path(path)?;

        let res = self.fs.resolve(&parent_path)?;
        let created = if res.is_complete() {
            None
        } else {
            let mut top = self.fs.namespace_path(res.node)?;
            if !top.ends_with(sep) {
                top.push(sep);
            }
            top.push_str(&res.rest[0]);
            self.fs.create_namespace(&parent_path)?;
            Some(top)
        };
        self.fs.enter_namespace(&parent_path)?;

        let result = op(&mut self.fs, &name);
        if let (Err(_), Some(top)) = (&result, created) {
            let root = self.fs.root();
            let _ = self.fs.enter_node(root);
            let _ = self.fs.delete_namespace(&top);
        }
        result
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
