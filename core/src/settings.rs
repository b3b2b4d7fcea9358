//! Store settings, loaded from a YAML file.
//!
//! Every field has a default, so an empty document (or no file at all)
//! yields the classic behaviour: `/` separators, tab indentation, lossy
//! link handling on save and lenient loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FsError;


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FsSettings {
    /// Path separator character.
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Indentation unit written once per nesting level by `save`.
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Write later slots of a shared entity as link lines instead of
    /// duplicating the value.
    #[serde(default)]
    pub preserve_links: bool,

    /// Abort `load` on the first rejected line instead of skipping it.
    #[serde(default)]
    pub strict_load: bool,
}


fn default_separator() -> char {
    '/'
}

fn default_indent() -> String {
    "\t".into()
}


impl Default for FsSettings {
    fn default() -> Self {
        FsSettings {
            separator: default_separator(),
            indent: default_indent(),
            preserve_links: false,
            strict_load: false,
        }
    }
}

impl FsSettings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<FsSettings, FsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FsError::Settings(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse settings from a YAML string.
    pub fn parse(content: &str) -> Result<FsSettings, FsError> {
        if content.trim().is_empty() {
            return Ok(FsSettings::default());
        }
        let settings: FsSettings = serde_yaml::from_str(content)
            .map_err(|e| FsError::Settings(format!("invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject a separator or indent that the save format cannot carry.
    pub fn validate(&self) -> Result<(), FsError> {
        if matches!(self.separator, '"' | '\\' | '{' | '}' | '@') || self.separator.is_whitespace() {
            return Err(FsError::Settings(format!(
                "separator '{}' clashes with the save format",
                self.separator
            )));
        }
        if self.indent.chars().any(|c| !c.is_whitespace()) {
            return Err(FsError::Settings("indent must be whitespace".into()));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
separator: ":"
indent: "    "
preserve_links: true
strict_load: true
"#;
        let s = FsSettings::parse(yaml).unwrap();
        assert_eq!(s.separator, ':');
        assert_eq!(s.indent, "    ");
        assert!(s.preserve_links);
        assert!(s.strict_load);
    }

    #[test]
    fn parse_partial_settings_uses_defaults() {
        let s = FsSettings::parse("preserve_links: true\n").unwrap();
        assert_eq!(s.separator, '/');
        assert_eq!(s.indent, "\t");
        assert!(s.preserve_links);
        assert!(!s.strict_load);
    }

    #[test]
    fn parse_empty_is_default() {
        assert_eq!(FsSettings::parse("").unwrap(), FsSettings::default());
        assert_eq!(FsSettings::parse("  \n").unwrap(), FsSettings::default());
    }

    #[test]
    fn parse_rejects_quote_separator() {
        let err = FsSettings::parse("separator: '\"'\n").unwrap_err();
        assert!(err.to_string().contains("clashes"));
    }

    #[test]
    fn parse_rejects_visible_indent() {
        assert!(FsSettings::parse("indent: \"--\"\n").is_err());
    }

    #[test]
    fn parse_garbage_fails() {
        let err = FsSettings::parse("separator: [1, 2]\n").unwrap_err();
        assert!(err.to_string().contains("invalid settings"));
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("fakefs_settings_tests");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("settings.yaml");
        std::fs::write(&path, "indent: \"  \"\n").unwrap();
        let s = FsSettings::load(&path).unwrap();
        assert_eq!(s.indent, "  ");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = FsSettings::load(Path::new("/nonexistent/fakefs/settings.yaml")).unwrap_err();
        assert!(matches!(err, FsError::Settings(_)));
    }
}
