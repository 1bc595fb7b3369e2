use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::synth::DefaultStyle;

/// Directory scanned when no root is given.
pub const DEFAULT_ROOT: &str = "src/Controller";

/// File extension matched (case-insensitively) when none is given.
pub const DEFAULT_EXTENSION: &str = "php";

/// What happens to a file once its new text has been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Overwrite the file in place.
    #[default]
    InPlace,
    /// Leave the file alone; callers inspect the report instead.
    Diff,
}

/// Settings for a docblock run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlockConfig {
    pub root: PathBuf,
    /// Extension without the dot, compared case-insensitively.
    pub extension: String,
    pub default_style: DefaultStyle,
    pub write_mode: WriteMode,
}

impl Default for DocBlockConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
            default_style: DefaultStyle::default(),
            write_mode: WriteMode::default(),
        }
    }
}

impl DocBlockConfig {
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the extension; a leading dot is ignored.
    pub fn with_extension<S: AsRef<str>>(mut self, extension: S) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    pub fn with_default_style(mut self, style: DefaultStyle) -> Self {
        self.default_style = style;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_layout() {
        let config = DocBlockConfig::default();
        assert_eq!(config.root, PathBuf::from("src/Controller"));
        assert_eq!(config.extension, "php");
        assert_eq!(config.default_style, DefaultStyle::Verbatim);
        assert_eq!(config.write_mode, WriteMode::InPlace);
    }

    #[test]
    fn extension_setter_drops_leading_dot() {
        let config = DocBlockConfig::default().with_extension(".PHP");
        assert_eq!(config.extension, "PHP");
    }
}
