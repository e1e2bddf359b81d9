//! Rule set files.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use taskgate_core::rules::{RuleSet, RulesStore};
use taskgate_core::StoreError;
use tracing::debug;

/// JSON rule file name inside a board directory.
pub const RULES_JSON: &str = "rules.json";
/// TOML rule file name inside a board directory, read when no JSON file exists.
pub const RULES_TOML: &str = "rules.toml";

/// Rules stored as files under a root directory, one directory per board.
#[derive(Debug, Clone)]
pub struct FsRulesStore {
    root: PathBuf,
}

impl FsRulesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of a board. Absolute board paths are used as-is.
    pub fn board_dir(&self, board_path: &str) -> PathBuf {
        let path = Path::new(board_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Write a rule set as pretty-printed JSON, creating the board directory.
    pub async fn save_rules(&self, board_path: &str, rule_set: &RuleSet) -> Result<(), StoreError> {
        let dir = self.board_dir(board_path);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_string_pretty(rule_set)?;
        tokio::fs::write(dir.join(RULES_JSON), json).await?;
        debug!(board_path = %board_path, rules = rule_set.rules.len(), "Rules saved");
        Ok(())
    }
}

/// Read a file, mapping "not found" to `None`.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl RulesStore for FsRulesStore {
    async fn read_rules(&self, board_path: &str) -> Result<RuleSet, StoreError> {
        let dir = self.board_dir(board_path);

        if let Some(json) = read_optional(&dir.join(RULES_JSON)).await? {
            let rule_set: RuleSet = serde_json::from_str(&json)?;
            debug!(board_path = %board_path, rules = rule_set.rules.len(), "Rules loaded from JSON");
            return Ok(rule_set);
        }

        if let Some(text) = read_optional(&dir.join(RULES_TOML)).await? {
            let rule_set: RuleSet =
                toml::from_str(&text).map_err(|e| StoreError::Serialization(e.to_string()))?;
            debug!(board_path = %board_path, rules = rule_set.rules.len(), "Rules loaded from TOML");
            return Ok(rule_set);
        }

        debug!(board_path = %board_path, "No rules file, using empty rule set");
        Ok(RuleSet::default())
    }
}
