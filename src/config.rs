//! Approval settings of a workspace
use super::employee::Email;
use super::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowConfig {
    /// Root of the default workflow.
    pub default_approver: Email,
    /// Workspace owner, the fallback approver when someone is removed.
    pub owner: Email,
    #[serde(default)]
    pub prevent_self_approval: bool,
}

impl WorkflowConfig {
    pub fn new(default_approver: impl Into<Email>, owner: impl Into<Email>) -> Self {
        Self {
            default_approver: default_approver.into(),
            owner: owner.into(),
            prevent_self_approval: false,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: WorkflowConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_approver.is_empty() {
            return Err(ConfigError::MissingField("default_approver"));
        }
        if self.owner.is_empty() {
            return Err(ConfigError::MissingField("owner"));
        }
        Ok(())
    }
}
