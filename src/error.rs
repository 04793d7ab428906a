use crate::employee::Email;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Approval workflow must have at least one approver")]
    MissingApprover,
    #[error("Approval workflow must have at least one member")]
    NoMembers,
    #[error("Approver {0} forwards back into its own approval chain")]
    CircularReference(Email),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read workflow config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse workflow config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
}
