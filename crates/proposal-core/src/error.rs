use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),
}
