use strum::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("failed to look up secret `{secret_name}`: {reason}")]
    Lookup { secret_name: String, reason: String },

    #[error("secret `{secret_name}` has no text value")]
    MissingSecretString { secret_name: String },

    #[error("secret is not a valid credential bundle: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to resolve database credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("failed to connect to {address}: {reason}")]
    Connection { address: String, reason: String },

    #[error("failed to {step}: {reason}")]
    Statement { step: Step, reason: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Credentials(_) => ErrorKind::Credentials,
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Statement { .. } => ErrorKind::Statement,
        }
    }

    pub(crate) fn statement(step: Step) -> impl FnOnce(sqlx::Error) -> Self {
        move |e| Error::Statement {
            step,
            reason: e.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Credentials,
    Connection,
    Statement,
}

/// The statement an invocation was executing when it failed
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Step {
    #[strum(serialize = "create database")]
    CreateDatabase,
    #[strum(serialize = "create table")]
    CreateTable,
    #[strum(serialize = "start transaction")]
    BeginTransaction,
    #[strum(serialize = "insert seed row")]
    InsertSeedRow,
    #[strum(serialize = "commit")]
    Commit,
}
