use serde::Serialize;
use tracing::error;

use crate::error::Error;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

/// What the function hands back to its caller
///
/// `body` is JSON text in its own right: a quoted string carrying the human readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn success(database_name: &str, table_name: &str) -> Self {
        Self::new(
            STATUS_OK,
            &format!(
                "Database `{database_name}` and table `{table_name}` created. Data inserted successfully."
            ),
        )
    }

    fn new(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: serde_json::Value::String(message.to_string()).to_string(),
        }
    }
}

impl From<Error> for InvocationResult {
    fn from(err: Error) -> Self {
        error!(
            error = &err as &dyn std::error::Error,
            kind = %err.kind(),
            "invocation failed"
        );

        Self::new(STATUS_ERROR, &format!("Error: {err}"))
    }
}
