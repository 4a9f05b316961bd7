use serde::{de::Error as _, Deserialize, Deserializer};

use crate::secrets::Secret;

/// Connection parameters stored in the secrets store for the target database host.
///
/// Secrets created for managed database instances carry extra keys (`engine`,
/// `dbInstanceIdentifier`, ...) which are ignored. None of them name a database: the
/// database to select is decided by the caller.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseCredentials {
    pub host: String,
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
}

impl DatabaseCredentials {
    pub fn new(host: &str, username: &str, password: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            password: Secret::new(password.to_string()),
            port,
        }
    }

    /// Parse the text payload of a secret
    pub fn from_secret_string(secret: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(secret)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Console-created secrets store the port as a string
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid port `{text}`: {e}"))),
    }
}
