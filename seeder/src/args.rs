use std::time::Duration;

use clap::Parser;

pub const DEFAULT_SECRET_NAME: &str = "dev/lambda-db";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DATABASE_NAME: &str = "new_sample_db";
pub const DEFAULT_TABLE_NAME: &str = "users";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Name of the secret holding the database host credentials
    #[arg(long, env = "DBSEED_SECRET_NAME", default_value = DEFAULT_SECRET_NAME)]
    pub secret_name: String,

    /// Region of the secrets store
    #[arg(long, env = "DBSEED_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Database to create if absent
    #[arg(long, env = "DBSEED_DATABASE_NAME", default_value = DEFAULT_DATABASE_NAME, value_parser = parse_identifier)]
    pub database_name: String,

    /// Table to create if absent and seed
    #[arg(long, env = "DBSEED_TABLE_NAME", default_value = DEFAULT_TABLE_NAME, value_parser = parse_identifier)]
    pub table_name: String,

    /// Seconds to wait for a database connection to be established
    #[arg(
        long,
        env = "DBSEED_CONNECT_TIMEOUT",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: u64,
}

/// Everything a single invocation needs to know about where to read and write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeederConfig {
    pub secret_name: String,
    pub region: String,
    pub database_name: String,
    pub table_name: String,
    pub connect_timeout: Duration,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl From<Args> for SeederConfig {
    fn from(args: Args) -> Self {
        Self {
            secret_name: args.secret_name,
            region: args.region,
            database_name: args.database_name,
            table_name: args.table_name,
            connect_timeout: Duration::from_secs(args.connect_timeout),
        }
    }
}

// MySQL identifiers are at most 64 characters. Only the unquoted identifier charset is accepted.
fn parse_identifier(src: &str) -> Result<String, String> {
    if src.is_empty() || src.len() > 64 {
        return Err(format!(
            "identifier must be 1 to 64 characters long, got {}",
            src.len()
        ));
    }

    match src
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
    {
        Some(c) => Err(format!("identifier contains invalid character {c:?}")),
        None => Ok(src.to_string()),
    }
}
