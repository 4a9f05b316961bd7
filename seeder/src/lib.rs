use lambda_runtime::LambdaEvent;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection},
    ConnectOptions, Connection,
};
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

pub use args::{Args, SeederConfig};
pub use credentials::{CredentialResolver, SecretsManagerResolver};
pub use dbseed_common::DatabaseCredentials;
pub use error::{CredentialsError, Error, ErrorKind, Step};
pub use response::InvocationResult;

mod args;
mod credentials;
mod error;
mod response;

/// The single row written on every successful invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedRow {
    pub name: &'static str,
    pub email: &'static str,
}

impl Default for SeedRow {
    fn default() -> Self {
        Self {
            name: "Jane Doe",
            email: "jane.doe@example.com",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Auto-assigned id of the inserted row
    pub inserted_id: u64,
}

pub struct Seeder<R> {
    config: SeederConfig,
    resolver: R,
}

impl<R: CredentialResolver> Seeder<R> {
    pub fn new(config: SeederConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    /// Entrypoint for the function runtime. The event payload is not used.
    pub async fn handle<T>(&self, event: LambdaEvent<T>) -> InvocationResult {
        let span = info_span!("invocation", request_id = %event.context.request_id);

        self.invoke().instrument(span).await
    }

    /// Run the whole workflow and flatten the outcome into the response contract
    pub async fn invoke(&self) -> InvocationResult {
        match self.run().await {
            Ok(SeedOutcome { inserted_id }) => {
                info!(
                    database = %self.config.database_name,
                    table = %self.config.table_name,
                    inserted_id,
                    "database seeded"
                );

                InvocationResult::success(&self.config.database_name, &self.config.table_name)
            }
            Err(err) => err.into(),
        }
    }

    /// Resolve credentials, ensure the database exists, then ensure the table exists and seed it.
    ///
    /// Stops at the first failure. Nothing done by earlier steps is rolled back.
    pub async fn run(&self) -> Result<SeedOutcome, Error> {
        let credentials = self
            .resolver
            .resolve(&self.config.secret_name, &self.config.region)
            .await?;

        self.provision_database(&credentials).await?;
        let inserted_id = self.seed_table(&credentials).await?;

        Ok(SeedOutcome { inserted_id })
    }

    /// Create the configured database if it does not exist yet
    #[tracing::instrument(skip_all, fields(database = %self.config.database_name))]
    pub async fn provision_database(&self, credentials: &DatabaseCredentials) -> Result<(), Error> {
        let mut conn = self.connect(credentials, None).await?;

        let create_db_query = format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            quote_identifier(&self.config.database_name)
        );
        let result = sqlx::query(&create_db_query)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(Error::statement(Step::CreateDatabase));

        release(conn).await;

        result
    }

    /// Create the configured table inside the configured database if needed, then insert the
    /// seed row. Returns the id assigned to the new row.
    #[tracing::instrument(
        skip_all,
        fields(database = %self.config.database_name, table = %self.config.table_name)
    )]
    pub async fn seed_table(&self, credentials: &DatabaseCredentials) -> Result<u64, Error> {
        let mut conn = self
            .connect(credentials, Some(&self.config.database_name))
            .await?;

        let result = self.create_table_and_insert(&mut conn).await;

        release(conn).await;

        result
    }

    async fn create_table_and_insert(&self, conn: &mut MySqlConnection) -> Result<u64, Error> {
        let table = quote_identifier(&self.config.table_name);

        let create_table_query = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(100),
                email VARCHAR(100)
            )"
        );
        sqlx::query(&create_table_query)
            .execute(&mut *conn)
            .await
            .map_err(Error::statement(Step::CreateTable))?;

        let row = SeedRow::default();
        let insert_query = format!("INSERT INTO {table} (name, email) VALUES (?, ?)");

        let mut tx = conn
            .begin()
            .await
            .map_err(Error::statement(Step::BeginTransaction))?;

        let inserted = sqlx::query(&insert_query)
            .bind(row.name)
            .bind(row.email)
            .execute(&mut *tx)
            .await
            .map_err(Error::statement(Step::InsertSeedRow))?;

        tx.commit()
            .await
            .map_err(Error::statement(Step::Commit))?;

        Ok(inserted.last_insert_id())
    }

    /// Open a connection to the host in `credentials`, optionally selecting a database.
    /// Gives up after the configured connect timeout.
    async fn connect(
        &self,
        credentials: &DatabaseCredentials,
        database: Option<&str>,
    ) -> Result<MySqlConnection, Error> {
        let mut options = MySqlConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .username(&credentials.username)
            .password(credentials.password.expose());

        if let Some(database) = database {
            options = options.database(database);
        }

        let address = credentials.address();
        debug!(%address, database, "connecting to database host");

        match timeout(self.config.connect_timeout, options.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(Error::Connection {
                address,
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Connection {
                address,
                reason: format!("timed out after {:?}", self.config.connect_timeout),
            }),
        }
    }
}

/// Close a connection. A failure here only gets logged so it never hides the outcome of the
/// statements that ran on it.
async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!(
            error = &e as &dyn std::error::Error,
            "failed to close database connection"
        );
    }
}

// Binding does not work for identifiers
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
