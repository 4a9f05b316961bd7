use std::{
    process::Command,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread::sleep,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use dbseed::{CredentialResolver, CredentialsError, DatabaseCredentials};
use portpicker::pick_unused_port;
use tokio::{net::TcpListener, task::JoinHandle};

pub const ROOT_PASSWORD: &str = "password";

/// A MySQL server in a throwaway container
pub struct DockerInstance {
    pub container_name: &'static str,
    pub host_port: u16,
}

impl DockerInstance {
    pub fn new(container_name: &'static str) -> Self {
        let host_port = pick_unused_port().unwrap();
        let port_binding = format!("{host_port}:3306");
        let root_password = format!("MYSQL_ROOT_PASSWORD={ROOT_PASSWORD}");

        Command::new("docker")
            .args([
                "run",
                "--rm",
                "--name",
                container_name,
                "-p",
                &port_binding,
                "-e",
                &root_password,
                "mysql:8.0",
            ])
            .spawn()
            .unwrap();

        // Ping over TCP: the entrypoint's bootstrap server does not listen on the network
        Self::wait_ready(
            Duration::from_secs(180),
            &[
                "exec",
                container_name,
                "mysqladmin",
                "ping",
                "--host",
                "127.0.0.1",
                "--user",
                "root",
                &format!("--password={ROOT_PASSWORD}"),
                "--silent",
            ],
        );

        Self {
            container_name,
            host_port,
        }
    }

    fn wait_ready(mut timeout: Duration, is_ready_cmd: &[&str]) {
        let mut now = SystemTime::now();
        while !timeout.is_zero() {
            let status = Command::new("docker")
                .args(is_ready_cmd)
                .output()
                .unwrap()
                .status;

            if status.success() {
                return;
            }

            sleep(Duration::from_millis(350));

            timeout = timeout
                .checked_sub(now.elapsed().unwrap())
                .unwrap_or_default();
            now = SystemTime::now();
        }
        panic!("timed out while waiting for test MySQL container to come up");
    }

    pub fn credentials(&self, username: &str, password: &str) -> DatabaseCredentials {
        DatabaseCredentials::new("127.0.0.1", username, password, self.host_port)
    }

    /// Run a statement as root and return the tab separated rows
    pub fn exec_mysql(&self, query: &str) -> String {
        let output = Command::new("docker")
            .args([
                "exec",
                "--env",
                &format!("MYSQL_PWD={ROOT_PASSWORD}"),
                self.container_name,
                "mysql",
                "--user",
                "root",
                "--batch",
                "--skip-column-names",
                "--execute",
                query,
            ])
            .output()
            .unwrap()
            .stdout;

        String::from_utf8(output).unwrap().trim().to_string()
    }

    pub fn cleanup(&self) {
        Command::new("docker")
            .args(["stop", self.container_name])
            .output()
            .expect("failed to stop test MySQL container");
        Command::new("docker")
            .args(["rm", self.container_name])
            .output()
            .expect("failed to remove test MySQL container");
    }
}

/// Hands out the same credentials on every call
pub struct FixedCredentials(pub DatabaseCredentials);

#[async_trait]
impl CredentialResolver for FixedCredentials {
    async fn resolve(
        &self,
        _secret_name: &str,
        _region: &str,
    ) -> Result<DatabaseCredentials, CredentialsError> {
        Ok(self.0.clone())
    }
}

fn secret_not_found(secret_name: &str) -> CredentialsError {
    CredentialsError::Lookup {
        secret_name: secret_name.to_string(),
        reason: "ResourceNotFoundException: Secrets Manager can't find the specified secret."
            .to_string(),
    }
}

/// Behaves like a secrets store that does not know the requested secret
pub struct UnknownSecret;

#[async_trait]
impl CredentialResolver for UnknownSecret {
    async fn resolve(
        &self,
        secret_name: &str,
        _region: &str,
    ) -> Result<DatabaseCredentials, CredentialsError> {
        Err(secret_not_found(secret_name))
    }
}

/// A secret that can be deleted and restored between invocations. Clones share state.
#[derive(Clone)]
pub struct ToggledSecret {
    credentials: DatabaseCredentials,
    available: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
}

impl ToggledSecret {
    pub fn new(credentials: DatabaseCredentials, available: bool) -> Self {
        Self {
            credentials,
            available: Arc::new(AtomicBool::new(available)),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialResolver for ToggledSecret {
    async fn resolve(
        &self,
        secret_name: &str,
        _region: &str,
    ) -> Result<DatabaseCredentials, CredentialsError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.available.load(Ordering::SeqCst) {
            Ok(self.credentials.clone())
        } else {
            Err(secret_not_found(secret_name))
        }
    }
}

/// Accepts TCP connections but never sends a server greeting. Counts the connections it sees.
pub struct SilentHost {
    pub port: u16,
    accepted: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl SilentHost {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&accepted);
        let task = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(stream);
            }
        });

        Self {
            port,
            accepted,
            task,
        }
    }

    pub fn credentials(&self) -> DatabaseCredentials {
        DatabaseCredentials::new("127.0.0.1", "admin", "pw", self.port)
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for SilentHost {
    fn drop(&mut self) {
        self.task.abort();
    }
}
