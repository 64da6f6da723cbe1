use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<Option<TestServer>> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests.
        // Assumes debug profile; adjust if you run tests with --release.
        let mut cmd = Command::new("target/debug/wayfarer-api");
        cmd.env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the environment so the server sees DATABASE_URL; a signing
        // secret is supplied when the environment carries none.
        if std::env::var("SECRET_KEY").is_err() {
            cmd.env("SECRET_KEY", "integration-test-secret");
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Spawn (once per test binary) and wait for the server. Returns `None`
/// when no DATABASE_URL is configured, so suites can skip instead of fail
/// on machines without a database.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let server = SERVER.get_or_init(|| {
        if std::env::var("DATABASE_URL").is_err() {
            return None;
        }
        Some(TestServer::spawn().expect("failed to spawn server binary"))
    });
    match server {
        Some(server) => {
            server.wait_ready(Duration::from_secs(10)).await?;
            Ok(Some(server))
        }
        None => {
            eprintln!("skipping: DATABASE_URL not set");
            Ok(None)
        }
    }
}

/// Name made unique per run so reruns never collide on slugs.
#[allow(dead_code)]
pub fn unique(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    format!("{} {} {}", name, std::process::id(), nanos)
}
