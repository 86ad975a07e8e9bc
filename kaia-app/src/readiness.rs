//! Startup readiness probes.
//!
//! Each probe is idempotent and side-effect free, with bounded
//! exponential backoff instead of fixed-sleep polling. The model daemon
//! is a hard requirement; the vector-store server is advisory.

use anyhow::{bail, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;

const MODEL_DAEMON_ATTEMPTS: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(2);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn probe_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn probe_once(client: &reqwest::Client, url: &str) -> Result<()> {
    let response = client.get(url).send().await?;
    if response.status().is_server_error() {
        bail!("server error: {}", response.status());
    }
    Ok(())
}

/// Confirm the model daemon answers, retrying with capped backoff.
pub async fn await_model_daemon(config: &Config) -> Result<()> {
    let client = probe_client();
    let url = format!("{}/api/tags", config.ollama_url.trim_end_matches('/'));

    let mut backoff = INITIAL_BACKOFF;
    let mut last_error = None;
    for attempt in 1..=MODEL_DAEMON_ATTEMPTS {
        match probe_once(&client, &url).await {
            Ok(()) => {
                info!(attempt, "model daemon is reachable");
                return Ok(());
            }
            Err(e) => {
                warn!(attempt, error = %e, "model daemon probe failed");
                last_error = Some(e);
            }
        }
        if attempt < MODEL_DAEMON_ATTEMPTS {
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    bail!(
        "model daemon at {} is not reachable after {} attempts: {}",
        config.ollama_url,
        MODEL_DAEMON_ATTEMPTS,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )
}

/// Single advisory probe of the vector-store server's heartbeat.
pub async fn vector_store_reachable(config: &Config) -> bool {
    let client = probe_client();
    let url = format!(
        "{}/api/v1/heartbeat",
        config.vector_store_url.trim_end_matches('/')
    );
    match probe_once(&client, &url).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "vector-store server not reachable; knowledge answers may degrade");
            false
        }
    }
}

/// `kaia doctor`: run every probe once and print a report. Returns
/// whether all required checks passed.
pub async fn doctor(config: &Config) -> bool {
    println!("Kaia health check\n");
    let mut healthy = true;

    print!("model daemon ({})... ", config.ollama_url);
    match probe_once(
        &probe_client(),
        &format!("{}/api/tags", config.ollama_url.trim_end_matches('/')),
    )
    .await
    {
        Ok(()) => println!("✓"),
        Err(e) => {
            println!("✗ ({})", e);
            healthy = false;
        }
    }

    print!("vector store ({})... ", config.vector_store_url);
    if vector_store_reachable(config).await {
        println!("✓");
    } else {
        println!("✗ (advisory)");
    }

    print!("data directory ({})... ", config.data_dir.display());
    match std::fs::create_dir_all(&config.data_dir) {
        Ok(()) => println!("✓"),
        Err(e) => {
            println!("✗ ({})", e);
            healthy = false;
        }
    }

    print!("relational store ({})... ", config.db_path().display());
    match kaia_store::AssistantStore::open(config.db_path()) {
        Ok(store) => {
            let status = store.status();
            println!("✓ (tables: {})", status.tables.join(", "));
        }
        Err(e) => {
            println!("✗ ({})", e);
            healthy = false;
        }
    }

    println!();
    if healthy {
        println!("All required checks passed");
    } else {
        println!("Health check failed");
    }
    healthy
}
