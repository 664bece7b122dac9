//! `fib-client` – submits Fibonacci jobs to a satellite, counting down from N.

use anyhow::Context;
use satellite::config::Properties;
use satellite::{Job, JobClient};

const DEFAULT_START: u64 = 48;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let target = match args.next() {
        Some(path) => {
            let props = Properties::load(std::path::Path::new(&path))?;
            format!("{}:{}", props.require("HOST")?, props.require("PORT")?)
        }
        None => {
            let host = std::env::var("SATELLITE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = std::env::var("SATELLITE_PORT").context("SATELLITE_PORT not set")?;
            format!("{}:{}", host, port)
        }
    };
    let start: u64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid start '{}'", raw))?,
        None => DEFAULT_START,
    };

    eprintln!("Submitting to {} (satellite v{})", target, satellite::VERSION);

    let client = JobClient::new(target);
    for n in (1..=start).rev() {
        let job = Job::new("fibonacci", serde_json::json!(n));
        match client.submit(&job).await {
            Ok(result) => println!("F({}) = {}", n, result),
            Err(e) => eprintln!("F({}) failed: {}", n, e),
        }
    }

    Ok(())
}
