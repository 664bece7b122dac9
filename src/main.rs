use std::path::Path;
use std::sync::Arc;

use satellite::config::NodeConfig;
use satellite::distribution::{CodeSource, HttpCodeSource};
use satellite::node::Satellite;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.as_slice() {
        [] => NodeConfig::from_env(),
        [satellite_props, code_server_props] => {
            NodeConfig::from_properties_files(Path::new(satellite_props), Path::new(code_server_props))
        }
        _ => {
            eprintln!("Usage: satellite [SATELLITE_PROPERTIES CODE_SERVER_PROPERTIES]");
            eprintln!("  Without arguments, configuration is read from SATELLITE_* and CODE_SERVER_* variables.");
            std::process::exit(2);
        }
    };
    let config = config.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    eprintln!("🛰  Satellite v{}", satellite::VERSION);
    eprintln!("   Name: {}", config.satellite.display_name());
    eprintln!("   Port: {}", config.satellite.port);
    eprintln!("   Code server: {}", config.code_server.authority("?"));

    let source: Arc<dyn CodeSource> = match HttpCodeSource::new(&config.code_server, config.fetch_timeout) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let node = Satellite::bind(config, source).await.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    node.run().await;
}
