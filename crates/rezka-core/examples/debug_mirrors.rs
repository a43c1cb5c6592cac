//! Debug script to see which mirror a session would pick
//!
//! Run with: RUST_LOG=debug cargo run --example debug_mirrors -p rezka-core
//! Override the candidates with REZKA_MIRRORS=https://a,https://b

use std::sync::Arc;

use rezka_core::{ClientConfig, HttpTransport, MirrorList, MirrorResolver};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env();
    let mirrors = MirrorList::new(&config.mirrors)?;
    let resolver = MirrorResolver::new(
        Arc::new(HttpTransport::with_config(&config)?),
        config.probe_timeout(),
    );

    println!("Probing {} mirror(s), {:?} each...\n", mirrors.len(), resolver.probe_timeout());
    for (i, mirror) in mirrors.iter().enumerate() {
        println!("{}. {}", i + 1, mirror);
    }

    let chosen = resolver.resolve(&mirrors).await;
    println!("\nSelected: {}", chosen);

    Ok(())
}
