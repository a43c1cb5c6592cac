//! Debug script to walk the catalog and fetch a stream descriptor
//!
//! Run with: cargo run --example debug_browse -p rezka-core -- "die hard"

use rezka_core::{ApiSession, ClientConfig, FetchOutcome, StreamRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "die hard".to_string());
    let session = ApiSession::with_config(ClientConfig::from_env())?;

    println!("Searching for '{}'...\n", query);

    let results = match session.try_search_movies(&query).await {
        FetchOutcome::Fetched(movies) => movies,
        FetchOutcome::Empty => {
            println!("No results found!");
            return Ok(());
        }
        FetchOutcome::Failed(e) => {
            println!("Search failed: {}", e);
            return Ok(());
        }
    };

    println!("Mirror: {}", session.resolved_base_url().unwrap_or("?"));
    println!("Found {} results:\n", results.len());

    for (i, movie) in results.iter().take(5).enumerate() {
        println!("{}. {}", i + 1, movie.title);
        println!("   URL: {}", movie.url);
        if let Some(ref year) = movie.year {
            println!("   Year: {}", year);
        }
        if let Some(ref rating) = movie.rating {
            println!("   Rating: {}", rating);
        }
        println!();
    }

    let movie = &results[0];
    println!("Getting stream for: {}\n", movie.title);

    match session.movie_stream(&StreamRequest::new(movie.url.clone())).await {
        Some(stream) => {
            println!("Translations:");
            for (name, id) in &stream.translations {
                println!("   {} ({})", name, id);
            }
            println!("Resolutions: {}", stream.sorted_resolutions().join(", "));
            println!(
                "Current: {} -> {}",
                stream.current_resolution,
                stream.current_stream_url().unwrap_or("-")
            );
        }
        None => println!("No stream metadata available"),
    }

    Ok(())
}
