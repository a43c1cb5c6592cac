//! Rezka Client Core Library
//!
//! Provides an async API for browsing the rezka movie catalog backend and
//! getting stream metadata for its movies.
//!
//! # Overview
//!
//! This crate provides:
//! - Mirror selection: the backend is reachable through several origins; the
//!   first one answering a HEAD probe is used for the whole session
//! - A session client with catalog listings (popular, new, now watching),
//!   search, movie details and stream metadata
//! - A rate-limited HTTP transport behind a trait, so tests and embedders can
//!   supply their own
//!
//! # Example
//!
//! ```no_run
//! use rezka_core::{ApiSession, Result, StreamRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = ApiSession::new()?;
//!
//!     // The first request picks a mirror
//!     let movies = session.search_movies("die hard").await;
//!
//!     for movie in &movies {
//!         println!("{}: {}", movie.title, movie.url);
//!     }
//!
//!     if let Some(movie) = movies.first() {
//!         let request = StreamRequest::new(movie.url.clone()).quality("720p");
//!         if let Some(stream) = session.movie_stream(&request).await {
//!             println!("Direct URL: {:?}", stream.current_stream_url());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Failures
//!
//! Catalog, detail and stream methods never return errors: failures are
//! logged through `tracing` and surface as empty lists or `None`. Use the
//! `try_` variants to tell a failed request from an empty result.

mod client;
mod error;
mod mirror;
mod session;
mod types;
pub mod url;

#[cfg(test)]
mod test_support;

// Re-export transport types
pub use client::{
    ClientConfig, DEFAULT_PROBE_TIMEOUT_MS, HttpTransport, MAX_REQUEST_INTERVAL, RateLimiter,
    Transport,
};

// Re-export error types
pub use error::{Result, RezkaError};

// Re-export mirror selection
pub use mirror::{DEFAULT_MIRRORS, MirrorList, MirrorResolver};

// Re-export main session API
pub use session::ApiSession;

// Re-export data types
pub use types::{
    Category, FetchOutcome, MovieSummary, Scalar, StreamDescriptor, StreamRequest, backend_error,
};

// Re-export URL helper functions for convenience
pub use crate::url::{build_category_url, build_search_url, build_stream_url, resolve_detail_url};
