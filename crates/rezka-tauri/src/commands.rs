//! Tauri commands for the rezka client
//!
//! This module contains all Tauri command implementations. Session methods
//! never fail, so the `Err` arm is never produced; Tauri requires async
//! commands that borrow managed state to return `Result`.

use rezka_core::{MovieSummary, StreamDescriptor, StreamRequest};
use serde_json::Value;
use tauri::State;

use crate::SessionState;

/// Search the catalog
///
/// # Arguments
/// * `state` - Managed SessionState from Tauri
/// * `query` - Search query string
///
/// # Returns
/// Matching movies, empty if nothing matched or the request failed
#[tauri::command]
pub async fn search_movies(
    state: State<'_, SessionState>,
    query: String,
) -> Result<Vec<MovieSummary>, String> {
    Ok(state.session.search_movies(&query).await)
}

#[tauri::command]
pub async fn popular_movies(state: State<'_, SessionState>) -> Result<Vec<MovieSummary>, String> {
    Ok(state.session.popular_movies().await)
}

#[tauri::command]
pub async fn new_movies(state: State<'_, SessionState>) -> Result<Vec<MovieSummary>, String> {
    Ok(state.session.new_movies().await)
}

#[tauri::command]
pub async fn now_watching(state: State<'_, SessionState>) -> Result<Vec<MovieSummary>, String> {
    Ok(state.session.now_watching().await)
}

/// Get the detail record for a movie link
///
/// # Returns
/// The backend JSON as-is, or null if the request failed
#[tauri::command]
pub async fn movie_details(
    state: State<'_, SessionState>,
    url: String,
) -> Result<Option<Value>, String> {
    Ok(state.session.movie_details(&url).await)
}

/// Get stream metadata for a movie or episode
///
/// # Arguments
/// * `state` - Managed SessionState from Tauri
/// * `request` - Movie link plus optional translation, quality, season and episode
///
/// # Returns
/// Stream descriptor, or null if the backend could not provide one
#[tauri::command]
pub async fn movie_stream(
    state: State<'_, SessionState>,
    request: StreamRequest,
) -> Result<Option<StreamDescriptor>, String> {
    Ok(state.session.movie_stream(&request).await)
}
