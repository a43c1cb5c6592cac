//! Rezka Tauri Integration
//!
//! Provides a Tauri plugin that exposes the rezka catalog client to a frontend.
//!
//! # Usage
//!
//! Register the plugin in your Tauri application:
//!
//! ```ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(rezka_tauri::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Then invoke commands from the frontend:
//!
//! ```javascript
//! import { invoke } from '@tauri-apps/api/core';
//!
//! // Catalog listings
//! const popular = await invoke('plugin:rezka|popular_movies');
//! const found = await invoke('plugin:rezka|search_movies', { query: 'die hard' });
//!
//! // Stream metadata for the player
//! const stream = await invoke('plugin:rezka|movie_stream', {
//!   request: { url: found[0].url, quality: '720p' }
//! });
//! ```

use std::sync::Arc;

use rezka_core::{ApiSession, ClientConfig};
use tauri::{
    Manager, Runtime,
    plugin::{Builder, TauriPlugin},
};

mod commands;

/// Shared session handle for Tauri commands
///
/// The session resolves its mirror on first use and is safe to call from
/// several commands at once, so it is shared through an `Arc` without a lock.
pub struct SessionState {
    pub(crate) session: Arc<ApiSession>,
}

impl SessionState {
    /// Create a new SessionState from `REZKA_*` environment configuration
    ///
    /// # Errors
    /// Returns error string if the session cannot be built
    pub fn new() -> Result<Self, String> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a new SessionState with explicit configuration
    pub fn with_config(config: ClientConfig) -> Result<Self, String> {
        let session = ApiSession::with_config(config).map_err(|e| e.to_string())?;
        Ok(Self::from_session(Arc::new(session)))
    }

    /// Wrap an already-built session
    pub fn from_session(session: Arc<ApiSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<ApiSession> {
        &self.session
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new().expect("Failed to create default SessionState")
    }
}

/// Initialize the rezka plugin
///
/// # Returns
/// A configured TauriPlugin ready to be registered with the Tauri application
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("rezka")
        .invoke_handler(tauri::generate_handler![
            commands::search_movies,
            commands::popular_movies,
            commands::new_movies,
            commands::now_watching,
            commands::movie_details,
            commands::movie_stream
        ])
        .setup(|app, _api| {
            let state = SessionState::new().map_err(Box::<dyn std::error::Error>::from)?;
            tracing::info!(
                "rezka plugin ready with {} mirror(s)",
                state.session.mirrors().len()
            );
            app.manage(state);
            Ok(())
        })
        .build()
}
