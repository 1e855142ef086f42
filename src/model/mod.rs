//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (enums, UI state, etc.)
//! - `content`: Songs and content view data (search results, albums, playlists, artists)
//! - `queue`: The playback queue state machine
//! - `playback`: Playback settings and the render snapshot
//! - `api`: Wire types of the catalog API
//! - `saavn_client`: Catalog API client
//! - `app_model`: Main application model with state management methods

mod types;
mod content;
mod queue;
mod playback;
mod api;
mod saavn_client;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    ActiveSection, ArtistDetailSection, SearchTab, SelectedItem, UiState,
    LIBRARY_DISCOVER, LIBRARY_NOW_PLAYING, LIBRARY_QUEUE,
};

pub use playback::PlaybackInfo;

pub use content::{
    Song, SearchAlbum, SearchArtist, SearchPlaylist, SearchResults,
    AlbumDetail, PlaylistDetail, ArtistDetail, ContentView, ContentState,
};

pub use queue::{PlayerState, RemoveOutcome};

pub use saavn_client::{CatalogError, SaavnClient};

pub use app_model::AppModel;

#[cfg(test)]
pub(crate) use content::test_song;
