//! Core type definitions for the application

use std::time::Instant;

use super::content::Song;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::MainContent => ActiveSection::Library,
        }
    }
}

/// An item in the Library section
#[derive(Clone, Debug)]
pub struct LibraryItem {
    pub name: String,
}

pub const LIBRARY_DISCOVER: usize = 0;
pub const LIBRARY_NOW_PLAYING: usize = 1;
pub const LIBRARY_QUEUE: usize = 2;

/// Which tab of search results is selected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchTab {
    #[default]
    Songs,
    Artists,
    Albums,
    Playlists,
}

impl SearchTab {
    pub fn next(self) -> Self {
        match self {
            Self::Songs => Self::Artists,
            Self::Artists => Self::Albums,
            Self::Albums => Self::Playlists,
            Self::Playlists => Self::Songs,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Songs => Self::Playlists,
            Self::Artists => Self::Songs,
            Self::Albums => Self::Artists,
            Self::Playlists => Self::Albums,
        }
    }
}

/// Which section within artist detail is selected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArtistDetailSection {
    #[default]
    Songs,
    Albums,
}

impl ArtistDetailSection {
    pub fn next(self) -> Self {
        match self {
            Self::Songs => Self::Albums,
            Self::Albums => Self::Songs,
        }
    }
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    /// A song together with the list it was picked from, which becomes the new queue
    Song { song: Song, context: Vec<Song> },
    Artist { id: Option<String>, name: String },
    Album { id: String },
    Playlist { id: String },
    QueueEntry { index: usize },
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_items: Vec<LibraryItem>,
    pub library_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            library_items: vec![
                LibraryItem { name: "Discover".to_string() },
                LibraryItem { name: "Now playing".to_string() },
                LibraryItem { name: "Queue".to_string() },
            ],
            library_selected: 0,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
        }
    }
}
