//! Content view state and data structures for songs, search results, artists, albums, etc.

use super::types::{ArtistDetailSection, SearchTab};

/// A playable song from the catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub name: String,
    /// Primary artist names joined with ", "
    pub artists: String,
    pub duration_secs: u32,
    pub image_url: String,
    pub stream_url: String,
}

impl Song {
    pub fn duration_ms(&self) -> u64 {
        self.duration_secs as u64 * 1000
    }

    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// An artist derived from song results
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchArtist {
    pub id: Option<String>,
    pub name: String,
}

/// An album from search results
#[derive(Clone, Debug)]
pub struct SearchAlbum {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub year: String,
    pub song_count: u32,
}

/// A playlist from search results
#[derive(Clone, Debug)]
pub struct SearchPlaylist {
    pub id: String,
    pub name: String,
    pub song_count: u32,
}

/// Combined search results
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub songs: Vec<Song>,
    pub artists: Vec<SearchArtist>,
    pub albums: Vec<SearchAlbum>,
    pub playlists: Vec<SearchPlaylist>,
    pub best_match: SearchTab,
}

impl SearchResults {
    /// Collect the distinct primary artists of `songs`, in order of first appearance.
    pub fn artists_from_songs(songs: &[Song], artist_ids: &[(String, Option<String>)]) -> Vec<SearchArtist> {
        let mut artists: Vec<SearchArtist> = Vec::new();
        for name in songs.iter().flat_map(|s| s.artist_names()) {
            if artists.iter().any(|a| a.name == name) {
                continue;
            }
            let id = artist_ids
                .iter()
                .find(|(known, _)| known == name)
                .and_then(|(_, id)| id.clone());
            artists.push(SearchArtist {
                id,
                name: name.to_string(),
            });
        }
        artists
    }

    /// Pick the tab whose top result best matches the query
    pub fn determine_best_match(&mut self, query: &str) {
        let query_lower = query.trim().to_lowercase();

        let artist_score = self.artists.first().map(|a| {
            let name_lower = a.name.to_lowercase();
            if name_lower == query_lower { 100 }
            else if name_lower.starts_with(&query_lower) { 80 }
            else { 0 }
        }).unwrap_or(0);

        let song_score = self.songs.first().map(|s| {
            let name_lower = s.name.to_lowercase();
            let artists_lower = s.artists.to_lowercase();
            if name_lower == query_lower { 95 }
            else if name_lower.starts_with(&query_lower) || artists_lower.starts_with(&query_lower) { 75 }
            else if name_lower.contains(&query_lower) || artists_lower.contains(&query_lower) { 55 }
            else { 0 }
        }).unwrap_or(0);

        let album_score = self.albums.first().map(|a| {
            let name_lower = a.name.to_lowercase();
            if name_lower == query_lower { 85 }
            else if name_lower.starts_with(&query_lower) { 65 }
            else { 0 }
        }).unwrap_or(0);

        let playlist_score = self.playlists.first().map(|p| {
            let name_lower = p.name.to_lowercase();
            if name_lower == query_lower { 80 }
            else if name_lower.starts_with(&query_lower) { 60 }
            else { 0 }
        }).unwrap_or(0);

        let max_score = artist_score.max(album_score).max(playlist_score).max(song_score);

        self.best_match = if max_score == 0 {
            if !self.songs.is_empty() { SearchTab::Songs }
            else if !self.albums.is_empty() { SearchTab::Albums }
            else if !self.playlists.is_empty() { SearchTab::Playlists }
            else { SearchTab::Songs }
        } else if artist_score == max_score {
            SearchTab::Artists
        } else if song_score == max_score {
            SearchTab::Songs
        } else if album_score == max_score {
            SearchTab::Albums
        } else {
            SearchTab::Playlists
        };
    }
}

/// Artist page: songs credited to the artist plus their albums
#[derive(Clone, Debug)]
pub struct ArtistDetail {
    pub id: Option<String>,
    pub name: String,
    pub songs: Vec<Song>,
    pub albums: Vec<SearchAlbum>,
}

#[derive(Clone, Debug)]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub year: String,
    pub songs: Vec<Song>,
}

#[derive(Clone, Debug)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub song_count: u32,
    pub songs: Vec<Song>,
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    /// Discover page with a handful of popular songs
    Featured {
        songs: Vec<Song>,
        selected_index: usize,
    },
    SearchResults {
        results: SearchResults,
        tab: SearchTab,
        song_index: usize,
        artist_index: usize,
        album_index: usize,
        playlist_index: usize,
    },
    ArtistDetail {
        detail: ArtistDetail,
        section: ArtistDetailSection,
        song_index: usize,
        album_index: usize,
    },
    AlbumDetail {
        detail: AlbumDetail,
        selected_index: usize,
    },
    PlaylistDetail {
        detail: PlaylistDetail,
        selected_index: usize,
    },
    /// Queue view; the songs themselves live in the player state
    Queue {
        selected_index: usize,
    },
    NowPlaying,
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}

#[cfg(test)]
pub(crate) fn test_song(id: &str, artists: &str) -> Song {
    Song {
        id: id.to_string(),
        name: format!("Song {}", id),
        artists: artists.to_string(),
        duration_secs: 200,
        image_url: String::new(),
        stream_url: format!("https://cdn.example/{}.mp4", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_names_are_split_and_trimmed() {
        let song = test_song("1", "Arijit Singh,  Shreya Ghoshal, ");
        let names: Vec<&str> = song.artist_names().collect();
        assert_eq!(names, vec!["Arijit Singh", "Shreya Ghoshal"]);
    }

    #[test]
    fn artists_from_songs_are_distinct_and_keep_ids() {
        let songs = vec![
            test_song("1", "A, B"),
            test_song("2", "B"),
            test_song("3", "C, A"),
        ];
        let ids = vec![("B".to_string(), Some("b-id".to_string()))];
        let artists = SearchResults::artists_from_songs(&songs, &ids);

        let names: Vec<&str> = artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(artists[1].id.as_deref(), Some("b-id"));
        assert_eq!(artists[0].id, None);
    }

    #[test]
    fn best_match_prefers_exact_artist() {
        let mut results = SearchResults {
            songs: vec![test_song("1", "Coldplay")],
            artists: vec![SearchArtist { id: None, name: "Coldplay".to_string() }],
            ..Default::default()
        };
        results.determine_best_match("coldplay");
        assert_eq!(results.best_match, SearchTab::Artists);
    }

    #[test]
    fn best_match_falls_back_to_songs() {
        let mut results = SearchResults {
            songs: vec![test_song("1", "Someone")],
            ..Default::default()
        };
        results.determine_best_match("zzz");
        assert_eq!(results.best_match, SearchTab::Songs);
    }
}
