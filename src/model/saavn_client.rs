//! Catalog API client with all catalog methods

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::AppConfig;
use crate::{log_api_request, log_api_result};

use super::api::{
    ApiAlbum, ApiArtistDetail, ApiPlaylist, ApiResponse, ApiSong, ResultPage, into_songs,
};
use super::content::{
    AlbumDetail, ArtistDetail, PlaylistDetail, SearchAlbum, SearchPlaylist, SearchResults, Song,
};

const FEATURED_QUERY: &str = "popular";
const USER_AGENT: &str = concat!("saavn-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog reported failure for {0}")]
    Unsuccessful(String),

    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),

    #[error("unexpected {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a `{ success, data }` envelope
pub fn decode_envelope<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, CatalogError> {
    let response: ApiResponse<T> =
        serde_json::from_slice(body).map_err(|source| CatalogError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })?;

    match response {
        ApiResponse { success: true, data: Some(data) } => Ok(data),
        _ => Err(CatalogError::Unsuccessful(endpoint.to_string())),
    }
}

/// Songs whose primary artists match `name`, loosely in either direction
pub fn filter_by_artist(songs: Vec<Song>, name: &str) -> Vec<Song> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }
    songs
        .into_iter()
        .filter(|song| {
            song.artist_names().any(|artist| {
                let artist = artist.to_lowercase();
                artist.contains(&wanted) || wanted.contains(&artist)
            })
        })
        .collect()
}

fn normalize_base_url(base: &str) -> Result<Url, CatalogError> {
    let trimmed = base.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", base, e)))
}

/// Catalog client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct SaavnClient {
    http: reqwest::Client,
    /// Audio downloads: no total deadline, only connect and idle-read limits
    stream_http: reqwest::Client,
    base_url: Url,
    quality: String,
    search_limit: u32,
    artist_search_limit: u32,
    featured_count: usize,
}

impl SaavnClient {
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        // A whole song can take minutes on a slow link, so only a stall fails it
        let stream_http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            stream_http,
            base_url: normalize_base_url(&config.api_base_url)?,
            quality: config.stream_quality.clone(),
            search_limit: config.search_limit,
            artist_search_limit: config.artist_search_limit,
            featured_count: config.featured_count,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", path, e)))?;

        let body = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        decode_envelope(path, &body)
    }

    async fn search_songs_raw(&self, query: &str, limit: u32) -> Result<Vec<ApiSong>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        log_api_request!("search_songs", query, limit);
        let result = self
            .get::<ResultPage<ApiSong>>(
                "search/songs",
                &[("query", query.to_string()), ("limit", limit.to_string())],
            )
            .await;
        log_api_result!("search_songs", result);
        Ok(result?.results)
    }

    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>, CatalogError> {
        let songs = self.search_songs_raw(query, self.search_limit).await?;
        Ok(into_songs(songs, &self.quality))
    }

    pub async fn search_albums(&self, query: &str) -> Result<Vec<SearchAlbum>, CatalogError> {
        log_api_request!("search_albums", query);
        let result = self
            .get::<ResultPage<ApiAlbum>>("search/albums", &[("query", query.to_string())])
            .await;
        log_api_result!("search_albums", result);
        Ok(result?.results.iter().map(ApiAlbum::to_search_album).collect())
    }

    pub async fn search_playlists(&self, query: &str) -> Result<Vec<SearchPlaylist>, CatalogError> {
        log_api_request!("search_playlists", query);
        let result = self
            .get::<ResultPage<ApiPlaylist>>("search/playlists", &[("query", query.to_string())])
            .await;
        log_api_result!("search_playlists", result);
        Ok(result?.results.iter().map(ApiPlaylist::to_search_playlist).collect())
    }

    /// Songs, albums and playlists in parallel. Artists are derived from the song results.
    pub async fn search(&self, query: &str) -> Result<SearchResults, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        let (song_result, album_result, playlist_result) = futures::join!(
            self.search_songs_raw(query, self.search_limit),
            self.search_albums(query),
            self.search_playlists(query)
        );

        let raw_songs = song_result?;
        let artist_ids: Vec<(String, Option<String>)> =
            raw_songs.iter().flat_map(ApiSong::artist_ids).collect();
        let songs = into_songs(raw_songs, &self.quality);

        let mut results = SearchResults {
            artists: SearchResults::artists_from_songs(&songs, &artist_ids),
            songs,
            albums: album_result.unwrap_or_default(),
            playlists: playlist_result.unwrap_or_default(),
            ..Default::default()
        };
        results.determine_best_match(query);

        tracing::debug!(
            query,
            songs = results.songs.len(),
            artists = results.artists.len(),
            albums = results.albums.len(),
            playlists = results.playlists.len(),
            best_match = ?results.best_match,
            "Search complete"
        );
        Ok(results)
    }

    /// A shuffled handful of popular songs for the discover page
    pub async fn featured_songs(&self) -> Result<Vec<Song>, CatalogError> {
        let mut songs = self.search_songs(FEATURED_QUERY).await?;
        songs.shuffle(&mut rand::rng());
        songs.truncate(self.featured_count);
        Ok(songs)
    }

    pub async fn songs_by_artist_name(&self, name: &str) -> Result<Vec<Song>, CatalogError> {
        let songs = self.search_songs_raw(name, self.artist_search_limit).await?;
        Ok(filter_by_artist(into_songs(songs, &self.quality), name))
    }

    /// Look a song up by id, trying the query form before the path form
    pub async fn get_song(&self, song_id: &str) -> Result<Option<Song>, CatalogError> {
        log_api_request!("get_song", song_id);
        let by_query = self
            .get::<Vec<ApiSong>>("songs", &[("id", song_id.to_string())])
            .await;
        log_api_result!("get_song", by_query);

        let songs = match by_query {
            Ok(songs) if !songs.is_empty() => songs,
            _ => {
                let path = format!("songs/{}", song_id);
                let by_path = self.get::<Vec<ApiSong>>(&path, &[]).await;
                log_api_result!("get_song_by_path", by_path);
                by_path?
            }
        };

        Ok(into_songs(songs, &self.quality).into_iter().next())
    }

    pub async fn get_album(&self, album_id: &str) -> Result<AlbumDetail, CatalogError> {
        log_api_request!("get_album", album_id);
        let result = self
            .get::<ApiAlbum>("albums", &[("id", album_id.to_string())])
            .await;
        log_api_result!("get_album", result);
        Ok(result?.into_detail(&self.quality))
    }

    pub async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistDetail, CatalogError> {
        log_api_request!("get_playlist", playlist_id);
        let result = self
            .get::<ApiPlaylist>("playlists", &[("id", playlist_id.to_string())])
            .await;
        log_api_result!("get_playlist", result);
        Ok(result?.into_detail(&self.quality))
    }

    /// Artist details, songs and albums fetched concurrently
    pub async fn get_artist(&self, artist_id: &str) -> Result<ArtistDetail, CatalogError> {
        log_api_request!("get_artist", artist_id);
        let songs_path = format!("artists/{}/songs", artist_id);
        let albums_path = format!("artists/{}/albums", artist_id);
        let detail_query = [("id", artist_id.to_string())];

        let (detail_result, songs_result, albums_result) = futures::join!(
            self.get::<ApiArtistDetail>("artists", &detail_query),
            self.get::<ResultPage<ApiSong>>(&songs_path, &[]),
            self.get::<ResultPage<ApiAlbum>>(&albums_path, &[])
        );
        log_api_result!("get_artist", detail_result);

        let detail = detail_result?;
        let songs = match songs_result {
            Ok(page) => into_songs(page.results, &self.quality),
            Err(e) => {
                tracing::warn!(artist_id, error = %e, "Artist songs unavailable");
                Vec::new()
            }
        };
        let albums = match albums_result {
            Ok(page) => page.results.iter().map(ApiAlbum::to_search_album).collect(),
            Err(e) => {
                tracing::warn!(artist_id, error = %e, "Artist albums unavailable");
                Vec::new()
            }
        };

        Ok(ArtistDetail {
            id: Some(detail.id),
            name: detail.name,
            songs,
            albums,
        })
    }

    /// Artist page assembled from a song search when no artist id is known
    pub async fn artist_by_name(&self, name: &str) -> Result<ArtistDetail, CatalogError> {
        let songs = self.songs_by_artist_name(name).await?;
        Ok(ArtistDetail {
            id: None,
            name: name.trim().to_string(),
            songs,
            albums: Vec::new(),
        })
    }

    /// Download a whole audio stream
    pub async fn fetch_stream(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let url = Url::parse(url).map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", url, e)))?;
        tracing::debug!(url = %url, "Fetching audio stream");
        let bytes = self
            .stream_http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        tracing::debug!(bytes = bytes.len(), "Audio stream downloaded");
        Ok(bytes.to_vec())
    }
}
