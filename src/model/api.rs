//! Wire types of the catalog REST API
//!
//! Every endpoint answers `{ "success": bool, "data": T }`. Lists that the
//! catalog omits decode as empty and numeric fields accept both JSON numbers
//! and numeric strings, since the catalog is not consistent about either.

use serde::{Deserialize, Deserializer};

use super::content::{AlbumDetail, PlaylistDetail, SearchAlbum, SearchPlaylist, Song};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
}

/// Paged result list used by search and artist listing endpoints
#[derive(Debug, Deserialize)]
pub struct ResultPage<T> {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub start: Option<u32>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiImage {
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiDownload {
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiArtists {
    #[serde(default)]
    pub primary: Vec<ApiArtist>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSong {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub duration: Option<u32>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub play_count: Option<u64>,
    #[serde(default)]
    pub artists: ApiArtists,
    #[serde(default)]
    pub image: Vec<ApiImage>,
    #[serde(default)]
    pub download_url: Vec<ApiDownload>,
}

impl ApiSong {
    /// Convert to a playable song. Songs without a stream at `quality` are dropped.
    pub fn into_song(self, quality: &str) -> Option<Song> {
        let stream_url = self
            .download_url
            .into_iter()
            .find(|d| d.quality == quality && !d.url.is_empty())?
            .url;

        let artists = self
            .artists
            .primary
            .iter()
            .map(|a| a.name.trim())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Some(Song {
            id: self.id,
            name: self.name,
            artists,
            duration_secs: self.duration.unwrap_or(0),
            image_url: self.image.last().map(|i| i.url.clone()).unwrap_or_default(),
            stream_url,
        })
    }

    /// `(name, id)` pairs of the primary artists
    pub fn artist_ids(&self) -> Vec<(String, Option<String>)> {
        self.artists
            .primary
            .iter()
            .map(|a| (a.name.trim().to_string(), a.id.clone()))
            .collect()
    }
}

/// Convert a batch of catalog songs, keeping catalog order
pub fn into_songs(songs: Vec<ApiSong>, quality: &str) -> Vec<Song> {
    songs.into_iter().filter_map(|s| s.into_song(quality)).collect()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAlbum {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub song_count: Option<u32>,
    #[serde(default)]
    pub image: Vec<ApiImage>,
    pub artists: Option<ApiArtists>,
    /// Present only when the album is fetched by id
    #[serde(default)]
    pub songs: Vec<ApiSong>,
}

impl ApiAlbum {
    fn artist_line(&self) -> String {
        self.artists
            .as_ref()
            .map(|a| {
                a.primary
                    .iter()
                    .map(|artist| artist.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    pub fn to_search_album(&self) -> SearchAlbum {
        SearchAlbum {
            id: self.id.clone(),
            name: self.name.clone(),
            artist: self.artist_line(),
            year: self.year.clone().unwrap_or_default(),
            song_count: self.song_count.unwrap_or(self.songs.len() as u32),
        }
    }

    pub fn into_detail(self, quality: &str) -> AlbumDetail {
        let artist = self.artist_line();
        AlbumDetail {
            id: self.id,
            name: self.name,
            artist,
            year: self.year.unwrap_or_default(),
            songs: into_songs(self.songs, quality),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub song_count: Option<u32>,
    #[serde(default)]
    pub image: Vec<ApiImage>,
    #[serde(default)]
    pub songs: Vec<ApiSong>,
}

impl ApiPlaylist {
    pub fn to_search_playlist(&self) -> SearchPlaylist {
        SearchPlaylist {
            id: self.id.clone(),
            name: self.name.clone(),
            song_count: self.song_count.unwrap_or(self.songs.len() as u32),
        }
    }

    pub fn into_detail(self, quality: &str) -> PlaylistDetail {
        let song_count = self.song_count.unwrap_or(self.songs.len() as u32);
        PlaylistDetail {
            id: self.id,
            name: self.name,
            song_count,
            songs: into_songs(self.songs, quality),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiArtistDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Vec<ApiImage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Float(f64),
    Text(String),
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Float(f)) if f >= 0.0 => Some(f as u64),
        Some(NumberOrString::Float(_)) => None,
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n.to_string()),
        Some(NumberOrString::Float(f)) => Some(f.to_string()),
        Some(NumberOrString::Text(s)) => Some(s),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song_json(id: &str, qualities: &[&str]) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Track {}", id),
            "duration": 215,
            "playCount": "1200",
            "artists": { "primary": [
                { "id": "459320", "name": "Arijit Singh" },
                { "name": " Pritam " }
            ]},
            "image": [
                { "quality": "50x50", "url": "https://img/50.jpg" },
                { "quality": "500x500", "url": "https://img/500.jpg" }
            ],
            "downloadUrl": qualities.iter().map(|q| json!({
                "quality": q,
                "url": format!("https://aac/{}_{}.mp4", id, q)
            })).collect::<Vec<_>>()
        })
    }

    #[test]
    fn song_with_matching_quality_is_converted() {
        let api: ApiSong = serde_json::from_value(song_json("abc", &["96kbps", "160kbps"])).unwrap();
        assert_eq!(api.play_count, Some(1200));

        let song = api.into_song("160kbps").unwrap();
        assert_eq!(song.id, "abc");
        assert_eq!(song.artists, "Arijit Singh, Pritam");
        assert_eq!(song.duration_secs, 215);
        assert_eq!(song.image_url, "https://img/500.jpg");
        assert_eq!(song.stream_url, "https://aac/abc_160kbps.mp4");
    }

    #[test]
    fn song_without_matching_quality_is_dropped() {
        let songs: Vec<ApiSong> = vec![
            serde_json::from_value(song_json("a", &["96kbps"])).unwrap(),
            serde_json::from_value(song_json("b", &["160kbps"])).unwrap(),
        ];
        let kept = into_songs(songs, "160kbps");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn sparse_song_uses_defaults() {
        let api: ApiSong = serde_json::from_value(json!({
            "id": "x",
            "name": "Bare",
            "duration": null,
            "downloadUrl": [{ "quality": "160kbps", "url": "https://aac/x.mp4" }]
        }))
        .unwrap();

        let song = api.into_song("160kbps").unwrap();
        assert_eq!(song.duration_secs, 0);
        assert_eq!(song.image_url, "");
        assert_eq!(song.artists, "");
    }

    #[test]
    fn search_envelope_decodes_with_missing_counters() {
        let body = json!({
            "success": true,
            "data": { "results": [song_json("s1", &["160kbps"])] }
        });
        let response: ApiResponse<ResultPage<ApiSong>> = serde_json::from_value(body).unwrap();
        assert!(response.success);
        let page = response.data.unwrap();
        assert_eq!(page.total, None);
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn album_accepts_numeric_year_and_string_count() {
        let album: ApiAlbum = serde_json::from_value(json!({
            "id": "al1",
            "name": "Aashiqui 2",
            "year": 2013,
            "songCount": "12",
            "image": [],
            "artists": { "primary": [{ "id": "1", "name": "Mithoon" }] }
        }))
        .unwrap();

        let summary = album.to_search_album();
        assert_eq!(summary.year, "2013");
        assert_eq!(summary.song_count, 12);
        assert_eq!(summary.artist, "Mithoon");
    }

    #[test]
    fn playlist_detail_counts_songs_when_count_missing() {
        let playlist: ApiPlaylist = serde_json::from_value(json!({
            "id": "pl",
            "name": "Top 50",
            "songs": [song_json("1", &["160kbps"]), song_json("2", &["12kbps"])]
        }))
        .unwrap();

        let detail = playlist.into_detail("160kbps");
        assert_eq!(detail.song_count, 2);
        assert_eq!(detail.songs.len(), 1);
    }
}
