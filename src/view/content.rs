//! Main content area rendering (discover, search results, detail views, queue)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, ListItem, Paragraph},
    Frame,
};

use crate::model::{
    ActiveSection, AlbumDetail, ArtistDetail, ArtistDetailSection, ContentState, ContentView,
    PlaybackInfo, PlaylistDetail, SearchAlbum, SearchArtist, SearchPlaylist, SearchResults,
    SearchTab, Song, UiState,
};
use super::utils::{
    calculate_num_width, format_duration, render_scrollable_list, row_style, section_block,
    song_column_widths, truncate_string,
};

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackInfo,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let playing_id = playback.current_song.as_ref().map(|s| s.id.as_str());

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(section_block(" Content ", is_focused));
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new("Type in search and press Enter to find music\n\nUse Tab to navigate between sections\nUse ↑/↓ to select items\nPress Enter to open\nPress H for help")
                .style(Style::default().fg(Color::DarkGray))
                .block(section_block(" Content ", is_focused));
            frame.render_widget(content, area);
        }
        ContentView::Featured { songs, selected_index } => {
            render_song_list(frame, area, " Discover ", songs, *selected_index, is_focused, playing_id);
        }
        ContentView::SearchResults {
            results,
            tab,
            song_index,
            artist_index,
            album_index,
            playlist_index,
        } => {
            let selected = match tab {
                SearchTab::Songs => *song_index,
                SearchTab::Artists => *artist_index,
                SearchTab::Albums => *album_index,
                SearchTab::Playlists => *playlist_index,
            };
            render_search_results(frame, area, results, *tab, selected, is_focused, playing_id);
        }
        ContentView::ArtistDetail { detail, section, song_index, album_index } => {
            render_artist_detail(
                frame,
                area,
                detail,
                *section,
                (*song_index, *album_index),
                is_focused,
                playing_id,
            );
        }
        ContentView::AlbumDetail { detail, selected_index } => {
            render_album_detail(frame, area, detail, *selected_index, is_focused, playing_id);
        }
        ContentView::PlaylistDetail { detail, selected_index } => {
            render_playlist_detail(frame, area, detail, *selected_index, is_focused, playing_id);
        }
        ContentView::Queue { selected_index } => {
            render_queue(frame, area, playback, *selected_index, is_focused);
        }
        ContentView::NowPlaying => {
            render_now_playing(frame, area, playback, is_focused);
        }
    }
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    results: &SearchResults,
    tab: SearchTab,
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category tabs
            Constraint::Min(0),    // Results list
        ])
        .split(area);

    let tabs = [
        (SearchTab::Songs, format!(" Songs ({}) ", results.songs.len())),
        (SearchTab::Artists, format!(" Artists ({}) ", results.artists.len())),
        (SearchTab::Albums, format!(" Albums ({}) ", results.albums.len())),
        (SearchTab::Playlists, format!(" Playlists ({}) ", results.playlists.len())),
    ];

    let tabs_content: Vec<Span> = tabs
        .into_iter()
        .flat_map(|(tab_kind, title)| {
            let style = if tab_kind == tab {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if tab_kind == results.best_match {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![Span::styled(title, style), Span::raw("  ")]
        })
        .collect();

    let tabs_widget = Paragraph::new(Line::from(tabs_content))
        .block(section_block(" Results (←/→ to switch) ", is_focused));
    frame.render_widget(tabs_widget, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let (items, empty_msg) = match tab {
        SearchTab::Songs => (
            song_items(&results.songs, selected, is_focused, playing_id, content_width),
            "No songs found",
        ),
        SearchTab::Artists => (
            artist_items(&results.artists, selected, is_focused, content_width),
            "No artists found",
        ),
        SearchTab::Albums => (
            album_items(&results.albums, selected, is_focused, content_width),
            "No albums found",
        ),
        SearchTab::Playlists => (
            playlist_items(&results.playlists, selected, is_focused, content_width),
            "No playlists found",
        ),
    };

    // Only the header row means nothing was found
    if items.len() <= 1 {
        let empty = Paragraph::new(format!("  {}", empty_msg))
            .style(Style::default().fg(Color::DarkGray))
            .block(section_block("", is_focused));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    render_scrollable_list(frame, chunks[1], items, selected + 1, section_block("", is_focused));
}

/// Header row plus one row per song; the playing song gets a ▶ marker
fn song_items(
    songs: &[Song],
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let (num_width, title_width, artist_width, _) = song_column_widths(content_width, songs.len());

    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {}",
        "#", "Title", "Artist", "Time",
    ))
    .style(header_style())];

    items.extend(songs.iter().enumerate().map(|(i, song)| {
        let is_playing = playing_id == Some(song.id.as_str());
        let marker = if is_playing { "▶" } else { " " };
        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {:>6}",
            marker,
            i + 1,
            truncate_string(&song.name, title_width),
            truncate_string(&song.artists, artist_width),
            format_duration(song.duration_ms()),
        ))
        .style(row_style(i == selected, is_focused, is_playing))
    }));
    items
}

fn artist_items(
    artists: &[SearchArtist],
    selected: usize,
    is_focused: bool,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(artists.len());
    let name_width = content_width.saturating_sub(1 + num_width + 3);

    let mut items = vec![ListItem::new(format!(" {:<num_width$}   {}", "#", "Artist")).style(header_style())];
    items.extend(artists.iter().enumerate().map(|(i, artist)| {
        ListItem::new(format!(
            " {:<num_width$}   {}",
            i + 1,
            truncate_string(&artist.name, name_width)
        ))
        .style(row_style(i == selected, is_focused, false))
    }));
    items
}

fn album_items(
    albums: &[SearchAlbum],
    selected: usize,
    is_focused: bool,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_w = calculate_num_width(albums.len());
    let year_w = 4;
    let remaining = content_width.saturating_sub(1 + num_w + 3 + 3 + 3 + year_w);
    let album_w = (remaining * 50) / 100;
    let artist_w = remaining.saturating_sub(album_w);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<album_w$}   {:<artist_w$}   {:>year_w$}",
        "#", "Album", "Artist", "Year",
    ))
    .style(header_style())];

    items.extend(albums.iter().enumerate().map(|(i, album)| {
        ListItem::new(format!(
            " {:<num_w$}   {}   {}   {:>year_w$}",
            i + 1,
            truncate_string(&album.name, album_w),
            truncate_string(&album.artist, artist_w),
            album.year,
        ))
        .style(row_style(i == selected, is_focused, false))
    }));
    items
}

fn playlist_items(
    playlists: &[SearchPlaylist],
    selected: usize,
    is_focused: bool,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_w = calculate_num_width(playlists.len());
    let songs_w = 6;
    let name_w = content_width.saturating_sub(1 + num_w + 3 + 3 + songs_w);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<name_w$}   {:>songs_w$}",
        "#", "Playlist", "Songs",
    ))
    .style(header_style())];

    items.extend(playlists.iter().enumerate().map(|(i, playlist)| {
        ListItem::new(format!(
            " {:<num_w$}   {}   {:>songs_w$}",
            i + 1,
            truncate_string(&playlist.name, name_w),
            playlist.song_count,
        ))
        .style(row_style(i == selected, is_focused, false))
    }));
    items
}

fn render_song_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    songs: &[Song],
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    if songs.is_empty() {
        let empty = Paragraph::new("  Nothing here yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(section_block(title, is_focused));
        frame.render_widget(empty, area);
        return;
    }
    let content_width = area.width.saturating_sub(4) as usize;
    let items = song_items(songs, selected, is_focused, playing_id, content_width);
    render_scrollable_list(frame, area, items, selected + 1, section_block(title, is_focused));
}

/// Header paragraph above a song list
fn render_detail(
    frame: &mut Frame,
    area: Rect,
    header_text: String,
    songs: &[Song],
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Songs
        ])
        .split(area);

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(section_block("", is_focused));
    frame.render_widget(header, chunks[0]);

    render_song_list(frame, chunks[1], " Songs ", songs, selected, is_focused, playing_id);
}

fn render_album_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &AlbumDetail,
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let header_text = format!(
        "💿 {} by {} ({})\n{} songs | Enter: Play from selected | Backspace: Go back",
        detail.name,
        detail.artist,
        detail.year,
        detail.songs.len()
    );
    render_detail(frame, area, header_text, &detail.songs, selected, is_focused, playing_id);
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &PlaylistDetail,
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let header_text = format!(
        "📻 {}\n{} of {} songs playable | Enter: Play from selected | Backspace: Go back",
        detail.name,
        detail.songs.len(),
        detail.song_count
    );
    render_detail(frame, area, header_text, &detail.songs, selected, is_focused, playing_id);
}

fn render_artist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &ArtistDetail,
    section: ArtistDetailSection,
    (song_index, album_index): (usize, usize),
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Songs + albums
        ])
        .split(area);

    let header = Paragraph::new(format!(
        "🎤 {} | A: Play all | S: Shuffle | ←/→: Switch section",
        detail.name
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(section_block("", is_focused));
    frame.render_widget(header, chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let songs_focused = is_focused && section == ArtistDetailSection::Songs;
    let title = format!(" Songs ({}) ", detail.songs.len());
    render_song_list(
        frame,
        content_chunks[0],
        &title,
        &detail.songs,
        song_index,
        songs_focused,
        playing_id,
    );

    let albums_focused = is_focused && section == ArtistDetailSection::Albums;
    let width = content_chunks[1].width.saturating_sub(4) as usize;
    let album_rows: Vec<ListItem> = detail
        .albums
        .iter()
        .enumerate()
        .map(|(i, album)| {
            let label = if album.year.is_empty() {
                album.name.clone()
            } else {
                format!("{} ({})", album.name, album.year)
            };
            ListItem::new(truncate_string(&label, width))
                .style(row_style(i == album_index, albums_focused, false))
        })
        .collect();

    render_scrollable_list(
        frame,
        content_chunks[1],
        album_rows,
        album_index,
        section_block(" Albums ", albums_focused),
    );
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackInfo,
    selected: usize,
    is_focused: bool,
) {
    let title = format!(" Queue ({}) | Enter: Play | D: Remove | C: Clear ", playback.queue.len());
    if playback.queue.is_empty() {
        let empty = Paragraph::new("  Queue is empty. Press K on a song to add it.")
            .style(Style::default().fg(Color::DarkGray))
            .block(section_block(&title, is_focused));
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let (num_width, title_width, artist_width, _) =
        song_column_widths(content_width, playback.queue.len());

    let items: Vec<ListItem> = playback
        .queue
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let is_current = playback.current_index == Some(i);
            let marker = match (is_current, playback.is_playing) {
                (true, true) => "▶",
                (true, false) => "⏸",
                _ => " ",
            };
            ListItem::new(format!(
                "{}{:<num_width$}   {}   {}   {:>6}",
                marker,
                i + 1,
                truncate_string(&song.name, title_width),
                truncate_string(&song.artists, artist_width),
                format_duration(song.duration_ms()),
            ))
            .style(row_style(i == selected, is_focused, is_current))
        })
        .collect();

    render_scrollable_list(frame, area, items, selected, section_block(&title, is_focused));
}

fn render_now_playing(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, is_focused: bool) {
    let block = section_block(" Now Playing ", is_focused);
    let Some(song) = &playback.current_song else {
        let empty = Paragraph::new("  Nothing is playing")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Song info
            Constraint::Length(1), // Progress
            Constraint::Min(0),
        ])
        .split(inner);

    let state = if playback.is_buffering {
        "Buffering"
    } else if playback.is_playing {
        "Playing"
    } else {
        "Paused"
    };
    let position = match playback.current_index {
        Some(index) => format!("{} of {}", index + 1, playback.queue.len()),
        None => "-".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(song.name.clone(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(song.artists.clone(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{}  ", state), Style::default().fg(Color::Yellow)),
            Span::styled(format!("Queue {}  ", position), Style::default().fg(Color::DarkGray)),
            Span::styled("←/→ seek", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio)
        .label(format!(
            "{} / {}",
            format_duration(playback.position_ms),
            format_duration(playback.duration_ms)
        ));
    frame.render_widget(gauge, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_song;

    #[test]
    fn song_rows_start_with_a_header() {
        let songs = vec![test_song("a", "X"), test_song("b", "Y")];
        let items = song_items(&songs, 0, true, Some("b"), 60);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn empty_tabs_only_carry_a_header() {
        assert_eq!(artist_items(&[], 0, false, 40).len(), 1);
        assert_eq!(playlist_items(&[], 0, false, 40).len(), 1);
    }
}
