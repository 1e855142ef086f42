//! Layout rendering (top bar, sidebar, main area structure)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, PlaybackInfo, UiState};
use super::utils::{render_scrollable_list, row_style, section_block, truncate_string};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, volume: u8) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),        // Search input
            Constraint::Length(14),    // Volume
        ])
        .split(area);

    let focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to search songs, artists, albums..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(section_block(" Search ", focused));
    frame.render_widget(search, chunks[0]);

    let volume = Paragraph::new(format!("🔊 {}%", volume))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Volume ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(volume, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, playback: &PlaybackInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ui_state.library_items.len() as u16 + 2),
            Constraint::Min(0), // Up next
        ])
        .split(area);

    let focused = ui_state.active_section == ActiveSection::Library;
    let library_items: Vec<ListItem> = ui_state
        .library_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            ListItem::new(item.name.clone())
                .style(row_style(i == ui_state.library_selected, focused, false))
        })
        .collect();
    render_scrollable_list(
        frame,
        chunks[0],
        library_items,
        ui_state.library_selected,
        section_block(" Library ", focused),
    );

    let width = chunks[1].width.saturating_sub(4) as usize;
    let upcoming = playback.up_next();
    let items: Vec<ListItem> = if upcoming.is_empty() {
        vec![ListItem::new("Queue is empty").style(Style::default().fg(Color::DarkGray))]
    } else {
        upcoming
            .iter()
            .map(|song| {
                ListItem::new(truncate_string(&song.name, width))
                    .style(Style::default().fg(Color::White))
            })
            .collect()
    };

    let up_next = ratatui::widgets::List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Up next ({}) ", upcoming.len()))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(up_next, chunks[1]);
}
