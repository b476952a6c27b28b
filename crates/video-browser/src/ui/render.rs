use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};
use video_browser_types::VideoFile;

use crate::controller::{EMPTY_LIST_TEXT, Listing};
use crate::media::MediaElement;

use super::app::App;

pub(crate) fn draw<M: MediaElement>(f: &mut ratatui::Frame, app: &mut App<M>) {
    let now = Instant::now();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(4)])
        .split(f.area());

    let refreshing = if app.browser.is_refreshing() { "  (refreshing)" } else { "" };
    let header = Paragraph::new(Line::from(format!(
        "video-browser  →  {}{refreshing}",
        app.browser.server()
    )))
    .block(Block::default().borders(Borders::ALL).title("Server"));
    f.render_widget(header, chunks[0]);

    let mid_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let list_block = Block::default().borders(Borders::ALL).title("Videos");
    app.list_area = list_block.inner(mid_chunks[0]);
    match app.browser.listing() {
        Listing::Entries(files) => {
            let width = app.list_area.width as usize;
            let items: Vec<ListItem> = files
                .iter()
                .map(|file| {
                    let label = entry_label(
                        file,
                        app.browser.previewing() == Some(file),
                        app.browser.playing() == Some(file),
                    );
                    ListItem::new(truncate_label(&label, width.saturating_sub(2)))
                })
                .collect();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                .highlight_symbol("▶ ");
            f.render_stateful_widget(list, mid_chunks[0], &mut app.list_state);
        }
        Listing::Empty => {
            f.render_widget(Paragraph::new(EMPTY_LIST_TEXT).block(list_block), mid_chunks[0]);
        }
        Listing::Error(text) => {
            f.render_widget(
                Paragraph::new(text.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(list_block),
                mid_chunks[0],
            );
        }
        Listing::Loading => {
            f.render_widget(Paragraph::new("Loading video list...").block(list_block), mid_chunks[0]);
        }
    }

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(4), Constraint::Min(0)])
        .split(mid_chunks[1]);

    let preview_block = Block::default().borders(Borders::ALL).title("Preview (muted)");
    let preview_inner = preview_block.inner(side_chunks[0]);
    f.render_widget(preview_block, side_chunks[0]);
    let preview_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(preview_inner);
    f.render_widget(
        Paragraph::new(Line::from(app.browser.preview_title().to_string())),
        preview_rows[0],
    );
    if let Some(ratio) = app.browser.preview_progress(now) {
        let gauge = Gauge::default()
            .ratio(ratio)
            .label(format!("{:.0}%", ratio * 100.0))
            .gauge_style(Style::default().fg(Color::White).bg(Color::Black));
        f.render_widget(gauge, preview_rows[1]);
    }

    let mut main_lines = vec![Line::from(app.browser.main_title().to_string())];
    if let Some(src) = app.browser.main_source() {
        main_lines.push(Line::styled(src.to_string(), Style::default().fg(Color::DarkGray)));
    }
    let main = Paragraph::new(main_lines)
        .block(Block::default().borders(Borders::ALL).title("Main Player"));
    f.render_widget(main, side_chunks[1]);

    let footer_block = Block::default().borders(Borders::ALL).title("Status");
    let footer_inner = footer_block.inner(chunks[2]);
    f.render_widget(footer_block, chunks[2]);
    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(footer_inner);
    f.render_widget(
        Paragraph::new(Line::from(format!("status: {}", app.status))),
        footer_chunks[0],
    );
    f.render_widget(
        Paragraph::new(Line::from(
            "keys: ↑/↓ or mouse hover preview | Enter/click play | Esc leave | r refresh | l logs | q quit",
        ))
        .alignment(Alignment::Left),
        footer_chunks[1],
    );

    if app.logs_open {
        let area = centered_rect(90, 80, f.area());
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Logs (Esc to close, ↑/↓ scroll)");
        let inner = block.inner(area);
        let height = inner.height as usize;
        let total = app.logs.len();
        let end = total.saturating_sub(app.logs_scroll);
        let start = end.saturating_sub(height);
        let mut items = Vec::new();
        for line in app.logs.iter().skip(start).take(end.saturating_sub(start)) {
            items.push(ListItem::new(line.clone()));
        }
        if items.is_empty() {
            items.push(ListItem::new("<no logs>"));
        }
        let list = List::new(items).block(block);
        f.render_widget(list, area);
    }
}

fn entry_label(file: &VideoFile, previewing: bool, playing: bool) -> String {
    let mut label = file.name().to_string();
    if previewing {
        label.push_str("  [preview]");
    }
    if playing {
        label.push_str("  [playing]");
    }
    label
}

fn truncate_label(label: &str, max: usize) -> String {
    let count = label.chars().count();
    if max == 0 || count <= max {
        return label.to_string();
    }
    if max <= 3 {
        return label.chars().take(max).collect();
    }
    let head: String = label.chars().take(max - 3).collect();
    format!("{head}...")
}

fn centered_rect(percent_x: u16, percent_y: u16, r: ratatui::layout::Rect) -> ratatui::layout::Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_label_marks_state() {
        let file = VideoFile::new("clip.mp4");
        assert_eq!(entry_label(&file, false, false), "clip.mp4");
        assert_eq!(entry_label(&file, true, false), "clip.mp4  [preview]");
        assert_eq!(entry_label(&file, false, true), "clip.mp4  [playing]");
    }

    #[test]
    fn truncate_label_is_char_safe() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("vidéo-très-longue.mp4", 8), "vidéo...");
        assert_eq!(truncate_label("abcdef", 2), "ab");
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = ratatui::layout::Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert!(rect.x >= area.x && rect.right() <= area.right());
        assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
        assert_eq!(rect.width, 50);
    }
}
