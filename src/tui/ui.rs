use image::{DynamicImage, imageops::FilterType};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::App;
use super::state::{CoverPanel, FocusArea, StatusKind};

pub fn draw<C>(frame: &mut Frame, app: &mut App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_input(frame, "Artist", &app.artist_input, app.focus == FocusArea::Artist, chunks[0]);
    draw_input(
        frame,
        "Album / Title",
        &app.release_input,
        app.focus == FocusArea::Release,
        chunks[1],
    );
    draw_status(frame, app, chunks[2]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[3]);

    draw_cover(frame, app, body[0]);
    draw_logs(frame, app, body[1]);

    draw_footer(frame, chunks[4]);
}

fn draw_input(frame: &mut Frame, title: &str, value: &str, focused: bool, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let cursor = if focused { "█" } else { "" };
    let paragraph = Paragraph::new(format!("> {value}{cursor}")).block(block);

    frame.render_widget(paragraph, area);
}

fn draw_status<C>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let color = match app.view.status_kind {
        StatusKind::Idle => Color::Gray,
        StatusKind::Busy => Color::Yellow,
        StatusKind::Success => Color::LightGreen,
        StatusKind::Warning => Color::LightYellow,
        StatusKind::Error => Color::LightRed,
    };

    let paragraph = Paragraph::new(app.view.status.clone())
        .style(Style::default().fg(color))
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_cover<C>(frame: &mut Frame, app: &mut App<C>, area: Rect) {
    let title = match &app.view.cover {
        CoverPanel::Found { art, .. } => format!(
            "Cover Art • {} {} • {}",
            art.dimensions_label(),
            art.mime,
            art.source_label()
        ),
        _ => String::from("Cover Art"),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let placeholder = match &app.view.cover {
        CoverPanel::Empty => Some("No search yet"),
        CoverPanel::NotFound => Some("No cover art"),
        CoverPanel::Found { .. } => None,
    };

    if let Some(text) = placeholder {
        let top = inner.height / 2;
        let area = Rect {
            y: inner.y + top,
            height: inner.height - top,
            ..inner
        };
        let paragraph = Paragraph::new(text)
            .style(dim_style())
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(lines) = app.view.preview_lines(inner.width, inner.height) {
        let paragraph = Paragraph::new(lines.to_vec()).alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    }
}

fn draw_logs<C>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let lines: Vec<Line> = app
        .view
        .logs
        .iter()
        .rev()
        .take(100)
        .map(|entry| Line::from(entry.clone()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Activity").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(
        "Tab: switch field • Enter: search • Esc: clear field • Ctrl+S: save cover • Ctrl+C: quit",
    )
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, area);
}

/// Fits `image` into `width` x `height` cells. Each cell draws two stacked
/// pixels with the upper half block, so the pixel grid is `width` x `2 * height`.
pub fn render_preview(image: &DynamicImage, width: u16, height: u16) -> Vec<Line<'static>> {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let box_w = f64::from(width);
    let box_h = f64::from(height) * 2.0;
    let scale = (box_w / f64::from(image.width())).min(box_h / f64::from(image.height()));
    let cols = ((f64::from(image.width()) * scale) as u32).max(1);
    let rows = ((f64::from(image.height()) * scale) as u32).max(1);

    let scaled = image.resize_exact(cols, rows, FilterType::Triangle).to_rgb8();

    (0..rows)
        .step_by(2)
        .map(|y| {
            let spans = (0..cols)
                .map(|x| {
                    let [r, g, b] = scaled.get_pixel(x, y).0;
                    let lower = if y + 1 < rows {
                        let [r, g, b] = scaled.get_pixel(x, y + 1).0;
                        Color::Rgb(r, g, b)
                    } else {
                        Color::Reset
                    };
                    Span::styled("▀", Style::default().fg(Color::Rgb(r, g, b)).bg(lower))
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
