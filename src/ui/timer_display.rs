use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};
use tui_big_text::{BigText, PixelSize};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::timer::TimerPhase;
use crate::util::{describe_remaining, format_time, is_low_time};

/// Cells per glyph for each big-text pixel size
const FULL_GLYPH: (u16, u16) = (8, 8);
const QUADRANT_GLYPH: (u16, u16) = (4, 4);

pub fn render_timer(app: &App, proctor: bool, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" Timer ");
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(paper) = app.timer.selected_paper() else {
        render_centered(
            vec![
                Line::from(Span::styled(
                    format_time(0),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    if proctor || app.timer.selected_exam().is_none() {
                        "Select an exam to begin"
                    } else {
                        "Select a paper to begin"
                    },
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ],
            inner,
            buf,
        );
        return;
    };

    if paper.is_listening {
        render_centered(
            vec![
                Line::from(Span::styled(
                    "🎧 Listening Test",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Timed by the audio recording",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ],
            inner,
            buf,
        );
        return;
    }

    let remaining = app.timer.time_remaining();
    let time = format_time(remaining);
    let phase = app.timer.phase();
    let style = countdown_style(phase, is_low_time(remaining, app.config.low_time_warning_secs));

    let glyph = pick_glyph(&time, inner);
    let big_height = glyph.map(|(_, h)| h).unwrap_or(1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(big_height),
            Constraint::Length(1), // padding
            Constraint::Length(1), // gauge
            Constraint::Length(1), // description
            Constraint::Length(1), // state label
            Constraint::Min(0),
        ])
        .split(inner);

    match glyph {
        Some(size) => {
            let pixel_size = if size == FULL_GLYPH {
                PixelSize::Full
            } else {
                PixelSize::Quadrant
            };
            BigText::builder()
                .pixel_size(pixel_size)
                .style(style)
                .alignment(Alignment::Center)
                .lines(vec![Line::from(time.clone())])
                .build()
                .render(rows[1], buf);
        }
        None => {
            Paragraph::new(Span::styled(time.clone(), style))
                .alignment(Alignment::Center)
                .render(rows[1], buf);
        }
    }

    let gauge_color = if style.fg == Some(Color::Red) {
        Color::Red
    } else {
        Color::Green
    };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(Color::DarkGray))
        .ratio(app.timer.progress())
        .label(time)
        .render(horizontal_pad(rows[3], 2), buf);

    Paragraph::new(describe_remaining(remaining))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .render(rows[4], buf);

    Paragraph::new(Span::styled(
        phase_label(phase),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(rows[5], buf);
}

fn countdown_style(phase: TimerPhase, low_time: bool) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match phase {
        TimerPhase::Expired => bold.fg(Color::Red),
        _ if low_time => bold.fg(Color::Red),
        TimerPhase::Running => bold.fg(Color::White),
        _ => bold.fg(Color::Gray),
    }
}

fn phase_label(phase: TimerPhase) -> &'static str {
    match phase {
        TimerPhase::Idle => "",
        TimerPhase::Ready => "Press space to start",
        TimerPhase::Running => "Running",
        TimerPhase::Paused => "Paused",
        TimerPhase::Expired => "Time's up! Press r to reset",
    }
}

/// Largest big-text glyph size that fits, if any
fn pick_glyph(text: &str, area: Rect) -> Option<(u16, u16)> {
    let chars = text.width() as u16;
    // leave room below for gauge, description and label
    let spare_rows = area.height.saturating_sub(4);
    [FULL_GLYPH, QUADRANT_GLYPH]
        .into_iter()
        .find(|(w, h)| chars * w <= area.width && *h <= spare_rows)
}

fn horizontal_pad(area: Rect, pad: u16) -> Rect {
    if area.width <= pad * 2 {
        return area;
    }
    Rect {
        x: area.x + pad,
        width: area.width - pad * 2,
        ..area
    }
}

fn render_centered(lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let target = Rect {
        y: area.y + top,
        height: height.min(area.height),
        ..area
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(target, buf);
}
