use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::util::{format_clock, format_duration};

const NOT_STARTED: &str = "—";

/// Exam information panel. In proctor mode unset times read "—"; in the
/// setup layout they are left blank. Proctor mode needs both an exam and a
/// paper before showing any details.
pub fn render_exam_info(app: &App, proctor: bool, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Exam Information ");

    let selected = match (app.timer.selected_exam(), app.timer.selected_paper()) {
        (Some(exam), paper) if paper.is_some() || !proctor => Some((exam, paper)),
        _ => None,
    };

    let Some((exam, paper)) = selected else {
        let lines = if proctor {
            vec![
                Line::from(Span::styled(
                    "No Exam Selected",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Exit full screen to select an exam",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ]
        } else {
            vec![field("Centre Number", app.config.centre_number.clone())]
        };
        Paragraph::new(lines)
            .alignment(if proctor {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
        return;
    };

    let state = app.timer.state();
    let unset = if proctor { NOT_STARTED } else { "" };
    let clock = |t: Option<chrono::DateTime<chrono::Local>>| {
        t.map(|t| format_clock(&t)).unwrap_or_else(|| unset.to_string())
    };

    let mut lines = vec![
        field("Centre Number", app.config.centre_number.clone()),
        field("Exam", exam.name.to_string()),
        field("Paper", paper.map(|p| p.name).unwrap_or("").to_string()),
        field(
            "Duration",
            paper
                .map(|p| format_duration(p.duration_minutes))
                .unwrap_or_default(),
        ),
    ];

    if paper.map_or(true, |p| p.is_timed()) {
        lines.push(Line::from(""));
        lines.push(field("START Time", clock(state.start_time())));
        lines.push(field("FINISH Time", clock(state.finish_time())));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}
