use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::ui::exam_info::render_exam_info;
use crate::ui::timer_display::render_timer;
use crate::ui::{HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const TITLE: &str = "Cambridge Exam Timer";

/// A UI Screen boundary: lays out one full-area view of the app
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Standard layout: selection controls above the info and timer panels
pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(4), // selection controls
                Constraint::Min(6),    // panels
                Constraint::Length(1), // key help
            ])
            .split(area);

        Paragraph::new(Span::styled(
            TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        selection_controls(app).render(chunks[1], buf);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[2]);
        render_exam_info(app, false, panels[0], buf);
        render_timer(app, false, panels[1], buf);

        help_line(app, false).render(chunks[3], buf);
    }
}

/// Full-screen dual-panel proctoring layout
pub struct ProctorScreen;

impl Screen for ProctorScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[0]);
        render_exam_info(app, true, panels[0], buf);
        render_timer(app, true, panels[1], buf);

        help_line(app, true).render(rows[1], buf);
    }
}

fn selection_controls(app: &App) -> Paragraph<'static> {
    let placeholder = Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC);
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let exam = match app.timer.selected_exam() {
        Some(exam) => Span::raw(exam.name),
        None => Span::styled("Select an exam", placeholder),
    };
    let paper = match (app.timer.selected_exam(), app.timer.selected_paper()) {
        (_, Some(paper)) => Span::raw(paper.name),
        (Some(_), None) => Span::styled("Select a paper", placeholder),
        (None, None) => Span::styled("Select an exam first", placeholder),
    };

    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("[e] ", key_style),
            Span::raw("Exam:  "),
            exam,
        ]),
        Line::from(vec![
            Span::styled("[p] ", key_style),
            Span::raw("Paper: "),
            paper,
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Selection "))
}

fn help_line(app: &App, proctor: bool) -> Paragraph<'static> {
    let mut spans: Vec<Span> = Vec::new();
    let mut push = |key: &'static str, action: &'static str| {
        if !spans.is_empty() {
            spans.push(" : ".into());
        }
        spans.push(key.into());
        spans.push(" ".into());
        spans.push(action.dim());
    };

    if app.timer.is_timed() {
        push("space", if app.timer.is_running() { "pause" } else { "start" });
        push("r", "reset");
    }
    if proctor {
        push("f/esc", "exit full screen");
    } else {
        push("e", "exam");
        if app.timer.selected_exam().is_some() {
            push("p", "paper");
        }
        if app.full_screen_supported() {
            push("f", "full screen");
        }
    }
    push("q", "quit");

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .gray()
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(app: &App) -> Box<dyn Screen> {
    if app.is_full_screen {
        Box::new(ProctorScreen)
    } else {
        Box::new(SetupScreen)
    }
}
