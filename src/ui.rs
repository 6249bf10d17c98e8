pub mod exam_info;
pub mod screen;
pub mod timer_display;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus, Notice, Picker};
use crate::ui::screen::current_screen;

pub(crate) const HORIZONTAL_MARGIN: u16 = 2;
pub(crate) const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        current_screen(self).render(self, area, buf);

        match &self.focus {
            Focus::ExamPicker(picker) => render_picker(" Exam ", picker, area, buf),
            Focus::PaperPicker(picker) => render_picker(" Paper ", picker, area, buf),
            Focus::Controls => {}
        }

        if let Some(notice) = &self.notice {
            render_notice(notice, area, buf);
        }
    }
}

fn render_picker(title: &'static str, picker: &Picker, area: Rect, buf: &mut Buffer) {
    let width = picker
        .options
        .iter()
        .map(|o| o.width() as u16)
        .max()
        .unwrap_or(0)
        + 6;
    let height = picker.options.len() as u16 + 2;
    let popup = centered_rect(width, height, area);
    Clear.render(popup, buf);

    let items: Vec<ListItem> = picker.options.iter().map(|o| ListItem::new(*o)).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(picker.cursor));
    StatefulWidget::render(list, popup, buf, &mut state);
}

fn render_notice(notice: &Notice, area: Rect, buf: &mut Buffer) {
    let color = if notice.is_times_up() {
        Color::Red
    } else {
        Color::Yellow
    };
    let text = notice.message().to_string();
    let width = (text.width() as u16 + 6).clamp(24, area.width.max(24));
    let popup = centered_rect(width, 5, area);
    Clear.render(popup, buf);

    Paragraph::new(vec![
        Line::from(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press any key",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(color)),
    )
    .render(popup, buf);
}

/// `width` x `height` rect centred in `area`, clipped to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
