use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use chrono::{Local, TimeZone};
use ratatui::buffer::Buffer;

use crate::app::App;
use crate::clock::ManualClock;
use crate::config::Config;
use crate::fullscreen::HeadlessFullScreen;
use crate::runtime::{AppEvent, FixedTicker};

/// App on a manual clock at 09:00 whose tick source never fires on its own
pub fn test_app() -> (App, Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    let app = App::new(
        Config::default(),
        Box::new(clock),
        Box::new(FixedTicker::new(Duration::from_secs(3600))),
        Box::new(HeadlessFullScreen::new()),
        tx,
    );
    (app, rx)
}

/// Buffer contents row by row
pub fn rendered(buffer: &Buffer) -> String {
    let area = buffer.area();
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}
