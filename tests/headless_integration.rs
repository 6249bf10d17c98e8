use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use exam_timer::{
    app::{App, Intent, Notice},
    clock::ManualClock,
    config::Config,
    fullscreen::HeadlessFullScreen,
    runtime::{AppEvent, FixedTicker, Runner, TestEventSource},
    timer::TimerPhase,
    util::{format_clock, format_time},
};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

fn app_with(ticker: FixedTicker, clock: ManualClock, tx: Sender<AppEvent>) -> App {
    App::new(
        Config::default(),
        Box::new(clock),
        Box::new(ticker),
        Box::new(HeadlessFullScreen::new()),
        tx,
    )
}

fn press(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn screen_text(app: &App) -> String {
    let area = Rect::new(0, 0, 100, 30);
    let mut buffer = Buffer::empty(area);
    app.render(area, &mut buffer);
    buffer
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect::<String>()
}

/// Feeds `n` ticks from the live tick source, advancing the clock with them
fn advance(app: &mut App, clock: &ManualClock, n: u64) {
    for _ in 0..n {
        let id = app.active_tick().expect("countdown should be running");
        clock.advance(chrono::Duration::seconds(1));
        app.handle_event(AppEvent::Tick(id));
    }
}

#[test]
fn b2_first_reading_runs_to_completion() {
    let (tx, _rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
    // hand-fed ticks only
    let mut app = app_with(FixedTicker::new(Duration::from_secs(3600)), clock.clone(), tx);

    app.dispatch(Intent::SelectExam("B2 First Certificate".into()));
    app.dispatch(Intent::SelectPaper("Reading & Use of English".into()));
    assert_eq!(app.timer.time_remaining(), 4500);

    app.dispatch(Intent::StartOrPause);
    let finish = app.timer.state().finish_time().unwrap();
    assert_eq!(format_clock(&finish), "10:15");

    advance(&mut app, &clock, 1800);
    assert_eq!(app.timer.time_remaining(), 2700);
    assert_eq!(format_time(app.timer.time_remaining()), "00:45:00");
    assert!(screen_text(&app).contains("00:45:00"));

    advance(&mut app, &clock, 2699);
    assert_eq!(app.timer.time_remaining(), 1);
    assert!(screen_text(&app).contains("00:00:01"));
    assert!(app.notice.is_none());

    advance(&mut app, &clock, 1);
    assert_eq!(app.timer.time_remaining(), 0);
    assert!(!app.timer.is_running());
    assert_eq!(app.timer.phase(), TimerPhase::Expired);
    assert_eq!(app.notice, Some(Notice::TimesUp));
    assert_eq!(app.completed_runs(), 1);
    assert!(app.active_tick().is_none());
    assert!(screen_text(&app).contains("Time's up!"));

    // the scheduled deadline never moved
    assert_eq!(app.timer.state().finish_time(), Some(finish));
}

#[test]
fn pause_holds_time_while_clock_moves() {
    let (tx, _rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap());
    let mut app = app_with(FixedTicker::new(Duration::from_secs(3600)), clock.clone(), tx);

    app.dispatch(Intent::SelectExam("C1 Advanced".into()));
    app.dispatch(Intent::SelectPaper("Writing".into()));
    app.dispatch(Intent::StartOrPause);
    advance(&mut app, &clock, 60);
    let finish = app.timer.state().finish_time();

    app.dispatch(Intent::StartOrPause);
    assert_eq!(app.timer.phase(), TimerPhase::Paused);
    clock.advance(chrono::Duration::minutes(20));
    assert_eq!(app.timer.time_remaining(), 89 * 60);

    app.dispatch(Intent::StartOrPause);
    assert_eq!(app.timer.state().finish_time(), finish);
    assert_eq!(
        app.timer.state().start_time().map(|t| format_clock(&t)),
        Some("13:30".to_string())
    );
}

#[test]
fn runner_drives_live_ticks_and_keys() {
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
    let mut app = app_with(FixedTicker::new(Duration::from_millis(5)), clock, tx.clone());
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));

    app.dispatch(Intent::SelectExam("A1 Starters".into()));
    app.dispatch(Intent::SelectPaper("Reading & Writing".into()));
    tx.send(press(KeyCode::Char(' '))).unwrap();

    for _ in 0..1000u32 {
        app.handle_event(runner.step());
        if app.timer.time_remaining() <= 1200 - 3 {
            break;
        }
    }
    assert!(app.timer.time_remaining() <= 1197);
    assert!(app.timer.is_running());

    // pause: whatever is still queued is dropped as stale
    tx.send(press(KeyCode::Char(' '))).unwrap();
    while app.timer.is_running() {
        app.handle_event(runner.step());
    }
    let paused_at = app.timer.time_remaining();
    for _ in 0..10 {
        app.handle_event(runner.step());
    }
    assert_eq!(app.timer.time_remaining(), paused_at);
    assert!(app.active_tick().is_none());

    tx.send(press(KeyCode::Char('q'))).unwrap();
    for _ in 0..10 {
        app.handle_event(runner.step());
        if app.should_quit {
            break;
        }
    }
    assert!(app.should_quit);
}

#[test]
fn keyboard_flow_through_pickers_and_full_screen() {
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
    let mut app = app_with(FixedTicker::new(Duration::from_secs(3600)), clock, tx.clone());
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

    let keys = [
        KeyCode::Char('e'),
        KeyCode::End,
        KeyCode::Enter, // C2 Proficiency
        KeyCode::Char('p'),
        KeyCode::Down,
        KeyCode::Enter, // Writing
        KeyCode::Char('f'),
    ];
    for key in keys {
        tx.send(press(key)).unwrap();
    }
    // keys, then the full-screen notification
    for _ in 0..keys.len() + 1 {
        app.handle_event(runner.step());
    }

    assert_eq!(app.selected_exam().map(|e| e.name), Some("C2 Proficiency"));
    assert_eq!(app.timer.selected_paper().map(|p| p.name), Some("Writing"));
    assert!(app.is_full_screen);
    let text = screen_text(&app);
    assert!(text.contains("C2 Proficiency"));
    assert!(text.contains("START Time: —"));

    tx.send(press(KeyCode::Esc)).unwrap();
    app.handle_event(runner.step());
    app.handle_event(runner.step());
    assert!(!app.is_full_screen);
}

#[test]
fn listening_paper_ignores_timer_keys() {
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
    let mut app = app_with(FixedTicker::new(Duration::from_millis(1)), clock, tx.clone());
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

    app.dispatch(Intent::SelectExam("B2 First Certificate".into()));
    app.dispatch(Intent::SelectPaper("Listening".into()));
    tx.send(press(KeyCode::Char(' '))).unwrap();
    tx.send(press(KeyCode::Char('r'))).unwrap();
    for _ in 0..5 {
        app.handle_event(runner.step());
    }

    assert!(!app.timer.is_running());
    assert!(app.active_tick().is_none());
    assert_eq!(app.timer.time_remaining(), 40 * 60);
    assert!(screen_text(&app).contains("Listening Test"));
}

#[test]
fn unknown_exam_shows_empty_selection() {
    let (tx, _rx) = mpsc::channel();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
    let mut app = app_with(FixedTicker::every_second(), clock, tx);

    app.dispatch(Intent::SelectExam("A2 Key".into()));
    app.dispatch(Intent::SelectExam("\u{0}not an exam".into()));
    assert!(app.selected_exam().is_none());

    app.handle_event(AppEvent::FullScreenChanged(true));
    assert!(screen_text(&app).contains("No Exam Selected"));
}
