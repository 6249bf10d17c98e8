use std::sync::mpsc::Sender;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, trace, warn};
use strum_macros::EnumIs;

use crate::catalog::{exam_names, Exam};
use crate::clock::Clock;
use crate::config::Config;
use crate::fullscreen::{FullScreen, FullScreenError};
use crate::runtime::{AppEvent, TickHandle, TickId, Ticker};
use crate::timer::{ExamTimer, TickOutcome, TimerPhase};

pub const TIMES_UP: &str = "Time's up!";
pub const FULL_SCREEN_UNSUPPORTED: &str = "Full-screen mode is not supported in this terminal.";
pub const FULL_SCREEN_FAILED: &str = "Failed to toggle full-screen mode. Please try again.";

/// What the proctor asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectExam(String),
    SelectPaper(String),
    StartOrPause,
    Reset,
    ToggleFullScreen,
    ExitFullScreen,
    OpenExamPicker,
    OpenPaperPicker,
    DismissNotice,
    Quit,
}

/// Modal message over the current screen
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum Notice {
    TimesUp,
    Advisory(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::TimesUp => TIMES_UP,
            Notice::Advisory(message) => message,
        }
    }
}

/// Popup list used to pick an exam or a paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picker {
    pub options: Vec<&'static str>,
    pub cursor: usize,
}

impl Picker {
    pub fn new(options: Vec<&'static str>, current: Option<&str>) -> Self {
        let cursor = current
            .and_then(|name| options.iter().position(|o| *o == name))
            .unwrap_or(0);
        Self { options, cursor }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.options.len() {
            self.cursor += 1;
        }
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.options.len().saturating_sub(1);
    }

    pub fn current(&self) -> Option<&'static str> {
        self.options.get(self.cursor).copied()
    }
}

/// Which control owns the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Controls,
    ExamPicker(Picker),
    PaperPicker(Picker),
}

impl Focus {
    pub fn is_picker(&self) -> bool {
        !matches!(self, Focus::Controls)
    }
}

/// Presentation shell: selection/timer controller plus everything the
/// screens need, with the tick source tied to the running state.
pub struct App {
    pub timer: ExamTimer,
    pub config: Config,
    pub focus: Focus,
    pub is_full_screen: bool,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    clock: Box<dyn Clock>,
    ticker: Box<dyn Ticker>,
    full_screen: Box<dyn FullScreen>,
    events: Sender<AppEvent>,
    tick_handle: Option<TickHandle>,
    next_tick_id: TickId,
    completed_runs: u32,
    pending_bell: bool,
}

impl App {
    pub fn new(
        config: Config,
        clock: Box<dyn Clock>,
        ticker: Box<dyn Ticker>,
        mut full_screen: Box<dyn FullScreen>,
        events: Sender<AppEvent>,
    ) -> Self {
        full_screen.subscribe(events.clone());
        Self {
            timer: ExamTimer::new(),
            config,
            focus: Focus::Controls,
            is_full_screen: false,
            notice: None,
            should_quit: false,
            clock,
            ticker,
            full_screen,
            events,
            tick_handle: None,
            next_tick_id: 0,
            completed_runs: 0,
            pending_bell: false,
        }
    }

    pub fn selected_exam(&self) -> Option<&'static Exam> {
        self.timer.selected_exam()
    }

    pub fn full_screen_supported(&self) -> bool {
        self.full_screen.is_supported()
    }

    /// Id of the tick source currently driving the countdown
    pub fn active_tick(&self) -> Option<TickId> {
        self.tick_handle.as_ref().map(|h| h.id())
    }

    /// Runs that counted all the way down to zero
    pub fn completed_runs(&self) -> u32 {
        self.completed_runs
    }

    /// True once after each expiry when the bell is enabled
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.pending_bell)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                if let Some(intent) = self.intent_for_key(key) {
                    self.dispatch(intent);
                }
            }
            AppEvent::Tick(id) => self.on_tick(id),
            AppEvent::FullScreenChanged(active) => {
                if self.is_full_screen != active {
                    info!("full screen {}", if active { "on" } else { "off" });
                }
                self.is_full_screen = active;
                if active {
                    self.focus = Focus::Controls;
                }
            }
            AppEvent::Resize | AppEvent::Redraw => {}
        }
    }

    /// Maps a key press to an intent, honouring focus and open notices
    pub fn intent_for_key(&mut self, key: KeyEvent) -> Option<Intent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Intent::Quit);
        }

        if self.notice.is_some() {
            return Some(Intent::DismissNotice);
        }

        if self.focus.is_picker() {
            let is_exam = matches!(self.focus, Focus::ExamPicker(_));
            return self.picker_key(key, is_exam);
        }

        match key.code {
            KeyCode::Char(' ') if self.timer.is_timed() => Some(Intent::StartOrPause),
            KeyCode::Char('r') | KeyCode::Char('R') if self.timer.is_timed() => {
                Some(Intent::Reset)
            }
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Intent::ToggleFullScreen),
            KeyCode::Esc if self.is_full_screen => Some(Intent::ExitFullScreen),
            KeyCode::Char('e') | KeyCode::Char('E') if !self.is_full_screen => {
                Some(Intent::OpenExamPicker)
            }
            KeyCode::Char('p') | KeyCode::Char('P')
                if !self.is_full_screen && self.timer.selected_exam().is_some() =>
            {
                Some(Intent::OpenPaperPicker)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Intent::Quit),
            _ => None,
        }
    }

    fn picker_key(&mut self, key: KeyEvent, is_exam: bool) -> Option<Intent> {
        let picker = match &mut self.focus {
            Focus::ExamPicker(picker) | Focus::PaperPicker(picker) => picker,
            Focus::Controls => return None,
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => picker.up(),
            KeyCode::Down | KeyCode::Char('j') => picker.down(),
            KeyCode::Home => picker.first(),
            KeyCode::End => picker.last(),
            KeyCode::Enter => {
                let choice = picker.current()?.to_string();
                self.focus = Focus::Controls;
                let current = if is_exam {
                    self.timer.selected_exam().map(|e| e.name)
                } else {
                    self.timer.selected_paper().map(|p| p.name)
                };
                // same choice again leaves the selection and any run alone
                if current == Some(choice.as_str()) {
                    return None;
                }
                return Some(if is_exam {
                    Intent::SelectExam(choice)
                } else {
                    Intent::SelectPaper(choice)
                });
            }
            KeyCode::Esc => self.focus = Focus::Controls,
            _ => {}
        }
        None
    }

    pub fn dispatch(&mut self, intent: Intent) {
        trace!("dispatch {:?}", intent);
        match intent {
            Intent::SelectExam(name) => {
                self.stop_ticking();
                self.timer.select_exam(&name);
            }
            Intent::SelectPaper(name) => {
                self.stop_ticking();
                self.timer.select_paper(&name);
            }
            Intent::StartOrPause => {
                if self.timer.is_running() {
                    self.stop_ticking();
                }
                self.timer.start(self.clock.now());
            }
            Intent::Reset => {
                if self.timer.is_timed() {
                    self.stop_ticking();
                }
                self.timer.reset();
            }
            Intent::ToggleFullScreen => self.toggle_full_screen(),
            Intent::ExitFullScreen => self.exit_full_screen(),
            Intent::OpenExamPicker => {
                let current = self.timer.selected_exam().map(|e| e.name);
                self.focus = Focus::ExamPicker(Picker::new(exam_names(), current));
            }
            Intent::OpenPaperPicker => {
                if let Some(exam) = self.timer.selected_exam() {
                    let current = self.timer.selected_paper().map(|p| p.name);
                    self.focus = Focus::PaperPicker(Picker::new(exam.paper_names(), current));
                }
            }
            Intent::DismissNotice => self.notice = None,
            Intent::Quit => {
                self.shutdown();
                self.should_quit = true;
            }
        }
        self.sync_ticker();
    }

    fn on_tick(&mut self, id: TickId) {
        if self.active_tick() != Some(id) {
            trace!("dropping stale tick from source {}", id);
            return;
        }
        if self.timer.tick() == TickOutcome::Expired {
            self.stop_ticking();
            self.completed_runs += 1;
            self.notice = Some(Notice::TimesUp);
            self.pending_bell = self.config.bell;
            info!("run {} completed", self.completed_runs);
        }
    }

    /// Keeps exactly one tick source alive while the countdown runs
    fn sync_ticker(&mut self) {
        if self.should_quit {
            self.stop_ticking();
            return;
        }
        match (self.timer.phase(), self.tick_handle.is_some()) {
            (TimerPhase::Running, false) => {
                self.next_tick_id += 1;
                self.tick_handle = Some(TickHandle::spawn(
                    self.next_tick_id,
                    self.ticker.interval(),
                    self.events.clone(),
                ));
            }
            (TimerPhase::Running, true) => {}
            (_, true) => self.stop_ticking(),
            (_, false) => {}
        }
    }

    fn stop_ticking(&mut self) {
        if let Some(mut handle) = self.tick_handle.take() {
            handle.cancel();
        }
    }

    fn toggle_full_screen(&mut self) {
        if !self.full_screen.is_supported() {
            self.notice = Some(Notice::Advisory(FULL_SCREEN_UNSUPPORTED.to_string()));
            return;
        }
        if self.is_full_screen {
            self.exit_full_screen();
            return;
        }
        match self.full_screen.enter() {
            Ok(()) => {}
            Err(FullScreenError::TooSmall { width, height }) => {
                warn!("full screen refused at {}x{}", width, height);
                self.notice = Some(Notice::Advisory(format!(
                    "{} The terminal is too small ({}x{}).",
                    FULL_SCREEN_FAILED, width, height
                )));
            }
            Err(e) => {
                warn!("error entering full screen: {}", e);
                self.notice = Some(Notice::Advisory(FULL_SCREEN_FAILED.to_string()));
            }
        }
    }

    fn exit_full_screen(&mut self) {
        if !self.is_full_screen {
            return;
        }
        if let Err(e) = self.full_screen.request_exit() {
            warn!("error exiting full screen: {}", e);
            self.is_full_screen = false;
        }
    }

    /// Cancels the tick source; call before tearing the app down
    pub fn shutdown(&mut self) {
        self.stop_ticking();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
