use chrono::{DateTime, Local};

use crate::catalog::{Exam, Paper};

/// Current exam/paper choice. The paper always belongs to the exam.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Selection {
    pub exam: Option<&'static Exam>,
    pub paper: Option<&'static Paper>,
}

impl Selection {
    /// Paper that can be counted down (selected and not a listening paper)
    pub fn timed_paper(&self) -> Option<&'static Paper> {
        self.paper.filter(|p| p.is_timed())
    }
}

/// Wall-clock bounds of one run, fixed on the first start after a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: DateTime<Local>,
    pub finish: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub time_remaining: u64,
    pub is_running: bool,
    pub run: Option<RunWindow>,
}

impl TimerState {
    /// State with no paper selected
    pub fn idle() -> Self {
        Self {
            time_remaining: 0,
            is_running: false,
            run: None,
        }
    }

    /// Fresh, never started countdown for `paper`
    pub fn ready(paper: &Paper) -> Self {
        Self {
            time_remaining: paper.duration_seconds(),
            is_running: false,
            run: None,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.run.map(|r| r.start)
    }

    pub fn finish_time(&self) -> Option<DateTime<Local>> {
        self.run.map(|r| r.finish)
    }

    pub fn has_started(&self) -> bool {
        self.run.is_some()
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}
