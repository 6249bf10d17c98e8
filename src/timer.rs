use chrono::{DateTime, Local};
use log::{debug, info, trace};
use strum_macros::{Display, EnumIs};

use crate::catalog::{find_exam_by_name, Exam, Paper};
use crate::session::{RunWindow, Selection, TimerState};
use crate::util::{calculate_finish_time, progress_ratio};

/// Where the countdown currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum TimerPhase {
    /// No paper selected, or nothing left to count
    Idle,
    /// Paper selected, never started
    Ready,
    Running,
    /// Stopped after a start; run window kept
    Paused,
    /// Counted down to zero
    Expired,
}

/// Result of one tick of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed
    Ignored,
    /// One second counted, this much left
    Counted(u64),
    /// The tick that brought the countdown to zero
    Expired,
}

/// Selection and countdown for one proctoring session.
///
/// Every mutation of [`Selection`] and [`TimerState`] goes through here.
#[derive(Debug, Clone, Default)]
pub struct ExamTimer {
    selection: Selection,
    state: TimerState,
}

impl ExamTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn selected_exam(&self) -> Option<&'static Exam> {
        self.selection.exam
    }

    pub fn selected_paper(&self) -> Option<&'static Paper> {
        self.selection.paper
    }

    pub fn time_remaining(&self) -> u64 {
        self.state.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// A non-listening paper is selected
    pub fn is_timed(&self) -> bool {
        self.selection.timed_paper().is_some()
    }

    /// Full length of the selected paper in seconds, 0 without a paper
    pub fn total_seconds(&self) -> u64 {
        self.selection
            .paper
            .map(|p| p.duration_seconds())
            .unwrap_or(0)
    }

    pub fn progress(&self) -> f64 {
        progress_ratio(self.state.time_remaining, self.total_seconds())
    }

    pub fn phase(&self) -> TimerPhase {
        let state = &self.state;
        if self.selection.paper.is_none() {
            return TimerPhase::Idle;
        }
        if state.is_running {
            return TimerPhase::Running;
        }
        match (state.time_remaining, state.has_started()) {
            (0, true) => TimerPhase::Expired,
            (0, false) => TimerPhase::Idle,
            (_, true) => TimerPhase::Paused,
            (_, false) => TimerPhase::Ready,
        }
    }

    /// Changes exam. Always drops the paper and abandons any countdown.
    pub fn select_exam(&mut self, name: &str) {
        self.selection.exam = find_exam_by_name(name);
        self.selection.paper = None;
        self.state = TimerState::idle();

        match self.selection.exam {
            Some(exam) => info!("selected exam {:?}", exam.name),
            None => debug!("no exam named {:?}, selection cleared", name),
        }
    }

    /// Changes paper within the current exam, abandoning any countdown.
    /// Without a current exam this does nothing.
    pub fn select_paper(&mut self, name: &str) {
        let Some(exam) = self.selection.exam else {
            debug!("paper {:?} ignored, no exam selected", name);
            return;
        };

        self.selection.paper = exam.find_paper(name);
        self.state = match self.selection.paper {
            Some(paper) => {
                info!(
                    "selected paper {:?} of {:?} ({} min)",
                    paper.name, exam.name, paper.duration_minutes
                );
                TimerState::ready(paper)
            }
            None => {
                debug!("no paper named {:?} in {:?}, paper cleared", name, exam.name);
                TimerState::idle()
            }
        };
    }

    /// Start/pause toggle.
    ///
    /// The first start of a run stamps the start and finish time; resuming a
    /// paused run keeps them, so the finish time stays the scheduled deadline.
    /// No-op without a timed paper or once the countdown has expired.
    pub fn start(&mut self, now: DateTime<Local>) {
        let Some(paper) = self.selection.timed_paper() else {
            return;
        };

        match self.phase() {
            TimerPhase::Running => {
                self.state.is_running = false;
                info!("paused with {}s remaining", self.state.time_remaining);
            }
            TimerPhase::Ready => {
                let finish = calculate_finish_time(&now, paper.duration_minutes);
                self.state.run = Some(RunWindow { start: now, finish });
                self.state.is_running = true;
                info!(
                    "started {:?}, finishing at {}",
                    paper.name,
                    finish.format("%H:%M")
                );
            }
            TimerPhase::Paused => {
                self.state.is_running = true;
                info!("resumed with {}s remaining", self.state.time_remaining);
            }
            TimerPhase::Idle | TimerPhase::Expired => {}
        }
    }

    /// Back to a fresh, never started countdown for the selected paper
    pub fn reset(&mut self) {
        let Some(paper) = self.selection.timed_paper() else {
            return;
        };
        self.state = TimerState::ready(paper);
        info!("reset {:?} to {}s", paper.name, self.state.time_remaining);
    }

    /// One second of countdown. Only counts while running; never goes below zero.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running || self.selection.timed_paper().is_none() {
            return TickOutcome::Ignored;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        trace!("tick, {}s remaining", self.state.time_remaining);

        if self.state.time_remaining == 0 {
            self.state.is_running = false;
            info!("exam time has ended");
            TickOutcome::Expired
        } else {
            TickOutcome::Counted(self.state.time_remaining)
        }
    }
}
