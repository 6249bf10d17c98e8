// Library surface shared by the binary and the headless integration tests.
pub mod app;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod fullscreen;
pub mod logging;
pub mod offline;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;

#[cfg(test)]
mod test_support;

pub use app::{App, Intent, Notice};
pub use timer::{ExamTimer, TickOutcome, TimerPhase};
