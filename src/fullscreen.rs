use std::io;
use std::sync::mpsc::Sender;

use crossterm::{execute, terminal, tty::IsTty};
use log::debug;
use thiserror::Error;

use crate::runtime::AppEvent;

pub const MIN_FULL_SCREEN_WIDTH: u16 = 60;
pub const MIN_FULL_SCREEN_HEIGHT: u16 = 16;

const WINDOW_TITLE: &str = "Cambridge Exam Timer";

#[derive(Debug, Error)]
pub enum FullScreenError {
    #[error("full-screen mode is not supported")]
    Unsupported,
    #[error("terminal is too small for full-screen mode ({width}x{height})")]
    TooSmall { width: u16, height: u16 },
    #[error("terminal request failed: {0}")]
    Io(#[from] io::Error),
}

/// Platform capability for the proctoring presentation.
///
/// `enter` and `request_exit` only ask for a change; the actual state arrives
/// as [`AppEvent::FullScreenChanged`] on every subscribed sender.
pub trait FullScreen {
    fn is_supported(&self) -> bool;
    fn enter(&mut self) -> Result<(), FullScreenError>;
    fn request_exit(&mut self) -> Result<(), FullScreenError>;
    fn subscribe(&mut self, listener: Sender<AppEvent>);
}

#[derive(Debug, Default)]
struct Listeners(Vec<Sender<AppEvent>>);

impl Listeners {
    fn notify(&mut self, active: bool) {
        self.0
            .retain(|tx| tx.send(AppEvent::FullScreenChanged(active)).is_ok());
    }
}

/// Crossterm adapter: needs a real terminal of a usable size
#[derive(Debug, Default)]
pub struct TerminalFullScreen {
    listeners: Listeners,
}

impl TerminalFullScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FullScreen for TerminalFullScreen {
    fn is_supported(&self) -> bool {
        io::stdout().is_tty()
    }

    fn enter(&mut self) -> Result<(), FullScreenError> {
        if !self.is_supported() {
            return Err(FullScreenError::Unsupported);
        }
        let (width, height) = terminal::size()?;
        if width < MIN_FULL_SCREEN_WIDTH || height < MIN_FULL_SCREEN_HEIGHT {
            return Err(FullScreenError::TooSmall { width, height });
        }
        execute!(
            io::stdout(),
            terminal::SetTitle(format!("{} - proctoring", WINDOW_TITLE))
        )?;
        debug!("entered full screen at {}x{}", width, height);
        self.listeners.notify(true);
        Ok(())
    }

    fn request_exit(&mut self) -> Result<(), FullScreenError> {
        execute!(io::stdout(), terminal::SetTitle(WINDOW_TITLE))?;
        self.listeners.notify(false);
        Ok(())
    }

    fn subscribe(&mut self, listener: Sender<AppEvent>) {
        self.listeners.0.push(listener);
    }
}

/// Scripted adapter for tests and non-interactive runs
#[derive(Debug)]
pub struct HeadlessFullScreen {
    supported: bool,
    fail_requests: bool,
    active: bool,
    listeners: Listeners,
}

impl HeadlessFullScreen {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_requests: false,
            active: false,
            listeners: Listeners::default(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Every enter/exit request fails with an I/O error
    pub fn failing() -> Self {
        Self {
            fail_requests: true,
            ..Self::new()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn request(&mut self, active: bool) -> Result<(), FullScreenError> {
        if !self.supported {
            return Err(FullScreenError::Unsupported);
        }
        if self.fail_requests {
            return Err(FullScreenError::Io(io::Error::new(
                io::ErrorKind::Other,
                "request denied",
            )));
        }
        self.active = active;
        self.listeners.notify(active);
        Ok(())
    }
}

impl Default for HeadlessFullScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl FullScreen for HeadlessFullScreen {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn enter(&mut self) -> Result<(), FullScreenError> {
        self.request(true)
    }

    fn request_exit(&mut self) -> Result<(), FullScreenError> {
        self.request(false)
    }

    fn subscribe(&mut self, listener: Sender<AppEvent>) {
        self.listeners.0.push(listener);
    }
}
