use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use exam_timer::{
    app::{App, Intent},
    catalog::{find_exam_by_name, CAMBRIDGE_EXAMS},
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    fullscreen::TerminalFullScreen,
    logging::{default_log_path, init_file_logger, parse_level},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner},
    util::format_duration,
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fmt::Write as _,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// Redraw at least this often so the clock-derived parts stay current
const POLL_INTERVAL_MS: u64 = 250;

/// full-screen terminal countdown timer for Cambridge exams
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Countdown timer for administering timed Cambridge exam papers, with a full-screen proctoring layout showing the exam details next to a large clock."
)]
pub struct Cli {
    /// exam to preselect, e.g. "B2 First Certificate"
    #[clap(short = 'e', long)]
    exam: Option<String>,

    /// paper of the preselected exam, e.g. "Writing"
    #[clap(short = 'p', long, requires = "exam")]
    paper: Option<String>,

    /// open straight into the full-screen proctoring layout
    #[clap(short = 'f', long)]
    full_screen: bool,

    /// test centre number shown on the information panel
    #[clap(short = 'c', long)]
    centre: Option<String>,

    /// read settings from this file instead of the user config directory
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the log here instead of the user state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the exam catalog and exit
    #[clap(short = 'l', long)]
    list: bool,
}

impl Cli {
    /// Command-line values win over the settings file
    fn apply(&self, mut config: Config) -> Config {
        if let Some(centre) = &self.centre {
            config.centre_number = centre.clone();
        }
        if self.full_screen {
            config.start_full_screen = true;
        }
        config
    }

    /// Checks the preselection against the catalog
    fn validate(&self) -> Result<(), String> {
        let Some(name) = &self.exam else {
            return Ok(());
        };
        let exam = find_exam_by_name(name)
            .ok_or_else(|| format!("unknown exam {:?} (see --list)", name))?;
        match &self.paper {
            Some(paper) if exam.find_paper(paper).is_none() => Err(format!(
                "{:?} has no paper {:?} (available: {})",
                exam.name,
                paper,
                exam.paper_names().join(", ")
            )),
            _ => Ok(()),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Starts the file logger, or says why the session runs without a log
fn start_logging(cli: &Cli, config: &Config) -> Result<(), String> {
    let Some(path) = cli.log_file.clone().or_else(default_log_path) else {
        return Ok(());
    };
    init_file_logger(&path, parse_level(&config.log_level))
        .map_err(|e| format!("exam-timer: logging disabled ({}): {}", path.display(), e))
}

fn catalog_listing() -> String {
    let mut out = String::new();
    for exam in CAMBRIDGE_EXAMS {
        let _ = writeln!(out, "{}", exam.name);
        for paper in exam.papers {
            let _ = writeln!(
                out,
                "  {:<26} {}{}",
                paper.name,
                format_duration(paper.duration_minutes),
                if paper.is_listening { " (audio)" } else { "" }
            );
        }
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        print!("{}", catalog_listing());
        return Ok(());
    }

    if let Err(msg) = cli.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, msg).exit();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.config_store();
    let config = cli.apply(store.load());

    if let Err(msg) = start_logging(&cli, &config) {
        eprintln!("{}", msg);
    }
    info!("config from {}", store.path().display());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let mut app = App::new(
        config,
        Box::new(SystemClock),
        Box::new(FixedTicker::every_second()),
        Box::new(TerminalFullScreen::new()),
        events.sender(),
    );
    preselect(&mut app, &cli);

    let result = start_tui(
        &mut terminal,
        &mut app,
        Runner::new(events, Duration::from_millis(POLL_INTERVAL_MS)),
    );
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("exiting after error: {}", e);
    }
    result
}

fn preselect(app: &mut App, cli: &Cli) {
    if let Some(exam) = &cli.exam {
        app.dispatch(Intent::SelectExam(exam.clone()));
    }
    if let Some(paper) = &cli.paper {
        app.dispatch(Intent::SelectPaper(paper.clone()));
    }
    if app.config.start_full_screen {
        app.dispatch(Intent::ToggleFullScreen);
    }
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        app.handle_event(runner.step());

        if app.take_bell() {
            execute!(io::stdout(), Print('\u{7}'))?;
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}
