mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

use scrib::runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner};
use scrib::sprint::AttachTarget;
use scrib::storage::FileStore;
use scrib::workspace::Workspace;

/// kanban-style writing project manager with sprint timer and progress tracking
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal writing-project manager: kanban boards of drafting tasks, a \
work/break sprint timer that credits word counts to projects, a capped session history, \
and a daily progress dashboard."
)]
pub struct Cli {
    /// sprint length in minutes (overrides the saved timer configuration)
    #[clap(short = 'l', long)]
    length: Option<u32>,

    /// short break length in minutes
    #[clap(long)]
    short_break: Option<u32>,

    /// long break length in minutes
    #[clap(long)]
    long_break: Option<u32>,

    /// words credited for a sprint when the editor is empty
    #[clap(short = 't', long)]
    target_words: Option<u32>,

    /// session title recorded on completed sprints
    #[clap(long)]
    title: Option<String>,

    /// data directory (defaults to the platform state directory)
    #[clap(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// export the sprint history as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,
}

impl Cli {
    fn store(&self) -> FileStore {
        match &self.data_dir {
            Some(dir) => FileStore::with_dir(dir),
            None => FileStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Sprint,
    Boards,
    Progress,
    Notes,
}

impl View {
    pub const ALL: [View; 4] = [View::Sprint, View::Boards, View::Progress, View::Notes];

    pub fn label(self) -> &'static str {
        match self {
            View::Sprint => "Sprint",
            View::Boards => "Boards",
            View::Progress => "Progress",
            View::Notes => "Notes",
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub workspace: Workspace<FileStore>,
    pub view: View,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let mut workspace = Workspace::load(cli.store());
        // CLI overrides land while the timer is paused, so a length change
        // also resets the countdown.
        workspace.timer.pause();
        if let Some(min) = cli.length {
            workspace.timer.set_length_min(min);
        }
        if let Some(min) = cli.short_break {
            workspace.timer.set_short_break_min(min);
        }
        if let Some(min) = cli.long_break {
            workspace.timer.set_long_break_min(min);
        }
        if let Some(words) = cli.target_words {
            workspace.timer.set_target_words(words);
        }
        if let Some(title) = &cli.title {
            workspace.timer.title = title.clone();
        }
        workspace.save_timer();

        Self {
            workspace,
            view: View::Sprint,
        }
    }

    /// Cycle the sprint's attachment target: none, then each board, then each
    /// card, back to none.
    fn cycle_attach_target(&mut self) {
        let targets = self.workspace.attach_targets();
        if targets.is_empty() {
            self.workspace.set_attach_target(None);
            return;
        }
        let next = match &self.workspace.timer.target {
            None => Some(targets[0].clone()),
            Some(current) => match targets.iter().position(|t| t == current) {
                Some(idx) if idx + 1 < targets.len() => Some(targets[idx + 1].clone()),
                _ => None,
            },
        };
        self.workspace.set_attach_target(next);
    }

    pub fn attach_target_label(&self) -> String {
        match &self.workspace.timer.target {
            None => "none".to_string(),
            Some(AttachTarget::Board(id)) => self
                .workspace
                .boards
                .board(id)
                .map(|b| format!("{} (board)", b.title))
                .unwrap_or_else(|| "Unknown".to_string()),
            Some(AttachTarget::Card(id)) => self
                .workspace
                .boards
                .find_card(id)
                .map(|(b, l, c)| format!("{} ({} / {})", c.title, b.title, l.title))
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.export_history {
        let workspace = Workspace::load(cli.store());
        workspace.history.export_csv_path(path)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::per_second());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => {
                // Single-threaded turn: the running guard and the decrement
                // happen together, so a second countdown can never start.
                let _ = app.workspace.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Tab => app.view = app.view.next(),
                KeyCode::BackTab => app.view = app.view.prev(),
                KeyCode::Enter => {
                    if app.workspace.timer.running {
                        app.workspace.pause_sprint();
                    } else {
                        app.workspace.start_sprint();
                    }
                }
                KeyCode::Backspace => {
                    if app.view == View::Sprint {
                        app.workspace.editor_backspace();
                    }
                }
                KeyCode::Char(c) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL) {
                        match c {
                            'c' => break,
                            'r' => app.workspace.reset_sprint(),
                            'w' => {
                                let _ = app.workspace.save_sprint_now();
                            }
                            'a' => app.cycle_attach_target(),
                            'k' => app.workspace.clear_editor(),
                            _ => {}
                        }
                    } else if app.view == View::Sprint {
                        app.workspace.push_editor_char(c);
                    }
                }
                _ => {}
            },
        }
    }

    app.workspace.save_all();
    Ok(())
}
