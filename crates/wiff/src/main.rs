//! wiff - a terminal diff viewer.
//!
//! Single-threaded event loop: crossterm input is polled on the main
//! thread and merged with reload/timer events from background tasks
//! through one channel, so every state mutation happens in event
//! delivery order.

use std::io::{self, IsTerminal, Read};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::Terminal;

use wiff_diff_viewer::{
    handle_key, handle_mouse, parse_diff, resolve_pending_label, theme_names, widget,
    ViewerOptions, ViewerState,
};

mod app;
mod cli;
mod clipboard;
mod editor;
mod events;
mod git;
mod logger;
mod timer;
mod watch;

use app::{apply_effects, load_diff, reload_diff};
use cli::Cli;
use editor::Tui;
use events::AppEvent;
use git::GitClient;
use timer::LabelTimer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.themes {
        for name in theme_names() {
            println!("{name}");
        }
        return Ok(());
    }

    logger::init();
    log::info!("starting wiff {}", env!("CARGO_PKG_VERSION"));

    let pipe_mode = !io::stdin().is_terminal();
    let options = ViewerOptions {
        refs: cli.refs.clone(),
        staged: cli.staged,
        pipe_mode,
        side_by_side: cli.side_by_side,
        line_numbers: !cli.no_line_numbers,
        wrap: !cli.no_wrap,
        syntax_highlight: !cli.no_syntax,
        diff_bg: !cli.no_diff_bg,
        context_lines: cli.context_lines,
        tree_open: cli.explorer,
        theme: cli.resolved_theme(),
    };

    let git = GitClient;
    let mut state = ViewerState::new(options, Box::new(git));

    let mut terminal = setup_terminal().context("failed to initialize terminal")?;
    let result = run(&mut terminal, &mut state, git, pipe_mode);
    restore_terminal(&mut terminal);
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) {
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();
}

fn run(terminal: &mut Tui, state: &mut ViewerState, git: GitClient, pipe_mode: bool) -> Result<()> {
    let size = terminal.size()?;
    state.width = size.width;
    state.height = size.height;

    // Initial load; a failure here is fatal per the startup contract.
    if pipe_mode {
        let mut raw = Vec::new();
        io::stdin()
            .read_to_end(&mut raw)
            .context("reading diff from stdin")?;
        let text = String::from_utf8_lossy(&raw);
        let hunks = parse_diff(&text, &state.alphabet).context("parsing diff")?;
        state.load_hunks(hunks);
    } else {
        load_diff(state, &git)?;
    }

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let timer = LabelTimer::new(tx.clone());
    if !pipe_mode {
        match git.root() {
            Ok(root) => watch::spawn(root, tx.clone()),
            Err(err) => log::warn!("no repository root, live reload disabled: {err}"),
        }
    }

    loop {
        terminal.draw(|frame| widget::render(state, frame))?;

        // Background events first: they never block.
        let mut quit = false;
        while let Ok(app_event) = rx.try_recv() {
            match app_event {
                AppEvent::Reload => {
                    if state.watch_enabled {
                        reload_diff(state, &git);
                    }
                }
                AppEvent::LabelTimeout(generation) => {
                    if timer.is_current(generation) {
                        let effects = resolve_pending_label(state);
                        quit |= apply_effects(effects, state, terminal, &git, &timer);
                    }
                }
            }
        }
        if quit {
            return Ok(());
        }

        // Then terminal input, with a short poll so background events
        // keep flowing.
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let effects = handle_key(state, key);
                if apply_effects(effects, state, terminal, &git, &timer) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                let effects = handle_mouse(state, mouse);
                if apply_effects(effects, state, terminal, &git, &timer) {
                    return Ok(());
                }
            }
            Event::Resize(width, height) => {
                state.width = width;
                state.height = height;
                state.build_lines();
                state.clamp_scroll();
            }
            _ => {}
        }
    }
}
