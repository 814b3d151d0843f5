mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use gojuon::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryDb, RunSummary},
    kana::Representation,
    learn::{self, Difficulty, ScriptKind},
    lookup,
    practice::{self, Mistake, PracticeSession},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
};
use chrono::Local;
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::{
    error::Error,
    fs::{self, File},
    io::{self, stdin},
    path::PathBuf,
    process,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;
const WEAKNESS_LIMIT: usize = 10;
const HISTORY_ROWS: usize = 50;

/// study hiragana, katakana and romaji in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Look up kana, print the syllabary by difficulty, and drill romaji readings. Run without arguments for the interactive TUI."
)]
pub struct Cli {
    /// representation the lookup values are written in
    #[clap(value_enum, ignore_case = true)]
    kind: Option<Representation>,

    /// characters to look up
    values: Vec<String>,

    /// run a practice session in line mode
    #[clap(short = 'p', long)]
    practise: bool,

    /// print the learning table
    #[clap(short = 'l', long)]
    learn: bool,

    /// categories covered by the learning table
    #[clap(short = 'd', long, value_enum, default_value_t = Difficulty::Hard)]
    difficulty: Difficulty,

    /// kana shown in learning tables and practice prompts
    #[clap(short = 's', long, value_enum)]
    script: Option<ScriptKind>,

    /// number of practice questions (defaults to the config value; also applies to the TUI)
    #[clap(short = 'c', long)]
    count: Option<usize>,

    /// category to practice: basic, voiced, half-voiced or contracted (repeatable; also applies to the TUI)
    #[clap(short = 'C', long = "category")]
    categories: Vec<String>,

    /// store the interface language in the config file
    #[clap(long)]
    lang: Option<String>,

    /// config file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn practice_count(&self, config: &Config) -> usize {
        self.count.unwrap_or(config.practice.default_count)
    }

    fn practice_categories(&self, config: &Config) -> Vec<String> {
        if self.categories.is_empty() {
            config.practice.categories.clone()
        } else {
            self.categories.clone()
        }
    }

    /// Puts `-c`/`-C` into the in-memory config the TUI practises with.
    /// The file on disk is left alone.
    fn apply_practice_overrides(&self, config: &mut Config) {
        config.practice.default_count = self.practice_count(config);
        config.practice.categories = self.practice_categories(config);
    }

    /// Kana form used for practice prompts
    fn prompt_script(&self) -> Representation {
        match self.script {
            Some(ScriptKind::Katakana) => Representation::Katakana,
            _ => Representation::Hiragana,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Learn,
    LearnContent,
    Practice,
    Results,
    History,
    Weaknesses,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuItem {
    Learn,
    Practice,
    History,
    Weaknesses,
    Quit,
}

pub const MENU_ITEMS: [MenuItem; 5] = [
    MenuItem::Learn,
    MenuItem::Practice,
    MenuItem::History,
    MenuItem::Weaknesses,
    MenuItem::Quit,
];

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Learn => "Learn",
            MenuItem::Practice => "Practice",
            MenuItem::History => "History",
            MenuItem::Weaknesses => "Weaknesses",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuItem::Learn => "Study the syllabary tables",
            MenuItem::Practice => "Test your romaji readings",
            MenuItem::History => "View past practice runs",
            MenuItem::Weaknesses => "Characters you keep missing",
            MenuItem::Quit => "Exit the application",
        }
    }

    pub fn hotkey(&self) -> char {
        match self {
            MenuItem::Learn => 'l',
            MenuItem::Practice => 'p',
            MenuItem::History => 'h',
            MenuItem::Weaknesses => 'w',
            MenuItem::Quit => 'q',
        }
    }
}

/// Outcome of the last submitted answer, shown under the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    Correct,
    /// Waits for a key press before the next question
    Incorrect { expected: String },
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub menu_index: usize,
    pub difficulty: Difficulty,
    pub script: ScriptKind,
    pub scroll_offset: usize,
    pub session: Option<PracticeSession>,
    pub answer: String,
    pub feedback: Option<Feedback>,
    pub history: Option<HistoryDb>,
    pub recent_runs: Vec<RunSummary>,
    /// Stored misses per romaji, most missed first
    pub mistake_totals: Vec<(String, i64)>,
    pub last_weaknesses: Vec<Mistake>,
}

impl App {
    pub fn new(config: Config, history: Option<HistoryDb>, script: ScriptKind) -> Self {
        Self {
            config,
            state: AppState::Menu,
            menu_index: 0,
            difficulty: Difficulty::Hard,
            script,
            scroll_offset: 0,
            session: None,
            answer: String::new(),
            feedback: None,
            history,
            recent_runs: Vec::new(),
            mistake_totals: Vec::new(),
            last_weaknesses: Vec::new(),
        }
    }

    /// Kana form shown in practice prompts
    pub fn prompt_script(&self) -> Representation {
        match self.script {
            ScriptKind::Katakana => Representation::Katakana,
            _ => Representation::Hiragana,
        }
    }

    /// Handle one key press; returns true when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            if self.state == AppState::Practice {
                self.finish_practice();
            }
            return true;
        }

        match self.state {
            AppState::Menu => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.menu_index = self.menu_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.menu_index = (self.menu_index + 1).min(MENU_ITEMS.len() - 1);
                }
                KeyCode::Enter => return self.activate(MENU_ITEMS[self.menu_index]),
                KeyCode::Esc => return true,
                KeyCode::Char(c) => {
                    if let Some(item) = MENU_ITEMS.iter().find(|i| i.hotkey() == c) {
                        return self.activate(*item);
                    }
                }
                _ => {}
            },
            AppState::Learn => match key.code {
                KeyCode::Char('e') => self.show_learning(Difficulty::Easy),
                KeyCode::Char('n') => self.show_learning(Difficulty::Normal),
                KeyCode::Char('h') => self.show_learning(Difficulty::Hard),
                KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Menu;
                }
                _ => {}
            },
            AppState::LearnContent => match key.code {
                KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Learn;
                }
                KeyCode::Char('s') => {
                    self.script = match self.script {
                        ScriptKind::Hiragana => ScriptKind::Katakana,
                        ScriptKind::Katakana => ScriptKind::Both,
                        ScriptKind::Both => ScriptKind::Hiragana,
                    };
                }
                code => self.scroll(code),
            },
            AppState::Practice => self.on_practice_key(key),
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.start_practice(),
                KeyCode::Char('w') => {
                    self.scroll_offset = 0;
                    self.state = AppState::Weaknesses;
                }
                KeyCode::Char('b') | KeyCode::Esc => self.state = AppState::Menu,
                KeyCode::Char('q') => return true,
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Menu;
                }
                KeyCode::Char('c') => self.clear_history(),
                code => self.scroll(code),
            },
            AppState::Weaknesses => match key.code {
                KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Menu;
                }
                code => self.scroll(code),
            },
        }
        false
    }

    fn scroll(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            // Clamped when rendering
            KeyCode::Down => self.scroll_offset += 1,
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => self.scroll_offset += 10,
            KeyCode::Home => self.scroll_offset = 0,
            _ => {}
        }
    }

    fn activate(&mut self, item: MenuItem) -> bool {
        self.scroll_offset = 0;
        match item {
            MenuItem::Learn => self.state = AppState::Learn,
            MenuItem::Practice => self.start_practice(),
            MenuItem::History => self.open_history(),
            MenuItem::Weaknesses => self.state = AppState::Weaknesses,
            MenuItem::Quit => return true,
        }
        false
    }

    fn show_learning(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.scroll_offset = 0;
        self.state = AppState::LearnContent;
    }

    pub fn start_practice(&mut self) {
        let session = PracticeSession::new(
            self.config.practice.default_count,
            self.config.practice.categories.clone(),
        );
        info!(
            "tui practice started: {} questions from {:?}",
            session.count(),
            session.categories()
        );
        self.session = Some(session);
        self.answer.clear();
        self.feedback = None;
        self.state = AppState::Practice;
        self.next_question();
    }

    fn on_practice_key(&mut self, key: KeyEvent) {
        if let Some(Feedback::Incorrect { .. }) = self.feedback {
            self.feedback = None;
            if key.code == KeyCode::Esc {
                self.finish_practice();
            } else {
                self.next_question();
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.finish_practice(),
            KeyCode::Enter => self.submit_answer(),
            KeyCode::Backspace => {
                self.answer.pop();
            }
            KeyCode::Char(c) => self.answer.push(c),
            _ => {}
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let answer = std::mem::take(&mut self.answer);

        if session.evaluate_answer(&answer) {
            session.complete_question(true);
            self.feedback = Some(Feedback::Correct);
            self.next_question();
        } else {
            session.record_mistake(&answer);
            session.complete_question(false);
            let expected = session
                .current_question()
                .map(|q| q.character.romaji.clone())
                .unwrap_or_default();
            self.feedback = Some(Feedback::Incorrect { expected });
        }
    }

    fn next_question(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.is_finished() || session.select_next_character().is_none() {
            self.finish_practice();
        }
    }

    pub fn finish_practice(&mut self) {
        let Some(session) = self.session.as_ref() else {
            self.state = AppState::Results;
            return;
        };

        self.last_weaknesses = session.weaknesses(WEAKNESS_LIMIT);
        info!(
            "tui practice finished: {} answered, {:.2}% accuracy, {}s",
            session.answered(),
            session.accuracy(),
            (Local::now() - session.started_at()).num_seconds()
        );

        if let (Some(db), Some(run)) = (self.history.as_mut(), session.current_run()) {
            if let Err(e) = db.record_and_prune(run, self.config.history.limit) {
                warn!("could not save practice run: {e}");
            }
        }

        self.feedback = None;
        self.answer.clear();
        self.state = AppState::Results;
    }

    /// Empties the history store and reloads the (now empty) screen
    pub fn clear_history(&mut self) {
        if let Some(db) = self.history.as_ref() {
            match db.clear() {
                Ok(removed) => info!("cleared {removed} practice runs"),
                Err(e) => warn!("could not clear practice history: {e}"),
            }
        }
        self.open_history();
    }

    pub fn open_history(&mut self) {
        self.scroll_offset = 0;
        self.recent_runs.clear();
        self.mistake_totals.clear();

        if let Some(db) = self.history.as_ref() {
            let loaded = db
                .recent_runs(HISTORY_ROWS)
                .and_then(|runs| Ok((runs, db.mistake_totals()?)));
            match loaded {
                Ok((runs, totals)) => {
                    self.recent_runs = runs;
                    self.mistake_totals = totals;
                }
                Err(e) => warn!("could not read practice history: {e}"),
            }
        }
        self.state = AppState::History;
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
}

fn open_history(config: &Config) -> Option<HistoryDb> {
    if !config.history.enabled {
        return None;
    }
    let path = AppDirs::history_db_path()?;
    HistoryDb::open(&path)
        .map_err(|e| warn!("history disabled, cannot open {}: {e}", path.display()))
        .ok()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };

    let mut config = store.load().unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {e}");
        process::exit(1);
    });

    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
        if let Err(e) = store.save(&config) {
            eprintln!("Error saving configuration: {e}");
            process::exit(1);
        }
    }

    if cli.practise {
        let mut session =
            PracticeSession::new(cli.practice_count(&config), cli.practice_categories(&config));
        practice::run_console(
            &mut session,
            cli.prompt_script(),
            &mut stdin().lock(),
            &mut io::stdout().lock(),
        )?;

        if let (Some(mut db), Some(run)) = (open_history(&config), session.current_run()) {
            if let Err(e) = db.record_and_prune(run, config.history.limit) {
                warn!("could not save practice run: {e}");
            }
        }
        return Ok(());
    }

    if cli.learn {
        let content = learn::learning_content(cli.difficulty);
        let script = cli.script.unwrap_or(ScriptKind::Both);
        print!("{}", learn::format_learning_content(&content, script));
        return Ok(());
    }

    if let Some(kind) = cli.kind {
        if cli.values.is_empty() {
            eprintln!("Please provide characters to look up");
            process::exit(1);
        }
        let results = lookup::batch_lookup(kind, &cli.values);
        println!("{}", lookup::format_batch_lookup(&results));
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

    cli.apply_practice_overrides(&mut config);
    let history = open_history(&config);
    let mut app = App::new(config, history, cli.script.unwrap_or(ScriptKind::Both));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;
    loop {
        match runner.step() {
            AppEvent::Tick => {
                // the question timer only moves while practicing
                if ui::is_animated(&app.state) {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
