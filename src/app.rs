//! App: terminal init, main loop, screens, drop timer and key handling.

use crate::bag::Bag;
use crate::game::GameState;
use crate::highscores::{HighScores, ScoreEntry};
use crate::input::{is_gameplay, key_to_action, Action};
use crate::theme::Theme;
use crate::timer::{DropTimer, DROP_INTERVAL};
use crate::{sanitize_name, GameConfig, MAX_NAME_LEN};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Upper bound on one loop iteration (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
}

/// Whether the main loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// One game from spawn to game over. Owns the drop timer, so dropping the
/// session stops gravity on every exit path.
#[derive(Debug)]
pub struct Session {
    pub state: GameState,
    timer: DropTimer,
    score_saved: bool,
}

impl Session {
    fn start(bag: Bag, now: Instant) -> Self {
        Self {
            state: GameState::new(bag),
            timer: DropTimer::start(DROP_INTERVAL, now),
            score_saved: false,
        }
    }

    /// Run the drop tick if due.
    fn advance_clock(&mut self, now: Instant) {
        if !self.timer.is_running() {
            return;
        }
        if self.timer.poll(now) {
            self.state.tick();
        }
        if self.state.is_game_over() {
            self.timer.stop();
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    store: HighScores,
    /// Best first; refreshed on menu entry and after each save.
    scores: Vec<ScoreEntry>,
    screen: Screen,
    /// Menu text field; becomes the player name when a game starts.
    name_input: String,
    session: Option<Session>,
    /// Entry written for the last finished game, for highlighting.
    last_entry: Option<ScoreEntry>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, store: HighScores) -> Self {
        log::debug!("score file: {}", store.path().display());
        let scores = store.load();
        let name_input = config.player_name.clone();
        let mut app = Self {
            config,
            theme,
            store,
            scores,
            screen: Screen::Menu,
            name_input,
            session: None,
            last_entry: None,
        };
        if app.config.skip_menu {
            app.start_game(Instant::now());
        }
        app
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    pub fn name_input(&self) -> &str {
        &self.name_input
    }

    pub fn player_name(&self) -> &str {
        &self.config.player_name
    }

    pub fn game(&self) -> Option<&GameState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn last_entry(&self) -> Option<&ScoreEntry> {
        self.last_entry.as_ref()
    }

    fn start_game(&mut self, now: Instant) {
        self.config.player_name = sanitize_name(&self.name_input);
        self.name_input.clone_from(&self.config.player_name);
        let bag = self.config.seed.map_or_else(Bag::new, Bag::with_seed);
        self.session = Some(Session::start(bag, now));
        self.last_entry = None;
        self.screen = Screen::Playing;
        log::info!("game started for {}", self.config.player_name);
    }

    fn back_to_menu(&mut self) {
        self.session = None;
        self.scores = self.store.load();
        self.screen = Screen::Menu;
    }

    /// Save the final score the first time game over is seen.
    fn check_game_over(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.state.is_game_over() || session.score_saved {
            return;
        }
        session.timer.stop();
        session.score_saved = true;
        let score = session.state.score();
        let name = self.config.player_name.as_str();
        self.scores = self.store.save(name, score);
        self.last_entry = self
            .scores
            .iter()
            .filter(|e| e.name == name && e.score == score)
            .max_by_key(|e| e.date)
            .cloned();
        self.screen = Screen::GameOver;
    }

    /// Per-frame work outside of input: the drop tick.
    pub fn on_frame(&mut self, now: Instant) {
        if self.screen != Screen::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.advance_clock(now);
        }
        self.check_game_over();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Flow::Exit;
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key, now),
            Screen::Playing => self.handle_game_key(key),
            Screen::GameOver => self.handle_game_over_key(key, now),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Exit,
            KeyCode::Enter => self.start_game(now),
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c)
                if !c.is_control()
                    && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    && self.name_input.chars().count() < MAX_NAME_LEN =>
            {
                self.name_input.push(c);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> Flow {
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Menu;
            return Flow::Continue;
        };
        let action = key_to_action(key);
        if is_gameplay(action) && session.state.is_game_over() {
            return Flow::Continue;
        }
        let state = &mut session.state;
        match action {
            Action::MoveLeft => {
                state.move_left();
            }
            Action::MoveRight => {
                state.move_right();
            }
            Action::Rotate => {
                state.rotate();
            }
            Action::SoftDrop => {
                state.soft_drop();
            }
            Action::HardDrop => {
                state.hard_drop();
            }
            Action::Pause => {
                state.toggle_pause();
            }
            Action::Quit => {
                log::info!("game abandoned at score {}", state.score());
                self.back_to_menu();
                return Flow::Continue;
            }
            Action::None => {}
        }
        self.check_game_over();
        Flow::Continue
    }

    fn handle_game_over_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        match key.code {
            KeyCode::Char('r' | 'R') => self.start_game(now),
            KeyCode::Char('m' | 'M') | KeyCode::Esc => self.back_to_menu(),
            KeyCode::Char('q' | 'Q') => return Flow::Exit,
            _ => {}
        }
        Flow::Continue
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let result = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // Restore
        self.session = None;
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| crate::ui::draw(f, self))?;

            let until_drop = self
                .session
                .as_ref()
                .and_then(|s| s.timer.remaining(now))
                .unwrap_or(FRAME_DURATION);
            let timeout = FRAME_DURATION.min(until_drop);

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key, Instant::now()) == Flow::Exit {
                            return Ok(());
                        }
                    }
                }
            }

            self.on_frame(Instant::now());
        }
    }
}
