use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use tracing::info;
use tui_textarea::TextArea;

use level_quest::content::{Catalog, ContentTable};
use level_quest::engine::{EngineEvent, LevelProgressionEngine, Timing};
use level_quest::rewards::{resolve_next_game, Navigation, NextGame, RewardConfig, ShellReport};

pub enum Screen {
    TitleScreen,
    Playing,
    GameOver,
}

pub enum MenuOption {
    Play,
    Quit,
}

impl MenuOption {
    fn next(&self) -> Self {
        match self {
            MenuOption::Play => MenuOption::Quit,
            MenuOption::Quit => MenuOption::Play,
        }
    }
}

/// Why the event loop handed control back.
pub enum Exit {
    Quit,
    Next(String),
}

pub struct App<'a> {
    /// The table as authored; every run draws and shuffles it afresh.
    source: ContentTable,
    rng: StdRng,
    timing: Timing,
    pub engine: LevelProgressionEngine,
    pub rewards: RewardConfig,
    pub next: NextGame,
    pub screen: Screen,
    pub menu_selection: MenuOption,
    /// Highlighted choice on the current entry
    pub cursor: usize,
    pub journal: TextArea<'a>,
}

impl<'a> App<'a> {
    pub fn new(table: ContentTable, catalog: &Catalog, nav: &Navigation, timing: Timing) -> Self {
        Self::with_rng(table, catalog, nav, timing, StdRng::from_entropy())
    }

    pub fn with_rng(
        table: ContentTable,
        catalog: &Catalog,
        nav: &Navigation,
        timing: Timing,
        mut rng: StdRng,
    ) -> Self {
        let rewards = RewardConfig::for_game(catalog, table.id(), nav);
        let next = resolve_next_game(catalog, table.id(), nav);
        let engine = prepared_engine(&table, &mut rng, timing);
        App {
            source: table,
            rng,
            timing,
            engine,
            rewards,
            next,
            screen: Screen::TitleScreen,
            menu_selection: MenuOption::Play,
            cursor: 0,
            journal: new_journal(),
        }
    }

    pub fn report(&self) -> ShellReport {
        self.engine.report(&self.rewards, &self.next)
    }

    fn start_game(&mut self) {
        self.screen = Screen::Playing;
        self.cursor = self.first_available();
        self.journal = new_journal();
        let events = self.engine.start();
        self.apply(events);
    }

    fn replay(&mut self) {
        self.engine = prepared_engine(&self.source, &mut self.rng, self.timing);
        self.start_game();
    }

    /// First choice on the current entry that can still be picked.
    fn first_available(&self) -> usize {
        self.engine
            .current_entry()
            .and_then(|e| {
                e.choices
                    .iter()
                    .position(|c| self.engine.is_choice_available(&c.id))
            })
            .unwrap_or(0)
    }

    /// Moves the cursor one place (wrapping), skipping used choices.
    fn move_cursor(&mut self, forward: bool) {
        let Some(entry) = self.engine.current_entry() else {
            return;
        };
        let count = entry.choices.len();
        let mut cursor = self.cursor;
        for _ in 0..count {
            cursor = if forward {
                (cursor + 1) % count
            } else {
                (cursor + count - 1) % count
            };
            if self.engine.is_choice_available(&entry.choices[cursor].id) {
                self.cursor = cursor;
                return;
            }
        }
    }

    fn choice_count(&self) -> usize {
        self.engine.current_entry().map_or(0, |e| e.choices.len())
    }

    fn entry_is_open(&self) -> bool {
        self.engine.current_entry().is_some_and(|e| e.is_open())
    }

    fn select_at(&mut self, index: usize) {
        let Some(id) = self
            .engine
            .current_entry()
            .and_then(|e| e.choices.get(index))
            .map(|c| c.id.clone())
        else {
            return;
        };
        if !self.engine.is_choice_available(&id) {
            return;
        }
        self.cursor = index;
        let events = self.engine.select_choice(&id);
        self.apply(events);
    }

    fn submit(&mut self) {
        let events = self.engine.submit();
        self.apply(events);
    }

    /// Lets real time pass on the engine clock.
    pub fn on_tick(&mut self, dt: Duration) {
        if matches!(self.screen, Screen::Playing) {
            let events = self.engine.elapse(dt);
            self.apply(events);
        }
    }

    fn apply(&mut self, events: Vec<EngineEvent>) {
        for event in events {
            match &event {
                EngineEvent::Advanced { .. } | EngineEvent::Retry { .. } => {
                    self.cursor = self.first_available();
                    self.journal = new_journal();
                }
                EngineEvent::Completed { score } => {
                    let report = self.report();
                    info!(
                        game = %self.engine.table().id(),
                        score,
                        max = report.max_score,
                        coins = report.coins_earned,
                        badge = ?report.badge_earned,
                        "game over"
                    );
                    self.screen = Screen::GameOver;
                }
                _ => {}
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Exit> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Exit::Quit);
        }

        match self.screen {
            Screen::TitleScreen => match key.code {
                KeyCode::Up | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('k') => {
                    self.menu_selection = self.menu_selection.next();
                }
                KeyCode::Enter => match self.menu_selection {
                    MenuOption::Play => self.start_game(),
                    MenuOption::Quit => return Some(Exit::Quit),
                },
                KeyCode::Char('q') | KeyCode::Esc => return Some(Exit::Quit),
                _ => {}
            },
            Screen::GameOver => match key.code {
                KeyCode::Char('r') => self.replay(),
                KeyCode::Char('n') => {
                    if let Some(id) = &self.next.id {
                        return Some(Exit::Next(id.clone()));
                    }
                }
                KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => return Some(Exit::Quit),
                _ => {}
            },
            Screen::Playing if self.entry_is_open() => match (key.code, key.modifiers) {
                (KeyCode::Esc, _) => return Some(Exit::Quit),
                (KeyCode::F(5), _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.submit(),
                _ => {
                    if self.journal.input(key) {
                        let text = self.journal.lines().join("\n");
                        let events = self.engine.enter_text(&text);
                        self.apply(events);
                    }
                }
            },
            Screen::Playing => {
                let count = self.choice_count();
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => return Some(Exit::Quit),
                    KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
                    KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
                    KeyCode::Char(' ') => self.select_at(self.cursor),
                    KeyCode::Char(c @ '1'..='9') => {
                        let index = c as usize - '1' as usize;
                        if index < count {
                            self.select_at(index);
                        }
                    }
                    KeyCode::Enter => {
                        // Single-tap games answer with the highlighted choice
                        if self.engine.rules().instant {
                            self.select_at(self.cursor);
                        } else {
                            self.submit();
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }
}

fn prepared_engine(source: &ContentTable, rng: &mut StdRng, timing: Timing) -> LevelProgressionEngine {
    let table = source.clone().prepare(rng);
    LevelProgressionEngine::new(Rc::new(table), timing)
}

fn new_journal<'a>() -> TextArea<'a> {
    let mut journal = TextArea::default();
    journal.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Your Answer [F5 / Ctrl+S: Submit | Esc: Quit] "),
    );
    journal.set_line_number_style(Style::default().fg(Color::DarkGray));
    journal
}
