//! Browser application state and input decoding.

use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::list::{Command, ItemAction, ListController};
use super::runtime::AppEvent;
use crate::bootstrap::Prerequisites;

/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: i32 = 3;

/// Input mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// List navigation.
    Normal,
    /// Typing into the search box.
    Search,
}

/// State for the movie browser TUI.
#[derive(Debug)]
pub struct App {
    /// Genres and image configuration loaded at startup.
    pub prerequisites: Prerequisites,
    /// Movie list and the active detail panel.
    pub list: ListController,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Search box contents.
    pub search_input: String,
    /// One-line message shown in the status bar.
    pub notice: Option<String>,
    trailer_request: Option<String>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub const fn new(prerequisites: Prerequisites, list: ListController) -> Self {
        Self {
            prerequisites,
            list,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            notice: None,
            trailer_request: None,
            should_quit: false,
        }
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Takes the trailer URL the user asked to open, if any.
    pub const fn take_trailer_request(&mut self) -> Option<String> {
        self.trailer_request.take()
    }

    /// Routes one event to the list controller.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Vec<Command> {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, now)
            }
            AppEvent::Input(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppEvent::Input(_) => Vec::new(),
            AppEvent::PageLoaded { request, result } => {
                self.list.on_page_loaded(&request, result);
                Vec::new()
            }
            AppEvent::DetailsLoaded {
                movie_id,
                ticket,
                result,
            } => {
                self.list.on_details_loaded(movie_id, ticket, result, now);
                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }
        match self.input_mode {
            InputMode::Search => {
                self.handle_search_key(key.code, now);
                Vec::new()
            }
            InputMode::Normal => self.handle_normal_key(key.code),
        }
    }

    fn handle_search_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                if self.search_input.pop().is_some() {
                    self.list.on_keyword_input(self.search_input.clone(), now);
                }
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.list.on_keyword_input(self.search_input.clone(), now);
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('r') => {
                self.notice = None;
                return self.list.retry();
            }
            _ => {}
        }
        if !self.list.listeners_attached() {
            return Vec::new();
        }

        let page = i32::from(self.list.viewport().height.max(1));
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                Vec::new()
            }
            KeyCode::Enter => self.list.open_cursor(),
            KeyCode::Char('x') | KeyCode::Esc => match self.list.active() {
                Some(active) => {
                    let movie_id = active.panel.movie_id();
                    self.list.handle_action(ItemAction::Close(movie_id))
                }
                None => Vec::new(),
            },
            KeyCode::Down | KeyCode::Char('j') => self.list.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.list.move_cursor(-1),
            KeyCode::PageDown => self.list.scroll_by(page),
            KeyCode::PageUp => self.list.scroll_by(-page),
            KeyCode::Char('o') => {
                match self.list.trailer_url() {
                    Some(url) => {
                        self.trailer_request = Some(String::from(url));
                        self.notice = Some(format!("Opening trailer: {url}"));
                    }
                    None => self.notice = Some(String::from("No trailer available")),
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Command> {
        if !self.list.listeners_attached() {
            return Vec::new();
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.list.hit_test(mouse.column, mouse.row) {
                    Some(action) => self.list.handle_action(action),
                    None => Vec::new(),
                }
            }
            MouseEventKind::ScrollDown => self.list.scroll_by(WHEEL_LINES),
            MouseEventKind::ScrollUp => self.list.scroll_by(-WHEEL_LINES),
            _ => Vec::new(),
        }
    }
}
