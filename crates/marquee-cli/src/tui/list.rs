//! Movie list controller: paging, debounced search and item expansion.
//!
//! The controller never performs I/O. Operations mutate the view state and
//! return [`Command`]s; the runtime executes them and feeds results back via
//! [`ListController::on_page_loaded`] and [`ListController::on_details_loaded`].

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;
use marquee_api::tmdb::{MoviePage, MovieSummary};
use ratatui::layout::{Position, Rect};
use tracing::{debug, info, warn};

use super::detail::{DetailPanel, DetailState, MovieDetailBundle};
use super::timer::{Deadline, Debouncer};
use crate::config::BrowserConfig;

/// Lines taken by the list heading.
pub const HEADING_HEIGHT: u32 = 2;
/// Lines taken by a collapsed card.
pub const CARD_HEIGHT: u32 = 8;
/// Extra lines taken by the detail region of the active card: a border line
/// plus trailer (1), similar titles (1 + 2) and reviews (1 + 2 * (1 + 3)).
pub const DETAIL_HEIGHT: u32 = 14;
/// Columns at the right edge of a card's top border that act as its close button.
pub const CLOSE_HIT_WIDTH: u16 = 4;
/// Delay between a detail panel rendering and scrolling it into view.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Paging state of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Last page whose results are rendered.
    pub current_page: u32,
    /// A page request is in flight.
    pub is_loading: bool,
    /// The rendered page is the final one.
    pub is_last_page: bool,
    /// Empty in browsing mode.
    pub search_keyword: String,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            is_loading: false,
            is_last_page: false,
            search_keyword: String::new(),
        }
    }
}

impl PageState {
    /// Whether a search keyword is active.
    #[must_use]
    pub fn is_search(&self) -> bool {
        !self.search_keyword.is_empty()
    }
}

/// How a page result is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page of a new list (initial load or search). Sets the heading.
    Reset,
    /// Next page of the current list.
    Append,
}

/// A page fetch issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// List generation the request belongs to.
    pub generation: u64,
    /// Page number to fetch.
    pub page: u32,
    /// Search keyword; empty fetches now-playing.
    pub keyword: String,
    pub mode: FetchMode,
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchPage(PageRequest),
    LoadDetails { movie_id: u64, ticket: u64 },
}

/// Item-level user intent, decoded once from keys or clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Open(u64),
    Close(u64),
}

/// List heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Fetching,
    InTheaters,
    SearchResults(u32),
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => f.write_str("Fetching data..."),
            Self::InTheaters => f.write_str("In Theaters"),
            Self::SearchResults(total) => write!(f, "Search Results ({total})"),
        }
    }
}

/// A failed page request, kept for retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFailure {
    pub message: String,
    pub request: PageRequest,
}

/// The expanded item.
#[derive(Debug)]
pub struct ActiveItem {
    /// Position in the list.
    pub index: usize,
    pub panel: DetailPanel,
}

/// One visual row of the list document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    /// First document line of the row.
    pub top: u32,
    pub height: u32,
    /// Item positions shown in the row, left to right.
    pub cells: Vec<usize>,
    /// The row holds the active item at full width.
    pub expanded: bool,
}

/// Lays out `len` items into rows.
///
/// Two-column mode pairs consecutive visible items; the active item always
/// takes a full-width row of its own. Hidden items take no space.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn layout_rows(
    len: usize,
    active: Option<usize>,
    hidden: Option<usize>,
    two_column: bool,
) -> Vec<LayoutRow> {
    let per_row = if two_column { 2 } else { 1 };
    let mut rows = Vec::new();
    let mut top = HEADING_HEIGHT;
    let mut pending: Vec<usize> = Vec::with_capacity(per_row);

    for index in 0..len {
        if hidden == Some(index) {
            continue;
        }
        if active == Some(index) {
            if !pending.is_empty() {
                rows.push(LayoutRow {
                    top,
                    height: CARD_HEIGHT,
                    cells: std::mem::take(&mut pending),
                    expanded: false,
                });
                top += CARD_HEIGHT;
            }
            rows.push(LayoutRow {
                top,
                height: CARD_HEIGHT + DETAIL_HEIGHT,
                cells: vec![index],
                expanded: true,
            });
            top += CARD_HEIGHT + DETAIL_HEIGHT;
            continue;
        }
        pending.push(index);
        if pending.len() == per_row {
            rows.push(LayoutRow {
                top,
                height: CARD_HEIGHT,
                cells: std::mem::take(&mut pending),
                expanded: false,
            });
            top += CARD_HEIGHT;
        }
    }
    if !pending.is_empty() {
        rows.push(LayoutRow {
            top,
            height: CARD_HEIGHT,
            cells: pending,
            expanded: false,
        });
    }
    rows
}

/// Total document height of a layout, heading included.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn document_height(rows: &[LayoutRow]) -> u32 {
    rows.last().map_or(HEADING_HEIGHT, |r| r.top + r.height)
}

/// Controller tuning.
#[derive(Debug, Clone, Copy)]
pub struct ListSettings {
    pub search_debounce: Duration,
    /// Lines from the document bottom that trigger the next page.
    pub scroll_threshold: u32,
    /// Viewport width above which two columns are used.
    pub two_column_min_width: u16,
}

impl From<&BrowserConfig> for ListSettings {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            search_debounce: config.search_debounce(),
            scroll_threshold: u32::from(config.scroll_threshold),
            two_column_min_width: config.two_column_min_width,
        }
    }
}

/// Infinite-scrolling movie list.
#[derive(Debug)]
pub struct ListController {
    settings: ListSettings,
    items: Vec<MovieSummary>,
    /// Ids in `items`; listings repeat movies across pages.
    item_ids: HashSet<u64>,
    page: PageState,
    heading: Heading,
    failure: Option<ListFailure>,
    generation: u64,
    listeners_attached: bool,
    scroll_armed: bool,
    active: Option<ActiveItem>,
    hidden: Option<usize>,
    next_ticket: u64,
    cursor: usize,
    scroll_offset: u32,
    viewport: Rect,
    debouncer: Debouncer<String>,
    settle: Deadline<u64>,
}

impl ListController {
    /// Creates an empty controller. Call [`Self::activate`] to start loading.
    #[must_use]
    pub fn new(settings: ListSettings) -> Self {
        Self {
            settings,
            items: Vec::new(),
            item_ids: HashSet::new(),
            page: PageState::default(),
            heading: Heading::Fetching,
            failure: None,
            generation: 0,
            listeners_attached: false,
            scroll_armed: false,
            active: None,
            hidden: None,
            next_ticket: 0,
            cursor: 0,
            scroll_offset: 0,
            viewport: Rect::default(),
            debouncer: Debouncer::new(settings.search_debounce),
            settle: Deadline::default(),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    #[must_use]
    pub const fn page_state(&self) -> &PageState {
        &self.page
    }

    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&ListFailure> {
        self.failure.as_ref()
    }

    /// Whether input handling is live (after the first page rendered).
    #[must_use]
    pub const fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    /// Whether scrolling may still trigger a page fetch.
    #[cfg(test)]
    #[must_use]
    pub const fn scroll_armed(&self) -> bool {
        self.scroll_armed
    }

    #[must_use]
    pub const fn active(&self) -> Option<&ActiveItem> {
        self.active.as_ref()
    }

    #[cfg(test)]
    #[must_use]
    pub const fn hidden(&self) -> Option<usize> {
        self.hidden
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Whether the list is laid out in two columns.
    #[must_use]
    pub const fn is_two_column(&self) -> bool {
        self.viewport.width > self.settings.two_column_min_width
    }

    /// Current layout of the list document.
    #[must_use]
    pub fn layout(&self) -> Vec<LayoutRow> {
        layout_rows(
            self.items.len(),
            self.active.as_ref().map(|a| a.index),
            self.hidden,
            self.is_two_column(),
        )
    }

    /// Horizontal offset and width of `slot` within `row`, relative to the viewport.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn cell_bounds(&self, row: &LayoutRow, slot: usize) -> (u16, u16) {
        if row.expanded || !self.is_two_column() {
            return (0, self.viewport.width);
        }
        let half = self.viewport.width / 2;
        if slot == 0 {
            (0, half)
        } else {
            (half, self.viewport.width - half)
        }
    }

    /// Trailer URL of the active panel, if loaded.
    #[must_use]
    pub fn trailer_url(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.panel.trailer_url())
    }

    // --- Lifecycle ---

    /// Shows the placeholder and requests the first now-playing page.
    pub fn activate(&mut self) -> Vec<Command> {
        self.heading = Heading::Fetching;
        self.page.is_loading = true;
        vec![Command::FetchPage(PageRequest {
            generation: self.generation,
            page: 1,
            keyword: String::new(),
            mode: FetchMode::Reset,
        })]
    }

    /// Applies a page result. Results from an older generation are discarded.
    pub fn on_page_loaded(&mut self, request: &PageRequest, result: Result<MoviePage>) {
        if request.generation != self.generation {
            debug!(
                generation = request.generation,
                current = self.generation,
                page = request.page,
                "discarding stale page result"
            );
            return;
        }
        self.page.is_loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(page = request.page, error = %format!("{err:#}"), "page request failed");
                self.failure = Some(ListFailure {
                    message: format!("{err:#}"),
                    request: request.clone(),
                });
                return;
            }
        };
        self.failure = None;

        self.page.current_page = request.page;
        self.page.is_last_page = page.is_last_page();
        if request.mode == FetchMode::Reset {
            self.heading = if request.keyword.is_empty() {
                Heading::InTheaters
            } else {
                Heading::SearchResults(page.total_results)
            };
        }
        info!(
            page = page.page,
            total_pages = page.total_pages,
            results = page.results.len(),
            "page loaded"
        );
        let before = self.items.len();
        let received = page.results.len();
        for movie in page.results {
            if self.item_ids.insert(movie.id) {
                self.items.push(movie);
            }
        }
        let added = self.items.len().saturating_sub(before);
        if added < received {
            debug!(dropped = received.saturating_sub(added), "repeated movies dropped");
        }

        if !self.listeners_attached {
            self.listeners_attached = true;
            debug!("listeners attached");
        }
        match request.mode {
            FetchMode::Reset => self.scroll_armed = !self.page.is_last_page,
            FetchMode::Append if self.page.is_last_page => {
                self.scroll_armed = false;
                debug!("last page reached, scroll listener disarmed");
            }
            FetchMode::Append => {}
        }
    }

    // --- Scrolling ---

    /// Updates the viewport geometry (list area on screen).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    fn max_scroll(&self) -> u32 {
        document_height(&self.layout()).saturating_sub(u32::from(self.viewport.height))
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    /// Scrolls by `delta` lines, then runs the infinite-scroll check.
    pub fn scroll_by(&mut self, delta: i32) -> Vec<Command> {
        let target = i64::from(self.scroll_offset) + i64::from(delta);
        let clamped = target.clamp(0, i64::from(self.max_scroll()));
        self.scroll_offset = u32::try_from(clamped).unwrap_or(0);
        self.on_scroll()
    }

    /// Requests the next page when the viewport bottom is near the document bottom.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn on_scroll(&mut self) -> Vec<Command> {
        if !self.listeners_attached
            || !self.scroll_armed
            || self.page.is_loading
            || self.page.is_last_page
            || self.failure.is_some()
        {
            return Vec::new();
        }
        let bottom = self.scroll_offset + u32::from(self.viewport.height);
        let distance = document_height(&self.layout()).saturating_sub(bottom);
        if distance > self.settings.scroll_threshold {
            return Vec::new();
        }

        self.page.is_loading = true;
        let request = PageRequest {
            generation: self.generation,
            page: self.page.current_page + 1,
            keyword: self.page.search_keyword.clone(),
            mode: FetchMode::Append,
        };
        debug!(page = request.page, distance, "fetching next page");
        vec![Command::FetchPage(request)]
    }

    /// Moves the cursor by `delta` visible items and keeps it in view.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_cursor(&mut self, delta: isize) -> Vec<Command> {
        if self.items.is_empty() {
            return Vec::new();
        }
        let last = self.items.len() - 1;
        let mut index = self.cursor;
        let mut remaining = delta.unsigned_abs();
        while remaining > 0 {
            let next = if delta < 0 {
                index.checked_sub(1)
            } else {
                (index < last).then_some(index + 1)
            };
            let Some(next) = next else { break };
            index = next;
            if self.hidden != Some(index) {
                remaining -= 1;
            }
        }
        if self.hidden == Some(index) {
            return Vec::new();
        }
        self.cursor = index;
        self.scroll_into_view(index);
        self.on_scroll()
    }

    fn row_of(&self, index: usize) -> Option<LayoutRow> {
        self.layout().into_iter().find(|r| r.cells.contains(&index))
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn scroll_into_view(&mut self, index: usize) {
        let Some(row) = self.row_of(index) else {
            return;
        };
        let height = u32::from(self.viewport.height);
        if row.top < self.scroll_offset {
            self.scroll_offset = row.top;
        } else if row.top + row.height > self.scroll_offset + height {
            self.scroll_offset = (row.top + row.height).saturating_sub(height);
        }
        self.clamp_scroll();
    }

    fn scroll_to_top_of(&mut self, index: usize) {
        if let Some(row) = self.row_of(index) {
            self.scroll_offset = row.top;
            self.clamp_scroll();
        }
    }

    // --- Search ---

    /// Records a keystroke in the search input. Ignored until listeners attach.
    pub fn on_keyword_input(&mut self, keyword: String, now: Instant) {
        if !self.listeners_attached {
            return;
        }
        debug!(keyword = %keyword, "search input debounced");
        self.debouncer.push(now, keyword);
    }

    /// Whether a search is waiting for the debounce period to end.
    #[must_use]
    pub const fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn fire_search(&mut self, keyword: String) -> Vec<Command> {
        self.generation += 1;
        self.close();
        self.items.clear();
        self.item_ids.clear();
        self.heading = Heading::Fetching;
        self.failure = None;
        self.cursor = 0;
        self.scroll_offset = 0;
        self.page = PageState {
            current_page: 1,
            is_loading: true,
            is_last_page: false,
            search_keyword: keyword,
        };
        info!(keyword = %self.page.search_keyword, generation = self.generation, "search fired");
        vec![Command::FetchPage(PageRequest {
            generation: self.generation,
            page: 1,
            keyword: self.page.search_keyword.clone(),
            mode: FetchMode::Reset,
        })]
    }

    /// Advances timers: debounced search, detail reveal and settle scroll.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(keyword) = self.debouncer.poll(now) {
            commands.extend(self.fire_search(keyword));
        }
        if let Some(active) = self.active.as_mut() {
            active.panel.on_tick(now);
        }
        if let Some(movie_id) = self.settle.fire(now)
            && let Some(index) = self
                .active
                .as_ref()
                .filter(|a| a.panel.movie_id() == movie_id)
                .map(|a| a.index)
        {
            self.scroll_to_top_of(index);
            commands.extend(self.on_scroll());
        }
        commands
    }

    // --- Selection ---

    /// Applies an open/close action.
    pub fn handle_action(&mut self, action: ItemAction) -> Vec<Command> {
        if !self.listeners_attached {
            return Vec::new();
        }
        match action {
            ItemAction::Open(movie_id) => {
                let already_active = self
                    .active
                    .as_ref()
                    .is_some_and(|a| a.panel.movie_id() == movie_id);
                self.close();
                if already_active {
                    Vec::new()
                } else {
                    self.open(movie_id)
                }
            }
            ItemAction::Close(_) => {
                self.close();
                Vec::new()
            }
        }
    }

    /// Opens (or toggles) the item under the cursor.
    pub fn open_cursor(&mut self) -> Vec<Command> {
        match self.items.get(self.cursor) {
            Some(item) => self.handle_action(ItemAction::Open(item.id)),
            None => Vec::new(),
        }
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn open(&mut self, movie_id: u64) -> Vec<Command> {
        let Some(index) = self.items.iter().position(|m| m.id == movie_id) else {
            debug!(movie_id, "open for unknown item ignored");
            return Vec::new();
        };
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.active = Some(ActiveItem {
            index,
            panel: DetailPanel::new(movie_id, ticket),
        });
        if self.is_two_column() && index % 2 == 1 {
            self.hidden = Some(index - 1);
        }
        self.cursor = index;
        self.clamp_scroll();
        debug!(movie_id, index, ticket, "item opened");
        vec![Command::LoadDetails { movie_id, ticket }]
    }

    fn close(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(movie_id = active.panel.movie_id(), "item closed");
        }
        self.hidden = None;
        self.settle.cancel();
        self.clamp_scroll();
    }

    /// Applies a detail load result. Results for an inactive panel are discarded.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn on_details_loaded(
        &mut self,
        movie_id: u64,
        ticket: u64,
        result: Result<MovieDetailBundle>,
        now: Instant,
    ) {
        let Some(active) = self
            .active
            .as_mut()
            .filter(|a| a.panel.movie_id() == movie_id)
        else {
            debug!(movie_id, ticket, "discarding details for inactive item");
            return;
        };
        if let Err(err) = &result {
            warn!(movie_id, error = %format!("{err:#}"), "detail request failed");
        }
        if !active.panel.on_loaded(ticket, result, now) {
            return;
        }
        debug!(movie_id, ticket = active.panel.ticket(), "detail result applied");
        if matches!(active.panel.state(), DetailState::Ready(_)) {
            self.settle.schedule(now + SETTLE_DELAY, movie_id);
        }
    }

    /// Re-issues the failed page request, or reloads a failed detail panel.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn retry(&mut self) -> Vec<Command> {
        if let Some(failure) = self.failure.take() {
            self.page.is_loading = true;
            info!(page = failure.request.page, "retrying page request");
            return vec![Command::FetchPage(failure.request)];
        }
        let next_ticket = self.next_ticket + 1;
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        if !active.panel.restart(next_ticket) {
            return Vec::new();
        }
        self.next_ticket = next_ticket;
        let movie_id = active.panel.movie_id();
        info!(movie_id, "retrying detail request");
        vec![Command::LoadDetails {
            movie_id,
            ticket: next_ticket,
        }]
    }

    // --- Hit testing ---

    /// Decodes a click at screen position (`column`, `row`) into an item action.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ItemAction> {
        if !self.viewport.contains(Position::new(column, row)) {
            return None;
        }
        let line = u32::from(row - self.viewport.y) + self.scroll_offset;
        let layout = self.layout();
        let layout_row = layout
            .iter()
            .find(|r| r.top <= line && line < r.top + r.height)?;
        let rel_x = column - self.viewport.x;
        let (slot, (x, width)) = (0..layout_row.cells.len())
            .map(|slot| (slot, self.cell_bounds(layout_row, slot)))
            .find(|(_, (x, width))| *x <= rel_x && rel_x < x + width)?;
        let movie_id = self.items.get(layout_row.cells[slot])?.id;

        let on_close = line == layout_row.top && rel_x + CLOSE_HIT_WIDTH >= x + width;
        Some(if on_close {
            ItemAction::Close(movie_id)
        } else {
            ItemAction::Open(movie_id)
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]
    #![allow(clippy::panic)]

    use super::*;

    fn settings() -> ListSettings {
        ListSettings {
            search_debounce: Duration::from_millis(800),
            scroll_threshold: 12,
            two_column_min_width: 160,
        }
    }

    fn movie(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("movie {id}"),
            overview: String::new(),
            genre_ids: vec![],
            poster_path: None,
            vote_average: 0.0,
            release_date: None,
        }
    }

    fn page(page: u32, total_pages: u32, ids: &[u64]) -> MoviePage {
        MoviePage {
            page,
            results: ids.iter().copied().map(movie).collect(),
            total_pages,
            total_results: u32::try_from(ids.len()).unwrap(),
        }
    }

    fn fetch_request(commands: &[Command]) -> PageRequest {
        match commands {
            [Command::FetchPage(request)] => request.clone(),
            other => panic!("expected one FetchPage, got {other:?}"),
        }
    }

    /// Controller with page 1 of `total_pages` loaded (3 items) in an 80x10 viewport.
    fn loaded(total_pages: u32) -> ListController {
        let mut list = ListController::new(settings());
        list.set_viewport(Rect::new(0, 0, 80, 10));
        let request = fetch_request(&list.activate());
        list.on_page_loaded(&request, Ok(page(1, total_pages, &[1, 2, 3])));
        list
    }

    #[test]
    fn test_activate_requests_first_page() {
        // Arrange
        let mut list = ListController::new(settings());

        // Act
        let request = fetch_request(&list.activate());

        // Assert
        assert_eq!(request.page, 1);
        assert!(request.keyword.is_empty());
        assert_eq!(request.mode, FetchMode::Reset);
        assert_eq!(list.heading().to_string(), "Fetching data...");
        assert!(list.page_state().is_loading);
        assert!(!list.listeners_attached());
    }

    #[test]
    fn test_input_ignored_before_first_page() {
        // Arrange
        let now = Instant::now();
        let mut list = ListController::new(settings());
        list.activate();

        // Act
        list.on_keyword_input(String::from("dune"), now);
        let commands = list.on_tick(now + Duration::from_secs(1));
        let actions = list.handle_action(ItemAction::Open(1));

        // Assert
        assert!(commands.is_empty());
        assert!(actions.is_empty());
    }

    #[test]
    fn test_initial_load_renders_in_theaters() {
        // Arrange & Act
        let list = loaded(2);

        // Assert
        assert_eq!(list.heading().to_string(), "In Theaters");
        assert_eq!(list.items().len(), 3);
        assert!(list.listeners_attached());
        assert!(list.scroll_armed());
        assert!(!list.page_state().is_loading);
        assert_eq!(list.page_state().current_page, 1);
    }

    #[test]
    fn test_scroll_far_from_bottom_does_not_fetch() {
        // Arrange: document is 2 + 3 * 8 = 26 lines, viewport 10
        let mut list = loaded(2);

        // Act
        let commands = list.on_scroll();

        // Assert
        assert!(commands.is_empty());
    }

    #[test]
    fn test_pagination_stops_after_last_page() {
        // Arrange
        let mut list = loaded(2);

        // Act: scroll near bottom, page 2 of 2 arrives
        let request = fetch_request(&list.scroll_by(10));
        list.on_page_loaded(&request, Ok(page(2, 2, &[4, 5])));
        let after_last = list.scroll_by(100);

        // Assert
        assert_eq!(request.page, 2);
        assert_eq!(request.mode, FetchMode::Append);
        assert_eq!(list.items().len(), 5);
        assert_eq!(list.page_state().current_page, 2);
        assert!(list.page_state().is_last_page);
        assert!(!list.scroll_armed());
        assert!(after_last.is_empty());
    }

    #[test]
    fn test_no_second_fetch_while_loading() {
        // Arrange
        let mut list = loaded(5);

        // Act
        let first = list.scroll_by(10);
        let second = list.scroll_by(1);

        // Assert
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_search_resets_page_and_replaces_list() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(3);
        let request = fetch_request(&list.scroll_by(10));
        list.on_page_loaded(&request, Ok(page(2, 3, &[4, 5])));

        // Act: burst of keystrokes, only the last fires
        list.on_keyword_input(String::from("du"), now);
        list.on_keyword_input(String::from("dune"), now + Duration::from_millis(100));
        let early = list.on_tick(now + Duration::from_millis(800));
        let search = fetch_request(&list.on_tick(now + Duration::from_millis(900)));

        // Assert: list discarded as soon as the search fires
        assert!(early.is_empty());
        assert_eq!(search.page, 1);
        assert_eq!(search.keyword, "dune");
        assert_eq!(search.mode, FetchMode::Reset);
        assert!(list.items().is_empty());
        assert_eq!(list.page_state().current_page, 1);
        assert!(!list.page_state().is_last_page);

        // Act: results arrive
        list.on_page_loaded(&search, Ok(page(1, 1, &[438_631])));

        // Assert
        assert_eq!(list.heading().to_string(), "Search Results (1)");
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].id, 438_631);
        assert!(list.page_state().is_last_page);
    }

    #[test]
    fn test_empty_keyword_returns_to_browsing() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(1);
        assert!(!list.scroll_armed());

        // Act
        list.on_keyword_input(String::new(), now);
        let request = fetch_request(&list.on_tick(now + Duration::from_secs(1)));
        list.on_page_loaded(&request, Ok(page(1, 4, &[7])));

        // Assert
        assert!(request.keyword.is_empty());
        assert_eq!(list.heading().to_string(), "In Theaters");
        assert!(list.scroll_armed());
    }

    #[test]
    fn test_stale_scroll_result_discarded_after_search() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(3);
        let scroll = fetch_request(&list.scroll_by(10));
        list.on_keyword_input(String::from("dune"), now);
        let search = fetch_request(&list.on_tick(now + Duration::from_secs(1)));

        // Act: search resolves, then the old scroll page arrives late
        list.on_page_loaded(&search, Ok(page(1, 2, &[10])));
        list.on_page_loaded(&scroll, Ok(page(2, 3, &[4, 5])));

        // Assert
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.page_state().current_page, 1);
        assert!(!list.page_state().is_last_page);
    }

    #[test]
    fn test_empty_result_set_is_last_page() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(3);
        list.on_keyword_input(String::from("zzzz"), now);
        let search = fetch_request(&list.on_tick(now + Duration::from_secs(1)));

        // Act
        list.on_page_loaded(&search, Ok(page(1, 0, &[])));

        // Assert
        assert_eq!(list.heading().to_string(), "Search Results (0)");
        assert!(list.page_state().is_last_page);
        assert!(list.scroll_by(5).is_empty());
    }

    #[test]
    fn test_at_most_one_active_item() {
        // Arrange
        let mut list = loaded(1);

        // Act & Assert: open 1, open 2 replaces it
        let first = list.handle_action(ItemAction::Open(1));
        assert!(matches!(first.as_slice(), [Command::LoadDetails { movie_id: 1, .. }]));
        list.handle_action(ItemAction::Open(2));
        assert_eq!(list.active().unwrap().panel.movie_id(), 2);

        // Opening the active item again closes it
        list.handle_action(ItemAction::Open(2));
        assert!(list.active().is_none());

        // Close carries any id and still closes the active item
        list.handle_action(ItemAction::Open(3));
        list.handle_action(ItemAction::Close(1));
        assert!(list.active().is_none());
    }

    #[test]
    fn test_two_column_hides_preceding_item() {
        // Arrange
        let mut list = loaded(1);
        list.set_viewport(Rect::new(0, 0, 200, 40));

        // Act
        list.handle_action(ItemAction::Open(2));

        // Assert: position 1 is odd, position 0 hidden
        assert_eq!(list.hidden(), Some(0));
        let rows = list.layout();
        assert_eq!(rows[0].cells, vec![1]);
        assert!(rows[0].expanded);

        // Act: close restores it
        list.handle_action(ItemAction::Close(2));

        // Assert
        assert_eq!(list.hidden(), None);
        assert_eq!(list.layout()[0].cells, vec![0, 1]);
    }

    #[test]
    fn test_single_column_never_hides() {
        // Arrange
        let mut list = loaded(1);

        // Act
        list.handle_action(ItemAction::Open(2));

        // Assert
        assert_eq!(list.hidden(), None);
    }

    #[test]
    fn test_stale_detail_result_discarded() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(1);
        let first = list.handle_action(ItemAction::Open(1));
        let Command::LoadDetails { ticket, .. } = &first[0] else {
            panic!("expected LoadDetails");
        };
        list.handle_action(ItemAction::Open(2));

        // Act
        list.on_details_loaded(1, *ticket, Ok(MovieDetailBundle::default()), now);

        // Assert
        let active = list.active().unwrap();
        assert_eq!(active.panel.movie_id(), 2);
        assert_eq!(active.panel.state(), &DetailState::Loading);
    }

    #[test]
    fn test_reopen_fetches_again() {
        // Arrange
        let mut list = loaded(1);
        list.handle_action(ItemAction::Open(1));
        list.handle_action(ItemAction::Close(1));

        // Act
        let commands = list.handle_action(ItemAction::Open(1));

        // Assert
        assert!(matches!(
            commands.as_slice(),
            [Command::LoadDetails { movie_id: 1, ticket: 2 }]
        ));
    }

    #[test]
    fn test_settle_scrolls_active_to_top() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(1);
        let commands = list.handle_action(ItemAction::Open(3));
        let Command::LoadDetails { ticket, .. } = &commands[0] else {
            panic!("expected LoadDetails");
        };
        list.set_viewport(Rect::new(0, 0, 80, 10));
        let before = list.scroll_offset();

        // Act
        list.on_details_loaded(3, *ticket, Ok(MovieDetailBundle::default()), now);
        list.on_tick(now + Duration::from_millis(100));
        let early = list.scroll_offset();
        list.on_tick(now + SETTLE_DELAY);

        // Assert: item 3 is at line 2 + 2 * 8 = 18
        assert_eq!(early, before);
        assert_eq!(list.scroll_offset(), 18);
    }

    #[test]
    fn test_repeated_movie_across_pages_listed_once() {
        // Arrange: two-column viewport, page 2 repeats movie 3
        let mut list = ListController::new(settings());
        list.set_viewport(Rect::new(0, 0, 200, 10));
        let request = fetch_request(&list.activate());
        list.on_page_loaded(&request, Ok(page(1, 3, &[1, 2, 3])));
        let next = fetch_request(&list.scroll_by(10));

        // Act
        list.on_page_loaded(&next, Ok(page(2, 3, &[3, 4])));
        let commands = list.handle_action(ItemAction::Open(4));

        // Assert
        let ids: Vec<u64> = list.items().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(list.page_state().current_page, 2);
        assert!(matches!(
            commands.as_slice(),
            [Command::LoadDetails { movie_id: 4, .. }]
        ));
        assert_eq!(list.active().unwrap().index, 3);
        assert_eq!(list.hidden(), Some(2));
    }

    #[test]
    fn test_failed_search_does_not_keep_previous_heading() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(3);
        list.on_keyword_input(String::from("dune"), now);
        let search = fetch_request(&list.on_tick(now + Duration::from_secs(1)));

        // Act
        list.on_page_loaded(&search, Err(anyhow::anyhow!("timed out")));

        // Assert
        assert_eq!(list.heading(), Heading::Fetching);
        assert!(list.items().is_empty());
        assert!(list.failure().is_some());

        // Act: retry succeeds
        let retried = fetch_request(&list.retry());
        list.on_page_loaded(&retried, Ok(page(1, 1, &[42])));

        // Assert
        assert_eq!(list.heading().to_string(), "Search Results (1)");
    }

    #[test]
    fn test_page_failure_and_retry() {
        // Arrange
        let mut list = loaded(3);
        let request = fetch_request(&list.scroll_by(10));

        // Act
        list.on_page_loaded(&request, Err(anyhow::anyhow!("connection reset")));

        // Assert
        assert!(!list.page_state().is_loading);
        assert!(list.failure().unwrap().message.contains("connection reset"));
        assert!(list.scroll_by(1).is_empty());

        // Act
        let retried = fetch_request(&list.retry());

        // Assert
        assert_eq!(retried, request);
        assert!(list.failure().is_none());
        assert!(list.page_state().is_loading);
    }

    #[test]
    fn test_detail_retry_after_failure() {
        // Arrange
        let now = Instant::now();
        let mut list = loaded(1);
        list.handle_action(ItemAction::Open(1));
        list.on_details_loaded(1, 1, Err(anyhow::anyhow!("timeout")), now);

        // Act
        let commands = list.retry();

        // Assert
        assert!(matches!(
            commands.as_slice(),
            [Command::LoadDetails { movie_id: 1, ticket: 2 }]
        ));
    }

    #[test]
    fn test_hit_test_open_and_close() {
        // Arrange: one column, rows start at line 2
        let list = loaded(1);

        // Act & Assert
        assert_eq!(list.hit_test(10, 3), Some(ItemAction::Open(1)));
        assert_eq!(list.hit_test(10, 9), Some(ItemAction::Open(1)));
        assert_eq!(list.hit_test(78, 2), Some(ItemAction::Close(1)));
        assert_eq!(list.hit_test(10, 0), None);
        assert_eq!(list.hit_test(10, 20), None);
    }

    #[test]
    fn test_hit_test_two_columns() {
        // Arrange
        let mut list = loaded(1);
        list.set_viewport(Rect::new(0, 0, 200, 40));

        // Act & Assert
        assert_eq!(list.hit_test(10, 4), Some(ItemAction::Open(1)));
        assert_eq!(list.hit_test(150, 4), Some(ItemAction::Open(2)));
        assert_eq!(list.hit_test(10, 12), Some(ItemAction::Open(3)));
        assert_eq!(list.hit_test(150, 12), None);
    }

    #[test]
    fn test_cursor_movement_scrolls() {
        // Arrange
        let mut list = loaded(1);

        // Act
        list.move_cursor(2);

        // Assert: row of item 3 ends at 26, viewport 10
        assert_eq!(list.cursor(), 2);
        assert_eq!(list.scroll_offset(), 16);

        // Act
        list.move_cursor(-5);

        // Assert
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.scroll_offset(), 2);
    }

    #[test]
    fn test_layout_rows_pairs_and_expands() {
        // Arrange & Act
        let rows = layout_rows(5, Some(2), None, true);

        // Assert
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells, vec![0, 1]);
        assert_eq!(rows[1].cells, vec![2]);
        assert_eq!(rows[1].height, CARD_HEIGHT + DETAIL_HEIGHT);
        assert_eq!(rows[2].cells, vec![3, 4]);
        assert_eq!(rows[2].top, HEADING_HEIGHT + CARD_HEIGHT * 2 + DETAIL_HEIGHT);
        assert_eq!(document_height(&rows), rows[2].top + CARD_HEIGHT);
        assert_eq!(document_height(&[]), HEADING_HEIGHT);
    }
}
