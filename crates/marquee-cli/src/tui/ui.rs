//! TUI rendering logic for the movie browser.

use marquee_api::tmdb::MovieSummary;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use super::detail::{DetailPanel, DetailSections, DetailState, LOADING_TEXT};
use super::list::{CARD_HEIGHT, HEADING_HEIGHT};
use super::state::{App, InputMode};

/// Screen regions of the browser.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub list: Rect,
    pub status: Rect,
    pub footer: Rect,
}

/// Splits the terminal area into header, list, status line and footer.
#[must_use]
pub fn split(area: Rect) -> AppLayout {
    let [header, list, status, footer] = Layout::vertical([
        Constraint::Length(3), // search box
        Constraint::Min(5),    // list document
        Constraint::Length(1), // status line
        Constraint::Length(3), // key hints
    ])
    .areas(area);
    AppLayout {
        header,
        list,
        status,
        footer,
    }
}

/// Draws the browser UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let layout = split(frame.area());
    draw_header(frame, layout.header, app);
    draw_list(frame, layout.list, app);
    draw_status(frame, layout.status, app);
    draw_footer(frame, layout.footer, app);
}

/// Draws the search box and list summary.
fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let [search_area, summary_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(app.search_input.as_str())
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(search, search_area);

    if app.input_mode == InputMode::Search {
        let typed = u16::try_from(app.search_input.chars().count()).unwrap_or(u16::MAX);
        let x = search_area
            .x
            .saturating_add(1)
            .saturating_add(typed)
            .min(search_area.right().saturating_sub(2));
        frame.set_cursor_position((x, search_area.y.saturating_add(1)));
    }

    let page = app.list.page_state();
    let summary_text = format!(
        "{}  Movies: {}  Page: {}{}",
        if page.is_search() { "Search" } else { "Now playing" },
        app.list.items().len(),
        page.current_page,
        if page.is_last_page { " (last)" } else { "" }
    );
    let summary = Paragraph::new(summary_text)
        .block(Block::default().borders(Borders::ALL).title(" marquee "));
    frame.render_widget(summary, summary_area);
}

/// Draws the visible slice of the list document.
///
/// Each row is rendered off-screen at full height, then the lines inside the
/// viewport are copied into the frame, so partially visible cards clip cleanly.
fn draw_list(frame: &mut Frame, area: Rect, app: &App) {
    let list = &app.list;
    let scroll = list.scroll_offset();
    let view_end = scroll.saturating_add(u32::from(area.height));

    let heading = offscreen(area.width, to_u16(HEADING_HEIGHT), |buf| {
        Paragraph::new(Line::from(Span::styled(
            list.heading().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .render(buf.area, buf);
    });
    blit(&heading, frame.buffer_mut(), area, 0, 0, scroll);

    for row in list.layout() {
        if row.top.saturating_add(row.height) <= scroll || row.top >= view_end {
            continue;
        }
        for (slot, &index) in row.cells.iter().enumerate() {
            let Some(movie) = list.items().get(index) else {
                continue;
            };
            let (x, width) = list.cell_bounds(&row, slot);
            let card = offscreen(width, to_u16(row.height), |buf| {
                render_card(buf, app, index, movie);
            });
            blit(&card, frame.buffer_mut(), area, x, row.top, scroll);
        }
    }
}

fn to_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn offscreen(width: u16, height: u16, render: impl FnOnce(&mut Buffer)) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
    render(&mut buf);
    buf
}

/// Copies the lines of `src` (placed at document line `doc_top`) that fall
/// inside the viewport into `dst`.
fn blit(src: &Buffer, dst: &mut Buffer, viewport: Rect, x_offset: u16, doc_top: u32, scroll: u32) {
    for line in 0..src.area.height {
        let doc_line = doc_top.saturating_add(u32::from(line));
        let Some(screen_line) = doc_line.checked_sub(scroll) else {
            continue;
        };
        if screen_line >= u32::from(viewport.height) {
            break;
        }
        let y = viewport.y.saturating_add(to_u16(screen_line));
        for col in 0..src.area.width {
            let x = viewport.x.saturating_add(x_offset).saturating_add(col);
            if let (Some(cell), Some(target)) = (src.cell((col, line)), dst.cell_mut((x, y))) {
                *target = cell.clone();
            }
        }
    }
}

/// Renders one movie card into `buf`, detail region included when active.
fn render_card(buf: &mut Buffer, app: &App, index: usize, movie: &MovieSummary) {
    let list = &app.list;
    let area = buf.area;
    let active = list.active().filter(|a| a.index == index);
    let is_cursor = list.cursor() == index;

    let border_style = if active.is_some() || is_cursor {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title_style = if is_cursor {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(Span::styled(format!(" {} ", movie.title), title_style)))
        .title(Line::from("[x]").right_aligned());
    let inner = block.inner(area);
    block.render(area, buf);

    let [summary_area, detail_area] = Layout::vertical([
        Constraint::Length(to_u16(CARD_HEIGHT).saturating_sub(2)),
        Constraint::Min(0),
    ])
    .areas(inner);
    render_summary(buf, summary_area, app, movie);

    if let Some(active) = active {
        render_detail(buf, detail_area, &active.panel);
    }
}

fn render_summary(buf: &mut Buffer, area: Rect, app: &App, movie: &MovieSummary) {
    let [info_area, overview_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    let year = movie
        .release_year()
        .map_or_else(|| String::from("-"), |y| y.to_string());
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let info = Line::from(vec![
        Span::raw("Year: "),
        Span::styled(year, bold),
        Span::raw("  Rating: "),
        Span::styled(format!("{:.1}", movie.vote_average), bold),
        Span::raw("  Genres: "),
        Span::styled(app.prerequisites.genres.render(&movie.genre_ids), bold),
    ]);

    let config = &app.prerequisites.config;
    let poster = match (movie.poster_path.as_deref(), config.list_poster_size()) {
        (Some(path), Some(size)) => Line::from(Span::styled(
            format!("Poster: {}", config.poster_url(path, size)),
            Style::default().fg(Color::DarkGray),
        )),
        _ => Line::from(Span::styled(
            "No poster available",
            Style::default().fg(Color::DarkGray),
        )),
    };
    Paragraph::new(vec![info, poster]).render(info_area, buf);

    Paragraph::new(movie.overview.as_str())
        .wrap(Wrap { trim: true })
        .render(overview_area, buf);
}

/// Wrapped lines given to the similar titles.
const SIMILAR_LINES: u16 = 2;
/// Wrapped lines given to each review body; longer reviews are clipped.
const REVIEW_LINES: u16 = 3;

fn render_detail(buf: &mut Buffer, area: Rect, panel: &DetailPanel) {
    let block = Block::default().borders(Borders::TOP).title(" Details ");
    let inner = block.inner(area);
    block.render(area, buf);

    match panel.state() {
        DetailState::Loading => Paragraph::new(LOADING_TEXT).render(inner, buf),
        DetailState::Failed(message) => Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Failed to load details: {message}"),
                Style::default().fg(Color::Red),
            )),
            Line::from("Press r to retry."),
        ])
        .wrap(Wrap { trim: false })
        .render(inner, buf),
        DetailState::Ready(sections) => {
            // Content fades in once the reveal delay has passed.
            let style = if panel.is_shown() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            render_sections(buf, inner, sections, style);
        }
    }
}

/// Stacks the loaded sections, each in a fixed number of lines, so every
/// section stays visible however long the text before it is.
fn render_sections(buf: &mut Buffer, area: Rect, sections: &DetailSections, style: Style) {
    let heading = style.add_modifier(Modifier::BOLD);
    let mut blocks: Vec<(Paragraph, u16)> = Vec::new();

    if let Some(trailer) = &sections.trailer {
        let line = Line::from(vec![
            Span::styled("Trailer: ", heading),
            Span::raw(trailer.url.as_str()),
            Span::styled("  (o: open)", Style::default().fg(Color::DarkGray)),
        ]);
        blocks.push((Paragraph::new(line), 1));
    }
    if let Some(similar) = &sections.similar {
        blocks.push((Paragraph::new(Span::styled(similar.heading, heading)), 1));
        blocks.push((
            Paragraph::new(similar.text.as_str()).wrap(Wrap { trim: true }),
            SIMILAR_LINES,
        ));
    }
    if let Some(reviews) = &sections.reviews {
        blocks.push((Paragraph::new(Span::styled(reviews.heading, heading)), 1));
        for item in &reviews.items {
            blocks.push((
                Paragraph::new(Span::styled(
                    item.byline.as_str(),
                    style.add_modifier(Modifier::ITALIC),
                )),
                1,
            ));
            blocks.push((
                Paragraph::new(item.content.as_str()).wrap(Wrap { trim: true }),
                REVIEW_LINES,
            ));
        }
    }

    let mut y = area.y;
    for (paragraph, height) in blocks {
        let slot = Rect::new(area.x, y, area.width, height).intersection(area);
        if slot.is_empty() {
            break;
        }
        paragraph.style(style).render(slot, buf);
        y = y.saturating_add(height);
    }
}

/// Draws the one-line status bar: errors, notices, loading indicator.
fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(failure) = app.list.failure() {
        Line::from(Span::styled(
            format!("Error: {} (r: retry)", failure.message),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(notice) = &app.notice {
        Line::from(notice.as_str())
    } else if app.list.search_pending() {
        Line::from(Span::styled(
            "Waiting for input...",
            Style::default().fg(Color::DarkGray),
        ))
    } else if app.list.page_state().is_loading {
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.input_mode == InputMode::Search {
        "Type to search | Esc/Enter: back to list"
    } else {
        "\u{2191}\u{2193}/j/k: move  PgUp/PgDn: scroll  Enter: open  x/Esc: close  o: trailer  /: search  r: retry  q: quit"
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
