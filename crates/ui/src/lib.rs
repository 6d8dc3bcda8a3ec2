//! Terminal front end: the story list and the story detail screens.

use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Context as _;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui_image::Image as ImageWidget;
use ratatui_image::picker::Picker;
use storydeck_application::{
    AppContext, DetailView, LoadEvent, LoadState, Navigation, OptionMark, StatusFilter,
    StoryState, available_statuses,
};
use storydeck_core::{Accent, StatusKind, Story, Tab, Theme};
use storydeck_remote::Loader;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod image_protocol;
mod preview;

use image_protocol::TerminalHints;
use preview::{Preview, PreviewCache};

const TICK_RATE: Duration = Duration::from_millis(100);

pub struct Ui {
    ctx: AppContext,
    loader: Loader,
    events: Receiver<LoadEvent>,
    image_picker: Picker,
    previews: PreviewCache,
    notice: Option<String>,
}

impl Ui {
    pub fn new(mut ctx: AppContext, loader: Loader, events: Receiver<LoadEvent>) -> Self {
        ctx.settings.normalize();
        Self {
            ctx,
            loader,
            events,
            image_picker: Picker::halfblocks(),
            previews: PreviewCache::default(),
            notice: None,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn into_context(self) -> AppContext {
        self.ctx
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Kicks off the first catalog fetch.
    pub fn start(&mut self) {
        self.reload_catalog();
    }

    fn reload_catalog(&mut self) {
        let token = self.ctx.catalog.begin_load();
        tracing::debug!(?token, "loading catalog");
        self.loader.catalog(token);
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        self.image_picker = image_protocol::build_picker(TerminalHints::from_env());
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(()),
            (Ok(Err(err)), _) => Err(err),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let mut needs_redraw = true;

        loop {
            if self.pump() {
                needs_redraw = true;
            }
            if needs_redraw {
                terminal.draw(|frame| self.render(frame))?;
                needs_redraw = false;
            }

            if !event::poll(TICK_RATE)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    needs_redraw = true;
                    if self.handle_key(key).is_break() {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Applies every load that finished since the last call. Returns `true`
    /// when something arrived.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            changed = true;
        }
        if changed {
            self.request_preview();
        }
        changed
    }

    fn apply(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Catalog { token, result } => self.ctx.apply_catalog(token, result),
            LoadEvent::Story { token, id, result } => {
                tracing::trace!(%id, ?token, "story response");
                self.ctx.apply_story(token, result);
            }
            LoadEvent::Image { url, result } => self.previews.insert(url, result),
        }
    }

    fn preview_url(&self) -> Option<String> {
        if !self.ctx.settings.show_images {
            return None;
        }
        let fragment = match self.ctx.detail() {
            Some(view) => view.preview_image()?,
            None => self
                .ctx
                .list
                .selected(self.ctx.catalog.stories())?
                .cover_image()?,
        };
        self.ctx.settings.image_url(fragment)
    }

    fn request_preview(&mut self) {
        if let Some(url) = self.preview_url()
            && self.previews.request(&url)
        {
            self.loader.image(url);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        self.notice = None;
        let flow = if self.ctx.detail().is_some() {
            self.handle_detail_key(key)
        } else {
            self.handle_list_key(key)
        };
        self.request_preview();
        flow
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        let stories = self.ctx.catalog.stories();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ControlFlow::Break(()),
            KeyCode::Down | KeyCode::Char('j') => self.ctx.list.cursor_down(stories),
            KeyCode::Up | KeyCode::Char('k') => self.ctx.list.cursor_up(),
            KeyCode::Right | KeyCode::Char('l') => {
                if !self.ctx.list.next_page(stories) {
                    self.notice = Some("Already on the last page".to_string());
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if !self.ctx.list.prev_page() {
                    self.notice = Some("Already on the first page".to_string());
                }
            }
            KeyCode::Tab => self.ctx.list.cycle_status(stories, true),
            KeyCode::BackTab => self.ctx.list.cycle_status(stories, false),
            KeyCode::Enter => {
                if let Some((token, id)) = self.ctx.open_selected() {
                    tracing::debug!(%id, "opening story");
                    self.loader.story(token, id);
                }
            }
            KeyCode::Char('r') => self.reload_catalog(),
            KeyCode::Char('t') => self.ctx.settings.cycle_theme(),
            KeyCode::Char('i') => self.ctx.settings.toggle_images(),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        match key.code {
            KeyCode::Char('q') => return ControlFlow::Break(()),
            KeyCode::Esc | KeyCode::Backspace => {
                self.ctx.back_to_list();
                return ControlFlow::Continue(());
            }
            KeyCode::Char('t') => {
                self.ctx.settings.cycle_theme();
                return ControlFlow::Continue(());
            }
            KeyCode::Char('i') => {
                self.ctx.settings.toggle_images();
                return ControlFlow::Continue(());
            }
            _ => {}
        }

        let Some(view) = self.ctx.detail_mut() else {
            return ControlFlow::Continue(());
        };
        let mut navigation = None;
        match key.code {
            KeyCode::Tab => view.next_tab(),
            KeyCode::BackTab => view.prev_tab(),
            KeyCode::Char('1') => view.select_tab(Tab::WordExplorer),
            KeyCode::Char('2') => view.select_tab(Tab::StoryAdventure),
            KeyCode::Char('3') => view.select_tab(Tab::BrainQuest),
            KeyCode::Down | KeyCode::Char('j') => view.move_down(),
            KeyCode::Up | KeyCode::Char('k') => view.move_up(),
            KeyCode::Right | KeyCode::Char('l') => view.option_next(),
            KeyCode::Left | KeyCode::Char('h') => view.option_prev(),
            KeyCode::Enter => {
                if view.tab() == Tab::BrainQuest && !view.choose() && view.answers().is_revealed()
                {
                    self.notice = Some("Answers are locked after submitting".to_string());
                }
            }
            KeyCode::Char('s') => {
                if view.shows_submit() && view.submit().is_none() {
                    self.notice = Some("Answer every question before submitting".to_string());
                }
            }
            KeyCode::Char('n') | KeyCode::Char(']') => navigation = Some(view.next()),
            KeyCode::Char('p') | KeyCode::Char('[') => navigation = Some(view.prev()),
            KeyCode::Char('r') => {
                let (token, id) = view.reload();
                navigation = Some(Navigation::Load { token, id });
            }
            _ => {}
        }

        match navigation {
            Some(Navigation::Load { token, id }) => self.loader.story(token, id),
            Some(Navigation::Blocked) => {
                self.notice = Some("No more stories in that direction".to_string());
            }
            None => {}
        }
        ControlFlow::Continue(())
    }

    fn accent_color(&self) -> Color {
        match self.ctx.settings.theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Yellow,
        }
    }

    pub fn render(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);
        if self.ctx.detail().is_some() {
            self.draw_detail(frame, area);
        } else {
            self.draw_list(frame, area);
        }
    }

    fn draw_list(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let stories = self.ctx.catalog.stories();
        let total_pages = self.ctx.list.total_pages(stories);
        let pager_height = if total_pages > 1 { 3 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(pager_height),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Text::from(self.list_header_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, layout[0]);

        match self.ctx.catalog.state().clone() {
            LoadState::Idle | LoadState::Loading => {
                frame.render_widget(message_panel("Stories", &["Loading stories..."]), layout[1]);
            }
            LoadState::Failed(err) => {
                let reason = format!("Reason: {err}");
                frame.render_widget(
                    message_panel(
                        "Stories",
                        &["Could not load stories.", reason.as_str(), "", "Press r to retry."],
                    ),
                    layout[1],
                );
            }
            LoadState::Loaded => self.draw_story_list(frame, layout[1]),
        }

        if total_pages > 1 {
            let progress = self.ctx.list.progress(self.ctx.catalog.stories());
            let ratio = f64::from(progress.percent() / 100.0).clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Pages"))
                .gauge_style(Style::default().fg(self.accent_color()))
                .ratio(ratio)
                .label(format!(
                    "Page {} of {}",
                    progress.current_page, progress.total_pages
                ));
            frame.render_widget(gauge, layout[2]);
        }

        let footer = Paragraph::new(Text::from(self.list_footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[3]);
    }

    fn list_header_lines(&self) -> Vec<Line<'static>> {
        let accent = self.accent_color();
        let mut chips = vec![status_chip(
            " all ".to_string(),
            *self.ctx.list.filter() == StatusFilter::All,
            accent,
        )];
        for status in available_statuses(self.ctx.catalog.stories()) {
            let kind = StatusKind::from_tag(&status);
            let label = if kind.icon().is_empty() {
                format!(" {status} ")
            } else {
                format!(" {} {status} ", kind.icon())
            };
            let selected = matches!(self.ctx.list.filter(), StatusFilter::Only(s) if *s == status);
            chips.push(Span::raw(" "));
            chips.push(status_chip(label, selected, accent_to_color(kind.accent())));
        }

        vec![
            Line::from(Span::styled(
                "Science Fiction Stories",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(chips),
        ]
    }

    fn list_footer_lines(&self) -> Vec<Line<'static>> {
        let mut spans = vec![
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit  "),
            Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" move  "),
            Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" page  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" status  "),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" open  "),
            Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" reload"),
        ];
        if let Some(notice) = &self.notice {
            spans.push(Span::raw("  · "));
            spans.push(Span::styled(
                notice.clone(),
                Style::default().fg(self.accent_color()),
            ));
        }
        vec![Line::from(spans)]
    }

    fn draw_story_list(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let visible = self.ctx.list.visible(self.ctx.catalog.stories());
        let title = format!(
            "Stories · {}",
            match self.ctx.list.filter() {
                StatusFilter::All => "all".to_string(),
                StatusFilter::Only(status) => status.clone(),
            }
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        if visible.is_empty() {
            let paragraph = Paragraph::new("No stories found for this filter.")
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let max_title_width = body[0].width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = visible
            .iter()
            .map(|story| {
                let kind = story.status_kind();
                let label = truncate_to_width(&story.title, max_title_width.max(8));
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", status_marker(kind)),
                        Style::default().fg(accent_to_color(kind.accent())),
                    ),
                    Span::raw(label),
                ]))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(Color::Black)
            .bg(self.accent_color())
            .add_modifier(Modifier::BOLD);
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);
        let mut state = ListState::default();
        state.select(Some(self.ctx.list.cursor()));
        frame.render_stateful_widget(list, body[0], &mut state);

        let selected = self.ctx.list.selected(self.ctx.catalog.stories());
        let details = Paragraph::new(Text::from(story_summary_lines(selected)))
            .wrap(Wrap { trim: true });
        let details_block = Block::default().borders(Borders::ALL).title("Details");
        let inner = details_block.inner(body[1]);
        frame.render_widget(details_block, body[1]);

        if !self.ctx.settings.show_images {
            frame.render_widget(details, inner);
            return;
        }
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(inner);
        frame.render_widget(details, split[0]);
        let url = self.preview_url();
        draw_preview(
            frame,
            split[1],
            &mut self.previews,
            &self.image_picker,
            url.as_deref(),
        );
    }

    fn draw_detail(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let accent = self.accent_color();
        let url = self.preview_url();
        let show_images = self.ctx.settings.show_images;
        let Some(view) = self.ctx.detail() else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Text::from(detail_header_lines(view, accent)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, layout[0]);

        frame.render_widget(
            Paragraph::new(tab_row(view.tab())).alignment(Alignment::Center),
            layout[1],
        );

        let body = layout[2];
        let mut scroll_max = None;
        match view.state() {
            StoryState::Loading => {
                frame.render_widget(message_panel("Story", &["Loading story..."]), body);
            }
            StoryState::NotFound(reason) => {
                let reason = format!("Reason: {reason}");
                frame.render_widget(
                    message_panel(
                        "Story",
                        &[
                            "Story not found",
                            reason.as_str(),
                            "",
                            "Press r to retry or Esc to go back.",
                        ],
                    ),
                    body,
                );
            }
            StoryState::Ready(story) => {
                let image_area = match view.tab() {
                    Tab::WordExplorer => draw_word_explorer(frame, body, view, story, accent),
                    Tab::StoryAdventure => {
                        let (image_area, max) = draw_adventure(frame, body, view, story, accent);
                        scroll_max = Some(max);
                        Some(image_area)
                    }
                    Tab::BrainQuest => {
                        draw_brain_quest(frame, body, view, story, accent);
                        None
                    }
                };
                if show_images && let Some(image_area) = image_area {
                    draw_preview(
                        frame,
                        image_area,
                        &mut self.previews,
                        &self.image_picker,
                        url.as_deref(),
                    );
                }
            }
        }

        let footer = Paragraph::new(Text::from(self.detail_footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[3]);

        if let Some(max) = scroll_max
            && let Some(view) = self.ctx.detail_mut()
        {
            view.set_scroll_max(max);
        }
    }

    fn detail_footer_lines(&self) -> Vec<Line<'static>> {
        let mut spans = vec![
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" back  "),
            Span::styled("Tab/1-3", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" tabs  "),
            Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" move  "),
            Span::styled("←/→ Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" answer  "),
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" submit  "),
            Span::styled("p/n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" story"),
        ];
        if let Some(notice) = &self.notice {
            spans.push(Span::raw("  · "));
            spans.push(Span::styled(
                notice.clone(),
                Style::default().fg(self.accent_color()),
            ));
        }
        vec![Line::from(spans)]
    }
}

fn detail_header_lines(view: &DetailView, accent: Color) -> Vec<Line<'static>> {
    let title = view
        .story()
        .map(|s| s.title.clone())
        .unwrap_or_else(|| view.requested_id().to_string());
    let nav = view.navigator();
    let position = if nav.is_empty() {
        0
    } else {
        nav.position() + 1
    };
    let arrow = |enabled: bool, text: &'static str| {
        let style = if enabled {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(text, style)
    };
    vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            arrow(nav.can_prev(), "◀ p  "),
            Span::raw(format!("Story {position} of {}", nav.len())),
            arrow(nav.can_next(), "  n ▶"),
        ]),
    ]
}

fn tab_row(active: Tab) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let color = accent_to_color(tab.accent());
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::styled(
            format!(" {} {} {} ", i + 1, tab.icon(), tab.label()),
            style,
        ));
    }
    Line::from(spans)
}

/// Returns the area left for the image preview.
fn draw_word_explorer(
    frame: &mut ratatui::Frame,
    area: Rect,
    view: &DetailView,
    story: &Story,
    accent: Color,
) -> Option<Rect> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Tab::WordExplorer.label());
    if story.words.is_empty() {
        frame.render_widget(
            Paragraph::new("No words to explore for this story.").block(block),
            area,
        );
        return None;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let max_width = cols[0].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = story
        .words
        .iter()
        .map(|w| ListItem::new(truncate_to_width(&w.word, max_width.max(4))))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always);
    let mut state = ListState::default();
    state.select(Some(view.word_cursor()));
    frame.render_stateful_widget(list, cols[0], &mut state);

    let detail_block = Block::default().borders(Borders::ALL).title("Meaning");
    let inner = detail_block.inner(cols[1]);
    frame.render_widget(detail_block, cols[1]);

    let mut lines = Vec::new();
    if let Some(entry) = story.words.get(view.word_cursor()) {
        lines.push(Line::from(Span::styled(
            entry.word.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )));
        if !entry.text.trim().is_empty() {
            lines.push(Line::raw(entry.text.clone()));
        }
        if !entry.example.trim().is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled("Example: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(entry.example.clone()),
            ]));
        }
    }

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        split[0],
    );
    Some(split[1])
}

fn draw_adventure(
    frame: &mut ratatui::Frame,
    area: Rect,
    view: &DetailView,
    story: &Story,
    accent: Color,
) -> (Rect, u16) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            story.adventure_title().to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    let bodies: Vec<&str> = story
        .adventure
        .sections
        .iter()
        .map(|s| s.body())
        .filter(|b| !b.trim().is_empty())
        .collect();
    if bodies.is_empty() {
        lines.push(Line::raw("This story has no adventure yet."));
    }
    for body in bodies {
        lines.push(Line::raw(body.to_string()));
        lines.push(Line::raw(""));
    }

    let inner_width = cols[0].width.saturating_sub(2);
    let inner_height = cols[0].height.saturating_sub(2);
    let max = wrapped_height(&lines, inner_width).saturating_sub(inner_height);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Tab::StoryAdventure.label()),
        )
        .wrap(Wrap { trim: true })
        .scroll((view.scroll().min(max), 0));
    frame.render_widget(paragraph, cols[0]);
    (cols[1], max)
}

/// Rows `lines` take once wrapped at `width` columns.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn draw_brain_quest(
    frame: &mut ratatui::Frame,
    area: Rect,
    view: &DetailView,
    story: &Story,
    accent: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Tab::BrainQuest.label());
    if story.questions.is_empty() {
        frame.render_widget(
            Paragraph::new("No questions for this story.").block(block),
            area,
        );
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    let answers = view.answers();
    let mut lines = Vec::new();
    for (qi, question) in story.questions.iter().enumerate() {
        let focused = qi == view.question_cursor();
        let marker = if focused { "> " } else { "  " };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if focused {
            style = style.fg(accent);
        }
        lines.push(Line::from(Span::styled(
            format!("{marker}{}. {}", qi + 1, question.text),
            style,
        )));

        let mut options = vec![Span::raw("    ")];
        for (oi, option) in question.options.iter().enumerate() {
            if oi > 0 {
                options.push(Span::raw(" "));
            }
            let on_cursor = focused && oi == view.option_cursor();
            options.push(option_chip(option, answers.mark(question, option), on_cursor));
        }
        lines.push(Line::from(options));
        lines.push(Line::raw(""));
    }

    // keep the focused question on screen
    let rows_per_question = 3usize;
    let height = split[0].height as usize;
    let focus_row = view.question_cursor() * rows_per_question;
    let offset = focus_row.saturating_sub(height.saturating_sub(rows_per_question));
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).scroll((offset, 0)),
        split[0],
    );

    let status = if let Some(score) = view.score() {
        Line::from(Span::styled(
            format!("You got {} out of {} correct!", score.correct, score.total),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
    } else if view.shows_submit() {
        let answered = story
            .questions
            .iter()
            .filter(|q| answers.selection(&q.id).is_some())
            .count();
        let hint = if view.can_submit() {
            "Press s to submit".to_string()
        } else {
            format!("{answered}/{} answered", story.questions.len())
        };
        Line::raw(hint)
    } else {
        Line::raw("")
    };
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Center),
        split[1],
    );
}

fn draw_preview(
    frame: &mut ratatui::Frame,
    area: Rect,
    previews: &mut PreviewCache,
    picker: &Picker,
    url: Option<&str>,
) {
    let block = Block::default().borders(Borders::ALL).title("Image");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(url) = url else {
        frame.render_widget(
            Paragraph::new("No image").alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let placeholder = match previews.get(url) {
        Some(Preview::Ready(_)) => None,
        Some(Preview::Failed(reason)) => Some(vec![
            Line::raw("Image unavailable"),
            Line::styled(reason.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Some(Preview::Pending) | None => Some(vec![Line::raw("Loading image...")]),
    };
    if let Some(lines) = placeholder {
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    if let Some(protocol) = previews.protocol(picker, url, inner) {
        let proto_area = protocol.area();
        let draw_width = proto_area.width.min(inner.width);
        let draw_height = proto_area.height.min(inner.height);
        let draw_area = Rect::new(
            inner.x + inner.width.saturating_sub(draw_width) / 2,
            inner.y + inner.height.saturating_sub(draw_height) / 2,
            draw_width,
            draw_height,
        );
        frame.render_widget(ImageWidget::new(protocol), draw_area);
    }
}

fn story_summary_lines(story: Option<&Story>) -> Vec<Line<'static>> {
    let Some(story) = story else {
        return vec![Line::raw("No selection.")];
    };
    let kind = story.status_kind();
    let mut lines = vec![
        Line::from(Span::styled(
            story.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("{} {}", status_marker(kind), story.status),
                Style::default().fg(accent_to_color(kind.accent())),
            ),
        ]),
        Line::from(vec![
            Span::styled("Words: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(story.words.len().to_string()),
            Span::raw("  "),
            Span::styled("Questions: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(story.questions.len().to_string()),
        ]),
    ];
    let broken = story.unanswerable_questions().len();
    if broken > 0 {
        lines.push(Line::from(Span::styled(
            format!("{broken} question(s) list no matching answer"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn message_panel<'a>(title: &'a str, lines: &[&str]) -> Paragraph<'a> {
    let text: Vec<Line> = lines.iter().map(|l| Line::raw(l.to_string())).collect();
    Paragraph::new(Text::from(text))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true })
}

fn status_marker(kind: StatusKind) -> &'static str {
    match kind.icon() {
        "" => "•",
        icon => icon,
    }
}

fn accent_to_color(accent: Accent) -> Color {
    match accent {
        Accent::Purple => Color::Magenta,
        Accent::Yellow => Color::Yellow,
        Accent::Green => Color::Green,
        Accent::Cyan => Color::Cyan,
        Accent::Pink => Color::LightMagenta,
    }
}

fn status_chip(label: String, selected: bool, color: Color) -> Span<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    Span::styled(label, style)
}

fn option_chip(label: &str, mark: OptionMark, on_cursor: bool) -> Span<'static> {
    let (text, mut style) = match mark {
        OptionMark::Unselected => (format!(" {label} "), Style::default().fg(Color::Gray)),
        OptionMark::Selected => (
            format!(" {label} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        OptionMark::Correct => (
            format!(" ✓ {label} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        OptionMark::Incorrect => (
            format!(" ✗ {label} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
    };
    if on_cursor {
        style = style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}
