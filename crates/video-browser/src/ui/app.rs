use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect, widgets::ListState};
use video_browser_types::VideoFile;

use crate::config::Settings;
use crate::controller::{Listing, VideoBrowser};
use crate::media::{MediaElement, ProcessPlayer};
use crate::server_api;

use super::render;

struct FetchReq;

struct FetchResp {
    result: Result<Vec<VideoFile>>,
}

/// Launch the TUI, spawn the fetch thread, and drive the event loop.
pub(crate) fn run_tui(settings: Settings, log_rx: Receiver<String>) -> Result<()> {
    let (fetch_tx, fetch_rx) = unbounded::<FetchReq>();
    let (done_tx, done_rx) = unbounded::<FetchResp>();

    std::thread::spawn({
        let server = settings.server.clone();
        let agent = server_api::http_agent(server_api::FETCH_TIMEOUT);
        move || {
            while let Ok(FetchReq) = fetch_rx.recv() {
                let result = server_api::list_videos(&agent, &server);
                if done_tx.send(FetchResp { result }).is_err() {
                    break;
                }
            }
        }
    });

    let browser = VideoBrowser::new(
        settings.server.clone(),
        ProcessPlayer::new("preview", settings.player.clone()),
        ProcessPlayer::new("main", settings.player.clone()),
        settings.preview_limit,
    );
    let mut app = App::new(browser, fetch_tx, done_rx, log_rx, settings.refresh_every);
    app.request_refresh(Instant::now());

    let mut term = init_terminal()?;
    let result = ui_loop(&mut term, &mut app);

    restore_terminal(&mut term)?;
    result
}

/// In-memory UI state for rendering + interaction.
pub(crate) struct App<M> {
    pub(crate) browser: VideoBrowser<M>,
    pub(crate) list_state: ListState,
    /// Entry under the pointer/cursor, if any.
    pub(crate) hovered: Option<VideoFile>,
    /// Inner area of the list panel from the last draw, for mouse hit tests.
    pub(crate) list_area: Rect,
    pub(crate) status: String,

    pub(crate) logs_open: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) logs_scroll: usize,
    last_status_snapshot: String,
    log_rx: Receiver<String>,

    fetch_tx: Sender<FetchReq>,
    fetch_rx: Receiver<FetchResp>,
    refresh_every: Option<Duration>,
    next_refresh: Option<Instant>,
}

impl<M: MediaElement> App<M> {
    fn new(
        browser: VideoBrowser<M>,
        fetch_tx: Sender<FetchReq>,
        fetch_rx: Receiver<FetchResp>,
        log_rx: Receiver<String>,
        refresh_every: Option<Duration>,
    ) -> Self {
        Self {
            browser,
            list_state: ListState::default(),
            hovered: None,
            list_area: Rect::default(),
            status: "Ready".into(),
            logs_open: false,
            logs: VecDeque::new(),
            logs_scroll: 0,
            last_status_snapshot: String::new(),
            log_rx,
            fetch_tx,
            fetch_rx,
            refresh_every,
            next_refresh: None,
        }
    }

    fn request_refresh(&mut self, now: Instant) {
        self.next_refresh = self.refresh_every.map(|every| now + every);
        if self.browser.is_refreshing() {
            return;
        }
        if self.fetch_tx.send(FetchReq).is_err() {
            self.status = "Fetch thread is not available".into();
            return;
        }
        self.browser.begin_refresh();
        self.status = "Refreshing...".into();
    }

    fn drain_fetch_results(&mut self) {
        while let Ok(resp) = self.fetch_rx.try_recv() {
            self.browser.apply_listing(resp.result);
            self.status = match self.browser.listing() {
                Listing::Entries(files) => format!("Loaded {} videos", files.len()),
                Listing::Empty => "No videos".into(),
                Listing::Error(_) => "List fetch failed (see logs)".into(),
                Listing::Loading => "Loading".into(),
            };
            self.sync_hover();
        }
    }

    /// Re-point the cursor at the hovered file after the list was rebuilt.
    fn sync_hover(&mut self) {
        let Some(file) = self.hovered.as_ref() else {
            self.list_state.select(None);
            return;
        };
        match self.browser.entries().iter().position(|f| f == file) {
            Some(idx) => self.list_state.select(Some(idx)),
            None => {
                // The controller already stopped a preview of a vanished file.
                self.hovered = None;
                self.list_state.select(None);
            }
        }
    }

    /// Move the hover to entry `index` (or off the list), emitting
    /// leave/enter transitions only when the hovered file changes.
    fn hover_index(&mut self, index: Option<usize>, now: Instant) {
        let file = index.and_then(|i| self.browser.entries().get(i).cloned());
        if file == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.browser.hover_leave(&old);
        }
        match file {
            Some(file) => {
                self.list_state.select(index);
                self.browser.hover_enter(&file, now);
                self.hovered = Some(file);
            }
            None => self.list_state.select(None),
        }
    }

    fn hover_next(&mut self, now: Instant) {
        let len = self.browser.entries().len();
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.hover_index(Some(next), now);
    }

    fn hover_prev(&mut self, now: Instant) {
        let len = self.browser.entries().len();
        if len == 0 {
            return;
        }
        let prev = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => len - 1,
        };
        self.hover_index(Some(prev), now);
    }

    fn click_hovered(&mut self) {
        let Some(file) = self.hovered.clone() else {
            self.status = "Nothing selected".into();
            return;
        };
        self.browser.click(&file);
    }

    /// Play entry `index`, taking the hover without starting a preview.
    fn click_index(&mut self, index: usize) {
        let Some(file) = self.browser.entries().get(index).cloned() else {
            return;
        };
        if self.hovered.as_ref() != Some(&file) {
            if let Some(old) = self.hovered.take() {
                self.browser.hover_leave(&old);
            }
            self.list_state.select(Some(index));
            self.hovered = Some(file.clone());
        }
        self.browser.click(&file);
    }

    /// Map a terminal cell to a list entry index.
    fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area;
        if column < area.x
            || column >= area.x.saturating_add(area.width)
            || row < area.y
            || row >= area.y.saturating_add(area.height)
        {
            return None;
        }
        let idx = self.list_state.offset() + (row - area.y) as usize;
        (idx < self.browser.entries().len()).then_some(idx)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let idx = self.index_at(mouse.column, mouse.row);
                self.hover_index(idx, now);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(idx) = self.index_at(mouse.column, mouse.row) {
                    self.click_index(idx);
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant) {
        self.browser.tick(now);
        if self.next_refresh.is_some_and(|due| now >= due) {
            self.request_refresh(now);
        }
    }

    fn toggle_logs(&mut self) {
        self.logs_open = !self.logs_open;
        if !self.logs_open {
            self.logs_scroll = 0;
        }
    }

    fn scroll_logs_up(&mut self) {
        let max = self.logs.len().saturating_sub(1);
        self.logs_scroll = (self.logs_scroll + 1).min(max);
    }

    fn scroll_logs_down(&mut self) {
        self.logs_scroll = self.logs_scroll.saturating_sub(1);
    }

    fn push_log_line(&mut self, line: String) {
        const LOG_CAP: usize = 500;
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    fn note_status_change(&mut self) {
        if self.last_status_snapshot == self.status {
            return;
        }
        self.last_status_snapshot = self.status.clone();
        tracing::debug!(status = %self.status, "status changed");
    }

    fn drain_logs(&mut self) {
        while let Ok(line) = self.log_rx.try_recv() {
            self.push_log_line(line);
        }
    }
}

fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<ProcessPlayer>,
) -> Result<()> {
    let tick = Duration::from_millis(33);
    let mut last_tick = Instant::now();

    loop {
        app.drain_fetch_results();
        app.tick(Instant::now());
        app.drain_logs();
        terminal.draw(|f| render::draw(f, app))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("poll terminal events")? {
            let now = Instant::now();
            match event::read().context("read terminal event")? {
                CEvent::Key(k) if k.kind == KeyEventKind::Press => {
                    if app.logs_open {
                        match k.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Esc | KeyCode::Char('l') => app.toggle_logs(),
                            KeyCode::Up => app.scroll_logs_up(),
                            KeyCode::Down => app.scroll_logs_down(),
                            _ => {}
                        }
                        continue;
                    }
                    match k.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Up => app.hover_prev(now),
                        KeyCode::Down => app.hover_next(now),
                        KeyCode::Esc | KeyCode::Left => app.hover_index(None, now),
                        KeyCode::Enter => app.click_hovered(),
                        KeyCode::Char('r') => app.request_refresh(now),
                        KeyCode::Char('l') => app.toggle_logs(),
                        _ => {}
                    }
                }
                CEvent::Mouse(mouse) if !app.logs_open => app.handle_mouse(mouse, now),
                _ => {}
            }
        }

        app.note_status_change();

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
        }
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    Ok(())
}
