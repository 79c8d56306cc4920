use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::graph::{format_time_of_day, now_epoch_ms, SessionExport, SessionSource};
use crate::replay::{
    EventLog, FrameScheduler, ModeController, ModeError, MonotonicClock, TickOutcome, ViewMode,
};
use crate::ui::action::Action;
use crate::ui::components::{
    render_key_hints, EventLogView, GraphView, KeyHint, KeyHintBarStyle, StatsBar, TimelineBar,
    ACCENT_WARNING, HEADER_BG, TEXT_BRIGHT, TEXT_MUTED,
};
use crate::ui::events::AppEvent;
use crate::ui::terminal_guard::TerminalGuard;

/// Main application state
pub struct App {
    /// Application configuration
    config: Config,
    /// Where the session is (re)fetched from
    source: Arc<dyn SessionSource>,
    /// Header text: the session's research query, or its id
    session_title: String,
    /// Live/replay composition of the graph and the playback clock
    controller: ModeController<FrameScheduler>,
    /// Session event stream shown beside the graph
    event_log: EventLog,
    /// Wall clock handed to the playback clock on every tick
    wall: MonotonicClock,
    /// Event channel sender
    event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Event channel receiver
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    should_quit: bool,
    /// Redraw on the next loop iteration
    dirty: bool,
    fetch_in_flight: bool,
    /// Transient message for the stats bar
    notice: Option<String>,
    /// Last failed fetch; cleared by the next successful one
    last_error: Option<String>,
}

impl App {
    pub fn new(config: Config, source: Arc<dyn SessionSource>, export: SessionExport) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session_title = session_title(&export, source.as_ref());
        let event_log = EventLog::new(export.events.clone());
        let status = export.status();
        let mut controller = ModeController::new(
            export.into_graph(),
            status,
            config.speed_range,
            FrameScheduler::new(),
            now_epoch_ms(),
        )
        .with_missing_timestamp_warnings(config.warn_missing_timestamps);

        // Forward clock notifications into the event loop
        let tx = event_tx.clone();
        controller.clock_mut().subscribe(move |at| {
            let _ = tx.send(AppEvent::TimeUpdated(at));
        });

        tracing::info!(
            source = %source.describe(),
            entities = controller.graph().entities.len(),
            relationships = controller.graph().relationships.len(),
            events = event_log.len(),
            closed = status.is_closed(),
            "Session loaded"
        );

        Self {
            config,
            source,
            session_title,
            controller,
            event_log,
            wall: MonotonicClock::new(),
            event_tx,
            event_rx,
            should_quit: false,
            dirty: true,
            fetch_in_flight: false,
            notice: None,
            last_error: None,
        }
    }

    pub fn controller(&self) -> &ModeController<FrameScheduler> {
        &self.controller
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn session_title(&self) -> &str {
        &self.session_title
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Switch to replay mode (used for `--replay` at startup)
    pub fn enter_replay(&mut self) -> Result<(), ModeError> {
        self.dirty = true;
        let result = self.controller.enter_replay(now_epoch_ms());
        if let Err(e) = &result {
            self.notice = Some(e.to_string());
        }
        result
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        guard.cleanup()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut frames = interval(self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let refresh_every = self.config.refresh_interval;
        let mut refresh = interval_at(Instant::now() + refresh_every, refresh_every);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if self.dirty {
                terminal.draw(|f| self.draw(f))?;
                self.dirty = false;
            }

            tokio::select! {
                // Terminal input + playback tick
                _ = frames.tick() => {
                    while event::poll(Duration::from_millis(0))? {
                        let input = event::read()?;
                        self.handle_app_event(AppEvent::Input(input));
                    }
                    self.pump_tick();
                }

                // Open sessions keep growing; re-read them
                _ = refresh.tick() => {
                    if !self.controller.status().is_closed() {
                        self.request_refresh();
                    }
                }

                // App events from channel
                Some(event) = self.event_rx.recv() => {
                    self.handle_app_event(event);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Deliver the pending playback tick, if any, at the current wall instant
    pub fn pump_tick(&mut self) -> Option<TickOutcome> {
        let handle = self.controller.clock_mut().scheduler_mut().take_due()?;
        let outcome = self.controller.clock_mut().on_tick(handle, self.wall.now_ms());
        if matches!(outcome, TickOutcome::Ended(_)) {
            self.dirty = true;
        }
        Some(outcome)
    }

    /// Wait for the next event from background tasks and clock notifications
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_rx.recv().await
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) => {
                if let Some(action) = Action::from_key(key) {
                    self.handle_action(action);
                }
            }
            AppEvent::Input(Event::Resize(_, _)) => {
                self.dirty = true;
            }
            AppEvent::Input(_) => {}
            AppEvent::TimeUpdated(at) => {
                tracing::trace!(at, "Virtual time updated");
                self.dirty = true;
            }
            AppEvent::SessionFetched { result } => {
                self.fetch_in_flight = false;
                match result {
                    Ok(export) => self.apply_export(export),
                    Err(error) => {
                        tracing::warn!(error = %error, "Session refresh failed");
                        self.last_error = Some(error);
                        self.dirty = true;
                    }
                }
            }
            AppEvent::Quit => {
                self.should_quit = true;
            }
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        self.dirty = true;

        if action.is_playback() {
            self.handle_playback(action);
            return;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ToggleMode => match self.controller.toggle_mode(now_epoch_ms()) {
                Ok(_) => self.notice = None,
                Err(e) => self.notice = Some(e.to_string()),
            },
            Action::Refresh => self.request_refresh(),
            _ => {}
        }
    }

    fn handle_playback(&mut self, action: Action) {
        let seek_step = self.config.seek_step;
        let Some(clock) = self.controller.replay_clock_mut() else {
            self.notice = Some("Playback controls work in replay mode (press m)".to_string());
            return;
        };

        match action {
            Action::TogglePlay => clock.toggle_play(),
            Action::Reset => clock.reset(),
            Action::SpeedUp => clock.speed_up(),
            Action::SlowDown => clock.slow_down(),
            Action::SeekStep(steps) => {
                let target = clock.current_time() + clock.duration() * seek_step * f64::from(steps);
                clock.seek_to(target);
            }
            Action::SeekProgress(progress) => clock.seek_to_progress(progress),
            Action::SeekStart => clock.seek_to_progress(0.0),
            Action::SeekEnd => clock.seek_to_progress(1.0),
            Action::Quit | Action::ToggleMode | Action::Refresh => {}
        }
        self.notice = None;
    }

    /// Re-read the session in the background; at most one fetch in flight
    pub fn request_refresh(&mut self) {
        if self.fetch_in_flight {
            return;
        }
        self.fetch_in_flight = true;

        let source = Arc::clone(&self.source);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::SessionFetched { result });
        });
    }

    /// Replace the graph and event log with a freshly fetched export
    pub fn apply_export(&mut self, export: SessionExport) {
        let was_replay = self.controller.is_replay();

        self.session_title = session_title(&export, self.source.as_ref());
        self.event_log = EventLog::new(export.events.clone());
        let status = export.status();
        self.controller
            .refresh(export.into_graph(), status, now_epoch_ms());

        if was_replay && !self.controller.is_replay() {
            self.notice = Some("Session reopened; showing live view".to_string());
        }
        self.last_error = None;
        self.dirty = true;
        tracing::debug!(
            entities = self.controller.graph().entities.len(),
            events = self.event_log.len(),
            closed = status.is_closed(),
            "Session refreshed"
        );
    }

    pub fn draw(&self, f: &mut Frame) {
        let size = f.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(5),    // Graph + events
                Constraint::Length(2), // Timeline
                Constraint::Length(1), // Stats
                Constraint::Length(1), // Key hints
            ])
            .split(size);

        self.draw_header(chunks[0], f);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[1]);

        let snapshot = self.controller.snapshot();
        let graph_title = match snapshot.at {
            Some(at) => format!(" Graph at {} ", format_time_of_day(at)),
            None => " Graph ".to_string(),
        };
        GraphView::new(&snapshot)
            .title(graph_title)
            .render(body[0], f.buffer_mut());
        EventLogView::new(&self.event_log, self.controller.visible_instant())
            .render(body[1], f.buffer_mut());

        TimelineBar::new(
            self.controller.mode(),
            self.controller.status(),
            self.controller.clock().state(),
        )
        .render(chunks[2], f.buffer_mut());

        let source = self.source.describe();
        StatsBar::new(snapshot.stats, snapshot.edge_count())
            .untimestamped(self.controller.graph().untimestamped_count())
            .source(&source)
            .notice(self.notice.as_deref())
            .error(self.last_error.as_deref())
            .render(chunks[3], f.buffer_mut());

        render_key_hints(
            chunks[4],
            f.buffer_mut(),
            &self.key_hints(),
            KeyHintBarStyle::footer(),
        );
    }

    fn draw_header(&self, area: Rect, f: &mut Frame) {
        if area.height == 0 {
            return;
        }
        let bg = Style::default().bg(HEADER_BG);
        let (state, color) = if self.controller.status().is_closed() {
            ("closed", TEXT_MUTED)
        } else {
            ("open", ACCENT_WARNING)
        };
        let line = Line::from(vec![
            Span::styled(" ", bg),
            Span::styled(
                self.session_title.clone(),
                bg.fg(TEXT_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ", bg),
            Span::styled(format!("● {state}"), bg.fg(color)),
        ]);
        let buf = f.buffer_mut();
        buf.set_style(area, bg);
        buf.set_line(area.x, area.y, &line, area.width);
    }

    fn key_hints(&self) -> Vec<KeyHint> {
        let replay = self.controller.mode() == ViewMode::Replay;
        let play_label = if self.controller.clock().is_playing() {
            "pause"
        } else {
            "play"
        };
        let mode_label = if replay { "live" } else { "replay" };
        vec![
            KeyHint::new("space", play_label).enabled(replay),
            KeyHint::new("←/→", "seek").enabled(replay),
            KeyHint::new("0-9", "jump").enabled(replay),
            KeyHint::new("+/-", "speed").enabled(replay),
            KeyHint::new("r", "reset").enabled(replay),
            KeyHint::new("m", mode_label).enabled(replay || self.controller.can_replay()),
            KeyHint::new("q", "quit"),
        ]
    }
}

fn session_title(export: &SessionExport, source: &dyn SessionSource) -> String {
    export
        .session
        .query
        .clone()
        .or_else(|| export.session.id.clone())
        .unwrap_or_else(|| source.describe())
}
