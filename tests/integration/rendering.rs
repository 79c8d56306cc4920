//! Full-screen rendering of the app into a test backend

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use research_replay::graph::{JsonFileSource, SessionExport};
use research_replay::ui::AppEvent;
use research_replay::{App, Config};

use super::common::fixtures::{open_session, CLOSED_SESSION};
use super::common::terminal::{
    assert_buffer_contains, assert_buffer_lacks, buffer_to_string, create_test_terminal,
};

fn app(json: &str) -> App {
    let export = SessionExport::from_json(json).unwrap();
    App::new(
        Config::default(),
        Arc::new(JsonFileSource::new("session.json")),
        export,
    )
}

fn press(app: &mut App, code: KeyCode) {
    let key = KeyEvent::new(code, KeyModifiers::NONE);
    app.handle_app_event(AppEvent::Input(Event::Key(key)));
}

fn render(app: &App, terminal: &mut Terminal<TestBackend>) -> String {
    terminal.draw(|f| app.draw(f)).unwrap();
    buffer_to_string(terminal.backend().buffer())
}

#[test]
fn live_view_of_a_closed_session() {
    let app = app(CLOSED_SESSION);
    let mut terminal = create_test_terminal(160, 30);
    let screen = render(&app, &mut terminal);

    assert!(screen.contains("sleep and memory"));
    assert!(screen.contains("● closed"));
    assert!(screen.contains("LIVE"));
    assert!(screen.contains("session closed · press m to replay"));

    let buffer = terminal.backend().buffer();
    assert_buffer_contains(buffer, "2 branches");
    assert_buffer_contains(buffer, "3 papers");
    assert_buffer_contains(buffer, "1 hypotheses");
    assert_buffer_contains(buffer, "→ 6 edges");
    assert_buffer_contains(buffer, "⚠ 1 without timestamp");
    assert_buffer_contains(buffer, "Sleep spindles (2019)");
    assert_buffer_contains(buffer, "REM density predicts skill gains");
}

#[test]
fn open_session_explains_why_replay_is_unavailable() {
    let mut app = app(&open_session());
    let mut terminal = create_test_terminal(160, 30);
    let screen = render(&app, &mut terminal);
    assert!(screen.contains("● open"));
    assert!(screen.contains("replay available when session closes"));

    press(&mut app, KeyCode::Char('m'));
    let screen = render(&app, &mut terminal);
    assert!(screen.contains("Replay is unavailable while the session is still open"));
    assert!(!screen.contains("REPLAY"));
}

#[test]
fn playback_keys_in_live_mode_show_a_hint() {
    let mut app = app(CLOSED_SESSION);
    press(&mut app, KeyCode::Char(' '));
    let mut terminal = create_test_terminal(160, 30);
    let screen = render(&app, &mut terminal);
    assert!(screen.contains("Playback controls work in replay mode (press m)"));
}

#[test]
fn replay_starts_with_only_the_first_entities() {
    let mut app = app(CLOSED_SESSION);
    press(&mut app, KeyCode::Char('m'));
    let mut terminal = create_test_terminal(160, 30);
    render(&app, &mut terminal);

    let buffer = terminal.backend().buffer();
    assert_buffer_contains(buffer, "REPLAY");
    assert_buffer_contains(buffer, "stopped");
    assert_buffer_contains(buffer, "1x");
    assert_buffer_contains(buffer, "0%");
    assert_buffer_contains(buffer, "sleep memory consolidation");
    // Undated entities are always visible
    assert_buffer_contains(buffer, "Undated preprint");
    assert_buffer_lacks(buffer, "Sleep spindles");
    assert_buffer_lacks(buffer, "REM density predicts skill gains");
}

#[test]
fn seeking_to_the_end_shows_the_whole_graph() {
    let mut app = app(CLOSED_SESSION);
    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::End);
    let mut terminal = create_test_terminal(160, 30);
    render(&app, &mut terminal);

    let buffer = terminal.backend().buffer();
    assert_buffer_contains(buffer, "ended");
    assert_buffer_contains(buffer, "100%");
    assert_buffer_contains(buffer, "Sleep spindles");
    assert_buffer_contains(buffer, "REM density predicts skill gains");
    assert_buffer_contains(buffer, "→ 6 edges");
}

#[test]
fn empty_session_renders_a_placeholder() {
    let app = app("{}");
    let mut terminal = create_test_terminal(100, 20);
    let screen = render(&app, &mut terminal);
    assert!(screen.contains("Nothing has been created yet"));
    assert!(screen.contains("0 branches"));
}

#[test]
fn small_terminal_does_not_panic() {
    let mut app = app(CLOSED_SESSION);
    press(&mut app, KeyCode::Char('m'));
    for (width, height) in [(20, 6), (40, 8), (1, 1)] {
        let mut terminal = create_test_terminal(width, height);
        render(&app, &mut terminal);
    }
}
