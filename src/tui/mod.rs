mod controller;
mod state;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::interval;
use tracing::info;

use crate::search::LookupClient;

pub use controller::AppController;
pub use state::App;

/// The foreground loop. Key presses, redraws and search completions are all
/// handled here, one at a time.
pub async fn run<C: LookupClient>(mut app: App<C>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let mut reader = EventStream::new();
    let mut ticker = interval(Duration::from_millis(200));

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        tokio::select! {
            _ = ticker.tick() => {},
            maybe_event = reader.next() => {
                if let Some(Ok(event)) = maybe_event {
                    handle_event(&mut app, event);
                }
            }
            Some(message) = app.msg_rx.recv() => {
                app.handle_message(message);
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("shutting down");
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

fn handle_event<C: LookupClient>(app: &mut App<C>, event: Event) {
    if let Event::Key(key_event) = event {
        if key_event.kind != KeyEventKind::Release {
            handle_key_event(app, key_event);
        }
    }
}

fn handle_key_event<C: LookupClient>(app: &mut App<C>, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
        }
        KeyCode::Char('s') if ctrl => app.save_cover(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.focus = app.focus.toggle();
        }
        KeyCode::Enter => app.submit_search(),
        KeyCode::Esc => app.focused_input().clear(),
        KeyCode::Backspace => {
            app.focused_input().pop();
        }
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::ALT) && !ctrl {
                app.focused_input().push(ch);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use super::*;
    use crate::app::AppMessage;
    use crate::config::AppConfig;
    use crate::models::cover_art::sample;
    use crate::models::{CoverArt, SearchCompletion, SearchOutcome};
    use crate::search::validator::validate;
    use crate::search::{LookupError, SearchOrchestrator};
    use crate::tasks;

    use super::state::{CoverPanel, FocusArea, StatusKind};

    /// Answers every lookup with the same result.
    struct StaticClient(Result<Option<CoverArt>, LookupError>);

    impl LookupClient for StaticClient {
        fn lookup(
            &self,
            _artist: &str,
            _release_title: &str,
        ) -> impl Future<Output = Result<Option<CoverArt>, LookupError>> + Send {
            let result = self.0.clone();
            async move { result }
        }
    }

    fn test_app(result: Result<Option<CoverArt>, LookupError>) -> (App<StaticClient>, AppConfig, TempDir) {
        let tempdir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_data_dir(tempdir.path());
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let orchestrator = SearchOrchestrator::new(StaticClient(result), msg_tx.clone());
        let saver = tasks::cover_art::spawn(&config, msg_tx);
        let app = App::new(AppController::new(orchestrator, saver), msg_rx);
        (app, config, tempdir)
    }

    fn press(app: &mut App<StaticClient>, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn press_ctrl(app: &mut App<StaticClient>, ch: char) {
        handle_key_event(app, KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App<StaticClient>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    async fn deliver_next(app: &mut App<StaticClient>) {
        let message = app.msg_rx.recv().await.unwrap();
        app.handle_message(message);
    }

    #[tokio::test]
    async fn test_tab_toggles_focus_between_fields() {
        let (mut app, _config, _dir) = test_app(Ok(None));
        assert_eq!(app.focus, FocusArea::Artist);

        type_text(&mut app, "Radiohead");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusArea::Release);
        type_text(&mut app, "Kid A");

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, FocusArea::Artist);
        assert_eq!(app.artist_input, "Radiohead");
        assert_eq!(app.release_input, "Kid A");
    }

    #[tokio::test]
    async fn test_esc_clears_only_the_focused_field() {
        let (mut app, _config, _dir) = test_app(Ok(None));
        type_text(&mut app, "Radiohead");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Kid A");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.release_input, "");
        assert_eq!(app.artist_input, "Radiohead");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.artist_input, "Radiohea");
    }

    #[tokio::test]
    async fn test_ctrl_chars_are_not_typed() {
        let (mut app, _config, _dir) = test_app(Ok(None));
        press_ctrl(&mut app, 'x');
        assert_eq!(app.artist_input, "");
        assert!(!app.should_quit);

        press_ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_with_blank_field_only_warns() {
        let (mut app, _config, _dir) = test_app(Ok(None));
        type_text(&mut app, "Radiohead");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view.status_kind, StatusKind::Warning);
        assert_eq!(app.view.status, "Please enter both artist and album / title !");
        assert!(app.view.logs.is_empty());
        assert!(app.msg_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enter_submits_and_completion_shows_cover() {
        let art = sample("r-top");
        let (mut app, _config, _dir) = test_app(Ok(Some(art.clone())));
        type_text(&mut app, "  Radiohead ");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "OK Computer  ");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.status_kind, StatusKind::Busy);
        assert!(app.view.logs.back().unwrap().ends_with("Search #1: Radiohead - OK Computer"));

        deliver_next(&mut app).await;
        assert_eq!(app.view.status_kind, StatusKind::Success);
        let request = validate("Radiohead", "OK Computer").unwrap();
        assert_eq!(app.view.found(), Some((&request, &art)));
    }

    #[tokio::test]
    async fn test_last_delivered_completion_wins() {
        let (mut app, _config, _dir) = test_app(Ok(None));
        let newer = SearchCompletion {
            id: 2,
            request: validate("Radiohead", "Kid A").unwrap(),
            outcome: SearchOutcome::NotFound,
        };
        let older = SearchCompletion {
            id: 1,
            request: validate("Radiohead", "OK Computer").unwrap(),
            outcome: SearchOutcome::Found(sample("r-top")),
        };

        app.handle_message(AppMessage::SearchFinished(newer));
        assert_eq!(app.view.cover, CoverPanel::NotFound);

        app.handle_message(AppMessage::SearchFinished(older.clone()));
        let (request, art) = app.view.found().unwrap();
        assert_eq!(request, &older.request);
        assert_eq!(art.mbid, "r-top");
        assert_eq!(app.view.status_kind, StatusKind::Success);
    }

    #[tokio::test]
    async fn test_save_without_cover_only_logs() {
        let (mut app, config, _dir) = test_app(Ok(None));
        press_ctrl(&mut app, 's');

        assert!(app.view.logs.back().unwrap().ends_with("No cover art to save"));
        assert!(app.msg_rx.try_recv().is_err());
        assert!(!config.cover_art_dir().exists());
    }

    #[tokio::test]
    async fn test_save_with_cover_writes_file() {
        let art = sample("r-top");
        let (mut app, config, _dir) = test_app(Ok(Some(art.clone())));
        type_text(&mut app, "Radiohead");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "OK Computer");
        press(&mut app, KeyCode::Enter);
        deliver_next(&mut app).await;

        press_ctrl(&mut app, 's');
        deliver_next(&mut app).await;

        let expected = config.cover_art_dir().join("Radiohead - OK Computer.png");
        assert!(
            app.view
                .logs
                .back()
                .unwrap()
                .ends_with(&format!("Saved cover art for Radiohead - OK Computer to {}", expected.display()))
        );
        assert_eq!(std::fs::read(&expected).unwrap(), art.bytes);
    }
}
