use std::collections::VecDeque;

use chrono::Local;
use ratatui::text::Line;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::AppMessage;
use crate::api::musicbrainz::MusicBrainzClient;
use crate::models::{CoverArt, SearchRequest};
use crate::search::{LookupClient, ResultReporter};
use crate::search::orchestrator::{FOUND_MESSAGE, NOT_FOUND_MESSAGE};

use super::controller::AppController;
use super::ui;

const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Artist,
    Release,
}

impl FocusArea {
    pub fn toggle(self) -> Self {
        match self {
            FocusArea::Artist => FocusArea::Release,
            FocusArea::Release => FocusArea::Artist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Busy,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverPanel {
    Empty,
    Found {
        request: Option<SearchRequest>,
        art: CoverArt,
    },
    NotFound,
}

struct Preview {
    width: u16,
    height: u16,
    lines: Vec<Line<'static>>,
}

/// Everything the screen shows about searches. This is the reporter the
/// orchestrator talks to, so it is only touched from the event loop.
pub struct SearchView {
    pub status: String,
    pub status_kind: StatusKind,
    pub cover: CoverPanel,
    pub logs: VecDeque<String>,
    subject: Option<SearchRequest>,
    preview: Option<Preview>,
}

impl Default for SearchView {
    fn default() -> Self {
        Self {
            status: String::from("Enter an artist and an album or track title, then press Enter."),
            status_kind: StatusKind::Idle,
            cover: CoverPanel::Empty,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            subject: None,
            preview: None,
        }
    }
}

impl SearchView {
    /// Remembers which request the next outcome belongs to.
    pub fn set_subject(&mut self, request: SearchRequest) {
        self.subject = Some(request);
    }

    pub fn push_log<S: Into<String>>(&mut self, message: S) {
        if self.logs.len() == LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(format!(
            "{} {}",
            Local::now().format("%H:%M:%S"),
            message.into()
        ));
    }

    pub fn found(&self) -> Option<(&SearchRequest, &CoverArt)> {
        match &self.cover {
            CoverPanel::Found {
                request: Some(request),
                art,
            } => Some((request, art)),
            _ => None,
        }
    }

    /// Half-block rendering of the shown cover, rebuilt only when the area changes.
    pub fn preview_lines(&mut self, width: u16, height: u16) -> Option<&[Line<'static>]> {
        let CoverPanel::Found { art, .. } = &self.cover else {
            return None;
        };

        let stale = self
            .preview
            .as_ref()
            .is_none_or(|preview| preview.width != width || preview.height != height);
        if stale {
            self.preview = Some(Preview {
                width,
                height,
                lines: ui::render_preview(&art.image, width, height),
            });
        }

        self.preview.as_ref().map(|preview| preview.lines.as_slice())
    }

    fn set_status(&mut self, kind: StatusKind, message: &str) {
        self.status = message.to_string();
        self.status_kind = kind;
    }
}

impl ResultReporter for SearchView {
    fn on_validation_error(&mut self, message: &str) {
        self.set_status(StatusKind::Warning, message);
    }

    fn on_searching(&mut self, message: &str) {
        self.set_status(StatusKind::Busy, message);
    }

    fn on_found(&mut self, art: CoverArt) {
        let request = self.subject.take();
        self.push_log(format!(
            "Found {} cover art for {} (from {})",
            art.dimensions_label(),
            request
                .as_ref()
                .map(SearchRequest::label)
                .unwrap_or_default(),
            art.source_label()
        ));
        self.set_status(StatusKind::Success, FOUND_MESSAGE);
        self.preview = None;
        self.cover = CoverPanel::Found { request, art };
    }

    fn on_not_found(&mut self) {
        if let Some(request) = self.subject.take() {
            self.push_log(format!("No cover art for {}", request.label()));
        }
        self.set_status(StatusKind::Warning, NOT_FOUND_MESSAGE);
        self.preview = None;
        self.cover = CoverPanel::NotFound;
    }

    fn on_error(&mut self, message: &str) {
        self.subject = None;
        self.push_log(message);
        self.set_status(StatusKind::Error, message);
    }
}

pub struct App<C = MusicBrainzClient> {
    pub controller: AppController<C>,
    pub msg_rx: UnboundedReceiver<AppMessage>,
    pub artist_input: String,
    pub release_input: String,
    pub view: SearchView,
    pub focus: FocusArea,
    pub should_quit: bool,
}

impl<C: LookupClient> App<C> {
    pub fn new(controller: AppController<C>, msg_rx: UnboundedReceiver<AppMessage>) -> Self {
        Self {
            controller,
            msg_rx,
            artist_input: String::new(),
            release_input: String::new(),
            view: SearchView::default(),
            focus: FocusArea::Artist,
            should_quit: false,
        }
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::SearchFinished(completion) => {
                self.view.set_subject(completion.request.clone());
                self.controller.complete(completion, &mut self.view);
            }
            AppMessage::SaveLog(entry) => {
                self.view.push_log(entry);
            }
        }
    }

    pub fn submit_search(&mut self) {
        if let Some((id, request)) =
            self.controller
                .submit(&self.artist_input, &self.release_input, &mut self.view)
        {
            self.view
                .push_log(format!("Search #{id}: {}", request.label()));
        }
    }

    pub fn save_cover(&mut self) {
        let Some((request, art)) = self.view.found() else {
            self.view.push_log("No cover art to save");
            return;
        };

        if let Err(err) = self.controller.save(request.clone(), art.clone()) {
            self.view.push_log(format!("Could not save cover art: {err}"));
        }
    }

    pub fn focused_input(&mut self) -> &mut String {
        match self.focus {
            FocusArea::Artist => &mut self.artist_input,
            FocusArea::Release => &mut self.release_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::cover_art::sample;
    use crate::search::validator::validate;

    #[test]
    fn test_found_shows_cover_for_subject() {
        let mut view = SearchView::default();
        let request = validate("Radiohead", "OK Computer").unwrap();
        let art = sample("r-top");

        view.on_searching("Searching for cover art ... please wait.");
        assert_eq!(view.status_kind, StatusKind::Busy);

        view.set_subject(request.clone());
        view.on_found(art.clone());

        assert_eq!(view.status, "Found cover art !");
        assert_eq!(view.status_kind, StatusKind::Success);
        assert_eq!(view.found(), Some((&request, &art)));
    }

    #[test]
    fn test_not_found_replaces_previous_cover() {
        let mut view = SearchView::default();
        view.set_subject(validate("Radiohead", "OK Computer").unwrap());
        view.on_found(sample("r-top"));

        view.set_subject(validate("Radiohead", "Demos").unwrap());
        view.on_not_found();

        assert_eq!(view.cover, CoverPanel::NotFound);
        assert_eq!(view.status, "Sorry, no cover art was found.");
        assert_eq!(view.found(), None);
    }

    #[test]
    fn test_error_keeps_cover_and_shows_message() {
        let mut view = SearchView::default();
        view.set_subject(validate("Radiohead", "OK Computer").unwrap());
        view.on_found(sample("r-top"));

        view.on_error("Sorry, an error occurred: timeout");

        assert_eq!(view.status, "Sorry, an error occurred: timeout");
        assert_eq!(view.status_kind, StatusKind::Error);
        assert!(view.found().is_some());
        assert!(view.logs.back().unwrap().ends_with("Sorry, an error occurred: timeout"));
    }

    #[test]
    fn test_validation_error_is_a_warning() {
        let mut view = SearchView::default();
        view.on_validation_error("Please enter both artist and album / title !");
        assert_eq!(view.status_kind, StatusKind::Warning);
        assert_eq!(view.cover, CoverPanel::Empty);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut view = SearchView::default();
        for idx in 0..(LOG_CAPACITY + 10) {
            view.push_log(format!("entry {idx}"));
        }
        assert_eq!(view.logs.len(), LOG_CAPACITY);
        assert!(view.logs.front().unwrap().ends_with("entry 10"));
    }

    #[test]
    fn test_preview_is_cached_per_size() {
        let mut view = SearchView::default();
        assert!(view.preview_lines(10, 5).is_none());

        view.on_found(sample("r-top"));
        let rows = view.preview_lines(10, 5).unwrap().len();
        assert!(rows >= 1 && rows <= 5);
        assert_eq!(view.preview_lines(10, 5).unwrap().len(), rows);
        assert!(view.preview_lines(4, 1).unwrap().len() <= 1);
    }
}
