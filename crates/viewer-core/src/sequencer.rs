//! Preloading of every page up to a requested page.
//!
//! Jumping straight to a page requires all pages before it to be in place,
//! since their heights decide where it ends up. A screenful of pages is also
//! loaded below the target, so that infinite scrolling does not shift the
//! content right after the viewer has scrolled to it.

use crate::error::FetchError;
use crate::page::Page;
use crate::viewer::{Activity, DocumentViewer, ViewerEvent};
use log::{debug, warn};

impl DocumentViewer {
    /// Start loading pages in order until `target` and a screenful below it
    /// are in place, then scroll to `target`.
    ///
    /// Returns `false` when `target` is not a page of the document or when a
    /// preload is already running; such requests are dropped, not queued.
    pub fn load_up_to(&mut self, target: u32) -> bool {
        if !self.pages.contains(target) {
            return false;
        }

        match self.activity {
            Activity::Sequence { target: running, .. } => {
                debug!("preloading up to page {running} already, ignoring page {target}");
                return false;
            }
            Activity::LoadingOne(load) => {
                self.activity = Activity::Sequence { target, load: Some(load) };
            }
            Activity::Idle => {
                self.activity = Activity::Sequence { target, load: None };
            }
        }

        debug!("preloading up to page {target}");
        self.events.push(ViewerEvent::PreloadingChanged { active: true });
        self.events.push(ViewerEvent::ToolbarChanged);

        if self.activity.in_flight().is_none() {
            self.advance_sequence();
        }
        true
    }

    /// Request the next page of the running sequence, or finish it.
    pub(crate) fn advance_sequence(&mut self) {
        let Activity::Sequence { target, load: None } = self.activity else {
            return;
        };
        if !self.is_stylesheet_ready() {
            return;
        }

        match self.pages.next_unplaced() {
            Some(next) if next <= target => self.begin_load(next, 1),
            Some(next) if self.needs_space_below(target) => self.begin_load(next, 1),
            _ => self.finish_sequence(target, Ok(())),
        }
    }

    fn needs_space_below(&self, target: u32) -> bool {
        let below =
            self.scroll_height() - self.pages.flow_top(target) - self.viewport.height;
        below < self.viewport.height
    }

    pub(crate) fn finish_sequence(&mut self, target: u32, result: Result<(), FetchError>) {
        self.activity = Activity::Idle;

        if let Err(error) = &result {
            warn!("preloading up to page {target} stopped: {error}");
        }
        self.events.push(ViewerEvent::PreloadingChanged { active: false });
        self.events.push(ViewerEvent::SequenceFinished { target, result });

        if self.pages.get(target).is_some_and(Page::is_loaded) {
            self.scroll_to_loaded(target);
        } else {
            self.events.push(ViewerEvent::ToolbarChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageState;
    use crate::testing::{metadata, options, FakeBackend};

    fn started(page_count: u32, backend: &mut FakeBackend) -> DocumentViewer {
        let mut viewer = DocumentViewer::new(metadata(page_count), options()).expect("viewer");
        viewer.start();
        backend.run(&mut viewer);
        viewer.drain_events();
        viewer
    }

    #[test]
    fn pages_load_in_ascending_order() {
        let mut backend = FakeBackend::new();
        let mut viewer = started(10, &mut backend);

        assert!(viewer.load_up_to(6));
        backend.run(&mut viewer);

        assert_eq!(backend.page_requests, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(viewer.pages().loaded_pages(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn second_request_while_running_is_dropped() {
        let mut backend = FakeBackend::new();
        let mut viewer = started(10, &mut backend);

        assert!(viewer.load_up_to(5));
        assert!(!viewer.load_up_to(8));
        backend.run(&mut viewer);

        let finished: Vec<u32> = viewer
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                ViewerEvent::SequenceFinished { target, .. } => Some(target),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![5]);
        assert_eq!(viewer.page(8).map(Page::state), Some(PageState::Unloaded));
    }

    #[test]
    fn error_aborts_the_sequence() {
        let mut backend = FakeBackend::new().fail_page(3, FetchError::new(500, "boom"));
        let mut viewer = started(6, &mut backend);
        let scroll_before = viewer.scroll_top();

        viewer.load_up_to(5);
        backend.run(&mut viewer);

        assert_eq!(backend.page_requests, vec![1, 2, 3]);
        assert!(!viewer.is_preloading());
        assert_eq!(viewer.page(3).map(Page::state), Some(PageState::Unloaded));
        assert_eq!(viewer.scroll_top(), scroll_before);

        let events = viewer.drain_events();
        assert!(events.contains(&ViewerEvent::SequenceFinished {
            target: 5,
            result: Err(FetchError::new(500, "boom")),
        }));
        assert!(events.contains(&ViewerEvent::PreloadingChanged { active: false }));
    }

    #[test]
    fn sequence_adopts_running_single_load() {
        let mut backend = FakeBackend::new();
        let mut viewer = DocumentViewer::new(metadata(6), options()).expect("viewer");
        viewer.start();
        backend.step(&mut viewer);
        assert_eq!(viewer.in_flight_page(), Some(1));

        assert!(viewer.load_up_to(3));
        assert!(viewer.is_preloading());
        backend.run(&mut viewer);

        assert_eq!(backend.page_requests, vec![1, 2, 3, 4]);
        assert_eq!(viewer.current_page(), 3);
    }

    #[test]
    fn sequence_waits_for_stylesheet() {
        let mut backend = FakeBackend::new();
        let mut viewer = DocumentViewer::new(metadata(4), options()).expect("viewer");
        viewer.start();

        assert!(viewer.load_up_to(2));
        assert!(!viewer.is_loading_page());
        backend.run(&mut viewer);

        assert_eq!(backend.page_requests, vec![1, 2, 3]);
        assert!(!viewer.is_preloading());
    }

    #[test]
    fn last_page_target_stops_when_document_ends() {
        let mut backend = FakeBackend::new();
        let mut viewer = started(4, &mut backend);

        assert!(viewer.load_up_to(4));
        backend.run(&mut viewer);

        assert_eq!(viewer.pages().loaded_pages(), vec![1, 2, 3, 4]);
        assert!(!viewer.is_preloading());
        assert_eq!(viewer.current_page(), 4);
    }
}
