//! Selection session: the coordinating-thread glue between input, the
//! gesture machine, the highlight coordinator and the worker pool.
//!
//! A host application owns one [`SelectionSession`] per point cloud view.
//! Each frame it feeds input (directly or through [`InputQueue`]), calls
//! [`SelectionSession::update_frame`], and uploads the uniform read from the
//! paired [`HighlightReader`].

use std::sync::mpsc;

use web_time::Duration;

use crate::camera::{CameraControls, FrameContext};
use crate::error::{CloudpickError, SelectionError};
use crate::highlight::{
    DragOverlay, HighlightCoordinator, HighlightReader,
};
use crate::input::{
    GestureEvent, GestureMachine, GestureState, InputEvent, InputQueue,
    InputSender, KeyAction,
};
use crate::options::{KeybindingOptions, Options};
use crate::points::PointStore;
use crate::selection::{
    PendingSelection, SelectionExecutor, SelectionOutcome, SelectionQuery,
};

/// Completed query as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    /// Sequence number of the query.
    pub generation: u64,
    /// Matching point indices, ascending.
    pub indices: Vec<u32>,
    /// A newer query was issued before this one finished.
    pub stale: bool,
    /// Time from dispatch to merge.
    pub elapsed: Duration,
}

impl SelectionReport {
    /// Number of matched points.
    #[must_use]
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Owns the selection pipeline for one point cloud.
pub struct SelectionSession {
    gesture: GestureMachine,
    highlight: HighlightCoordinator,
    executor: SelectionExecutor,
    queue: InputQueue,
    keybindings: KeybindingOptions,
    discard_stale: bool,
    point_count: usize,
    pending: Vec<PendingSelection>,
    newest_generation: Option<u64>,
    last_count: Option<usize>,
    last_error: Option<SelectionError>,
}

impl SelectionSession {
    /// Spawn the worker pool for `store` and build the session.
    ///
    /// Returns the session together with the renderer's read handle on the
    /// highlight uniform.
    ///
    /// # Errors
    ///
    /// Returns [`CloudpickError::ThreadSpawn`] if the pool cannot be
    /// created.
    pub fn new(
        store: PointStore,
        options: &Options,
    ) -> Result<(Self, HighlightReader), CloudpickError> {
        let point_count = store.len();
        let executor =
            SelectionExecutor::new(store, options.selection.worker_count)?;
        let (highlight, reader) =
            HighlightCoordinator::new(options.highlight.clone());
        let mut keybindings = options.keybindings.clone();
        keybindings.rebuild_reverse_map();

        Ok((
            Self {
                gesture: GestureMachine::new(options.selection.modifier),
                highlight,
                executor,
                queue: InputQueue::new(),
                keybindings,
                discard_stale: options.selection.discard_stale_results,
                point_count,
                pending: Vec::new(),
                newest_generation: None,
                last_count: None,
                last_error: None,
            },
            reader,
        ))
    }

    /// The gesture state machine.
    #[must_use]
    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    /// Receive every gesture transition from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<GestureEvent> {
        self.gesture.subscribe()
    }

    /// The highlight writer (uniform and colors).
    #[must_use]
    pub fn highlight(&self) -> &HighlightCoordinator {
        &self.highlight
    }

    /// On-screen drag box and its colors while a drag is active.
    #[must_use]
    pub fn overlay(&self) -> Option<DragOverlay> {
        self.highlight.overlay(&self.gesture)
    }

    /// Producer handle for platform input callbacks.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.queue.sender()
    }

    /// Number of leading points that queries scan.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Restrict queries to the first `count` points (e.g. while a cloud is
    /// still streaming in). Clamped to the store size.
    pub fn set_point_count(&mut self, count: usize) {
        let available = self.executor.store().len();
        if count > available {
            log::debug!("point count {count} clamped to {available}");
        }
        self.point_count = count.min(available);
    }

    /// Queries issued but not yet reported.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Matched count of the most recently applied result.
    #[must_use]
    pub fn last_count(&self) -> Option<usize> {
        self.last_count
    }

    /// Most recent query failure, cleared by the next applied result.
    #[must_use]
    pub fn last_error(&self) -> Option<&SelectionError> {
        self.last_error.as_ref()
    }

    /// Feed one input event.
    ///
    /// Camera controls are disabled on entering a drag and re-enabled on
    /// leaving it. Releasing a drag issues a query against the matrix
    /// captured at release.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        frame: &FrameContext,
        controls: &mut dyn CameraControls,
    ) -> Option<GestureEvent> {
        let was_enabled = self.gesture.controls_enabled();
        let transition = match event {
            InputEvent::KeyPressed { key } => self.handle_key(key),
            _ => self.gesture.handle_event(event, frame),
        };

        if let Some(transition) = &transition {
            self.apply(transition);
        }

        let enabled = self.gesture.controls_enabled();
        if enabled != was_enabled {
            controls.set_enabled(enabled);
        }
        transition
    }

    /// Drain the input queue through [`Self::handle_event`].
    pub fn pump(
        &mut self,
        frame: &FrameContext,
        controls: &mut dyn CameraControls,
    ) -> Vec<GestureEvent> {
        self.queue
            .drain()
            .iter()
            .filter_map(|event| self.handle_event(event, frame, controls))
            .collect()
    }

    /// Per-frame update: publish the live highlight and collect finished
    /// queries without blocking.
    pub fn update_frame(&mut self) -> Vec<SelectionReport> {
        self.highlight.update_frame(&self.gesture);

        let mut finished = Vec::new();
        for pending in &mut self.pending {
            if let Some(result) = pending.try_recv() {
                finished.push(result);
            }
        }
        self.pending.retain(|p| !p.is_finished());

        finished
            .into_iter()
            .filter_map(|result| self.report(result))
            .collect()
    }

    /// Block until every in-flight query has finished.
    pub fn wait_for_results(&mut self) -> Vec<SelectionReport> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(PendingSelection::wait)
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|result| self.report(result))
            .collect()
    }

    /// Reissue the query for the locked rectangle and matrix.
    ///
    /// Returns the new generation, or `None` when nothing is locked or the
    /// dispatch failed (see [`Self::last_error`]).
    pub fn retry_last(&mut self) -> Option<u64> {
        let GestureState::Locked {
            rect,
            projection_view,
            ..
        } = self.gesture.state()
        else {
            return None;
        };
        let query = SelectionQuery::from_rect(rect, *projection_view);
        log::debug!("retrying locked selection");
        self.issue(query)
    }

    fn handle_key(&mut self, key: &str) -> Option<GestureEvent> {
        match self.keybindings.lookup(key)? {
            KeyAction::ClearSelection => self.gesture.clear(),
            KeyAction::RetrySelection => {
                let _ = self.retry_last();
                None
            }
        }
    }

    fn apply(&mut self, transition: &GestureEvent) {
        self.highlight.apply(transition);
        if let GestureEvent::DragEnd {
            rect,
            projection_view,
            ..
        } = transition
        {
            let _ = self
                .issue(SelectionQuery::from_rect(rect, *projection_view));
        }
    }

    fn issue(&mut self, query: SelectionQuery) -> Option<u64> {
        match self.executor.select(self.point_count, query) {
            Ok(pending) => {
                let generation = pending.generation();
                self.newest_generation = Some(generation);
                self.pending.push(pending);
                Some(generation)
            }
            Err(e) => {
                log::error!("selection query not dispatched: {e}");
                self.last_error = Some(e);
                None
            }
        }
    }

    fn report(
        &mut self,
        result: Result<SelectionOutcome, SelectionError>,
    ) -> Option<SelectionReport> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.last_error = Some(e);
                return None;
            }
        };

        let stale = self
            .newest_generation
            .is_some_and(|newest| outcome.generation < newest);
        if stale && self.discard_stale {
            log::debug!("dropping stale result of query {}", outcome.generation);
            return None;
        }

        log::info!(
            "selected {} points in {:?}{}",
            outcome.count(),
            outcome.elapsed,
            if stale { " (stale)" } else { "" }
        );
        self.last_count = Some(outcome.count());
        self.last_error = None;
        Some(SelectionReport {
            generation: outcome.generation,
            indices: outcome.indices,
            stale,
            elapsed: outcome.elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::input::{Modifiers, MouseButton};
    use crate::selection::SurfaceRect;

    #[derive(Default)]
    struct RecordingControls {
        calls: Vec<bool>,
    }

    impl CameraControls for RecordingControls {
        fn set_enabled(&mut self, enabled: bool) {
            self.calls.push(enabled);
        }

        fn projection_view(&self) -> Mat4 {
            Mat4::IDENTITY
        }
    }

    /// Points that the identity matrix maps to screen (s, s) for
    /// s in 0.1, 0.4, 0.6, 0.9.
    fn diagonal_store() -> PointStore {
        let points: Vec<Vec3> = [0.1f32, 0.4, 0.6, 0.9]
            .iter()
            .map(|&s| {
                let w = 2.0f32.mul_add(s, -1.0);
                Vec3::new(w, w, 0.5)
            })
            .collect();
        PointStore::from_points(&points).unwrap()
    }

    fn session(options: &Options) -> (SelectionSession, HighlightReader) {
        SelectionSession::new(diagonal_store(), options).unwrap()
    }

    fn options(workers: usize) -> Options {
        let mut options = Options::default();
        options.selection.worker_count = workers;
        options
    }

    fn frame() -> FrameContext {
        FrameContext {
            surface: SurfaceRect::from_size(100.0, 100.0),
            projection_view: Mat4::IDENTITY,
        }
    }

    fn left(pressed: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    fn key(name: &str) -> InputEvent {
        InputEvent::KeyPressed {
            key: name.to_owned(),
        }
    }

    /// Shift-drag from the bottom-left corner to the surface center:
    /// normalized rectangle (0, 0)-(0.5, 0.5).
    fn quadrant_drag() -> Vec<InputEvent> {
        vec![
            InputEvent::ModifiersChanged(Modifiers::SHIFT),
            moved(0.0, 100.0),
            left(true),
            moved(50.0, 50.0),
            left(false),
        ]
    }

    fn feed(
        session: &mut SelectionSession,
        controls: &mut RecordingControls,
        events: &[InputEvent],
    ) -> Vec<GestureEvent> {
        events
            .iter()
            .filter_map(|e| session.handle_event(e, &frame(), controls))
            .collect()
    }

    #[test]
    fn quadrant_drag_selects_first_two_points() {
        let (mut session, mut reader) = session(&options(3));
        let mut controls = RecordingControls::default();

        let transitions = feed(&mut session, &mut controls, &quadrant_drag());
        assert_eq!(transitions.len(), 3);
        assert!(matches!(
            transitions.last(),
            Some(GestureEvent::DragEnd { .. })
        ));
        assert_eq!(controls.calls, vec![false, true]);
        assert_eq!(session.in_flight(), 1);

        let reports = session.wait_for_results();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].indices, vec![0, 1]);
        assert!(!reports[0].stale);
        assert_eq!(session.last_count(), Some(2));
        assert!(session.last_error().is_none());

        let uniform = reader.read();
        assert_eq!(uniform.locked, 1);
        assert_eq!(uniform.rect_max, [0.5, 0.5]);
    }

    #[test]
    fn results_arrive_through_frame_polling() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let _ = feed(&mut session, &mut controls, &quadrant_drag());

        let mut reports = Vec::new();
        for _ in 0..10_000 {
            reports.extend(session.update_frame());
            if session.in_flight() == 0 {
                break;
            }
            std::thread::yield_now();
        }
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].count(), 2);
    }

    #[test]
    fn click_without_drag_selects_nothing() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let events = [
            InputEvent::ModifiersChanged(Modifiers::SHIFT),
            moved(10.0, 10.0),
            left(true),
            left(false),
        ];
        let _ = feed(&mut session, &mut controls, &events);

        assert!(session.gesture().is_locked());
        let reports = session.wait_for_results();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].indices.is_empty());
        assert_eq!(session.last_count(), Some(0));
    }

    #[test]
    fn clear_mid_drag_issues_no_query() {
        let (mut session, mut reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let events = [
            InputEvent::ModifiersChanged(Modifiers::SHIFT),
            moved(0.0, 100.0),
            left(true),
            moved(50.0, 50.0),
            key("Escape"),
            left(false),
        ];
        let transitions = feed(&mut session, &mut controls, &events);

        assert_eq!(transitions.last(), Some(&GestureEvent::Clear));
        assert_eq!(*session.gesture().state(), GestureState::Idle);
        assert_eq!(controls.calls, vec![false, true]);
        assert_eq!(session.in_flight(), 0);
        assert!(session.wait_for_results().is_empty());
        assert!(!reader.read().is_active());
    }

    #[test]
    fn superseded_result_is_reported_stale() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let _ = feed(&mut session, &mut controls, &quadrant_drag());
        let _ = feed(&mut session, &mut controls, &quadrant_drag());

        let reports = session.wait_for_results();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].stale);
        assert!(!reports[1].stale);
        assert_eq!(reports[0].indices, reports[1].indices);
    }

    #[test]
    fn stale_results_can_be_discarded() {
        let mut opts = options(2);
        opts.selection.discard_stale_results = true;
        let (mut session, _reader) = session(&opts);
        let mut controls = RecordingControls::default();
        let _ = feed(&mut session, &mut controls, &quadrant_drag());
        let _ = feed(&mut session, &mut controls, &quadrant_drag());

        let reports = session.wait_for_results();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].generation, 1);
    }

    #[test]
    fn retry_key_reissues_locked_query() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let _ = feed(&mut session, &mut controls, &quadrant_drag());
        let first = session.wait_for_results();

        let _ = feed(&mut session, &mut controls, &[key("KeyR")]);
        let second = session.wait_for_results();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].generation, first[0].generation + 1);
        assert_eq!(second[0].indices, first[0].indices);
    }

    #[test]
    fn retry_without_lock_does_nothing() {
        let (mut session, _reader) = session(&options(2));
        assert_eq!(session.retry_last(), None);
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn point_count_limits_the_scan() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        session.set_point_count(1);
        let _ = feed(&mut session, &mut controls, &quadrant_drag());
        assert_eq!(session.wait_for_results()[0].indices, vec![0]);

        session.set_point_count(99);
        assert_eq!(session.point_count(), 4);
    }

    #[test]
    fn queued_input_from_another_thread() {
        let (mut session, _reader) = session(&options(2));
        let mut controls = RecordingControls::default();
        let sender = session.input_sender();
        let producer = std::thread::spawn(move || {
            for event in quadrant_drag() {
                assert!(sender.send(event));
            }
        });
        producer.join().unwrap();

        let transitions = session.pump(&frame(), &mut controls);
        assert_eq!(transitions.len(), 3);
        assert_eq!(session.wait_for_results()[0].indices, vec![0, 1]);
    }

    #[test]
    fn subscribers_see_transitions() {
        let (mut session, _reader) = session(&options(1));
        let events = session.subscribe();
        let mut controls = RecordingControls::default();
        let _ = feed(&mut session, &mut controls, &quadrant_drag());
        assert_eq!(events.try_iter().count(), 3);
    }
}
