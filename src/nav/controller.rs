use std::{
    collections::HashMap,
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use super::NavigationState;
use crate::{config::ViewerConfig, model::SectionRegistry};

/// The scrollable content area.
pub trait ContentPane {
    /// Smooth-scroll the anchor's top edge to the top of the pane. Completion is not reported.
    fn scroll_into_view(&mut self, anchor: &str);
}

/// Viewport intersection monitor. Ratios for observed anchors are pushed back to the
/// controller as [`VisibilityUpdate`]s.
pub trait ViewportObserver {
    fn observe(&mut self, anchor: &str);

    fn unobserve(&mut self, anchor: &str);
}

/// Fraction of an anchor currently inside the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityUpdate {
    pub anchor: String,
    pub ratio: f64,
}

impl VisibilityUpdate {
    pub fn new(anchor: impl Into<String>, ratio: f64) -> Self {
        Self {
            anchor: anchor.into(),
            ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The section became active and the pane was asked to scroll to it.
    Navigated,
    /// No section has that id; nothing changed.
    NotFound,
}

#[derive(Debug)]
struct PendingScroll {
    target: String,
    deadline: Instant,
}

/// Keeps [`NavigationState::active_section_id`] in line with both sidebar clicks and what
/// is visible in the content pane.
///
/// Clicks set the active section right away and scroll to it. While that scroll is in
/// flight, visibility batches can't move the active section unless they agree with the
/// target; the hold lifts as soon as they do, or once the settle window has passed.
pub struct NavigationController {
    /// Anchors in navigation order, used to break ties between equal ratios.
    anchors: Vec<String>,
    observed: Vec<String>,
    ratios: HashMap<String, f64>,
    threshold: f64,
    settle: Duration,
    pending: Option<PendingScroll>,
    pane: Box<dyn ContentPane>,
    observer: Box<dyn ViewportObserver>,
}

impl NavigationController {
    pub fn new(
        registry: &SectionRegistry,
        config: &ViewerConfig,
        pane: Box<dyn ContentPane>,
        observer: Box<dyn ViewportObserver>,
    ) -> Self {
        Self {
            anchors: registry.ids().map(String::from).collect(),
            observed: Vec::new(),
            ratios: HashMap::new(),
            threshold: config.visibility_threshold,
            settle: config.scroll_settle(),
            pending: None,
            pane,
            observer,
        }
    }

    /// Start observing every section anchor that isn't observed yet.
    pub fn attach(&mut self) {
        for anchor in &self.anchors {
            if !self.observed.contains(anchor) {
                self.observer.observe(anchor);
                self.observed.push(anchor.clone());
            }
        }
    }

    /// Stop observing an anchor whose section went away.
    pub fn detach(&mut self, anchor: &str) {
        let Some(index) = self.observed.iter().position(|observed| observed == anchor) else {
            return;
        };

        self.observed.remove(index);
        self.observer.unobserve(anchor);
        self.ratios.remove(anchor);

        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.target == anchor)
        {
            self.pending = None;
        }
    }

    pub fn is_observing(&self, anchor: &str) -> bool {
        self.observed.iter().any(|observed| observed == anchor)
    }

    /// Whether observation is currently held back by a programmatic scroll.
    pub fn is_settling(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| now < pending.deadline)
    }

    /// Explicit navigation from the sidebar or mobile menu.
    pub fn navigate(&mut self, state: &mut NavigationState, id: &str, now: Instant) -> NavOutcome {
        if !self.anchors.iter().any(|anchor| anchor == id) {
            warn!(section = id, "Navigation to an unknown section");
            return NavOutcome::NotFound;
        }

        debug!(from = state.active_section_id(), to = id, "Navigating to section");

        state.set_active(id);
        self.pane.scroll_into_view(id);
        self.pending = Some(PendingScroll {
            target: String::from(id),
            deadline: now + self.settle,
        });

        NavOutcome::Navigated
    }

    /// Apply one batch of visibility updates. All entries are recorded before a single
    /// decision is made. Returns the new active section when it changed.
    pub fn observe_batch<I>(
        &mut self,
        state: &mut NavigationState,
        updates: I,
        now: Instant,
    ) -> Option<String>
    where
        I: IntoIterator<Item = VisibilityUpdate>,
    {
        for update in updates {
            if !self.is_observing(&update.anchor) {
                debug!(anchor = %update.anchor, "Ignoring visibility of an unobserved anchor");
                continue;
            }

            if !update.ratio.is_finite() {
                continue;
            }

            self.ratios
                .insert(update.anchor, update.ratio.clamp(0.0, 1.0));
        }

        let candidate = self.most_visible().map(String::from);

        if let Some(pending) = self.pending.take() {
            if candidate.as_deref() == Some(pending.target.as_str()) {
                debug!(section = %pending.target, "Viewport settled on navigation target");
                return activate(state, &pending.target);
            }

            if now < pending.deadline {
                debug!(
                    section = %pending.target,
                    candidate = ?candidate,
                    "Holding navigation target while scrolling"
                );
                self.pending = Some(pending);
                return None;
            }

            debug!(section = %pending.target, "Scroll settle window elapsed");
        }

        activate(state, &candidate?)
    }

    /// Drain every update currently queued on `updates` and apply them as one batch.
    pub fn drain(
        &mut self,
        state: &mut NavigationState,
        updates: &Receiver<VisibilityUpdate>,
        now: Instant,
    ) -> Option<String> {
        self.observe_batch(state, updates.try_iter(), now)
    }

    /// The observed anchor with the greatest ratio above the threshold. Equal ratios go
    /// to the anchor that comes first in navigation order.
    pub fn most_visible(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;

        for anchor in &self.anchors {
            let Some(&ratio) = self.ratios.get(anchor) else {
                continue;
            };

            if ratio <= self.threshold {
                continue;
            }

            if best.is_some_and(|(_, best_ratio)| ratio <= best_ratio) {
                continue;
            }

            best = Some((anchor, ratio));
        }

        best.map(|(anchor, _)| anchor)
    }
}

fn activate(state: &mut NavigationState, id: &str) -> Option<String> {
    if state.is_active(id) {
        return None;
    }

    debug!(from = state.active_section_id(), to = id, "Active section follows viewport");
    state.set_active(id);

    Some(String::from(id))
}

impl Drop for NavigationController {
    fn drop(&mut self) {
        for anchor in self.observed.drain(..) {
            self.observer.unobserve(&anchor);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Section;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl ContentPane for Recorder {
        fn scroll_into_view(&mut self, anchor: &str) {
            self.0.borrow_mut().push(String::from(anchor));
        }
    }

    #[derive(Clone, Default)]
    struct Observed(Rc<RefCell<Vec<String>>>);

    impl ViewportObserver for Observed {
        fn observe(&mut self, anchor: &str) {
            self.0.borrow_mut().push(String::from(anchor));
        }

        fn unobserve(&mut self, anchor: &str) {
            self.0.borrow_mut().retain(|observed| observed != anchor);
        }
    }

    fn registry() -> SectionRegistry {
        let sections = ["home", "auth", "energy-futures", "rec"]
            .into_iter()
            .map(|id| Section::new(id, id, format!("# {id}")))
            .collect();

        SectionRegistry::new(sections).expect("registry should be valid")
    }

    fn setup() -> (NavigationController, NavigationState, Recorder, Observed) {
        let registry = registry();
        let pane = Recorder::default();
        let observer = Observed::default();
        let mut controller = NavigationController::new(
            &registry,
            &ViewerConfig::default(),
            Box::new(pane.clone()),
            Box::new(observer.clone()),
        );
        controller.attach();

        (controller, NavigationState::new(&registry, "home"), pane, observer)
    }

    fn batch(entries: &[(&str, f64)]) -> Vec<VisibilityUpdate> {
        entries
            .iter()
            .map(|(anchor, ratio)| VisibilityUpdate::new(*anchor, *ratio))
            .collect()
    }

    #[test]
    fn picks_the_most_visible_section_above_threshold() {
        let (mut controller, mut state, ..) = setup();
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("home", 0.2), ("auth", 0.6)]),
            Instant::now(),
        );

        assert_eq!(Some(String::from("auth")), changed);
        assert_eq!("auth", state.active_section_id());
    }

    #[test]
    fn keeps_active_section_when_nothing_passes_threshold() {
        let (mut controller, mut state, ..) = setup();
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("home", 0.1), ("auth", 0.3), ("rec", 0.25)]),
            Instant::now(),
        );

        assert_eq!(None, changed);
        assert_eq!("home", state.active_section_id());
    }

    #[test]
    fn equal_ratios_go_to_the_earlier_section() {
        let (mut controller, mut state, ..) = setup();
        controller.observe_batch(
            &mut state,
            batch(&[("rec", 0.5), ("auth", 0.5)]),
            Instant::now(),
        );

        assert_eq!("auth", state.active_section_id());
    }

    #[test]
    fn aggregates_a_batch_before_deciding() {
        let (mut controller, mut state, ..) = setup();

        // The later entry for the same anchor wins, and only one transition happens.
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("auth", 0.9), ("energy-futures", 0.5), ("auth", 0.1)]),
            Instant::now(),
        );

        assert_eq!(Some(String::from("energy-futures")), changed);
    }

    #[test]
    fn ratios_persist_between_batches() {
        let (mut controller, mut state, ..) = setup();
        let now = Instant::now();

        controller.observe_batch(&mut state, batch(&[("auth", 0.8)]), now);
        controller.observe_batch(&mut state, batch(&[("rec", 0.4)]), now);

        assert_eq!("auth", state.active_section_id());
    }

    #[test]
    fn navigation_scrolls_and_activates_immediately() {
        let (mut controller, mut state, pane, _) = setup();

        let outcome = controller.navigate(&mut state, "rec", Instant::now());

        assert_eq!(NavOutcome::Navigated, outcome);
        assert_eq!("rec", state.active_section_id());
        assert_eq!(vec![String::from("rec")], *pane.0.borrow());
    }

    #[test]
    fn unknown_navigation_target_changes_nothing() {
        let (mut controller, mut state, pane, _) = setup();

        let outcome = controller.navigate(&mut state, "pricing", Instant::now());

        assert_eq!(NavOutcome::NotFound, outcome);
        assert_eq!("home", state.active_section_id());
        assert!(pane.0.borrow().is_empty());
    }

    #[test]
    fn observation_never_scrolls() {
        let (mut controller, mut state, pane, _) = setup();
        controller.observe_batch(&mut state, batch(&[("auth", 0.9)]), Instant::now());

        assert!(pane.0.borrow().is_empty());
    }

    #[test]
    fn transient_visibility_during_scroll_is_held_back() {
        let (mut controller, mut state, ..) = setup();
        let start = Instant::now();

        controller.navigate(&mut state, "rec", start);
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("home", 0.1), ("auth", 0.7)]),
            start + Duration::from_millis(100),
        );

        assert_eq!(None, changed);
        assert_eq!("rec", state.active_section_id());
        assert!(controller.is_settling(start + Duration::from_millis(100)));
    }

    #[test]
    fn converges_on_the_navigation_target() {
        let (mut controller, mut state, ..) = setup();
        let start = Instant::now();

        controller.navigate(&mut state, "rec", start);
        controller.observe_batch(
            &mut state,
            batch(&[("auth", 0.7)]),
            start + Duration::from_millis(100),
        );
        controller.observe_batch(
            &mut state,
            batch(&[("auth", 0.0), ("energy-futures", 0.6)]),
            start + Duration::from_millis(250),
        );
        controller.observe_batch(
            &mut state,
            batch(&[("energy-futures", 0.1), ("rec", 0.9)]),
            start + Duration::from_millis(400),
        );

        assert_eq!("rec", state.active_section_id());
        assert!(!controller.is_settling(start + Duration::from_millis(400)));

        // Once settled, observation drives the state again.
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("rec", 0.2), ("energy-futures", 0.8)]),
            start + Duration::from_millis(500),
        );

        assert_eq!(Some(String::from("energy-futures")), changed);
    }

    #[test]
    fn observation_resumes_after_settle_window() {
        let (mut controller, mut state, ..) = setup();
        let start = Instant::now();

        controller.navigate(&mut state, "rec", start);
        let changed = controller.observe_batch(
            &mut state,
            batch(&[("energy-futures", 0.8), ("rec", 0.2)]),
            start + Duration::from_secs(2),
        );

        assert_eq!(Some(String::from("energy-futures")), changed);
    }

    #[test]
    fn attach_observes_every_anchor_once() {
        let (mut controller, _, _, observer) = setup();
        controller.attach();

        assert_eq!(
            vec!["home", "auth", "energy-futures", "rec"],
            *observer.0.borrow()
        );
    }

    #[test]
    fn detached_anchors_are_released_and_ignored() {
        let (mut controller, mut state, _, observer) = setup();

        controller.detach("auth");
        let changed =
            controller.observe_batch(&mut state, batch(&[("auth", 0.9)]), Instant::now());

        assert_eq!(None, changed);
        assert!(!observer.0.borrow().iter().any(|anchor| anchor == "auth"));
    }

    #[test]
    fn dropping_the_controller_releases_all_anchors() {
        let (controller, _, _, observer) = setup();
        drop(controller);

        assert!(observer.0.borrow().is_empty());
    }

    #[test]
    fn drains_queued_updates_as_one_batch() {
        let (mut controller, mut state, ..) = setup();
        let (sender, receiver) = std::sync::mpsc::channel();

        sender
            .send(VisibilityUpdate::new("auth", 0.4))
            .expect("receiver alive");
        sender
            .send(VisibilityUpdate::new("energy-futures", 0.7))
            .expect("receiver alive");

        let changed = controller.drain(&mut state, &receiver, Instant::now());

        assert_eq!(Some(String::from("energy-futures")), changed);
        assert!(receiver.try_recv().is_err());
    }
}
