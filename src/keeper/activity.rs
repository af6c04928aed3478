use crate::catalog::Page;
use crate::keeper::surface::ClickObservation;
use std::time::{Duration, Instant};

/// How an observed click was accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Unverifiable origin; no trust flag and no plausible location.
    Ignored,
    /// Consumed against the pending synthetic-click counter.
    Synthetic,
    /// Counts as user activity and resets the idle clock.
    Genuine,
}

/// Tracks the wall-clock time of the last genuine user interaction while
/// never being fooled by the keeper's own clicks and navigation.
///
/// The acting flag is a depth counter: the Assist Loop and the Army
/// Assistant may hold it at the same time without releasing each other's
/// hold.
#[derive(Debug)]
pub struct ActivityMonitor {
    last_activity: Instant,
    signal_seen: bool,
    acting_depth: u32,
    pending_clicks: u32,
    last_page: Option<Page>,
    /// Permit idling out when the environment never delivers input
    /// signals. Off by default: no signal means not idle.
    pub idle_without_signal: bool,
}

impl ActivityMonitor {
    pub fn new(now: Instant) -> Self {
        Self {
            last_activity: now,
            signal_seen: false,
            acting_depth: 0,
            pending_clicks: 0,
            last_page: None,
            idle_without_signal: false,
        }
    }

    pub fn observe_click(&mut self, observation: ClickObservation, now: Instant) -> Attribution {
        if !observation.trusted && observation.location.is_none() {
            return Attribution::Ignored;
        }
        if self.is_acting() && self.pending_clicks > 0 {
            self.pending_clicks -= 1;
            return Attribution::Synthetic;
        }
        self.record_activity(now);
        Attribution::Genuine
    }

    /// Keypresses are always user-initiated.
    pub fn observe_keypress(&mut self, now: Instant) {
        self.record_activity(now);
    }

    /// Page switches not caused by the keeper count as activity. Switches
    /// observed while acting still update the remembered page so the next
    /// genuine switch is compared against the right one.
    pub fn observe_page(&mut self, page: Page, now: Instant) {
        let previous = self.last_page.replace(page);
        if self.is_acting() {
            return;
        }
        if let Some(previous) = previous {
            if previous != page {
                self.record_activity(now);
            }
        }
    }

    /// Register a programmatic click immediately before it is issued so
    /// the resulting observation is attributed to the keeper.
    pub fn note_pending_click(&mut self) {
        self.pending_clicks += 1;
    }

    /// Withdraw a registered click that could not be issued after all
    /// (control gone or disabled), so it cannot absorb a later genuine
    /// click.
    pub fn rescind_pending_click(&mut self) {
        self.pending_clicks = self.pending_clicks.saturating_sub(1);
    }

    pub fn pending_clicks(&self) -> u32 {
        self.pending_clicks
    }

    pub fn begin_action(&mut self) {
        self.acting_depth += 1;
    }

    pub fn end_action(&mut self) {
        self.acting_depth = self.acting_depth.saturating_sub(1);
    }

    pub fn is_acting(&self) -> bool {
        self.acting_depth > 0
    }

    /// Run one automated action with the acting flag held; the flag is
    /// released on every exit path, `Err` included.
    pub fn while_acting<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_action();
        let out = f(self);
        self.end_action();
        out
    }

    /// Strict: false at exactly `threshold` elapsed. Without any observed
    /// input signal the answer is false unless `idle_without_signal` is
    /// set.
    pub fn is_idle_for(&self, threshold: Duration, now: Instant) -> bool {
        if !self.signal_seen && !self.idle_without_signal {
            return false;
        }
        now.saturating_duration_since(self.last_activity) > threshold
    }

    pub fn idle_duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn has_input_signal(&self) -> bool {
        self.signal_seen
    }

    fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
        self.signal_seen = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trusted_click() -> ClickObservation {
        ClickObservation {
            trusted: true,
            location: Some((10, 10)),
        }
    }

    fn synthetic_click() -> ClickObservation {
        ClickObservation {
            trusted: false,
            location: Some((10, 10)),
        }
    }

    #[test]
    fn idle_threshold_is_strict() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        let threshold = Duration::from_secs(60);
        assert!(!monitor.is_idle_for(threshold, start + threshold));
        assert!(monitor.is_idle_for(threshold, start + threshold + Duration::from_millis(1)));
    }

    #[test]
    fn fails_closed_without_any_input_signal() {
        let start = Instant::now();
        let monitor = ActivityMonitor::new(start);
        assert!(!monitor.is_idle_for(Duration::from_secs(1), start + Duration::from_secs(3600)));
    }

    #[test]
    fn idle_without_signal_opt_in() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.idle_without_signal = true;
        assert!(monitor.is_idle_for(Duration::from_secs(1), start + Duration::from_secs(2)));
    }

    #[test]
    fn unverifiable_clicks_are_ignored() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let attribution = monitor.observe_click(
            ClickObservation {
                trusted: false,
                location: None,
            },
            start + Duration::from_secs(5),
        );
        assert_eq!(attribution, Attribution::Ignored);
        assert!(!monitor.has_input_signal());
    }

    #[test]
    fn pending_clicks_absorb_exactly_n_observations() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);

        monitor.begin_action();
        monitor.note_pending_click();
        monitor.note_pending_click();
        let later = start + Duration::from_secs(30);
        assert_eq!(
            monitor.observe_click(synthetic_click(), later),
            Attribution::Synthetic
        );
        assert_eq!(
            monitor.observe_click(synthetic_click(), later),
            Attribution::Synthetic
        );
        // Third click during the same window is the user's.
        assert_eq!(
            monitor.observe_click(trusted_click(), later),
            Attribution::Genuine
        );
        monitor.end_action();

        assert_eq!(monitor.pending_clicks(), 0);
        assert_eq!(monitor.idle_duration(later + Duration::from_secs(1)), Duration::from_secs(1));
    }

    #[test]
    fn pending_clicks_only_consumed_while_acting() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.note_pending_click();
        assert_eq!(
            monitor.observe_click(trusted_click(), start + Duration::from_secs(1)),
            Attribution::Genuine
        );
        assert_eq!(monitor.pending_clicks(), 1);
    }

    #[test]
    fn acting_depth_survives_interleaved_holds() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.begin_action();
        monitor.while_acting(|m| assert!(m.is_acting()));
        // The outer hold is still in place after the scoped one releases.
        assert!(monitor.is_acting());
        monitor.end_action();
        assert!(!monitor.is_acting());
    }

    #[test]
    fn while_acting_releases_on_error_paths() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let result: Result<(), &str> = monitor.while_acting(|_| Err("boom"));
        assert!(result.is_err());
        assert!(!monitor.is_acting());
    }

    #[test]
    fn page_switches_while_acting_are_swallowed() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);

        monitor.observe_page(Page::Build, start);
        monitor.begin_action();
        monitor.observe_page(Page::Army, start + Duration::from_secs(10));
        monitor.end_action();
        assert_eq!(monitor.idle_duration(start + Duration::from_secs(10)), Duration::from_secs(10));

        // A genuine switch afterwards resets the clock, compared against
        // the page the keeper left the surface on.
        monitor.observe_page(Page::Magic, start + Duration::from_secs(20));
        assert_eq!(monitor.idle_duration(start + Duration::from_secs(20)), Duration::ZERO);
    }

    #[test]
    fn repeated_observation_of_same_page_is_not_activity() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        monitor.observe_page(Page::Build, start);
        monitor.observe_page(Page::Build, start + Duration::from_secs(30));
        assert_eq!(monitor.idle_duration(start + Duration::from_secs(30)), Duration::from_secs(30));
    }
}
