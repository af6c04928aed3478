use crate::keeper::activity::ActivityMonitor;
use crate::keeper::surface::{ActionError, Actions, Perception};
use std::time::Instant;

/// Issue one synthetic click with the acting flag held: the click is
/// registered with the pending counter before it goes out, and the
/// observations it produces are consumed inside the same scope.
pub fn click<S: Actions>(
    monitor: &mut ActivityMonitor,
    surface: &mut S,
    now: Instant,
    act: impl FnOnce(&mut S) -> Result<(), ActionError>,
) -> Result<(), ActionError> {
    monitor.while_acting(|m| {
        m.note_pending_click();
        let result = act(surface);
        if result.is_err() {
            // The registered click never went out.
            m.rescind_pending_click();
        }
        for observation in surface.take_click_observations() {
            m.observe_click(observation, now);
        }
        result
    })
}

/// Navigate with the acting flag held so the resulting page switch is not
/// mistaken for the user changing tabs.
pub fn navigate<S: Perception + Actions>(
    monitor: &mut ActivityMonitor,
    surface: &mut S,
    now: Instant,
    act: impl FnOnce(&mut S) -> Result<(), ActionError>,
) -> Result<(), ActionError> {
    monitor.while_acting(|m| {
        let result = act(surface);
        m.observe_page(surface.active_page(), now);
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Page;
    use crate::sim::realm::Realm;
    use std::time::Duration;

    #[test]
    fn successful_click_leaves_no_pending_residue() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        let mut realm = Realm::prosperous();
        realm.page = Page::Build;

        let when = start + Duration::from_secs(120);
        click(&mut monitor, &mut realm, when, |r| r.build("farm")).unwrap();

        assert_eq!(monitor.pending_clicks(), 0);
        assert!(!monitor.is_acting());
        // The synthetic click did not reset the idle clock.
        assert_eq!(monitor.idle_duration(when), Duration::from_secs(120));
    }

    #[test]
    fn failed_click_rescinds_its_registration() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut realm = Realm::prosperous();
        realm.page = Page::Build;

        let result = click(&mut monitor, &mut realm, start, |r| r.build("no_such_building"));
        assert!(result.is_err());
        assert_eq!(monitor.pending_clicks(), 0);
        assert!(!monitor.is_acting());
    }

    #[test]
    fn keeper_navigation_is_not_user_activity() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        monitor.observe_page(Page::Build, start);
        let mut realm = Realm::prosperous();

        let when = start + Duration::from_secs(90);
        navigate(&mut monitor, &mut realm, when, |r| r.open_page(Page::Army)).unwrap();

        assert_eq!(monitor.idle_duration(when), Duration::from_secs(90));
        // The follow-up observation from the host environment sees the
        // same page and stays quiet too.
        monitor.observe_page(Page::Army, when);
        assert_eq!(monitor.idle_duration(when), Duration::from_secs(90));
    }
}
