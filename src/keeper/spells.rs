use crate::keeper::activity::ActivityMonitor;
use crate::keeper::surface::{Actions, Perception};
use crate::log::MessageLog;
use std::time::Instant;

/// Active/total spell counts for the stat display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellTally {
    pub active: u32,
    pub total: u32,
}

pub fn spell_tally(surface: &impl Perception) -> SpellTally {
    let spells = surface.spells();
    SpellTally {
        active: spells.iter().filter(|spell| spell.active).count() as u32,
        total: spells.len() as u32,
    }
}

/// Cast every castable spell under one scoped automated action. Returns
/// how many casts went out; per-spell failures are logged and skipped.
pub fn cast_all<S: Perception + Actions>(
    monitor: &mut ActivityMonitor,
    surface: &mut S,
    now: Instant,
    log: &mut MessageLog,
) -> u32 {
    let targets: Vec<String> = surface
        .spells()
        .into_iter()
        .filter(|spell| spell.castable && !spell.active)
        .map(|spell| spell.id)
        .collect();
    let cast = monitor.while_acting(|m| {
        let mut cast = 0;
        for id in &targets {
            m.note_pending_click();
            match surface.cast_spell(id) {
                Ok(()) => cast += 1,
                Err(err) => {
                    m.rescind_pending_click();
                    log.debug(format!("cannot cast {id}: {err}"));
                }
            }
        }
        for observation in surface.take_click_observations() {
            m.observe_click(observation, now);
        }
        cast
    });
    if cast > 0 {
        log.info(format!("cast {cast} spells"));
    }
    cast
}

/// Dismiss every active spell under one scoped automated action.
pub fn dismiss_all<S: Perception + Actions>(
    monitor: &mut ActivityMonitor,
    surface: &mut S,
    now: Instant,
    log: &mut MessageLog,
) -> u32 {
    let targets: Vec<String> = surface
        .spells()
        .into_iter()
        .filter(|spell| spell.active)
        .map(|spell| spell.id)
        .collect();
    let dismissed = monitor.while_acting(|m| {
        let mut dismissed = 0;
        for id in &targets {
            m.note_pending_click();
            match surface.dismiss_spell(id) {
                Ok(()) => dismissed += 1,
                Err(err) => {
                    m.rescind_pending_click();
                    log.debug(format!("cannot dismiss {id}: {err}"));
                }
            }
        }
        for observation in surface.take_click_observations() {
            m.observe_click(observation, now);
        }
        dismissed
    });
    if dismissed > 0 {
        log.info(format!("dismissed {dismissed} spells"));
    }
    dismissed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::sim::realm::Realm;
    use std::time::Duration;

    #[test]
    fn cast_all_activates_every_spell_without_resetting_idle() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        let when = start + Duration::from_secs(200);
        let cast = cast_all(&mut monitor, &mut realm, when, &mut log);
        assert_eq!(cast as usize, catalog::SPELLS.len());

        let tally = spell_tally(&realm);
        assert_eq!(tally.active, tally.total);
        assert_eq!(monitor.pending_clicks(), 0);
        assert_eq!(monitor.idle_duration(when), Duration::from_secs(200));
    }

    #[test]
    fn dismiss_all_reverses_cast_all() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        cast_all(&mut monitor, &mut realm, start, &mut log);
        let dismissed = dismiss_all(&mut monitor, &mut realm, start, &mut log);
        assert_eq!(dismissed as usize, catalog::SPELLS.len());
        assert_eq!(spell_tally(&realm).active, 0);
    }

    #[test]
    fn cast_all_is_a_no_op_when_everything_is_active() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        cast_all(&mut monitor, &mut realm, start, &mut log);
        assert_eq!(cast_all(&mut monitor, &mut realm, start, &mut log), 0);
    }
}
