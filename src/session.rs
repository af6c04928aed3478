use crate::catalog::{ArmySubpage, BuildSubpage, Page};
use crate::keeper::activity::ActivityMonitor;
use crate::keeper::army::{ArmyAssistant, ArmyMode};
use crate::keeper::assist::{AssistLoop, TickOutcome, ASSIST_INTERVAL, CAP_THRESHOLD};
use crate::keeper::spells::{self, SpellTally};
use crate::keeper::surface::{
    resources_at_cap, Actions, ClickObservation, Perception, ResourceSnapshot,
};
use crate::log::MessageLog;
use crate::persist::Options;
use crate::sim::realm::Realm;
use rand::rngs::ThreadRng;
use rand::thread_rng;
use std::time::{Duration, Instant};

/// One page-lifetime of keeper state: the simulated realm, the activity
/// monitor shared by both controllers, the controllers themselves, and
/// the persisted options.
pub struct Session {
    pub realm: Realm,
    pub options: Options,
    pub monitor: ActivityMonitor,
    pub assist: AssistLoop,
    pub army: ArmyAssistant,
    pub log: MessageLog,
    pub last_outcome: Option<TickOutcome>,
    rng: ThreadRng,
    assist_timer: Duration,
    options_dirty: bool,
}

impl Session {
    pub fn new(options: Options, now: Instant) -> Self {
        let mut monitor = ActivityMonitor::new(now);
        monitor.idle_without_signal = options.act_without_input_signal;
        Self {
            realm: Realm::prosperous(),
            options,
            monitor,
            assist: AssistLoop::new(),
            army: ArmyAssistant::new(),
            log: MessageLog::new(),
            last_outcome: None,
            rng: thread_rng(),
            assist_timer: Duration::ZERO,
            options_dirty: false,
        }
    }

    pub fn update(&mut self, delta: Duration, now: Instant) {
        self.realm.advance(delta);

        // Host-environment signals: click observations left over from
        // manual interactions, and the currently active page.
        for observation in self.realm.take_click_observations() {
            self.monitor.observe_click(observation, now);
        }
        self.monitor.observe_page(self.realm.active_page(), now);

        self.army
            .step(now, &mut self.monitor, &mut self.realm, &mut self.log);

        self.assist_timer += delta;
        while self.assist_timer >= ASSIST_INTERVAL {
            self.assist_timer -= ASSIST_INTERVAL;
            let options = self.options.assist.clone();
            let outcome = self.assist.tick(
                now,
                &options,
                &mut self.monitor,
                &mut self.realm,
                &mut self.rng,
                &mut self.log,
            );
            if !matches!(outcome, TickOutcome::UserActive | TickOutcome::Disabled) {
                self.last_outcome = Some(outcome);
            }
        }
    }

    // Genuine input, forwarded by the terminal front end.

    pub fn note_user_key(&mut self, now: Instant) {
        self.monitor.observe_keypress(now);
    }

    pub fn note_user_click(&mut self, column: u16, row: u16, now: Instant) {
        self.monitor.observe_click(
            ClickObservation {
                trusted: true,
                location: Some((column, row)),
            },
            now,
        );
    }

    // Panel-facing operations.

    pub fn start_assist(&mut self) {
        if !self.options.assist.enabled {
            self.options.assist.enabled = true;
            self.options_dirty = true;
            self.log.info("assist mode enabled");
        }
    }

    pub fn stop_assist(&mut self) {
        if self.options.assist.enabled {
            self.options.assist.enabled = false;
            self.options_dirty = true;
            self.log.info("assist mode disabled");
        }
    }

    pub fn toggle_assist(&mut self) {
        if self.options.assist.enabled {
            self.stop_assist();
        } else {
            self.start_assist();
        }
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.monitor
            .is_idle_for(self.options.assist.idle_threshold(), now)
    }

    pub fn resources_at_cap(&self) -> Vec<ResourceSnapshot> {
        resources_at_cap(self.realm.resources(), CAP_THRESHOLD)
    }

    pub fn auto_scout_and_fight(&mut self, mode: ArmyMode) {
        self.army.start(mode, &mut self.monitor, &mut self.log);
    }

    pub fn stop_army_assistant(&mut self) {
        self.army.stop(&mut self.log);
    }

    pub fn cast_all_spells(&mut self, now: Instant) -> u32 {
        spells::cast_all(&mut self.monitor, &mut self.realm, now, &mut self.log)
    }

    pub fn dismiss_all_spells(&mut self, now: Instant) -> u32 {
        spells::dismiss_all(&mut self.monitor, &mut self.realm, now, &mut self.log)
    }

    pub fn spell_status(&self) -> SpellTally {
        spells::spell_tally(&self.realm)
    }

    // Options panel mutations.

    pub fn toggle_feature(&mut self, feature: AssistFeature) {
        let assist = &mut self.options.assist;
        let flag = match feature {
            AssistFeature::Buildings => &mut assist.buildings,
            AssistFeature::Research => &mut assist.research,
            AssistFeature::Prayers => &mut assist.prayers,
        };
        *flag = !*flag;
        self.options_dirty = true;
    }

    pub fn adjust_idle_seconds(&mut self, delta: i64) {
        let current = self.options.assist.idle_seconds as i64;
        self.options.assist.idle_seconds = (current + delta).clamp(10, 300) as u64;
        self.options_dirty = true;
    }

    pub fn toggle_idle_without_signal(&mut self) {
        self.options.act_without_input_signal = !self.options.act_without_input_signal;
        self.monitor.idle_without_signal = self.options.act_without_input_signal;
        self.options_dirty = true;
    }

    /// True once after any options change, for the front end to persist.
    pub fn take_options_dirty(&mut self) -> bool {
        std::mem::take(&mut self.options_dirty)
    }

    // Manual play against the simulated realm.

    pub fn user_open_page(&mut self, page: Page) {
        let _ = self.realm.open_page(page);
    }

    pub fn user_open_build_subpage(&mut self, subpage: BuildSubpage) {
        let _ = self.realm.open_page(Page::Build);
        let _ = self.realm.open_build_subpage(subpage);
    }

    pub fn user_build(&mut self, id: &str) {
        let _ = self.realm.open_page(Page::Build);
        match self.realm.build(id) {
            Ok(()) => self.log.info(format!("you built {id}")),
            Err(err) => self.log.info(format!("cannot build {id}: {err}")),
        }
    }

    pub fn user_send_scouts(&mut self) {
        let _ = self.realm.open_page(Page::Army);
        let _ = self.realm.open_army_subpage(ArmySubpage::Explore);
        match self.realm.send_scouts() {
            Ok(()) => self.log.info("you sent a scouting mission"),
            Err(err) => self.log.info(format!("cannot scout: {err}")),
        }
    }

    pub fn user_attack(&mut self, id: &str) {
        let _ = self.realm.open_page(Page::Army);
        let _ = self.realm.open_army_subpage(ArmySubpage::Attack);
        match self.realm.attack(id) {
            Ok(()) => self.log.info(format!("you attacked {id}")),
            Err(err) => self.log.info(format!("cannot attack {id}: {err}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistFeature {
    Buildings,
    Research,
    Prayers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RES_WOOD;
    use crate::keeper::assist::TickOutcome;

    #[test]
    fn assist_fires_on_the_ten_second_boundary() {
        let start = Instant::now();
        let mut session = Session::new(Options::default(), start);
        session.note_user_key(start);
        // Everything idle and capped from here on.
        for resource in &mut session.realm.resources {
            if resource.id == RES_WOOD {
                resource.amount = 190.0;
            }
            resource.base_production = 0.0;
        }

        let mut now = start + Duration::from_secs(3600);
        session.update(Duration::from_secs(9), now);
        assert!(session.last_outcome.is_none());

        now += Duration::from_secs(1);
        session.update(Duration::from_secs(1), now);
        assert!(matches!(
            session.last_outcome,
            Some(TickOutcome::Ran { .. })
        ));
    }

    #[test]
    fn user_keypress_holds_the_assist_back() {
        let start = Instant::now();
        let mut session = Session::new(Options::default(), start);
        let now = start + Duration::from_secs(30);
        session.note_user_key(now);
        session.update(Duration::from_secs(10), now);
        assert!(session.last_outcome.is_none());
        assert!(!session.is_idle(now));
    }

    #[test]
    fn options_changes_are_flagged_for_persistence() {
        let start = Instant::now();
        let mut session = Session::new(Options::default(), start);
        assert!(!session.take_options_dirty());
        session.toggle_assist();
        assert!(session.take_options_dirty());
        assert!(!session.take_options_dirty());
    }
}
