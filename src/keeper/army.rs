use crate::catalog::{ArmySubpage, Page};
use crate::keeper::actions;
use crate::keeper::activity::ActivityMonitor;
use crate::keeper::surface::{
    Actions, BattleOracle, FightCandidate, MissionKind, OracleFlags, Perception,
};
use crate::log::MessageLog;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Encounters that unlock permanent incoming attacks once fought. Never
/// auto-attacked; the player must choose that escalation deliberately.
pub const FIGHT_BLACKLIST: &[&str] = &[
    "barbarian_village",
    "kobold_city",
    "orcish_prison_camp",
    "huge_cave",
    "dark_knight_patrol",
];

/// The run stops once the three scouting unit kinds sum below this.
pub const SCOUT_UNIT_FLOOR: u32 = 10;

const MAX_CONSECUTIVE_FAILURES: u32 = 3;
const SETTLE_DELAY: Duration = Duration::from_millis(500);
const CYCLE_DELAY: Duration = Duration::from_millis(500);
const MISSION_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MISSION_POLL_LIMIT: u32 = 30;
const MISSION_FALLBACK_WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmyMode {
    ScoutOnly,
    FightOnly,
    Alternate,
    /// Launch a scouting mission and a fight in the same cycle when both
    /// are viable, then wait for both before the next cycle.
    Parallel,
}

impl ArmyMode {
    pub fn label(self) -> &'static str {
        match self {
            ArmyMode::ScoutOnly => "scout only",
            ArmyMode::FightOnly => "fight only",
            ArmyMode::Alternate => "alternate",
            ArmyMode::Parallel => "parallel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Scout,
    Fight,
}

impl ActionKind {
    fn other(self) -> Self {
        match self {
            ActionKind::Scout => ActionKind::Fight,
            ActionKind::Fight => ActionKind::Scout,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ActionKind::Scout => "scout",
            ActionKind::Fight => "fight",
        }
    }

    fn subpage(self) -> ArmySubpage {
        match self {
            ActionKind::Scout => ArmySubpage::Explore,
            ActionKind::Fight => ArmySubpage::Attack,
        }
    }

    fn mission(self) -> MissionKind {
        match self {
            ActionKind::Scout => MissionKind::Explore,
            ActionKind::Fight => MissionKind::Attack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    UnitsBelowFloor { total: u32 },
    NoWinnableFight,
    RepeatedFailures,
}

impl StopReason {
    pub fn label(self) -> &'static str {
        match self {
            StopReason::Requested => "stop requested",
            StopReason::UnitsBelowFloor { .. } => "scouting units depleted",
            StopReason::NoWinnableFight => "no winnable fight",
            StopReason::RepeatedFailures => "repeated failures",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    NotRunning,
    Waiting,
    Progressed,
    Finished(StopReason),
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Gate,
    Navigate(ActionKind),
    Act(ActionKind),
    AwaitMissions { polls_left: u32 },
}

pub(crate) enum FightSelection {
    Chosen(FightCandidate),
    NoneWinnable,
    NoCandidates,
}

/// Candidates are always evaluated easiest first; the first one the oracle
/// calls winnable is taken. Predicted losses are skipped, not terminal by
/// themselves.
pub(crate) fn select_fight(
    mut candidates: Vec<FightCandidate>,
    oracle: &impl BattleOracle,
    log: &mut MessageLog,
) -> FightSelection {
    candidates.retain(|candidate| {
        let banned = FIGHT_BLACKLIST.contains(&candidate.id.as_str());
        if banned {
            log.debug(format!("skipping blacklisted fight {}", candidate.id));
        }
        !banned
    });
    if candidates.is_empty() {
        return FightSelection::NoCandidates;
    }
    candidates.sort_by(|a, b| {
        a.difficulty
            .cmp(&b.difficulty)
            .then_with(|| a.level.cmp(&b.level))
    });
    for candidate in candidates {
        match oracle.predicts_victory(&candidate.id, OracleFlags::default()) {
            Some(true) => {
                log.info(format!(
                    "oracle favors {} ({} skulls)",
                    candidate.id, candidate.difficulty
                ));
                return FightSelection::Chosen(candidate);
            }
            Some(false) => {
                log.debug(format!("oracle rejects {}", candidate.id));
            }
            None => {
                log.debug(format!("no prediction for {}, assuming a loss", candidate.id));
            }
        }
    }
    FightSelection::NoneWinnable
}

/// Manual-trigger helper that scouts and fights with the available units
/// until a stopping condition is reached. Driven by the session tick; each
/// step performs at most one UI interaction and re-checks the stop flag,
/// so cancellation lands at the next natural yield point.
#[derive(Debug)]
pub struct ArmyAssistant {
    running: bool,
    stop_requested: bool,
    mode: ArmyMode,
    phase: Phase,
    wait_until: Option<Instant>,
    next_kind: ActionKind,
    queued: Option<ActionKind>,
    failures: Option<(ActionKind, u32)>,
    launched_scout: bool,
    launched_fight: bool,
    last_stop: Option<StopReason>,
}

impl Default for ArmyAssistant {
    fn default() -> Self {
        Self {
            running: false,
            stop_requested: false,
            mode: ArmyMode::Parallel,
            phase: Phase::Gate,
            wait_until: None,
            next_kind: ActionKind::Scout,
            queued: None,
            failures: None,
            launched_scout: false,
            launched_fight: false,
            last_stop: None,
        }
    }
}

impl ArmyAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> ArmyMode {
        self.mode
    }

    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    pub fn phase_label(&self) -> &'static str {
        if !self.running {
            return "idle";
        }
        match self.phase {
            Phase::Gate => "choosing next action",
            Phase::Navigate(kind) | Phase::Act(kind) => kind.label(),
            Phase::AwaitMissions { .. } => "awaiting missions",
        }
    }

    pub fn start(&mut self, mode: ArmyMode, monitor: &mut ActivityMonitor, log: &mut MessageLog) {
        if self.running {
            log.warn("army assistant already running");
            return;
        }
        *self = Self {
            running: true,
            mode,
            ..Self::default()
        };
        // Held for the whole run so none of the assistant's clicks or
        // page switches reset the shared idle clock.
        monitor.begin_action();
        log.info(format!("army assistant started ({})", mode.label()));
    }

    /// Cooperative cancellation; takes effect at the next step.
    pub fn stop(&mut self, log: &mut MessageLog) {
        if self.running && !self.stop_requested {
            self.stop_requested = true;
            log.info("army assistant stop requested");
        }
    }

    pub fn step<S>(
        &mut self,
        now: Instant,
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> StepOutcome
    where
        S: Perception + Actions + BattleOracle,
    {
        if !self.running {
            return StepOutcome::NotRunning;
        }
        if let Some(until) = self.wait_until {
            if now < until {
                return StepOutcome::Waiting;
            }
            self.wait_until = None;
        }
        if self.stop_requested {
            return self.finish(StopReason::Requested, monitor, log);
        }

        match self.phase {
            Phase::Gate => self.gate(monitor, surface, log),
            Phase::Navigate(kind) => self.navigate(kind, now, monitor, surface, log),
            Phase::Act(kind) => self.act(kind, now, monitor, surface, log),
            Phase::AwaitMissions { polls_left } => {
                self.await_missions(polls_left, now, surface, log)
            }
        }
    }

    fn gate<S>(
        &mut self,
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> StepOutcome
    where
        S: Perception + Actions + BattleOracle,
    {
        let counts = surface.unit_counts();
        if counts.total() < SCOUT_UNIT_FLOOR {
            log.info(format!(
                "only {} scouting units left, stopping",
                counts.total()
            ));
            return self.finish(StopReason::UnitsBelowFloor { total: counts.total() }, monitor, log);
        }

        let first = match self.mode {
            ArmyMode::ScoutOnly => ActionKind::Scout,
            ArmyMode::FightOnly => ActionKind::Fight,
            ArmyMode::Alternate => self.next_kind,
            ArmyMode::Parallel => ActionKind::Scout,
        };
        self.queued = match self.mode {
            ArmyMode::Parallel => Some(ActionKind::Fight),
            _ => None,
        };
        self.launched_scout = false;
        self.launched_fight = false;
        self.phase = Phase::Navigate(first);
        StepOutcome::Progressed
    }

    fn navigate<S>(
        &mut self,
        kind: ActionKind,
        now: Instant,
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> StepOutcome
    where
        S: Perception + Actions + BattleOracle,
    {
        let result = actions::navigate(monitor, surface, now, |s| {
            s.open_page(Page::Army)?;
            s.open_army_subpage(kind.subpage())
        });
        match result {
            Ok(()) => {
                self.phase = Phase::Act(kind);
                self.wait_until = Some(now + SETTLE_DELAY);
                StepOutcome::Progressed
            }
            Err(err) => {
                log.debug(format!("cannot reach {} controls: {err}", kind.label()));
                self.action_failed(kind, now, monitor, log)
            }
        }
    }

    fn act<S>(
        &mut self,
        kind: ActionKind,
        now: Instant,
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> StepOutcome
    where
        S: Perception + Actions + BattleOracle,
    {
        match kind {
            ActionKind::Scout => match actions::click(monitor, surface, now, |s| s.send_scouts()) {
                Ok(()) => {
                    log.info("scouting mission sent");
                    self.launched_scout = true;
                    self.action_succeeded(kind, now)
                }
                Err(err) => {
                    log.debug(format!("cannot scout: {err}"));
                    self.action_failed(kind, now, monitor, log)
                }
            },
            ActionKind::Fight => {
                match select_fight(surface.encounters(), surface, log) {
                    FightSelection::Chosen(candidate) => {
                        match actions::click(monitor, surface, now, |s| s.attack(&candidate.id)) {
                            Ok(()) => {
                                log.info(format!(
                                    "attacking {} ({} skulls)",
                                    candidate.id, candidate.difficulty
                                ));
                                self.launched_fight = true;
                                self.action_succeeded(kind, now)
                            }
                            Err(err) => {
                                log.debug(format!("cannot attack {}: {err}", candidate.id));
                                self.action_failed(kind, now, monitor, log)
                            }
                        }
                    }
                    FightSelection::NoneWinnable => {
                        log.info("no winnable fight among the candidates, stopping");
                        self.finish(StopReason::NoWinnableFight, monitor, log)
                    }
                    FightSelection::NoCandidates => {
                        log.debug("no fights offered");
                        self.switch_or_continue(kind, now)
                    }
                }
            }
        }
    }

    fn await_missions<S>(
        &mut self,
        polls_left: u32,
        now: Instant,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> StepOutcome
    where
        S: Perception + Actions + BattleOracle,
    {
        let mut pending = false;
        let mut flag_missing = false;
        for (launched, kind) in [
            (self.launched_scout, MissionKind::Explore),
            (self.launched_fight, MissionKind::Attack),
        ] {
            if !launched {
                continue;
            }
            match surface.mission_status(kind) {
                Some(true) => pending = true,
                Some(false) => {}
                None => flag_missing = true,
            }
        }

        if flag_missing {
            // No in-progress flag to poll; fall back to a fixed wait.
            self.phase = Phase::Gate;
            self.wait_until = Some(now + MISSION_FALLBACK_WAIT);
            return StepOutcome::Progressed;
        }
        if pending {
            if polls_left == 0 {
                log.debug("missions still running after poll limit, moving on");
                self.phase = Phase::Gate;
                self.wait_until = Some(now + MISSION_FALLBACK_WAIT);
            } else {
                self.phase = Phase::AwaitMissions {
                    polls_left: polls_left - 1,
                };
                self.wait_until = Some(now + MISSION_POLL_INTERVAL);
            }
            return StepOutcome::Progressed;
        }
        self.phase = Phase::Gate;
        self.wait_until = Some(now + CYCLE_DELAY);
        StepOutcome::Progressed
    }

    fn action_succeeded(&mut self, kind: ActionKind, now: Instant) -> StepOutcome {
        self.failures = None;
        if self.mode == ArmyMode::Alternate {
            self.next_kind = kind.other();
        }
        self.advance_cycle(now)
    }

    fn switch_or_continue(&mut self, kind: ActionKind, now: Instant) -> StepOutcome {
        // Nothing offered is not a failure; try the other kind next.
        if matches!(self.mode, ArmyMode::Alternate) {
            self.next_kind = kind.other();
        }
        self.advance_cycle(now)
    }

    fn action_failed(
        &mut self,
        kind: ActionKind,
        now: Instant,
        monitor: &mut ActivityMonitor,
        log: &mut MessageLog,
    ) -> StepOutcome {
        let count = match self.failures {
            Some((failed_kind, count)) if failed_kind == kind => count + 1,
            _ => 1,
        };
        self.failures = Some((kind, count));
        if count >= MAX_CONSECUTIVE_FAILURES {
            log.info(format!(
                "{} failed {count} times in a row, stopping",
                kind.label()
            ));
            return self.finish(StopReason::RepeatedFailures, monitor, log);
        }
        if matches!(self.mode, ArmyMode::Alternate) {
            self.next_kind = kind.other();
        }
        self.advance_cycle(now)
    }

    fn advance_cycle(&mut self, now: Instant) -> StepOutcome {
        if let Some(next) = self.queued.take() {
            self.phase = Phase::Navigate(next);
            self.wait_until = Some(now + SETTLE_DELAY);
            return StepOutcome::Progressed;
        }
        // The alternator interleaves with missions still in flight; every
        // other mode waits out what it launched before the next cycle.
        let launched = self.launched_scout || self.launched_fight;
        if launched && self.mode != ArmyMode::Alternate {
            self.phase = Phase::AwaitMissions {
                polls_left: MISSION_POLL_LIMIT,
            };
            self.wait_until = Some(now + SETTLE_DELAY);
        } else {
            self.phase = Phase::Gate;
            self.wait_until = Some(now + CYCLE_DELAY);
        }
        StepOutcome::Progressed
    }

    fn finish(
        &mut self,
        reason: StopReason,
        monitor: &mut ActivityMonitor,
        log: &mut MessageLog,
    ) -> StepOutcome {
        self.running = false;
        self.stop_requested = false;
        self.wait_until = None;
        self.phase = Phase::Gate;
        self.last_stop = Some(reason);
        monitor.end_action();
        log.info(format!("army assistant finished: {}", reason.label()));
        StepOutcome::Finished(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::realm::Realm;
    use std::collections::HashSet;

    struct ScriptedOracle {
        winnable: HashSet<&'static str>,
    }

    impl BattleOracle for ScriptedOracle {
        fn predicts_victory(&self, encounter_id: &str, _flags: OracleFlags) -> Option<bool> {
            Some(self.winnable.contains(encounter_id))
        }
    }

    fn candidate(id: &str, difficulty: u8, level: u32) -> FightCandidate {
        FightCandidate {
            id: id.to_string(),
            difficulty,
            level,
        }
    }

    #[test]
    fn fight_selection_takes_easiest_winnable_not_easiest() {
        let oracle = ScriptedOracle {
            winnable: HashSet::from(["mid"]),
        };
        let mut log = MessageLog::new();
        let selection = select_fight(
            vec![
                candidate("hard", 3, 9),
                candidate("easy", 1, 1),
                candidate("mid", 2, 4),
            ],
            &oracle,
            &mut log,
        );
        match selection {
            FightSelection::Chosen(chosen) => assert_eq!(chosen.id, "mid"),
            _ => panic!("expected a chosen fight"),
        }
    }

    #[test]
    fn blacklisted_encounters_are_never_considered() {
        let oracle = ScriptedOracle {
            winnable: HashSet::from(["barbarian_village"]),
        };
        let mut log = MessageLog::new();
        let selection = select_fight(
            vec![candidate("barbarian_village", 1, 1)],
            &oracle,
            &mut log,
        );
        assert!(matches!(selection, FightSelection::NoCandidates));
    }

    #[test]
    fn no_winnable_candidate_is_terminal_for_selection() {
        let oracle = ScriptedOracle {
            winnable: HashSet::new(),
        };
        let mut log = MessageLog::new();
        let selection = select_fight(
            vec![candidate("easy", 1, 1), candidate("mid", 2, 2)],
            &oracle,
            &mut log,
        );
        assert!(matches!(selection, FightSelection::NoneWinnable));
    }

    #[test]
    fn unavailable_prediction_counts_as_a_loss() {
        struct NoOracle;
        impl BattleOracle for NoOracle {
            fn predicts_victory(&self, _id: &str, _flags: OracleFlags) -> Option<bool> {
                None
            }
        }
        let mut log = MessageLog::new();
        let selection = select_fight(vec![candidate("easy", 1, 1)], &NoOracle, &mut log);
        assert!(matches!(selection, FightSelection::NoneWinnable));
    }

    fn drive(
        army: &mut ArmyAssistant,
        realm: &mut Realm,
        monitor: &mut ActivityMonitor,
        log: &mut MessageLog,
        start: Instant,
        max_steps: u32,
    ) -> Option<StopReason> {
        let mut now = start;
        let step = Duration::from_millis(100);
        for _ in 0..max_steps {
            realm.advance(step);
            match army.step(now, monitor, realm, log) {
                StepOutcome::Finished(reason) => return Some(reason),
                StepOutcome::NotRunning => return army.last_stop(),
                _ => {}
            }
            now += step;
        }
        None
    }

    #[test]
    fn unit_floor_stops_before_any_action() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();
        realm.units.scouts = 5;
        realm.units.explorers = 3;
        realm.units.familiars = 0;

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::Alternate, &mut monitor, &mut log);
        let reason = army.step(start, &mut monitor, &mut realm, &mut log);

        assert_eq!(
            reason,
            StepOutcome::Finished(StopReason::UnitsBelowFloor { total: 8 })
        );
        assert!(realm.exploration.is_none());
        assert!(realm.attack_mission.is_none());
        assert!(!monitor.is_acting());
    }

    #[test]
    fn stop_takes_effect_at_the_next_step() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::ScoutOnly, &mut monitor, &mut log);
        army.stop(&mut log);
        let outcome = army.step(start, &mut monitor, &mut realm, &mut log);
        assert_eq!(outcome, StepOutcome::Finished(StopReason::Requested));
        assert!(!army.is_running());
        assert!(!monitor.is_acting());
    }

    #[test]
    fn scout_only_run_sends_missions_until_floor() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();
        realm.units.scouts = 11;
        realm.units.explorers = 0;
        realm.units.familiars = 0;

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::ScoutOnly, &mut monitor, &mut log);
        let reason = drive(&mut army, &mut realm, &mut monitor, &mut log, start, 2_000);

        assert_eq!(reason, Some(StopReason::UnitsBelowFloor { total: 9 }));
        assert_eq!(realm.units.total(), 9);
        assert!(!monitor.is_acting());
    }

    #[test]
    fn hopeless_army_stops_on_no_winnable_fight() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();
        realm.army_power = 0.0;

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::FightOnly, &mut monitor, &mut log);
        let reason = drive(&mut army, &mut realm, &mut monitor, &mut log, start, 200);

        assert_eq!(reason, Some(StopReason::NoWinnableFight));
        assert!(realm.attack_mission.is_none());
    }

    #[test]
    fn parallel_mode_launches_both_missions_in_one_cycle() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::Parallel, &mut monitor, &mut log);

        let mut now = start;
        let step = Duration::from_millis(100);
        let mut both_seen = false;
        for _ in 0..60 {
            // Not advancing the realm keeps both missions in flight.
            army.step(now, &mut monitor, &mut realm, &mut log);
            if realm.exploration.is_some() && realm.attack_mission.is_some() {
                both_seen = true;
                break;
            }
            now += step;
        }
        assert!(both_seen, "scout and fight should run concurrently");
        assert!(army.is_running());
        assert!(monitor.is_acting());
    }

    #[test]
    fn synthetic_clicks_during_run_do_not_reset_idle() {
        let start = Instant::now();
        let mut monitor = ActivityMonitor::new(start);
        monitor.observe_keypress(start);
        let mut log = MessageLog::new();
        let mut realm = Realm::prosperous();

        let mut army = ArmyAssistant::new();
        army.start(ArmyMode::ScoutOnly, &mut monitor, &mut log);
        let mut now = start;
        let step = Duration::from_millis(100);
        for _ in 0..40 {
            army.step(now, &mut monitor, &mut realm, &mut log);
            now += step;
        }
        assert!(realm.exploration.is_some());
        assert_eq!(monitor.idle_duration(now), now - start);
        army.stop(&mut log);
        army.step(now, &mut monitor, &mut realm, &mut log);
        assert!(!monitor.is_acting());
    }
}
