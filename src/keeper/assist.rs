use crate::catalog::{self, BuildSubpage, Page, RES_FAITH, RES_RESEARCH};
use crate::keeper::actions;
use crate::keeper::activity::ActivityMonitor;
use crate::keeper::safety;
use crate::keeper::surface::{resources_at_cap, Actions, Perception, ResourceSnapshot};
use crate::log::MessageLog;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A resource is "at cap" from 90% fill upward.
pub const CAP_THRESHOLD: f64 = 0.9;
/// How often the session fires `AssistLoop::tick`.
pub const ASSIST_INTERVAL: Duration = Duration::from_secs(10);

const MAGIC_CHECK_COOLDOWN: Duration = Duration::from_secs(120);
const BUILD_COOLDOWN: Duration = Duration::from_secs(5);
const FAILED_SUBPAGE_MEMORY: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistOptions {
    pub enabled: bool,
    pub idle_seconds: u64,
    pub buildings: bool,
    pub research: bool,
    pub prayers: bool,
}

impl Default for AssistOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_seconds: 60,
            buildings: true,
            research: true,
            prayers: true,
        }
    }
}

impl AssistOptions {
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicKind {
    Research,
    Prayer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MagicOutcome {
    /// Check cooldown still running, or no magic resource capped.
    NotDue,
    Performed { kind: MagicKind, id: String },
    NothingEligible,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    NotDue,
    /// No subpage holds a building that consumes a capped resource.
    NoConsumer,
    Built { subpage: BuildSubpage, id: String },
    NoSafeOption { subpage: BuildSubpage },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Disabled,
    UserActive,
    NothingAtCap,
    Ran {
        capped: Vec<String>,
        magic: MagicOutcome,
        build: BuildOutcome,
    },
}

/// Periodic controller that spends resources sitting at capacity while the
/// user is idle. Holds nothing across ticks except its two cooldowns and
/// the short memory of subpages that recently yielded nothing.
#[derive(Debug, Default)]
pub struct AssistLoop {
    last_magic_check: Option<Instant>,
    last_build: Option<Instant>,
    failed_subpages: VecDeque<BuildSubpage>,
}

impl AssistLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick<S, R>(
        &mut self,
        now: Instant,
        options: &AssistOptions,
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        rng: &mut R,
        log: &mut MessageLog,
    ) -> TickOutcome
    where
        S: Perception + Actions,
        R: Rng + ?Sized,
    {
        if !options.enabled {
            return TickOutcome::Disabled;
        }
        if !monitor.is_idle_for(options.idle_threshold(), now) {
            return TickOutcome::UserActive;
        }

        let capped = resources_at_cap(surface.resources(), CAP_THRESHOLD);
        if capped.is_empty() {
            return TickOutcome::NothingAtCap;
        }
        let capped_ids: Vec<String> = capped.iter().map(|r| r.id.clone()).collect();
        log.debug(format!("resources at cap: {}", capped_ids.join(", ")));

        let magic = self.magic_branch(now, options, &capped, monitor, surface, log);
        let build = self.build_branch(now, options, &capped, monitor, surface, rng, log);

        TickOutcome::Ran {
            capped: capped_ids,
            magic,
            build,
        }
    }

    /// Research and prayer, sharing one check cooldown. The timestamp is
    /// updated once per tick on entry: it rate-limits the check itself,
    /// whether or not either branch fires.
    fn magic_branch<S>(
        &mut self,
        now: Instant,
        options: &AssistOptions,
        capped: &[ResourceSnapshot],
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> MagicOutcome
    where
        S: Perception + Actions,
    {
        let due = match self.last_magic_check {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= MAGIC_CHECK_COOLDOWN,
        };
        let magic_capped = capped
            .iter()
            .any(|r| r.id == RES_RESEARCH || r.id == RES_FAITH);
        if !due || !magic_capped {
            return MagicOutcome::NotDue;
        }
        self.last_magic_check = Some(now);

        if options.research {
            match self.try_research(now, capped, monitor, surface, log) {
                Ok(Some(id)) => {
                    return MagicOutcome::Performed {
                        kind: MagicKind::Research,
                        id,
                    };
                }
                Ok(None) => {}
                Err(err) => log.debug(format!("research attempt failed: {err}")),
            }
        }
        if options.prayers {
            match self.try_prayer(now, capped, monitor, surface, log) {
                Ok(Some(id)) => {
                    return MagicOutcome::Performed {
                        kind: MagicKind::Prayer,
                        id,
                    };
                }
                Ok(None) => {}
                Err(err) => {
                    log.debug(format!("prayer attempt failed: {err}"));
                    return MagicOutcome::Failed(err);
                }
            }
        }
        MagicOutcome::NothingEligible
    }

    fn try_research<S>(
        &mut self,
        now: Instant,
        capped: &[ResourceSnapshot],
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> Result<Option<String>, String>
    where
        S: Perception + Actions,
    {
        let offered = surface.available_research();
        let pick = catalog::RESEARCH
            .iter()
            .filter(|def| safety::is_safe_research(def))
            .filter(|def| capped.iter().any(|r| def.consumes(&r.id)))
            .find(|def| offered.iter().any(|id| id == def.id));
        let Some(def) = pick else {
            return Ok(None);
        };
        actions::click(monitor, surface, now, |s| s.research(def.id))
            .map_err(|err| err.to_string())?;
        log.info(format!("researched {} to spend excess", def.name));
        Ok(Some(def.id.to_string()))
    }

    fn try_prayer<S>(
        &mut self,
        now: Instant,
        capped: &[ResourceSnapshot],
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        log: &mut MessageLog,
    ) -> Result<Option<String>, String>
    where
        S: Perception + Actions,
    {
        let offered = surface.available_prayers();
        let pick = catalog::PRAYERS
            .iter()
            .filter(|def| safety::is_safe_prayer(def))
            .filter(|def| capped.iter().any(|r| def.consumes(&r.id)))
            .find(|def| offered.iter().any(|id| id == def.id));
        let Some(def) = pick else {
            return Ok(None);
        };
        actions::click(monitor, surface, now, |s| s.pray(def.id)).map_err(|err| err.to_string())?;
        log.info(format!("prayed {} to spend excess faith", def.name));
        Ok(Some(def.id.to_string()))
    }

    fn build_branch<S, R>(
        &mut self,
        now: Instant,
        options: &AssistOptions,
        capped: &[ResourceSnapshot],
        monitor: &mut ActivityMonitor,
        surface: &mut S,
        rng: &mut R,
        log: &mut MessageLog,
    ) -> BuildOutcome
    where
        S: Perception + Actions,
        R: Rng + ?Sized,
    {
        if !options.buildings {
            return BuildOutcome::NotDue;
        }
        let due = match self.last_build {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= BUILD_COOLDOWN,
        };
        if !due {
            return BuildOutcome::NotDue;
        }

        let candidates: Vec<BuildSubpage> = BuildSubpage::ALL
            .into_iter()
            .filter(|subpage| {
                catalog::BUILDINGS.iter().any(|def| {
                    def.subpage == *subpage && capped.iter().any(|r| def.consumes(&r.id))
                })
            })
            .collect();
        if candidates.is_empty() {
            return BuildOutcome::NoConsumer;
        }
        let subpage = self.select_subpage(&candidates, rng);

        if let Err(err) = actions::navigate(monitor, surface, now, |s| {
            s.open_page(Page::Build)?;
            s.open_build_subpage(subpage)
        }) {
            log.debug(format!("could not open {} buildings: {err}", subpage.label()));
            return BuildOutcome::Failed(err.to_string());
        }

        let offered = surface.buildable(subpage);
        let safe: Vec<&'static str> = catalog::BUILDINGS
            .iter()
            .filter(|def| def.subpage == subpage)
            .filter(|def| capped.iter().any(|r| def.consumes(&r.id)))
            .filter(|def| offered.iter().any(|id| id == def.id))
            .filter(|def| safety::is_safe_to_auto_build(def, |res| surface.net_production(res)))
            .map(|def| def.id)
            .collect();

        if safe.is_empty() {
            self.note_failed_subpage(subpage);
            log.info(format!(
                "no safe buildings on {} for capped resources",
                subpage.label()
            ));
            return BuildOutcome::NoSafeOption { subpage };
        }

        // Deliberately not cheapest-first: a uniform pick diversifies what
        // gets built while the user is away.
        let id = safe[rng.gen_range(0..safe.len())];
        match actions::click(monitor, surface, now, |s| s.build(id)) {
            Ok(()) => {
                self.failed_subpages.clear();
                self.last_build = Some(now);
                log.info(format!("built {id} to spend capped resources"));
                BuildOutcome::Built {
                    subpage,
                    id: id.to_string(),
                }
            }
            Err(err) => {
                self.note_failed_subpage(subpage);
                log.debug(format!("build click failed for {id}: {err}"));
                BuildOutcome::Failed(err.to_string())
            }
        }
    }

    /// Prefer subpages that have not recently come up empty. When every
    /// candidate has, forget the failures and retry any of them.
    fn select_subpage<R: Rng + ?Sized>(
        &mut self,
        candidates: &[BuildSubpage],
        rng: &mut R,
    ) -> BuildSubpage {
        let fresh: Vec<BuildSubpage> = candidates
            .iter()
            .copied()
            .filter(|subpage| !self.failed_subpages.contains(subpage))
            .collect();
        if fresh.is_empty() {
            self.failed_subpages.clear();
            candidates[rng.gen_range(0..candidates.len())]
        } else {
            fresh[rng.gen_range(0..fresh.len())]
        }
    }

    fn note_failed_subpage(&mut self, subpage: BuildSubpage) {
        self.failed_subpages.retain(|known| *known != subpage);
        self.failed_subpages.push_back(subpage);
        while self.failed_subpages.len() > FAILED_SUBPAGE_MEMORY {
            self.failed_subpages.pop_front();
        }
    }

    pub fn failed_subpages(&self) -> impl Iterator<Item = BuildSubpage> + '_ {
        self.failed_subpages.iter().copied()
    }
}
