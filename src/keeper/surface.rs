use crate::catalog::{ArmySubpage, BuildSubpage, Page};
use thiserror::Error;

/// Fresh reading of one resource. Recomputed on every tick, never cached.
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    pub id: String,
    pub amount: f64,
    pub capacity: f64,
}

impl ResourceSnapshot {
    pub fn fill(&self) -> f64 {
        self.amount / self.capacity
    }
}

/// Resources at or above `threshold` of capacity. Readings without a
/// meaningful capacity are dropped here.
pub fn resources_at_cap(snapshots: Vec<ResourceSnapshot>, threshold: f64) -> Vec<ResourceSnapshot> {
    snapshots
        .into_iter()
        .filter(|snapshot| snapshot.capacity > 0.0 && snapshot.fill() >= threshold)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCounts {
    pub scouts: u32,
    pub explorers: u32,
    pub familiars: u32,
}

impl UnitCounts {
    pub fn total(&self) -> u32 {
        self.scouts + self.explorers + self.familiars
    }
}

#[derive(Debug, Clone)]
pub struct FightCandidate {
    pub id: String,
    pub difficulty: u8,
    pub level: u32,
}

#[derive(Debug, Clone)]
pub struct SpellStatus {
    pub id: String,
    pub active: bool,
    pub castable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionKind {
    Explore,
    Attack,
}

/// A click event as observed by the hosting environment. Synthetic clicks
/// arrive untrusted but carry the clicked control's location, which is why
/// the pending-click counter exists at all.
#[derive(Debug, Clone, Copy)]
pub struct ClickObservation {
    pub trusted: bool,
    pub location: Option<(u16, u16)>,
}

/// Read model over the game surface.
pub trait Perception {
    fn resources(&self) -> Vec<ResourceSnapshot>;
    /// Net per-second production of one resource.
    fn net_production(&self, resource: &str) -> f64;
    fn unit_counts(&self) -> UnitCounts;
    fn active_page(&self) -> Page;
    /// Ids of build controls currently rendered and enabled on a subpage.
    fn buildable(&self, subpage: BuildSubpage) -> Vec<String>;
    fn available_research(&self) -> Vec<String>;
    fn available_prayers(&self) -> Vec<String>;
    fn encounters(&self) -> Vec<FightCandidate>;
    /// `Some(true)` while a mission is running, `None` when the surface
    /// exposes no in-progress flag and callers must fall back to a fixed
    /// wait.
    fn mission_status(&self, kind: MissionKind) -> Option<bool>;
    fn spells(&self) -> Vec<SpellStatus>;
}

/// Write model: synthetic clicks and navigation against the game surface.
pub trait Actions {
    fn open_page(&mut self, page: Page) -> Result<(), ActionError>;
    fn open_build_subpage(&mut self, subpage: BuildSubpage) -> Result<(), ActionError>;
    fn open_army_subpage(&mut self, subpage: ArmySubpage) -> Result<(), ActionError>;
    fn build(&mut self, id: &str) -> Result<(), ActionError>;
    fn research(&mut self, id: &str) -> Result<(), ActionError>;
    fn pray(&mut self, id: &str) -> Result<(), ActionError>;
    fn send_scouts(&mut self) -> Result<(), ActionError>;
    fn attack(&mut self, id: &str) -> Result<(), ActionError>;
    fn cast_spell(&mut self, id: &str) -> Result<(), ActionError>;
    fn dismiss_spell(&mut self, id: &str) -> Result<(), ActionError>;
    /// Click events the surface observed since the last drain, in order.
    fn take_click_observations(&mut self) -> Vec<ClickObservation>;
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("control {0} is not rendered")]
    ControlMissing(String),
    #[error("control {0} is disabled")]
    ControlDisabled(String),
    #[error("action requires the {} page", .0.label())]
    WrongPage(Page),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleFlags {
    /// Leave the garrison home when estimating the attacking force.
    pub hold_garrison: bool,
    /// Credit currently active spells to the attacking force.
    pub count_active_spells: bool,
}

/// External battle-outcome predictor, consulted before every fight.
/// `None` means the prediction is unavailable; callers treat that as a
/// loss.
pub trait BattleOracle {
    fn predicts_victory(&self, encounter_id: &str, flags: OracleFlags) -> Option<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, amount: f64, capacity: f64) -> ResourceSnapshot {
        ResourceSnapshot {
            id: id.to_string(),
            amount,
            capacity,
        }
    }

    #[test]
    fn at_cap_uses_inclusive_threshold() {
        let capped = resources_at_cap(
            vec![
                snapshot("gold", 90.0, 100.0),
                snapshot("wood", 89.9, 100.0),
                snapshot("food", 100.0, 100.0),
            ],
            0.9,
        );
        let ids: Vec<_> = capped.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["gold", "food"]);
    }

    #[test]
    fn at_cap_discards_capacityless_readings() {
        let capped = resources_at_cap(
            vec![snapshot("luck", 5.0, 0.0), snapshot("mana", 9.0, -1.0)],
            0.9,
        );
        assert!(capped.is_empty());
    }
}
