use crate::catalog::{
    self, ArmySubpage, BuildSubpage, Cost, Page, TargetKind, RES_FAITH, RES_FOOD, RES_GOLD,
    RES_LUCK, RES_MANA, RES_RESEARCH, RES_STONE, RES_TOOLS, RES_WOOD,
};
use crate::keeper::surface::{
    ActionError, Actions, BattleOracle, ClickObservation, FightCandidate, MissionKind,
    OracleFlags, Perception, ResourceSnapshot, SpellStatus, UnitCounts,
};
use crate::sim::combat;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const EXPLORATION_TIME: Duration = Duration::from_secs(3);
const ATTACK_TIME: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ResourceState {
    pub id: String,
    pub amount: f64,
    pub capacity: f64,
    pub base_production: f64,
}

#[derive(Debug, Clone)]
pub struct Mission {
    pub remaining: Duration,
}

#[derive(Debug, Clone)]
pub struct AttackMission {
    pub encounter: String,
    pub remaining: Duration,
}

/// In-memory stand-in for the hosted game page. Implements the keeper's
/// perception/action seam and the battle oracle, and emits the untrusted
/// click observations a real page would deliver for programmatic clicks.
#[derive(Debug)]
pub struct Realm {
    pub resources: Vec<ResourceState>,
    pub built: HashMap<String, u32>,
    pub researched: HashSet<String>,
    pub prayed: HashSet<String>,
    pub active_spells: HashSet<String>,
    pub page: Page,
    pub build_subpage: BuildSubpage,
    pub army_subpage: ArmySubpage,
    pub units: UnitCounts,
    pub army_power: f64,
    pub exploration: Option<Mission>,
    pub attack_mission: Option<AttackMission>,
    pub offered_encounters: Vec<String>,
    pub oracle_available: bool,
    /// When false the surface exposes no in-progress flags and pollers
    /// must fall back to fixed waits.
    pub expose_mission_flags: bool,
    observations: Vec<ClickObservation>,
}

impl Realm {
    /// A mid-game realm with healthy stocks, used by the binary as the
    /// demo surface and by tests as their scenario base.
    pub fn prosperous() -> Self {
        let resource = |id: &str, amount: f64, capacity: f64, base_production: f64| ResourceState {
            id: id.to_string(),
            amount,
            capacity,
            base_production,
        };
        Self {
            resources: vec![
                resource(RES_GOLD, 100.0, 200.0, 1.0),
                resource(RES_FOOD, 100.0, 200.0, 2.0),
                resource(RES_WOOD, 100.0, 200.0, 1.0),
                resource(RES_STONE, 100.0, 200.0, 0.8),
                resource(RES_TOOLS, 50.0, 100.0, 0.3),
                resource(RES_RESEARCH, 100.0, 200.0, 0.5),
                resource(RES_FAITH, 50.0, 200.0, 0.3),
                resource(RES_MANA, 50.0, 200.0, 0.4),
                resource(RES_LUCK, 0.0, 0.0, 0.0),
            ],
            built: HashMap::new(),
            researched: HashSet::new(),
            prayed: HashSet::new(),
            active_spells: HashSet::new(),
            page: Page::Build,
            build_subpage: BuildSubpage::City,
            army_subpage: ArmySubpage::Explore,
            units: UnitCounts {
                scouts: 12,
                explorers: 6,
                familiars: 2,
            },
            army_power: 100.0,
            exploration: None,
            attack_mission: None,
            offered_encounters: vec![
                "rat_nest".to_string(),
                "cave_bats".to_string(),
                "wolf_pack".to_string(),
                "barbarian_village".to_string(),
            ],
            oracle_available: true,
            expose_mission_flags: true,
            observations: Vec::new(),
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        let dt = delta.as_secs_f64();
        let rates: Vec<(String, f64)> = self
            .resources
            .iter()
            .map(|r| (r.id.clone(), self.net_production(&r.id)))
            .collect();
        for (resource, rate) in rates {
            if let Some(state) = self.resources.iter_mut().find(|r| r.id == resource) {
                state.amount += rate * dt;
                if state.capacity > 0.0 {
                    state.amount = state.amount.min(state.capacity);
                }
                state.amount = state.amount.max(0.0);
            }
        }

        let exploration_done = match &mut self.exploration {
            Some(mission) if mission.remaining <= delta => true,
            Some(mission) => {
                mission.remaining -= delta;
                false
            }
            None => false,
        };
        if exploration_done {
            self.exploration = None;
            self.discover_next();
        }

        let attack_done = match &mut self.attack_mission {
            Some(mission) if mission.remaining <= delta => Some(mission.encounter.clone()),
            Some(mission) => {
                mission.remaining -= delta;
                None
            }
            None => None,
        };
        if let Some(encounter) = attack_done {
            self.attack_mission = None;
            self.resolve_attack(&encounter);
        }
    }

    pub fn total_built(&self) -> u32 {
        self.built.values().sum()
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceState> {
        self.resources.iter().find(|r| r.id == id)
    }

    fn resource_mut(&mut self, id: &str) -> Option<&mut ResourceState> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    fn affordable(&self, req: &[Cost]) -> bool {
        req.iter().all(|cost| {
            self.resource(cost.resource)
                .map(|r| r.amount >= cost.amount)
                .unwrap_or(false)
        })
    }

    fn pay(&mut self, req: &[Cost]) {
        for cost in req {
            if let Some(state) = self.resource_mut(cost.resource) {
                state.amount = (state.amount - cost.amount).max(0.0);
            }
        }
    }

    fn emit_click(&mut self) {
        self.observations.push(ClickObservation {
            trusted: false,
            location: Some((40, 12)),
        });
    }

    fn discover_next(&mut self) {
        let next = catalog::ENCOUNTERS
            .iter()
            .find(|def| !self.offered_encounters.iter().any(|id| id == def.id));
        if let Some(def) = next {
            self.offered_encounters.push(def.id.to_string());
        }
    }

    fn resolve_attack(&mut self, encounter: &str) {
        let Some(def) = catalog::encounter(encounter) else {
            return;
        };
        let rating = combat::attack_rating(self.army_power, &self.active_spells, OracleFlags::default());
        if combat::predicts_victory(rating, def) {
            self.offered_encounters.retain(|id| id != encounter);
            if let Some(gold) = self.resource_mut(RES_GOLD) {
                gold.amount += def.power;
                if gold.capacity > 0.0 {
                    gold.amount = gold.amount.min(gold.capacity);
                }
            }
        } else {
            self.army_power *= 0.7;
        }
    }

    fn consume_scouting_unit(&mut self) {
        if self.units.scouts > 0 {
            self.units.scouts -= 1;
        } else if self.units.explorers > 0 {
            self.units.explorers -= 1;
        } else if self.units.familiars > 0 {
            self.units.familiars -= 1;
        }
    }
}

impl Perception for Realm {
    fn resources(&self) -> Vec<ResourceSnapshot> {
        self.resources
            .iter()
            .map(|r| ResourceSnapshot {
                id: r.id.clone(),
                amount: r.amount,
                capacity: r.capacity,
            })
            .collect()
    }

    fn net_production(&self, resource: &str) -> f64 {
        let mut rate = self
            .resource(resource)
            .map(|r| r.base_production)
            .unwrap_or(0.0);
        for (id, count) in &self.built {
            let Some(def) = catalog::building(id) else {
                continue;
            };
            for effect in def.effects {
                if effect.kind == TargetKind::Resource && effect.target == resource {
                    rate += effect.value * f64::from(*count);
                }
            }
        }
        for id in &self.prayed {
            let Some(def) = catalog::prayer(id) else {
                continue;
            };
            for effect in def.effects {
                if effect.kind == TargetKind::Resource && effect.target == resource {
                    rate += effect.value;
                }
            }
        }
        if resource == RES_MANA {
            for id in &self.active_spells {
                if let Some(def) = catalog::SPELLS.iter().find(|s| s.id == *id) {
                    rate -= def.mana_upkeep;
                }
            }
        }
        rate
    }

    fn unit_counts(&self) -> UnitCounts {
        self.units
    }

    fn active_page(&self) -> Page {
        self.page
    }

    fn buildable(&self, subpage: BuildSubpage) -> Vec<String> {
        catalog::BUILDINGS
            .iter()
            .filter(|def| def.subpage == subpage && self.affordable(def.req))
            .map(|def| def.id.to_string())
            .collect()
    }

    fn available_research(&self) -> Vec<String> {
        catalog::RESEARCH
            .iter()
            .filter(|def| !self.researched.contains(def.id) && self.affordable(def.req))
            .map(|def| def.id.to_string())
            .collect()
    }

    fn available_prayers(&self) -> Vec<String> {
        catalog::PRAYERS
            .iter()
            .filter(|def| !self.prayed.contains(def.id) && self.affordable(def.req))
            .map(|def| def.id.to_string())
            .collect()
    }

    fn encounters(&self) -> Vec<FightCandidate> {
        self.offered_encounters
            .iter()
            .filter_map(|id| catalog::encounter(id))
            .map(|def| FightCandidate {
                id: def.id.to_string(),
                difficulty: def.difficulty,
                level: def.level,
            })
            .collect()
    }

    fn mission_status(&self, kind: MissionKind) -> Option<bool> {
        if !self.expose_mission_flags {
            return None;
        }
        Some(match kind {
            MissionKind::Explore => self.exploration.is_some(),
            MissionKind::Attack => self.attack_mission.is_some(),
        })
    }

    fn spells(&self) -> Vec<SpellStatus> {
        catalog::SPELLS
            .iter()
            .map(|def| {
                let active = self.active_spells.contains(def.id);
                SpellStatus {
                    id: def.id.to_string(),
                    active,
                    castable: !active,
                }
            })
            .collect()
    }
}

impl Actions for Realm {
    fn open_page(&mut self, page: Page) -> Result<(), ActionError> {
        self.page = page;
        Ok(())
    }

    fn open_build_subpage(&mut self, subpage: BuildSubpage) -> Result<(), ActionError> {
        if self.page != Page::Build {
            return Err(ActionError::WrongPage(Page::Build));
        }
        self.build_subpage = subpage;
        Ok(())
    }

    fn open_army_subpage(&mut self, subpage: ArmySubpage) -> Result<(), ActionError> {
        if self.page != Page::Army {
            return Err(ActionError::WrongPage(Page::Army));
        }
        self.army_subpage = subpage;
        Ok(())
    }

    fn build(&mut self, id: &str) -> Result<(), ActionError> {
        if self.page != Page::Build {
            return Err(ActionError::WrongPage(Page::Build));
        }
        let def = catalog::building(id).ok_or_else(|| ActionError::ControlMissing(id.to_string()))?;
        if def.subpage != self.build_subpage {
            return Err(ActionError::ControlMissing(id.to_string()));
        }
        if !self.affordable(def.req) {
            return Err(ActionError::ControlDisabled(id.to_string()));
        }
        self.pay(def.req);
        *self.built.entry(id.to_string()).or_insert(0) += 1;
        self.emit_click();
        Ok(())
    }

    fn research(&mut self, id: &str) -> Result<(), ActionError> {
        let def =
            catalog::research_entry(id).ok_or_else(|| ActionError::ControlMissing(id.to_string()))?;
        if self.researched.contains(id) || !self.affordable(def.req) {
            return Err(ActionError::ControlDisabled(id.to_string()));
        }
        self.pay(def.req);
        self.researched.insert(id.to_string());
        self.emit_click();
        Ok(())
    }

    fn pray(&mut self, id: &str) -> Result<(), ActionError> {
        let def = catalog::prayer(id).ok_or_else(|| ActionError::ControlMissing(id.to_string()))?;
        if self.prayed.contains(id) || !self.affordable(def.req) {
            return Err(ActionError::ControlDisabled(id.to_string()));
        }
        self.pay(def.req);
        self.prayed.insert(id.to_string());
        self.emit_click();
        Ok(())
    }

    fn send_scouts(&mut self) -> Result<(), ActionError> {
        if self.page != Page::Army || self.army_subpage != ArmySubpage::Explore {
            return Err(ActionError::ControlMissing("send_to_explore".to_string()));
        }
        if self.exploration.is_some() || self.units.total() == 0 {
            return Err(ActionError::ControlDisabled("send_to_explore".to_string()));
        }
        self.consume_scouting_unit();
        self.exploration = Some(Mission {
            remaining: EXPLORATION_TIME,
        });
        self.emit_click();
        Ok(())
    }

    fn attack(&mut self, id: &str) -> Result<(), ActionError> {
        if self.page != Page::Army || self.army_subpage != ArmySubpage::Attack {
            return Err(ActionError::ControlMissing("attack".to_string()));
        }
        if !self.offered_encounters.iter().any(|known| known == id) {
            return Err(ActionError::ControlMissing(id.to_string()));
        }
        if self.attack_mission.is_some() {
            return Err(ActionError::ControlDisabled("attack".to_string()));
        }
        self.attack_mission = Some(AttackMission {
            encounter: id.to_string(),
            remaining: ATTACK_TIME,
        });
        self.emit_click();
        Ok(())
    }

    fn cast_spell(&mut self, id: &str) -> Result<(), ActionError> {
        if catalog::SPELLS.iter().all(|def| def.id != id) {
            return Err(ActionError::ControlMissing(id.to_string()));
        }
        if !self.active_spells.insert(id.to_string()) {
            return Err(ActionError::ControlDisabled(id.to_string()));
        }
        self.emit_click();
        Ok(())
    }

    fn dismiss_spell(&mut self, id: &str) -> Result<(), ActionError> {
        if !self.active_spells.remove(id) {
            return Err(ActionError::ControlDisabled(id.to_string()));
        }
        self.emit_click();
        Ok(())
    }

    fn take_click_observations(&mut self) -> Vec<ClickObservation> {
        std::mem::take(&mut self.observations)
    }
}

impl BattleOracle for Realm {
    fn predicts_victory(&self, encounter_id: &str, flags: OracleFlags) -> Option<bool> {
        if !self.oracle_available {
            return None;
        }
        let def = catalog::encounter(encounter_id)?;
        let rating = combat::attack_rating(self.army_power, &self.active_spells, flags);
        Some(combat::predicts_victory(rating, def))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_accrues_and_clamps_at_capacity() {
        let mut realm = Realm::prosperous();
        let wood = realm.resource_mut(RES_WOOD).unwrap();
        wood.amount = 199.5;
        realm.advance(Duration::from_secs(10));
        assert_eq!(realm.resource(RES_WOOD).unwrap().amount, 200.0);
    }

    #[test]
    fn built_buildings_shift_net_production() {
        let mut realm = Realm::prosperous();
        let before = realm.net_production(RES_FOOD);
        realm.built.insert("farm".to_string(), 2);
        assert_eq!(realm.net_production(RES_FOOD), before + 1.0);
    }

    #[test]
    fn building_pays_costs_and_emits_an_untrusted_click() {
        let mut realm = Realm::prosperous();
        realm.page = Page::Build;
        let gold_before = realm.resource(RES_GOLD).unwrap().amount;
        realm.build("farm").unwrap();
        assert_eq!(realm.built.get("farm"), Some(&1));
        assert!(realm.resource(RES_GOLD).unwrap().amount < gold_before);
        let observations = realm.take_click_observations();
        assert_eq!(observations.len(), 1);
        assert!(!observations[0].trusted);
        assert!(observations[0].location.is_some());
    }

    #[test]
    fn build_requires_the_right_subpage() {
        let mut realm = Realm::prosperous();
        realm.page = Page::Build;
        realm.build_subpage = BuildSubpage::City;
        assert!(matches!(
            realm.build("quarry"),
            Err(ActionError::ControlMissing(_))
        ));
    }

    #[test]
    fn exploration_discovers_a_new_encounter() {
        let mut realm = Realm::prosperous();
        realm.page = Page::Army;
        realm.army_subpage = ArmySubpage::Explore;
        let offered_before = realm.offered_encounters.len();
        let scouts_before = realm.units.scouts;
        realm.send_scouts().unwrap();
        assert_eq!(realm.units.scouts, scouts_before - 1);
        realm.advance(Duration::from_secs(5));
        assert!(realm.exploration.is_none());
        assert_eq!(realm.offered_encounters.len(), offered_before + 1);
    }

    #[test]
    fn won_attack_removes_the_encounter() {
        let mut realm = Realm::prosperous();
        realm.page = Page::Army;
        realm.army_subpage = ArmySubpage::Attack;
        realm.attack("rat_nest").unwrap();
        realm.advance(Duration::from_secs(5));
        assert!(realm.attack_mission.is_none());
        assert!(!realm.offered_encounters.iter().any(|id| id == "rat_nest"));
    }

    #[test]
    fn lost_attack_weakens_the_army() {
        let mut realm = Realm::prosperous();
        realm.army_power = 5.0;
        realm.page = Page::Army;
        realm.army_subpage = ArmySubpage::Attack;
        realm.attack("wolf_pack").unwrap();
        realm.advance(Duration::from_secs(5));
        assert!(realm.army_power < 5.0);
        assert!(realm.offered_encounters.iter().any(|id| id == "wolf_pack"));
    }

    #[test]
    fn oracle_goes_quiet_when_unavailable() {
        let mut realm = Realm::prosperous();
        realm.oracle_available = false;
        assert_eq!(
            realm.predicts_victory("rat_nest", OracleFlags::default()),
            None
        );
    }

    #[test]
    fn hidden_mission_flags_return_none() {
        let mut realm = Realm::prosperous();
        realm.expose_mission_flags = false;
        assert_eq!(realm.mission_status(MissionKind::Explore), None);
    }
}
