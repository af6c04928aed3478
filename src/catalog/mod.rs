mod data;

pub use data::{BUILDINGS, ENCOUNTERS, PRAYERS, RESEARCH, SPELLS};

pub const RES_GOLD: &str = "gold";
pub const RES_FOOD: &str = "food";
pub const RES_WOOD: &str = "wood";
pub const RES_STONE: &str = "stone";
pub const RES_TOOLS: &str = "tools";
pub const RES_RESEARCH: &str = "research";
pub const RES_FAITH: &str = "faith";
pub const RES_MANA: &str = "mana";
pub const RES_LUCK: &str = "luck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Build,
    Research,
    Magic,
    Army,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Page::Build => "Build",
            Page::Research => "Research",
            Page::Magic => "Magic",
            Page::Army => "Army",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSubpage {
    City,
    Outskirts,
}

impl BuildSubpage {
    pub const ALL: [BuildSubpage; 2] = [BuildSubpage::City, BuildSubpage::Outskirts];

    pub fn label(self) -> &'static str {
        match self {
            BuildSubpage::City => "City",
            BuildSubpage::Outskirts => "Outskirts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmySubpage {
    Explore,
    Attack,
}

/// What an effect or requirement points at. Prayers use a non-resource
/// entry with value -1 to mark mutual exclusion with their siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Resource,
    Modifier,
}

#[derive(Debug, Clone, Copy)]
pub struct Cost {
    pub resource: &'static str,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub kind: TargetKind,
    pub target: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildingDef {
    pub id: &'static str,
    pub name: &'static str,
    pub subpage: BuildSubpage,
    pub req: &'static [Cost],
    pub effects: &'static [Effect],
}

impl BuildingDef {
    pub fn consumes(&self, resource: &str) -> bool {
        self.req.iter().any(|cost| cost.resource == resource)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResearchDef {
    pub id: &'static str,
    pub name: &'static str,
    pub req: &'static [Cost],
    /// Research that opens a multi-choice dialog is left to the human.
    pub needs_confirmation: bool,
}

impl ResearchDef {
    pub fn consumes(&self, resource: &str) -> bool {
        self.req.iter().any(|cost| cost.resource == resource)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrayerDef {
    pub id: &'static str,
    pub name: &'static str,
    pub req: &'static [Cost],
    pub effects: &'static [Effect],
}

impl PrayerDef {
    pub fn consumes(&self, resource: &str) -> bool {
        self.req.iter().any(|cost| cost.resource == resource)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpellDef {
    pub id: &'static str,
    pub name: &'static str,
    pub mana_upkeep: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EncounterDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Skull count shown on the attack list.
    pub difficulty: u8,
    pub level: u32,
    /// Feeds the battle calculator.
    pub power: f64,
}

pub fn building(id: &str) -> Option<&'static BuildingDef> {
    BUILDINGS.iter().find(|def| def.id == id)
}

pub fn research_entry(id: &str) -> Option<&'static ResearchDef> {
    RESEARCH.iter().find(|def| def.id == id)
}

pub fn prayer(id: &str) -> Option<&'static PrayerDef> {
    PRAYERS.iter().find(|def| def.id == id)
}

pub fn encounter(id: &str) -> Option<&'static EncounterDef> {
    ENCOUNTERS.iter().find(|def| def.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for id in BUILDINGS
            .iter()
            .map(|b| b.id)
            .chain(RESEARCH.iter().map(|r| r.id))
            .chain(PRAYERS.iter().map(|p| p.id))
            .chain(ENCOUNTERS.iter().map(|e| e.id))
        {
            assert!(seen.insert(id), "duplicate catalog id {id}");
        }
    }

    #[test]
    fn lookups_resolve_known_ids() {
        assert!(building("farm").is_some());
        assert!(research_entry("agriculture").is_some());
        assert!(prayer("prayer_mother_earth").is_some());
        assert!(encounter("bandit_camp").is_some());
        assert!(building("no_such_building").is_none());
    }
}
