use super::{
    BuildSubpage, BuildingDef, Cost, Effect, EncounterDef, PrayerDef, ResearchDef, SpellDef,
    TargetKind,
};
use super::{RES_FAITH, RES_FOOD, RES_GOLD, RES_LUCK, RES_MANA, RES_RESEARCH, RES_STONE, RES_TOOLS, RES_WOOD};

const fn res(resource: &'static str, amount: f64) -> Cost {
    Cost { resource, amount }
}

const fn yields(target: &'static str, value: f64) -> Effect {
    Effect {
        kind: TargetKind::Resource,
        target,
        value,
    }
}

const fn modifier(target: &'static str, value: f64) -> Effect {
    Effect {
        kind: TargetKind::Modifier,
        target,
        value,
    }
}

pub const BUILDINGS: &[BuildingDef] = &[
    BuildingDef {
        id: "farm",
        name: "Farm",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 25.0), res(RES_WOOD, 10.0)],
        effects: &[yields(RES_FOOD, 0.5)],
    },
    BuildingDef {
        id: "common_house",
        name: "Common House",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 30.0), res(RES_WOOD, 20.0)],
        effects: &[yields(RES_FOOD, -0.5), modifier("population", 1.0)],
    },
    BuildingDef {
        id: "lumberjack_camp",
        name: "Lumberjack Camp",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 40.0), res(RES_TOOLS, 5.0)],
        effects: &[yields(RES_WOOD, 0.7), yields(RES_FOOD, -0.2)],
    },
    BuildingDef {
        id: "quarry",
        name: "Quarry",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 60.0), res(RES_WOOD, 30.0)],
        effects: &[yields(RES_STONE, 0.6), yields(RES_FOOD, -0.3)],
    },
    BuildingDef {
        id: "artisan_workshop",
        name: "Artisan Workshop",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 80.0), res(RES_WOOD, 40.0), res(RES_STONE, 20.0)],
        effects: &[yields(RES_TOOLS, 0.3)],
    },
    BuildingDef {
        id: "marketplace",
        name: "Marketplace",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 120.0), res(RES_WOOD, 60.0)],
        effects: &[yields(RES_GOLD, 1.2), yields(RES_FOOD, -0.4)],
    },
    BuildingDef {
        id: "granary",
        name: "Granary",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 90.0), res(RES_WOOD, 60.0)],
        effects: &[modifier("cap_food", 200.0)],
    },
    BuildingDef {
        id: "temple",
        name: "Temple",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 150.0), res(RES_STONE, 80.0)],
        effects: &[yields(RES_FAITH, 0.4)],
    },
    BuildingDef {
        id: "academy",
        name: "Academy",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 180.0), res(RES_WOOD, 90.0)],
        effects: &[yields(RES_RESEARCH, 0.5), yields(RES_FOOD, -0.4)],
    },
    BuildingDef {
        id: "barracks",
        name: "Barracks",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 100.0), res(RES_WOOD, 50.0), res(RES_STONE, 30.0)],
        effects: &[modifier("army_cap", 4.0), yields(RES_FOOD, -0.5)],
    },
    BuildingDef {
        id: "watchtower",
        name: "Watchtower",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_WOOD, 80.0), res(RES_STONE, 40.0)],
        effects: &[modifier("defense", 2.0)],
    },
    BuildingDef {
        id: "mine",
        name: "Mine",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 140.0), res(RES_WOOD, 70.0), res(RES_TOOLS, 10.0)],
        effects: &[yields(RES_STONE, 0.8), yields(RES_GOLD, 0.3), yields(RES_FOOD, -0.6)],
    },
    // Everything below is off limits to the keeper: strategic one-ofs,
    // adverse side effects, or luck costs.
    BuildingDef {
        id: "pillar_mana",
        name: "Pillar of Mana",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 200.0), res(RES_MANA, 50.0)],
        effects: &[yields(RES_MANA, 1.5), yields(RES_GOLD, -1.0)],
    },
    BuildingDef {
        id: "statue_atamar",
        name: "Statue of Atamar",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 300.0), res(RES_STONE, 150.0)],
        effects: &[modifier("devotion_atamar", 1.0)],
    },
    BuildingDef {
        id: "statue_firio",
        name: "Statue of Firio",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 300.0), res(RES_STONE, 150.0)],
        effects: &[modifier("devotion_firio", 1.0)],
    },
    BuildingDef {
        id: "statue_lurezia",
        name: "Statue of Lurezia",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 300.0), res(RES_STONE, 150.0)],
        effects: &[modifier("devotion_lurezia", 1.0)],
    },
    BuildingDef {
        id: "harvest_shrine",
        name: "Harvest Shrine",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 220.0), res(RES_STONE, 110.0)],
        effects: &[yields(RES_FOOD, 1.5), modifier("shrine", 1.0)],
    },
    BuildingDef {
        id: "war_shrine",
        name: "War Shrine",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 220.0), res(RES_STONE, 110.0)],
        effects: &[modifier("army_power", 0.1), modifier("shrine", 1.0)],
    },
    BuildingDef {
        id: "mind_shrine",
        name: "Mind Shrine",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 220.0), res(RES_STONE, 110.0)],
        effects: &[yields(RES_RESEARCH, 1.0), modifier("shrine", 1.0)],
    },
    BuildingDef {
        id: "fate_shrine_b",
        name: "Shrine of Fate (Blood)",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 260.0), res(RES_STONE, 130.0)],
        effects: &[modifier("fate", 1.0)],
    },
    BuildingDef {
        id: "fate_shrine_f",
        name: "Shrine of Fate (Fortune)",
        subpage: BuildSubpage::Outskirts,
        req: &[res(RES_GOLD, 260.0), res(RES_STONE, 130.0)],
        effects: &[modifier("fate", 1.0)],
    },
    BuildingDef {
        id: "lucky_well",
        name: "Lucky Well",
        subpage: BuildSubpage::City,
        req: &[res(RES_GOLD, 80.0), res(RES_LUCK, 1.0)],
        effects: &[yields(RES_GOLD, 2.0)],
    },
];

pub const RESEARCH: &[ResearchDef] = &[
    ResearchDef {
        id: "agriculture",
        name: "Agriculture",
        req: &[res(RES_RESEARCH, 40.0)],
        needs_confirmation: false,
    },
    ResearchDef {
        id: "stone_masonry",
        name: "Stone Masonry",
        req: &[res(RES_RESEARCH, 60.0)],
        needs_confirmation: false,
    },
    ResearchDef {
        id: "archery",
        name: "Archery",
        req: &[res(RES_RESEARCH, 80.0), res(RES_WOOD, 40.0)],
        needs_confirmation: false,
    },
    ResearchDef {
        id: "writing",
        name: "Writing",
        req: &[res(RES_RESEARCH, 100.0)],
        needs_confirmation: false,
    },
    ResearchDef {
        id: "mysterious_arrival",
        name: "Mysterious Arrival",
        req: &[res(RES_RESEARCH, 150.0)],
        needs_confirmation: true,
    },
    ResearchDef {
        id: "dark_ritual",
        name: "Dark Ritual",
        req: &[res(RES_RESEARCH, 200.0), res(RES_FAITH, 80.0)],
        needs_confirmation: false,
    },
    ResearchDef {
        id: "demonology",
        name: "Demonology",
        req: &[res(RES_RESEARCH, 260.0), res(RES_MANA, 100.0)],
        needs_confirmation: false,
    },
];

pub const PRAYERS: &[PrayerDef] = &[
    PrayerDef {
        id: "prayer_mother_earth",
        name: "Prayer to Mother Earth",
        req: &[res(RES_FAITH, 30.0)],
        effects: &[yields(RES_FOOD, 0.4)],
    },
    PrayerDef {
        id: "prayer_wild_man",
        name: "Prayer of the Wild Man",
        req: &[res(RES_FAITH, 45.0)],
        effects: &[yields(RES_WOOD, 0.4)],
    },
    PrayerDef {
        id: "sacred_equipment",
        name: "Sacred Equipment",
        req: &[res(RES_FAITH, 60.0), res(RES_MANA, 20.0)],
        effects: &[modifier("army_power", 0.05)],
    },
    // Choosing one of these locks out its siblings; left to the human.
    PrayerDef {
        id: "desire_abundance",
        name: "Desire for Abundance",
        req: &[res(RES_FAITH, 80.0)],
        effects: &[yields(RES_GOLD, 0.8), modifier("desire", -1.0)],
    },
    PrayerDef {
        id: "desire_magic",
        name: "Desire for Magic",
        req: &[res(RES_FAITH, 80.0)],
        effects: &[yields(RES_MANA, 0.6), modifier("desire", -1.0)],
    },
    PrayerDef {
        id: "desire_war",
        name: "Desire for War",
        req: &[res(RES_FAITH, 80.0)],
        effects: &[modifier("army_power", 0.1), modifier("desire", -1.0)],
    },
    PrayerDef {
        id: "summon_nikharul",
        name: "Summon Nikharul",
        req: &[res(RES_FAITH, 200.0), res(RES_MANA, 150.0)],
        effects: &[modifier("nikharul", 1.0)],
    },
];

pub const SPELLS: &[SpellDef] = &[
    SpellDef {
        id: "armor_blessing",
        name: "Armor Blessing",
        mana_upkeep: 0.4,
    },
    SpellDef {
        id: "holy_fury",
        name: "Holy Fury",
        mana_upkeep: 0.6,
    },
    SpellDef {
        id: "mana_shield",
        name: "Mana Shield",
        mana_upkeep: 0.8,
    },
    SpellDef {
        id: "swift_feet",
        name: "Swift Feet",
        mana_upkeep: 0.3,
    },
];

pub const ENCOUNTERS: &[EncounterDef] = &[
    EncounterDef {
        id: "rat_nest",
        name: "Rat Nest",
        difficulty: 1,
        level: 1,
        power: 12.0,
    },
    EncounterDef {
        id: "cave_bats",
        name: "Cave of Bats",
        difficulty: 1,
        level: 2,
        power: 20.0,
    },
    EncounterDef {
        id: "wolf_pack",
        name: "Wolf Pack",
        difficulty: 2,
        level: 4,
        power: 45.0,
    },
    EncounterDef {
        id: "bandit_camp",
        name: "Bandit Camp",
        difficulty: 2,
        level: 6,
        power: 70.0,
    },
    EncounterDef {
        id: "goblin_lair",
        name: "Goblin Lair",
        difficulty: 3,
        level: 9,
        power: 120.0,
    },
    EncounterDef {
        id: "barbarian_village",
        name: "Barbarian Village",
        difficulty: 3,
        level: 12,
        power: 160.0,
    },
    EncounterDef {
        id: "kobold_city",
        name: "Kobold City",
        difficulty: 4,
        level: 16,
        power: 240.0,
    },
    EncounterDef {
        id: "orcish_prison_camp",
        name: "Orcish Prison Camp",
        difficulty: 4,
        level: 20,
        power: 320.0,
    },
    EncounterDef {
        id: "skeletal_horde",
        name: "Skeletal Horde",
        difficulty: 4,
        level: 24,
        power: 400.0,
    },
    EncounterDef {
        id: "huge_cave",
        name: "Huge Cave",
        difficulty: 5,
        level: 30,
        power: 550.0,
    },
    EncounterDef {
        id: "dark_knight_patrol",
        name: "Dark Knight Patrol",
        difficulty: 5,
        level: 38,
        power: 750.0,
    },
];
