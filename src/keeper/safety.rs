use crate::catalog::{BuildingDef, PrayerDef, ResearchDef, TargetKind, RES_FOOD};

/// Strategic one-of choices and buildings with adverse side effects.
pub const BUILD_BLACKLIST: &[&str] = &[
    "pillar_mana",
    "statue_atamar",
    "statue_firio",
    "statue_lurezia",
    "harvest_shrine",
    "war_shrine",
    "mind_shrine",
    "fate_shrine_b",
    "fate_shrine_f",
];

/// Currencies the keeper never spends, whatever the building.
pub const NEVER_SPEND: &[&str] = &["luck"];

/// Research that triggers irreversible game events.
pub const DANGEROUS_RESEARCH: &[&str] = &["dark_ritual", "demonology"];

/// Prayers that trigger irreversible game events.
pub const DANGEROUS_PRAYERS: &[&str] = &["summon_nikharul"];

pub fn is_blacklisted(def: &BuildingDef) -> bool {
    if BUILD_BLACKLIST.contains(&def.id) {
        return true;
    }
    def.req
        .iter()
        .any(|cost| NEVER_SPEND.contains(&cost.resource))
}

/// A building draining food is allowed only while current food production
/// strictly exceeds the drain; breaking even is not good enough.
pub fn is_food_safe(def: &BuildingDef, food_production: f64) -> bool {
    let drain = def
        .effects
        .iter()
        .find(|effect| effect.kind == TargetKind::Resource && effect.target == RES_FOOD)
        .map(|effect| effect.value)
        .unwrap_or(0.0);
    if drain < 0.0 {
        food_production > drain.abs()
    } else {
        true
    }
}

/// No non-food resource's net production may be driven negative.
pub fn is_production_safe(def: &BuildingDef, net_production: impl Fn(&str) -> f64) -> bool {
    def.effects
        .iter()
        .filter(|effect| {
            effect.kind == TargetKind::Resource && effect.target != RES_FOOD && effect.value < 0.0
        })
        .all(|effect| net_production(effect.target) + effect.value >= 0.0)
}

pub fn is_safe_to_auto_build(def: &BuildingDef, net_production: impl Fn(&str) -> f64) -> bool {
    !is_blacklisted(def)
        && is_food_safe(def, net_production(RES_FOOD))
        && is_production_safe(def, net_production)
}

pub fn is_safe_research(def: &ResearchDef) -> bool {
    !def.needs_confirmation && !DANGEROUS_RESEARCH.contains(&def.id)
}

/// A prayer carrying a -1 effect on anything that is not a resource locks
/// out its siblings once chosen.
pub fn is_exclusive_prayer(def: &PrayerDef) -> bool {
    def.effects
        .iter()
        .any(|effect| effect.kind != TargetKind::Resource && effect.value == -1.0)
}

pub fn is_safe_prayer(def: &PrayerDef) -> bool {
    !DANGEROUS_PRAYERS.contains(&def.id) && !is_exclusive_prayer(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, BuildSubpage, Cost, Effect};

    fn flat_production(_: &str) -> f64 {
        10.0
    }

    #[test]
    fn static_blacklist_is_excluded_regardless_of_fit() {
        for id in BUILD_BLACKLIST {
            let def = catalog::building(id).expect("blacklisted id in catalog");
            assert!(is_blacklisted(def), "{id} should be blacklisted");
            assert!(!is_safe_to_auto_build(def, flat_production));
        }
    }

    #[test]
    fn luck_costs_are_never_spent() {
        let well = catalog::building("lucky_well").unwrap();
        assert!(is_blacklisted(well));
        assert!(!is_safe_to_auto_build(well, flat_production));
    }

    #[test]
    fn plain_buildings_pass_the_filter() {
        let farm = catalog::building("farm").unwrap();
        assert!(!is_blacklisted(farm));
        assert!(is_safe_to_auto_build(farm, flat_production));
    }

    fn drain_building(food_value: f64) -> BuildingDef {
        BuildingDef {
            id: "test_building",
            name: "Test Building",
            subpage: BuildSubpage::City,
            req: &[Cost {
                resource: "gold",
                amount: 10.0,
            }],
            effects: Box::leak(Box::new([Effect {
                kind: TargetKind::Resource,
                target: RES_FOOD,
                value: food_value,
            }])),
        }
    }

    #[test]
    fn food_safety_is_a_strict_inequality() {
        let house = drain_building(-0.5);
        assert!(is_food_safe(&house, 0.6));
        assert!(!is_food_safe(&house, 0.5));
        assert!(!is_food_safe(&house, 0.3));
        assert!(!is_food_safe(&house, -2.0));
    }

    #[test]
    fn food_producers_are_always_food_safe() {
        let farm = drain_building(0.5);
        assert!(is_food_safe(&farm, -2.0));
    }

    #[test]
    fn negative_non_food_production_is_rejected() {
        let pillar = catalog::building("pillar_mana").unwrap();
        // Gold drain of 1.0: fine at 1.0 gold/s, not at 0.8.
        assert!(is_production_safe(pillar, |_| 1.0));
        assert!(!is_production_safe(pillar, |_| 0.8));
    }

    #[test]
    fn confirmation_and_danger_exclude_research() {
        assert!(is_safe_research(catalog::research_entry("agriculture").unwrap()));
        assert!(!is_safe_research(
            catalog::research_entry("mysterious_arrival").unwrap()
        ));
        for id in DANGEROUS_RESEARCH {
            assert!(!is_safe_research(catalog::research_entry(id).unwrap()));
        }
    }

    #[test]
    fn exclusive_and_dangerous_prayers_are_left_to_the_human() {
        for id in ["desire_abundance", "desire_magic", "desire_war"] {
            let def = catalog::prayer(id).unwrap();
            assert!(is_exclusive_prayer(def), "{id} locks out siblings");
            assert!(!is_safe_prayer(def));
        }
        assert!(!is_safe_prayer(catalog::prayer("summon_nikharul").unwrap()));
        assert!(is_safe_prayer(catalog::prayer("prayer_mother_earth").unwrap()));
    }
}
