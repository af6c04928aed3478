use crate::catalog::EncounterDef;
use crate::keeper::surface::OracleFlags;
use std::collections::HashSet;

/// Effective power brought to a prospective fight.
pub fn attack_rating(army_power: f64, active_spells: &HashSet<String>, flags: OracleFlags) -> f64 {
    let mut rating = army_power;
    if flags.hold_garrison {
        rating *= 0.8;
    }
    if flags.count_active_spells && active_spells.contains("holy_fury") {
        rating *= 1.15;
    }
    rating
}

pub fn predicts_victory(rating: f64, encounter: &EncounterDef) -> bool {
    rating >= encounter.power
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn garrison_and_spells_shift_the_rating() {
        let spells = HashSet::from(["holy_fury".to_string()]);
        let base = attack_rating(100.0, &spells, OracleFlags::default());
        assert_eq!(base, 100.0);

        let held = attack_rating(
            100.0,
            &spells,
            OracleFlags {
                hold_garrison: true,
                count_active_spells: false,
            },
        );
        assert!(held < base);

        let blessed = attack_rating(
            100.0,
            &spells,
            OracleFlags {
                hold_garrison: false,
                count_active_spells: true,
            },
        );
        assert!(blessed > base);
    }

    #[test]
    fn victory_needs_at_least_matching_power() {
        let rat_nest = catalog::encounter("rat_nest").unwrap();
        assert!(predicts_victory(rat_nest.power, rat_nest));
        assert!(!predicts_victory(rat_nest.power - 0.1, rat_nest));
    }
}
