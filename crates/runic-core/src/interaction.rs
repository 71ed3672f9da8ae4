//! Element interaction algebra.
//!
//! Pure functions over [`ElementType`] and [`QiValue`]:
//! - [`generation_child`] / [`overcomes`]: the two primary five-cycles.
//! - [`combine`]: additive merge for equal elements, table lookup for
//!   equal-magnitude pairs of different elements.
//! - [`process_decay`]: TTL countdown and reversion of derived elements.
//!
//! The combination and decay tables are fixed. Unequal-magnitude merges of
//! different elements destroy the energy of both operands; that loss is a
//! modelling rule of the algebra, not an invariant callers can rely on for
//! conservation.

use crate::element::ElementType;
use crate::qi::QiValue;

/// Magnitude kept when a derived element decays, as a fraction (4/5 = 80%).
const DECAY_RETAINED_NUMERATOR: u64 = 4;
const DECAY_RETAINED_DENOMINATOR: u64 = 5;

/// The element generated by `parent` in the generation cycle
/// (Wood -> Fire -> Earth -> Metal -> Water -> Wood).
///
/// Returns `None` for anything outside the primary cycle.
pub fn generation_child(parent: ElementType) -> Option<ElementType> {
    use ElementType::*;
    match parent {
        Wood => Some(Fire),
        Fire => Some(Earth),
        Earth => Some(Metal),
        Metal => Some(Water),
        Water => Some(Wood),
        _ => Option::None,
    }
}

/// The element suppressed by `suppressor` in the overcoming cycle
/// (Wood -> Earth -> Water -> Fire -> Metal -> Wood).
pub fn overcome_target(suppressor: ElementType) -> Option<ElementType> {
    use ElementType::*;
    match suppressor {
        Wood => Some(Earth),
        Earth => Some(Water),
        Water => Some(Fire),
        Fire => Some(Metal),
        Metal => Some(Wood),
        _ => Option::None,
    }
}

/// Returns `true` if `suppressor` overcomes `target`.
pub fn overcomes(suppressor: ElementType, target: ElementType) -> bool {
    overcome_target(suppressor) == Some(target)
}

/// Looks up the derived element and TTL for an unordered pair.
pub fn combination(a: ElementType, b: ElementType) -> Option<(ElementType, u32)> {
    use ElementType::*;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let entry = match (lo, hi) {
        // Primary + Primary
        (Wood, Fire) => (Charcoal, 4),
        (Wood, Earth) => (FertileSoil, 5),
        (Wood, Metal) => (Splinter, 3),
        (Wood, Water) => (LifeSap, 4),
        (Fire, Earth) => (Magma, 4),
        (Fire, Metal) => (Slag, 3),
        (Fire, Water) => (Steam, 3),
        (Earth, Metal) => (Ore, 6),
        (Earth, Water) => (Mud, 5),
        (Metal, Water) => (Ice, 5),
        // Primary + Auxiliary
        (Wood, Wind) => (Spore, 2),
        (Wood, Lightning) => (ThornStorm, 2),
        (Fire, Wind) => (Wildfire, 2),
        (Fire, Lightning) => (Plasma, 2),
        (Earth, Wind) => (Dust, 2),
        (Earth, Lightning) => (Quartz, 4),
        (Metal, Wind) => (BladeWind, 2),
        (Metal, Lightning) => (Magnetism, 3),
        (Water, Wind) => (Mist, 3),
        (Water, Lightning) => (Storm, 2),
        // Auxiliary + Auxiliary
        (Lightning, Wind) => (Tempest, 2),
        _ => return Option::None,
    };
    Some(entry)
}

/// The stable parent a derived element reverts to.
pub fn decay_parent(element: ElementType) -> Option<ElementType> {
    use ElementType::*;
    let parent = match element {
        Charcoal => Fire,
        FertileSoil => Earth,
        Splinter => Wood,
        LifeSap => Water,
        Magma => Earth,
        Slag => Metal,
        Steam => Water,
        Ore => Metal,
        Mud => Earth,
        Ice => Water,
        Spore => Wood,
        ThornStorm => Wood,
        Wildfire => Fire,
        Plasma => Fire,
        Dust => Earth,
        Quartz => Earth,
        BladeWind => Metal,
        Magnetism => Metal,
        Mist => Water,
        Storm => Water,
        Tempest => Wind,
        _ => return Option::None,
    };
    Some(parent)
}

/// Detailed outcome of merging two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combination {
    /// One side was empty; the other passes through unchanged.
    Passthrough(QiValue),
    /// Same element: magnitudes added, TTL = max.
    Merged(QiValue),
    /// Different elements of equal magnitude formed a derived element.
    Derived(QiValue),
    /// Different elements of unequal magnitude. Both operands are lost.
    Deviation { left: QiValue, right: QiValue },
    /// Equal magnitudes but no table entry for the pair.
    Incompatible { left: QiValue, right: QiValue },
}

impl Combination {
    /// The resulting value (empty for deviations and incompatible pairs).
    pub fn value(&self) -> QiValue {
        match self {
            Combination::Passthrough(v) | Combination::Merged(v) | Combination::Derived(v) => {
                v.clone()
            }
            Combination::Deviation { .. } | Combination::Incompatible { .. } => QiValue::EMPTY,
        }
    }

    /// Returns `true` when non-empty energy was destroyed by the merge.
    pub fn is_loss(&self) -> bool {
        matches!(
            self,
            Combination::Deviation { .. } | Combination::Incompatible { .. }
        )
    }
}

/// Merges two values, reporting how the merge resolved.
pub fn combine_detailed(a: &QiValue, b: &QiValue) -> Combination {
    if a.is_empty() {
        return Combination::Passthrough(b.clone());
    }
    if b.is_empty() {
        return Combination::Passthrough(a.clone());
    }

    if a.element == b.element {
        return Combination::Merged(QiValue::with_ttl(
            a.element,
            a.magnitude.saturating_add(b.magnitude),
            a.ttl.max(b.ttl),
        ));
    }

    if a.magnitude != b.magnitude {
        return Combination::Deviation {
            left: a.clone(),
            right: b.clone(),
        };
    }

    match combination(a.element, b.element) {
        Some((derived, ttl)) => Combination::Derived(QiValue::with_ttl(
            derived,
            a.magnitude.saturating_add(b.magnitude),
            ttl,
        )),
        None => Combination::Incompatible {
            left: a.clone(),
            right: b.clone(),
        },
    }
}

/// Merges two values. See [`combine_detailed`] for the rules.
pub fn combine(a: &QiValue, b: &QiValue) -> QiValue {
    combine_detailed(a, b).value()
}

/// Advances the decay of a value by one step.
///
/// Stable and empty values pass through. Otherwise the TTL is decremented;
/// when it reaches zero the value reverts to its parent element at 80% of
/// its magnitude (truncated) and becomes stable.
pub fn process_decay(value: &QiValue) -> QiValue {
    if value.is_stable() || value.is_empty() {
        return value.clone();
    }

    let ttl = value.ttl - 1;
    if ttl > 0 {
        let mut next = value.clone();
        next.ttl = ttl;
        return next;
    }

    match decay_parent(value.element) {
        Some(parent) => QiValue::new(parent, decayed_magnitude(value.magnitude)),
        None => QiValue::EMPTY,
    }
}

fn decayed_magnitude(magnitude: u32) -> u32 {
    (u64::from(magnitude) * DECAY_RETAINED_NUMERATOR / DECAY_RETAINED_DENOMINATOR) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ElementType::{Earth, Fire, Ice, Lightning, Metal, Steam, Tempest, Water, Wind, Wood};

    fn derived_elements() -> Vec<ElementType> {
        ElementType::ALL
            .iter()
            .copied()
            .filter(|e| e.is_derived())
            .collect()
    }

    #[test]
    fn generation_cycle_order() {
        assert_eq!(generation_child(Wood), Some(Fire));
        assert_eq!(generation_child(Fire), Some(Earth));
        assert_eq!(generation_child(Earth), Some(Metal));
        assert_eq!(generation_child(Metal), Some(Water));
        assert_eq!(generation_child(Water), Some(Wood));
        assert_eq!(generation_child(Steam), Option::None);
        assert_eq!(generation_child(ElementType::None), Option::None);
    }

    #[test]
    fn overcoming_cycle_order() {
        assert!(overcomes(Wood, Earth));
        assert!(overcomes(Earth, Water));
        assert!(overcomes(Water, Fire));
        assert!(overcomes(Fire, Metal));
        assert!(overcomes(Metal, Wood));
        assert!(!overcomes(Earth, Wood));
        assert!(!overcomes(Lightning, Wind));
    }

    #[test]
    fn combination_table_has_21_pairs() {
        let mut count = 0;
        for a in ElementType::ALL {
            for b in ElementType::ALL {
                if a < b && combination(a, b).is_some() {
                    count += 1;
                }
            }
        }
        assert_eq!(count, 21);
    }

    #[test]
    fn every_derived_element_has_a_parent_and_a_recipe() {
        for derived in derived_elements() {
            assert!(decay_parent(derived).is_some(), "{derived} has no parent");
            let produced = ElementType::ALL.iter().any(|&a| {
                ElementType::ALL
                    .iter()
                    .any(|&b| combination(a, b).map(|(e, _)| e) == Some(derived))
            });
            assert!(produced, "{derived} has no recipe");
        }
    }

    #[test]
    fn water_and_fire_make_steam() {
        let steam = combine(&QiValue::new(Water, 5), &QiValue::new(Fire, 5));
        assert_eq!(steam, QiValue::with_ttl(Steam, 10, 3));
    }

    #[test]
    fn unequal_magnitudes_deviate() {
        let outcome = combine_detailed(&QiValue::new(Water, 5), &QiValue::new(Fire, 4));
        assert!(matches!(outcome, Combination::Deviation { .. }));
        assert!(outcome.value().is_empty());
        assert!(outcome.is_loss());
    }

    #[test]
    fn pairs_without_recipe_are_incompatible() {
        let outcome = combine_detailed(&QiValue::new(Steam, 5), &QiValue::new(Fire, 5));
        assert!(matches!(outcome, Combination::Incompatible { .. }));
        assert!(outcome.value().is_empty());
    }

    #[test]
    fn same_element_takes_max_ttl() {
        let merged = combine(
            &QiValue::with_ttl(Steam, 4, 1),
            &QiValue::with_ttl(Steam, 6, 3),
        );
        assert_eq!(merged, QiValue::with_ttl(Steam, 10, 3));
    }

    #[test]
    fn empty_passes_the_other_side_through_unchanged() {
        let effect = QiValue::new(Fire, 3).into_effect("Burn");
        assert_eq!(combine(&QiValue::EMPTY, &effect), effect);
        assert_eq!(combine(&effect, &QiValue::EMPTY), effect);
    }

    #[test]
    fn decay_counts_down_then_reverts() {
        let steam = QiValue::with_ttl(Steam, 10, 3);
        let step1 = process_decay(&steam);
        assert_eq!(step1, QiValue::with_ttl(Steam, 10, 2));
        let step2 = process_decay(&step1);
        assert_eq!(step2, QiValue::with_ttl(Steam, 10, 1));
        let step3 = process_decay(&step2);
        assert_eq!(step3, QiValue::new(Water, 8));
    }

    #[test]
    fn decay_truncates_magnitude() {
        let ice = QiValue::with_ttl(Ice, 7, 1);
        assert_eq!(process_decay(&ice), QiValue::new(Water, 5));
    }

    #[test]
    fn tempest_decays_to_wind() {
        assert_eq!(
            process_decay(&QiValue::with_ttl(Tempest, 10, 1)),
            QiValue::new(Wind, 8)
        );
    }

    #[test]
    fn decay_ignores_stable_and_empty() {
        let fire = QiValue::new(Fire, 5);
        assert_eq!(process_decay(&fire), fire);
        assert_eq!(process_decay(&QiValue::EMPTY), QiValue::EMPTY);
    }

    fn primary() -> impl Strategy<Value = ElementType> {
        prop::sample::select(ElementType::PRIMARY.to_vec())
    }

    fn any_element() -> impl Strategy<Value = ElementType> {
        prop::sample::select(ElementType::ALL.to_vec())
    }

    fn derived() -> impl Strategy<Value = ElementType> {
        prop::sample::select(derived_elements())
    }

    proptest! {
        #[test]
        fn generation_cycle_closes_after_five(e in primary()) {
            let mut current = e;
            for _ in 0..5 {
                current = generation_child(current).unwrap();
            }
            prop_assert_eq!(current, e);
        }

        #[test]
        fn overcoming_cycle_closes_after_five(e in primary()) {
            let mut current = e;
            for _ in 0..5 {
                current = overcome_target(current).unwrap();
            }
            prop_assert_eq!(current, e);
        }

        #[test]
        fn combine_with_empty_is_identity(
            e in any_element(),
            m in 0u32..1000,
            ttl in 0u32..10,
        ) {
            let a = QiValue::with_ttl(e, m, ttl);
            prop_assert_eq!(combine(&a, &QiValue::EMPTY), a.clone());
            prop_assert_eq!(combine(&QiValue::EMPTY, &a), a);
        }

        #[test]
        fn same_element_merge_commutes_and_adds(
            e in primary(),
            m1 in 1u32..1000,
            m2 in 1u32..1000,
            t1 in 0u32..10,
            t2 in 0u32..10,
        ) {
            let a = QiValue::with_ttl(e, m1, t1);
            let b = QiValue::with_ttl(e, m2, t2);
            let ab = combine(&a, &b);
            prop_assert_eq!(ab.clone(), combine(&b, &a));
            prop_assert_eq!(ab.magnitude, m1 + m2);
            prop_assert_eq!(ab.ttl, t1.max(t2));
        }

        #[test]
        fn equal_magnitude_pairs_commute(a in any_element(), b in any_element(), m in 1u32..500) {
            let left = QiValue::new(a, m);
            let right = QiValue::new(b, m);
            prop_assert_eq!(combine(&left, &right), combine(&right, &left));
        }

        #[test]
        fn decay_reaches_stable_parent_after_ttl_steps(
            e in derived(),
            m in 0u32..10_000,
            ttl in 1u32..8,
        ) {
            prop_assume!(m > 0);
            let mut value = QiValue::with_ttl(e, m, ttl);
            for _ in 0..ttl {
                value = process_decay(&value);
            }
            prop_assert!(value.is_stable());
            prop_assert_eq!(value.element, decay_parent(e).unwrap());
            prop_assert_eq!(value.magnitude, (m as u64 * 4 / 5) as u32);
        }

        #[test]
        fn decay_of_stable_is_noop(e in any_element(), m in 0u32..1000) {
            let v = QiValue::new(e, m);
            prop_assert_eq!(process_decay(&v), v);
        }
    }
}
