//! Element taxonomy for Qi energy.
//!
//! Every [`ElementType`] falls into one of three classes:
//! - **Primary** (Wood, Fire, Earth, Metal, Water): stable, take part in the
//!   generation and overcoming cycles.
//! - **Auxiliary** (Lightning, Wind): stable, combine with primaries.
//! - **Derived** (Charcoal, Steam, Tempest, ...): produced by combining two
//!   elements, unstable until they decay back into a parent.
//!
//! `None` marks the absence of energy and is never a valid combination input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Classification of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    None,
    Primary,
    Auxiliary,
    Derived,
}

/// Tagged category of Qi.
///
/// The declaration order is significant: unordered combination pairs are
/// normalized by comparing discriminants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ElementType {
    #[default]
    None,
    // Primary
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
    // Auxiliary
    Lightning,
    Wind,
    // Primary + Primary
    Charcoal,
    FertileSoil,
    Splinter,
    LifeSap,
    Magma,
    Slag,
    Steam,
    Ore,
    Mud,
    Ice,
    // Primary + Auxiliary
    Spore,
    ThornStorm,
    Wildfire,
    Plasma,
    Dust,
    Quartz,
    BladeWind,
    Magnetism,
    Mist,
    Storm,
    // Auxiliary + Auxiliary
    Tempest,
}

impl ElementType {
    /// All elements, `None` included, in declaration order.
    pub const ALL: [ElementType; 29] = [
        ElementType::None,
        ElementType::Wood,
        ElementType::Fire,
        ElementType::Earth,
        ElementType::Metal,
        ElementType::Water,
        ElementType::Lightning,
        ElementType::Wind,
        ElementType::Charcoal,
        ElementType::FertileSoil,
        ElementType::Splinter,
        ElementType::LifeSap,
        ElementType::Magma,
        ElementType::Slag,
        ElementType::Steam,
        ElementType::Ore,
        ElementType::Mud,
        ElementType::Ice,
        ElementType::Spore,
        ElementType::ThornStorm,
        ElementType::Wildfire,
        ElementType::Plasma,
        ElementType::Dust,
        ElementType::Quartz,
        ElementType::BladeWind,
        ElementType::Magnetism,
        ElementType::Mist,
        ElementType::Storm,
        ElementType::Tempest,
    ];

    /// The five primary elements in generation-cycle order.
    pub const PRIMARY: [ElementType; 5] = [
        ElementType::Wood,
        ElementType::Fire,
        ElementType::Earth,
        ElementType::Metal,
        ElementType::Water,
    ];

    /// The two auxiliary elements.
    pub const AUXILIARY: [ElementType; 2] = [ElementType::Lightning, ElementType::Wind];

    /// Returns the class this element belongs to.
    pub fn class(self) -> ElementClass {
        match self {
            ElementType::None => ElementClass::None,
            ElementType::Wood
            | ElementType::Fire
            | ElementType::Earth
            | ElementType::Metal
            | ElementType::Water => ElementClass::Primary,
            ElementType::Lightning | ElementType::Wind => ElementClass::Auxiliary,
            _ => ElementClass::Derived,
        }
    }

    pub fn is_primary(self) -> bool {
        self.class() == ElementClass::Primary
    }

    pub fn is_auxiliary(self) -> bool {
        self.class() == ElementClass::Auxiliary
    }

    pub fn is_derived(self) -> bool {
        self.class() == ElementClass::Derived
    }

    /// Canonical name, identical to the RunicHDL spelling.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::None => "None",
            ElementType::Wood => "Wood",
            ElementType::Fire => "Fire",
            ElementType::Earth => "Earth",
            ElementType::Metal => "Metal",
            ElementType::Water => "Water",
            ElementType::Lightning => "Lightning",
            ElementType::Wind => "Wind",
            ElementType::Charcoal => "Charcoal",
            ElementType::FertileSoil => "FertileSoil",
            ElementType::Splinter => "Splinter",
            ElementType::LifeSap => "LifeSap",
            ElementType::Magma => "Magma",
            ElementType::Slag => "Slag",
            ElementType::Steam => "Steam",
            ElementType::Ore => "Ore",
            ElementType::Mud => "Mud",
            ElementType::Ice => "Ice",
            ElementType::Spore => "Spore",
            ElementType::ThornStorm => "ThornStorm",
            ElementType::Wildfire => "Wildfire",
            ElementType::Plasma => "Plasma",
            ElementType::Dust => "Dust",
            ElementType::Quartz => "Quartz",
            ElementType::BladeWind => "BladeWind",
            ElementType::Magnetism => "Magnetism",
            ElementType::Mist => "Mist",
            ElementType::Storm => "Storm",
            ElementType::Tempest => "Tempest",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| CoreError::UnknownElement {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_partition_all_elements() {
        let primary = ElementType::ALL.iter().filter(|e| e.is_primary()).count();
        let auxiliary = ElementType::ALL.iter().filter(|e| e.is_auxiliary()).count();
        let derived = ElementType::ALL.iter().filter(|e| e.is_derived()).count();
        assert_eq!(primary, 5);
        assert_eq!(auxiliary, 2);
        assert_eq!(derived, 21);
        assert_eq!(ElementType::None.class(), ElementClass::None);
    }

    #[test]
    fn parse_and_display_agree() {
        for element in ElementType::ALL {
            let parsed: ElementType = element.name().parse().unwrap();
            assert_eq!(parsed, element);
            assert_eq!(element.to_string(), element.name());
        }
    }

    #[test]
    fn parse_unknown_element_fails() {
        let err = "Aether".parse::<ElementType>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownElement { ref name } if name == "Aether"));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("fire".parse::<ElementType>().is_err());
    }
}
