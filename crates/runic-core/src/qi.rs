//! Immutable Qi quantities.
//!
//! A [`QiValue`] is an element, a magnitude and a stability counter (TTL).
//! Values may additionally carry a [`QiEffect`] tag, marking energy that an
//! emitter has already interpreted as an effect. Equality is structural over
//! all fields, so a tagged value never equals a raw value with the same
//! stats.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;

/// Descriptive tag attached to interpreted energy. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QiEffect(String);

impl QiEffect {
    /// Creates a tag, returning `None` for an empty string.
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            None
        } else {
            Some(QiEffect(tag))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QiEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An element quantity.
///
/// `ttl == 0` means stable; `ttl > 0` counts down to decay (see
/// [`crate::interaction::process_decay`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QiValue {
    pub element: ElementType,
    pub magnitude: u32,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<QiEffect>,
}

impl QiValue {
    /// The canonical empty value: `None(0)`.
    pub const EMPTY: QiValue = QiValue {
        element: ElementType::None,
        magnitude: 0,
        ttl: 0,
        effect: None,
    };

    /// A stable value.
    pub fn new(element: ElementType, magnitude: u32) -> Self {
        QiValue {
            element,
            magnitude,
            ttl: 0,
            effect: None,
        }
    }

    /// A value with an explicit TTL.
    pub fn with_ttl(element: ElementType, magnitude: u32, ttl: u32) -> Self {
        QiValue {
            element,
            magnitude,
            ttl,
            effect: None,
        }
    }

    pub fn empty() -> Self {
        QiValue::EMPTY
    }

    /// Empty when there is no magnitude or no element.
    pub fn is_empty(&self) -> bool {
        self.magnitude == 0 || self.element == ElementType::None
    }

    pub fn is_stable(&self) -> bool {
        self.ttl == 0
    }

    pub fn is_effect(&self) -> bool {
        self.effect.is_some()
    }

    pub fn effect_tag(&self) -> Option<&str> {
        self.effect.as_ref().map(QiEffect::as_str)
    }

    /// Tags this value as an interpreted effect. An empty tag leaves the
    /// value raw.
    pub fn into_effect(mut self, tag: impl Into<String>) -> Self {
        self.effect = QiEffect::new(tag);
        self
    }

    /// Copies the stats without any effect tag.
    pub fn raw(&self) -> Self {
        QiValue::with_ttl(self.element, self.magnitude, self.ttl)
    }

    /// Same element and TTL with a different magnitude.
    pub fn with_magnitude(&self, magnitude: u32) -> Self {
        QiValue::with_ttl(self.element, magnitude, self.ttl)
    }
}

impl fmt::Display for QiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.element, self.magnitude)?;
        if self.ttl > 0 {
            write!(f, "[TTL:{}]", self.ttl)?;
        }
        if let Some(effect) = &self.effect {
            write!(f, " [Effect:{}]", effect)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_no_magnitude_or_no_element() {
        assert!(QiValue::EMPTY.is_empty());
        assert!(QiValue::new(ElementType::Fire, 0).is_empty());
        assert!(QiValue::new(ElementType::None, 5).is_empty());
        assert!(!QiValue::new(ElementType::Fire, 1).is_empty());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(
            QiValue::with_ttl(ElementType::Steam, 10, 3),
            QiValue::with_ttl(ElementType::Steam, 10, 3)
        );
        assert_ne!(
            QiValue::with_ttl(ElementType::Steam, 10, 3),
            QiValue::with_ttl(ElementType::Steam, 10, 2)
        );
    }

    #[test]
    fn effect_never_equals_raw_value() {
        let raw = QiValue::new(ElementType::Fire, 10);
        let effect = raw.clone().into_effect("Burn");
        assert_ne!(raw, effect);
        assert_eq!(effect.raw(), raw);
        assert_eq!(effect.effect_tag(), Some("Burn"));
    }

    #[test]
    fn effects_compare_by_tag() {
        let a = QiValue::new(ElementType::Fire, 10).into_effect("Burn");
        let b = QiValue::new(ElementType::Fire, 10).into_effect("Burn");
        let c = QiValue::new(ElementType::Fire, 10).into_effect("Scorch");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_tag_is_rejected() {
        assert!(QiEffect::new("").is_none());
        assert!(!QiValue::new(ElementType::Fire, 1).into_effect("").is_effect());
    }

    #[test]
    fn display_formats() {
        assert_eq!(QiValue::new(ElementType::Fire, 5).to_string(), "Fire(5)");
        assert_eq!(
            QiValue::with_ttl(ElementType::Steam, 10, 3).to_string(),
            "Steam(10)[TTL:3]"
        );
        assert_eq!(
            QiValue::new(ElementType::Water, 4).into_effect("Shield").to_string(),
            "Water(4) [Effect:Shield]"
        );
    }
}
