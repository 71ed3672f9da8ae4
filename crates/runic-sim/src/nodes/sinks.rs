//! Terminal nodes that consume Qi. None of them has an output.

use runic_core::{ElementType, QiValue};

use crate::node::{Node, NodeIo};

/// Puzzle sink that checks the received element and magnitude.
#[derive(Debug, Clone, Default)]
pub struct QiReceptacle {
    expected_element: Option<ElementType>,
    expected_magnitude: Option<u32>,
    last: QiValue,
}

impl QiReceptacle {
    pub fn new(expected_element: Option<ElementType>, expected_magnitude: Option<u32>) -> Self {
        QiReceptacle {
            expected_element,
            expected_magnitude,
            last: QiValue::EMPTY,
        }
    }
}

impl Node for QiReceptacle {
    fn type_name(&self) -> &'static str {
        "QiReceptacle"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }

        let mut valid = true;
        if let Some(expected) = self.expected_element.filter(|&e| e != value.element) {
            valid = false;
            io.log(format_args!(
                "[VALIDATION FAILED] Expected {expected}, got {}",
                value.element
            ));
        }
        if let Some(expected) = self.expected_magnitude.filter(|&m| m != value.magnitude) {
            valid = false;
            io.log(format_args!(
                "[VALIDATION FAILED] Expected magnitude {expected}, got {}",
                value.magnitude
            ));
        }
        if valid {
            io.log(format_args!(
                "[VALIDATED] Received {value} - Puzzle condition met!"
            ));
        }
        self.last = value;
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.last.clone())
    }
}

/// Safe disposal up to a bandwidth limit.
#[derive(Debug, Clone)]
pub struct VoidDrain {
    bandwidth: u32,
}

impl VoidDrain {
    pub const DEFAULT_BANDWIDTH: u32 = 10;

    pub fn new(bandwidth: u32) -> Self {
        VoidDrain { bandwidth }
    }
}

impl Default for VoidDrain {
    fn default() -> Self {
        VoidDrain::new(Self::DEFAULT_BANDWIDTH)
    }
}

impl Node for VoidDrain {
    fn type_name(&self) -> &'static str {
        "VoidDrain"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude <= self.bandwidth {
            io.log(format_args!("Dissipating {value} into Void (Safe)"));
        } else {
            io.log(format_args!(
                "[FAILURE] Void Overflow! Input {} > Limit {}",
                value.magnitude, self.bandwidth
            ));
        }
    }
}

/// Radiates Fire as harmless heat.
#[derive(Debug, Clone, Default)]
pub struct HeatSink;

impl Node for HeatSink {
    fn type_name(&self) -> &'static str {
        "HeatSink"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.element == ElementType::Fire {
            io.log(format_args!("Radiating {value} as harmless heat"));
        } else {
            io.log(format_args!(
                "[FAILURE] Incompatible Element {}! Heat Sink requires Fire.",
                value.element
            ));
        }
    }
}

/// Grounds Lightning and Tempest.
#[derive(Debug, Clone, Default)]
pub struct GroundingRod;

impl Node for GroundingRod {
    fn type_name(&self) -> &'static str {
        "GroundingRod"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if matches!(value.element, ElementType::Lightning | ElementType::Tempest) {
            io.log(format_args!("Grounding {value} into earth safely"));
        } else {
            io.log(format_args!(
                "[FAILURE] Incompatible Element {}! Grounding Rod requires Lightning/Tempest.",
                value.element
            ));
        }
    }
}

/// Vents anything, damaging the surroundings; explodes above its bandwidth.
#[derive(Debug, Clone)]
pub struct UnstableVent {
    bandwidth: u32,
}

impl UnstableVent {
    pub const DEFAULT_BANDWIDTH: u32 = 50;

    pub fn new(bandwidth: u32) -> Self {
        UnstableVent { bandwidth }
    }
}

impl Default for UnstableVent {
    fn default() -> Self {
        UnstableVent::new(Self::DEFAULT_BANDWIDTH)
    }
}

impl Node for UnstableVent {
    fn type_name(&self) -> &'static str {
        "UnstableVent"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude <= self.bandwidth {
            io.log(format_args!(
                "[SIDE EFFECT] Venting {value} - Damaging surroundings!"
            ));
        } else {
            io.log(format_args!(
                "[EXPLOSION] Vent overflow! Input {} > Limit {}. Catastrophic damage!",
                value.magnitude, self.bandwidth
            ));
        }
    }
}

/// Absorbs Qi into the user; the part above the safe limit is reflected.
#[derive(Debug, Clone)]
pub struct BacklashNode {
    safe_limit: u32,
}

impl BacklashNode {
    pub const DEFAULT_SAFE_LIMIT: u32 = 30;

    pub fn new(safe_limit: u32) -> Self {
        BacklashNode { safe_limit }
    }
}

impl Default for BacklashNode {
    fn default() -> Self {
        BacklashNode::new(Self::DEFAULT_SAFE_LIMIT)
    }
}

impl Node for BacklashNode {
    fn type_name(&self) -> &'static str {
        "BacklashNode"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude <= self.safe_limit {
            io.log(format_args!("Absorbing {value} - Minor backlash to user"));
        } else {
            io.log(format_args!(
                "[BACKLASH] Reflecting {} units of {} to user! Self-damage!",
                value.magnitude - self.safe_limit,
                value.element
            ));
        }
    }
}

/// Dumps Qi into the environment, keeping a running pollution total.
#[derive(Debug, Clone, Default)]
pub struct CorruptionSeep {
    total: u64,
}

impl CorruptionSeep {
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Node for CorruptionSeep {
    fn type_name(&self) -> &'static str {
        "CorruptionSeep"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        self.total += u64::from(value.magnitude);
        io.log(format_args!(
            "[POLLUTION] Seeping {value} into environment. Total corruption: {}",
            self.total
        ));
    }
}
