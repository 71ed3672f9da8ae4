//! Nodes that alter the stability of passing Qi.
//!
//! Stable values always pass through untouched.

use runic_core::interaction::process_decay;
use runic_core::{ElementType, QiValue};

use crate::node::{Node, NodeIo};

/// Extends the TTL of unstable values by a fixed bonus.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    bonus: u32,
}

impl Stabilizer {
    pub const DEFAULT_BONUS: u32 = 2;

    pub fn new(bonus: u32) -> Self {
        Stabilizer { bonus }
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Stabilizer::new(Self::DEFAULT_BONUS)
    }
}

impl Node for Stabilizer {
    fn type_name(&self) -> &'static str {
        "Stabilizer"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.is_stable() {
            io.log(format_args!("Passing {value} (already stable)"));
            io.write(0, value);
            return;
        }
        let mut output = value.clone();
        output.ttl = output.ttl.saturating_add(self.bonus);
        io.log(format_args!("Stabilizing {value} (+{} TTL)", self.bonus));
        io.write(0, output);
    }
}

/// Shortens the TTL of unstable values, decaying them on the spot when the
/// TTL runs out.
#[derive(Debug, Clone)]
pub struct Catalyst {
    reduction: u32,
}

impl Catalyst {
    pub const DEFAULT_REDUCTION: u32 = 2;

    pub fn new(reduction: u32) -> Self {
        Catalyst { reduction }
    }
}

impl Default for Catalyst {
    fn default() -> Self {
        Catalyst::new(Self::DEFAULT_REDUCTION)
    }
}

impl Node for Catalyst {
    fn type_name(&self) -> &'static str {
        "Catalyst"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.is_stable() {
            io.log(format_args!("Passing {value} (already stable)"));
            io.write(0, value);
            return;
        }

        let ttl = value.ttl.saturating_sub(self.reduction);
        let output = if ttl > 0 {
            let mut shortened = value.clone();
            shortened.ttl = ttl;
            shortened
        } else {
            // One decay step from TTL 1 reverts to the parent element.
            process_decay(&QiValue::with_ttl(value.element, value.magnitude, 1))
        };
        io.log(format_args!(
            "Catalyzing {value} -> {output} (-{} TTL, accelerated decay)",
            self.reduction
        ));
        io.write(0, output);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChamberKind {
    Cooling,
    Heating,
}

/// Extends the TTL of matching unstable values by half.
///
/// Cooling matches Water, Ice, Mist and Metal. Heating matches Fire, Magma,
/// Plasma and Steam.
#[derive(Debug, Clone)]
pub struct Chamber {
    kind: ChamberKind,
}

impl Chamber {
    pub fn cooling() -> Self {
        Chamber {
            kind: ChamberKind::Cooling,
        }
    }

    pub fn heating() -> Self {
        Chamber {
            kind: ChamberKind::Heating,
        }
    }

    fn matches(&self, element: ElementType) -> bool {
        use ElementType::*;
        match self.kind {
            ChamberKind::Cooling => matches!(element, Water | Ice | Mist | Metal),
            ChamberKind::Heating => matches!(element, Fire | Magma | Plasma | Steam),
        }
    }

    fn describe(&self) -> (&'static str, &'static str) {
        match self.kind {
            ChamberKind::Cooling => ("Cooling", "cold"),
            ChamberKind::Heating => ("Heating", "heat"),
        }
    }
}

impl Node for Chamber {
    fn type_name(&self) -> &'static str {
        match self.kind {
            ChamberKind::Cooling => "CoolingChamber",
            ChamberKind::Heating => "HeatingChamber",
        }
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        let (verb, class) = self.describe();
        if !self.matches(value.element) {
            io.log(format_args!(
                "Passing {value} (no TTL bonus for non-{class} elements)"
            ));
            io.write(0, value);
            return;
        }
        if value.is_stable() {
            io.log(format_args!("Passing {value} (already stable)"));
            io.write(0, value);
            return;
        }

        let mut output = value.clone();
        output.ttl = output.ttl.saturating_add(output.ttl / 2);
        io.log(format_args!(
            "{verb} {value} (+50% TTL for {class} elements)"
        ));
        io.write(0, output);
    }
}
