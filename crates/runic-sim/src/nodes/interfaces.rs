//! Interface nodes: where Qi leaves the formation as an effect or signal,
//! plus the synthetic formation boundary nodes.

use runic_core::registry::{FORMATION_INPUT, FORMATION_OUTPUT};
use runic_core::{AmplitudeSpec, ElementType, QiValue};

use crate::node::{Node, NodeIo};

/// Interprets raw Qi as an effect and tags it.
#[derive(Debug, Clone, Default)]
pub struct EffectEmitter {
    tag: Option<String>,
}

impl EffectEmitter {
    /// `tag` replaces the element's default effect name.
    pub fn new(tag: Option<String>) -> Self {
        EffectEmitter { tag }
    }

    /// Default effect name for an element.
    pub fn effect_name(element: ElementType) -> String {
        match element {
            ElementType::Fire => "Thermal Projection (Burn)".to_string(),
            ElementType::Water => "Hydro Barrier (Shield)".to_string(),
            ElementType::Wood => "Regeneration Aura (Heal)".to_string(),
            ElementType::Metal => "Kinetic Blade (Cut)".to_string(),
            ElementType::Earth => "Mass Solidification (Block)".to_string(),
            ElementType::Lightning => "Arc Discharge (Shock)".to_string(),
            other => format!("Raw {other} Release"),
        }
    }
}

impl Node for EffectEmitter {
    fn type_name(&self) -> &'static str {
        "EffectEmitter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            io.clear(0);
            return;
        }
        let effect = self
            .tag
            .clone()
            .unwrap_or_else(|| Self::effect_name(value.element));
        io.log(format_args!(
            "ACTIVATED > {effect} [Power: {}]",
            value.magnitude
        ));
        io.write(0, value.raw().into_effect(effect));
    }
}

/// Records what it receives. Also stands in for a formation `output` port.
#[derive(Debug, Clone)]
pub struct StableEmitter {
    type_name: &'static str,
    last: QiValue,
    history: Vec<QiValue>,
}

impl StableEmitter {
    pub fn new() -> Self {
        StableEmitter {
            type_name: "StableEmitter",
            last: QiValue::EMPTY,
            history: Vec::new(),
        }
    }

    /// The synthetic sink for a formation-level `output` port.
    pub fn formation_output() -> Self {
        StableEmitter {
            type_name: FORMATION_OUTPUT,
            ..StableEmitter::new()
        }
    }
}

impl Default for StableEmitter {
    fn default() -> Self {
        StableEmitter::new()
    }
}

impl Node for StableEmitter {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        self.last = io.input(0).clone();
        if !self.last.is_empty() {
            io.log(format_args!("EMIT {}", self.last));
            self.history.push(self.last.clone());
        }
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.last.clone())
    }

    fn history(&self) -> &[QiValue] {
        &self.history
    }
}

/// Emits up to a threshold; the overflow goes to `feedback`.
#[derive(Debug, Clone)]
pub struct OverrunEmitter {
    threshold: u32,
}

impl OverrunEmitter {
    pub const DEFAULT_THRESHOLD: u32 = 50;

    pub fn new(threshold: u32) -> Self {
        OverrunEmitter { threshold }
    }
}

impl Default for OverrunEmitter {
    fn default() -> Self {
        OverrunEmitter::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Node for OverrunEmitter {
    fn type_name(&self) -> &'static str {
        "OverrunEmitter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        const OUT: usize = 0;
        const FEEDBACK: usize = 1;

        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude <= self.threshold {
            io.log(format_args!("Emitting {value} (Overrun Mode - Stable)"));
            io.write(OUT, value);
            return;
        }

        let emitted = QiValue::new(value.element, self.threshold);
        let overflow = QiValue::new(value.element, value.magnitude - self.threshold);
        io.log(format_args!(
            "[OVERRUN] Emitting {emitted}, overflow {overflow} to feedback!"
        ));
        io.write(OUT, emitted);
        io.write(FEEDBACK, overflow);
    }
}

/// Passes the first non-empty input once, then absorbs everything.
///
/// The pulse is visible on `out` for exactly one tick.
#[derive(Debug, Clone, Default)]
pub struct FizzleEmitter {
    fired: bool,
}

impl Node for FizzleEmitter {
    fn type_name(&self) -> &'static str {
        "FizzleEmitter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if self.fired {
            io.clear(0);
            if !value.is_empty() {
                io.log(format_args!("Fizzled out, absorbing {value}"));
            }
        } else if !value.is_empty() {
            self.fired = true;
            io.log(format_args!(
                "[FIZZLE] Momentary pulse of {value} - dissipating..."
            ));
            io.write(0, value);
        }
    }
}

/// Broadcasts a signal when Tempest arrives.
#[derive(Debug, Clone, Default)]
pub struct SkyAntenna;

impl Node for SkyAntenna {
    fn type_name(&self) -> &'static str {
        "SkyAntenna"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.element == ElementType::Tempest && !value.is_empty() {
            io.log("BROADCASTING SIGNAL (Tempest Received)");
        } else if !value.is_empty() {
            io.log(format_args!("Input {value} ignored (Requires Tempest)"));
        }
    }
}

/// The source behind a formation-level `input` port.
///
/// Starts at the declared element and nominal amplitude; callers replace
/// the value with [`crate::RuneGraph::inject`]. Values outside the declared
/// amplitude are still emitted, with a deviation log line. An `Any` port
/// has no element to start from and stays empty until injected.
#[derive(Debug, Clone)]
pub struct FormationInput {
    value: QiValue,
    amplitude: AmplitudeSpec,
}

impl FormationInput {
    pub fn new(element: ElementType, amplitude: AmplitudeSpec) -> Self {
        FormationInput {
            value: QiValue::new(element, amplitude.nominal()),
            amplitude,
        }
    }

    pub fn idle(amplitude: AmplitudeSpec) -> Self {
        FormationInput {
            value: QiValue::EMPTY,
            amplitude,
        }
    }
}

impl Node for FormationInput {
    fn type_name(&self) -> &'static str {
        FORMATION_INPUT
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        if self.value.is_empty() {
            io.clear(0);
            return;
        }
        if !self.amplitude.accepts(self.value.magnitude) {
            io.log(format_args!(
                "[Qi Deviation] {} outside declared amplitude [{}]",
                self.value, self.amplitude
            ));
        }
        io.write(0, self.value.clone());
    }

    fn inject(&mut self, value: QiValue) -> bool {
        self.value = value;
        true
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::Bench;
    use runic_core::ElementType::{Fire, Lightning, Mud, Tempest, Wind};

    #[test]
    fn effect_emitter_tags_values() {
        let mut bench = Bench::new(EffectEmitter::default());
        let logs = bench.step(&[QiValue::new(Fire, 12)]);
        assert_eq!(
            logs,
            vec!["n: ACTIVATED > Thermal Projection (Burn) [Power: 12]"]
        );
        assert_eq!(bench.out(0).effect_tag(), Some("Thermal Projection (Burn)"));
        assert_ne!(bench.out(0), &QiValue::new(Fire, 12));
        assert_eq!(bench.out(0).raw(), QiValue::new(Fire, 12));

        bench.step(&[]);
        assert!(bench.out(0).is_empty());
    }

    #[test]
    fn effect_names() {
        assert_eq!(EffectEmitter::effect_name(Lightning), "Arc Discharge (Shock)");
        assert_eq!(EffectEmitter::effect_name(Mud), "Raw Mud Release");

        let mut bench = Bench::new(EffectEmitter::new(Some("Fireball".into())));
        bench.step(&[QiValue::new(Fire, 1)]);
        assert_eq!(bench.out(0).effect_tag(), Some("Fireball"));
    }

    #[test]
    fn stable_emitter_records_history() {
        let mut bench = Bench::new(StableEmitter::new());
        bench.step(&[QiValue::new(Fire, 1)]);
        bench.step(&[]);
        bench.step(&[QiValue::new(Fire, 2)]);
        assert_eq!(
            bench.node().history(),
            &[QiValue::new(Fire, 1), QiValue::new(Fire, 2)]
        );
        assert_eq!(bench.node().stored(), Some(QiValue::new(Fire, 2)));
    }

    #[test]
    fn overrun_splits_at_threshold() {
        let mut bench = Bench::new(OverrunEmitter::new(10));
        bench.step(&[QiValue::new(Fire, 14)]);
        assert_eq!(bench.out(0), &QiValue::new(Fire, 10));
        assert_eq!(bench.out(1), &QiValue::new(Fire, 4));
    }

    #[test]
    fn fizzle_fires_once() {
        let mut bench = Bench::new(FizzleEmitter::default());
        assert!(bench.step(&[]).is_empty());
        bench.step(&[QiValue::new(Fire, 5)]);
        assert_eq!(bench.out(0), &QiValue::new(Fire, 5));

        let logs = bench.step(&[QiValue::new(Fire, 6)]);
        assert_eq!(logs, vec!["n: Fizzled out, absorbing Fire(6)"]);
        assert!(bench.out(0).is_empty());
    }

    #[test]
    fn antenna_needs_tempest() {
        let mut bench = Bench::new(SkyAntenna);
        assert_eq!(
            bench.step(&[QiValue::with_ttl(Tempest, 4, 2)]),
            vec!["n: BROADCASTING SIGNAL (Tempest Received)"]
        );
        assert_eq!(
            bench.step(&[QiValue::new(Wind, 4)]),
            vec!["n: Input Wind(4) ignored (Requires Tempest)"]
        );
    }

    #[test]
    fn formation_input_checks_amplitude() {
        let mut bench = Bench::new(FormationInput::new(Fire, AmplitudeSpec::Min(5)));
        assert!(bench.step(&[]).is_empty());
        assert_eq!(bench.out(0), &QiValue::new(Fire, 5));

        assert!(bench.inject(QiValue::new(Fire, 2)));
        let logs = bench.step(&[]);
        assert_eq!(
            logs,
            vec!["n: [Qi Deviation] Fire(2) outside declared amplitude [5+]"]
        );
        assert_eq!(bench.out(0), &QiValue::new(Fire, 2));
    }

    #[test]
    fn wildcard_formation_input_waits_for_injection() {
        let mut bench = Bench::new(FormationInput::idle(AmplitudeSpec::default()));
        assert!(bench.step(&[]).is_empty());
        assert!(bench.out(0).is_empty());
        assert_eq!(bench.node().stored(), Some(QiValue::EMPTY));

        assert!(bench.inject(QiValue::new(Wind, 1)));
        assert!(bench.step(&[]).is_empty());
        assert_eq!(bench.out(0), &QiValue::new(Wind, 1));
    }
}
