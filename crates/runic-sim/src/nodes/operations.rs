//! Nodes that transform Qi using the element algebra.

use runic_core::interaction::{combine_detailed, generation_child, overcomes};
use runic_core::{ElementType, QiValue};

use crate::node::{Node, NodeIo};

/// Scales magnitude by a tuning efficiency. Output is stable.
#[derive(Debug, Clone)]
pub struct TunedResonator {
    efficiency: f64,
}

impl TunedResonator {
    pub const DEFAULT_EFFICIENCY: f64 = 1.2;

    pub fn new(efficiency: f64) -> Self {
        TunedResonator { efficiency }
    }
}

impl Node for TunedResonator {
    fn type_name(&self) -> &'static str {
        "TunedResonator"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        // Float-to-int casts saturate: negative efficiencies yield 0.
        let boosted = (f64::from(value.magnitude) * self.efficiency) as u32;
        let output = QiValue::new(value.element, boosted);
        io.log(format_args!(
            "Resonating {value} -> {output} (x{} efficiency)",
            self.efficiency
        ));
        io.write(0, output);
    }
}

/// Normalizes any admissible input to a fixed amplitude.
#[derive(Debug, Clone)]
pub struct AmplitudeRegulator {
    target: u32,
    max_input: u32,
}

impl AmplitudeRegulator {
    pub const DEFAULT_TARGET: u32 = 10;
    pub const DEFAULT_MAX_INPUT: u32 = 81;

    pub fn new(target: u32, max_input: u32) -> Self {
        AmplitudeRegulator { target, max_input }
    }
}

impl Default for AmplitudeRegulator {
    fn default() -> Self {
        AmplitudeRegulator::new(Self::DEFAULT_TARGET, Self::DEFAULT_MAX_INPUT)
    }
}

impl Node for AmplitudeRegulator {
    fn type_name(&self) -> &'static str {
        "AmplitudeRegulator"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude > self.max_input {
            io.log(format_args!(
                "[OVERLOAD] Input {} exceeds max {}!",
                value.magnitude, self.max_input
            ));
            return;
        }
        let output = QiValue::new(value.element, self.target);
        io.log(format_args!("Regulating {value} -> {output} (normalized)"));
        io.write(0, output);
    }
}

/// Retypes Qi to a fixed element, or to the next element of the
/// generation cycle.
#[derive(Debug, Clone, Default)]
pub struct Transmuter {
    to: Option<ElementType>,
    from: Option<ElementType>,
}

impl Transmuter {
    pub fn new(to: Option<ElementType>, from: Option<ElementType>) -> Self {
        Transmuter { to, from }
    }
}

impl Node for Transmuter {
    fn type_name(&self) -> &'static str {
        "Transmuter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if let Some(from) = self.from.filter(|&from| from != value.element) {
            io.log(format_args!("Rejected {value} (expects {from})"));
            return;
        }
        match self.to.or_else(|| generation_child(value.element)) {
            Some(target) => {
                let output = QiValue::with_ttl(target, value.magnitude, value.ttl);
                io.log(format_args!("Transmuted {value} -> {output}"));
                io.write(0, output);
            }
            None => io.log(format_args!(
                "Component {} cannot be transmuted (No Generation Child)",
                value.element
            )),
        }
    }
}

/// Multiplies a catalyst by a primary that generates it.
///
/// Inputs: `primary`, `catalyst`. Succeeds only when the primary's
/// generation child is the catalyst's element and the primary is stronger.
#[derive(Debug, Clone, Default)]
pub struct Amplifier;

impl Node for Amplifier {
    fn type_name(&self) -> &'static str {
        "Amplifier"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let primary = io.input(0).clone();
        let catalyst = io.input(1).clone();
        if primary.is_empty() || catalyst.is_empty() {
            return;
        }

        let generates = generation_child(primary.element) == Some(catalyst.element);
        if generates && primary.magnitude > catalyst.magnitude {
            let output = QiValue::with_ttl(
                catalyst.element,
                primary.magnitude.saturating_mul(catalyst.magnitude),
                catalyst.ttl,
            );
            io.log(format_args!("Amplified {primary} + {catalyst} -> {output}"));
            io.write(0, output);
        } else {
            io.log(format_args!(
                "Failed Amp logic (P:{primary}, C:{catalyst})"
            ));
        }
    }
}

/// Reduces a target by a suppressor that overcomes it.
///
/// Inputs: `target`, `suppressor`.
#[derive(Debug, Clone, Default)]
pub struct Dampener;

impl Node for Dampener {
    fn type_name(&self) -> &'static str {
        "Dampener"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let target = io.input(0).clone();
        let suppressor = io.input(1).clone();
        if target.is_empty() || suppressor.is_empty() {
            return;
        }

        if overcomes(suppressor.element, target.element)
            && target.magnitude >= suppressor.magnitude
        {
            let remaining = target.magnitude - suppressor.magnitude;
            let output = if remaining > 0 {
                target.with_magnitude(remaining)
            } else {
                QiValue::EMPTY
            };
            io.log(format_args!("Dampened {target} by {suppressor} -> {output}"));
            io.write(0, output);
        } else {
            io.log(format_args!(
                "Failed Dampen logic (T:{target}, S:{suppressor})"
            ));
        }
    }
}

/// Scales magnitude down and routes the remainder to `excess`, so no Qi
/// is lost.
#[derive(Debug, Clone)]
pub struct Attenuator {
    factor: f64,
}

impl Attenuator {
    pub const DEFAULT_FACTOR: f64 = 0.5;

    /// `factor` is clamped to `[0, 1]`.
    pub fn new(factor: f64) -> Self {
        Attenuator {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Node for Attenuator {
    fn type_name(&self) -> &'static str {
        "Attenuator"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        const OUT: usize = 0;
        const EXCESS: usize = 1;

        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        let kept = ((f64::from(value.magnitude) * self.factor) as u32).min(value.magnitude);
        let excess = value.magnitude - kept;

        let out = part(&value, kept);
        let excess = part(&value, excess);
        io.log(format_args!(
            "Attenuated {value} by factor {:.2} -> Out:{out}, Excess:{excess}",
            self.factor
        ));
        io.write(OUT, out);
        io.write(EXCESS, excess);
    }
}

/// `value` with a new magnitude, or empty for zero.
fn part(value: &QiValue, magnitude: u32) -> QiValue {
    if magnitude == 0 {
        QiValue::EMPTY
    } else {
        value.with_magnitude(magnitude)
    }
}

/// Halves magnitude onto two identical outputs. An odd remainder is lost.
#[derive(Debug, Clone, Default)]
pub struct Splitter;

impl Node for Splitter {
    fn type_name(&self) -> &'static str {
        "Splitter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        let half = value.magnitude / 2;
        if half == 0 {
            io.log(format_args!("Input {value} too small to split"));
            return;
        }
        let split = value.with_magnitude(half);
        io.log(format_args!("Split {value} -> {split} & {split}"));
        io.write(0, split.clone());
        io.write(1, split);
    }
}

/// Merges two inputs through the combination function.
#[derive(Debug, Clone, Default)]
pub struct Combiner;

impl Node for Combiner {
    fn type_name(&self) -> &'static str {
        "Combiner"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let a = io.input(0).clone();
        let b = io.input(1).clone();
        let merged = combine_detailed(&a, &b);
        let result = merged.value();

        if !result.is_empty() {
            io.log(format_args!("Combined {a} + {b} -> {result}"));
        } else if merged.is_loss() {
            io.log("Combination Failed [Qi Deviation]");
        }
        io.write(0, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::Bench;
    use runic_core::ElementType::{Earth, Fire, Metal, Steam, Water, Wood};

    // --- Amplifier ---

    #[test]
    fn amplifier_multiplies_along_generation_cycle() {
        let mut bench = Bench::new(Amplifier);
        let logs = bench.step(&[QiValue::new(Fire, 5), QiValue::new(Earth, 2)]);
        assert_eq!(bench.out(0), &QiValue::new(Earth, 10));
        assert_eq!(logs, vec!["n: Amplified Fire(5) + Earth(2) -> Earth(10)"]);
    }

    #[test]
    fn amplifier_rejects_wrong_cycle() {
        let mut bench = Bench::new(Amplifier);
        let logs = bench.step(&[QiValue::new(Water, 5), QiValue::new(Earth, 2)]);
        assert!(bench.out(0).is_empty());
        assert_eq!(logs, vec!["n: Failed Amp logic (P:Water(5), C:Earth(2))"]);
    }

    #[test]
    fn amplifier_requires_stronger_primary() {
        let mut bench = Bench::new(Amplifier);
        bench.step(&[QiValue::new(Fire, 2), QiValue::new(Earth, 2)]);
        assert!(bench.out(0).is_empty());
    }

    #[test]
    fn amplifier_idles_without_both_inputs() {
        let mut bench = Bench::new(Amplifier);
        assert!(bench.step(&[QiValue::new(Fire, 5)]).is_empty());
    }

    // --- Dampener ---

    #[test]
    fn dampener_subtracts_overcoming_suppressor() {
        let mut bench = Bench::new(Dampener);
        // Water overcomes Fire.
        bench.step(&[QiValue::new(Fire, 10), QiValue::new(Water, 3)]);
        assert_eq!(bench.out(0), &QiValue::new(Fire, 7));

        bench.step(&[QiValue::new(Fire, 3), QiValue::new(Water, 3)]);
        assert!(bench.out(0).is_empty());
    }

    #[test]
    fn dampener_needs_overcoming_relation() {
        let mut bench = Bench::new(Dampener);
        let logs = bench.step(&[QiValue::new(Fire, 10), QiValue::new(Wood, 3)]);
        assert!(bench.out(0).is_empty());
        assert!(logs[0].contains("Failed Dampen logic"));
    }

    // --- Transmuter ---

    #[test]
    fn transmuter_follows_generation_cycle() {
        let mut bench = Bench::new(Transmuter::default());
        bench.step(&[QiValue::new(Fire, 6)]);
        assert_eq!(bench.out(0), &QiValue::new(Earth, 6));
    }

    #[test]
    fn transmuter_uses_configured_target_and_filter() {
        let mut bench = Bench::new(Transmuter::new(Some(Metal), Some(Fire)));
        bench.step(&[QiValue::new(Fire, 6)]);
        assert_eq!(bench.out(0), &QiValue::new(Metal, 6));

        let logs = bench.step(&[QiValue::new(Water, 6)]);
        assert_eq!(logs, vec!["n: Rejected Water(6) (expects Fire)"]);
        assert_eq!(bench.out(0), &QiValue::new(Metal, 6));
    }

    #[test]
    fn transmuter_rejects_derived_elements() {
        let mut bench = Bench::new(Transmuter::default());
        let logs = bench.step(&[QiValue::with_ttl(Steam, 10, 3)]);
        assert_eq!(
            logs,
            vec!["n: Component Steam cannot be transmuted (No Generation Child)"]
        );
        assert!(bench.out(0).is_empty());
    }

    // --- Attenuator / Splitter ---

    #[test]
    fn attenuator_conserves_qi() {
        let mut bench = Bench::new(Attenuator::new(0.3));
        let logs = bench.step(&[QiValue::new(Water, 10)]);
        assert_eq!(bench.out(0), &QiValue::new(Water, 3));
        assert_eq!(bench.out(1), &QiValue::new(Water, 7));
        assert_eq!(
            logs,
            vec!["n: Attenuated Water(10) by factor 0.30 -> Out:Water(3), Excess:Water(7)"]
        );
    }

    #[test]
    fn attenuator_factor_is_clamped() {
        assert_eq!(Attenuator::new(3.0).factor(), 1.0);
        assert_eq!(Attenuator::new(-1.0).factor(), 0.0);

        let mut bench = Bench::new(Attenuator::new(1.0));
        bench.step(&[QiValue::new(Fire, 8)]);
        assert_eq!(bench.out(0), &QiValue::new(Fire, 8));
        assert!(bench.out(1).is_empty());
    }

    #[test]
    fn splitter_truncates_odd_magnitudes() {
        let mut bench = Bench::new(Splitter);
        bench.step(&[QiValue::new(Fire, 7)]);
        assert_eq!(bench.out(0), &QiValue::new(Fire, 3));
        assert_eq!(bench.out(1), &QiValue::new(Fire, 3));

        let logs = bench.step(&[QiValue::new(Fire, 1)]);
        assert_eq!(logs, vec!["n: Input Fire(1) too small to split"]);
    }

    // --- Combiner / Regulator / Resonator ---

    #[test]
    fn combiner_forms_derived_elements() {
        let mut bench = Bench::new(Combiner);
        bench.step(&[QiValue::new(Water, 5), QiValue::new(Fire, 5)]);
        assert_eq!(bench.out(0).element, Steam);
        assert_eq!(bench.out(0).magnitude, 10);
    }

    #[test]
    fn combiner_logs_deviation() {
        let mut bench = Bench::new(Combiner);
        let logs = bench.step(&[QiValue::new(Water, 5), QiValue::new(Fire, 4)]);
        assert_eq!(logs, vec!["n: Combination Failed [Qi Deviation]"]);
        assert!(bench.out(0).is_empty());
    }

    #[test]
    fn regulator_normalizes_and_overloads() {
        let mut bench = Bench::new(AmplitudeRegulator::default());
        bench.step(&[QiValue::new(Wood, 37)]);
        assert_eq!(bench.out(0), &QiValue::new(Wood, 10));

        let logs = bench.step(&[QiValue::new(Wood, 90)]);
        assert_eq!(logs, vec!["n: [OVERLOAD] Input 90 exceeds max 81!"]);
    }

    #[test]
    fn resonator_floors_and_stabilizes() {
        let mut bench = Bench::new(TunedResonator::new(TunedResonator::DEFAULT_EFFICIENCY));
        bench.step(&[QiValue::with_ttl(Steam, 9, 2)]);
        assert_eq!(bench.out(0), &QiValue::new(Steam, 10));
    }
}
