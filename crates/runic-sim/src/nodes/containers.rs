//! Nodes that hold Qi across ticks.

use runic_core::QiValue;

use crate::node::{Node, NodeIo};

/// Adds `input` to `stored` when the elements agree. The first input adopts
/// its element. Returns `false` for a rejected element.
fn accumulate(stored: &mut QiValue, input: &QiValue, cap: Option<u32>) -> bool {
    if stored.is_empty() {
        *stored = input.raw();
    } else if stored.element == input.element {
        *stored = stored.with_magnitude(stored.magnitude.saturating_add(input.magnitude));
    } else {
        return false;
    }
    if let Some(cap) = cap {
        stored.magnitude = stored.magnitude.min(cap);
    }
    true
}

/// Charges from `in` until `capacity` is reached, then discharges the whole
/// charge as one pulse.
///
/// Outputs: `out` mirrors the charge (and carries the pulse), `full` only
/// carries the pulse. Both are cleared at the start of every Process.
#[derive(Debug, Clone, Default)]
pub struct QiCapacitor {
    capacity: u32,
    stored: QiValue,
}

impl QiCapacitor {
    pub fn new(capacity: u32) -> Self {
        QiCapacitor {
            capacity,
            stored: QiValue::EMPTY,
        }
    }
}

impl Node for QiCapacitor {
    fn type_name(&self) -> &'static str {
        "QiCapacitor"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        const OUT: usize = 0;
        const FULL: usize = 1;

        io.clear(OUT);
        io.clear(FULL);

        let input = io.input(0).clone();
        if !input.is_empty() && !accumulate(&mut self.stored, &input, None) {
            io.log(format_args!(
                "Rejected {input} (holding {})",
                self.stored.element
            ));
        }

        if self.stored.is_empty() {
            return;
        }
        if self.stored.magnitude >= self.capacity {
            let charge = std::mem::take(&mut self.stored);
            io.log(format_args!(
                "DISCHARGE! {charge} (Threshold {} reached)",
                self.capacity
            ));
            io.write(FULL, charge.clone());
            io.write(OUT, charge);
        } else {
            io.log(format_args!(
                "Charging... {}/{}",
                self.stored.magnitude, self.capacity
            ));
            io.write(OUT, self.stored.clone());
        }
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.stored.clone())
    }
}

/// Buffers its input to its output; the output holds the last non-empty
/// value.
#[derive(Debug, Clone, Default)]
pub struct SpiritVessel;

impl Node for SpiritVessel {
    fn type_name(&self) -> &'static str {
        "SpiritVessel"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if !value.is_empty() {
            io.log(format_args!("Buffered {value}"));
            io.write(0, value);
        }
    }
}

/// Two independent vessel channels: `in1 -> out1`, `in2 -> out2`.
#[derive(Debug, Clone, Default)]
pub struct DualVessel;

impl Node for DualVessel {
    fn type_name(&self) -> &'static str {
        "DualVessel"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        for channel in 0..2 {
            let value = io.input(channel).clone();
            if !value.is_empty() {
                io.log(format_args!("Channel {} Buffered {value}", channel + 1));
                io.write(channel, value);
            }
        }
    }
}

/// Accumulates one element up to a capacity and emits its level every tick.
#[derive(Debug, Clone)]
pub struct ElementalPool {
    capacity: u32,
    stored: QiValue,
}

impl ElementalPool {
    pub const DEFAULT_CAPACITY: u32 = 100;

    pub fn new(capacity: u32) -> Self {
        ElementalPool {
            capacity,
            stored: QiValue::EMPTY,
        }
    }
}

impl Default for ElementalPool {
    fn default() -> Self {
        ElementalPool::new(Self::DEFAULT_CAPACITY)
    }
}

impl Node for ElementalPool {
    fn type_name(&self) -> &'static str {
        "ElementalPool"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let input = io.input(0).clone();
        if !input.is_empty() && !accumulate(&mut self.stored, &input, Some(self.capacity)) {
            io.log(format_args!(
                "[Qi Deviation] Pool pollution! {} vs {}",
                self.stored.element, input.element
            ));
        }

        if !self.stored.is_empty() {
            io.log(format_args!("Pool Level {}", self.stored));
            io.write(0, self.stored.clone());
        }
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::Bench;
    use runic_core::ElementType::{Fire, Water};

    #[test]
    fn capacitor_charges_then_discharges() {
        let mut bench = Bench::new(QiCapacitor::new(10));
        let fire = QiValue::new(Fire, 4);

        let logs = bench.step(&[fire.clone()]);
        assert_eq!(logs, vec!["n: Charging... 4/10"]);
        assert!(bench.out(1).is_empty());
        assert_eq!(bench.out(0), &QiValue::new(Fire, 4));

        let logs = bench.step(&[fire.clone()]);
        assert_eq!(logs, vec!["n: Charging... 8/10"]);
        assert!(bench.out(1).is_empty());

        let logs = bench.step(&[fire]);
        assert_eq!(logs, vec!["n: DISCHARGE! Fire(12) (Threshold 10 reached)"]);
        assert_eq!(bench.out(1), &QiValue::new(Fire, 12));
        assert_eq!(bench.out(0), &QiValue::new(Fire, 12));
        assert_eq!(bench.node().stored(), Some(QiValue::EMPTY));

        // The pulse lasts one tick.
        assert!(bench.step(&[]).is_empty());
        assert!(bench.out(0).is_empty());
        assert!(bench.out(1).is_empty());
    }

    #[test]
    fn capacitor_rejects_foreign_element() {
        let mut bench = Bench::new(QiCapacitor::new(50));
        bench.step(&[QiValue::new(Fire, 4)]);
        let logs = bench.step(&[QiValue::new(Water, 4)]);
        assert_eq!(
            logs,
            vec!["n: Rejected Water(4) (holding Fire)", "n: Charging... 4/50"]
        );
    }

    #[test]
    fn capacitor_strips_effect_tags() {
        let mut bench = Bench::new(QiCapacitor::new(50));
        bench.step(&[QiValue::new(Fire, 4).into_effect("Burn")]);
        assert_eq!(bench.node().stored(), Some(QiValue::new(Fire, 4)));
    }

    #[test]
    fn vessel_holds_last_value() {
        let mut bench = Bench::new(SpiritVessel);
        bench.step(&[QiValue::new(Water, 3)]);
        assert!(bench.step(&[]).is_empty());
        assert_eq!(bench.out(0), &QiValue::new(Water, 3));
    }

    #[test]
    fn dual_vessel_channels_are_independent() {
        let mut bench = Bench::new(DualVessel);
        let logs = bench.step(&[QiValue::EMPTY, QiValue::new(Fire, 2)]);
        assert_eq!(logs, vec!["n: Channel 2 Buffered Fire(2)"]);
        assert!(bench.out(0).is_empty());
        assert_eq!(bench.out(1), &QiValue::new(Fire, 2));
    }

    #[test]
    fn pool_caps_and_reports_pollution() {
        let mut bench = Bench::new(ElementalPool::new(10));
        bench.step(&[QiValue::new(Water, 6)]);
        bench.step(&[QiValue::new(Water, 6)]);
        assert_eq!(bench.out(0), &QiValue::new(Water, 10));

        let logs = bench.step(&[QiValue::new(Fire, 1)]);
        assert_eq!(
            logs,
            vec![
                "n: [Qi Deviation] Pool pollution! Water vs Fire",
                "n: Pool Level Water(10)",
            ]
        );
    }
}
