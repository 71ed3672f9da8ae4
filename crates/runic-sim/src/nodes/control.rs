//! Routing and gating nodes.

use runic_core::ElementType;

use crate::node::{Node, NodeIo};

/// Forwards `capacitor` to `out` while `trigger` is live in the same tick.
/// `out` is empty on every other tick.
#[derive(Debug, Clone, Default)]
pub struct BurstTrigger;

impl Node for BurstTrigger {
    fn type_name(&self) -> &'static str {
        "BurstTrigger"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        const CAPACITOR: usize = 0;
        const TRIGGER: usize = 1;

        io.clear(0);
        if io.input(TRIGGER).is_empty() {
            return;
        }
        let load = io.input(CAPACITOR).clone();
        if load.is_empty() {
            io.log("Triggered (Empty Load)");
        } else {
            io.log(format_args!("TRIGGERED! Bursting {load}"));
            io.write(0, load);
        }
    }
}

/// Routes `in` to `true_out` when `cond` carries Qi, else to `false_out`.
#[derive(Debug, Clone, Default)]
pub struct YinYangGate;

impl Node for YinYangGate {
    fn type_name(&self) -> &'static str {
        "YinYangGate"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        let condition = io.input(1).clone();
        if !condition.is_empty() && condition.magnitude > 0 {
            io.log(format_args!(
                "[YANG] {value} routed to True Out (Cond: {condition})"
            ));
            io.write(0, value);
        } else {
            io.log(format_args!(
                "[YIN] {value} routed to False Out (Cond: {condition})"
            ));
            io.write(1, value);
        }
    }
}

/// Routes by magnitude: `>= threshold` to `pass`, else `block`.
#[derive(Debug, Clone, Default)]
pub struct ThresholdGate {
    threshold: u32,
}

impl ThresholdGate {
    pub fn new(threshold: u32) -> Self {
        ThresholdGate { threshold }
    }
}

impl Node for ThresholdGate {
    fn type_name(&self) -> &'static str {
        "ThresholdGate"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.magnitude >= self.threshold {
            io.log(format_args!("{value} PASSED threshold {}", self.threshold));
            io.write(0, value);
        } else {
            io.log(format_args!("{value} BLOCKED (Threshold {})", self.threshold));
            io.write(1, value);
        }
    }
}

/// Routes by element: a match to `match`, anything else to `other`.
#[derive(Debug, Clone)]
pub struct ElementFilter {
    element: ElementType,
}

impl ElementFilter {
    pub fn new(element: ElementType) -> Self {
        ElementFilter { element }
    }
}

impl Node for ElementFilter {
    fn type_name(&self) -> &'static str {
        "ElementFilter"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let value = io.input(0).clone();
        if value.is_empty() {
            return;
        }
        if value.element == self.element {
            io.log(format_args!("Matched {} -> {value}", self.element));
            io.write(0, value);
        } else {
            io.log(format_args!(
                "Rejected {value} (Expected {}) -> Other",
                self.element
            ));
            io.write(1, value);
        }
    }
}
