//! Nodes that produce Qi without an input port.

use runic_core::{ElementType, QiValue};

use crate::node::{Node, NodeIo};

const OUT: usize = 0;

/// A socketed spirit stone emitting a fixed value every tick.
///
/// With an emission budget the output is cleared once the budget runs out.
#[derive(Debug, Clone)]
pub struct SpiritStoneSocket {
    stone: QiValue,
    remaining: Option<u32>,
    depleted: bool,
}

impl SpiritStoneSocket {
    pub fn new(stone: QiValue) -> Self {
        SpiritStoneSocket {
            stone,
            remaining: None,
            depleted: false,
        }
    }

    /// Limits the stone to `cycles` emissions.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.remaining = Some(cycles);
        self
    }
}

impl Node for SpiritStoneSocket {
    fn type_name(&self) -> &'static str {
        "SpiritStoneSocket"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        match self.remaining {
            Some(0) => {
                if !self.depleted {
                    self.depleted = true;
                    io.clear(OUT);
                    io.log(format_args!("Spirit stone {} depleted", self.stone));
                }
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                io.write(OUT, self.stone.clone());
            }
            None => io.write(OUT, self.stone.clone()),
        }
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.stone.clone())
    }
}

/// Several stones feeding one output. All stones must share an element.
#[derive(Debug, Clone, Default)]
pub struct StoneArray {
    stones: Vec<QiValue>,
}

impl StoneArray {
    pub fn new(stones: Vec<QiValue>) -> Self {
        StoneArray { stones }
    }

    /// Parses `"Fire:4, Fire:8"`.
    pub fn parse_stones(text: &str) -> Option<Vec<QiValue>> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|stone| {
                let (element, magnitude) = stone.split_once(':')?;
                let element: ElementType = element.trim().parse().ok()?;
                let magnitude: u32 = magnitude.trim().parse().ok()?;
                Some(QiValue::new(element, magnitude))
            })
            .collect()
    }
}

impl Node for StoneArray {
    fn type_name(&self) -> &'static str {
        "StoneArray"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        let Some(first) = self.stones.first() else {
            return;
        };
        let element = first.element;

        let mut total: u32 = 0;
        let mut ttl = 0;
        for stone in &self.stones {
            if stone.element != element && !stone.is_empty() {
                io.log("[Qi Deviation] Stone Type Mismatch in Array!");
                return;
            }
            total = total.saturating_add(stone.magnitude);
            ttl = ttl.max(stone.ttl);
        }

        if total > 0 {
            io.write(OUT, QiValue::with_ttl(element, total, ttl));
        }
    }
}

/// A cultivator channelling their own Qi. The value is set from outside.
#[derive(Debug, Clone, Default)]
pub struct CultivatorLink {
    current: QiValue,
}

impl CultivatorLink {
    pub fn new(initial: QiValue) -> Self {
        CultivatorLink { current: initial }
    }
}

impl Node for CultivatorLink {
    fn type_name(&self) -> &'static str {
        "CultivatorLink"
    }

    fn process(&mut self, io: &mut NodeIo<'_>) {
        if !self.current.is_empty() {
            io.write(OUT, self.current.clone());
            io.log(format_args!("Cultivator channeling {}", self.current));
        }
    }

    fn inject(&mut self, value: QiValue) -> bool {
        self.current = value;
        true
    }

    fn stored(&self) -> Option<QiValue> {
        Some(self.current.clone())
    }
}
