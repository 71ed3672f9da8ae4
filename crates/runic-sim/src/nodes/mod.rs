//! The node library, grouped as in the registry.
//!
//! Output port indices below follow the registry signatures: index `n` is
//! the `n`-th port of that direction.

pub mod containers;
pub mod control;
pub mod interfaces;
pub mod modifiers;
pub mod operations;
pub mod sinks;
pub mod sources;

pub use containers::{DualVessel, ElementalPool, QiCapacitor, SpiritVessel};
pub use control::{BurstTrigger, ElementFilter, ThresholdGate, YinYangGate};
pub use interfaces::{
    EffectEmitter, FizzleEmitter, FormationInput, OverrunEmitter, SkyAntenna, StableEmitter,
};
pub use modifiers::{Catalyst, Chamber, Stabilizer};
pub use operations::{
    Amplifier, AmplitudeRegulator, Attenuator, Combiner, Dampener, Splitter, Transmuter,
    TunedResonator,
};
pub use sinks::{
    BacklashNode, CorruptionSeep, GroundingRod, HeatSink, QiReceptacle, UnstableVent, VoidDrain,
};
pub use sources::{CultivatorLink, SpiritStoneSocket, StoneArray};
