//! RatchetSim: a two-party ratcheting session simulator.
//!
//! Two session entities keep per-message chain keys in sync using a
//! placeholder asymmetric exchange and per-epoch symmetric chains, modeled
//! on the Double Ratchet pattern. No real cryptography is involved.

pub mod cli;
pub mod network;
pub mod ratchet;
pub mod scenario;
pub mod utils;

pub use network::{Channel, ChannelError, Transport};
pub use ratchet::{
    bootstrap, bootstrap_from_entropy, bootstrap_seeded, Delivery, Entity, Message, RatchetError,
    RatchetState, Role, SequenceFault,
};
pub use scenario::{Driver, Scenario, ScenarioError, Step, TraceEvent};
