mod bootstrap;
mod chain;
mod entity;
mod error;
mod keys;
mod message;
mod role;

pub use bootstrap::{bootstrap, bootstrap_from_entropy, bootstrap_seeded};
pub use chain::{seed_for, Chain, ChainSet, INITIATOR_SEED, RESPONDER_SEED};
pub use entity::{Delivery, Entity, EntitySnapshot, RatchetState};
pub use error::{RatchetError, SequenceFault};
pub use keys::{DhPair, DH_SCALAR_MAX};
pub use message::Message;
pub use role::Role;

/*
 * Ratchet session module for RatchetSim
 *
 * This module holds the two-party session state machine:
 * - Placeholder asymmetric key pairs and their exchange value
 * - Per-epoch symmetric chains for both directions
 * - The session entity with send/receive and ratchet stepping
 * - Bootstrap of a cross-seeded pair of entities
 */
