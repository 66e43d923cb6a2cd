//! Property-style tests for the session entity state machine.
//!
//! Each test drives entities directly (without the scenario driver) to check
//! one law of the ratchet: index growth, epoch advancement, single derivation
//! per epoch and key agreement.

use ratchet_sim::{bootstrap_seeded, Entity, Message, RatchetState, Role, SequenceFault};
use rand::rngs::StdRng;
use std::collections::HashSet;

fn synced_pair(seed: u64) -> (Entity<StdRng>, Entity<StdRng>) {
    let (mut alice, mut bob) = bootstrap_seeded("Alice", "Bob", seed).unwrap();
    let m1 = alice.send();
    let m2 = bob.send();
    alice.receive(&m2).unwrap();
    bob.receive(&m1).unwrap();
    (alice, bob)
}

/// Sends within a stable epoch increase the index by one and extend the
/// sender's chain by previous + 1.
#[test]
fn test_stable_sends_follow_derivation_law() {
    for seed in 0..8 {
        let (_, mut bob) = synced_pair(seed);
        for _ in 0..10 {
            let index_before = bob.msg_index();
            let msg = bob.send();
            assert_eq!(msg.msg_index(), index_before);
            assert_eq!(bob.msg_index(), index_before + 1);

            let current = bob.chain_key(Role::Responder, 0, msg.msg_index()).unwrap();
            let previous = bob.chain_key(Role::Responder, 0, msg.msg_index() - 1).unwrap();
            assert_eq!(current, previous + 1);
        }
        assert_eq!(bob.epoch_id(), 0);
    }
}

/// Receiving a message one epoch ahead always sets the pending flag and
/// adopts the message epoch.
#[test]
fn test_next_epoch_message_sets_pending() {
    for seed in 0..8 {
        let (mut alice, mut bob) = synced_pair(seed);
        let msg = alice.send();
        assert_eq!(msg.ratchet_id(), 1);

        bob.receive(&msg).unwrap();
        assert!(bob.is_ratchet_pending());
        assert_eq!(bob.epoch_id(), msg.ratchet_id());
        assert_eq!(bob.peer_public(), alice.own_public());
    }
}

/// A pending send bumps the epoch by exactly one, resets the index and
/// replaces the key pair.
#[test]
fn test_pending_send_performs_ratchet_step() {
    let (mut alice, mut bob) = synced_pair(11);
    bob.receive(&alice.send()).unwrap();
    assert_eq!(bob.state(), RatchetState::RatchetPending);

    let epoch_before = bob.epoch_id();
    let dh_before = bob.own_dh();
    bob.send();
    bob.send();
    let msg = bob.send();

    assert_eq!(bob.epoch_id(), epoch_before + 1);
    assert_eq!(msg.msg_index(), 2);
    assert_ne!(bob.own_dh(), dh_before);
    assert_eq!(bob.state(), RatchetState::Stable);
}

/// Many alternating turns never derive the same epoch twice.
#[test]
fn test_epoch_log_has_no_duplicates() {
    let (mut alice, mut bob) = synced_pair(21);

    for turn in 0..10 {
        let (sender, receiver) = if turn % 2 == 0 {
            (&mut alice, &mut bob)
        } else {
            (&mut bob, &mut alice)
        };
        for _ in 0..3 {
            let msg = sender.send();
            receiver.receive(&msg).unwrap();
        }
    }

    for entity in [&alice, &bob] {
        let log = entity.epoch_log();
        let unique: HashSet<_> = log.iter().collect();
        assert_eq!(unique.len(), log.len());
        assert!(log.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(*log.last().unwrap(), entity.epoch_id());
    }
    assert_eq!(alice.epoch_id(), 10);
}

/// The receiver reconstructs the same key the sender holds for every message.
#[test]
fn test_round_trip_key_agreement() {
    let (mut alice, mut bob) = synced_pair(31);

    for turn in 0..6 {
        let (sender, receiver) = if turn % 2 == 0 {
            (&mut alice, &mut bob)
        } else {
            (&mut bob, &mut alice)
        };
        for _ in 0..(turn + 1) {
            let msg = sender.send();
            let delivery = receiver.receive(&msg).unwrap();
            let own = sender
                .chain_key(sender.role(), msg.ratchet_id(), msg.msg_index())
                .unwrap();
            assert_eq!(delivery.chain_key, own);
        }
    }
}

/// Messages outside the current or next epoch are a sequence error.
#[test]
fn test_out_of_range_epochs_are_rejected() {
    let (mut alice, _) = synced_pair(41);
    let err = alice.receive(&Message::new("Bob", 2, 0, 1)).unwrap_err();
    assert_eq!(
        err.fault(),
        Some(SequenceFault::EpochOutOfRange { current: 0, received: 2 })
    );
    assert_eq!(alice.epoch_id(), 0);
}

/// A skipped message index is rejected and a later in-order delivery still
/// works.
#[test]
fn test_skipped_index_is_rejected() {
    let (mut alice, mut bob) = synced_pair(51);
    let m1 = bob.send();
    let m2 = bob.send();

    let err = alice.receive(&m2).unwrap_err();
    assert!(matches!(err.fault(), Some(SequenceFault::UnderivedIndex { index: 2, .. })));

    assert_eq!(alice.receive(&m1).unwrap().chain_key, 101);
    assert_eq!(alice.receive(&m2).unwrap().chain_key, 102);
}
