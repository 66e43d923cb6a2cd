mod channel;

pub use channel::{Channel, ChannelError, Transport};

/*
 * Network module for RatchetSim
 *
 * Messages between the two session entities always travel through a
 * transport, even in the single-process simulation.
 */
