pub mod helpers;

pub use helpers::{format_chains, format_event, format_snapshots, format_table};
