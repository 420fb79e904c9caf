//! # Replica Coordination
//!
//! Leader/follower protocol that keeps processor health probing to one replica
//! at a time, with timeout-based failover when the leader goes quiet.

pub mod leader;
pub mod peer_client;
pub mod role;

pub use leader::{Eligibility, LeaderCoordinator};
pub use peer_client::{HttpPeerHealthClient, PeerHealthClient};
pub use role::{AtomicReplicaRole, ReplicaRole};
