//! Replica role state machine.
//!
//! `DesignatedLeader` is fixed for the life of the process. `Follower` may move
//! to `FailoverLeader` exactly once; nothing moves back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::StartupRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicaRole {
    /// Leader by configuration; probes processors and serves peers
    DesignatedLeader = 0,
    /// Relays the leader's snapshots instead of probing
    Follower = 1,
    /// Former follower that stopped hearing from the leader
    FailoverLeader = 2,
}

impl ReplicaRole {
    /// Whether this replica probes processors itself
    pub fn acts_as_leader(&self) -> bool {
        !matches!(self, ReplicaRole::Follower)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaRole::DesignatedLeader => "DESIGNATED_LEADER",
            ReplicaRole::Follower => "FOLLOWER",
            ReplicaRole::FailoverLeader => "FAILOVER_LEADER",
        }
    }
}

impl From<u8> for ReplicaRole {
    fn from(value: u8) -> Self {
        match value {
            0 => ReplicaRole::DesignatedLeader,
            1 => ReplicaRole::Follower,
            // only FailoverLeader is ever stored as 2
            _ => ReplicaRole::FailoverLeader,
        }
    }
}

impl From<StartupRole> for ReplicaRole {
    fn from(role: StartupRole) -> Self {
        match role {
            StartupRole::Leader => ReplicaRole::DesignatedLeader,
            StartupRole::Follower => ReplicaRole::Follower,
        }
    }
}

impl fmt::Display for ReplicaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free holder for the current [`ReplicaRole`]
#[derive(Debug)]
pub struct AtomicReplicaRole(AtomicU8);

impl AtomicReplicaRole {
    pub fn new(role: ReplicaRole) -> Self {
        Self(AtomicU8::new(role as u8))
    }

    pub fn load(&self) -> ReplicaRole {
        ReplicaRole::from(self.0.load(Ordering::Acquire))
    }

    /// Move `Follower` to `FailoverLeader`. Returns `true` only for the caller
    /// that performed the transition.
    pub fn promote_to_failover(&self) -> bool {
        self.0
            .compare_exchange(
                ReplicaRole::Follower as u8,
                ReplicaRole::FailoverLeader as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
