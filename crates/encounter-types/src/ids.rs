//! Type-safe identifier wrappers around `u64`.
//!
//! The event source identifies subjects by raw integer handles, and the
//! history numbers committed records with a process-wide counter. Both are
//! plain integers on the wire; wrapping them prevents passing a subject
//! handle where a tracker id is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner `u64` value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Provisional identity of an encounter subject, as reported by the
    /// event source. Only compared for equality.
    AgentId
}

define_id! {
    /// Identifier assigned to an encounter record when it is committed.
    ///
    /// Strictly increasing over the lifetime of a history and never reused,
    /// even after the record bearing it has been evicted.
    TrackerId
}

impl TrackerId {
    /// Return the identifier following this one, or `None` on overflow.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_u64() {
        let agent = AgentId::from(17);
        assert_eq!(u64::from(agent), 17);
        assert_eq!(agent.into_inner(), 17);
    }

    #[test]
    fn tracker_id_advances_and_saturates() {
        assert_eq!(TrackerId::new(4).checked_next(), Some(TrackerId::new(5)));
        assert_eq!(TrackerId::new(u64::MAX).checked_next(), None);
    }

    #[test]
    fn tracker_ids_order_numerically() {
        assert!(TrackerId::new(2) < TrackerId::new(10));
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&AgentId::new(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
    }
}
