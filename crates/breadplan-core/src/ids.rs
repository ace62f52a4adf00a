//! Newtype identifiers, one per entity kind, so a node ID can never be
//! confused with a product or truck ID at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::new(value)
            }
        }
    };
}

id_type!(NodeId);
id_type!(ProductId);
id_type!(RouteId);
id_type!(TruckId);

impl RouteId {
    /// Routes have no natural external identifier, so legs are named from
    /// their endpoints the same way a call site would look one up.
    pub fn for_leg(origin: &NodeId, destination: &NodeId) -> Self {
        RouteId::new(format!("{origin}->{destination}"))
    }
}
