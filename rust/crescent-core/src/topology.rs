//! Network topology: stations, the lines serving them, and the connectivity
//! rules a journey has to satisfy.
//!
//! A `Topology` is immutable once built and is meant to be shared (behind an
//! `Arc`) by every machine that runs against the same network.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

macro_rules! name_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

name_id! {
    /// Name of a station (a node in the network).
    LocationId
}

name_id! {
    /// Name of a line (an edge label). Written without the trailing " Line".
    RouteId
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("{0} Line doesn't exist")]
    UnknownRoute(RouteId),
    #[error("station {0} doesn't exist")]
    UnknownLocation(LocationId),
    #[error("station {location} doesn't have access to {route} Line")]
    Disconnected { location: LocationId, route: RouteId },
}

/// Immutable station → lines mapping with a designated home station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    home: LocationId,
    stations: BTreeMap<LocationId, BTreeSet<RouteId>>,
    routes: BTreeSet<RouteId>,
}

impl Topology {
    /// Build a topology from `(station, lines)` pairs. Lines listed for the
    /// same station twice are merged. Fails when `home` is not a station.
    pub fn new<L, R>(home: impl Into<LocationId>, stations: L) -> Result<Self, TopologyError>
    where
        L: IntoIterator<Item = (LocationId, R)>,
        R: IntoIterator<Item = RouteId>,
    {
        let mut builder = TopologyBuilder::new(home);
        for (station, lines) in stations {
            builder = builder.station(station, lines);
        }
        builder.build()
    }

    pub fn builder(home: impl Into<LocationId>) -> TopologyBuilder {
        TopologyBuilder::new(home)
    }

    pub fn home(&self) -> &LocationId {
        &self.home
    }

    pub fn is_home(&self, location: &str) -> bool {
        self.home.as_str() == location
    }

    pub fn contains_location(&self, location: &str) -> bool {
        self.stations.contains_key(location)
    }

    pub fn contains_route(&self, route: &str) -> bool {
        self.routes.contains(route)
    }

    /// Lines serving `location`, or `None` for an unknown station.
    pub fn routes_at(&self, location: &str) -> Option<&BTreeSet<RouteId>> {
        self.stations.get(location)
    }

    pub fn locations(&self) -> impl Iterator<Item = &LocationId> {
        self.stations.keys()
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteId> {
        self.routes.iter()
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Decide whether travelling from `origin` to `destination` on `route` is
    /// a legal move.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// 1. the line exists anywhere in the network,
    /// 2. the destination station exists,
    /// 3. the origin is served by the line,
    /// 4. the destination is served by the line.
    pub fn validate_trip(
        &self,
        origin: &str,
        destination: &str,
        route: &str,
    ) -> Result<(), TopologyError> {
        if !self.contains_route(route) {
            return Err(TopologyError::UnknownRoute(RouteId::from(route)));
        }
        let Some(destination_routes) = self.stations.get(destination) else {
            return Err(TopologyError::UnknownLocation(LocationId::from(destination)));
        };
        let origin_served = self
            .stations
            .get(origin)
            .is_some_and(|routes| routes.contains(route));
        if !origin_served {
            return Err(TopologyError::Disconnected {
                location: LocationId::from(origin),
                route: RouteId::from(route),
            });
        }
        if !destination_routes.contains(route) {
            return Err(TopologyError::Disconnected {
                location: LocationId::from(destination),
                route: RouteId::from(route),
            });
        }
        Ok(())
    }
}

/// Incremental construction of a [`Topology`].
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    home: LocationId,
    stations: BTreeMap<LocationId, BTreeSet<RouteId>>,
}

impl TopologyBuilder {
    pub fn new(home: impl Into<LocationId>) -> Self {
        Self {
            home: home.into(),
            stations: BTreeMap::new(),
        }
    }

    pub fn station<R, I>(mut self, name: impl Into<LocationId>, lines: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RouteId>,
    {
        self.stations
            .entry(name.into())
            .or_default()
            .extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<Topology, TopologyError> {
        if !self.stations.contains_key(&self.home) {
            return Err(TopologyError::UnknownLocation(self.home));
        }
        let routes = self.stations.values().flatten().cloned().collect();
        Ok(Topology {
            home: self.home,
            stations: self.stations,
            routes,
        })
    }
}
