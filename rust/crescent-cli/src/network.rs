//! Network files: the stations of a map and the lines serving each one.
//!
//! ```toml
//! home = "Mornington Crescent"
//!
//! [stations]
//! "Mornington Crescent" = ["Northern"]
//! "Euston" = ["Northern", "Victoria"]
//! ```

use crate::error::LoadError;
use crescent_core::{LocationId, RouteId, Topology};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

static LONDON: &str = include_str!("../data/london.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkFile {
    pub home: String,
    #[serde(default)]
    pub stations: BTreeMap<String, Vec<String>>,
}

impl NetworkFile {
    /// Build the topology. `name` only labels errors.
    pub fn into_topology(self, name: &str) -> Result<Topology, LoadError> {
        let stations = self.stations.into_iter().map(|(station, lines)| {
            (
                LocationId::from(station),
                lines.into_iter().map(RouteId::from).collect::<Vec<_>>(),
            )
        });
        Topology::new(self.home, stations).map_err(|e| LoadError::Network {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Parse a network from TOML text.
pub fn parse(name: &str, text: &str) -> Result<Topology, LoadError> {
    let file: NetworkFile = toml::from_str(text).map_err(|e| LoadError::Network {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    file.into_topology(name)
}

/// Load a network file from disk.
pub fn load(path: &Path) -> Result<Topology, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::read(path, e))?;
    parse(&path.display().to_string(), &text)
}

/// The bundled London Underground network.
pub fn london() -> Result<Topology, LoadError> {
    parse("london", LONDON)
}
