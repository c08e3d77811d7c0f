//! `<mapname>.mapdesc` XML parsing and serialization.
//!
//! ```xml
//! <mapdesc version="1">
//!   <description>...</description>
//!   <author>...</author>
//!   <size width=".." height=".." />
//!   <players>
//!     <player no=".." start="x z" />
//!   </players>
//! </mapdesc>
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "mapdesc")]
pub struct MapDesc {
    #[serde(rename = "@version")]
    pub version: u32,
    pub description: String,
    pub author: String,
    pub size: MapSize,
    pub players: PlayerStarts,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSize {
    #[serde(rename = "@width")]
    pub width: u32,
    #[serde(rename = "@height")]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStarts {
    #[serde(rename = "player", default)]
    pub player: Vec<PlayerStart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStart {
    #[serde(rename = "@no")]
    pub no: u8,
    #[serde(rename = "@start")]
    pub start: String,
}

impl PlayerStart {
    /// Parses the `"x z"` start-position attribute.
    pub fn position(&self) -> WorldResult<(f32, f32)> {
        let mut parts = self.start.split_whitespace();
        let x: f32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| WorldError::Parse(format!("bad start attribute: {}", self.start)))?;
        let z: f32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| WorldError::Parse(format!("bad start attribute: {}", self.start)))?;
        Ok((x, z))
    }
}

pub fn parse(xml: &str) -> WorldResult<MapDesc> {
    quick_xml::de::from_str(xml).map_err(|e| WorldError::Parse(e.to_string()))
}

pub fn serialize(desc: &MapDesc) -> WorldResult<String> {
    quick_xml::se::to_string(desc).map_err(|e| WorldError::Parse(e.to_string()))
}
