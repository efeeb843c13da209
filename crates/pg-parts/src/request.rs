//! Part requests
//!
//! A request names one generator and carries its flat parameter set, the
//! way a front end hands a dialog's values to the engine. Requests are
//! stored as RON:
//!
//! ```ron
//! NemaHolder((nema_size: 17, base_attachment: Holes))
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use pg_cad::{BuildResult, DocumentContext, Part};

use crate::bearing::{BearingHousingParams, bearing_housing};
use crate::belt_clamp::{BeltClampParams, belt_clamp};
use crate::bracket::{AluProfBracketParams, alu_prof_bracket};
use crate::nema::{NemaHolderParams, nema_holder};

/// Generator names and one-line descriptions
pub const GENERATORS: [(&str, &str); 4] = [
    (
        "AluProfBracket",
        "Perpendicular bracket joining two aluminium profiles, optional twin mode",
    ),
    (
        "NemaHolder",
        "L-shaped NEMA stepper holder with bolt circle and base rails",
    ),
    (
        "BearingHousing",
        "Linear bearing block with four bolts and optional captured nuts",
    ),
    (
        "BeltClamp",
        "Base with two slotted posts and two bolts with captured nuts",
    ),
];

/// One part to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartRequest {
    AluProfBracket(AluProfBracketParams),
    NemaHolder(NemaHolderParams),
    BearingHousing(BearingHousingParams),
    BeltClamp(BeltClampParams),
}

impl PartRequest {
    /// Name given to the finished part
    pub fn name(&self) -> &str {
        match self {
            PartRequest::AluProfBracket(p) => &p.name,
            PartRequest::NemaHolder(p) => &p.name,
            PartRequest::BearingHousing(p) => &p.name,
            PartRequest::BeltClamp(p) => &p.name,
        }
    }

    /// Generator name, as listed in [`GENERATORS`]
    pub fn kind_name(&self) -> &'static str {
        match self {
            PartRequest::AluProfBracket(_) => "AluProfBracket",
            PartRequest::NemaHolder(_) => "NemaHolder",
            PartRequest::BearingHousing(_) => "BearingHousing",
            PartRequest::BeltClamp(_) => "BeltClamp",
        }
    }

    /// Run the generator
    pub fn build(&self, ctx: &DocumentContext<'_>) -> BuildResult<Part> {
        info!(kind = self.kind_name(), name = self.name(), "Building part");
        match self {
            PartRequest::AluProfBracket(p) => alu_prof_bracket(ctx, p),
            PartRequest::NemaHolder(p) => nema_holder(ctx, p),
            PartRequest::BearingHousing(p) => bearing_housing(ctx, p),
            PartRequest::BeltClamp(p) => belt_clamp(ctx, p),
        }
    }

    /// Parse a RON request
    pub fn from_ron_str(content: &str) -> Result<Self, RequestError> {
        ron::from_str(content).map_err(|e| RequestError::Deserialize(e.to_string()))
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, RequestError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| RequestError::Serialize(e.to_string()))
    }

    /// Load a request from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| RequestError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}

/// Request file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
