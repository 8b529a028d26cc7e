use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::zoning::LABEL_SEPARATOR;

/// Job configuration: which layers to read, the ordered overlay list, and
/// which attribute fields carry the identifiers and codes.
///
/// Overlay declaration order is canonical: it fixes composite-label ordering
/// and output column ordering for the whole run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Parcel polygon layer.
    pub parcels: PathBuf,

    /// Base zoning polygon layer.
    pub zoning: PathBuf,

    /// Overlay district layers, in declaration order.
    #[serde(default)]
    pub overlays: Vec<OverlaySource>,

    #[serde(default)]
    pub fields: FieldNames,

    /// CRS of the source files. GeoJSON is lon/lat WGS84 per RFC 7946.
    #[serde(default = "default_source_epsg")]
    pub source_epsg: u32,

    /// Common planar CRS every layer is reprojected into before indexing.
    #[serde(default = "default_target_epsg")]
    pub target_epsg: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySource {
    pub path: PathBuf,

    /// Short code, e.g. "IZ" or "FP"; becomes a label segment and a column name.
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldNames {
    /// Parcel identifier field; rows without it fall back to the row index.
    #[serde(default = "default_parcel_id_field")]
    pub parcel_id: String,

    /// Zone code field on the base layer; "Unknown" when absent on a record.
    #[serde(default = "default_zone_field")]
    pub zone_code: String,

    /// Municipal code field on the parcel layer; blank when absent.
    #[serde(default = "default_muni_field")]
    pub muni_code: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            parcel_id: default_parcel_id_field(),
            zone_code: default_zone_field(),
            muni_code: default_muni_field(),
        }
    }
}

fn default_parcel_id_field() -> String { "MAPBLOCKLO".to_string() }
fn default_zone_field() -> String { "zon_new".to_string() }
fn default_muni_field() -> String { "MUNICODE".to_string() }
fn default_source_epsg() -> u32 { 4326 }
fn default_target_epsg() -> u32 { 3857 }

impl JobConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open job config: {}", path.display()))?;
        let config: JobConfig = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse job config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Input-contract checks; a violation fails the whole run up front.
    fn validate(&self) -> Result<()> {
        for overlay in &self.overlays {
            if overlay.code.is_empty() {
                bail!("Overlay {} has an empty code", overlay.path.display());
            }
            if overlay.code.contains(LABEL_SEPARATOR) {
                bail!(
                    "Overlay code {:?} contains the label separator {:?}",
                    overlay.code,
                    LABEL_SEPARATOR
                );
            }
        }
        let mut codes: Vec<&str> = self.overlays.iter().map(|o| o.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        if codes.len() != self.overlays.len() {
            bail!("Overlay codes must be unique");
        }
        if self.fields.parcel_id.is_empty() || self.fields.zone_code.is_empty() {
            bail!("Field names parcel_id and zone_code must be non-empty");
        }
        Ok(())
    }
}
