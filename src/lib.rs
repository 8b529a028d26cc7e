#![doc = "Zonewise public API"]
mod index;
mod layer;
mod proj;
mod zoning;

pub mod cli;
pub mod commands;
pub mod config;
pub mod io;

#[doc(inline)]
pub use index::SpatialIndex;

#[doc(inline)]
pub use layer::{GeomLayer, LayerRecord};

#[doc(inline)]
pub use proj::reproject_layer;

#[doc(inline)]
pub use zoning::{
    Classification, MatchStrategy, OverlayLayer, RunStats, SummaryRow, ZoneResolver, aggregate,
    classify_parcels, composite_label, match_overlays, match_overlays_bulk,
};
