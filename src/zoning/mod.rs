mod aggregate;
mod classify;
mod overlay;
mod resolve;

pub use aggregate::{LABEL_SEPARATOR, SummaryRow, aggregate, composite_label};
pub use classify::{Classification, MatchStrategy, RunStats, classify_parcels};
pub use overlay::{OverlayLayer, match_overlays, match_overlays_bulk};
pub use resolve::ZoneResolver;
