use std::collections::BTreeMap;

use ahash::AHashSet;

use super::Classification;

/// Separator between the zone code and overlay codes in a composite label.
/// Codes must not contain it; config validation enforces this.
pub const LABEL_SEPARATOR: char = '-';

/// Join the zone code and the matched overlay codes, in declaration order,
/// e.g. zone "R1" with {FP, HO} present -> "R1-FP-HO".
pub fn composite_label<'a>(zone: &str, matched: impl IntoIterator<Item = &'a str>) -> String {
    let mut label = zone.to_string();
    for code in matched {
        label.push(LABEL_SEPARATOR);
        label.push_str(code);
    }
    label
}

/// One summary group: every detail row with this composite label.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub count: u32,
    pub area_sqft: f64,
}

/// Collapse exact-duplicate detail rows, then group by composite label.
///
/// Every surviving row lands in exactly one group, so
/// `sum(summary.count) == detail.len()` and the area sums reconcile. Groups
/// are ordered by descending count, then label, for stable output.
pub fn aggregate(rows: Vec<Classification>) -> (Vec<Classification>, Vec<SummaryRow>) {
    // Dedup on the fully formed row; area enters the key bit-exactly so two
    // genuinely different rows for one parcel id both survive.
    let mut seen: AHashSet<(String, String, String, u64, Vec<bool>, String)> =
        AHashSet::with_capacity(rows.len());
    let mut detail = Vec::with_capacity(rows.len());
    for row in rows {
        let key = (
            row.parcel_id.clone(),
            row.muni_code.clone(),
            row.zone.clone(),
            row.area_sqft.to_bits(),
            row.flags.clone(),
            row.label.clone(),
        );
        if seen.insert(key) {
            detail.push(row);
        }
    }

    let mut groups: BTreeMap<&str, (u32, f64)> = BTreeMap::new();
    for row in &detail {
        let entry = groups.entry(row.label.as_str()).or_default();
        entry.0 += 1;
        entry.1 += row.area_sqft;
    }
    let mut summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(label, (count, area_sqft))| SummaryRow { label: label.to_string(), count, area_sqft })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    (detail, summary)
}
