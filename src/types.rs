use crate::geo;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One cell of the source matrix, as handed over by the spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Blank, zero, NaN or `false`: cells a spreadsheet formula treats as
    /// "no value".
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !b,
            other => other.is_blank(),
        }
    }

    /// Text form of the cell, the way a spreadsheet would display it.
    /// Whole numbers render without a fractional part (`123`, not `123.0`).
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

/// A date cell kept exactly as it arrived. Interpretation happens only when a
/// report filters or buckets by date (see `dates`).
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    Missing,
    /// Spreadsheet serial day number, counted from 1899-12-30.
    Serial(f64),
    Text(String),
}

impl From<&CellValue> for RawDate {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Number(n) if *n != 0.0 && n.is_finite() => RawDate::Serial(*n),
            CellValue::Text(s) if !s.is_empty() => RawDate::Text(s.clone()),
            CellValue::Bool(true) => RawDate::Text("true".to_string()),
            _ => RawDate::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Island {
    Luzon,
    Visayas,
    Mindanao,
    Unknown,
}

impl Island {
    pub fn as_str(self) -> &'static str {
        match self {
            Island::Luzon => "luzon",
            Island::Visayas => "visayas",
            Island::Mindanao => "mindanao",
            Island::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Island {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which snapshot of a dataset a view reads. `All` is a view-side pseudo
/// region and is never produced by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Island(Island),
}

impl Scope {
    pub fn label(self) -> &'static str {
        match self {
            Scope::All => "All Regions",
            Scope::Island(island) => geo::island_name(island),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalStatus {
    Delivered,
    OnDelivery,
    Pickup,
    InTransit,
    Cancelled,
    Detained,
    Problematic,
    Returned,
    Other,
}

impl CanonicalStatus {
    /// Statuses with their own counters; `Other` has none.
    pub const TRACKED: [CanonicalStatus; 8] = [
        CanonicalStatus::Delivered,
        CanonicalStatus::OnDelivery,
        CanonicalStatus::Pickup,
        CanonicalStatus::InTransit,
        CanonicalStatus::Cancelled,
        CanonicalStatus::Detained,
        CanonicalStatus::Problematic,
        CanonicalStatus::Returned,
    ];

    /// Return-to-sender group.
    pub const RTS: [CanonicalStatus; 3] = [
        CanonicalStatus::Cancelled,
        CanonicalStatus::Problematic,
        CanonicalStatus::Returned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalStatus::Delivered => "DELIVERED",
            CanonicalStatus::OnDelivery => "ONDELIVERY",
            CanonicalStatus::Pickup => "PICKUP",
            CanonicalStatus::InTransit => "INTRANSIT",
            CanonicalStatus::Cancelled => "CANCELLED",
            CanonicalStatus::Detained => "DETAINED",
            CanonicalStatus::Problematic => "PROBLEMATIC",
            CanonicalStatus::Returned => "RETURNED",
            CanonicalStatus::Other => "OTHER",
        }
    }

    pub fn is_rts(self) -> bool {
        Self::RTS.contains(&self)
    }

    fn tracked_index(self) -> Option<usize> {
        Self::TRACKED.iter().position(|s| *s == self)
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized delivery row. Built once during ingestion and shared between
/// the `all` snapshot and its island snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelRecord {
    pub date: RawDate,
    /// Status cell, uppercased and trimmed.
    pub raw_status: String,
    pub normalized_status: CanonicalStatus,
    pub shipper: String,
    pub consignee_region: String,
    pub province: String,
    pub region: String,
    pub island: Island,
    pub cod_amount: f64,
    pub service_charge: f64,
    pub total_cost: f64,
    pub rts_fee: f64,
}

/// String-keyed counter that remembers first-insertion order, so rankings
/// with equal counts come out in source-row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn add(&mut self, key: &str, n: usize) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), n));
            }
        }
    }

    pub fn incr(&mut self, key: &str) {
        self.add(key, 1);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Highest counts first, at most `n` entries. The sort is stable, so ties
    /// keep insertion order.
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCount {
    pub count: usize,
    /// Per-province counts for this status.
    pub locations: Tally,
}

/// Counters for the eight tracked statuses, in canonical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCounts {
    entries: [StatusCount; 8],
}

impl StatusCounts {
    pub fn get(&self, status: CanonicalStatus) -> Option<&StatusCount> {
        let i = status.tracked_index()?;
        Some(&self.entries[i])
    }

    pub fn get_mut(&mut self, status: CanonicalStatus) -> Option<&mut StatusCount> {
        let i = status.tracked_index()?;
        Some(&mut self.entries[i])
    }

    pub fn count(&self, status: CanonicalStatus) -> usize {
        self.get(status).map(|s| s.count).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalStatus, &StatusCount)> {
        CanonicalStatus::TRACKED.iter().copied().zip(self.entries.iter())
    }
}

/// Aggregates over one slice of the dataset (everything, or one island).
#[derive(Debug, Clone, Default)]
pub struct RegionSnapshot {
    pub records: Vec<Arc<ParcelRecord>>,
    pub status_counts: StatusCounts,
    pub province_counts: Tally,
    pub region_counts: Tally,
    pub total: usize,
    pub delivered_shippers: Tally,
    pub rts_shippers: Tally,
}

impl RegionSnapshot {
    pub fn rts_count(&self) -> usize {
        CanonicalStatus::RTS
            .iter()
            .map(|s| self.status_counts.count(*s))
            .sum()
    }
}

/// Output of one upload. Replaced wholesale on the next upload.
#[derive(Debug, Clone, Default)]
pub struct ProcessedDataset {
    pub all: RegionSnapshot,
    pub luzon: RegionSnapshot,
    pub visayas: RegionSnapshot,
    pub mindanao: RegionSnapshot,
}

impl ProcessedDataset {
    pub fn snapshot(&self, scope: Scope) -> &RegionSnapshot {
        match scope {
            Scope::All => &self.all,
            Scope::Island(Island::Luzon) => &self.luzon,
            Scope::Island(Island::Visayas) => &self.visayas,
            Scope::Island(Island::Mindanao) => &self.mindanao,
            // Unknown-island records are excluded from every snapshot, so the
            // closest faithful answer is the (empty) set of what matched.
            Scope::Island(Island::Unknown) => &EMPTY_SNAPSHOT,
        }
    }

    pub fn island_mut(&mut self, island: Island) -> Option<&mut RegionSnapshot> {
        match island {
            Island::Luzon => Some(&mut self.luzon),
            Island::Visayas => Some(&mut self.visayas),
            Island::Mindanao => Some(&mut self.mindanao),
            Island::Unknown => None,
        }
    }
}

static EMPTY_SNAPSHOT: Lazy<RegionSnapshot> = Lazy::new(RegionSnapshot::default);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_keeps_first_insertion_order_on_ties() {
        let mut t = Tally::default();
        t.incr("B");
        t.incr("A");
        t.incr("C");
        t.incr("C");
        t.incr("A");
        let top = t.top(10);
        assert_eq!(
            top,
            vec![("A".to_string(), 2), ("C".to_string(), 2), ("B".to_string(), 1)]
        );
        assert_eq!(t.get("missing"), 0);
    }

    #[test]
    fn tally_top_truncates() {
        let mut t = Tally::default();
        for k in ["a", "b", "c", "d", "e", "f"] {
            t.incr(k);
        }
        assert_eq!(t.top(5).len(), 5);
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn status_counts_ignore_other() {
        let mut counts = StatusCounts::default();
        assert!(counts.get_mut(CanonicalStatus::Other).is_none());
        if let Some(c) = counts.get_mut(CanonicalStatus::Returned) {
            c.count += 2;
        }
        assert_eq!(counts.count(CanonicalStatus::Returned), 2);
        assert_eq!(counts.count(CanonicalStatus::Other), 0);
        assert_eq!(counts.iter().count(), 8);
    }

    #[test]
    fn raw_date_treats_zero_and_blank_as_missing() {
        assert_eq!(RawDate::from(&CellValue::Number(0.0)), RawDate::Missing);
        assert_eq!(RawDate::from(&CellValue::Text(String::new())), RawDate::Missing);
        assert_eq!(RawDate::from(&CellValue::Empty), RawDate::Missing);
        assert_eq!(RawDate::from(&CellValue::Number(45000.0)), RawDate::Serial(45000.0));
    }

    #[test]
    fn falsy_cells() {
        assert!(CellValue::Number(0.0).is_falsy());
        assert!(CellValue::Number(f64::NAN).is_falsy());
        assert!(CellValue::Bool(false).is_falsy());
        assert!(CellValue::Empty.is_falsy());
        assert!(CellValue::Text(String::new()).is_falsy());
        assert!(!CellValue::Text("0".into()).is_falsy());
        assert!(!CellValue::Bool(true).is_falsy());
        assert!(!CellValue::Number(-1.0).is_falsy());
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(123.0).to_text(), "123");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
    }
}
