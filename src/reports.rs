use crate::dates;
use crate::filter::Filter;
use crate::finance::FinancialSummary;
use crate::geo::UNKNOWN;
use crate::types::{
    CanonicalStatus, Island, ParcelRecord, ProcessedDataset, RegionSnapshot, Scope, Tally,
};
use crate::util::percentage;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DASHBOARD_TOP: usize = 5;
pub const ANALYTICAL_TOP: usize = 10;

pub type Ranking = Vec<(String, usize)>;

/// Snapshot to report on: the precomputed one when no record-level criterion
/// is set, otherwise a fresh fold over the matching records.
fn scoped_snapshot<'a>(dataset: &'a ProcessedDataset, filter: &Filter) -> Cow<'a, RegionSnapshot> {
    let snapshot = dataset.snapshot(filter.scope);
    if filter.is_unfiltered() {
        Cow::Borrowed(snapshot)
    } else {
        Cow::Owned(RegionSnapshot::from_records(filter.apply(snapshot)))
    }
}

fn scoped_records(dataset: &ProcessedDataset, filter: &Filter) -> Vec<Arc<ParcelRecord>> {
    filter.apply(dataset.snapshot(filter.scope))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCard {
    pub status: CanonicalStatus,
    pub count: usize,
    pub top_locations: Ranking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub scope: Scope,
    pub total: usize,
    pub rts_percentage: f64,
    pub status_cards: Vec<StatusCard>,
    pub top_provinces: Ranking,
    pub top_regions: Ranking,
    pub top_rts_provinces: Ranking,
    pub top_delivered_shippers: Ranking,
    pub top_rts_shippers: Ranking,
}

pub fn dashboard(dataset: &ProcessedDataset, filter: &Filter) -> DashboardView {
    let snap = scoped_snapshot(dataset, filter);

    let status_cards = snap
        .status_counts
        .iter()
        .map(|(status, sc)| StatusCard {
            status,
            count: sc.count,
            top_locations: sc.locations.top(DASHBOARD_TOP),
        })
        .collect();

    let mut rts_provinces = Tally::default();
    for status in CanonicalStatus::RTS {
        if let Some(sc) = snap.status_counts.get(status) {
            for (province, n) in sc.locations.iter() {
                rts_provinces.add(province, n);
            }
        }
    }

    DashboardView {
        scope: filter.scope,
        total: snap.total,
        rts_percentage: percentage(snap.rts_count(), snap.total),
        status_cards,
        top_provinces: snap.province_counts.top(DASHBOARD_TOP),
        top_regions: snap.region_counts.top(DASHBOARD_TOP),
        top_rts_provinces: rts_provinces.top(DASHBOARD_TOP),
        top_delivered_shippers: snap.delivered_shippers.top(DASHBOARD_TOP),
        top_rts_shippers: snap.rts_shippers.top(DASHBOARD_TOP),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IslandTotals {
    pub luzon: usize,
    pub visayas: usize,
    pub mindanao: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticalReport {
    pub island_totals: IslandTotals,
    pub top_provinces: Ranking,
    pub top_shippers: Ranking,
    pub top_rts_destinations: Ranking,
}

pub fn analytical(dataset: &ProcessedDataset, filter: &Filter) -> AnalyticalReport {
    let records = scoped_records(dataset, filter);

    let mut totals = IslandTotals { total: records.len(), ..Default::default() };
    let mut provinces = Tally::default();
    let mut shippers = Tally::default();
    let mut rts_destinations = Tally::default();

    for r in &records {
        match r.island {
            Island::Luzon => totals.luzon += 1,
            Island::Visayas => totals.visayas += 1,
            Island::Mindanao => totals.mindanao += 1,
            Island::Unknown => {}
        }
        shippers.incr(&r.shipper);
        if r.province != UNKNOWN {
            provinces.incr(&r.province);
            if r.normalized_status.is_rts() {
                rts_destinations.incr(&r.province);
            }
        }
    }

    AnalyticalReport {
        island_totals: totals,
        top_provinces: provinces.top(ANALYTICAL_TOP),
        top_shippers: shippers.top(ANALYTICAL_TOP),
        top_rts_destinations: rts_destinations.top(ANALYTICAL_TOP),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRate {
    pub year: i32,
    pub month: i32,
    pub total: usize,
    pub delivered: usize,
    pub rts: usize,
    pub delivery_rate: f64,
    pub rts_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub total: usize,
    pub delivered: usize,
    pub rts: usize,
    pub delivery_rate: f64,
    pub rts_rate: f64,
    /// The eight tracked statuses in canonical order, then `OTHER`.
    pub breakdown: Vec<(CanonicalStatus, usize)>,
    pub monthly: Vec<MonthlyRate>,
}

pub fn performance(dataset: &ProcessedDataset, filter: &Filter) -> PerformanceReport {
    let records = scoped_records(dataset, filter);

    let mut months: BTreeMap<(i32, i32), (usize, usize, usize)> = BTreeMap::new();
    let order: Vec<CanonicalStatus> = CanonicalStatus::TRACKED
        .iter()
        .copied()
        .chain(std::iter::once(CanonicalStatus::Other))
        .collect();
    let mut counts = vec![0usize; order.len()];

    for r in &records {
        if let Some(slot) = order.iter().position(|s| *s == r.normalized_status) {
            counts[slot] += 1;
        }

        // Undated records still count in the totals, just not in the series.
        let parts = dates::interpret(&r.date);
        if let (Some(y), Some(m)) = (parts.year, parts.month) {
            if (1..=12).contains(&m) {
                let e = months.entry((y, m)).or_default();
                e.0 += 1;
                if r.normalized_status == CanonicalStatus::Delivered {
                    e.1 += 1;
                }
                if r.normalized_status.is_rts() {
                    e.2 += 1;
                }
            }
        }
    }

    let breakdown: Vec<(CanonicalStatus, usize)> = order.into_iter().zip(counts).collect();
    let count_of = |status: CanonicalStatus| {
        breakdown.iter().find(|(s, _)| *s == status).map(|(_, n)| *n).unwrap_or(0)
    };
    let delivered = count_of(CanonicalStatus::Delivered);
    let rts: usize = CanonicalStatus::RTS.iter().map(|s| count_of(*s)).sum();

    let monthly = months
        .into_iter()
        .map(|((year, month), (total, delivered, rts))| MonthlyRate {
            year,
            month,
            total,
            delivered,
            rts,
            delivery_rate: percentage(delivered, total),
            rts_rate: percentage(rts, total),
        })
        .collect();

    PerformanceReport {
        total: records.len(),
        delivered,
        rts,
        delivery_rate: percentage(delivered, records.len()),
        rts_rate: percentage(rts, records.len()),
        breakdown,
        monthly,
    }
}

pub fn financial(dataset: &ProcessedDataset, filter: &Filter) -> FinancialSummary {
    let records = scoped_records(dataset, filter);
    FinancialSummary::compute(records.iter().map(|r| r.as_ref()))
}
