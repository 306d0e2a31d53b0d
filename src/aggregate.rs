// Single-pass aggregation of the raw cell matrix into per-island snapshots.
use crate::finance::rts_fee;
use crate::geo::{self, UNKNOWN};
use crate::status::normalize;
use crate::types::{
    CanonicalStatus, CellValue, Island, ParcelRecord, ProcessedDataset, RawDate, RegionSnapshot,
};
use crate::util::amount_from_cell;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed column offsets of the delivery export.
pub mod col {
    pub const DATE: usize = 0;
    pub const STATUS: usize = 2;
    pub const SHIPPER: usize = 5;
    pub const CONSIGNEE_REGION: usize = 13;
    pub const COD_AMOUNT: usize = 17;
    pub const SERVICE_CHARGE: usize = 18;
    pub const TOTAL_COST: usize = 19;
}

/// Rows with fewer cells than this cannot carry a consignee region.
pub const MIN_ROW_LEN: usize = col::CONSIGNEE_REGION + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    MissingStatus,
    MissingRegion,
}

/// Row accounting for one build. Skipped rows are data-quality noise, not
/// errors; this is for logs only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub total_rows: usize,
    pub short_rows: usize,
    pub missing_fields: usize,
    pub unresolved_island: usize,
    pub accepted: usize,
}

/// Turn one data row into a record. Geography, status and RTS fee are all
/// derived here; the island may still come out `unknown`.
pub fn parse_row(row: &[CellValue]) -> Result<ParcelRecord, SkipReason> {
    if row.len() < MIN_ROW_LEN {
        return Err(SkipReason::TooShort);
    }
    let text = |i: usize| row.get(i).map(CellValue::to_text).unwrap_or_default();

    // A zero or `false` status cell counts as no status at all.
    let raw_status = if row[col::STATUS].is_falsy() {
        String::new()
    } else {
        text(col::STATUS).trim().to_uppercase()
    };
    if raw_status.is_empty() {
        return Err(SkipReason::MissingStatus);
    }
    if row[col::CONSIGNEE_REGION].is_falsy() {
        return Err(SkipReason::MissingRegion);
    }
    let consignee_region = text(col::CONSIGNEE_REGION);

    let info = geo::resolve(&consignee_region);
    let total_cost = amount_from_cell(row.get(col::TOTAL_COST));

    Ok(ParcelRecord {
        date: RawDate::from(&row[col::DATE]),
        normalized_status: normalize(&raw_status),
        raw_status,
        shipper: text(col::SHIPPER),
        consignee_region,
        province: info.province.to_string(),
        region: info.region.to_string(),
        island: info.island,
        cod_amount: amount_from_cell(row.get(col::COD_AMOUNT)),
        service_charge: amount_from_cell(row.get(col::SERVICE_CHARGE)),
        total_cost,
        rts_fee: rts_fee(total_cost),
    })
}

impl RegionSnapshot {
    /// Fold one record into every counter of this snapshot.
    pub fn push(&mut self, record: Arc<ParcelRecord>) {
        let province = record.province.as_str();
        let status = record.normalized_status;
        let known_province = province != UNKNOWN;

        self.total += 1;
        if known_province {
            self.province_counts.incr(province);
            self.region_counts.incr(&record.region);
        }
        if let Some(sc) = self.status_counts.get_mut(status) {
            sc.count += 1;
            if known_province {
                sc.locations.incr(province);
            }
        }
        if status == CanonicalStatus::Delivered {
            self.delivered_shippers.incr(&record.shipper);
        }
        if status.is_rts() {
            self.rts_shippers.incr(&record.shipper);
        }
        self.records.push(record);
    }

    /// Snapshot over an arbitrary record subset, counted the same way as
    /// during ingestion.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Arc<ParcelRecord>>,
    {
        let mut snapshot = RegionSnapshot::default();
        for r in records {
            snapshot.push(r);
        }
        snapshot
    }
}

/// Build all snapshots from a cell matrix whose first row is the header.
pub fn build(matrix: &[Vec<CellValue>]) -> (ProcessedDataset, BuildReport) {
    let mut dataset = ProcessedDataset::default();
    let mut report = BuildReport::default();

    for (idx, row) in matrix.iter().enumerate().skip(1) {
        report.total_rows += 1;
        let record = match parse_row(row) {
            Ok(r) => r,
            Err(reason) => {
                match reason {
                    SkipReason::TooShort => report.short_rows += 1,
                    SkipReason::MissingStatus | SkipReason::MissingRegion => {
                        report.missing_fields += 1
                    }
                }
                debug!(row = idx, ?reason, "row skipped");
                continue;
            }
        };

        if record.island == Island::Unknown {
            report.unresolved_island += 1;
            debug!(row = idx, region = %record.consignee_region, "consignee region not resolved");
            continue;
        }

        let record = Arc::new(record);
        dataset.all.push(Arc::clone(&record));
        if let Some(snapshot) = dataset.island_mut(record.island) {
            snapshot.push(record);
        }
        report.accepted += 1;
    }

    info!(
        rows = report.total_rows,
        accepted = report.accepted,
        short = report.short_rows,
        missing = report.missing_fields,
        unresolved = report.unresolved_island,
        "dataset built"
    );
    (dataset, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        date: &str,
        status: &str,
        shipper: &str,
        region: &str,
        cod: &str,
        fee: &str,
        cost: &str,
    ) -> Vec<CellValue> {
        let mut cells = vec![CellValue::Empty; 20];
        cells[col::DATE] = CellValue::Text(date.into());
        cells[col::STATUS] = CellValue::Text(status.into());
        cells[col::SHIPPER] = CellValue::Text(shipper.into());
        cells[col::CONSIGNEE_REGION] = CellValue::Text(region.into());
        cells[col::COD_AMOUNT] = CellValue::Text(cod.into());
        cells[col::SERVICE_CHARGE] = CellValue::Text(fee.into());
        cells[col::TOTAL_COST] = CellValue::Text(cost.into());
        cells
    }

    fn header() -> Vec<CellValue> {
        vec![CellValue::Text("Date".into()); 20]
    }

    #[test]
    fn delivered_row_lands_in_all_and_luzon() {
        let matrix = vec![
            header(),
            row("2024-03-15", "DELIVERED", "Shipper A", "Quezon City", "500", "50", "100"),
        ];
        let (ds, report) = build(&matrix);
        assert_eq!(report.accepted, 1);

        let rec = &ds.all.records[0];
        assert_eq!(rec.island, Island::Luzon);
        assert_eq!(rec.province, "Quezon City");
        assert_eq!(rec.normalized_status, CanonicalStatus::Delivered);
        assert_eq!(rec.rts_fee, 20.0);

        for snap in [&ds.all, &ds.luzon] {
            assert_eq!(snap.total, 1);
            assert_eq!(snap.delivered_shippers.get("Shipper A"), 1);
            assert_eq!(snap.province_counts.get("Quezon City"), 1);
            assert_eq!(snap.region_counts.get("NCR"), 1);
            let delivered = snap.status_counts.get(CanonicalStatus::Delivered).unwrap();
            assert_eq!(delivered.count, 1);
            assert_eq!(delivered.locations.get("Quezon City"), 1);
        }
        assert_eq!(ds.visayas.total, 0);
        assert_eq!(ds.mindanao.total, 0);
    }

    #[test]
    fn unknown_place_is_computed_but_excluded() {
        let r = row("2024-03-15", "DELIVERED", "Shipper A", "Unknown Place", "1", "1", "1");
        let parsed = parse_row(&r).unwrap();
        assert_eq!(parsed.island, Island::Unknown);

        let (ds, report) = build(&[header(), r]);
        assert_eq!(report.unresolved_island, 1);
        assert_eq!(ds.all.total, 0);
        assert!(ds.all.records.is_empty());
        assert!(ds.all.delivered_shippers.is_empty());
    }

    #[test]
    fn other_status_counts_toward_totals_only() {
        let matrix = vec![
            header(),
            row("2024-03-15", "Lost in transit", "Shipper B", "Cebu", "0", "0", "0"),
            row("2024-03-15", "On Delivery", "Shipper B", "Cebu", "0", "0", "0"),
        ];
        let (ds, _) = build(&matrix);
        assert_eq!(ds.all.records[0].normalized_status, CanonicalStatus::Other);
        assert_eq!(ds.all.records[0].raw_status, "LOST IN TRANSIT");
        assert_eq!(ds.all.records[1].normalized_status, CanonicalStatus::OnDelivery);

        assert_eq!(ds.visayas.total, 2);
        assert_eq!(ds.visayas.province_counts.get("Cebu"), 2);
        assert_eq!(ds.visayas.region_counts.get("Region VII"), 2);
        let tracked: usize = ds.visayas.status_counts.iter().map(|(_, c)| c.count).sum();
        assert_eq!(tracked, 1);
        assert!(ds.visayas.delivered_shippers.is_empty());
        assert!(ds.visayas.rts_shippers.is_empty());
    }

    #[test]
    fn short_and_empty_rows_are_dropped_silently() {
        let mut short = row("2024-03-15", "DELIVERED", "S", "Manila", "1", "1", "1");
        short.truncate(13);
        let matrix = vec![
            header(),
            short,
            row("2024-03-15", "  ", "S", "Manila", "1", "1", "1"),
            row("2024-03-15", "DELIVERED", "S", "", "1", "1", "1"),
        ];
        let (ds, report) = build(&matrix);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.short_rows, 1);
        assert_eq!(report.missing_fields, 2);
        assert_eq!(ds.all.total, 0);
    }

    #[test]
    fn island_only_match_skips_province_counters() {
        let matrix = vec![
            header(),
            row("", "RETURNED", "S", "Somewhere in Mindanao", "", "x", "50"),
        ];
        let (ds, _) = build(&matrix);
        let snap = &ds.mindanao;
        assert_eq!(snap.total, 1);
        assert!(snap.province_counts.is_empty());
        assert!(snap.region_counts.is_empty());
        let returned = snap.status_counts.get(CanonicalStatus::Returned).unwrap();
        assert_eq!(returned.count, 1);
        assert!(returned.locations.is_empty());
        assert_eq!(snap.rts_shippers.get("S"), 1);
        assert_eq!(snap.records[0].service_charge, 0.0);
        assert_eq!(snap.records[0].rts_fee, 10.0);
    }

    #[test]
    fn all_total_equals_sum_of_islands() {
        let matrix = vec![
            header(),
            row("", "DELIVERED", "A", "Makati", "1", "1", "1"),
            row("", "CANCELLED", "B", "Iloilo", "1", "1", "1"),
            row("", "PICKUP", "C", "Davao City", "1", "1", "1"),
            row("", "DETAINED", "D", "Atlantis", "1", "1", "1"),
            row("", "IN TRANSIT", "A", "Baguio City", "1", "1", "1"),
        ];
        let (ds, _) = build(&matrix);
        assert_eq!(ds.all.total, 4);
        assert_eq!(ds.all.total, ds.luzon.total + ds.visayas.total + ds.mindanao.total);
        // Island snapshots share the record allocations with `all`.
        assert!(Arc::ptr_eq(&ds.all.records[0], &ds.luzon.records[0]));
        for r in &ds.all.records {
            assert_eq!(r.rts_fee, r.total_cost * 0.20);
        }
    }

    #[test]
    fn numeric_cells_are_read_as_text_where_needed() {
        let mut r = row("", "DELIVERED", "", "Pasig", "", "", "");
        r[col::SHIPPER] = CellValue::Number(123.0);
        r[col::DATE] = CellValue::Number(45000.0);
        r[col::TOTAL_COST] = CellValue::Number(250.0);
        let parsed = parse_row(&r).unwrap();
        assert_eq!(parsed.shipper, "123");
        assert_eq!(parsed.date, RawDate::Serial(45000.0));
        assert_eq!(parsed.rts_fee, 50.0);
    }

    #[test]
    fn zero_or_false_status_and_region_cells_are_missing() {
        let mut zero_status = row("", "", "S", "Pasig", "1", "1", "1");
        zero_status[col::STATUS] = CellValue::Number(0.0);
        assert_eq!(parse_row(&zero_status).unwrap_err(), SkipReason::MissingStatus);

        let mut false_status = row("", "", "S", "Pasig", "1", "1", "1");
        false_status[col::STATUS] = CellValue::Bool(false);
        assert_eq!(parse_row(&false_status).unwrap_err(), SkipReason::MissingStatus);

        let mut zero_region = row("", "DELIVERED", "S", "", "1", "1", "1");
        zero_region[col::CONSIGNEE_REGION] = CellValue::Number(0.0);
        assert_eq!(parse_row(&zero_region).unwrap_err(), SkipReason::MissingRegion);

        // Text "0" is still a value and ends up as OTHER.
        let text_zero = row("", "0", "S", "Pasig", "1", "1", "1");
        assert_eq!(parse_row(&text_zero).unwrap().normalized_status, CanonicalStatus::Other);
    }
}
