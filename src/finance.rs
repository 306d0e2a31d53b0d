use crate::types::ParcelRecord;
use serde::Serialize;

/// Share of the shipping cost charged back when a parcel is returned.
pub const RTS_FEE_RATE: f64 = 0.20;

/// Potential RTS fee for a parcel. Computed for every record regardless of
/// status; it only becomes a loss when the parcel is in the RTS group.
pub fn rts_fee(total_cost: f64) -> f64 {
    total_cost * RTS_FEE_RATE
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_cod: f64,
    pub total_service_charge: f64,
    pub total_shipping_cost: f64,
    pub total_rts_fee: f64,
    pub rts_parcels: usize,
    pub rts_shipping_cost: f64,
    pub rts_fee_lost: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
}

impl FinancialSummary {
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ParcelRecord>,
    {
        let mut s = FinancialSummary::default();
        for r in records {
            s.total_cod += r.cod_amount;
            s.total_service_charge += r.service_charge;
            s.total_shipping_cost += r.total_cost;
            s.total_rts_fee += r.rts_fee;
            if r.normalized_status.is_rts() {
                s.rts_parcels += 1;
                s.rts_shipping_cost += r.total_cost;
                s.rts_fee_lost += r.rts_fee;
            }
        }
        s.gross_profit = s.total_cod - s.total_shipping_cost;
        s.net_profit = s.gross_profit - s.rts_shipping_cost - s.rts_fee_lost;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalStatus, Island, RawDate};

    fn parcel(status: CanonicalStatus, cod: f64, service: f64, cost: f64) -> ParcelRecord {
        ParcelRecord {
            date: RawDate::Missing,
            raw_status: status.as_str().to_string(),
            normalized_status: status,
            shipper: "S".to_string(),
            consignee_region: "Cebu".to_string(),
            province: "Cebu".to_string(),
            region: "Region VII".to_string(),
            island: Island::Visayas,
            cod_amount: cod,
            service_charge: service,
            total_cost: cost,
            rts_fee: rts_fee(cost),
        }
    }

    #[test]
    fn rts_fee_is_twenty_percent() {
        assert_eq!(rts_fee(100.0), 20.0);
        assert_eq!(rts_fee(0.0), 0.0);
    }

    #[test]
    fn profit_deducts_rts_costs() {
        let records = vec![
            parcel(CanonicalStatus::Delivered, 500.0, 50.0, 100.0),
            parcel(CanonicalStatus::Returned, 300.0, 30.0, 80.0),
            parcel(CanonicalStatus::Other, 0.0, 0.0, 10.0),
        ];
        let s = FinancialSummary::compute(&records);
        assert_eq!(s.total_cod, 800.0);
        assert_eq!(s.total_service_charge, 80.0);
        assert_eq!(s.total_shipping_cost, 190.0);
        assert_eq!(s.total_rts_fee, 38.0);
        assert_eq!(s.rts_parcels, 1);
        assert_eq!(s.rts_shipping_cost, 80.0);
        assert_eq!(s.rts_fee_lost, 16.0);
        assert_eq!(s.gross_profit, 610.0);
        assert_eq!(
            s.net_profit,
            (s.total_cod - s.total_shipping_cost) - s.rts_shipping_cost - s.rts_fee_lost
        );
    }

    #[test]
    fn empty_scope_is_all_zero() {
        let s = FinancialSummary::compute(std::iter::empty());
        assert_eq!(s, FinancialSummary::default());
    }
}
