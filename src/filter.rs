use crate::dates;
use crate::error::FilterError;
use crate::status::parse_canonical;
use crate::types::{CanonicalStatus, Island, ParcelRecord, RegionSnapshot, Scope};
use crate::util::parse_int_prefix;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Single-criterion filters offered by the report menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    All,
    Province,
    Month,
    Year,
    Status,
}

/// Filter values as entered by the user. Every criterion is optional and
/// they combine with AND. Call `validate` before applying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub island: Option<String>,
    pub status: Option<String>,
    pub province: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl FilterSpec {
    pub fn single(kind: FilterKind, value: &str) -> Self {
        let value = Some(value.to_string());
        match kind {
            FilterKind::All => FilterSpec::default(),
            FilterKind::Province => FilterSpec { province: value, ..Default::default() },
            FilterKind::Month => FilterSpec { month: value, ..Default::default() },
            FilterKind::Year => FilterSpec { year: value, ..Default::default() },
            FilterKind::Status => FilterSpec { status: value, ..Default::default() },
        }
    }

    pub fn with_island(mut self, island: &str) -> Self {
        self.island = Some(island.to_string());
        self
    }

    pub fn validate(&self) -> Result<Filter, FilterError> {
        let scope = match non_blank(&self.island, "island")? {
            None => Scope::All,
            Some(v) => parse_scope(v)?,
        };

        let status = match non_blank(&self.status, "status")? {
            None => None,
            Some(v) if v.trim().eq_ignore_ascii_case("all") => None,
            Some(v) => Some(
                parse_canonical(v).ok_or_else(|| FilterError::UnknownStatus(v.to_string()))?,
            ),
        };

        let province = non_blank(&self.province, "province")?.map(|v| v.to_lowercase());

        let month = match non_blank(&self.month, "month")? {
            None => None,
            Some(v) => {
                let m = numeric(v, "month")?;
                if !(1..=12).contains(&m) {
                    return Err(FilterError::OutOfRange { field: "month", value: v.to_string() });
                }
                Some(m)
            }
        };

        let year = match non_blank(&self.year, "year")? {
            None => None,
            Some(v) => Some(numeric(v, "year")?),
        };

        let date_from = non_blank(&self.date_from, "date from")?
            .map(|v| iso_date(v, "date from"))
            .transpose()?;
        let date_to = non_blank(&self.date_to, "date to")?
            .map(|v| iso_date(v, "date to"))
            .transpose()?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(FilterError::OutOfRange {
                    field: "date range",
                    value: format!("{from}..{to}"),
                });
            }
        }

        Ok(Filter { scope, status, province, month, year, date_from, date_to })
    }
}

// A criterion that was chosen but left blank is rejected rather than ignored.
fn non_blank<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<Option<&'a str>, FilterError> {
    match value.as_deref() {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(FilterError::MissingValue(field)),
        Some(v) => Ok(Some(v)),
    }
}

fn numeric(value: &str, field: &'static str) -> Result<i32, FilterError> {
    parse_int_prefix(value).ok_or_else(|| FilterError::NotANumber {
        field,
        value: value.to_string(),
    })
}

fn iso_date(value: &str, field: &'static str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FilterError::InvalidDate { field, value: value.to_string() })
}

fn parse_scope(value: &str) -> Result<Scope, FilterError> {
    match value.trim().to_lowercase().as_str() {
        "all" => Ok(Scope::All),
        "luzon" => Ok(Scope::Island(Island::Luzon)),
        "visayas" => Ok(Scope::Island(Island::Visayas)),
        "mindanao" => Ok(Scope::Island(Island::Mindanao)),
        _ => Err(FilterError::UnknownIsland(value.to_string())),
    }
}

/// A validated filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub scope: Scope,
    pub status: Option<CanonicalStatus>,
    /// Lowercased substring to look for in the province name.
    pub province: Option<String>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Filter {
    /// True when no record-level criterion is set (the scope may still pick
    /// an island).
    pub fn is_unfiltered(&self) -> bool {
        self.status.is_none()
            && self.province.is_none()
            && self.month.is_none()
            && self.year.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    fn uses_dates(&self) -> bool {
        self.month.is_some()
            || self.year.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    pub fn matches(&self, r: &ParcelRecord) -> bool {
        if let Some(status) = self.status {
            if r.normalized_status != status {
                return false;
            }
        }
        if let Some(needle) = &self.province {
            if !r.province.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if !self.uses_dates() {
            return true;
        }

        // Records whose date cannot be interpreted drop out of date filters.
        let parts = dates::interpret(&r.date);
        if let Some(m) = self.month {
            if parts.month != Some(m) {
                return false;
            }
        }
        if let Some(y) = self.year {
            if parts.year != Some(y) {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(d) = parts.to_date() else {
                return false;
            };
            if self.date_from.is_some_and(|from| d < from)
                || self.date_to.is_some_and(|to| d > to)
            {
                return false;
            }
        }
        true
    }

    /// Re-scan a snapshot's records, keeping source order.
    pub fn apply(&self, snapshot: &RegionSnapshot) -> Vec<Arc<ParcelRecord>> {
        let kept: Vec<Arc<ParcelRecord>> = snapshot
            .records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        debug!(scanned = snapshot.records.len(), kept = kept.len(), "filter applied");
        kept
    }
}
