use crate::types::CanonicalStatus;

// Accepted spellings, compared after uppercasing and trimming.
const VARIANTS: &[(&str, CanonicalStatus)] = &[
    ("DELIVERED", CanonicalStatus::Delivered),
    ("ON DELIVERY", CanonicalStatus::OnDelivery),
    ("ONDELIVERY", CanonicalStatus::OnDelivery),
    ("PICK UP", CanonicalStatus::Pickup),
    ("PICKUP", CanonicalStatus::Pickup),
    ("PICKED UP", CanonicalStatus::Pickup),
    ("IN TRANSIT", CanonicalStatus::InTransit),
    ("INTRANSIT", CanonicalStatus::InTransit),
    ("CANCELLED", CanonicalStatus::Cancelled),
    ("DETAINED", CanonicalStatus::Detained),
    ("PROBLEMATIC", CanonicalStatus::Problematic),
    ("PROBLEMATIC PROCESSING", CanonicalStatus::Problematic),
    ("RETURNED", CanonicalStatus::Returned),
];

/// Map a free-text status to the canonical vocabulary. Exact match only;
/// anything else is `Other`.
pub fn normalize(raw: &str) -> CanonicalStatus {
    let key = raw.trim().to_uppercase();
    VARIANTS
        .iter()
        .find(|(variant, _)| *variant == key)
        .map(|(_, status)| *status)
        .unwrap_or(CanonicalStatus::Other)
}

/// Parse a canonical status name as typed in a filter (case-insensitive).
pub fn parse_canonical(name: &str) -> Option<CanonicalStatus> {
    let key = name.trim().to_uppercase();
    CanonicalStatus::TRACKED
        .iter()
        .chain(std::iter::once(&CanonicalStatus::Other))
        .find(|s| s.as_str() == key)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_variants_collapse() {
        assert_eq!(normalize("On Delivery"), CanonicalStatus::OnDelivery);
        assert_eq!(normalize(" ondelivery "), CanonicalStatus::OnDelivery);
        assert_eq!(normalize("Picked Up"), CanonicalStatus::Pickup);
        assert_eq!(normalize("in transit"), CanonicalStatus::InTransit);
        assert_eq!(normalize("Problematic Processing"), CanonicalStatus::Problematic);
    }

    #[test]
    fn canonical_names_map_to_themselves() {
        for status in CanonicalStatus::TRACKED {
            assert_eq!(normalize(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_text_is_other() {
        assert_eq!(normalize("Lost in transit"), CanonicalStatus::Other);
        // Exact match, not substring.
        assert_eq!(normalize("DELIVERED LATE"), CanonicalStatus::Other);
        assert_eq!(normalize(""), CanonicalStatus::Other);
    }

    #[test]
    fn parses_filter_status_names() {
        assert_eq!(parse_canonical("returned"), Some(CanonicalStatus::Returned));
        assert_eq!(parse_canonical("OTHER"), Some(CanonicalStatus::Other));
        assert_eq!(parse_canonical("ON DELIVERY"), None);
    }
}
