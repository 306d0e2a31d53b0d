// Consignee-region resolution against a static Philippine geography table.
//
// Matching is a plain substring test in declaration order, so when two names
// overlap ("Isabela" / "Isabela City", "San Carlos City" in two regions) the
// one declared first wins. Keep the table order stable: it is observable.
use crate::types::Island;
use once_cell::sync::Lazy;

pub const UNKNOWN: &str = "Unknown";

pub struct RegionEntry {
    pub name: &'static str,
    pub provinces: &'static [&'static str],
}

pub struct IslandEntry {
    pub island: Island,
    pub name: &'static str,
    pub regions: &'static [RegionEntry],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    pub island: Island,
    pub region: &'static str,
    pub province: &'static str,
}

impl RegionInfo {
    const fn island_only(island: Island) -> Self {
        RegionInfo { island, region: UNKNOWN, province: UNKNOWN }
    }
}

pub static PHILIPPINES: &[IslandEntry] = &[
    IslandEntry {
        island: Island::Luzon,
        name: "Luzon",
        regions: &[
            RegionEntry {
                name: "NCR",
                provinces: &[
                    "Manila", "Quezon City", "Caloocan", "Las Piñas", "Makati", "Malabon",
                    "Mandaluyong", "Marikina", "Muntinlupa", "Navotas", "Parañaque", "Pasay",
                    "Pasig", "Pateros", "San Juan", "Taguig", "Valenzuela",
                ],
            },
            RegionEntry {
                name: "CAR",
                provinces: &[
                    "Abra", "Apayao", "Benguet", "Ifugao", "Kalinga", "Mountain Province",
                    "Baguio City",
                ],
            },
            RegionEntry {
                name: "Region I",
                provinces: &[
                    "Ilocos Norte", "Ilocos Sur", "La Union", "Pangasinan", "Dagupan City",
                    "San Carlos City", "Alaminos City", "Urdaneta City", "Candon City",
                    "Vigan City",
                ],
            },
            RegionEntry {
                name: "Region II",
                provinces: &[
                    "Batanes", "Cagayan", "Isabela", "Nueva Vizcaya", "Quirino",
                    "Santiago City", "Tuguegarao City", "Cauayan City",
                ],
            },
            RegionEntry {
                name: "Region III",
                provinces: &[
                    "Aurora", "Bataan", "Bulacan", "Nueva Ecija", "Pampanga", "Tarlac",
                    "Zambales", "Angeles City", "Olongapo City", "San Jose City",
                    "Cabanatuan City", "Mabalacat City", "Malolos City", "Meycauayan City",
                    "San Fernando City",
                ],
            },
            RegionEntry {
                name: "Region IV-A",
                provinces: &[
                    "Batangas", "Cavite", "Laguna", "Quezon", "Rizal", "Lucena City",
                    "Antipolo City", "Bacoor City", "Calamba City", "San Pablo City",
                    "Santa Rosa City", "Tanauan City", "Lipá City", "Batangas City",
                    "Imus City", "Dasmariñas City", "General Trias City",
                ],
            },
            RegionEntry {
                name: "Region IV-B",
                provinces: &[
                    "Marinduque", "Occidental Mindoro", "Oriental Mindoro", "Palawan",
                    "Romblon", "Puerto Princesa City", "Calapan City",
                ],
            },
            RegionEntry {
                name: "Region V",
                provinces: &[
                    "Albay", "Camarines Norte", "Camarines Sur", "Catanduanes", "Masbate",
                    "Sorsogon", "Naga City", "Legazpi City", "Iriga City", "Sorsogon City",
                    "Ligao City", "Tabaco City", "Masbate City",
                ],
            },
        ],
    },
    IslandEntry {
        island: Island::Visayas,
        name: "Visayas",
        regions: &[
            RegionEntry {
                name: "Region VI",
                provinces: &[
                    "Aklan", "Antique", "Capiz", "Guimaras", "Iloilo", "Negros Occidental",
                    "Bacolod City", "Iloilo City", "Roxas City", "San Carlos City",
                    "Cadiz City", "Sagay City", "Silay City", "Talísay City", "Victorias City",
                ],
            },
            RegionEntry {
                name: "Region VII",
                provinces: &[
                    "Bohol", "Cebu", "Siquijor", "Negros Oriental", "Cebu City",
                    "Lapu-Lapu City", "Mandaue City", "Talisay City", "Toledo City",
                    "Dumaguete City", "Tagbilaran City", "Bais City", "Bayawan City",
                    "Canlaon City", "Tanjay City",
                ],
            },
            RegionEntry {
                name: "Region VIII",
                provinces: &[
                    "Biliran", "Eastern Samar", "Leyte", "Northern Samar", "Samar",
                    "Southern Leyte", "Ormoc City", "Tacloban City", "Calbayog City",
                    "Catbalogan City", "Borongan City", "Baybay City", "Maasin City",
                ],
            },
        ],
    },
    IslandEntry {
        island: Island::Mindanao,
        name: "Mindanao",
        regions: &[
            RegionEntry {
                name: "Region IX",
                provinces: &[
                    "Zamboanga del Norte", "Zamboanga del Sur", "Zamboanga Sibugay",
                    "Zamboanga City", "Isabela City", "Dapitan City", "Dipolog City",
                    "Pagadian City",
                ],
            },
            RegionEntry {
                name: "Region X",
                provinces: &[
                    "Bukidnon", "Camiguin", "Lanao del Norte", "Misamis Occidental",
                    "Misamis Oriental", "Cagayan de Oro City", "Iligan City",
                    "El Salvador City", "Gingoog City", "Malaybalay City", "Valencia City",
                    "Oroquieta City", "Ozamiz City", "Tangub City",
                ],
            },
            RegionEntry {
                name: "Region XI",
                provinces: &[
                    "Davao de Oro", "Davao del Norte", "Davao del Sur", "Davao Occidental",
                    "Davao Oriental", "Davao City", "Panabo City", "Samal City", "Tagum City",
                    "Digos City", "Mati City",
                ],
            },
            RegionEntry {
                name: "Region XII",
                provinces: &[
                    "Cotabato", "Sarangani", "South Cotabato", "Sultan Kudarat",
                    "General Santos City", "Koronadal City", "Kidapawan City",
                    "Tacurong City",
                ],
            },
            RegionEntry {
                name: "Region XIII",
                provinces: &[
                    "Agusan del Norte", "Agusan del Sur", "Dinagat Islands",
                    "Surigao del Norte", "Surigao del Sur", "Butuan City", "Surigao City",
                    "Bislig City", "Bayugan City", "Cabadbaran City", "Tandag City",
                ],
            },
            RegionEntry {
                name: "BARMM",
                provinces: &[
                    "Basilan", "Lanao del Sur", "Maguindanao", "Sulu", "Tawi-Tawi",
                    "Cotabato City", "Lamitan City", "Marawi City",
                ],
            },
        ],
    },
];

// Flattened (uppercased name, info) pairs in declaration order.
static PROVINCE_INDEX: Lazy<Vec<(String, RegionInfo)>> = Lazy::new(|| {
    let mut index = Vec::new();
    for island in PHILIPPINES {
        for region in island.regions {
            for &province in region.provinces {
                index.push((
                    province.to_uppercase(),
                    RegionInfo { island: island.island, region: region.name, province },
                ));
            }
        }
    }
    index
});

// Island-level tokens tried when no province name matched, in this order.
const ISLAND_TOKENS: &[(&[&str], Island)] = &[
    (&["LUZON", "NCR", "CAR"], Island::Luzon),
    (&["VISAYAS"], Island::Visayas),
    (&["MINDANAO"], Island::Mindanao),
];

/// Resolve a free-text consignee region to island, region and province.
///
/// Total and deterministic: anything unmatched comes back as
/// `{unknown, "Unknown", "Unknown"}`.
pub fn resolve(text: &str) -> RegionInfo {
    let needle = text.trim().to_uppercase();

    let hit = PROVINCE_INDEX
        .iter()
        .find(|(name, _)| needle.contains(name.as_str()));
    if let Some((_, info)) = hit {
        return *info;
    }

    for (tokens, island) in ISLAND_TOKENS {
        if tokens.iter().any(|t| needle.contains(t)) {
            return RegionInfo::island_only(*island);
        }
    }

    RegionInfo::island_only(Island::Unknown)
}

/// Display name of an island as declared in the table.
pub fn island_name(island: Island) -> &'static str {
    PHILIPPINES
        .iter()
        .find(|e| e.island == island)
        .map(|e| e.name)
        .unwrap_or(UNKNOWN)
}
