//! Fixed option lists used by the browse filters.

/// Square feet in one acre; land area is stored in square feet.
pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Half-open interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub const fn at_least(lo: f64) -> Self {
        Self {
            lo,
            hi: f64::INFINITY,
        }
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.lo && value < self.hi
    }
}

/// Price bands: outright sale first, monthly rent after.
pub const PRICE_BANDS: [(&str, Band); 9] = [
    ("Under ₹50L", Band::new(0.0, 5_000_000.0)),
    ("₹50L - ₹1Cr", Band::new(5_000_000.0, 10_000_000.0)),
    ("₹1Cr - ₹2Cr", Band::new(10_000_000.0, 20_000_000.0)),
    ("₹2Cr - ₹5Cr", Band::new(20_000_000.0, 50_000_000.0)),
    ("Above ₹5Cr", Band::at_least(50_000_000.0)),
    ("Under ₹15k/mo", Band::new(0.0, 15_000.0)),
    ("₹15k - ₹30k/mo", Band::new(15_000.0, 30_000.0)),
    ("₹30k - ₹50k/mo", Band::new(30_000.0, 50_000.0)),
    ("₹50k+/mo", Band::at_least(50_000.0)),
];

/// Built-up area bands in square feet.
pub const AREA_BANDS: [(&str, Band); 3] = [
    ("Under 1000 sq.ft", Band::new(0.0, 1_000.0)),
    ("1000 - 2000 sq.ft", Band::new(1_000.0, 2_000.0)),
    ("Above 2000 sq.ft", Band::at_least(2_000.0)),
];

/// Land area bands in acres.
pub const LAND_AREA_BANDS: [(&str, Band); 4] = [
    ("Under 1 Acre", Band::new(0.0, 1.0)),
    ("1 - 5 Acres", Band::new(1.0, 5.0)),
    ("5 - 10 Acres", Band::new(5.0, 10.0)),
    ("Above 10 Acres", Band::at_least(10.0)),
];

pub fn price_band(label: &str) -> Option<Band> {
    lookup(&PRICE_BANDS, label)
}

pub fn area_band(label: &str) -> Option<Band> {
    lookup(&AREA_BANDS, label)
}

pub fn land_area_band(label: &str) -> Option<Band> {
    lookup(&LAND_AREA_BANDS, label)
}

fn lookup(bands: &[(&str, Band)], label: &str) -> Option<Band> {
    let wanted = normalize_label(label);
    bands
        .iter()
        .find(|(candidate, _)| normalize_label(candidate) == wanted)
        .map(|(_, band)| *band)
}

/// Labels arrive from forms with varying dashes and spacing.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| match ch {
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}
