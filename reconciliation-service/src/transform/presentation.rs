use mix_domain::domain::{ProvinceCode, ProvinceSummary, Region};
use serde::Serialize;

/// Number of provinces listed as top performers.
pub const TOP_PERFORMER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingTier {
    pub min_pct: f64,
    pub label: &'static str,
    pub color: &'static str,
    /// Tile class for the compact heatmap.
    pub css_class: &'static str,
}

/// Ordered highest threshold first; the first tier whose `min_pct` is met wins.
pub static RATING_TIERS: [RatingTier; 7] = [
    RatingTier { min_pct: 90.0, label: "Excellent", color: "#10b981", css_class: "bg-green-500 text-white" },
    RatingTier { min_pct: 75.0, label: "Very Good", color: "#22c55e", css_class: "bg-green-400 text-white" },
    RatingTier { min_pct: 60.0, label: "Good", color: "#84cc16", css_class: "bg-lime-500 text-white" },
    RatingTier { min_pct: 45.0, label: "Moderate", color: "#eab308", css_class: "bg-yellow-500 text-slate-900" },
    RatingTier { min_pct: 30.0, label: "Fair", color: "#f59e0b", css_class: "bg-amber-500 text-slate-900" },
    RatingTier { min_pct: 15.0, label: "Low", color: "#f97316", css_class: "bg-orange-500 text-white" },
    RatingTier { min_pct: 0.0, label: "Very Low", color: "#ef4444", css_class: "bg-red-500 text-white" },
];

/// Clamp to [0, 100]; NaN reads as 0.
pub fn clamp_pct(pct: f64) -> f64 {
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

/// Linear scan over [`RATING_TIERS`].
pub fn rating_tier(renewable_pct: f64) -> &'static RatingTier {
    let pct = clamp_pct(renewable_pct);
    RATING_TIERS
        .iter()
        .find(|tier| pct >= tier.min_pct)
        .unwrap_or(&RATING_TIERS[RATING_TIERS.len() - 1])
}

/// `(color, label)` for a renewable percentage.
pub fn rating_bucket(renewable_pct: f64) -> (&'static str, &'static str) {
    let tier = rating_tier(renewable_pct);
    (tier.color, tier.label)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub province: ProvinceCode,
    pub name: &'static str,
    pub region: Region,
    pub renewable_pct: f64,
    pub color: &'static str,
    pub css_class: &'static str,
    pub rating: &'static str,
    pub has_live_data: bool,
}

impl HeatmapCell {
    pub fn from_summary(row: &ProvinceSummary) -> Self {
        let pct = clamp_pct(row.renewable_pct);
        let tier = rating_tier(pct);
        Self {
            province: row.province,
            name: row.province.name(),
            region: row.province.region(),
            renewable_pct: pct,
            color: tier.color,
            css_class: tier.css_class,
            rating: tier.label,
            has_live_data: row.has_live_data,
        }
    }
}

pub fn heatmap(rows: &[ProvinceSummary]) -> Vec<HeatmapCell> {
    rows.iter().map(HeatmapCell::from_summary).collect()
}

/// Generation-weighted renewable share across live rows only.
pub fn national_average_pct(rows: &[ProvinceSummary]) -> f64 {
    let (renewable, total) = rows
        .iter()
        .filter(|r| r.has_live_data)
        .fold((0.0, 0.0), |(renewable, total), r| {
            (renewable + r.renewable_mwh, total + r.total_mwh)
        });
    if total > 0.0 {
        clamp_pct(100.0 * renewable / total)
    } else {
        0.0
    }
}

/// Live provinces with the highest renewable share, best first.
pub fn top_performers(rows: &[ProvinceSummary]) -> Vec<ProvinceCode> {
    let mut live: Vec<&ProvinceSummary> = rows.iter().filter(|r| r.has_live_data).collect();
    live.sort_by(|a, b| b.renewable_pct.total_cmp(&a.renewable_pct));
    live.into_iter()
        .take(TOP_PERFORMER_COUNT)
        .map(|r| r.province)
        .collect()
}
