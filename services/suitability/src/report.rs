//! Per-region suitability report.

use crate::pipeline::{slugify, SpeciesParams};
use chrono::{DateTime, Utc};
use grid_processor::{RegionSuitability, SuitabilityRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Suitable area of every region for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityReport {
    pub species: String,
    /// Mean sea surface temperature range, °C.
    pub temperature_range_c: SuitabilityRange,
    /// Elevation range, metres (negative below sea level).
    pub elevation_range_m: SuitabilityRange,
    /// Keyed by region key.
    pub regions: BTreeMap<String, RegionSuitability>,
    pub generated_at: DateTime<Utc>,
}

impl SuitabilityReport {
    pub fn new(
        species: &SpeciesParams,
        temperature_range_c: SuitabilityRange,
        elevation_range_m: SuitabilityRange,
        regions: BTreeMap<String, RegionSuitability>,
    ) -> Self {
        Self {
            species: species.name.clone(),
            temperature_range_c,
            elevation_range_m,
            regions,
            generated_at: Utc::now(),
        }
    }

    pub fn slug(&self) -> String {
        slugify(&self.species)
    }

    /// Regions ordered by name, then key.
    pub fn ordered_regions(&self) -> Vec<&RegionSuitability> {
        let mut ordered: Vec<_> = self.regions.values().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        ordered
    }

    pub fn total_suitable_km2(&self) -> f64 {
        self.regions.values().map(|r| r.suitable_area_km2).sum()
    }

    /// Suitable km² per region key, for the area map.
    pub fn area_values(&self) -> BTreeMap<String, f64> {
        self.values(|r| r.suitable_area_km2)
    }

    /// Percent suitable per region key, for the percent map.
    pub fn percent_values(&self) -> BTreeMap<String, f64> {
        self.values(|r| r.percent_suitable)
    }

    fn values(&self, f: impl Fn(&RegionSuitability) -> f64) -> BTreeMap<String, f64> {
        self.regions
            .iter()
            .map(|(key, region)| (key.clone(), f(region)))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Report line for one region,
    /// e.g. `Oyster | Central California: 4069 km2 suitable (0.00% of 202739 km2)`.
    pub fn format_region(&self, region: &RegionSuitability) -> String {
        format!(
            "{} | {}: {:.0} km2 suitable ({:.2}% of {:.0} km2)",
            self.species,
            region.name,
            region.suitable_area_km2,
            region.percent_suitable,
            region.total_area_km2
        )
    }
}

impl fmt::Display for SuitabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} suitability: SST {} to {} C, depth {} to {} m",
            self.species,
            self.temperature_range_c.low,
            self.temperature_range_c.high,
            -self.elevation_range_m.high + 0.0,
            -self.elevation_range_m.low + 0.0,
        )?;
        for region in self.ordered_regions() {
            writeln!(f, "{}", self.format_region(region))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(key: &str, name: &str, suitable: f64, total: f64) -> RegionSuitability {
        RegionSuitability {
            key: key.to_string(),
            name: name.to_string(),
            suitable_area_km2: suitable,
            total_area_km2: total,
            percent_suitable: if suitable == 0.0 { 0.0 } else { suitable / total * 100.0 },
        }
    }

    fn oyster_report() -> SuitabilityReport {
        let species = SpeciesParams::oyster();
        let regions = BTreeMap::from([
            ("CA-C".to_string(), region("CA-C", "Central California", 4069.2, 202_738.7)),
            ("OR".to_string(), region("OR", "Oregon", 0.0, 179_994.1)),
            ("CA-N".to_string(), region("CA-N", "Northern California", 1250.0, 164_379.0)),
        ]);
        SuitabilityReport::new(
            &species,
            species.temperature_range().unwrap(),
            species.elevation_range().unwrap(),
            regions,
        )
    }

    #[test]
    fn test_region_line_format() {
        let report = oyster_report();
        let line = report.format_region(&report.regions["CA-C"]);
        assert_eq!(
            line,
            "Oyster | Central California: 4069 km2 suitable (2.01% of 202739 km2)"
        );
    }

    #[test]
    fn test_text_ordered_by_name() {
        let text = oyster_report().to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Oyster suitability: SST 11 to 30 C, depth 0 to 70 m");
        assert!(lines[1].starts_with("Oyster | Central California"));
        assert!(lines[2].starts_with("Oyster | Northern California"));
        assert_eq!(lines[3], "Oyster | Oregon: 0 km2 suitable (0.00% of 179994 km2)");
    }

    #[test]
    fn test_equal_names_fall_back_to_key() {
        let mut report = oyster_report();
        report.regions.insert("A".to_string(), region("A", "Oregon", 1.0, 10.0));
        let ordered = report.ordered_regions();
        let keys: Vec<&str> = ordered.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["CA-C", "CA-N", "A", "OR"]);
    }

    #[test]
    fn test_json_roundtrip_keeps_regions() {
        let report = oyster_report();
        let json = report.to_json().unwrap();
        let parsed: SuitabilityReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.species, "Oyster");
        assert_eq!(parsed.generated_at, report.generated_at);
        assert_eq!(
            parsed.regions.keys().collect::<Vec<_>>(),
            report.regions.keys().collect::<Vec<_>>()
        );
        assert!((parsed.regions["CA-C"].suitable_area_km2 - 4069.2).abs() < 1e-9);
        assert!(json.contains("\"percent_suitable\""));
    }

    #[test]
    fn test_map_values() {
        let report = oyster_report();
        assert_eq!(report.area_values()["OR"], 0.0);
        assert_eq!(report.percent_values().len(), 3);
        assert!((report.total_suitable_km2() - 5319.2).abs() < 1e-9);
    }
}
