//! Coordinate resolution: record fields first, then gazetteer fallbacks.
//!
//! Fallback coordinates are spread deterministically around their centroid
//! so that repeated runs over the same input place every record at the same
//! spot:
//!
//! - population centers get a small golden-ratio offset (at most ±0.05°),
//! - region centroids get a golden-angle spiral keyed by the record index.

use crate::gazetteer;
use crate::model::{RawRecord, ResolvedCoordinate};

/// Degrees between consecutive spiral positions.
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.5;
/// Radial step `k` in `distance = sqrt(seed mod 100) * k`.
pub const SPIRAL_STEP: f64 = 0.05;
pub const SPIRAL_LATITUDE_SCALE: f64 = 5.0;
pub const SPIRAL_LONGITUDE_SCALE: f64 = 8.0;
/// Full width of the place offset window, centered on the place.
pub const PLACE_OFFSET_WIDTH: f64 = 0.1;

/// φ = (√5 − 1) / 2
const PHI: f64 = 0.618_033_988_749_894_9;

/// Parse a coordinate value. Only finite numbers are accepted.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First candidate field whose value parses as a finite number.
pub fn first_coordinate<S: AsRef<str>>(record: &RawRecord, candidates: &[S]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|c| record.get(c.as_ref()))
        .find_map(parse_coordinate)
}

/// Spiral angle in degrees for `seed`, always in `[0, 360)`.
///
/// 137.5 = 275 / 2, so the product is reduced in integers to stay exact for
/// any seed.
pub fn spiral_angle(seed: u64) -> f64 {
    ((seed % 720) * 275 % 720) as f64 / 2.0
}

/// (Δlatitude, Δlongitude) of the golden-angle spiral position `seed`.
pub fn spiral_offset(seed: u64) -> (f64, f64) {
    let angle = spiral_angle(seed).to_radians();
    let distance = ((seed % 100) as f64).sqrt() * SPIRAL_STEP;
    (
        distance * angle.cos() * SPIRAL_LATITUDE_SCALE,
        distance * angle.sin() * SPIRAL_LONGITUDE_SCALE,
    )
}

/// Place `seed` on the spiral around `center`, clamped into the bounding box.
pub fn spiral_around(center: ResolvedCoordinate, seed: u64) -> ResolvedCoordinate {
    let (dlat, dlng) = spiral_offset(seed);
    ResolvedCoordinate::approximate(center.latitude + dlat, center.longitude + dlng)
}

/// Small quasi-random offset in `[-0.05, 0.05)` per axis.
fn place_offset(seed: u64) -> (f64, f64) {
    let n = (seed % 1_000_000) as f64;
    let a = (n * PHI).fract();
    let b = (n * PHI * PHI).fract();
    ((a - 0.5) * PLACE_OFFSET_WIDTH, (b - 0.5) * PLACE_OFFSET_WIDTH)
}

/// A place is only trusted when it lies in the record's region, or when the
/// record carries no known region to contradict it.
fn place_matches_region(place: &gazetteer::Place, region_code: Option<&str>) -> bool {
    match region_code.and_then(gazetteer::region_by_code) {
        Some(region) => region.code == place.region,
        None => true,
    }
}

/// Resolve a record to a validated coordinate.
///
/// Order: record fields (exact) → `place_name` → `region_code` → `None`.
/// Direct coordinates outside the bounding box are treated as missing. A
/// place in a different region than `region_code` is ignored.
pub fn resolve<S: AsRef<str>>(
    record: &RawRecord,
    lat_fields: &[S],
    lng_fields: &[S],
    region_code: Option<&str>,
    place_name: Option<&str>,
    jitter_seed: u64,
) -> Option<ResolvedCoordinate> {
    let lat = first_coordinate(record, lat_fields);
    let lng = first_coordinate(record, lng_fields);
    if let (Some(lat), Some(lng)) = (lat, lng) {
        if let Some(exact) = ResolvedCoordinate::exact(lat, lng) {
            return Some(exact);
        }
    }

    let place = place_name
        .and_then(gazetteer::place_by_name)
        .filter(|p| place_matches_region(p, region_code));
    if let Some(center) = place.map(gazetteer::Place::centroid) {
        let (dlat, dlng) = place_offset(jitter_seed);
        return Some(ResolvedCoordinate::approximate(
            center.latitude + dlat,
            center.longitude + dlng,
        ));
    }

    region_code
        .and_then(gazetteer::centroid_for)
        .map(|center| spiral_around(center, jitter_seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::within_bounds;

    const LAT: &[&str] = &["Y", "Latitude"];
    const LNG: &[&str] = &["X", "Longitude"];

    #[test]
    fn direct_fields_are_exact() {
        let record = RawRecord::new().with("Y", "29.76").with("X", "-95.37");
        let c = resolve(&record, LAT, LNG, Some("TX"), None, 7).unwrap();
        assert!(c.is_exact);
        assert_eq!((c.latitude, c.longitude), (29.76, -95.37));
    }

    #[test]
    fn non_numeric_candidate_is_skipped() {
        let record = RawRecord::new()
            .with("Y", "n/a")
            .with("Latitude", "40.5")
            .with("X", "-80.1");
        let c = resolve(&record, LAT, LNG, None, None, 0).unwrap();
        assert!(c.is_exact);
        assert_eq!(c.latitude, 40.5);
    }

    #[test]
    fn out_of_box_direct_falls_back_to_region() {
        let record = RawRecord::new().with("Y", "61.2").with("X", "-149.9");
        let c = resolve(&record, LAT, LNG, Some("WA"), None, 0).unwrap();
        assert!(!c.is_exact);
        // seed 0 sits on the centroid itself
        assert_eq!(c.latitude, 47.400902);
        assert_eq!(c.longitude, -121.490494);
    }

    #[test]
    fn place_wins_over_region() {
        let record = RawRecord::new();
        let c = resolve(&record, LAT, LNG, Some("TX"), Some("Austin"), 12).unwrap();
        assert!(!c.is_exact);
        assert!((c.latitude - 30.2672).abs() <= 0.05);
        assert!((c.longitude - -97.7431).abs() <= 0.05);
    }

    #[test]
    fn place_in_another_region_is_ignored() {
        let record = RawRecord::new();
        // Columbus is listed under OH; a GA record must stay in Georgia
        let c = resolve(&record, LAT, LNG, Some("GA"), Some("Columbus"), 0).unwrap();
        assert_eq!((c.latitude, c.longitude), (33.040619, -83.643074));

        let c = resolve(&record, LAT, LNG, Some("ga"), Some("Columbus"), 9).unwrap();
        assert!((c.latitude - 39.9612).abs() > 1.0, "{c:?}");

        let oh = resolve(&record, LAT, LNG, Some(" oh "), Some("columbus"), 9).unwrap();
        assert!((oh.latitude - 39.9612).abs() <= 0.05);
        assert!((oh.longitude - -82.9988).abs() <= 0.05);
    }

    #[test]
    fn place_without_known_region_is_trusted() {
        let record = RawRecord::new();
        for region in [None, Some("ZZ")] {
            let c = resolve(&record, LAT, LNG, region, Some("Columbus"), 3).unwrap();
            assert!((c.latitude - 39.9612).abs() <= 0.05, "{region:?}");
        }
    }

    #[test]
    fn unknown_place_uses_region() {
        let record = RawRecord::new();
        let c = resolve(&record, LAT, LNG, Some("oh"), Some("Springfield"), 0).unwrap();
        assert_eq!(c.latitude, 40.388783);
    }

    #[test]
    fn nothing_resolvable() {
        let record = RawRecord::new().with("Y", "abc");
        assert!(resolve(&record, LAT, LNG, Some("ZZ"), Some("Nowhere"), 3).is_none());
        assert!(resolve(&record, LAT, LNG, None, None, 3).is_none());
    }

    #[test]
    fn spiral_formula() {
        assert_eq!(spiral_angle(0), 0.0);
        assert_eq!(spiral_angle(1), 137.5);
        assert_eq!(spiral_angle(3), 52.5);
        // large seeds reduce exactly
        assert_eq!(spiral_angle(720 + 1), 137.5);

        let (dlat, dlng) = spiral_offset(4);
        let angle = 190.0f64.to_radians();
        let distance = 2.0 * SPIRAL_STEP;
        assert!((dlat - distance * angle.cos() * 5.0).abs() < 1e-12);
        assert!((dlng - distance * angle.sin() * 8.0).abs() < 1e-12);
    }

    #[test]
    fn spiral_positions_are_distinct() {
        let center = gazetteer::centroid_for("KS").unwrap();
        let mut seen = Vec::new();
        for seed in 0..100 {
            let c = spiral_around(center, seed);
            let key = (c.latitude.to_bits(), c.longitude.to_bits());
            assert!(!seen.contains(&key), "seed {seed} overlaps");
            seen.push(key);
        }
    }

    #[test]
    fn spiral_stays_in_box_for_border_regions() {
        for region in gazetteer::regions() {
            for seed in 0..200 {
                let c = spiral_around(region.centroid(), seed);
                assert!(within_bounds(c.latitude, c.longitude), "{} seed {seed}: {c:?}", region.code);
            }
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let record = RawRecord::new();
        let a = resolve(&record, LAT, LNG, Some("CA"), None, 4242);
        let b = resolve(&record, LAT, LNG, Some("CA"), None, 4242);
        assert_eq!(a, b);
    }
}
