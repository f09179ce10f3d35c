//! Static region and population-center tables.
//!
//! Every entry lies inside the continental bounding box; Alaska and Hawaii
//! are deliberately absent because their centroids do not.

use crate::model::ResolvedCoordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// A named population center with a fixed relative weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub region: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub weight: u32,
}

impl Region {
    pub fn centroid(&self) -> ResolvedCoordinate {
        ResolvedCoordinate::approximate(self.latitude, self.longitude)
    }
}

impl Place {
    pub fn centroid(&self) -> ResolvedCoordinate {
        ResolvedCoordinate::approximate(self.latitude, self.longitude)
    }
}

const fn region(code: &'static str, name: &'static str, latitude: f64, longitude: f64) -> Region {
    Region { code, name, latitude, longitude }
}

const fn place(
    name: &'static str,
    region: &'static str,
    latitude: f64,
    longitude: f64,
    weight: u32,
) -> Place {
    Place { name, region, latitude, longitude, weight }
}

const REGIONS: &[Region] = &[
    region("AL", "Alabama", 32.806671, -86.791130),
    region("AZ", "Arizona", 33.729759, -111.431221),
    region("AR", "Arkansas", 34.969704, -92.373123),
    region("CA", "California", 36.116203, -119.681564),
    region("CO", "Colorado", 39.059811, -105.311104),
    region("CT", "Connecticut", 41.597782, -72.755371),
    region("DE", "Delaware", 39.318523, -75.507141),
    region("DC", "District of Columbia", 38.897438, -77.026817),
    region("FL", "Florida", 27.766279, -81.686783),
    region("GA", "Georgia", 33.040619, -83.643074),
    region("ID", "Idaho", 44.240459, -114.478828),
    region("IL", "Illinois", 40.349457, -88.986137),
    region("IN", "Indiana", 39.849426, -86.258278),
    region("IA", "Iowa", 42.011539, -93.210526),
    region("KS", "Kansas", 38.526600, -96.726486),
    region("KY", "Kentucky", 37.668140, -84.670067),
    region("LA", "Louisiana", 31.169546, -91.867805),
    region("ME", "Maine", 44.693947, -69.381927),
    region("MD", "Maryland", 39.063946, -76.802101),
    region("MA", "Massachusetts", 42.230171, -71.530106),
    region("MI", "Michigan", 43.326618, -84.536095),
    region("MN", "Minnesota", 45.694454, -93.900192),
    region("MS", "Mississippi", 32.741646, -89.678696),
    region("MO", "Missouri", 38.456085, -92.288368),
    region("MT", "Montana", 46.921925, -110.454353),
    region("NE", "Nebraska", 41.125370, -98.268082),
    region("NV", "Nevada", 38.313515, -117.055374),
    region("NH", "New Hampshire", 43.452492, -71.563896),
    region("NJ", "New Jersey", 40.298904, -74.521011),
    region("NM", "New Mexico", 34.840515, -106.248482),
    region("NY", "New York", 42.165726, -74.948051),
    region("NC", "North Carolina", 35.630066, -79.806419),
    region("ND", "North Dakota", 47.528912, -99.784012),
    region("OH", "Ohio", 40.388783, -82.764915),
    region("OK", "Oklahoma", 35.565342, -96.928917),
    region("OR", "Oregon", 44.572021, -122.070938),
    region("PA", "Pennsylvania", 40.590752, -77.209755),
    region("RI", "Rhode Island", 41.680893, -71.511780),
    region("SC", "South Carolina", 33.856892, -80.945007),
    region("SD", "South Dakota", 44.299782, -99.438828),
    region("TN", "Tennessee", 35.747845, -86.692345),
    region("TX", "Texas", 31.054487, -97.563461),
    region("UT", "Utah", 40.150032, -111.862434),
    region("VT", "Vermont", 44.045876, -72.710686),
    region("VA", "Virginia", 37.769337, -78.169968),
    region("WA", "Washington", 47.400902, -121.490494),
    region("WV", "West Virginia", 38.491226, -80.954453),
    region("WI", "Wisconsin", 44.268543, -89.616508),
    region("WY", "Wyoming", 42.755966, -107.302490),
];

const PLACES: &[Place] = &[
    place("New York", "NY", 40.7128, -74.0060, 100),
    place("Los Angeles", "CA", 34.0522, -118.2437, 95),
    place("Chicago", "IL", 41.8781, -87.6298, 90),
    place("Houston", "TX", 29.7604, -95.3698, 85),
    place("Phoenix", "AZ", 33.4484, -112.0740, 80),
    place("Philadelphia", "PA", 39.9526, -75.1652, 75),
    place("San Antonio", "TX", 29.4241, -98.4936, 70),
    place("San Diego", "CA", 32.7157, -117.1611, 65),
    place("Dallas", "TX", 32.7767, -96.7970, 60),
    place("San Jose", "CA", 37.3382, -121.8863, 55),
    place("Austin", "TX", 30.2672, -97.7431, 50),
    place("Jacksonville", "FL", 30.3322, -81.6557, 45),
    place("San Francisco", "CA", 37.7749, -122.4194, 80),
    place("Columbus", "OH", 39.9612, -82.9988, 40),
    place("Boston", "MA", 42.3601, -71.0589, 65),
    place("Seattle", "WA", 47.6062, -122.3321, 60),
    place("Denver", "CO", 39.7392, -104.9903, 50),
    place("Miami", "FL", 25.7617, -80.1918, 75),
    place("Atlanta", "GA", 33.7490, -84.3880, 65),
    place("Detroit", "MI", 42.3314, -83.0458, 55),
];

pub fn regions() -> &'static [Region] {
    REGIONS
}

pub fn places() -> &'static [Place] {
    PLACES
}

/// Region by code, case-insensitive.
pub fn region_by_code(code: &str) -> Option<&'static Region> {
    let code = code.trim();
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}

/// Population center by name, case-insensitive.
pub fn place_by_name(name: &str) -> Option<&'static Place> {
    let name = name.trim();
    PLACES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn centroid_for(region_code: &str) -> Option<ResolvedCoordinate> {
    region_by_code(region_code).map(Region::centroid)
}

pub fn centroid_for_place(place_name: &str) -> Option<ResolvedCoordinate> {
    place_by_name(place_name).map(Place::centroid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::within_bounds;

    #[test]
    fn every_entry_inside_bounding_box() {
        for r in regions() {
            assert!(within_bounds(r.latitude, r.longitude), "region {} outside box", r.code);
        }
        for p in places() {
            assert!(within_bounds(p.latitude, p.longitude), "place {} outside box", p.name);
        }
    }

    #[test]
    fn places_reference_known_regions() {
        for p in places() {
            assert!(region_by_code(p.region).is_some(), "{} -> {}", p.name, p.region);
        }
    }

    #[test]
    fn region_lookup_is_case_insensitive() {
        let tx = centroid_for(" tx").unwrap();
        assert_eq!(tx.latitude, 31.054487);
        assert!(!tx.is_exact);
        assert!(centroid_for("AK").is_none());
        assert!(centroid_for("").is_none());
    }

    #[test]
    fn place_lookup() {
        let houston = centroid_for_place("HOUSTON").unwrap();
        assert_eq!(houston.longitude, -95.3698);
        assert!(centroid_for_place("Springfield").is_none());

        let columbus = place_by_name(" columbus ").unwrap();
        assert_eq!(columbus.region, "OH");
        assert_eq!(region_by_code("oh").map(|r| r.name), Some("Ohio"));
    }

    #[test]
    fn table_sizes() {
        assert_eq!(regions().len(), 49);
        assert_eq!(places().len(), 20);
    }
}
