/*
 * Copyright (c) 2003-2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie Flight Planner.
 *
 * Kelpie Flight Planner is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie Flight Planner is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie Flight Planner; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

use std::sync::Arc;

use log::info;

use crate::earth::coordinate::Coordinate;
use crate::model::airport::Airport;
use crate::model::airway::AirwaySegment;
use crate::model::fix::Fix;
use crate::model::flightplan::WaypointType;
use crate::model::navaid::{Navaid, NavaidType};
use crate::model::waypoint::{NavRef, Waypoint};
use crate::util::location_filter::{Filter, IdFilter, RangeFilter};

pub mod coordinate;

/// Read only access to navigation data. Implementations are swapped out as a whole
/// when the underlying database is reloaded.
pub trait NavDataProvider: Send + Sync {
    fn airport(&self, ident: &str) -> Option<Arc<Airport>>;

    /// Finds an object by ident. An empty region matches any region. If several objects
    /// match, the one nearest `near` wins.
    fn lookup(&self, ident: &str, region: &str, kind: WaypointType, near: &Coordinate) -> Option<Waypoint>;

    /// Navaids and fixes of the given kinds within `radius` NM of `centre`.
    fn within_radius(&self, centre: &Coordinate, radius: f64, kinds: &[WaypointType]) -> Vec<Waypoint>;

    fn airways_at(&self, node: &NavRef) -> Vec<Arc<AirwaySegment>>;

    /// The segment joining `from` and `to`. When `name` is given only that airway qualifies.
    fn airway_segment(&self, from: &NavRef, to: &NavRef, name: Option<&str>) -> Option<Arc<AirwaySegment>>;

    fn airway_by_id(&self, id: u32) -> Option<Arc<AirwaySegment>>;
}

/// In memory navigation data.
#[derive(Default)]
pub struct Earth {
    airports: Vec<Arc<Airport>>,
    navaids: Vec<Arc<Navaid>>,
    fixes: Vec<Arc<Fix>>,
    airways: Vec<Arc<AirwaySegment>>,
}

impl Earth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_airports(&mut self, airports: Vec<Arc<Airport>>) {
        info!("{} airports loaded", airports.len());
        self.airports = airports;
    }

    pub fn set_navaids(&mut self, navaids: Vec<Arc<Navaid>>) {
        info!("{} navaids loaded", navaids.len());
        self.navaids = navaids;
    }

    pub fn set_fixes(&mut self, fixes: Vec<Arc<Fix>>) {
        info!("{} fixes loaded", fixes.len());
        self.fixes = fixes;
    }

    pub fn set_airways(&mut self, airways: Vec<Arc<AirwaySegment>>) {
        info!("{} airway segments loaded", airways.len());
        self.airways = airways;
    }

    pub fn add_airport(&mut self, airport: Airport) {
        self.airports.push(Arc::new(airport));
    }

    pub fn add_navaid(&mut self, navaid: Navaid) {
        self.navaids.push(Arc::new(navaid));
    }

    pub fn add_fix(&mut self, fix: Fix) {
        self.fixes.push(Arc::new(fix));
    }

    pub fn add_airway(&mut self, segment: AirwaySegment) {
        self.airways.push(Arc::new(segment));
    }

    pub fn get_airports(&self) -> &[Arc<Airport>] {
        &self.airports
    }

    pub fn get_navaids(&self) -> &[Arc<Navaid>] {
        &self.navaids
    }

    pub fn get_fixes(&self) -> &[Arc<Fix>] {
        &self.fixes
    }

    fn navaid_matches(navaid: &Navaid, kind: WaypointType) -> bool {
        match kind {
            WaypointType::Vor => matches!(navaid.get_type(), NavaidType::Vor | NavaidType::Dme),
            WaypointType::Ndb => navaid.get_type() == NavaidType::Ndb,
            _ => false,
        }
    }

    fn region_matches(region: &str, wanted: &str) -> bool {
        wanted.is_empty() || region.eq_ignore_ascii_case(wanted)
    }

    fn nearest(candidates: Vec<Waypoint>, near: &Coordinate) -> Option<Waypoint> {
        candidates.into_iter().min_by(|a, b| {
            a.get_loc()
                .distance_to(near)
                .total_cmp(&b.get_loc().distance_to(near))
        })
    }
}

impl NavDataProvider for Earth {
    fn airport(&self, ident: &str) -> Option<Arc<Airport>> {
        let filter = IdFilter::new(ident);
        self.airports.iter().find(|a| filter.filter(&***a)).cloned()
    }

    fn lookup(&self, ident: &str, region: &str, kind: WaypointType, near: &Coordinate) -> Option<Waypoint> {
        let filter = IdFilter::new(ident);
        let candidates: Vec<Waypoint> = match kind {
            WaypointType::Airport => self
                .airports
                .iter()
                .filter(|a| filter.filter(&***a))
                .map(|a| Waypoint::Airport { airport: a.clone() })
                .collect(),
            WaypointType::Vor | WaypointType::Ndb => self
                .navaids
                .iter()
                .filter(|n| Self::navaid_matches(n, kind))
                .filter(|n| Self::region_matches(n.get_region(), region))
                .filter(|n| filter.filter(&***n))
                .map(|n| Waypoint::Navaid { navaid: n.clone() })
                .collect(),
            WaypointType::Waypoint => self
                .fixes
                .iter()
                .filter(|f| Self::region_matches(f.get_region(), region))
                .filter(|f| filter.filter(&***f))
                .map(|f| Waypoint::Fix { fix: f.clone() })
                .collect(),
            WaypointType::User | WaypointType::Unknown => Vec::new(),
        };
        Self::nearest(candidates, near)
    }

    fn within_radius(&self, centre: &Coordinate, radius: f64, kinds: &[WaypointType]) -> Vec<Waypoint> {
        let filter = RangeFilter::new(centre, radius);
        let mut result = Vec::new();
        if kinds.contains(&WaypointType::Vor) || kinds.contains(&WaypointType::Ndb) {
            result.extend(
                self.navaids
                    .iter()
                    .filter(|n| kinds.iter().any(|k| Self::navaid_matches(n, *k)))
                    .filter(|n| filter.filter(&***n))
                    .map(|n| Waypoint::Navaid { navaid: n.clone() }),
            );
        }
        if kinds.contains(&WaypointType::Waypoint) {
            result.extend(
                self.fixes
                    .iter()
                    .filter(|f| filter.filter(&***f))
                    .map(|f| Waypoint::Fix { fix: f.clone() }),
            );
        }
        if kinds.contains(&WaypointType::Airport) {
            result.extend(
                self.airports
                    .iter()
                    .filter(|a| filter.filter(&***a))
                    .map(|a| Waypoint::Airport { airport: a.clone() }),
            );
        }
        result
    }

    fn airways_at(&self, node: &NavRef) -> Vec<Arc<AirwaySegment>> {
        self.airways
            .iter()
            .filter(|s| s.other_end(node).is_some())
            .cloned()
            .collect()
    }

    fn airway_segment(&self, from: &NavRef, to: &NavRef, name: Option<&str>) -> Option<Arc<AirwaySegment>> {
        self.airways
            .iter()
            .filter(|s| name.is_none_or(|n| s.get_name().eq_ignore_ascii_case(n)))
            .find(|s| s.connects(from, to))
            .cloned()
    }

    fn airway_by_id(&self, id: u32) -> Option<Arc<AirwaySegment>> {
        self.airways.iter().find(|s| s.get_id() == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::flightplan::WaypointType;
    use crate::model::test_utils::tests::make_world;
    use crate::model::waypoint::NavRef;

    use super::NavDataProvider;

    #[test]
    fn test_airport_lookup() {
        let earth = make_world();
        assert!(earth.airport("KJFK").is_some());
        assert!(earth.airport("kbos").is_some());
        assert!(earth.airport("XXXX").is_none());
    }

    #[test]
    fn test_lookup_by_kind() {
        let earth = make_world();
        let near = Coordinate::new(41.0, -73.0);
        let vor = earth.lookup("BDR", "K6", WaypointType::Vor, &near);
        assert!(vor.is_some());
        assert!(earth.lookup("BDR", "K6", WaypointType::Ndb, &near).is_none());
        assert!(earth.lookup("BDR", "EG", WaypointType::Vor, &near).is_none());
        assert!(earth.lookup("BDR", "", WaypointType::Vor, &near).is_some());
        assert!(earth.lookup("MERIT", "", WaypointType::Waypoint, &near).is_some());
    }

    #[test]
    fn test_within_radius() {
        let earth = make_world();
        let kjfk = Coordinate::new(40.6398, -73.7789);
        let found = earth.within_radius(&kjfk, 30.0, &[WaypointType::Vor]);
        let ids: Vec<&str> = found.iter().map(|w| w.get_id()).collect();
        assert!(ids.contains(&"DPK"));
        assert!(!ids.contains(&"BOS"));
    }

    #[test]
    fn test_airways() {
        let earth = make_world();
        let bdr = NavRef::new("BDR", "K6", WaypointType::Vor);
        let hfd = NavRef::new("HFD", "K6", WaypointType::Vor);
        let segments = earth.airways_at(&bdr);
        assert!(!segments.is_empty());

        let seg = earth.airway_segment(&hfd, &bdr, Some("V1"));
        assert!(seg.is_some());
        assert!(earth.airway_segment(&hfd, &bdr, Some("J79")).is_none());

        let id = seg.map(|s| s.get_id()).unwrap_or(0);
        assert_eq!(earth.airway_by_id(id).map(|s| s.get_name().to_string()), Some("V1".to_string()));
    }
}
