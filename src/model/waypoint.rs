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

use crate::earth::coordinate::Coordinate;
use crate::model::location::Location;

use super::flightplan::{FlightplanEntry, WaypointType};
use super::navaid::NavaidType;
use super::{airport::Airport, fix::Fix, navaid::Navaid};

/// Key of a navigation object in the navigation data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavRef {
    pub ident: String,
    pub region: String,
    pub kind: WaypointType,
}

impl NavRef {
    pub fn new(ident: &str, region: &str, kind: WaypointType) -> Self {
        Self {
            ident: ident.to_string(),
            region: region.to_string(),
            kind,
        }
    }
}

/// A resolved map object.
#[derive(Debug, Clone, PartialEq)]
pub enum Waypoint {
    Airport { airport: Arc<Airport> },
    Navaid { navaid: Arc<Navaid> },
    Fix { fix: Arc<Fix> },
    User { id: String, loc: Coordinate },
    Invalid { id: String, loc: Coordinate },
}

impl Waypoint {
    pub fn get_id(&self) -> &str {
        match self {
            Waypoint::Airport { airport } => airport.get_id(),
            Waypoint::Navaid { navaid } => navaid.get_id(),
            Waypoint::Fix { fix } => fix.get_id(),
            Waypoint::User { id, .. } => id,
            Waypoint::Invalid { id, .. } => id,
        }
    }

    pub fn get_name(&self) -> &str {
        match self {
            Waypoint::Airport { airport } => airport.get_name(),
            Waypoint::Navaid { navaid } => navaid.get_name(),
            Waypoint::Fix { fix } => fix.get_name(),
            Waypoint::User { .. } => "User waypoint",
            Waypoint::Invalid { .. } => "Invalid waypoint",
        }
    }

    pub fn get_region(&self) -> &str {
        match self {
            Waypoint::Airport { airport } => airport.get_region(),
            Waypoint::Navaid { navaid } => navaid.get_region(),
            Waypoint::Fix { fix } => fix.get_region(),
            _ => "",
        }
    }

    pub fn get_loc(&self) -> &Coordinate {
        match self {
            Waypoint::Airport { airport } => airport.get_loc(),
            Waypoint::Navaid { navaid } => navaid.get_loc(),
            Waypoint::Fix { fix } => fix.get_loc(),
            Waypoint::User { loc, .. } => loc,
            Waypoint::Invalid { loc, .. } => loc,
        }
    }

    pub fn get_elevation(&self) -> i32 {
        match self {
            Waypoint::Airport { airport } => airport.get_elevation(),
            Waypoint::Navaid { navaid } => navaid.get_elevation(),
            _ => 0,
        }
    }

    pub fn get_type(&self) -> WaypointType {
        match self {
            Waypoint::Airport { .. } => WaypointType::Airport,
            Waypoint::Navaid { navaid } => match navaid.get_type() {
                NavaidType::Ndb => WaypointType::Ndb,
                _ => WaypointType::Vor,
            },
            Waypoint::Fix { .. } => WaypointType::Waypoint,
            Waypoint::User { .. } => WaypointType::User,
            Waypoint::Invalid { .. } => WaypointType::Unknown,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Waypoint::Invalid { .. })
    }

    pub fn is_airport(&self) -> bool {
        matches!(self, Waypoint::Airport { .. })
    }

    pub fn nav_ref(&self) -> NavRef {
        NavRef::new(self.get_id(), self.get_region(), self.get_type())
    }

    /// Two waypoints at the same physical fix
    pub fn same_fix(&self, other: &Waypoint) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.get_id() == other.get_id()
            && self.get_loc().distance_to(other.get_loc()) < 0.1
    }

    pub fn to_entry(&self) -> FlightplanEntry {
        FlightplanEntry::new(self.get_id(), self.get_region(), self.get_type(), *self.get_loc())
            .with_name(self.get_name())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::flightplan::WaypointType;
    use crate::model::test_utils::tests::{make_airport_at, make_navaid_at};
    use crate::model::navaid::NavaidType;

    use super::Waypoint;

    #[test]
    fn test_waypoint_types() {
        let airport = Waypoint::Airport {
            airport: make_airport_at("KJFK", 40.6398, -73.7789),
        };
        assert_eq!(airport.get_type(), WaypointType::Airport);
        assert!(airport.is_airport());

        let ndb = Waypoint::Navaid {
            navaid: make_navaid_at("LFN", NavaidType::Ndb, 41.28, -72.60),
        };
        assert_eq!(ndb.get_type(), WaypointType::Ndb);
        assert_eq!(ndb.nav_ref().ident, "LFN");

        let entry = ndb.to_entry();
        assert_eq!(entry.get_waypoint_type(), WaypointType::Ndb);
        assert_eq!(entry.get_position(), ndb.get_loc());
    }

    #[test]
    fn test_same_fix() {
        let a = Waypoint::Navaid {
            navaid: make_navaid_at("DPK", NavaidType::Vor, 40.7919, -73.3036),
        };
        let b = a.clone();
        assert!(a.same_fix(&b));

        let c = Waypoint::Navaid {
            navaid: make_navaid_at("DPK", NavaidType::Vor, 41.7919, -73.3036),
        };
        assert!(!a.same_fix(&c));

        let invalid = Waypoint::Invalid {
            id: "DPK".to_string(),
            loc: *a.get_loc(),
        };
        assert!(!a.same_fix(&invalid));
    }
}
