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

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use crate::earth::coordinate::Coordinate;
    use crate::earth::{Earth, NavDataProvider};
    use crate::model::aircraft::Aircraft;
    use crate::model::airport::Airport;
    use crate::model::airway::{AirwayClass, AirwaySegment};
    use crate::model::fix::Fix;
    use crate::model::flightplan::{FlightplanEntry, WaypointType};
    use crate::model::navaid::{Navaid, NavaidType};
    use crate::model::procedure::{AltitudeRestriction, LegType, ProcedureKind, ProcedureLeg, ProcedureTypes};
    use crate::model::waypoint::NavRef;
    use crate::preference::RouteOptions;
    use crate::route::RouteContext;
    use crate::route::procedures::MemoryProcedureStore;

    const REGION: &str = "K6";

    const AIRPORTS: [(&str, f64, f64, i32, &str); 4] = [
        ("KJFK", 40.6398, -73.7789, 13, "John F Kennedy Intl"),
        ("KBOS", 42.3643, -71.0052, 20, "General Edward Lawrence Logan Intl"),
        ("KPVD", 41.7240, -71.4283, 55, "Theodore Francis Green State"),
        ("KHPN", 41.0670, -73.7076, 439, "Westchester Co"),
    ];

    const NAVAIDS: [(&str, NavaidType, f64, f64); 8] = [
        ("DPK", NavaidType::Vor, 40.7919, -73.3036),
        ("BDR", NavaidType::Vor, 41.1605, -73.1244),
        ("HFD", NavaidType::Vor, 41.6413, -72.5474),
        ("PUT", NavaidType::Vor, 41.9556, -71.8442),
        ("BOS", NavaidType::Vor, 42.3574, -70.9895),
        ("CCC", NavaidType::Vor, 40.9297, -72.7988),
        ("ORW", NavaidType::Vor, 41.5565, -71.9993),
        ("LFN", NavaidType::Ndb, 41.28, -72.60),
    ];

    const FIXES: [(&str, f64, f64); 5] = [
        ("MERIT", 41.3817, -73.1375),
        ("CANDR", 40.70, -73.50),
        ("GLYDE", 42.10, -71.40),
        ("LOBBY", 42.20, -71.20),
        ("OOSHN", 41.50, -71.20),
    ];

    pub fn make_airport_at(id: &str, latitude: f64, longitude: f64) -> Arc<Airport> {
        Arc::new(Airport::new(
            id.to_string(),
            REGION.to_string(),
            latitude,
            longitude,
            0,
            format!("{} airport", id),
        ))
    }

    pub fn make_navaid_at(id: &str, type_: NavaidType, latitude: f64, longitude: f64) -> Arc<Navaid> {
        Arc::new(Navaid::new(
            id.to_string(),
            REGION.to_string(),
            type_,
            latitude,
            longitude,
            0,
            if type_ == NavaidType::Ndb { 350.0 } else { 113.0 },
            100,
            id.to_string(),
        ))
    }

    fn position_of(id: &str) -> Coordinate {
        NAVAIDS
            .iter()
            .map(|(i, _, lat, lon)| (*i, *lat, *lon))
            .chain(FIXES.iter().copied())
            .find(|(i, _, _)| *i == id)
            .map(|(_, lat, lon)| Coordinate::new(lat, lon))
            .unwrap_or_default()
    }

    fn nav_ref(id: &str) -> NavRef {
        let kind = match NAVAIDS.iter().find(|n| n.0 == id) {
            Some((_, NavaidType::Ndb, _, _)) => WaypointType::Ndb,
            Some(_) => WaypointType::Vor,
            None => WaypointType::Waypoint,
        };
        NavRef::new(id, REGION, kind)
    }

    fn segment(id: u32, name: &str, class: AirwayClass, from: &str, to: &str, min: i32, max: i32) -> AirwaySegment {
        AirwaySegment::new(
            id,
            name,
            class,
            nav_ref(from),
            position_of(from),
            nav_ref(to),
            position_of(to),
            min,
            max,
        )
    }

    /// A small part of the north east US with victor and jet airways.
    pub fn make_world() -> Earth {
        let mut earth = Earth::new();
        for (id, lat, lon, elevation, name) in AIRPORTS {
            earth.add_airport(Airport::new(
                id.to_string(),
                REGION.to_string(),
                lat,
                lon,
                elevation,
                name.to_string(),
            ));
        }
        for (id, type_, lat, lon) in NAVAIDS {
            earth.add_navaid(Navaid::new(
                id.to_string(),
                REGION.to_string(),
                type_,
                lat,
                lon,
                0,
                if type_ == NavaidType::Ndb { 350.0 } else { 113.0 },
                100,
                id.to_string(),
            ));
        }
        for (id, lat, lon) in FIXES {
            earth.add_fix(Fix::new(id.to_string(), REGION.to_string(), lat, lon));
        }

        earth.add_airway(segment(1, "V1", AirwayClass::Victor, "DPK", "BDR", 3000, 17999));
        earth.add_airway(segment(2, "V1", AirwayClass::Victor, "BDR", "HFD", 3000, 17999));
        earth.add_airway(segment(3, "V1", AirwayClass::Victor, "HFD", "PUT", 3000, 17999));
        earth.add_airway(segment(4, "V1", AirwayClass::Victor, "PUT", "BOS", 3000, 17999));
        earth.add_airway(segment(5, "J79", AirwayClass::Jet, "DPK", "MERIT", 18000, 45000));
        earth.add_airway(segment(6, "J79", AirwayClass::Jet, "MERIT", "PUT", 18000, 45000));
        earth.add_airway(segment(7, "J79", AirwayClass::Jet, "PUT", "BOS", 18000, 45000));
        earth.add_airway(segment(8, "V16", AirwayClass::Victor, "CCC", "ORW", 4000, 0));
        earth.add_airway(segment(9, "V16", AirwayClass::Victor, "ORW", "PUT", 4000, 0));
        earth
    }

    fn fix_leg(leg_type: LegType, id: &str) -> ProcedureLeg {
        let kind = nav_ref(id).kind;
        ProcedureLeg::new(leg_type, id, kind, position_of(id)).with_region(REGION)
    }

    fn runway_leg(id: &str, latitude: f64, longitude: f64) -> ProcedureLeg {
        ProcedureLeg::new(LegType::TrackToFix, id, WaypointType::User, Coordinate::new(latitude, longitude)).runway()
    }

    /// Procedures for KJFK, KBOS and KPVD.
    pub fn make_procedures() -> MemoryProcedureStore {
        let mut store = MemoryProcedureStore::new();
        store.add_procedure(
            ProcedureKind::Sid,
            "KJFK",
            "DEEZZ5",
            "31L",
            vec![
                runway_leg("RW31L", 40.6450, -73.7640),
                fix_leg(LegType::CourseToFix, "CANDR").with_altitude(AltitudeRestriction::at_or_above(2000)),
                fix_leg(LegType::TrackToFix, "DPK"),
            ],
        );

        store.add_procedure(
            ProcedureKind::Star,
            "KBOS",
            "GLYDE1",
            "",
            vec![fix_leg(LegType::TrackToFix, "GLYDE"), fix_leg(LegType::TrackToFix, "LOBBY").with_speed(210)],
        );
        store.add_transition("KBOS", "GLYDE1", "PUT", vec![fix_leg(LegType::InitialFix, "PUT")]);

        store.add_procedure(
            ProcedureKind::Approach,
            "KBOS",
            "I04R",
            "04R",
            vec![
                fix_leg(LegType::InitialFix, "LOBBY").with_altitude(AltitudeRestriction::at(3000)),
                runway_leg("RW04R", 42.3500, -71.0100),
                fix_leg(LegType::DirectToFix, "BOS").with_type(ProcedureTypes::MISSED),
            ],
        );
        store.add_transition("KBOS", "I04R", "GLYDE", vec![fix_leg(LegType::InitialFix, "GLYDE")]);

        store.add_procedure(
            ProcedureKind::Star,
            "KPVD",
            "OOSHN1",
            "",
            vec![fix_leg(LegType::TrackToFix, "ORW"), fix_leg(LegType::TrackToFix, "OOSHN")],
        );
        store
    }

    pub fn make_context() -> RouteContext {
        RouteContext {
            nav: Arc::new(make_world()),
            procedures: Arc::new(make_procedures()),
            aircraft: Arc::new(Aircraft::default()),
            options: RouteOptions::default(),
        }
    }

    /// Entry for a world object, or an entry at a dummy position for unknown idents.
    pub fn entry(ident: &str, kind: WaypointType) -> FlightplanEntry {
        let world = make_world();
        match world.lookup(ident, "", kind, &Coordinate::new(41.0, -72.0)) {
            Some(waypoint) => waypoint.to_entry(),
            None => FlightplanEntry::new(ident, REGION, kind, Coordinate::new(41.0, -73.0)),
        }
    }

    pub fn user_entry(ident: &str, latitude: f64, longitude: f64) -> FlightplanEntry {
        FlightplanEntry::new(ident, "", WaypointType::User, Coordinate::new(latitude, longitude))
    }
}
