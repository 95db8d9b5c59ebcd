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

use log::{error, info};

use kelpie_route_core::earth::Earth;
use kelpie_route_core::earth::coordinate::Coordinate;
use kelpie_route_core::event::{EventManager, EventType};
use kelpie_route_core::hangar::hangar::Hangar;
use kelpie_route_core::model::airport::Airport;
use kelpie_route_core::model::airway::{AirwayClass, AirwaySegment};
use kelpie_route_core::model::aircraft::Aircraft;
use kelpie_route_core::model::flightplan::WaypointType;
use kelpie_route_core::model::navaid::{Navaid, NavaidType};
use kelpie_route_core::model::waypoint::NavRef;
use kelpie_route_core::preference::{AIRCRAFT_TYPE, PREFS_PATH, PreferenceManager, RouteOptions};
use kelpie_route_core::route::RouteContext;
use kelpie_route_core::route::controller::RouteController;
use kelpie_route_core::route::procedures::MemoryProcedureStore;
use kelpie_route_core::util::Logger;

const REGION: &str = "K6";

const VORS: [(&str, f64, f64); 5] = [
    ("DPK", 40.7919, -73.3036),
    ("BDR", 41.1605, -73.1244),
    ("HFD", 41.6413, -72.5474),
    ("PUT", 41.9556, -71.8442),
    ("BOS", 42.3574, -70.9895),
];

fn sample_world() -> Earth {
    let mut earth = Earth::new();
    earth.add_airport(Airport::new(
        "KJFK".to_string(),
        REGION.to_string(),
        40.6398,
        -73.7789,
        13,
        "John F Kennedy Intl".to_string(),
    ));
    earth.add_airport(Airport::new(
        "KBOS".to_string(),
        REGION.to_string(),
        42.3643,
        -71.0052,
        20,
        "General Edward Lawrence Logan Intl".to_string(),
    ));
    for (id, lat, lon) in VORS {
        earth.add_navaid(Navaid::new(
            id.to_string(),
            REGION.to_string(),
            NavaidType::Vor,
            lat,
            lon,
            0,
            113.0,
            100,
            id.to_string(),
        ));
    }
    for (i, pair) in VORS.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        earth.add_airway(AirwaySegment::new(
            i as u32 + 1,
            "V1",
            AirwayClass::Victor,
            NavRef::new(from.0, REGION, WaypointType::Vor),
            Coordinate::new(from.1, from.2),
            NavRef::new(to.0, REGION, WaypointType::Vor),
            Coordinate::new(to.1, to.2),
            3000,
            17999,
        ));
    }
    earth
}

fn main() {
    let _logger = Logger::new();

    let prefs = PreferenceManager::new(PREFS_PATH);
    let mut options = RouteOptions::from_preferences(&prefs);
    options.airway_connect_range = options.airway_connect_range.min(30.0);

    let hangar = Hangar::load(None);
    let aircraft = prefs
        .get::<String>(AIRCRAFT_TYPE)
        .and_then(|name| hangar.get(&name))
        .or_else(|| hangar.get_default_aircraft())
        .unwrap_or_else(|| Arc::new(Aircraft::default()));
    info!("Planning with {}", aircraft.get_name());

    let events = Arc::new(EventManager::new());
    let receiver = events.register_listener(&[
        EventType::RouteCalcStarted,
        EventType::RouteCalcFinished,
        EventType::StatusChange,
    ]);

    let ctx = RouteContext {
        nav: Arc::new(sample_world()),
        procedures: Arc::new(MemoryProcedureStore::new()),
        aircraft,
        options,
    };
    let mut controller = RouteController::new(ctx, events.clone());

    for (label, result) in [
        ("departure", controller.set_departure("KJFK")),
        ("destination", controller.set_destination("KBOS")),
    ] {
        if let Err(e) = result {
            error!("Unable to set {}: {}", label, e);
            return;
        }
    }
    controller.set_cruise_altitude(8000);
    controller.calculate_low_alt(None);

    while let Ok(event) = receiver.try_recv() {
        info!("{:?}", event);
    }

    let route = controller.route();
    for (i, leg) in route.legs().iter().enumerate() {
        println!(
            "{:>2} {:<6} {:<4} {:>6.1} NM {:>5.0}°",
            i,
            leg.get_ident(),
            leg.get_airway_name(),
            leg.get_distance_to(),
            leg.get_course_to()
        );
    }
    println!(
        "{} at {} ft, {:.1} NM, {:.2} h, fuel {:.1}",
        controller.flightplan().get_route_type(),
        controller.flightplan().get_cruise_altitude(),
        route.get_total_distance(),
        route.get_altitude().get_travel_time(),
        route.get_altitude().get_trip_fuel()
    );
    for message in route.errors() {
        println!("Warning: {}", message);
    }
}
