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

use log::debug;

use crate::model::aircraft::Aircraft;
use crate::model::route_leg::RouteLeg;

/// Altitude, time and fuel for one route leg. Values describe the leg ending at the
/// waypoint with the same index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AltitudeLeg {
    pub altitude: f64,
    pub distance: f64,
    pub cumulative_distance: f64,
    /// Hours
    pub travel_time: f64,
    pub fuel: f64,
}

/// Vertical profile of a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteAltitude {
    legs: Vec<AltitudeLeg>,
    cruise_altitude: i32,
    top_of_climb: f64,
    top_of_descent: f64,
    total_distance: f64,
    travel_time: f64,
    trip_fuel: f64,
    errors: Vec<String>,
}

struct Performance {
    climb_speed: f64,
    climb_rate: f64,
    sink_speed: f64,
    sink_rate: f64,
    cruise_speed: f64,
    fuel_flow: f64,
}

impl Performance {
    fn from(aircraft: &Aircraft) -> Self {
        let positive = |v: i32, default: f64| if v > 0 { v as f64 } else { default };
        Self {
            climb_speed: positive(aircraft.get_climb_speed(), 120.0),
            climb_rate: positive(aircraft.get_climb_rate(), 1000.0),
            sink_speed: positive(aircraft.get_sink_speed(), 80.0),
            sink_rate: positive(aircraft.get_sink_rate(), 700.0),
            cruise_speed: positive(aircraft.get_cruise_speed(), 120.0),
            fuel_flow: aircraft.get_fuel_flow().max(0.0),
        }
    }

    fn climb_distance(&self, from: f64, to: f64) -> f64 {
        let time_to_toc = (to - from).max(0.0) / self.climb_rate / 60.0;
        self.climb_speed * time_to_toc
    }

    fn descent_distance(&self, from: f64, to: f64) -> f64 {
        let time_to_bod = (from - to).max(0.0) / self.sink_rate / 60.0;
        self.sink_speed * time_to_bod
    }
}

impl RouteAltitude {
    /// Builds the profile for `legs`. Missed approach legs add no distance, time or fuel.
    pub fn calculate(legs: &[RouteLeg], cruise_altitude: i32, aircraft: &Aircraft) -> RouteAltitude {
        let mut result = RouteAltitude {
            cruise_altitude,
            ..RouteAltitude::default()
        };
        if legs.len() < 2 {
            result.legs = legs.iter().map(|_| AltitudeLeg::default()).collect();
            return result;
        }

        let performance = Performance::from(aircraft);
        let departure_elevation = legs[0].get_waypoint().get_elevation() as f64;
        let destination_elevation = legs[legs.len() - 1].get_waypoint().get_elevation() as f64;

        let distances: Vec<f64> = legs
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 || l.is_missed() { 0.0 } else { l.get_distance_to() })
            .collect();
        let total: f64 = distances.iter().sum();

        let floor = departure_elevation.max(destination_elevation);
        let mut altitude = cruise_altitude as f64;
        while altitude > floor
            && performance.climb_distance(departure_elevation, altitude)
                + performance.descent_distance(altitude, destination_elevation)
                > total
        {
            altitude -= 500.0;
        }
        if altitude < floor {
            altitude = floor;
        }
        if (altitude as i32) < cruise_altitude {
            debug!("Cruise altitude lowered from {} to {}", cruise_altitude, altitude);
            result
                .errors
                .push(format!("Route too short for cruise altitude. Using {:.0} ft", altitude));
        }

        let top_of_climb = performance.climb_distance(departure_elevation, altitude);
        let top_of_descent = total - performance.descent_distance(altitude, destination_elevation);

        let altitude_at = |distance: f64| -> f64 {
            let climb = if top_of_climb > 0.0 {
                departure_elevation + (altitude - departure_elevation) * distance / top_of_climb
            } else {
                altitude
            };
            let descent_length = total - top_of_descent;
            let descent = if descent_length > 0.0 {
                destination_elevation + (altitude - destination_elevation) * (total - distance) / descent_length
            } else {
                altitude
            };
            altitude.min(climb).min(descent)
        };

        let mut cumulative = 0.0;
        let mut last_altitude = departure_elevation;
        for (i, leg) in legs.iter().enumerate() {
            let distance = distances[i];
            let middle = cumulative + distance / 2.0;
            cumulative += distance;

            let mut leg_altitude = if i == 0 {
                departure_elevation
            } else if leg.is_missed() {
                last_altitude
            } else if i == legs.len() - 1 {
                destination_elevation
            } else {
                altitude_at(cumulative)
            };
            if let Some(restriction) = leg.get_procedure_leg().and_then(|p| p.altitude_restriction) {
                leg_altitude = restriction.clamp(leg_altitude);
            }
            last_altitude = leg_altitude;

            let speed = if middle < top_of_climb {
                performance.climb_speed
            } else if middle > top_of_descent {
                performance.sink_speed
            } else {
                performance.cruise_speed
            };
            let travel_time = distance / speed;
            let fuel = travel_time * performance.fuel_flow;
            result.travel_time += travel_time;
            result.trip_fuel += fuel;

            result.legs.push(AltitudeLeg {
                altitude: leg_altitude,
                distance,
                cumulative_distance: cumulative,
                travel_time,
                fuel,
            });
        }

        result.cruise_altitude = altitude as i32;
        result.top_of_climb = top_of_climb;
        result.top_of_descent = top_of_descent;
        result.total_distance = total;
        result
    }

    pub fn legs(&self) -> &[AltitudeLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Cruise altitude actually reached
    pub fn get_cruise_altitude(&self) -> i32 {
        self.cruise_altitude
    }

    /// Distance from departure
    pub fn get_top_of_climb(&self) -> f64 {
        self.top_of_climb
    }

    /// Distance from departure
    pub fn get_top_of_descent(&self) -> f64 {
        self.top_of_descent
    }

    pub fn get_total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn get_travel_time(&self) -> f64 {
        self.travel_time
    }

    pub fn get_trip_fuel(&self) -> f64 {
        self.trip_fuel
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::aircraft::Aircraft;
    use crate::model::flightplan::WaypointType;
    use crate::model::procedure::{AltitudeRestriction, LegType, ProcedureLeg, ProcedureTypes};
    use crate::model::route_leg::RouteLeg;
    use crate::model::waypoint::Waypoint;

    use super::RouteAltitude;

    fn leg(id: &str, lat: f64, lon: f64, previous: Option<&RouteLeg>) -> RouteLeg {
        let mut leg = RouteLeg::new(
            Waypoint::User {
                id: id.to_string(),
                loc: Coordinate::new(lat, lon),
            },
            "",
        );
        if let Some(p) = previous {
            let d = p.get_position().distance_to(leg.get_position());
            leg.set_geometry(d, 0.0);
        }
        leg
    }

    fn aircraft() -> Aircraft {
        Aircraft::new("Test".to_string(), 120, 8000, 100, 1000, 100, 1000, 10.0, true)
    }

    #[test]
    fn test_profile() {
        let a = leg("A", 0.0, 0.0, None);
        let b = leg("B", 0.0, 1.0, Some(&a));
        let c = leg("C", 0.0, 2.0, Some(&b));
        let profile = RouteAltitude::calculate(&[a, b, c], 6000, &aircraft());

        assert_eq!(profile.len(), 3);
        assert_eq!(profile.get_cruise_altitude(), 6000);
        // 6000 ft at 1000 fpm and 100 kts
        assert!((profile.get_top_of_climb() - 10.0).abs() < 0.001);
        assert!((profile.get_total_distance() - 120.0).abs() < 0.5);
        assert_eq!(profile.legs()[0].altitude, 0.0);
        assert_eq!(profile.legs()[1].altitude, 6000.0);
        assert_eq!(profile.legs()[2].altitude, 0.0);
        assert!(profile.get_travel_time() > 0.9 && profile.get_travel_time() < 1.1);
        assert!((profile.get_trip_fuel() - profile.get_travel_time() * 10.0).abs() < 0.001);
        assert!(profile.errors().is_empty());
    }

    #[test]
    fn test_short_route_lowers_cruise() {
        let a = leg("A", 0.0, 0.0, None);
        let b = leg("B", 0.0, 0.2, Some(&a));
        let profile = RouteAltitude::calculate(&[a, b], 30000, &aircraft());
        assert!(profile.get_cruise_altitude() < 30000);
        assert_eq!(profile.get_cruise_altitude() % 500, 0);
        assert_eq!(profile.errors().len(), 1);
    }

    #[test]
    fn test_missed_and_restrictions() {
        let a = leg("A", 0.0, 0.0, None);
        let b = leg("B", 0.0, 1.0, Some(&a));
        let fix = ProcedureLeg::new(LegType::TrackToFix, "C", WaypointType::Waypoint, Coordinate::new(0.0, 1.5))
            .with_type(ProcedureTypes::APPROACH)
            .with_altitude(AltitudeRestriction::at(2000));
        let mut c = RouteLeg::new_procedure(
            Waypoint::User {
                id: "C".to_string(),
                loc: Coordinate::new(0.0, 1.5),
            },
            fix,
        );
        c.set_geometry(30.0, 90.0);
        let missed = ProcedureLeg::new(LegType::DirectToFix, "M", WaypointType::Waypoint, Coordinate::new(0.0, 3.0))
            .with_type(ProcedureTypes::MISSED);
        let mut m = RouteLeg::new_procedure(
            Waypoint::User {
                id: "M".to_string(),
                loc: Coordinate::new(0.0, 3.0),
            },
            missed,
        );
        m.set_geometry(90.0, 90.0);
        let mut d = leg("D", 0.0, 1.6, None);
        d.set_geometry(6.0, 90.0);

        let profile = RouteAltitude::calculate(&[a, b, c, m, d], 6000, &aircraft());
        assert_eq!(profile.legs()[2].altitude, 2000.0);
        assert_eq!(profile.legs()[3].distance, 0.0);
        assert_eq!(profile.legs()[3].fuel, 0.0);
        assert_eq!(profile.legs()[3].altitude, 2000.0);
        assert!((profile.get_total_distance() - 96.0).abs() < 0.5);
    }

    #[test]
    fn test_empty_route() {
        let profile = RouteAltitude::calculate(&[], 6000, &aircraft());
        assert!(profile.is_empty());
        assert_eq!(profile.get_cruise_altitude(), 6000);
    }
}
