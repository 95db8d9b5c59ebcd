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

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A position on the earth. Distances are in nautical miles, altitude in feet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    altitude: f64,
}

/// Where a point lies relative to a great circle segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Invalid,
    AlongTrack,
    BeforeStart,
    AfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineDistance {
    pub status: LineStatus,
    pub distance: f64,
}

impl Coordinate {
    pub const EARTH_RADIUS: f64 = 3441.85;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
        }
    }

    pub fn with_altitude(&self, altitude: f64) -> Self {
        Self {
            altitude,
            ..*self
        }
    }

    pub fn bearing_to(&self, l: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = l.latitude.to_radians();
        let d_lon = (l.longitude - self.longitude).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        let heading = y.atan2(x);

        (heading + 2.0 * PI) % (2.0 * PI)
    }

    pub fn bearing_to_deg(&self, l: &Coordinate) -> f64 {
        self.bearing_to(l).to_degrees()
    }

    pub fn coordinate_at(&self, distance: f64, heading: f64) -> Coordinate {
        let d = distance / Self::EARTH_RADIUS;
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let tc = heading.to_radians();
        let lat = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * tc.cos()).asin();
        let d_lon = (tc.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat.sin());

        let lon = (lon1 + d_lon + 3.0 * PI) % (2.0 * PI) - PI;

        Coordinate::new(lat.to_degrees(), lon.to_degrees())
    }

    pub fn distance_to(&self, l: &Coordinate) -> f64 {
        Self::EARTH_RADIUS * self.angular_distance_to(l)
    }

    fn angular_distance_to(&self, l: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = l.latitude.to_radians();
        let d_lon = (self.longitude - l.longitude).to_radians();
        let d_lat = lat1 - lat2;

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        (2.0 * a.sqrt().atan2((1.0 - a).sqrt())).abs()
    }

    pub fn midpoint(&self, l: &Coordinate) -> Coordinate {
        let distance = self.distance_to(l);
        self.coordinate_at(distance / 2.0, self.bearing_to_deg(l))
    }

    /// Cross track distance of this point to the great circle segment `from` to `to`.
    /// The status tells if the projection falls before, on or after the segment.
    pub fn distance_to_segment(&self, from: &Coordinate, to: &Coordinate) -> LineDistance {
        let leg_length = from.angular_distance_to(to);
        if leg_length < f64::EPSILON {
            return LineDistance {
                status: LineStatus::Invalid,
                distance: self.distance_to(from),
            };
        }

        let d13 = from.angular_distance_to(self);
        let theta13 = from.bearing_to(self);
        let theta12 = from.bearing_to(to);

        let cross_track = (d13.sin() * (theta13 - theta12).sin()).asin();
        let along_track = (d13.cos() / cross_track.cos()).clamp(-1.0, 1.0).acos();

        // Projection behind the start point
        let behind = (theta13 - theta12).cos() < 0.0;

        if behind {
            LineDistance {
                status: LineStatus::BeforeStart,
                distance: self.distance_to(from),
            }
        } else if along_track > leg_length {
            LineDistance {
                status: LineStatus::AfterEnd,
                distance: self.distance_to(to),
            }
        } else {
            LineDistance {
                status: LineStatus::AlongTrack,
                distance: (cross_track * Self::EARTH_RADIUS).abs(),
            }
        }
    }

    pub fn almost_equal(&self, other: &Coordinate) -> bool {
        (self.latitude - other.latitude).abs() < 1.0e-5 && (self.longitude - other.longitude).abs() < 1.0e-5
    }

    pub fn get_latitude(&self) -> f64 {
        self.latitude
    }

    pub fn get_longitude(&self) -> f64 {
        self.longitude
    }

    pub fn get_altitude(&self) -> f64 {
        self.altitude
    }
}

/// Normalise a course in degrees to 0..360
pub fn normalize_course(course: f64) -> f64 {
    let c = course % 360.0;
    if c < 0.0 { c + 360.0 } else { c }
}
