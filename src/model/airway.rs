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

use std::fmt;

use crate::earth::coordinate::Coordinate;

use super::waypoint::NavRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirwayClass {
    Victor,
    Jet,
    Both,
}

impl fmt::Display for AirwayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirwayClass::Victor => write!(f, "Victor"),
            AirwayClass::Jet => write!(f, "Jet"),
            AirwayClass::Both => write!(f, "Both"),
        }
    }
}

/// A single airway segment between two fixes. Segments can be flown in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct AirwaySegment {
    id: u32,
    name: String,
    class: AirwayClass,
    from: NavRef,
    to: NavRef,
    from_pos: Coordinate,
    to_pos: Coordinate,
    min_altitude: i32,
    // Zero means unlimited
    max_altitude: i32,
}

impl AirwaySegment {
    //noinspection RsExternalLinter
    pub fn new(
        id: u32,
        name: &str,
        class: AirwayClass,
        from: NavRef,
        from_pos: Coordinate,
        to: NavRef,
        to_pos: Coordinate,
        min_altitude: i32,
        max_altitude: i32,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            class,
            from,
            to,
            from_pos,
            to_pos,
            min_altitude,
            max_altitude,
        }
    }

    pub fn get_id(&self) -> u32 {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_class(&self) -> AirwayClass {
        self.class
    }

    pub fn get_from(&self) -> &NavRef {
        &self.from
    }

    pub fn get_to(&self) -> &NavRef {
        &self.to
    }

    pub fn get_min_altitude(&self) -> i32 {
        self.min_altitude
    }

    pub fn get_max_altitude(&self) -> i32 {
        self.max_altitude
    }

    pub fn length(&self) -> f64 {
        self.from_pos.distance_to(&self.to_pos)
    }

    pub fn connects(&self, a: &NavRef, b: &NavRef) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }

    /// The other end of this segment seen from `node`, with its position.
    pub fn other_end(&self, node: &NavRef) -> Option<(&NavRef, &Coordinate)> {
        if &self.from == node {
            Some((&self.to, &self.to_pos))
        } else if &self.to == node {
            Some((&self.from, &self.from_pos))
        } else {
            None
        }
    }

    pub fn allows_altitude(&self, altitude: i32) -> bool {
        altitude <= 0
            || (altitude >= self.min_altitude && (self.max_altitude == 0 || altitude <= self.max_altitude))
    }
}
