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

use super::airway::AirwaySegment;
use super::procedure::{ProcedureLeg, ProcedureTypes};
use super::waypoint::Waypoint;

/// Derived leg of a route. There is one for each flight plan entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    waypoint: Waypoint,
    airway_name: String,
    airway: Option<Arc<AirwaySegment>>,
    airway_valid: bool,
    distance_to: f64,
    course_to: f64,
    procedure_leg: Option<ProcedureLeg>,
}

impl RouteLeg {
    pub fn new(waypoint: Waypoint, airway_name: &str) -> Self {
        Self {
            waypoint,
            airway_name: airway_name.to_string(),
            airway: None,
            airway_valid: true,
            distance_to: 0.0,
            course_to: 0.0,
            procedure_leg: None,
        }
    }

    pub fn new_procedure(waypoint: Waypoint, procedure_leg: ProcedureLeg) -> Self {
        Self {
            procedure_leg: Some(procedure_leg),
            ..Self::new(waypoint, "")
        }
    }

    pub fn get_waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn get_ident(&self) -> &str {
        self.waypoint.get_id()
    }

    pub fn get_position(&self) -> &Coordinate {
        self.waypoint.get_loc()
    }

    pub fn get_airway_name(&self) -> &str {
        &self.airway_name
    }

    pub fn get_airway(&self) -> Option<&Arc<AirwaySegment>> {
        self.airway.as_ref()
    }

    pub(crate) fn set_airway(&mut self, airway: Option<Arc<AirwaySegment>>, valid: bool) {
        self.airway = airway;
        self.airway_valid = valid;
    }

    pub fn is_airway_valid(&self) -> bool {
        self.airway_valid
    }

    pub fn get_distance_to(&self) -> f64 {
        self.distance_to
    }

    pub fn get_course_to(&self) -> f64 {
        self.course_to
    }

    pub(crate) fn set_geometry(&mut self, distance_to: f64, course_to: f64) {
        self.distance_to = distance_to;
        self.course_to = course_to;
    }

    pub fn get_procedure_leg(&self) -> Option<&ProcedureLeg> {
        self.procedure_leg.as_ref()
    }

    pub fn get_procedure_type(&self) -> ProcedureTypes {
        self.procedure_leg
            .as_ref()
            .map(|l| l.procedure_type)
            .unwrap_or(ProcedureTypes::NONE)
    }

    pub fn is_route(&self) -> bool {
        self.procedure_leg.is_none()
    }

    pub fn is_procedure(&self) -> bool {
        self.procedure_leg.is_some()
    }

    pub fn is_missed(&self) -> bool {
        self.procedure_leg.as_ref().is_some_and(|l| l.is_missed())
    }

    pub fn is_valid(&self) -> bool {
        self.waypoint.is_valid()
    }
}
