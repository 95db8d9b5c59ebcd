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

use std::sync::LazyLock;

use log::{debug, info};
use regex_lite::Regex;

use crate::earth::coordinate::{Coordinate, LineDistance, LineStatus};
use crate::model::flightplan::{FlightRules, Flightplan, FlightplanEntry, RouteType, WaypointType};
use crate::model::procedure::{ProcedureLeg, ProcedureLegs, ProcedureTypes};
use crate::model::route_leg::RouteLeg;
use crate::model::waypoint::Waypoint;
use crate::planner::altitude::RouteAltitude;

use super::RouteContext;
use super::procedures::{APPROACH_NO_MISSED, clear_procedure_properties};

static USER_WAYPOINT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^WP(\d+)$").ok());

/// The flight plan together with its derived legs and attached procedures.
///
/// After [`Route::update_all`] there is exactly one leg per flight plan entry. Procedure
/// legs are carried as entries that are never saved: departure legs directly after the
/// first entry, STAR and approach legs directly before the last.
#[derive(Debug, Clone, Default)]
pub struct Route {
    flightplan: Flightplan,
    legs: Vec<RouteLeg>,
    departure_legs: Option<ProcedureLegs>,
    star_legs: Option<ProcedureLegs>,
    arrival_legs: Option<ProcedureLegs>,
    altitude: RouteAltitude,
    active_leg: Option<usize>,
    active_pos: Option<Coordinate>,
    total_distance: f64,
    procedure_errors: Vec<String>,
    errors: Vec<String>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flightplan(flightplan: Flightplan) -> Self {
        Self {
            flightplan,
            ..Self::default()
        }
    }

    pub fn flightplan(&self) -> &Flightplan {
        &self.flightplan
    }

    pub(crate) fn flightplan_mut(&mut self) -> &mut Flightplan {
        &mut self.flightplan
    }

    /// Replaces the flight plan. Procedures are dropped and need to be loaded again
    /// from the plan properties.
    pub(crate) fn set_flightplan(&mut self, flightplan: Flightplan) {
        self.flightplan = flightplan;
        self.departure_legs = None;
        self.star_legs = None;
        self.arrival_legs = None;
        self.procedure_errors.clear();
        self.legs.clear();
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn leg(&self, index: usize) -> Option<&RouteLeg> {
        self.legs.get(index)
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn get_departure_legs(&self) -> Option<&ProcedureLegs> {
        self.departure_legs.as_ref()
    }

    pub fn get_star_legs(&self) -> Option<&ProcedureLegs> {
        self.star_legs.as_ref()
    }

    pub fn get_arrival_legs(&self) -> Option<&ProcedureLegs> {
        self.arrival_legs.as_ref()
    }

    pub(crate) fn set_departure_procedure_legs(&mut self, legs: Option<ProcedureLegs>) {
        self.departure_legs = legs;
    }

    pub(crate) fn set_star_procedure_legs(&mut self, legs: Option<ProcedureLegs>) {
        self.star_legs = legs;
    }

    pub(crate) fn set_arrival_procedure_legs(&mut self, legs: Option<ProcedureLegs>) {
        self.arrival_legs = legs;
    }

    pub(crate) fn set_procedure_errors(&mut self, errors: Vec<String>) {
        self.procedure_errors = errors;
    }

    pub fn has_procedures(&self) -> bool {
        self.departure_legs.is_some() || self.star_legs.is_some() || self.arrival_legs.is_some()
    }

    pub fn get_altitude(&self) -> &RouteAltitude {
        &self.altitude
    }

    /// Route distance without missed approach legs
    pub fn get_total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Drops the given procedure parts and their plan properties. Legs are rebuilt by the
    /// next [`Route::update_all`].
    pub(crate) fn remove_procedure_legs(&mut self, types: ProcedureTypes) {
        if types.is_empty() {
            return;
        }
        debug!("Removing procedures {:?}", types);

        if types.intersects(ProcedureTypes::SID) {
            self.departure_legs = None;
        } else if types.intersects(ProcedureTypes::SID_TRANSITION) {
            if let Some(legs) = self.departure_legs.as_mut() {
                legs.remove_transition();
            }
        }

        if types.intersects(ProcedureTypes::STAR) {
            self.star_legs = None;
        } else if types.intersects(ProcedureTypes::STAR_TRANSITION) {
            if let Some(legs) = self.star_legs.as_mut() {
                legs.remove_transition();
            }
        }

        if types.intersects(ProcedureTypes::APPROACH) {
            self.arrival_legs = None;
        } else if let Some(legs) = self.arrival_legs.as_mut() {
            if types.intersects(ProcedureTypes::TRANSITION) {
                legs.remove_transition();
            }
            if types.intersects(ProcedureTypes::MISSED) {
                legs.remove_missed();
            }
        }

        clear_procedure_properties(self.flightplan.properties_mut(), types);
        if types.intersects(ProcedureTypes::MISSED) && self.arrival_legs.is_some() {
            self.flightplan
                .properties_mut()
                .insert(APPROACH_NO_MISSED.to_string(), "true".to_string());
        }
    }

    /// Procedure parts touched by an edit at the given leg indexes.
    pub fn affected_procedures(&self, indexes: &[usize]) -> ProcedureTypes {
        let mut types = ProcedureTypes::NONE;
        if self.legs.is_empty() {
            return types;
        }
        for &index in indexes {
            if index == 0 {
                types |= ProcedureTypes::DEPARTURE;
            }
            if index + 1 >= self.legs.len() {
                types |= ProcedureTypes::ARRIVAL_ALL;
            }
            let leg_type = self.legs.get(index).map(|l| l.get_procedure_type()).unwrap_or_default();
            if leg_type.intersects(ProcedureTypes::SID_TRANSITION) {
                types |= ProcedureTypes::SID_TRANSITION;
            }
            if leg_type.intersects(ProcedureTypes::SID) {
                types |= ProcedureTypes::DEPARTURE;
            }
            if leg_type.intersects(ProcedureTypes::STAR_TRANSITION) {
                types |= ProcedureTypes::STAR_TRANSITION;
            }
            if leg_type.intersects(ProcedureTypes::STAR) {
                types |= ProcedureTypes::STAR_ALL;
            }
            if leg_type.intersects(ProcedureTypes::TRANSITION) {
                types |= ProcedureTypes::TRANSITION;
            }
            if leg_type.intersects(ProcedureTypes::APPROACH | ProcedureTypes::MISSED) {
                types |= ProcedureTypes::ARRIVAL;
            }
        }

        // A transition without its procedure makes no sense
        if types.intersects(ProcedureTypes::SID_TRANSITION)
            && self.departure_legs.as_ref().is_some_and(|l| l.legs.is_empty())
        {
            types |= ProcedureTypes::SID;
        }
        if types.intersects(ProcedureTypes::STAR_TRANSITION)
            && self.star_legs.as_ref().is_some_and(|l| l.legs.is_empty())
        {
            types |= ProcedureTypes::STAR_ALL;
        }
        types
    }

    /// Strips procedure entries from the flight plan and inserts them again for the
    /// currently attached procedures. Returns the procedure leg for each entry.
    fn splice_procedures(&mut self) -> Vec<Option<ProcedureLeg>> {
        self.flightplan.remove_no_save_entries();
        let mut procedure_legs: Vec<Option<ProcedureLeg>> = vec![None; self.flightplan.len()];

        let to_entry = |leg: &ProcedureLeg| {
            FlightplanEntry::procedure(&leg.fix_ident, &leg.fix_region, leg.fix_type, leg.position)
        };

        if !self.flightplan.is_empty() {
            if let Some(departure) = &self.departure_legs {
                for (k, leg) in departure.all_legs().into_iter().enumerate() {
                    self.flightplan.insert(1 + k, to_entry(leg));
                    procedure_legs.insert(1 + k, Some(leg.clone()));
                }
            }
        }

        if self.flightplan.len() > 1 {
            let arrival: Vec<&ProcedureLeg> = self
                .star_legs
                .iter()
                .chain(self.arrival_legs.iter())
                .flat_map(|p| p.all_legs())
                .collect();
            let insert_at = self.flightplan.len() - 1;
            for (k, leg) in arrival.into_iter().enumerate() {
                self.flightplan.insert(insert_at + k, to_entry(leg));
                procedure_legs.insert(insert_at + k, Some(leg.clone()));
            }
        }
        procedure_legs
    }

    fn resolve_waypoint(ctx: &RouteContext, entry: &FlightplanEntry) -> Waypoint {
        let ident = entry.get_ident();
        match entry.get_waypoint_type() {
            WaypointType::User => Waypoint::User {
                id: ident.to_string(),
                loc: *entry.get_position(),
            },
            kind => ctx
                .nav
                .lookup(ident, entry.get_region(), kind, entry.get_position())
                .unwrap_or_else(|| Waypoint::Invalid {
                    id: ident.to_string(),
                    loc: *entry.get_position(),
                }),
        }
    }

    fn resolve_procedure_waypoint(ctx: &RouteContext, leg: &ProcedureLeg) -> Waypoint {
        let found = match leg.fix_type {
            WaypointType::Vor | WaypointType::Ndb | WaypointType::Waypoint if !leg.fix_ident.is_empty() => ctx
                .nav
                .lookup(&leg.fix_ident, &leg.fix_region, leg.fix_type, &leg.position),
            _ => None,
        };
        found.unwrap_or_else(|| Waypoint::User {
            id: leg.fix_ident.clone(),
            loc: leg.position,
        })
    }

    /// Rebuilds the procedure entries and resolves all legs. Geometry is not updated.
    pub fn update_procedure_legs(&mut self, ctx: &RouteContext) {
        let procedure_legs = self.splice_procedures();
        self.legs = self
            .flightplan
            .entries()
            .iter()
            .zip(procedure_legs)
            .map(|(entry, procedure_leg)| match procedure_leg {
                Some(leg) => RouteLeg::new_procedure(Self::resolve_procedure_waypoint(ctx, &leg), leg),
                None => RouteLeg::new(Self::resolve_waypoint(ctx, entry), entry.get_airway()),
            })
            .collect();
    }

    /// Recomputes every derived value from the flight plan and attached procedures.
    pub fn update_all(&mut self, ctx: &RouteContext) {
        self.update_procedure_legs(ctx);
        self.update_geometry();
        self.update_airways(ctx);
        self.update_altitude(ctx);
        self.update_errors();
        if self.active_leg.is_some_and(|active| active >= self.legs.len()) {
            self.active_leg = None;
        }
    }

    /// Index of the leg the geometry of `index` starts from. Legs after a missed approach
    /// continue from the last leg before it.
    fn previous_leg_index(&self, index: usize) -> Option<usize> {
        if index == 0 {
            return None;
        }
        if self.legs[index].is_missed() {
            return Some(index - 1);
        }
        (0..index).rev().find(|&i| !self.legs[i].is_missed())
    }

    fn update_geometry(&mut self) {
        let mut total = 0.0;
        for i in 0..self.legs.len() {
            let (distance, course) = match self.previous_leg_index(i) {
                Some(previous) => {
                    let from = *self.legs[previous].get_position();
                    let to = self.legs[i].get_position();
                    (from.distance_to(to), from.bearing_to_deg(to))
                }
                None => (0.0, 0.0),
            };
            self.legs[i].set_geometry(distance, course);
            if !self.legs[i].is_missed() {
                total += distance;
            }
        }
        self.total_distance = total;
    }

    fn update_airways(&mut self, ctx: &RouteContext) {
        for i in 0..self.legs.len() {
            if i == 0 || self.legs[i].get_airway_name().is_empty() {
                self.legs[i].set_airway(None, true);
                continue;
            }
            let from = self.legs[i - 1].get_waypoint().nav_ref();
            let to = self.legs[i].get_waypoint().nav_ref();
            let segment = ctx.nav.airway_segment(&from, &to, Some(self.legs[i].get_airway_name()));
            let valid = segment.is_some();
            self.legs[i].set_airway(segment, valid);
        }
    }

    fn update_altitude(&mut self, ctx: &RouteContext) {
        let cruise = match self.flightplan.get_cruise_altitude() {
            0 => ctx.aircraft.get_cruise_altitude(),
            altitude => altitude,
        };
        self.altitude = RouteAltitude::calculate(&self.legs, cruise, &ctx.aircraft);
    }

    fn update_errors(&mut self) {
        let mut errors = Vec::new();
        if let Some(first) = self.legs.first() {
            if !first.is_valid() {
                errors.push("No start position".to_string());
            }
        }
        let cruise = self.flightplan.get_cruise_altitude();
        for (i, leg) in self.legs.iter().enumerate() {
            if !leg.is_valid() {
                errors.push(format!("Waypoint {} not found", leg.get_ident()));
            }
            if !leg.is_airway_valid() {
                errors.push(format!(
                    "Airway {} invalid between leg {} and {}",
                    leg.get_airway_name(),
                    i - 1,
                    i
                ));
            } else if let Some(airway) = leg.get_airway() {
                if cruise > 0 && !airway.allows_altitude(cruise) {
                    errors.push(format!(
                        "Cruise altitude {} ft outside of airway {} limits at leg {}",
                        cruise,
                        airway.get_name(),
                        i
                    ));
                }
            }
        }
        errors.extend(self.procedure_errors.iter().cloned());
        errors.extend(self.altitude.errors().iter().cloned());
        self.errors = errors;
    }

    /// Adjusts cruise altitude to airway limits and/or the route type to the cruise
    /// altitude, then recomputes.
    pub fn update_airways_and_altitude(&mut self, ctx: &RouteContext, adjust_altitude: bool, adjust_type: bool) {
        if adjust_altitude && self.legs.len() > 1 {
            let altitude = self.adjusted_altitude(self.flightplan.get_cruise_altitude());
            debug!("Cruise altitude adjusted to {}", altitude);
            self.flightplan.set_cruise_altitude(altitude);
        }
        if adjust_type
            && matches!(
                self.flightplan.get_route_type(),
                RouteType::LowAltitude | RouteType::HighAltitude
            )
        {
            let route_type = if self.flightplan.get_cruise_altitude() >= ctx.options.high_altitude_threshold {
                RouteType::HighAltitude
            } else {
                RouteType::LowAltitude
            };
            self.flightplan.set_route_type(route_type);
        }
        self.update_all(ctx);
    }

    /// Lowest valid cruise level at or above `altitude` and all airway minimum altitudes.
    /// IFR uses odd thousands eastbound and even thousands westbound, VFR adds 500 ft.
    pub fn adjusted_altitude(&self, altitude: i32) -> i32 {
        let (Some(first), Some(last)) = (self.legs.first(), self.legs.last()) else {
            return altitude;
        };
        let min_airway = self
            .legs
            .iter()
            .filter_map(|l| l.get_airway())
            .map(|a| a.get_min_altitude())
            .max()
            .unwrap_or(0);
        let altitude = altitude.max(min_airway);

        let course = first.get_position().bearing_to_deg(last.get_position());
        let eastbound = course < 180.0;
        let offset = match self.flightplan.get_flight_rules() {
            FlightRules::Ifr => 0,
            FlightRules::Vfr => 500,
        };
        let mut level = if eastbound { 1000 } else { 2000 } + offset;
        while level < altitude {
            level += 2000;
        }
        level
    }

    /// Removes consecutive legs at the same fix together with their flight plan entries.
    /// The earlier leg is kept unless it is a route leg next to a procedure leg.
    pub fn remove_duplicate_route_legs(&mut self) -> usize {
        if self.legs.len() != self.flightplan.len() {
            return 0;
        }
        let mut removed = 0;
        let mut i = self.legs.len();
        while i > 1 {
            i -= 1;
            if i >= self.legs.len() {
                continue;
            }
            let previous = &self.legs[i - 1];
            let current = &self.legs[i];
            if !previous.get_waypoint().same_fix(current.get_waypoint()) {
                continue;
            }
            let remove = if current.is_route() {
                i
            } else if previous.is_route() {
                i - 1
            } else {
                continue;
            };
            debug!("Removing duplicate leg {} at {}", self.legs[remove].get_ident(), remove);
            self.legs.remove(remove);
            self.flightplan.remove(remove);
            removed += 1;
        }
        if removed > 0 {
            self.update_geometry();
        }
        removed
    }

    /// Index of the last departure procedure leg or zero.
    pub fn start_index_after_procedure(&self) -> usize {
        self.legs
            .iter()
            .rposition(|l| l.get_procedure_type().intersects(ProcedureTypes::DEPARTURE))
            .unwrap_or(0)
    }

    /// Index of the first arrival procedure leg or the last leg.
    pub fn destination_index_before_procedure(&self) -> usize {
        self.legs
            .iter()
            .position(|l| l.get_procedure_type().intersects(ProcedureTypes::ARRIVAL_ALL))
            .unwrap_or(self.legs.len().saturating_sub(1))
    }

    fn leg_distance(&self, index: usize, pos: &Coordinate) -> LineDistance {
        match self.previous_leg_index(index) {
            Some(previous) => pos.distance_to_segment(self.legs[previous].get_position(), self.legs[index].get_position()),
            None => LineDistance {
                status: LineStatus::Invalid,
                distance: pos.distance_to(self.legs[index].get_position()),
            },
        }
    }

    /// Nearest leg that is not part of a procedure.
    pub fn nearest_route_leg(&self, pos: &Coordinate) -> Option<(usize, LineDistance)> {
        let mut nearest: Option<(usize, LineDistance)> = None;
        for i in 1..self.legs.len() {
            if self.legs[i].is_procedure() {
                continue;
            }
            let result = self.leg_distance(i, pos);
            if nearest.is_none_or(|(_, best)| result.distance < best.distance) {
                nearest = Some((i, result));
            }
        }
        nearest
    }

    /// Where to insert a new waypoint. With a leg index the waypoint goes after that leg,
    /// otherwise next to the nearest route leg.
    pub fn calculate_insert_index(&self, pos: &Coordinate, leg_index: Option<usize>) -> usize {
        let size = self.legs.len();
        if let Some(index) = leg_index {
            return (index + 1).min(size);
        }
        if self.flightplan.is_empty() {
            return 0;
        }
        if self.flightplan.len() == 1 {
            return 1;
        }
        match self.nearest_route_leg(pos) {
            None => 0,
            Some((index, result)) => match result.status {
                LineStatus::Invalid => 0,
                LineStatus::AlongTrack => index,
                LineStatus::BeforeStart if index == 1 => 0,
                LineStatus::BeforeStart => index,
                LineStatus::AfterEnd if index == size - 1 => index + 1,
                LineStatus::AfterEnd => index,
            },
        }
    }

    pub fn get_active_leg(&self) -> Option<usize> {
        self.active_leg
    }

    pub fn get_active_pos(&self) -> Option<&Coordinate> {
        self.active_pos.as_ref()
    }

    /// Sets the active leg. Leg zero is never active.
    pub fn set_active_leg(&mut self, index: usize) {
        if self.legs.len() > 1 && index < self.legs.len() {
            self.active_leg = Some(index.max(1));
        }
    }

    pub fn reset_active_leg(&mut self) {
        self.active_leg = None;
    }

    /// Moves the active leg to the leg nearest `pos`, never backwards. Missed approach legs
    /// only qualify once the aircraft has passed the end of the approach.
    /// Returns true if the active leg changed.
    pub fn update_active_leg_and_pos(&mut self, pos: &Coordinate) -> bool {
        let old = self.active_leg;
        self.active_pos = Some(*pos);
        let size = self.legs.len();
        if size < 2 {
            self.active_leg = None;
            return old.is_some();
        }

        let start = old.unwrap_or(1).clamp(1, size - 1);
        let missed_allowed = if self.legs[start].is_missed() {
            true
        } else {
            match self.legs.iter().position(|l| l.is_missed()) {
                Some(first_missed) if first_missed >= 2 => {
                    let last_approach = first_missed - 1;
                    start >= last_approach
                        && self.leg_distance(last_approach, pos).status == LineStatus::AfterEnd
                }
                _ => false,
            }
        };

        let mut best = start;
        let mut best_distance = self.leg_distance(start, pos).distance;
        for i in start + 1..size {
            if self.legs[i].is_missed() && !missed_allowed {
                continue;
            }
            let distance = self.leg_distance(i, pos).distance;
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }

        self.active_leg = Some(best);
        if old != self.active_leg {
            info!("Active leg changed to {}", best);
            true
        } else {
            false
        }
    }

    /// Recomputes the active leg from scratch for the last known position.
    pub fn refresh_active_leg(&mut self) -> bool {
        match self.active_pos {
            Some(pos) => {
                let old = self.active_leg;
                self.active_leg = None;
                self.update_active_leg_and_pos(&pos);
                old != self.active_leg
            }
            None => false,
        }
    }

    /// Next free number for user waypoints named `WP<n>`.
    pub fn next_user_waypoint_number(&self) -> u32 {
        let Some(regex) = USER_WAYPOINT.as_ref() else {
            return 1;
        };
        self.flightplan
            .entries()
            .iter()
            .filter(|e| e.get_waypoint_type() == WaypointType::User)
            .filter_map(|e| regex.captures(e.get_ident()))
            .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
            .max()
            .map(|n| n + 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::flightplan::{FlightRules, Flightplan, FlightplanEntry, RouteType, WaypointType};
    use crate::model::procedure::{ProcedureKind, ProcedureRef, ProcedureTypes};
    use crate::model::test_utils::tests::{entry, make_context, make_procedures, user_entry};
    use crate::route::procedures::{APPROACH_NO_MISSED, ProcedureStore, STAR};

    use super::Route;

    fn make_route(idents: &[(&str, WaypointType)]) -> Route {
        let mut plan = Flightplan::new();
        for (ident, kind) in idents {
            plan.push(entry(ident, *kind));
        }
        plan.update_departure_and_destination();
        Route::from_flightplan(plan)
    }

    fn kjfk_kbos() -> Route {
        make_route(&[
            ("KJFK", WaypointType::Airport),
            ("DPK", WaypointType::Vor),
            ("BDR", WaypointType::Vor),
            ("HFD", WaypointType::Vor),
            ("KBOS", WaypointType::Airport),
        ])
    }

    fn attach(route: &mut Route, kind: ProcedureKind, airport: &str, procedure: ProcedureRef) {
        let legs = make_procedures().resolve(airport, kind, &procedure);
        match kind {
            ProcedureKind::Sid => route.set_departure_procedure_legs(legs),
            ProcedureKind::Star => route.set_star_procedure_legs(legs),
            ProcedureKind::Approach => route.set_arrival_procedure_legs(legs),
        }
    }

    #[test]
    fn test_update_all() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        route.update_all(&ctx);

        assert_eq!(route.len(), route.flightplan().len());
        assert!(route.is_valid(), "{:?}", route.errors());
        assert_eq!(route.leg(0).map(|l| l.get_distance_to()), Some(0.0));
        let sum: f64 = route.legs().iter().map(|l| l.get_distance_to()).sum();
        assert!((route.get_total_distance() - sum).abs() < 0.001);
        assert_eq!(route.get_altitude().len(), route.len());
    }

    #[test]
    fn test_update_all_idempotent() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        attach(&mut route, ProcedureKind::Sid, "KJFK", ProcedureRef::new("DEEZZ5", "31L", ""));
        attach(&mut route, ProcedureKind::Approach, "KBOS", ProcedureRef::new("I04R", "04R", "GLYDE"));
        route.update_all(&ctx);
        let legs = route.legs().to_vec();
        let plan = route.flightplan().clone();

        route.update_all(&ctx);
        assert_eq!(route.legs(), legs.as_slice());
        assert_eq!(route.flightplan(), &plan);
    }

    #[test]
    fn test_invalid_waypoint_kept() {
        let ctx = make_context();
        let mut route = make_route(&[
            ("KJFK", WaypointType::Airport),
            ("NOWHERE", WaypointType::Vor),
            ("KBOS", WaypointType::Airport),
        ]);
        route.update_all(&ctx);
        assert_eq!(route.len(), 3);
        assert!(!route.leg(1).is_some_and(|l| l.is_valid()));
        assert!(!route.is_valid());
        assert!(route.errors().iter().any(|e| e.contains("NOWHERE")));
    }

    #[test]
    fn test_airway_validation() {
        let ctx = make_context();
        let mut plan = Flightplan::new();
        plan.push(entry("KJFK", WaypointType::Airport));
        plan.push(entry("DPK", WaypointType::Vor));
        plan.push(entry("BDR", WaypointType::Vor).with_airway("V1"));
        plan.push(entry("HFD", WaypointType::Vor).with_airway("J79"));
        plan.push(entry("KBOS", WaypointType::Airport));
        plan.set_cruise_altitude(7000);
        let mut route = Route::from_flightplan(plan);
        route.update_all(&ctx);

        assert!(route.leg(2).is_some_and(|l| l.is_airway_valid() && l.get_airway().is_some()));
        assert!(route.leg(3).is_some_and(|l| !l.is_airway_valid()));
        assert!(route.errors().iter().any(|e| e == "Airway J79 invalid between leg 2 and 3"));
    }

    #[test]
    fn test_procedures_spliced() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        attach(&mut route, ProcedureKind::Sid, "KJFK", ProcedureRef::new("DEEZZ5", "31L", ""));
        attach(&mut route, ProcedureKind::Star, "KBOS", ProcedureRef::new("GLYDE1", "", ""));
        attach(&mut route, ProcedureKind::Approach, "KBOS", ProcedureRef::new("I04R", "04R", ""));
        route.update_all(&ctx);

        let sid = route.get_departure_legs().map(|l| l.len()).unwrap_or(0);
        let star = route.get_star_legs().map(|l| l.len()).unwrap_or(0);
        let approach = route.get_arrival_legs().map(|l| l.len()).unwrap_or(0);
        assert_eq!(route.len(), 5 + sid + star + approach);
        assert_eq!(route.len(), route.flightplan().len());

        // Departure prefix after the first leg
        for i in 1..=sid {
            assert!(route.legs()[i].get_procedure_type().intersects(ProcedureTypes::DEPARTURE));
        }
        // Arrival suffix before the last leg
        let last = route.len() - 1;
        for i in last - star - approach..last {
            assert!(route.legs()[i].get_procedure_type().intersects(ProcedureTypes::ARRIVAL_ALL));
        }
        assert!(route.legs()[last].is_route());
        assert_eq!(route.start_index_after_procedure(), sid);
        assert_eq!(route.destination_index_before_procedure(), last - star - approach);

        // Missed legs add no distance
        let without_missed: f64 = route
            .legs()
            .iter()
            .filter(|l| !l.is_missed())
            .map(|l| l.get_distance_to())
            .sum();
        assert!((route.get_total_distance() - without_missed).abs() < 0.001);

        // Procedure entries are never saved
        let mut saved = route.flightplan().clone();
        saved.remove_no_save_entries();
        assert_eq!(saved.len(), 5);
    }

    #[test]
    fn test_remove_procedure_legs() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        attach(&mut route, ProcedureKind::Star, "KBOS", ProcedureRef::new("GLYDE1", "", "PUT"));
        attach(&mut route, ProcedureKind::Approach, "KBOS", ProcedureRef::new("I04R", "04R", "GLYDE"));
        route.flightplan_mut().set_property(STAR, "GLYDE1");
        route.update_all(&ctx);

        route.remove_procedure_legs(ProcedureTypes::STAR_TRANSITION);
        assert!(route.get_star_legs().is_some_and(|l| l.transition_legs.is_empty()));

        route.remove_procedure_legs(ProcedureTypes::MISSED);
        assert!(route.get_arrival_legs().is_some_and(|l| !l.has_missed()));
        assert_eq!(route.flightplan().get_property(APPROACH_NO_MISSED), Some("true"));

        route.remove_procedure_legs(ProcedureTypes::ARRIVAL_ALL);
        assert!(route.get_star_legs().is_none());
        assert!(route.get_arrival_legs().is_none());
        assert!(route.flightplan().get_property(STAR).is_none());
        assert!(route.flightplan().get_property(APPROACH_NO_MISSED).is_none());

        route.update_all(&ctx);
        assert_eq!(route.len(), 5);
    }

    #[test]
    fn test_affected_procedures() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        attach(&mut route, ProcedureKind::Sid, "KJFK", ProcedureRef::new("DEEZZ5", "31L", ""));
        attach(&mut route, ProcedureKind::Approach, "KBOS", ProcedureRef::new("I04R", "04R", "GLYDE"));
        route.update_all(&ctx);

        assert_eq!(route.affected_procedures(&[0]), ProcedureTypes::DEPARTURE);
        assert_eq!(route.affected_procedures(&[1]), ProcedureTypes::DEPARTURE);
        let last = route.len() - 1;
        assert_eq!(route.affected_procedures(&[last]), ProcedureTypes::ARRIVAL_ALL);

        let transition = route
            .legs()
            .iter()
            .position(|l| l.get_procedure_type() == ProcedureTypes::TRANSITION)
            .unwrap_or(0);
        assert_eq!(route.affected_procedures(&[transition]), ProcedureTypes::TRANSITION);

        let missed = route.legs().iter().position(|l| l.is_missed()).unwrap_or(0);
        assert_eq!(route.affected_procedures(&[missed]), ProcedureTypes::ARRIVAL);

        let enroute = route.start_index_after_procedure() + 1;
        assert!(route.affected_procedures(&[enroute]).is_empty());
    }

    #[test]
    fn test_remove_duplicates() {
        let ctx = make_context();
        let mut route = make_route(&[
            ("KJFK", WaypointType::Airport),
            ("DPK", WaypointType::Vor),
            ("DPK", WaypointType::Vor),
            ("BDR", WaypointType::Vor),
            ("BDR", WaypointType::Vor),
            ("KBOS", WaypointType::Airport),
        ]);
        if let Some(e) = route.flightplan_mut().entry_mut(2) {
            e.set_airway("X1");
        }
        route.update_all(&ctx);

        assert_eq!(route.remove_duplicate_route_legs(), 2);
        let idents: Vec<&str> = route.legs().iter().map(|l| l.get_ident()).collect();
        assert_eq!(idents, vec!["KJFK", "DPK", "BDR", "KBOS"]);
        assert_eq!(route.len(), route.flightplan().len());

        let legs = route.legs().to_vec();
        assert_eq!(route.remove_duplicate_route_legs(), 0);
        assert_eq!(route.legs(), legs.as_slice());
    }

    #[test]
    fn test_duplicate_next_to_procedure_removes_route_leg() {
        let ctx = make_context();
        // The STAR starts at PUT with its transition
        let mut route = make_route(&[
            ("KJFK", WaypointType::Airport),
            ("HFD", WaypointType::Vor),
            ("PUT", WaypointType::Vor),
            ("KBOS", WaypointType::Airport),
        ]);
        attach(&mut route, ProcedureKind::Star, "KBOS", ProcedureRef::new("GLYDE1", "", "PUT"));
        route.update_all(&ctx);
        let size = route.len();

        assert_eq!(route.remove_duplicate_route_legs(), 1);
        assert_eq!(route.len(), size - 1);
        assert!(route.legs().iter().filter(|l| l.get_ident() == "PUT").all(|l| l.is_procedure()));

        route.update_all(&ctx);
        assert_eq!(route.len(), size - 1);
    }

    #[test]
    fn test_insert_index() {
        let ctx = make_context();
        let mut route = Route::new();
        route.update_all(&ctx);
        let pos = Coordinate::new(41.0, -73.0);
        assert_eq!(route.calculate_insert_index(&pos, None), 0);

        let mut route = make_route(&[("KJFK", WaypointType::Airport)]);
        route.update_all(&ctx);
        assert_eq!(route.calculate_insert_index(&pos, None), 1);

        let mut route = kjfk_kbos();
        route.update_all(&ctx);
        // Abeam the DPK - BDR leg
        assert_eq!(route.calculate_insert_index(&Coordinate::new(41.0, -73.25), None), 2);
        // Behind the departure
        assert_eq!(route.calculate_insert_index(&Coordinate::new(40.2, -74.5), None), 0);
        // Beyond the destination
        assert_eq!(route.calculate_insert_index(&Coordinate::new(42.8, -70.4), None), 5);
        assert_eq!(route.calculate_insert_index(&pos, Some(2)), 3);
    }

    #[test]
    fn test_active_leg_never_regresses() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        route.update_all(&ctx);
        assert_eq!(route.get_active_leg(), None);

        // Near DPK - BDR
        assert!(route.update_active_leg_and_pos(&Coordinate::new(41.0, -73.2)));
        assert_eq!(route.get_active_leg(), Some(2));

        // Back at JFK, still on leg 2
        assert!(!route.update_active_leg_and_pos(&Coordinate::new(40.64, -73.77)));
        assert_eq!(route.get_active_leg(), Some(2));

        assert!(route.update_active_leg_and_pos(&Coordinate::new(42.2, -71.3)));
        assert_eq!(route.get_active_leg(), Some(4));

        route.reset_active_leg();
        route.set_active_leg(0);
        assert_eq!(route.get_active_leg(), Some(1));
    }

    #[test]
    fn test_active_leg_skips_missed() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        attach(&mut route, ProcedureKind::Approach, "KBOS", ProcedureRef::new("I04R", "04R", ""));
        route.update_all(&ctx);
        let first_missed = route.legs().iter().position(|l| l.is_missed()).unwrap_or(0);
        assert!(first_missed > 0);

        // Over the missed approach fix but still on the approach
        let missed_fix = *route.legs()[first_missed].get_position();
        route.set_active_leg(first_missed - 2);
        route.update_active_leg_and_pos(&missed_fix);
        assert!(!route.legs()[route.get_active_leg().unwrap_or(0)].is_missed());
    }

    #[test]
    fn test_adjust_altitude() {
        let ctx = make_context();
        let mut route = kjfk_kbos();
        route.update_all(&ctx);
        // KJFK to KBOS is eastbound
        assert_eq!(route.adjusted_altitude(6000), 7000);
        assert_eq!(route.adjusted_altitude(7000), 7000);

        route.flightplan_mut().set_flight_rules(FlightRules::Vfr);
        assert_eq!(route.adjusted_altitude(6000), 7500);

        let mut reverse = make_route(&[("KBOS", WaypointType::Airport), ("KJFK", WaypointType::Airport)]);
        reverse.update_all(&ctx);
        assert_eq!(reverse.adjusted_altitude(6500), 8000);
    }

    #[test]
    fn test_update_airways_and_altitude() {
        let ctx = make_context();
        let mut plan = Flightplan::new();
        plan.push(entry("KJFK", WaypointType::Airport));
        plan.push(entry("DPK", WaypointType::Vor));
        plan.push(entry("MERIT", WaypointType::Waypoint).with_airway("J79"));
        plan.push(entry("KBOS", WaypointType::Airport));
        plan.set_cruise_altitude(5000);
        plan.set_route_type(RouteType::LowAltitude);
        let mut route = Route::from_flightplan(plan);
        route.update_all(&ctx);

        route.update_airways_and_altitude(&ctx, false, false);
        assert_eq!(route.flightplan().get_cruise_altitude(), 5000);

        route.update_airways_and_altitude(&ctx, true, true);
        assert_eq!(route.flightplan().get_cruise_altitude(), 19000);
        assert_eq!(route.flightplan().get_route_type(), RouteType::HighAltitude);
    }

    #[test]
    fn test_next_user_waypoint_number() {
        let mut plan = Flightplan::new();
        assert_eq!(Route::from_flightplan(plan.clone()).next_user_waypoint_number(), 1);
        plan.push(user_entry("WP3", 41.0, -73.0));
        plan.push(user_entry("WP12", 41.1, -73.0));
        plan.push(user_entry("HOME", 41.2, -73.0));
        plan.push(FlightplanEntry::new("WP99", "K6", WaypointType::Waypoint, Coordinate::new(41.3, -73.0)));
        assert_eq!(Route::from_flightplan(plan).next_user_waypoint_number(), 13);
    }

    #[test]
    fn test_empty_and_single_entry() {
        let ctx = make_context();
        let mut route = Route::new();
        route.update_all(&ctx);
        route.update_airways_and_altitude(&ctx, true, true);
        assert!(route.is_empty());
        assert_eq!(route.remove_duplicate_route_legs(), 0);
        assert!(!route.update_active_leg_and_pos(&Coordinate::new(40.0, -73.0)));

        let mut route = make_route(&[("KJFK", WaypointType::Airport)]);
        attach(&mut route, ProcedureKind::Star, "KBOS", ProcedureRef::new("GLYDE1", "", ""));
        route.update_all(&ctx);
        assert_eq!(route.len(), 1);
        assert_eq!(route.get_total_distance(), 0.0);
    }
}
