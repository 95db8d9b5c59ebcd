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

use log::{debug, info, warn};

use crate::earth::NavDataProvider;
use crate::earth::coordinate::Coordinate;
use crate::event::{Event, EventManager};
use crate::model::aircraft::Aircraft;
use crate::model::airport::Airport;
use crate::model::flightplan::{FlightRules, Flightplan, FlightplanEntry, RouteType, WaypointType};
use crate::model::procedure::{ProcedureKind, ProcedureRef, ProcedureTypes};
use crate::model::waypoint::Waypoint;
use crate::planner::network::{AirwayNetwork, NetworkMode, RadioNetwork, RouteNetwork};
use crate::planner::route_finder::{RouteEntry, RouteFinder};
use crate::preference::RouteOptions;

use super::RouteContext;
use super::error::RouteError;
use super::procedures::{
    APPROACH, APPROACH_NO_MISSED, APPROACH_RUNWAY, ProcedureStore, SID, SID_RUNWAY, SID_TRANSITION, STAR,
    STAR_RUNWAY, STAR_TRANSITION, TRANSITION, set_procedure_properties,
};
use super::route::Route;
use super::undo::{RouteCmdType, RouteCommand, UndoLog};

/// Loads and saves flight plans in some external format.
pub trait FlightplanIo {
    fn load(&mut self, name: &str) -> Result<Flightplan, RouteError>;
    fn save(&mut self, name: &str, flightplan: &Flightplan) -> Result<(), RouteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Calculation {
    RadioNav,
    HighAltitude,
    LowAltitude,
    SetAltitude,
}

/// Owns the route and funnels every edit through an undo bracket.
pub struct RouteController {
    route: Route,
    undo: UndoLog,
    ctx: RouteContext,
    radio_network: RadioNetwork,
    airway_network: AirwayNetwork,
    events: Arc<EventManager>,
    io: Option<Box<dyn FlightplanIo>>,
    file_name: Option<String>,
}

impl RouteController {
    pub fn new(ctx: RouteContext, events: Arc<EventManager>) -> Self {
        let radio_network = RadioNetwork::new(ctx.nav.clone(), ctx.options.radio_hop_range);
        let airway_network = AirwayNetwork::new(
            ctx.nav.clone(),
            NetworkMode::AIRWAY,
            ctx.options.airway_connect_range,
            ctx.options.radio_hop_range,
        );
        let undo = UndoLog::new(ctx.options.undo_limit, ctx.options.undo_merge);
        let mut route = Route::new();
        route.update_all(&ctx);
        Self {
            route,
            undo,
            ctx,
            radio_network,
            airway_network,
            events,
            io: None,
            file_name: None,
        }
    }

    pub fn with_io(mut self, io: Box<dyn FlightplanIo>) -> Self {
        self.io = Some(io);
        self
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn flightplan(&self) -> &Flightplan {
        self.route.flightplan()
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    pub fn context(&self) -> &RouteContext {
        &self.ctx
    }

    pub fn get_file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn has_changed(&self) -> bool {
        self.undo.has_changed()
    }

    pub fn set_options(&mut self, options: RouteOptions) {
        self.undo.set_limit(options.undo_limit);
        self.undo.set_merge(options.undo_merge);
        self.radio_network.set_hop_range(options.radio_hop_range);
        self.airway_network
            .set_ranges(options.airway_connect_range, options.radio_hop_range);
        self.ctx.options = options;
        self.route.update_all(&self.ctx);
        self.notify_changed(false, false);
    }

    pub fn set_aircraft(&mut self, aircraft: Arc<Aircraft>) {
        info!("Using aircraft {}", aircraft.get_name());
        self.ctx.aircraft = aircraft;
        self.route.update_all(&self.ctx);
        self.notify_changed(false, false);
    }

    fn notify(&self, event: Event) {
        self.events.notify_listeners(event);
    }

    fn notify_changed(&self, geometry_changed: bool, new_plan: bool) {
        self.notify(Event::RouteChanged {
            geometry_changed,
            new_plan,
        });
    }

    fn pre_change(&self, text: &str, cmd_type: RouteCmdType) -> RouteCommand {
        RouteCommand::new(text, cmd_type, self.route.flightplan())
    }

    fn post_change(&mut self, mut command: RouteCommand) {
        command.set_after(self.route.flightplan());
        self.undo.push(command);
    }

    /// Recomputes after an edit and keeps the active leg in range. Only route calculations
    /// may switch between low and high altitude route types.
    fn update_after_edit(&mut self, adjust_altitude: bool, adjust_type: bool) {
        self.route.flightplan_mut().update_departure_and_destination();
        self.route
            .update_airways_and_altitude(&self.ctx, adjust_altitude, adjust_type);
        if self.route.refresh_active_leg() {
            self.notify(Event::ActiveLegChanged(self.route.get_active_leg()));
        }
    }

    /// Index of the `saved`-th entry that is not a procedure entry.
    fn saved_entry_index(&self, saved: usize) -> usize {
        self.route
            .flightplan()
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_no_save())
            .nth(saved)
            .map(|(i, _)| i)
            .unwrap_or(saved)
    }

    fn check_index(&self, index: usize) -> Result<(), RouteError> {
        if index < self.route.len() {
            Ok(())
        } else {
            Err(RouteError::IndexOutOfRange {
                index,
                size: self.route.len(),
            })
        }
    }

    fn load_procedures_from_properties(&mut self) {
        let plan = self.route.flightplan();
        let airport_ident = |entry: Option<&FlightplanEntry>| {
            entry
                .filter(|e| e.get_waypoint_type() == WaypointType::Airport)
                .map(|e| e.get_ident().to_string())
        };
        let departure = airport_ident(plan.first());
        let destination = if plan.len() > 1 { airport_ident(plan.last()) } else { None };
        let set = self
            .ctx
            .procedures
            .legs_for_properties(plan.properties(), departure.as_deref(), destination.as_deref());
        self.route.set_departure_procedure_legs(set.departure);
        self.route.set_star_procedure_legs(set.star);
        self.route.set_arrival_procedure_legs(set.arrival);
        self.route.set_procedure_errors(set.errors);
    }

    /// Replaces the route with a stored plan. Procedures are rebuilt from its properties.
    fn replay(&mut self, flightplan: Flightplan) {
        self.route.set_flightplan(flightplan);
        self.load_procedures_from_properties();
        self.route.update_airways_and_altitude(&self.ctx, false, false);
        if self.route.refresh_active_leg() {
            self.notify(Event::ActiveLegChanged(self.route.get_active_leg()));
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some(flightplan) => {
                self.replay(flightplan);
                self.notify_changed(true, false);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(flightplan) => {
                self.replay(flightplan);
                self.notify_changed(true, false);
                true
            }
            None => false,
        }
    }

    pub fn new_flightplan(&mut self) {
        info!("New flight plan");
        self.route = Route::new();
        self.route.update_all(&self.ctx);
        self.undo.clear();
        self.file_name = None;
        self.notify_changed(true, true);
    }

    /// Takes over an already loaded plan. `changed` marks it as not saved.
    pub fn set_flightplan(&mut self, flightplan: Flightplan, changed: bool) {
        let mut route = Route::from_flightplan(flightplan);
        route.flightplan_mut().remove_no_save_entries();
        route.flightplan_mut().update_departure_and_destination();
        self.route = route;
        self.load_procedures_from_properties();
        self.route.update_all(&self.ctx);
        self.undo.clear();
        if changed {
            self.undo.set_unclean();
        }
        self.notify_changed(true, true);
    }

    pub fn load_flightplan(&mut self, name: &str, changed: bool) -> Result<(), RouteError> {
        let io = self.io.as_mut().ok_or(RouteError::NoStorage)?;
        let flightplan = io.load(name)?;
        info!("Loaded flight plan {} with {} entries", name, flightplan.len());
        self.set_flightplan(flightplan, changed);
        self.file_name = Some(name.to_string());
        Ok(())
    }

    pub fn save_flightplan(&mut self) -> Result<(), RouteError> {
        let name = self.file_name.clone().ok_or(RouteError::NoFileName)?;
        self.save_flightplan_as(&name)
    }

    /// Saves without procedure entries. Nothing changes if the save fails.
    pub fn save_flightplan_as(&mut self, name: &str) -> Result<(), RouteError> {
        let io = self.io.as_mut().ok_or(RouteError::NoStorage)?;
        let mut flightplan = self.route.flightplan().clone();
        flightplan.remove_no_save_entries();
        io.save(name, &flightplan)?;
        info!("Saved flight plan {}", name);
        self.file_name = Some(name.to_string());
        self.undo.set_clean();
        Ok(())
    }

    fn airport(&self, ident: &str) -> Result<Arc<Airport>, RouteError> {
        self.ctx
            .nav
            .airport(ident)
            .ok_or_else(|| RouteError::UnknownAirport(ident.to_string()))
    }

    fn set_departure_internal(&mut self, airport: Arc<Airport>) {
        let entry = Waypoint::Airport { airport }.to_entry();
        let flightplan = self.route.flightplan_mut();
        let replace = flightplan.len() > 1
            && flightplan.first().is_some_and(|first| {
                first.get_waypoint_type() == WaypointType::Airport
                    && first.get_ident() == flightplan.get_departure_ident()
            });
        if replace {
            flightplan.remove(0);
        }
        flightplan.insert(0, entry);
        flightplan.erase_airway(1);
        flightplan.update_departure_and_destination();
    }

    fn set_destination_internal(&mut self, airport: Arc<Airport>) {
        let entry = Waypoint::Airport { airport }.to_entry();
        let flightplan = self.route.flightplan_mut();
        let replace = flightplan.len() > 1
            && flightplan.last().is_some_and(|last| {
                last.get_waypoint_type() == WaypointType::Airport
                    && last.get_ident() == flightplan.get_destination_ident()
            });
        if replace {
            flightplan.remove(flightplan.len() - 1);
        }
        flightplan.push(entry);
        flightplan.update_departure_and_destination();
    }

    pub fn set_departure(&mut self, ident: &str) -> Result<(), RouteError> {
        let airport = self.airport(ident)?;
        let command = self.pre_change("Set Departure", RouteCmdType::Edit);
        self.route.remove_procedure_legs(ProcedureTypes::DEPARTURE);
        self.set_departure_internal(airport);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    pub fn set_destination(&mut self, ident: &str) -> Result<(), RouteError> {
        let airport = self.airport(ident)?;
        let command = self.pre_change("Set Destination", RouteCmdType::Edit);
        self.route.remove_procedure_legs(ProcedureTypes::ARRIVAL_ALL);
        self.set_destination_internal(airport);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    /// Adds a waypoint after `leg_index` or next to the nearest leg. Returns the index of the
    /// new leg once procedures touched by the insert are gone.
    pub fn route_add(&mut self, waypoint: &Waypoint, leg_index: Option<usize>) -> usize {
        let command = self.pre_change("Add Waypoint", RouteCmdType::Edit);
        let insert = self.route.calculate_insert_index(waypoint.get_loc(), leg_index);
        let affected = self.route.affected_procedures(&[insert]);

        let flightplan = self.route.flightplan_mut();
        let saved_before = flightplan
            .entries()
            .iter()
            .take(insert)
            .filter(|e| !e.is_no_save())
            .count();
        flightplan.insert(insert, waypoint.to_entry());
        flightplan.erase_airway(insert);
        flightplan.erase_airway(insert + 1);
        debug!("Added {} at {}", waypoint.get_id(), insert);

        self.route.remove_procedure_legs(affected);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        self.saved_entry_index(saved_before)
    }

    /// Adds a user waypoint named with the next free `WP<n>` number.
    pub fn route_add_user(&mut self, position: Coordinate, leg_index: Option<usize>) -> usize {
        let waypoint = Waypoint::User {
            id: format!("WP{}", self.route.next_user_waypoint_number()),
            loc: position,
        };
        self.route_add(&waypoint, leg_index)
    }

    pub fn route_replace(&mut self, waypoint: &Waypoint, index: usize) -> Result<(), RouteError> {
        self.check_index(index)?;
        let command = self.pre_change("Change Waypoint", RouteCmdType::Edit);
        let affected = self.route.affected_procedures(&[index]);

        let flightplan = self.route.flightplan_mut();
        flightplan.replace(index, waypoint.to_entry());
        flightplan.erase_airway(index);
        flightplan.erase_airway(index + 1);

        self.route.remove_procedure_legs(affected);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    /// Deletes legs. The airways of the legs following each deleted one are cleared.
    pub fn route_delete(&mut self, indexes: &[usize]) -> Result<(), RouteError> {
        for index in indexes {
            self.check_index(*index)?;
        }
        let mut indexes = indexes.to_vec();
        indexes.sort_unstable_by(|a, b| b.cmp(a));
        indexes.dedup();
        if indexes.is_empty() {
            return Ok(());
        }

        let affected = self.route.affected_procedures(&indexes);
        // Procedure deletes never merge with waypoint deletes
        let cmd_type = if affected.intersects(ProcedureTypes::ALL) {
            RouteCmdType::Edit
        } else {
            RouteCmdType::Delete
        };
        let command = self.pre_change("Delete", cmd_type);
        let flightplan = self.route.flightplan_mut();
        for index in &indexes {
            flightplan.remove(*index);
            flightplan.erase_airway(*index);
        }
        debug!("Deleted legs {:?}", indexes);

        self.route.remove_procedure_legs(affected);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    /// Moves the legs at `indexes` by `delta` positions. Legs hitting either end stop there.
    pub fn move_legs(&mut self, indexes: &[usize], delta: isize) -> Result<(), RouteError> {
        for index in indexes {
            self.check_index(*index)?;
        }
        if delta == 0 || indexes.is_empty() {
            return Ok(());
        }
        let mut indexes = indexes.to_vec();
        if delta < 0 {
            indexes.sort_unstable();
        } else {
            indexes.sort_unstable_by(|a, b| b.cmp(a));
        }
        indexes.dedup();

        let command = self.pre_change("Move", RouteCmdType::Move);
        let size = self.route.len();
        let targets: Vec<usize> = indexes
            .iter()
            .map(|i| (*i as isize + delta).clamp(0, size as isize - 1) as usize)
            .collect();
        let touched: Vec<usize> = indexes.iter().chain(targets.iter()).copied().collect();
        let affected = self.route.affected_procedures(&touched);

        let flightplan = self.route.flightplan_mut();
        for (from, to) in indexes.iter().zip(targets.iter()) {
            flightplan.move_entry(*from, *to);
            for index in [*from, *from + 1, *to, *to + 1] {
                flightplan.erase_airway(index);
            }
        }

        self.route.remove_procedure_legs(affected);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    pub fn set_cruise_altitude(&mut self, altitude: i32) {
        let command = self.pre_change("Change Altitude", RouteCmdType::Altitude);
        self.route.flightplan_mut().set_cruise_altitude(altitude);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify(Event::RouteAltitudeChanged(self.route.flightplan().get_cruise_altitude()));
        self.notify_changed(false, false);
    }

    /// Raises the cruise altitude to the next valid level for the route direction.
    pub fn adjust_altitude(&mut self) {
        let command = self.pre_change("Adjust Altitude", RouteCmdType::Altitude);
        self.update_after_edit(true, false);
        self.post_change(command);
        self.notify(Event::RouteAltitudeChanged(self.route.flightplan().get_cruise_altitude()));
        self.notify_changed(false, false);
    }

    pub fn set_flight_rules(&mut self, rules: FlightRules) {
        let command = self.pre_change("Change Flight Rules", RouteCmdType::Edit);
        self.route.flightplan_mut().set_flight_rules(rules);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(false, false);
    }

    pub fn set_route_type(&mut self, route_type: RouteType) {
        let command = self.pre_change("Change Type", RouteCmdType::Edit);
        self.route.flightplan_mut().set_route_type(route_type);
        self.route.update_all(&self.ctx);
        self.post_change(command);
        self.notify_changed(false, false);
    }

    /// Reverses the route. All procedures are dropped.
    pub fn reverse_route(&mut self) {
        let command = self.pre_change("Reverse Route", RouteCmdType::Reverse);
        self.route.remove_procedure_legs(ProcedureTypes::ALL);
        let flightplan = self.route.flightplan_mut();
        flightplan.remove_no_save_entries();
        flightplan.reverse();
        self.update_after_edit(false, false);
        self.route.reset_active_leg();
        self.post_change(command);
        self.notify_changed(true, false);
    }

    /// Attaches a procedure published for the airport known to the navigation data as
    /// `airport_ident`. The departure or destination is replaced if it is a different airport.
    pub fn route_attach_procedure(&mut self, kind: ProcedureKind, airport_ident: &str, procedure: &ProcedureRef) -> bool {
        let legs = self
            .ctx
            .procedures
            .airport_ident_for(airport_ident)
            .and_then(|ident| self.ctx.procedures.resolve(&ident, kind, procedure));
        let (Some(legs), Ok(airport)) = (legs, self.airport(airport_ident)) else {
            let message = format!("{} {} at {} not found", kind, procedure.ident, airport_ident);
            warn!("{}", message);
            self.notify(Event::StatusChange(message));
            return false;
        };

        let plan = self.route.flightplan();
        let is_airport = |e: &FlightplanEntry| {
            e.get_waypoint_type() == WaypointType::Airport && e.get_ident().eq_ignore_ascii_case(airport_ident)
        };
        let same_departure = plan.first().is_some_and(is_airport);
        let same_destination = plan.len() > 1 && plan.last().is_some_and(is_airport);

        let command = self.pre_change("Add Procedure", RouteCmdType::Edit);
        match kind {
            ProcedureKind::Sid => {
                self.route.remove_procedure_legs(ProcedureTypes::DEPARTURE);
                if !same_departure {
                    self.set_departure_internal(airport);
                }
                set_procedure_properties(self.route.flightplan_mut().properties_mut(), &legs);
                self.route.set_departure_procedure_legs(Some(legs));
            }
            ProcedureKind::Star | ProcedureKind::Approach => {
                self.route.remove_procedure_legs(ProcedureTypes::ARRIVAL_ALL);
                if !same_destination {
                    self.set_destination_internal(airport);
                }
                set_procedure_properties(self.route.flightplan_mut().properties_mut(), &legs);
                if kind == ProcedureKind::Star {
                    self.route.set_star_procedure_legs(Some(legs));
                } else {
                    self.route.set_arrival_procedure_legs(Some(legs));
                }
            }
        }
        self.route.set_procedure_errors(Vec::new());
        info!("Attached {} {} at {}", kind, procedure.ident, airport_ident);

        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        self.notify(Event::StatusChange("Added procedure to flight plan".to_string()));
        true
    }

    pub fn detach_procedure(&mut self, types: ProcedureTypes) {
        if types.is_empty() {
            return;
        }
        let command = self.pre_change("Delete Procedure", RouteCmdType::Edit);
        self.route.remove_procedure_legs(types);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
    }

    /// Inserts all entries of another plan before leg `before`, or appends them.
    /// Prepending takes over its departure procedure, appending its arrival procedures.
    pub fn insert_flightplan(&mut self, flightplan: Flightplan, before: Option<usize>) -> Result<(), RouteError> {
        let size = self.route.flightplan().len();
        let index = match before {
            Some(index) if index > size => return Err(RouteError::IndexOutOfRange { index, size }),
            Some(index) => index,
            None => size,
        };
        let mut inserted = flightplan;
        inserted.remove_no_save_entries();
        if inserted.is_empty() {
            return Ok(());
        }

        let command = self.pre_change("Insert", RouteCmdType::Edit);
        let mut types = self.route.affected_procedures(&[index]);
        let keys: &[&str] = if index == 0 {
            types |= ProcedureTypes::DEPARTURE;
            &[SID, SID_RUNWAY, SID_TRANSITION]
        } else if index == size {
            types |= ProcedureTypes::ARRIVAL_ALL;
            &[
                STAR,
                STAR_RUNWAY,
                STAR_TRANSITION,
                APPROACH,
                APPROACH_RUNWAY,
                TRANSITION,
                APPROACH_NO_MISSED,
            ]
        } else {
            &[]
        };
        self.route.remove_procedure_legs(types);

        let count = inserted.len();
        let target = self.route.flightplan_mut();
        for key in keys {
            if let Some(value) = inserted.get_property(key) {
                target.set_property(key, value);
            }
        }
        for (offset, entry) in inserted.entries().iter().enumerate() {
            target.insert(index + offset, entry.clone());
        }
        target.erase_airway(index);
        target.erase_airway(index + count);
        target.update_departure_and_destination();
        debug!("Inserted {} entries at {}", count, index);

        if !types.is_empty() {
            self.load_procedures_from_properties();
        }
        self.route.update_all(&self.ctx);
        self.route.remove_duplicate_route_legs();
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        Ok(())
    }

    /// Enroute part of a leg range. Procedures are never replaced.
    fn calculation_range(&self, range: Option<(usize, usize)>) -> Option<(usize, usize)> {
        if self.route.len() < 2 {
            return None;
        }
        let start = self.route.start_index_after_procedure();
        let end = self.route.destination_index_before_procedure();
        let (from, to) = match range {
            Some((from, to)) => (from.max(start), to.min(end)),
            None => (start, end),
        };
        (from < to).then_some((from, to))
    }

    /// Replaces all legs between the range ends with a direct connection.
    pub fn calculate_direct(&mut self, range: Option<(usize, usize)>) -> bool {
        let Some((from, to)) = self.calculation_range(range) else {
            return false;
        };
        let command = self.pre_change("Direct Calculation", RouteCmdType::Edit);
        let flightplan = self.route.flightplan_mut();
        flightplan.erase(from + 1, to);
        flightplan.erase_airway(from + 1);
        flightplan.set_route_type(RouteType::Direct);
        self.update_after_edit(false, false);
        self.post_change(command);
        self.notify_changed(true, false);
        true
    }

    pub fn calculate_radionav(&mut self, range: Option<(usize, usize)>) -> bool {
        self.calculate_route(Calculation::RadioNav, range)
    }

    pub fn calculate_high_alt(&mut self, range: Option<(usize, usize)>) -> bool {
        self.calculate_route(Calculation::HighAltitude, range)
    }

    pub fn calculate_low_alt(&mut self, range: Option<(usize, usize)>) -> bool {
        self.calculate_route(Calculation::LowAltitude, range)
    }

    /// Uses all airways open at the current cruise altitude.
    pub fn calculate_set_alt(&mut self, range: Option<(usize, usize)>) -> bool {
        self.calculate_route(Calculation::SetAltitude, range)
    }

    fn run_finder<N: RouteNetwork>(
        network: &mut N,
        options: &RouteOptions,
        start: &Coordinate,
        end: &Coordinate,
        altitude: i32,
    ) -> Option<Vec<RouteEntry>> {
        let mut finder = RouteFinder::new(network, options.max_distance_ratio);
        finder.set_prefer_vor_to_airway(options.prefer_vor);
        finder.set_prefer_ndb_to_airway(options.prefer_ndb);
        if finder.calculate_route(start, end, altitude) {
            let (entries, distance) = finder.extract_route();
            info!("Found route with {} waypoints and {:.0} NM", entries.len(), distance);
            Some(entries)
        } else {
            None
        }
    }

    fn calculate_route(&mut self, calculation: Calculation, range: Option<(usize, usize)>) -> bool {
        let Some((from, to)) = self.calculation_range(range) else {
            return false;
        };
        let start = *self.route.legs()[from].get_position();
        let end = *self.route.legs()[to].get_position();
        let cruise = self.route.flightplan().get_cruise_altitude();

        let (route_type, altitude, text) = match calculation {
            Calculation::RadioNav => (RouteType::Vor, 0, "Radionnav Flight Plan Calculation"),
            Calculation::HighAltitude => (RouteType::HighAltitude, 0, "High altitude Flight Plan Calculation"),
            Calculation::LowAltitude => (RouteType::LowAltitude, 0, "Low altitude Flight Plan Calculation"),
            Calculation::SetAltitude => {
                let route_type = if cruise >= self.ctx.options.high_altitude_threshold {
                    RouteType::HighAltitude
                } else {
                    RouteType::LowAltitude
                };
                (route_type, cruise, "Flight Plan Calculation at altitude")
            }
        };

        self.notify(Event::RouteCalcStarted);
        let result = match calculation {
            Calculation::RadioNav => {
                Self::run_finder(&mut self.radio_network, &self.ctx.options, &start, &end, altitude)
            }
            _ => {
                let mode = match calculation {
                    Calculation::HighAltitude => NetworkMode::JET,
                    Calculation::LowAltitude => NetworkMode::VICTOR,
                    _ => NetworkMode::AIRWAY,
                };
                self.airway_network.set_mode(mode);
                Self::run_finder(&mut self.airway_network, &self.ctx.options, &start, &end, altitude)
            }
        };

        let Some(entries) = result else {
            self.notify(Event::RouteCalcFinished { found: false });
            self.notify(Event::StatusChange("No route found".to_string()));
            return false;
        };

        let command = self.pre_change(text, RouteCmdType::Edit);
        let nav = self.ctx.nav.clone();
        let count = entries.len();
        let flightplan = self.route.flightplan_mut();
        flightplan.erase(from + 1, to);
        for (offset, route_entry) in entries.iter().enumerate() {
            let mut entry = route_entry.waypoint.to_entry();
            if let Some(airway) = route_entry.airway_id.and_then(|id| nav.airway_by_id(id)) {
                entry.set_airway(airway.get_name());
            }
            flightplan.insert(from + 1 + offset, entry);
        }
        flightplan.erase_airway(from + 1 + count);
        flightplan.set_route_type(route_type);

        self.route.update_all(&self.ctx);
        let removed = self.route.remove_duplicate_route_legs();
        if removed > 0 {
            debug!("Removed {} duplicate legs", removed);
        }
        let adjust_altitude = calculation != Calculation::RadioNav && calculation != Calculation::SetAltitude;
        self.update_after_edit(adjust_altitude, true);
        self.post_change(command);
        self.notify(Event::RouteCalcFinished { found: true });
        self.notify_changed(true, false);
        true
    }

    /// Returns true if the active leg changed.
    pub fn update_active_leg_and_pos(&mut self, position: &Coordinate) -> bool {
        let changed = self.route.update_active_leg_and_pos(position);
        if changed {
            self.notify(Event::ActiveLegChanged(self.route.get_active_leg()));
        }
        changed
    }

    pub fn set_active_leg(&mut self, index: usize) {
        let old = self.route.get_active_leg();
        self.route.set_active_leg(index);
        if old != self.route.get_active_leg() {
            self.notify(Event::ActiveLegChanged(self.route.get_active_leg()));
        }
    }

    pub fn reset_active_leg(&mut self) {
        self.route.reset_active_leg();
        self.notify(Event::ActiveLegChanged(None));
    }

    /// Drops all cached network state before the navigation data is replaced.
    pub fn pre_database_load(&mut self) {
        info!("Navigation data about to change");
        self.radio_network.clear();
        self.airway_network.clear();
    }

    /// Switches to new navigation data and procedures and rebuilds the route from its entries
    /// and procedure properties.
    pub fn post_database_load(&mut self, nav: Arc<dyn NavDataProvider>, procedures: Arc<dyn ProcedureStore>) {
        self.ctx.nav = nav;
        self.ctx.procedures = procedures;
        self.radio_network = RadioNetwork::new(self.ctx.nav.clone(), self.ctx.options.radio_hop_range);
        self.airway_network = AirwayNetwork::new(
            self.ctx.nav.clone(),
            NetworkMode::AIRWAY,
            self.ctx.options.airway_connect_range,
            self.ctx.options.radio_hop_range,
        );
        self.route.flightplan_mut().remove_no_save_entries();
        self.load_procedures_from_properties();
        self.route.update_airways_and_altitude(&self.ctx, false, false);
        self.route.refresh_active_leg();
        info!("Route rebuilt for new navigation data with {} errors", self.route.errors().len());
        self.notify_changed(true, false);
    }
}
