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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::earth::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WaypointType {
    Airport,
    Vor,
    Ndb,
    Waypoint,
    User,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RouteType {
    Direct,
    Vor,
    LowAltitude,
    HighAltitude,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlightRules {
    #[default]
    Ifr,
    Vfr,
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RouteType::Direct => "Direct",
            RouteType::Vor => "Radionav",
            RouteType::LowAltitude => "Low altitude",
            RouteType::HighAltitude => "High altitude",
            RouteType::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// One waypoint of a flight plan. The airway is the inbound airway from the previous entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightplanEntry {
    ident: String,
    region: String,
    waypoint_type: WaypointType,
    position: Coordinate,
    #[serde(default)]
    airway: String,
    #[serde(default)]
    name: String,
    // Procedure legs are carried in the plan while a route is live but are never persisted
    #[serde(skip)]
    no_save: bool,
}

impl FlightplanEntry {
    pub fn new(ident: &str, region: &str, waypoint_type: WaypointType, position: Coordinate) -> Self {
        Self {
            ident: ident.to_string(),
            region: region.to_string(),
            waypoint_type,
            position,
            airway: String::new(),
            name: String::new(),
            no_save: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_airway(mut self, airway: &str) -> Self {
        self.airway = airway.to_string();
        self
    }

    pub(crate) fn procedure(ident: &str, region: &str, waypoint_type: WaypointType, position: Coordinate) -> Self {
        Self {
            no_save: true,
            ..Self::new(ident, region, waypoint_type, position)
        }
    }

    pub fn get_ident(&self) -> &str {
        &self.ident
    }

    pub fn get_region(&self) -> &str {
        &self.region
    }

    pub fn get_waypoint_type(&self) -> WaypointType {
        self.waypoint_type
    }

    pub fn get_position(&self) -> &Coordinate {
        &self.position
    }

    pub fn get_airway(&self) -> &str {
        &self.airway
    }

    pub fn set_airway(&mut self, airway: &str) {
        self.airway = airway.to_string();
    }

    pub fn clear_airway(&mut self) {
        self.airway.clear();
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn is_no_save(&self) -> bool {
        self.no_save
    }
}

/// The persisted part of a route. Header fields plus the ordered entries and a property bag
/// that keeps procedure names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Flightplan {
    entries: Vec<FlightplanEntry>,
    departure_ident: String,
    departure_name: String,
    departure_position: Option<Coordinate>,
    destination_ident: String,
    destination_name: String,
    destination_position: Option<Coordinate>,
    cruise_altitude: i32,
    route_type: RouteType,
    flight_rules: FlightRules,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl Flightplan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FlightplanEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&FlightplanEntry> {
        self.entries.get(index)
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut FlightplanEntry> {
        self.entries.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&FlightplanEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&FlightplanEntry> {
        self.entries.last()
    }

    pub fn push(&mut self, entry: FlightplanEntry) {
        self.entries.push(entry);
    }

    /// Inserts at `index`, appending when the index is past the end.
    pub fn insert(&mut self, index: usize, entry: FlightplanEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    pub fn remove(&mut self, index: usize) -> Option<FlightplanEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn replace(&mut self, index: usize, entry: FlightplanEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(e) => {
                *e = entry;
                true
            }
            None => false,
        }
    }

    pub fn move_entry(&mut self, from: usize, to: usize) {
        if from < self.entries.len() && to < self.entries.len() {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
        }
    }

    /// Removes entries in the half open range `from..to`.
    pub fn erase(&mut self, from: usize, to: usize) {
        let to = to.min(self.entries.len());
        if from < to {
            self.entries.drain(from..to);
        }
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    /// Clears the inbound airway of the entry at `index` if there is one.
    pub fn erase_airway(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.clear_airway();
        }
    }

    pub fn remove_no_save_entries(&mut self) {
        self.entries.retain(|e| !e.no_save);
    }

    pub fn has_no_save_entries(&self) -> bool {
        self.entries.iter().any(|e| e.no_save)
    }

    /// Reverses the entries. Airways are inbound so each name moves to the entry
    /// that now follows the old predecessor.
    pub fn reverse(&mut self) {
        let airways: Vec<String> = self.entries.iter().map(|e| e.airway.clone()).collect();
        self.entries.reverse();
        let size = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.airway = if i == 0 {
                String::new()
            } else {
                airways[size - i].clone()
            };
        }
    }

    /// Copies departure and destination header fields from the first and last entries.
    pub fn update_departure_and_destination(&mut self) {
        match self.entries.first() {
            Some(first) => {
                self.departure_ident = first.ident.clone();
                self.departure_name = first.name.clone();
                self.departure_position = Some(first.position);
            }
            None => {
                self.departure_ident.clear();
                self.departure_name.clear();
                self.departure_position = None;
            }
        }
        match self.entries.last() {
            Some(last) if self.entries.len() > 1 => {
                self.destination_ident = last.ident.clone();
                self.destination_name = last.name.clone();
                self.destination_position = Some(last.position);
            }
            _ => {
                self.destination_ident.clear();
                self.destination_name.clear();
                self.destination_position = None;
            }
        }
    }

    pub fn get_departure_ident(&self) -> &str {
        &self.departure_ident
    }

    pub fn get_departure_name(&self) -> &str {
        &self.departure_name
    }

    pub fn get_departure_position(&self) -> Option<&Coordinate> {
        self.departure_position.as_ref()
    }

    pub fn get_destination_ident(&self) -> &str {
        &self.destination_ident
    }

    pub fn get_destination_name(&self) -> &str {
        &self.destination_name
    }

    pub fn get_destination_position(&self) -> Option<&Coordinate> {
        self.destination_position.as_ref()
    }

    pub fn get_cruise_altitude(&self) -> i32 {
        self.cruise_altitude
    }

    pub fn set_cruise_altitude(&mut self, altitude: i32) {
        self.cruise_altitude = altitude;
    }

    pub fn get_route_type(&self) -> RouteType {
        self.route_type
    }

    pub fn set_route_type(&mut self, route_type: RouteType) {
        self.route_type = route_type;
    }

    pub fn get_flight_rules(&self) -> FlightRules {
        self.flight_rules
    }

    pub fn set_flight_rules(&mut self, flight_rules: FlightRules) {
        self.flight_rules = flight_rules;
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.properties
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }

    pub fn set_property(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.properties.remove(key);
        } else {
            self.properties.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;

    use super::{Flightplan, FlightplanEntry, WaypointType};

    fn entry(ident: &str, airway: &str) -> FlightplanEntry {
        FlightplanEntry::new(ident, "K6", WaypointType::Vor, Coordinate::new(40.0, -73.0)).with_airway(airway)
    }

    #[test]
    fn test_reverse_shifts_airways() {
        let mut plan = Flightplan::new();
        plan.push(entry("A", ""));
        plan.push(entry("B", "V1"));
        plan.push(entry("C", "V2"));
        plan.push(entry("D", ""));

        plan.reverse();

        let idents: Vec<&str> = plan.entries().iter().map(|e| e.get_ident()).collect();
        assert_eq!(idents, vec!["D", "C", "B", "A"]);
        let airways: Vec<&str> = plan.entries().iter().map(|e| e.get_airway()).collect();
        assert_eq!(airways, vec!["", "", "V2", "V1"]);
    }

    #[test]
    fn test_remove_no_save() {
        let mut plan = Flightplan::new();
        plan.push(entry("A", ""));
        plan.push(FlightplanEntry::procedure("P1", "K6", WaypointType::Waypoint, Coordinate::new(40.5, -73.0)));
        plan.push(entry("B", ""));
        assert!(plan.has_no_save_entries());

        plan.remove_no_save_entries();
        assert_eq!(plan.len(), 2);
        assert!(!plan.has_no_save_entries());
    }

    #[test]
    fn test_header_from_entries() {
        let mut plan = Flightplan::new();
        plan.push(entry("A", "").with_name("Alpha"));
        plan.update_departure_and_destination();
        assert_eq!(plan.get_departure_ident(), "A");
        assert_eq!(plan.get_destination_ident(), "");

        plan.push(entry("B", ""));
        plan.update_departure_and_destination();
        assert_eq!(plan.get_departure_name(), "Alpha");
        assert_eq!(plan.get_destination_ident(), "B");
    }

    #[test]
    fn test_erase_and_insert() {
        let mut plan = Flightplan::new();
        for id in ["A", "B", "C", "D"] {
            plan.push(entry(id, ""));
        }
        plan.erase(1, 3);
        assert_eq!(plan.len(), 2);
        plan.insert(10, entry("E", ""));
        assert_eq!(plan.last().map(|e| e.get_ident()), Some("E"));
        plan.set_property("SID", "DEEZZ5");
        assert_eq!(plan.get_property("SID"), Some("DEEZZ5"));
        plan.set_property("SID", "");
        assert_eq!(plan.get_property("SID"), None);
    }
}
