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

use std::collections::HashMap;
use std::ops::BitOr;
use std::sync::Arc;

use log::debug;

use crate::earth::NavDataProvider;
use crate::earth::coordinate::Coordinate;
use crate::model::airway::{AirwayClass, AirwaySegment};
use crate::model::flightplan::WaypointType;
use crate::model::waypoint::{NavRef, Waypoint};

/// Which edges a network offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkMode(u8);

impl NetworkMode {
    pub const RADIONAV: NetworkMode = NetworkMode(1);
    pub const VICTOR: NetworkMode = NetworkMode(1 << 1);
    pub const JET: NetworkMode = NetworkMode(1 << 2);
    pub const AIRWAY: NetworkMode = NetworkMode(Self::VICTOR.0 | Self::JET.0);

    pub fn contains(&self, other: NetworkMode) -> bool {
        self.0 & other.0 == other.0
    }

    fn allows(&self, class: AirwayClass) -> bool {
        match class {
            AirwayClass::Victor => self.contains(Self::VICTOR),
            AirwayClass::Jet => self.contains(Self::JET),
            AirwayClass::Both => self.0 & Self::AIRWAY.0 != 0,
        }
    }
}

impl BitOr for NetworkMode {
    type Output = NetworkMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        NetworkMode(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    Destination,
    Vor,
    Ndb,
    Waypoint,
}

#[derive(Debug, Clone)]
pub struct NetworkNode {
    pub kind: NodeKind,
    pub position: Coordinate,
    pub waypoint: Option<Waypoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub airway_id: Option<u32>,
    pub distance: f64,
}

/// Settings of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Cruise altitude in feet, zero for no altitude restriction
    pub altitude: i32,
    pub prefer_vor: bool,
    pub prefer_ndb: bool,
    /// Nodes are only taken from the ellipse around start and destination this
    /// multiple of the direct distance wide
    pub area_ratio: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            altitude: 0,
            prefer_vor: false,
            prefer_ndb: false,
            area_ratio: 2.0,
        }
    }
}

/// A graph of navaids and waypoints that is built while it is searched.
pub trait RouteNetwork {
    fn mode(&self) -> NetworkMode;

    /// Drops the nodes of the last search and adds the virtual start and destination nodes.
    /// Returns their indexes.
    fn setup_search(&mut self, start: &Coordinate, end: &Coordinate, params: &SearchParams) -> (usize, usize);

    fn neighbours(&mut self, node: usize) -> Vec<Edge>;

    fn node(&self, index: usize) -> Option<&NetworkNode>;

    /// Drops all cached nodes and edges.
    fn clear(&mut self);

    fn node_count(&self) -> usize;
}

#[derive(Default)]
struct NodeCache {
    nodes: Vec<NetworkNode>,
    index: HashMap<NavRef, usize>,
    edges: HashMap<usize, Vec<Edge>>,
    start: usize,
    destination: usize,
    start_pos: Coordinate,
    end_pos: Coordinate,
    area_limit: f64,
}

impl NodeCache {
    fn reset(&mut self, start: &Coordinate, end: &Coordinate, area_limit: f64) -> (usize, usize) {
        self.clear();
        self.start_pos = *start;
        self.end_pos = *end;
        self.area_limit = area_limit;
        self.nodes.push(NetworkNode {
            kind: NodeKind::Start,
            position: *start,
            waypoint: None,
        });
        self.nodes.push(NetworkNode {
            kind: NodeKind::Destination,
            position: *end,
            waypoint: None,
        });
        self.start = 0;
        self.destination = 1;
        (self.start, self.destination)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
    }

    fn in_area(&self, position: &Coordinate) -> bool {
        position.distance_to(&self.start_pos) + position.distance_to(&self.end_pos) <= self.area_limit
    }

    fn intern(&mut self, waypoint: Waypoint) -> usize {
        let key = waypoint.nav_ref();
        if let Some(index) = self.index.get(&key) {
            return *index;
        }
        let kind = match waypoint.get_type() {
            WaypointType::Vor => NodeKind::Vor,
            WaypointType::Ndb => NodeKind::Ndb,
            _ => NodeKind::Waypoint,
        };
        let index = self.nodes.len();
        self.nodes.push(NetworkNode {
            kind,
            position: *waypoint.get_loc(),
            waypoint: Some(waypoint),
        });
        self.index.insert(key, index);
        index
    }

    fn position(&self, node: usize) -> Option<Coordinate> {
        self.nodes.get(node).map(|n| n.position)
    }

    fn direct_edges(&mut self, node: usize, candidates: Vec<Waypoint>, edges: &mut Vec<Edge>) {
        let Some(from) = self.position(node) else {
            return;
        };
        for waypoint in candidates {
            if !self.in_area(waypoint.get_loc()) {
                continue;
            }
            let distance = from.distance_to(waypoint.get_loc());
            let to = self.intern(waypoint);
            if to != node && !edges.iter().any(|e| e.to == to) {
                edges.push(Edge {
                    to,
                    airway_id: None,
                    distance,
                });
            }
        }
    }

    fn destination_edge(&self, node: usize, range: f64, edges: &mut Vec<Edge>) {
        if let Some(from) = self.position(node) {
            let distance = from.distance_to(&self.end_pos);
            if distance <= range {
                edges.push(Edge {
                    to: self.destination,
                    airway_id: None,
                    distance,
                });
            }
        }
    }
}

/// Direct hops between VOR and NDB stations.
pub struct RadioNetwork {
    nav: Arc<dyn NavDataProvider>,
    hop_range: f64,
    params: SearchParams,
    cache: NodeCache,
}

impl RadioNetwork {
    pub fn new(nav: Arc<dyn NavDataProvider>, hop_range: f64) -> Self {
        Self {
            nav,
            hop_range,
            params: SearchParams::default(),
            cache: NodeCache::default(),
        }
    }

    pub fn set_hop_range(&mut self, hop_range: f64) {
        self.hop_range = hop_range;
    }
}

impl RouteNetwork for RadioNetwork {
    fn mode(&self) -> NetworkMode {
        NetworkMode::RADIONAV
    }

    fn setup_search(&mut self, start: &Coordinate, end: &Coordinate, params: &SearchParams) -> (usize, usize) {
        self.params = *params;
        let area = start.distance_to(end) * params.area_ratio + self.hop_range;
        self.cache.reset(start, end, area)
    }

    fn neighbours(&mut self, node: usize) -> Vec<Edge> {
        if let Some(edges) = self.cache.edges.get(&node) {
            return edges.clone();
        }
        let mut edges = Vec::new();
        if node != self.cache.destination {
            if let Some(position) = self.cache.position(node) {
                let kinds: &[WaypointType] = if self.params.prefer_vor {
                    &[WaypointType::Vor]
                } else {
                    &[WaypointType::Vor, WaypointType::Ndb]
                };
                let candidates = self.nav.within_radius(&position, self.hop_range, kinds);
                self.cache.direct_edges(node, candidates, &mut edges);
                if node != self.cache.start {
                    self.cache.destination_edge(node, self.hop_range, &mut edges);
                }
            }
        }
        self.cache.edges.insert(node, edges.clone());
        edges
    }

    fn node(&self, index: usize) -> Option<&NetworkNode> {
        self.cache.nodes.get(index)
    }

    fn clear(&mut self) {
        self.cache.clear();
    }

    fn node_count(&self) -> usize {
        self.cache.nodes.len()
    }
}

/// Victor and/or jet airways. Start and destination connect directly to nearby
/// airway fixes.
pub struct AirwayNetwork {
    nav: Arc<dyn NavDataProvider>,
    mode: NetworkMode,
    connect_range: f64,
    hop_range: f64,
    params: SearchParams,
    cache: NodeCache,
}

impl AirwayNetwork {
    pub fn new(nav: Arc<dyn NavDataProvider>, mode: NetworkMode, connect_range: f64, hop_range: f64) -> Self {
        Self {
            nav,
            mode,
            connect_range,
            hop_range,
            params: SearchParams::default(),
            cache: NodeCache::default(),
        }
    }

    pub fn set_mode(&mut self, mode: NetworkMode) {
        self.mode = mode;
    }

    pub fn set_ranges(&mut self, connect_range: f64, hop_range: f64) {
        self.connect_range = connect_range;
        self.hop_range = hop_range;
    }

    fn usable(&self, segment: &AirwaySegment) -> bool {
        self.mode.allows(segment.get_class()) && segment.allows_altitude(self.params.altitude)
    }

    fn has_airway(&self, node: &NavRef) -> bool {
        self.nav.airways_at(node).iter().any(|s| self.usable(s))
    }

    fn airway_edges(&mut self, node: usize, edges: &mut Vec<Edge>) {
        let Some(waypoint) = self.cache.nodes.get(node).and_then(|n| n.waypoint.clone()) else {
            return;
        };
        let key = waypoint.nav_ref();
        for segment in self.nav.airways_at(&key) {
            if !self.usable(&segment) {
                continue;
            }
            let Some((other, position)) = segment.other_end(&key) else {
                continue;
            };
            if !self.cache.in_area(position) {
                continue;
            }
            let Some(next) = self.nav.lookup(&other.ident, &other.region, other.kind, position) else {
                debug!("Airway {} fix {} not found", segment.get_name(), other.ident);
                continue;
            };
            let to = self.cache.intern(next);
            edges.push(Edge {
                to,
                airway_id: Some(segment.get_id()),
                distance: segment.length(),
            });
        }
    }
}

impl RouteNetwork for AirwayNetwork {
    fn mode(&self) -> NetworkMode {
        self.mode
    }

    fn setup_search(&mut self, start: &Coordinate, end: &Coordinate, params: &SearchParams) -> (usize, usize) {
        self.params = *params;
        let area = start.distance_to(end) * params.area_ratio + self.connect_range;
        self.cache.reset(start, end, area)
    }

    fn neighbours(&mut self, node: usize) -> Vec<Edge> {
        if let Some(edges) = self.cache.edges.get(&node) {
            return edges.clone();
        }
        let mut edges = Vec::new();
        if node == self.cache.start {
            let candidates: Vec<Waypoint> = self
                .nav
                .within_radius(
                    &self.cache.start_pos,
                    self.connect_range,
                    &[WaypointType::Vor, WaypointType::Ndb, WaypointType::Waypoint],
                )
                .into_iter()
                .filter(|w| self.has_airway(&w.nav_ref()))
                .collect();
            self.cache.direct_edges(node, candidates, &mut edges);
        } else if node != self.cache.destination {
            self.airway_edges(node, &mut edges);

            let kind = self.cache.nodes.get(node).map(|n| n.kind);
            let mut kinds = Vec::new();
            if self.params.prefer_vor {
                kinds.push(WaypointType::Vor);
            }
            if self.params.prefer_ndb {
                kinds.push(WaypointType::Ndb);
            }
            if !kinds.is_empty() && matches!(kind, Some(NodeKind::Vor) | Some(NodeKind::Ndb)) {
                if let Some(position) = self.cache.position(node) {
                    let candidates = self.nav.within_radius(&position, self.hop_range, &kinds);
                    self.cache.direct_edges(node, candidates, &mut edges);
                }
            }

            self.cache.destination_edge(node, self.connect_range, &mut edges);
        }
        self.cache.edges.insert(node, edges.clone());
        edges
    }

    fn node(&self, index: usize) -> Option<&NetworkNode> {
        self.cache.nodes.get(index)
    }

    fn clear(&mut self) {
        self.cache.clear();
    }

    fn node_count(&self) -> usize {
        self.cache.nodes.len()
    }
}
