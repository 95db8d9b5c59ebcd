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

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, info};

use crate::earth::coordinate::Coordinate;
use crate::model::waypoint::Waypoint;

use super::network::{Edge, NetworkMode, NodeKind, RouteNetwork, SearchParams};

const AIRWAY_COST_FACTOR: f64 = 1.0;
const AIRWAY_COST_FACTOR_NAVAID_PREFERRED: f64 = 1.2;
const NDB_COST_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderState {
    Configured,
    Searching,
    Found,
    NotFound,
}

/// One node of a found route with the airway that leads to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub waypoint: Waypoint,
    pub airway_id: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f_score: FloatOrd,
    g_score: FloatOrd,
    node: usize,
}

#[derive(Debug, Clone, Copy)]
struct Predecessor {
    node: usize,
    airway_id: Option<u32>,
    distance: f64,
}

/// Best first search over a route network between two positions.
pub struct RouteFinder<'a, N: RouteNetwork> {
    network: &'a mut N,
    state: FinderState,
    prefer_vor: bool,
    prefer_ndb: bool,
    max_ratio: f64,
    path: Vec<(usize, Option<u32>)>,
    distance: f64,
}

impl<'a, N: RouteNetwork> RouteFinder<'a, N> {
    pub fn new(network: &'a mut N, max_ratio: f64) -> Self {
        Self {
            network,
            state: FinderState::Configured,
            prefer_vor: false,
            prefer_ndb: false,
            max_ratio,
            path: Vec::new(),
            distance: 0.0,
        }
    }

    pub fn set_prefer_vor_to_airway(&mut self, prefer: bool) {
        self.prefer_vor = prefer;
    }

    pub fn set_prefer_ndb_to_airway(&mut self, prefer: bool) {
        self.prefer_ndb = prefer;
    }

    pub fn state(&self) -> FinderState {
        self.state
    }

    /// Weight of an edge relative to its length. None excludes the edge.
    fn cost_factor(&self, edge: &Edge, to: NodeKind) -> Option<f64> {
        if edge.airway_id.is_some() {
            if self.prefer_vor || self.prefer_ndb {
                return Some(AIRWAY_COST_FACTOR_NAVAID_PREFERRED);
            }
            return Some(AIRWAY_COST_FACTOR);
        }
        let radionav = self.network.mode().contains(NetworkMode::RADIONAV);
        match to {
            NodeKind::Ndb if radionav && self.prefer_vor => None,
            NodeKind::Ndb if radionav && !self.prefer_ndb => Some(NDB_COST_FACTOR),
            _ => Some(1.0),
        }
    }

    /// Runs the search. Altitude zero means no altitude restriction.
    pub fn calculate_route(&mut self, start: &Coordinate, end: &Coordinate, altitude: i32) -> bool {
        self.state = FinderState::Searching;
        self.path.clear();
        self.distance = 0.0;

        let direct = start.distance_to(end);
        if direct < 0.01 {
            self.state = FinderState::NotFound;
            return false;
        }

        let params = SearchParams {
            altitude,
            prefer_vor: self.prefer_vor,
            prefer_ndb: self.prefer_ndb,
            area_ratio: self.max_ratio,
        };
        let (start_node, destination) = self.network.setup_search(start, end, &params);

        let mut open = BinaryHeap::new();
        let mut g_scores: HashMap<usize, f64> = HashMap::new();
        let mut came_from: HashMap<usize, Predecessor> = HashMap::new();
        let mut closed: HashSet<usize> = HashSet::new();

        g_scores.insert(start_node, 0.0);
        open.push(Reverse(OpenNode {
            f_score: FloatOrd(direct),
            g_score: FloatOrd(0.0),
            node: start_node,
        }));

        let mut found = false;
        while let Some(Reverse(current)) = open.pop() {
            if !closed.insert(current.node) {
                continue;
            }
            if current.node == destination {
                found = true;
                break;
            }

            for edge in self.network.neighbours(current.node) {
                if closed.contains(&edge.to) {
                    continue;
                }
                let Some((kind, position)) = self.network.node(edge.to).map(|n| (n.kind, n.position)) else {
                    continue;
                };
                let Some(factor) = self.cost_factor(&edge, kind) else {
                    continue;
                };
                let tentative = current.g_score.0 + edge.distance * factor;
                if tentative < g_scores.get(&edge.to).copied().unwrap_or(f64::INFINITY) {
                    g_scores.insert(edge.to, tentative);
                    came_from.insert(
                        edge.to,
                        Predecessor {
                            node: current.node,
                            airway_id: edge.airway_id,
                            distance: edge.distance,
                        },
                    );
                    open.push(Reverse(OpenNode {
                        f_score: FloatOrd(tentative + position.distance_to(end)),
                        g_score: FloatOrd(tentative),
                        node: edge.to,
                    }));
                }
            }
        }
        debug!("Route search expanded {} of {} nodes", closed.len(), self.network.node_count());

        if !found {
            info!("No route found");
            self.state = FinderState::NotFound;
            return false;
        }

        let mut path = Vec::new();
        let mut distance = 0.0;
        let mut node = destination;
        while let Some(predecessor) = came_from.get(&node) {
            distance += predecessor.distance;
            path.push((node, predecessor.airway_id));
            node = predecessor.node;
        }
        path.reverse();

        let ratio = distance / direct;
        if ratio > self.max_ratio {
            info!(
                "Route rejected. Distance {:.0} NM is {:.2} times the direct distance",
                distance, ratio
            );
            self.state = FinderState::NotFound;
            return false;
        }

        // The virtual destination is not part of the result
        path.retain(|(n, _)| *n != destination);
        self.path = path;
        self.distance = distance;
        self.state = FinderState::Found;
        true
    }

    /// The nodes between start and destination with their inbound airways, and the total distance.
    pub fn extract_route(&self) -> (Vec<RouteEntry>, f64) {
        let entries = self
            .path
            .iter()
            .filter_map(|(node, airway_id)| {
                self.network
                    .node(*node)
                    .and_then(|n| n.waypoint.clone())
                    .map(|waypoint| RouteEntry {
                        waypoint,
                        airway_id: *airway_id,
                    })
            })
            .collect();
        (entries, self.distance)
    }
}
