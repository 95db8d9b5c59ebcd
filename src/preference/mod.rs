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

use std::str::FromStr;
use std::sync::RwLock;

use log::{info, warn};
use preferences::{AppInfo, Preferences, PreferencesMap};

pub const PREFS_PATH: &str = "route";
pub const APP_INFO: AppInfo = AppInfo {
    name: "kelpie-route",
    author: "shartrec.com",
};

// Preference constants
pub const AIRCRAFT_TYPE: &str = "Aircraft.type";
pub const PREFER_VOR: &str = "Route.preferVor";
pub const PREFER_NDB: &str = "Route.preferNdb";
pub const MAX_DISTANCE_RATIO: &str = "Route.maxDistanceRatio";
pub const UNDO_LIMIT: &str = "Route.undoLimit";
pub const UNDO_MERGE: &str = "Route.undoMerge";
pub const RADIO_HOP_RANGE: &str = "Route.radioHopRange";
pub const AIRWAY_CONNECT_RANGE: &str = "Route.airwayConnectRange";
pub const HIGH_ALTITUDE_THRESHOLD: &str = "Route.highAltitudeThreshold";

/// String key/value settings. A manager with a path stores to disk on every change.
pub struct PreferenceManager {
    preferences: RwLock<PreferencesMap>,
    path: Option<String>,
}

impl PreferenceManager {
    /// Loads the preferences stored under `path`, starting empty if there are none.
    pub fn new(path: &str) -> Self {
        let map = match PreferencesMap::<String>::load(&APP_INFO, path) {
            Ok(map) => map,
            Err(e) => {
                warn!("Error opening preferences {}", e);
                PreferencesMap::new()
            }
        };
        Self {
            preferences: RwLock::new(map),
            path: Some(path.to_string()),
        }
    }

    /// Preferences that are never stored.
    pub fn in_memory() -> Self {
        Self {
            preferences: RwLock::new(PreferencesMap::new()),
            path: None,
        }
    }

    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        let prefs = self.preferences.read().ok()?;
        prefs.get(key).and_then(|s| s.parse::<T>().ok())
    }

    pub fn put<T: ToString>(&self, key: &str, value: T) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.insert(key.to_string(), value.to_string());
        }
        self.store();
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.remove(key);
        }
        self.store();
    }

    pub fn clear(&self) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.clear();
        }
        self.store();
    }

    fn store(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Ok(prefs) = self.preferences.read() {
            if let Err(e) = prefs.save(&APP_INFO, path) {
                warn!("Unable to save preferences {}", e);
            }
        }
    }
}

/// Settings that drive route calculation and the undo log.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    pub prefer_vor: bool,
    pub prefer_ndb: bool,
    /// Maximum ratio of a found route's length to the direct distance
    pub max_distance_ratio: f64,
    pub undo_limit: usize,
    /// Merge consecutive edits of the same kind into one undo step
    pub undo_merge: bool,
    /// NM
    pub radio_hop_range: f64,
    /// NM
    pub airway_connect_range: f64,
    /// Feet. Cruise altitudes at or above use high altitude airways.
    pub high_altitude_threshold: i32,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            prefer_vor: false,
            prefer_ndb: false,
            max_distance_ratio: 2.0,
            undo_limit: 50,
            undo_merge: true,
            radio_hop_range: 200.0,
            airway_connect_range: 100.0,
            high_altitude_threshold: 18000,
        }
    }
}

impl RouteOptions {
    /// Reads all options. Missing or unparsable values keep their defaults.
    pub fn from_preferences(prefs: &PreferenceManager) -> Self {
        let d = Self::default();
        let options = Self {
            prefer_vor: prefs.get(PREFER_VOR).unwrap_or(d.prefer_vor),
            prefer_ndb: prefs.get(PREFER_NDB).unwrap_or(d.prefer_ndb),
            max_distance_ratio: prefs
                .get::<f64>(MAX_DISTANCE_RATIO)
                .filter(|r| *r >= 1.0)
                .unwrap_or(d.max_distance_ratio),
            undo_limit: prefs.get::<usize>(UNDO_LIMIT).filter(|l| *l > 0).unwrap_or(d.undo_limit),
            undo_merge: prefs.get(UNDO_MERGE).unwrap_or(d.undo_merge),
            radio_hop_range: prefs.get::<f64>(RADIO_HOP_RANGE).filter(|r| *r > 0.0).unwrap_or(d.radio_hop_range),
            airway_connect_range: prefs
                .get::<f64>(AIRWAY_CONNECT_RANGE)
                .filter(|r| *r > 0.0)
                .unwrap_or(d.airway_connect_range),
            high_altitude_threshold: prefs.get(HIGH_ALTITUDE_THRESHOLD).unwrap_or(d.high_altitude_threshold),
        };
        info!("Route options {:?}", options);
        options
    }

    pub fn store(&self, prefs: &PreferenceManager) {
        prefs.put(PREFER_VOR, self.prefer_vor);
        prefs.put(PREFER_NDB, self.prefer_ndb);
        prefs.put(MAX_DISTANCE_RATIO, self.max_distance_ratio);
        prefs.put(UNDO_LIMIT, self.undo_limit);
        prefs.put(UNDO_MERGE, self.undo_merge);
        prefs.put(RADIO_HOP_RANGE, self.radio_hop_range);
        prefs.put(AIRWAY_CONNECT_RANGE, self.airway_connect_range);
        prefs.put(HIGH_ALTITUDE_THRESHOLD, self.high_altitude_threshold);
    }
}
