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

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use yaml_rust::yaml::Hash;
use yaml_rust::{EmitError, Yaml, YamlEmitter, YamlLoader};

use crate::model::aircraft::Aircraft;

static DEFAULT_AICRAFT: &str = "---
- climb-rate: 5000
  climb-speed: 250
  cruise-altitude: 35000
  cruise-speed: 490
  fuel-flow: 1800.0
  is-default: false
  name: 777-200B
  sink-rate: 3000
  sink-speed: 280
- climb-rate: 2000
  climb-speed: 300
  cruise-altitude: 36000
  cruise-speed: 450
  fuel-flow: 850.0
  is-default: false
  name: Boeing 737
  sink-rate: 1000
  sink-speed: 200
- climb-rate: 1000
  climb-speed: 110
  cruise-altitude: 7000
  cruise-speed: 140
  fuel-flow: 9.0
  is-default: true
  name: Cessna C-172 - High wing
  sink-rate: 500
  sink-speed: 100
";

const KEY_NAME: &str = "name";
const KEY_CRUISE_SPEED: &str = "cruise-speed";
const KEY_CRUISE_ALTITUDE: &str = "cruise-altitude";
const KEY_CLIMB_SPEED: &str = "climb-speed";
const KEY_CLIMB_RATE: &str = "climb-rate";
const KEY_SINK_SPEED: &str = "sink-speed";
const KEY_SINK_RATE: &str = "sink-rate";
const KEY_FUEL_FLOW: &str = "fuel-flow";
const KEY_IS_DEFAULT: &str = "is-default";

// This is where all the planes live.
#[derive(Debug, Clone, Default)]
pub struct Hangar {
    aircraft: Vec<Arc<Aircraft>>,
}

impl Hangar {
    /// Loads the aircraft file at `path`, or the default file in the user's home directory.
    /// Falls back to the built in aircraft if there is no readable file.
    pub fn load(path: Option<&Path>) -> Hangar {
        let path = path.map(Path::to_path_buf).or_else(get_hangar_path);
        let contents = path.as_ref().and_then(|p| match fs::read_to_string(p) {
            Ok(contents) => {
                info!("Loading aircraft from {}", p.display());
                Some(contents)
            }
            Err(e) => {
                info!("No aircraft file at {} ({}), using defaults", p.display(), e);
                None
            }
        });
        match contents {
            Some(contents) => Self::from_yaml(&contents).unwrap_or_else(|| {
                warn!("Unable to parse aircraft file, using defaults");
                Self::defaults()
            }),
            None => Self::defaults(),
        }
    }

    /// The built in aircraft.
    pub fn defaults() -> Hangar {
        Self::from_yaml(DEFAULT_AICRAFT).unwrap_or_default()
    }

    /// Parses a YAML aircraft list. Returns None if the text is not YAML.
    pub fn from_yaml(contents: &str) -> Option<Hangar> {
        let docs = YamlLoader::load_from_str(contents).ok()?;
        let mut aircraft: Vec<Arc<Aircraft>> = Vec::new();
        for doc in docs {
            if let Some(all) = doc.as_vec() {
                for each in all {
                    if let Some(map) = each.as_hash() {
                        aircraft.push(Arc::new(Aircraft::new(
                            get_string(map, KEY_NAME),
                            get_i32(map, KEY_CRUISE_SPEED),
                            get_i32(map, KEY_CRUISE_ALTITUDE),
                            get_i32(map, KEY_CLIMB_SPEED),
                            get_i32(map, KEY_CLIMB_RATE),
                            get_i32(map, KEY_SINK_SPEED),
                            get_i32(map, KEY_SINK_RATE),
                            get_f64(map, KEY_FUEL_FLOW),
                            get_bool(map, KEY_IS_DEFAULT),
                        )));
                    }
                }
            }
        }
        Some(Hangar { aircraft })
    }

    pub fn to_yaml(&self) -> Result<String, EmitError> {
        let all = self
            .aircraft
            .iter()
            .map(|a| {
                let mut map = Hash::new();
                put_string(&mut map, KEY_NAME, a.get_name());
                put_i32(&mut map, KEY_CRUISE_SPEED, a.get_cruise_speed());
                put_i32(&mut map, KEY_CRUISE_ALTITUDE, a.get_cruise_altitude());
                put_i32(&mut map, KEY_CLIMB_SPEED, a.get_climb_speed());
                put_i32(&mut map, KEY_CLIMB_RATE, a.get_climb_rate());
                put_i32(&mut map, KEY_SINK_SPEED, a.get_sink_speed());
                put_i32(&mut map, KEY_SINK_RATE, a.get_sink_rate());
                put_f64(&mut map, KEY_FUEL_FLOW, a.get_fuel_flow());
                put_bool(&mut map, KEY_IS_DEFAULT, a.is_default());
                Yaml::Hash(map)
            })
            .collect();

        let mut out_str = String::new();
        let mut emitter = YamlEmitter::new(&mut out_str);
        emitter.dump(&Yaml::Array(all))?;
        Ok(out_str)
    }

    pub fn get_default_aircraft(&self) -> Option<Arc<Aircraft>> {
        self.aircraft.iter().find(|a| a.is_default()).cloned()
    }

    pub fn get_all(&self) -> &[Arc<Aircraft>] {
        &self.aircraft
    }

    pub fn get(&self, name: &str) -> Option<Arc<Aircraft>> {
        self.aircraft.iter().find(|a| a.get_name() == name).cloned()
    }
}

fn get_bool(map: &Hash, key: &str) -> bool {
    map.get(&Yaml::String(key.to_string()))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn get_i32(map: &Hash, key: &str) -> i32 {
    map.get(&Yaml::String(key.to_string()))
        .and_then(|v| v.as_i64())
        .unwrap_or(0) as i32
}

fn get_f64(map: &Hash, key: &str) -> f64 {
    match map.get(&Yaml::String(key.to_string())) {
        Some(Yaml::Integer(i)) => *i as f64,
        Some(v) => v.as_f64().unwrap_or(0.0),
        None => 0.0,
    }
}

fn get_string(map: &Hash, key: &str) -> String {
    map.get(&Yaml::String(key.to_string()))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn put_bool(map: &mut Hash, key: &str, v: bool) {
    map.insert(Yaml::String(key.to_string()), Yaml::Boolean(v));
}

fn put_i32(map: &mut Hash, key: &str, v: i32) {
    map.insert(Yaml::String(key.to_string()), Yaml::Integer(v as i64));
}

fn put_f64(map: &mut Hash, key: &str, v: f64) {
    map.insert(Yaml::String(key.to_string()), Yaml::Real(format!("{:?}", v)));
}

fn put_string(map: &mut Hash, key: &str, v: &str) {
    map.insert(Yaml::String(key.to_string()), Yaml::String(v.to_string()));
}

pub fn get_hangar_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".kelpie-route").join("aircraft.yaml"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::Hangar;

    #[test]
    fn test_defaults() {
        let hangar = Hangar::defaults();
        assert_eq!(hangar.get_all().len(), 3);
        let default = hangar.get_default_aircraft().expect("one aircraft is the default");
        assert_eq!(default.get_name(), "Cessna C-172 - High wing");
        assert_eq!(default.get_cruise_speed(), 140);
        assert_eq!(default.get_fuel_flow(), 9.0);
        assert!(hangar.get("Boeing 737").is_some_and(|a| a.get_cruise_altitude() == 36000));
        assert!(hangar.get("Concorde").is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let hangar = Hangar::load(Some(Path::new("/nonexistent/kelpie/aircraft.yaml")));
        assert_eq!(hangar.get_all().len(), 3);
    }

    #[test]
    fn test_partial_entries() {
        let hangar = Hangar::from_yaml("- name: Glider\n  cruise-speed: 50\n  fuel-flow: 0\n").expect("valid yaml");
        let glider = hangar.get("Glider").expect("parsed");
        assert_eq!(glider.get_cruise_speed(), 50);
        assert_eq!(glider.get_climb_rate(), 0);
        assert_eq!(glider.get_fuel_flow(), 0.0);
        assert!(hangar.get_default_aircraft().is_none());

        assert!(Hangar::from_yaml("- [unclosed").is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let hangar = Hangar::defaults();
        let yaml = hangar.to_yaml().expect("emits");
        let reloaded = Hangar::from_yaml(&yaml).expect("reparses");
        assert_eq!(reloaded.get_all(), hangar.get_all());
    }
}
