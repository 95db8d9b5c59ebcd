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

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::model::procedure::{ProcedureKind, ProcedureLeg, ProcedureLegs, ProcedureRef, ProcedureTypes};

pub const SID: &str = "SID";
pub const SID_RUNWAY: &str = "SID_RUNWAY";
pub const SID_TRANSITION: &str = "SID_TRANSITION";
pub const STAR: &str = "STAR";
pub const STAR_RUNWAY: &str = "STAR_RUNWAY";
pub const STAR_TRANSITION: &str = "STAR_TRANSITION";
pub const APPROACH: &str = "APPROACH";
pub const APPROACH_RUNWAY: &str = "APPROACH_RUNWAY";
pub const TRANSITION: &str = "TRANSITION";
/// Set when the missed approach of the attached approach was removed.
pub const APPROACH_NO_MISSED: &str = "APPROACH_NO_MISSED";

/// Procedures resolved from a flight plan property bag.
#[derive(Debug, Clone, Default)]
pub struct ProcedureSet {
    pub departure: Option<ProcedureLegs>,
    pub star: Option<ProcedureLegs>,
    pub arrival: Option<ProcedureLegs>,
    pub errors: Vec<String>,
}

/// Resolves named procedures into legs.
pub trait ProcedureStore: Send + Sync {
    /// Identifier used by this store for an airport known to the navigation data as `nav_ident`.
    fn airport_ident_for(&self, nav_ident: &str) -> Option<String> {
        Some(nav_ident.to_string())
    }

    fn resolve(&self, airport_ident: &str, kind: ProcedureKind, procedure: &ProcedureRef) -> Option<ProcedureLegs>;

    fn legs_for_properties(
        &self,
        properties: &BTreeMap<String, String>,
        departure: Option<&str>,
        destination: Option<&str>,
    ) -> ProcedureSet {
        let mut set = ProcedureSet::default();
        let get = |key: &str| properties.get(key).map(|s| s.as_str()).unwrap_or("");

        if !get(SID).is_empty() {
            let procedure = ProcedureRef::new(get(SID), get(SID_RUNWAY), get(SID_TRANSITION));
            set.departure = self.resolve_for(departure, ProcedureKind::Sid, &procedure, &mut set.errors);
        }
        if !get(STAR).is_empty() {
            let procedure = ProcedureRef::new(get(STAR), get(STAR_RUNWAY), get(STAR_TRANSITION));
            set.star = self.resolve_for(destination, ProcedureKind::Star, &procedure, &mut set.errors);
        }
        if !get(APPROACH).is_empty() {
            let procedure = ProcedureRef::new(get(APPROACH), get(APPROACH_RUNWAY), get(TRANSITION));
            set.arrival = self.resolve_for(destination, ProcedureKind::Approach, &procedure, &mut set.errors);
            if !get(APPROACH_NO_MISSED).is_empty() {
                if let Some(legs) = set.arrival.as_mut() {
                    legs.remove_missed();
                }
            }
        }
        set
    }

    fn resolve_for(
        &self,
        nav_ident: Option<&str>,
        kind: ProcedureKind,
        procedure: &ProcedureRef,
        errors: &mut Vec<String>,
    ) -> Option<ProcedureLegs> {
        let legs = nav_ident
            .and_then(|ident| self.airport_ident_for(ident))
            .and_then(|ident| self.resolve(&ident, kind, procedure));
        if legs.is_none() {
            let message = format!(
                "{} {} at {} not found",
                kind,
                procedure.ident,
                nav_ident.unwrap_or("no airport")
            );
            warn!("{}", message);
            errors.push(message);
        }
        legs
    }
}

/// Writes the procedure names into the property bag.
pub fn set_procedure_properties(properties: &mut BTreeMap<String, String>, legs: &ProcedureLegs) {
    let (ident, runway, transition) = match legs.kind {
        ProcedureKind::Sid => (SID, SID_RUNWAY, SID_TRANSITION),
        ProcedureKind::Star => (STAR, STAR_RUNWAY, STAR_TRANSITION),
        ProcedureKind::Approach => (APPROACH, APPROACH_RUNWAY, TRANSITION),
    };
    for (key, value) in [(ident, &legs.ident), (runway, &legs.runway), (transition, &legs.transition_ident)] {
        if value.is_empty() {
            properties.remove(key);
        } else {
            properties.insert(key.to_string(), value.clone());
        }
    }
    if legs.kind == ProcedureKind::Approach {
        properties.remove(APPROACH_NO_MISSED);
    }
}

/// Removes the property keys of all procedure parts in `types`.
pub fn clear_procedure_properties(properties: &mut BTreeMap<String, String>, types: ProcedureTypes) {
    let mut keys: Vec<&str> = Vec::new();
    if types.intersects(ProcedureTypes::SID) {
        keys.extend([SID, SID_RUNWAY, SID_TRANSITION]);
    } else if types.intersects(ProcedureTypes::SID_TRANSITION) {
        keys.push(SID_TRANSITION);
    }
    if types.intersects(ProcedureTypes::STAR) {
        keys.extend([STAR, STAR_RUNWAY, STAR_TRANSITION]);
    } else if types.intersects(ProcedureTypes::STAR_TRANSITION) {
        keys.push(STAR_TRANSITION);
    }
    if types.intersects(ProcedureTypes::APPROACH) {
        keys.extend([APPROACH, APPROACH_RUNWAY, TRANSITION, APPROACH_NO_MISSED]);
    } else if types.intersects(ProcedureTypes::TRANSITION) {
        keys.push(TRANSITION);
    }
    for key in keys {
        properties.remove(key);
    }
}

struct StoredProcedure {
    kind: ProcedureKind,
    airport_ident: String,
    ident: String,
    runway: String,
    legs: Vec<ProcedureLeg>,
    transitions: BTreeMap<String, Vec<ProcedureLeg>>,
}

/// In memory procedure store.
#[derive(Default)]
pub struct MemoryProcedureStore {
    procedures: Vec<StoredProcedure>,
    aliases: HashMap<String, String>,
}

impl MemoryProcedureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an airport ident of the navigation data to the ident used for procedures.
    pub fn add_alias(&mut self, nav_ident: &str, ident: &str) {
        self.aliases.insert(nav_ident.to_uppercase(), ident.to_string());
    }

    pub fn add_procedure(
        &mut self,
        kind: ProcedureKind,
        airport_ident: &str,
        ident: &str,
        runway: &str,
        legs: Vec<ProcedureLeg>,
    ) {
        let part = match kind {
            ProcedureKind::Sid => ProcedureTypes::SID,
            ProcedureKind::Star => ProcedureTypes::STAR,
            ProcedureKind::Approach => ProcedureTypes::APPROACH,
        };
        let legs = legs
            .into_iter()
            .map(|l| {
                if l.procedure_type.is_empty() {
                    l.with_type(part)
                } else {
                    l
                }
            })
            .collect();
        self.procedures.push(StoredProcedure {
            kind,
            airport_ident: airport_ident.to_string(),
            ident: ident.to_string(),
            runway: runway.to_string(),
            legs,
            transitions: BTreeMap::new(),
        });
    }

    /// Adds a transition to the last added procedure with the given ident.
    pub fn add_transition(&mut self, airport_ident: &str, procedure: &str, transition: &str, legs: Vec<ProcedureLeg>) {
        let Some(stored) = self
            .procedures
            .iter_mut()
            .rev()
            .find(|p| p.airport_ident == airport_ident && p.ident == procedure)
        else {
            warn!("No procedure {} at {} for transition {}", procedure, airport_ident, transition);
            return;
        };
        let part = match stored.kind {
            ProcedureKind::Sid => ProcedureTypes::SID_TRANSITION,
            ProcedureKind::Star => ProcedureTypes::STAR_TRANSITION,
            ProcedureKind::Approach => ProcedureTypes::TRANSITION,
        };
        let legs = legs.into_iter().map(|l| l.with_type(part)).collect();
        stored.transitions.insert(transition.to_string(), legs);
    }
}

impl ProcedureStore for MemoryProcedureStore {
    fn airport_ident_for(&self, nav_ident: &str) -> Option<String> {
        match self.aliases.get(&nav_ident.to_uppercase()) {
            Some(ident) => Some(ident.clone()),
            None => Some(nav_ident.to_string()),
        }
    }

    fn resolve(&self, airport_ident: &str, kind: ProcedureKind, procedure: &ProcedureRef) -> Option<ProcedureLegs> {
        let stored = self.procedures.iter().find(|p| {
            p.kind == kind
                && p.airport_ident.eq_ignore_ascii_case(airport_ident)
                && p.ident.eq_ignore_ascii_case(&procedure.ident)
                && (procedure.runway.is_empty() || p.runway.is_empty() || p.runway == procedure.runway)
        })?;

        let transition_legs = if procedure.transition.is_empty() {
            Vec::new()
        } else {
            stored.transitions.get(&procedure.transition)?.clone()
        };
        debug!("Resolved {} {} at {}", kind, stored.ident, airport_ident);

        Some(ProcedureLegs {
            kind,
            airport_ident: stored.airport_ident.clone(),
            ident: stored.ident.clone(),
            runway: if procedure.runway.is_empty() {
                stored.runway.clone()
            } else {
                procedure.runway.clone()
            },
            transition_ident: procedure.transition.clone(),
            transition_legs,
            legs: stored.legs.clone(),
        })
    }
}
