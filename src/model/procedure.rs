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
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use crate::earth::coordinate::Coordinate;

use super::flightplan::WaypointType;

/// Set of procedure parts. Used to tag procedure legs and to select which parts
/// to remove from a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProcedureTypes(u16);

impl ProcedureTypes {
    pub const NONE: ProcedureTypes = ProcedureTypes(0);
    pub const SID: ProcedureTypes = ProcedureTypes(1);
    pub const SID_TRANSITION: ProcedureTypes = ProcedureTypes(1 << 1);
    pub const STAR: ProcedureTypes = ProcedureTypes(1 << 2);
    pub const STAR_TRANSITION: ProcedureTypes = ProcedureTypes(1 << 3);
    pub const TRANSITION: ProcedureTypes = ProcedureTypes(1 << 4);
    pub const APPROACH: ProcedureTypes = ProcedureTypes(1 << 5);
    pub const MISSED: ProcedureTypes = ProcedureTypes(1 << 6);

    pub const DEPARTURE: ProcedureTypes = ProcedureTypes(Self::SID.0 | Self::SID_TRANSITION.0);
    pub const STAR_ALL: ProcedureTypes = ProcedureTypes(Self::STAR.0 | Self::STAR_TRANSITION.0);
    pub const ARRIVAL: ProcedureTypes = ProcedureTypes(Self::TRANSITION.0 | Self::APPROACH.0 | Self::MISSED.0);
    pub const ARRIVAL_ALL: ProcedureTypes = ProcedureTypes(Self::STAR_ALL.0 | Self::ARRIVAL.0);
    pub const ALL: ProcedureTypes = ProcedureTypes(Self::DEPARTURE.0 | Self::ARRIVAL_ALL.0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if all bits of `other` are set
    pub fn contains(&self, other: ProcedureTypes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(&self, other: ProcedureTypes) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ProcedureTypes {
    type Output = ProcedureTypes;

    fn bitor(self, rhs: Self) -> Self::Output {
        ProcedureTypes(self.0 | rhs.0)
    }
}

impl BitOrAssign for ProcedureTypes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ProcedureTypes {
    type Output = ProcedureTypes;

    fn bitand(self, rhs: Self) -> Self::Output {
        ProcedureTypes(self.0 & rhs.0)
    }
}

impl Not for ProcedureTypes {
    type Output = ProcedureTypes;

    fn not(self) -> Self::Output {
        ProcedureTypes(!self.0 & Self::ALL.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Sid,
    Star,
    Approach,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureKind::Sid => write!(f, "SID"),
            ProcedureKind::Star => write!(f, "STAR"),
            ProcedureKind::Approach => write!(f, "Approach"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegType {
    InitialFix,
    TrackToFix,
    CourseToFix,
    DirectToFix,
    CourseToAltitude,
    HeadingToAltitude,
    HoldToManual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeDescriptor {
    At,
    AtOrAbove,
    AtOrBelow,
    /// Between `alt2` and `alt1` where `alt1` is the upper limit
    Between,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltitudeRestriction {
    pub descriptor: AltitudeDescriptor,
    pub alt1: i32,
    pub alt2: i32,
}

impl AltitudeRestriction {
    pub fn at(alt: i32) -> Self {
        Self {
            descriptor: AltitudeDescriptor::At,
            alt1: alt,
            alt2: 0,
        }
    }

    pub fn at_or_above(alt: i32) -> Self {
        Self {
            descriptor: AltitudeDescriptor::AtOrAbove,
            alt1: alt,
            alt2: 0,
        }
    }

    pub fn at_or_below(alt: i32) -> Self {
        Self {
            descriptor: AltitudeDescriptor::AtOrBelow,
            alt1: alt,
            alt2: 0,
        }
    }

    /// Moves `altitude` into the restricted band.
    pub fn clamp(&self, altitude: f64) -> f64 {
        match self.descriptor {
            AltitudeDescriptor::At => self.alt1 as f64,
            AltitudeDescriptor::AtOrAbove => altitude.max(self.alt1 as f64),
            AltitudeDescriptor::AtOrBelow => altitude.min(self.alt1 as f64),
            AltitudeDescriptor::Between => altitude.min(self.alt1 as f64).max(self.alt2 as f64),
        }
    }
}

/// One leg of a resolved procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureLeg {
    pub leg_type: LegType,
    pub fix_ident: String,
    pub fix_region: String,
    pub fix_type: WaypointType,
    pub position: Coordinate,
    pub procedure_type: ProcedureTypes,
    pub altitude_restriction: Option<AltitudeRestriction>,
    pub speed_restriction: Option<i32>,
    pub flyover: bool,
    pub turn: TurnDirection,
    pub runway: bool,
}

impl ProcedureLeg {
    pub fn new(leg_type: LegType, fix_ident: &str, fix_type: WaypointType, position: Coordinate) -> Self {
        Self {
            leg_type,
            fix_ident: fix_ident.to_string(),
            fix_region: String::new(),
            fix_type,
            position,
            procedure_type: ProcedureTypes::NONE,
            altitude_restriction: None,
            speed_restriction: None,
            flyover: false,
            turn: TurnDirection::None,
            runway: false,
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.fix_region = region.to_string();
        self
    }

    pub fn with_altitude(mut self, restriction: AltitudeRestriction) -> Self {
        self.altitude_restriction = Some(restriction);
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed_restriction = Some(speed);
        self
    }

    pub fn with_type(mut self, procedure_type: ProcedureTypes) -> Self {
        self.procedure_type = procedure_type;
        self
    }

    pub fn runway(mut self) -> Self {
        self.runway = true;
        self
    }

    pub fn is_missed(&self) -> bool {
        self.procedure_type.intersects(ProcedureTypes::MISSED)
    }
}

/// What identifies a procedure inside the procedure store for one airport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcedureRef {
    pub ident: String,
    pub runway: String,
    pub transition: String,
}

impl ProcedureRef {
    pub fn new(ident: &str, runway: &str, transition: &str) -> Self {
        Self {
            ident: ident.to_string(),
            runway: runway.to_string(),
            transition: transition.to_string(),
        }
    }
}

/// A resolved procedure with its optional transition. Legs are tagged with the
/// procedure part they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureLegs {
    pub kind: ProcedureKind,
    pub airport_ident: String,
    pub ident: String,
    pub runway: String,
    pub transition_ident: String,
    pub transition_legs: Vec<ProcedureLeg>,
    pub legs: Vec<ProcedureLeg>,
}

impl ProcedureLegs {
    /// Legs in flying order. A SID flies its transition last, STARs and approaches fly it first.
    pub fn all_legs(&self) -> Vec<&ProcedureLeg> {
        match self.kind {
            ProcedureKind::Sid => self.legs.iter().chain(self.transition_legs.iter()).collect(),
            ProcedureKind::Star | ProcedureKind::Approach => {
                self.transition_legs.iter().chain(self.legs.iter()).collect()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty() && self.transition_legs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.legs.len() + self.transition_legs.len()
    }

    pub fn has_missed(&self) -> bool {
        self.legs.iter().any(|l| l.is_missed())
    }

    pub fn remove_transition(&mut self) {
        self.transition_ident.clear();
        self.transition_legs.clear();
    }

    pub fn remove_missed(&mut self) {
        self.legs.retain(|l| !l.is_missed());
    }

    pub fn get_ref(&self) -> ProcedureRef {
        ProcedureRef::new(&self.ident, &self.runway, &self.transition_ident)
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::flightplan::WaypointType;

    use super::*;

    #[test]
    fn test_procedure_types() {
        assert!(ProcedureTypes::ARRIVAL_ALL.contains(ProcedureTypes::STAR));
        assert!(ProcedureTypes::ARRIVAL_ALL.contains(ProcedureTypes::MISSED));
        assert!(!ProcedureTypes::ARRIVAL.intersects(ProcedureTypes::STAR_ALL));
        assert!(ProcedureTypes::ALL.contains(ProcedureTypes::DEPARTURE | ProcedureTypes::ARRIVAL_ALL));
        assert_eq!(ProcedureTypes::SID | ProcedureTypes::SID_TRANSITION, ProcedureTypes::DEPARTURE);
        assert_eq!(!ProcedureTypes::DEPARTURE, ProcedureTypes::ARRIVAL_ALL);
        assert!(ProcedureTypes::NONE.is_empty());
    }

    #[test]
    fn test_restriction_clamp() {
        assert_eq!(AltitudeRestriction::at(5000).clamp(9000.0), 5000.0);
        assert_eq!(AltitudeRestriction::at_or_above(5000).clamp(3000.0), 5000.0);
        assert_eq!(AltitudeRestriction::at_or_above(5000).clamp(7000.0), 7000.0);
        assert_eq!(AltitudeRestriction::at_or_below(5000).clamp(7000.0), 5000.0);
        let between = AltitudeRestriction {
            descriptor: AltitudeDescriptor::Between,
            alt1: 8000,
            alt2: 6000,
        };
        assert_eq!(between.clamp(9000.0), 8000.0);
        assert_eq!(between.clamp(4000.0), 6000.0);
    }

    #[test]
    fn test_flying_order() {
        let leg = |id: &str, t: ProcedureTypes| {
            ProcedureLeg::new(LegType::TrackToFix, id, WaypointType::Waypoint, Coordinate::new(1.0, 1.0)).with_type(t)
        };
        let mut star = ProcedureLegs {
            kind: ProcedureKind::Star,
            airport_ident: "KBOS".to_string(),
            ident: "STAR1".to_string(),
            runway: String::new(),
            transition_ident: "TR".to_string(),
            transition_legs: vec![leg("T1", ProcedureTypes::STAR_TRANSITION)],
            legs: vec![leg("S1", ProcedureTypes::STAR), leg("S2", ProcedureTypes::STAR)],
        };
        let ids: Vec<&str> = star.all_legs().iter().map(|l| l.fix_ident.as_str()).collect();
        assert_eq!(ids, vec!["T1", "S1", "S2"]);

        star.kind = ProcedureKind::Sid;
        let ids: Vec<&str> = star.all_legs().iter().map(|l| l.fix_ident.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "T1"]);

        star.remove_transition();
        assert_eq!(star.len(), 2);
        assert!(star.get_ref().transition.is_empty());
    }
}
