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

use thiserror::Error;

/// Failures that abort an edit and leave the route unchanged.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Flight plan I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid flight plan {name}: {reason}")]
    Format { name: String, reason: String },
    #[error("Airport {0} not found")]
    UnknownAirport(String),
    #[error("Leg index {index} out of range for a route with {size} legs")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("No flight plan file name set")]
    NoFileName,
    #[error("No flight plan storage configured")]
    NoStorage,
}
