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

use crate::earth::NavDataProvider;
use crate::model::aircraft::Aircraft;
use crate::preference::RouteOptions;

use self::procedures::ProcedureStore;

pub mod controller;
pub mod error;
pub mod procedures;
#[allow(clippy::module_inception)]
pub mod route;
pub mod undo;

/// Collaborators and settings every route recomputation reads.
#[derive(Clone)]
pub struct RouteContext {
    pub nav: Arc<dyn NavDataProvider>,
    pub procedures: Arc<dyn ProcedureStore>,
    pub aircraft: Arc<Aircraft>,
    pub options: RouteOptions,
}
