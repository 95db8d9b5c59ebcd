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

use chrono::{DateTime, Utc};
use log::debug;

use crate::model::flightplan::Flightplan;

/// Kind of a route edit. Consecutive commands of a mergeable kind collapse into one
/// undo step when merging is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCmdType {
    Edit,
    Delete,
    Move,
    Altitude,
    Reverse,
}

impl RouteCmdType {
    pub fn is_mergeable(&self) -> bool {
        *self != RouteCmdType::Edit
    }
}

/// Before and after snapshots of one edit.
#[derive(Debug, Clone)]
pub struct RouteCommand {
    text: String,
    cmd_type: RouteCmdType,
    before: Flightplan,
    after: Flightplan,
    created: DateTime<Utc>,
}

impl RouteCommand {
    /// Starts a command from the current plan. Procedure entries are not kept as
    /// they are rebuilt from the plan properties.
    pub fn new(text: &str, cmd_type: RouteCmdType, current: &Flightplan) -> Self {
        let mut before = current.clone();
        before.remove_no_save_entries();
        Self {
            text: text.to_string(),
            cmd_type,
            after: before.clone(),
            before,
            created: Utc::now(),
        }
    }

    pub fn set_after(&mut self, current: &Flightplan) {
        let mut after = current.clone();
        after.remove_no_save_entries();
        self.after = after;
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn get_type(&self) -> RouteCmdType {
        self.cmd_type
    }

    pub fn get_before(&self) -> &Flightplan {
        &self.before
    }

    pub fn get_after(&self) -> &Flightplan {
        &self.after
    }

    pub fn get_created(&self) -> &DateTime<Utc> {
        &self.created
    }
}

/// Linear undo stack. Commands below `index` can be undone, the rest redone.
#[derive(Debug)]
pub struct UndoLog {
    commands: Vec<RouteCommand>,
    index: usize,
    clean_index: Option<usize>,
    limit: usize,
    merge: bool,
}

impl UndoLog {
    pub fn new(limit: usize, merge: bool) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            clean_index: Some(0),
            limit: limit.max(1),
            merge,
        }
    }

    /// Pushes a finished command. Discards anything that could be redone.
    pub fn push(&mut self, command: RouteCommand) {
        self.commands.truncate(self.index);
        if self.clean_index.is_some_and(|clean| clean > self.index) {
            self.clean_index = None;
        }

        if let Some(top) = self.commands.last_mut() {
            if self.merge && command.cmd_type.is_mergeable() && top.cmd_type == command.cmd_type {
                debug!("Merging {} into {} at undo index {}", command.text, top.text, self.index);
                top.after = command.after;
                if self.clean_index == Some(self.index) {
                    self.clean_index = None;
                }
                return;
            }
        }

        debug!("Pushing {} at undo index {}", command.text, self.index);
        self.commands.push(command);
        self.index += 1;

        if self.commands.len() > self.limit {
            self.commands.remove(0);
            self.index -= 1;
            self.clean_index = match self.clean_index {
                Some(clean) if clean > 0 => Some(clean - 1),
                _ => None,
            };
        }
    }

    /// Steps back and returns the plan to restore.
    pub fn undo(&mut self) -> Option<Flightplan> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        debug!("Undo {} to index {}", self.commands[self.index].text, self.index);
        Some(self.commands[self.index].before.clone())
    }

    /// Steps forward and returns the plan to restore.
    pub fn redo(&mut self) -> Option<Flightplan> {
        let command = self.commands.get(self.index)?;
        debug!("Redo {} to index {}", command.text, self.index + 1);
        let plan = command.after.clone();
        self.index += 1;
        Some(plan)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    pub fn undo_text(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.get_text())
    }

    pub fn redo_text(&self) -> Option<&str> {
        self.commands.get(self.index).map(|c| c.get_text())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Marks the current position as saved.
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.index);
    }

    /// Forgets the saved position so the route reports changes until the next save.
    pub fn set_unclean(&mut self) {
        self.clean_index = None;
    }

    pub fn has_changed(&self) -> bool {
        self.clean_index != Some(self.index)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.index = 0;
        self.clean_index = Some(0);
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        while self.commands.len() > self.limit {
            self.commands.remove(0);
            self.index = self.index.saturating_sub(1);
            self.clean_index = match self.clean_index {
                Some(clean) if clean > 0 => Some(clean - 1),
                _ => None,
            };
        }
    }

    pub fn set_merge(&mut self, merge: bool) {
        self.merge = merge;
    }
}

#[cfg(test)]
mod tests {
    use crate::model::flightplan::Flightplan;

    use super::{RouteCmdType, RouteCommand, UndoLog};

    fn plan(altitude: i32) -> Flightplan {
        let mut plan = Flightplan::new();
        plan.set_cruise_altitude(altitude);
        plan
    }

    fn edit(log: &mut UndoLog, cmd_type: RouteCmdType, from: i32, to: i32) {
        let mut command = RouteCommand::new("Change", cmd_type, &plan(from));
        command.set_after(&plan(to));
        log.push(command);
    }

    #[test]
    fn test_undo_redo() {
        let mut log = UndoLog::new(10, false);
        assert!(!log.has_changed());
        edit(&mut log, RouteCmdType::Edit, 1000, 2000);
        edit(&mut log, RouteCmdType::Edit, 2000, 3000);
        assert!(log.has_changed());
        assert_eq!(log.undo_text(), Some("Change"));

        assert_eq!(log.undo().map(|p| p.get_cruise_altitude()), Some(2000));
        assert_eq!(log.undo().map(|p| p.get_cruise_altitude()), Some(1000));
        assert!(log.undo().is_none());
        assert!(!log.has_changed());

        assert_eq!(log.redo().map(|p| p.get_cruise_altitude()), Some(2000));
        assert_eq!(log.redo().map(|p| p.get_cruise_altitude()), Some(3000));
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_push_discards_redo() {
        let mut log = UndoLog::new(10, false);
        edit(&mut log, RouteCmdType::Edit, 1000, 2000);
        edit(&mut log, RouteCmdType::Edit, 2000, 3000);
        log.undo();
        assert!(log.can_redo());
        edit(&mut log, RouteCmdType::Edit, 2000, 5000);
        assert!(!log.can_redo());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_merge() {
        let mut log = UndoLog::new(10, true);
        for i in 0..10 {
            edit(&mut log, RouteCmdType::Altitude, 1000 * i, 1000 * (i + 1));
        }
        assert_eq!(log.len(), 1);
        assert_eq!(log.index(), 1);
        assert_eq!(log.undo().map(|p| p.get_cruise_altitude()), Some(0));
        assert_eq!(log.redo().map(|p| p.get_cruise_altitude()), Some(10000));

        // Edits never merge
        edit(&mut log, RouteCmdType::Edit, 10000, 11000);
        edit(&mut log, RouteCmdType::Edit, 11000, 12000);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_clean_index() {
        let mut log = UndoLog::new(10, false);
        edit(&mut log, RouteCmdType::Edit, 1000, 2000);
        log.set_clean();
        assert!(!log.has_changed());
        edit(&mut log, RouteCmdType::Edit, 2000, 3000);
        assert!(log.has_changed());
        log.undo();
        assert!(!log.has_changed());

        // Saved state is lost once a new branch replaces it
        log.undo();
        edit(&mut log, RouteCmdType::Edit, 1000, 4000);
        assert!(log.has_changed());
        log.undo();
        assert!(log.has_changed());

        log.set_unclean();
        log.clear();
        assert!(!log.has_changed());
    }

    #[test]
    fn test_merge_after_save_is_a_change() {
        let mut log = UndoLog::new(10, true);
        edit(&mut log, RouteCmdType::Altitude, 1000, 2000);
        log.set_clean();
        edit(&mut log, RouteCmdType::Altitude, 2000, 3000);
        assert!(log.has_changed());
    }

    #[test]
    fn test_limit() {
        let mut log = UndoLog::new(3, false);
        for i in 0..5 {
            edit(&mut log, RouteCmdType::Edit, 1000 * i, 1000 * (i + 1));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.index(), 3);
        assert!(log.has_changed());
        log.undo();
        log.undo();
        assert_eq!(log.undo().map(|p| p.get_cruise_altitude()), Some(2000));
        assert!(!log.can_undo());

        log.set_limit(1);
        assert_eq!(log.len(), 1);
    }
}
