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

// Range filer for determining if a location is within the specified distance of a coordinate

use crate::earth::coordinate::Coordinate;
use crate::model::location::Location;

pub trait Filter {
    fn filter(&self, location: &dyn Location) -> bool;
}

pub struct RangeFilter {
    this: Coordinate,
    range: f64,
    rough_lat_sep: f64,
    rough_long_sep: f64,
}

impl RangeFilter {
    pub fn new(centre: &Coordinate, range: f64) -> Self {
        // We do a little optimization here rather than calculating
        // all distances accurately; we make a quick rough calculation to exclude many coordinates
        let rough_lat_sep = range / 60.0;
        let x = centre.get_latitude().to_radians().cos();
        let rough_long_sep = if x < 0.01 { 181.0 } else { range / (60.0 * x) };

        Self {
            this: *centre,
            range,
            rough_lat_sep,
            rough_long_sep,
        }
    }
}

impl Filter for RangeFilter {
    // returns true if the location passes the filter
    fn filter(&self, location: &dyn Location) -> bool {
        let other = location.get_loc();
        let mut long_sep = (self.this.get_longitude() - other.get_longitude()).abs();
        if long_sep > 180.0 {
            long_sep = 360.0 - long_sep;
        }
        if (self.this.get_latitude() - other.get_latitude()).abs() < self.rough_lat_sep
            && long_sep < self.rough_long_sep
        {
            self.this.distance_to(other) <= self.range
        } else {
            false
        }
    }
}

pub struct IdFilter {
    term: String,
}

impl IdFilter {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
        }
    }
}

impl Filter for IdFilter {
    fn filter(&self, location: &dyn Location) -> bool {
        location.get_id().eq_ignore_ascii_case(&self.term)
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::test_utils::tests::make_airport_at;

    use super::{Filter, IdFilter, RangeFilter};

    #[test]
    fn test_range_filter() {
        let filter = RangeFilter::new(&Coordinate::new(-34.0, 151.0), 50.0);
        let near = make_airport_at("YSSY", -34.5, 151.0);
        let far = make_airport_at("YSCB", -35.3, 149.2);
        assert!(filter.filter(&*near));
        assert!(!filter.filter(&*far));
    }

    #[test]
    fn test_range_filter_date_line() {
        let filter = RangeFilter::new(&Coordinate::new(0.0, 179.9), 30.0);
        let across = make_airport_at("NFFN", 0.0, -179.9);
        assert!(filter.filter(&*across));
    }

    #[test]
    fn test_id_filter() {
        let filter = IdFilter::new("kjfk");
        assert!(filter.filter(&*make_airport_at("KJFK", 40.6, -73.7)));
        assert!(!filter.filter(&*make_airport_at("KBOS", 42.3, -71.0)));
    }
}
