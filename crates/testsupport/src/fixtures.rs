//! Canned CSV fixtures.

/// Three columns, three rows; two blocks at the default test block size.
pub const TRIPS_CSV: &str = "A,B,C\n1,2,3\n4,5,6\n7,8,9\n";

/// Two columns with duplicate rows (DISTINCT and GROUPBY fodder).
pub const DUPES_CSV: &str = "city,fare\n1,10\n2,20\n1,10\n1,30\n2,20\n";

/// A 3x3 matrix; four tiles at tile side 2.
pub const GRID_CSV: &str = "1,2,3\n4,5,6\n7,8,9\n";

/// A symmetric 2x2 matrix.
pub const SYMMETRIC_CSV: &str = "1,2\n2,1\n";
