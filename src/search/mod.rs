//! The solvers that consume a [crate::navgrid::grid::NavGrid]: a route
//! search serving one agent a waypoint list and a flow solve serving many
//! agents one shared direction field
//!
//! Both price movement identically, a step costs `10` orthogonally and `14`
//! diagonally (the octile approximation of `10 * sqrt(2)`) plus the
//! effective penalty of the node stepped onto, and both drive the same
//! indexed binary heap whose positions live on the nodes themselves
//!

pub mod astar;
pub mod flow;
pub mod open_list;

use crate::navgrid::GridCoord;

/// Cost of stepping between orthogonally adjacent nodes
pub const ORTHOGONAL_COST: u32 = 10;
/// Cost of stepping between diagonally adjacent nodes, `10 * sqrt(2)`
/// rounded to keep arithmetic in integers
pub const DIAGONAL_COST: u32 = 14;

/// Price one step onto a node carrying `penalty`
pub fn step_cost(diagonal: bool, penalty: u16) -> u32 {
	let step = if diagonal { DIAGONAL_COST } else { ORTHOGONAL_COST };
	step + u32::from(penalty)
}

/// Octile distance between two nodes: the cheapest conceivable cost of
/// travelling between them when moving eight ways over unpenalised nodes,
/// which keeps it admissible as a route heuristic
pub fn octile_distance(a: GridCoord, b: GridCoord) -> u32 {
	let column_gap = a.get_column().abs_diff(b.get_column()) as u32;
	let row_gap = a.get_row().abs_diff(b.get_row()) as u32;
	let long = column_gap.max(row_gap);
	let short = column_gap.min(row_gap);
	DIAGONAL_COST * short + ORTHOGONAL_COST * (long - short)
}
