//! Compass directions across the node grid, used for neighbour discovery,
//! flow directions and converting grid steps into world-space unit vectors
//!

use crate::navgrid::GridCoord;
use bevy::prelude::*;

/// The eight directions of movement between neighbouring nodes. The grid
/// origin sits in the bottom-left corner of the world region so `North`
/// means a step towards `+y` (row + 1) and `East` a step towards `+x`
/// (column + 1)
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Direction {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
	/// Special case, used to indicate the absence of a direction, either a
	/// node no flow solve has reached or a node which is itself a target
	#[default]
	Zero,
}

impl Direction {
	/// The `(column, row)` delta a step in this direction applies to a node position
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Direction::North => (0, 1),
			Direction::East => (1, 0),
			Direction::South => (0, -1),
			Direction::West => (-1, 0),
			Direction::NorthEast => (1, 1),
			Direction::SouthEast => (1, -1),
			Direction::SouthWest => (-1, -1),
			Direction::NorthWest => (-1, 1),
			Direction::Zero => (0, 0),
		}
	}
	/// Returns the opposite [Direction] of the current
	pub fn inverse(&self) -> Direction {
		match self {
			Direction::North => Direction::South,
			Direction::East => Direction::West,
			Direction::South => Direction::North,
			Direction::West => Direction::East,
			Direction::NorthEast => Direction::SouthWest,
			Direction::SouthEast => Direction::NorthWest,
			Direction::SouthWest => Direction::NorthEast,
			Direction::NorthWest => Direction::SouthEast,
			Direction::Zero => Direction::Zero,
		}
	}
	/// Whether a step in this direction moves along both axes at once
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Direction::NorthEast
				| Direction::SouthEast
				| Direction::SouthWest
				| Direction::NorthWest
		)
	}
	/// A world-space unit vector pointing along this direction. [Direction::Zero]
	/// produces `Vec2::ZERO` rather than a unit length vector
	pub fn as_unit_vector(&self) -> Vec2 {
		let (column, row) = self.offset();
		Vec2::new(column as f32, row as f32).normalize_or_zero()
	}
	/// For two cells next to each other find the [Direction] pointing from
	/// `source` to `target`. Panics if the two cells are not orthogonally or
	/// diagonally adjacent
	pub fn between(source: GridCoord, target: GridCoord) -> Self {
		let delta = (
			target.get_column() as i32 - source.get_column() as i32,
			target.get_row() as i32 - source.get_row() as i32,
		);
		match delta {
			(0, 1) => Direction::North,
			(1, 1) => Direction::NorthEast,
			(1, 0) => Direction::East,
			(1, -1) => Direction::SouthEast,
			(0, -1) => Direction::South,
			(-1, -1) => Direction::SouthWest,
			(-1, 0) => Direction::West,
			(-1, 1) => Direction::NorthWest,
			_ => panic!(
				"Cell {:?} is not orthogonally or diagonally adjacent to {:?}",
				target, source
			),
		}
	}
	/// Step one cell from `coord` in this direction, `None` if the step
	/// leaves a grid of `columns` by `rows` nodes
	pub fn step_from(&self, coord: GridCoord, columns: usize, rows: usize) -> Option<GridCoord> {
		let (delta_column, delta_row) = self.offset();
		let column = coord.get_column() as i32 + delta_column;
		let row = coord.get_row() as i32 + delta_row;
		if column >= 0 && column < columns as i32 && row >= 0 && row < rows as i32 {
			Some(GridCoord::new(column as usize, row as usize))
		} else {
			None
		}
	}
	/// Based on a nodes `(column, row)` position find its orthogonal
	/// neighbours within the grid limits (up to 4)
	pub fn orthogonal_neighbours(coord: GridCoord, columns: usize, rows: usize) -> Vec<GridCoord> {
		let (column, row) = coord.get();
		let mut neighbours = Vec::new();
		if row < rows - 1 {
			neighbours.push(GridCoord::new(column, row + 1)); // northern cell coords
		}
		if column < columns - 1 {
			neighbours.push(GridCoord::new(column + 1, row)); // eastern cell coords
		}
		if row > 0 {
			neighbours.push(GridCoord::new(column, row - 1)); // southern cell coords
		}
		if column > 0 {
			neighbours.push(GridCoord::new(column - 1, row)); // western cell coords
		}
		neighbours
	}
	/// Based on a nodes `(column, row)` position find all possible
	/// neighbours including diagonal directions (up to 8)
	pub fn all_neighbours(coord: GridCoord, columns: usize, rows: usize) -> Vec<GridCoord> {
		let (column, row) = coord.get();
		let mut neighbours = Vec::new();
		if row < rows - 1 {
			neighbours.push(GridCoord::new(column, row + 1)); // northern cell coords
		}
		if column < columns - 1 {
			neighbours.push(GridCoord::new(column + 1, row)); // eastern cell coords
		}
		if row > 0 {
			neighbours.push(GridCoord::new(column, row - 1)); // southern cell coords
		}
		if column > 0 {
			neighbours.push(GridCoord::new(column - 1, row)); // western cell coords
		}
		if column < columns - 1 && row < rows - 1 {
			neighbours.push(GridCoord::new(column + 1, row + 1)); // north-east cell
		}
		if column < columns - 1 && row > 0 {
			neighbours.push(GridCoord::new(column + 1, row - 1)); // south-east cell
		}
		if column > 0 && row > 0 {
			neighbours.push(GridCoord::new(column - 1, row - 1)); // south-west cell
		}
		if column > 0 && row < rows - 1 {
			neighbours.push(GridCoord::new(column - 1, row + 1)); // north-west cell
		}
		neighbours
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn orthogonal_neighbours_bottom_left() {
		let coord = GridCoord::new(0, 0);
		let result = Direction::orthogonal_neighbours(coord, 10, 10);
		let actual = vec![GridCoord::new(0, 1), GridCoord::new(1, 0)];
		assert_eq!(actual, result);
	}
	#[test]
	fn orthogonal_neighbours_top_right() {
		let coord = GridCoord::new(9, 9);
		let result = Direction::orthogonal_neighbours(coord, 10, 10);
		let actual = vec![GridCoord::new(9, 8), GridCoord::new(8, 9)];
		assert_eq!(actual, result);
	}
	#[test]
	fn orthogonal_neighbours_centre() {
		let coord = GridCoord::new(4, 4);
		let result = Direction::orthogonal_neighbours(coord, 10, 10);
		let actual = vec![
			GridCoord::new(4, 5),
			GridCoord::new(5, 4),
			GridCoord::new(4, 3),
			GridCoord::new(3, 4),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn all_neighbours_centre() {
		let coord = GridCoord::new(4, 4);
		let result = Direction::all_neighbours(coord, 10, 10);
		let actual = vec![
			GridCoord::new(4, 5),
			GridCoord::new(5, 4),
			GridCoord::new(4, 3),
			GridCoord::new(3, 4),
			GridCoord::new(5, 5),
			GridCoord::new(5, 3),
			GridCoord::new(3, 3),
			GridCoord::new(3, 5),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn all_neighbours_bottom_edge() {
		let coord = GridCoord::new(5, 0);
		let result = Direction::all_neighbours(coord, 10, 10);
		let actual = vec![
			GridCoord::new(5, 1),
			GridCoord::new(6, 0),
			GridCoord::new(4, 0),
			GridCoord::new(6, 1),
			GridCoord::new(4, 1),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn direction_between_north() {
		let source = GridCoord::new(6, 2);
		let target = GridCoord::new(6, 3);
		let result = Direction::between(source, target);
		let actual = Direction::North;
		assert_eq!(actual, result);
	}
	#[test]
	fn direction_between_south_west() {
		let source = GridCoord::new(7, 8);
		let target = GridCoord::new(6, 7);
		let result = Direction::between(source, target);
		let actual = Direction::SouthWest;
		assert_eq!(actual, result);
	}
	#[test]
	fn direction_between_east() {
		let source = GridCoord::new(5, 7);
		let target = GridCoord::new(6, 7);
		let result = Direction::between(source, target);
		let actual = Direction::East;
		assert_eq!(actual, result);
	}
	#[test]
	#[should_panic]
	fn direction_between_non_adjacent() {
		let source = GridCoord::new(1, 1);
		let target = GridCoord::new(4, 1);
		Direction::between(source, target);
	}
	#[test]
	fn direction_inverse() {
		assert_eq!(Direction::South, Direction::North.inverse());
		assert_eq!(Direction::NorthWest, Direction::SouthEast.inverse());
		assert_eq!(Direction::Zero, Direction::Zero.inverse());
	}
	#[test]
	fn diagonal_unit_vector_is_normalised() {
		let vector = Direction::NorthEast.as_unit_vector();
		assert!((vector.length() - 1.0).abs() < f32::EPSILON);
		assert!(vector.x > 0.0 && vector.y > 0.0);
	}
	#[test]
	fn zero_unit_vector() {
		let actual = Vec2::ZERO;
		assert_eq!(actual, Direction::Zero.as_unit_vector());
	}
	#[test]
	fn step_from_edge_leaves_grid() {
		let coord = GridCoord::new(0, 3);
		assert_eq!(None, Direction::West.step_from(coord, 10, 10));
		let stepped = Direction::NorthEast.step_from(coord, 10, 10);
		assert_eq!(Some(GridCoord::new(1, 4)), stepped);
	}
}
