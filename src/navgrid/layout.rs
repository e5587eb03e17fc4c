//! A [GridLayout] describes the rectangular world-space region a navigation
//! grid covers and translates between world positions and node coordinates
//!
//! The origin of a grid sits in the bottom-left corner of its region with
//! columns growing along `+x` and rows along `+y`:
//!
//! ```text
//!  row
//!   2 | (0,2) (1,2) (2,2)
//!   1 | (0,1) (1,1) (2,1)
//!   0 | (0,0) (1,0) (2,0)
//!     +------------------
//!       0     1     2     column
//! ```
//!
//! Each node covers a square of one node diameter per side and its world
//! position refers to the centre of that square
//!

use crate::navgrid::GridCoord;
use bevy::prelude::*;

/// Dimensions of a navigation grid: the world-space region it covers and the
/// node counts derived from the node radius. Constructing a layout with a
/// non-positive node radius or a region too small to hold a single node is a
/// configuration error and panics
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct GridLayout {
	/// World-space centre of the covered region
	center: Vec2,
	/// World-space extent of the covered region along `x` and `y`
	size: Vec2,
	/// Half the side length of the square each node covers
	node_radius: f32,
	/// Side length of the square each node covers
	node_diameter: f32,
	/// Number of nodes along `x`
	columns: usize,
	/// Number of nodes along `y`
	rows: usize,
}

impl GridLayout {
	/// Create a layout covering `size` world units centred on `center` where
	/// each node covers a square `2.0 * node_radius` to a side
	pub fn new(center: Vec2, size: Vec2, node_radius: f32) -> Self {
		if node_radius <= 0.0 {
			panic!("Node radius must be a positive value, got {}", node_radius);
		}
		if size.x <= 0.0 || size.y <= 0.0 {
			panic!(
				"Grid world size must be positive along both axes, got {:?}",
				size
			);
		}
		let node_diameter = node_radius * 2.0;
		let columns = (size.x / node_diameter).round() as usize;
		let rows = (size.y / node_diameter).round() as usize;
		if columns == 0 || rows == 0 {
			panic!(
				"Grid world size {:?} cannot hold any nodes of radius {}",
				size, node_radius
			);
		}
		GridLayout {
			center,
			size,
			node_radius,
			node_diameter,
			columns,
			rows,
		}
	}
	/// Get the world-space centre of the region
	pub fn get_center(&self) -> Vec2 {
		self.center
	}
	/// Get the world-space extent of the region
	pub fn get_size(&self) -> Vec2 {
		self.size
	}
	/// Get the node radius
	pub fn get_node_radius(&self) -> f32 {
		self.node_radius
	}
	/// Get the node diameter
	pub fn get_node_diameter(&self) -> f32 {
		self.node_diameter
	}
	/// Get the number of node columns
	pub fn get_columns(&self) -> usize {
		self.columns
	}
	/// Get the number of node rows
	pub fn get_rows(&self) -> usize {
		self.rows
	}
	/// Total number of nodes the layout describes
	pub fn node_count(&self) -> usize {
		self.columns * self.rows
	}
	/// World position of the bottom-left corner of the region
	pub fn origin(&self) -> Vec2 {
		self.center - self.size / 2.0
	}
	/// Whether a world `position` falls within the covered region, inclusive
	/// of the boundary
	pub fn contains_world(&self, position: Vec2) -> bool {
		let origin = self.origin();
		let far = origin + self.size;
		position.x >= origin.x && position.x <= far.x && position.y >= origin.y && position.y <= far.y
	}
	/// Find the node containing the world `position` from its normalised
	/// offset across the region. Positions outside the region clamp to the
	/// nearest boundary node so every position maps to a node
	pub fn coord_from_world(&self, position: Vec2) -> GridCoord {
		let offset = position - self.origin();
		let percent_x = offset.x / self.size.x;
		let percent_y = offset.y / self.size.y;
		let column = ((percent_x * self.columns as f32).floor() as i64)
			.clamp(0, self.columns as i64 - 1) as usize;
		let row =
			((percent_y * self.rows as f32).floor() as i64).clamp(0, self.rows as i64 - 1) as usize;
		GridCoord::new(column, row)
	}
	/// World position of the centre of the node at `coord`. Panics if the
	/// coordinate does not exist within the layout
	pub fn world_from_coord(&self, coord: GridCoord) -> Vec2 {
		if coord.get_column() >= self.columns || coord.get_row() >= self.rows {
			panic!(
				"Node {:?} does not exist in a grid of {} columns by {} rows",
				coord, self.columns, self.rows
			);
		}
		self.origin()
			+ Vec2::new(
				coord.get_column() as f32 * self.node_diameter + self.node_radius,
				coord.get_row() as f32 * self.node_diameter + self.node_radius,
			)
	}
	/// Position of the node at `coord` within a flat row-major node array
	pub fn array_index(&self, coord: GridCoord) -> usize {
		coord.get_row() * self.columns + coord.get_column()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn layout_derives_node_counts() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(30.0, 20.0), 1.0);
		assert_eq!(15, layout.get_columns());
		assert_eq!(10, layout.get_rows());
		assert_eq!(150, layout.node_count());
	}
	#[test]
	fn layout_rounds_node_counts() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(25.0, 25.0), 0.6);
		assert_eq!(21, layout.get_columns());
		assert_eq!(21, layout.get_rows());
	}
	#[test]
	#[should_panic]
	fn layout_zero_radius() {
		GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.0);
	}
	#[test]
	#[should_panic]
	fn layout_negative_radius() {
		GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), -0.5);
	}
	#[test]
	#[should_panic]
	fn layout_degenerate_size() {
		GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5);
	}
	#[test]
	#[should_panic]
	fn layout_size_smaller_than_a_node() {
		GridLayout::new(Vec2::ZERO, Vec2::new(0.5, 10.0), 1.0);
	}
	#[test]
	fn node_world_positions() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(5.0, 5.0), 0.5);
		let result = layout.world_from_coord(GridCoord::new(0, 0));
		let actual = Vec2::new(-2.0, -2.0);
		assert_eq!(actual, result);
		let result = layout.world_from_coord(GridCoord::new(4, 4));
		let actual = Vec2::new(2.0, 2.0);
		assert_eq!(actual, result);
		let result = layout.world_from_coord(GridCoord::new(2, 2));
		let actual = Vec2::new(0.0, 0.0);
		assert_eq!(actual, result);
	}
	#[test]
	fn world_to_coord_round_trip() {
		let layout = GridLayout::new(Vec2::new(3.0, -7.0), Vec2::new(24.0, 16.0), 1.0);
		for column in 0..layout.get_columns() {
			for row in 0..layout.get_rows() {
				let coord = GridCoord::new(column, row);
				let position = layout.world_from_coord(coord);
				assert_eq!(coord, layout.coord_from_world(position));
			}
		}
	}
	#[test]
	fn out_of_bounds_positions_clamp() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.5);
		let result = layout.coord_from_world(Vec2::new(1_000_000.0, -1_000_000.0));
		let actual = GridCoord::new(9, 0);
		assert_eq!(actual, result);
		let result = layout.coord_from_world(Vec2::new(-50.0, 50.0));
		let actual = GridCoord::new(0, 9);
		assert_eq!(actual, result);
	}
	#[test]
	fn boundary_positions_stay_inside() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.5);
		let result = layout.coord_from_world(Vec2::new(5.0, 5.0));
		let actual = GridCoord::new(9, 9);
		assert_eq!(actual, result);
		assert!(layout.contains_world(Vec2::new(5.0, 5.0)));
		assert!(!layout.contains_world(Vec2::new(5.1, 5.0)));
	}
	#[test]
	fn array_index_is_row_major() {
		let layout = GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.5);
		assert_eq!(0, layout.array_index(GridCoord::new(0, 0)));
		assert_eq!(9, layout.array_index(GridCoord::new(9, 0)));
		assert_eq!(10, layout.array_index(GridCoord::new(0, 1)));
		assert_eq!(99, layout.array_index(GridCoord::new(9, 9)));
	}
}
