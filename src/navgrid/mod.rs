//! Obstacle-aware navigation grids
//!
//! A world region is carved into a grid of square nodes. Each node knows
//! whether agents can walk on it, overlap it or must route around it, and
//! how expensive stepping onto it is. Obstacles claim and release nodes as
//! they appear and move; route searches and flow solves read the effective
//! node states the obstacles produce
//!
//! # Definitions
//!
//! * `Node` - one square of the grid, identified by a `(column, row)`
//!   [GridCoord] and positioned at the centre of the square it covers
//! * `Walkability probe` - a host supplied predicate sampled once per node
//!   when the grid is built, answering whether the world blocks that point
//! * `Base state` - the passability and penalty a node was built with
//! * `Effective state` - the base state combined with every obstacle
//!   currently claiming the node, which is what searches actually read
//! * `Composite grid` - several grids queried as one surface with an
//!   explicit policy for the space between them
//!

pub mod composite;
pub mod direction;
pub mod grid;
pub mod layout;
pub mod node;
pub mod obstacle;

use bevy::prelude::*;

/// Identifies a node of a grid by its `(column, row)` position. Columns
/// grow along `+x` from the bottom-left origin of the grid and rows along
/// `+y`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub struct GridCoord((usize, usize));

impl GridCoord {
	/// Create a coordinate from a `column` and `row`
	pub fn new(column: usize, row: usize) -> Self {
		GridCoord((column, row))
	}
	/// Get the column of the coordinate
	pub fn get_column(&self) -> usize {
		self.0 .0
	}
	/// Get the row of the coordinate
	pub fn get_row(&self) -> usize {
		self.0 .1
	}
	/// Get the `(column, row)` pair
	pub fn get(&self) -> (usize, usize) {
		self.0
	}
}
