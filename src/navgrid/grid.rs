//! A [NavGrid] owns every [NavNode] covering its world region in a flat
//! row-major arena. Building one samples an injected walkability probe once
//! per node, so the same layout and probe always produce the same grid
//!
//! ```text
//!  row 2 | 6 7 8        arena index = row * columns + column
//!  row 1 | 3 4 5
//!  row 0 | 0 1 2
//! ```
//!

use crate::navgrid::direction::Direction;
use crate::navgrid::layout::GridLayout;
use crate::navgrid::node::{NavNode, Passability};
use crate::navgrid::GridCoord;
use bevy::prelude::*;

/// A navigation grid over a rectangular world region: a [GridLayout] plus a
/// flat arena of [NavNode]. Searches and flow solves borrow the arena and
/// store their scratch inside the nodes, so the grid also tracks the serial
/// numbers which keep one search's scratch from leaking into the next
#[derive(Component, Clone)]
pub struct NavGrid {
	/// The world region and node dimensions this grid covers
	layout: GridLayout,
	/// Every node of the grid in row-major order
	nodes: Vec<NavNode>,
	/// Serial number handed to the most recent route search
	search_serial: u32,
	/// Incremented whenever a flow solve overwrites the per-node flow data
	flow_generation: u64,
}

impl NavGrid {
	/// Build a grid from `layout`, sampling `is_blocked` at the centre of
	/// every node. Nodes where the probe reports `true` become [Passability::Wall],
	/// all others start [Passability::Open]
	pub fn build<F: Fn(Vec2) -> bool>(layout: GridLayout, is_blocked: F) -> Self {
		let mut nodes = Vec::with_capacity(layout.node_count());
		for row in 0..layout.get_rows() {
			for column in 0..layout.get_columns() {
				let coord = GridCoord::new(column, row);
				let world_position = layout.world_from_coord(coord);
				let passability = if is_blocked(world_position) {
					Passability::Wall
				} else {
					Passability::Open
				};
				nodes.push(NavNode::new(coord, world_position, passability));
			}
		}
		debug!(
			"Built nav grid of {} columns by {} rows covering {:?} world units",
			layout.get_columns(),
			layout.get_rows(),
			layout.get_size()
		);
		NavGrid {
			layout,
			nodes,
			search_serial: 0,
			flow_generation: 0,
		}
	}
	/// Build a grid from `layout` where every node starts [Passability::Open]
	pub fn build_open(layout: GridLayout) -> Self {
		NavGrid::build(layout, |_| false)
	}
	/// Throw away every node and sample `is_blocked` afresh over the same
	/// layout. Obstacles registered on the old nodes are gone; whoever owns
	/// them is expected to re-apply them
	pub fn rebuild<F: Fn(Vec2) -> bool>(&mut self, is_blocked: F) {
		let rebuilt = NavGrid::build(self.layout, is_blocked);
		self.nodes = rebuilt.nodes;
		self.flow_generation += 1;
	}
	/// Get the layout of the covered world region
	pub fn get_layout(&self) -> &GridLayout {
		&self.layout
	}
	/// Arena position of the node at `coord`, panics for coordinates outside
	/// the grid
	fn index(&self, coord: GridCoord) -> usize {
		if coord.get_column() >= self.layout.get_columns() || coord.get_row() >= self.layout.get_rows()
		{
			panic!(
				"Node {:?} does not exist in a grid of {} columns by {} rows",
				coord,
				self.layout.get_columns(),
				self.layout.get_rows()
			);
		}
		self.layout.array_index(coord)
	}
	/// Arena index of the node at `coord`, panics for coordinates outside
	/// the grid
	pub fn index_of(&self, coord: GridCoord) -> u32 {
		self.index(coord) as u32
	}
	/// The `(column, row)` position of the node at an arena `index`
	pub fn coord_of_index(&self, index: u32) -> GridCoord {
		let columns = self.layout.get_columns();
		GridCoord::new(index as usize % columns, index as usize / columns)
	}
	/// Get the node at `coord`, panics for coordinates outside the grid
	pub fn get_node(&self, coord: GridCoord) -> &NavNode {
		&self.nodes[self.index(coord)]
	}
	/// Get a mutable handle on the node at `coord`, panics for coordinates
	/// outside the grid
	pub fn get_node_mut(&mut self, coord: GridCoord) -> &mut NavNode {
		let index = self.index(coord);
		&mut self.nodes[index]
	}
	/// Get the node at an arena `index`
	pub fn node_at_index(&self, index: u32) -> &NavNode {
		&self.nodes[index as usize]
	}
	/// Get a mutable handle on the node at an arena `index`
	pub fn node_at_index_mut(&mut self, index: u32) -> &mut NavNode {
		&mut self.nodes[index as usize]
	}
	/// Find the node containing a world `position`, clamping positions
	/// outside the region to the nearest boundary node
	pub fn get_node_from_world(&self, position: Vec2) -> &NavNode {
		self.get_node(self.layout.coord_from_world(position))
	}
	/// Find the `(column, row)` of the node containing a world `position`,
	/// clamping positions outside the region to the nearest boundary node
	pub fn coord_from_world(&self, position: Vec2) -> GridCoord {
		self.layout.coord_from_world(position)
	}
	/// The orthogonal neighbours of `coord` within the grid (up to 4)
	pub fn neighbours_four(&self, coord: GridCoord) -> Vec<GridCoord> {
		Direction::orthogonal_neighbours(coord, self.layout.get_columns(), self.layout.get_rows())
	}
	/// The orthogonal and diagonal neighbours of `coord` within the grid (up to 8)
	pub fn neighbours_eight(&self, coord: GridCoord) -> Vec<GridCoord> {
		Direction::all_neighbours(coord, self.layout.get_columns(), self.layout.get_rows())
	}
	/// Replace the base passability of the node at `coord`, used by hosts to
	/// stamp holes and ledges onto a built grid
	pub fn set_base_passability(&mut self, coord: GridCoord, passability: Passability) {
		self.get_node_mut(coord).set_base_passability(passability);
	}
	/// Claim a fresh serial for a route search. Stale scratch from earlier
	/// searches is invalidated by the stamp comparison rather than a sweep
	/// over the arena; the rare wrap of the serial performs one full sweep
	/// so an ancient stamp can never alias a live one
	pub fn next_search_stamp(&mut self) -> u32 {
		if self.search_serial == u32::MAX {
			for node in self.nodes.iter_mut() {
				node.reset_search_scratch(0);
			}
			self.search_serial = 0;
		}
		self.search_serial += 1;
		self.search_serial
	}
	/// Generation of the per-node flow data, incremented by every solve and
	/// grid rebuild
	pub fn get_flow_generation(&self) -> u64 {
		self.flow_generation
	}
	/// Move to the next flow generation, returning it
	pub fn bump_flow_generation(&mut self) -> u64 {
		self.flow_generation += 1;
		self.flow_generation
	}
	/// Read-only view over the whole node arena in row-major order
	pub fn nodes(&self) -> &[NavNode] {
		&self.nodes
	}
	/// Clear the flow scratch of every node back to unreached
	pub fn reset_all_flow(&mut self) {
		for node in self.nodes.iter_mut() {
			node.reset_flow();
		}
	}
}
