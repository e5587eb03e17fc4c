//! Multi-source cost propagation producing a shared direction field: one
//! solve stamps every node of a [NavGrid] with the cheapest known cost to
//! the nearest target and the direction of travel that shrinks it, then any
//! number of agents read the result through a [FlowFieldView] without
//! running searches of their own
//!
//! Targets carry a weight bias. A heavier target seeds the propagation
//! cheaper, so when two targets are reachable at similar distances agents
//! drift toward the more important one
//!

use crate::navgrid::direction::Direction;
use crate::navgrid::grid::NavGrid;
use crate::navgrid::layout::GridLayout;
use crate::navgrid::node::UNQUEUED;
use crate::navgrid::GridCoord;
use crate::search::open_list::OpenList;
use crate::search::step_cost;
use bevy::prelude::*;
use std::collections::BTreeMap;

/// A world position agents should converge on, with a bias making heavier
/// targets behave as if they were closer
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FlowTarget {
	/// Where the target sits in world space
	position: Vec2,
	/// Relative importance, heavier targets draw agents from further away
	weight: u16,
}

impl FlowTarget {
	/// Create a target at `position` with a relative `weight`
	pub fn new(position: Vec2, weight: u16) -> Self {
		FlowTarget { position, weight }
	}
	/// Get where the target sits in world space
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
	/// Get the relative importance of the target
	pub fn get_weight(&self) -> u16 {
		self.weight
	}
}

/// What a solve accomplished: which generation of field it produced, which
/// nodes it seeded and how much of the grid the propagation reached
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSummary {
	/// Identifies the field produced, each solve increments it
	generation: u64,
	/// The nodes targets were actually planted on
	seeds: Vec<GridCoord>,
	/// How many nodes ended up with a finite cost, seeds included
	reached: usize,
}

impl FlowSummary {
	/// Get the field generation this solve produced
	pub fn get_generation(&self) -> u64 {
		self.generation
	}
	/// Get the nodes targets were actually planted on
	pub fn get_seeds(&self) -> &[GridCoord] {
		&self.seeds
	}
	/// Get how many nodes ended up with a finite cost
	pub fn get_reached(&self) -> usize {
		self.reached
	}
}

/// Solve the direction field for `targets` over the whole grid, replacing
/// whatever field a previous solve left behind
///
/// Positions outside the grid clamp to the boundary node first. Targets
/// landing on walls or holes are skipped with a warning, they cannot be
/// stood on so no agent should be steered into them. Walls are never
/// expanded into; holes pick up costs and directions so agents can cross
/// them, they just never seed the field. Nodes no target can reach keep an
/// infinite cost and a zero direction, callers check either before trusting
/// the field
pub fn solve_flow(grid: &mut NavGrid, targets: &[FlowTarget]) -> FlowSummary {
	grid.reset_all_flow();
	let generation = grid.bump_flow_generation();
	let max_weight = targets
		.iter()
		.map(FlowTarget::get_weight)
		.max()
		.unwrap_or(0);
	// dedupe targets sharing a node, the cheaper seed wins
	let mut seed_costs: BTreeMap<u32, u32> = BTreeMap::new();
	for target in targets {
		let coord = grid.coord_from_world(target.get_position());
		if !grid.get_node(coord).is_walkable() {
			warn!(
				"Flow target at {:?} skipped, node {:?} cannot be stood on",
				target.get_position(),
				coord
			);
			continue;
		}
		let cost = u32::from(max_weight - target.get_weight());
		let index = grid.index_of(coord);
		seed_costs
			.entry(index)
			.and_modify(|existing| *existing = (*existing).min(cost))
			.or_insert(cost);
	}
	if seed_costs.is_empty() {
		warn!("Flow solve seeded no targets, the field is empty");
		return FlowSummary {
			generation,
			seeds: Vec::new(),
			reached: 0,
		};
	}
	let stamp = grid.next_search_stamp();
	let mut open = OpenList::with_capacity(seed_costs.len());
	let mut seeds = Vec::with_capacity(seed_costs.len());
	for (&index, &cost) in seed_costs.iter() {
		grid.node_at_index_mut(index).reset_search_scratch(stamp);
		grid.node_at_index_mut(index).set_flow_cost(cost);
		seeds.push(grid.coord_of_index(index));
		open.push(grid, index, (cost, 0));
	}
	let mut reached = 0;
	while let Some(current_index) = open.pop(grid) {
		reached += 1;
		let current_coord = grid.coord_of_index(current_index);
		let current_cost = grid.node_at_index(current_index).get_flow_cost();
		for neighbour_coord in grid.neighbours_eight(current_coord) {
			let neighbour_index = grid.index_of(neighbour_coord);
			if grid.node_at_index(neighbour_index).get_search_stamp() != stamp {
				grid.node_at_index_mut(neighbour_index).reset_search_scratch(stamp);
			}
			let neighbour = grid.node_at_index(neighbour_index);
			if !neighbour.can_overlap() {
				continue;
			}
			let diagonal = neighbour_coord.get_column() != current_coord.get_column()
				&& neighbour_coord.get_row() != current_coord.get_row();
			let candidate =
				current_cost.saturating_add(step_cost(diagonal, neighbour.get_penalty()));
			if candidate < neighbour.get_flow_cost() {
				let was_queued = neighbour.get_heap_index() != UNQUEUED;
				let node = grid.node_at_index_mut(neighbour_index);
				node.set_flow_cost(candidate);
				node.set_flow_dir(Direction::between(neighbour_coord, current_coord));
				if was_queued {
					open.update(grid, neighbour_index, (candidate, 0));
				} else {
					open.push(grid, neighbour_index, (candidate, 0));
				}
			}
		}
	}
	debug!(
		"Flow generation {} solved from {} seeds, {} nodes reached",
		generation,
		seeds.len(),
		reached
	);
	FlowSummary {
		generation,
		seeds,
		reached,
	}
}

/// The nodes an agent of a given size covers, cached as coordinate offsets
/// so the per-query work is a handful of lookups instead of a fresh
/// bounding-box scan
#[derive(Debug, Clone, PartialEq)]
pub struct AgentFootprint {
	/// Radius of the agent in world units
	radius: f32,
	/// Node offsets relative to the node the agent is centred on
	offsets: Vec<(i32, i32)>,
}

impl AgentFootprint {
	/// Compute the footprint of an agent of `radius` standing on a grid of
	/// the given layout. A node is covered when its centre lies strictly
	/// within the combined agent and node radii. Panics when `radius` is not
	/// a positive number, agent sizes are fixed configuration
	pub fn new(radius: f32, layout: &GridLayout) -> Self {
		if radius <= 0.0 {
			panic!("Agent radius must be positive, got {}", radius);
		}
		let reach = radius + layout.get_node_radius();
		let diameter = layout.get_node_diameter();
		let span = (reach / diameter).floor() as i32;
		let mut offsets = Vec::new();
		for row in -span..=span {
			for column in -span..=span {
				let distance = Vec2::new(column as f32 * diameter, row as f32 * diameter).length();
				if distance < reach {
					offsets.push((column, row));
				}
			}
		}
		AgentFootprint { radius, offsets }
	}
	/// Get the radius of the agent in world units
	pub fn get_radius(&self) -> f32 {
		self.radius
	}
	/// Number of nodes the footprint covers
	pub fn node_span(&self) -> usize {
		self.offsets.len()
	}
	/// Whether an agent centred on `coord` fits: every covered node must sit
	/// inside the grid and report that agents can overlap it
	pub fn fits(&self, grid: &NavGrid, coord: GridCoord) -> bool {
		let layout = grid.get_layout();
		let columns = layout.get_columns() as i64;
		let rows = layout.get_rows() as i64;
		for (column_offset, row_offset) in &self.offsets {
			let column = coord.get_column() as i64 + i64::from(*column_offset);
			let row = coord.get_row() as i64 + i64::from(*row_offset);
			if column < 0 || column >= columns || row < 0 || row >= rows {
				return false;
			}
			let covered = GridCoord::new(column as usize, row as usize);
			if !grid.get_node(covered).can_overlap() {
				return false;
			}
		}
		true
	}
}

/// Read access to the direction field a solve left on the grid. Cheap to
/// construct, many agents borrow one per frame
pub struct FlowFieldView<'a> {
	/// The grid carrying the solved field
	grid: &'a NavGrid,
}

impl<'a> FlowFieldView<'a> {
	/// Borrow the field currently stored on `grid`
	pub fn new(grid: &'a NavGrid) -> Self {
		FlowFieldView { grid }
	}
	/// Which solve produced the field being read
	pub fn get_generation(&self) -> u64 {
		self.grid.get_flow_generation()
	}
	/// The direction of travel at a world position, [Direction::Zero] on
	/// target nodes and anywhere no target can reach
	pub fn direction(&self, position: Vec2) -> Direction {
		self.grid.get_node_from_world(position).get_flow_dir()
	}
	/// The direction of travel at a world position as a unit vector,
	/// [Vec2::ZERO] where there is no direction
	pub fn direction_vector(&self, position: Vec2) -> Vec2 {
		self.direction(position).as_unit_vector()
	}
	/// The propagated cost at a world position, [u32::MAX] where no target
	/// can reach
	pub fn cost(&self, position: Vec2) -> u32 {
		self.grid.get_node_from_world(position).get_flow_cost()
	}
	/// Whether some target can be reached from a world position
	pub fn is_reachable(&self, position: Vec2) -> bool {
		self.cost(position) != u32::MAX
	}
	/// Whether an agent with the given footprint can stand on the node
	/// containing a world position
	pub fn can_move_on(&self, position: Vec2, footprint: &AgentFootprint) -> bool {
		let coord = self.grid.coord_from_world(position);
		footprint.fits(self.grid, coord)
	}
	/// The direction of travel at a world position for an agent with a
	/// footprint: the field direction is only handed out when the node it
	/// steps onto has room for the agent, otherwise [Direction::Zero]
	pub fn direction_for(&self, position: Vec2, footprint: &AgentFootprint) -> Direction {
		let coord = self.grid.coord_from_world(position);
		let direction = self.grid.get_node(coord).get_flow_dir();
		if direction == Direction::Zero {
			return direction;
		}
		let layout = self.grid.get_layout();
		match direction.step_from(coord, layout.get_columns(), layout.get_rows()) {
			Some(destination) if footprint.fits(self.grid, destination) => direction,
			_ => Direction::Zero,
		}
	}
}
