//! A [NavNode] is one square of a navigation grid. Nodes carry a base state
//! sampled when the grid is built, the set of obstacles currently claiming
//! them and the scratch data used by route finding and flow solves
//!
//! Base state and registered obstacles combine into an effective state which
//! is what searches actually read:
//!
//! ```text
//!  base          obstacles        effective
//!  Open     +  Blocking        => Wall
//!  Open     +  Penalty(4)      => Open, penalty 1 + 4
//!  Hole     +  Penalty(2) x2   => Hole, penalty 1 + 4
//!  Wall     +  anything        => Wall
//! ```
//!

use crate::navgrid::direction::Direction;
use crate::navgrid::obstacle::ObstacleId;
use crate::navgrid::GridCoord;
use bevy::prelude::*;
use std::collections::HashMap;

/// The heap position recorded on a node that is not queued in an open list
pub const UNQUEUED: u32 = u32::MAX;

/// How agents may interact with a node
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Reflect)]
pub enum Passability {
	/// Walkable and a valid movement target
	#[default]
	Open,
	/// Agents may overlap the node, a flow field will steer across it, but
	/// it can never be a movement target
	Hole,
	/// Impassable, agents can neither target nor overlap the node
	Wall,
}

impl Passability {
	/// Whether an agent can stand on and path to the node
	pub fn is_walkable(&self) -> bool {
		matches!(self, Passability::Open)
	}
	/// Whether an agent may overlap the node while moving
	pub fn can_overlap(&self) -> bool {
		matches!(self, Passability::Open | Passability::Hole)
	}
}

/// The influence an obstacle applies to every node it claims
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Reflect)]
pub enum ObstacleEffect {
	/// Claimed nodes become impassable walls while the obstacle is registered
	Blocking,
	/// Claimed nodes stay passable but stepping onto them costs this much
	/// extra, on top of the node's base penalty
	Penalty(u16),
}

/// One square of a [crate::prelude::NavGrid]. The identity and base state of
/// a node only change when the grid is rebuilt; obstacles come and go through
/// the register/unregister pair which keeps the cached effective state in
/// step; the search scratch belongs to whichever search or solve last ran
#[derive(Debug, Clone)]
pub struct NavNode {
	/// Grid position of the node
	coord: GridCoord,
	/// World position of the centre of the node
	world_position: Vec2,
	/// Passability sampled from the walkability probe when the grid was built
	base_passability: Passability,
	/// Movement penalty inherent to the node, always at least 1
	base_penalty: u16,
	/// Obstacles currently claiming this node and the effect each applies
	obstacles: HashMap<ObstacleId, ObstacleEffect>,
	/// Cached passability after applying registered obstacles
	effective_passability: Passability,
	/// Cached penalty after applying registered obstacles
	effective_penalty: u16,
	/// Which search serial the route scratch below belongs to
	search_stamp: u32,
	/// Cost of the cheapest known route from the search start to this node
	g_cost: u32,
	/// Heuristic cost from this node to the search goal
	h_cost: u32,
	/// Arena index of the node this one was reached from during a search
	parent: Option<u32>,
	/// Position of this node within the open list while enqueued,
	/// [UNQUEUED] otherwise
	heap_index: u32,
	/// Whether the current search has finalised this node
	closed: bool,
	/// Cost of the cheapest route to the nearest flow target, `u32::MAX`
	/// when no solve has reached the node
	flow_cost: u32,
	/// Direction of travel towards the cheapest neighbouring node,
	/// [Direction::Zero] for unreached nodes and targets themselves
	flow_dir: Direction,
}

impl NavNode {
	/// Create a node at `coord` whose centre sits at `world_position`
	pub fn new(coord: GridCoord, world_position: Vec2, base_passability: Passability) -> Self {
		NavNode {
			coord,
			world_position,
			base_passability,
			base_penalty: 1,
			obstacles: HashMap::new(),
			effective_passability: base_passability,
			effective_penalty: 1,
			search_stamp: 0,
			g_cost: u32::MAX,
			h_cost: 0,
			parent: None,
			heap_index: UNQUEUED,
			closed: false,
			flow_cost: u32::MAX,
			flow_dir: Direction::Zero,
		}
	}
	/// Get the grid position of the node
	pub fn get_coord(&self) -> GridCoord {
		self.coord
	}
	/// Get the world position of the centre of the node
	pub fn get_world_position(&self) -> Vec2 {
		self.world_position
	}
	/// Get the passability sampled when the grid was built
	pub fn get_base_passability(&self) -> Passability {
		self.base_passability
	}
	/// Replace the base passability, keeping the effective state in step
	pub fn set_base_passability(&mut self, passability: Passability) {
		self.base_passability = passability;
		self.refresh_effective();
	}
	/// Get the movement penalty inherent to the node
	pub fn get_base_penalty(&self) -> u16 {
		self.base_penalty
	}
	/// Replace the base movement penalty, keeping the effective state in
	/// step. Penalties have a floor of 1 so step costs stay strictly positive
	pub fn set_base_penalty(&mut self, penalty: u16) {
		self.base_penalty = penalty.max(1);
		self.refresh_effective();
	}
	/// Record `obstacle` as claiming this node. Registering an already
	/// registered obstacle simply overwrites its effect
	pub fn register_obstacle(&mut self, obstacle: ObstacleId, effect: ObstacleEffect) {
		self.obstacles.insert(obstacle, effect);
		self.refresh_effective();
	}
	/// Remove `obstacle` from this node. Unregistering an obstacle that is
	/// not present leaves the node unchanged
	pub fn unregister_obstacle(&mut self, obstacle: ObstacleId) {
		self.obstacles.remove(&obstacle);
		self.refresh_effective();
	}
	/// Whether `obstacle` currently claims this node
	pub fn has_obstacle(&self, obstacle: ObstacleId) -> bool {
		self.obstacles.contains_key(&obstacle)
	}
	/// Number of obstacles currently claiming this node
	pub fn obstacle_count(&self) -> usize {
		self.obstacles.len()
	}
	/// Recompute the cached effective state from the base state and the
	/// registered obstacles
	fn refresh_effective(&mut self) {
		let blocked = self
			.obstacles
			.values()
			.any(|effect| matches!(effect, ObstacleEffect::Blocking));
		self.effective_passability = if blocked {
			Passability::Wall
		} else {
			self.base_passability
		};
		let mut penalty = self.base_penalty;
		for effect in self.obstacles.values() {
			if let ObstacleEffect::Penalty(extra) = effect {
				penalty = penalty.saturating_add(*extra);
			}
		}
		self.effective_penalty = penalty;
	}
	/// Get the passability after applying registered obstacles
	pub fn get_passability(&self) -> Passability {
		self.effective_passability
	}
	/// Get the movement penalty after applying registered obstacles
	pub fn get_penalty(&self) -> u16 {
		self.effective_penalty
	}
	/// Whether an agent can stand on and path to the node right now
	pub fn is_walkable(&self) -> bool {
		self.effective_passability.is_walkable()
	}
	/// Whether an agent may overlap the node right now
	pub fn can_overlap(&self) -> bool {
		self.effective_passability.can_overlap()
	}
	/// Which search serial the route scratch belongs to
	pub fn get_search_stamp(&self) -> u32 {
		self.search_stamp
	}
	/// Claim the route scratch for the search identified by `stamp`,
	/// clearing whatever a previous search left behind
	pub fn reset_search_scratch(&mut self, stamp: u32) {
		self.search_stamp = stamp;
		self.g_cost = u32::MAX;
		self.h_cost = 0;
		self.parent = None;
		self.heap_index = UNQUEUED;
		self.closed = false;
	}
	/// Get the cost of the cheapest known route from the search start
	pub fn get_g_cost(&self) -> u32 {
		self.g_cost
	}
	/// Set the cost of the cheapest known route from the search start
	pub fn set_g_cost(&mut self, cost: u32) {
		self.g_cost = cost;
	}
	/// Get the heuristic cost towards the search goal
	pub fn get_h_cost(&self) -> u32 {
		self.h_cost
	}
	/// Set the heuristic cost towards the search goal
	pub fn set_h_cost(&mut self, cost: u32) {
		self.h_cost = cost;
	}
	/// Total estimated cost of a route through this node
	pub fn f_cost(&self) -> u32 {
		self.g_cost.saturating_add(self.h_cost)
	}
	/// Get the arena index of the node this one was reached from
	pub fn get_parent(&self) -> Option<u32> {
		self.parent
	}
	/// Record the arena index of the node this one was reached from
	pub fn set_parent(&mut self, parent: Option<u32>) {
		self.parent = parent;
	}
	/// Get the position of this node within the open list
	pub fn get_heap_index(&self) -> u32 {
		self.heap_index
	}
	/// Record the position of this node within the open list
	pub fn set_heap_index(&mut self, index: u32) {
		self.heap_index = index;
	}
	/// Whether the current search has finalised this node
	pub fn is_closed(&self) -> bool {
		self.closed
	}
	/// Mark this node finalised for the current search
	pub fn set_closed(&mut self, closed: bool) {
		self.closed = closed;
	}
	/// Clear the flow scratch back to the unreached state
	pub fn reset_flow(&mut self) {
		self.flow_cost = u32::MAX;
		self.flow_dir = Direction::Zero;
	}
	/// Get the cost of the cheapest route to the nearest flow target
	pub fn get_flow_cost(&self) -> u32 {
		self.flow_cost
	}
	/// Set the cost of the cheapest route to the nearest flow target
	pub fn set_flow_cost(&mut self, cost: u32) {
		self.flow_cost = cost;
	}
	/// Get the direction of travel towards the cheapest neighbouring node
	pub fn get_flow_dir(&self) -> Direction {
		self.flow_dir
	}
	/// Set the direction of travel towards the cheapest neighbouring node
	pub fn set_flow_dir(&mut self, direction: Direction) {
		self.flow_dir = direction;
	}
}
