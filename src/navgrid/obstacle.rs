//! Obstacles claim the nodes their shape covers and either wall those nodes
//! off or make them more expensive to cross. Registration runs in two
//! phases: a cheap node-span bounding box picks candidate nodes, then a
//! precise containment test claims the ones whose centres sit within the
//! shape inflated by one node radius, so a shape that covers part of a node
//! without reaching its exact centre still claims it
//!
//! ```text
//!   . . . . .      x = node centres claimed
//!   . x x x .      O = obstacle position
//!   . x O x .      . = centres outside the inflated shape
//!   . x x x .
//!   . . . . .
//! ```
//!
//! Moving an obstacle is always clear-and-rebuild: every claimed node is
//! released, the position changes, and the claim runs again from scratch
//!

use crate::navgrid::grid::NavGrid;
use crate::navgrid::node::ObstacleEffect;
use crate::navgrid::GridCoord;
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Unique identity of an obstacle within an [ObstacleSet]. Nodes record
/// which ids claim them so registration stays idempotent
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect)]
pub struct ObstacleId(u32);

impl ObstacleId {
	/// Create an id from a raw value
	pub fn new(id: u32) -> Self {
		ObstacleId(id)
	}
	/// Get the raw value of the id
	pub fn get(&self) -> u32 {
		self.0
	}
}

/// The footprint an obstacle projects onto the grid. `Rect` and `Circle`
/// sit relative to the obstacle position via their `offset`; `Bounds` is an
/// externally supplied world-space box, typically a physics collider's AABB,
/// which translates along with the obstacle when it moves
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ObstacleShape {
	/// An axis-aligned box centred on the obstacle position plus `offset`
	Rect {
		/// Half the box side lengths along `x` and `y`
		half_extents: Vec2,
		/// Displacement of the box centre from the obstacle position
		offset: Vec2,
	},
	/// A circle centred on the obstacle position plus `offset`
	Circle {
		/// Radius of the circle
		radius: f32,
		/// Displacement of the circle centre from the obstacle position
		offset: Vec2,
	},
	/// A world-space box supplied by an external collider
	Bounds {
		/// Bottom-left corner of the box
		min: Vec2,
		/// Top-right corner of the box
		max: Vec2,
	},
}

/// A dynamic obstacle: a shape anchored at a world position, the
/// [ObstacleEffect] it applies, and the set of node coordinates it has
/// claimed on a grid
#[derive(Debug, Clone)]
pub struct NavObstacle {
	/// The footprint the obstacle projects onto the grid
	shape: ObstacleShape,
	/// What claimed nodes suffer while this obstacle registers on them
	effect: ObstacleEffect,
	/// World-space anchor of the shape
	position: Vec2,
	/// Coordinates of every node currently claimed
	claimed: HashSet<GridCoord>,
}

impl NavObstacle {
	/// Create an obstacle at `position`, claiming nothing yet
	pub fn new(shape: ObstacleShape, effect: ObstacleEffect, position: Vec2) -> Self {
		NavObstacle {
			shape,
			effect,
			position,
			claimed: HashSet::new(),
		}
	}
	/// Get the footprint shape
	pub fn get_shape(&self) -> ObstacleShape {
		self.shape
	}
	/// Get the effect applied to claimed nodes
	pub fn get_effect(&self) -> ObstacleEffect {
		self.effect
	}
	/// Get the world-space anchor of the shape
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
	/// Coordinates of every node currently claimed
	pub fn get_claimed(&self) -> &HashSet<GridCoord> {
		&self.claimed
	}
	/// The world-space bounding box of the shape before inflation
	pub fn world_aabb(&self) -> (Vec2, Vec2) {
		match self.shape {
			ObstacleShape::Rect {
				half_extents,
				offset,
			} => {
				let centre = self.position + offset;
				(centre - half_extents, centre + half_extents)
			}
			ObstacleShape::Circle { radius, offset } => {
				let centre = self.position + offset;
				(centre - Vec2::splat(radius), centre + Vec2::splat(radius))
			}
			ObstacleShape::Bounds { min, max } => (min, max),
		}
	}
	/// Whether `point` sits within the shape inflated by `inflate` world
	/// units on every side
	pub fn contains(&self, point: Vec2, inflate: f32) -> bool {
		match self.shape {
			ObstacleShape::Rect {
				half_extents,
				offset,
			} => {
				let delta = point - (self.position + offset);
				delta.x.abs() <= half_extents.x + inflate && delta.y.abs() <= half_extents.y + inflate
			}
			ObstacleShape::Circle { radius, offset } => {
				point.distance(self.position + offset) <= radius + inflate
			}
			ObstacleShape::Bounds { min, max } => {
				let centre = (min + max) / 2.0;
				let half = (max - min) / 2.0;
				let delta = point - centre;
				delta.x.abs() <= half.x + inflate && delta.y.abs() <= half.y + inflate
			}
		}
	}
	/// Register this obstacle as `id` on every node of `grid` whose centre
	/// falls within the inflated shape. An obstacle entirely outside the
	/// grid claims zero nodes, which is not an error
	pub fn apply(&mut self, id: ObstacleId, grid: &mut NavGrid) {
		let layout = *grid.get_layout();
		let inflate = layout.get_node_radius();
		let (min, max) = self.world_aabb();
		// candidate span from the inflated bounding box, clamped into the
		// grid; the precise test below rejects any clamped-in stragglers
		let span_min = layout.coord_from_world(min - Vec2::splat(inflate));
		let span_max = layout.coord_from_world(max + Vec2::splat(inflate));
		for column in span_min.get_column()..=span_max.get_column() {
			for row in span_min.get_row()..=span_max.get_row() {
				let coord = GridCoord::new(column, row);
				if self.contains(layout.world_from_coord(coord), inflate) {
					grid.get_node_mut(coord).register_obstacle(id, self.effect);
					self.claimed.insert(coord);
				}
			}
		}
		debug!(
			"Obstacle {:?} at {:?} claimed {} nodes",
			id,
			self.position,
			self.claimed.len()
		);
	}
	/// Release every node this obstacle claimed on `grid`
	pub fn remove(&mut self, id: ObstacleId, grid: &mut NavGrid) {
		for coord in self.claimed.drain() {
			grid.get_node_mut(coord).unregister_obstacle(id);
		}
	}
	/// Move the obstacle to `new_position`: release every claimed node,
	/// shift the shape, and claim afresh. There is no incremental diff, the
	/// old and new footprints may be entirely disjoint
	pub fn update_position(&mut self, id: ObstacleId, grid: &mut NavGrid, new_position: Vec2) {
		self.remove(id, grid);
		let delta = new_position - self.position;
		if let ObstacleShape::Bounds { min, max } = &mut self.shape {
			*min += delta;
			*max += delta;
		}
		self.position = new_position;
		self.apply(id, grid);
	}
	/// Drop the record of claimed nodes without touching a grid, used after
	/// a grid rebuild has already discarded the nodes themselves
	pub fn forget_claimed(&mut self) {
		self.claimed.clear();
	}
}

/// Owner of every obstacle applied to a grid: allocates [ObstacleId]s,
/// routes apply/move/remove calls and re-applies the whole population after
/// a grid rebuild
#[derive(Component, Clone, Default)]
pub struct ObstacleSet {
	/// Next raw id to hand out
	next_id: u32,
	/// Every obstacle keyed by its id
	obstacles: BTreeMap<ObstacleId, NavObstacle>,
}

impl ObstacleSet {
	/// Create an empty set
	pub fn new() -> Self {
		ObstacleSet::default()
	}
	/// Number of obstacles in the set
	pub fn len(&self) -> usize {
		self.obstacles.len()
	}
	/// Whether the set holds no obstacles
	pub fn is_empty(&self) -> bool {
		self.obstacles.is_empty()
	}
	/// Get an obstacle by id
	pub fn get(&self, id: ObstacleId) -> Option<&NavObstacle> {
		self.obstacles.get(&id)
	}
	/// Iterate over every obstacle and its id
	pub fn iter(&self) -> impl Iterator<Item = (&ObstacleId, &NavObstacle)> {
		self.obstacles.iter()
	}
	/// Create an obstacle, apply it to `grid` and store it, returning the
	/// id allocated for it
	pub fn insert(
		&mut self,
		grid: &mut NavGrid,
		shape: ObstacleShape,
		effect: ObstacleEffect,
		position: Vec2,
	) -> ObstacleId {
		let id = ObstacleId::new(self.next_id);
		self.next_id += 1;
		let mut obstacle = NavObstacle::new(shape, effect, position);
		obstacle.apply(id, grid);
		self.obstacles.insert(id, obstacle);
		id
	}
	/// Release an obstacle from `grid` and drop it from the set. Returns
	/// whether the id was known
	pub fn remove(&mut self, grid: &mut NavGrid, id: ObstacleId) -> bool {
		match self.obstacles.remove(&id) {
			Some(mut obstacle) => {
				obstacle.remove(id, grid);
				true
			}
			None => {
				warn!("Attempted to remove unknown obstacle {:?}", id);
				false
			}
		}
	}
	/// Move an obstacle to `position` with clear-and-rebuild semantics.
	/// Returns whether the id was known
	pub fn move_to(&mut self, grid: &mut NavGrid, id: ObstacleId, position: Vec2) -> bool {
		match self.obstacles.get_mut(&id) {
			Some(obstacle) => {
				obstacle.update_position(id, grid, position);
				true
			}
			None => {
				warn!("Attempted to move unknown obstacle {:?}", id);
				false
			}
		}
	}
	/// Claim nodes afresh for every obstacle in the set, used after a grid
	/// rebuild has produced a clean arena
	pub fn reapply_all(&mut self, grid: &mut NavGrid) {
		for (id, obstacle) in self.obstacles.iter_mut() {
			obstacle.forget_claimed();
			obstacle.apply(*id, grid);
		}
		debug!("Re-applied {} obstacles after grid rebuild", self.obstacles.len());
	}
}
