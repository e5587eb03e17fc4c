//! Logic for handling obstacle churn: spawned, moved and despawned
//! obstacles are fed into each [ObstacleSet] which stamps the changes onto
//! its [NavGrid], so the solvers always read walkability as it currently
//! stands
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Plant a new obstacle on every grid
#[derive(Event)]
pub struct EventInsertObstacle {
	/// The footprint of the obstacle
	shape: ObstacleShape,
	/// Whether the obstacle blocks nodes outright or taxes them
	effect: ObstacleEffect,
	/// Where the obstacle sits in world space
	position: Vec2,
}

impl EventInsertObstacle {
	/// Create a new instance of [EventInsertObstacle]
	#[cfg(not(tarpaulin_include))]
	pub fn new(shape: ObstacleShape, effect: ObstacleEffect, position: Vec2) -> Self {
		EventInsertObstacle {
			shape,
			effect,
			position,
		}
	}
	/// Get the footprint of the obstacle
	#[cfg(not(tarpaulin_include))]
	pub fn get_shape(&self) -> ObstacleShape {
		self.shape
	}
	/// Get the effect the obstacle applies to claimed nodes
	#[cfg(not(tarpaulin_include))]
	pub fn get_effect(&self) -> ObstacleEffect {
		self.effect
	}
	/// Get where the obstacle sits in world space
	#[cfg(not(tarpaulin_include))]
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
}

/// Carry an existing obstacle to a new position, releasing the nodes it
/// held and claiming those under the destination
#[derive(Event)]
pub struct EventMoveObstacle {
	/// The obstacle being moved
	id: ObstacleId,
	/// Where the obstacle is headed in world space
	position: Vec2,
}

impl EventMoveObstacle {
	/// Create a new instance of [EventMoveObstacle]
	#[cfg(not(tarpaulin_include))]
	pub fn new(id: ObstacleId, position: Vec2) -> Self {
		EventMoveObstacle { id, position }
	}
	/// Get the obstacle being moved
	#[cfg(not(tarpaulin_include))]
	pub fn get_id(&self) -> ObstacleId {
		self.id
	}
	/// Get where the obstacle is headed in world space
	#[cfg(not(tarpaulin_include))]
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
}

/// Remove an obstacle, releasing every node it claimed
#[derive(Event)]
pub struct EventRemoveObstacle(ObstacleId);

impl EventRemoveObstacle {
	/// Create a new instance of [EventRemoveObstacle]
	#[cfg(not(tarpaulin_include))]
	pub fn new(id: ObstacleId) -> Self {
		EventRemoveObstacle(id)
	}
	/// Get the obstacle being removed
	#[cfg(not(tarpaulin_include))]
	pub fn get(&self) -> ObstacleId {
		self.0
	}
}

/// Ask for every obstacle to restate its claims, used after a host has
/// rebuilt grid passability out from under the set
#[derive(Event)]
pub struct EventReapplyObstacles;

/// Read obstacle churn events and stamp the changes onto each grid
#[cfg(not(tarpaulin_include))]
pub fn process_obstacle_changes(
	mut insert_events: EventReader<EventInsertObstacle>,
	mut move_events: EventReader<EventMoveObstacle>,
	mut remove_events: EventReader<EventRemoveObstacle>,
	mut query: Query<(&mut NavGrid, &mut ObstacleSet)>,
) {
	for event in insert_events.read() {
		for (mut grid, mut obstacles) in query.iter_mut() {
			obstacles.insert(
				&mut grid,
				event.get_shape(),
				event.get_effect(),
				event.get_position(),
			);
		}
	}
	for event in move_events.read() {
		for (mut grid, mut obstacles) in query.iter_mut() {
			obstacles.move_to(&mut grid, event.get_id(), event.get_position());
		}
	}
	for event in remove_events.read() {
		for (mut grid, mut obstacles) in query.iter_mut() {
			obstacles.remove(&mut grid, event.get());
		}
	}
}

/// Restate every obstacle claim once, however many reapply requests arrived
/// this tick
#[cfg(not(tarpaulin_include))]
pub fn reapply_obstacles(
	mut events: EventReader<EventReapplyObstacles>,
	mut query: Query<(&mut NavGrid, &mut ObstacleSet)>,
) {
	// coalesce, one restatement covers every request
	if events.read().next().is_some() {
		events.clear();
		for (mut grid, mut obstacles) in query.iter_mut() {
			obstacles.reapply_all(&mut grid);
		}
	}
}
