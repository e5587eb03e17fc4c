//! Defines the Bevy [Plugin] wiring grids, obstacles and the request queue
//! into an app schedule
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod obstacle_layer;
pub mod request_layer;

/// Obstacle churn must have been stamped onto the grids before any solver
/// reads them, so mutation and solving run as chained sets
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Systems changing what the grids say about the world
	Mutate,
	/// Systems answering requests from what the grids now say
	Solve,
}

/// Registers the events, types and systems serving grid navigation
pub struct NavGridPlugin;

impl Plugin for NavGridPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<GridCoord>()
			.register_type::<GridLayout>()
			.register_type::<Direction>()
			.register_type::<Passability>()
			.register_type::<OutsidePolicy>()
			.register_type::<ObstacleId>()
			.register_type::<ObstacleShape>()
			.register_type::<ObstacleEffect>()
			.register_type::<GoalFallback>()
			.register_type::<FlowTarget>()
			.register_type::<PathRequestId>()
			.add_event::<obstacle_layer::EventInsertObstacle>()
			.add_event::<obstacle_layer::EventMoveObstacle>()
			.add_event::<obstacle_layer::EventRemoveObstacle>()
			.add_event::<obstacle_layer::EventReapplyObstacles>()
			.add_event::<request_layer::EventPathRequest>()
			.add_event::<request_layer::EventFlowFieldRequest>()
			.add_event::<request_layer::EventCancelRequest>()
			.add_event::<request_layer::EventRequestComplete>()
			.configure_sets(Update, (OrderingSet::Mutate, OrderingSet::Solve).chain())
			.add_systems(
				Update,
				(
					(
						obstacle_layer::process_obstacle_changes,
						obstacle_layer::reapply_obstacles,
					)
						.chain()
						.in_set(OrderingSet::Mutate),
					(
						request_layer::queue_requests,
						request_layer::process_request_queue,
					)
						.chain()
						.in_set(OrderingSet::Solve),
				),
			);
	}
}
