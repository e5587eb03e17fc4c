//!
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Everything one navigable region needs: the grid itself, the set of
/// obstacles stamped onto it and the queue rationing solver work over it
#[derive(Bundle)]
pub struct NavGridBundle {
	/// The node arena solvers read and obstacles write
	grid: NavGrid,
	/// The obstacles currently claiming nodes of the grid
	obstacles: ObstacleSet,
	/// Admission control in front of the solvers
	queue: PathRequestQueue,
}

impl NavGridBundle {
	/// Create a new instance of [NavGridBundle] over an all-walkable region
	/// centred on `center` spanning `size`, divided into nodes of
	/// `node_radius`
	pub fn new(center: Vec2, size: Vec2, node_radius: f32) -> Self {
		NavGridBundle {
			grid: NavGrid::build_open(GridLayout::new(center, size, node_radius)),
			obstacles: ObstacleSet::new(),
			queue: PathRequestQueue::new(),
		}
	}
	/// Create a new instance of [NavGridBundle] where base walkability comes
	/// from probing each node centre, typically against static level
	/// geometry
	pub fn from_probe<F: Fn(Vec2) -> bool>(
		center: Vec2,
		size: Vec2,
		node_radius: f32,
		is_blocked: F,
	) -> Self {
		NavGridBundle {
			grid: NavGrid::build(GridLayout::new(center, size, node_radius), is_blocked),
			obstacles: ObstacleSet::new(),
			queue: PathRequestQueue::new(),
		}
	}
}
