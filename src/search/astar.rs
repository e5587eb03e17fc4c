//! Route finding over a [NavGrid]: A* across the eight-connected node
//! arena, reading the effective walkability and penalty the obstacles have
//! produced. The search touches scratch only on the nodes it actually
//! reaches, a stamp comparison keeps scratch from older searches from
//! bleeding in without ever sweeping the arena
//!

use crate::navgrid::grid::NavGrid;
use crate::navgrid::node::UNQUEUED;
use crate::navgrid::GridCoord;
use crate::search::open_list::OpenList;
use crate::search::{octile_distance, step_cost};
use bevy::prelude::*;

/// What a route search should do when the exact goal node cannot be reached
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Reflect)]
pub enum GoalFallback {
	/// Only the goal node itself will do, anything less is [PathOutcome::NoPath]
	#[default]
	Strict,
	/// Fall back to the reachable node whose heuristic distance to the goal
	/// is smallest, the closest approach the grid allows
	Nearest,
}

/// An ordered route between two nodes. The first entry is always the node
/// containing the search start and the last the node the search ended on
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
	/// The `(column, row)` of every node along the route
	coords: Vec<GridCoord>,
	/// The world position of every node along the route
	waypoints: Vec<Vec2>,
	/// Accumulated step and penalty cost of walking the route
	total_cost: u32,
}

impl Path {
	/// Get the `(column, row)` of every node along the route
	pub fn get_coords(&self) -> &[GridCoord] {
		&self.coords
	}
	/// Get the world position of every node along the route
	pub fn get_waypoints(&self) -> &[Vec2] {
		&self.waypoints
	}
	/// Get the accumulated cost of walking the route
	pub fn get_total_cost(&self) -> u32 {
		self.total_cost
	}
	/// Number of nodes along the route
	pub fn node_count(&self) -> usize {
		self.coords.len()
	}
}

/// The result of a route search. An unreachable goal is an ordinary answer,
/// not an error: hosts branch on the variant
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
	/// The goal node was reached
	Found(Path),
	/// The goal was unreachable, this is the route to the closest approach
	/// permitted by [GoalFallback::Nearest]
	Nearest(Path),
	/// The goal was unreachable and the policy accepted nothing less
	NoPath,
}

impl PathOutcome {
	/// The route carried by this outcome, if any
	pub fn path(&self) -> Option<&Path> {
		match self {
			PathOutcome::Found(path) | PathOutcome::Nearest(path) => Some(path),
			PathOutcome::NoPath => None,
		}
	}
	/// Whether the search produced no route at all
	pub fn is_no_path(&self) -> bool {
		matches!(self, PathOutcome::NoPath)
	}
}

/// Search for the cheapest route from the node containing `start` to the
/// node containing `goal`. Positions outside the grid clamp to the nearest
/// boundary node first. Step costs are 10 orthogonally and 14 diagonally
/// plus the effective penalty of the node stepped onto; the heuristic uses
/// the same scale so it never overestimates
///
/// The node containing `start` is always expanded, even while an obstacle
/// claims it, so an agent standing inside a freshly placed obstacle can
/// still route its way out
pub fn find_route(
	grid: &mut NavGrid,
	start: Vec2,
	goal: Vec2,
	fallback: GoalFallback,
) -> PathOutcome {
	let start_coord = grid.coord_from_world(start);
	let goal_coord = grid.coord_from_world(goal);
	let start_index = grid.index_of(start_coord);
	let goal_index = grid.index_of(goal_coord);
	if fallback == GoalFallback::Strict && !grid.node_at_index(goal_index).is_walkable() {
		debug!(
			"Route to {:?} refused, the goal node is not walkable",
			goal_coord
		);
		return PathOutcome::NoPath;
	}
	let stamp = grid.next_search_stamp();
	let start_h = octile_distance(start_coord, goal_coord);
	{
		let node = grid.node_at_index_mut(start_index);
		node.reset_search_scratch(stamp);
		node.set_g_cost(0);
		node.set_h_cost(start_h);
	}
	let mut open = OpenList::with_capacity(64);
	open.push(grid, start_index, (start_h, start_h));
	while let Some(current_index) = open.pop(grid) {
		if current_index == goal_index {
			let path = reconstruct(grid, goal_index);
			trace!(
				"Route of {} nodes found, cost {}",
				path.node_count(),
				path.get_total_cost()
			);
			return PathOutcome::Found(path);
		}
		grid.node_at_index_mut(current_index).set_closed(true);
		let current_coord = grid.coord_of_index(current_index);
		let current_g = grid.node_at_index(current_index).get_g_cost();
		for neighbour_coord in grid.neighbours_eight(current_coord) {
			let neighbour_index = grid.index_of(neighbour_coord);
			if grid.node_at_index(neighbour_index).get_search_stamp() != stamp {
				grid.node_at_index_mut(neighbour_index).reset_search_scratch(stamp);
			}
			let neighbour = grid.node_at_index(neighbour_index);
			if neighbour.is_closed() || !neighbour.is_walkable() {
				continue;
			}
			let diagonal = neighbour_coord.get_column() != current_coord.get_column()
				&& neighbour_coord.get_row() != current_coord.get_row();
			let tentative = current_g.saturating_add(step_cost(diagonal, neighbour.get_penalty()));
			if tentative < neighbour.get_g_cost() {
				let was_queued = neighbour.get_heap_index() != UNQUEUED;
				let heuristic = octile_distance(neighbour_coord, goal_coord);
				let node = grid.node_at_index_mut(neighbour_index);
				node.set_g_cost(tentative);
				node.set_h_cost(heuristic);
				node.set_parent(Some(current_index));
				let key = (tentative.saturating_add(heuristic), heuristic);
				if was_queued {
					open.update(grid, neighbour_index, key);
				} else {
					open.push(grid, neighbour_index, key);
				}
			}
		}
	}
	// every reachable node has been expanded without meeting the goal
	match fallback {
		GoalFallback::Strict => PathOutcome::NoPath,
		GoalFallback::Nearest => match closest_approach(grid, stamp) {
			Some(index) => PathOutcome::Nearest(reconstruct(grid, index)),
			None => PathOutcome::NoPath,
		},
	}
}

/// Among the nodes touched by the search identified by `stamp`, find the
/// one with the smallest heuristic distance to the goal, breaking ties by
/// the cheaper route
fn closest_approach(grid: &NavGrid, stamp: u32) -> Option<u32> {
	let mut best: Option<(u32, u32, u32)> = None;
	for (index, node) in grid.nodes().iter().enumerate() {
		if node.get_search_stamp() == stamp && node.get_g_cost() != u32::MAX {
			let candidate = (node.get_h_cost(), node.get_g_cost(), index as u32);
			if best.is_none_or(|current| candidate < current) {
				best = Some(candidate);
			}
		}
	}
	best.map(|(_, _, index)| index)
}

/// Walk the parent chain back from `end_index` and package it as a [Path]
/// running start to end
fn reconstruct(grid: &NavGrid, end_index: u32) -> Path {
	let mut coords = Vec::new();
	let mut cursor = Some(end_index);
	while let Some(index) = cursor {
		coords.push(grid.coord_of_index(index));
		cursor = grid.node_at_index(index).get_parent();
	}
	coords.reverse();
	let waypoints = coords
		.iter()
		.map(|coord| grid.get_node(*coord).get_world_position())
		.collect();
	Path {
		coords,
		waypoints,
		total_cost: grid.node_at_index(end_index).get_g_cost(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::navgrid::layout::GridLayout;
	use crate::navgrid::node::Passability;
	use rand::prelude::*;
	/// A 5x5 node grid of node radius 0.5 centred on the world origin,
	/// node centres running from (-2, -2) to (2, 2)
	fn five_by_five() -> NavGrid {
		NavGrid::build_open(GridLayout::new(Vec2::ZERO, Vec2::new(5.0, 5.0), 0.5))
	}
	#[test]
	fn diagonal_route_across_open_grid() {
		let mut grid = five_by_five();
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, -2.0),
			Vec2::new(2.0, 2.0),
			GoalFallback::Strict,
		);
		let path = match outcome {
			PathOutcome::Found(path) => path,
			other => panic!("expected a route, got {:?}", other),
		};
		let actual = vec![
			GridCoord::new(0, 0),
			GridCoord::new(1, 1),
			GridCoord::new(2, 2),
			GridCoord::new(3, 3),
			GridCoord::new(4, 4),
		];
		assert_eq!(actual, path.get_coords());
		// four diagonal steps at 14 each onto nodes of base penalty 1
		assert_eq!(60, path.get_total_cost());
		assert_eq!(Vec2::new(-2.0, -2.0), path.get_waypoints()[0]);
		assert_eq!(Vec2::new(2.0, 2.0), path.get_waypoints()[4]);
	}
	#[test]
	fn wall_column_routes_through_the_gap() {
		let mut grid = five_by_five();
		for row in 0..4 {
			grid.set_base_passability(GridCoord::new(2, row), Passability::Wall);
		}
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, 0.0),
			Vec2::new(2.0, 0.0),
			GoalFallback::Strict,
		);
		let path = outcome.path().expect("gap leaves a route open");
		assert!(path.get_coords().contains(&GridCoord::new(2, 4)));
		for row in 0..4 {
			assert!(!path.get_coords().contains(&GridCoord::new(2, row)));
		}
	}
	#[test]
	fn sealed_wall_yields_no_path() {
		let mut grid = five_by_five();
		for row in 0..5 {
			grid.set_base_passability(GridCoord::new(2, row), Passability::Wall);
		}
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, 0.0),
			Vec2::new(2.0, 0.0),
			GoalFallback::Strict,
		);
		assert!(outcome.is_no_path());
	}
	#[test]
	fn strict_refuses_walled_goal_before_searching() {
		let mut grid = five_by_five();
		grid.set_base_passability(GridCoord::new(4, 4), Passability::Wall);
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, -2.0),
			Vec2::new(2.0, 2.0),
			GoalFallback::Strict,
		);
		let actual = PathOutcome::NoPath;
		assert_eq!(actual, outcome);
	}
	#[test]
	fn nearest_fallback_stops_beside_walled_goal() {
		let mut grid = five_by_five();
		grid.set_base_passability(GridCoord::new(4, 4), Passability::Wall);
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, -2.0),
			Vec2::new(2.0, 2.0),
			GoalFallback::Nearest,
		);
		let path = match outcome {
			PathOutcome::Nearest(path) => path,
			other => panic!("expected a closest approach, got {:?}", other),
		};
		let last = *path.get_coords().last().unwrap();
		// the orthogonal neighbours of the goal sit at heuristic 10, closer
		// than any diagonal neighbour at 14
		assert_eq!(10, octile_distance(last, GridCoord::new(4, 4)));
	}
	#[test]
	fn nearest_fallback_approaches_an_enclosed_goal() {
		let mut grid = NavGrid::build_open(GridLayout::new(Vec2::ZERO, Vec2::new(7.0, 7.0), 0.5));
		let goal = GridCoord::new(5, 5);
		for coord in grid.neighbours_eight(goal) {
			grid.set_base_passability(coord, Passability::Wall);
		}
		let goal_world = grid.get_layout().world_from_coord(goal);
		let outcome = find_route(
			&mut grid,
			Vec2::new(-3.0, -3.0),
			goal_world,
			GoalFallback::Nearest,
		);
		let path = match outcome {
			PathOutcome::Nearest(path) => path,
			other => panic!("expected a closest approach, got {:?}", other),
		};
		let last = *path.get_coords().last().unwrap();
		assert_eq!(20, octile_distance(last, goal));
	}
	#[test]
	fn expensive_region_is_routed_around() {
		let mut grid = five_by_five();
		for row in 1..4 {
			grid.get_node_mut(GridCoord::new(2, row)).set_base_penalty(50);
		}
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, 0.0),
			Vec2::new(2.0, 0.0),
			GoalFallback::Strict,
		);
		let path = outcome.path().expect("the grid is fully connected");
		for row in 1..4 {
			assert!(!path.get_coords().contains(&GridCoord::new(2, row)));
		}
		// four diagonal steps around either end of the strip
		assert_eq!(60, path.get_total_cost());
	}
	#[test]
	fn start_inside_a_wall_can_escape() {
		let mut grid = five_by_five();
		grid.set_base_passability(GridCoord::new(0, 0), Passability::Wall);
		let outcome = find_route(
			&mut grid,
			Vec2::new(-2.0, -2.0),
			Vec2::new(2.0, 2.0),
			GoalFallback::Strict,
		);
		let path = outcome.path().expect("the start node is always expanded");
		assert_eq!(GridCoord::new(0, 0), path.get_coords()[0]);
		assert_eq!(GridCoord::new(4, 4), *path.get_coords().last().unwrap());
	}
	#[test]
	fn start_equals_goal() {
		let mut grid = five_by_five();
		let outcome = find_route(
			&mut grid,
			Vec2::new(0.3, 0.1),
			Vec2::new(0.2, 0.4),
			GoalFallback::Strict,
		);
		let path = outcome.path().expect("trivial route");
		assert_eq!(1, path.node_count());
		assert_eq!(0, path.get_total_cost());
	}
	/// Plain Dijkstra over the same edge model, O(n^2) but obviously correct
	fn reference_distance(grid: &NavGrid, start: GridCoord, goal: GridCoord) -> Option<u32> {
		let count = grid.get_layout().node_count();
		let mut distance = vec![u32::MAX; count];
		let mut settled = vec![false; count];
		distance[grid.index_of(start) as usize] = 0;
		loop {
			let mut current: Option<usize> = None;
			for index in 0..count {
				if !settled[index]
					&& distance[index] != u32::MAX
					&& current.is_none_or(|c| distance[index] < distance[c])
				{
					current = Some(index);
				}
			}
			let Some(current) = current else { break };
			settled[current] = true;
			let coord = grid.coord_of_index(current as u32);
			if coord == goal {
				return Some(distance[current]);
			}
			for neighbour in grid.neighbours_eight(coord) {
				let node = grid.get_node(neighbour);
				if !node.is_walkable() {
					continue;
				}
				let diagonal = neighbour.get_column() != coord.get_column()
					&& neighbour.get_row() != coord.get_row();
				let cost = distance[current] + step_cost(diagonal, node.get_penalty());
				let slot = grid.index_of(neighbour) as usize;
				if cost < distance[slot] {
					distance[slot] = cost;
				}
			}
		}
		None
	}
	#[test]
	fn route_costs_match_dijkstra_on_random_grids() {
		let mut rng = rand::rng();
		for _ in 0..20 {
			let layout = GridLayout::new(Vec2::ZERO, Vec2::new(12.0, 12.0), 0.5);
			let mut grid = NavGrid::build_open(layout);
			for index in 0..layout.node_count() {
				let coord = grid.coord_of_index(index as u32);
				if rng.random_bool(0.25) {
					grid.set_base_passability(coord, Passability::Wall);
				} else {
					grid.get_node_mut(coord).set_base_penalty(rng.random_range(1..10));
				}
			}
			let walkable: Vec<GridCoord> = grid
				.nodes()
				.iter()
				.filter(|node| node.is_walkable())
				.map(|node| node.get_coord())
				.collect();
			if walkable.len() < 2 {
				continue;
			}
			let start = walkable[rng.random_range(0..walkable.len())];
			let goal = walkable[rng.random_range(0..walkable.len())];
			let start_world = grid.get_layout().world_from_coord(start);
			let goal_world = grid.get_layout().world_from_coord(goal);
			let reference = reference_distance(&grid, start, goal);
			let outcome = find_route(&mut grid, start_world, goal_world, GoalFallback::Strict);
			match reference {
				None => assert!(outcome.is_no_path()),
				Some(expected) => {
					let path = outcome.path().expect("reference found a route");
					assert_eq!(expected, path.get_total_cost());
					// the route must be a connected chain from start to goal
					assert_eq!(start, path.get_coords()[0]);
					assert_eq!(goal, *path.get_coords().last().unwrap());
					for pair in path.get_coords().windows(2) {
						let column_step =
							pair[0].get_column().abs_diff(pair[1].get_column());
						let row_step = pair[0].get_row().abs_diff(pair[1].get_row());
						assert!(column_step <= 1 && row_step <= 1);
						assert!(column_step + row_step > 0);
					}
					for (coord, waypoint) in
						path.get_coords().iter().zip(path.get_waypoints())
					{
						assert_eq!(grid.get_node(*coord).get_world_position(), *waypoint);
					}
				}
			}
		}
	}
	#[test]
	fn consecutive_searches_reuse_the_arena() {
		let mut grid = five_by_five();
		let first = find_route(
			&mut grid,
			Vec2::new(-2.0, -2.0),
			Vec2::new(2.0, 2.0),
			GoalFallback::Strict,
		);
		let second = find_route(
			&mut grid,
			Vec2::new(2.0, -2.0),
			Vec2::new(-2.0, 2.0),
			GoalFallback::Strict,
		);
		let first = first.path().unwrap();
		let second = second.path().unwrap();
		assert_eq!(first.get_total_cost(), second.get_total_cost());
		assert_eq!(GridCoord::new(4, 0), second.get_coords()[0]);
		assert_eq!(GridCoord::new(0, 4), *second.get_coords().last().unwrap());
	}
}
