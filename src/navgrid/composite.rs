//! A [CompositeGrid] presents several independently sized and independently
//! resolved [NavGrid] members as one logical walkable surface, with an
//! explicit policy for the space between them
//!

use crate::navgrid::grid::NavGrid;
use crate::navgrid::node::Passability;
use bevy::prelude::*;

/// How a [CompositeGrid] treats world positions that fall inside none of its
/// member grids
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Reflect)]
pub enum OutsidePolicy {
	/// Positions between members are impassable
	Wall,
	/// Positions between members may be overlapped but never walked to,
	/// the usual choice for platforms floating over a drop
	Hole,
}

/// An ordered collection of [NavGrid] members queried as one surface. The
/// first member whose region contains a position answers for it, so where
/// regions overlap the earlier member wins
#[derive(Component, Clone)]
pub struct CompositeGrid {
	/// The member grids in query order
	members: Vec<NavGrid>,
	/// How positions inside no member are treated
	outside: OutsidePolicy,
}

impl CompositeGrid {
	/// Create an empty composite with the given [OutsidePolicy]
	pub fn new(outside: OutsidePolicy) -> Self {
		CompositeGrid {
			members: Vec::new(),
			outside,
		}
	}
	/// Append a member grid, it will be queried after every existing member
	pub fn add_member(&mut self, grid: NavGrid) {
		self.members.push(grid);
	}
	/// Get the policy applied to positions inside no member
	pub fn get_outside_policy(&self) -> OutsidePolicy {
		self.outside
	}
	/// Number of member grids
	pub fn member_count(&self) -> usize {
		self.members.len()
	}
	/// Get a member grid by position in the query order
	pub fn get_member(&self, index: usize) -> &NavGrid {
		&self.members[index]
	}
	/// Get a mutable handle on a member grid by position in the query order
	pub fn get_member_mut(&mut self, index: usize) -> &mut NavGrid {
		&mut self.members[index]
	}
	/// Index of the first member whose region contains `position`, `None`
	/// when the position falls between members
	pub fn member_containing(&self, position: Vec2) -> Option<usize> {
		self.members
			.iter()
			.position(|member| member.get_layout().contains_world(position))
	}
	/// Effective passability of the surface at `position`: the containing
	/// member's node state, or the outside policy between members
	pub fn sample(&self, position: Vec2) -> Passability {
		match self.member_containing(position) {
			Some(index) => self.members[index]
				.get_node_from_world(position)
				.get_passability(),
			None => match self.outside {
				OutsidePolicy::Wall => Passability::Wall,
				OutsidePolicy::Hole => Passability::Hole,
			},
		}
	}
	/// Whether an agent can stand on and path to `position`
	pub fn is_walkable(&self, position: Vec2) -> bool {
		self.sample(position).is_walkable()
	}
	/// Whether an agent may overlap `position` while moving
	pub fn can_overlap(&self, position: Vec2) -> bool {
		self.sample(position).can_overlap()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::navgrid::layout::GridLayout;
	/// Two 10x10 world unit members sharing the boundary at `x = 0`
	fn two_platforms(outside: OutsidePolicy) -> CompositeGrid {
		let mut composite = CompositeGrid::new(outside);
		composite.add_member(NavGrid::build_open(GridLayout::new(
			Vec2::new(-5.0, 0.0),
			Vec2::new(10.0, 10.0),
			0.5,
		)));
		composite.add_member(NavGrid::build_open(GridLayout::new(
			Vec2::new(5.0, 0.0),
			Vec2::new(10.0, 10.0),
			1.0,
		)));
		composite
	}
	#[test]
	fn positions_resolve_to_members() {
		let composite = two_platforms(OutsidePolicy::Wall);
		assert_eq!(Some(0), composite.member_containing(Vec2::new(-3.0, 1.0)));
		assert_eq!(Some(1), composite.member_containing(Vec2::new(3.0, 1.0)));
		assert_eq!(None, composite.member_containing(Vec2::new(0.0, 40.0)));
	}
	#[test]
	fn overlapping_boundary_prefers_first_member() {
		let composite = two_platforms(OutsidePolicy::Wall);
		let result = composite.member_containing(Vec2::new(0.0, 0.0));
		let actual = Some(0);
		assert_eq!(actual, result);
	}
	#[test]
	fn outside_as_wall() {
		let composite = two_platforms(OutsidePolicy::Wall);
		assert_eq!(Passability::Wall, composite.sample(Vec2::new(0.0, 40.0)));
		assert!(!composite.is_walkable(Vec2::new(0.0, 40.0)));
		assert!(!composite.can_overlap(Vec2::new(0.0, 40.0)));
		assert!(composite.is_walkable(Vec2::new(-3.0, 1.0)));
	}
	#[test]
	fn outside_as_hole() {
		let composite = two_platforms(OutsidePolicy::Hole);
		assert_eq!(Passability::Hole, composite.sample(Vec2::new(0.0, 40.0)));
		assert!(!composite.is_walkable(Vec2::new(0.0, 40.0)));
		assert!(composite.can_overlap(Vec2::new(0.0, 40.0)));
	}
	#[test]
	fn member_state_shows_through() {
		let mut composite = two_platforms(OutsidePolicy::Wall);
		let coord = composite.get_member(0).coord_from_world(Vec2::new(-3.0, 1.0));
		composite
			.get_member_mut(0)
			.set_base_passability(coord, Passability::Wall);
		assert!(!composite.is_walkable(Vec2::new(-3.0, 1.0)));
		assert!(composite.is_walkable(Vec2::new(3.0, 1.0)));
	}
}
