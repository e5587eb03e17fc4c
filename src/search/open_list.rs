//! The open list of a route search: an array-backed binary min-heap over
//! node arena indices ordered by `(f_cost, h_cost)`, so of two equally
//! promising nodes the one estimated closer to the goal pops first
//!
//! The heap itself stores only `(key, arena index)` entries. Every queued
//! node caches its current position within the heap array, which is what
//! makes reprioritising a node O(log n): the entry is addressed directly
//! through the cached position and sifted from there, no linear scan
//!
//! ```text
//!  entries: [ (k0,n4) (k1,n9) (k2,n2) ... ]      heap array
//!               ^position 0
//!  node 4 ----- heap_index = 0
//!  node 9 ----- heap_index = 1
//!  node 2 ----- heap_index = 2
//! ```
//!

use crate::navgrid::grid::NavGrid;
use crate::navgrid::node::UNQUEUED;

/// One element of the heap array: the ordering key and the arena index of
/// the node it ranks
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
	/// `(f_cost, h_cost)` of the node when it was queued or last updated
	key: (u32, u32),
	/// Arena index of the queued node
	index: u32,
}

/// A binary min-heap of node arena indices keyed by `(f_cost, h_cost)`.
/// Heap operations maintain the `heap_index` cached on every queued node;
/// the same list drives both route searches and flow solves since the
/// request queue never lets the two run at once
#[derive(Debug, Default)]
pub struct OpenList {
	/// The heap array, entry 0 holding the smallest key
	entries: Vec<OpenEntry>,
}

impl OpenList {
	/// Create an empty list
	pub fn new() -> Self {
		OpenList::default()
	}
	/// Create an empty list with space for `capacity` entries
	pub fn with_capacity(capacity: usize) -> Self {
		OpenList {
			entries: Vec::with_capacity(capacity),
		}
	}
	/// Number of queued nodes
	pub fn len(&self) -> usize {
		self.entries.len()
	}
	/// Whether no nodes are queued
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
	/// Queue the node at arena `index` under `key`. Panics if the node is
	/// already queued, reprioritising goes through [OpenList::update]
	pub fn push(&mut self, grid: &mut NavGrid, index: u32, key: (u32, u32)) {
		if grid.node_at_index(index).get_heap_index() != UNQUEUED {
			panic!("Node at arena index {} is already queued", index);
		}
		let position = self.entries.len();
		self.entries.push(OpenEntry { key, index });
		grid.node_at_index_mut(index).set_heap_index(position as u32);
		self.sift_up(grid, position);
	}
	/// Remove and return the arena index of the node with the smallest key,
	/// `None` once the list is exhausted
	pub fn pop(&mut self, grid: &mut NavGrid) -> Option<u32> {
		if self.entries.is_empty() {
			return None;
		}
		let last = self.entries.len() - 1;
		self.entries.swap(0, last);
		let entry = self.entries.pop()?;
		grid.node_at_index_mut(entry.index).set_heap_index(UNQUEUED);
		if !self.entries.is_empty() {
			grid.node_at_index_mut(self.entries[0].index).set_heap_index(0);
			self.sift_down(grid, 0);
		}
		Some(entry.index)
	}
	/// Lower the key of the already queued node at arena `index` and sift it
	/// towards the root. Panics if the node is not queued
	pub fn update(&mut self, grid: &mut NavGrid, index: u32, key: (u32, u32)) {
		let position = grid.node_at_index(index).get_heap_index();
		if position == UNQUEUED {
			panic!(
				"Cannot reprioritise node at arena index {}, it is not queued",
				index
			);
		}
		let position = position as usize;
		self.entries[position].key = key;
		self.sift_up(grid, position);
	}
	/// Move the entry at `position` towards the root until its parent is no
	/// larger
	fn sift_up(&mut self, grid: &mut NavGrid, mut position: usize) {
		while position > 0 {
			let parent = (position - 1) / 2;
			if self.entries[position].key < self.entries[parent].key {
				self.swap_entries(grid, position, parent);
				position = parent;
			} else {
				break;
			}
		}
	}
	/// Move the entry at `position` towards the leaves until both children
	/// are no smaller
	fn sift_down(&mut self, grid: &mut NavGrid, mut position: usize) {
		loop {
			let left = position * 2 + 1;
			let right = left + 1;
			let mut smallest = position;
			if left < self.entries.len() && self.entries[left].key < self.entries[smallest].key {
				smallest = left;
			}
			if right < self.entries.len() && self.entries[right].key < self.entries[smallest].key {
				smallest = right;
			}
			if smallest == position {
				break;
			}
			self.swap_entries(grid, position, smallest);
			position = smallest;
		}
	}
	/// Swap two heap entries and rewrite the positions cached on their nodes
	fn swap_entries(&mut self, grid: &mut NavGrid, a: usize, b: usize) {
		self.entries.swap(a, b);
		let index_a = self.entries[a].index;
		let index_b = self.entries[b].index;
		grid.node_at_index_mut(index_a).set_heap_index(a as u32);
		grid.node_at_index_mut(index_b).set_heap_index(b as u32);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::navgrid::layout::GridLayout;
	use bevy::prelude::*;
	use rand::prelude::*;
	/// A 10x10 arena to hang heap positions off
	fn scratch_grid() -> NavGrid {
		NavGrid::build_open(GridLayout::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.5))
	}
	#[test]
	fn pops_in_key_order() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.push(&mut grid, 4, (30, 10));
		list.push(&mut grid, 7, (10, 6));
		list.push(&mut grid, 13, (20, 8));
		list.push(&mut grid, 22, (15, 3));
		let result = vec![
			list.pop(&mut grid).unwrap(),
			list.pop(&mut grid).unwrap(),
			list.pop(&mut grid).unwrap(),
			list.pop(&mut grid).unwrap(),
		];
		let actual = vec![7, 22, 13, 4];
		assert_eq!(actual, result);
		assert_eq!(None, list.pop(&mut grid));
	}
	#[test]
	fn equal_f_breaks_tie_on_h() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.push(&mut grid, 1, (24, 20));
		list.push(&mut grid, 2, (24, 4));
		list.push(&mut grid, 3, (24, 12));
		let actual = Some(2);
		assert_eq!(actual, list.pop(&mut grid));
		assert_eq!(Some(3), list.pop(&mut grid));
		assert_eq!(Some(1), list.pop(&mut grid));
	}
	#[test]
	fn update_moves_node_to_front() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.push(&mut grid, 5, (40, 12));
		list.push(&mut grid, 6, (50, 14));
		list.push(&mut grid, 8, (60, 16));
		list.update(&mut grid, 8, (10, 2));
		let actual = Some(8);
		assert_eq!(actual, list.pop(&mut grid));
		assert_eq!(Some(5), list.pop(&mut grid));
	}
	#[test]
	fn popped_nodes_are_marked_unqueued() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.push(&mut grid, 9, (5, 5));
		assert_ne!(UNQUEUED, grid.node_at_index(9).get_heap_index());
		list.pop(&mut grid);
		assert_eq!(UNQUEUED, grid.node_at_index(9).get_heap_index());
	}
	#[test]
	#[should_panic]
	fn double_push_panics() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.push(&mut grid, 3, (1, 1));
		list.push(&mut grid, 3, (2, 2));
	}
	#[test]
	#[should_panic]
	fn update_unqueued_panics() {
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		list.update(&mut grid, 3, (1, 1));
	}
	#[test]
	fn random_operations_match_naive_oracle() {
		let mut rng = rand::rng();
		let mut grid = scratch_grid();
		let mut list = OpenList::new();
		// mirror of the queued population: (arena index, key)
		let mut naive: Vec<(u32, (u32, u32))> = Vec::new();
		for _ in 0..2000 {
			match rng.random_range(0..3) {
				0 => {
					let index = rng.random_range(0..100u32);
					if grid.node_at_index(index).get_heap_index() == UNQUEUED {
						let key = (rng.random_range(0..200), rng.random_range(0..50));
						list.push(&mut grid, index, key);
						naive.push((index, key));
					}
				}
				1 => {
					if let Some(slot) = (!naive.is_empty())
						.then(|| rng.random_range(0..naive.len()))
					{
						let (index, key) = naive[slot];
						let lowered = (key.0.saturating_sub(rng.random_range(0..40)), key.1);
						if lowered < key {
							list.update(&mut grid, index, lowered);
							naive[slot].1 = lowered;
						}
					}
				}
				_ => {
					let popped = list.pop(&mut grid);
					match popped {
						Some(index) => {
							let slot = naive
								.iter()
								.position(|(queued, _)| *queued == index)
								.expect("popped an index the oracle does not hold");
							let smallest = naive.iter().map(|(_, key)| *key).min().unwrap();
							assert_eq!(smallest, naive[slot].1);
							naive.swap_remove(slot);
						}
						None => assert!(naive.is_empty()),
					}
				}
			}
			assert_eq!(naive.len(), list.len());
		}
		// drain whatever is left, keys must come out in nondecreasing order
		let mut previous = (0, 0);
		while let Some(index) = list.pop(&mut grid) {
			let slot = naive.iter().position(|(queued, _)| *queued == index).unwrap();
			let key = naive[slot].1;
			assert!(previous <= key);
			previous = key;
			naive.swap_remove(slot);
		}
		assert!(naive.is_empty());
	}
}
