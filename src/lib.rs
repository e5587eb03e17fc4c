//! This is a plugin for Bevy game engine to build navigation grids over world regions and handle the logic for solving obstacle-aware A* routes and FlowField direction fields across them
//!

pub mod bundle;
pub mod navgrid;
pub mod plugin;
pub mod search;

pub mod prelude;
