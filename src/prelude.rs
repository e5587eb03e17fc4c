//! `use bevy_nav_grid_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navgrid::{
	composite::*, direction::*, grid::*, layout::*, node::*, obstacle::*, *,
};

#[doc(hidden)]
pub use crate::search::{astar::*, flow::*, open_list::*, *};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{obstacle_layer::*, request_layer::*, *},
};
