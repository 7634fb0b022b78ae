pub mod accessor;
pub mod builder;
pub mod geometry;
pub mod state;
pub mod store;
pub mod track_cache;

pub use accessor::*;
pub use builder::*;
pub use geometry::*;
pub use state::*;
pub use store::*;
pub use track_cache::*;
