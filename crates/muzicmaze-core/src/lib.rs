pub mod config_manager;
pub mod coordinate;
pub mod error;
pub mod hex;
pub mod track;
pub mod traits;

pub use config_manager::*;
pub use coordinate::*;
pub use error::*;
pub use hex::*;
pub use track::*;
pub use traits::*;
