mod asset;
mod file_name;
pub mod util;

pub use asset::*;
pub use file_name::*;
