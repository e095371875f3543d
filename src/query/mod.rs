pub mod path;
pub mod stats;
