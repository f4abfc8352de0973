pub mod geo;
pub mod job;
pub mod photo;

pub use geo::*;
pub use job::*;
pub use photo::*;
