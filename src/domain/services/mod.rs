pub mod pricing;
pub mod state_machine;

pub use pricing::price;
pub use state_machine::*;
