#![allow(dead_code, unused_imports)]
pub mod dispatch_helpers;

pub use dispatch_helpers::*;
