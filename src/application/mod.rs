pub mod listeners;
pub mod services;
