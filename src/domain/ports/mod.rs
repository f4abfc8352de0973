pub mod availability;
pub mod event_bus;
pub mod location_source;
pub mod task_spawner;
pub mod time_service;
