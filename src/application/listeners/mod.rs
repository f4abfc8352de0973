pub mod activity_feed;

pub use activity_feed::run_activity_listener;
