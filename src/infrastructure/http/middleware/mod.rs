pub mod error;

pub use error::{ApiError, ApiResult};

use crate::application::services::DispatchService;

#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: DispatchService,
}
