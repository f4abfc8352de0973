use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::ports::availability::TechnicianAvailability;

/// Online flag for the single technician candidate.
///
/// Technicians start online, matching a freshly opened technician app.
#[derive(Debug)]
pub struct TechnicianPresence {
    technician_id: String,
    online: AtomicBool,
}

impl TechnicianPresence {
    pub fn new(technician_id: impl Into<String>) -> Self {
        Self {
            technician_id: technician_id.into(),
            online: AtomicBool::new(true),
        }
    }
}

impl TechnicianAvailability for TechnicianPresence {
    fn technician_id(&self) -> &str {
        &self.technician_id
    }

    fn is_available(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn set_available(&self, available: bool) -> bool {
        self.online.swap(available, Ordering::SeqCst)
    }
}
