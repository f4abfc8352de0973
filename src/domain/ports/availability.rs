/// Live view of whether the technician candidate can take an offer.
///
/// Read at offer-timer fire time, never snapshotted when the timer is armed.
pub trait TechnicianAvailability: Send + Sync {
    fn technician_id(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Set availability, returning the previous value
    fn set_available(&self, available: bool) -> bool;
}
