//! Outbound notification port.

use crate::domain::error::SigbenchError;

/// Fire-and-forget message sink. Callers log failures and carry on.
pub trait NotificationPort {
    fn notify(&self, message: &str) -> Result<(), SigbenchError>;
}
