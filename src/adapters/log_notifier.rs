//! Notification adapter that writes messages to the tracing log.

use tracing::info;

use crate::domain::error::SigbenchError;
use crate::ports::notify_port::NotificationPort;

#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: impl Into<String>) -> Self {
        LogNotifier {
            channel: channel.into(),
        }
    }
}

impl NotificationPort for LogNotifier {
    fn notify(&self, message: &str) -> Result<(), SigbenchError> {
        info!(channel = %self.channel, "{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_never_fails() {
        let notifier = LogNotifier::new("signals");
        assert!(notifier.notify("LONG BTC 0.71").is_ok());
    }
}
