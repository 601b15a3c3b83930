//! Outbound delivery channels for finished tracks.
//!
//! Both notifiers implement [`serenade_core::ports::Notifier`]. The coordinator
//! uses [`email::EmailDelivery`] when SMTP is configured and falls back to
//! [`LogNotifier`] otherwise.

pub mod email;

use async_trait::async_trait;
use serenade_core::delivery::DeliveryIntent;
use serenade_core::error::CoreError;
use serenade_core::ports::Notifier;

/// Notifier that only records the intent in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, intent: &DeliveryIntent) -> Result<(), CoreError> {
        tracing::info!(
            request_id = %intent.request_id,
            recipient = %intent.recipient.email,
            dedupe_key = %intent.dedupe_key,
            "Delivery intent recorded (no mail transport configured)"
        );
        Ok(())
    }
}
