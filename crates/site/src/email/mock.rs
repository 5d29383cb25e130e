//! Non-sending fallback tier.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{EmailTransport, SendResponse, TemplateParams, TransportError, check_required};

/// Simulated network latency.
pub const MOCK_DELAY: Duration = Duration::from_millis(800);

/// Response text marking a send that never left the process.
pub const MOCK_TEXT: &str = "OK (FALLBACK - Not Actually Sent)";

/// Transport that only pretends to send.
///
/// Always available, so the chain can resolve even with no network. Sends
/// succeed after [`MOCK_DELAY`] without contacting any provider.
#[derive(Debug, Default)]
pub struct MockTransport {
    initialized: AtomicBool,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmailTransport for MockTransport {
    fn init(&self, public_key: &str) {
        if self.initialized.swap(true, Ordering::Relaxed) {
            info!("Fallback transport already initialized");
            return;
        }
        if public_key.is_empty() {
            warn!("Fallback transport initialized without a public key");
        }
        info!("Fallback transport initialized, emails will not be sent");
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
        _public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError> {
        check_required(service_id, template_id, params)?;
        warn!(
            service_id = %service_id,
            template_id = %template_id,
            "Fallback transport in use, email not actually sent"
        );
        tokio::time::sleep(MOCK_DELAY).await;
        Ok(SendResponse {
            status: 200,
            text: MOCK_TEXT.to_owned(),
            message_id: format!("fallback_{}", chrono::Utc::now().timestamp_millis()),
        })
    }

    async fn send_form(
        &self,
        _service_id: &str,
        _template_id: &str,
        _fields: &[(String, String)],
        _public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError> {
        Err(TransportError::Unsupported("sendForm"))
    }
}
