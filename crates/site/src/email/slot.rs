//! Single binding point for the resolved transport.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{
    ResolvedTransport, SendResponse, TemplateParams, Tier, TransportChain, TransportError,
};

/// Holds the transport once resolution has chosen it.
///
/// Cloning shares the binding. Sends before [`bind`](Self::bind) fail with
/// [`TransportError::TransportNotReady`].
#[derive(Debug, Clone, Default)]
pub struct TransportSlot {
    inner: Arc<OnceLock<ResolvedTransport>>,
}

impl TransportSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `chain` and bind the result.
    ///
    /// # Errors
    ///
    /// Propagates resolution failure, or [`TransportError::AlreadyBound`].
    pub async fn resolve(chain: &TransportChain) -> Result<Self, TransportError> {
        let slot = Self::new();
        slot.bind(chain.resolve().await?)?;
        Ok(slot)
    }

    /// Bind a resolved transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::AlreadyBound`] if the slot is already bound.
    pub fn bind(&self, resolved: ResolvedTransport) -> Result<(), TransportError> {
        let tier = resolved.tier;
        self.inner
            .set(resolved)
            .map_err(|_| TransportError::AlreadyBound)?;
        debug!(tier = %tier, "Email transport bound");
        Ok(())
    }

    /// The bound transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TransportNotReady`] while unbound.
    pub fn get(&self) -> Result<&ResolvedTransport, TransportError> {
        self.inner.get().ok_or(TransportError::TransportNotReady)
    }

    #[must_use]
    pub fn tier(&self) -> Option<Tier> {
        self.inner.get().map(|resolved| resolved.tier)
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Send through the bound transport.
    ///
    /// # Errors
    ///
    /// [`TransportError::TransportNotReady`] while unbound, otherwise whatever
    /// the transport returns.
    pub async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
        public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError> {
        let resolved = self.get()?;
        resolved
            .transport
            .send(service_id, template_id, params, public_key)
            .await
    }
}
