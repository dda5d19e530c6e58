//! Registry mapping job types to handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use engine_client::EngineClient;
use ledger::CreditLedger;
use thiserror::Error;

use crate::correlation::CorrelationStrategy;
use crate::handler::JobHandler;
use crate::handlers::{
    CardChargeHandler, CreditDeductionHandler, DiscountHandler, PaymentCompletionHandler,
    PaymentInvocationHandler,
};
use crate::services::PaymentGateway;

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two handlers claim the same job type.
    #[error("A handler for job type '{0}' is already registered")]
    Duplicate(&'static str),
}

/// Handlers keyed by the job type they subscribe to.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<&'static str, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers all five saga participant handlers.
    pub fn saga_participants<E, L, G>(
        engine: E,
        ledger: L,
        gateway: G,
        payment_request_correlation: CorrelationStrategy,
    ) -> Result<Self, RegistryError>
    where
        E: EngineClient + Clone + 'static,
        L: CreditLedger + 'static,
        G: PaymentGateway + 'static,
    {
        let mut registry = Self::new();
        registry.register(DiscountHandler::new())?;
        registry.register(PaymentInvocationHandler::new(
            engine.clone(),
            payment_request_correlation,
        ))?;
        registry.register(CreditDeductionHandler::new(ledger))?;
        registry.register(CardChargeHandler::new(gateway))?;
        registry.register(PaymentCompletionHandler::new(engine))?;
        Ok(registry)
    }

    /// Registers a handler under its job type.
    pub fn register<H: JobHandler + 'static>(&mut self, handler: H) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(handler))
    }

    /// Registers an already shared handler.
    pub fn register_shared(&mut self, handler: Arc<dyn JobHandler>) -> Result<(), RegistryError> {
        let job_type = handler.job_type();
        if self.handlers.contains_key(job_type) {
            return Err(RegistryError::Duplicate(job_type));
        }
        tracing::debug!(job_type, "handler registered");
        self.handlers.insert(job_type, handler);
        Ok(())
    }

    /// Returns the handler for `job_type`.
    pub fn get(&self, job_type: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(job_type).cloned()
    }

    pub fn contains(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Registered job types in sorted order.
    pub fn job_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
