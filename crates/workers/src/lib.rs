//! Saga participant workers.
//!
//! Each handler processes one job type dispatched by the orchestration
//! engine and answers with an [`Outcome`]:
//! - `Completed`: the step succeeded, with the variables it may set
//! - `BusinessError`: a recoverable error the process routes by code
//! - `TechnicalFailure`: an unexpected failure reported with a retry budget
//!
//! The [`JobWorkerRuntime`] activates jobs, runs the matching handler from
//! the [`HandlerRegistry`] and is the only place that turns outcomes into
//! engine commands.

pub mod config;
pub mod correlation;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod job_types;
pub mod outcome;
pub mod registry;
pub mod runtime;
pub mod services;

pub use config::RuntimeConfig;
pub use correlation::{CorrelationStrategy, ParseCorrelationError};
pub use error::WorkerError;
pub use handler::JobHandler;
pub use handlers::{
    CardChargeHandler, CreditDeductionHandler, DiscountHandler, PaymentCompletionHandler,
    PaymentInvocationHandler,
};
pub use outcome::{JobCommand, Outcome};
pub use registry::{HandlerRegistry, RegistryError};
pub use runtime::JobWorkerRuntime;
pub use services::{
    CardDetails, ChargeReceipt, ChargeRequest, GatewayError, InMemoryPaymentGateway,
    PaymentGateway,
};
