//! External service traits and in-memory implementations used by handlers.

pub mod gateway;

pub use gateway::{
    CardDetails, ChargeReceipt, ChargeRequest, GatewayError, InMemoryPaymentGateway,
    PaymentGateway,
};
