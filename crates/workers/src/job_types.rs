//! Job types, message names and business error codes shared with the
//! process definition.

/// Applies a percentage discount to the order total.
pub const APPLY_DISCOUNT: &str = "apply-discount";

/// Forwards the job's variables as a payment request message.
pub const PAYMENT_INVOCATION: &str = "payment-invocation";

/// Deducts the order total from the customer's credit.
pub const CREDIT_DEDUCTION: &str = "credit-deduction";

/// Charges the amount left open after credit deduction to a card.
pub const CREDIT_CARD_CHARGING: &str = "credit-card-charging";

/// Signals that payment for an order has completed.
pub const PAYMENT_COMPLETION: &str = "payment-completion";

/// Message sent by the payment-invocation handler.
pub const PAYMENT_REQUEST_MESSAGE: &str = "paymentRequestMessage";

/// Message sent by the payment-completion handler, correlated on `orderId`.
pub const PAYMENT_COMPLETED_MESSAGE: &str = "paymentCompletedMessage";

/// Error code for malformed or out-of-range job variables.
pub const INVALID_INPUT_ERROR: &str = "invalidInput";

/// Error code for customer ids that yield no credit value.
pub const INVALID_CUSTOMER_ID_ERROR: &str = "invalidCustomerId";

/// Error code for card data rejected by the payment gateway.
pub const CREDIT_CARD_CHARGE_ERROR: &str = "creditCardChargeError";
