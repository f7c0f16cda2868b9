//! Checkout Data

/// Customer-supplied checkout details.
///
/// The payment method is an opaque descriptor; nothing is ever charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub shipping_address: String,
}

impl CheckoutRequest {
    /// Name of the first blank required field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.payment_method.trim().is_empty() {
            Some("payment_method")
        } else if self.shipping_address.trim().is_empty() {
            Some("shipping_address")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_as_missing() {
        let request = CheckoutRequest {
            payment_method: "card".to_string(),
            shipping_address: "   ".to_string(),
        };

        assert_eq!(request.missing_field(), Some("shipping_address"));
    }
}
