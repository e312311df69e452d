//! # Payment Type Codes
//!
//! Integer codes identifying the processor/network route a button represents.
//! The code is read off the clicked button's `data-paymenttype` attribute.

use serde::{Deserialize, Serialize};

/// Processor/network route selected by a payment button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentTypeCode(pub u32);

impl PaymentTypeCode {
    /// MPGS Apple Pay
    pub const MPGS_APPLE_PAY: PaymentTypeCode = PaymentTypeCode(9);
    /// Visa
    pub const VISA: PaymentTypeCode = PaymentTypeCode(10);
    /// KNET debit cards through Apple Pay
    pub const KNET_DEBIT: PaymentTypeCode = PaymentTypeCode(11);
    /// KNET credit cards through Apple Pay
    pub const KNET_CREDIT: PaymentTypeCode = PaymentTypeCode(12);

    /// Every code the gateway routes through Apple Pay
    pub const APPLE_PAY_METHOD_IDS: [PaymentTypeCode; 6] = [
        PaymentTypeCode(9),
        PaymentTypeCode(10),
        PaymentTypeCode(11),
        PaymentTypeCode(12),
        PaymentTypeCode(13),
        PaymentTypeCode(14),
    ];

    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Whether the gateway recognises this code as an Apple Pay method
    pub fn is_apple_pay_method(&self) -> bool {
        Self::APPLE_PAY_METHOD_IDS.contains(self)
    }

    /// Parse a button data attribute the way `parseInt` does: leading
    /// whitespace is skipped and the leading run of digits is taken.
    /// Zero and unparsable values yield `None`.
    pub fn from_data_attribute(raw: &str) -> Option<Self> {
        let digits: String = raw
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        match digits.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(code) => Some(Self(code)),
        }
    }
}

impl From<u32> for PaymentTypeCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for PaymentTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_attribute() {
        assert_eq!(
            PaymentTypeCode::from_data_attribute("9"),
            Some(PaymentTypeCode::MPGS_APPLE_PAY)
        );
        assert_eq!(
            PaymentTypeCode::from_data_attribute(" 12px"),
            Some(PaymentTypeCode::KNET_CREDIT)
        );
        assert_eq!(PaymentTypeCode::from_data_attribute("0"), None);
        assert_eq!(PaymentTypeCode::from_data_attribute(""), None);
        assert_eq!(PaymentTypeCode::from_data_attribute("visa"), None);
    }

    #[test]
    fn test_apple_pay_method_ids() {
        assert!(PaymentTypeCode(14).is_apple_pay_method());
        assert!(PaymentTypeCode::VISA.is_apple_pay_method());
        assert!(!PaymentTypeCode(1).is_apple_pay_method());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&vec![PaymentTypeCode::KNET_DEBIT]).unwrap();
        assert_eq!(json, "[11]");
    }
}
