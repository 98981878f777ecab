//! Typed view of the decrypted payment data
//!
//! Decryption itself returns JSON text; this is an optional convenience for
//! callers that want the common EC_v1 3-D Secure fields.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    /// Device-specific account number
    pub application_primary_account_number: String,
    /// YYMMDD
    pub application_expiration_date: String,
    /// ISO 4217 numeric code
    pub currency_code: String,
    /// Minor units
    pub transaction_amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
    pub device_manufacturer_identifier: String,
    pub payment_data_type: String,
    pub payment_data: CryptogramData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptogramData {
    pub online_payment_cryptogram: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eci_indicator: Option<String>,
}

impl PaymentData {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TokenError::InvalidPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields() {
        let json = r#"{
            "applicationPrimaryAccountNumber": "4109370251004320",
            "applicationExpirationDate": "271231",
            "currencyCode": "978",
            "transactionAmount": 2599,
            "deviceManufacturerIdentifier": "040010030273",
            "paymentDataType": "3DSecure",
            "paymentData": {"onlinePaymentCryptogram": "Af9x/QwAA/DjmU65oyc1MAABAAA="}
        }"#;
        let data = PaymentData::from_json(json).unwrap();
        assert_eq!(data.transaction_amount, 2599);
        assert!(data.cardholder_name.is_none());
        assert!(data.payment_data.eci_indicator.is_none());
    }

    #[test]
    fn test_wrong_shape_is_invalid_payload() {
        assert!(matches!(
            PaymentData::from_json(r#"{"currencyCode": 840}"#),
            Err(TokenError::InvalidPayload(_))
        ));
    }
}
