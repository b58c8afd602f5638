//! Gateway wire records.
//!
//! The gateway speaks a flat XML dialect: every request and every response is
//! a single `<txn>` element whose children map one-to-one onto record fields.
//! Unset optional fields are omitted from the document rather than sent
//! empty, and unknown elements in a reply are ignored.
//!
//! # Key Types
//!
//! - [`TransactionRequest`] / [`TransactionResponse`] - The flat records
//! - [`TransactionType`], [`GatewayEntryMode`], [`PosMode`] - Wire enums
//! - [`GatewayRequest`] / [`GatewayResponse`] - The client-facing seams
//! - [`to_xml`] / [`from_xml`] - XML mapping helpers

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Root XML element wrapping every request and response document.
pub const XML_ROOT: &str = "txn";

/// Result code the gateway reports for an approved transaction.
const APPROVED_RESULT: &str = "0";

/// Operation codes the gateway accepts for chip-card transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Authorization without capture.
    #[serde(rename = "emvauthonly")]
    EmvAuthOnly,
    /// Authorization plus capture.
    #[serde(rename = "emvsale")]
    EmvSale,
    /// Refund linked to a prior captured transaction.
    #[serde(rename = "return")]
    Return,
    /// Reversal of a prior chip-card transaction.
    #[serde(rename = "emvreversal")]
    EmvReversal,
}

/// Capture-mode codes the gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEntryMode {
    /// Contactless read, chip or magstripe mode.
    #[serde(rename = "proximity_read")]
    ProximityRead,
    /// Contact chip read with cardholder verification.
    #[serde(rename = "chip_with_cvv")]
    ChipWithCvv,
}

/// Terminal capability advertised to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosMode {
    /// Dual-interface chip reader.
    #[serde(rename = "icc_dual")]
    IccDual,
}

/// A request record the client can serialize and credential-inject.
pub trait GatewayRequest: Serialize {
    /// Overwrites the three merchant credential fields.
    ///
    /// The transport client calls this immediately before serialization, so
    /// per-call credentials never originate from a request builder.
    fn set_credentials(&mut self, merchant_id: &str, user_id: &str, pin: &str);
}

/// A response record the client can decode a gateway reply into.
pub trait GatewayResponse: DeserializeOwned {
    /// Whether the gateway reported the operation as successful.
    fn success(&self) -> bool;
}

/// Flat transaction request record.
///
/// Every operation uses this shape; the populated subset differs per
/// operation and the rest is omitted from the XML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Operation code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    /// Merchant account identifier; injected by the transport client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    /// API user; injected by the transport client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// API pin; injected by the transport client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// Transaction amount as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Tip amount as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<String>,
    /// Gateway transaction identifier of a prior transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    /// Operator who ran the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clerk_id: Option<String>,
    /// Re-tagged EMV TLV payload as a flat hex string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlv_enc: Option<String>,
    /// Terminal capability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_mode: Option<PosMode>,
    /// How the card was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_mode: Option<GatewayEntryMode>,
    /// Cardholder first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Cardholder last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Encrypted track-2 data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc_track_data: Option<String>,
    /// Key serial number for the track data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ksn: Option<String>,
    /// Card expiry as `MMYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_date: Option<String>,
    /// Last four digits of the card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    /// Encrypted PIN block, when the cardholder entered a PIN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_block: Option<String>,
    /// Key serial number for the PIN block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_ksn: Option<String>,
}

impl GatewayRequest for TransactionRequest {
    fn set_credentials(&mut self, merchant_id: &str, user_id: &str, pin: &str) {
        self.merchant_id = Some(merchant_id.to_owned());
        self.user_id = Some(user_id.to_owned());
        self.pin = Some(pin.to_owned());
    }
}

/// Flat transaction response record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// Result code; [`APPROVED_RESULT`] means approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Human-readable result text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_message: Option<String>,
    /// Gateway transaction identifier assigned to this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    /// Issuer approval code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_code: Option<String>,
    /// Amount the gateway settled on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Masked card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// Card expiry echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_date: Option<String>,
    /// Gateway error code, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Gateway error name, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,
    /// Gateway error detail, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GatewayResponse for TransactionResponse {
    fn success(&self) -> bool {
        self.result.as_deref() == Some(APPROVED_RESULT)
    }
}

/// Serializes a wire record under the [`XML_ROOT`] element.
///
/// # Errors
///
/// Returns an error if the record cannot be represented in XML.
pub fn to_xml<T: Serialize>(record: &T) -> Result<String, quick_xml::SeError> {
    quick_xml::se::to_string_with_root(XML_ROOT, record)
}

/// Decodes a gateway XML document into a wire record.
///
/// # Errors
///
/// Returns an error if the document is malformed or does not match the
/// record shape.
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> TransactionRequest {
        TransactionRequest {
            transaction_type: Some(TransactionType::EmvSale),
            merchant_id: Some("merchant-1".to_owned()),
            user_id: Some("user-1".to_owned()),
            pin: Some("pin-1".to_owned()),
            amount: Some("10.00".to_owned()),
            tip_amount: Some("1.50".to_owned()),
            txn_id: Some("txn-9".to_owned()),
            clerk_id: Some("clerk-7".to_owned()),
            tlv_enc: Some("9F0306000000000000".to_owned()),
            pos_mode: Some(PosMode::IccDual),
            entry_mode: Some(GatewayEntryMode::ProximityRead),
            first_name: Some("ADA".to_owned()),
            last_name: Some("LOVELACE".to_owned()),
            enc_track_data: Some("DEADBEEF".to_owned()),
            ksn: Some("FFFF9876543210E00001".to_owned()),
            exp_date: Some("0930".to_owned()),
            card_last4: Some("4242".to_owned()),
            pin_block: Some("0123456789ABCDEF".to_owned()),
            pin_ksn: Some("FFFF9876543210E00002".to_owned()),
        }
    }

    #[test]
    fn request_round_trips_through_xml() {
        let request = full_request();
        let xml = to_xml(&request).expect("encode request");
        let decoded: TransactionRequest = from_xml(&xml).expect("decode request");
        assert_eq!(decoded, request);
    }

    #[test]
    fn unset_fields_are_omitted_from_the_document() {
        let request = TransactionRequest {
            transaction_type: Some(TransactionType::EmvReversal),
            txn_id: Some("txn-9".to_owned()),
            ..TransactionRequest::default()
        };
        let xml = to_xml(&request).expect("encode request");
        assert_eq!(
            xml,
            "<txn><transaction_type>emvreversal</transaction_type>\
             <txn_id>txn-9</txn_id></txn>"
        );
    }

    #[test]
    fn credential_injection_overwrites_the_previous_set() {
        let mut request = TransactionRequest::default();
        request.set_credentials("m1", "u1", "p1");
        request.set_credentials("m2", "u2", "p2");
        let xml = to_xml(&request).expect("encode request");
        assert!(xml.contains("<merchant_id>m2</merchant_id>"));
        assert!(xml.contains("<user_id>u2</user_id>"));
        assert!(xml.contains("<pin>p2</pin>"));
        assert!(!xml.contains("m1"));
    }

    #[test]
    fn approval_result_reads_as_success() {
        let response: TransactionResponse = from_xml(
            "<txn><result>0</result><result_message>APPROVAL</result_message>\
             <txn_id>gw-1</txn_id><approval_code>CMC648</approval_code></txn>",
        )
        .expect("decode response");
        assert!(response.success());
        assert_eq!(response.txn_id.as_deref(), Some("gw-1"));
    }

    #[test]
    fn decline_and_empty_results_read_as_failure() {
        let declined: TransactionResponse = from_xml(
            "<txn><result>1</result><error_code>4025</error_code>\
             <error_name>Invalid Credit Card Number</error_name></txn>",
        )
        .expect("decode response");
        assert!(!declined.success());
        assert_eq!(declined.error_code.as_deref(), Some("4025"));

        let empty = TransactionResponse::default();
        assert!(!empty.success());
    }

    #[test]
    fn unknown_response_elements_are_ignored() {
        let response: TransactionResponse =
            from_xml("<txn><result>0</result><issuer_response>00</issuer_response></txn>")
                .expect("decode response");
        assert!(response.success());
    }
}
