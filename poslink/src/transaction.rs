//! Read-only snapshot of a terminal transaction.
//!
//! This is the boundary to the point-of-sale data model: the mapper only
//! reads from these types and never writes back. Amounts are minor units of
//! the snapshot's ISO-4217 currency.

/// How card data was captured at the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// Contact chip read.
    IntegratedCircuitCard,
    /// Contactless chip read.
    ContactlessIntegratedCircuitCard,
    /// Contactless magstripe-mode read.
    ContactlessMagstripe,
    /// Swiped magstripe track data.
    TrackDataFromMagstripe,
    /// Keyed in by hand.
    ManualEntry,
}

/// Transaction amounts in minor units of `currency`.
#[derive(Debug, Clone)]
pub struct Amounts {
    /// Total transaction amount.
    pub transaction_amount: i64,
    /// Tip portion, when the terminal captured one.
    pub tip_amount: Option<i64>,
    /// ISO-4217 currency code.
    pub currency: String,
}

/// Card details captured by the terminal.
#[derive(Debug, Clone)]
pub struct Card {
    /// Cardholder first name, when the card carries one.
    pub holder_first_name: Option<String>,
    /// Cardholder last name, when the card carries one.
    pub holder_last_name: Option<String>,
    /// Encrypted track-2 data.
    pub track2_data: Option<String>,
    /// Key serial number for the encrypted track data.
    pub key_serial_number: Option<String>,
    /// Last four digits of the card number.
    pub number_last4: Option<String>,
    /// Expiry month, 1–12.
    pub expiration_month: u32,
    /// Expiry year, four digits.
    pub expiration_year: u32,
}

impl Card {
    /// Card expiry in the `MMYY` form the gateway expects.
    #[must_use]
    pub fn expiry_mmyy(&self) -> String {
        format!(
            "{:02}{:02}",
            self.expiration_month,
            self.expiration_year % 100
        )
    }
}

/// Ordered EMV tag data read from the chip.
///
/// Entries keep the order the terminal produced them in; tags are unique
/// within one transaction.
#[derive(Debug, Clone, Default)]
pub struct EmvData {
    tags: Vec<(String, String)>,
}

impl EmvData {
    /// Wraps an ordered list of (stored key, hex value) entries.
    #[must_use]
    pub fn new(tags: Vec<(String, String)>) -> Self {
        Self { tags }
    }

    /// Tag entries in terminal order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Cardholder verification captured at the terminal.
#[derive(Debug, Clone)]
pub struct VerificationData {
    /// Encrypted PIN block.
    pub pin_block: String,
    /// Key serial number for the PIN block.
    pub key_serial_number: String,
}

/// Funding source of the transaction.
#[derive(Debug, Clone)]
pub struct FundingSource {
    /// The card presented.
    pub card: Card,
    /// Chip data read during the exchange.
    pub emv_data: EmvData,
    /// How the card was read, when the terminal reported it.
    pub entry_mode: Option<EntryMode>,
    /// PIN verification data, when the cardholder entered one.
    pub verification_data: Option<VerificationData>,
}

/// Processor result of a prior handling of this transaction.
#[derive(Debug, Clone)]
pub struct ProcessorResponse {
    /// Retrieval reference number linking back to the captured transaction.
    pub retrieval_ref_num: String,
}

/// Snapshot of a terminal transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Operator who ran the transaction.
    pub employee_user_id: String,
    /// Amount breakdown.
    pub amounts: Amounts,
    /// Card, chip data, and capture details.
    pub funding_source: FundingSource,
    /// Prior processor result, present once the transaction was captured.
    pub processor_response: Option<ProcessorResponse>,
}
