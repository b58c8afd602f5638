//! Builds gateway requests from terminal transaction snapshots.

use crate::amount::format_minor_units;
use crate::emv;
use crate::error::MapperError;
use crate::proto::{GatewayEntryMode, PosMode, TransactionRequest, TransactionType};
use crate::transaction::{EntryMode, Transaction};

/// Builds the gateway request for each operation of one capture family.
///
/// Other capture families (magstripe, manual entry) get their own
/// implementations with the same surface.
pub trait TransactionMapper {
    /// Authorization without capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be mapped.
    fn create_auth(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError>;

    /// Authorization plus capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be mapped.
    fn create_sale(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError>;

    /// Refund against a prior captured transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot carries no prior gateway reference.
    fn create_refund(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError>;

    /// Reversal of a prior gateway transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be mapped.
    fn create_reverse(&self, transaction_id: &str) -> Result<TransactionRequest, MapperError>;

    /// Card verification without movement of funds.
    ///
    /// # Errors
    ///
    /// Fails until the gateway mapping for verification is built.
    fn create_verify(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError>;

    /// Balance inquiry.
    ///
    /// # Errors
    ///
    /// Always fails for chip-card captures.
    fn create_balance_inquiry(&self) -> Result<TransactionRequest, MapperError>;
}

/// Mapper for chip-card (EMV) captures.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmvMapper;

impl EmvMapper {
    /// Creates the chip-card mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Shared builder for the auth and sale requests.
    fn create_request(transaction: &Transaction) -> TransactionRequest {
        let source = &transaction.funding_source;
        let card = &source.card;
        let mut request = TransactionRequest {
            clerk_id: Some(transaction.employee_user_id.clone()),
            tlv_enc: Some(emv::retag(source.emv_data.tags())),
            pos_mode: Some(PosMode::IccDual),
            entry_mode: source.entry_mode.and_then(map_entry_mode),
            first_name: card.holder_first_name.clone(),
            last_name: card.holder_last_name.clone(),
            enc_track_data: card.track2_data.clone(),
            ksn: card.key_serial_number.clone(),
            exp_date: Some(card.expiry_mmyy()),
            card_last4: card.number_last4.clone(),
            ..TransactionRequest::default()
        };
        if let Some(tip) = transaction.amounts.tip_amount {
            request.tip_amount = Some(format_minor_units(tip, &transaction.amounts.currency));
        }
        if let Some(verification) = &source.verification_data {
            request.pin_block = Some(verification.pin_block.clone());
            request.pin_ksn = Some(verification.key_serial_number.clone());
        }
        request
    }
}

/// Entry modes with no gateway counterpart leave the field unset.
fn map_entry_mode(mode: EntryMode) -> Option<GatewayEntryMode> {
    match mode {
        EntryMode::ContactlessIntegratedCircuitCard | EntryMode::ContactlessMagstripe => {
            Some(GatewayEntryMode::ProximityRead)
        }
        EntryMode::IntegratedCircuitCard => Some(GatewayEntryMode::ChipWithCvv),
        EntryMode::TrackDataFromMagstripe | EntryMode::ManualEntry => None,
    }
}

impl TransactionMapper for EmvMapper {
    fn create_auth(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError> {
        let mut request = Self::create_request(transaction);
        request.transaction_type = Some(TransactionType::EmvAuthOnly);
        Ok(request)
    }

    fn create_sale(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError> {
        let mut request = Self::create_request(transaction);
        request.transaction_type = Some(TransactionType::EmvSale);
        Ok(request)
    }

    fn create_refund(&self, transaction: &Transaction) -> Result<TransactionRequest, MapperError> {
        let prior = transaction
            .processor_response
            .as_ref()
            .ok_or(MapperError::MissingField("processor_response.retrieval_ref_num"))?;
        Ok(TransactionRequest {
            transaction_type: Some(TransactionType::Return),
            amount: Some(format_minor_units(
                transaction.amounts.transaction_amount,
                &transaction.amounts.currency,
            )),
            txn_id: Some(prior.retrieval_ref_num.clone()),
            ..TransactionRequest::default()
        })
    }

    fn create_reverse(&self, transaction_id: &str) -> Result<TransactionRequest, MapperError> {
        Ok(TransactionRequest {
            transaction_type: Some(TransactionType::EmvReversal),
            txn_id: Some(transaction_id.to_owned()),
            ..TransactionRequest::default()
        })
    }

    fn create_verify(&self, _transaction: &Transaction) -> Result<TransactionRequest, MapperError> {
        Err(MapperError::NotImplemented("verify"))
    }

    fn create_balance_inquiry(&self) -> Result<TransactionRequest, MapperError> {
        Err(MapperError::Unsupported("balance inquiry"))
    }
}
