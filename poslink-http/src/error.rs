//! Error types for the gateway transport.

/// Failures surfaced by [`GatewayClient`](crate::client::GatewayClient).
///
/// Every call resolves to a decoded response or exactly one of these;
/// nothing is retried and nothing is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be encoded as gateway XML. Raised before any
    /// network I/O happens.
    #[error("could not encode request as gateway xml: {0}")]
    Serialize(#[from] quick_xml::SeError),

    /// The gateway answered with a non-success HTTP status.
    #[error("gateway answered http status {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
    },

    /// The exchange failed below HTTP: connect, timeout, or request
    /// transmission.
    #[error("gateway transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway's reply could not be decoded into the expected record.
    #[error("could not decode gateway response: {source}")]
    Protocol {
        /// Decode failure reported by the XML mapper.
        #[source]
        source: quick_xml::DeError,
        /// Raw response body as received.
        body: String,
    },
}
