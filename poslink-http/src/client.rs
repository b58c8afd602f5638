//! Gateway client over HTTP form-encoded XML.
//!
//! Every call serializes a typed request record to the gateway's XML dialect,
//! posts it as the single form field `xmldata`, and decodes the XML reply
//! into the response record the caller names at the call site. The client's
//! stored credentials are written into the outgoing record on every call,
//! overwriting whatever the request builder left there.

use std::time::Duration;

use poslink::proto::{self, GatewayRequest, GatewayResponse};

use crate::error::ClientError;

/// Form field carrying the URL-encoded XML document.
const XML_FORM_FIELD: &str = "xmldata";

/// Configuration for [`GatewayClient`].
pub struct GatewayConfig {
    /// Gateway endpoint URL.
    pub host: String,

    /// Merchant account identifier injected into every request.
    pub merchant_id: String,

    /// API user injected into every request.
    pub user_id: String,

    /// API pin injected into every request.
    pub pin: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<reqwest::Client>,
}

impl GatewayConfig {
    /// Creates a config for the given endpoint and credentials.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        merchant_id: impl Into<String>,
        user_id: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            merchant_id: merchant_id.into(),
            user_id: user_id.into(),
            pin: pin.into(),
            timeout: Duration::from_secs(30),
            http_client: None,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("merchant_id", &self.merchant_id)
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .field("has_http_client", &self.http_client.is_some())
            .finish_non_exhaustive()
    }
}

/// Client for one gateway endpoint.
///
/// Cheap to clone; clones share the underlying connection pool. Calls share
/// no mutable state with each other, are never retried, and complete in no
/// guaranteed order relative to their issue order.
#[derive(Clone)]
pub struct GatewayClient {
    host: String,
    merchant_id: String,
    user_id: String,
    pin: String,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Creates a client from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the default `reqwest::Client` cannot be constructed.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let http = config.http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(config.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()
                .expect("failed to build reqwest::Client")
        });
        Self {
            host: config.host,
            merchant_id: config.merchant_id,
            user_id: config.user_id,
            pin: config.pin,
            http,
        }
    }

    /// Returns the gateway endpoint URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sends `request` and decodes the reply into `T`.
    ///
    /// The client's credentials are written into the record first,
    /// unconditionally. The future resolves once the full exchange and the
    /// decode have completed.
    ///
    /// # Errors
    ///
    /// [`ClientError::Serialize`] before any network I/O when the record
    /// cannot be encoded; [`ClientError::Transport`] on a network-level
    /// failure; [`ClientError::Status`] on a non-2xx reply;
    /// [`ClientError::Protocol`] when the body does not decode into `T`;
    /// the caller never sees a partially decoded record.
    pub async fn call<R, T>(&self, mut request: R) -> Result<T, ClientError>
    where
        R: GatewayRequest,
        T: GatewayResponse,
    {
        request.set_credentials(&self.merchant_id, &self.user_id, &self.pin);
        let xml = proto::to_xml(&request)?;

        tracing::debug!(host = %self.host, "posting gateway request");
        let response = self
            .http
            .post(&self.host)
            .form(&[(XML_FORM_FIELD, xml.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "gateway rejected request");
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match proto::from_xml(&body) {
            Ok(decoded) => Ok(decoded),
            Err(source) => Err(ClientError::Protocol { source, body }),
        }
    }

    /// Sends `request` without blocking the caller.
    ///
    /// The exchange runs on the async runtime's worker pool and
    /// `on_complete` is invoked there exactly once with the decoded response
    /// or the failure. There is no retry and no cancellation: once issued,
    /// the call runs to completion or failure. The callback runs on an
    /// unspecified worker thread, never on the issuing one.
    pub fn call_detached<R, T, F>(&self, request: R, on_complete: F)
    where
        R: GatewayRequest + Send + 'static,
        T: GatewayResponse + Send + 'static,
        F: FnOnce(Result<T, ClientError>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            on_complete(client.call(request).await);
        });
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("host", &self.host)
            .field("merchant_id", &self.merchant_id)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poslink::proto::{TransactionRequest, TransactionResponse, TransactionType};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str) -> GatewayClient {
        GatewayClient::new(GatewayConfig::new(uri, "merchant-1", "user-1", "pin-1"))
    }

    fn sale_request() -> TransactionRequest {
        TransactionRequest {
            transaction_type: Some(TransactionType::EmvSale),
            tlv_enc: Some("9F0306000000000000".to_owned()),
            ..TransactionRequest::default()
        }
    }

    fn approval_xml() -> String {
        proto::to_xml(&TransactionResponse {
            result: Some("0".to_owned()),
            result_message: Some("APPROVAL".to_owned()),
            txn_id: Some("gw-123".to_owned()),
            ..TransactionResponse::default()
        })
        .expect("encode response")
    }

    #[tokio::test]
    async fn call_decodes_a_success_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(approval_xml()))
            .mount(&server)
            .await;

        let response: TransactionResponse = test_client(&server.uri())
            .call(sale_request())
            .await
            .expect("gateway call");
        assert!(response.success());
        assert_eq!(response.txn_id.as_deref(), Some("gw-123"));
    }

    #[tokio::test]
    async fn call_posts_form_encoded_xml_with_injected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(approval_xml()))
            .mount(&server)
            .await;

        let mut request = sale_request();
        // builder-supplied credentials must not survive injection
        request.merchant_id = Some("rogue-merchant".to_owned());
        let _: TransactionResponse = test_client(&server.uri())
            .call(request)
            .await
            .expect("gateway call");

        let requests = server.received_requests().await.expect("recorded requests");
        let received = &requests[0];
        let content_type = received
            .headers
            .get("content-type")
            .expect("content type header")
            .to_str()
            .expect("header text");
        assert_eq!(content_type, "application/x-www-form-urlencoded");

        let body = String::from_utf8(received.body.clone()).expect("utf8 body");
        let (field, xml) = url::form_urlencoded::parse(body.as_bytes())
            .next()
            .expect("form field");
        assert_eq!(field, "xmldata");
        assert!(xml.contains("<merchant_id>merchant-1</merchant_id>"));
        assert!(xml.contains("<user_id>user-1</user_id>"));
        assert!(xml.contains("<pin>pin-1</pin>"));
        assert!(!xml.contains("rogue-merchant"));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result: Result<TransactionResponse, _> =
            test_client(&server.uri()).call(sale_request()).await;
        match result {
            Err(ClientError::Status { status }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_maps_to_a_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<txn><result>0</result>"))
            .mount(&server)
            .await;

        let result: Result<TransactionResponse, _> =
            test_client(&server.uri()).call(sale_request()).await;
        match result {
            Err(ClientError::Protocol { body, .. }) => {
                assert_eq!(body, "<txn><result>0</result>");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_maps_to_a_transport_error() {
        // nothing listens on the discard port
        let result: Result<TransactionResponse, _> =
            test_client("http://127.0.0.1:9").call(sale_request()).await;
        match result {
            Err(ClientError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn detached_call_delivers_the_result_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(approval_xml()))
            .mount(&server)
            .await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        test_client(&server.uri()).call_detached(
            sale_request(),
            move |result: Result<TransactionResponse, ClientError>| {
                let _ = tx.send(result);
            },
        );

        let delivered = rx.await.expect("callback invoked");
        assert!(delivered.expect("gateway call").success());
    }

    #[tokio::test]
    async fn detached_call_delivers_failures_through_the_same_callback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        test_client(&server.uri()).call_detached(
            sale_request(),
            move |result: Result<TransactionResponse, ClientError>| {
                let _ = tx.send(result);
            },
        );

        match rx.await.expect("callback invoked") {
            Err(ClientError::Status { status }) => assert_eq!(status, 503),
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
