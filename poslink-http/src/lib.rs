#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the poslink gateway protocol.
//!
//! The gateway accepts `application/x-www-form-urlencoded` POSTs whose single
//! `xmldata` field carries a URL-encoded XML document, and answers with an
//! XML document in the response body.
//!
//! # Modules
//!
//! - [`client`] - The gateway client (awaited and detached calls)
//! - [`error`] - Unified transport error type

pub mod client;
pub mod error;
