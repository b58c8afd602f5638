#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for bridging a point-of-sale terminal to a legacy XML payment
//! gateway.
//!
//! The gateway accepts flat XML transaction records posted over HTTP and
//! reads chip-card data as a re-tagged TLV hex string in its own tag dialect.
//! This crate holds everything below the transport:
//!
//! - [`transaction`] - Read-only snapshot of the terminal transaction
//! - [`emv`] - TLV re-tagging into the gateway dialect
//! - [`proto`] - Gateway wire records and their XML mapping
//! - [`mapper`] - Request assembly per operation
//! - [`amount`] - Minor-unit amount formatting
//! - [`error`] - Mapper-level errors
//!
//! The HTTP transport lives in the `poslink-http` crate.

pub mod amount;
pub mod emv;
pub mod error;
pub mod mapper;
pub mod proto;
pub mod transaction;
