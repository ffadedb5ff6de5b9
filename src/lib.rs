//! docward - A strict, idempotent schema provisioning and validation layer
//! for document stores
//!
//! docward sits above an existing document-store engine and owns three
//! concerns:
//!
//! - defining and enforcing a document type's structural contract at write
//!   time ([`schema`], [`validation`])
//! - declaring a consistent set of secondary indexes per collection
//!   ([`index`])
//! - idempotent, re-runnable provisioning that converges live engine state
//!   to declared configuration ([`provision`], [`config`])
//!
//! Invocation is a library call made by a deployment or bootstrap process;
//! there is no CLI and no wire protocol.

pub mod config;
pub mod index;
pub mod observability;
pub mod provision;
pub mod schema;
pub mod validation;
