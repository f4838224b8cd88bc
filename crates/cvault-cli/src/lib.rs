//! # cvault-cli — Credential Vault Command-Line Interface
//!
//! Drives a credential ledger persisted as a JSON snapshot file. Every
//! invocation performs exactly one ledger operation.
//!
//! ## Subcommands
//!
//! - `register`: Register a document fingerprint and encrypted payload
//! - `revoke`: Revoke an owned credential
//! - `authorize`: Grant or withdraw a verifier's permission
//! - `verify`: Check a fingerprint as an authorized verifier
//! - `show`, `list`, `record`, `authorized`: Read-only queries
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from ledger logic.
//! - Handlers delegate to `cvault-ledger`; no ledger rules live here.

pub mod commands;
pub mod state;
