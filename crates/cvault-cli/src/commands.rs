//! # Ledger Commands
//!
//! One subcommand per ledger operation. Each run loads the state file,
//! rebuilds a [`CredentialVault`] from it, performs one operation, and
//! writes the state back only if a mutation succeeded. A rejected
//! operation returns an error and leaves the file untouched.
//!
//! Caller identity comes from `--as`. The CLI trusts it as given.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use cvault_core::{Address, CredentialId, DocHash, SystemClock};
use cvault_ledger::{Credential, CredentialVault, InMemoryStorage, TracingSink, VaultConfig};

use crate::state::{load_snapshot, save_snapshot};

type Vault = CredentialVault<InMemoryStorage, SystemClock, TracingSink>;

/// Exit code for a completed command.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for a check that ran and came out negative: a `verify` whose
/// fingerprint did not match.
pub const EXIT_CHECK_FAILED: u8 = 1;

/// Exit code for an operational error: a rejected ledger operation, an
/// unreadable state or config file, or a failed write.
pub const EXIT_ERROR: u8 = 2;

/// Ledger subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a document fingerprint with its encrypted payload.
    Register {
        /// Owner identity (0x + 40 hex).
        #[arg(long = "as", value_name = "ADDRESS")]
        caller: Address,
        /// SHA-256 document fingerprint (0x + 64 hex).
        #[arg(long)]
        hash: DocHash,
        /// Encrypted payload, as produced by the client.
        #[arg(long)]
        payload: String,
    },

    /// Revoke a credential you own (ACTIVE → REVOKED).
    Revoke {
        #[arg(long = "as", value_name = "ADDRESS")]
        caller: Address,
        #[arg(long)]
        id: CredentialId,
    },

    /// Grant a verifier permission to check a credential, or withdraw it.
    Authorize {
        #[arg(long = "as", value_name = "ADDRESS")]
        caller: Address,
        #[arg(long)]
        id: CredentialId,
        #[arg(long)]
        verifier: Address,
        /// Withdraw the grant instead of giving it.
        #[arg(long)]
        deny: bool,
    },

    /// Check a document fingerprint as an authorized verifier.
    Verify {
        /// Verifier identity.
        #[arg(long = "as", value_name = "ADDRESS")]
        caller: Address,
        #[arg(long)]
        id: CredentialId,
        /// Fingerprint of the document being checked.
        #[arg(long)]
        hash: DocHash,
    },

    /// Show one credential.
    Show {
        #[arg(long)]
        id: CredentialId,
    },

    /// List the credential ids registered by an owner.
    List {
        #[arg(long)]
        owner: Address,
    },

    /// Show the latest verification outcome for a verifier.
    Record {
        #[arg(long)]
        id: CredentialId,
        #[arg(long)]
        verifier: Address,
    },

    /// List an owner's credentials that a verifier may check.
    Authorized {
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        verifier: Address,
    },
}

impl Command {
    /// Whether the command changes the ledger.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Register { .. } | Self::Revoke { .. } | Self::Authorize { .. } | Self::Verify { .. }
        )
    }
}

/// Execute `command` against the ledger stored at `state_path`.
///
/// Returns exit code: 0 on success, 1 when `verify` recorded a mismatch.
/// Errors map to 2 through [`exit_code`].
pub fn run_command(command: &Command, state_path: &Path, config: &VaultConfig) -> Result<u8> {
    let snapshot = load_snapshot(state_path)?;
    let vault: Vault =
        CredentialVault::from_snapshot(snapshot, SystemClock, TracingSink, config.clone())
            .with_context(|| format!("state file {} is inconsistent", state_path.display()))?;

    let code = execute(&vault, command)?;

    if command.is_mutation() {
        save_snapshot(state_path, &vault.snapshot())?;
    }
    Ok(code)
}

/// Process exit code for the outcome of [`run_command`].
pub fn exit_code(result: &Result<u8>) -> u8 {
    match result {
        Ok(code) => *code,
        Err(_) => EXIT_ERROR,
    }
}

fn execute(vault: &Vault, command: &Command) -> Result<u8> {
    match command {
        Command::Register {
            caller,
            hash,
            payload,
        } => {
            let id = vault.register(*caller, *hash, payload.as_str())?;
            println!("OK: registered credential {id}");
            Ok(EXIT_SUCCESS)
        }

        Command::Revoke { caller, id } => {
            vault.revoke(*id, caller)?;
            println!("OK: credential {id} revoked");
            Ok(EXIT_SUCCESS)
        }

        Command::Authorize {
            caller,
            id,
            verifier,
            deny,
        } => {
            vault.set_authorization(*id, *verifier, !deny, caller)?;
            if *deny {
                println!("OK: {verifier} may no longer verify credential {id}");
            } else {
                println!("OK: {verifier} may verify credential {id}");
            }
            Ok(EXIT_SUCCESS)
        }

        Command::Verify { caller, id, hash } => {
            if vault.verify(*id, caller, *hash)? {
                println!("MATCH: credential {id} fingerprint verified");
                Ok(EXIT_SUCCESS)
            } else {
                println!("MISMATCH: credential {id} fingerprint differs");
                Ok(EXIT_CHECK_FAILED)
            }
        }

        Command::Show { id } => {
            print_credential(&vault.get(*id)?);
            Ok(EXIT_SUCCESS)
        }

        Command::List { owner } => {
            let ids = vault.list_by_owner(owner);
            if ids.is_empty() {
                println!("No credentials registered by {owner}.");
            } else {
                println!("Credentials of {owner} ({}):", ids.len());
                for id in ids {
                    println!("  {id}");
                }
            }
            Ok(EXIT_SUCCESS)
        }

        Command::Record { id, verifier } => {
            match vault.get_record(*id, verifier) {
                Some(record) => {
                    println!("Verification of credential {id} by {verifier}:");
                    println!("  Matched: {}", record.matched);
                    println!("  Compared hash: {}", record.compared_hash);
                    println!("  Verified at: {}", record.verified_at);
                }
                None => println!("No verification of credential {id} by {verifier}."),
            }
            Ok(EXIT_SUCCESS)
        }

        Command::Authorized { owner, verifier } => {
            let credentials = vault.authorized_credentials(owner, verifier);
            if credentials.is_empty() {
                println!("{verifier} may verify no credentials of {owner}.");
            } else {
                println!("{verifier} may verify ({}):", credentials.len());
                for credential in &credentials {
                    println!(
                        "  [{}] {} {}",
                        credential.id(),
                        credential.doc_hash(),
                        credential.state()
                    );
                }
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

fn print_credential(credential: &Credential) {
    println!("Credential: {}", credential.id());
    println!("  Owner: {}", credential.owner());
    println!("  Doc hash: {}", credential.doc_hash());
    println!("  State: {}", credential.state());
    println!("  Created: {}", credential.created_at());
    println!("  Payload: {}", credential.encrypted_payload().as_str());
}
