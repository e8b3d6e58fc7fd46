//! User-space client core for TPM 2.0.
//!
//! This crate marshals TPM 2.0 command invocations into their exact
//! on-the-wire form, dispatches them through a pluggable transceiver,
//! dismantles the response envelope, verifies session authorization on the
//! response, and hands typed results back to the caller. It is a stateless
//! codec and dispatcher: session management lives behind
//! [`AuthorizationDelegate`], transport behind [`CommandTransceiver`].
//!
//! Layers, leaves first:
//!
//! - [`marshal`]: big-endian primitive codec with raw-byte capture.
//! - [`types`]: the TPM 2.0 type catalog — newtype aliases, sized buffers,
//!   fixed structures, counted lists, externally-selected unions.
//! - [`command`]: the command/response envelope template and the [`Tpm`]
//!   dispatcher with one entry point per TPM command.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tpm2_client::{Tpm, TPM2_SU_CLEAR};
//! # fn transceiver() -> Arc<dyn tpm2_client::CommandTransceiver> { unimplemented!() }
//!
//! let tpm = Tpm::new(transceiver());
//! tpm.startup_sync(TPM2_SU_CLEAR, None)?;
//! let random = tpm.get_random_sync(16, None)?;
//! assert_eq!(random.value().len(), 16);
//! # Ok::<(), tpm2_client::TpmError>(())
//! ```

pub mod authorization;
pub mod command;
pub mod error;
pub mod marshal;
pub mod transport;
pub mod types;

pub use crate::authorization::{
    AuthDelegateHandle, AuthorizationDelegate, PasswordAuthorizationDelegate,
};
pub use crate::command::{Tpm, TpmCallback, COMMAND_HEADER_SIZE};
pub use crate::error::{TpmError, TpmResult, TPM_RC_INSUFFICIENT, TPM_RC_SIZE, TPM_RC_SUCCESS};
pub use crate::marshal::WireType;
pub use crate::transport::{CommandTransceiver, SendCommandCallback};
pub use crate::types::*;
