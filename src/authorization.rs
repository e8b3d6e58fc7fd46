//! Session authorization abstraction.
//!
//! The core never manages sessions itself. It hands the delegate the
//! command-parameter hash when building a request, hands back the
//! response-parameter hash and authorization section for verification, and
//! lets the delegate transform one designated parameter per direction for
//! session encryption. HMAC, policy and password session logic all live
//! behind this trait.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::marshal::WireType;
use crate::types::{
    Tpm2bAuth, Tpm2bNonce, TpmaSession, TpmsAuthCommand, TpmsAuthResponse, TPM2_RS_PW,
};

/// Per-command authorization callbacks.
///
/// Implementations may carry mutable session state (nonces, rolling HMAC
/// keys) behind interior synchronization; the core serializes its calls per
/// command in the order build, verify, decrypt.
pub trait AuthorizationDelegate: Send + Sync {
    /// Produces the authorization section for a command whose parameter hash
    /// is `command_hash`. An empty section means the command goes out
    /// without sessions. `None` refuses the command.
    fn get_command_authorization(&self, command_hash: &[u8]) -> Option<Vec<u8>>;

    /// Verifies the response authorization section against the
    /// response-parameter hash.
    fn check_response_authorization(&self, response_hash: &[u8], authorization: &[u8]) -> bool;

    /// Encrypts a command parameter payload in place. The payload excludes
    /// any size prefix and the length must not change.
    fn encrypt_command_parameter(&self, parameter: &mut Vec<u8>) -> bool;

    /// Decrypts a response parameter payload in place.
    fn decrypt_response_parameter(&self, parameter: &mut Vec<u8>) -> bool;
}

/// Shared handle to a delegate, for the asynchronous command entry points.
pub type AuthDelegateHandle = Arc<dyn AuthorizationDelegate>;

/// Plaintext password authorization.
///
/// Emits a single authorization record with the password-session indicator
/// handle, an empty nonce and `continueSession` set; the password rides in
/// the HMAC slot. No parameter encryption is performed.
pub struct PasswordAuthorizationDelegate {
    password: Zeroizing<Vec<u8>>,
}

impl PasswordAuthorizationDelegate {
    pub fn new(password: &[u8]) -> Self {
        Self {
            password: Zeroizing::new(password.to_vec()),
        }
    }
}

impl AuthorizationDelegate for PasswordAuthorizationDelegate {
    fn get_command_authorization(&self, _command_hash: &[u8]) -> Option<Vec<u8>> {
        let auth = TpmsAuthCommand {
            session_handle: TPM2_RS_PW,
            nonce: Tpm2bNonce::default(),
            session_attributes: TpmaSession::CONTINUE_SESSION,
            hmac: Tpm2bAuth::from_bytes(&self.password).ok()?,
        };
        auth.to_wire().ok()
    }

    fn check_response_authorization(&self, _response_hash: &[u8], authorization: &[u8]) -> bool {
        // A password response carries an empty nonce and an empty HMAC;
        // anything else is not ours.
        let mut buffer = authorization;
        match TpmsAuthResponse::parse(&mut buffer, None) {
            Ok(auth) => buffer.is_empty() && auth.nonce.is_empty() && auth.hmac.is_empty(),
            Err(_) => false,
        }
    }

    fn encrypt_command_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        true
    }

    fn decrypt_response_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_password_authorization_section() {
        let delegate = PasswordAuthorizationDelegate::new(b"");
        let section = delegate
            .get_command_authorization(&[0u8; 32])
            .expect("authorization");
        assert_eq!(section, hex!("40000009 0000 01 0000"));

        let delegate = PasswordAuthorizationDelegate::new(b"owner");
        let section = delegate
            .get_command_authorization(&[0u8; 32])
            .expect("authorization");
        assert_eq!(section, hex!("40000009 0000 01 0005 6F776E6572"));
    }

    #[test]
    fn test_password_response_check() {
        let delegate = PasswordAuthorizationDelegate::new(b"owner");
        assert!(delegate.check_response_authorization(&[0u8; 32], &hex!("0000 01 0000")));
        assert!(!delegate.check_response_authorization(&[0u8; 32], &hex!("0000 01")));
        assert!(!delegate
            .check_response_authorization(&[0u8; 32], &hex!("0000 01 0004 DEADBEEF")));
    }

    #[test]
    fn test_password_parameter_transform_is_identity() {
        let delegate = PasswordAuthorizationDelegate::new(b"owner");
        let mut parameter = vec![1, 2, 3];
        assert!(delegate.encrypt_command_parameter(&mut parameter));
        assert_eq!(parameter, [1, 2, 3]);
        assert!(delegate.decrypt_response_parameter(&mut parameter));
        assert_eq!(parameter, [1, 2, 3]);
    }
}
