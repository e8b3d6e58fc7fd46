use thiserror::Error;

/// Result alias used across the crate.
pub type TpmResult<T> = Result<T, TpmError>;

/// Success response code.
pub const TPM_RC_SUCCESS: u32 = 0x000;

/// Base for format-one TPM response codes.
const RC_FMT1: u32 = 0x080;

/// The response claims a size incompatible with the data actually present.
pub const TPM_RC_SIZE: u32 = RC_FMT1 + 0x015;

/// The buffer is too short for the requested type, or a length prefix
/// exceeds its backing capacity.
pub const TPM_RC_INSUFFICIENT: u32 = RC_FMT1 + 0x01A;

/// Client-layer error base. Bits 16..23 carry a layer indicator so these
/// codes can never collide with codes produced by the TPM itself.
const RC_CLIENT_BASE: u32 = 0x0004_0000;

/// The authorization delegate refused to issue or verify a session section.
pub const SAPI_RC_AUTHORIZATION_FAILED: u32 = RC_CLIENT_BASE + 1;

/// The authorization delegate failed to transform a parameter payload.
pub const SAPI_RC_ENCRYPTION_FAILED: u32 = RC_CLIENT_BASE + 2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TpmError {
    #[error("tpm: insufficient bytes in buffer")]
    Insufficient,
    #[error("tpm: envelope size does not match response length")]
    Size,
    #[error("tpm: authorization failed")]
    AuthorizationFailed,
    #[error("tpm: parameter encryption failed")]
    EncryptionFailed,
    #[error("tpm: response code 0x{0:08X}")]
    Response(u32),
}

impl TpmError {
    /// Maps a nonzero wire response code onto the error taxonomy. Codes that
    /// numerically match a locally produced framing code collapse into the
    /// named variant; everything else is surfaced verbatim.
    pub fn from_response_code(code: u32) -> TpmError {
        match code {
            TPM_RC_SIZE => TpmError::Size,
            TPM_RC_INSUFFICIENT => TpmError::Insufficient,
            SAPI_RC_AUTHORIZATION_FAILED => TpmError::AuthorizationFailed,
            SAPI_RC_ENCRYPTION_FAILED => TpmError::EncryptionFailed,
            other => TpmError::Response(other),
        }
    }

    /// The 32-bit response code for this error.
    pub fn response_code(&self) -> u32 {
        match self {
            TpmError::Insufficient => TPM_RC_INSUFFICIENT,
            TpmError::Size => TPM_RC_SIZE,
            TpmError::AuthorizationFailed => SAPI_RC_AUTHORIZATION_FAILED,
            TpmError::EncryptionFailed => SAPI_RC_ENCRYPTION_FAILED,
            TpmError::Response(code) => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code_round_trip() {
        for err in [
            TpmError::Insufficient,
            TpmError::Size,
            TpmError::AuthorizationFailed,
            TpmError::EncryptionFailed,
            TpmError::Response(0x0000_0101),
        ] {
            assert_eq!(TpmError::from_response_code(err.response_code()), err);
        }
    }

    #[test]
    fn test_tpm_codes_pass_through() {
        assert_eq!(
            TpmError::from_response_code(0x921),
            TpmError::Response(0x921)
        );
        assert_eq!(TpmError::Response(0x921).response_code(), 0x921);
    }
}
