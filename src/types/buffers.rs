//! Sized byte buffers (TPM2B types).
//!
//! On the wire a sized buffer is a u16 length followed by exactly that many
//! payload bytes; the backing capacity is a type-level constant and is never
//! transmitted. A length that exceeds the capacity is `Insufficient` on both
//! encode and decode.

use crate::error::{TpmError, TpmResult};
use crate::marshal::WireType;
use crate::types::constants::*;
use crate::types::structures::{
    TpmsCreationData, TpmsEccPoint, TpmsNvPublic, TpmsSensitiveCreate, TpmtPublic, TpmtSensitive,
};

macro_rules! tpm2b {
    ($(#[$meta:meta])* $name:ident, $cap:expr) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pub size: u16,
            pub buffer: [u8; $cap],
        }

        impl $name {
            pub const CAPACITY: usize = $cap;

            /// Builds the buffer from `bytes`; fails when `bytes` exceeds
            /// the backing capacity.
            pub fn from_bytes(bytes: &[u8]) -> TpmResult<Self> {
                if bytes.len() > $cap {
                    return Err(TpmError::Insufficient);
                }
                let mut buffer = [0u8; $cap];
                buffer[..bytes.len()].copy_from_slice(bytes);
                Ok(Self {
                    size: bytes.len() as u16,
                    buffer,
                })
            }

            /// The first `size` bytes of the backing buffer.
            pub fn value(&self) -> &[u8] {
                &self.buffer[..($cap).min(self.size as usize)]
            }

            pub fn is_empty(&self) -> bool {
                self.size == 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    size: 0,
                    buffer: [0u8; $cap],
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value() == other.value()
            }
        }

        impl Eq for $name {}

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("size", &self.size)
                    .field("buffer", &hex::encode(self.value()))
                    .finish()
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = TpmError;

            fn try_from(bytes: &[u8]) -> TpmResult<Self> {
                Self::from_bytes(bytes)
            }
        }

        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                if self.size as usize > $cap {
                    return Err(TpmError::Insufficient);
                }
                self.size.serialize(out)?;
                out.extend_from_slice(&self.buffer[..self.size as usize]);
                Ok(())
            }

            fn parse(buffer: &mut &[u8], value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
                let mut cursor = *buffer;
                let size = u16::parse(&mut cursor, None)?;
                if size as usize > $cap || cursor.len() < size as usize {
                    return Err(TpmError::Insufficient);
                }
                let (payload, rest) = cursor.split_at(size as usize);
                let mut backing = [0u8; $cap];
                backing[..payload.len()].copy_from_slice(payload);
                if let Some(raw) = value_bytes {
                    raw.extend_from_slice(&size.to_be_bytes());
                    raw.extend_from_slice(payload);
                }
                *buffer = rest;
                Ok(Self {
                    size,
                    buffer: backing,
                })
            }
        }
    };
}

tpm2b! {
    /// Digest-sized buffer; also carries key material and auth values.
    Tpm2bDigest, MAX_DIGEST_SIZE
}
tpm2b! {
    /// Free-form qualifying data.
    Tpm2bData, MAX_DIGEST_SIZE
}
tpm2b! {
    /// Event data for PCR extension.
    Tpm2bEvent, 1024
}
tpm2b! {
    /// Bulk data buffer for hash and sequence commands.
    Tpm2bMaxBuffer, MAX_DIGEST_BUFFER
}
tpm2b! {
    /// Bulk data buffer for NV reads and writes.
    Tpm2bMaxNvBuffer, MAX_NV_BUFFER_SIZE
}
tpm2b! {
    /// Policy timeout value.
    Tpm2bTimeout, 8
}
tpm2b! {
    /// Initialization vector for symmetric modes.
    Tpm2bIv, MAX_SYM_BLOCK_SIZE
}
tpm2b! {
    /// Object name: algorithm identifier plus digest, or a raw handle.
    Tpm2bName, MAX_NAME_SIZE
}
tpm2b! {
    /// Externally supplied sensitive data.
    Tpm2bSensitiveData, MAX_SYM_DATA
}
tpm2b! {
    /// Symmetric key material.
    Tpm2bSymKey, MAX_SYM_KEY_BYTES
}
tpm2b! {
    /// RSA public modulus or ciphertext.
    Tpm2bPublicKeyRsa, MAX_RSA_KEY_BYTES
}
tpm2b! {
    /// One RSA private prime.
    Tpm2bPrivateKeyRsa, MAX_RSA_KEY_BYTES / 2
}
tpm2b! {
    /// One ECC coordinate or private scalar.
    Tpm2bEccParameter, MAX_ECC_KEY_BYTES
}
tpm2b! {
    /// Secret protected by asymmetric encryption.
    Tpm2bEncryptedSecret, MAX_RSA_KEY_BYTES
}
tpm2b! {
    /// Opaque wrapped private area produced by object creation.
    Tpm2bPrivate, MAX_PRIVATE_SIZE
}
tpm2b! {
    /// Credential blob for MakeCredential/ActivateCredential.
    Tpm2bIdObject, MAX_ID_OBJECT_SIZE
}
tpm2b! {
    /// Saved-context blob.
    Tpm2bContextData, MAX_CONTEXT_SIZE
}
tpm2b! {
    /// Marshalled attestation body signed by the TPM.
    Tpm2bAttest, MAX_ATTEST_SIZE
}

pub type Tpm2bNonce = Tpm2bDigest;
pub type Tpm2bAuth = Tpm2bDigest;
pub type Tpm2bOperand = Tpm2bDigest;

// ============================================================================
// Structure-carrying TPM2B wrappers
// ============================================================================

/// Wraps an inner structure in a u16 size prefix. The size written is always
/// computed from the serialized inner form; on parse the inner structure is
/// read from exactly the prefixed span.
macro_rules! tpm2b_struct {
    ($(#[$meta:meta])* $name:ident, $field:ident : $inner:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub $field: $inner,
        }

        impl $name {
            pub fn new($field: $inner) -> Self {
                Self { $field }
            }
        }

        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                let mut body = Vec::new();
                self.$field.serialize(&mut body)?;
                (body.len() as u16).serialize(out)?;
                out.extend_from_slice(&body);
                Ok(())
            }

            fn parse(buffer: &mut &[u8], value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
                let mut cursor = *buffer;
                let size = u16::parse(&mut cursor, None)?;
                if cursor.len() < size as usize {
                    return Err(TpmError::Insufficient);
                }
                let (mut body, rest) = cursor.split_at(size as usize);
                let inner = <$inner>::parse(&mut body, None)?;
                if let Some(raw) = value_bytes {
                    raw.extend_from_slice(&size.to_be_bytes());
                    raw.extend_from_slice(&cursor[..size as usize]);
                }
                *buffer = rest;
                Ok(Self { $field: inner })
            }
        }
    };
}

tpm2b_struct! {
    /// Public area of an object.
    Tpm2bPublic, public_area: TpmtPublic
}
tpm2b_struct! {
    /// Creation input: user auth plus optional seeded data.
    Tpm2bSensitiveCreate, sensitive: TpmsSensitiveCreate
}
tpm2b_struct! {
    /// Unprotected sensitive area for external loads.
    Tpm2bSensitive, sensitive_area: TpmtSensitive
}
tpm2b_struct! {
    /// Environment snapshot recorded at object creation.
    Tpm2bCreationData, creation_data: TpmsCreationData
}
tpm2b_struct! {
    /// Public area of an NV index.
    Tpm2bNvPublic, nv_public: TpmsNvPublic
}
tpm2b_struct! {
    /// ECC point with its own size prefix.
    Tpm2bEccPoint, point: TpmsEccPoint
}
