//! Tagged unions (TPMU types).
//!
//! A union never carries its own tag on the wire: the enclosing structure's
//! selector field chooses the variant, and the codecs here take that selector
//! as an explicit argument. A NULL selector moves no bytes, and an
//! unrecognized selector also moves no bytes and succeeds, matching the
//! TPM 2.0 rule that undefined selectors carry no payload. Serializing a
//! value whose variant disagrees with the selector is `Insufficient`.

use crate::error::{TpmError, TpmResult};
use crate::marshal::WireType;
use crate::types::base::*;
use crate::types::buffers::*;
use crate::types::constants::*;
use crate::types::lists::{
    TpmlAlgProperty, TpmlCc, TpmlCca, TpmlHandle, TpmlPcrSelection, TpmlTaggedTpmProperty,
};
use crate::types::structures::{
    TpmsCertifyInfo, TpmsCommandAuditInfo, TpmsCreationInfo, TpmsEccParms, TpmsEccPoint,
    TpmsKeyedhashParms, TpmsNvCertifyInfo, TpmsQuoteInfo, TpmsRsaParms, TpmsSchemeEcdaa,
    TpmsSchemeHash, TpmsSchemeXor, TpmsSessionAuditInfo, TpmsSignatureEcc, TpmsSignatureRsa,
    TpmsSymcipherParms, TpmsTimeAttestInfo, TpmtHa,
};

// ============================================================================
// Hash output
// ============================================================================

/// Digest storage selected by a hash algorithm identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TpmuHa {
    Sha1([u8; SHA1_DIGEST_SIZE]),
    Sha256([u8; SHA256_DIGEST_SIZE]),
    Sm3_256([u8; SM3_256_DIGEST_SIZE]),
    Sha384([u8; SHA384_DIGEST_SIZE]),
    Sha512([u8; SHA512_DIGEST_SIZE]),
    #[default]
    Null,
}

impl TpmuHa {
    /// Digest width for a selector; `None` when the selector carries no
    /// payload.
    pub fn digest_size(hash_alg: TpmiAlgHash) -> Option<usize> {
        match hash_alg {
            TPM2_ALG_SHA1 => Some(SHA1_DIGEST_SIZE),
            TPM2_ALG_SHA256 => Some(SHA256_DIGEST_SIZE),
            TPM2_ALG_SM3_256 => Some(SM3_256_DIGEST_SIZE),
            TPM2_ALG_SHA384 => Some(SHA384_DIGEST_SIZE),
            TPM2_ALG_SHA512 => Some(SHA512_DIGEST_SIZE),
            _ => None,
        }
    }

    /// The digest bytes held by the active variant.
    pub fn bytes(&self) -> &[u8] {
        match self {
            TpmuHa::Sha1(digest) => digest,
            TpmuHa::Sha256(digest) => digest,
            TpmuHa::Sm3_256(digest) => digest,
            TpmuHa::Sha384(digest) => digest,
            TpmuHa::Sha512(digest) => digest,
            TpmuHa::Null => &[],
        }
    }

    pub fn serialize(&self, selector: TpmiAlgHash, out: &mut Vec<u8>) -> TpmResult<()> {
        match Self::digest_size(selector) {
            None => Ok(()),
            Some(width) => {
                let bytes = self.bytes();
                if bytes.len() != width {
                    return Err(TpmError::Insufficient);
                }
                out.extend_from_slice(bytes);
                Ok(())
            }
        }
    }

    pub fn parse(
        selector: TpmiAlgHash,
        buffer: &mut &[u8],
        value_bytes: Option<&mut Vec<u8>>,
    ) -> TpmResult<Self> {
        let width = match Self::digest_size(selector) {
            None => return Ok(TpmuHa::Null),
            Some(width) => width,
        };
        if buffer.len() < width {
            return Err(TpmError::Insufficient);
        }
        let (payload, rest) = buffer.split_at(width);
        if let Some(raw) = value_bytes {
            raw.extend_from_slice(payload);
        }
        *buffer = rest;

        fn array<const N: usize>(payload: &[u8]) -> [u8; N] {
            let mut digest = [0u8; N];
            digest.copy_from_slice(payload);
            digest
        }

        Ok(match selector {
            TPM2_ALG_SHA1 => TpmuHa::Sha1(array(payload)),
            TPM2_ALG_SHA256 => TpmuHa::Sha256(array(payload)),
            TPM2_ALG_SM3_256 => TpmuHa::Sm3_256(array(payload)),
            TPM2_ALG_SHA384 => TpmuHa::Sha384(array(payload)),
            _ => TpmuHa::Sha512(array(payload)),
        })
    }
}

/// Expands to the codec pair for a union whose variants are each a typed
/// payload chosen by selector constants.
macro_rules! union_codec {
    ($union:ident, $selector_ty:ty, {
        $($sel:path => $variant:ident($payload:ty)),* $(,)?
    }) => {
        impl $union {
            pub fn serialize(
                &self,
                selector: $selector_ty,
                out: &mut Vec<u8>,
            ) -> TpmResult<()> {
                match selector {
                    $(
                        $sel => match self {
                            $union::$variant(details) => details.serialize(out),
                            _ => Err(TpmError::Insufficient),
                        },
                    )*
                    // NULL and unrecognized selectors carry no payload.
                    _ => Ok(()),
                }
            }

            pub fn parse(
                selector: $selector_ty,
                buffer: &mut &[u8],
                value_bytes: Option<&mut Vec<u8>>,
            ) -> TpmResult<Self> {
                match selector {
                    $(
                        $sel => Ok($union::$variant(<$payload>::parse(
                            buffer,
                            value_bytes,
                        )?)),
                    )*
                    _ => Ok(Self::default()),
                }
            }
        }
    };
}

// ============================================================================
// Symmetric key size and mode
// ============================================================================

/// Key size selected by the symmetric algorithm. XOR obfuscation carries a
/// hash algorithm instead of a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TpmuSymKeyBits {
    Aes(TpmiAesKeyBits),
    Sm4(TpmKeyBits),
    Camellia(TpmKeyBits),
    Xor(TpmiAlgHash),
    #[default]
    Null,
}

union_codec!(TpmuSymKeyBits, TpmiAlgSym, {
    TPM2_ALG_AES => Aes(TpmiAesKeyBits),
    TPM2_ALG_SM4 => Sm4(TpmKeyBits),
    TPM2_ALG_CAMELLIA => Camellia(TpmKeyBits),
    TPM2_ALG_XOR => Xor(TpmiAlgHash),
});

/// Block-cipher mode selected by the symmetric algorithm. XOR and NULL have
/// no mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TpmuSymMode {
    Aes(TpmiAlgSymMode),
    Sm4(TpmiAlgSymMode),
    Camellia(TpmiAlgSymMode),
    #[default]
    Null,
}

union_codec!(TpmuSymMode, TpmiAlgSym, {
    TPM2_ALG_AES => Aes(TpmiAlgSymMode),
    TPM2_ALG_SM4 => Sm4(TpmiAlgSymMode),
    TPM2_ALG_CAMELLIA => Camellia(TpmiAlgSymMode),
});

/// Structural placeholder: serializes and parses zero bytes for every
/// selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TpmuSymDetails;

impl TpmuSymDetails {
    pub fn serialize(&self, _selector: TpmiAlgSym, _out: &mut Vec<u8>) -> TpmResult<()> {
        Ok(())
    }

    pub fn parse(
        _selector: TpmiAlgSym,
        _buffer: &mut &[u8],
        _value_bytes: Option<&mut Vec<u8>>,
    ) -> TpmResult<Self> {
        Ok(TpmuSymDetails)
    }
}

// ============================================================================
// Schemes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuSchemeKeyedhash {
    Hmac(TpmsSchemeHash),
    Xor(TpmsSchemeXor),
    #[default]
    Null,
}

union_codec!(TpmuSchemeKeyedhash, TpmiAlgKeyedhashScheme, {
    TPM2_ALG_HMAC => Hmac(TpmsSchemeHash),
    TPM2_ALG_XOR => Xor(TpmsSchemeXor),
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuSigScheme {
    Rsassa(TpmsSchemeHash),
    Rsapss(TpmsSchemeHash),
    Ecdsa(TpmsSchemeHash),
    Ecdaa(TpmsSchemeEcdaa),
    Sm2(TpmsSchemeHash),
    Ecschnorr(TpmsSchemeHash),
    Hmac(TpmsSchemeHash),
    #[default]
    Null,
}

union_codec!(TpmuSigScheme, TpmiAlgSigScheme, {
    TPM2_ALG_RSASSA => Rsassa(TpmsSchemeHash),
    TPM2_ALG_RSAPSS => Rsapss(TpmsSchemeHash),
    TPM2_ALG_ECDSA => Ecdsa(TpmsSchemeHash),
    TPM2_ALG_ECDAA => Ecdaa(TpmsSchemeEcdaa),
    TPM2_ALG_SM2 => Sm2(TpmsSchemeHash),
    TPM2_ALG_ECSCHNORR => Ecschnorr(TpmsSchemeHash),
    TPM2_ALG_HMAC => Hmac(TpmsSchemeHash),
});

/// Asymmetric scheme details. RSAES is a defined selector with an empty
/// payload, so it gets a payload-free variant outside the macro table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuAsymScheme {
    Rsassa(TpmsSchemeHash),
    Rsaes,
    Rsapss(TpmsSchemeHash),
    Oaep(TpmsSchemeHash),
    Ecdsa(TpmsSchemeHash),
    Ecdh(TpmsSchemeHash),
    Ecdaa(TpmsSchemeEcdaa),
    Sm2(TpmsSchemeHash),
    Ecschnorr(TpmsSchemeHash),
    #[default]
    Null,
}

impl TpmuAsymScheme {
    pub fn serialize(&self, selector: TpmAlgId, out: &mut Vec<u8>) -> TpmResult<()> {
        match selector {
            TPM2_ALG_RSAES => match self {
                TpmuAsymScheme::Rsaes => Ok(()),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_RSASSA => match self {
                TpmuAsymScheme::Rsassa(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_RSAPSS => match self {
                TpmuAsymScheme::Rsapss(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_OAEP => match self {
                TpmuAsymScheme::Oaep(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_ECDSA => match self {
                TpmuAsymScheme::Ecdsa(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_ECDH => match self {
                TpmuAsymScheme::Ecdh(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_ECDAA => match self {
                TpmuAsymScheme::Ecdaa(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_SM2 => match self {
                TpmuAsymScheme::Sm2(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_ALG_ECSCHNORR => match self {
                TpmuAsymScheme::Ecschnorr(details) => details.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            _ => Ok(()),
        }
    }

    pub fn parse(
        selector: TpmAlgId,
        buffer: &mut &[u8],
        value_bytes: Option<&mut Vec<u8>>,
    ) -> TpmResult<Self> {
        Ok(match selector {
            TPM2_ALG_RSAES => TpmuAsymScheme::Rsaes,
            TPM2_ALG_RSASSA => TpmuAsymScheme::Rsassa(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_RSAPSS => TpmuAsymScheme::Rsapss(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_OAEP => TpmuAsymScheme::Oaep(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_ECDSA => TpmuAsymScheme::Ecdsa(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_ECDH => TpmuAsymScheme::Ecdh(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_ECDAA => TpmuAsymScheme::Ecdaa(TpmsSchemeEcdaa::parse(buffer, value_bytes)?),
            TPM2_ALG_SM2 => TpmuAsymScheme::Sm2(TpmsSchemeHash::parse(buffer, value_bytes)?),
            TPM2_ALG_ECSCHNORR => {
                TpmuAsymScheme::Ecschnorr(TpmsSchemeHash::parse(buffer, value_bytes)?)
            }
            _ => TpmuAsymScheme::Null,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuKdfScheme {
    Mgf1(TpmsSchemeHash),
    Kdf1Sp800_56a(TpmsSchemeHash),
    Kdf2(TpmsSchemeHash),
    Kdf1Sp800_108(TpmsSchemeHash),
    #[default]
    Null,
}

union_codec!(TpmuKdfScheme, TpmiAlgKdf, {
    TPM2_ALG_MGF1 => Mgf1(TpmsSchemeHash),
    TPM2_ALG_KDF1_SP800_56A => Kdf1Sp800_56a(TpmsSchemeHash),
    TPM2_ALG_KDF2 => Kdf2(TpmsSchemeHash),
    TPM2_ALG_KDF1_SP800_108 => Kdf1Sp800_108(TpmsSchemeHash),
});

// ============================================================================
// Signatures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuSignature {
    Rsassa(TpmsSignatureRsa),
    Rsapss(TpmsSignatureRsa),
    Ecdsa(TpmsSignatureEcc),
    Ecdaa(TpmsSignatureEcc),
    Sm2(TpmsSignatureEcc),
    Ecschnorr(TpmsSignatureEcc),
    Hmac(TpmtHa),
    #[default]
    Null,
}

union_codec!(TpmuSignature, TpmiAlgSigScheme, {
    TPM2_ALG_RSASSA => Rsassa(TpmsSignatureRsa),
    TPM2_ALG_RSAPSS => Rsapss(TpmsSignatureRsa),
    TPM2_ALG_ECDSA => Ecdsa(TpmsSignatureEcc),
    TPM2_ALG_ECDAA => Ecdaa(TpmsSignatureEcc),
    TPM2_ALG_SM2 => Sm2(TpmsSignatureEcc),
    TPM2_ALG_ECSCHNORR => Ecschnorr(TpmsSignatureEcc),
    TPM2_ALG_HMAC => Hmac(TpmtHa),
});

// ============================================================================
// Public and sensitive areas
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuPublicParms {
    Keyedhash(TpmsKeyedhashParms),
    Symcipher(TpmsSymcipherParms),
    Rsa(TpmsRsaParms),
    Ecc(TpmsEccParms),
    #[default]
    Null,
}

union_codec!(TpmuPublicParms, TpmiAlgPublic, {
    TPM2_ALG_KEYEDHASH => Keyedhash(TpmsKeyedhashParms),
    TPM2_ALG_SYMCIPHER => Symcipher(TpmsSymcipherParms),
    TPM2_ALG_RSA => Rsa(TpmsRsaParms),
    TPM2_ALG_ECC => Ecc(TpmsEccParms),
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuPublicId {
    Keyedhash(Tpm2bDigest),
    Symcipher(Tpm2bDigest),
    Rsa(Tpm2bPublicKeyRsa),
    Ecc(TpmsEccPoint),
    #[default]
    Null,
}

union_codec!(TpmuPublicId, TpmiAlgPublic, {
    TPM2_ALG_KEYEDHASH => Keyedhash(Tpm2bDigest),
    TPM2_ALG_SYMCIPHER => Symcipher(Tpm2bDigest),
    TPM2_ALG_RSA => Rsa(Tpm2bPublicKeyRsa),
    TPM2_ALG_ECC => Ecc(TpmsEccPoint),
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuSensitiveComposite {
    Rsa(Tpm2bPrivateKeyRsa),
    Ecc(Tpm2bEccParameter),
    Bits(Tpm2bSensitiveData),
    Sym(Tpm2bSymKey),
    #[default]
    Null,
}

union_codec!(TpmuSensitiveComposite, TpmiAlgPublic, {
    TPM2_ALG_RSA => Rsa(Tpm2bPrivateKeyRsa),
    TPM2_ALG_ECC => Ecc(Tpm2bEccParameter),
    TPM2_ALG_KEYEDHASH => Bits(Tpm2bSensitiveData),
    TPM2_ALG_SYMCIPHER => Sym(Tpm2bSymKey),
});

// ============================================================================
// Attestation bodies
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuAttest {
    Certify(TpmsCertifyInfo),
    Quote(TpmsQuoteInfo),
    SessionAudit(TpmsSessionAuditInfo),
    CommandAudit(TpmsCommandAuditInfo),
    Time(TpmsTimeAttestInfo),
    Creation(TpmsCreationInfo),
    Nv(TpmsNvCertifyInfo),
    #[default]
    Empty,
}

union_codec!(TpmuAttest, TpmiStAttest, {
    TPM2_ST_ATTEST_CERTIFY => Certify(TpmsCertifyInfo),
    TPM2_ST_ATTEST_QUOTE => Quote(TpmsQuoteInfo),
    TPM2_ST_ATTEST_SESSION_AUDIT => SessionAudit(TpmsSessionAuditInfo),
    TPM2_ST_ATTEST_COMMAND_AUDIT => CommandAudit(TpmsCommandAuditInfo),
    TPM2_ST_ATTEST_TIME => Time(TpmsTimeAttestInfo),
    TPM2_ST_ATTEST_CREATION => Creation(TpmsCreationInfo),
    TPM2_ST_ATTEST_NV => Nv(TpmsNvCertifyInfo),
});

// ============================================================================
// Capability payloads
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TpmuCapabilities {
    Algorithms(TpmlAlgProperty),
    Handles(TpmlHandle),
    Command(TpmlCca),
    PpCommands(TpmlCc),
    AuditCommands(TpmlCc),
    AssignedPcr(TpmlPcrSelection),
    TpmProperties(TpmlTaggedTpmProperty),
    #[default]
    Empty,
}

impl TpmuCapabilities {
    pub fn serialize(&self, selector: TpmCap, out: &mut Vec<u8>) -> TpmResult<()> {
        match selector {
            TPM2_CAP_ALGS => match self {
                TpmuCapabilities::Algorithms(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_HANDLES => match self {
                TpmuCapabilities::Handles(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_COMMANDS => match self {
                TpmuCapabilities::Command(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_PP_COMMANDS => match self {
                TpmuCapabilities::PpCommands(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_AUDIT_COMMANDS => match self {
                TpmuCapabilities::AuditCommands(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_PCRS => match self {
                TpmuCapabilities::AssignedPcr(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            TPM2_CAP_TPM_PROPERTIES => match self {
                TpmuCapabilities::TpmProperties(list) => list.serialize(out),
                _ => Err(TpmError::Insufficient),
            },
            _ => Ok(()),
        }
    }

    pub fn parse(
        selector: TpmCap,
        buffer: &mut &[u8],
        value_bytes: Option<&mut Vec<u8>>,
    ) -> TpmResult<Self> {
        Ok(match selector {
            TPM2_CAP_ALGS => {
                TpmuCapabilities::Algorithms(TpmlAlgProperty::parse(buffer, value_bytes)?)
            }
            TPM2_CAP_HANDLES => TpmuCapabilities::Handles(TpmlHandle::parse(buffer, value_bytes)?),
            TPM2_CAP_COMMANDS => TpmuCapabilities::Command(TpmlCca::parse(buffer, value_bytes)?),
            TPM2_CAP_PP_COMMANDS => {
                TpmuCapabilities::PpCommands(TpmlCc::parse(buffer, value_bytes)?)
            }
            TPM2_CAP_AUDIT_COMMANDS => {
                TpmuCapabilities::AuditCommands(TpmlCc::parse(buffer, value_bytes)?)
            }
            TPM2_CAP_PCRS => {
                TpmuCapabilities::AssignedPcr(TpmlPcrSelection::parse(buffer, value_bytes)?)
            }
            TPM2_CAP_TPM_PROPERTIES => {
                TpmuCapabilities::TpmProperties(TpmlTaggedTpmProperty::parse(buffer, value_bytes)?)
            }
            _ => TpmuCapabilities::Empty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_hash_union_selector_dispatch() {
        let digest = TpmuHa::Sha256([0u8; 32]);
        let mut out = Vec::new();
        digest
            .serialize(TPM2_ALG_SHA256, &mut out)
            .expect("serialize");
        assert_eq!(out.len(), 32);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_null_selector_moves_no_bytes() {
        let mut out = Vec::new();
        TpmuHa::Null
            .serialize(TPM2_ALG_NULL, &mut out)
            .expect("serialize");
        assert!(out.is_empty());

        let mut buffer: &[u8] = &hex!("AABB");
        let parsed = TpmuHa::parse(TPM2_ALG_NULL, &mut buffer, None).expect("parse");
        assert_eq!(parsed, TpmuHa::Null);
        assert_eq!(buffer.len(), 2, "NULL selector must not consume input");
    }

    #[test]
    fn test_unknown_selector_moves_no_bytes() {
        // 0x00FF is not a defined hash algorithm.
        let mut out = Vec::new();
        TpmuHa::Sha256([7u8; 32])
            .serialize(TpmAlgId(0x00FF), &mut out)
            .expect("serialize");
        assert!(out.is_empty());

        let mut buffer: &[u8] = &hex!("AABB");
        let parsed = TpmuHa::parse(TpmAlgId(0x00FF), &mut buffer, None).expect("parse");
        assert_eq!(parsed, TpmuHa::Null);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_selector_variant_mismatch_rejected() {
        let mut out = Vec::new();
        assert_eq!(
            TpmuHa::Sha256([0u8; 32]).serialize(TPM2_ALG_SHA512, &mut out),
            Err(TpmError::Insufficient)
        );
        assert_eq!(
            TpmuSignature::Null.serialize(TPM2_ALG_RSASSA, &mut out),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_truncated_digest_is_insufficient() {
        let mut buffer: &[u8] = &[0u8; 16];
        assert_eq!(
            TpmuHa::parse(TPM2_ALG_SHA256, &mut buffer, None),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_rsaes_selector_has_empty_payload() {
        let mut out = Vec::new();
        TpmuAsymScheme::Rsaes
            .serialize(TPM2_ALG_RSAES, &mut out)
            .expect("serialize");
        assert!(out.is_empty());

        let mut buffer: &[u8] = &hex!("000B");
        let parsed = TpmuAsymScheme::parse(TPM2_ALG_RSAES, &mut buffer, None).expect("parse");
        assert_eq!(parsed, TpmuAsymScheme::Rsaes);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_sig_scheme_round_trip() {
        let scheme = TpmuSigScheme::Ecdaa(TpmsSchemeEcdaa {
            hash_alg: TPM2_ALG_SHA256,
            count: 5,
        });
        let mut out = Vec::new();
        scheme.serialize(TPM2_ALG_ECDAA, &mut out).expect("serialize");
        assert_eq!(out, hex!("000B 0005"));
        let mut buffer: &[u8] = &out;
        let parsed = TpmuSigScheme::parse(TPM2_ALG_ECDAA, &mut buffer, None).expect("parse");
        assert_eq!(parsed, scheme);
    }

    #[test]
    fn test_capability_union_round_trip() {
        let list = TpmlHandle::from_slice(&[TpmHandle(0x8100_0001), TpmHandle(0x8100_0002)])
            .expect("list");
        let data = TpmuCapabilities::Handles(list);
        let mut out = Vec::new();
        data.serialize(TPM2_CAP_HANDLES, &mut out).expect("serialize");
        assert_eq!(out, hex!("00000002 81000001 81000002"));
        let mut buffer: &[u8] = &out;
        let parsed = TpmuCapabilities::parse(TPM2_CAP_HANDLES, &mut buffer, None).expect("parse");
        assert_eq!(parsed, data);
    }
}
