//! Fixed structures (TPMS/TPMT types).
//!
//! Wire form is the concatenation of the fields in declaration order, no
//! padding and no tags. A structure that embeds a tagged union serializes
//! its selector field first and feeds that same selector to the union codec;
//! parsing mirrors this, so the union's active variant is always chosen by
//! the sibling field and never inferred from the value.

use crate::error::{TpmError, TpmResult};
use crate::marshal::WireType;
use crate::types::base::*;
use crate::types::buffers::*;
use crate::types::constants::*;
use crate::types::lists::TpmlPcrSelection;
use crate::types::unions::*;

macro_rules! wire_struct {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $ty),*
        }

        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                $(self.$field.serialize(out)?;)*
                Ok(())
            }

            fn parse(
                buffer: &mut &[u8],
                mut value_bytes: Option<&mut Vec<u8>>,
            ) -> TpmResult<Self> {
                Ok(Self {
                    $($field: <$ty>::parse(buffer, value_bytes.as_deref_mut())?,)*
                })
            }
        }
    };
}

wire_struct! {
    /// TPM clock state.
    TpmsClockInfo {
        clock: u64,
        reset_count: u32,
        restart_count: u32,
        safe: TpmiYesNo,
    }
}

wire_struct! {
    TpmsTimeInfo {
        time: u64,
        clock_info: TpmsClockInfo,
    }
}

// ============================================================================
// PCR selection
// ============================================================================

/// Selection of PCRs within one hash bank. The bitmap length travels on the
/// wire as a u8 and is bounded by `PCR_SELECT_MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TpmsPcrSelection {
    pub hash: TpmiAlgHash,
    pub sizeof_select: u8,
    pub pcr_select: [u8; PCR_SELECT_MAX],
}

impl TpmsPcrSelection {
    /// Builds a selection covering `pcrs` in the given bank.
    pub fn with_pcrs(hash: TpmiAlgHash, pcrs: &[u32]) -> Self {
        let mut pcr_select = [0u8; PCR_SELECT_MAX];
        for &pcr in pcrs {
            let index = (pcr / 8) as usize;
            if index < PCR_SELECT_MAX {
                pcr_select[index] |= 1 << (pcr % 8);
            }
        }
        Self {
            hash,
            sizeof_select: PCR_SELECT_MAX as u8,
            pcr_select,
        }
    }

    pub fn is_selected(&self, pcr: u32) -> bool {
        let index = (pcr / 8) as usize;
        index < self.sizeof_select as usize && self.pcr_select[index] & (1 << (pcr % 8)) != 0
    }
}

impl WireType for TpmsPcrSelection {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        if self.sizeof_select as usize > PCR_SELECT_MAX {
            return Err(TpmError::Insufficient);
        }
        self.hash.serialize(out)?;
        self.sizeof_select.serialize(out)?;
        out.extend_from_slice(&self.pcr_select[..self.sizeof_select as usize]);
        Ok(())
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let hash = TpmiAlgHash::parse(buffer, value_bytes.as_deref_mut())?;
        let sizeof_select = u8::parse(buffer, value_bytes.as_deref_mut())?;
        if sizeof_select as usize > PCR_SELECT_MAX || buffer.len() < sizeof_select as usize {
            return Err(TpmError::Insufficient);
        }
        let (bitmap, rest) = buffer.split_at(sizeof_select as usize);
        let mut pcr_select = [0u8; PCR_SELECT_MAX];
        pcr_select[..bitmap.len()].copy_from_slice(bitmap);
        if let Some(raw) = value_bytes {
            raw.extend_from_slice(bitmap);
        }
        *buffer = rest;
        Ok(Self {
            hash,
            sizeof_select,
            pcr_select,
        })
    }
}

// ============================================================================
// Hash agile digest
// ============================================================================

/// Digest tagged with its algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtHa {
    pub hash_alg: TpmiAlgHash,
    pub digest: TpmuHa,
}

impl WireType for TpmtHa {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.hash_alg.serialize(out)?;
        self.digest.serialize(self.hash_alg, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let hash_alg = TpmiAlgHash::parse(buffer, value_bytes.as_deref_mut())?;
        let digest = TpmuHa::parse(hash_alg, buffer, value_bytes)?;
        Ok(Self { hash_alg, digest })
    }
}

// ============================================================================
// Scheme structures
// ============================================================================

wire_struct! {
    /// Scheme parameterized by a hash algorithm alone.
    TpmsSchemeHash {
        hash_alg: TpmiAlgHash,
    }
}

wire_struct! {
    TpmsSchemeEcdaa {
        hash_alg: TpmiAlgHash,
        count: u16,
    }
}

wire_struct! {
    TpmsSchemeXor {
        hash_alg: TpmiAlgHash,
        kdf: TpmiAlgKdf,
    }
}

pub type TpmsSchemeHmac = TpmsSchemeHash;

/// Keyed-hash scheme selector plus details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtKeyedhashScheme {
    pub scheme: TpmiAlgKeyedhashScheme,
    pub details: TpmuSchemeKeyedhash,
}

impl TpmtKeyedhashScheme {
    pub fn null() -> Self {
        Self {
            scheme: TPM2_ALG_NULL,
            details: TpmuSchemeKeyedhash::Null,
        }
    }
}

impl WireType for TpmtKeyedhashScheme {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.scheme.serialize(out)?;
        self.details.serialize(self.scheme, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let scheme = TpmiAlgKeyedhashScheme::parse(buffer, value_bytes.as_deref_mut())?;
        let details = TpmuSchemeKeyedhash::parse(scheme, buffer, value_bytes)?;
        Ok(Self { scheme, details })
    }
}

/// Signing scheme selector plus details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtSigScheme {
    pub scheme: TpmiAlgSigScheme,
    pub details: TpmuSigScheme,
}

impl TpmtSigScheme {
    pub fn null() -> Self {
        Self {
            scheme: TPM2_ALG_NULL,
            details: TpmuSigScheme::Null,
        }
    }
}

impl WireType for TpmtSigScheme {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.scheme.serialize(out)?;
        self.details.serialize(self.scheme, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let scheme = TpmiAlgSigScheme::parse(buffer, value_bytes.as_deref_mut())?;
        let details = TpmuSigScheme::parse(scheme, buffer, value_bytes)?;
        Ok(Self { scheme, details })
    }
}

/// RSA scheme selector plus details; also the wire form of the decrypt-only
/// scheme restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtRsaScheme {
    pub scheme: TpmiAlgRsaScheme,
    pub details: TpmuAsymScheme,
}

impl TpmtRsaScheme {
    pub fn null() -> Self {
        Self {
            scheme: TPM2_ALG_NULL,
            details: TpmuAsymScheme::Null,
        }
    }
}

impl WireType for TpmtRsaScheme {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.scheme.serialize(out)?;
        self.details.serialize(self.scheme, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let scheme = TpmiAlgRsaScheme::parse(buffer, value_bytes.as_deref_mut())?;
        let details = TpmuAsymScheme::parse(scheme, buffer, value_bytes)?;
        Ok(Self { scheme, details })
    }
}

pub type TpmtRsaDecrypt = TpmtRsaScheme;

/// ECC scheme selector plus details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtEccScheme {
    pub scheme: TpmiAlgEccScheme,
    pub details: TpmuAsymScheme,
}

impl WireType for TpmtEccScheme {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.scheme.serialize(out)?;
        self.details.serialize(self.scheme, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let scheme = TpmiAlgEccScheme::parse(buffer, value_bytes.as_deref_mut())?;
        let details = TpmuAsymScheme::parse(scheme, buffer, value_bytes)?;
        Ok(Self { scheme, details })
    }
}

/// KDF scheme selector plus details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtKdfScheme {
    pub scheme: TpmiAlgKdf,
    pub details: TpmuKdfScheme,
}

impl TpmtKdfScheme {
    pub fn null() -> Self {
        Self {
            scheme: TPM2_ALG_NULL,
            details: TpmuKdfScheme::Null,
        }
    }
}

impl WireType for TpmtKdfScheme {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.scheme.serialize(out)?;
        self.details.serialize(self.scheme, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let scheme = TpmiAlgKdf::parse(buffer, value_bytes.as_deref_mut())?;
        let details = TpmuKdfScheme::parse(scheme, buffer, value_bytes)?;
        Ok(Self { scheme, details })
    }
}

// ============================================================================
// Symmetric definitions
// ============================================================================

/// Symmetric algorithm definition. `key_bits`, `mode` and the placeholder
/// `details` are all selected by `algorithm`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtSymDef {
    pub algorithm: TpmiAlgSym,
    pub key_bits: TpmuSymKeyBits,
    pub mode: TpmuSymMode,
    pub details: TpmuSymDetails,
}

impl TpmtSymDef {
    pub fn null() -> Self {
        Self {
            algorithm: TPM2_ALG_NULL,
            ..Default::default()
        }
    }

    /// AES in CFB mode, the definition session encryption uses.
    pub fn aes_cfb(key_bits: u16) -> Self {
        Self {
            algorithm: TPM2_ALG_AES,
            key_bits: TpmuSymKeyBits::Aes(TpmKeyBits(key_bits)),
            mode: TpmuSymMode::Aes(TPM2_ALG_CFB),
            details: TpmuSymDetails,
        }
    }
}

impl WireType for TpmtSymDef {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.algorithm.serialize(out)?;
        self.key_bits.serialize(self.algorithm, out)?;
        self.mode.serialize(self.algorithm, out)?;
        self.details.serialize(self.algorithm, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let algorithm = TpmiAlgSym::parse(buffer, value_bytes.as_deref_mut())?;
        let key_bits = TpmuSymKeyBits::parse(algorithm, buffer, value_bytes.as_deref_mut())?;
        let mode = TpmuSymMode::parse(algorithm, buffer, value_bytes.as_deref_mut())?;
        let details = TpmuSymDetails::parse(algorithm, buffer, value_bytes)?;
        Ok(Self {
            algorithm,
            key_bits,
            mode,
            details,
        })
    }
}

/// Symmetric definition restricted to object use; identical wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtSymDefObject {
    pub algorithm: TpmiAlgSymObject,
    pub key_bits: TpmuSymKeyBits,
    pub mode: TpmuSymMode,
    pub details: TpmuSymDetails,
}

impl TpmtSymDefObject {
    pub fn null() -> Self {
        Self {
            algorithm: TPM2_ALG_NULL,
            ..Default::default()
        }
    }
}

impl WireType for TpmtSymDefObject {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.algorithm.serialize(out)?;
        self.key_bits.serialize(self.algorithm, out)?;
        self.mode.serialize(self.algorithm, out)?;
        self.details.serialize(self.algorithm, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let algorithm = TpmiAlgSymObject::parse(buffer, value_bytes.as_deref_mut())?;
        let key_bits = TpmuSymKeyBits::parse(algorithm, buffer, value_bytes.as_deref_mut())?;
        let mode = TpmuSymMode::parse(algorithm, buffer, value_bytes.as_deref_mut())?;
        let details = TpmuSymDetails::parse(algorithm, buffer, value_bytes)?;
        Ok(Self {
            algorithm,
            key_bits,
            mode,
            details,
        })
    }
}

wire_struct! {
    TpmsSymcipherParms {
        sym: TpmtSymDefObject,
    }
}

wire_struct! {
    TpmsKeyedhashParms {
        scheme: TpmtKeyedhashScheme,
    }
}

wire_struct! {
    TpmsRsaParms {
        symmetric: TpmtSymDefObject,
        scheme: TpmtRsaScheme,
        key_bits: TpmiRsaKeyBits,
        exponent: u32,
    }
}

wire_struct! {
    TpmsEccPoint {
        x: Tpm2bEccParameter,
        y: Tpm2bEccParameter,
    }
}

wire_struct! {
    TpmsEccParms {
        symmetric: TpmtSymDefObject,
        scheme: TpmtEccScheme,
        curve_id: TpmiEccCurve,
        kdf: TpmtKdfScheme,
    }
}

// ============================================================================
// Public and sensitive areas
// ============================================================================

/// Public area of an object. `parameters` and `unique` are both selected by
/// `object_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtPublic {
    pub object_type: TpmiAlgPublic,
    pub name_alg: TpmiAlgHash,
    pub object_attributes: TpmaObject,
    pub auth_policy: Tpm2bDigest,
    pub parameters: TpmuPublicParms,
    pub unique: TpmuPublicId,
}

impl WireType for TpmtPublic {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.object_type.serialize(out)?;
        self.name_alg.serialize(out)?;
        self.object_attributes.serialize(out)?;
        self.auth_policy.serialize(out)?;
        self.parameters.serialize(self.object_type, out)?;
        self.unique.serialize(self.object_type, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let object_type = TpmiAlgPublic::parse(buffer, value_bytes.as_deref_mut())?;
        let name_alg = TpmiAlgHash::parse(buffer, value_bytes.as_deref_mut())?;
        let object_attributes = TpmaObject::parse(buffer, value_bytes.as_deref_mut())?;
        let auth_policy = Tpm2bDigest::parse(buffer, value_bytes.as_deref_mut())?;
        let parameters = TpmuPublicParms::parse(object_type, buffer, value_bytes.as_deref_mut())?;
        let unique = TpmuPublicId::parse(object_type, buffer, value_bytes)?;
        Ok(Self {
            object_type,
            name_alg,
            object_attributes,
            auth_policy,
            parameters,
            unique,
        })
    }
}

wire_struct! {
    /// Creation input: the new object's auth value and optional seed data.
    TpmsSensitiveCreate {
        user_auth: Tpm2bAuth,
        data: Tpm2bSensitiveData,
    }
}

/// Unwrapped sensitive area. `sensitive` is selected by `sensitive_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtSensitive {
    pub sensitive_type: TpmiAlgPublic,
    pub auth_value: Tpm2bAuth,
    pub seed_value: Tpm2bDigest,
    pub sensitive: TpmuSensitiveComposite,
}

impl WireType for TpmtSensitive {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.sensitive_type.serialize(out)?;
        self.auth_value.serialize(out)?;
        self.seed_value.serialize(out)?;
        self.sensitive.serialize(self.sensitive_type, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let sensitive_type = TpmiAlgPublic::parse(buffer, value_bytes.as_deref_mut())?;
        let auth_value = Tpm2bAuth::parse(buffer, value_bytes.as_deref_mut())?;
        let seed_value = Tpm2bDigest::parse(buffer, value_bytes.as_deref_mut())?;
        let sensitive = TpmuSensitiveComposite::parse(sensitive_type, buffer, value_bytes)?;
        Ok(Self {
            sensitive_type,
            auth_value,
            seed_value,
            sensitive,
        })
    }
}

wire_struct! {
    /// Environment recorded by the TPM when an object is created.
    TpmsCreationData {
        pcr_select: TpmlPcrSelection,
        pcr_digest: Tpm2bDigest,
        locality: TpmaLocality,
        parent_name_alg: TpmAlgId,
        parent_name: Tpm2bName,
        parent_qualified_name: Tpm2bName,
        outside_info: Tpm2bData,
    }
}

// ============================================================================
// Tickets
// ============================================================================

wire_struct! {
    TpmtTkCreation {
        tag: TpmSt,
        hierarchy: TpmiRhHierarchy,
        digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmtTkVerified {
        tag: TpmSt,
        hierarchy: TpmiRhHierarchy,
        digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmtTkAuth {
        tag: TpmSt,
        hierarchy: TpmiRhHierarchy,
        digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmtTkHashcheck {
        tag: TpmSt,
        hierarchy: TpmiRhHierarchy,
        digest: Tpm2bDigest,
    }
}

impl TpmtTkCreation {
    pub fn null() -> Self {
        Self {
            tag: TPM2_ST_CREATION,
            hierarchy: TPM2_RH_NULL,
            digest: Tpm2bDigest::default(),
        }
    }
}

impl TpmtTkVerified {
    pub fn null() -> Self {
        Self {
            tag: TPM2_ST_VERIFIED,
            hierarchy: TPM2_RH_NULL,
            digest: Tpm2bDigest::default(),
        }
    }
}

impl TpmtTkHashcheck {
    /// Ticket used when the caller has no hash check to present.
    pub fn null() -> Self {
        Self {
            tag: TPM2_ST_HASHCHECK,
            hierarchy: TPM2_RH_NULL,
            digest: Tpm2bDigest::default(),
        }
    }
}

// ============================================================================
// Session authorization records
// ============================================================================

wire_struct! {
    /// One per-session authorization record in a command.
    TpmsAuthCommand {
        session_handle: TpmiShAuthSession,
        nonce: Tpm2bNonce,
        session_attributes: TpmaSession,
        hmac: Tpm2bAuth,
    }
}

wire_struct! {
    /// One per-session authorization record in a response.
    TpmsAuthResponse {
        nonce: Tpm2bNonce,
        session_attributes: TpmaSession,
        hmac: Tpm2bAuth,
    }
}

// ============================================================================
// NV public area
// ============================================================================

wire_struct! {
    TpmsNvPublic {
        nv_index: TpmiRhNvIndex,
        name_alg: TpmiAlgHash,
        attributes: TpmaNv,
        auth_policy: Tpm2bDigest,
        data_size: u16,
    }
}

// ============================================================================
// Attestation
// ============================================================================

wire_struct! {
    TpmsCertifyInfo {
        name: Tpm2bName,
        qualified_name: Tpm2bName,
    }
}

wire_struct! {
    TpmsQuoteInfo {
        pcr_select: TpmlPcrSelection,
        pcr_digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmsCreationInfo {
        object_name: Tpm2bName,
        creation_hash: Tpm2bDigest,
    }
}

wire_struct! {
    TpmsNvCertifyInfo {
        index_name: Tpm2bName,
        offset: u16,
        nv_contents: Tpm2bMaxNvBuffer,
    }
}

wire_struct! {
    TpmsSessionAuditInfo {
        exclusive_session: TpmiYesNo,
        session_digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmsCommandAuditInfo {
        audit_counter: u64,
        digest_alg: TpmAlgId,
        audit_digest: Tpm2bDigest,
        command_digest: Tpm2bDigest,
    }
}

wire_struct! {
    TpmsTimeAttestInfo {
        time: TpmsTimeInfo,
        firmware_version: u64,
    }
}

/// Body of every attestation the TPM signs. `attested` is selected by
/// `attestation_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmsAttest {
    pub magic: TpmGenerated,
    pub attestation_type: TpmiStAttest,
    pub qualified_signer: Tpm2bName,
    pub extra_data: Tpm2bData,
    pub clock_info: TpmsClockInfo,
    pub firmware_version: u64,
    pub attested: TpmuAttest,
}

impl WireType for TpmsAttest {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.magic.serialize(out)?;
        self.attestation_type.serialize(out)?;
        self.qualified_signer.serialize(out)?;
        self.extra_data.serialize(out)?;
        self.clock_info.serialize(out)?;
        self.firmware_version.serialize(out)?;
        self.attested.serialize(self.attestation_type, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let magic = TpmGenerated::parse(buffer, value_bytes.as_deref_mut())?;
        let attestation_type = TpmiStAttest::parse(buffer, value_bytes.as_deref_mut())?;
        let qualified_signer = Tpm2bName::parse(buffer, value_bytes.as_deref_mut())?;
        let extra_data = Tpm2bData::parse(buffer, value_bytes.as_deref_mut())?;
        let clock_info = TpmsClockInfo::parse(buffer, value_bytes.as_deref_mut())?;
        let firmware_version = u64::parse(buffer, value_bytes.as_deref_mut())?;
        let attested = TpmuAttest::parse(attestation_type, buffer, value_bytes)?;
        Ok(Self {
            magic,
            attestation_type,
            qualified_signer,
            extra_data,
            clock_info,
            firmware_version,
            attested,
        })
    }
}

// ============================================================================
// Signatures
// ============================================================================

wire_struct! {
    TpmsSignatureRsa {
        hash: TpmiAlgHash,
        sig: Tpm2bPublicKeyRsa,
    }
}

wire_struct! {
    TpmsSignatureEcc {
        hash: TpmiAlgHash,
        signature_r: Tpm2bEccParameter,
        signature_s: Tpm2bEccParameter,
    }
}

/// Signature tagged with its scheme. `signature` is selected by `sig_alg`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmtSignature {
    pub sig_alg: TpmiAlgSigScheme,
    pub signature: TpmuSignature,
}

impl WireType for TpmtSignature {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.sig_alg.serialize(out)?;
        self.signature.serialize(self.sig_alg, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let sig_alg = TpmiAlgSigScheme::parse(buffer, value_bytes.as_deref_mut())?;
        let signature = TpmuSignature::parse(sig_alg, buffer, value_bytes)?;
        Ok(Self { sig_alg, signature })
    }
}

// ============================================================================
// Saved context
// ============================================================================

wire_struct! {
    TpmsContext {
        sequence: u64,
        saved_handle: TpmiDhContext,
        hierarchy: TpmiRhHierarchy,
        context_blob: Tpm2bContextData,
    }
}

// ============================================================================
// Capabilities
// ============================================================================

wire_struct! {
    TpmsAlgProperty {
        alg: TpmAlgId,
        alg_properties: TpmaAlgorithm,
    }
}

wire_struct! {
    TpmsTaggedProperty {
        property: TpmPt,
        value: u32,
    }
}

/// Capability payload. `data` is selected by `capability`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmsCapabilityData {
    pub capability: TpmCap,
    pub data: TpmuCapabilities,
}

impl WireType for TpmsCapabilityData {
    fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
        self.capability.serialize(out)?;
        self.data.serialize(self.capability, out)
    }

    fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
        let capability = TpmCap::parse(buffer, value_bytes.as_deref_mut())?;
        let data = TpmuCapabilities::parse(capability, buffer, value_bytes)?;
        Ok(Self { capability, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn round_trip<T: WireType + PartialEq + core::fmt::Debug>(value: &T) {
        let wire = value.to_wire().expect("serialize");
        let mut buffer: &[u8] = &wire;
        let mut raw = Vec::new();
        let parsed = T::parse(&mut buffer, Some(&mut raw)).expect("parse");
        assert_eq!(&parsed, value);
        assert!(buffer.is_empty(), "residual bytes after parse");
        assert_eq!(raw, wire, "captured bytes differ from wire form");
    }

    #[test]
    fn test_clock_info_round_trip() {
        round_trip(&TpmsClockInfo {
            clock: 0x0102_0304_0506_0708,
            reset_count: 7,
            restart_count: 9,
            safe: TpmiYesNo::YES,
        });
    }

    #[test]
    fn test_pcr_selection_bitmap() {
        let selection = TpmsPcrSelection::with_pcrs(TPM2_ALG_SHA256, &[0, 4, 7]);
        assert_eq!(
            selection.to_wire().expect("serialize"),
            hex!("000B 03 910000")
        );
        assert!(selection.is_selected(4));
        assert!(!selection.is_selected(5));
        round_trip(&selection);
    }

    #[test]
    fn test_pcr_selection_oversized_bitmap_rejected() {
        let wire = hex!("000B 04 00000000");
        let mut buffer: &[u8] = &wire;
        assert_eq!(
            TpmsPcrSelection::parse(&mut buffer, None),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_hash_agile_digest_wire_form() {
        let digest = TpmtHa {
            hash_alg: TPM2_ALG_SHA256,
            digest: TpmuHa::Sha256([0u8; SHA256_DIGEST_SIZE]),
        };
        let wire = digest.to_wire().expect("serialize");
        assert_eq!(wire.len(), 2 + SHA256_DIGEST_SIZE);
        assert_eq!(&wire[..2], hex!("000B"));
        assert!(wire[2..].iter().all(|&b| b == 0));
        round_trip(&digest);
    }

    #[test]
    fn test_null_hash_agile_digest_is_selector_only() {
        let digest = TpmtHa {
            hash_alg: TPM2_ALG_NULL,
            digest: TpmuHa::Null,
        };
        assert_eq!(digest.to_wire().expect("serialize"), hex!("0010"));
    }

    #[test]
    fn test_rsa_public_area_round_trip() {
        let public_area = TpmtPublic {
            object_type: TPM2_ALG_RSA,
            name_alg: TPM2_ALG_SHA256,
            object_attributes: TpmaObject::FIXED_TPM
                | TpmaObject::FIXED_PARENT
                | TpmaObject::SENSITIVE_DATA_ORIGIN
                | TpmaObject::USER_WITH_AUTH
                | TpmaObject::RESTRICTED
                | TpmaObject::SIGN_ENCRYPT,
            auth_policy: Tpm2bDigest::default(),
            parameters: TpmuPublicParms::Rsa(TpmsRsaParms {
                symmetric: TpmtSymDefObject::null(),
                scheme: TpmtRsaScheme {
                    scheme: TPM2_ALG_RSASSA,
                    details: TpmuAsymScheme::Rsassa(TpmsSchemeHash {
                        hash_alg: TPM2_ALG_SHA256,
                    }),
                },
                key_bits: TpmKeyBits(2048),
                exponent: 0,
            }),
            unique: TpmuPublicId::Rsa(Tpm2bPublicKeyRsa::default()),
        };
        round_trip(&public_area);
    }

    #[test]
    fn test_sym_def_details_moves_no_bytes() {
        let aes = TpmtSymDef::aes_cfb(128);
        // algorithm + keyBits + mode, nothing for the details placeholder.
        assert_eq!(aes.to_wire().expect("serialize"), hex!("0006 0080 0043"));
        round_trip(&aes);

        let null = TpmtSymDef::null();
        assert_eq!(null.to_wire().expect("serialize"), hex!("0010"));
        round_trip(&null);
    }

    #[test]
    fn test_attest_round_trip() {
        let attest = TpmsAttest {
            magic: TPM2_GENERATED_VALUE,
            attestation_type: TPM2_ST_ATTEST_QUOTE,
            qualified_signer: Tpm2bName::from_bytes(&[0x11; 34]).expect("name"),
            extra_data: Tpm2bData::from_bytes(b"nonce").expect("data"),
            clock_info: TpmsClockInfo {
                clock: 1,
                reset_count: 2,
                restart_count: 3,
                safe: TpmiYesNo::YES,
            },
            firmware_version: 0xDEAD_BEEF,
            attested: TpmuAttest::Quote(TpmsQuoteInfo {
                pcr_select: TpmlPcrSelection::from_slice(&[TpmsPcrSelection::with_pcrs(
                    TPM2_ALG_SHA256,
                    &[0, 1, 2],
                )])
                .expect("selection"),
                pcr_digest: Tpm2bDigest::from_bytes(&[0xAA; 32]).expect("digest"),
            }),
        };
        round_trip(&attest);
    }

    #[test]
    fn test_signature_round_trip() {
        let signature = TpmtSignature {
            sig_alg: TPM2_ALG_RSASSA,
            signature: TpmuSignature::Rsassa(TpmsSignatureRsa {
                hash: TPM2_ALG_SHA256,
                sig: Tpm2bPublicKeyRsa::from_bytes(&[0x5A; 256]).expect("sig"),
            }),
        };
        round_trip(&signature);
    }

    #[test]
    fn test_ticket_null_forms() {
        let ticket = TpmtTkHashcheck::null();
        assert_eq!(ticket.to_wire().expect("serialize"), hex!("8024 40000007 0000"));
    }

    #[test]
    fn test_auth_command_round_trip() {
        let auth = TpmsAuthCommand {
            session_handle: TPM2_RS_PW,
            nonce: Tpm2bNonce::default(),
            session_attributes: TpmaSession::CONTINUE_SESSION,
            hmac: Tpm2bAuth::from_bytes(b"secret").expect("auth"),
        };
        assert_eq!(
            auth.to_wire().expect("serialize"),
            hex!("40000009 0000 01 0006 736563726574")
        );
        round_trip(&auth);
    }
}
