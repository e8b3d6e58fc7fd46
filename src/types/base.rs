//! Base wire types: zero-cost newtype aliases over the primitive integers
//! and the attribute bitfields.
//!
//! Every alias keeps the exact wire encoding of its base integer but is a
//! distinct type, so a handle can never be passed where an algorithm
//! identifier is expected.

use crate::error::TpmResult;
use crate::marshal::WireType;

macro_rules! wire_newtype {
    ($(#[$meta:meta])* $name:ident, $base:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub $base);

        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                self.0.serialize(out)
            }

            fn parse(buffer: &mut &[u8], value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
                Ok(Self(<$base>::parse(buffer, value_bytes)?))
            }
        }
    };
}

wire_newtype! {
    /// 32-bit command code.
    TpmCc, u32
}
wire_newtype! {
    /// 32-bit reference to an entity resident in the TPM.
    TpmHandle, u32
}
wire_newtype! {
    /// 16-bit algorithm identifier.
    TpmAlgId, u16
}
wire_newtype! {
    /// 16-bit structure tag.
    TpmSt, u16
}
wire_newtype! {
    /// 16-bit startup/shutdown type.
    TpmSu, u16
}
wire_newtype! {
    /// 8-bit session type.
    TpmSe, u8
}
wire_newtype! {
    /// 32-bit capability category.
    TpmCap, u32
}
wire_newtype! {
    /// 32-bit property tag.
    TpmPt, u32
}
wire_newtype! {
    /// 16-bit symmetric key size in bits.
    TpmKeyBits, u16
}
wire_newtype! {
    /// 16-bit ECC curve identifier.
    TpmEccCurve, u16
}
wire_newtype! {
    /// 32-bit constant marking a structure as TPM-generated.
    TpmGenerated, u32
}
wire_newtype! {
    /// 8-bit boolean. The wire uses a single byte; any nonzero value reads
    /// as yes.
    TpmiYesNo, u8
}

impl TpmiYesNo {
    pub const NO: TpmiYesNo = TpmiYesNo(0);
    pub const YES: TpmiYesNo = TpmiYesNo(1);

    pub fn is_yes(self) -> bool {
        self.0 != 0
    }
}

/// 32-bit response code; zero is success.
pub type TpmRc = u32;

// Interface types. These constrain which values are legal in a given
// position but share the wire form of their base type.
pub type TpmiDhObject = TpmHandle;
pub type TpmiDhEntity = TpmHandle;
pub type TpmiDhContext = TpmHandle;
pub type TpmiDhPersistent = TpmHandle;
pub type TpmiDhPcr = TpmHandle;
pub type TpmiRhNvIndex = TpmHandle;
pub type TpmiRhNvAuth = TpmHandle;
pub type TpmiRhHierarchy = TpmHandle;
pub type TpmiRhHierarchyAuth = TpmHandle;
pub type TpmiRhProvision = TpmHandle;
pub type TpmiRhClear = TpmHandle;
pub type TpmiRhLockout = TpmHandle;
pub type TpmiRhEndorsement = TpmHandle;
pub type TpmiShAuthSession = TpmHandle;
pub type TpmiShPolicy = TpmHandle;
pub type TpmiDhObjectOrNull = TpmHandle;

pub type TpmiStCommandTag = TpmSt;
pub type TpmiStAttest = TpmSt;

pub type TpmiAlgHash = TpmAlgId;
pub type TpmiAlgSym = TpmAlgId;
pub type TpmiAlgSymObject = TpmAlgId;
pub type TpmiAlgSymMode = TpmAlgId;
pub type TpmiAlgKdf = TpmAlgId;
pub type TpmiAlgPublic = TpmAlgId;
pub type TpmiAlgSigScheme = TpmAlgId;
pub type TpmiAlgKeyedhashScheme = TpmAlgId;
pub type TpmiAlgRsaScheme = TpmAlgId;
pub type TpmiAlgRsaDecrypt = TpmAlgId;
pub type TpmiAlgEccScheme = TpmAlgId;

pub type TpmiRsaKeyBits = TpmKeyBits;
pub type TpmiAesKeyBits = TpmKeyBits;
pub type TpmiEccCurve = TpmEccCurve;

// ============================================================================
// Attribute bitfields
// ============================================================================

macro_rules! wire_bitflags {
    ($name:ident, $base:ty) => {
        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                self.bits().serialize(out)
            }

            fn parse(buffer: &mut &[u8], value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
                // Reserved bits are kept verbatim so re-serialization is
                // byte-identical to the wire.
                Ok(Self::from_bits_retain(<$base>::parse(
                    buffer,
                    value_bytes,
                )?))
            }
        }
    };
}

bitflags::bitflags! {
    /// Object attributes (TPMA_OBJECT).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaObject: u32 {
        const FIXED_TPM = 1 << 1;
        const ST_CLEAR = 1 << 2;
        const FIXED_PARENT = 1 << 4;
        const SENSITIVE_DATA_ORIGIN = 1 << 5;
        const USER_WITH_AUTH = 1 << 6;
        const ADMIN_WITH_POLICY = 1 << 7;
        const NO_DA = 1 << 10;
        const ENCRYPTED_DUPLICATION = 1 << 11;
        const RESTRICTED = 1 << 16;
        const DECRYPT = 1 << 17;
        const SIGN_ENCRYPT = 1 << 18;
    }
}
wire_bitflags!(TpmaObject, u32);

bitflags::bitflags! {
    /// Session attributes (TPMA_SESSION).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaSession: u8 {
        const CONTINUE_SESSION = 1 << 0;
        const AUDIT_EXCLUSIVE = 1 << 1;
        const AUDIT_RESET = 1 << 2;
        const DECRYPT = 1 << 5;
        const ENCRYPT = 1 << 6;
        const AUDIT = 1 << 7;
    }
}
wire_bitflags!(TpmaSession, u8);

bitflags::bitflags! {
    /// NV index attributes (TPMA_NV).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaNv: u32 {
        const PPWRITE = 1 << 0;
        const OWNERWRITE = 1 << 1;
        const AUTHWRITE = 1 << 2;
        const POLICYWRITE = 1 << 3;
        const COUNTER = 1 << 4;
        const BITS = 1 << 5;
        const EXTEND = 1 << 6;
        const POLICY_DELETE = 1 << 10;
        const WRITELOCKED = 1 << 11;
        const WRITEALL = 1 << 12;
        const WRITEDEFINE = 1 << 13;
        const WRITE_STCLEAR = 1 << 14;
        const GLOBALLOCK = 1 << 15;
        const PPREAD = 1 << 16;
        const OWNERREAD = 1 << 17;
        const AUTHREAD = 1 << 18;
        const POLICYREAD = 1 << 19;
        const NO_DA = 1 << 25;
        const ORDERLY = 1 << 26;
        const CLEAR_STCLEAR = 1 << 27;
        const READLOCKED = 1 << 28;
        const WRITTEN = 1 << 29;
        const PLATFORMCREATE = 1 << 30;
        const READ_STCLEAR = 1 << 31;
    }
}
wire_bitflags!(TpmaNv, u32);

bitflags::bitflags! {
    /// Algorithm attributes (TPMA_ALGORITHM).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaAlgorithm: u32 {
        const ASYMMETRIC = 1 << 0;
        const SYMMETRIC = 1 << 1;
        const HASH = 1 << 2;
        const OBJECT = 1 << 3;
        const SIGNING = 1 << 8;
        const ENCRYPTING = 1 << 9;
        const METHOD = 1 << 10;
    }
}
wire_bitflags!(TpmaAlgorithm, u32);

bitflags::bitflags! {
    /// Command attributes (TPMA_CC).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaCc: u32 {
        const COMMAND_INDEX = 0x0000_FFFF;
        const NV = 1 << 22;
        const EXTENSIVE = 1 << 23;
        const FLUSHED = 1 << 24;
        const C_HANDLES = 0x0E00_0000;
        const R_HANDLE = 1 << 28;
        const V = 1 << 29;
    }
}
wire_bitflags!(TpmaCc, u32);

bitflags::bitflags! {
    /// Locality indicator (TPMA_LOCALITY).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TpmaLocality: u8 {
        const LOC_ZERO = 1 << 0;
        const LOC_ONE = 1 << 1;
        const LOC_TWO = 1 << 2;
        const LOC_THREE = 1 << 3;
        const LOC_FOUR = 1 << 4;
        const EXTENDED = 0xE0;
    }
}
wire_bitflags!(TpmaLocality, u8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TpmError;

    #[test]
    fn test_newtype_forwards_to_base_encoding() {
        let wire = TpmCc(0x0000_0144).to_wire().expect("serialize");
        assert_eq!(wire, [0x00, 0x00, 0x01, 0x44]);
        let wire = TpmAlgId(0x000B).to_wire().expect("serialize");
        assert_eq!(wire, [0x00, 0x0B]);
    }

    #[test]
    fn test_newtype_parse_insufficient() {
        let mut buffer: &[u8] = &[0x01];
        assert_eq!(
            TpmHandle::parse(&mut buffer, None),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_attributes_keep_reserved_bits() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut buffer: &[u8] = &data;
        let attributes = TpmaObject::parse(&mut buffer, None).expect("parse");
        assert_eq!(attributes.bits(), 0xFFFF_FFFF);
        assert_eq!(attributes.to_wire().expect("serialize"), data);
    }

    #[test]
    fn test_session_attributes_wire_width() {
        let wire = TpmaSession::CONTINUE_SESSION.to_wire().expect("serialize");
        assert_eq!(wire, [0x01]);
    }
}
