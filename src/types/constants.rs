//! Protocol constants from the TPM 2.0 specification.

use super::base::{
    TpmAlgId, TpmCap, TpmCc, TpmEccCurve, TpmGenerated, TpmHandle, TpmPt, TpmSe, TpmSt, TpmSu,
};

// ============================================================================
// Structure tags
// ============================================================================

/// Command/response carries no authorization sessions.
pub const TPM2_ST_NO_SESSIONS: TpmSt = TpmSt(0x8001);
/// Command/response carries one or more authorization sessions.
pub const TPM2_ST_SESSIONS: TpmSt = TpmSt(0x8002);
pub const TPM2_ST_NULL: TpmSt = TpmSt(0x8000);
pub const TPM2_ST_RSP_COMMAND: TpmSt = TpmSt(0x00C4);
pub const TPM2_ST_ATTEST_NV: TpmSt = TpmSt(0x8014);
pub const TPM2_ST_ATTEST_COMMAND_AUDIT: TpmSt = TpmSt(0x8015);
pub const TPM2_ST_ATTEST_SESSION_AUDIT: TpmSt = TpmSt(0x8016);
pub const TPM2_ST_ATTEST_CERTIFY: TpmSt = TpmSt(0x8017);
pub const TPM2_ST_ATTEST_QUOTE: TpmSt = TpmSt(0x8018);
pub const TPM2_ST_ATTEST_TIME: TpmSt = TpmSt(0x8019);
pub const TPM2_ST_ATTEST_CREATION: TpmSt = TpmSt(0x801A);
pub const TPM2_ST_CREATION: TpmSt = TpmSt(0x8021);
pub const TPM2_ST_VERIFIED: TpmSt = TpmSt(0x8022);
pub const TPM2_ST_AUTH_SECRET: TpmSt = TpmSt(0x8023);
pub const TPM2_ST_HASHCHECK: TpmSt = TpmSt(0x8024);
pub const TPM2_ST_AUTH_SIGNED: TpmSt = TpmSt(0x8025);

// ============================================================================
// Command codes
// ============================================================================

pub const TPM2_CC_NV_UNDEFINE_SPACE: TpmCc = TpmCc(0x0000_0122);
pub const TPM2_CC_EVICT_CONTROL: TpmCc = TpmCc(0x0000_0120);
pub const TPM2_CC_CLEAR: TpmCc = TpmCc(0x0000_0126);
pub const TPM2_CC_CLEAR_CONTROL: TpmCc = TpmCc(0x0000_0127);
pub const TPM2_CC_HIERARCHY_CHANGE_AUTH: TpmCc = TpmCc(0x0000_0129);
pub const TPM2_CC_NV_DEFINE_SPACE: TpmCc = TpmCc(0x0000_012A);
pub const TPM2_CC_CREATE_PRIMARY: TpmCc = TpmCc(0x0000_0131);
pub const TPM2_CC_NV_INCREMENT: TpmCc = TpmCc(0x0000_0134);
pub const TPM2_CC_NV_EXTEND: TpmCc = TpmCc(0x0000_0136);
pub const TPM2_CC_NV_WRITE: TpmCc = TpmCc(0x0000_0137);
pub const TPM2_CC_DICTIONARY_ATTACK_LOCK_RESET: TpmCc = TpmCc(0x0000_0139);
pub const TPM2_CC_PCR_EVENT: TpmCc = TpmCc(0x0000_013C);
pub const TPM2_CC_PCR_RESET: TpmCc = TpmCc(0x0000_013D);
pub const TPM2_CC_SEQUENCE_COMPLETE: TpmCc = TpmCc(0x0000_013E);
pub const TPM2_CC_INCREMENTAL_SELF_TEST: TpmCc = TpmCc(0x0000_0142);
pub const TPM2_CC_SELF_TEST: TpmCc = TpmCc(0x0000_0143);
pub const TPM2_CC_STARTUP: TpmCc = TpmCc(0x0000_0144);
pub const TPM2_CC_SHUTDOWN: TpmCc = TpmCc(0x0000_0145);
pub const TPM2_CC_STIR_RANDOM: TpmCc = TpmCc(0x0000_0146);
pub const TPM2_CC_ACTIVATE_CREDENTIAL: TpmCc = TpmCc(0x0000_0147);
pub const TPM2_CC_CERTIFY: TpmCc = TpmCc(0x0000_0148);
pub const TPM2_CC_DUPLICATE: TpmCc = TpmCc(0x0000_014B);
pub const TPM2_CC_NV_READ: TpmCc = TpmCc(0x0000_014E);
pub const TPM2_CC_OBJECT_CHANGE_AUTH: TpmCc = TpmCc(0x0000_0150);
pub const TPM2_CC_POLICY_SECRET: TpmCc = TpmCc(0x0000_0151);
pub const TPM2_CC_CREATE: TpmCc = TpmCc(0x0000_0153);
pub const TPM2_CC_HMAC: TpmCc = TpmCc(0x0000_0155);
pub const TPM2_CC_IMPORT: TpmCc = TpmCc(0x0000_0156);
pub const TPM2_CC_LOAD: TpmCc = TpmCc(0x0000_0157);
pub const TPM2_CC_QUOTE: TpmCc = TpmCc(0x0000_0158);
pub const TPM2_CC_RSA_DECRYPT: TpmCc = TpmCc(0x0000_0159);
pub const TPM2_CC_SEQUENCE_UPDATE: TpmCc = TpmCc(0x0000_015C);
pub const TPM2_CC_SIGN: TpmCc = TpmCc(0x0000_015D);
pub const TPM2_CC_UNSEAL: TpmCc = TpmCc(0x0000_015E);
pub const TPM2_CC_CONTEXT_LOAD: TpmCc = TpmCc(0x0000_0161);
pub const TPM2_CC_CONTEXT_SAVE: TpmCc = TpmCc(0x0000_0162);
pub const TPM2_CC_ECDH_KEY_GEN: TpmCc = TpmCc(0x0000_0163);
pub const TPM2_CC_ENCRYPT_DECRYPT: TpmCc = TpmCc(0x0000_0164);
pub const TPM2_CC_FLUSH_CONTEXT: TpmCc = TpmCc(0x0000_0165);
pub const TPM2_CC_LOAD_EXTERNAL: TpmCc = TpmCc(0x0000_0167);
pub const TPM2_CC_MAKE_CREDENTIAL: TpmCc = TpmCc(0x0000_0168);
pub const TPM2_CC_NV_READ_PUBLIC: TpmCc = TpmCc(0x0000_0169);
pub const TPM2_CC_POLICY_AUTH_VALUE: TpmCc = TpmCc(0x0000_016B);
pub const TPM2_CC_POLICY_COMMAND_CODE: TpmCc = TpmCc(0x0000_016C);
pub const TPM2_CC_POLICY_OR: TpmCc = TpmCc(0x0000_0171);
pub const TPM2_CC_READ_PUBLIC: TpmCc = TpmCc(0x0000_0173);
pub const TPM2_CC_RSA_ENCRYPT: TpmCc = TpmCc(0x0000_0174);
pub const TPM2_CC_START_AUTH_SESSION: TpmCc = TpmCc(0x0000_0176);
pub const TPM2_CC_VERIFY_SIGNATURE: TpmCc = TpmCc(0x0000_0177);
pub const TPM2_CC_GET_CAPABILITY: TpmCc = TpmCc(0x0000_017A);
pub const TPM2_CC_GET_RANDOM: TpmCc = TpmCc(0x0000_017B);
pub const TPM2_CC_GET_TEST_RESULT: TpmCc = TpmCc(0x0000_017C);
pub const TPM2_CC_HASH: TpmCc = TpmCc(0x0000_017D);
pub const TPM2_CC_PCR_READ: TpmCc = TpmCc(0x0000_017E);
pub const TPM2_CC_POLICY_PCR: TpmCc = TpmCc(0x0000_017F);
pub const TPM2_CC_POLICY_RESTART: TpmCc = TpmCc(0x0000_0180);
pub const TPM2_CC_READ_CLOCK: TpmCc = TpmCc(0x0000_0181);
pub const TPM2_CC_PCR_EXTEND: TpmCc = TpmCc(0x0000_0182);
pub const TPM2_CC_EVENT_SEQUENCE_COMPLETE: TpmCc = TpmCc(0x0000_0185);
pub const TPM2_CC_HASH_SEQUENCE_START: TpmCc = TpmCc(0x0000_0186);
pub const TPM2_CC_POLICY_GET_DIGEST: TpmCc = TpmCc(0x0000_0189);
pub const TPM2_CC_POLICY_PASSWORD: TpmCc = TpmCc(0x0000_018C);

// ============================================================================
// Algorithm identifiers
// ============================================================================

pub const TPM2_ALG_ERROR: TpmAlgId = TpmAlgId(0x0000);
pub const TPM2_ALG_RSA: TpmAlgId = TpmAlgId(0x0001);
pub const TPM2_ALG_SHA1: TpmAlgId = TpmAlgId(0x0004);
pub const TPM2_ALG_HMAC: TpmAlgId = TpmAlgId(0x0005);
pub const TPM2_ALG_AES: TpmAlgId = TpmAlgId(0x0006);
pub const TPM2_ALG_MGF1: TpmAlgId = TpmAlgId(0x0007);
pub const TPM2_ALG_KEYEDHASH: TpmAlgId = TpmAlgId(0x0008);
pub const TPM2_ALG_XOR: TpmAlgId = TpmAlgId(0x000A);
pub const TPM2_ALG_SHA256: TpmAlgId = TpmAlgId(0x000B);
pub const TPM2_ALG_SHA384: TpmAlgId = TpmAlgId(0x000C);
pub const TPM2_ALG_SHA512: TpmAlgId = TpmAlgId(0x000D);
pub const TPM2_ALG_NULL: TpmAlgId = TpmAlgId(0x0010);
pub const TPM2_ALG_SM3_256: TpmAlgId = TpmAlgId(0x0012);
pub const TPM2_ALG_SM4: TpmAlgId = TpmAlgId(0x0013);
pub const TPM2_ALG_RSASSA: TpmAlgId = TpmAlgId(0x0014);
pub const TPM2_ALG_RSAES: TpmAlgId = TpmAlgId(0x0015);
pub const TPM2_ALG_RSAPSS: TpmAlgId = TpmAlgId(0x0016);
pub const TPM2_ALG_OAEP: TpmAlgId = TpmAlgId(0x0017);
pub const TPM2_ALG_ECDSA: TpmAlgId = TpmAlgId(0x0018);
pub const TPM2_ALG_ECDH: TpmAlgId = TpmAlgId(0x0019);
pub const TPM2_ALG_ECDAA: TpmAlgId = TpmAlgId(0x001A);
pub const TPM2_ALG_SM2: TpmAlgId = TpmAlgId(0x001B);
pub const TPM2_ALG_ECSCHNORR: TpmAlgId = TpmAlgId(0x001C);
pub const TPM2_ALG_KDF1_SP800_56A: TpmAlgId = TpmAlgId(0x0020);
pub const TPM2_ALG_KDF2: TpmAlgId = TpmAlgId(0x0021);
pub const TPM2_ALG_KDF1_SP800_108: TpmAlgId = TpmAlgId(0x0022);
pub const TPM2_ALG_ECC: TpmAlgId = TpmAlgId(0x0023);
pub const TPM2_ALG_SYMCIPHER: TpmAlgId = TpmAlgId(0x0025);
pub const TPM2_ALG_CAMELLIA: TpmAlgId = TpmAlgId(0x0026);
pub const TPM2_ALG_CTR: TpmAlgId = TpmAlgId(0x0040);
pub const TPM2_ALG_OFB: TpmAlgId = TpmAlgId(0x0041);
pub const TPM2_ALG_CBC: TpmAlgId = TpmAlgId(0x0042);
pub const TPM2_ALG_CFB: TpmAlgId = TpmAlgId(0x0043);
pub const TPM2_ALG_ECB: TpmAlgId = TpmAlgId(0x0044);

// ============================================================================
// ECC curves
// ============================================================================

pub const TPM2_ECC_NONE: TpmEccCurve = TpmEccCurve(0x0000);
pub const TPM2_ECC_NIST_P256: TpmEccCurve = TpmEccCurve(0x0003);
pub const TPM2_ECC_NIST_P384: TpmEccCurve = TpmEccCurve(0x0004);
pub const TPM2_ECC_BN_P256: TpmEccCurve = TpmEccCurve(0x0010);
pub const TPM2_ECC_SM2_P256: TpmEccCurve = TpmEccCurve(0x0020);

// ============================================================================
// Startup and session types
// ============================================================================

pub const TPM2_SU_CLEAR: TpmSu = TpmSu(0x0000);
pub const TPM2_SU_STATE: TpmSu = TpmSu(0x0001);

pub const TPM2_SE_HMAC: TpmSe = TpmSe(0x00);
pub const TPM2_SE_POLICY: TpmSe = TpmSe(0x01);
pub const TPM2_SE_TRIAL: TpmSe = TpmSe(0x03);

// ============================================================================
// Permanent handles
// ============================================================================

pub const TPM2_RH_OWNER: TpmHandle = TpmHandle(0x4000_0001);
pub const TPM2_RH_NULL: TpmHandle = TpmHandle(0x4000_0007);
/// Indicator for password authorization in a session handle slot.
pub const TPM2_RS_PW: TpmHandle = TpmHandle(0x4000_0009);
pub const TPM2_RH_LOCKOUT: TpmHandle = TpmHandle(0x4000_000A);
pub const TPM2_RH_ENDORSEMENT: TpmHandle = TpmHandle(0x4000_000B);
pub const TPM2_RH_PLATFORM: TpmHandle = TpmHandle(0x4000_000C);

// ============================================================================
// Capabilities and properties
// ============================================================================

pub const TPM2_CAP_ALGS: TpmCap = TpmCap(0x0000_0000);
pub const TPM2_CAP_HANDLES: TpmCap = TpmCap(0x0000_0001);
pub const TPM2_CAP_COMMANDS: TpmCap = TpmCap(0x0000_0002);
pub const TPM2_CAP_PP_COMMANDS: TpmCap = TpmCap(0x0000_0003);
pub const TPM2_CAP_AUDIT_COMMANDS: TpmCap = TpmCap(0x0000_0004);
pub const TPM2_CAP_PCRS: TpmCap = TpmCap(0x0000_0005);
pub const TPM2_CAP_TPM_PROPERTIES: TpmCap = TpmCap(0x0000_0006);
pub const TPM2_CAP_PCR_PROPERTIES: TpmCap = TpmCap(0x0000_0007);
pub const TPM2_CAP_ECC_CURVES: TpmCap = TpmCap(0x0000_0008);

pub const TPM2_PT_FAMILY_INDICATOR: TpmPt = TpmPt(0x0000_0100);
pub const TPM2_PT_LEVEL: TpmPt = TpmPt(0x0000_0101);
pub const TPM2_PT_REVISION: TpmPt = TpmPt(0x0000_0102);
pub const TPM2_PT_MANUFACTURER: TpmPt = TpmPt(0x0000_0105);
pub const TPM2_PT_FIRMWARE_VERSION_1: TpmPt = TpmPt(0x0000_010B);
pub const TPM2_PT_FIRMWARE_VERSION_2: TpmPt = TpmPt(0x0000_010C);

/// Marker in attestation structures proving TPM origin.
pub const TPM2_GENERATED_VALUE: TpmGenerated = TpmGenerated(0xFF54_4347);

// ============================================================================
// Digest and buffer capacities
// ============================================================================

pub const SHA1_DIGEST_SIZE: usize = 20;
pub const SHA256_DIGEST_SIZE: usize = 32;
pub const SM3_256_DIGEST_SIZE: usize = 32;
pub const SHA384_DIGEST_SIZE: usize = 48;
pub const SHA512_DIGEST_SIZE: usize = 64;

/// Capacity of a digest buffer: the largest supported hash output.
pub const MAX_DIGEST_SIZE: usize = SHA512_DIGEST_SIZE;

pub const IMPLEMENTATION_PCR: usize = 24;
pub const PCR_SELECT_MAX: usize = (IMPLEMENTATION_PCR + 7) / 8;
/// Number of PCR banks tracked in digest-value and selection lists.
pub const HASH_COUNT: usize = 3;

pub const MAX_SYM_BLOCK_SIZE: usize = 16;
pub const MAX_SYM_KEY_BYTES: usize = 32;
pub const MAX_SYM_DATA: usize = 128;
pub const MAX_RSA_KEY_BYTES: usize = 256;
pub const MAX_ECC_KEY_BYTES: usize = 48;

pub const MAX_DIGEST_BUFFER: usize = 1024;
pub const MAX_NV_BUFFER_SIZE: usize = 1024;
pub const MAX_CAP_BUFFER: usize = 1024;
pub const MAX_CONTEXT_SIZE: usize = 2048;

/// Capacity of a name buffer: algorithm identifier plus the largest digest.
pub const MAX_NAME_SIZE: usize = 2 + MAX_DIGEST_SIZE;

pub const MAX_ALG_LIST_SIZE: usize = 64;
pub const MAX_CAP_DATA: usize = MAX_CAP_BUFFER - 4 - 4;
pub const MAX_CAP_ALGS: usize = MAX_CAP_DATA / 6;
pub const MAX_CAP_HANDLES: usize = MAX_CAP_DATA / 4;
pub const MAX_CAP_CC: usize = MAX_CAP_DATA / 4;
pub const MAX_TPM_PROPERTIES: usize = MAX_CAP_DATA / 8;

/// Capacity of the wrapped private-area blob returned by object creation.
pub const MAX_PRIVATE_SIZE: usize = 1024;
/// Capacity of the credential blob used by MakeCredential/ActivateCredential.
pub const MAX_ID_OBJECT_SIZE: usize = 256;
/// Capacity of a marshalled attestation body.
pub const MAX_ATTEST_SIZE: usize = 2048;
