//! Command/response transport template.
//!
//! Every TPM command runs through the same machinery: [`CommandBuilder`]
//! assembles the request envelope and command-parameter hash, the
//! authorization delegate contributes the session section and optional
//! parameter encryption, and [`ResponseDecoder`] dismantles the response
//! symmetrically, verifying framing and response authorization before any
//! output reaches the caller.
//!
//! The per-command entry points in the submodules are thin instantiations of
//! this template: handles first in specification order, then value
//! parameters, with the first sized-buffer parameter of each direction
//! designated for session encryption.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::authorization::AuthorizationDelegate;
use crate::error::{TpmError, TpmResult, TPM_RC_SUCCESS};
use crate::marshal::WireType;
use crate::transport::CommandTransceiver;
use crate::types::{TpmCc, TpmHandle, TpmSt, TPM2_ST_NO_SESSIONS, TPM2_ST_SESSIONS};

pub mod asym;
pub mod attestation;
pub mod capability;
pub mod context;
pub mod credential;
pub mod duplication;
pub mod hashing;
pub mod hierarchy;
pub mod nv;
pub mod object;
pub mod pcr;
pub mod policy;
pub mod random;
pub mod session;
pub mod signature;
pub mod startup;

/// Fixed envelope prefix: tag (2), size (4), command code (4).
pub const COMMAND_HEADER_SIZE: usize = 10;

/// Completion for one command invocation; called exactly once.
pub type TpmCallback<T> = Box<dyn FnOnce(TpmResult<T>) + Send>;

// ============================================================================
// Request assembly
// ============================================================================

/// Accumulates one command envelope.
///
/// Call order is the wire order: handles (with their names) first, then
/// value parameters. The command-parameter hash covers the command code,
/// each handle's *name*, and each parameter's serialized bytes after any
/// encryption the delegate applied.
pub(crate) struct CommandBuilder<'a> {
    command_code: TpmCc,
    hash: Sha256,
    handle_section: Vec<u8>,
    parameter_section: Vec<u8>,
    delegate: Option<&'a dyn AuthorizationDelegate>,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(command_code: TpmCc, delegate: Option<&'a dyn AuthorizationDelegate>) -> Self {
        let mut hash = Sha256::new();
        hash.update(command_code.0.to_be_bytes());
        Self {
            command_code,
            hash,
            handle_section: Vec::new(),
            parameter_section: Vec::new(),
            delegate,
        }
    }

    /// Adds a handle parameter. The 32-bit value goes on the wire; the
    /// caller-supplied name is the handle's identity and feeds the
    /// command-parameter hash instead.
    pub fn add_handle(&mut self, handle: TpmHandle, name: &[u8]) {
        self.handle_section
            .extend_from_slice(&handle.0.to_be_bytes());
        self.hash.update(name);
    }

    /// Adds a value parameter.
    pub fn add_parameter<T: WireType>(&mut self, parameter: &T) -> TpmResult<()> {
        let bytes = parameter.to_wire()?;
        self.hash.update(&bytes);
        self.parameter_section.extend_from_slice(&bytes);
        Ok(())
    }

    /// Adds the command's encrypt-marked parameter: a sized buffer whose
    /// payload, after the u16 size prefix, is run through the delegate's
    /// session encryption. The hash sees the encrypted form.
    pub fn add_encrypted_parameter<T: WireType>(&mut self, parameter: &T) -> TpmResult<()> {
        let mut bytes = parameter.to_wire()?;
        if let Some(delegate) = self.delegate {
            if bytes.len() >= 2 {
                let mut payload = bytes.split_off(2);
                if !delegate.encrypt_command_parameter(&mut payload) {
                    return Err(TpmError::EncryptionFailed);
                }
                bytes.extend_from_slice(&payload);
            }
        }
        self.hash.update(&bytes);
        self.parameter_section.extend_from_slice(&bytes);
        Ok(())
    }

    /// Finalizes the parameter hash, obtains the authorization section and
    /// concatenates the envelope.
    pub fn build(self) -> TpmResult<Vec<u8>> {
        let command_hash = self.hash.finalize();
        let mut authorization_section = Vec::new();
        if let Some(delegate) = self.delegate {
            authorization_section = delegate
                .get_command_authorization(&command_hash)
                .ok_or(TpmError::AuthorizationFailed)?;
        }

        let mut tag = TPM2_ST_NO_SESSIONS;
        let mut authorization_size_bytes = Vec::new();
        if !authorization_section.is_empty() {
            tag = TPM2_ST_SESSIONS;
            authorization_size_bytes.extend_from_slice(
                &(authorization_section.len() as u32).to_be_bytes(),
            );
        }

        let command_size = COMMAND_HEADER_SIZE
            + self.handle_section.len()
            + authorization_size_bytes.len()
            + authorization_section.len()
            + self.parameter_section.len();

        let mut command = Vec::with_capacity(command_size);
        command.extend_from_slice(&tag.0.to_be_bytes());
        command.extend_from_slice(&(command_size as u32).to_be_bytes());
        command.extend_from_slice(&self.command_code.0.to_be_bytes());
        command.extend_from_slice(&self.handle_section);
        command.extend_from_slice(&authorization_size_bytes);
        command.extend_from_slice(&authorization_section);
        command.extend_from_slice(&self.parameter_section);
        debug_assert_eq!(command.len(), command_size);

        log::debug!(
            "assembled command 0x{:08X}: {} bytes, tag 0x{:04X}",
            self.command_code.0,
            command.len(),
            tag.0
        );
        Ok(command)
    }
}

// ============================================================================
// Response teardown
// ============================================================================

/// Walks one response envelope.
///
/// Construction validates the header framing and surfaces a nonzero
/// response code immediately. Callers then parse handle outputs, call
/// [`ResponseDecoder::check_authorization`], and parse value outputs, which
/// mirrors the wire layout: handles sit before the parameter-size split and
/// are excluded from the response-parameter hash.
pub(crate) struct ResponseDecoder<'a> {
    buffer: &'a [u8],
    tag: TpmSt,
    command_code: TpmCc,
    response_code_bytes: [u8; 4],
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(command_code: TpmCc, response: &'a [u8]) -> TpmResult<Self> {
        let mut buffer = response;
        let tag = TpmSt::parse(&mut buffer, None)?;
        let response_size = u32::parse(&mut buffer, None)?;
        let mut response_code_bytes = Vec::new();
        let response_code = u32::parse(&mut buffer, Some(&mut response_code_bytes))?;

        if response_size as usize != response.len() {
            log::warn!(
                "response envelope declares {} bytes but carries {}",
                response_size,
                response.len()
            );
            return Err(TpmError::Size);
        }
        if response_code != TPM_RC_SUCCESS {
            log::debug!(
                "command 0x{:08X} failed with response code 0x{:08X}",
                command_code.0,
                response_code
            );
            return Err(TpmError::from_response_code(response_code));
        }

        let mut code = [0u8; 4];
        code.copy_from_slice(&response_code_bytes);
        Ok(Self {
            buffer,
            tag,
            command_code,
            response_code_bytes: code,
        })
    }

    /// Parses one response handle. Handles precede the parameter section
    /// and are not covered by the response-parameter hash.
    pub fn parse_handle(&mut self) -> TpmResult<TpmHandle> {
        TpmHandle::parse(&mut self.buffer, None)
    }

    /// Splits off the authorization section when sessions are present,
    /// re-hashes the parameter section in its on-wire form and has the
    /// delegate verify it. Must be called after handles and before value
    /// outputs.
    pub fn check_authorization(
        &mut self,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        if self.tag != TPM2_ST_SESSIONS {
            return Ok(());
        }
        let parameter_section_size = u32::parse(&mut self.buffer, None)? as usize;
        if parameter_section_size > self.buffer.len() {
            return Err(TpmError::Insufficient);
        }
        let (parameters, authorization) = self.buffer.split_at(parameter_section_size);
        self.buffer = parameters;

        if let Some(delegate) = delegate {
            let mut hash = Sha256::new();
            hash.update(self.response_code_bytes);
            hash.update(self.command_code.0.to_be_bytes());
            hash.update(parameters);
            let response_hash = hash.finalize();
            if !delegate.check_response_authorization(&response_hash, authorization) {
                return Err(TpmError::AuthorizationFailed);
            }
        }
        Ok(())
    }

    /// Parses one value output.
    pub fn parse_parameter<T: WireType>(&mut self) -> TpmResult<T> {
        T::parse(&mut self.buffer, None)
    }

    /// Parses the decrypt-marked output: after a session response, the
    /// payload behind the u16 size prefix is run through the delegate and
    /// the decrypted wire form is re-parsed into the typed value.
    pub fn parse_encrypted_parameter<T: WireType>(
        &mut self,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<T> {
        let mut raw = Vec::new();
        let value = T::parse(&mut self.buffer, Some(&mut raw))?;
        if self.tag != TPM2_ST_SESSIONS || raw.len() < 2 {
            return Ok(value);
        }
        if let Some(delegate) = delegate {
            let mut payload = raw.split_off(2);
            if !delegate.decrypt_response_parameter(&mut payload) {
                return Err(TpmError::EncryptionFailed);
            }
            raw.extend_from_slice(&payload);
            let mut decrypted: &[u8] = &raw;
            return T::parse(&mut decrypted, None);
        }
        Ok(value)
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Stateless command dispatcher.
///
/// Holds a shared transceiver and exposes one asynchronous and one blocking
/// entry point per TPM command. Each invocation builds the request, hands it
/// to the transceiver with its response parser, and completes exactly once
/// with either typed outputs or an error; build failures complete without
/// the transceiver ever being called.
pub struct Tpm {
    transceiver: Arc<dyn CommandTransceiver>,
}

impl Tpm {
    pub fn new(transceiver: Arc<dyn CommandTransceiver>) -> Self {
        Self { transceiver }
    }

    pub fn transceiver(&self) -> &Arc<dyn CommandTransceiver> {
        &self.transceiver
    }

    pub(crate) fn execute<T, F>(
        &self,
        command: TpmResult<Vec<u8>>,
        parse: F,
        on_complete: TpmCallback<T>,
    ) where
        T: 'static,
        F: FnOnce(&[u8]) -> TpmResult<T> + Send + 'static,
    {
        match command {
            Ok(bytes) => self.transceiver.send_command(
                bytes,
                Box::new(move |response| on_complete(parse(&response))),
            ),
            Err(err) => on_complete(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tpm2bDigest, TpmiYesNo};
    use hex_literal::hex;
    use std::sync::Mutex;

    /// Test delegate that records the hashes it sees and serves canned
    /// sections.
    struct StubDelegate {
        authorization: Vec<u8>,
        accept_response: bool,
        command_hash: Mutex<Vec<u8>>,
        response_hash: Mutex<Vec<u8>>,
        xor_parameters: bool,
    }

    impl StubDelegate {
        fn new(authorization: &[u8]) -> Self {
            Self {
                authorization: authorization.to_vec(),
                accept_response: true,
                command_hash: Mutex::new(Vec::new()),
                response_hash: Mutex::new(Vec::new()),
                xor_parameters: false,
            }
        }
    }

    impl AuthorizationDelegate for StubDelegate {
        fn get_command_authorization(&self, command_hash: &[u8]) -> Option<Vec<u8>> {
            *self.command_hash.lock().unwrap() = command_hash.to_vec();
            Some(self.authorization.clone())
        }

        fn check_response_authorization(&self, response_hash: &[u8], _auth: &[u8]) -> bool {
            *self.response_hash.lock().unwrap() = response_hash.to_vec();
            self.accept_response
        }

        fn encrypt_command_parameter(&self, parameter: &mut Vec<u8>) -> bool {
            if self.xor_parameters {
                for byte in parameter.iter_mut() {
                    *byte ^= 0xFF;
                }
            }
            true
        }

        fn decrypt_response_parameter(&self, parameter: &mut Vec<u8>) -> bool {
            if self.xor_parameters {
                for byte in parameter.iter_mut() {
                    *byte ^= 0xFF;
                }
            }
            true
        }
    }

    #[test]
    fn test_no_sessions_envelope() {
        let mut builder = CommandBuilder::new(TpmCc(0x0000_0144), None);
        builder.add_parameter(&0x0000u16).expect("parameter");
        let command = builder.build().expect("build");
        assert_eq!(command, hex!("8001 0000000C 00000144 0000"));
    }

    #[test]
    fn test_sessions_envelope_layout_and_size() {
        let delegate = StubDelegate::new(&hex!("40000009 0000 01 0000"));
        let mut builder = CommandBuilder::new(TpmCc(0x0000_0143), Some(&delegate));
        builder.add_parameter(&TpmiYesNo::YES).expect("parameter");
        let command = builder.build().expect("build");
        assert_eq!(
            command,
            hex!("8002 00000018 00000143 00000009 40000009 0000 01 0000 01")
        );
        // The declared size always equals the bytes handed to the transport.
        let declared = u32::from_be_bytes([command[2], command[3], command[4], command[5]]);
        assert_eq!(declared as usize, command.len());
    }

    #[test]
    fn test_command_hash_composition() {
        let delegate = StubDelegate::new(&hex!("40000009 0000 01 0000"));
        let mut builder = CommandBuilder::new(TpmCc(0x0000_0143), Some(&delegate));
        builder.add_parameter(&TpmiYesNo::YES).expect("parameter");
        builder.build().expect("build");
        let expected = Sha256::digest(hex!("00000143 01"));
        assert_eq!(*delegate.command_hash.lock().unwrap(), expected.to_vec());
    }

    #[test]
    fn test_command_hash_uses_handle_name_not_value() {
        let delegate = StubDelegate::new(&hex!("40000009 0000 01 0000"));
        let name = hex!("000B AABBCCDD");
        let mut builder = CommandBuilder::new(TpmCc(0x0000_015D), Some(&delegate));
        builder.add_handle(TpmHandle(0x8000_0000), &name);
        builder.build().expect("build");

        let mut expected = Sha256::new();
        expected.update(hex!("0000015D"));
        expected.update(name);
        assert_eq!(
            *delegate.command_hash.lock().unwrap(),
            expected.finalize().to_vec()
        );
    }

    #[test]
    fn test_command_hash_covers_encrypted_form() {
        let mut delegate = StubDelegate::new(&hex!("40000009 0000 01 0000"));
        delegate.xor_parameters = true;
        let digest = Tpm2bDigest::from_bytes(&hex!("00112233")).expect("digest");
        let mut builder = CommandBuilder::new(TpmCc(0x0000_015D), Some(&delegate));
        builder.add_encrypted_parameter(&digest).expect("parameter");
        let command = builder.build().expect("build");

        // Size prefix stays in the clear, payload is transformed.
        let parameters = &command[command.len() - 6..];
        assert_eq!(parameters, hex!("0004 FFEEDDCC"));
        let mut expected = Sha256::new();
        expected.update(hex!("0000015D"));
        expected.update(hex!("0004 FFEEDDCC"));
        assert_eq!(
            *delegate.command_hash.lock().unwrap(),
            expected.finalize().to_vec()
        );
    }

    #[test]
    fn test_refusing_delegate_fails_build() {
        struct RefusingDelegate;
        impl AuthorizationDelegate for RefusingDelegate {
            fn get_command_authorization(&self, _hash: &[u8]) -> Option<Vec<u8>> {
                None
            }
            fn check_response_authorization(&self, _hash: &[u8], _auth: &[u8]) -> bool {
                false
            }
            fn encrypt_command_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
                false
            }
            fn decrypt_response_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
                false
            }
        }
        let builder = CommandBuilder::new(TpmCc(0x0000_0144), Some(&RefusingDelegate));
        assert_eq!(builder.build(), Err(TpmError::AuthorizationFailed));
    }

    #[test]
    fn test_empty_authorization_section_means_no_sessions() {
        let delegate = StubDelegate::new(&[]);
        let builder = CommandBuilder::new(TpmCc(0x0000_0144), Some(&delegate));
        let command = builder.build().expect("build");
        assert_eq!(command, hex!("8001 0000000A 00000144"));
    }

    #[test]
    fn test_decoder_rejects_size_mismatch() {
        // Declares 16 bytes, carries 12.
        let response = hex!("8001 00000010 00000000 AABB");
        assert_eq!(
            ResponseDecoder::new(TpmCc(0x0000_0144), &response).err(),
            Some(TpmError::Size)
        );
    }

    #[test]
    fn test_decoder_surfaces_response_code_without_parsing_body() {
        let response = hex!("8001 0000000A 00000101");
        assert_eq!(
            ResponseDecoder::new(TpmCc(0x0000_0144), &response).err(),
            Some(TpmError::Response(0x101))
        );
    }

    #[test]
    fn test_decoder_truncated_header_is_insufficient() {
        let response = hex!("8001 000000");
        assert_eq!(
            ResponseDecoder::new(TpmCc(0x0000_0144), &response).err(),
            Some(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_decoder_session_split_and_response_hash() {
        // Parameter section: TPM2B with four bytes. Authorization follows.
        let response = hex!("8002 00000019 00000000 00000006 0004 00112233 0000 01 0000");
        let delegate = StubDelegate::new(&[]);
        let mut decoder = ResponseDecoder::new(TpmCc(0x0000_017B), &response).expect("decoder");
        decoder
            .check_authorization(Some(&delegate))
            .expect("authorization");
        let digest: Tpm2bDigest = decoder.parse_parameter().expect("parameter");
        assert_eq!(digest.value(), hex!("00112233"));

        let mut expected = Sha256::new();
        expected.update(hex!("00000000"));
        expected.update(hex!("0000017B"));
        expected.update(hex!("0004 00112233"));
        assert_eq!(
            *delegate.response_hash.lock().unwrap(),
            expected.finalize().to_vec()
        );
    }

    #[test]
    fn test_decoder_session_split_overrun_is_insufficient() {
        // Parameter size claims six bytes but only two remain.
        let response = hex!("8002 00000010 00000000 00000006 0000");
        let mut decoder = ResponseDecoder::new(TpmCc(0x0000_017B), &response).expect("decoder");
        assert_eq!(decoder.check_authorization(None), Err(TpmError::Insufficient));
    }

    #[test]
    fn test_decoder_rejected_authorization() {
        let response = hex!("8002 00000015 00000000 00000002 0000 0000 01 0000");
        let mut delegate = StubDelegate::new(&[]);
        delegate.accept_response = false;
        let mut decoder = ResponseDecoder::new(TpmCc(0x0000_017B), &response).expect("decoder");
        assert_eq!(
            decoder.check_authorization(Some(&delegate)),
            Err(TpmError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_decoder_decrypts_and_reparses_marked_output() {
        let response = hex!("8002 00000019 00000000 00000006 0004 FFEEDDCC 0000 01 0000");
        let mut delegate = StubDelegate::new(&[]);
        delegate.xor_parameters = true;
        let mut decoder = ResponseDecoder::new(TpmCc(0x0000_017B), &response).expect("decoder");
        decoder
            .check_authorization(Some(&delegate))
            .expect("authorization");
        let digest: Tpm2bDigest = decoder
            .parse_encrypted_parameter(Some(&delegate))
            .expect("parameter");
        assert_eq!(digest.value(), hex!("00112233"));
    }

    #[test]
    fn test_decoder_no_sessions_skips_decrypt() {
        let response = hex!("8001 00000010 00000000 0004 00112233");
        let mut delegate = StubDelegate::new(&[]);
        delegate.xor_parameters = true;
        let mut decoder = ResponseDecoder::new(TpmCc(0x0000_017B), &response).expect("decoder");
        decoder
            .check_authorization(Some(&delegate))
            .expect("authorization");
        let digest: Tpm2bDigest = decoder
            .parse_encrypted_parameter(Some(&delegate))
            .expect("parameter");
        assert_eq!(digest.value(), hex!("00112233"));
    }
}
