//! Session management commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartAuthSessionOutput {
    pub session_handle: TpmHandle,
    pub nonce_tpm: Tpm2bNonce,
}

#[allow(clippy::too_many_arguments)]
pub fn build_start_auth_session_command(
    tpm_key: TpmiDhObjectOrNull,
    tpm_key_name: &[u8],
    bind: TpmiDhEntity,
    bind_name: &[u8],
    nonce_caller: &Tpm2bNonce,
    encrypted_salt: &Tpm2bEncryptedSecret,
    session_type: TpmSe,
    symmetric: &TpmtSymDef,
    auth_hash: TpmiAlgHash,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_START_AUTH_SESSION, delegate);
    command.add_handle(tpm_key, tpm_key_name);
    command.add_handle(bind, bind_name);
    command.add_encrypted_parameter(nonce_caller)?;
    command.add_parameter(encrypted_salt)?;
    command.add_parameter(&session_type)?;
    command.add_parameter(symmetric)?;
    command.add_parameter(&auth_hash)?;
    command.build()
}

pub fn parse_start_auth_session_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<StartAuthSessionOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_START_AUTH_SESSION, response)?;
    let session_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    let nonce_tpm = decoder.parse_encrypted_parameter(delegate)?;
    Ok(StartAuthSessionOutput {
        session_handle,
        nonce_tpm,
    })
}

pub fn build_policy_restart_command(
    session_handle: TpmiShPolicy,
    session_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_RESTART, delegate);
    command.add_handle(session_handle, session_handle_name);
    command.build()
}

pub fn parse_policy_restart_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_RESTART, response)?;
    decoder.check_authorization(delegate)
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn start_auth_session(
        &self,
        tpm_key: TpmiDhObjectOrNull,
        tpm_key_name: &[u8],
        bind: TpmiDhEntity,
        bind_name: &[u8],
        nonce_caller: &Tpm2bNonce,
        encrypted_salt: &Tpm2bEncryptedSecret,
        session_type: TpmSe,
        symmetric: &TpmtSymDef,
        auth_hash: TpmiAlgHash,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<StartAuthSessionOutput>,
    ) {
        let command = build_start_auth_session_command(
            tpm_key,
            tpm_key_name,
            bind,
            bind_name,
            nonce_caller,
            encrypted_salt,
            session_type,
            symmetric,
            auth_hash,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_start_auth_session_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_auth_session_sync(
        &self,
        tpm_key: TpmiDhObjectOrNull,
        tpm_key_name: &[u8],
        bind: TpmiDhEntity,
        bind_name: &[u8],
        nonce_caller: &Tpm2bNonce,
        encrypted_salt: &Tpm2bEncryptedSecret,
        session_type: TpmSe,
        symmetric: &TpmtSymDef,
        auth_hash: TpmiAlgHash,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<StartAuthSessionOutput> {
        let command = build_start_auth_session_command(
            tpm_key,
            tpm_key_name,
            bind,
            bind_name,
            nonce_caller,
            encrypted_salt,
            session_type,
            symmetric,
            auth_hash,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_start_auth_session_response(&response, delegate)
    }

    pub fn policy_restart(
        &self,
        session_handle: TpmiShPolicy,
        session_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command =
            build_policy_restart_command(session_handle, session_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_policy_restart_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_restart_sync(
        &self,
        session_handle: TpmiShPolicy,
        session_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_policy_restart_command(session_handle, session_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_restart_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_start_auth_session_wire_form() {
        let nonce = Tpm2bNonce::from_bytes(&[0x5A; 16]).expect("nonce");
        let command = build_start_auth_session_command(
            TPM2_RH_NULL,
            b"",
            TPM2_RH_NULL,
            b"",
            &nonce,
            &Tpm2bEncryptedSecret::default(),
            TPM2_SE_HMAC,
            &TpmtSymDef::null(),
            TPM2_ALG_SHA256,
            None,
        )
        .expect("build");
        // tag, size, code, two handles.
        assert_eq!(&command[..18], hex!("8001 0000002B 00000176 40000007 40000007"));
        // nonceCaller, empty salt, HMAC session, null symmetric, SHA-256.
        assert_eq!(&command[18..20], hex!("0010"));
        assert_eq!(&command[36..], hex!("0000 00 0010 000B"));
    }

    #[test]
    fn test_start_auth_session_parse() {
        let response = hex!("8001 00000020 00000000 03000000 0010 A5A5A5A5A5A5A5A5A5A5A5A5A5A5A5A5");
        let output = parse_start_auth_session_response(&response, None).expect("parse");
        assert_eq!(output.session_handle, TpmHandle(0x0300_0000));
        assert_eq!(output.nonce_tpm.size, 16);
        assert!(output.nonce_tpm.value().iter().all(|&b| b == 0xA5));
    }
}
