//! Policy assertion commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_policy_pcr_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    pcr_digest: &Tpm2bDigest,
    pcrs: &TpmlPcrSelection,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_PCR, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.add_encrypted_parameter(pcr_digest)?;
    command.add_parameter(pcrs)?;
    command.build()
}

pub fn parse_policy_pcr_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_PCR, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_policy_or_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    p_hash_list: &TpmlDigest,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_OR, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.add_parameter(p_hash_list)?;
    command.build()
}

pub fn parse_policy_or_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_OR, response)?;
    decoder.check_authorization(delegate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySecretOutput {
    pub timeout: Tpm2bTimeout,
    pub policy_ticket: TpmtTkAuth,
}

#[allow(clippy::too_many_arguments)]
pub fn build_policy_secret_command(
    auth_handle: TpmiDhEntity,
    auth_handle_name: &[u8],
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    nonce_tpm: &Tpm2bNonce,
    cp_hash_a: &Tpm2bDigest,
    policy_ref: &Tpm2bNonce,
    expiration: i32,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_SECRET, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(policy_session, policy_session_name);
    command.add_encrypted_parameter(nonce_tpm)?;
    command.add_parameter(cp_hash_a)?;
    command.add_parameter(policy_ref)?;
    command.add_parameter(&expiration)?;
    command.build()
}

pub fn parse_policy_secret_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<PolicySecretOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_SECRET, response)?;
    decoder.check_authorization(delegate)?;
    let timeout = decoder.parse_encrypted_parameter(delegate)?;
    let policy_ticket = decoder.parse_parameter()?;
    Ok(PolicySecretOutput {
        timeout,
        policy_ticket,
    })
}

pub fn build_policy_auth_value_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_AUTH_VALUE, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.build()
}

pub fn parse_policy_auth_value_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_AUTH_VALUE, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_policy_password_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_PASSWORD, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.build()
}

pub fn parse_policy_password_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_PASSWORD, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_policy_command_code_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    code: TpmCc,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_COMMAND_CODE, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.add_parameter(&code)?;
    command.build()
}

pub fn parse_policy_command_code_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_COMMAND_CODE, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_policy_get_digest_command(
    policy_session: TpmiShPolicy,
    policy_session_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_POLICY_GET_DIGEST, delegate);
    command.add_handle(policy_session, policy_session_name);
    command.build()
}

pub fn parse_policy_get_digest_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bDigest> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_POLICY_GET_DIGEST, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

impl Tpm {
    pub fn policy_pcr(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        pcr_digest: &Tpm2bDigest,
        pcrs: &TpmlPcrSelection,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_policy_pcr_command(
            policy_session,
            policy_session_name,
            pcr_digest,
            pcrs,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_pcr_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_pcr_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        pcr_digest: &Tpm2bDigest,
        pcrs: &TpmlPcrSelection,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_policy_pcr_command(
            policy_session,
            policy_session_name,
            pcr_digest,
            pcrs,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_pcr_response(&response, delegate)
    }

    pub fn policy_or(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        p_hash_list: &TpmlDigest,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_policy_or_command(
            policy_session,
            policy_session_name,
            p_hash_list,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_or_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_or_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        p_hash_list: &TpmlDigest,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_policy_or_command(policy_session, policy_session_name, p_hash_list, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_or_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn policy_secret(
        &self,
        auth_handle: TpmiDhEntity,
        auth_handle_name: &[u8],
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        nonce_tpm: &Tpm2bNonce,
        cp_hash_a: &Tpm2bDigest,
        policy_ref: &Tpm2bNonce,
        expiration: i32,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<PolicySecretOutput>,
    ) {
        let command = build_policy_secret_command(
            auth_handle,
            auth_handle_name,
            policy_session,
            policy_session_name,
            nonce_tpm,
            cp_hash_a,
            policy_ref,
            expiration,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_secret_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn policy_secret_sync(
        &self,
        auth_handle: TpmiDhEntity,
        auth_handle_name: &[u8],
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        nonce_tpm: &Tpm2bNonce,
        cp_hash_a: &Tpm2bDigest,
        policy_ref: &Tpm2bNonce,
        expiration: i32,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<PolicySecretOutput> {
        let command = build_policy_secret_command(
            auth_handle,
            auth_handle_name,
            policy_session,
            policy_session_name,
            nonce_tpm,
            cp_hash_a,
            policy_ref,
            expiration,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_secret_response(&response, delegate)
    }

    pub fn policy_auth_value(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_policy_auth_value_command(
            policy_session,
            policy_session_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_auth_value_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_auth_value_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_policy_auth_value_command(policy_session, policy_session_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_auth_value_response(&response, delegate)
    }

    pub fn policy_password(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command =
            build_policy_password_command(policy_session, policy_session_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_policy_password_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_password_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_policy_password_command(policy_session, policy_session_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_password_response(&response, delegate)
    }

    pub fn policy_command_code(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        code: TpmCc,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_policy_command_code_command(
            policy_session,
            policy_session_name,
            code,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_command_code_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_command_code_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        code: TpmCc,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_policy_command_code_command(policy_session, policy_session_name, code, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_command_code_response(&response, delegate)
    }

    pub fn policy_get_digest(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bDigest>,
    ) {
        let command = build_policy_get_digest_command(
            policy_session,
            policy_session_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_policy_get_digest_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn policy_get_digest_sync(
        &self,
        policy_session: TpmiShPolicy,
        policy_session_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bDigest> {
        let command =
            build_policy_get_digest_command(policy_session, policy_session_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_policy_get_digest_response(&response, delegate)
    }
}
