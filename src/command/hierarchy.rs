//! Hierarchy administration commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_clear_command(
    auth_handle: TpmiRhClear,
    auth_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CLEAR, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.build()
}

pub fn parse_clear_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CLEAR, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_clear_control_command(
    auth: TpmiRhClear,
    auth_name: &[u8],
    disable: TpmiYesNo,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CLEAR_CONTROL, delegate);
    command.add_handle(auth, auth_name);
    command.add_parameter(&disable)?;
    command.build()
}

pub fn parse_clear_control_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CLEAR_CONTROL, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_hierarchy_change_auth_command(
    auth_handle: TpmiRhHierarchyAuth,
    auth_handle_name: &[u8],
    new_auth: &Tpm2bAuth,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_HIERARCHY_CHANGE_AUTH, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_encrypted_parameter(new_auth)?;
    command.build()
}

pub fn parse_hierarchy_change_auth_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_HIERARCHY_CHANGE_AUTH, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_dictionary_attack_lock_reset_command(
    lock_handle: TpmiRhLockout,
    lock_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_DICTIONARY_ATTACK_LOCK_RESET, delegate);
    command.add_handle(lock_handle, lock_handle_name);
    command.build()
}

pub fn parse_dictionary_attack_lock_reset_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_DICTIONARY_ATTACK_LOCK_RESET, response)?;
    decoder.check_authorization(delegate)
}

impl Tpm {
    pub fn clear(
        &self,
        auth_handle: TpmiRhClear,
        auth_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_clear_command(auth_handle, auth_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_clear_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn clear_sync(
        &self,
        auth_handle: TpmiRhClear,
        auth_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_clear_command(auth_handle, auth_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_clear_response(&response, delegate)
    }

    pub fn clear_control(
        &self,
        auth: TpmiRhClear,
        auth_name: &[u8],
        disable: TpmiYesNo,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_clear_control_command(auth, auth_name, disable, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_clear_control_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn clear_control_sync(
        &self,
        auth: TpmiRhClear,
        auth_name: &[u8],
        disable: TpmiYesNo,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_clear_control_command(auth, auth_name, disable, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_clear_control_response(&response, delegate)
    }

    pub fn hierarchy_change_auth(
        &self,
        auth_handle: TpmiRhHierarchyAuth,
        auth_handle_name: &[u8],
        new_auth: &Tpm2bAuth,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_hierarchy_change_auth_command(
            auth_handle,
            auth_handle_name,
            new_auth,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_hierarchy_change_auth_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn hierarchy_change_auth_sync(
        &self,
        auth_handle: TpmiRhHierarchyAuth,
        auth_handle_name: &[u8],
        new_auth: &Tpm2bAuth,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_hierarchy_change_auth_command(auth_handle, auth_handle_name, new_auth, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_hierarchy_change_auth_response(&response, delegate)
    }

    pub fn dictionary_attack_lock_reset(
        &self,
        lock_handle: TpmiRhLockout,
        lock_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_dictionary_attack_lock_reset_command(
            lock_handle,
            lock_handle_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| {
                parse_dictionary_attack_lock_reset_response(response, delegate.as_deref())
            },
            on_complete,
        );
    }

    pub fn dictionary_attack_lock_reset_sync(
        &self,
        lock_handle: TpmiRhLockout,
        lock_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_dictionary_attack_lock_reset_command(lock_handle, lock_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_dictionary_attack_lock_reset_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_clear_wire_form() {
        let command = build_clear_command(TPM2_RH_LOCKOUT, b"", None).expect("build");
        assert_eq!(command, hex!("8001 0000000E 00000126 4000000A"));
    }

    #[test]
    fn test_hierarchy_change_auth_wire_form() {
        let new_auth = Tpm2bAuth::from_bytes(b"pw").expect("auth");
        let command =
            build_hierarchy_change_auth_command(TPM2_RH_OWNER, b"", &new_auth, None).expect("build");
        assert_eq!(command, hex!("8001 00000012 00000129 40000001 0002 7077"));
    }
}
