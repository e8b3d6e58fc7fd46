//! Credential protection commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakeCredentialOutput {
    pub credential_blob: Tpm2bIdObject,
    pub secret: Tpm2bEncryptedSecret,
}

pub fn build_make_credential_command(
    handle: TpmiDhObject,
    handle_name: &[u8],
    credential: &Tpm2bDigest,
    object_name: &Tpm2bName,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_MAKE_CREDENTIAL, delegate);
    command.add_handle(handle, handle_name);
    command.add_encrypted_parameter(credential)?;
    command.add_parameter(object_name)?;
    command.build()
}

pub fn parse_make_credential_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<MakeCredentialOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_MAKE_CREDENTIAL, response)?;
    decoder.check_authorization(delegate)?;
    let credential_blob = decoder.parse_encrypted_parameter(delegate)?;
    let secret = decoder.parse_parameter()?;
    Ok(MakeCredentialOutput {
        credential_blob,
        secret,
    })
}

pub fn build_activate_credential_command(
    activate_handle: TpmiDhObject,
    activate_handle_name: &[u8],
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    credential_blob: &Tpm2bIdObject,
    secret: &Tpm2bEncryptedSecret,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_ACTIVATE_CREDENTIAL, delegate);
    command.add_handle(activate_handle, activate_handle_name);
    command.add_handle(key_handle, key_handle_name);
    command.add_encrypted_parameter(credential_blob)?;
    command.add_parameter(secret)?;
    command.build()
}

pub fn parse_activate_credential_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bDigest> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_ACTIVATE_CREDENTIAL, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

impl Tpm {
    pub fn make_credential(
        &self,
        handle: TpmiDhObject,
        handle_name: &[u8],
        credential: &Tpm2bDigest,
        object_name: &Tpm2bName,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<MakeCredentialOutput>,
    ) {
        let command = build_make_credential_command(
            handle,
            handle_name,
            credential,
            object_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_make_credential_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn make_credential_sync(
        &self,
        handle: TpmiDhObject,
        handle_name: &[u8],
        credential: &Tpm2bDigest,
        object_name: &Tpm2bName,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<MakeCredentialOutput> {
        let command =
            build_make_credential_command(handle, handle_name, credential, object_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_make_credential_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn activate_credential(
        &self,
        activate_handle: TpmiDhObject,
        activate_handle_name: &[u8],
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        credential_blob: &Tpm2bIdObject,
        secret: &Tpm2bEncryptedSecret,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bDigest>,
    ) {
        let command = build_activate_credential_command(
            activate_handle,
            activate_handle_name,
            key_handle,
            key_handle_name,
            credential_blob,
            secret,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_activate_credential_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn activate_credential_sync(
        &self,
        activate_handle: TpmiDhObject,
        activate_handle_name: &[u8],
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        credential_blob: &Tpm2bIdObject,
        secret: &Tpm2bEncryptedSecret,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bDigest> {
        let command = build_activate_credential_command(
            activate_handle,
            activate_handle_name,
            key_handle,
            key_handle_name,
            credential_blob,
            secret,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_activate_credential_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_make_credential_wire_form() {
        let credential = Tpm2bDigest::from_bytes(&hex!("DEADBEEF")).expect("credential");
        let object_name = Tpm2bName::from_bytes(&hex!("000BAABB")).expect("name");
        let command = build_make_credential_command(
            TpmHandle(0x8000_0001),
            b"key-name",
            &credential,
            &object_name,
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 0000001A 00000168 80000001 0004 DEADBEEF 0004 000BAABB")
        );
    }

    #[test]
    fn test_activate_credential_wire_form() {
        let credential_blob = Tpm2bIdObject::from_bytes(&hex!("0102")).expect("blob");
        let secret = Tpm2bEncryptedSecret::from_bytes(&hex!("0304")).expect("secret");
        let command = build_activate_credential_command(
            TpmHandle(0x8000_0001),
            b"activate-name",
            TpmHandle(0x8000_0002),
            b"key-name",
            &credential_blob,
            &secret,
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 0000001A 00000147 80000001 80000002 0002 0102 0002 0304")
        );
    }

    #[test]
    fn test_make_credential_parse() {
        let response = hex!("8001 00000012 00000000 0002 A1A2 0002 B1B2");
        let output = parse_make_credential_response(&response, None).expect("parse");
        assert_eq!(output.credential_blob.value(), hex!("A1A2"));
        assert_eq!(output.secret.value(), hex!("B1B2"));
    }
}
