//! Asymmetric and symmetric data-path commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_rsa_encrypt_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    message: &Tpm2bPublicKeyRsa,
    in_scheme: &TpmtRsaDecrypt,
    label: &Tpm2bData,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_RSA_ENCRYPT, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.add_encrypted_parameter(message)?;
    command.add_parameter(in_scheme)?;
    command.add_parameter(label)?;
    command.build()
}

pub fn parse_rsa_encrypt_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bPublicKeyRsa> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_RSA_ENCRYPT, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

pub fn build_rsa_decrypt_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    cipher_text: &Tpm2bPublicKeyRsa,
    in_scheme: &TpmtRsaDecrypt,
    label: &Tpm2bData,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_RSA_DECRYPT, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.add_encrypted_parameter(cipher_text)?;
    command.add_parameter(in_scheme)?;
    command.add_parameter(label)?;
    command.build()
}

pub fn parse_rsa_decrypt_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bPublicKeyRsa> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_RSA_DECRYPT, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EcdhKeyGenOutput {
    pub z_point: Tpm2bEccPoint,
    pub pub_point: Tpm2bEccPoint,
}

pub fn build_ecdh_key_gen_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_ECDH_KEY_GEN, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.build()
}

pub fn parse_ecdh_key_gen_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<EcdhKeyGenOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_ECDH_KEY_GEN, response)?;
    decoder.check_authorization(delegate)?;
    let z_point = decoder.parse_encrypted_parameter(delegate)?;
    let pub_point = decoder.parse_parameter()?;
    Ok(EcdhKeyGenOutput { z_point, pub_point })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptDecryptOutput {
    pub out_data: Tpm2bMaxBuffer,
    pub iv_out: Tpm2bIv,
}

/// The leading yes/no flag keeps this command's first parameter from being a
/// sized buffer, so no command-parameter encryption is possible.
pub fn build_encrypt_decrypt_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    decrypt: TpmiYesNo,
    mode: TpmiAlgSymMode,
    iv_in: &Tpm2bIv,
    in_data: &Tpm2bMaxBuffer,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_ENCRYPT_DECRYPT, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.add_parameter(&decrypt)?;
    command.add_parameter(&mode)?;
    command.add_parameter(iv_in)?;
    command.add_parameter(in_data)?;
    command.build()
}

pub fn parse_encrypt_decrypt_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<EncryptDecryptOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_ENCRYPT_DECRYPT, response)?;
    decoder.check_authorization(delegate)?;
    let out_data = decoder.parse_encrypted_parameter(delegate)?;
    let iv_out = decoder.parse_parameter()?;
    Ok(EncryptDecryptOutput { out_data, iv_out })
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn rsa_encrypt(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        message: &Tpm2bPublicKeyRsa,
        in_scheme: &TpmtRsaDecrypt,
        label: &Tpm2bData,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bPublicKeyRsa>,
    ) {
        let command = build_rsa_encrypt_command(
            key_handle,
            key_handle_name,
            message,
            in_scheme,
            label,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_rsa_encrypt_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn rsa_encrypt_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        message: &Tpm2bPublicKeyRsa,
        in_scheme: &TpmtRsaDecrypt,
        label: &Tpm2bData,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bPublicKeyRsa> {
        let command = build_rsa_encrypt_command(
            key_handle,
            key_handle_name,
            message,
            in_scheme,
            label,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_rsa_encrypt_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rsa_decrypt(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        cipher_text: &Tpm2bPublicKeyRsa,
        in_scheme: &TpmtRsaDecrypt,
        label: &Tpm2bData,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bPublicKeyRsa>,
    ) {
        let command = build_rsa_decrypt_command(
            key_handle,
            key_handle_name,
            cipher_text,
            in_scheme,
            label,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_rsa_decrypt_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn rsa_decrypt_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        cipher_text: &Tpm2bPublicKeyRsa,
        in_scheme: &TpmtRsaDecrypt,
        label: &Tpm2bData,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bPublicKeyRsa> {
        let command = build_rsa_decrypt_command(
            key_handle,
            key_handle_name,
            cipher_text,
            in_scheme,
            label,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_rsa_decrypt_response(&response, delegate)
    }

    pub fn ecdh_key_gen(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<EcdhKeyGenOutput>,
    ) {
        let command = build_ecdh_key_gen_command(key_handle, key_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_ecdh_key_gen_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn ecdh_key_gen_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<EcdhKeyGenOutput> {
        let command = build_ecdh_key_gen_command(key_handle, key_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_ecdh_key_gen_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn encrypt_decrypt(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        decrypt: TpmiYesNo,
        mode: TpmiAlgSymMode,
        iv_in: &Tpm2bIv,
        in_data: &Tpm2bMaxBuffer,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<EncryptDecryptOutput>,
    ) {
        let command = build_encrypt_decrypt_command(
            key_handle,
            key_handle_name,
            decrypt,
            mode,
            iv_in,
            in_data,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_encrypt_decrypt_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn encrypt_decrypt_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        decrypt: TpmiYesNo,
        mode: TpmiAlgSymMode,
        iv_in: &Tpm2bIv,
        in_data: &Tpm2bMaxBuffer,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<EncryptDecryptOutput> {
        let command = build_encrypt_decrypt_command(
            key_handle,
            key_handle_name,
            decrypt,
            mode,
            iv_in,
            in_data,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_encrypt_decrypt_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_rsa_encrypt_wire_form() {
        let message = Tpm2bPublicKeyRsa::from_bytes(&hex!("0102")).expect("message");
        let command = build_rsa_encrypt_command(
            TpmHandle(0x8000_0003),
            b"",
            &message,
            &TpmtRsaDecrypt::null(),
            &Tpm2bData::default(),
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 00000016 00000174 80000003 0002 0102 0010 0000")
        );
    }
}
