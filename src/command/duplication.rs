//! Object duplication and import commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateOutput {
    pub encryption_key_out: Tpm2bData,
    pub duplicate: Tpm2bPrivate,
    pub out_sym_seed: Tpm2bEncryptedSecret,
}

pub fn build_duplicate_command(
    object_handle: TpmiDhObject,
    object_handle_name: &[u8],
    new_parent_handle: TpmiDhObject,
    new_parent_handle_name: &[u8],
    encryption_key_in: &Tpm2bData,
    symmetric_alg: &TpmtSymDefObject,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_DUPLICATE, delegate);
    command.add_handle(object_handle, object_handle_name);
    command.add_handle(new_parent_handle, new_parent_handle_name);
    command.add_encrypted_parameter(encryption_key_in)?;
    command.add_parameter(symmetric_alg)?;
    command.build()
}

pub fn parse_duplicate_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<DuplicateOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_DUPLICATE, response)?;
    decoder.check_authorization(delegate)?;
    let encryption_key_out = decoder.parse_encrypted_parameter(delegate)?;
    let duplicate = decoder.parse_parameter()?;
    let out_sym_seed = decoder.parse_parameter()?;
    Ok(DuplicateOutput {
        encryption_key_out,
        duplicate,
        out_sym_seed,
    })
}

pub fn build_import_command(
    parent_handle: TpmiDhObject,
    parent_handle_name: &[u8],
    encryption_key: &Tpm2bData,
    object_public: &Tpm2bPublic,
    duplicate: &Tpm2bPrivate,
    in_sym_seed: &Tpm2bEncryptedSecret,
    symmetric_alg: &TpmtSymDefObject,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_IMPORT, delegate);
    command.add_handle(parent_handle, parent_handle_name);
    command.add_encrypted_parameter(encryption_key)?;
    command.add_parameter(object_public)?;
    command.add_parameter(duplicate)?;
    command.add_parameter(in_sym_seed)?;
    command.add_parameter(symmetric_alg)?;
    command.build()
}

pub fn parse_import_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bPrivate> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_IMPORT, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn duplicate(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        new_parent_handle: TpmiDhObject,
        new_parent_handle_name: &[u8],
        encryption_key_in: &Tpm2bData,
        symmetric_alg: &TpmtSymDefObject,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<DuplicateOutput>,
    ) {
        let command = build_duplicate_command(
            object_handle,
            object_handle_name,
            new_parent_handle,
            new_parent_handle_name,
            encryption_key_in,
            symmetric_alg,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_duplicate_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn duplicate_sync(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        new_parent_handle: TpmiDhObject,
        new_parent_handle_name: &[u8],
        encryption_key_in: &Tpm2bData,
        symmetric_alg: &TpmtSymDefObject,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<DuplicateOutput> {
        let command = build_duplicate_command(
            object_handle,
            object_handle_name,
            new_parent_handle,
            new_parent_handle_name,
            encryption_key_in,
            symmetric_alg,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_duplicate_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn import(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        encryption_key: &Tpm2bData,
        object_public: &Tpm2bPublic,
        duplicate: &Tpm2bPrivate,
        in_sym_seed: &Tpm2bEncryptedSecret,
        symmetric_alg: &TpmtSymDefObject,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bPrivate>,
    ) {
        let command = build_import_command(
            parent_handle,
            parent_handle_name,
            encryption_key,
            object_public,
            duplicate,
            in_sym_seed,
            symmetric_alg,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_import_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn import_sync(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        encryption_key: &Tpm2bData,
        object_public: &Tpm2bPublic,
        duplicate: &Tpm2bPrivate,
        in_sym_seed: &Tpm2bEncryptedSecret,
        symmetric_alg: &TpmtSymDefObject,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bPrivate> {
        let command = build_import_command(
            parent_handle,
            parent_handle_name,
            encryption_key,
            object_public,
            duplicate,
            in_sym_seed,
            symmetric_alg,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_import_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_duplicate_wire_form() {
        let command = build_duplicate_command(
            TpmHandle(0x8000_0001),
            b"object-name",
            TpmHandle(0x8000_0002),
            b"parent-name",
            &Tpm2bData::default(),
            &TpmtSymDefObject::null(),
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 00000016 0000014B 80000001 80000002 0000 0010")
        );
    }

    #[test]
    fn test_import_wire_form() {
        let duplicate = Tpm2bPrivate::from_bytes(&hex!("0102")).expect("duplicate");
        let command = build_import_command(
            TpmHandle(0x8000_0001),
            b"parent-name",
            &Tpm2bData::default(),
            &Tpm2bPublic::default(),
            &duplicate,
            &Tpm2bEncryptedSecret::default(),
            &TpmtSymDefObject::null(),
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!(
                "8001 00000024 00000156 80000001
                 0000
                 000A 0000 0000 00000000 0000
                 0002 0102
                 0000
                 0010"
            )
        );
    }

    #[test]
    fn test_duplicate_parse() {
        let response = hex!("8001 00000014 00000000 0002 C1C2 0002 D1D2 0000");
        let output = parse_duplicate_response(&response, None).expect("parse");
        assert_eq!(output.encryption_key_out.value(), hex!("C1C2"));
        assert_eq!(output.duplicate.value(), hex!("D1D2"));
        assert!(output.out_sym_seed.is_empty());
    }
}
