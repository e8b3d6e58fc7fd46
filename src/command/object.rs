//! Object creation and management commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOutput {
    pub out_private: Tpm2bPrivate,
    pub out_public: Tpm2bPublic,
    pub creation_data: Tpm2bCreationData,
    pub creation_hash: Tpm2bDigest,
    pub creation_ticket: TpmtTkCreation,
}

pub fn build_create_command(
    parent_handle: TpmiDhObject,
    parent_handle_name: &[u8],
    in_sensitive: &Tpm2bSensitiveCreate,
    in_public: &Tpm2bPublic,
    outside_info: &Tpm2bData,
    creation_pcr: &TpmlPcrSelection,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CREATE, delegate);
    command.add_handle(parent_handle, parent_handle_name);
    command.add_encrypted_parameter(in_sensitive)?;
    command.add_parameter(in_public)?;
    command.add_parameter(outside_info)?;
    command.add_parameter(creation_pcr)?;
    command.build()
}

pub fn parse_create_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<CreateOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CREATE, response)?;
    decoder.check_authorization(delegate)?;
    let out_private = decoder.parse_encrypted_parameter(delegate)?;
    let out_public = decoder.parse_parameter()?;
    let creation_data = decoder.parse_parameter()?;
    let creation_hash = decoder.parse_parameter()?;
    let creation_ticket = decoder.parse_parameter()?;
    Ok(CreateOutput {
        out_private,
        out_public,
        creation_data,
        creation_hash,
        creation_ticket,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePrimaryOutput {
    pub object_handle: TpmHandle,
    pub out_public: Tpm2bPublic,
    pub creation_data: Tpm2bCreationData,
    pub creation_hash: Tpm2bDigest,
    pub creation_ticket: TpmtTkCreation,
    pub name: Tpm2bName,
}

pub fn build_create_primary_command(
    primary_handle: TpmiRhHierarchy,
    primary_handle_name: &[u8],
    in_sensitive: &Tpm2bSensitiveCreate,
    in_public: &Tpm2bPublic,
    outside_info: &Tpm2bData,
    creation_pcr: &TpmlPcrSelection,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CREATE_PRIMARY, delegate);
    command.add_handle(primary_handle, primary_handle_name);
    command.add_encrypted_parameter(in_sensitive)?;
    command.add_parameter(in_public)?;
    command.add_parameter(outside_info)?;
    command.add_parameter(creation_pcr)?;
    command.build()
}

pub fn parse_create_primary_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<CreatePrimaryOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CREATE_PRIMARY, response)?;
    let object_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    let out_public = decoder.parse_encrypted_parameter(delegate)?;
    let creation_data = decoder.parse_parameter()?;
    let creation_hash = decoder.parse_parameter()?;
    let creation_ticket = decoder.parse_parameter()?;
    let name = decoder.parse_parameter()?;
    Ok(CreatePrimaryOutput {
        object_handle,
        out_public,
        creation_data,
        creation_hash,
        creation_ticket,
        name,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutput {
    pub object_handle: TpmHandle,
    pub name: Tpm2bName,
}

pub fn build_load_command(
    parent_handle: TpmiDhObject,
    parent_handle_name: &[u8],
    in_private: &Tpm2bPrivate,
    in_public: &Tpm2bPublic,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_LOAD, delegate);
    command.add_handle(parent_handle, parent_handle_name);
    command.add_encrypted_parameter(in_private)?;
    command.add_parameter(in_public)?;
    command.build()
}

pub fn parse_load_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<LoadOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_LOAD, response)?;
    let object_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    let name = decoder.parse_encrypted_parameter(delegate)?;
    Ok(LoadOutput {
        object_handle,
        name,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadExternalOutput {
    pub object_handle: TpmHandle,
    pub name: Tpm2bName,
}

pub fn build_load_external_command(
    in_private: &Tpm2bSensitive,
    in_public: &Tpm2bPublic,
    hierarchy: TpmiRhHierarchy,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_LOAD_EXTERNAL, delegate);
    command.add_encrypted_parameter(in_private)?;
    command.add_parameter(in_public)?;
    command.add_parameter(&hierarchy)?;
    command.build()
}

pub fn parse_load_external_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<LoadExternalOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_LOAD_EXTERNAL, response)?;
    let object_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    let name = decoder.parse_encrypted_parameter(delegate)?;
    Ok(LoadExternalOutput {
        object_handle,
        name,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadPublicOutput {
    pub out_public: Tpm2bPublic,
    pub name: Tpm2bName,
    pub qualified_name: Tpm2bName,
}

pub fn build_read_public_command(
    object_handle: TpmiDhObject,
    object_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_READ_PUBLIC, delegate);
    command.add_handle(object_handle, object_handle_name);
    command.build()
}

pub fn parse_read_public_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<ReadPublicOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_READ_PUBLIC, response)?;
    decoder.check_authorization(delegate)?;
    let out_public = decoder.parse_encrypted_parameter(delegate)?;
    let name = decoder.parse_parameter()?;
    let qualified_name = decoder.parse_parameter()?;
    Ok(ReadPublicOutput {
        out_public,
        name,
        qualified_name,
    })
}

pub fn build_unseal_command(
    item_handle: TpmiDhObject,
    item_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_UNSEAL, delegate);
    command.add_handle(item_handle, item_handle_name);
    command.build()
}

pub fn parse_unseal_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bSensitiveData> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_UNSEAL, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

pub fn build_object_change_auth_command(
    object_handle: TpmiDhObject,
    object_handle_name: &[u8],
    parent_handle: TpmiDhObject,
    parent_handle_name: &[u8],
    new_auth: &Tpm2bAuth,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_OBJECT_CHANGE_AUTH, delegate);
    command.add_handle(object_handle, object_handle_name);
    command.add_handle(parent_handle, parent_handle_name);
    command.add_encrypted_parameter(new_auth)?;
    command.build()
}

pub fn parse_object_change_auth_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bPrivate> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_OBJECT_CHANGE_AUTH, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        in_sensitive: &Tpm2bSensitiveCreate,
        in_public: &Tpm2bPublic,
        outside_info: &Tpm2bData,
        creation_pcr: &TpmlPcrSelection,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<CreateOutput>,
    ) {
        let command = build_create_command(
            parent_handle,
            parent_handle_name,
            in_sensitive,
            in_public,
            outside_info,
            creation_pcr,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_create_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_sync(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        in_sensitive: &Tpm2bSensitiveCreate,
        in_public: &Tpm2bPublic,
        outside_info: &Tpm2bData,
        creation_pcr: &TpmlPcrSelection,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<CreateOutput> {
        let command = build_create_command(
            parent_handle,
            parent_handle_name,
            in_sensitive,
            in_public,
            outside_info,
            creation_pcr,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_create_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_primary(
        &self,
        primary_handle: TpmiRhHierarchy,
        primary_handle_name: &[u8],
        in_sensitive: &Tpm2bSensitiveCreate,
        in_public: &Tpm2bPublic,
        outside_info: &Tpm2bData,
        creation_pcr: &TpmlPcrSelection,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<CreatePrimaryOutput>,
    ) {
        let command = build_create_primary_command(
            primary_handle,
            primary_handle_name,
            in_sensitive,
            in_public,
            outside_info,
            creation_pcr,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_create_primary_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_primary_sync(
        &self,
        primary_handle: TpmiRhHierarchy,
        primary_handle_name: &[u8],
        in_sensitive: &Tpm2bSensitiveCreate,
        in_public: &Tpm2bPublic,
        outside_info: &Tpm2bData,
        creation_pcr: &TpmlPcrSelection,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<CreatePrimaryOutput> {
        let command = build_create_primary_command(
            primary_handle,
            primary_handle_name,
            in_sensitive,
            in_public,
            outside_info,
            creation_pcr,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_create_primary_response(&response, delegate)
    }

    pub fn load(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        in_private: &Tpm2bPrivate,
        in_public: &Tpm2bPublic,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<LoadOutput>,
    ) {
        let command = build_load_command(
            parent_handle,
            parent_handle_name,
            in_private,
            in_public,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_load_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn load_sync(
        &self,
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        in_private: &Tpm2bPrivate,
        in_public: &Tpm2bPublic,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<LoadOutput> {
        let command =
            build_load_command(parent_handle, parent_handle_name, in_private, in_public, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_load_response(&response, delegate)
    }

    pub fn load_external(
        &self,
        in_private: &Tpm2bSensitive,
        in_public: &Tpm2bPublic,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<LoadExternalOutput>,
    ) {
        let command =
            build_load_external_command(in_private, in_public, hierarchy, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_load_external_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn load_external_sync(
        &self,
        in_private: &Tpm2bSensitive,
        in_public: &Tpm2bPublic,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<LoadExternalOutput> {
        let command = build_load_external_command(in_private, in_public, hierarchy, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_load_external_response(&response, delegate)
    }

    pub fn read_public(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<ReadPublicOutput>,
    ) {
        let command =
            build_read_public_command(object_handle, object_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_read_public_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn read_public_sync(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<ReadPublicOutput> {
        let command = build_read_public_command(object_handle, object_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_read_public_response(&response, delegate)
    }

    pub fn unseal(
        &self,
        item_handle: TpmiDhObject,
        item_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bSensitiveData>,
    ) {
        let command = build_unseal_command(item_handle, item_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_unseal_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn unseal_sync(
        &self,
        item_handle: TpmiDhObject,
        item_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bSensitiveData> {
        let command = build_unseal_command(item_handle, item_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_unseal_response(&response, delegate)
    }

    pub fn object_change_auth(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        new_auth: &Tpm2bAuth,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bPrivate>,
    ) {
        let command = build_object_change_auth_command(
            object_handle,
            object_handle_name,
            parent_handle,
            parent_handle_name,
            new_auth,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_object_change_auth_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn object_change_auth_sync(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        parent_handle: TpmiDhObject,
        parent_handle_name: &[u8],
        new_auth: &Tpm2bAuth,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bPrivate> {
        let command = build_object_change_auth_command(
            object_handle,
            object_handle_name,
            parent_handle,
            parent_handle_name,
            new_auth,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_object_change_auth_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::WireType;
    use hex_literal::hex;

    #[test]
    fn test_read_public_wire_form() {
        let command =
            build_read_public_command(TpmHandle(0x8000_0001), b"name-bytes", None).expect("build");
        assert_eq!(command, hex!("8001 0000000E 00000173 80000001"));
    }

    #[test]
    fn test_load_parses_handle_before_parameters() {
        // objectHandle, then name in the parameter area.
        let response = hex!("8001 00000014 00000000 80000002 0004 000B AABB");
        let output = parse_load_response(&response, None).expect("parse");
        assert_eq!(output.object_handle, TpmHandle(0x8000_0002));
        assert_eq!(output.name.value(), hex!("000B AABB"));
    }

    #[test]
    fn test_create_command_parameter_order() {
        let in_sensitive = Tpm2bSensitiveCreate::new(TpmsSensitiveCreate {
            user_auth: Tpm2bAuth::from_bytes(b"pw").expect("auth"),
            data: Tpm2bSensitiveData::default(),
        });
        let in_public = Tpm2bPublic::default();
        let outside_info = Tpm2bData::default();
        let creation_pcr = TpmlPcrSelection::default();
        let command = build_create_command(
            TpmHandle(0x8000_0000),
            b"",
            &in_sensitive,
            &in_public,
            &outside_info,
            &creation_pcr,
            None,
        )
        .expect("build");

        let mut expected = Vec::new();
        in_sensitive.serialize(&mut expected).expect("serialize");
        in_public.serialize(&mut expected).expect("serialize");
        outside_info.serialize(&mut expected).expect("serialize");
        creation_pcr.serialize(&mut expected).expect("serialize");
        assert_eq!(&command[14..], &expected[..]);
    }
}
