//! Non-volatile storage commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_nv_define_space_command(
    auth_handle: TpmiRhProvision,
    auth_handle_name: &[u8],
    auth: &Tpm2bAuth,
    public_info: &Tpm2bNvPublic,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_DEFINE_SPACE, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_encrypted_parameter(auth)?;
    command.add_parameter(public_info)?;
    command.build()
}

pub fn parse_nv_define_space_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_DEFINE_SPACE, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_nv_undefine_space_command(
    auth_handle: TpmiRhProvision,
    auth_handle_name: &[u8],
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_UNDEFINE_SPACE, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(nv_index, nv_index_name);
    command.build()
}

pub fn parse_nv_undefine_space_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_UNDEFINE_SPACE, response)?;
    decoder.check_authorization(delegate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvReadPublicOutput {
    pub nv_public: Tpm2bNvPublic,
    pub nv_name: Tpm2bName,
}

pub fn build_nv_read_public_command(
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_READ_PUBLIC, delegate);
    command.add_handle(nv_index, nv_index_name);
    command.build()
}

pub fn parse_nv_read_public_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<NvReadPublicOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_READ_PUBLIC, response)?;
    decoder.check_authorization(delegate)?;
    let nv_public = decoder.parse_encrypted_parameter(delegate)?;
    let nv_name = decoder.parse_parameter()?;
    Ok(NvReadPublicOutput { nv_public, nv_name })
}

#[allow(clippy::too_many_arguments)]
pub fn build_nv_write_command(
    auth_handle: TpmiRhNvAuth,
    auth_handle_name: &[u8],
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    data: &Tpm2bMaxNvBuffer,
    offset: u16,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_WRITE, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(nv_index, nv_index_name);
    command.add_encrypted_parameter(data)?;
    command.add_parameter(&offset)?;
    command.build()
}

pub fn parse_nv_write_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_WRITE, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_nv_increment_command(
    auth_handle: TpmiRhNvAuth,
    auth_handle_name: &[u8],
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_INCREMENT, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(nv_index, nv_index_name);
    command.build()
}

pub fn parse_nv_increment_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_INCREMENT, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_nv_extend_command(
    auth_handle: TpmiRhNvAuth,
    auth_handle_name: &[u8],
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    data: &Tpm2bMaxNvBuffer,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_EXTEND, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(nv_index, nv_index_name);
    command.add_encrypted_parameter(data)?;
    command.build()
}

pub fn parse_nv_extend_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_EXTEND, response)?;
    decoder.check_authorization(delegate)
}

#[allow(clippy::too_many_arguments)]
pub fn build_nv_read_command(
    auth_handle: TpmiRhNvAuth,
    auth_handle_name: &[u8],
    nv_index: TpmiRhNvIndex,
    nv_index_name: &[u8],
    size: u16,
    offset: u16,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_NV_READ, delegate);
    command.add_handle(auth_handle, auth_handle_name);
    command.add_handle(nv_index, nv_index_name);
    command.add_parameter(&size)?;
    command.add_parameter(&offset)?;
    command.build()
}

pub fn parse_nv_read_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bMaxNvBuffer> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_NV_READ, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

impl Tpm {
    pub fn nv_define_space(
        &self,
        auth_handle: TpmiRhProvision,
        auth_handle_name: &[u8],
        auth: &Tpm2bAuth,
        public_info: &Tpm2bNvPublic,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_nv_define_space_command(
            auth_handle,
            auth_handle_name,
            auth,
            public_info,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_define_space_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn nv_define_space_sync(
        &self,
        auth_handle: TpmiRhProvision,
        auth_handle_name: &[u8],
        auth: &Tpm2bAuth,
        public_info: &Tpm2bNvPublic,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_nv_define_space_command(
            auth_handle,
            auth_handle_name,
            auth,
            public_info,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_define_space_response(&response, delegate)
    }

    pub fn nv_undefine_space(
        &self,
        auth_handle: TpmiRhProvision,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_nv_undefine_space_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_undefine_space_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn nv_undefine_space_sync(
        &self,
        auth_handle: TpmiRhProvision,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_nv_undefine_space_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_undefine_space_response(&response, delegate)
    }

    pub fn nv_read_public(
        &self,
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<NvReadPublicOutput>,
    ) {
        let command = build_nv_read_public_command(nv_index, nv_index_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_nv_read_public_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn nv_read_public_sync(
        &self,
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<NvReadPublicOutput> {
        let command = build_nv_read_public_command(nv_index, nv_index_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_read_public_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn nv_write(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        data: &Tpm2bMaxNvBuffer,
        offset: u16,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_nv_write_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            data,
            offset,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_write_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn nv_write_sync(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        data: &Tpm2bMaxNvBuffer,
        offset: u16,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_nv_write_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            data,
            offset,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_write_response(&response, delegate)
    }

    pub fn nv_increment(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_nv_increment_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_increment_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn nv_increment_sync(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_nv_increment_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_increment_response(&response, delegate)
    }

    pub fn nv_extend(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        data: &Tpm2bMaxNvBuffer,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_nv_extend_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            data,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_extend_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn nv_extend_sync(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        data: &Tpm2bMaxNvBuffer,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_nv_extend_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            data,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_extend_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn nv_read(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        size: u16,
        offset: u16,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bMaxNvBuffer>,
    ) {
        let command = build_nv_read_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            size,
            offset,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_nv_read_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn nv_read_sync(
        &self,
        auth_handle: TpmiRhNvAuth,
        auth_handle_name: &[u8],
        nv_index: TpmiRhNvIndex,
        nv_index_name: &[u8],
        size: u16,
        offset: u16,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bMaxNvBuffer> {
        let command = build_nv_read_command(
            auth_handle,
            auth_handle_name,
            nv_index,
            nv_index_name,
            size,
            offset,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_nv_read_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_nv_read_wire_form() {
        let command = build_nv_read_command(
            TpmHandle(0x0150_0001),
            b"nv-auth-name",
            TpmHandle(0x0150_0001),
            b"nv-index-name",
            8,
            0,
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 00000016 0000014E 01500001 01500001 0008 0000")
        );
    }

    #[test]
    fn test_nv_read_parse() {
        let response = hex!("8001 00000014 00000000 0008 0000000000000005");
        let data = parse_nv_read_response(&response, None).expect("parse");
        assert_eq!(data.value(), hex!("0000000000000005"));
    }

    #[test]
    fn test_nv_define_space_wire_form() {
        let public_info = Tpm2bNvPublic::new(TpmsNvPublic {
            nv_index: TpmHandle(0x0150_0001),
            name_alg: TPM2_ALG_SHA256,
            attributes: TpmaNv::COUNTER | TpmaNv::OWNERWRITE | TpmaNv::OWNERREAD,
            auth_policy: Tpm2bDigest::default(),
            data_size: 8,
        });
        let command = build_nv_define_space_command(
            TPM2_RH_OWNER,
            b"",
            &Tpm2bAuth::default(),
            &public_info,
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!(
                "8001 00000020 0000012A 40000001
                 0000
                 000E 01500001 000B 00020012 0000 0008"
            )
        );
    }
}
