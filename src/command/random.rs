//! Random-number commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_get_random_command(
    bytes_requested: u16,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_GET_RANDOM, delegate);
    command.add_parameter(&bytes_requested)?;
    command.build()
}

pub fn parse_get_random_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bDigest> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_GET_RANDOM, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

pub fn build_stir_random_command(
    in_data: &Tpm2bSensitiveData,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_STIR_RANDOM, delegate);
    command.add_encrypted_parameter(in_data)?;
    command.build()
}

pub fn parse_stir_random_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_STIR_RANDOM, response)?;
    decoder.check_authorization(delegate)
}

impl Tpm {
    pub fn get_random(
        &self,
        bytes_requested: u16,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bDigest>,
    ) {
        let command = build_get_random_command(bytes_requested, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_get_random_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn get_random_sync(
        &self,
        bytes_requested: u16,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bDigest> {
        let command = build_get_random_command(bytes_requested, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_get_random_response(&response, delegate)
    }

    pub fn stir_random(
        &self,
        in_data: &Tpm2bSensitiveData,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_stir_random_command(in_data, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_stir_random_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn stir_random_sync(
        &self,
        in_data: &Tpm2bSensitiveData,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_stir_random_command(in_data, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_stir_random_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_get_random_wire_form() {
        let command = build_get_random_command(16, None).expect("build");
        assert_eq!(command, hex!("8001 0000000C 0000017B 0010"));
    }

    #[test]
    fn test_get_random_parse_seeded_response() {
        let response = hex!(
            "8001 0000001C 00000000
             0010 00000000000000000000000000000000"
        );
        let random = parse_get_random_response(&response, None).expect("parse");
        assert_eq!(random.size, 16);
        assert!(random.value().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stir_random_wire_form() {
        let in_data = Tpm2bSensitiveData::from_bytes(&hex!("A5A5")).expect("data");
        let command = build_stir_random_command(&in_data, None).expect("build");
        assert_eq!(command, hex!("8001 0000000E 00000146 0002 A5A5"));
    }
}
