//! Startup, shutdown and self-test commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_startup_command(
    startup_type: TpmSu,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_STARTUP, delegate);
    command.add_parameter(&startup_type)?;
    command.build()
}

pub fn parse_startup_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_STARTUP, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_shutdown_command(
    shutdown_type: TpmSu,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_SHUTDOWN, delegate);
    command.add_parameter(&shutdown_type)?;
    command.build()
}

pub fn parse_shutdown_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_SHUTDOWN, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_self_test_command(
    full_test: TpmiYesNo,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_SELF_TEST, delegate);
    command.add_parameter(&full_test)?;
    command.build()
}

pub fn parse_self_test_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_SELF_TEST, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_incremental_self_test_command(
    to_test: &TpmlAlg,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_INCREMENTAL_SELF_TEST, delegate);
    command.add_parameter(to_test)?;
    command.build()
}

pub fn parse_incremental_self_test_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmlAlg> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_INCREMENTAL_SELF_TEST, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetTestResultOutput {
    pub out_data: Tpm2bMaxBuffer,
    pub test_result: TpmRc,
}

pub fn build_get_test_result_command(
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    CommandBuilder::new(TPM2_CC_GET_TEST_RESULT, delegate).build()
}

pub fn parse_get_test_result_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<GetTestResultOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_GET_TEST_RESULT, response)?;
    decoder.check_authorization(delegate)?;
    let out_data = decoder.parse_encrypted_parameter(delegate)?;
    let test_result = decoder.parse_parameter()?;
    Ok(GetTestResultOutput {
        out_data,
        test_result,
    })
}

impl Tpm {
    pub fn startup(
        &self,
        startup_type: TpmSu,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_startup_command(startup_type, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_startup_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn startup_sync(
        &self,
        startup_type: TpmSu,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_startup_command(startup_type, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_startup_response(&response, delegate)
    }

    pub fn shutdown(
        &self,
        shutdown_type: TpmSu,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_shutdown_command(shutdown_type, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_shutdown_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn shutdown_sync(
        &self,
        shutdown_type: TpmSu,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_shutdown_command(shutdown_type, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_shutdown_response(&response, delegate)
    }

    pub fn self_test(
        &self,
        full_test: TpmiYesNo,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_self_test_command(full_test, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_self_test_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn self_test_sync(
        &self,
        full_test: TpmiYesNo,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_self_test_command(full_test, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_self_test_response(&response, delegate)
    }

    pub fn incremental_self_test(
        &self,
        to_test: &TpmlAlg,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmlAlg>,
    ) {
        let command = build_incremental_self_test_command(to_test, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_incremental_self_test_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn incremental_self_test_sync(
        &self,
        to_test: &TpmlAlg,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmlAlg> {
        let command = build_incremental_self_test_command(to_test, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_incremental_self_test_response(&response, delegate)
    }

    pub fn get_test_result(
        &self,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<GetTestResultOutput>,
    ) {
        let command = build_get_test_result_command(delegate.as_deref());
        self.execute(
            command,
            move |response| parse_get_test_result_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn get_test_result_sync(
        &self,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<GetTestResultOutput> {
        let command = build_get_test_result_command(delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_get_test_result_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_startup_clear_wire_form() {
        let command = build_startup_command(TPM2_SU_CLEAR, None).expect("build");
        assert_eq!(command, hex!("8001 0000000C 00000144 0000"));
    }

    #[test]
    fn test_startup_success_response() {
        let response = hex!("8001 0000000A 00000000");
        parse_startup_response(&response, None).expect("parse");
    }

    #[test]
    fn test_shutdown_state_wire_form() {
        let command = build_shutdown_command(TPM2_SU_STATE, None).expect("build");
        assert_eq!(command, hex!("8001 0000000C 00000145 0001"));
    }

    #[test]
    fn test_self_test_wire_form() {
        let command = build_self_test_command(TpmiYesNo::YES, None).expect("build");
        assert_eq!(command, hex!("8001 0000000B 00000143 01"));
    }

    #[test]
    fn test_get_test_result_parse() {
        // outData carries two bytes, testResult reports 0x101.
        let response = hex!("8001 00000012 00000000 0002 CAFE 00000101");
        let output = parse_get_test_result_response(&response, None).expect("parse");
        assert_eq!(output.out_data.value(), hex!("CAFE"));
        assert_eq!(output.test_result, 0x101);
    }
}
