//! Capability and clock queries.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetCapabilityOutput {
    pub more_data: TpmiYesNo,
    pub capability_data: TpmsCapabilityData,
}

pub fn build_get_capability_command(
    capability: TpmCap,
    property: u32,
    property_count: u32,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_GET_CAPABILITY, delegate);
    command.add_parameter(&capability)?;
    command.add_parameter(&property)?;
    command.add_parameter(&property_count)?;
    command.build()
}

pub fn parse_get_capability_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<GetCapabilityOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_GET_CAPABILITY, response)?;
    decoder.check_authorization(delegate)?;
    let more_data = decoder.parse_parameter()?;
    let capability_data = decoder.parse_parameter()?;
    Ok(GetCapabilityOutput {
        more_data,
        capability_data,
    })
}

pub fn build_read_clock_command(
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    CommandBuilder::new(TPM2_CC_READ_CLOCK, delegate).build()
}

pub fn parse_read_clock_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmsTimeInfo> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_READ_CLOCK, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

impl Tpm {
    pub fn get_capability(
        &self,
        capability: TpmCap,
        property: u32,
        property_count: u32,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<GetCapabilityOutput>,
    ) {
        let command =
            build_get_capability_command(capability, property, property_count, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_get_capability_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn get_capability_sync(
        &self,
        capability: TpmCap,
        property: u32,
        property_count: u32,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<GetCapabilityOutput> {
        let command = build_get_capability_command(capability, property, property_count, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_get_capability_response(&response, delegate)
    }

    pub fn read_clock(
        &self,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmsTimeInfo>,
    ) {
        let command = build_read_clock_command(delegate.as_deref());
        self.execute(
            command,
            move |response| parse_read_clock_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn read_clock_sync(
        &self,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmsTimeInfo> {
        let command = build_read_clock_command(delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_read_clock_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_get_capability_wire_form() {
        let command =
            build_get_capability_command(TPM2_CAP_TPM_PROPERTIES, 0x100, 8, None).expect("build");
        assert_eq!(
            command,
            hex!("8001 00000016 0000017A 00000006 00000100 00000008")
        );
    }

    #[test]
    fn test_get_capability_parse_properties() {
        let response = hex!(
            "8001 0000001B 00000000
             00
             00000006 00000001 00000105 49465800"
        );
        let output = parse_get_capability_response(&response, None).expect("parse");
        assert!(!output.more_data.is_yes());
        assert_eq!(output.capability_data.capability, TPM2_CAP_TPM_PROPERTIES);
        match output.capability_data.data {
            TpmuCapabilities::TpmProperties(ref properties) => {
                assert_eq!(properties.entries().len(), 1);
                assert_eq!(properties.entries()[0].property, TPM2_PT_MANUFACTURER);
                assert_eq!(properties.entries()[0].value, 0x4946_5800);
            }
            ref other => panic!("unexpected capability payload: {:?}", other),
        }
    }

    #[test]
    fn test_read_clock_parse() {
        let response = hex!(
            "8001 00000023 00000000
             0000000000000FA0
             0000000000000BB8 00000002 00000003 01"
        );
        let time = parse_read_clock_response(&response, None).expect("parse");
        assert_eq!(time.time, 4000);
        assert_eq!(time.clock_info.clock, 3000);
        assert_eq!(time.clock_info.reset_count, 2);
        assert_eq!(time.clock_info.restart_count, 3);
        assert!(time.clock_info.safe.is_yes());
    }
}
