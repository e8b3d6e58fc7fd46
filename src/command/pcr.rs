//! PCR commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_pcr_extend_command(
    pcr_handle: TpmiDhPcr,
    pcr_handle_name: &[u8],
    digests: &TpmlDigestValues,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_PCR_EXTEND, delegate);
    command.add_handle(pcr_handle, pcr_handle_name);
    command.add_parameter(digests)?;
    command.build()
}

pub fn parse_pcr_extend_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_PCR_EXTEND, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_pcr_event_command(
    pcr_handle: TpmiDhPcr,
    pcr_handle_name: &[u8],
    event_data: &Tpm2bEvent,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_PCR_EVENT, delegate);
    command.add_handle(pcr_handle, pcr_handle_name);
    command.add_encrypted_parameter(event_data)?;
    command.build()
}

pub fn parse_pcr_event_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmlDigestValues> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_PCR_EVENT, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcrReadOutput {
    pub pcr_update_counter: u32,
    pub pcr_selection_out: TpmlPcrSelection,
    pub pcr_values: TpmlDigest,
}

pub fn build_pcr_read_command(
    pcr_selection_in: &TpmlPcrSelection,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_PCR_READ, delegate);
    command.add_parameter(pcr_selection_in)?;
    command.build()
}

pub fn parse_pcr_read_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<PcrReadOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_PCR_READ, response)?;
    decoder.check_authorization(delegate)?;
    let pcr_update_counter = decoder.parse_parameter()?;
    let pcr_selection_out = decoder.parse_parameter()?;
    let pcr_values = decoder.parse_parameter()?;
    Ok(PcrReadOutput {
        pcr_update_counter,
        pcr_selection_out,
        pcr_values,
    })
}

pub fn build_pcr_reset_command(
    pcr_handle: TpmiDhPcr,
    pcr_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_PCR_RESET, delegate);
    command.add_handle(pcr_handle, pcr_handle_name);
    command.build()
}

pub fn parse_pcr_reset_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_PCR_RESET, response)?;
    decoder.check_authorization(delegate)
}

impl Tpm {
    pub fn pcr_extend(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        digests: &TpmlDigestValues,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command =
            build_pcr_extend_command(pcr_handle, pcr_handle_name, digests, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_pcr_extend_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn pcr_extend_sync(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        digests: &TpmlDigestValues,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_pcr_extend_command(pcr_handle, pcr_handle_name, digests, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_pcr_extend_response(&response, delegate)
    }

    pub fn pcr_event(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        event_data: &Tpm2bEvent,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmlDigestValues>,
    ) {
        let command =
            build_pcr_event_command(pcr_handle, pcr_handle_name, event_data, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_pcr_event_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn pcr_event_sync(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        event_data: &Tpm2bEvent,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmlDigestValues> {
        let command = build_pcr_event_command(pcr_handle, pcr_handle_name, event_data, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_pcr_event_response(&response, delegate)
    }

    pub fn pcr_read(
        &self,
        pcr_selection_in: &TpmlPcrSelection,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<PcrReadOutput>,
    ) {
        let command = build_pcr_read_command(pcr_selection_in, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_pcr_read_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn pcr_read_sync(
        &self,
        pcr_selection_in: &TpmlPcrSelection,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<PcrReadOutput> {
        let command = build_pcr_read_command(pcr_selection_in, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_pcr_read_response(&response, delegate)
    }

    pub fn pcr_reset(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_pcr_reset_command(pcr_handle, pcr_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_pcr_reset_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn pcr_reset_sync(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_pcr_reset_command(pcr_handle, pcr_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_pcr_reset_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_pcr_read_wire_form() {
        let selection =
            TpmlPcrSelection::from_slice(&[TpmsPcrSelection::with_pcrs(TPM2_ALG_SHA256, &[0, 4, 7])])
                .expect("selection");
        let command = build_pcr_read_command(&selection, None).expect("build");
        assert_eq!(
            command,
            hex!("8001 00000014 0000017E 00000001 000B 03 910000")
        );
    }

    #[test]
    fn test_pcr_read_parse() {
        let response = hex!(
            "8001 0000003E 00000000
             00000007
             00000001 000B 03 010000
             00000001 0020 0000000000000000000000000000000000000000000000000000000000000000"
        );
        let output = parse_pcr_read_response(&response, None).expect("parse");
        assert_eq!(output.pcr_update_counter, 7);
        assert!(output.pcr_selection_out.entries()[0].is_selected(0));
        assert_eq!(output.pcr_values.entries().len(), 1);
        assert_eq!(output.pcr_values.entries()[0].size, 32);
    }

    #[test]
    fn test_pcr_extend_wire_form() {
        let digests = TpmlDigestValues::from_slice(&[TpmtHa {
            hash_alg: TPM2_ALG_SHA256,
            digest: TpmuHa::Sha256([0xAB; 32]),
        }])
        .expect("digests");
        let command =
            build_pcr_extend_command(TpmHandle(0x0000_0007), b"", &digests, None).expect("build");
        assert_eq!(&command[..10], hex!("8001 00000034 00000182"));
        assert_eq!(&command[10..14], hex!("00000007"));
        assert_eq!(&command[14..20], hex!("00000001 000B"));
        assert!(command[20..].iter().all(|&b| b == 0xAB));
    }
}
