//! Attestation commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertifyOutput {
    pub certify_info: Tpm2bAttest,
    pub signature: TpmtSignature,
}

pub fn build_certify_command(
    object_handle: TpmiDhObject,
    object_handle_name: &[u8],
    sign_handle: TpmiDhObject,
    sign_handle_name: &[u8],
    qualifying_data: &Tpm2bData,
    in_scheme: &TpmtSigScheme,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CERTIFY, delegate);
    command.add_handle(object_handle, object_handle_name);
    command.add_handle(sign_handle, sign_handle_name);
    command.add_encrypted_parameter(qualifying_data)?;
    command.add_parameter(in_scheme)?;
    command.build()
}

pub fn parse_certify_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<CertifyOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CERTIFY, response)?;
    decoder.check_authorization(delegate)?;
    let certify_info = decoder.parse_encrypted_parameter(delegate)?;
    let signature = decoder.parse_parameter()?;
    Ok(CertifyOutput {
        certify_info,
        signature,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteOutput {
    pub quoted: Tpm2bAttest,
    pub signature: TpmtSignature,
}

pub fn build_quote_command(
    sign_handle: TpmiDhObject,
    sign_handle_name: &[u8],
    qualifying_data: &Tpm2bData,
    in_scheme: &TpmtSigScheme,
    pcr_select: &TpmlPcrSelection,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_QUOTE, delegate);
    command.add_handle(sign_handle, sign_handle_name);
    command.add_encrypted_parameter(qualifying_data)?;
    command.add_parameter(in_scheme)?;
    command.add_parameter(pcr_select)?;
    command.build()
}

pub fn parse_quote_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<QuoteOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_QUOTE, response)?;
    decoder.check_authorization(delegate)?;
    let quoted = decoder.parse_encrypted_parameter(delegate)?;
    let signature = decoder.parse_parameter()?;
    Ok(QuoteOutput { quoted, signature })
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn certify(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        sign_handle: TpmiDhObject,
        sign_handle_name: &[u8],
        qualifying_data: &Tpm2bData,
        in_scheme: &TpmtSigScheme,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<CertifyOutput>,
    ) {
        let command = build_certify_command(
            object_handle,
            object_handle_name,
            sign_handle,
            sign_handle_name,
            qualifying_data,
            in_scheme,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_certify_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn certify_sync(
        &self,
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        sign_handle: TpmiDhObject,
        sign_handle_name: &[u8],
        qualifying_data: &Tpm2bData,
        in_scheme: &TpmtSigScheme,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<CertifyOutput> {
        let command = build_certify_command(
            object_handle,
            object_handle_name,
            sign_handle,
            sign_handle_name,
            qualifying_data,
            in_scheme,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_certify_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quote(
        &self,
        sign_handle: TpmiDhObject,
        sign_handle_name: &[u8],
        qualifying_data: &Tpm2bData,
        in_scheme: &TpmtSigScheme,
        pcr_select: &TpmlPcrSelection,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<QuoteOutput>,
    ) {
        let command = build_quote_command(
            sign_handle,
            sign_handle_name,
            qualifying_data,
            in_scheme,
            pcr_select,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_quote_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn quote_sync(
        &self,
        sign_handle: TpmiDhObject,
        sign_handle_name: &[u8],
        qualifying_data: &Tpm2bData,
        in_scheme: &TpmtSigScheme,
        pcr_select: &TpmlPcrSelection,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<QuoteOutput> {
        let command = build_quote_command(
            sign_handle,
            sign_handle_name,
            qualifying_data,
            in_scheme,
            pcr_select,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_quote_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_certify_wire_form() {
        let qualifying_data = Tpm2bData::from_bytes(&hex!("ABCD")).expect("data");
        let command = build_certify_command(
            TpmHandle(0x8000_0001),
            b"object-name",
            TpmHandle(0x8000_0002),
            b"sign-name",
            &qualifying_data,
            &TpmtSigScheme::null(),
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 00000018 00000148 80000001 80000002 0002 ABCD 0010")
        );
    }

    #[test]
    fn test_quote_wire_form() {
        let qualifying_data = Tpm2bData::from_bytes(&hex!("DEADBEEF")).expect("data");
        let pcr_select =
            TpmlPcrSelection::from_slice(&[TpmsPcrSelection::with_pcrs(TPM2_ALG_SHA256, &[0, 4, 7])])
                .expect("selection");
        let command = build_quote_command(
            TpmHandle(0x8000_0002),
            b"",
            &qualifying_data,
            &TpmtSigScheme::null(),
            &pcr_select,
            None,
        )
        .expect("build");
        assert_eq!(
            command,
            hex!("8001 00000020 00000158 80000002 0004 DEADBEEF 0010 00000001 000B 03 910000")
        );
    }

    #[test]
    fn test_certify_parse() {
        // Opaque attestation blob followed by a null signature.
        let response = hex!("8001 00000012 00000000 0004 AABBCCDD 0010");
        let output = parse_certify_response(&response, None).expect("parse");
        assert_eq!(output.certify_info.value(), hex!("AABBCCDD"));
        assert_eq!(output.signature.sig_alg, TPM2_ALG_NULL);
        assert_eq!(output.signature.signature, TpmuSignature::Null);
    }
}
