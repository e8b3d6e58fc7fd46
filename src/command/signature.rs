//! Signing and signature verification commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

pub fn build_sign_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    digest: &Tpm2bDigest,
    in_scheme: &TpmtSigScheme,
    validation: &TpmtTkHashcheck,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_SIGN, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.add_encrypted_parameter(digest)?;
    command.add_parameter(in_scheme)?;
    command.add_parameter(validation)?;
    command.build()
}

pub fn parse_sign_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmtSignature> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_SIGN, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

pub fn build_verify_signature_command(
    key_handle: TpmiDhObject,
    key_handle_name: &[u8],
    digest: &Tpm2bDigest,
    signature: &TpmtSignature,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_VERIFY_SIGNATURE, delegate);
    command.add_handle(key_handle, key_handle_name);
    command.add_encrypted_parameter(digest)?;
    command.add_parameter(signature)?;
    command.build()
}

pub fn parse_verify_signature_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmtTkVerified> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_VERIFY_SIGNATURE, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

impl Tpm {
    #[allow(clippy::too_many_arguments)]
    pub fn sign(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        digest: &Tpm2bDigest,
        in_scheme: &TpmtSigScheme,
        validation: &TpmtTkHashcheck,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmtSignature>,
    ) {
        let command = build_sign_command(
            key_handle,
            key_handle_name,
            digest,
            in_scheme,
            validation,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_sign_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn sign_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        digest: &Tpm2bDigest,
        in_scheme: &TpmtSigScheme,
        validation: &TpmtTkHashcheck,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmtSignature> {
        let command = build_sign_command(
            key_handle,
            key_handle_name,
            digest,
            in_scheme,
            validation,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_sign_response(&response, delegate)
    }

    pub fn verify_signature(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        digest: &Tpm2bDigest,
        signature: &TpmtSignature,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmtTkVerified>,
    ) {
        let command = build_verify_signature_command(
            key_handle,
            key_handle_name,
            digest,
            signature,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_verify_signature_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn verify_signature_sync(
        &self,
        key_handle: TpmiDhObject,
        key_handle_name: &[u8],
        digest: &Tpm2bDigest,
        signature: &TpmtSignature,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmtTkVerified> {
        let command =
            build_verify_signature_command(key_handle, key_handle_name, digest, signature, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_verify_signature_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_sign_wire_form() {
        let digest = Tpm2bDigest::from_bytes(&[0x11; 32]).expect("digest");
        let command = build_sign_command(
            TpmHandle(0x8000_0001),
            b"",
            &digest,
            &TpmtSigScheme::null(),
            &TpmtTkHashcheck::null(),
            None,
        )
        .expect("build");
        assert_eq!(&command[..10], hex!("8001 0000003A 0000015D"));
        assert_eq!(&command[10..14], hex!("80000001"));
        assert_eq!(&command[14..16], hex!("0020"));
        // Null scheme, then the null hashcheck ticket.
        assert_eq!(&command[48..], hex!("0010 8024 40000007 0000"));
    }

    #[test]
    fn test_sign_parse_signature() {
        // An RSASSA signature with a 4-byte modulus for brevity.
        let response = hex!("8001 00000014 00000000 0014 000B 0004 AABBCCDD");
        let signature = parse_sign_response(&response, None).expect("parse");
        assert_eq!(signature.sig_alg, TPM2_ALG_RSASSA);
        match signature.signature {
            TpmuSignature::Rsassa(ref rsa) => {
                assert_eq!(rsa.hash, TPM2_ALG_SHA256);
                assert_eq!(rsa.sig.value(), hex!("AABBCCDD"));
            }
            ref other => panic!("unexpected signature union: {:?}", other),
        }
    }
}
