//! Hash, HMAC and hash-sequence commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashOutput {
    pub out_hash: Tpm2bDigest,
    pub validation: TpmtTkHashcheck,
}

pub fn build_hash_command(
    data: &Tpm2bMaxBuffer,
    hash_alg: TpmiAlgHash,
    hierarchy: TpmiRhHierarchy,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_HASH, delegate);
    command.add_encrypted_parameter(data)?;
    command.add_parameter(&hash_alg)?;
    command.add_parameter(&hierarchy)?;
    command.build()
}

pub fn parse_hash_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<HashOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_HASH, response)?;
    decoder.check_authorization(delegate)?;
    let out_hash = decoder.parse_encrypted_parameter(delegate)?;
    let validation = decoder.parse_parameter()?;
    Ok(HashOutput {
        out_hash,
        validation,
    })
}

pub fn build_hmac_command(
    handle: TpmiDhObject,
    handle_name: &[u8],
    buffer: &Tpm2bMaxBuffer,
    hash_alg: TpmiAlgHash,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_HMAC, delegate);
    command.add_handle(handle, handle_name);
    command.add_encrypted_parameter(buffer)?;
    command.add_parameter(&hash_alg)?;
    command.build()
}

pub fn parse_hmac_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Tpm2bDigest> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_HMAC, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_encrypted_parameter(delegate)
}

pub fn build_hash_sequence_start_command(
    auth: &Tpm2bAuth,
    hash_alg: TpmiAlgHash,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_HASH_SEQUENCE_START, delegate);
    command.add_encrypted_parameter(auth)?;
    command.add_parameter(&hash_alg)?;
    command.build()
}

pub fn parse_hash_sequence_start_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmHandle> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_HASH_SEQUENCE_START, response)?;
    let sequence_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    Ok(sequence_handle)
}

pub fn build_sequence_update_command(
    sequence_handle: TpmiDhObject,
    sequence_handle_name: &[u8],
    buffer: &Tpm2bMaxBuffer,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_SEQUENCE_UPDATE, delegate);
    command.add_handle(sequence_handle, sequence_handle_name);
    command.add_encrypted_parameter(buffer)?;
    command.build()
}

pub fn parse_sequence_update_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_SEQUENCE_UPDATE, response)?;
    decoder.check_authorization(delegate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCompleteOutput {
    pub result: Tpm2bDigest,
    pub validation: TpmtTkHashcheck,
}

pub fn build_sequence_complete_command(
    sequence_handle: TpmiDhObject,
    sequence_handle_name: &[u8],
    buffer: &Tpm2bMaxBuffer,
    hierarchy: TpmiRhHierarchy,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_SEQUENCE_COMPLETE, delegate);
    command.add_handle(sequence_handle, sequence_handle_name);
    command.add_encrypted_parameter(buffer)?;
    command.add_parameter(&hierarchy)?;
    command.build()
}

pub fn parse_sequence_complete_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<SequenceCompleteOutput> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_SEQUENCE_COMPLETE, response)?;
    decoder.check_authorization(delegate)?;
    let result = decoder.parse_encrypted_parameter(delegate)?;
    let validation = decoder.parse_parameter()?;
    Ok(SequenceCompleteOutput { result, validation })
}

pub fn build_event_sequence_complete_command(
    pcr_handle: TpmiDhPcr,
    pcr_handle_name: &[u8],
    sequence_handle: TpmiDhObject,
    sequence_handle_name: &[u8],
    buffer: &Tpm2bMaxBuffer,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_EVENT_SEQUENCE_COMPLETE, delegate);
    command.add_handle(pcr_handle, pcr_handle_name);
    command.add_handle(sequence_handle, sequence_handle_name);
    command.add_encrypted_parameter(buffer)?;
    command.build()
}

pub fn parse_event_sequence_complete_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmlDigestValues> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_EVENT_SEQUENCE_COMPLETE, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

impl Tpm {
    pub fn hash(
        &self,
        data: &Tpm2bMaxBuffer,
        hash_alg: TpmiAlgHash,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<HashOutput>,
    ) {
        let command = build_hash_command(data, hash_alg, hierarchy, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_hash_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn hash_sync(
        &self,
        data: &Tpm2bMaxBuffer,
        hash_alg: TpmiAlgHash,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<HashOutput> {
        let command = build_hash_command(data, hash_alg, hierarchy, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_hash_response(&response, delegate)
    }

    pub fn hmac(
        &self,
        handle: TpmiDhObject,
        handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        hash_alg: TpmiAlgHash,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<Tpm2bDigest>,
    ) {
        let command =
            build_hmac_command(handle, handle_name, buffer, hash_alg, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_hmac_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn hmac_sync(
        &self,
        handle: TpmiDhObject,
        handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        hash_alg: TpmiAlgHash,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<Tpm2bDigest> {
        let command = build_hmac_command(handle, handle_name, buffer, hash_alg, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_hmac_response(&response, delegate)
    }

    pub fn hash_sequence_start(
        &self,
        auth: &Tpm2bAuth,
        hash_alg: TpmiAlgHash,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmHandle>,
    ) {
        let command = build_hash_sequence_start_command(auth, hash_alg, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_hash_sequence_start_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn hash_sequence_start_sync(
        &self,
        auth: &Tpm2bAuth,
        hash_alg: TpmiAlgHash,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmHandle> {
        let command = build_hash_sequence_start_command(auth, hash_alg, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_hash_sequence_start_response(&response, delegate)
    }

    pub fn sequence_update(
        &self,
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_sequence_update_command(
            sequence_handle,
            sequence_handle_name,
            buffer,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_sequence_update_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn sequence_update_sync(
        &self,
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command =
            build_sequence_update_command(sequence_handle, sequence_handle_name, buffer, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_sequence_update_response(&response, delegate)
    }

    pub fn sequence_complete(
        &self,
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<SequenceCompleteOutput>,
    ) {
        let command = build_sequence_complete_command(
            sequence_handle,
            sequence_handle_name,
            buffer,
            hierarchy,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_sequence_complete_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn sequence_complete_sync(
        &self,
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        hierarchy: TpmiRhHierarchy,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<SequenceCompleteOutput> {
        let command = build_sequence_complete_command(
            sequence_handle,
            sequence_handle_name,
            buffer,
            hierarchy,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_sequence_complete_response(&response, delegate)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn event_sequence_complete(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmlDigestValues>,
    ) {
        let command = build_event_sequence_complete_command(
            pcr_handle,
            pcr_handle_name,
            sequence_handle,
            sequence_handle_name,
            buffer,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_event_sequence_complete_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn event_sequence_complete_sync(
        &self,
        pcr_handle: TpmiDhPcr,
        pcr_handle_name: &[u8],
        sequence_handle: TpmiDhObject,
        sequence_handle_name: &[u8],
        buffer: &Tpm2bMaxBuffer,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmlDigestValues> {
        let command = build_event_sequence_complete_command(
            pcr_handle,
            pcr_handle_name,
            sequence_handle,
            sequence_handle_name,
            buffer,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_event_sequence_complete_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_hash_wire_form() {
        let data = Tpm2bMaxBuffer::from_bytes(b"abc").expect("data");
        let command =
            build_hash_command(&data, TPM2_ALG_SHA256, TPM2_RH_NULL, None).expect("build");
        assert_eq!(
            command,
            hex!("8001 00000015 0000017D 0003 616263 000B 40000007")
        );
    }

    #[test]
    fn test_hash_sequence_start_returns_handle() {
        let response = hex!("8001 0000000E 00000000 80000005");
        let handle = parse_hash_sequence_start_response(&response, None).expect("parse");
        assert_eq!(handle, TpmHandle(0x8000_0005));
    }
}
