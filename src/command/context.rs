//! Context and resource management commands.

use crate::authorization::{AuthDelegateHandle, AuthorizationDelegate};
use crate::error::TpmResult;
use crate::types::*;

use super::{CommandBuilder, ResponseDecoder, Tpm, TpmCallback};

/// The flushed handle travels in the parameter area and is hashed by value;
/// it names no object, so there is no name to authorize.
pub fn build_flush_context_command(
    flush_handle: TpmiDhContext,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_FLUSH_CONTEXT, delegate);
    command.add_parameter(&flush_handle)?;
    command.build()
}

pub fn parse_flush_context_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_FLUSH_CONTEXT, response)?;
    decoder.check_authorization(delegate)
}

pub fn build_context_save_command(
    save_handle: TpmiDhContext,
    save_handle_name: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CONTEXT_SAVE, delegate);
    command.add_handle(save_handle, save_handle_name);
    command.build()
}

pub fn parse_context_save_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmsContext> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CONTEXT_SAVE, response)?;
    decoder.check_authorization(delegate)?;
    decoder.parse_parameter()
}

pub fn build_context_load_command(
    context: &TpmsContext,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_CONTEXT_LOAD, delegate);
    command.add_parameter(context)?;
    command.build()
}

pub fn parse_context_load_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<TpmHandle> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_CONTEXT_LOAD, response)?;
    let loaded_handle = decoder.parse_handle()?;
    decoder.check_authorization(delegate)?;
    Ok(loaded_handle)
}

pub fn build_evict_control_command(
    auth: TpmiRhProvision,
    auth_name: &[u8],
    object_handle: TpmiDhObject,
    object_handle_name: &[u8],
    persistent_handle: TpmiDhPersistent,
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<Vec<u8>> {
    let mut command = CommandBuilder::new(TPM2_CC_EVICT_CONTROL, delegate);
    command.add_handle(auth, auth_name);
    command.add_handle(object_handle, object_handle_name);
    command.add_parameter(&persistent_handle)?;
    command.build()
}

pub fn parse_evict_control_response(
    response: &[u8],
    delegate: Option<&dyn AuthorizationDelegate>,
) -> TpmResult<()> {
    let mut decoder = ResponseDecoder::new(TPM2_CC_EVICT_CONTROL, response)?;
    decoder.check_authorization(delegate)
}

impl Tpm {
    pub fn flush_context(
        &self,
        flush_handle: TpmiDhContext,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_flush_context_command(flush_handle, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_flush_context_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn flush_context_sync(
        &self,
        flush_handle: TpmiDhContext,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_flush_context_command(flush_handle, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_flush_context_response(&response, delegate)
    }

    pub fn context_save(
        &self,
        save_handle: TpmiDhContext,
        save_handle_name: &[u8],
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmsContext>,
    ) {
        let command =
            build_context_save_command(save_handle, save_handle_name, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_context_save_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn context_save_sync(
        &self,
        save_handle: TpmiDhContext,
        save_handle_name: &[u8],
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmsContext> {
        let command = build_context_save_command(save_handle, save_handle_name, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_context_save_response(&response, delegate)
    }

    pub fn context_load(
        &self,
        context: &TpmsContext,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<TpmHandle>,
    ) {
        let command = build_context_load_command(context, delegate.as_deref());
        self.execute(
            command,
            move |response| parse_context_load_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn context_load_sync(
        &self,
        context: &TpmsContext,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<TpmHandle> {
        let command = build_context_load_command(context, delegate)?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_context_load_response(&response, delegate)
    }

    pub fn evict_control(
        &self,
        auth: TpmiRhProvision,
        auth_name: &[u8],
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        persistent_handle: TpmiDhPersistent,
        delegate: Option<AuthDelegateHandle>,
        on_complete: TpmCallback<()>,
    ) {
        let command = build_evict_control_command(
            auth,
            auth_name,
            object_handle,
            object_handle_name,
            persistent_handle,
            delegate.as_deref(),
        );
        self.execute(
            command,
            move |response| parse_evict_control_response(response, delegate.as_deref()),
            on_complete,
        );
    }

    pub fn evict_control_sync(
        &self,
        auth: TpmiRhProvision,
        auth_name: &[u8],
        object_handle: TpmiDhObject,
        object_handle_name: &[u8],
        persistent_handle: TpmiDhPersistent,
        delegate: Option<&dyn AuthorizationDelegate>,
    ) -> TpmResult<()> {
        let command = build_evict_control_command(
            auth,
            auth_name,
            object_handle,
            object_handle_name,
            persistent_handle,
            delegate,
        )?;
        let response = self.transceiver.send_command_and_wait(command);
        parse_evict_control_response(&response, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_flush_context_wire_form() {
        let command = build_flush_context_command(TpmHandle(0x0200_0001), None).expect("build");
        assert_eq!(command, hex!("8001 0000000E 00000165 02000001"));
    }

    #[test]
    fn test_context_save_round_trip_through_load() {
        let response = hex!(
            "8001 00000020 00000000
             0000000000000001 02000001 40000007 0004 DEADBEEF"
        );
        let context = parse_context_save_response(&response, None).expect("parse");
        assert_eq!(context.sequence, 1);
        assert_eq!(context.saved_handle, TpmHandle(0x0200_0001));
        assert_eq!(context.context_blob.value(), hex!("DEADBEEF"));

        let command = build_context_load_command(&context, None).expect("build");
        assert_eq!(&command[10..], &response[10..]);
    }
}
