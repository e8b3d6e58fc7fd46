use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hex_literal::hex;
use tpm2_client::command::pcr::PcrReadOutput;
use tpm2_client::*;

/// Records every command and replays queued responses in order.
#[derive(Default)]
struct MockTransceiver {
    commands: Mutex<Vec<Vec<u8>>>,
    responses: Mutex<VecDeque<Vec<u8>>>,
}

impl MockTransceiver {
    fn queue(&self, response: Vec<u8>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandTransceiver for MockTransceiver {
    fn send_command(&self, command: Vec<u8>, on_response: SendCommandCallback) {
        self.commands.lock().unwrap().push(command);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        on_response(response);
    }
}

/// Frames a response envelope around `handles` and `parameters`; a nonempty
/// `authorization` produces the sessions layout with its parameter-size
/// prefix.
fn frame_response(rc: u32, handles: &[u32], parameters: &[u8], authorization: &[u8]) -> Vec<u8> {
    let sessions = !authorization.is_empty();
    let tag: u16 = if sessions { 0x8002 } else { 0x8001 };
    let mut size = 10 + handles.len() * 4 + parameters.len();
    if sessions {
        size += 4 + authorization.len();
    }
    let mut response = Vec::with_capacity(size);
    response.extend_from_slice(&tag.to_be_bytes());
    response.extend_from_slice(&(size as u32).to_be_bytes());
    response.extend_from_slice(&rc.to_be_bytes());
    for handle in handles {
        response.extend_from_slice(&handle.to_be_bytes());
    }
    if sessions {
        response.extend_from_slice(&(parameters.len() as u32).to_be_bytes());
    }
    response.extend_from_slice(parameters);
    response.extend_from_slice(authorization);
    response
}

fn tpm_with_mock() -> (Tpm, Arc<MockTransceiver>) {
    let transceiver = Arc::new(MockTransceiver::default());
    (Tpm::new(transceiver.clone()), transceiver)
}

#[test]
fn test_startup_clear_no_sessions() {
    let (tpm, transceiver) = tpm_with_mock();
    transceiver.queue(hex!("8001 0000000A 00000000").to_vec());

    tpm.startup_sync(TPM2_SU_CLEAR, None).expect("startup");

    let sent = transceiver.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], hex!("8001 0000000C 00000144 0000"));
}

#[test]
fn test_get_random_round_trip() {
    let (tpm, transceiver) = tpm_with_mock();
    let mut body = vec![0x00, 0x10];
    body.extend_from_slice(&[0u8; 16]);
    transceiver.queue(frame_response(0, &[], &body, &[]));

    let random = tpm.get_random_sync(16, None).expect("get_random");

    assert_eq!(transceiver.sent()[0], hex!("8001 0000000C 0000017B 0010"));
    assert_eq!(random.size, 16);
    assert!(random.value().iter().all(|&b| b == 0));
}

#[test]
fn test_self_test_with_password_session() {
    let (tpm, transceiver) = tpm_with_mock();
    transceiver.queue(frame_response(0, &[], &[], &hex!("0000 01 0000")));

    let delegate = PasswordAuthorizationDelegate::new(b"");
    tpm.self_test_sync(TpmiYesNo::YES, Some(&delegate))
        .expect("self_test");

    // Tag flips to sessions, the 9-byte authorization section is length
    // prefixed, and the total comes to 24 bytes.
    assert_eq!(
        transceiver.sent()[0],
        hex!("8002 00000018 00000143 00000009 40000009 0000 01 0000 01")
    );
}

#[test]
fn test_pcr_read_echoes_seeded_outputs() {
    let (tpm, transceiver) = tpm_with_mock();
    let seeded = PcrReadOutput {
        pcr_update_counter: 42,
        pcr_selection_out: TpmlPcrSelection::from_slice(&[TpmsPcrSelection::with_pcrs(
            TPM2_ALG_SHA256,
            &[0, 4, 7],
        )])
        .expect("selection"),
        pcr_values: TpmlDigest::from_slice(&[Tpm2bDigest::from_bytes(&[0xCD; 32])
            .expect("digest")])
        .expect("values"),
    };
    let mut body = Vec::new();
    seeded.pcr_update_counter.serialize(&mut body).expect("serialize");
    seeded.pcr_selection_out.serialize(&mut body).expect("serialize");
    seeded.pcr_values.serialize(&mut body).expect("serialize");
    transceiver.queue(frame_response(0, &[], &body, &[]));

    let selection =
        TpmlPcrSelection::from_slice(&[TpmsPcrSelection::with_pcrs(TPM2_ALG_SHA256, &[0, 4, 7])])
            .expect("selection");
    let output = tpm.pcr_read_sync(&selection, None).expect("pcr_read");
    assert_eq!(output, seeded);
}

#[test]
fn test_sign_echoes_seeded_signature() {
    let (tpm, transceiver) = tpm_with_mock();
    let seeded = TpmtSignature {
        sig_alg: TPM2_ALG_RSASSA,
        signature: TpmuSignature::Rsassa(TpmsSignatureRsa {
            hash: TPM2_ALG_SHA256,
            sig: Tpm2bPublicKeyRsa::from_bytes(&[0x77; 256]).expect("sig"),
        }),
    };
    let body = seeded.to_wire().expect("serialize");
    transceiver.queue(frame_response(0, &[], &body, &[]));

    let digest = Tpm2bDigest::from_bytes(&[0x11; 32]).expect("digest");
    let signature = tpm
        .sign_sync(
            TpmHandle(0x8000_0001),
            b"key-name",
            &digest,
            &TpmtSigScheme::null(),
            &TpmtTkHashcheck::null(),
            None,
        )
        .expect("sign");
    assert_eq!(signature, seeded);
}

#[test]
fn test_create_primary_echoes_handle_and_outputs() {
    let (tpm, transceiver) = tpm_with_mock();
    let name = Tpm2bName::from_bytes(&[0x3C; 34]).expect("name");
    let mut body = Vec::new();
    Tpm2bPublic::default().serialize(&mut body).expect("serialize");
    Tpm2bCreationData::default()
        .serialize(&mut body)
        .expect("serialize");
    Tpm2bDigest::default().serialize(&mut body).expect("serialize");
    TpmtTkCreation::null().serialize(&mut body).expect("serialize");
    name.serialize(&mut body).expect("serialize");
    transceiver.queue(frame_response(0, &[0x8000_0002], &body, &[]));

    let output = tpm
        .create_primary_sync(
            TPM2_RH_OWNER,
            b"",
            &Tpm2bSensitiveCreate::default(),
            &Tpm2bPublic::default(),
            &Tpm2bData::default(),
            &TpmlPcrSelection::default(),
            None,
        )
        .expect("create_primary");
    assert_eq!(output.object_handle, TpmHandle(0x8000_0002));
    assert_eq!(output.name, name);
}

#[test]
fn test_nv_read_with_password_session() {
    let (tpm, transceiver) = tpm_with_mock();
    let mut body = vec![0x00, 0x08];
    body.extend_from_slice(&7u64.to_be_bytes());
    transceiver.queue(frame_response(0, &[], &body, &hex!("0000 01 0000")));

    let delegate = PasswordAuthorizationDelegate::new(b"owner");
    let data = tpm
        .nv_read_sync(
            TpmHandle(0x0150_0001),
            b"nv-auth",
            TpmHandle(0x0150_0001),
            b"nv-index",
            8,
            0,
            Some(&delegate),
        )
        .expect("nv_read");
    assert_eq!(data.value(), 7u64.to_be_bytes());

    // The request went out under the password session.
    let sent = transceiver.sent();
    assert_eq!(&sent[0][..2], hex!("8002"));
}

/// Delegate that must never be consulted while a response is dismantled.
struct UntouchableDelegate;

impl AuthorizationDelegate for UntouchableDelegate {
    fn get_command_authorization(&self, _command_hash: &[u8]) -> Option<Vec<u8>> {
        Some(hex!("40000009 0000 01 0000").to_vec())
    }

    fn check_response_authorization(&self, _response_hash: &[u8], _authorization: &[u8]) -> bool {
        panic!("delegate consulted for a response that failed framing");
    }

    fn encrypt_command_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        true
    }

    fn decrypt_response_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        panic!("delegate consulted for a response that failed framing");
    }
}

#[test]
fn test_framing_rejection_skips_delegate() {
    let (tpm, transceiver) = tpm_with_mock();
    // Header claims 16 bytes but only 12 arrive.
    transceiver.queue(hex!("8001 00000010 00000000 00000000").to_vec());

    let delegate = UntouchableDelegate;
    let result = tpm.get_random_sync(16, Some(&delegate));
    assert_eq!(result, Err(TpmError::Size));
}

#[test]
fn test_truncated_parameter_is_insufficient() {
    let (tpm, transceiver) = tpm_with_mock();
    // TPM2B digest claims four bytes but the body ends after two.
    transceiver.queue(hex!("8001 0000000E 00000000 0004 0011").to_vec());

    assert_eq!(tpm.get_random_sync(4, None), Err(TpmError::Insufficient));
}

#[test]
fn test_tpm_error_code_passes_through() {
    let (tpm, transceiver) = tpm_with_mock();
    transceiver.queue(hex!("8001 0000000A 00000921").to_vec());

    assert_eq!(
        tpm.startup_sync(TPM2_SU_CLEAR, None),
        Err(TpmError::Response(0x921))
    );
}

/// Delegate that refuses to authorize anything.
struct RefusingDelegate;

impl AuthorizationDelegate for RefusingDelegate {
    fn get_command_authorization(&self, _command_hash: &[u8]) -> Option<Vec<u8>> {
        None
    }

    fn check_response_authorization(&self, _response_hash: &[u8], _authorization: &[u8]) -> bool {
        false
    }

    fn encrypt_command_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        false
    }

    fn decrypt_response_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
        false
    }
}

#[test]
fn test_build_failure_never_reaches_transceiver() {
    let (tpm, transceiver) = tpm_with_mock();
    let delegate = RefusingDelegate;

    let result = tpm.startup_sync(TPM2_SU_CLEAR, Some(&delegate));
    assert_eq!(result, Err(TpmError::AuthorizationFailed));
    assert!(transceiver.sent().is_empty());
}

#[test]
fn test_rejected_response_authorization() {
    struct AcceptNothing;
    impl AuthorizationDelegate for AcceptNothing {
        fn get_command_authorization(&self, _command_hash: &[u8]) -> Option<Vec<u8>> {
            Some(hex!("40000009 0000 01 0000").to_vec())
        }
        fn check_response_authorization(&self, _hash: &[u8], _authorization: &[u8]) -> bool {
            false
        }
        fn encrypt_command_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
            true
        }
        fn decrypt_response_parameter(&self, _parameter: &mut Vec<u8>) -> bool {
            true
        }
    }

    let (tpm, transceiver) = tpm_with_mock();
    transceiver.queue(frame_response(0, &[], &[], &hex!("0000 01 0000")));

    let delegate = AcceptNothing;
    assert_eq!(
        tpm.self_test_sync(TpmiYesNo::YES, Some(&delegate)),
        Err(TpmError::AuthorizationFailed)
    );
}

#[test]
fn test_async_completion_runs_exactly_once() {
    let (tpm, transceiver) = tpm_with_mock();
    let mut body = vec![0x00, 0x04];
    body.extend_from_slice(&hex!("DEADBEEF"));
    transceiver.queue(frame_response(0, &[], &body, &[]));

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = calls.clone();
    tpm.get_random(
        4,
        None,
        Box::new(move |result| {
            calls_in_callback.fetch_add(1, Ordering::SeqCst);
            let random = result.expect("get_random");
            assert_eq!(random.value(), hex!("DEADBEEF"));
        }),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_async_build_failure_completes_with_error() {
    let (tpm, transceiver) = tpm_with_mock();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = calls.clone();

    tpm.startup(
        TPM2_SU_CLEAR,
        Some(Arc::new(RefusingDelegate) as AuthDelegateHandle),
        Box::new(move |result| {
            calls_in_callback.fetch_add(1, Ordering::SeqCst);
            assert_eq!(result, Err(TpmError::AuthorizationFailed));
        }),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(transceiver.sent().is_empty());
}

/// XORs parameter payloads, standing in for real session encryption.
struct XorDelegate;

impl AuthorizationDelegate for XorDelegate {
    fn get_command_authorization(&self, _command_hash: &[u8]) -> Option<Vec<u8>> {
        Some(hex!("40000009 0000 01 0000").to_vec())
    }

    fn check_response_authorization(&self, _response_hash: &[u8], _authorization: &[u8]) -> bool {
        true
    }

    fn encrypt_command_parameter(&self, parameter: &mut Vec<u8>) -> bool {
        for byte in parameter.iter_mut() {
            *byte ^= 0xFF;
        }
        true
    }

    fn decrypt_response_parameter(&self, parameter: &mut Vec<u8>) -> bool {
        for byte in parameter.iter_mut() {
            *byte ^= 0xFF;
        }
        true
    }
}

#[test]
fn test_parameter_encryption_round_trip() {
    let (tpm, transceiver) = tpm_with_mock();
    // The TPM would see the encrypted payload; reply likewise, leaving the
    // size prefix in the clear.
    let mut body = vec![0x00, 0x04];
    body.extend_from_slice(&hex!("FFEEDDCC"));
    transceiver.queue(frame_response(0, &[], &body, &hex!("0000 01 0000")));

    let delegate = XorDelegate;
    let random = tpm.get_random_sync(4, Some(&delegate)).expect("get_random");
    assert_eq!(random.value(), hex!("00112233"));

    // StirRandom sends its payload through the same transform.
    transceiver.queue(frame_response(0, &[], &[], &hex!("0000 01 0000")));
    let stir = Tpm2bSensitiveData::from_bytes(&hex!("00112233")).expect("data");
    tpm.stir_random_sync(&stir, Some(&delegate)).expect("stir_random");
    let sent = transceiver.sent();
    let stir_command = &sent[1];
    let parameters = &stir_command[stir_command.len() - 6..];
    assert_eq!(parameters, hex!("0004 FFEEDDCC"));
}
