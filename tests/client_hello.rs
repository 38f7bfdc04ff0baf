mod common;

use common::*;
use ja3_fingerprint::client_hello::{assemble_segments, parse_client_hello};
use ja3_fingerprint::*;

#[test]
fn test_known_fingerprint() {
    let handshake = tls13_style_hello().handshake();
    let fp = Ja3Fingerprint::from_handshake(&handshake).unwrap();

    assert_eq!(fp.ja3, TLS13_STYLE_JA3);
    assert_eq!(fp.digest, TLS13_STYLE_DIGEST);
    assert_eq!(fp.server_name.as_deref(), Some(&b"example.com"[..]));
    assert_eq!(fp.version, 0x0303);
}

#[test]
fn test_reference_ja3_vector() {
    // Vector from the published JA3 description
    let handshake = ClientHelloBuilder::new(0x0301)
        .ciphers(&[47, 53, 5, 10, 49161, 49162, 49171, 49172, 50, 56, 19, 4])
        .sni("client.example")
        .curves(&[23, 24, 25])
        .point_formats(&[0])
        .handshake();

    let fp = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    assert_eq!(fp.ja3, "769,47-53-5-10-49161-49162-49171-49172-50-56-19-4,0-10-11,23-24-25,0");
    assert_eq!(fp.digest, "ada70206e40642a3e4461f35503241d5");
}

#[test]
fn test_grease_everywhere_is_removed() {
    let handshake = ClientHelloBuilder::new(0x0303)
        .ciphers(&[0x0a0a, 0x1301, 0x1302, 0x1303, 0xc02b, 0xc02f])
        .extension(0x2a2a, &[])
        .sni("example.com")
        .extension(0x0017, &[])
        .extension(0xff01, &[0x00])
        .curves(&[0x4a4a, 0x001d, 0x0017, 0x0018])
        .point_formats(&[0x00])
        .extension(0xfafa, &[0x00])
        .handshake();

    let fp = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    assert_eq!(fp.ja3, "771,4865-4866-4867-49195-49199,0-23-65281-10-11,29-23-24,0");
    assert_eq!(fp.digest, "e195ee6c10d79ea3730f8bf6fca7bcf1");
}

#[test]
fn test_decoding_is_deterministic() {
    let handshake = tls13_style_hello().curves(&[29, 23]).handshake();
    let first = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    let second = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_extensions_keeps_five_segments() {
    let handshake = ClientHelloBuilder::new(0x0301).ciphers(&[0x002f, 0x0035]).handshake();

    let fields = parse_client_hello(&handshake).unwrap();
    assert!(fields.extensions.is_none());

    let fp = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    assert_eq!(fp.ja3, "769,47-53,,,");
    assert_eq!(fp.ja3.matches(',').count(), 4);
    assert!(fp.server_name.is_none());
}

#[test]
fn test_empty_extension_block_matches_absent_block() {
    let absent = ClientHelloBuilder::new(0x0302).ciphers(&[0x002f]);
    let empty = absent.clone().empty_extensions();

    let absent_handshake = absent.handshake();
    let empty_handshake = empty.handshake();
    let absent_fields = parse_client_hello(&absent_handshake).unwrap();
    let empty_fields = parse_client_hello(&empty_handshake).unwrap();
    assert_eq!(absent_fields.extensions, None);
    assert_eq!(empty_fields.extensions, Some(Vec::new()));

    assert_eq!(
        Ja3Fingerprint::from_handshake(&absent_handshake).unwrap().ja3,
        Ja3Fingerprint::from_handshake(&empty_handshake).unwrap().ja3
    );
}

#[test]
fn test_fields_expose_raw_values() {
    let handshake = ClientHelloBuilder::new(0x0303)
        .ciphers(&[0x1a1a, 0x1301])
        .extension(0x3a3a, &[])
        .extension(0x0017, &[])
        .handshake();

    let fields = parse_client_hello(&handshake).unwrap();
    assert_eq!(fields.version, 0x0303);
    assert_eq!(fields.cipher_suite_ids(), vec![0x1a1a, 0x1301]);
    assert_eq!(fields.extension_types(), vec![0x3a3a, 0x0017]);

    let decoded = assemble_segments(&fields).unwrap();
    assert_eq!(decoded.segments.ciphers, "4865");
    assert_eq!(decoded.segments.extensions, "23");
}

#[test]
fn test_not_a_client_hello() {
    let server_hello = wrap_handshake(0x02, &tls13_style_hello().body());
    assert_eq!(
        Ja3Fingerprint::from_handshake(&server_hello),
        Err(Ja3Error::NotAClientHello(0x02))
    );
}

#[test]
fn test_truncated_handshake_rejected() {
    let handshake = tls13_style_hello().handshake();
    let cut = &handshake[..handshake.len() - 5];
    let err = Ja3Fingerprint::from_handshake(cut).unwrap_err();
    assert_eq!(err.kind(), DropReason::Truncated);
}

#[test]
fn test_truncated_inside_body_rejected() {
    // handshake length is consistent, but the cipher list claims more than the body holds
    let mut body = ClientHelloBuilder::new(0x0303).ciphers(&[0x1301]).body();
    // cipher length lives right after version(2) + random(32) + session id length(1)
    body[35] = 0x00;
    body[36] = 0x40;
    let handshake = wrap_handshake(0x01, &body);
    assert!(matches!(
        Ja3Fingerprint::from_handshake(&handshake),
        Err(Ja3Error::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_odd_cipher_list_rejected() {
    let mut body = 0x0303u16.to_be_bytes().to_vec();
    body.extend_from_slice(&[0u8; 32]);
    body.push(0);
    body.extend_from_slice(&[0x00, 0x03, 0x13, 0x01, 0x13]);
    body.extend_from_slice(&[0x01, 0x00]);
    let handshake = wrap_handshake(0x01, &body);

    assert_eq!(
        Ja3Fingerprint::from_handshake(&handshake),
        Err(Ja3Error::MisalignedData { len: 3, width: 2 })
    );
}

#[test]
fn test_malformed_sni_drops_record() {
    // entry claims a 20-byte host but carries 11
    let mut entry = vec![0x00, 0x00, 20];
    entry.extend_from_slice(b"example.com");
    let handshake = ClientHelloBuilder::new(0x0303)
        .ciphers(&[0x1301])
        .extension(0x0000, &prefixed16(&entry))
        .handshake();

    let err = Ja3Fingerprint::from_handshake(&handshake).unwrap_err();
    assert_eq!(err.kind(), DropReason::MalformedExtension);
}

#[test]
fn test_unexpected_sni_name_type_accepted() {
    let mut entry = vec![0x07, 0x00, 0x04];
    entry.extend_from_slice(b"host");
    let handshake = ClientHelloBuilder::new(0x0303)
        .ciphers(&[0x1301])
        .extension(0x0000, &prefixed16(&entry))
        .handshake();

    let fp = Ja3Fingerprint::from_handshake(&handshake).unwrap();
    assert_eq!(fp.server_name_lossy().as_deref(), Some("host"));
}

#[test]
fn test_single_trailing_byte_after_compression_rejected() {
    let mut body = ClientHelloBuilder::new(0x0303).ciphers(&[0x1301]).body();
    body.push(0x00);
    let handshake = wrap_handshake(0x01, &body);
    assert!(matches!(
        Ja3Fingerprint::from_handshake(&handshake),
        Err(Ja3Error::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_matches_independent_parser() {
    let hello = ClientHelloBuilder::new(0x0303)
        .session_id(&[0x55; 32])
        .ciphers(&[0x2a2a, 0x1301, 0x1302, 0xc02b])
        .sni("cross.check")
        .curves(&[0x001d, 0x0017])
        .point_formats(&[0x00]);
    let record = hello.record();

    let (_, plaintext) = tls_parser::parse_tls_plaintext(&record).unwrap();
    let reference = plaintext
        .msg
        .iter()
        .find_map(|m| match m {
            tls_parser::TlsMessage::Handshake(tls_parser::TlsMessageHandshake::ClientHello(ch)) => {
                Some(ch)
            }
            _ => None,
        })
        .unwrap();

    let handshake = hello.handshake();
    let fields = parse_client_hello(&handshake).unwrap();
    assert_eq!(fields.version, reference.version.0);
    let reference_ciphers: Vec<u16> = reference.ciphers.iter().map(|c| c.0).collect();
    assert_eq!(fields.cipher_suite_ids(), reference_ciphers);
}
