//! Tests for the payload transforms.

use rstest::rstest;

use super::{
    Identity,
    PayloadTransform,
    Seal,
    SealKey,
    Sha256Digest,
    TransformError,
    TransformKind,
    associated_data,
    sha256_hex,
};
use crate::frame::{Capcode, FrameMetadata, parse_line};

const KEY_HEX: &str = "12C000EF88068E0777118C20DEEB2702F22A06042E3534DBCD9CE1EAC9175DE9";

fn key() -> SealKey { KEY_HEX.parse().expect("valid key") }

fn rows(lines: &[&str]) -> Vec<FrameMetadata> {
    lines
        .iter()
        .map(|line| parse_line(line).expect("valid frame").metadata)
        .collect()
}

#[test]
fn identity_keeps_text_and_capcode() {
    let capcode = Capcode::from("0001234567");
    assert_eq!(
        Identity.transform_text("HELLO WORLD").expect("infallible"),
        "HELLO WORLD"
    );
    assert_eq!(Identity.transform_capcode(&capcode), capcode);
}

#[test]
fn digest_matches_known_vector() {
    assert_eq!(
        sha256_hex("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[rstest]
#[case("HELLO WORLD")]
#[case("")]
#[case("PT IN 413 STILL C/O PAIN")]
fn digest_is_stable(#[case] text: &str) {
    let digest = Sha256Digest::default();
    let first = digest.transform_text(text).expect("digest never fails");
    let second = digest.transform_text(text).expect("digest never fails");
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert_ne!(first, text);
}

#[rstest]
#[case(false)]
#[case(true)]
fn capcode_digest_is_opt_in(#[case] capcodes: bool) {
    let capcode = Capcode::from("0001234567");
    let transformed = Sha256Digest { capcodes }.transform_capcode(&capcode);
    if capcodes {
        assert_eq!(transformed.as_str(), sha256_hex("0001234567"));
    } else {
        assert_eq!(transformed, capcode);
    }
}

#[test]
fn seal_round_trips_and_uses_fresh_nonces() {
    let seal = Seal::new(&key());
    let plaintext = "PT IN 413 DOE, JANE 37F";

    let first = seal.transform_text(plaintext).expect("seal succeeds");
    let second = seal.transform_text(plaintext).expect("seal succeeds");

    assert_ne!(first, second);
    assert!(!first.contains(plaintext));
    assert_eq!(seal.open(&first, &[]).expect("open succeeds"), plaintext);
    assert_eq!(seal.open(&second, &[]).expect("open succeeds"), plaintext);
}

#[test]
fn seal_rejects_tampered_records() {
    let seal = Seal::new(&key());
    let mut record = seal.seal(b"WORLD", b"08.103.C").expect("seal succeeds");
    let flipped = if record.ends_with('0') { '1' } else { '0' };
    record.pop();
    record.push(flipped);

    assert!(matches!(
        seal.open(&record, b"08.103.C"),
        Err(TransformError::Open)
    ));
    assert!(matches!(
        seal.open("ABCD", &[]),
        Err(TransformError::Truncated { len: 2 })
    ));
    assert!(matches!(
        seal.open("not hex", &[]),
        Err(TransformError::RecordEncoding(_))
    ));
}

#[test]
fn sealed_message_is_bound_to_first_fragment_timing() {
    let seal = Seal::new(&key());
    let message = rows(&[
        "FLEX|1600/2|08.103.C|0001234567|LS|5|ALN|3.1.F|HELLO ",
        "FLEX|1600/2|08.104.C|0001234567|LS|5|ALN|0.0.C|WORLD",
    ]);
    let other = rows(&["FLEX|1600/2|09.001.A|0007654321|LS|5|ALN|3.0.K|HI"]);
    assert_eq!(associated_data(&message), "08.103.C");

    let record = seal
        .transform_message(&message, "HELLO WORLD")
        .expect("seal succeeds");

    assert_eq!(
        seal.open(&record, associated_data(&message).as_bytes())
            .expect("open succeeds"),
        "HELLO WORLD"
    );
    assert!(matches!(
        seal.open(&record, associated_data(&other).as_bytes()),
        Err(TransformError::Open)
    ));
    assert!(matches!(seal.open(&record, &[]), Err(TransformError::Open)));
}

#[test]
fn unbound_transforms_ignore_metadata() {
    let message = rows(&["FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.0.K|HELLO"]);
    assert_eq!(
        Identity
            .transform_message(&message, "HELLO")
            .expect("infallible"),
        "HELLO"
    );
    assert_eq!(
        Sha256Digest::default()
            .transform_message(&message, "HELLO")
            .expect("infallible"),
        sha256_hex("HELLO")
    );
    assert!(associated_data(&[]).is_empty());
}

#[rstest]
#[case("zz", "not valid hex")]
#[case("0011", "must be 32 bytes")]
fn seal_key_parsing_fails_closed(#[case] input: &str, #[case] message: &str) {
    let err = input.parse::<SealKey>().expect_err("invalid key");
    assert!(err.to_string().contains(message), "unexpected error: {err}");
}

#[test]
fn seal_key_debug_hides_material() {
    assert_eq!(format!("{:?}", key()), "SealKey(..)");
}

#[test]
fn closures_act_as_transforms() {
    let redact = |text: &str| "*".repeat(text.len());
    assert_eq!(redact.transform_text("abc").expect("infallible"), "***");
}

#[rstest]
#[case(TransformKind::Identity, "HELLO")]
#[case(TransformKind::Digest, "3733cd977ff8eb18b987357e22ced99f46097f31ecb239e878ae63760e83e4d5")]
fn kinds_build_their_transform(#[case] kind: TransformKind, #[case] expected: &str) {
    let transform = kind.build();
    assert_eq!(transform.transform_text("HELLO").expect("infallible"), expected);
}

#[test]
fn digest_all_rewrites_capcodes() {
    let transform = TransformKind::DigestAll.build();
    let capcode = Capcode::from("0001234567");
    assert_eq!(
        transform.transform_capcode(&capcode).as_str(),
        sha256_hex("0001234567")
    );
}
