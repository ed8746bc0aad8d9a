use certifiable_bench::hasher;

#[test]
fn empty_string_matches_nist_vector() {
    let digest = hasher::hash(b"");
    assert_eq!(
        hasher::to_hex(&digest),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn abc_matches_nist_vector() {
    let digest = hasher::hash(b"abc");
    assert_eq!(
        hasher::to_hex(&digest),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn nist_448_bit_message() {
    let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
    assert_eq!(
        hasher::to_hex(&hasher::hash(msg)),
        "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
    );
}

#[test]
fn nist_896_bit_message() {
    let msg = b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmnhijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu";
    assert_eq!(
        hasher::to_hex(&hasher::hash(msg)),
        "cf5b16a778af8380036ce59e7b0492370b249b11e8f07a51afac45037afee9d1"
    );
}

#[test]
fn one_million_a_matches_nist_vector() {
    let msg = vec![b'a'; 1_000_000];
    assert_eq!(
        hasher::to_hex(&hasher::hash(&msg)),
        "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
    );
}

#[test]
fn streaming_update_matches_one_shot() {
    let mut streaming = hasher::Sha256::new();
    streaming.update(b"ab").unwrap();
    streaming.update(b"c").unwrap();
    let streamed = streaming.finalize();
    assert_eq!(streamed, hasher::hash(b"abc"));
}

#[test]
fn hex_round_trips() {
    let digest = hasher::hash(b"round-trip");
    let hex = hasher::to_hex(&digest);
    let decoded = hasher::from_hex(&hex).unwrap();
    assert_eq!(decoded, digest);
}
