//! Token 工厂的集成测试：名称解析、哈希参考值、文本形式与哈希空间边界。

use std::sync::Arc;

use bytes::Bytes;
use num_bigint::BigInt;
use tessera_ring::{
    ByteOrderedFactory, Murmur3Factory, RandomFactory, Token, TokenFactory, TokenRange, codes,
    factory_for,
};

#[test]
fn murmur3_hashes_match_reference_tokens() {
    let factory = factory_for("org.apache.cassandra.dht.Murmur3Partitioner").unwrap();
    let cases: [(&[u8], i64); 4] = [
        (&b"123"[..], -7_468_325_962_851_647_638),
        (
            &b"The quick brown fox jumps over the lazy dog"[..],
            -2_068_352_364_225_029_268,
        ),
        (&b"a"[..], -8_839_064_797_231_613_815),
        (&b""[..], 0),
    ];
    for (key, expected) in cases {
        assert_eq!(factory.hash(key), Token::Murmur3(expected));
    }
    assert_eq!(factory.min_token(), Token::Murmur3(i64::MIN));
}

#[test]
fn random_hashes_match_reference_tokens() {
    let factory = factory_for("RandomPartitioner").unwrap();
    let expected: BigInt = "80325066489831061459460196859901989661".parse().unwrap();
    assert_eq!(factory.hash(b"key"), Token::Random(expected));
    assert_eq!(factory.min_token(), Token::Random(BigInt::from(-1)));

    let hashed = factory.hash(b"The quick brown fox jumps over the lazy dog");
    assert!(factory.owns(&hashed));
    assert!(factory.min_token() < hashed);
}

#[test]
fn textual_tokens_round_trip() {
    let factories: [Arc<dyn TokenFactory>; 3] = [
        Arc::new(Murmur3Factory),
        Arc::new(RandomFactory),
        Arc::new(ByteOrderedFactory),
    ];
    for factory in factories {
        for key in [&b"alpha"[..], &b""[..], &[0xff, 0x00][..]] {
            let token = factory.hash(key);
            let parsed = factory.from_string(&token.to_string()).unwrap();
            assert_eq!(parsed, token, "{}", factory.name());
        }
        let err = factory.from_string("not a token").unwrap_err();
        assert_eq!(err.code(), codes::RING_INVALID_TOKEN);
    }
}

#[test]
fn factories_only_own_their_hash_space() {
    let murmur = Murmur3Factory;
    let random = RandomFactory;
    let ordered = ByteOrderedFactory;

    assert!(murmur.owns(&Token::Murmur3(0)));
    assert!(!murmur.owns(&Token::ByteOrdered(Bytes::new())));
    assert!(!random.owns(&Token::Random(RandomFactory::max_value() + BigInt::from(1))));
    assert!(ordered.owns(&Token::ByteOrdered(Bytes::from_static(b"k"))));

    let err = TokenRange::new(
        Token::Random(BigInt::from(-5)),
        Token::Random(BigInt::from(5)),
        Arc::new(RandomFactory),
    )
    .unwrap_err();
    assert_eq!(err.code(), codes::RING_INVALID_TOKEN);
}

#[test]
fn byte_ordered_ranges_split_and_contain_keys() {
    let factory: Arc<dyn TokenFactory> = Arc::new(ByteOrderedFactory);
    let whole = TokenRange::new(
        factory.from_string("0x10").unwrap(),
        factory.from_string("0x20").unwrap(),
        Arc::clone(&factory),
    )
    .unwrap();
    assert!(whole.contains(&factory.hash(b"\x15abc")));
    assert!(!whole.contains(&factory.hash(b"\x10")));

    let pieces = whole.split_evenly(4).unwrap();
    let bounds: Vec<String> = pieces.iter().map(ToString::to_string).collect();
    assert_eq!(
        bounds,
        ["]0x10, 0x14]", "]0x14, 0x18]", "]0x18, 0x1c]", "]0x1c, 0x20]"]
    );
}

#[test]
fn random_full_ring_splits_at_even_fractions() {
    let factory: Arc<dyn TokenFactory> = Arc::new(RandomFactory);
    let min = factory.min_token();
    let full = TokenRange::new(min.clone(), min, Arc::clone(&factory)).unwrap();
    let pieces = full.split_evenly(2).unwrap();
    let half = (RandomFactory::max_value() >> 1usize) - BigInt::from(1);
    assert_eq!(pieces[0].end(), &Token::Random(half));
    assert_eq!(pieces[1].end(), full.end());
}
