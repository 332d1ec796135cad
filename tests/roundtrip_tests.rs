//! End-to-end encode/decode tests, including damage recovery.
//!
//! Run with `RUST_LOG=qr_symbol=debug` to see the pipeline stage events
//! while chasing a failure.

use std::sync::Once;

use qr_symbol::matrix::{zigzag, FunctionMatrix};
use qr_symbol::models::Module;
use qr_symbol::{
    decode, encode, DecodeError, ECLevel, EncodeOptions, MaskPattern, Mode, TriStateSymbol,
    Version,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn options(level: ECLevel) -> EncodeOptions {
    EncodeOptions {
        ec_level: Some(level),
        ..Default::default()
    }
}

/// Flip the modules carrying the first `codewords` interleaved
/// codewords, which injects exactly that many codeword errors.
fn damage_codewords(input: &mut TriStateSymbol, version: Version, codewords: usize) {
    let function = FunctionMatrix::build(version);
    let coords = zigzag::data_coordinates(&function.roles);
    for &(r, c) in coords.iter().take(codewords * 8) {
        let flipped = match input.matrix.get(r, c) {
            Module::Dark => Module::Light,
            _ => Module::Dark,
        };
        input.matrix.set(r, c, flipped);
    }
}

#[test]
fn clean_roundtrips_across_payloads_and_levels() {
    init_tracing();
    let payloads = [
        ("123", Some(Mode::Numeric)),
        ("00000000", Some(Mode::Numeric)),
        ("HELLO WORLD $%*+-./:", Some(Mode::Alphanumeric)),
        ("Hello, wörld!", Some(Mode::Byte)),
        ("mixed Payload 123", None),
    ];
    for level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
        for (text, mode) in payloads {
            let symbol = encode(
                text,
                &EncodeOptions {
                    ec_level: Some(level),
                    mode,
                    ..Default::default()
                },
            )
            .unwrap();
            let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
            assert!(
                outcome.succeeded(),
                "{} {text:?}: {:?}",
                level.letter(),
                outcome.failure
            );
            assert_eq!(outcome.text, text);
            assert_eq!(outcome.corrected_errors, 0);
            assert_eq!(outcome.confidence, 1.0);
        }
    }
}

#[test]
fn clean_roundtrips_across_pinned_versions() {
    init_tracing();
    // "A1" fits every version/level combination, down to v1-H.
    for version in [1u8, 2, 5, 7, 10] {
        for level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            let symbol = encode(
                "A1",
                &EncodeOptions {
                    ec_level: Some(level),
                    version: Some(Version::new(version).unwrap()),
                    ..Default::default()
                },
            )
            .unwrap();
            assert_eq!(symbol.version.number(), version);
            let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
            assert!(
                outcome.succeeded(),
                "v{version}-{}: {:?}",
                level.letter(),
                outcome.failure
            );
            assert_eq!(outcome.text, "A1");
            assert_eq!(outcome.confidence, 1.0);
        }
    }
}

#[test]
fn roundtrip_with_every_fixed_mask() {
    init_tracing();
    for pattern in MaskPattern::ALL {
        let symbol = encode(
            "MASKED",
            &EncodeOptions {
                mask: Some(pattern),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(symbol.mask_pattern, pattern);
        let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
        assert!(outcome.succeeded(), "pattern {}", pattern.index());
        assert_eq!(outcome.text, "MASKED");
        assert_eq!(outcome.format.unwrap().mask_pattern, pattern);
    }
}

#[test]
fn damage_within_capacity_recovers() {
    init_tracing();
    // v2-M is a single block with 16 EC codewords: 8 correctable.
    let symbol = encode(
        "damage tolerance",
        &EncodeOptions {
            ec_level: Some(ECLevel::M),
            version: Some(Version::new(2).unwrap()),
            ..Default::default()
        },
    )
    .unwrap();

    for damaged_codewords in [1usize, 3, 8] {
        let mut input = TriStateSymbol::from_encoded(&symbol);
        damage_codewords(&mut input, symbol.version, damaged_codewords);
        let outcome = decode(&input);
        assert!(outcome.succeeded(), "{damaged_codewords} damaged codewords");
        assert_eq!(outcome.text, "damage tolerance");
        assert_eq!(outcome.corrected_errors, damaged_codewords);
        assert!(outcome.confidence >= 0.9);
    }
}

#[test]
fn damage_beyond_capacity_is_flagged_not_guessed() {
    init_tracing();
    // v1-L has 7 EC codewords: at most 3 correctable.
    let symbol = encode(
        "FRAGILE",
        &EncodeOptions {
            ec_level: Some(ECLevel::L),
            version: Some(Version::new(1).unwrap()),
            ..Default::default()
        },
    )
    .unwrap();

    let mut input = TriStateSymbol::from_encoded(&symbol);
    damage_codewords(&mut input, symbol.version, 6);
    let outcome = decode(&input);
    assert!(!outcome.recoverable);
    assert!(matches!(
        outcome.failure,
        Some(DecodeError::Uncorrectable { failed: 1, total: 1 })
    ));
    assert!(outcome.confidence < 1.0);
}

#[test]
fn multi_block_damage_spreads_over_blocks() {
    init_tracing();
    // v5-Q: four blocks, 18 EC codewords each (9 correctable per block).
    // Damaging the first 16 interleaved codewords puts 4 errors in every
    // block thanks to the round-robin order.
    let text = "interleaving spreads damage across blocks";
    let symbol = encode(
        text,
        &EncodeOptions {
            ec_level: Some(ECLevel::Q),
            version: Some(Version::new(5).unwrap()),
            ..Default::default()
        },
    )
    .unwrap();

    let mut input = TriStateSymbol::from_encoded(&symbol);
    damage_codewords(&mut input, symbol.version, 16);
    let outcome = decode(&input);
    assert!(outcome.succeeded(), "{:?}", outcome.failure);
    assert_eq!(outcome.text, text);
    assert_eq!(outcome.corrected_errors, 16);
}

#[test]
fn unknown_modules_count_as_light_and_are_corrected() {
    init_tracing();
    let symbol = encode("unknown modules", &options(ECLevel::Q)).unwrap();
    let mut input = TriStateSymbol::from_encoded(&symbol);

    let function = FunctionMatrix::build(symbol.version);
    let coords = zigzag::data_coordinates(&function.roles);
    for &(r, c) in coords.iter().take(8) {
        input.matrix.set(r, c, Module::Unknown);
    }

    let outcome = decode(&input);
    assert!(outcome.succeeded(), "{:?}", outcome.failure);
    assert_eq!(outcome.text, "unknown modules");
    assert!(outcome.confidence < 1.0);
}

#[test]
fn automatic_selection_picks_minimal_symbol() {
    init_tracing();
    let symbol = encode("123", &EncodeOptions::default()).unwrap();
    assert_eq!(symbol.version.number(), 1);
    assert_eq!(symbol.modules.size(), 21);

    let big = encode(&"9".repeat(200), &EncodeOptions::default()).unwrap();
    assert!(big.version.number() > 1);
    let outcome = decode(&TriStateSymbol::from_encoded(&big));
    assert_eq!(outcome.text, "9".repeat(200));
}

#[test]
fn version_seven_carries_version_info() {
    init_tracing();
    let symbol = encode(
        "needs version info blocks",
        &EncodeOptions {
            version: Some(Version::new(7).unwrap()),
            ..Default::default()
        },
    )
    .unwrap();
    let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
    assert!(outcome.succeeded());
    assert_eq!(outcome.version_info.unwrap().version, 7);

    // Damage one version block; the redundant copy still carries it.
    let mut input = TriStateSymbol::from_encoded(&symbol);
    for row in 0..6 {
        for col in 34..37 {
            input.matrix.set(row, col, Module::Unknown);
        }
    }
    let outcome = decode(&input);
    assert!(outcome.succeeded(), "{:?}", outcome.failure);
    assert_eq!(outcome.version_info.unwrap().version, 7);
}

#[test]
fn decoded_segments_carry_mode_and_counts() {
    init_tracing();
    let symbol = encode("HELLO WORLD", &EncodeOptions::default()).unwrap();
    let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
    assert_eq!(outcome.segments.len(), 1);
    assert_eq!(outcome.segments[0].mode, Mode::Alphanumeric);
    assert_eq!(outcome.segments[0].character_count, 11);
}
