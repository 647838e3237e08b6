//! Property-based tests for the msdecomp decoders
//!
//! Random inputs must only ever produce errors, never panics, and the
//! structures with a simple reference model must agree with it.

use msdecomp::bit_reader::LsbBitReader;
use msdecomp::huffman::{HuffmanTable, SymbolMap};
use msdecomp::mszip::MszipState;
use msdecomp::window::SlidingWindow;
use msdecomp::{expand_bytes, LzState, QuantumState, SzddHeader};
use proptest::prelude::*;

fn literal_file(data: &[u8]) -> Vec<u8> {
    let header = SzddHeader {
        compression_type: b'A',
        missing_char: b'x',
        real_length: data.len() as u32,
    };
    let mut file = header.to_bytes().to_vec();
    for chunk in data.chunks(8) {
        file.push(0xFF);
        file.extend_from_slice(chunk);
    }
    file
}

proptest! {
    #[test]
    fn test_mszip_never_panics(
        body in prop::collection::vec(any::<u8>(), 0..600),
        output_len in 0usize..40_000
    ) {
        let mut block = b"CK".to_vec();
        block.extend(body);
        let mut state = MszipState::new();
        let mut output = vec![0u8; output_len];
        let _ = state.decompress(&block, block.len(), &mut output, output_len);
    }
}

proptest! {
    #[test]
    fn test_quantum_never_panics(
        input in prop::collection::vec(any::<u8>(), 0..400),
        window_bits in 10u8..=21,
        output_len in 0usize..1024
    ) {
        let mut state = QuantumState::new(window_bits, 0).unwrap();
        let mut output = vec![0u8; output_len];
        for _ in 0..2 {
            if state.decompress(&input, input.len(), &mut output, output_len).is_err() {
                break;
            }
        }
    }
}

proptest! {
    #[test]
    fn test_szdd_payload_never_panics(
        payload in prop::collection::vec(any::<u8>(), 0..500),
        real_length in 0u32..3000
    ) {
        let header = SzddHeader {
            compression_type: b'A',
            missing_char: 0,
            real_length,
        };
        let mut file = header.to_bytes().to_vec();
        file.extend(payload);
        let _ = expand_bytes(&file);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_szdd_literal_round_trip(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let file = literal_file(&data);
        prop_assert_eq!(expand_bytes(&file).unwrap(), data);
    }
}

proptest! {
    #[test]
    fn test_szdd_split_calls_match_single_call(
        data in prop::collection::vec(any::<u8>(), 1..500),
        split in 0usize..500
    ) {
        let file = literal_file(&data);
        let payload = &file[14..];
        let split = split % data.len();

        let mut state = LzState::new();
        let mut output = vec![0u8; data.len()];
        let (first, second) = output.split_at_mut(split);
        state.decompress(payload, payload.len(), first, split).unwrap();
        state.decompress(payload, payload.len(), second, data.len() - split).unwrap();
        prop_assert_eq!(output, data);
    }
}

proptest! {
    #[test]
    fn test_huffman_build_never_panics(
        lengths in prop::collection::vec(0u8..=16, 0..320),
        root_bits in 1u8..=10,
        stream in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        if let Ok(table) = HuffmanTable::build(&lengths, SymbolMap::IDENTITY, root_bits) {
            if !table.is_empty() {
                let mut bits = LsbBitReader::new(&stream);
                for _ in 0..32 {
                    if table.decode(&mut bits).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn test_window_matches_naive_copy(
        literals in prop::collection::vec(any::<u8>(), 1..300),
        matches in prop::collection::vec((1usize..400, 0usize..300), 0..20)
    ) {
        let mut window = SlidingWindow::new(256);
        let mut history = literals.clone();
        window.extend_from_slice(&literals);

        for (distance, length) in matches {
            let reachable = history.len().min(256);
            let result = window.copy_match(distance, length);
            if distance > reachable {
                prop_assert!(result.is_err());
                continue;
            }
            prop_assert!(result.is_ok());
            for _ in 0..length {
                let byte = history[history.len() - distance];
                history.push(byte);
            }
        }

        // A cursor of 0 means the last write ended exactly at the buffer end
        let len = if window.position() == 0 { 256 } else { window.position() };
        prop_assert_eq!(window.recent(len).unwrap(), &history[history.len() - len..]);
    }
}
