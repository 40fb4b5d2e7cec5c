//! RLP helpers that wrap `alloy-rlp` for legacy transaction encoding.
//!
//! Field encoding comes straight from `alloy_rlp::Encodable` (integers as
//! minimal big-endian strings, addresses and calldata as byte strings); the
//! one helper here wraps an already-encoded payload in a list header.

use alloy_rlp::Header;

/// Wraps a concatenation of individually encoded items in a list header.
pub fn encode_list(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 9);
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use alloy_rlp::Encodable;

    // Vectors from the RLP definition in the Ethereum yellow paper appendix.

    #[test]
    fn test_empty_list() {
        assert_eq!(encode_list(&[]), vec![0xc0]);
    }

    #[test]
    fn test_cat_dog_list() {
        let mut payload = Vec::new();
        b"cat".as_slice().encode(&mut payload);
        b"dog".as_slice().encode(&mut payload);
        assert_eq!(
            encode_list(&payload),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_long_payload_uses_length_of_length_form() {
        // 56 bytes of payload crosses into the long-list form.
        let payload = vec![0x01; 56];
        let encoded = encode_list(&payload);
        assert_eq!(&encoded[..2], &[0xf8, 56]);
        assert_eq!(&encoded[2..], payload.as_slice());
    }

    #[test]
    fn test_integer_zero_is_empty_string() {
        let mut out = Vec::new();
        0u64.encode(&mut out);
        assert_eq!(out, vec![0x80]);

        let mut out = Vec::new();
        U256::ZERO.encode(&mut out);
        assert_eq!(out, vec![0x80]);
    }

    #[test]
    fn test_small_integer_is_minimal_big_endian() {
        let mut out = Vec::new();
        1024u64.encode(&mut out);
        assert_eq!(out, vec![0x82, 0x04, 0x00]);
    }

    #[test]
    fn test_byte_string() {
        let mut out = Vec::new();
        b"dog".as_slice().encode(&mut out);
        assert_eq!(out, vec![0x83, b'd', b'o', b'g']);
    }
}
