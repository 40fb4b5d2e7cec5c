//! ABI calldata builders for the ClawBazaar contracts.
//!
//! Covers the handful of functions the CLI calls: edition minting and
//! creation on the editions contract, listing and buying on the
//! marketplace, and approve/balanceOf on the BZAAR token.

use alloy_primitives::{keccak256, Address, U256};

use crate::ChainError;

/// Computes the 4-byte function selector for a canonical signature,
/// e.g. `"approve(address,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Left-pads an address into a 32-byte ABI word.
pub fn encode_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// Encodes a uint256 as a 32-byte ABI word.
pub fn encode_u256(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

/// Concatenates a selector and static words into calldata.
fn calldata(signature: &str, words: &[[u8; 32]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + words.len() * 32);
    out.extend_from_slice(&selector(signature));
    for word in words {
        out.extend_from_slice(word);
    }
    out
}

/// ABI-encodes a dynamic string: offset handled by the caller; this returns
/// the tail (length word + padded bytes).
fn encode_string_tail(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let mut out = encode_u256(U256::from(bytes.len())).to_vec();
    out.extend_from_slice(bytes);
    let padding = (32 - bytes.len() % 32) % 32;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

/// `mintEdition(uint256 editionId, uint256 amount)` on the editions contract.
pub fn mint_edition(edition_id: u64, amount: u64) -> Vec<u8> {
    calldata(
        "mintEdition(uint256,uint256)",
        &[
            encode_u256(U256::from(edition_id)),
            encode_u256(U256::from(amount)),
        ],
    )
}

/// `createEdition(uint256 maxSupply, uint256 price, uint256 royaltyBps,
/// string metadataUri)` on the editions contract.
pub fn create_edition(max_supply: u64, price: U256, royalty_bps: u64, metadata_uri: &str) -> Vec<u8> {
    let mut out = calldata(
        "createEdition(uint256,uint256,uint256,string)",
        &[
            encode_u256(U256::from(max_supply)),
            encode_u256(price),
            encode_u256(U256::from(royalty_bps)),
            // Offset of the string tail relative to the start of the
            // arguments: four head words.
            encode_u256(U256::from(4 * 32)),
        ],
    );
    out.extend(encode_string_tail(metadata_uri));
    out
}

/// `listItem(uint256 tokenId, uint256 price)` on the marketplace.
pub fn list_item(token_id: u64, price: U256) -> Vec<u8> {
    calldata(
        "listItem(uint256,uint256)",
        &[encode_u256(U256::from(token_id)), encode_u256(price)],
    )
}

/// `buyItem(uint256 tokenId)` on the marketplace.
pub fn buy_item(token_id: u64) -> Vec<u8> {
    calldata("buyItem(uint256)", &[encode_u256(U256::from(token_id))])
}

/// ERC-20 `approve(address spender, uint256 amount)` on the BZAAR token.
pub fn approve(spender: Address, amount: U256) -> Vec<u8> {
    calldata(
        "approve(address,uint256)",
        &[encode_address(spender), encode_u256(amount)],
    )
}

/// ERC-20 `balanceOf(address owner)` on the BZAAR token.
pub fn balance_of(owner: Address) -> Vec<u8> {
    calldata("balanceOf(address)", &[encode_address(owner)])
}

/// Decodes a single uint256 from an `eth_call` result.
pub fn decode_u256(result_hex: &str) -> Result<U256, ChainError> {
    let stripped = result_hex.trim_start_matches("0x");
    if stripped.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(stripped, 16)
        .map_err(|e| ChainError::BadResponse(format!("not a uint256: {} ({})", result_hex, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Selector vectors for the standard ERC-20 functions are published and
    // fixed; they pin the keccak path.
    #[test]
    fn test_known_erc20_selectors() {
        assert_eq!(hex::encode(selector("approve(address,uint256)")), "095ea7b3");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_encode_address_left_pads() {
        let addr: Address = "0x3535353535353535353535353535353535353535"
            .parse()
            .unwrap();
        let word = encode_address(addr);
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], addr.as_slice());
    }

    #[test]
    fn test_approve_calldata_layout() {
        let spender: Address = "0x3535353535353535353535353535353535353535"
            .parse()
            .unwrap();
        let data = approve(spender, U256::from(1000u64));
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &selector("approve(address,uint256)"));
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(1000u64));
    }

    #[test]
    fn test_buy_item_calldata() {
        let data = buy_item(7);
        assert_eq!(data.len(), 36);
        assert_eq!(U256::from_be_slice(&data[4..36]), U256::from(7u64));
    }

    #[test]
    fn test_mint_edition_calldata() {
        let data = mint_edition(3, 2);
        assert_eq!(data.len(), 68);
        assert_eq!(U256::from_be_slice(&data[4..36]), U256::from(3u64));
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(2u64));
    }

    #[test]
    fn test_create_edition_dynamic_string_layout() {
        let data = create_edition(100, U256::from(5u64), 500, "ipfs://QmMeta");

        // Head: selector + 4 words; offset word points past the head.
        assert_eq!(U256::from_be_slice(&data[4 + 96..4 + 128]), U256::from(128u64));

        // Tail: length word then the padded string.
        let tail = &data[4 + 128..];
        assert_eq!(U256::from_be_slice(&tail[..32]), U256::from(13u64));
        assert_eq!(&tail[32..32 + 13], b"ipfs://QmMeta");
        assert_eq!(tail.len(), 32 + 32); // 13 bytes padded to one word
        assert!(tail[32 + 13..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_string_tail_exact_word_has_no_padding() {
        let s = "a".repeat(32);
        let tail = encode_string_tail(&s);
        assert_eq!(tail.len(), 64);
    }

    #[test]
    fn test_decode_u256() {
        assert_eq!(decode_u256("0x0").unwrap(), U256::ZERO);
        assert_eq!(decode_u256("0x").unwrap(), U256::ZERO);
        assert_eq!(
            decode_u256("0x00000000000000000000000000000000000000000000000000000000000003e8")
                .unwrap(),
            U256::from(1000u64)
        );
        assert!(decode_u256("0xzz").is_err());
    }
}
