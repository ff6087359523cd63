//! # Contract Function Table
//!
//! Canonical signatures of every function the adapter calls, with typed
//! calldata builders and return decoders.

use super::codec::{decode, decode_single, encode_call, ParamType, Token};
use crate::domain::{Address, AllowlistProof, ClaimCondition, ContractResult, OwnedToken, U256};

// Shared ERC-721 reads.
/// Tokens held by an address.
pub const BALANCE_OF: &str = "balanceOf(address)";
/// Owner of a token id; reverts for unminted ids.
pub const OWNER_OF: &str = "ownerOf(uint256)";
/// Metadata URI of a token.
pub const TOKEN_URI: &str = "tokenURI(uint256)";
/// Tokens minted so far.
pub const TOTAL_MINTED: &str = "totalMinted()";

// Simple mint contract.
/// Collection cap of the simple contract.
pub const MAX_SUPPLY: &str = "maxSupply()";
/// Whether an address already minted.
pub const HAS_MINTED: &str = "hasMinted(address)";
/// All tokens of an owner with their URIs.
pub const OWNER_TOKENS_WITH_URI: &str = "ownerTokensWithURI(address)";
/// Mint one token to the sender.
pub const MINT: &str = "mint()";

// Drop contract.
/// Collection cap of the drop contract.
pub const MAX_TOTAL_SUPPLY: &str = "maxTotalSupply()";
/// Id of the condition currently accepting claims.
pub const GET_ACTIVE_CLAIM_CONDITION_ID: &str = "getActiveClaimConditionId()";
/// Claim condition record.
pub const GET_CLAIM_CONDITION_BY_ID: &str = "getClaimConditionById(uint256)";
/// Tokens a wallet claimed under a condition.
pub const GET_SUPPLY_CLAIMED_BY_WALLET: &str = "getSupplyClaimedByWallet(uint256,address)";
/// Claim tokens under the active condition.
pub const CLAIM: &str =
    "claim(address,uint256,address,uint256,(bytes32[],uint256,uint256,address),bytes)";

/// Calldata for a function without arguments.
pub fn no_args(signature: &str) -> Vec<u8> {
    encode_call(signature, &[])
}

/// Calldata for `f(address)`.
pub fn with_address(signature: &str, address: Address) -> Vec<u8> {
    encode_call(signature, &[Token::Address(address)])
}

/// Calldata for `f(uint256)`.
pub fn with_uint(signature: &str, value: U256) -> Vec<u8> {
    encode_call(signature, &[Token::Uint(value)])
}

/// Calldata for `getSupplyClaimedByWallet(conditionId, wallet)`.
pub fn supply_claimed_by_wallet(condition_id: U256, wallet: Address) -> Vec<u8> {
    encode_call(
        GET_SUPPLY_CLAIMED_BY_WALLET,
        &[Token::Uint(condition_id), Token::Address(wallet)],
    )
}

/// Calldata for the drop contract's `claim`.
pub fn claim(
    receiver: Address,
    quantity: u64,
    currency: Address,
    price_per_token: U256,
    proof: &AllowlistProof,
    data: &[u8],
) -> Vec<u8> {
    let proof_token = Token::Tuple(vec![
        Token::Array(proof.proof.iter().copied().map(Token::FixedBytes32).collect()),
        Token::Uint(proof.quantity_limit_per_wallet),
        Token::Uint(proof.price_per_token),
        Token::Address(proof.currency),
    ]);
    encode_call(
        CLAIM,
        &[
            Token::Address(receiver),
            Token::Uint(U256::from(quantity)),
            Token::Address(currency),
            Token::Uint(price_per_token),
            proof_token,
            Token::Bytes(data.to_vec()),
        ],
    )
}

/// Parameter layout of `claim`, used to inspect submitted calldata.
pub fn claim_params() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::Uint,
        ParamType::Address,
        ParamType::Uint,
        ParamType::Tuple(vec![
            ParamType::Array(Box::new(ParamType::FixedBytes32)),
            ParamType::Uint,
            ParamType::Uint,
            ParamType::Address,
        ]),
        ParamType::Bytes,
    ]
}

/// Layout of the on-chain `ClaimCondition` struct.
pub fn claim_condition_param() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::Uint,
        ParamType::Uint,
        ParamType::Uint,
        ParamType::Uint,
        ParamType::FixedBytes32,
        ParamType::Uint,
        ParamType::Address,
        ParamType::String,
    ])
}

/// Layout of `ownerTokensWithURI` results: `(uint256 tokenId, string tokenURI)[]`.
pub fn owner_tokens_param() -> ParamType {
    ParamType::Array(Box::new(ParamType::Tuple(vec![
        ParamType::Uint,
        ParamType::String,
    ])))
}

// =============================================================================
// RETURN DECODERS
// =============================================================================

/// Decode a `uint256` return.
pub fn decode_uint(data: &[u8]) -> ContractResult<U256> {
    decode_single(ParamType::Uint, data)?.into_uint()
}

/// Decode a `uint256` return that must fit in `u64`.
pub fn decode_u64(data: &[u8]) -> ContractResult<u64> {
    uint_to_u64(decode_uint(data)?)
}

/// Narrow a `uint256` to `u64`, refusing values that do not fit.
fn uint_to_u64(value: U256) -> ContractResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(crate::domain::ContractError::Abi(format!(
            "value {value} does not fit in u64"
        )));
    }
    Ok(value.as_u64())
}

/// Decode a `bool` return.
pub fn decode_bool(data: &[u8]) -> ContractResult<bool> {
    decode_single(ParamType::Bool, data)?.into_bool()
}

/// Decode an `address` return.
pub fn decode_address(data: &[u8]) -> ContractResult<Address> {
    decode_single(ParamType::Address, data)?.into_address()
}

/// Decode a `string` return.
pub fn decode_string(data: &[u8]) -> ContractResult<String> {
    decode_single(ParamType::String, data)?.into_string()
}

/// Decode a `ClaimCondition` return.
pub fn decode_claim_condition(data: &[u8]) -> ContractResult<ClaimCondition> {
    let fields = decode_single(claim_condition_param(), data)?.into_tuple()?;
    let mut it = fields.into_iter();
    let mut next = || {
        it.next()
            .ok_or_else(|| crate::domain::ContractError::Abi("claim condition truncated".into()))
    };
    Ok(ClaimCondition {
        start_timestamp: next()?.into_uint()?,
        max_claimable_supply: next()?.into_uint()?,
        supply_claimed: next()?.into_uint()?,
        quantity_limit_per_wallet: next()?.into_uint()?,
        merkle_root: next()?.into_fixed_bytes()?,
        price_per_token: next()?.into_uint()?,
        currency: next()?.into_address()?,
        metadata: next()?.into_string()?,
    })
}

/// Encode a `ClaimCondition` as return data.
pub fn encode_claim_condition(condition: &ClaimCondition) -> Vec<u8> {
    super::codec::encode(&[Token::Tuple(vec![
        Token::Uint(condition.start_timestamp),
        Token::Uint(condition.max_claimable_supply),
        Token::Uint(condition.supply_claimed),
        Token::Uint(condition.quantity_limit_per_wallet),
        Token::FixedBytes32(condition.merkle_root),
        Token::Uint(condition.price_per_token),
        Token::Address(condition.currency),
        Token::String(condition.metadata.clone()),
    ])])
}

/// Decode `ownerTokensWithURI` results.
pub fn decode_owner_tokens(data: &[u8]) -> ContractResult<Vec<OwnedToken>> {
    let entries = decode_single(owner_tokens_param(), data)?.into_array()?;
    entries
        .into_iter()
        .map(|entry| {
            let mut fields = entry.into_tuple()?.into_iter();
            let id = fields
                .next()
                .ok_or_else(|| crate::domain::ContractError::Abi("missing tokenId".into()))?
                .into_uint()?;
            let uri = fields
                .next()
                .ok_or_else(|| crate::domain::ContractError::Abi("missing tokenURI".into()))?
                .into_string()?;
            Ok(OwnedToken {
                token_id: uint_to_u64(id)?,
                token_uri: uri,
            })
        })
        .collect()
}

/// Encode `ownerTokensWithURI` results.
pub fn encode_owner_tokens(tokens: &[OwnedToken]) -> Vec<u8> {
    super::codec::encode(&[Token::Array(
        tokens
            .iter()
            .map(|t| {
                Token::Tuple(vec![
                    Token::Uint(U256::from(t.token_id)),
                    Token::String(t.token_uri.clone()),
                ])
            })
            .collect(),
    )])
}

/// Decode submitted `claim` calldata (selector stripped) into its arguments.
pub fn decode_claim_args(args: &[u8]) -> ContractResult<Vec<Token>> {
    decode(&claim_params(), args)
}
