//! # ABI Word Codec
//!
//! Solidity contract ABI encoding: 32-byte words, head/tail layout for
//! dynamic values. Only the types the collection contracts use are
//! supported.

use sha3::{Digest, Keccak256};

use crate::domain::{Address, ContractError, ContractResult, Hash, U256};

const WORD: usize = 32;

/// Declared parameter type, used to drive decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// `address`
    Address,
    /// `uint256` (and narrower uints)
    Uint,
    /// `bool`
    Bool,
    /// `bytes32`
    FixedBytes32,
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `T[]`
    Array(Box<ParamType>),
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Dynamic types are encoded out-of-line behind an offset word.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::Tuple(items) => items.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    fn head_size(&self) -> usize {
        match self {
            ParamType::Tuple(items) if !self.is_dynamic() => {
                items.iter().map(ParamType::head_size).sum()
            }
            _ => WORD,
        }
    }
}

/// An ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uint256`
    Uint(U256),
    /// `bool`
    Bool(bool),
    /// `bytes32`
    FixedBytes32(Hash),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `T[]`
    Array(Vec<Token>),
    /// `(T1,T2,...)`
    Tuple(Vec<Token>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::Tuple(items) => items.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    fn head_size(&self) -> usize {
        match self {
            Token::Tuple(items) if !self.is_dynamic() => items.iter().map(Token::head_size).sum(),
            _ => WORD,
        }
    }

    /// Unwrap a `uint256`.
    pub fn into_uint(self) -> ContractResult<U256> {
        match self {
            Token::Uint(v) => Ok(v),
            other => Err(unexpected("uint256", &other)),
        }
    }

    /// Unwrap a `bool`.
    pub fn into_bool(self) -> ContractResult<bool> {
        match self {
            Token::Bool(v) => Ok(v),
            other => Err(unexpected("bool", &other)),
        }
    }

    /// Unwrap an `address`.
    pub fn into_address(self) -> ContractResult<Address> {
        match self {
            Token::Address(v) => Ok(v),
            other => Err(unexpected("address", &other)),
        }
    }

    /// Unwrap a `bytes32`.
    pub fn into_fixed_bytes(self) -> ContractResult<Hash> {
        match self {
            Token::FixedBytes32(v) => Ok(v),
            other => Err(unexpected("bytes32", &other)),
        }
    }

    /// Unwrap a `string`.
    pub fn into_string(self) -> ContractResult<String> {
        match self {
            Token::String(v) => Ok(v),
            other => Err(unexpected("string", &other)),
        }
    }

    /// Unwrap an array.
    pub fn into_array(self) -> ContractResult<Vec<Token>> {
        match self {
            Token::Array(v) => Ok(v),
            other => Err(unexpected("array", &other)),
        }
    }

    /// Unwrap a tuple.
    pub fn into_tuple(self) -> ContractResult<Vec<Token>> {
        match self {
            Token::Tuple(v) => Ok(v),
            other => Err(unexpected("tuple", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &Token) -> ContractError {
    ContractError::Abi(format!("expected {expected}, got {got:?}"))
}

// =============================================================================
// SELECTORS
// =============================================================================

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode(args));
    data
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode a parameter list with the standard head/tail layout.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(Token::head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            tail.extend_from_slice(&encode_value(token));
        } else {
            head.extend_from_slice(&encode_value(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encode_value(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(a) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(a.as_bytes());
            word.to_vec()
        }
        Token::Uint(v) => uint_word(*v).to_vec(),
        Token::Bool(b) => uint_word(U256::from(u8::from(*b))).to_vec(),
        Token::FixedBytes32(h) => h.as_bytes().to_vec(),
        Token::Bytes(bytes) => encode_packed_bytes(bytes),
        Token::String(s) => encode_packed_bytes(s.as_bytes()),
        Token::Array(items) => {
            let mut out = uint_word(U256::from(items.len())).to_vec();
            out.extend_from_slice(&encode(items));
            out
        }
        Token::Tuple(items) => encode(items),
    }
}

fn encode_packed_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = uint_word(U256::from(bytes.len())).to_vec();
    out.extend_from_slice(bytes);
    let padding = (WORD - bytes.len() % WORD) % WORD;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

fn uint_word(v: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode return data (or calldata without selector) against `types`.
pub fn decode(types: &[ParamType], data: &[u8]) -> ContractResult<Vec<Token>> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut offset = 0;
    for ty in types {
        let token = if ty.is_dynamic() {
            let pointer = read_usize(data, offset)?;
            decode_value(ty, data, pointer)?
        } else {
            decode_value(ty, data, offset)?
        };
        tokens.push(token);
        offset += ty.head_size();
    }
    Ok(tokens)
}

/// Decode a single return value.
pub fn decode_single(ty: ParamType, data: &[u8]) -> ContractResult<Token> {
    decode(std::slice::from_ref(&ty), data)?
        .pop()
        .ok_or_else(|| ContractError::Abi("empty return data".into()))
}

fn decode_value(ty: &ParamType, data: &[u8], at: usize) -> ContractResult<Token> {
    match ty {
        ParamType::Address => {
            let word = read_word(data, at)?;
            Ok(Token::Address(Address::from_slice(&word[12..])))
        }
        ParamType::Uint => Ok(Token::Uint(U256::from_big_endian(read_word(data, at)?))),
        ParamType::Bool => {
            let word = read_word(data, at)?;
            Ok(Token::Bool(word.iter().any(|b| *b != 0)))
        }
        ParamType::FixedBytes32 => Ok(Token::FixedBytes32(Hash::from_slice(read_word(data, at)?))),
        ParamType::Bytes => Ok(Token::Bytes(read_packed_bytes(data, at)?.to_vec())),
        ParamType::String => {
            let bytes = read_packed_bytes(data, at)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|e| ContractError::Abi(format!("invalid utf-8 string: {e}")))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let body = data
                .get(at + WORD..)
                .ok_or_else(|| out_of_bounds(at + WORD, data.len()))?;
            if len.saturating_mul(inner.head_size()) > body.len() {
                return Err(ContractError::Abi(format!(
                    "array length {len} exceeds available data"
                )));
            }
            let types = vec![(**inner).clone(); len];
            decode(&types, body).map(Token::Array)
        }
        ParamType::Tuple(items) => {
            let body = data.get(at..).ok_or_else(|| out_of_bounds(at, data.len()))?;
            decode(items, body).map(Token::Tuple)
        }
    }
}

fn read_word(data: &[u8], at: usize) -> ContractResult<&[u8]> {
    data.get(at..at + WORD)
        .ok_or_else(|| out_of_bounds(at + WORD, data.len()))
}

fn read_usize(data: &[u8], at: usize) -> ContractResult<usize> {
    let v = U256::from_big_endian(read_word(data, at)?);
    if v > U256::from(u32::MAX) {
        return Err(ContractError::Abi(format!("offset or length too large: {v}")));
    }
    Ok(v.as_usize())
}

fn read_packed_bytes(data: &[u8], at: usize) -> ContractResult<&[u8]> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    data.get(start..start + len)
        .ok_or_else(|| out_of_bounds(start + len, data.len()))
}

fn out_of_bounds(needed: usize, available: usize) -> ContractError {
    ContractError::Abi(format!(
        "return data too short: need {needed} bytes, have {available}"
    ))
}
