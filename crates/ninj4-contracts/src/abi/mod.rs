//! # Contract ABI
//!
//! Word-level codec plus the function table of both contract shapes.

pub mod codec;
pub mod functions;

pub use codec::{decode, decode_single, encode, encode_call, selector, ParamType, Token};
