// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Signing primitives for Ethereum-, Bitcoin- and Solana-style stacks.
//!
//! Every operation is a pure function of its byte inputs: there is no
//! shared state, no I/O and no runtime table building, so concurrent
//! callers need no synchronization.
//!
//! * [`publickey`] — secp256k1 key derivation, addresses, recoverable
//!   ECDSA and public key recovery.
//! * [`ed25519`] — RFC 8032 key derivation, sign and verify.
//! * [`signing`] — EIP-712 typed-data hashing and BIP-137 signed
//!   messages, built on the above.

mod error;
mod math;

pub mod ed25519;
pub mod publickey;
pub mod signing;

pub use error::Error;
pub use keccak256::{keccak, Keccak256};
