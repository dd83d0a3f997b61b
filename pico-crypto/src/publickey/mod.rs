// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! secp256k1 key derivation, recoverable ECDSA and public key recovery.

mod curve;
mod keypair;
mod secret;
mod signature;

pub use self::keypair::{
	address_to_hex, public_from_secret, public_from_uncompressed, public_to_address, public_to_uncompressed, KeyPair,
};
pub use self::secret::Secret;
pub use self::signature::{recover, sign_recoverable, verify_address, verify_public, Signature};
pub use crate::error::Error;

use primitive_types::{H160, H256, H512};

/// The X ‖ Y coordinates of an uncompressed public key.
pub type Public = H512;
/// An Ethereum address: the trailing 20 bytes of the Keccak-256 hash of
/// the public key.
pub type Address = H160;
/// A 32-byte message hash to sign.
pub type Message = H256;
