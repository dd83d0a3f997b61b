// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ed25519 signatures per RFC 8032.
//!
//! Keys are 32-byte seeds; public keys are compressed points; signatures
//! are `R ‖ s` with s little-endian. `verify` answers with a boolean and
//! never fails.

mod point;

use std::convert::TryFrom;

use primitive_types::{U256, U512};
use sha2::{Digest, Sha512};

use self::point::{ExtendedPoint, GROUP_ORDER};
use crate::math::{mod_add, mod_mul};
use crate::Error;

/// Expands a 32-byte seed into the clamped scalar and the signing prefix
/// (RFC 8032, section 5.1.5).
fn expand_seed(seed: &[u8]) -> Result<(U256, [u8; 32]), Error> {
	if seed.len() != 32 {
		return Err(Error::InvalidLength);
	}
	let digest = Sha512::digest(seed);
	let mut scalar = U256::from_little_endian(&digest[0..32]);
	// Clamp: clear the cofactor bits and the top bit, set bit 254.
	scalar = scalar & ((U256::one() << 254) - U256::from(8));
	scalar = scalar | (U256::one() << 254);
	let mut prefix = [0u8; 32];
	prefix.copy_from_slice(&digest[32..64]);
	Ok((scalar, prefix))
}

/// SHA-512 over the concatenated parts, as a little-endian integer mod L.
fn sha512_mod_order(parts: &[&[u8]]) -> U256 {
	let mut hasher = Sha512::new();
	for part in parts {
		hasher.update(part);
	}
	let digest = hasher.finalize();
	let wide = U512::from_little_endian(&digest) % U512::from(GROUP_ORDER);
	U256::try_from(wide).expect("reduced below a 256-bit modulus; qed")
}

/// Derives the 32-byte public key of a seed.
pub fn public_key(seed: &[u8]) -> Result<[u8; 32], Error> {
	let (scalar, _) = expand_seed(seed)?;
	Ok(ExtendedPoint::base().mul(scalar).compress())
}

/// Signs `message` with the seed (RFC 8032, section 5.1.6).
pub fn sign(message: &[u8], seed: &[u8]) -> Result<[u8; 64], Error> {
	let (scalar, prefix) = expand_seed(seed)?;
	let public = ExtendedPoint::base().mul(scalar).compress();

	let r = sha512_mod_order(&[&prefix, message]);
	let r_encoded = ExtendedPoint::base().mul(r).compress();
	let challenge = sha512_mod_order(&[&r_encoded, &public, message]);
	let s = mod_add(r, mod_mul(challenge, scalar, GROUP_ORDER), GROUP_ORDER);

	let mut signature = [0u8; 64];
	signature[0..32].copy_from_slice(&r_encoded);
	s.to_little_endian(&mut signature[32..64]);
	Ok(signature)
}

/// Verifies a signature (RFC 8032, section 5.1.7). Any malformed input
/// yields `false`.
pub fn verify(message: &[u8], signature: &[u8], public: &[u8]) -> bool {
	if signature.len() != 64 || public.len() != 32 {
		return false;
	}
	let mut public_bytes = [0u8; 32];
	public_bytes.copy_from_slice(public);
	let a = match ExtendedPoint::decompress(&public_bytes) {
		Some(point) => point,
		None => return false,
	};
	let mut r_bytes = [0u8; 32];
	r_bytes.copy_from_slice(&signature[0..32]);
	let r = match ExtendedPoint::decompress(&r_bytes) {
		Some(point) => point,
		None => return false,
	};
	let s = U256::from_little_endian(&signature[32..64]);
	if s >= GROUP_ORDER {
		return false;
	}
	let challenge = sha512_mod_order(&[&r_bytes, public, message]);
	let lhs = ExtendedPoint::base().mul(s);
	let rhs = r.add(&a.mul(challenge));
	lhs.same_point(&rhs)
}
