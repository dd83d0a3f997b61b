// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Signature based on ECDSA, algorithm's description: https://en.wikipedia.org/wiki/Elliptic_Curve_Digital_Signature_Algorithm

use std::convert::TryFrom;
use std::{
	cmp::PartialEq,
	fmt,
	ops::{Deref, DerefMut},
	str::FromStr,
};

use primitive_types::{H256, U256, U512};
use rustc_hex::{FromHex, ToHex};

use super::curve::{field_sqrt, Point, CURVE_ORDER, CURVE_ORDER_HALF, FIELD_PRIME};
use super::keypair::{point_to_public, public_from_secret, public_to_address, public_to_point};
use super::{Error, Message, Public, Secret};
use crate::math::{mod_add, mod_inv, mod_mul, mod_sub};

/// Signature encoded as RSV components; V is the recovery id in 0..=3.
#[repr(C)]
pub struct Signature([u8; 65]);

impl Signature {
	/// Get a slice into the 'r' portion of the data.
	pub fn r(&self) -> &[u8] {
		&self.0[0..32]
	}

	/// Get a slice into the 's' portion of the data.
	pub fn s(&self) -> &[u8] {
		&self.0[32..64]
	}

	/// Get the recovery byte.
	pub fn v(&self) -> u8 {
		self.0[64]
	}

	/// Encode the signature into RSV array (V altered to be in "Electrum" notation).
	pub fn into_electrum(mut self) -> [u8; 65] {
		self.0[64] += 27;
		self.0
	}

	/// Parse bytes as a signature encoded as RSV (V in "Electrum" notation).
	/// May return empty (invalid) signature if given data has invalid length.
	pub fn from_electrum(data: &[u8]) -> Self {
		if data.len() != 65 || data[64] < 27 {
			// fallback to empty (invalid) signature
			return Signature::default();
		}

		let mut sig = [0u8; 65];
		sig.copy_from_slice(data);
		sig[64] -= 27;
		Signature(sig)
	}

	/// Create a signature object from the RSV triple.
	pub fn from_rsv(r: &H256, s: &H256, v: u8) -> Self {
		let mut sig = [0u8; 65];
		sig[0..32].copy_from_slice(r.as_ref());
		sig[32..64].copy_from_slice(s.as_ref());
		sig[64] = v;
		Signature(sig)
	}

	/// Check if this is a "low" signature (that s part of the signature is
	/// at most n / 2). Signatures emitted by `sign_recoverable` always are.
	pub fn is_low_s(&self) -> bool {
		U256::from_big_endian(self.s()) <= CURVE_ORDER_HALF
	}

	/// Check if each component of the signature is in valid range:
	/// r and s in [1, n − 1] and v a recovery id in 0..=3.
	pub fn is_valid(&self) -> bool {
		let r = U256::from_big_endian(self.r());
		let s = U256::from_big_endian(self.s());
		self.v() <= 3 && !r.is_zero() && r < CURVE_ORDER && !s.is_zero() && s < CURVE_ORDER
	}
}

// manual implementation large arrays don't have trait impls by default.
impl PartialEq for Signature {
	fn eq(&self, other: &Self) -> bool {
		&self.0[..] == &other.0[..]
	}
}

impl Eq for Signature {}

// also manual for the same reason, but the pretty printing might be useful.
impl fmt::Debug for Signature {
	fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
		f.debug_struct("Signature")
			.field("r", &self.0[0..32].to_hex::<String>())
			.field("s", &self.0[32..64].to_hex::<String>())
			.field("v", &self.0[64..65].to_hex::<String>())
			.finish()
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
		write!(f, "{}", self.to_hex::<String>())
	}
}

impl FromStr for Signature {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.from_hex::<Vec<u8>>() {
			Ok(ref hex) if hex.len() == 65 => {
				let mut data = [0; 65];
				data.copy_from_slice(&hex[0..65]);
				Ok(Signature(data))
			}
			_ => Err(Error::InvalidLength),
		}
	}
}

impl Default for Signature {
	fn default() -> Self {
		Signature([0; 65])
	}
}

impl Clone for Signature {
	fn clone(&self) -> Self {
		Signature(self.0.clone())
	}
}

impl From<[u8; 65]> for Signature {
	fn from(s: [u8; 65]) -> Self {
		Signature(s)
	}
}

impl Into<[u8; 65]> for Signature {
	fn into(self) -> [u8; 65] {
		self.0
	}
}

impl Deref for Signature {
	type Target = [u8; 65];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Signature {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

/// Signs the message hash with the given secret key, producing a
/// recoverable low-S signature.
///
/// The nonce schedule is deterministic in (message, key): the seed is
/// `1 + (z + d) mod (n − 2)` and up to 256 consecutive candidates are
/// tried before giving up. The recovery id is found by trial recovery
/// against the signer's address.
pub fn sign_recoverable(secret: &Secret, message: &Message) -> Result<Signature, Error> {
	let d = secret.to_scalar()?;
	let z = U256::from_big_endian(message.as_bytes());
	let z_n = z % CURVE_ORDER;

	let k_seed = {
		let wide = (U512::from(z) + U512::from(d)) % U512::from(CURVE_ORDER - U256::from(2));
		U256::try_from(wide).expect("reduced below a 256-bit modulus; qed") + U256::one()
	};

	let our_address = public_to_address(&public_from_secret(secret)?);

	for attempt in 0..256u64 {
		let k = mod_add(k_seed, U256::from(attempt), CURVE_ORDER);
		if k.is_zero() {
			continue;
		}
		let kg = Point::generator().mul(k);
		let r = kg.x % CURVE_ORDER;
		if r.is_zero() {
			continue;
		}
		let k_inv = mod_inv(k, CURVE_ORDER)?;
		let mut s = mod_mul(k_inv, mod_add(z_n, mod_mul(r, d, CURVE_ORDER), CURVE_ORDER), CURVE_ORDER);
		if s.is_zero() {
			continue;
		}
		if s > CURVE_ORDER_HALF {
			s = CURVE_ORDER - s;
		}
		for recid in 0..4u8 {
			let candidate = match recover_point(message, r, s, recid) {
				Ok(public) => public,
				Err(_) => continue,
			};
			if public_to_address(&candidate) == our_address {
				let mut r_bytes = H256::zero();
				let mut s_bytes = H256::zero();
				r.to_big_endian(r_bytes.as_bytes_mut());
				s.to_big_endian(s_bytes.as_bytes_mut());
				return Ok(Signature::from_rsv(&r_bytes, &s_bytes, recid));
			}
		}
	}
	Err(Error::SignatureUnobtainable)
}

/// Recovers the public key from the signature for the message.
pub fn recover(signature: &Signature, message: &Message) -> Result<Public, Error> {
	if !signature.is_valid() {
		return Err(Error::OutOfRange);
	}
	let r = U256::from_big_endian(signature.r());
	let s = U256::from_big_endian(signature.s());
	recover_point(message, r, s, signature.v())
}

/// Performs verification of the signature for the given message with corresponding public key.
pub fn verify_public(public: &Public, signature: &Signature, message: &Message) -> Result<bool, Error> {
	if !public_to_point(public).is_on_curve() {
		return Err(Error::OutOfRange);
	}
	match recover(signature, message) {
		Ok(recovered) => Ok(&recovered == public),
		Err(Error::NoSolution) | Err(Error::OutOfRange) => Ok(false),
		Err(e) => Err(e),
	}
}

/// Checks if the address corresponds to the public key from the signature for the message.
pub fn verify_address(address: &super::Address, signature: &Signature, message: &Message) -> Result<bool, Error> {
	let public = recover(signature, message)?;
	let recovered_address = public_to_address(&public);
	Ok(address == &recovered_address)
}

/// Core recovery: candidate R has x = r (or r + n for recovery ids 2 and
/// 3) and the y parity selected by the low recovery bit; the public key is
/// r⁻¹·(s·R − z·G).
fn recover_point(message: &Message, r: U256, s: U256, recid: u8) -> Result<Public, Error> {
	if recid > 3 {
		return Err(Error::OutOfRange);
	}
	if r.is_zero() || r >= CURVE_ORDER || s.is_zero() || s >= CURVE_ORDER {
		return Err(Error::OutOfRange);
	}

	let x = if recid & 2 != 0 {
		let (lifted, overflow) = r.overflowing_add(CURVE_ORDER);
		if overflow || lifted >= FIELD_PRIME {
			return Err(Error::OutOfRange);
		}
		lifted
	} else {
		r
	};

	let alpha = mod_add(mod_mul(mod_mul(x, x, FIELD_PRIME), x, FIELD_PRIME), U256::from(7), FIELD_PRIME);
	let beta = field_sqrt(alpha).ok_or(Error::NoSolution)?;
	let y = if (beta.bit(0) as u8) == (recid & 1) { beta } else { FIELD_PRIME - beta };

	let z = U256::from_big_endian(message.as_bytes()) % CURVE_ORDER;
	let r_inv = mod_inv(r, CURVE_ORDER)?;
	let u1 = mod_sub(U256::zero(), mod_mul(z, r_inv, CURVE_ORDER), CURVE_ORDER);
	let u2 = mod_mul(s, r_inv, CURVE_ORDER);

	let q = Point::generator().mul(u1).add(&Point { x, y }.mul(u2));
	if q.is_identity() {
		return Err(Error::NoSolution);
	}
	Ok(point_to_public(&q))
}

#[cfg(test)]
mod tests {
	use super::super::{public_to_address, KeyPair, Message, Secret};
	use super::{recover, sign_recoverable, verify_address, verify_public, Signature};
	use primitive_types::U256;
	use std::str::FromStr;

	fn keypair_from_byte(byte: u8) -> KeyPair {
		KeyPair::from_secret_slice(&[byte; 32]).unwrap()
	}

	#[test]
	fn vrs_conversion() {
		// given
		let keypair = keypair_from_byte(0x17);
		let message = Message::from_str("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
		let signature = sign_recoverable(keypair.secret(), &message).expect("can sign a non-zero message");

		// when
		let vrs = signature.clone().into_electrum();
		let from_vrs = Signature::from_electrum(&vrs);

		// then
		assert_eq!(signature, from_vrs);
		assert!(vrs[64] >= 27 && vrs[64] <= 30);
	}

	#[test]
	fn signature_to_and_from_str() {
		let keypair = keypair_from_byte(0x23);
		let message = Message::from_str("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
		let signature = sign_recoverable(keypair.secret(), &message).expect("can sign a non-zero message");
		let string = format!("{}", signature);
		let deserialized = Signature::from_str(&string).unwrap();
		assert_eq!(signature, deserialized);
	}

	#[test]
	fn sign_and_recover_public() {
		let keypair = keypair_from_byte(0x01);
		let message = Message::from_str("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
		let signature = sign_recoverable(keypair.secret(), &message).unwrap();
		assert_eq!(keypair.public(), &recover(&signature, &message).unwrap());
	}

	#[test]
	fn sign_and_recover_public_works_with_zeroed_messages() {
		let keypair = keypair_from_byte(0x42);
		let signature = sign_recoverable(keypair.secret(), &Message::zero()).unwrap();
		let zero_message = Message::zero();
		assert_eq!(keypair.public(), &recover(&signature, &zero_message).unwrap());
	}

	#[test]
	fn sign_and_verify_public() {
		let keypair = keypair_from_byte(0x1f);
		let message = Message::from_str("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
		let signature = sign_recoverable(keypair.secret(), &message).expect("can sign a non-zero message");
		assert!(verify_public(keypair.public(), &signature, &message).unwrap());
	}

	#[test]
	fn sign_and_verify_address() {
		let keypair = keypair_from_byte(0x31);
		let message = Message::from_str("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
		let signature = sign_recoverable(keypair.secret(), &message).expect("can sign a non-zero message");
		assert!(verify_address(&keypair.address(), &signature, &message).unwrap());
	}

	#[test]
	fn produced_signatures_are_low_s() {
		for byte in 1..=16u8 {
			let keypair = keypair_from_byte(byte);
			let message = Message::repeat_byte(byte.wrapping_mul(37));
			let signature = sign_recoverable(keypair.secret(), &message).unwrap();
			assert!(signature.is_low_s());
			assert!(signature.is_valid());
		}
	}

	#[test]
	fn known_signature_for_repeated_byte_key() {
		// Locked-in output of the deterministic nonce schedule for
		// d = 0x0101…01 over keccak256("hello").
		let keypair = keypair_from_byte(0x01);
		let message = keccak256::keccak(b"hello");
		let signature = sign_recoverable(keypair.secret(), &message).unwrap();

		assert_eq!(
			U256::from_big_endian(signature.r()),
			U256::from_str("c1638f6009628351b3ba61ecad1a26286803f8ee1f5b71449e92f4ed8d4a305e").unwrap(),
		);
		assert_eq!(
			U256::from_big_endian(signature.s()),
			U256::from_str("51bfe08006384f58ffc66c0cf8bb5c86ca4ba1bdb118bb91b1e240d73da6b98f").unwrap(),
		);
		assert_eq!(signature.v(), 1);
		assert_eq!(recover(&signature, &message).unwrap(), *keypair.public());
	}

	#[test]
	fn known_signature_for_low_key() {
		// d = 0x00…01 over keccak256("message to sign").
		let secret = Secret::import_key(&{
			let mut d = [0u8; 32];
			d[31] = 1;
			d
		})
		.unwrap();
		let message = keccak256::keccak(b"message to sign");
		let signature = sign_recoverable(&secret, &message).unwrap();

		assert_eq!(
			U256::from_big_endian(signature.r()),
			U256::from_str("0625c2b9524306ee707b30415d190cc04d61984437fa697adec9b65a1b9d79b7").unwrap(),
		);
		assert_eq!(
			U256::from_big_endian(signature.s()),
			U256::from_str("1ef9fb56040bfa6e3daf3bf23be0aa842ba81f5cc21453097bffa28d2c1ef6d0").unwrap(),
		);
		assert_eq!(signature.clone().into_electrum()[64], 28);
	}

	#[test]
	fn recover_rejects_tampered_components() {
		let keypair = keypair_from_byte(0x05);
		let message = keccak256::keccak(b"payload");
		let signature = sign_recoverable(keypair.secret(), &message).unwrap();

		let mut zero_r: [u8; 65] = signature.clone().into();
		zero_r[..32].copy_from_slice(&[0u8; 32]);
		assert!(recover(&Signature::from(zero_r), &message).is_err());

		let mut bad_recid: [u8; 65] = signature.into();
		bad_recid[64] = 4;
		assert!(recover(&Signature::from(bad_recid), &message).is_err());
	}

	#[test]
	fn recovery_differs_on_wrong_message() {
		let keypair = keypair_from_byte(0x07);
		let message = keccak256::keccak(b"signed");
		let other = keccak256::keccak(b"not signed");
		let signature = sign_recoverable(keypair.secret(), &message).unwrap();
		match recover(&signature, &other) {
			Ok(public) => assert_ne!(public_to_address(&public), keypair.address()),
			Err(_) => (),
		}
	}
}
