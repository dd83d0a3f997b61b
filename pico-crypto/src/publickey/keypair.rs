// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key pair (public + secret) description.

use std::fmt;

use keccak256::Keccak256;
use primitive_types::U256;
use rustc_hex::ToHex;

use super::curve::Point;
use super::{Address, Error, Public, Secret};

/// Convert public key into the address.
///
/// The address is the trailing 20 bytes of the Keccak-256 hash of the
/// 64-byte X ‖ Y form.
pub fn public_to_address(public: &Public) -> Address {
	let hash = public.as_bytes().keccak256();
	let mut result = Address::zero();
	result.as_bytes_mut().copy_from_slice(&hash[12..]);
	result
}

/// The `0x`-prefixed lowercase hex string form of an address.
pub fn address_to_hex(address: &Address) -> String {
	format!("0x{}", address.as_bytes().to_hex::<String>())
}

/// Derives the public key of `secret` as X ‖ Y.
pub fn public_from_secret(secret: &Secret) -> Result<Public, Error> {
	let d = secret.to_scalar()?;
	let q = Point::generator().mul(d);
	Ok(point_to_public(&q))
}

pub(crate) fn point_to_public(point: &Point) -> Public {
	let mut public = Public::default();
	point.x.to_big_endian(&mut public.as_bytes_mut()[0..32]);
	point.y.to_big_endian(&mut public.as_bytes_mut()[32..64]);
	public
}

pub(crate) fn public_to_point(public: &Public) -> Point {
	Point {
		x: U256::from_big_endian(&public.as_bytes()[0..32]),
		y: U256::from_big_endian(&public.as_bytes()[32..64]),
	}
}

/// Encodes a public key in the 65-byte uncompressed SEC1 form
/// `04 ‖ X ‖ Y`.
pub fn public_to_uncompressed(public: &Public) -> [u8; 65] {
	let mut out = [0u8; 65];
	out[0] = 0x04;
	out[1..65].copy_from_slice(public.as_bytes());
	out
}

/// Decodes a 65-byte uncompressed SEC1 public key, checking the curve
/// equation.
pub fn public_from_uncompressed(data: &[u8]) -> Result<Public, Error> {
	if data.len() != 65 || data[0] != 0x04 {
		return Err(Error::InvalidLength);
	}
	let mut public = Public::default();
	public.as_bytes_mut().copy_from_slice(&data[1..65]);
	if !public_to_point(&public).is_on_curve() {
		return Err(Error::OutOfRange);
	}
	Ok(public)
}

/// secp256k1 key pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
	secret: Secret,
	public: Public,
}

impl fmt::Display for KeyPair {
	fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
		writeln!(f, "secret:  {:x}", self.secret)?;
		writeln!(f, "public:  {:x}", self.public)?;
		write!(f, "address: {:x}", self.address())
	}
}

impl KeyPair {
	/// Create a pair from secret key.
	pub fn from_secret(secret: Secret) -> Result<KeyPair, Error> {
		let public = public_from_secret(&secret)?;
		Ok(KeyPair { secret, public })
	}

	/// Create a pair from the slice, which imported and verified as secret key.
	pub fn from_secret_slice(slice: &[u8]) -> Result<KeyPair, Error> {
		Self::from_secret(Secret::import_key(slice)?)
	}

	/// Returns secret part of the keypair.
	pub fn secret(&self) -> &Secret {
		&self.secret
	}

	/// Returns public part of the keypair.
	pub fn public(&self) -> &Public {
		&self.public
	}

	/// Returns public part of the keypair converted into Address.
	pub fn address(&self) -> Address {
		public_to_address(&self.public)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	#[test]
	fn public_from_low_secret() {
		// d = 1 gives the generator itself.
		let pair = KeyPair::from_secret_slice(&{
			let mut d = [0u8; 32];
			d[31] = 1;
			d
		})
		.unwrap();
		assert_eq!(
			format!("{:x}", pair.public()),
			"79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
			483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
		);
		assert_eq!(address_to_hex(&pair.address()), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
	}

	#[test]
	fn public_and_address_from_repeated_byte_secret() {
		let pair = KeyPair::from_secret_slice(&[0x01u8; 32]).unwrap();
		assert_eq!(
			public_to_uncompressed(pair.public()).to_vec(),
			hex!(
				"041b84c5567b126440995d3ed5aaba0565d71e1834604819ff9c17f5e9d5dd078f"
				"70beaf8f588b541507fed6a642c5ab42dfdf8120a7f639de5122d47a69a8e8d1"
			)
			.to_vec(),
		);
		assert_eq!(address_to_hex(&pair.address()), "0x1a642f0e3c3af545e7acbd38b07251b3990914f1");
	}

	#[test]
	fn uncompressed_roundtrip_checks_curve() {
		let pair = KeyPair::from_secret_slice(&[0x02u8; 32]).unwrap();
		let raw = public_to_uncompressed(pair.public());
		assert_eq!(public_from_uncompressed(&raw).unwrap(), *pair.public());

		let mut off_curve = raw;
		off_curve[64] ^= 1;
		assert_eq!(public_from_uncompressed(&off_curve), Err(Error::OutOfRange));
		assert_eq!(public_from_uncompressed(&raw[1..]), Err(Error::InvalidLength));
	}
}
