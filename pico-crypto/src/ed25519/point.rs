// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! edwards25519 group arithmetic in extended homogeneous coordinates.
//!
//! Points are (X, Y, Z, T) with x = X/Z, y = Y/Z, x·y = T/Z, which gives a
//! single unified addition law with no doubling special case.

use primitive_types::U256;

use crate::math::{mod_add, mod_mul, mod_pow, mod_sub};

/// Field prime p = 2²⁵⁵ − 19.
pub const FIELD_PRIME: U256 =
	U256([0xffffffffffffffed, 0xffffffffffffffff, 0xffffffffffffffff, 0x7fffffffffffffff]);

/// Group order L = 2²⁵² + 27742317777372353535851937790883648493.
pub const GROUP_ORDER: U256 =
	U256([0x5812631a5cf5d3ed, 0x14def9dea2f79cd6, 0x0000000000000000, 0x1000000000000000]);

/// Curve constant d = −121665 / 121666 (mod p).
const EDWARDS_D: U256 =
	U256([0x75eb4dca135978a3, 0x00700a4d4141d8ab, 0x8cc740797779e898, 0x52036cee2b6ffe73]);

const BASE_X: U256 =
	U256([0xc9562d608f25d51a, 0x692cc7609525a7b2, 0xc0a4e231fdd6dc5c, 0x216936d3cd6e53fe]);

const BASE_Y: U256 =
	U256([0x6666666666666658, 0x6666666666666666, 0x6666666666666666, 0x6666666666666666]);

const BASE_T: U256 =
	U256([0x6dde8ab3a5b7dda3, 0x20f09f80775152f5, 0x66ea4e8e64abe37d, 0x67875f0fd78b7665]);

/// (p + 3) / 8, the square-root exponent for p ≡ 5 (mod 8).
const SQRT_EXPONENT: U256 =
	U256([0xfffffffffffffffe, 0xffffffffffffffff, 0xffffffffffffffff, 0x0fffffffffffffff]);

/// p − 2, the Fermat inversion exponent.
const INVERSION_EXPONENT: U256 =
	U256([0xffffffffffffffeb, 0xffffffffffffffff, 0xffffffffffffffff, 0x7fffffffffffffff]);

/// 2^((p − 1) / 4), a square root of −1; corrects the candidate root when
/// x² = −α.
const SQRT_MINUS_ONE: U256 =
	U256([0xc4ee1b274a0ea0b0, 0x2f431806ad2fe478, 0x2b4d00993dfbd7a7, 0x2b8324804fc1df0b]);

#[derive(Debug, Copy, Clone)]
pub struct ExtendedPoint {
	pub x: U256,
	pub y: U256,
	pub z: U256,
	pub t: U256,
}

impl ExtendedPoint {
	/// The neutral element (0, 1).
	pub fn identity() -> ExtendedPoint {
		ExtendedPoint { x: U256::zero(), y: U256::one(), z: U256::one(), t: U256::zero() }
	}

	/// The RFC 8032 base point, y = 4/5 with even x.
	pub fn base() -> ExtendedPoint {
		ExtendedPoint { x: BASE_X, y: BASE_Y, z: U256::one(), t: BASE_T }
	}

	/// Unified addition (RFC 8032, section 5.1.4).
	pub fn add(&self, other: &ExtendedPoint) -> ExtendedPoint {
		let p = FIELD_PRIME;
		let a = mod_mul(mod_sub(self.y, self.x, p), mod_sub(other.y, other.x, p), p);
		let b = mod_mul(mod_add(self.y, self.x, p), mod_add(other.y, other.x, p), p);
		let c = mod_mul(mod_add(self.t, self.t, p), mod_mul(other.t, EDWARDS_D, p), p);
		let d = mod_mul(mod_add(self.z, self.z, p), other.z, p);
		let e = mod_sub(b, a, p);
		let f = mod_sub(d, c, p);
		let g = mod_add(d, c, p);
		let h = mod_add(b, a, p);
		ExtendedPoint { x: mod_mul(e, f, p), y: mod_mul(g, h, p), z: mod_mul(f, g, p), t: mod_mul(e, h, p) }
	}

	/// Right-to-left double-and-add; the scalar is reduced mod L first.
	pub fn mul(&self, scalar: U256) -> ExtendedPoint {
		let mut s = scalar % GROUP_ORDER;
		let mut result = ExtendedPoint::identity();
		let mut addend = *self;
		while !s.is_zero() {
			if s.bit(0) {
				result = result.add(&addend);
			}
			addend = addend.add(&addend);
			s = s >> 1;
		}
		result
	}

	/// Projective equality: X₁·Z₂ = X₂·Z₁ and Y₁·Z₂ = Y₂·Z₁.
	pub fn same_point(&self, other: &ExtendedPoint) -> bool {
		let p = FIELD_PRIME;
		mod_mul(self.x, other.z, p) == mod_mul(other.x, self.z, p)
			&& mod_mul(self.y, other.z, p) == mod_mul(other.y, self.z, p)
	}

	/// Encode as 32 little-endian bytes: y with the sign of x in bit 255.
	pub fn compress(&self) -> [u8; 32] {
		let z_inv = mod_pow(self.z, INVERSION_EXPONENT, FIELD_PRIME);
		let x = mod_mul(self.x, z_inv, FIELD_PRIME);
		let y = mod_mul(self.y, z_inv, FIELD_PRIME);
		let mut out = [0u8; 32];
		y.to_little_endian(&mut out);
		if x.bit(0) {
			out[31] |= 0x80;
		}
		out
	}

	/// Decode 32 little-endian bytes; `None` when y is out of range or no
	/// x matches the sign bit.
	pub fn decompress(data: &[u8; 32]) -> Option<ExtendedPoint> {
		let encoded = U256::from_little_endian(data);
		let sign = encoded.bit(255);
		let y = encoded & (U256::MAX >> 1);
		if y >= FIELD_PRIME {
			return None;
		}
		let x = recover_x(y, sign)?;
		Some(ExtendedPoint { x, y, z: U256::one(), t: mod_mul(x, y, FIELD_PRIME) })
	}
}

/// Solves x² = (y² − 1) / (d·y² + 1) and matches the sign bit.
fn recover_x(y: U256, sign: bool) -> Option<U256> {
	let p = FIELD_PRIME;
	let y2 = mod_mul(y, y, p);
	let denominator = mod_add(mod_mul(EDWARDS_D, y2, p), U256::one(), p);
	let x2 = mod_mul(mod_sub(y2, U256::one(), p), mod_pow(denominator, INVERSION_EXPONENT, p), p);
	if x2.is_zero() {
		return if sign { None } else { Some(U256::zero()) };
	}
	let mut x = mod_pow(x2, SQRT_EXPONENT, p);
	if mod_mul(x, x, p) != x2 {
		x = mod_mul(x, SQRT_MINUS_ONE, p);
	}
	if mod_mul(x, x, p) != x2 {
		return None;
	}
	if x.bit(0) != sign {
		x = mod_sub(U256::zero(), x, p);
	}
	Some(x)
}
