// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Modular arithmetic over 256-bit integers, shared by both curves.
//!
//! Products and sums are taken through `U512` so no intermediate ever
//! wraps; every function returns a value in `[0, modulus)`.

use std::convert::TryFrom;

use primitive_types::{U256, U512};

use crate::Error;

fn narrow(wide: U512) -> U256 {
	U256::try_from(wide).expect("reduced below a 256-bit modulus; qed")
}

pub fn mod_add(a: U256, b: U256, modulus: U256) -> U256 {
	narrow((U512::from(a) + U512::from(b)) % U512::from(modulus))
}

pub fn mod_sub(a: U256, b: U256, modulus: U256) -> U256 {
	let a = a % modulus;
	let b = b % modulus;
	if a >= b {
		a - b
	} else {
		modulus - (b - a)
	}
}

pub fn mod_mul(a: U256, b: U256, modulus: U256) -> U256 {
	narrow(a.full_mul(b) % U512::from(modulus))
}

/// Square-and-multiply exponentiation.
pub fn mod_pow(base: U256, exponent: U256, modulus: U256) -> U256 {
	let base = base % modulus;
	let mut result = U256::one() % modulus;
	for i in (0..exponent.bits()).rev() {
		result = mod_mul(result, result, modulus);
		if exponent.bit(i) {
			result = mod_mul(result, base, modulus);
		}
	}
	result
}

/// Modular inverse via the extended Euclidean algorithm, with the Bézout
/// coefficient kept reduced modulo `modulus` throughout.
pub fn mod_inv(a: U256, modulus: U256) -> Result<U256, Error> {
	let a = a % modulus;
	if a.is_zero() {
		return Err(Error::NoSolution);
	}
	let (mut t, mut new_t) = (U256::zero(), U256::one());
	let (mut r, mut new_r) = (modulus, a);
	while !new_r.is_zero() {
		let quotient = r / new_r;
		let next_t = mod_sub(t, mod_mul(quotient, new_t, modulus), modulus);
		t = new_t;
		new_t = next_t;
		let next_r = r % new_r;
		r = new_r;
		new_r = next_r;
	}
	if r != U256::one() {
		return Err(Error::NoSolution);
	}
	Ok(t)
}
