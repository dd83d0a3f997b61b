// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Secret key implementation.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use primitive_types::{H256, U256};
use zeroize::Zeroize;

use crate::publickey::curve::CURVE_ORDER;
use crate::Error;

/// Represents secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
	inner: Box<H256>,
}

impl Drop for Secret {
	fn drop(&mut self) {
		self.inner.0.zeroize()
	}
}

impl fmt::LowerHex for Secret {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		self.inner.fmt(fmt)
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		self.inner.fmt(fmt)
	}
}

impl fmt::Display for Secret {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		write!(fmt, "Secret: 0x{:x}{:x}..{:x}{:x}", self.inner[0], self.inner[1], self.inner[30], self.inner[31])
	}
}

impl Secret {
	/// Creates a `Secret` from the given slice, returning `None` if the slice length != 32.
	/// Caller is responsible to zeroize input slice.
	pub fn copy_from_slice(key: &[u8]) -> Option<Self> {
		if key.len() != 32 {
			return None;
		}
		let mut h = H256::zero();
		h.as_bytes_mut().copy_from_slice(&key[0..32]);
		Some(Secret { inner: Box::new(h) })
	}

	/// Creates a `Secret` from its hex big-endian representation.
	/// Caller is responsible to zeroize input slice.
	pub fn copy_from_str(s: &str) -> Result<Self, Error> {
		let h = H256::from_str(s).map_err(|_| Error::InvalidLength)?;
		Ok(Secret { inner: Box::new(h) })
	}

	/// Imports and validates the key.
	/// Caller is responsible to zeroize input slice.
	pub fn import_key(key: &[u8]) -> Result<Self, Error> {
		let secret = Self::copy_from_slice(key).ok_or(Error::InvalidLength)?;
		secret.check_validity()?;
		Ok(secret)
	}

	/// Checks validity of this key: the big-endian scalar must satisfy
	/// 0 < d < n.
	pub fn check_validity(&self) -> Result<(), Error> {
		self.to_scalar().map(|_| ())
	}

	/// The key as a scalar in [1, n − 1].
	pub fn to_scalar(&self) -> Result<U256, Error> {
		let d = U256::from_big_endian(self.inner.as_bytes());
		if d.is_zero() || d >= CURVE_ORDER {
			return Err(Error::OutOfRange);
		}
		Ok(d)
	}

	/// Wrapper over hex conversion.
	pub fn to_hex(&self) -> String {
		format!("{:x}", self.inner.deref())
	}
}

impl From<H256> for Secret {
	fn from(h: H256) -> Self {
		Secret { inner: Box::new(h) }
	}
}

impl FromStr for Secret {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::copy_from_str(s)
	}
}

impl Deref for Secret {
	type Target = H256;

	fn deref(&self) -> &Self::Target {
		&self.inner
	}
}
