// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Keccak-256, the pre-NIST variant used by Ethereum.
//!
//! This is the original Keccak submission with multirate padding (domain
//! separator `0x01`), not SHA3-256 (`0x06`). Parameters: 1600-bit state,
//! rate 1088 bits, capacity 512 bits, 24 rounds, 32-byte output.

mod permutation;

pub use primitive_types::H256;

use permutation::keccak_f;

/// Sponge rate in bytes (1088 bits).
const RATE: usize = 136;

/// Get the KECCAK (i.e. Keccak) hash of the empty bytes string.
pub const KECCAK_EMPTY: H256 = H256([
	0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0, 0xe5, 0x00, 0xb6,
	0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

pub fn keccak<T: AsRef<[u8]>>(s: T) -> H256 {
	let mut result = [0u8; 32];
	write_keccak(s, &mut result);
	H256(result)
}

pub fn keccak_256(input: &[u8], output: &mut [u8]) {
	write_keccak(input, output);
}

/// Computes the Keccak-256 hash of `s` into `dest`.
///
/// `dest` must be at most 32 bytes; shorter destinations receive a
/// truncated digest.
pub fn write_keccak<T: AsRef<[u8]>>(s: T, dest: &mut [u8]) {
	let data = s.as_ref();
	let mut state = [0u64; 25];

	let mut blocks = data.chunks_exact(RATE);
	for block in &mut blocks {
		absorb(&mut state, block);
	}

	// Multirate padding: 0x01 after the message tail, 0x80 OR'ed into the
	// last byte of the block. A tail of RATE - 1 bytes collapses both into
	// a single 0x81; an empty tail yields a full block of padding.
	let tail = blocks.remainder();
	let mut last = [0u8; RATE];
	last[..tail.len()].copy_from_slice(tail);
	last[tail.len()] = 0x01;
	last[RATE - 1] |= 0x80;
	absorb(&mut state, &last);

	squeeze(&state, dest);
}

fn absorb(state: &mut [u64; 25], block: &[u8]) {
	debug_assert_eq!(block.len(), RATE);
	for (lane, bytes) in state.iter_mut().zip(block.chunks_exact(8)) {
		let mut buf = [0u8; 8];
		buf.copy_from_slice(bytes);
		*lane ^= u64::from_le_bytes(buf);
	}
	keccak_f(state);
}

fn squeeze(state: &[u64; 25], dest: &mut [u8]) {
	debug_assert!(dest.len() <= 32);
	for (chunk, lane) in dest.chunks_mut(8).zip(state.iter()) {
		let bytes = lane.to_le_bytes();
		chunk.copy_from_slice(&bytes[..chunk.len()]);
	}
}

pub trait Keccak256<T> {
	fn keccak256(&self) -> T
	where
		T: Sized;
}

impl<T> Keccak256<[u8; 32]> for T
where
	T: AsRef<[u8]>,
{
	fn keccak256(&self) -> [u8; 32] {
		let mut result = [0u8; 32];
		write_keccak(self, &mut result);
		result
	}
}
