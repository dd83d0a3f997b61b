// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bitcoin-style signed messages (BIP-137 layout).
//!
//! The signed digest is a single SHA-256 of the raw message, without the
//! `\x18Bitcoin Signed Message:\n` prefix or the double hash of strict
//! BIP-137; callers needing strict compatibility must hash upstream. The
//! signature armor is Base64 over `header ‖ r ‖ s`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use primitive_types::H256;
use sha2::{Digest, Sha256};

use crate::publickey::{recover, sign_recoverable, Message, Public, Secret, Signature};
use crate::Error;

/// The digest that gets signed: `SHA-256(message)`.
pub fn signed_message_hash(message: &[u8]) -> Message {
	H256::from_slice(&Sha256::digest(message))
}

/// Signs `message`, emitting the Base64 armor of the 65-byte
/// `header ‖ r ‖ s` layout. The header is `32 + recid` for recovery ids
/// below 3, else `31`.
pub fn sign_message(secret: &Secret, message: &[u8]) -> Result<Vec<u8>, Error> {
	let hash = signed_message_hash(message);
	let signature = sign_recoverable(secret, &hash)?;
	let recid = signature.v();
	let header = if recid < 3 { 32 + recid } else { 31 };

	let mut raw = [0u8; 65];
	raw[0] = header;
	raw[1..33].copy_from_slice(signature.r());
	raw[33..65].copy_from_slice(signature.s());
	Ok(BASE64.encode(&raw[..]).into_bytes())
}

/// Verifies a signed message against the expected public key. Malformed
/// armor, undersized payloads and failed recovery all yield `false`.
pub fn verify_message(message: &[u8], signature_b64: &[u8], public: &Public) -> bool {
	let raw = match BASE64.decode(signature_b64) {
		Ok(raw) => raw,
		Err(_) => return false,
	};
	if raw.len() != 65 {
		return false;
	}
	let recid = raw[0] & 0x03;
	let signature =
		Signature::from_rsv(&H256::from_slice(&raw[1..33]), &H256::from_slice(&raw[33..65]), recid);
	let hash = signed_message_hash(message);
	match recover(&signature, &hash) {
		Ok(recovered) => recovered == *public,
		Err(_) => false,
	}
}
