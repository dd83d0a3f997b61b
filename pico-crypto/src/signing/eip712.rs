// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! EIP-712 typed structured data hashing.
//!
//! Produces the 32-byte digest that is signed, from the usual JSON shape
//! (`types` / `primaryType` / `domain` / `message`). Struct hashes only
//! depend on the field order declared in `types`, never on the key order
//! of the data objects.
//!
//! Array types (`T[]`, `T[k]`) take part in dependency resolution but are
//! not encodable as field values.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use keccak256::keccak;
use lazy_static::lazy_static;
use primitive_types::{H256, U256};
use rustc_hex::FromHex;
use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::publickey::Address;
use crate::Error;

/// One field of a struct type: `{ "name": …, "type": … }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDef {
	pub name: String,
	#[serde(rename = "type")]
	pub field_type: String,
}

/// Struct name to ordered field list.
pub type Types = BTreeMap<String, Vec<FieldDef>>;

/// A full typed-data message.
#[derive(Debug, Clone, Deserialize)]
pub struct TypedData {
	pub types: Types,
	#[serde(rename = "primaryType")]
	pub primary_type: String,
	pub domain: Map<String, Json>,
	pub message: Map<String, Json>,
}

/// The domain fields recognized by EIP-712, in their canonical order.
const DOMAIN_FIELDS: [(&str, &str); 5] = [
	("name", "string"),
	("version", "string"),
	("chainId", "uint256"),
	("verifyingContract", "address"),
	("salt", "bytes32"),
];

/// The hash to sign: `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
pub fn hash_typed_data(typed: &TypedData) -> Result<H256, Error> {
	let domain_separator = hash_domain(&typed.domain)?;
	let message_hash = hash_struct(&typed.primary_type, &typed.types, &typed.message)?;
	let mut preimage = [0u8; 66];
	preimage[0] = 0x19;
	preimage[1] = 0x01;
	preimage[2..34].copy_from_slice(domain_separator.as_bytes());
	preimage[34..66].copy_from_slice(message_hash.as_bytes());
	Ok(keccak(&preimage[..]))
}

/// Domain separator over whichever of the canonical fields are present;
/// unknown keys are rejected.
pub fn hash_domain(domain: &Map<String, Json>) -> Result<H256, Error> {
	for key in domain.keys() {
		if !DOMAIN_FIELDS.iter().any(|(name, _)| name == key) {
			return Err(Error::Unsupported(format!("invalid domain key `{}`", key)));
		}
	}
	let fields = DOMAIN_FIELDS
		.iter()
		.filter(|(name, _)| domain.contains_key(*name))
		.map(|(name, field_type)| FieldDef { name: (*name).to_owned(), field_type: (*field_type).to_owned() })
		.collect();
	let mut types = Types::new();
	types.insert("EIP712Domain".to_owned(), fields);
	hash_struct("EIP712Domain", &types, domain)
}

/// `keccak256(encodeType(type_name))`.
pub fn type_hash(type_name: &str, types: &Types) -> Result<H256, Error> {
	Ok(keccak(encode_type(type_name, types)?.as_bytes()))
}

/// `Name(type₁ name₁,…)` for the type itself followed by every transitive
/// struct dependency, sorted by name. A type never lists itself in the
/// tail, even through a reference cycle.
pub fn encode_type(type_name: &str, types: &Types) -> Result<String, Error> {
	let mut dependencies = BTreeSet::new();
	find_type_dependencies(type_name, types, &mut dependencies)?;
	dependencies.remove(type_name);

	let mut ordered = Vec::with_capacity(dependencies.len() + 1);
	ordered.push(type_name.to_owned());
	ordered.extend(dependencies);

	let mut out = String::new();
	for name in &ordered {
		let fields = types
			.get(name)
			.ok_or_else(|| Error::Unsupported(format!("type `{}` not in types", name)))?;
		let parts: Vec<String> =
			fields.iter().map(|field| format!("{} {}", field.field_type, field.name)).collect();
		out.push_str(&format!("{}({})", name, parts.join(",")));
	}
	Ok(out)
}

/// `keccak256(typeHash ‖ enc(field₁) ‖ … ‖ enc(fieldₙ))`, field order
/// taken from `types`.
pub fn hash_struct(type_name: &str, types: &Types, data: &Map<String, Json>) -> Result<H256, Error> {
	let fields = types
		.get(type_name)
		.ok_or_else(|| Error::Unsupported(format!("type `{}` not in types", type_name)))?;
	let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
	encoded.extend_from_slice(type_hash(type_name, types)?.as_bytes());
	for field in fields {
		let word = encode_field(types, &field.name, &field.field_type, data.get(&field.name))?;
		encoded.extend_from_slice(&word);
	}
	Ok(keccak(&encoded))
}

/// Depth-first walk over struct references, with array suffixes stripped
/// and the visited set doubling as the cycle guard.
fn find_type_dependencies(type_name: &str, types: &Types, results: &mut BTreeSet<String>) -> Result<(), Error> {
	let core = core_type(type_name);
	if is_atomic_type(core) || results.contains(core) {
		return Ok(());
	}
	let fields =
		types.get(core).ok_or_else(|| Error::Unsupported(format!("type `{}` not in types", core)))?;
	results.insert(core.to_owned());
	for field in fields {
		find_type_dependencies(&field.field_type, types, results)?;
	}
	Ok(())
}

/// The type name with any `[…]` array suffix removed.
fn core_type(type_name: &str) -> &str {
	type_name.split('[').next().unwrap_or(type_name).trim()
}

/// The Solidity value types accepted as leaves: `string`, `bytes`,
/// `bool`, `address`, `uintN`/`intN` for N in 8..=256 step 8, and
/// `bytesN` for N in 1..=32.
fn is_atomic_type(name: &str) -> bool {
	match name {
		"string" | "bytes" | "bool" | "address" => true,
		_ => {
			if let Some(bits) = name.strip_prefix("uint").or_else(|| name.strip_prefix("int")) {
				matches!(bits.parse::<u32>(), Ok(n) if n % 8 == 0 && n >= 8 && n <= 256)
					&& !bits.starts_with('0')
			} else if let Some(width) = name.strip_prefix("bytes") {
				matches!(width.parse::<u32>(), Ok(n) if n >= 1 && n <= 32) && !width.starts_with('0')
			} else {
				false
			}
		}
	}
}

/// Encodes one field value into its 32-byte word.
fn encode_field(
	types: &Types,
	name: &str,
	field_type: &str,
	value: Option<&Json>,
) -> Result<[u8; 32], Error> {
	let core = core_type(field_type);
	let mut word = [0u8; 32];

	if types.contains_key(core) {
		return match value {
			None | Some(Json::Null) => Ok(word),
			Some(value) => {
				let data = value.as_object().ok_or_else(|| {
					Error::Unsupported(format!("value for struct field `{}` is not an object", name))
				})?;
				Ok(hash_struct(core, types, data)?.to_fixed_bytes())
			}
		};
	}

	let value = match value {
		None | Some(Json::Null) => {
			// Absent string and bytes values hash like empty ones did not:
			// they encode as a zero word.
			if field_type == "string" || field_type == "bytes" {
				return Ok(word);
			}
			return Err(Error::Unsupported(format!("missing value for field `{}`", name)));
		}
		Some(value) => value,
	};

	if field_type == "bool" {
		let truthy = match value {
			Json::Bool(flag) => *flag,
			Json::String(s) => !s.is_empty() && s != "False" && s != "false" && s != "0",
			Json::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
			_ => return Err(Error::Unsupported(format!("bool field `{}` from non-scalar", name))),
		};
		word[31] = truthy as u8;
		return Ok(word);
	}

	if field_type.starts_with("bytes") {
		let bytes = json_to_bytes(name, value)?;
		return if field_type == "bytes" {
			Ok(keccak(&bytes).to_fixed_bytes())
		} else {
			let take = bytes.len().min(32);
			word[..take].copy_from_slice(&bytes[..take]);
			Ok(word)
		};
	}

	if field_type == "string" {
		return match value {
			Json::String(s) => Ok(keccak(s.as_bytes()).to_fixed_bytes()),
			_ => Err(Error::Unsupported(format!("string field `{}` from non-string", name))),
		};
	}

	if field_type.starts_with("int") || field_type.starts_with("uint") {
		let unsigned = field_type.starts_with("uint");
		let (magnitude, negative) = json_to_integer(name, value)?;
		return if negative && unsigned {
			// Negative values of unsigned fields clamp to zero.
			Ok(word)
		} else if negative {
			let (complement, _) = U256::zero().overflowing_sub(magnitude);
			complement.to_big_endian(&mut word);
			Ok(word)
		} else {
			magnitude.to_big_endian(&mut word);
			Ok(word)
		};
	}

	if field_type == "address" {
		return match value {
			Json::String(s) => {
				let stripped = if s.starts_with("0x") { &s[2..] } else { &s[..] };
				let bytes: Vec<u8> = stripped
					.from_hex()
					.map_err(|_| Error::Unsupported(format!("invalid hex address in field `{}`", name)))?;
				let take = bytes.len().min(20);
				word[32 - take..].copy_from_slice(&bytes[..take]);
				Ok(word)
			}
			_ => Err(Error::Unsupported(format!("address field `{}` from non-string", name))),
		};
	}

	Err(Error::Unsupported(format!("EIP-712 type `{}`", field_type)))
}

fn json_to_bytes(name: &str, value: &Json) -> Result<Vec<u8>, Error> {
	match value {
		Json::String(s) => {
			if s.starts_with("0x") {
				s[2..]
					.from_hex()
					.map_err(|_| Error::Unsupported(format!("invalid hex in field `{}`", name)))
			} else {
				Ok(s.as_bytes().to_vec())
			}
		}
		Json::Number(n) => {
			let value = n
				.as_u64()
				.ok_or_else(|| Error::Unsupported(format!("numeric bytes field `{}`", name)))?;
			let mut out = vec![0u8; 32];
			U256::from(value).to_big_endian(&mut out);
			Ok(out)
		}
		Json::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				let byte = item
					.as_u64()
					.filter(|b| *b <= 0xFF)
					.ok_or_else(|| Error::Unsupported(format!("byte array in field `{}`", name)))?;
				out.push(byte as u8);
			}
			Ok(out)
		}
		_ => Err(Error::Unsupported(format!("bytes field `{}`", name))),
	}
}

/// Parses a JSON number or a decimal/`0x`-hex string into a magnitude
/// and sign.
fn json_to_integer(name: &str, value: &Json) -> Result<(U256, bool), Error> {
	let unsupported = || Error::Unsupported(format!("integer field `{}`", name));
	match value {
		Json::Number(n) => {
			if let Some(unsigned) = n.as_u64() {
				Ok((U256::from(unsigned), false))
			} else if let Some(signed) = n.as_i64() {
				Ok((U256::from(signed.unsigned_abs()), true))
			} else {
				Err(unsupported())
			}
		}
		Json::String(s) => {
			let (digits, negative) =
				if s.starts_with('-') { (&s[1..], true) } else { (&s[..], false) };
			let magnitude = if digits.starts_with("0x") {
				U256::from_str(&digits[2..]).map_err(|_| unsupported())?
			} else {
				U256::from_dec_str(digits).map_err(|_| unsupported())?
			};
			Ok((magnitude, negative && !magnitude.is_zero()))
		}
		_ => Err(unsupported()),
	}
}

// --- Legacy agent signing (same digest as the typed path when the types line up) ---

lazy_static! {
	static ref EIP712_DOMAIN_TYPEHASH: H256 =
		keccak(&b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"[..]);
	static ref AGENT_TYPEHASH: H256 = keccak(&b"Agent(string source,bytes32 connectionId)"[..]);
}

/// The fixed four-field domain used by the agent path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentDomain {
	pub name: String,
	pub version: String,
	#[serde(rename = "chainId")]
	pub chain_id: u64,
	#[serde(rename = "verifyingContract")]
	pub verifying_contract: Address,
}

/// Hash to sign for `Agent(source, connectionId)` under the given domain.
///
/// `connection_id` is right-padded with zeros (or truncated) to 32 bytes.
pub fn hash_agent_message(domain: &AgentDomain, source: &str, connection_id: &[u8]) -> H256 {
	let domain_separator = {
		let mut preimage = [0u8; 160];
		preimage[0..32].copy_from_slice(EIP712_DOMAIN_TYPEHASH.as_bytes());
		preimage[32..64].copy_from_slice(keccak(domain.name.as_bytes()).as_bytes());
		preimage[64..96].copy_from_slice(keccak(domain.version.as_bytes()).as_bytes());
		U256::from(domain.chain_id).to_big_endian(&mut preimage[96..128]);
		preimage[140..160].copy_from_slice(domain.verifying_contract.as_bytes());
		keccak(&preimage[..])
	};
	let agent_hash = {
		let mut preimage = [0u8; 96];
		preimage[0..32].copy_from_slice(AGENT_TYPEHASH.as_bytes());
		preimage[32..64].copy_from_slice(keccak(source.as_bytes()).as_bytes());
		let take = connection_id.len().min(32);
		preimage[64..64 + take].copy_from_slice(&connection_id[..take]);
		keccak(&preimage[..])
	};
	let mut preimage = [0u8; 66];
	preimage[0] = 0x19;
	preimage[1] = 0x01;
	preimage[2..34].copy_from_slice(domain_separator.as_bytes());
	preimage[34..66].copy_from_slice(agent_hash.as_bytes());
	keccak(&preimage[..])
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;
	use std::str::FromStr;

	fn typed(json: &str) -> TypedData {
		serde_json::from_str(json).expect("test fixture parses")
	}

	#[test]
	fn minimal_message_matches_stepwise_hash() {
		let data = typed(
			r#"{
				"domain": {"name": "x"},
				"types": {"Mail": [{"name": "contents", "type": "string"}]},
				"primaryType": "Mail",
				"message": {"contents": "hi"}
			}"#,
		);
		assert_eq!(
			type_hash("Mail", &data.types).unwrap(),
			H256(hex!("391581b66dfce93075def2f759ecf34a96f4b25b7efdd0b492e207d2ed9fbc76")),
		);
		assert_eq!(
			hash_domain(&data.domain).unwrap(),
			H256(hex!("b1b277d1bb978b94696ae7c475e4f8953aa39b5d19a386e45f299e1604ae66ff")),
		);
		assert_eq!(
			hash_struct("Mail", &data.types, &data.message).unwrap(),
			H256(hex!("3ae9302329ea4532e9dfd49237157e053215d5e0fa97711ed9ab4e607ae24b1c")),
		);
		assert_eq!(
			hash_typed_data(&data).unwrap(),
			H256(hex!("6f7a4882cd893a80b493f91887ee7a072e285a5b7f66d3f2aa4e2a59b158440f")),
		);
	}

	#[test]
	fn nested_structs_match_reference_example() {
		let data = typed(
			r#"{
				"domain": {
					"name": "Ether Mail",
					"version": "1",
					"chainId": 1,
					"verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
				},
				"types": {
					"Mail": [
						{"name": "from", "type": "Person"},
						{"name": "to", "type": "Person"},
						{"name": "contents", "type": "string"}
					],
					"Person": [
						{"name": "name", "type": "string"},
						{"name": "wallet", "type": "address"}
					]
				},
				"primaryType": "Mail",
				"message": {
					"from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
					"to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
					"contents": "Hello, Bob!"
				}
			}"#,
		);
		assert_eq!(
			encode_type("Mail", &data.types).unwrap(),
			"Mail(Person from,Person to,string contents)Person(string name,address wallet)",
		);
		assert_eq!(
			type_hash("Mail", &data.types).unwrap(),
			H256(hex!("a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2")),
		);
		assert_eq!(
			hash_domain(&data.domain).unwrap(),
			H256(hex!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")),
		);
		assert_eq!(
			hash_typed_data(&data).unwrap(),
			H256(hex!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")),
		);
	}

	#[test]
	fn hash_is_independent_of_data_key_order() {
		let forward = typed(
			r#"{
				"domain": {"name": "t", "version": "1"},
				"types": {"Pair": [{"name": "a", "type": "uint256"}, {"name": "b", "type": "string"}]},
				"primaryType": "Pair",
				"message": {"a": 7, "b": "x"}
			}"#,
		);
		let reversed = typed(
			r#"{
				"domain": {"version": "1", "name": "t"},
				"types": {"Pair": [{"name": "a", "type": "uint256"}, {"name": "b", "type": "string"}]},
				"primaryType": "Pair",
				"message": {"b": "x", "a": 7}
			}"#,
		);
		assert_eq!(hash_typed_data(&forward).unwrap(), hash_typed_data(&reversed).unwrap());
	}

	#[test]
	fn unknown_domain_key_is_rejected() {
		let data = typed(
			r#"{
				"domain": {"name": "t", "extra": 1},
				"types": {"M": [{"name": "v", "type": "bool"}]},
				"primaryType": "M",
				"message": {"v": true}
			}"#,
		);
		match hash_typed_data(&data) {
			Err(Error::Unsupported(what)) => assert!(what.contains("domain key")),
			other => panic!("expected unsupported domain key, got {:?}", other),
		}
	}

	#[test]
	fn unknown_struct_type_is_rejected() {
		let types = Types::new();
		match hash_struct("Missing", &types, &Map::new()) {
			Err(Error::Unsupported(what)) => assert!(what.contains("Missing")),
			other => panic!("expected unsupported type, got {:?}", other),
		}
	}

	#[test]
	fn referenced_unknown_type_is_rejected() {
		let data = typed(
			r#"{
				"domain": {"name": "t"},
				"types": {"M": [{"name": "v", "type": "Ghost"}]},
				"primaryType": "M",
				"message": {"v": null}
			}"#,
		);
		assert!(hash_typed_data(&data).is_err());
	}

	#[test]
	fn cyclic_type_references_terminate() {
		let data = typed(
			r#"{
				"types": {
					"A": [{"name": "b", "type": "B"}],
					"B": [{"name": "a", "type": "A"}]
				},
				"primaryType": "A",
				"domain": {},
				"message": {}
			}"#,
		);
		// A appears once up front and never again in its own tail.
		assert_eq!(encode_type("A", &data.types).unwrap(), "A(B b)B(A a)");
	}

	#[test]
	fn field_coercions_match_reference_behavior() {
		let types: Types = serde_json::from_str(
			r#"{"M": [
				{"name": "flag", "type": "bool"},
				{"name": "neg", "type": "int256"},
				{"name": "clamped", "type": "uint64"},
				{"name": "tag", "type": "bytes4"},
				{"name": "note", "type": "string"},
				{"name": "blob", "type": "bytes"}
			]}"#,
		)
		.unwrap();
		let encode = |value: &str, field: usize| {
			let field_def = &types["M"][field];
			let json: Json = serde_json::from_str(value).unwrap();
			encode_field(&types, &field_def.name, &field_def.field_type, Some(&json)).unwrap()
		};

		// Falsy strings coerce to false; other strings to true.
		assert_eq!(encode(r#""false""#, 0)[31], 0);
		assert_eq!(encode(r#""0""#, 0)[31], 0);
		assert_eq!(encode(r#""yes""#, 0)[31], 1);
		assert_eq!(encode("true", 0)[31], 1);

		// Two's complement for negative signed values.
		assert_eq!(encode("-1", 1), [0xff; 32]);

		// Negative unsigned clamps to zero.
		assert_eq!(encode("-5", 2), [0u8; 32]);

		// bytesN right-pads.
		let tag = encode(r#""0xdeadbeef""#, 3);
		assert_eq!(&tag[..4], &hex!("deadbeef")[..]);
		assert_eq!(&tag[4..], &[0u8; 28][..]);

		// Strings and dynamic bytes hash.
		assert_eq!(encode(r#""hi""#, 4), keccak(b"hi").to_fixed_bytes());
		assert_eq!(encode(r#""0x0102""#, 5), keccak(&[0x01u8, 0x02][..]).to_fixed_bytes());

		// Absent string and bytes values are zero words.
		assert_eq!(encode_field(&types, "note", "string", None).unwrap(), [0u8; 32]);
		assert_eq!(encode_field(&types, "blob", "bytes", None).unwrap(), [0u8; 32]);

		// Hex and decimal strings both parse as integers.
		let from_hex_str = encode(r#""0x10""#, 2);
		let from_dec_str = encode(r#""16""#, 2);
		assert_eq!(from_hex_str, from_dec_str);
		assert_eq!(from_hex_str[31], 16);
	}

	#[test]
	fn atomic_type_table() {
		for atomic in &["string", "bytes", "bool", "address", "uint8", "uint256", "int64", "bytes1", "bytes32"] {
			assert!(is_atomic_type(atomic), "{} should be atomic", atomic);
		}
		for unknown in &["uint", "int", "uint257", "uint12", "bytes0", "bytes33", "Mail", "uint08"] {
			assert!(!is_atomic_type(unknown), "{} should not be atomic", unknown);
		}
	}

	#[test]
	fn agent_message_digest_is_stable() {
		let domain = AgentDomain {
			name: "Exchange".to_owned(),
			version: "1".to_owned(),
			chain_id: 1337,
			verifying_contract: Address::zero(),
		};
		let connection_id: Vec<u8> = (0u8..32).collect();
		assert_eq!(
			hash_agent_message(&domain, "a", &connection_id),
			H256(hex!("b9e7c81cff512fa0969928e37d7c2475af657f1b314b7458c8dd7a023044cac0")),
		);
	}

	#[test]
	fn agent_typehashes_are_the_known_constants() {
		assert_eq!(
			*EIP712_DOMAIN_TYPEHASH,
			H256::from_str("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f").unwrap(),
		);
		assert_eq!(
			*AGENT_TYPEHASH,
			H256::from_str("26f05c2f7239b6983075e58321292d77b3aa173d19b27257ac96ab362570f508").unwrap(),
		);
	}
}
