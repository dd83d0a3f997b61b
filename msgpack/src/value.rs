// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dynamic values over the encodable type set.

use crate::error::EncoderError;
use crate::stream::PackStream;
use crate::traits::Packable;

/// A value of the closed MessagePack input set: nil, bool, integer,
/// byte-string, text string, array, or map.
///
/// Maps are association lists so the caller-supplied entry order is
/// preserved bit-for-bit on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Nil,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Bytes(Vec<u8>),
	String(String),
	Array(Vec<Value>),
	Map(Vec<(Value, Value)>),
}

impl Value {
	/// Converts a JSON tree into an encodable value.
	///
	/// Object entry order is kept. Floats are the only JSON values outside
	/// the encodable set.
	pub fn from_json(json: &serde_json::Value) -> Result<Value, EncoderError> {
		match json {
			serde_json::Value::Null => Ok(Value::Nil),
			serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
			serde_json::Value::Number(n) => {
				if let Some(u) = n.as_u64() {
					Ok(Value::UInt(u))
				} else if let Some(i) = n.as_i64() {
					Ok(Value::Int(i))
				} else {
					Err(EncoderError::UnsupportedType("float"))
				}
			}
			serde_json::Value::String(s) => Ok(Value::String(s.clone())),
			serde_json::Value::Array(items) => {
				let mut array = Vec::with_capacity(items.len());
				for item in items {
					array.push(Value::from_json(item)?);
				}
				Ok(Value::Array(array))
			}
			serde_json::Value::Object(entries) => {
				let mut map = Vec::with_capacity(entries.len());
				for (key, value) in entries {
					map.push((Value::String(key.clone()), Value::from_json(value)?));
				}
				Ok(Value::Map(map))
			}
		}
	}
}

impl Packable for Value {
	fn pack_append(&self, s: &mut PackStream) {
		match self {
			Value::Nil => {
				s.append_nil();
			}
			// Bool is matched ahead of the integer arms; `true` must never
			// take the integer path.
			Value::Bool(b) => b.pack_append(s),
			Value::Int(i) => i.pack_append(s),
			Value::UInt(u) => u.pack_append(s),
			Value::Bytes(b) => b.pack_append(s),
			Value::String(text) => text.pack_append(s),
			Value::Array(items) => {
				s.begin_array(items.len());
				for item in items {
					item.pack_append(s);
				}
			}
			Value::Map(entries) => {
				s.begin_map(entries.len());
				for (key, value) in entries {
					key.pack_append(s);
					value.pack_append(s);
				}
			}
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Value {
		Value::Bool(b)
	}
}

impl From<u64> for Value {
	fn from(u: u64) -> Value {
		Value::UInt(u)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Value {
		Value::Int(i)
	}
}

impl<'a> From<&'a str> for Value {
	fn from(s: &'a str) -> Value {
		Value::String(s.into())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Value {
		Value::String(s)
	}
}

impl From<Vec<u8>> for Value {
	fn from(b: Vec<u8>) -> Value {
		Value::Bytes(b)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Value {
		Value::Array(items)
	}
}

impl From<Vec<(Value, Value)>> for Value {
	fn from(entries: Vec<(Value, Value)>) -> Value {
		Value::Map(entries)
	}
}
