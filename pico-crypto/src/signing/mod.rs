// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Message signing schemes: EIP-712 typed data and BIP-137 signed
//! messages.

pub mod bip137;
pub mod eip712;

pub use self::bip137::{sign_message, signed_message_hash, verify_message};
pub use self::eip712::{hash_agent_message, hash_typed_data, AgentDomain, TypedData};
