// Copyright 2023 Ant Group Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wire layout of the encoded payload.
//!
//! ```text
//! base64( nonce (12 bytes) || tag (16 bytes) || ciphertext (remainder, may be empty) )
//! ```
//!
//! There are no length prefixes: nonce and tag lengths are protocol
//! constants, changing either breaks every payload already issued.

use super::aead::{NONCE_LENGTH, TAG_LENGTH};
use base64::{engine::general_purpose, Engine as _};
use envelope_types::*;

const NONCE_OFFSET: usize = 0;
const TAG_OFFSET: usize = NONCE_OFFSET + NONCE_LENGTH;
const CIPHERTEXT_OFFSET: usize = TAG_OFFSET + TAG_LENGTH;
/// Smallest decoded payload: nonce plus tag with an empty ciphertext
pub const MIN_PAYLOAD_LENGTH: usize = CIPHERTEXT_OFFSET;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub nonce: [u8; NONCE_LENGTH],
    pub tag: [u8; TAG_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl SealedPayload {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_PAYLOAD_LENGTH + self.ciphertext.len());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.tag);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> CipherResult<SealedPayload> {
        if buf.len() < MIN_PAYLOAD_LENGTH {
            return_errno!(
                CipherStatus::PayloadFormatErr,
                "invalid payload format: {} bytes, need at least {}",
                buf.len(),
                MIN_PAYLOAD_LENGTH
            );
        }
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(&buf[NONCE_OFFSET..TAG_OFFSET]);
        let mut tag = [0u8; TAG_LENGTH];
        tag.copy_from_slice(&buf[TAG_OFFSET..CIPHERTEXT_OFFSET]);
        Ok(SealedPayload {
            nonce,
            tag,
            ciphertext: buf[CIPHERTEXT_OFFSET..].to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> CipherResult<SealedPayload> {
        let buf = general_purpose::STANDARD.decode(encoded).map_err(|e| {
            errno!(
                CipherStatus::PayloadFormatErr,
                "payload is not valid base64: {}",
                e
            )
        })?;
        Self::from_bytes(&buf)
    }
}
