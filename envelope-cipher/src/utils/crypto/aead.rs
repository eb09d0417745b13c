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

use envelope_types::*;
use openssl::symm::{decrypt_aead, encrypt_aead, Cipher};
use zeroize::Zeroizing;

/// AES-256-GCM params
// AES key length is 256 bit(32 byte)
pub const AES_KEY_LENGTH: usize = 32;
// nonce length is 96 bit(12 byte)
pub const NONCE_LENGTH: usize = 12;
// https://en.wikipedia.org/wiki/Authenticated_encryption
// authentication tag (GMAC),length is 128 bit(16 byte)
pub const TAG_LENGTH: usize = 16;

pub type AesKey = Zeroizing<[u8; AES_KEY_LENGTH]>;

// Fresh key and nonce from the openssl CSPRNG, never derived from input
pub fn generate_key_and_nonce() -> CipherResult<(AesKey, [u8; NONCE_LENGTH])> {
    let mut aes_key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    let mut nonce = [0u8; NONCE_LENGTH];
    openssl::rand::rand_bytes(&mut aes_key[..])
        .map_err(|e| errno!(CipherStatus::EncryptionErr, "rand aes key failed: {:?}", e))?;
    openssl::rand::rand_bytes(&mut nonce)
        .map_err(|e| errno!(CipherStatus::EncryptionErr, "rand nonce failed: {:?}", e))?;
    Ok((aes_key, nonce))
}

/// Encrypt `data` with AES-256-GCM, returns (ciphertext, tag)
pub fn seal(
    aes_key: &[u8; AES_KEY_LENGTH],
    nonce: &[u8; NONCE_LENGTH],
    data: &[u8],
) -> CipherResult<(Vec<u8>, [u8; TAG_LENGTH])> {
    let mut tag = [0u8; TAG_LENGTH];
    let ciphertext = encrypt_aead(
        Cipher::aes_256_gcm(),
        aes_key,
        Some(&nonce[..]),
        &[],
        data,
        &mut tag,
    )
    .map_err(|e| errno!(CipherStatus::EncryptionErr, "aes encrypt error: {:?}", e))?;
    Ok((ciphertext, tag))
}

/// Decrypt and verify with AES-256-GCM
///
/// Any failure is reported as one `AuthenticationErr` without the openssl
/// detail, so callers cannot tell a bad tag from a bad key or nonce.
pub fn open(
    aes_key: &[u8; AES_KEY_LENGTH],
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &[u8],
    tag: &[u8; TAG_LENGTH],
) -> CipherResult<Vec<u8>> {
    decrypt_aead(
        Cipher::aes_256_gcm(),
        aes_key,
        Some(&nonce[..]),
        &[],
        ciphertext,
        tag,
    )
    .map_err(|_| errno!(CipherStatus::AuthenticationErr, "aes-gcm authentication failed"))
}
