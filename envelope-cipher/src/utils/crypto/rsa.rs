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

use crate::utils::crypto::{
    key_unwrapper::KeyUnwrapper, key_wrapper::KeyWrapper, sha::sha256_with_hex_encode,
};
use envelope_types::*;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::{Padding, Rsa};
use zeroize::Zeroizing;

// smallest accepted modulus
pub const MIN_RSA_BITS: u32 = 2048;
const PEM_PREFIX: &[u8] = b"-----BEGIN";

fn is_pem(bytes: &[u8]) -> bool {
    let trimmed = match bytes.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(start) => &bytes[start..],
        None => return false,
    };
    trimmed.starts_with(PEM_PREFIX)
}

fn check_bits(bits: u32) -> CipherResult<()> {
    if bits < MIN_RSA_BITS {
        return_errno!(
            CipherStatus::KeyConfigurationErr,
            "rsa modulus is {} bits, need at least {}",
            bits,
            MIN_RSA_BITS
        );
    }
    Ok(())
}

pub struct RsaPublicKeyHolder {
    public_key: Rsa<Public>,
}

impl RsaPublicKeyHolder {
    // Parse X509 `SubjectPublicKeyInfo` pem, falls back to pkcs#1
    pub fn public_key_from_pem(pem: &[u8]) -> CipherResult<RsaPublicKeyHolder> {
        let public_key = match PKey::public_key_from_pem(pem) {
            Ok(pkey) => pkey.rsa().map_err(|e| {
                errno!(
                    CipherStatus::KeyConfigurationErr,
                    "public key is not rsa: {:?}",
                    e
                )
            })?,
            Err(_) => Rsa::public_key_from_pem_pkcs1(pem).map_err(|e| {
                errno!(
                    CipherStatus::KeyConfigurationErr,
                    "parse public key pem error: {:?}",
                    e
                )
            })?,
        };
        Self::from_rsa(public_key)
    }

    // Parse X509 `SubjectPublicKeyInfo` der, falls back to pkcs#1
    pub fn public_key_from_der(der: &[u8]) -> CipherResult<RsaPublicKeyHolder> {
        let public_key = match PKey::public_key_from_der(der) {
            Ok(pkey) => pkey.rsa().map_err(|e| {
                errno!(
                    CipherStatus::KeyConfigurationErr,
                    "public key is not rsa: {:?}",
                    e
                )
            })?,
            Err(_) => Rsa::public_key_from_der_pkcs1(der).map_err(|e| {
                errno!(
                    CipherStatus::KeyConfigurationErr,
                    "parse public key der error: {:?}",
                    e
                )
            })?,
        };
        Self::from_rsa(public_key)
    }

    // Pem or der, detected by the pem armor
    pub fn public_key_from_bytes(bytes: &[u8]) -> CipherResult<RsaPublicKeyHolder> {
        if bytes.is_empty() {
            return_errno!(CipherStatus::KeyConfigurationErr, "public key is empty");
        }
        if is_pem(bytes) {
            Self::public_key_from_pem(bytes)
        } else {
            Self::public_key_from_der(bytes)
        }
    }

    fn from_rsa(public_key: Rsa<Public>) -> CipherResult<RsaPublicKeyHolder> {
        check_bits(public_key.n().num_bits() as u32)?;
        Ok(RsaPublicKeyHolder { public_key })
    }

    // size of the modulus in bytes, also the wrapped key length
    pub fn modulus_len(&self) -> usize {
        self.public_key.size() as usize
    }

    // true when both keys share modulus and public exponent
    pub fn matches(&self, private: &RsaPrivateKeyHolder) -> bool {
        self.public_key.n() == private.private_key.n()
            && self.public_key.e() == private.private_key.e()
    }

    // hex sha256 of the SubjectPublicKeyInfo der, safe to log
    pub fn fingerprint(&self) -> CipherResult<String> {
        let der = self.public_key.public_key_to_der().map_err(|e| {
            errno!(
                CipherStatus::KeyConfigurationErr,
                "encode public key error: {:?}",
                e
            )
        })?;
        Ok(sha256_with_hex_encode(&der))
    }
}

impl KeyUnwrapper for RsaPublicKeyHolder {
    // RSA public key operation with PKCS1 (type 1) padding
    fn unwrap_key(&self, wrapped: &[u8]) -> CipherResult<Zeroizing<Vec<u8>>> {
        let modulus_len = self.modulus_len();
        if wrapped.len() != modulus_len {
            return_errno!(
                CipherStatus::KeyUnwrapErr,
                "wrapped key length {} is not equal to {}",
                wrapped.len(),
                modulus_len
            );
        }
        let mut key = Zeroizing::new(vec![0u8; modulus_len]);
        // openssl detail is dropped, it only says which padding check failed
        let key_len = self
            .public_key
            .public_decrypt(wrapped, &mut key, Padding::PKCS1)
            .map_err(|_| errno!(CipherStatus::KeyUnwrapErr, "rsa public decrypt failed"))?;
        key.truncate(key_len);
        Ok(key)
    }
}

pub struct RsaPrivateKeyHolder {
    private_key: Rsa<Private>,
}

impl RsaPrivateKeyHolder {
    // Parse pkcs#8 or traditional private key pem
    pub fn private_key_from_pem(pem: &[u8]) -> CipherResult<RsaPrivateKeyHolder> {
        let private_key = PKey::private_key_from_pem(pem).map_err(|e| {
            errno!(
                CipherStatus::KeyConfigurationErr,
                "parse private key pem error: {:?}",
                e
            )
        })?;
        Self::from_pkey(private_key)
    }

    // Parse pkcs#8 or traditional private key der
    pub fn private_key_from_der(der: &[u8]) -> CipherResult<RsaPrivateKeyHolder> {
        let private_key = PKey::private_key_from_der(der).map_err(|e| {
            errno!(
                CipherStatus::KeyConfigurationErr,
                "parse private key der error: {:?}",
                e
            )
        })?;
        Self::from_pkey(private_key)
    }

    // Pem or der, detected by the pem armor
    pub fn private_key_from_bytes(bytes: &[u8]) -> CipherResult<RsaPrivateKeyHolder> {
        if bytes.is_empty() {
            return_errno!(CipherStatus::KeyConfigurationErr, "private key is empty");
        }
        if is_pem(bytes) {
            Self::private_key_from_pem(bytes)
        } else {
            Self::private_key_from_der(bytes)
        }
    }

    fn from_pkey(pkey: PKey<Private>) -> CipherResult<RsaPrivateKeyHolder> {
        let private_key = pkey.rsa().map_err(|e| {
            errno!(
                CipherStatus::KeyConfigurationErr,
                "private key is not rsa: {:?}",
                e
            )
        })?;
        check_bits(private_key.n().num_bits() as u32)?;
        let consistent = private_key.check_key().map_err(|e| {
            errno!(
                CipherStatus::KeyConfigurationErr,
                "rsa private key check error: {:?}",
                e
            )
        })?;
        if !consistent {
            return_errno!(
                CipherStatus::KeyConfigurationErr,
                "rsa private key is inconsistent"
            );
        }
        Ok(RsaPrivateKeyHolder { private_key })
    }
}

impl KeyWrapper for RsaPrivateKeyHolder {
    // RSA private key operation with PKCS1 (type 1) padding
    fn wrap_key(&self, key: &[u8]) -> CipherResult<Vec<u8>> {
        let mut wrapped = vec![0u8; self.private_key.size() as usize];
        let wrapped_len = self
            .private_key
            .private_encrypt(key, &mut wrapped, Padding::PKCS1)
            .map_err(|e| {
                errno!(
                    CipherStatus::EncryptionErr,
                    "rsa private encrypt error: {:?}",
                    e
                )
            })?;
        wrapped.truncate(wrapped_len);
        Ok(wrapped)
    }
}
