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

/// Protects a symmetric key so a holder of the complementary key can recover it.
///
/// # Directionality
///
/// This is not confidentiality-direction RSA. The wrap runs the *private*
/// key operation (PKCS#1 v1.5 type 1 padding) and the matching
/// [`KeyUnwrapper`](super::key_unwrapper::KeyUnwrapper) runs the *public*
/// key operation, so anyone holding the public key can recover the wrapped
/// key. Both sides must keep this direction and padding to interoperate.
pub trait KeyWrapper {
    // Wrap a symmetric key, output length equals the modulus size
    fn wrap_key(&self, key: &[u8]) -> CipherResult<Vec<u8>>;
}
