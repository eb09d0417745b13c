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
use zeroize::Zeroizing;

/// Recovers a symmetric key produced by a [`KeyWrapper`](super::key_wrapper::KeyWrapper).
pub trait KeyUnwrapper {
    // Unwrap a key, never returns a partial or best-effort key
    fn unwrap_key(&self, wrapped: &[u8]) -> CipherResult<Zeroizing<Vec<u8>>>;
}
