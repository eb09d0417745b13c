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

use base64::{engine::general_purpose, Engine as _};
use envelope_types::*;

/// Decode base64 key material taken from configuration or environment.
///
/// `name` is the setting name used in error messages; the value itself is
/// never echoed back.
pub fn decode_key_material(name: &str, value: Option<&str>) -> CipherResult<Vec<u8>> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return_errno!(CipherStatus::KeyConfigurationErr, "{} is not set", name),
    };
    // the decode error quotes offending bytes of the secret, keep it out
    let key = general_purpose::STANDARD.decode(value).map_err(|_| {
        errno!(
            CipherStatus::KeyConfigurationErr,
            "{} is not valid base64",
            name
        )
    })?;
    if key.is_empty() {
        return_errno!(CipherStatus::KeyConfigurationErr, "{} is empty", name);
    }
    Ok(key)
}
