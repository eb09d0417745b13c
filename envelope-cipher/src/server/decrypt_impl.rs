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

use super::CryptoServiceImpl;
use crate::utils::crypto::envelope::DecryptionResult;
use base64::{engine::general_purpose, Engine as _};
use envelope_cipher_tonic::DecryptRequest;
use envelope_types::*;

fn check_base64_field(name: &str, value: &str) -> CipherResult<()> {
    if value.is_empty() {
        return_errno!(CipherStatus::InvalidArgument, "{} is required", name);
    }
    if general_purpose::STANDARD.decode(value).is_err() {
        return_errno!(
            CipherStatus::InvalidArgument,
            "{} must be a valid base64 string",
            name
        );
    }
    Ok(())
}

impl CryptoServiceImpl {
    pub async fn decrypt_impl(&self, request: DecryptRequest) -> CipherResult<DecryptionResult> {
        check_base64_field("wrapped_key", &request.wrapped_key)?;
        check_base64_field("encoded_payload", &request.encoded_payload)?;
        let cipher = self.cipher.clone();
        tokio::task::spawn_blocking(move || {
            cipher.decrypt(&request.wrapped_key, &request.encoded_payload)
        })
        .await
        .map_err(|e| errno!(CipherStatus::InternalErr, "decrypt task failed: {}", e))?
    }
}
