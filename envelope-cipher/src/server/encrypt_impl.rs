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

use super::constant::*;
use super::CryptoServiceImpl;
use crate::utils::crypto::envelope::EncryptionResult;
use envelope_cipher_tonic::EncryptRequest;
use envelope_types::*;

impl CryptoServiceImpl {
    pub async fn encrypt_impl(&self, request: EncryptRequest) -> CipherResult<EncryptionResult> {
        let payload_chars = request.payload.chars().count();
        if payload_chars > MAX_PAYLOAD_CHARS {
            return_errno!(
                CipherStatus::InvalidArgument,
                "payload must be at most {} characters, got {}",
                MAX_PAYLOAD_CHARS,
                payload_chars
            );
        }
        let cipher = self.cipher.clone();
        tokio::task::spawn_blocking(move || cipher.encrypt(request.payload.as_bytes()))
            .await
            .map_err(|e| errno!(CipherStatus::InternalErr, "encrypt task failed: {}", e))?
    }
}
