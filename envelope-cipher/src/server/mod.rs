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

pub mod constant;
mod decrypt_impl;
mod encrypt_impl;

use super::utils::crypto::envelope::EnvelopeCipher;
use constant::*;
use envelope_cipher_tonic::crypto_service_server::CryptoService;
use envelope_cipher_tonic::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse};
use envelope_types::*;
use log::{info, warn};
use std::sync::Arc;
use tonic::{Request, Response};

pub struct CryptoServiceImpl {
    // immutable key pair, shared by every in-flight call
    cipher: Arc<EnvelopeCipher>,
}

impl CryptoServiceImpl {
    pub fn new(cipher: EnvelopeCipher) -> Self {
        Self {
            cipher: Arc::new(cipher),
        }
    }
}

fn success_status() -> envelope_cipher_tonic::Status {
    envelope_cipher_tonic::Status {
        code: envelope_cipher_tonic::Code::Ok as i32,
        message: SUCCESS_MESSAGE.to_owned(),
    }
}

// Unwrap and tag failures share one message so callers cannot tell them
// apart; key and cipher faults are reported as a bare internal error.
fn error_status(e: &Error) -> envelope_cipher_tonic::Status {
    let message = match e.errno() {
        CipherStatus::InvalidArgument | CipherStatus::PayloadFormatErr => e.message().to_owned(),
        CipherStatus::KeyUnwrapErr | CipherStatus::AuthenticationErr => {
            DECRYPTION_FAILED_MESSAGE.to_owned()
        }
        _ => INTERNAL_ERROR_MESSAGE.to_owned(),
    };
    envelope_cipher_tonic::Status {
        code: map_cipher_status_to_i32(e.errno()),
        message,
    }
}

// interface implementation for GRPC service
#[tonic::async_trait]
impl CryptoService for CryptoServiceImpl {
    async fn encrypt(
        &self,
        request: Request<EncryptRequest>,
    ) -> Result<Response<EncryptResponse>, tonic::Status> {
        let ip = request.remote_addr();
        let request_body = request.into_inner();

        let reply = match self.encrypt_impl(request_body).await {
            Ok(result) => {
                info!(target: "monitor", "|encrypt|{:?}|{}|{}|", ip, 0, SUCCESS_MESSAGE);
                EncryptResponse {
                    status: Some(success_status()),
                    wrapped_key: result.wrapped_key,
                    encoded_payload: result.encoded_payload,
                }
            }
            Err(e) => {
                warn!("encrypt failed: {}", e);
                info!(target: "monitor", "|encrypt|{:?}|{}|{}|", ip, e.errno(), e.message());
                EncryptResponse {
                    status: Some(error_status(&e)),
                    ..Default::default()
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn decrypt(
        &self,
        request: Request<DecryptRequest>,
    ) -> Result<Response<DecryptResponse>, tonic::Status> {
        let ip = request.remote_addr();
        let request_body = request.into_inner();

        let reply = match self.decrypt_impl(request_body).await {
            Ok(result) => {
                info!(target: "monitor", "|decrypt|{:?}|{}|{}|", ip, 0, SUCCESS_MESSAGE);
                DecryptResponse {
                    status: Some(success_status()),
                    payload: result.payload,
                }
            }
            Err(e) => {
                warn!("decrypt failed: {}", e);
                info!(target: "monitor", "|decrypt|{:?}|{}|{}|", ip, e.errno(), e.message());
                DecryptResponse {
                    status: Some(error_status(&e)),
                    ..Default::default()
                }
            }
        };
        Ok(Response::new(reply))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::crypto::envelope::test::{generate_key_pair, shared_key_pair};
    use base64::{engine::general_purpose, Engine as _};
    use envelope_cipher_tonic::Code;
    use envelope_types::*;

    fn service() -> CryptoServiceImpl {
        let (public_pem, private_pem) = shared_key_pair();
        CryptoServiceImpl::new(EnvelopeCipher::new(public_pem, private_pem).unwrap())
    }

    async fn encrypt(service: &CryptoServiceImpl, payload: &str) -> EncryptResponse {
        service
            .encrypt(Request::new(EncryptRequest {
                payload: payload.to_owned(),
            }))
            .await
            .unwrap()
            .into_inner()
    }

    async fn decrypt(
        service: &CryptoServiceImpl,
        wrapped_key: &str,
        encoded_payload: &str,
    ) -> DecryptResponse {
        service
            .decrypt(Request::new(DecryptRequest {
                wrapped_key: wrapped_key.to_owned(),
                encoded_payload: encoded_payload.to_owned(),
            }))
            .await
            .unwrap()
            .into_inner()
    }

    fn code(status: &Option<envelope_cipher_tonic::Status>) -> i32 {
        status.as_ref().map(|s| s.code).unwrap()
    }

    fn message(status: &Option<envelope_cipher_tonic::Status>) -> &str {
        status.as_ref().map(|s| s.message.as_str()).unwrap()
    }

    #[tokio::test]
    async fn encrypt_then_decrypt() {
        let service = service();
        let encrypted = encrypt(&service, "Hello World").await;
        assert_eq!(code(&encrypted.status), Code::Ok as i32);
        assert_eq!(message(&encrypted.status), SUCCESS_MESSAGE);

        let decrypted = decrypt(&service, &encrypted.wrapped_key, &encrypted.encoded_payload).await;
        assert_eq!(code(&decrypted.status), Code::Ok as i32);
        assert_eq!(decrypted.payload, "Hello World");
    }

    #[tokio::test]
    async fn payload_length_is_counted_in_characters() {
        let service = service();
        let at_limit = "é".repeat(MAX_PAYLOAD_CHARS);
        let encrypted = encrypt(&service, &at_limit).await;
        assert_eq!(code(&encrypted.status), Code::Ok as i32);

        let encrypted = encrypt(&service, "").await;
        assert_eq!(code(&encrypted.status), Code::Ok as i32);

        let over = "a".repeat(MAX_PAYLOAD_CHARS + 1);
        let encrypted = encrypt(&service, &over).await;
        assert_eq!(code(&encrypted.status), Code::InvalidArgument as i32);
        assert!(encrypted.wrapped_key.is_empty());
        assert!(encrypted.encoded_payload.is_empty());
    }

    #[tokio::test]
    async fn decrypt_fields_are_validated() {
        let service = service();
        let encrypted = encrypt(&service, "test").await;

        let reply = decrypt(&service, "", &encrypted.encoded_payload).await;
        assert_eq!(code(&reply.status), Code::InvalidArgument as i32);
        assert!(message(&reply.status).contains("wrapped_key"));

        let reply = decrypt(&service, &encrypted.wrapped_key, "not base64!").await;
        assert_eq!(code(&reply.status), Code::InvalidArgument as i32);
        assert!(message(&reply.status).contains("encoded_payload"));

        let reply = decrypt(&service, &encrypted.wrapped_key, "AAAA").await;
        assert_eq!(code(&reply.status), Code::InvalidArgument as i32);
        assert!(reply.payload.is_empty());
    }

    #[tokio::test]
    async fn unwrap_and_tag_failures_look_the_same() {
        let service = service();
        let encrypted = encrypt(&service, "secret").await;

        let mut raw = general_purpose::STANDARD
            .decode(&encrypted.encoded_payload)
            .unwrap();
        raw[20] ^= 0x01;
        let tampered = general_purpose::STANDARD.encode(&raw);
        let tag_failure = decrypt(&service, &encrypted.wrapped_key, &tampered).await;

        let (other_public, other_private) = generate_key_pair(2048);
        let other_cipher = EnvelopeCipher::new(&other_public, &other_private).unwrap();
        let other = CryptoServiceImpl::new(other_cipher);
        let key_failure =
            decrypt(&other, &encrypted.wrapped_key, &encrypted.encoded_payload).await;

        for reply in [tag_failure, key_failure] {
            assert_eq!(code(&reply.status), Code::Unauthenticated as i32);
            assert_eq!(message(&reply.status), DECRYPTION_FAILED_MESSAGE);
            assert!(reply.payload.is_empty());
        }
    }

    #[test]
    fn key_and_cipher_faults_are_reported_as_internal() {
        for status in [
            CipherStatus::KeyConfigurationErr,
            CipherStatus::EncryptionErr,
            CipherStatus::InternalErr,
        ] {
            let err = errno!(status, "rsa private encrypt error: detail");
            let reply = error_status(&err);
            assert_eq!(reply.code, Code::Internal as i32);
            assert_eq!(reply.message, INTERNAL_ERROR_MESSAGE);
        }
    }

    #[test]
    fn validation_faults_keep_their_message() {
        let err = errno!(CipherStatus::InvalidArgument, "wrapped_key is required");
        let reply = error_status(&err);
        assert_eq!(reply.code, Code::InvalidArgument as i32);
        assert_eq!(reply.message, "wrapped_key is required");
    }
}
