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

// constant define
// upper bound on plaintext characters accepted by the encrypt call
pub const MAX_PAYLOAD_CHARS: usize = 2000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u32 = 3000;

pub const SUCCESS_MESSAGE: &str = "success";
// the only message a caller sees for unwrap and tag failures
pub const DECRYPTION_FAILED_MESSAGE: &str = "decryption failed";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";
