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

use std::fmt;
use thiserror::Error;

use crate::retcode::*;

// define error type of envelope cipher
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CipherStatus {
    #[error("success")]
    Success,

    // key pair missing, undecodable, wrong algorithm/size or not matched
    #[error("key configuration error")]
    KeyConfigurationErr,

    // random source, cipher construction or rsa private operation failed
    #[error("encryption error")]
    EncryptionErr,

    // wrapped key could not be recovered with the public key
    #[error("key unwrap error")]
    KeyUnwrapErr,

    // malformed base64, undersized buffer or non utf-8 plaintext
    #[error("payload format error")]
    PayloadFormatErr,

    // aead tag verification failed
    #[error("authentication error")]
    AuthenticationErr,

    #[error("internal error")]
    InternalErr,

    #[error("Invalid Argument")]
    InvalidArgument,
}

pub fn map_cipher_status_to_i32(err: CipherStatus) -> i32 {
    match err {
        CipherStatus::Success => CipherStatusT::Success as i32,
        CipherStatus::InvalidArgument | CipherStatus::PayloadFormatErr => {
            CipherStatusT::InvalidArgument as i32
        }
        CipherStatus::KeyUnwrapErr | CipherStatus::AuthenticationErr => {
            CipherStatusT::Unauthenticated as i32
        }
        CipherStatus::KeyConfigurationErr
        | CipherStatus::EncryptionErr
        | CipherStatus::InternalErr => CipherStatusT::Internal as i32,
    }
}

pub type CipherResult<T> = core::result::Result<T, Error>;

#[macro_export]
macro_rules! errno {
    ($errno_expr: expr, $($arg:tt)*) => {{
        let inner_error = {
            let errno: CipherStatus = $errno_expr;
            let msg: String = format!($($arg)*);
            (errno, msg)
        };
        let error = Error::embedded(inner_error, Some(ErrorLocation::new(file!(), line!())));
        error
    }};
}

#[macro_export]
macro_rules! return_errno {
    ($errno_expr: expr, $($arg:tt)*) => {{
        return Err(errno!($errno_expr, $($arg)*));
    }};
}

#[derive(Debug)]
pub struct Error {
    inner: Error__,
    location: Option<ErrorLocation>,
    cause: Option<Box<Error>>,
}

#[derive(Debug)]
enum Error__ {
    Embedded((CipherStatus, String)),
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorLocation {
    line: u32,
    file: &'static str,
}

impl Error {
    pub fn embedded(inner: (CipherStatus, String), location_para: Option<ErrorLocation>) -> Error {
        Error {
            inner: Error__::Embedded(inner),
            location: location_para,
            cause: None,
        }
    }

    pub fn errno(&self) -> CipherStatus {
        match &self.inner {
            Error__::Embedded((errno, _)) => *errno,
        }
    }

    pub fn message(&self) -> &str {
        match &self.inner {
            Error__::Embedded((_, msg)) => msg,
        }
    }

    // attach the lower level error that triggered this one
    pub fn with_cause(mut self, cause: Error) -> Error {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl ErrorLocation {
    pub fn new(file_para: &'static str, line_para: u32) -> ErrorLocation {
        ErrorLocation {
            file: file_para,
            line: line_para,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "inner: {}; ", self.inner)?;
        if let Some(location) = self.location {
            write!(f, "location: {}", location)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "; caused by: {}", cause)?;
        }
        Ok(())
    }
}

impl fmt::Display for Error__ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error__::Embedded((errno, msg)) => write!(f, "errno: {}, {}", errno, msg),
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[line = {}, file = {}]", self.line, self.file)
    }
}

#[cfg(test)]
mod test {
    use crate::*;

    fn fail_unwrap() -> CipherResult<()> {
        return_errno!(CipherStatus::KeyUnwrapErr, "wrapped key length {}", 3);
    }

    #[test]
    fn errno_keeps_status_and_message() {
        let err = fail_unwrap().unwrap_err();
        assert_eq!(err.errno(), CipherStatus::KeyUnwrapErr);
        assert_eq!(err.message(), "wrapped key length 3");
        let text = err.to_string();
        assert!(text.contains("key unwrap error"));
        assert!(text.contains("error.rs"));
    }

    #[test]
    fn cause_is_exposed_as_source() {
        use std::error::Error as _;
        let root = errno!(CipherStatus::InvalidArgument, "bad base64");
        let err = errno!(CipherStatus::KeyConfigurationErr, "public key").with_cause(root);
        assert!(err.to_string().contains("bad base64"));
        let source = err
            .source()
            .and_then(|s| s.downcast_ref::<Error>())
            .expect("cause should be kept");
        assert_eq!(source.errno(), CipherStatus::InvalidArgument);
    }

    #[test]
    fn status_codes_are_conservative() {
        assert_eq!(
            map_cipher_status_to_i32(CipherStatus::KeyUnwrapErr),
            map_cipher_status_to_i32(CipherStatus::AuthenticationErr)
        );
        assert_eq!(
            map_cipher_status_to_i32(CipherStatus::KeyConfigurationErr),
            CipherStatusT::Internal as i32
        );
        assert_eq!(
            map_cipher_status_to_i32(CipherStatus::PayloadFormatErr),
            CipherStatusT::InvalidArgument as i32
        );
    }
}
