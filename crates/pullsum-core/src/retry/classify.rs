//! Map store errors onto retry policy error kinds.

use std::io;

use crate::retry::policy::ErrorKind;
use crate::store::StoreError;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

pub fn classify_io_error(e: &io::Error) -> ErrorKind {
    match e.kind() {
        io::ErrorKind::TimedOut => ErrorKind::Timeout,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::Interrupted => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

/// Classify a store error into an ErrorKind.
pub fn classify(e: &StoreError) -> ErrorKind {
    match e {
        StoreError::Curl(ce) => classify_curl_error(ce),
        StoreError::Http(code) => classify_http_status(*code),
        StoreError::Io(ie) => classify_io_error(ie),
        StoreError::WorkerGone => ErrorKind::Connection,
        StoreError::NotFound(_) | StoreError::InvalidKey(_) | StoreError::InvalidUrl(_) => {
            ErrorKind::Other
        }
    }
}
