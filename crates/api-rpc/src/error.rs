//! RPC Error Types
//!
//! Maps supervisor errors to JSON-RPC error codes.

use fether_core::SupervisorError;
use jsonrpsee::types::ErrorObjectOwned;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const CONFLICT: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert SupervisorError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: SupervisorError) -> ErrorObjectOwned {
    let message = err.to_string();
    let code = match err {
        SupervisorError::AlreadyRunning { .. } => code::CONFLICT,
        SupervisorError::Io(_) | SupervisorError::Spawn(_) | SupervisorError::Process(_) => {
            code::SYSTEM_ERROR
        }
        SupervisorError::Acquisition(_)
        | SupervisorError::RuntimeFailure(_)
        | SupervisorError::ArgumentFailure(_) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, message, None::<()>)
}

pub fn validation_error(message: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::VALIDATION_ERROR, message.into(), None::<()>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = to_rpc_error(SupervisorError::AlreadyRunning { pid: Some(7) });
        assert_eq!(err.code(), code::CONFLICT);

        let err = to_rpc_error(SupervisorError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert_eq!(err.code(), code::SYSTEM_ERROR);
        assert!(err.message().contains("denied"));
    }
}
