//! Unit tests for error.rs
//!
//! Tests all Error variants, their GL error codes and trait implementations.

use crate::error::{Error, ErrorCode, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_invalid_enum_display() {
    let err = Error::InvalidEnum("NUM_VIEWS token requires GL_ANGLE_multiview".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid enum"));
    assert!(display.contains("GL_ANGLE_multiview"));
}

#[test]
fn test_invalid_value_display() {
    let err = Error::InvalidValue("negative view count".to_string());
    assert_eq!(format!("{}", err), "Invalid value: negative view count");
}

#[test]
fn test_invalid_framebuffer_operation_display() {
    let err = Error::InvalidFramebufferOperation("read framebuffer is multiview".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid framebuffer operation"));
    assert!(display.contains("multiview"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of memory");
}

// ============================================================================
// ERROR CODE MAPPING
// ============================================================================

#[test]
fn test_error_codes() {
    assert_eq!(Error::InvalidEnum(String::new()).code(), ErrorCode::InvalidEnum);
    assert_eq!(Error::InvalidValue(String::new()).code(), ErrorCode::InvalidValue);
    assert_eq!(Error::InvalidOperation(String::new()).code(), ErrorCode::InvalidOperation);
    assert_eq!(
        Error::InvalidFramebufferOperation(String::new()).code(),
        ErrorCode::InvalidFramebufferOperation
    );
    assert_eq!(Error::OutOfMemory.code(), ErrorCode::OutOfMemory);
}

#[test]
fn test_initialization_failed_reports_invalid_operation() {
    let err = Error::InitializationFailed("driver not initialized".to_string());
    assert_eq!(err.code(), ErrorCode::InvalidOperation);
}

#[test]
fn test_error_code_display_uses_gl_names() {
    assert_eq!(format!("{}", ErrorCode::NoError), "GL_NO_ERROR");
    assert_eq!(
        format!("{}", ErrorCode::InvalidFramebufferOperation),
        "GL_INVALID_FRAMEBUFFER_OPERATION"
    );
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_and_eq() {
    let err1 = Error::InvalidOperation("extension inactive".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);
}

#[test]
fn test_result_propagation() {
    fn fails() -> Result<u32> {
        Err(Error::InvalidValue("bad".to_string()))
    }
    fn outer() -> Result<u32> {
        let v = fails()?;
        Ok(v + 1)
    }
    assert_eq!(outer().unwrap_err().code(), ErrorCode::InvalidValue);
}
