//! SOAP fault extraction.

use super::SoapBody;
use super::envelope::{child_text, find_child_local};

/// Placeholder used when the fault detail carries no errorDescription.
pub const NO_MESSAGE: &str = "No message";

/// Placeholder used when the fault detail carries no errorCode.
pub const NO_CODE: &str = "No code";

/// Vendor error extracted from an `s:Fault` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// UPnP error code from `detail/UPnPError/errorCode`.
    pub error_code: String,

    /// Human readable description from `detail/UPnPError/errorDescription`.
    pub error_description: String,
}

/// Look for an `s:Fault` element in the body.
///
/// Malformed or missing detail falls back to placeholder code/description
/// rather than failing.
pub fn extract_fault(body: &SoapBody) -> Option<SoapFault> {
    let fault = find_child_local(&body.content, "Fault")?;

    let upnp_error = find_child_local(fault, "detail")
        .and_then(|detail| find_child_local(detail, "UPnPError"));

    let error_code = upnp_error
        .and_then(|e| child_text(e, "errorCode"))
        .unwrap_or_else(|| NO_CODE.to_string());
    let error_description = upnp_error
        .and_then(|e| child_text(e, "errorDescription"))
        .unwrap_or_else(|| NO_MESSAGE.to_string());

    Some(SoapFault {
        error_code,
        error_description,
    })
}
