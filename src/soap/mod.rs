//! SOAP 1.1 envelope support for TR-064 action calls.
//!
//! The builder serializes an action name, service namespace, authentication
//! header and argument list into a request document; the parser turns a
//! response document back into a header signal (challenge handling) and a
//! body (action response or fault).

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{AUTH_NAMESPACE, AuthHeader, build_action_request};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{NO_CODE, NO_MESSAGE, SoapFault, extract_fault};
pub use parser::{
    HeaderSignal, SoapParseError, extract_out_args, find_action_response, header_signal,
    parse_soap_envelope,
};
