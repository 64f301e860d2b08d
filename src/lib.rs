//! TR-064 action client.
//!
//! Given the SCPD URL of a TR-064 service, [`Service::discover`] builds a
//! registry of callable actions; each action can then be invoked by name
//! with `{name, value}` arguments and returns the declared out arguments as
//! a map. The digest challenge/response authentication handshake is driven
//! transparently, with at most one retry per invocation.

pub mod auth;
pub mod device;
pub mod errors;
pub mod scpd;
pub mod service;
pub mod soap;

use std::time::Duration;

pub use auth::{AuthState, RequestIdentity, calc_auth_digest};
pub use device::{DEFAULT_REALM, Device, DeviceConfig};
pub use errors::Tr064Error;
pub use scpd::{ScpdAction, parse_scpd};
pub use service::{Action, ActionDescriptor, Argument, Service, ServiceInfo};
pub use soap::{SoapEnvelope, SoapFault, parse_soap_envelope};

pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
