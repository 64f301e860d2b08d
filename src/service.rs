//! Action discovery and invocation for one TR-064 service.
//!
//! [`Service::discover`] fetches the service description, builds the action
//! registry and exposes one invocable per action. Invocation drives the
//! challenge/response authentication handshake across a single bounded retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::auth::{MAX_AUTH_ATTEMPTS, RequestIdentity};
use crate::device::Device;
use crate::errors::Tr064Error;
use crate::scpd::parse_scpd;
use crate::soap::{
    HeaderSignal, build_action_request, extract_fault, extract_out_args, find_action_response,
    header_signal, parse_soap_envelope,
};

/// What the owning device advertises for one service.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Service URN, e.g. "urn:dslforum-org:service:DeviceInfo:1".
    pub service_type: String,

    /// Control endpoint path for action requests.
    pub control_url: String,

    /// Path of the SCPD document describing the actions.
    pub scpd_url: String,
}

/// One discovered action: name plus its argument names split by direction.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub name: String,
    pub in_args: Vec<String>,
    pub out_args: Vec<String>,
}

/// A caller-supplied action argument. Values are passed through verbatim and
/// are not validated against the action's declared in arguments.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub value: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

enum Attempt {
    Done(HashMap<String, String>),
    Challenge,
}

/// One TR-064 service with its discovered action registry.
#[derive(Debug)]
pub struct Service {
    device: Arc<Device>,
    info: ServiceInfo,
    actions: HashMap<String, Arc<ActionDescriptor>>,
    actions_info: Vec<Arc<ActionDescriptor>>,
    count: AtomicU64,
}

impl Service {
    /// Fetch the service description and build the action registry.
    ///
    /// An SCPD without actions yields a service with an empty registry;
    /// fetch or parse failures reject the whole build.
    pub async fn discover(device: Arc<Device>, info: ServiceInfo) -> Result<Self, Tr064Error> {
        let url = device.description_url(&info.scpd_url);
        debug!(
            device = device.friendly_name(),
            url = url.as_str(),
            "fetching service description"
        );

        let response = device.http().get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Tr064Error::HttpStatus(
                format!("Description fetch for {}", info.service_type),
                status.as_u16(),
                body,
            ));
        }

        let mut actions = HashMap::new();
        let mut actions_info = Vec::new();
        for action in parse_scpd(body.as_bytes())? {
            let descriptor = Arc::new(ActionDescriptor {
                name: action.name,
                in_args: action.in_args,
                out_args: action.out_args,
            });
            actions.insert(descriptor.name.clone(), Arc::clone(&descriptor));
            actions_info.push(descriptor);
        }

        debug!(
            device = device.friendly_name(),
            service_type = info.service_type.as_str(),
            action_count = actions_info.len(),
            "service description parsed"
        );

        Ok(Self {
            device,
            info,
            actions,
            actions_info,
            count: AtomicU64::new(0),
        })
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    /// Discovered actions, in document order.
    pub fn actions_info(&self) -> &[Arc<ActionDescriptor>] {
        &self.actions_info
    }

    /// Look up an action by name and return its invocable handle.
    pub fn action(&self, name: &str) -> Option<Action<'_>> {
        self.actions.get(name).map(|descriptor| Action {
            service: self,
            descriptor: Arc::clone(descriptor),
        })
    }

    /// Invoke an action by name.
    ///
    /// Returns the mapping of declared out-argument names to values; out
    /// arguments absent from the response body are simply missing from the
    /// mapping.
    pub async fn invoke(
        &self,
        name: &str,
        args: &[Argument],
    ) -> Result<HashMap<String, String>, Tr064Error> {
        let descriptor = self
            .actions
            .get(name)
            .ok_or_else(|| Tr064Error::unknown_action(name))?;
        self.invoke_descriptor(descriptor, args).await
    }

    async fn invoke_descriptor(
        &self,
        action: &ActionDescriptor,
        args: &[Argument],
    ) -> Result<HashMap<String, String>, Tr064Error> {
        let short_name = action.name.rsplit('_').next().unwrap_or(&action.name);
        let mut ident = RequestIdentity::new(short_name);
        let curr_count = self.count.fetch_add(1, Ordering::Relaxed) + 1;

        let mut outcome = self
            .send_action_request(action, args, &mut ident, curr_count)
            .await?;

        if matches!(outcome, Attempt::Challenge) {
            debug!(
                device = self.device.friendly_name(),
                request = curr_count,
                action = ident.name.as_str(),
                "retrying with updated credentials"
            );
            outcome = self
                .send_action_request(action, args, &mut ident, curr_count)
                .await?;
        }

        match outcome {
            Attempt::Done(values) => Ok(values),
            Attempt::Challenge => Err(Tr064Error::CredentialsIncorrect),
        }
    }

    async fn send_action_request(
        &self,
        action: &ActionDescriptor,
        args: &[Argument],
        ident: &mut RequestIdentity,
        curr_count: u64,
    ) -> Result<Attempt, Tr064Error> {
        let auth_header = self.device.auth().auth_header();
        let request_body =
            build_action_request(&self.info.service_type, &action.name, args, &auth_header)?;

        let url = format!("{}{}", self.device.control_base_url(), self.info.control_url);
        debug!(
            device = self.device.friendly_name(),
            request = curr_count,
            url = url.as_str(),
            "sending SOAP action request"
        );

        let response = self
            .device
            .http()
            .post(&url)
            .header(
                "SoapAction",
                format!("{}#{}", self.info.service_type, action.name),
            )
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .body(request_body)
            .send()
            .await?;

        let status = response.status();
        let raw_body = response.text().await?;

        // HTTP 500 with a SOAP Fault body is still a parseable envelope; fall
        // back to the status/body error only when the body is not SOAP.
        let envelope = match parse_soap_envelope(raw_body.as_bytes()) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Tr064Error::HttpStatus(
                    format!("{}#{}", self.info.service_type, action.name),
                    status.as_u16(),
                    raw_body,
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(header) = &envelope.header {
            match header_signal(header) {
                Some(HeaderSignal::Challenge {
                    status,
                    nonce,
                    realm,
                }) => {
                    debug!(
                        device = self.device.friendly_name(),
                        request = curr_count,
                        action = ident.name.as_str(),
                        "received authentication challenge"
                    );
                    ident.count += 1;
                    return match (status.as_deref(), nonce) {
                        (Some("Unauthenticated"), Some(nonce))
                            if ident.count < MAX_AUTH_ATTEMPTS =>
                        {
                            self.device.auth().on_challenge(
                                &self.info.service_type,
                                nonce,
                                realm.unwrap_or_default(),
                            );
                            Ok(Attempt::Challenge)
                        }
                        _ => Err(Tr064Error::CredentialsIncorrect),
                    };
                }
                Some(HeaderSignal::NextChallenge { nonce, realm }) => {
                    self.device
                        .auth()
                        .on_next_challenge(nonce.unwrap_or_default(), realm.unwrap_or_default());
                }
                None => {}
            }
        }

        // Header signals are handled above without looking at the body; only
        // the success/fault paths need one.
        let body = envelope
            .body
            .as_ref()
            .ok_or_else(|| Tr064Error::missing_response(&action.name))?;

        if let Some(fault) = extract_fault(body) {
            debug!(
                device = self.device.friendly_name(),
                request = curr_count,
                action = ident.name.as_str(),
                code = fault.error_code.as_str(),
                "action returned SOAP fault"
            );
            return Err(Tr064Error::Fault {
                service_type: self.info.service_type.clone(),
                action: action.name.clone(),
                code: fault.error_code,
                description: fault.error_description,
            });
        }

        let response_elem = find_action_response(body, &action.name)
            .ok_or_else(|| Tr064Error::missing_response(&action.name))?;

        debug!(
            device = self.device.friendly_name(),
            request = curr_count,
            action = ident.name.as_str(),
            "action response received"
        );

        Ok(Attempt::Done(extract_out_args(
            response_elem,
            &action.out_args,
        )))
    }
}

/// Invocable handle bound to one discovered action.
#[derive(Debug)]
pub struct Action<'a> {
    service: &'a Service,
    descriptor: Arc<ActionDescriptor>,
}

impl Action<'_> {
    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    /// Invoke the action with the given arguments.
    pub async fn invoke(
        &self,
        args: &[Argument],
    ) -> Result<HashMap<String, String>, Tr064Error> {
        self.service.invoke_descriptor(&self.descriptor, args).await
    }
}
