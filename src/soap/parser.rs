//! Parsing of SOAP response envelopes and their authentication headers.

use std::io::BufReader;

use xmltree::Element;

use super::envelope::{child_text, find_child_local, local_name};
use super::{SoapBody, SoapEnvelope, SoapHeader};

/// SOAP envelope parse error.
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,
}

/// Authentication signal carried in a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSignal {
    /// The server demands (re)authentication before the action can succeed.
    Challenge {
        status: Option<String>,
        nonce: Option<String>,
        realm: Option<String>,
    },

    /// Authentication succeeded and the server rotated the nonce.
    NextChallenge {
        nonce: Option<String>,
        realm: Option<String>,
    },
}

/// Parse a SOAP 1.1 envelope. Header and body are both optional: a
/// challenge response may carry only a header.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if local_name(&root.name) != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let header = find_child_local(&root, "Header").map(|e| SoapHeader { content: e.clone() });
    let body = find_child_local(&root, "Body").map(|e| SoapBody { content: e.clone() });

    Ok(SoapEnvelope { header, body })
}

/// Extract the authentication signal from a response header, if any.
pub fn header_signal(header: &SoapHeader) -> Option<HeaderSignal> {
    for node in &header.content.children {
        let Some(elem) = node.as_element() else {
            continue;
        };
        match local_name(&elem.name) {
            "Challenge" => {
                return Some(HeaderSignal::Challenge {
                    status: child_text(elem, "Status"),
                    nonce: child_text(elem, "Nonce"),
                    realm: child_text(elem, "Realm"),
                });
            }
            "NextChallenge" => {
                return Some(HeaderSignal::NextChallenge {
                    nonce: child_text(elem, "Nonce"),
                    realm: child_text(elem, "Realm"),
                });
            }
            _ => {}
        }
    }
    None
}

/// Find the `{action}Response` element in a response body.
pub fn find_action_response<'a>(body: &'a SoapBody, action: &str) -> Option<&'a Element> {
    let response_name = format!("{}Response", action);
    find_child_local(&body.content, &response_name)
}

/// Read the declared out arguments from a response element.
///
/// Only names listed in `out_args` are read; absent children are simply
/// omitted from the result, never an error.
pub fn extract_out_args(
    response: &Element,
    out_args: &[String],
) -> std::collections::HashMap<String, String> {
    let mut values = std::collections::HashMap::new();
    for name in out_args {
        if let Some(text) = child_text(response, name) {
            values.insert(name.clone(), text);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHALLENGE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:Challenge xmlns:h="http://soap-authentication.org/digest/2001/10/" s:mustUnderstand="1">
      <Status>Unauthenticated</Status>
      <Nonce>0AF324C11E85F022</Nonce>
      <Realm>HomeRouter</Realm>
    </h:Challenge>
  </s:Header>
  <s:Body/>
</s:Envelope>"#;

    const NEXT_CHALLENGE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:NextChallenge xmlns:h="http://soap-authentication.org/digest/2001/10/">
      <Status>Authenticated</Status>
      <Nonce>4D91A2B7</Nonce>
      <Realm>HomeRouter</Realm>
    </h:NextChallenge>
  </s:Header>
  <s:Body>
    <u:GetInfoResponse xmlns:u="urn:dslforum-org:service:DeviceInfo:1">
      <NewStatus>1</NewStatus>
    </u:GetInfoResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn header_only_envelope_parses_without_a_body() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:Challenge xmlns:h="http://soap-authentication.org/digest/2001/10/">
      <Status>Unauthenticated</Status>
      <Nonce>abc</Nonce>
      <Realm>HomeRouter</Realm>
    </h:Challenge>
  </s:Header>
</s:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert!(envelope.body.is_none());

        let signal = header_signal(envelope.header.as_ref().unwrap()).unwrap();
        assert!(matches!(signal, HeaderSignal::Challenge { .. }));
    }

    #[test]
    fn bare_envelope_parses_to_neither_header_nor_body() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"/>"#;
        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert!(envelope.header.is_none());
        assert!(envelope.body.is_none());
    }

    #[test]
    fn parse_rejects_non_envelope_root() {
        let xml = r#"<root><s:Body xmlns:s="x"/></root>"#;
        let err = parse_soap_envelope(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapParseError::MissingEnvelope));
    }

    #[test]
    fn malformed_xml_is_a_hard_failure() {
        let xml = r#"<s:Envelope xmlns:s="x"><s:Body></wrong></s:Envelope>"#;
        let err = parse_soap_envelope(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapParseError::XmlError(_)));
    }

    #[test]
    fn challenge_signal_is_extracted() {
        let envelope = parse_soap_envelope(CHALLENGE.as_bytes()).unwrap();
        let signal = header_signal(envelope.header.as_ref().unwrap()).unwrap();

        assert_eq!(
            signal,
            HeaderSignal::Challenge {
                status: Some("Unauthenticated".to_string()),
                nonce: Some("0AF324C11E85F022".to_string()),
                realm: Some("HomeRouter".to_string()),
            }
        );
    }

    #[test]
    fn next_challenge_is_not_mistaken_for_challenge() {
        let envelope = parse_soap_envelope(NEXT_CHALLENGE.as_bytes()).unwrap();
        let signal = header_signal(envelope.header.as_ref().unwrap()).unwrap();

        assert!(matches!(signal, HeaderSignal::NextChallenge { .. }));
    }

    #[test]
    fn out_args_select_only_declared_names() {
        let envelope = parse_soap_envelope(NEXT_CHALLENGE.as_bytes()).unwrap();
        let body = envelope.body.as_ref().unwrap();
        let response = find_action_response(body, "GetInfo").unwrap();

        let out_args = vec!["NewStatus".to_string(), "NewUptime".to_string()];
        let values = extract_out_args(response, &out_args);

        assert_eq!(values.get("NewStatus"), Some(&"1".to_string()));
        assert!(!values.contains_key("NewUptime"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn missing_response_element_yields_none() {
        let envelope = parse_soap_envelope(NEXT_CHALLENGE.as_bytes()).unwrap();
        let body = envelope.body.as_ref().unwrap();
        assert!(find_action_response(body, "GetSecurityPort").is_none());
    }
}
