//! Construction of SOAP action requests.

use xmltree::{Element, XMLNode};

use crate::service::Argument;

/// Namespace of the TR-064 digest authentication headers.
pub const AUTH_NAMESPACE: &str = "http://soap-authentication.org/digest/2001/10/";

/// Authentication header emitted with every action request.
///
/// `Init` opens the challenge/response handshake (no digest computed yet);
/// `Client` carries the digest derived from the last accepted nonce.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    Init {
        user_id: String,
        realm: String,
    },
    Client {
        nonce: String,
        auth: String,
        user_id: String,
        realm: String,
    },
}

fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

fn build_auth_header(auth: &AuthHeader) -> Element {
    let (tag, fields): (&str, Vec<(&str, &str)>) = match auth {
        AuthHeader::Init { user_id, realm } => (
            "h:InitChallenge",
            vec![("UserID", user_id.as_str()), ("Realm", realm.as_str())],
        ),
        AuthHeader::Client {
            nonce,
            auth,
            user_id,
            realm,
        } => (
            "h:ClientAuth",
            vec![
                ("Nonce", nonce.as_str()),
                ("Auth", auth.as_str()),
                ("UserID", user_id.as_str()),
                ("Realm", realm.as_str()),
            ],
        ),
    };

    let mut elem = Element::new(tag);
    elem.attributes
        .insert("xmlns:h".to_string(), AUTH_NAMESPACE.to_string());
    elem.attributes
        .insert("s:mustUnderstand".to_string(), "1".to_string());
    for (name, value) in fields {
        elem.children.push(XMLNode::Element(text_element(name, value)));
    }

    let mut header = Element::new("s:Header");
    header.children.push(XMLNode::Element(elem));
    header
}

/// Build a complete SOAP 1.1 action request.
///
/// The body element is `<u:{action} xmlns:u="{service_type}">` with one child
/// per argument, in caller order. Argument values are inserted verbatim;
/// callers are responsible for SOAP-safe values.
pub fn build_action_request(
    service_type: &str,
    action: &str,
    args: &[Argument],
    auth: &AuthHeader,
) -> Result<String, xmltree::Error> {
    let request_name = format!("u:{}", action);
    let mut request_elem = Element::new(&request_name);
    request_elem
        .attributes
        .insert("xmlns:u".to_string(), service_type.to_string());

    for arg in args {
        request_elem
            .children
            .push(XMLNode::Element(text_element(&arg.name, &arg.value)));
    }

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(request_elem));

    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
    );
    envelope.attributes.insert(
        "s:encodingStyle".to_string(),
        "http://schemas.xmlsoap.org/soap/encoding/".to_string(),
    );
    envelope
        .children
        .push(XMLNode::Element(build_auth_header(auth)));
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_challenge_header_before_first_digest() {
        let auth = AuthHeader::Init {
            user_id: "admin".to_string(),
            realm: "HomeRouter".to_string(),
        };

        let xml = build_action_request(
            "urn:dslforum-org:service:DeviceInfo:1",
            "GetInfo",
            &[],
            &auth,
        )
        .unwrap();

        assert!(xml.contains("<h:InitChallenge"));
        assert!(xml.contains("<UserID>admin</UserID>"));
        assert!(xml.contains("<Realm>HomeRouter</Realm>"));
        assert!(xml.contains("s:mustUnderstand=\"1\""));
        assert!(!xml.contains("ClientAuth"));
        assert!(xml.contains("<u:GetInfo xmlns:u=\"urn:dslforum-org:service:DeviceInfo:1\""));
    }

    #[test]
    fn client_auth_header_carries_nonce_and_digest() {
        let auth = AuthHeader::Client {
            nonce: "abc".to_string(),
            auth: "d41d8cd9".to_string(),
            user_id: "admin".to_string(),
            realm: "HomeRouter".to_string(),
        };

        let xml = build_action_request(
            "urn:dslforum-org:service:WLANConfiguration:1",
            "SetEnable",
            &[Argument::new("NewEnable", "1")],
            &auth,
        )
        .unwrap();

        assert!(xml.contains("<h:ClientAuth"));
        assert!(xml.contains("<Nonce>abc</Nonce>"));
        assert!(xml.contains("<Auth>d41d8cd9</Auth>"));
        assert!(xml.contains("<NewEnable>1</NewEnable>"));
        assert!(!xml.contains("InitChallenge"));
    }

    #[test]
    fn arguments_keep_caller_order() {
        let auth = AuthHeader::Init {
            user_id: "admin".to_string(),
            realm: "HomeRouter".to_string(),
        };
        let args = [
            Argument::new("NewB", "2"),
            Argument::new("NewA", "1"),
        ];

        let xml = build_action_request("urn:x:service:Test:1", "DoIt", &args, &auth).unwrap();

        let b = xml.find("<NewB>").unwrap();
        let a = xml.find("<NewA>").unwrap();
        assert!(b < a);
    }
}
