//! SOAP envelope structures shared by the builder and the parser.

use xmltree::Element;

/// A parsed SOAP envelope.
///
/// Both parts are optional on the wire: a challenge response may carry a
/// header and no body at all.
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// Optional header, carries the digest authentication signals.
    pub header: Option<SoapHeader>,

    /// Optional body, carries the action response or a fault.
    pub body: Option<SoapBody>,
}

/// SOAP header.
#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Raw XML content of the header.
    pub content: Element,
}

/// SOAP body.
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Raw XML content of the body.
    pub content: Element,
}

/// Strip the namespace prefix from a qualified element name.
pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Find a direct child element whose local name matches exactly.
pub(crate) fn find_child_local<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent
        .children
        .iter()
        .find_map(|node| node.as_element().filter(|e| local_name(&e.name) == name))
}

/// Text content of a direct child element, trimmed.
///
/// Returns `None` when the child element is absent, `Some("")` when it is
/// present but empty.
pub(crate) fn child_text(parent: &Element, name: &str) -> Option<String> {
    let child = find_child_local(parent, name)?;
    Some(
        child
            .get_text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
    )
}
