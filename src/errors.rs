use thiserror::Error;

use crate::soap::SoapParseError;

#[derive(Error, Debug)]
pub enum Tr064Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} failed with HTTP status {1} and body: {2}")]
    HttpStatus(String, u16, String),

    #[error("Failed to build SOAP request body: {0}")]
    BuildRequest(#[from] xmltree::Error),

    #[error(transparent)]
    SoapParse(#[from] SoapParseError),

    #[error("Service description parsing error: {0}")]
    Description(#[from] quick_xml::Error),

    #[error("{service_type}#{action} returned UPnP error {code}: {description}")]
    Fault {
        service_type: String,
        action: String,
        code: String,
        description: String,
    },

    #[error("Credentials incorrect")]
    CredentialsIncorrect,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing {0}Response element in SOAP body")]
    MissingResponse(String),
}

impl Tr064Error {
    pub fn unknown_action(name: &str) -> Self {
        Tr064Error::UnknownAction(name.to_string())
    }

    pub fn missing_response(action: &str) -> Self {
        Tr064Error::MissingResponse(action.to_string())
    }
}
