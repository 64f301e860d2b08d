//! Digest authentication state shared by every action of a device.

use tracing::debug;

use crate::soap::AuthHeader;

/// Ceiling on authentication attempts within a single invocation: the first
/// request plus exactly one retry after a challenge.
pub(crate) const MAX_AUTH_ATTEMPTS: u32 = 2;

/// Mutable authentication state, one copy per device, shared across all of
/// its services and in-flight invocations.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub uid: String,
    pub pwd: String,
    pub realm: String,

    /// Last nonce accepted from a Challenge or NextChallenge header.
    pub nonce: Option<String>,

    /// Digest computed from (uid, pwd, realm, nonce); reused for every call
    /// until invalidated by a new challenge.
    pub digest: Option<String>,

    pub challenge_count: u32,

    /// Service type that triggered the last challenge, for diagnostics.
    pub service_type: Option<String>,
}

impl AuthState {
    pub fn new(uid: impl Into<String>, pwd: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            pwd: pwd.into(),
            realm: realm.into(),
            nonce: None,
            digest: None,
            challenge_count: 0,
            service_type: None,
        }
    }

    /// A challenge was observed: adopt the server's nonce/realm, recompute
    /// the digest and count the challenge.
    pub fn on_challenge(&mut self, service_type: &str, nonce: String, realm: String) {
        self.service_type = Some(service_type.to_string());
        self.nonce = Some(nonce.clone());
        self.realm = realm;
        self.digest = Some(calc_auth_digest(&self.uid, &self.pwd, &self.realm, &nonce));
        self.challenge_count += 1;
        debug!(
            service_type,
            challenge_count = self.challenge_count,
            "authentication challenge accepted, digest recomputed"
        );
    }

    /// Authentication succeeded and the server rotated the nonce: adopt it,
    /// recompute the digest and reset the challenge counter.
    pub fn on_next_challenge(&mut self, nonce: String, realm: String) {
        self.nonce = Some(nonce.clone());
        self.realm = realm;
        self.digest = Some(calc_auth_digest(&self.uid, &self.pwd, &self.realm, &nonce));
        self.challenge_count = 0;
    }

    /// Snapshot for the next request: `InitChallenge` until a digest exists,
    /// `ClientAuth` afterwards.
    pub fn auth_header(&self) -> AuthHeader {
        match &self.digest {
            Some(digest) => AuthHeader::Client {
                nonce: self.nonce.clone().unwrap_or_default(),
                auth: digest.clone(),
                user_id: self.uid.clone(),
                realm: self.realm.clone(),
            },
            None => AuthHeader::Init {
                user_id: self.uid.clone(),
                realm: self.realm.clone(),
            },
        }
    }
}

/// TR-064 digest: `md5(md5("uid:realm:pwd") + ":" + nonce)`, lowercase hex.
///
/// A pure function of its four inputs.
pub fn calc_auth_digest(uid: &str, pwd: &str, realm: &str, nonce: &str) -> String {
    let secret = format!("{:x}", md5::compute(format!("{}:{}:{}", uid, realm, pwd)));
    format!("{:x}", md5::compute(format!("{}:{}", secret, nonce)))
}

/// Per-invocation identity: short action name for diagnostics plus the
/// attempt counter that bounds the retry.
#[derive(Debug)]
pub struct RequestIdentity {
    pub name: String,
    pub count: u32,
}

impl RequestIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }
}
