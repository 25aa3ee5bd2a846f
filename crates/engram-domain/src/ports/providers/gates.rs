//! Consent and ACL gate ports.
//!
//! The chat memory service treats these as external collaborators: a failed
//! consent check disables memory features for the turn (surfaced as success
//! with no memory), an ACL denial filters individual file scopes.
#![allow(missing_docs)]

use async_trait::async_trait;

#[async_trait]
pub trait ConsentGate: Send + Sync {
    /// True when the user has consented to memory features
    async fn memory_allowed(&self, user_id: &str) -> bool;
}

#[async_trait]
pub trait FileAccessGate: Send + Sync {
    /// True when the user may read the given file
    async fn can_read_file(&self, user_id: &str, file_id: &str) -> bool;
}

/// Gate that always allows; the default for deployments without ACLs
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl ConsentGate for AllowAll {
    async fn memory_allowed(&self, _user_id: &str) -> bool {
        true
    }
}

#[async_trait]
impl FileAccessGate for AllowAll {
    async fn can_read_file(&self, _user_id: &str, _file_id: &str) -> bool {
        true
    }
}
