//! Application context.
//!
//! One explicit object owns everything that outlives a single view: the
//! signed-in session, the user's chat key pair and the list filter state.
//! Components receive it by reference. `sign_out` is the single teardown
//! point; the token and key material are zeroized when released.

use std::fmt;

use serde::{Deserialize, Serialize};
use studyhall_crypto::KeyPair;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::errors::ContextError;

/// Default rows per page for list views.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Student,
}

/// A signed-in user.
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    token: Zeroizing<String>,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
            token: Zeroizing::new(token.into()),
        }
    }

    /// Bearer token for backend requests.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Filter state shared by the seat, fee and member list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListFilters {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListFilters {
    fn normalize(&mut self) {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if self.search.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.search = None;
        }
    }
}

#[derive(Debug, Default)]
pub struct AppContext {
    session: Option<Session>,
    key_pair: Option<KeyPair>,
    filters: ListFilters,
}

impl AppContext {
    /// A signed-out context with default filters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, session: Session, key_pair: Option<KeyPair>) -> Result<(), ContextError> {
        if let Some(current) = &self.session {
            return Err(ContextError::AlreadySignedIn(current.user_id.clone()));
        }
        info!(user_id = %session.user_id, role = ?session.role, "signed in");
        self.session = Some(session);
        self.key_pair = key_pair;
        Ok(())
    }

    /// Attach chat key material to the current session.
    pub fn install_key_pair(&mut self, key_pair: KeyPair) -> Result<(), ContextError> {
        let session = self.require_session()?;
        debug!(user_id = %session.user_id, public_key = %key_pair.public_key(), "installed chat key pair");
        self.key_pair = Some(key_pair);
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn require_session(&self) -> Result<&Session, ContextError> {
        self.session.as_ref().ok_or(ContextError::NotSignedIn)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    pub fn key_pair(&self) -> Option<&KeyPair> {
        self.key_pair.as_ref()
    }

    pub fn require_key_pair(&self) -> Result<&KeyPair, ContextError> {
        self.require_session()?;
        self.key_pair.as_ref().ok_or(ContextError::NoKeyMaterial)
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    /// Edit the filters in place. Page and page size are clamped afterwards.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut ListFilters)) {
        edit(&mut self.filters);
        self.filters.normalize();
    }

    pub fn reset_filters(&mut self) {
        self.filters = ListFilters::default();
    }

    /// Clear the session, key material and filters.
    ///
    /// Returns whether a session was active.
    pub fn sign_out(&mut self) -> bool {
        let had_session = match self.session.take() {
            Some(session) => {
                info!(user_id = %session.user_id, "signed out");
                true
            }
            None => false,
        };
        self.key_pair = None;
        self.reset_filters();
        had_session
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.sign_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Session {
        Session::new("u-42", "Asha", Role::Student, "tok-secret")
    }

    #[test]
    fn test_new_context_is_signed_out() {
        let ctx = AppContext::new();
        assert!(!ctx.is_signed_in());
        assert!(ctx.role().is_none());
        assert_eq!(ctx.require_session().unwrap_err(), ContextError::NotSignedIn);
        assert_eq!(ctx.filters(), &ListFilters::default());
    }

    #[test]
    fn test_sign_in_and_out_clears_everything() {
        let mut ctx = AppContext::new();
        ctx.sign_in(student(), Some(KeyPair::generate().unwrap())).unwrap();
        ctx.update_filters(|f| {
            f.search = Some("ravi".into());
            f.page = 4;
        });

        assert_eq!(ctx.role(), Some(Role::Student));
        assert_eq!(ctx.session().unwrap().token(), "tok-secret");
        assert!(ctx.key_pair().is_some());

        assert!(ctx.sign_out());
        assert!(!ctx.is_signed_in());
        assert!(ctx.key_pair().is_none());
        assert_eq!(ctx.filters(), &ListFilters::default());

        assert!(!ctx.sign_out());
    }

    #[test]
    fn test_drop_signs_out_without_touching_shared_keys() {
        let pair = KeyPair::generate().unwrap();
        let public = *pair.public_key();
        {
            let mut ctx = AppContext::new();
            ctx.sign_in(student(), Some(pair.clone())).unwrap();
            assert!(ctx.is_signed_in());
        }
        // Dropping an already signed-out context is a no-op.
        drop(AppContext::new());
        assert_eq!(pair.public_key(), &public);
    }

    #[test]
    fn test_double_sign_in_rejected() {
        let mut ctx = AppContext::new();
        ctx.sign_in(student(), None).unwrap();
        let err = ctx
            .sign_in(Session::new("u-1", "Admin", Role::Admin, "t"), None)
            .unwrap_err();
        assert_eq!(err, ContextError::AlreadySignedIn("u-42".into()));
        assert_eq!(ctx.session().unwrap().user_id, "u-42");
    }

    #[test]
    fn test_key_material_requires_session() {
        let mut ctx = AppContext::new();
        assert_eq!(
            ctx.install_key_pair(KeyPair::generate().unwrap()).unwrap_err(),
            ContextError::NotSignedIn
        );

        ctx.sign_in(student(), None).unwrap();
        assert_eq!(ctx.require_key_pair().unwrap_err(), ContextError::NoKeyMaterial);
        ctx.install_key_pair(KeyPair::generate().unwrap()).unwrap();
        assert!(ctx.require_key_pair().is_ok());
    }

    #[test]
    fn test_filters_are_clamped() {
        let mut ctx = AppContext::new();
        ctx.update_filters(|f| {
            f.page = 0;
            f.page_size = 1000;
            f.search = Some("   ".into());
        });
        assert_eq!(ctx.filters().page, 1);
        assert_eq!(ctx.filters().page_size, MAX_PAGE_SIZE);
        assert!(ctx.filters().search.is_none());

        ctx.update_filters(|f| f.page_size = 0);
        assert_eq!(ctx.filters().page_size, 1);
    }

    #[test]
    fn test_session_debug_hides_token() {
        let dbg = format!("{:?}", student());
        assert!(!dbg.contains("tok-secret"));
        assert!(dbg.contains("u-42"));
    }
}
