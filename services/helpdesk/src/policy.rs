//! Ticket access policy
//!
//! Every ticket read and write is gated on the requesting principal. The
//! privilege is a role (`ticket-admin`) carried in the access-token claims
//! and backed by the role tables, not a username comparison; the default
//! seed grants it to the usernames listed in `HELPDESK_ADMIN_USERNAMES`
//! at registration time.

use uuid::Uuid;

use crate::middleware::AuthUser;

/// Role granting full visibility over every ticket
pub const TICKET_ADMIN_ROLE: &str = "ticket-admin";

/// The set of tickets a principal may read or modify
#[derive(Debug, Clone, PartialEq)]
pub enum TicketScope {
    /// Every ticket in the store
    All,
    /// Only tickets owned by this user
    OwnedBy(Uuid),
}

/// Resolve the visibility scope for a principal. A ticket outside the
/// returned scope must be reported as not found, never as forbidden.
pub fn ticket_scope(user: &AuthUser) -> TicketScope {
    if user.has_role(TICKET_ADMIN_ROLE) {
        TicketScope::All
    } else {
        TicketScope::OwnedBy(user.id)
    }
}

/// Usernames that receive the ticket-admin role when they register
#[derive(Debug, Clone)]
pub struct AdminSeed {
    usernames: Vec<String>,
}

impl AdminSeed {
    /// Create the seed set from the environment
    ///
    /// # Environment Variables
    /// - `HELPDESK_ADMIN_USERNAMES`: comma-separated usernames
    ///   (default: "teamop,teamtech")
    pub fn from_env() -> Self {
        let raw = std::env::var("HELPDESK_ADMIN_USERNAMES")
            .unwrap_or_else(|_| "teamop,teamtech".to_string());

        Self::from_list(&raw)
    }

    fn from_list(raw: &str) -> Self {
        let usernames = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        AdminSeed { usernames }
    }

    /// Whether a username belongs to the seed set
    pub fn includes(&self, username: &str) -> bool {
        self.usernames.iter().any(|u| u == username)
    }

    pub fn usernames(&self) -> &[String] {
        &self.usernames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn auth_user(roles: Vec<String>) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            roles,
            permissions: vec![],
        }
    }

    #[test]
    fn test_admin_scope_sees_all_tickets() {
        let user = auth_user(vec![TICKET_ADMIN_ROLE.to_string()]);
        assert_eq!(ticket_scope(&user), TicketScope::All);
    }

    #[test]
    fn test_regular_scope_is_owner_only() {
        let user = auth_user(vec![]);
        assert_eq!(ticket_scope(&user), TicketScope::OwnedBy(user.id));

        let user = auth_user(vec!["other-role".to_string()]);
        assert_eq!(ticket_scope(&user), TicketScope::OwnedBy(user.id));
    }

    #[test]
    #[serial]
    fn test_admin_seed_defaults() {
        unsafe {
            std::env::remove_var("HELPDESK_ADMIN_USERNAMES");
        }

        let seed = AdminSeed::from_env();
        assert!(seed.includes("teamop"));
        assert!(seed.includes("teamtech"));
        assert!(!seed.includes("alice"));
    }

    #[test]
    #[serial]
    fn test_admin_seed_from_env_override() {
        unsafe {
            std::env::set_var("HELPDESK_ADMIN_USERNAMES", "ops, supervisor ,");
        }

        let seed = AdminSeed::from_env();
        assert!(seed.includes("ops"));
        assert!(seed.includes("supervisor"));
        assert!(!seed.includes("teamop"));

        unsafe {
            std::env::remove_var("HELPDESK_ADMIN_USERNAMES");
        }
    }
}
