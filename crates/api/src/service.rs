//! Shared business rules as framework-agnostic pure functions.
//!
//! The store calls these inside its transactions and the server calls the
//! validators before touching the store, keeping route handlers as thin
//! adapters.

use chrono::{DateTime, FixedOffset, Utc};

use crate::{Role, ServiceError};

// ─── Validation ─────────────────────────────────────────────────────────────

/// Validate and normalize a username. Returns the trimmed username.
pub fn validate_username(username: &str) -> Result<String, ServiceError> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if len < 3 {
        return Err(ServiceError::BadRequest("username is too short".into()));
    }
    if len > 32 {
        return Err(ServiceError::BadRequest("username is too long".into()));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

/// Validate a password (8-64 characters).
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    let len = password.chars().count();
    if len < 8 {
        return Err(ServiceError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }
    if len > 64 {
        return Err(ServiceError::BadRequest(
            "password must be at most 64 characters".into(),
        ));
    }
    Ok(())
}

/// Validate and normalize a family name. Returns the trimmed name.
pub fn validate_family_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 64 {
        return Err(ServiceError::BadRequest(
            "family name must be 1-64 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize an item name. Returns the trimmed name.
pub fn validate_item_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 100 {
        return Err(ServiceError::BadRequest(
            "item name must be 1-100 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Collapse free-text item types to one spelling: trimmed, first character
/// upper-cased, the rest lower-cased. Blank input becomes `""`.
pub fn normalize_item_type(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
    }
}

// ─── Time windows ───────────────────────────────────────────────────────────

/// A half-open booking interval `[start, end)` with `start < end`.
///
/// Instants are kept in UTC at millisecond precision, which is what the
/// store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ServiceError> {
        Self::from_millis(start.timestamp_millis(), end.timestamp_millis())
    }

    /// Build a window from client-supplied instants; the offset is dropped.
    pub fn from_offsets(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, ServiceError> {
        Self::from_millis(start.timestamp_millis(), end.timestamp_millis())
    }

    pub fn from_millis(start_ms: i64, end_ms: i64) -> Result<Self, ServiceError> {
        if start_ms >= end_ms {
            return Err(ServiceError::BadRequest(
                "start time must be before end time".into(),
            ));
        }
        let start = DateTime::from_timestamp_millis(start_ms)
            .ok_or_else(|| ServiceError::BadRequest("start time out of range".into()))?;
        let end = DateTime::from_timestamp_millis(end_ms)
            .ok_or_else(|| ServiceError::BadRequest("end time out of range".into()))?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Half-open overlap: touching endpoints do not conflict.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

// ─── Authorization rules ────────────────────────────────────────────────────

/// Decide whether `actor_role` may remove a member holding `target_role`.
///
/// Precedence: self-removal (blocked for owners), owner/admin removing a
/// member, owner removing an admin, everything else forbidden.
pub fn check_member_removal(
    actor_role: Role,
    target_role: Role,
    is_self: bool,
) -> Result<(), ServiceError> {
    if is_self {
        if actor_role == Role::Owner {
            return Err(ServiceError::Forbidden(
                "transfer ownership before leaving the family".into(),
            ));
        }
        return Ok(());
    }

    match (actor_role, target_role) {
        (Role::Owner | Role::Admin, Role::Member) => Ok(()),
        (Role::Owner, Role::Admin) => Ok(()),
        _ => Err(ServiceError::Forbidden(
            "insufficient role to remove this member".into(),
        )),
    }
}

/// A booking may be changed by whoever made it, or by an owner/admin of
/// the family it belongs to.
pub fn can_manage_reservation(actor_id: &str, booked_by: &str, actor_role: Option<Role>) -> bool {
    actor_id == booked_by || actor_role.is_some_and(|r| r.is_manager())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_normalize_item_type() {
        assert_eq!(normalize_item_type("CAMPING"), "Camping");
        assert_eq!(normalize_item_type("camping"), "Camping");
        assert_eq!(normalize_item_type(" Camping "), "Camping");
        assert_eq!(normalize_item_type("camping "), "Camping");
        assert_eq!(normalize_item_type(""), "");
        assert_eq!(normalize_item_type("   "), "");
        assert_eq!(normalize_item_type("bOAT trailer"), "Boat trailer");
        assert_eq!(normalize_item_type("éTÉ"), "Été");
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  alice  ").unwrap(), "alice");
        assert!(validate_username("al").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
        assert!(validate_username(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_email_and_password() {
        assert_eq!(validate_email(" Bob@Example.COM ").unwrap(), "bob@example.com");
        assert!(validate_email("nope").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_validate_names() {
        assert_eq!(validate_family_name(" Smiths ").unwrap(), "Smiths");
        assert!(validate_family_name("   ").is_err());
        assert_eq!(validate_item_name("Tent").unwrap(), "Tent");
        assert!(validate_item_name("").is_err());
    }

    #[test]
    fn window_requires_start_before_end() {
        assert!(TimeWindow::new(at(10, 0), at(11, 0)).is_ok());
        let err = TimeWindow::new(at(11, 0), at(11, 0)).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert!(TimeWindow::new(at(12, 0), at(11, 0)).is_err());
    }

    #[test]
    fn window_drops_offset_but_keeps_instant() {
        let start = DateTime::parse_from_rfc3339("2025-06-01T12:00:00+02:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2025-06-01T11:00:00Z").unwrap();
        let w = TimeWindow::from_offsets(start, end).unwrap();
        assert_eq!(w.start(), at(10, 0));
        assert_eq!(w.end(), at(11, 0));
    }

    #[test]
    fn overlap_is_half_open() {
        let booked = TimeWindow::new(at(10, 0), at(11, 0)).unwrap();
        let straddling = TimeWindow::new(at(10, 30), at(11, 30)).unwrap();
        let touching = TimeWindow::new(at(11, 0), at(12, 0)).unwrap();
        let before = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        let inside = TimeWindow::new(at(10, 15), at(10, 45)).unwrap();
        let covering = TimeWindow::new(at(9, 0), at(12, 0)).unwrap();

        assert!(booked.overlaps(&straddling));
        assert!(straddling.overlaps(&booked));
        assert!(!booked.overlaps(&touching));
        assert!(!booked.overlaps(&before));
        assert!(booked.overlaps(&inside));
        assert!(booked.overlaps(&covering));
        assert!(booked.overlaps(&booked));
    }

    #[test]
    fn removal_matrix_covers_every_combination() {
        use Role::*;
        let roles = [Owner, Admin, Member];
        for actor in roles {
            for target in roles {
                for is_self in [true, false] {
                    let expected = if is_self {
                        actor != Owner
                    } else {
                        matches!(
                            (actor, target),
                            (Owner, Member) | (Admin, Member) | (Owner, Admin)
                        )
                    };
                    let got = check_member_removal(actor, target, is_self);
                    assert_eq!(
                        got.is_ok(),
                        expected,
                        "actor={actor} target={target} self={is_self}"
                    );
                    if let Err(e) = got {
                        assert!(matches!(e, ServiceError::Forbidden(_)));
                    }
                }
            }
        }
    }

    #[test]
    fn removal_matrix_explicit_cases() {
        use Role::*;
        assert!(check_member_removal(Admin, Owner, false).is_err());
        assert!(check_member_removal(Admin, Admin, false).is_err());
        assert!(check_member_removal(Owner, Owner, false).is_err());
        assert!(check_member_removal(Member, Member, false).is_err());
        assert!(check_member_removal(Owner, Admin, false).is_ok());
        assert!(check_member_removal(Member, Member, true).is_ok());
        assert!(check_member_removal(Admin, Admin, true).is_ok());
        assert!(check_member_removal(Owner, Owner, true).is_err());
    }

    #[test]
    fn reservation_management_rights() {
        assert!(can_manage_reservation("u1", "u1", Some(Role::Member)));
        assert!(can_manage_reservation("u1", "u1", None));
        assert!(can_manage_reservation("u2", "u1", Some(Role::Admin)));
        assert!(can_manage_reservation("u2", "u1", Some(Role::Owner)));
        assert!(!can_manage_reservation("u2", "u1", Some(Role::Member)));
        assert!(!can_manage_reservation("u2", "u1", None));
    }
}
