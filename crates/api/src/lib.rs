//! Shared API types, scheduling rules, crypto, and SQL builders for famshare.
//!
//! This crate is the **single source of truth** for the request/response
//! shapes served by `famshare-server` and for the rules the store enforces.
//! The `backend` feature pulls in the pieces that only a server needs
//! (password hashing, JWT signing, SQL builders).

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod crypto;
#[cfg(feature = "backend")]
pub mod db;
#[cfg(feature = "backend")]
pub mod service;

// ─── Shared Enums ────────────────────────────────────────────────────────────

/// Role within a family.
///
/// Variants are declared in rank order, so the derived `Ord` sorts owners
/// first, then admins, then members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Sort rank used by member listings (owner=0, admin=1, member=2).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Admin => 1,
            Self::Member => 2,
        }
    }

    /// Owners and admins manage other people's bookings.
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(ServiceError::Internal(format!("unknown role: {other}"))),
        }
    }
}

/// Status of a family invitation, derived from its `responded`/`accepted` flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn from_flags(responded: bool, accepted: bool) -> Self {
        match (responded, accepted) {
            (false, _) => Self::Pending,
            (true, true) => Self::Accepted,
            (true, false) => Self::Declined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Auth / Users ────────────────────────────────────────────────────────────

/// Username + email + password registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Username + password login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned on successful signup / login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub expires_in: u64,
    pub user_id: String,
    pub username: String,
}

/// Public view of an account. Credential material never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ─── Families ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FamilyResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A family as seen by one of its members, with the caller's role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MyFamilyResponse {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListFamiliesResponse {
    pub families: Vec<MyFamilyResponse>,
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub joined_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberResponse>,
}

// ─── Invitations ─────────────────────────────────────────────────────────────

/// Invite a registered user into a family by username.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateInviteRequest {
    pub invited_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvitationResponse {
    pub id: String,
    pub family_id: String,
    pub invited_user_id: String,
    pub inviter_user_id: String,
    pub status: InvitationStatus,
    pub created_at: String,
    pub responded_at: Option<String>,
}

/// Pending invitation addressed to the caller, joined for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingInvitation {
    pub id: String,
    pub family_id: String,
    pub family_name: String,
    pub inviter_username: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListInvitationsResponse {
    pub invitations: Vec<PendingInvitation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptInvitationResponse {
    pub family_id: String,
    pub role: Role,
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub family_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub id: String,
    pub family_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItemsResponse {
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemTypesResponse {
    pub types: Vec<String>,
}

// ─── Reservations ────────────────────────────────────────────────────────────

/// Book `item_id` for `[start_time, end_time)`. Offsets are accepted and
/// only the absolute instant is kept.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub item_id: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    pub item_id: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationResponse {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub family_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListReservationsResponse {
    pub reservations: Vec<ReservationResponse>,
}

/// Query parameters for `GET /api/reservations/item/{id}/availability`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub item_id: String,
    pub available: bool,
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service error (framework-agnostic) ─────────────────────────────────────

/// Framework-agnostic error for business rules. Each variant carries a
/// human-readable detail; the variant itself is the machine-readable kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Stable snake_case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }

    /// Build a closure that turns a DB/IO error into `Internal`.
    pub fn from_db<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> Self + '_ {
        move |e| Self::Internal(format!("{context}: {e}"))
    }
}

/// JSON error shape `{ "error": "...", "kind": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub kind: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
            kind: e.kind().to_string(),
        }
    }
}
