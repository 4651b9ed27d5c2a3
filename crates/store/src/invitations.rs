//! Invitation workflow: `pending -> accepted | declined`, both terminal.

use famshare_api::db::invitations;
use famshare_api::{
    InvitationResponse, InvitationStatus, PendingInvitation, Role, ServiceError,
};
use rusqlite::{Connection, Row};

use crate::families::find_family;
use crate::membership::{insert_member, require_member, role_in};
use crate::users::find_by_username;
use crate::{new_id, now_rfc3339, sql, Store};

fn invitation_from_row(row: &Row<'_>) -> rusqlite::Result<InvitationResponse> {
    let accepted: bool = row.get(4)?;
    let responded: bool = row.get(5)?;
    Ok(InvitationResponse {
        id: row.get(0)?,
        family_id: row.get(1)?,
        invited_user_id: row.get(2)?,
        inviter_user_id: row.get(3)?,
        status: InvitationStatus::from_flags(responded, accepted),
        created_at: row.get(6)?,
        responded_at: row.get(7)?,
    })
}

/// Load an invitation addressed to `user_id` in `family_id` that is still
/// pending. Missing → `NotFound`, already answered → `Conflict`.
fn pending_for(
    conn: &Connection,
    user_id: &str,
    family_id: &str,
    invite_id: &str,
) -> Result<InvitationResponse, ServiceError> {
    let invite = sql::query_opt(
        conn,
        invitations::lookup_for_user(invite_id, family_id, user_id),
        "get invitation",
        invitation_from_row,
    )?
    .ok_or_else(|| ServiceError::NotFound("invitation not found".into()))?;
    if invite.status != InvitationStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "invitation already {}",
            invite.status
        )));
    }
    Ok(invite)
}

/// Flip a pending invitation to its final state. Zero rows touched means
/// someone else answered it first.
fn respond(conn: &Connection, invite_id: &str, accepted: bool) -> Result<(), ServiceError> {
    let changed = sql::execute(
        conn,
        invitations::respond(invite_id, accepted, &now_rfc3339()),
        "respond to invitation",
    )?;
    if changed == 0 {
        return Err(ServiceError::Conflict("invitation already answered".into()));
    }
    Ok(())
}

fn get_invitation(conn: &Connection, invite_id: &str) -> Result<InvitationResponse, ServiceError> {
    sql::query_opt(
        conn,
        invitations::get_by_id(invite_id),
        "get invitation",
        invitation_from_row,
    )?
    .ok_or_else(|| ServiceError::Internal("invitation vanished".into()))
}

impl Store {
    /// Invite a registered user by username. Only the owner may invite.
    pub fn create_invite(
        &self,
        inviter_id: &str,
        family_id: &str,
        invited_username: &str,
    ) -> Result<InvitationResponse, ServiceError> {
        let invited_username = invited_username.trim();
        let invite = self.write("create invitation", |tx| {
            find_family(tx, family_id)?
                .ok_or_else(|| ServiceError::NotFound("family not found".into()))?;
            if require_member(tx, family_id, inviter_id)? != Role::Owner {
                return Err(ServiceError::Forbidden(
                    "only the owner can invite members".into(),
                ));
            }
            let invited = find_by_username(tx, invited_username)?
                .ok_or_else(|| ServiceError::NotFound("user not found".into()))?;
            if role_in(tx, family_id, &invited.id)?.is_some() {
                return Err(ServiceError::Conflict(
                    "user is already a member of this family".into(),
                ));
            }
            let pending = invitations::pending_count(family_id, &invited.id);
            if sql::count(tx, pending, "count invitations")? > 0 {
                return Err(ServiceError::Conflict(
                    "user already has a pending invitation".into(),
                ));
            }

            let id = new_id();
            sql::execute_unique(
                tx,
                invitations::insert(&id, family_id, &invited.id, inviter_id),
                "insert invitation",
                "user already has a pending invitation",
            )?;
            get_invitation(tx, &id)
        })?;
        tracing::info!(
            invite_id = %invite.id,
            family_id,
            invited_user_id = %invite.invited_user_id,
            "invitation created"
        );
        Ok(invite)
    }

    /// Accept: mark the invitation answered and add the user as a member,
    /// both or neither.
    pub fn accept_invite(
        &self,
        user_id: &str,
        family_id: &str,
        invite_id: &str,
    ) -> Result<InvitationResponse, ServiceError> {
        let invite = self.write("accept invitation", |tx| {
            pending_for(tx, user_id, family_id, invite_id)?;
            respond(tx, invite_id, true)?;
            // Rolls back the response if the user joined some other way.
            insert_member(tx, family_id, user_id, Role::Member)?;
            get_invitation(tx, invite_id)
        })?;
        tracing::info!(invite_id, family_id, user_id, "invitation accepted");
        Ok(invite)
    }

    pub fn decline_invite(
        &self,
        user_id: &str,
        family_id: &str,
        invite_id: &str,
    ) -> Result<InvitationResponse, ServiceError> {
        let invite = self.write("decline invitation", |tx| {
            pending_for(tx, user_id, family_id, invite_id)?;
            respond(tx, invite_id, false)?;
            get_invitation(tx, invite_id)
        })?;
        tracing::info!(invite_id, family_id, user_id, "invitation declined");
        Ok(invite)
    }

    /// Unanswered invitations addressed to the user, oldest first.
    pub fn list_pending_invites(
        &self,
        user_id: &str,
    ) -> Result<Vec<PendingInvitation>, ServiceError> {
        self.read(|conn| {
            sql::query_all(
                conn,
                invitations::list_pending_for_user(user_id),
                "list invitations",
                |row| {
                    Ok(PendingInvitation {
                        id: row.get(0)?,
                        family_id: row.get(1)?,
                        family_name: row.get(2)?,
                        inviter_username: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
        })
    }
}
