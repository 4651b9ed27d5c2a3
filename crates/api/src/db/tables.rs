//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    PasswordSalt,
    CreatedAt,
}

#[derive(Iden)]
pub enum Families {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
pub enum FamilyMembers {
    Table,
    UserId,
    FamilyId,
    Role,
    JoinedAt,
}

#[derive(Iden)]
pub enum FamilyInvitations {
    Table,
    Id,
    FamilyId,
    InvitedUserId,
    InviterUserId,
    Accepted,
    Responded,
    CreatedAt,
    RespondedAt,
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
    FamilyId,
    Name,
    ItemType,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    ItemId,
    FamilyId,
    UserId,
    StartAt,
    EndAt,
    CreatedAt,
}
