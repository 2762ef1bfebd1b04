//! Access-control table.
//!
//! Every protected operation is listed once with the roles allowed to call it
//! and, optionally, an ownership predicate evaluated against the resource's
//! owning user. Handlers never re-derive these rules; they name the operation
//! and let [`Policy::evaluate`] decide.

use uuid::Uuid;

use crate::entity::role::Role;

/// Protected operations. Register, login and the public blog/comment reads
/// are not listed and never consult the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAllUsers,
    ListUsers,
    GetUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
    UploadUserImage,
    DeleteUserImage,
    CreateBlog,
    UpdateBlog,
    DeleteBlog,
    CreateComment,
    UpdateComment,
    DeleteComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Any caller holding one of the roles may proceed.
    None,
    /// The caller must be the owning user, unless they are an admin.
    SelfOrAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub roles: &'static [Role],
    pub ownership: Ownership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// The caller's role is not in the operation's role set.
    DenyRole,
    /// The caller holds a permitted role but does not own the resource.
    DenyOwnership,
}

const ADMIN: &[Role] = &[Role::Admin];
const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

const fn rule(roles: &'static [Role], ownership: Ownership) -> Policy {
    Policy { roles, ownership }
}

impl Operation {
    #[rustfmt::skip]
    pub const fn policy(self) -> Policy {
        use Operation::*;
        use Ownership::*;

        match self {
            ListAllUsers    => rule(ADMIN, None),
            ListUsers       => rule(ANY_ROLE, None),
            GetUser         => rule(ANY_ROLE, None),
            CreateUser      => rule(ADMIN, None),
            UpdateUser      => rule(ANY_ROLE, SelfOrAdmin),
            DeleteUser      => rule(ANY_ROLE, SelfOrAdmin),
            UploadUserImage => rule(ANY_ROLE, SelfOrAdmin),
            DeleteUserImage => rule(ANY_ROLE, SelfOrAdmin),
            CreateBlog      => rule(ANY_ROLE, SelfOrAdmin),
            UpdateBlog      => rule(ANY_ROLE, SelfOrAdmin),
            DeleteBlog      => rule(ANY_ROLE, SelfOrAdmin),
            CreateComment   => rule(ANY_ROLE, SelfOrAdmin),
            UpdateComment   => rule(ANY_ROLE, SelfOrAdmin),
            DeleteComment   => rule(ANY_ROLE, SelfOrAdmin),
        }
    }
}

impl Policy {
    /// Evaluate the policy for a caller.
    ///
    /// `owner` is the resource's owning user. When it is `None` only the role
    /// gate runs, which lets handlers reject a bad role before any lookup and
    /// apply the ownership gate once the resource is loaded.
    pub fn evaluate(&self, caller_id: Uuid, caller_role: Role, owner: Option<Uuid>) -> Decision {
        if !self.roles.contains(&caller_role) {
            return Decision::DenyRole;
        }
        match (self.ownership, owner) {
            (Ownership::SelfOrAdmin, Some(owner))
                if caller_role != Role::Admin && owner != caller_id =>
            {
                Decision::DenyOwnership
            }
            _ => Decision::Allow,
        }
    }
}
