//! Access rules derived from a [`RoleAssignment`].
//!
//! Every function here is total and side-effect free.

use serde::Serialize;

use crate::models::{RoleAssignment, RoleKind};

/// Admins and teachers may use the staff area.
pub fn can_access_admin_area(role: &RoleAssignment) -> bool {
    match role {
        RoleAssignment::Admin | RoleAssignment::Teacher { .. } => true,
        RoleAssignment::Parent { .. } | RoleAssignment::Unknown => false,
    }
}

/// Staff see every student; a parent sees only their own children.
pub fn can_view_student(role: &RoleAssignment, student_id: &str) -> bool {
    match role {
        RoleAssignment::Admin | RoleAssignment::Teacher { .. } => true,
        RoleAssignment::Parent { children, .. } => children.iter().any(|c| c.id == student_id),
        RoleAssignment::Unknown => false,
    }
}

/// Directional messaging matrix.
///
/// | sender  | may write to            |
/// |---------|-------------------------|
/// | admin   | admin, teacher, parent  |
/// | teacher | teacher, parent         |
/// | parent  | teacher, admin          |
pub fn can_message(role: &RoleAssignment, recipient: RoleKind) -> bool {
    match role {
        RoleAssignment::Admin => true,
        RoleAssignment::Teacher { .. } => {
            matches!(recipient, RoleKind::Teacher | RoleKind::Parent)
        }
        RoleAssignment::Parent { .. } => matches!(recipient, RoleKind::Teacher | RoleKind::Admin),
        RoleAssignment::Unknown => false,
    }
}

/// Which students a role may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "ids", rename_all = "lowercase")]
pub enum StudentScope {
    All,
    Only(Vec<String>),
    None,
}

/// The permissions a role carries, as one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub admin_area: bool,
    pub students: StudentScope,
    pub message_roles: Vec<RoleKind>,
}

impl Capabilities {
    pub fn for_role(role: &RoleAssignment) -> Self {
        let students = match role {
            RoleAssignment::Admin | RoleAssignment::Teacher { .. } => StudentScope::All,
            RoleAssignment::Parent { children, .. } => {
                StudentScope::Only(children.iter().map(|c| c.id.clone()).collect())
            }
            RoleAssignment::Unknown => StudentScope::None,
        };

        Self {
            admin_area: can_access_admin_area(role),
            students,
            message_roles: RoleKind::ALL
                .into_iter()
                .filter(|kind| can_message(role, *kind))
                .collect(),
        }
    }
}
