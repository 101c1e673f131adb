/*!
Resolved roles.
*/
use serde::{Deserialize, Serialize};

use super::{Identity, ParentRecord, StudentRecord, TeacherRecord};

/// The roles a recognised user can hold, also used to address message
/// recipients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Admin,
    Teacher,
    Parent,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] = [RoleKind::Admin, RoleKind::Teacher, RoleKind::Parent];
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let token = match self {
            RoleKind::Admin => "admin",
            RoleKind::Teacher => "teacher",
            RoleKind::Parent => "parent",
        };

        write!(f, "{}", token)
    }
}

impl std::str::FromStr for RoleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(RoleKind::Admin),
            "teacher" => Ok(RoleKind::Teacher),
            "parent" => Ok(RoleKind::Parent),
            _ => Err(format!("{:?} is not a valid role.", s)),
        }
    }
}

/// The classification of one identity, with the roster data that goes with
/// it. Recomputed on login and refresh; only ever held in the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleAssignment {
    Admin,
    Teacher {
        teacher: TeacherRecord,
    },
    Parent {
        parent: ParentRecord,
        /// Students whose `ParentID` is this parent, in roster order.
        children: Vec<StudentRecord>,
    },
    /// Matches no allow-list or roster entry.
    Unknown,
}

impl RoleAssignment {
    pub fn kind(&self) -> Option<RoleKind> {
        match self {
            RoleAssignment::Admin => Some(RoleKind::Admin),
            RoleAssignment::Teacher { .. } => Some(RoleKind::Teacher),
            RoleAssignment::Parent { .. } => Some(RoleKind::Parent),
            RoleAssignment::Unknown => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.kind().is_some()
    }

    /// Id this user sends and receives messages under: the roster ID for
    /// teachers and parents, the case-folded email for admins, who have no
    /// roster row.
    pub fn user_id(&self, identity: &Identity) -> Option<String> {
        match self {
            RoleAssignment::Admin => Some(identity.folded_email()),
            RoleAssignment::Teacher { teacher } => Some(teacher.id.clone()),
            RoleAssignment::Parent { parent, .. } => Some(parent.id.clone()),
            RoleAssignment::Unknown => None,
        }
    }

    pub fn children(&self) -> &[StudentRecord] {
        match self {
            RoleAssignment::Parent { children, .. } => children,
            RoleAssignment::Admin | RoleAssignment::Teacher { .. } | RoleAssignment::Unknown => &[],
        }
    }
}
