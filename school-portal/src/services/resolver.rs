//! Role resolution: which of admin, teacher, parent (or nobody) an email is.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{RoleAssignment, RoleKind};
use crate::services::{RosterError, RosterSource};

/// Static set of admin emails, stored lower-cased.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    /// `folded_email` must already be trimmed and lower-cased.
    pub fn contains(&self, folded_email: &str) -> bool {
        self.emails.contains(folded_email)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Classifies identities against the admin allow-list and the rosters.
///
/// Nothing is cached: each call re-reads the rosters it needs.
#[derive(Clone)]
pub struct RoleResolver {
    admins: AdminAllowList,
    roster: Arc<dyn RosterSource>,
}

impl RoleResolver {
    pub fn new(admins: AdminAllowList, roster: Arc<dyn RosterSource>) -> Self {
        Self { admins, roster }
    }

    /// Resolve an email to exactly one role. First match wins, in this order:
    /// admin allow-list, teacher roster, parent roster.
    ///
    /// A failed lookup is returned as an error and never reported as
    /// [`RoleAssignment::Unknown`].
    #[tracing::instrument(skip(self))]
    pub async fn resolve_role(&self, email: &str) -> Result<RoleAssignment, RosterError> {
        let folded = email.trim().to_lowercase();
        if folded.is_empty() {
            return Ok(RoleAssignment::Unknown);
        }

        if self.admins.contains(&folded) {
            tracing::debug!("Matched admin allow-list");
            return Ok(RoleAssignment::Admin);
        }

        let teachers = self.roster.teachers().await?;
        if let Some(teacher) = teachers.into_iter().find(|t| t.has_email(&folded)) {
            tracing::debug!(teacher_id = %teacher.id, "Matched teacher roster");
            return Ok(RoleAssignment::Teacher { teacher });
        }

        let parents = self.roster.parents().await?;
        if let Some(parent) = parents.into_iter().find(|p| p.has_email(&folded)) {
            let children: Vec<_> = self
                .roster
                .students()
                .await?
                .into_iter()
                .filter(|s| s.parent_id == parent.id)
                .collect();
            tracing::debug!(
                parent_id = %parent.id,
                children = children.len(),
                "Matched parent roster"
            );
            return Ok(RoleAssignment::Parent { parent, children });
        }

        tracing::warn!("Email not found in any roster");
        Ok(RoleAssignment::Unknown)
    }

    /// Role behind a messaging id: a teacher or parent roster ID, or a
    /// case-folded admin email. `None` when nobody uses that id.
    #[tracing::instrument(skip(self))]
    pub async fn role_of_user_id(&self, user_id: &str) -> Result<Option<RoleKind>, RosterError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Ok(None);
        }

        let teachers = self.roster.teachers().await?;
        if teachers.iter().any(|t| t.id == user_id) {
            return Ok(Some(RoleKind::Teacher));
        }

        let parents = self.roster.parents().await?;
        if parents.iter().any(|p| p.id == user_id) {
            return Ok(Some(RoleKind::Parent));
        }

        if self.admins.contains(&user_id.to_lowercase()) {
            return Ok(Some(RoleKind::Admin));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, ParentRecord, StudentRecord,
        TeacherRecord,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeRoster {
        teachers: Vec<TeacherRecord>,
        parents: Vec<ParentRecord>,
        students: Vec<StudentRecord>,
        fail_parents: bool,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl RosterSource for FakeRoster {
        async fn teachers(&self) -> Result<Vec<TeacherRecord>, RosterError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.teachers.clone())
        }

        async fn parents(&self) -> Result<Vec<ParentRecord>, RosterError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_parents {
                return Err(RosterError::lookup("Parents", 3, "503 Service Unavailable"));
            }
            Ok(self.parents.clone())
        }

        async fn students(&self) -> Result<Vec<StudentRecord>, RosterError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.students.clone())
        }

        async fn classes(&self) -> Result<Vec<ClassRecord>, RosterError> {
            Ok(Vec::new())
        }

        async fn attendance(&self) -> Result<Vec<AttendanceRecord>, RosterError> {
            Ok(Vec::new())
        }

        async fn grades(&self) -> Result<Vec<GradeRecord>, RosterError> {
            Ok(Vec::new())
        }

        async fn messages(&self) -> Result<Vec<MessageRecord>, RosterError> {
            Ok(Vec::new())
        }
    }

    fn teacher(id: &str, email: &str) -> TeacherRecord {
        TeacherRecord {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            subject: None,
            phone: None,
        }
    }

    fn parent(id: &str, email: &str) -> ParentRecord {
        ParentRecord {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            phone: None,
        }
    }

    fn student(id: &str, parent_id: &str) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            parent_id: parent_id.into(),
            class_id: None,
            first_name: None,
            last_name: None,
            date_of_birth: None,
            created_date: None,
        }
    }

    fn roster() -> FakeRoster {
        FakeRoster {
            teachers: vec![
                teacher("t1", "Martin@Ecole.fr"),
                teacher("t2", "direction@ecole.fr"),
            ],
            parents: vec![parent("p1", "dupont@mail.fr"), parent("p2", "Martin@ecole.fr")],
            students: vec![
                student("s1", "p1"),
                student("s2", "p2"),
                student("s3", "p1"),
                student("s4", "p-missing"),
            ],
            ..Default::default()
        }
    }

    fn resolver(roster: FakeRoster) -> (RoleResolver, Arc<FakeRoster>) {
        let roster = Arc::new(roster);
        let admins = AdminAllowList::new(["Direction@Ecole.fr", "admin@ecole.fr"]);
        (RoleResolver::new(admins, roster.clone()), roster)
    }

    #[tokio::test]
    async fn test_admin_wins_over_rosters_in_any_casing() {
        let (resolver, roster) = resolver(roster());
        let role = resolver.resolve_role("  DIRECTION@ecole.FR ").await.unwrap();
        assert_eq!(role, RoleAssignment::Admin);
        assert_eq!(roster.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_teacher_wins_over_parent() {
        let (resolver, _) = resolver(roster());
        let role = resolver.resolve_role("martin@ecole.fr").await.unwrap();
        assert_eq!(
            role,
            RoleAssignment::Teacher {
                teacher: teacher("t1", "Martin@Ecole.fr")
            }
        );
    }

    #[tokio::test]
    async fn test_parent_carries_exactly_their_children() {
        let (resolver, _) = resolver(roster());
        let role = resolver.resolve_role("Dupont@mail.fr").await.unwrap();
        match role {
            RoleAssignment::Parent { parent, children } => {
                assert_eq!(parent.id, "p1");
                let ids: Vec<_> = children.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["s1", "s3"]);
            }
            other => panic!("expected parent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unmatched_email_is_unknown() {
        let (resolver, _) = resolver(roster());
        let role = resolver.resolve_role("stranger@mail.fr").await.unwrap();
        assert_eq!(role, RoleAssignment::Unknown);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_unknown() {
        let (resolver, _) = resolver(FakeRoster {
            fail_parents: true,
            ..roster()
        });
        let result = resolver.resolve_role("stranger@mail.fr").await;
        assert!(matches!(result, Err(RosterError::Lookup { .. })));
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_and_uncached() {
        let (resolver, roster) = resolver(roster());
        let first = resolver.resolve_role("dupont@mail.fr").await.unwrap();
        let second = resolver.resolve_role("dupont@mail.fr").await.unwrap();
        assert_eq!(first, second);
        // teachers + parents + students, twice.
        assert_eq!(roster.lookups.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_role_of_user_id_reads_the_rosters() {
        let (resolver, _) = resolver(roster());
        assert_eq!(
            resolver.role_of_user_id("t2").await.unwrap(),
            Some(RoleKind::Teacher)
        );
        assert_eq!(
            resolver.role_of_user_id("p2").await.unwrap(),
            Some(RoleKind::Parent)
        );
        assert_eq!(
            resolver.role_of_user_id("Admin@Ecole.fr").await.unwrap(),
            Some(RoleKind::Admin)
        );
        assert_eq!(resolver.role_of_user_id("s1").await.unwrap(), None);
        assert_eq!(resolver.role_of_user_id(" ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_role_of_user_id_surfaces_lookup_failure() {
        let (resolver, _) = resolver(FakeRoster {
            fail_parents: true,
            ..roster()
        });
        assert!(resolver.role_of_user_id("t1").await.is_ok());
        assert!(matches!(
            resolver.role_of_user_id("p1").await,
            Err(RosterError::Lookup { .. })
        ));
    }

    #[test]
    fn test_allow_list_folds_and_skips_blanks() {
        let admins = AdminAllowList::new([" Admin@Ecole.fr ", "", "  "]);
        assert_eq!(admins.len(), 1);
        assert!(admins.contains("admin@ecole.fr"));
    }
}
