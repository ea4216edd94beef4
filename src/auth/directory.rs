//! Static credential directory, partitioned by role.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The two kinds of dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// Parse the wire name of a role; anything else is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier → secret maps, one per role.
///
/// The same identifier may appear under both roles; the two entries are
/// unrelated and may carry different secrets.
#[derive(Debug, Clone, Default)]
pub struct CredentialDirectory {
    students: HashMap<String, String>,
    teachers: HashMap<String, String>,
}

const DEMO_SECRET: &str = "password123";

const DEMO_STUDENTS: [&str; 3] = [
    "john.student@school.com",
    "emma.student@school.com",
    "michael.student@school.com",
];

const DEMO_TEACHERS: [&str; 3] = [
    "teacher@school.com",
    "mr.smith@school.com",
    "mrs.johnson@school.com",
];

impl CredentialDirectory {
    /// An empty directory; every login against it fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo accounts shipped with the dashboard.
    #[must_use]
    pub fn demo() -> Self {
        let directory = DEMO_STUDENTS
            .iter()
            .fold(Self::new(), |dir, id| dir.with_entry(Role::Student, *id, DEMO_SECRET));
        DEMO_TEACHERS
            .iter()
            .fold(directory, |dir, id| dir.with_entry(Role::Teacher, *id, DEMO_SECRET))
    }

    /// Add or replace one entry in the `role` partition.
    #[must_use]
    pub fn with_entry(
        mut self,
        role: Role,
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.partition_mut(role)
            .insert(identifier.into(), secret.into());
        self
    }

    /// Whether `(role, identifier)` exists and its secret equals `secret`.
    #[must_use]
    pub fn verify(&self, role: Role, identifier: &str, secret: &str) -> bool {
        self.partition(role)
            .get(identifier)
            .is_some_and(|stored| stored == secret)
    }

    /// All `(role, identifier, secret)` triples, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (Role, &str, &str)> {
        let students = self
            .students
            .iter()
            .map(|(id, secret)| (Role::Student, id.as_str(), secret.as_str()));
        let teachers = self
            .teachers
            .iter()
            .map(|(id, secret)| (Role::Teacher, id.as_str(), secret.as_str()));
        students.chain(teachers)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.students.len() + self.teachers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition(&self, role: Role) -> &HashMap<String, String> {
        match role {
            Role::Student => &self.students,
            Role::Teacher => &self.teachers,
        }
    }

    fn partition_mut(&mut self, role: Role) -> &mut HashMap<String, String> {
        match role {
            Role::Student => &mut self.students,
            Role::Teacher => &mut self.teachers,
        }
    }
}
