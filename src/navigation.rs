//! Which dashboard pages each role may open.

use serde::Serialize;

use crate::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    MyCourses,
    Students,
    Attendance,
    Grades,
    Reports,
    Teachers,
    Chat,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Dashboard,
        Page::MyCourses,
        Page::Students,
        Page::Attendance,
        Page::Grades,
        Page::Reports,
        Page::Teachers,
        Page::Chat,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Page::Dashboard => "/dashboard",
            Page::MyCourses => "/my-courses",
            Page::Students => "/students",
            Page::Attendance => "/attendance",
            Page::Grades => "/grades",
            Page::Reports => "/reports",
            Page::Teachers => "/teachers",
            Page::Chat => "/chat",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Page> {
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub page: Page,
    pub path: &'static str,
    pub highlighted: bool,
}

const fn item(label: &'static str, page: Page, path: &'static str) -> MenuItem {
    MenuItem {
        label,
        page,
        path,
        highlighted: false,
    }
}

/// Sidebar entries for `role`, in display order.
#[must_use]
pub fn menu(role: Role) -> Vec<MenuItem> {
    let mut items = match role {
        Role::Student => vec![
            item("Dashboard", Page::Dashboard, "/dashboard"),
            item("My Courses", Page::MyCourses, "/my-courses"),
            item("My Grades", Page::Grades, "/grades"),
            item("Teachers", Page::Teachers, "/teachers"),
        ],
        Role::Teacher => vec![
            item("Dashboard", Page::Dashboard, "/dashboard"),
            item("Students", Page::Students, "/students"),
            item("Attendance", Page::Attendance, "/attendance"),
            item("Grades", Page::Grades, "/grades"),
            item("Reports", Page::Reports, "/reports"),
        ],
    };
    items.push(MenuItem {
        highlighted: true,
        ..item("Chat Assistant", Page::Chat, "/chat")
    });
    items
}

/// Route guard. Reports and teachers stay reachable for both roles even when
/// they are not in the menu.
#[must_use]
pub fn can_access(role: Role, page: Page) -> bool {
    match page {
        Page::Dashboard | Page::Grades | Page::Reports | Page::Teachers | Page::Chat => true,
        Page::Students | Page::Attendance => role == Role::Teacher,
        Page::MyCourses => role == Role::Student,
    }
}

/// Resolve a requested path, redirecting anything unknown or forbidden to
/// the dashboard.
#[must_use]
pub fn resolve(role: Role, path: &str) -> Page {
    Page::from_path(path)
        .filter(|page| can_access(role, *page))
        .unwrap_or(Page::Dashboard)
}
