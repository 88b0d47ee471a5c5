//! 用户角色模块
//!
//! 三种角色是封闭集合，所有按角色分派的逻辑都通过穷尽匹配完成。

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Organization,
    Teacher,
    Student,
}

/// 学生不可访问的路径前缀
const STUDENT_FORBIDDEN: &[&str] = &[
    "/teacher-dashboard",
    "/create-test",
    "/question-pool",
    "/invite-students",
    "/invited-students",
];

/// 教师不可访问的路径前缀
const TEACHER_FORBIDDEN: &[&str] = &["/student-dashboard"];

/// 机构不可访问的路径前缀
const ORGANIZATION_FORBIDDEN: &[&str] = &[
    "/teacher-dashboard",
    "/student-dashboard",
    "/create-test",
    "/question-pool",
    "/invite-students",
    "/invited-students",
];

impl UserRole {
    pub const ALL: [UserRole; 3] = [
        UserRole::Organization,
        UserRole::Teacher,
        UserRole::Student,
    ];

    /// 从存储中的字符串解析角色，未知字符串返回 `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organization" => Some(Self::Organization),
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    /// 存储与传输使用的字符串形式
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// 页头展示用名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Teacher => "Teacher",
            Self::Student => "Student",
        }
    }

    /// 角色不匹配时的重定向目标
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Organization => "/org-profile",
            Self::Teacher => "/teacher-dashboard",
            Self::Student => "/student-dashboard",
        }
    }

    /// 登录成功后的落地页
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Organization => "/dashboard",
            Self::Teacher => "/teacher-dashboard",
            Self::Student => "/student-dashboard",
        }
    }

    pub fn profile_path(&self) -> &'static str {
        match self {
            Self::Organization => "/org-profile",
            Self::Teacher | Self::Student => "/profile",
        }
    }

    /// 该角色不可进入的区域（路径前缀）
    pub fn forbidden_prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Organization => ORGANIZATION_FORBIDDEN,
            Self::Teacher => TEACHER_FORBIDDEN,
            Self::Student => STUDENT_FORBIDDEN,
        }
    }

    /// 路径是否属于其他角色的区域
    pub fn is_forbidden_path(&self, path: &str) -> bool {
        self.forbidden_prefixes()
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }

    /// 角色主页的名称（用于拒绝访问提示）
    pub fn home_title(&self) -> &'static str {
        match self {
            Self::Organization => "Organization Profile",
            Self::Teacher => "Teacher Dashboard",
            Self::Student => "Student Dashboard",
        }
    }

    /// 冠词形式，如 "a student" / "an organization"
    fn with_article(&self) -> &'static str {
        match self {
            Self::Organization => "an organization",
            Self::Teacher => "a teacher",
            Self::Student => "a student",
        }
    }

    /// 越权访问时的提示文本
    pub fn access_denied_notice(&self) -> String {
        format!(
            "Access denied. You are logged in as {}. Redirecting to {}.",
            self.with_article(),
            self.home_title()
        )
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_known_roles() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::parse("Teacher"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&UserRole::Organization).unwrap();
        assert_eq!(json, "\"organization\"");
        let role: UserRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, UserRole::Student);
    }

    #[test]
    fn forbidden_prefixes_follow_role_areas() {
        assert!(UserRole::Student.is_forbidden_path("/teacher-dashboard"));
        assert!(UserRole::Student.is_forbidden_path("/invite-students/42"));
        assert!(UserRole::Student.is_forbidden_path("/invited-students/42"));
        assert!(!UserRole::Student.is_forbidden_path("/student-dashboard"));
        assert!(!UserRole::Student.is_forbidden_path("/test/7"));

        assert!(UserRole::Teacher.is_forbidden_path("/student-dashboard"));
        assert!(!UserRole::Teacher.is_forbidden_path("/create-test"));

        assert!(UserRole::Organization.is_forbidden_path("/question-pool"));
        assert!(UserRole::Organization.is_forbidden_path("/student-dashboard"));
        assert!(!UserRole::Organization.is_forbidden_path("/org-profile"));
        assert!(!UserRole::Organization.is_forbidden_path("/dashboard"));
    }

    #[test]
    fn notice_names_role_and_home() {
        assert_eq!(
            UserRole::Organization.access_denied_notice(),
            "Access denied. You are logged in as an organization. Redirecting to Organization Profile."
        );
        assert_eq!(
            UserRole::Teacher.access_denied_notice(),
            "Access denied. You are logged in as a teacher. Redirecting to Teacher Dashboard."
        );
    }
}
