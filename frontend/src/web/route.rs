//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其访问要求。

use rocket_assess_shared::UserRole;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Home,
    Login,
    Register,
    TeacherRegister,
    StudentRegister,
    /// 机构面板
    Dashboard,
    TeacherDashboard,
    StudentDashboard,
    CreateTest,
    QuestionPool,
    /// 答题页 `/test/:test_id`
    TestRoom(String),
    TestResults(String),
    /// 提交批阅 `/review/:submission_id`
    Review(String),
    Results(String),
    InviteStudents(String),
    InvitedStudents(String),
    OrgProfile,
    Profile,
    /// 邀请链接 `/test-redirect/:invite_code`
    TestRedirect(String),
    NotFound,
}

/// 解析 `/{prefix}/{param}` 形式的路径，参数不能为空或包含 `/`
fn param<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
    (!rest.is_empty() && !rest.contains('/')).then_some(rest)
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举（忽略末尾的 `/`）
    pub fn from_path(path: &str) -> Self {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match path {
            "/" => return Self::Home,
            "/login" => return Self::Login,
            "/register" => return Self::Register,
            "/teacher-register" => return Self::TeacherRegister,
            "/student-register" => return Self::StudentRegister,
            "/dashboard" => return Self::Dashboard,
            "/teacher-dashboard" => return Self::TeacherDashboard,
            "/student-dashboard" => return Self::StudentDashboard,
            "/create-test" => return Self::CreateTest,
            "/question-pool" => return Self::QuestionPool,
            "/org-profile" => return Self::OrgProfile,
            "/profile" => return Self::Profile,
            _ => {}
        }

        let parametrized: [(&str, fn(String) -> Self); 7] = [
            ("/test", Self::TestRoom),
            ("/test-results", Self::TestResults),
            ("/review", Self::Review),
            ("/results", Self::Results),
            ("/invite-students", Self::InviteStudents),
            ("/invited-students", Self::InvitedStudents),
            ("/test-redirect", Self::TestRedirect),
        ];
        parametrized
            .iter()
            .find_map(|(prefix, build)| param(path, prefix).map(|p| build(p.to_string())))
            .unwrap_or(Self::NotFound)
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::TeacherRegister => "/teacher-register".into(),
            Self::StudentRegister => "/student-register".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::TeacherDashboard => "/teacher-dashboard".into(),
            Self::StudentDashboard => "/student-dashboard".into(),
            Self::CreateTest => "/create-test".into(),
            Self::QuestionPool => "/question-pool".into(),
            Self::TestRoom(id) => format!("/test/{}", id),
            Self::TestResults(id) => format!("/test-results/{}", id),
            Self::Review(id) => format!("/review/{}", id),
            Self::Results(id) => format!("/results/{}", id),
            Self::InviteStudents(id) => format!("/invite-students/{}", id),
            Self::InvitedStudents(id) => format!("/invited-students/{}", id),
            Self::OrgProfile => "/org-profile".into(),
            Self::Profile => "/profile".into(),
            Self::TestRedirect(code) => format!("/test-redirect/{}", code),
            Self::NotFound => "/404".into(),
        }
    }

    /// **核心守卫逻辑：该路由是否需要登录**
    pub fn is_protected(&self) -> bool {
        match self {
            Self::Home
            | Self::Login
            | Self::Register
            | Self::TeacherRegister
            | Self::StudentRegister
            | Self::TestRedirect(_)
            | Self::NotFound => false,
            Self::Dashboard
            | Self::TeacherDashboard
            | Self::StudentDashboard
            | Self::CreateTest
            | Self::QuestionPool
            | Self::TestRoom(_)
            | Self::TestResults(_)
            | Self::Review(_)
            | Self::Results(_)
            | Self::InviteStudents(_)
            | Self::InvitedStudents(_)
            | Self::OrgProfile
            | Self::Profile => true,
        }
    }

    /// 需要的角色；`None` 表示任意已登录角色（仍受角色禁区表约束）
    pub fn required_role(&self) -> Option<UserRole> {
        match self {
            Self::TeacherDashboard
            | Self::CreateTest
            | Self::QuestionPool
            | Self::InviteStudents(_)
            | Self::InvitedStudents(_) => Some(UserRole::Teacher),
            Self::StudentDashboard => Some(UserRole::Student),
            Self::OrgProfile => Some(UserRole::Organization),
            _ => None,
        }
    }

    /// 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Register => "Register Organization",
            Self::TeacherRegister => "Teacher Registration",
            Self::StudentRegister => "Student Registration",
            Self::Dashboard => "Organization Dashboard",
            Self::TeacherDashboard => "Teacher Dashboard",
            Self::StudentDashboard => "Student Dashboard",
            Self::CreateTest => "Create Test",
            Self::QuestionPool => "Question Pool",
            Self::TestRoom(_) => "Test",
            Self::TestResults(_) => "Test Results",
            Self::Review(_) => "Review Submission",
            Self::Results(_) => "Results",
            Self::InviteStudents(_) => "Invite Students",
            Self::InvitedStudents(_) => "Invited Students",
            Self::OrgProfile => "Organization Profile",
            Self::Profile => "Profile",
            Self::TestRedirect(_) => "Redirecting",
            Self::NotFound => "Page Not Found",
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
