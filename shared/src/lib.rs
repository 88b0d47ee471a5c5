use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;
pub mod role;
pub mod validation;

pub use date::Timestamp;
pub use role::UserRole;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 共享 Cookie 键（跨标签页共享）
pub mod cookie_keys {
    pub const TEACHER_NAME: &str = "teacher_name";
    pub const ORG_NAME: &str = "org_name";
    pub const ORG_CODE: &str = "org_code";
    pub const TEACHER_ID: &str = "teacher_id";
    pub const TEACHER_PK: &str = "teacher_pk";
    pub const USER_EMAIL: &str = "user_email";
    pub const TOKEN: &str = "token";

    /// 登出时需要清除的全部 Cookie
    pub const ALL: [&str; 7] = [
        TEACHER_NAME,
        ORG_NAME,
        ORG_CODE,
        TEACHER_ID,
        TEACHER_PK,
        USER_EMAIL,
        TOKEN,
    ];
}

/// 共享 LocalStorage 键（跨标签页共享，无过期时间）
pub mod local_keys {
    pub const STUDENT_NAME: &str = "student_name";
    pub const STUDENT_EMAIL: &str = "student_email";
    pub const TEACHER_NAME: &str = "teacher_name";
    pub const TEACHER_PK: &str = "teacher_pk";

    pub const ALL: [&str; 4] = [STUDENT_NAME, STUDENT_EMAIL, TEACHER_NAME, TEACHER_PK];
}

/// 标签页级 SessionStorage 键（关闭标签页即清除）
pub mod session_keys {
    pub const SESSION_ID: &str = "rocket_assess_session";
    pub const AUTH: &str = "rocket_assess_session_auth";
    pub const USER_TYPE: &str = "rocket_assess_session_user_type";
    pub const TIMESTAMP: &str = "rocket_assess_session_timestamp";

    pub const ALL: [&str; 4] = [SESSION_ID, AUTH, USER_TYPE, TIMESTAMP];
}

/// Cookie 默认有效期（天）
pub const COOKIE_EXPIRY_DAYS: u32 = 7;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 身份记录：用于服务端验证与 API 调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub email: String,
    pub user_type: UserRole,
}

/// 登录成功后写入共享存储的用户资料
///
/// 各角色共用一个结构，角色特有字段为 `Option`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_code: Option<String>,
    /// 教师的业务编号（展示用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// 教师的数据库主键
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_pk: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// 资料是否足以建立登录态（名称与邮箱均非空）
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }
}
