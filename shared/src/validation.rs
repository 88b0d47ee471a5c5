//! 表单校验模块
//!
//! 校验错误只在表单字段内联展示，永远不会影响会话状态。

use crate::UserRole;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static ORG_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{3,10}$").expect("valid org code regex"));

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

pub fn validate_email(email: &str) -> Option<String> {
    if email.trim().is_empty() {
        return Some("Email is required.".into());
    }
    if !EMAIL_RE.is_match(email) {
        return Some("Invalid email format.".into());
    }
    None
}

/// 校验密码；`confirm` 为空时不做一致性检查
pub fn validate_password(password: &str, confirm: Option<&str>) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required.".into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 6 characters.".into());
    }
    if let Some(confirm) = confirm.filter(|c| !c.is_empty()) {
        if confirm != password {
            return Some("Passwords do not match.".into());
        }
    }
    None
}

pub fn validate_required(value: &str, field_name: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{} is required.", field_name));
    }
    None
}

pub fn validate_org_code(org_code: &str) -> Option<String> {
    let trimmed = org_code.trim();
    if trimmed.is_empty() {
        return Some("Organization code is required.".into());
    }
    if !ORG_CODE_RE.is_match(&trimmed.to_uppercase()) {
        return Some("Organization code must be 3-10 characters, letters and numbers only.".into());
    }
    None
}

pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Name is required.".into());
    }
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Some("Name must be at least 2 characters.".into());
    }
    None
}

// =========================================================
// 表单级校验
// =========================================================

/// 字段名 -> 错误消息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn check(&mut self, field: &'static str, result: Option<String>) {
        if let Some(msg) = result {
            self.0.insert(field, msg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// 用户重新输入时清除单个字段的错误
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub role: UserRole,
    pub email: String,
    pub password: String,
    pub org_code: String,
}

pub fn validate_login_form(form: &LoginForm) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.check("email", validate_email(&form.email));
    match form.role {
        UserRole::Teacher | UserRole::Student => {
            errors.check("password", validate_password(&form.password, None));
        }
        UserRole::Organization => {
            errors.check("org_code", validate_org_code(&form.org_code));
        }
    }
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    Organization,
    Teacher,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub org_code: String,
}

pub fn validate_registration_form(form: &RegistrationForm, kind: RegistrationKind) -> FieldErrors {
    let mut errors = FieldErrors::default();
    match kind {
        RegistrationKind::Organization => {
            errors.check("org_code", validate_org_code(&form.org_code));
            errors.check("name", validate_required(&form.name, "Organization name"));
        }
        RegistrationKind::Teacher => {
            errors.check("name", validate_name(&form.name));
            errors.check("email", validate_email(&form.email));
            errors.check(
                "password",
                validate_password(&form.password, Some(&form.confirm_password)),
            );
            errors.check("org_code", validate_org_code(&form.org_code));
        }
    }
    errors
}
