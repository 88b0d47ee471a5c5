use crate::{AuthData, UserProfile, UserRole};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
}

// =========================================================
// Auth Requests
// =========================================================

/// Server-side session verification. Only the status code matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyAuthRequest {
    pub email: String,
    pub user_type: UserRole,
}

impl From<&AuthData> for VerifyAuthRequest {
    fn from(data: &AuthData) -> Self {
        Self {
            email: data.email.clone(),
            user_type: data.user_type,
        }
    }
}

impl ApiRequest for VerifyAuthRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "/api/verify-auth/";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Best-effort server logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub email: String,
    pub user_type: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_pk: Option<String>,
}

impl ApiRequest for LogoutRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "/api/logout/";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Login Requests
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationLoginRequest {
    pub org_code: String,
    pub email: String,
    pub password: String,
}

impl ApiRequest for OrganizationLoginRequest {
    type Response = OrganizationLoginResponse;
    const PATH: &'static str = "/api/login-organization/";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherLoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for TeacherLoginRequest {
    type Response = TeacherLoginResponse;
    const PATH: &'static str = "/api/login-teacher/";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for StudentLoginRequest {
    type Response = StudentLoginResponse;
    const PATH: &'static str = "/api/login-student/";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Login Responses
// =========================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub org_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherPayload {
    pub name: String,
    pub email: String,
    /// Database primary key, may arrive as a number or a string
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentPayload {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationLoginResponse {
    pub org: OrganizationPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherLoginResponse {
    pub teacher: TeacherPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentLoginResponse {
    pub student: StudentPayload,
}

/// Error body returned by the server on a rejected login
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<OrganizationLoginResponse> for UserProfile {
    fn from(res: OrganizationLoginResponse) -> Self {
        UserProfile {
            name: res.org.name,
            email: res.org.email,
            org_code: res.org.org_code,
            ..Default::default()
        }
    }
}

impl From<TeacherLoginResponse> for UserProfile {
    fn from(res: TeacherLoginResponse) -> Self {
        UserProfile {
            name: res.teacher.name,
            email: res.teacher.email,
            teacher_id: res.teacher.teacher_id,
            teacher_pk: res.teacher.id,
            ..Default::default()
        }
    }
}

impl From<StudentLoginResponse> for UserProfile {
    fn from(res: StudentLoginResponse) -> Self {
        UserProfile::new(res.student.name, res.student.email)
    }
}

/// Login credentials, one variant per role
#[derive(Debug, Clone)]
pub enum LoginCredentials {
    Organization(OrganizationLoginRequest),
    Teacher(TeacherLoginRequest),
    Student(StudentLoginRequest),
}

impl LoginCredentials {
    pub fn role(&self) -> UserRole {
        match self {
            Self::Organization(_) => UserRole::Organization,
            Self::Teacher(_) => UserRole::Teacher,
            Self::Student(_) => UserRole::Student,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) if !s.is_empty() => Some(s),
        Some(Raw::Num(n)) => Some(n.to_string()),
        _ => None,
    })
}
