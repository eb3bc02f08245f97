use serde::{Deserialize, Serialize};

/// Account record as held by the cloud session service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudUser {
    pub id: i64,
    pub email: String,
    pub screenname: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(rename = "authentication-source", default)]
    pub authentication_source: Option<String>,
    #[serde(rename = "bdmonth", default)]
    pub birth_month: Option<u32>,
    #[serde(rename = "bdyear", default)]
    pub birth_year: Option<i32>,
    #[serde(rename = "parent-email", default)]
    pub parent_email: Option<String>,
    #[serde(rename = "parent-email-source", default)]
    pub parent_email_source: Option<i32>,
}

/// Form body for `POST /user/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCloudUser {
    pub email: String,
    pub password: String,
    #[serde(rename = "password-confirm")]
    pub password_confirm: String,
    pub locale: String,
    pub screenname: String,
    #[serde(rename = "bdmonth")]
    pub birth_month: u32,
    #[serde(rename = "bdyear")]
    pub birth_year: i32,
    #[serde(rename = "parent-email", skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
    #[serde(rename = "parent-email-source")]
    pub parent_email_source: i32,
}

/// Reply envelope shared by every cloud session endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Reply<T> {
    pub success: bool,
    pub user: Option<T>,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}
