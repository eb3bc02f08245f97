use thiserror::Error;

/// Failures reported by the cloud session service.
#[derive(Debug, Error)]
pub enum CloudSessionError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown user id: {0}")]
    UnknownUserId(i64),

    #[error("user account is blocked")]
    UserBlocked,

    #[error("user e-mail address has not been confirmed")]
    EmailNotConfirmed,

    #[error("too many consecutive attempts")]
    InsufficientBucketTokens,

    #[error("account uses a different authentication source")]
    WrongAuthenticationSource,

    #[error("e-mail address is already registered")]
    NonUniqueEmail,

    #[error("password and confirmation do not match")]
    PasswordVerify,

    #[error("password does not meet complexity requirements")]
    PasswordComplexity,

    #[error("screen name is already in use")]
    ScreennameUsed,

    #[error("cloud session server error: {0}")]
    Server(String),

    #[error("invalid cloud session configuration: {0}")]
    Config(String),
}

/// Who a request was about, used to qualify "unknown user" replies.
#[derive(Debug, Clone)]
pub(crate) enum Subject<'a> {
    Email(&'a str),
    Id(i64),
}

impl CloudSessionError {
    /// Map a `{success: false, code}` reply to a typed error.
    pub(crate) fn from_code(code: i32, message: Option<String>, subject: Subject<'_>) -> Self {
        match code {
            400 => match subject {
                Subject::Email(email) => CloudSessionError::UnknownUser(email.to_string()),
                Subject::Id(id) => CloudSessionError::UnknownUserId(id),
            },
            420 => CloudSessionError::UserBlocked,
            430 => CloudSessionError::EmailNotConfirmed,
            450 => CloudSessionError::NonUniqueEmail,
            460 => CloudSessionError::PasswordVerify,
            470 => CloudSessionError::InsufficientBucketTokens,
            480 => CloudSessionError::WrongAuthenticationSource,
            490 => CloudSessionError::PasswordComplexity,
            495 => CloudSessionError::ScreennameUsed,
            other => CloudSessionError::Server(format!(
                "unexpected reply code {}: {}",
                other,
                message.unwrap_or_default()
            )),
        }
    }
}
