use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

/// Stable, dotted error codes. The string form is part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    AccountAlreadyExists,
    AccountAppRequired,
    AccountInexistent,
    AppInexistent,
    AppNameRequired,
    AppUrlRequired,
    AppUrlInvalid,
    AppUrlAlreadyExists,
    AppScopesRequired,
    AppScopesInvalid,
    AppWebhookUrlInvalid,
    TokenAppRequired,
    UserInexistent,
    UserNameFirstRequired,
    UserNameLastRequired,
    UserEmailRequired,
    UserEmailInvalid,
    UserEmailAlreadyExists,
    UserEmailInexistent,
    UserPasswordRequired,
    UserPasswordTooShort,
    UserPasswordWrong,
    UserBirthdayInvalid,
    UserPhoneInvalid,
}

const UNKNOWN_ERROR: &str = "Unknown error";

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::AccountAlreadyExists,
        ErrorCode::AccountAppRequired,
        ErrorCode::AccountInexistent,
        ErrorCode::AppInexistent,
        ErrorCode::AppNameRequired,
        ErrorCode::AppUrlRequired,
        ErrorCode::AppUrlInvalid,
        ErrorCode::AppUrlAlreadyExists,
        ErrorCode::AppScopesRequired,
        ErrorCode::AppScopesInvalid,
        ErrorCode::AppWebhookUrlInvalid,
        ErrorCode::TokenAppRequired,
        ErrorCode::UserInexistent,
        ErrorCode::UserNameFirstRequired,
        ErrorCode::UserNameLastRequired,
        ErrorCode::UserEmailRequired,
        ErrorCode::UserEmailInvalid,
        ErrorCode::UserEmailAlreadyExists,
        ErrorCode::UserEmailInexistent,
        ErrorCode::UserPasswordRequired,
        ErrorCode::UserPasswordTooShort,
        ErrorCode::UserPasswordWrong,
        ErrorCode::UserBirthdayInvalid,
        ErrorCode::UserPhoneInvalid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AccountAlreadyExists => "account/already-exists",
            ErrorCode::AccountAppRequired => "account/app/required",
            ErrorCode::AccountInexistent => "account/inexistent",
            ErrorCode::AppInexistent => "app/inexistent",
            ErrorCode::AppNameRequired => "app/name/required",
            ErrorCode::AppUrlRequired => "app/url/required",
            ErrorCode::AppUrlInvalid => "app/url/invalid",
            ErrorCode::AppUrlAlreadyExists => "app/url/already-exists",
            ErrorCode::AppScopesRequired => "app/scopes/required",
            ErrorCode::AppScopesInvalid => "app/scopes/invalid",
            ErrorCode::AppWebhookUrlInvalid => "app/webhook/url/invalid",
            ErrorCode::TokenAppRequired => "token/app/required",
            ErrorCode::UserInexistent => "user/inexistent",
            ErrorCode::UserNameFirstRequired => "user/name/first/required",
            ErrorCode::UserNameLastRequired => "user/name/last/required",
            ErrorCode::UserEmailRequired => "user/email/required",
            ErrorCode::UserEmailInvalid => "user/email/invalid",
            ErrorCode::UserEmailAlreadyExists => "user/email/already-exists",
            ErrorCode::UserEmailInexistent => "user/email/inexistent",
            ErrorCode::UserPasswordRequired => "user/password/required",
            ErrorCode::UserPasswordTooShort => "user/password/too-short",
            ErrorCode::UserPasswordWrong => "user/password/wrong",
            ErrorCode::UserBirthdayInvalid => "user/birthday/invalid",
            ErrorCode::UserPhoneInvalid => "user/phone/invalid",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::AccountAlreadyExists => "You have already linked this app.",
            ErrorCode::AccountAppRequired => "An app is required.",
            ErrorCode::AccountInexistent => "This linked app does not exist.",
            ErrorCode::AppInexistent => "This app does not exist.",
            ErrorCode::AppNameRequired => "A name is required.",
            ErrorCode::AppUrlRequired => "A URL is required.",
            ErrorCode::AppUrlInvalid => "This URL is invalid.",
            ErrorCode::AppUrlAlreadyExists => "An app with this URL already exists.",
            ErrorCode::AppScopesRequired => "At least one scope is required.",
            ErrorCode::AppScopesInvalid => "One of the requested scopes does not exist.",
            ErrorCode::AppWebhookUrlInvalid => "This webhook URL is invalid.",
            ErrorCode::TokenAppRequired => "An app is required.",
            ErrorCode::UserInexistent => "This user does not exist.",
            ErrorCode::UserNameFirstRequired => "Your first name is required.",
            ErrorCode::UserNameLastRequired => "Your last name is required.",
            ErrorCode::UserEmailRequired => "Your email address is required.",
            ErrorCode::UserEmailInvalid => "This email address is invalid.",
            ErrorCode::UserEmailAlreadyExists => "This email address is already in use.",
            ErrorCode::UserEmailInexistent => "No account uses this email address.",
            ErrorCode::UserPasswordRequired => "A password is required.",
            ErrorCode::UserPasswordTooShort => "Your password must be at least 8 characters long.",
            ErrorCode::UserPasswordWrong => "This password is wrong.",
            ErrorCode::UserBirthdayInvalid => "This birthday is invalid.",
            ErrorCode::UserPhoneInvalid => "This phone number is invalid.",
        }
    }

    pub fn parse(code: &str) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }

    pub fn is_conflict(self) -> bool {
        self.as_str().ends_with("/already-exists")
    }

    pub fn is_inexistent(self) -> bool {
        self.as_str().ends_with("/inexistent") && self != ErrorCode::UserEmailInexistent
    }
}

/// Human-readable message for a wire code. Unknown codes map to a generic message.
pub fn message_for(code: &str) -> &'static str {
    ErrorCode::parse(code).map(ErrorCode::message).unwrap_or(UNKNOWN_ERROR)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Every field-level problem found in one input, never just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("invalid input: {}", render_codes(.codes))]
pub struct ValidationFailure {
    codes: BTreeSet<ErrorCode>,
}

fn render_codes(codes: &BTreeSet<ErrorCode>) -> String {
    codes.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(code: ErrorCode) -> Self {
        let mut failure = Self::new();
        failure.push(code);
        failure
    }

    pub fn push(&mut self, code: ErrorCode) {
        self.codes.insert(code);
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.codes.contains(&code)
    }

    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// True when every code is an integrity conflict (`*/already-exists`).
    pub fn is_conflict(&self) -> bool {
        !self.is_empty() && self.codes.iter().all(|c| c.is_conflict())
    }

    /// True when every code names a missing referenced entity.
    pub fn is_inexistent(&self) -> bool {
        !self.is_empty() && self.codes.iter().all(|c| c.is_inexistent())
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            ServiceError::Validation(failure) => Some(failure),
            ServiceError::Store(_) => None,
        }
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        ServiceError::Validation(ValidationFailure::single(code))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
