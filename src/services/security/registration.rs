//! Local checks applied to a registration before it is forwarded to the cloud
//! session service.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use super::SecurityError;
use crate::cloudsession::NewCloudUser;

/// Registrants younger than this need a sponsor e-mail address.
pub const COPPA_AGE: i32 = 13;

/// Earliest birth year accepted at registration.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Locale every new account starts with.
pub const DEFAULT_LOCALE: &str = "en";

/// Registration request as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub screenname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "password-confirm")]
    pub password_confirm: Option<String>,
    #[serde(rename = "bdmonth", default)]
    pub birth_month: u32,
    #[serde(rename = "bdyear", default)]
    pub birth_year: i32,
    #[serde(rename = "parent-email")]
    pub parent_email: Option<String>,
    #[serde(rename = "parent-email-source", default)]
    pub parent_email_source: i32,
}

fn required<'a>(value: &'a Option<String>, code: &'static str) -> Result<&'a str, SecurityError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SecurityError::Validation(code))
}

/// True when a person born in `birth_month`/`birth_year` is younger than
/// [`COPPA_AGE`] on `today`. Only month precision is available, so the birthday
/// month itself counts as having had the birthday.
pub fn is_coppa_eligible(birth_month: u32, birth_year: i32, today: NaiveDate) -> bool {
    let age_in_months =
        (i64::from(today.year()) - i64::from(birth_year)) * 12 + (i64::from(today.month()) - i64::from(birth_month));
    age_in_months < i64::from(COPPA_AGE) * 12
}

/// Pragmatic address check: one `@`, a non-empty local part and a dotted domain
/// made of letters, digits and hyphens.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let valid_label = |label: &&str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    let top_level = labels[labels.len() - 1];
    labels.iter().all(valid_label) && top_level.len() >= 2 && top_level.chars().all(|c| c.is_ascii_alphabetic())
}

impl Registration {
    /// Validate the request and build the cloud session registration.
    pub fn validate(&self, today: NaiveDate) -> Result<NewCloudUser, SecurityError> {
        let screenname = required(&self.screenname, "screenname-required")?;

        let email = required(&self.email, "email-required")?;
        if !is_valid_email(email) {
            return Err(SecurityError::Validation("email-invalid"));
        }

        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(SecurityError::Validation("password-required"))?;
        let password_confirm = self
            .password_confirm
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(SecurityError::Validation("password-confirm-required"))?;
        if password != password_confirm {
            return Err(SecurityError::Validation("password-mismatch"));
        }

        if self.birth_month == 0 {
            return Err(SecurityError::Precondition("birth-month-not-set"));
        }
        if self.birth_month > 12 {
            return Err(SecurityError::Precondition("birth-month-invalid"));
        }
        if self.birth_year == today.year() {
            return Err(SecurityError::Precondition("birth-year-not-set"));
        }
        if self.birth_year > today.year() || self.birth_year < MIN_BIRTH_YEAR {
            return Err(SecurityError::Precondition("birth-year-invalid"));
        }

        let parent_email = self
            .parent_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        if is_coppa_eligible(self.birth_month, self.birth_year, today) {
            let sponsor = parent_email.ok_or(SecurityError::Precondition("sponsor-email-required"))?;
            if !is_valid_email(sponsor) {
                return Err(SecurityError::Precondition("sponsor-email-invalid"));
            }
        }

        Ok(NewCloudUser {
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: password_confirm.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            screenname: screenname.to_string(),
            birth_month: self.birth_month,
            birth_year: self.birth_year,
            parent_email: parent_email.map(str::to_string),
            parent_email_source: self.parent_email_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn adult() -> Registration {
        Registration {
            screenname: Some("ada".into()),
            email: Some("ada@example.org".into()),
            password: Some("s3cret!pass".into()),
            password_confirm: Some("s3cret!pass".into()),
            birth_month: 3,
            birth_year: 1990,
            parent_email: None,
            parent_email_source: 0,
        }
    }

    #[test]
    fn accepts_a_complete_adult_registration() {
        let user = adult().validate(today()).unwrap();
        assert_eq!(user.locale, "en");
        assert_eq!(user.screenname, "ada");
        assert!(user.parent_email.is_none());
    }

    #[test]
    fn coppa_boundary_is_month_precise() {
        // Turns 13 in June 2026.
        assert!(!is_coppa_eligible(6, 2013, today()));
        assert!(is_coppa_eligible(7, 2013, today()));
        assert!(is_coppa_eligible(1, 2020, today()));
        assert!(!is_coppa_eligible(12, 1980, today()));
        assert!(!is_coppa_eligible(u32::MAX, i32::MIN, today()));
        assert!(is_coppa_eligible(0, i32::MAX, today()));
    }

    #[test]
    fn implausible_birth_years_are_invalid() {
        for year in [i32::MIN, -1, 0, MIN_BIRTH_YEAR - 1, 2027, i32::MAX] {
            let mut reg = adult();
            reg.birth_year = year;
            assert!(
                matches!(reg.validate(today()), Err(SecurityError::Precondition("birth-year-invalid"))),
                "year {}",
                year
            );
        }

        let mut reg = adult();
        reg.birth_year = MIN_BIRTH_YEAR;
        assert!(reg.validate(today()).is_ok());
    }

    #[test]
    fn rejects_missing_and_malformed_email() {
        let mut reg = adult();
        reg.email = None;
        assert!(matches!(reg.validate(today()), Err(SecurityError::Validation("email-required"))));

        reg.email = Some("ada.example.org".into());
        assert!(matches!(reg.validate(today()), Err(SecurityError::Validation("email-invalid"))));
    }

    #[test]
    fn rejects_password_mismatch() {
        let mut reg = adult();
        reg.password_confirm = Some("different".into());
        assert!(matches!(reg.validate(today()), Err(SecurityError::Validation("password-mismatch"))));
    }

    #[test]
    fn birth_date_must_be_set() {
        let mut reg = adult();
        reg.birth_month = 0;
        assert!(matches!(reg.validate(today()), Err(SecurityError::Precondition("birth-month-not-set"))));

        let mut reg = adult();
        reg.birth_year = 2026;
        assert!(matches!(reg.validate(today()), Err(SecurityError::Precondition("birth-year-not-set"))));
    }

    #[test]
    fn coppa_registrant_needs_valid_sponsor_email() {
        let mut reg = adult();
        reg.birth_year = 2016;
        assert!(matches!(
            reg.validate(today()),
            Err(SecurityError::Precondition("sponsor-email-required"))
        ));

        reg.parent_email = Some("   ".into());
        assert!(matches!(
            reg.validate(today()),
            Err(SecurityError::Precondition("sponsor-email-required"))
        ));

        reg.parent_email = Some("parent@".into());
        assert!(matches!(
            reg.validate(today()),
            Err(SecurityError::Precondition("sponsor-email-invalid"))
        ));

        reg.parent_email = Some("parent@example.org".into());
        let user = reg.validate(today()).unwrap();
        assert_eq!(user.parent_email.as_deref(), Some("parent@example.org"));
    }

    #[test]
    fn email_validator_edge_cases() {
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("two@@example.org"));
        assert!(!is_valid_email("spaces in@example.org"));
        assert!(!is_valid_email("dot..dot@example.org"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@-bad.org"));
    }
}
