//! Contracts for registration, login and account maintenance

use pm_core::error::ValidationErrors;
use pm_core::Id;
use pm_models::{Designation, Industry, NewUser, Organization, Role};
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::base::{
    from_validator, validate_not_blank, validate_present, Contract, ValidationResult,
};

/// Body of `POST /api/auth/create-organization`.
///
/// The admin's credentials may be sent either with the `admin` prefix or
/// as plain `email`/`password`/... fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationParams {
    pub organization_name: Option<String>,
    pub industry: Option<Industry>,
    #[serde(alias = "email")]
    pub admin_email: Option<String>,
    #[serde(alias = "password")]
    pub admin_password: Option<String>,
    #[serde(alias = "firstName")]
    pub admin_first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub admin_last_name: Option<String>,
    #[serde(alias = "username")]
    pub admin_username: Option<String>,
    pub phone_number: Option<String>,
}

impl CreateOrganizationParams {
    pub fn organization_name(&self) -> &str {
        self.organization_name.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn email(&self) -> String {
        normalize_email(self.admin_email.as_deref())
    }

    pub fn password(&self) -> &str {
        self.admin_password.as_deref().unwrap_or_default()
    }

    /// The founding user: a Manager with the admin role.
    pub fn new_admin(&self) -> NewUser {
        let email = self.email();
        NewUser {
            username: username_or_default(self.admin_username.as_deref(), &email),
            first_name: trimmed(self.admin_first_name.as_deref()),
            last_name: trimmed(self.admin_last_name.as_deref()),
            email,
            designation: Designation::Manager,
            role: Role::Admin,
            department: None,
            phone_number: self.phone_number.clone(),
        }
    }
}

/// Body of `POST /api/auth/register-employee`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEmployeeParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization_name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub phone_number: Option<String>,
}

impl RegisterEmployeeParams {
    pub fn email(&self) -> String {
        normalize_email(self.email.as_deref())
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Builds the employee for `organization`.
    ///
    /// Unknown designations fall back to Developer. Managers and holders of
    /// an `@<organization>.ac.in` address get the admin role.
    pub fn new_employee(&self, organization: &Organization) -> NewUser {
        let email = self.email();
        let designation = Designation::parse_or_default(self.designation.as_deref());
        let role = if is_academic_admin_email(&email, &organization.email_slug()) {
            Role::Admin
        } else {
            Role::for_designation(designation)
        };

        NewUser {
            username: username_or_default(self.username.as_deref(), &email),
            first_name: trimmed(self.first_name.as_deref()),
            last_name: trimmed(self.last_name.as_deref()),
            email,
            designation,
            role,
            department: self.department.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

/// Whether `email` belongs to the organization's academic domain
/// (`@<slug>.ac.in`, case-insensitive).
pub fn is_academic_admin_email(email: &str, slug: &str) -> bool {
    if slug.is_empty() {
        return false;
    }
    Regex::new(&format!(r"(?i)@{}\.ac\.in$", regex::escape(slug)))
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Validates the founding admin and organization name.
pub struct OrganizationRegistrationContract {
    password_min_length: usize,
}

impl OrganizationRegistrationContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }
}

impl Contract<CreateOrganizationParams> for OrganizationRegistrationContract {
    fn validate(&self, params: &CreateOrganizationParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_present("organizationName", params.organization_name.as_deref(), &mut errors);
        validate_present("email", params.admin_email.as_deref(), &mut errors);
        validate_present("firstName", params.admin_first_name.as_deref(), &mut errors);
        validate_present("lastName", params.admin_last_name.as_deref(), &mut errors);
        validate_password("password", params.admin_password.as_deref(), self.password_min_length, &mut errors);

        if errors.is_empty() {
            validate_new_user(&params.new_admin(), &mut errors);
        }

        errors.into_result()
    }
}

/// Validates an employee self-registration.
pub struct EmployeeRegistrationContract {
    password_min_length: usize,
}

impl EmployeeRegistrationContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }
}

impl Contract<RegisterEmployeeParams> for EmployeeRegistrationContract {
    fn validate(&self, params: &RegisterEmployeeParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_present("organizationName", params.organization_name.as_deref(), &mut errors);
        validate_present("email", params.email.as_deref(), &mut errors);
        validate_present("firstName", params.first_name.as_deref(), &mut errors);
        validate_present("lastName", params.last_name.as_deref(), &mut errors);
        validate_password("password", params.password.as_deref(), self.password_min_length, &mut errors);

        if let Some(username) = params.username.as_deref() {
            if username.trim().chars().count() < 3 {
                errors.add("username", "must be at least 3 characters");
            }
        }

        errors.into_result()
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    pub email: Option<String>,
    pub password: Option<String>,
    pub organization_id: Option<Id>,
}

impl LoginParams {
    pub fn email(&self) -> String {
        normalize_email(self.email.as_deref())
    }
}

pub struct LoginContract;

impl Contract<LoginParams> for LoginContract {
    fn validate(&self, params: &LoginParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let email_missing = params.email.as_deref().map_or(true, |e| e.trim().is_empty());
        let password_missing = params.password.as_deref().map_or(true, str::is_empty);

        if email_missing || password_missing || params.organization_id.is_none() {
            errors.add_base("Please provide email, password and organization");
        }
        errors.into_result()
    }
}

/// Body of `POST /api/auth/forgot-password`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordParams {
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
}

/// How a reset code reaches its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetChannel {
    Email(String),
    Phone(String),
}

impl ForgotPasswordParams {
    /// Phone number takes precedence over e-mail.
    pub fn channel(&self) -> Option<ResetChannel> {
        reset_channel(self.email.as_deref(), self.phone_number.as_deref())
    }
}

/// Body of `POST /api/auth/reset-password`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordParams {
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    pub otp: Option<String>,
    pub new_password: Option<String>,
}

impl ResetPasswordParams {
    pub fn channel(&self) -> Option<ResetChannel> {
        reset_channel(self.email.as_deref(), self.phone_number.as_deref())
    }
}

pub struct PasswordResetContract {
    password_min_length: usize,
}

impl PasswordResetContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }
}

impl Contract<ResetPasswordParams> for PasswordResetContract {
    fn validate(&self, params: &ResetPasswordParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if params.channel().is_none() {
            errors.add_base("Email or phone number is required");
        }
        validate_present("otp", params.otp.as_deref(), &mut errors);
        validate_password("newPassword", params.new_password.as_deref(), self.password_min_length, &mut errors);
        errors.into_result()
    }
}

/// Body of `PATCH /api/auth/update-profile`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct ProfileContract;

impl Contract<UpdateProfileParams> for ProfileContract {
    fn validate(&self, params: &UpdateProfileParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("firstName", params.first_name.as_deref(), &mut errors);
        validate_not_blank("lastName", params.last_name.as_deref(), &mut errors);
        errors.into_result()
    }
}

/// Body of `PATCH /api/auth/update-role/:userId`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleParams {
    pub designation: Option<String>,
}

impl UpdateRoleParams {
    /// The requested designation, or a validation error for unknown titles.
    pub fn designation(&self) -> Result<Designation, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.designation.as_deref().map(|d| d.trim().parse::<Designation>()) {
            Some(Ok(designation)) => return Ok(designation),
            Some(Err(_)) => errors.add_base("Invalid designation"),
            None => errors.add("designation", "is required"),
        }
        Err(errors)
    }
}

fn validate_password(field: &str, value: Option<&str>, min: usize, errors: &mut ValidationErrors) {
    match value {
        None | Some("") => errors.add(field, "is required"),
        Some(password) if password.chars().count() < min => {
            errors.add(field, format!("must be at least {} characters", min))
        }
        Some(_) => {}
    }
}

fn validate_new_user(user: &NewUser, errors: &mut ValidationErrors) {
    if let Err(e) = user.validate() {
        errors.merge(from_validator(e));
    }
}

fn normalize_email(value: Option<&str>) -> String {
    value.map(|e| e.trim().to_lowercase()).unwrap_or_default()
}

fn trimmed(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn username_or_default(username: Option<&str>, email: &str) -> String {
    match username.map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => NewUser::default_username(email),
    }
}

fn reset_channel(email: Option<&str>, phone: Option<&str>) -> Option<ResetChannel> {
    let phone = phone.map(str::trim).filter(|p| !p.is_empty());
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    match (phone, email) {
        (Some(p), _) => Some(ResetChannel::Phone(p.to_string())),
        (None, Some(e)) => Some(ResetChannel::Email(e.to_lowercase())),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn organization(name: &str) -> Organization {
        Organization {
            id: Id::new_v4(),
            name: name.into(),
            industry: Industry::It,
            admin_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_organization_accepts_plain_aliases() {
        let params: CreateOrganizationParams = serde_json::from_value(serde_json::json!({
            "organizationName": "Acme",
            "email": "Boss@Acme.com",
            "password": "secret1",
            "firstName": "Wile",
            "lastName": "Coyote"
        }))
        .unwrap();

        assert!(OrganizationRegistrationContract::new(6).validate(&params).is_ok());

        let admin = params.new_admin();
        assert_eq!(admin.email, "boss@acme.com");
        assert_eq!(admin.username, "boss");
        assert_eq!(admin.designation, Designation::Manager);
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn test_create_organization_missing_fields() {
        let params = CreateOrganizationParams {
            organization_name: Some("Acme".into()),
            admin_password: Some("123".into()),
            ..Default::default()
        };
        let errors = OrganizationRegistrationContract::new(6)
            .validate(&params)
            .unwrap_err();

        assert!(errors.has_error("email"));
        assert!(errors.has_error("password"));
        assert!(errors.has_error("firstName"));
        assert!(!errors.has_error("organizationName"));
    }

    #[test]
    fn test_create_organization_rejects_bad_email() {
        let params = CreateOrganizationParams {
            organization_name: Some("Acme".into()),
            admin_email: Some("not-an-email".into()),
            admin_password: Some("secret1".into()),
            admin_first_name: Some("A".into()),
            admin_last_name: Some("B".into()),
            ..Default::default()
        };
        let errors = OrganizationRegistrationContract::new(6)
            .validate(&params)
            .unwrap_err();
        assert!(errors.has_error("email"));
    }

    #[test]
    fn test_new_employee_designation_and_role() {
        let org = organization("Tech Univ");
        let mut params = RegisterEmployeeParams {
            email: Some("jane@corp.com".into()),
            designation: Some("Astronaut".into()),
            ..Default::default()
        };
        let user = params.new_employee(&org);
        assert_eq!(user.designation, Designation::Developer);
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.username, "jane");

        params.designation = Some("Manager".into());
        assert_eq!(params.new_employee(&org).role, Role::Admin);

        params.designation = Some("Tester".into());
        params.email = Some("Prof@TechUniv.AC.IN".into());
        let user = params.new_employee(&org);
        assert_eq!(user.designation, Designation::Tester);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_academic_admin_email() {
        assert!(is_academic_admin_email("dean@acme.ac.in", "acme"));
        assert!(is_academic_admin_email("dean@ACME.AC.IN", "acme"));
        assert!(!is_academic_admin_email("dean@acme.ac.in.evil.com", "acme"));
        assert!(!is_academic_admin_email("dean@acmex.ac.in", "acme"));
        assert!(!is_academic_admin_email("dean@a.ac.in", ""));
    }

    #[test]
    fn test_login_contract() {
        let params = LoginParams {
            email: Some("a@b.io".into()),
            password: Some("x".into()),
            organization_id: None,
        };
        assert!(LoginContract.validate(&params).is_err());

        let params = LoginParams {
            organization_id: Some(Id::new_v4()),
            ..params
        };
        assert!(LoginContract.validate(&params).is_ok());
    }

    #[test]
    fn test_reset_channel_prefers_phone() {
        let params = ForgotPasswordParams {
            email: Some("A@B.io".into()),
            phone_number: Some("+15550100".into()),
        };
        assert_eq!(params.channel(), Some(ResetChannel::Phone("+15550100".into())));

        let params = ForgotPasswordParams {
            email: Some("A@B.io".into()),
            phone_number: Some("  ".into()),
        };
        assert_eq!(params.channel(), Some(ResetChannel::Email("a@b.io".into())));
        assert_eq!(ForgotPasswordParams::default().channel(), None);
    }

    #[test]
    fn test_password_reset_contract() {
        let params = ResetPasswordParams {
            email: Some("a@b.io".into()),
            otp: Some("123456".into()),
            new_password: Some("short".into()),
            ..Default::default()
        };
        let errors = PasswordResetContract::new(6).validate(&params).unwrap_err();
        assert!(errors.has_error("newPassword"));
    }

    #[test]
    fn test_update_role_designation() {
        let params = UpdateRoleParams { designation: Some("DevOps".into()) };
        assert_eq!(params.designation(), Ok(Designation::DevOps));

        let params = UpdateRoleParams { designation: Some("CEO".into()) };
        assert_eq!(
            params.designation().unwrap_err().full_messages(),
            vec!["Invalid designation".to_string()]
        );
    }

    #[test]
    fn test_profile_contract() {
        let params = UpdateProfileParams {
            first_name: Some(" ".into()),
            ..Default::default()
        };
        assert!(ProfileContract.validate(&params).is_err());
        assert!(ProfileContract.validate(&UpdateProfileParams::default()).is_ok());
    }
}
