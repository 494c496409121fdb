//! Admin presentation configuration for users
//!
//! The admin views (list and detail) are described as data: which columns
//! the list shows, how rows are ordered, and how the detail and add forms
//! group their fields. Front ends (the CLI tables here) render from this
//! configuration instead of hard-coding a layout.

use serde::Serialize;

use super::credential::HashSummary;
use super::result::{Error, Result};
use super::User;

/// A field of the user model that the admin can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Id,
    Email,
    Password,
    Name,
    IsActive,
    IsStaff,
    IsSuperuser,
    LastLogin,
}

impl UserField {
    pub fn label(&self) -> &'static str {
        match self {
            UserField::Id => "ID",
            UserField::Email => "Email",
            UserField::Password => "Password",
            UserField::Name => "Name",
            UserField::IsActive => "Active",
            UserField::IsStaff => "Staff status",
            UserField::IsSuperuser => "Superuser status",
            UserField::LastLogin => "Last login",
        }
    }

    /// Render this field of `user` for display.
    ///
    /// The password is never shown; only the hash algorithm and its
    /// parameters are.
    pub fn display(&self, user: &User) -> String {
        match self {
            UserField::Id => user.id.to_string(),
            UserField::Email => user.email.clone(),
            UserField::Password => match HashSummary::from_phc(&user.password) {
                Some(summary) => format!("algorithm: {} {}", summary.algorithm, summary.params)
                    .trim_end()
                    .to_string(),
                None => "No password set.".to_string(),
            },
            UserField::Name => user.name.clone(),
            UserField::IsActive => yes_no(user.is_active),
            UserField::IsStaff => yes_no(user.is_staff),
            UserField::IsSuperuser => yes_no(user.is_superuser),
            UserField::LastLogin => user
                .last_login
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

/// Fields of the "add user" form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddField {
    Email,
    Password1,
    Password2,
}

impl AddField {
    pub fn label(&self) -> &'static str {
        match self {
            AddField::Email => "Email",
            AddField::Password1 => "Password",
            AddField::Password2 => "Password confirmation",
        }
    }
}

/// A titled group of fields
#[derive(Debug, Clone, Serialize)]
pub struct Fieldset<F: 'static> {
    pub title: Option<&'static str>,
    pub classes: &'static [&'static str],
    pub fields: &'static [F],
}

/// Admin configuration for the user model
#[derive(Debug, Clone, Serialize)]
pub struct UserAdmin {
    pub ordering: &'static [UserField],
    pub list_display: &'static [UserField],
    pub fieldsets: &'static [Fieldset<UserField>],
    pub add_fieldsets: &'static [Fieldset<AddField>],
}

const FIELDSETS: &[Fieldset<UserField>] = &[
    Fieldset {
        title: None,
        classes: &[],
        fields: &[UserField::Email, UserField::Password],
    },
    Fieldset {
        title: Some("Personal Info"),
        classes: &[],
        fields: &[UserField::Name],
    },
    Fieldset {
        title: Some("Permissions"),
        classes: &[],
        fields: &[UserField::IsActive, UserField::IsStaff, UserField::IsSuperuser],
    },
    Fieldset {
        title: Some("Important dates"),
        classes: &[],
        fields: &[UserField::LastLogin],
    },
];

const ADD_FIELDSETS: &[Fieldset<AddField>] = &[Fieldset {
    title: None,
    classes: &["wide"],
    fields: &[AddField::Email, AddField::Password1, AddField::Password2],
}];

impl Default for UserAdmin {
    fn default() -> Self {
        Self {
            ordering: &[UserField::Id],
            list_display: &[UserField::Name, UserField::Email],
            fieldsets: FIELDSETS,
            add_fieldsets: ADD_FIELDSETS,
        }
    }
}

impl UserAdmin {
    /// Column headers of the list view
    pub fn list_headers(&self) -> Vec<&'static str> {
        self.list_display.iter().map(UserField::label).collect()
    }

    /// One row of the list view
    pub fn list_row(&self, user: &User) -> Vec<String> {
        self.list_display.iter().map(|f| f.display(user)).collect()
    }

    /// Sort users for the list view according to `ordering`
    pub fn sort(&self, users: &mut [User]) {
        users.sort_by(|a, b| {
            self.ordering
                .iter()
                .map(|field| compare_field(*field, a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// The detail view: each fieldset with its rendered (label, value) pairs
    pub fn detail(&self, user: &User) -> Vec<(Option<&'static str>, Vec<(&'static str, String)>)> {
        self.fieldsets
            .iter()
            .map(|fs| {
                let rows = fs.fields.iter().map(|f| (f.label(), f.display(user))).collect();
                (fs.title, rows)
            })
            .collect()
    }
}

fn compare_field(field: UserField, a: &User, b: &User) -> std::cmp::Ordering {
    match field {
        UserField::Id => a.id.cmp(&b.id),
        UserField::Email => a.email.cmp(&b.email),
        UserField::Name => a.name.cmp(&b.name),
        UserField::IsActive => a.is_active.cmp(&b.is_active),
        UserField::IsStaff => a.is_staff.cmp(&b.is_staff),
        UserField::IsSuperuser => a.is_superuser.cmp(&b.is_superuser),
        UserField::LastLogin => a.last_login.cmp(&b.last_login),
        UserField::Password => std::cmp::Ordering::Equal,
    }
}

/// The "add user" form: email plus a password entered twice
#[derive(Debug, Clone)]
pub struct AddUserForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl AddUserForm {
    pub fn new(
        email: impl Into<String>,
        password1: impl Into<String>,
        password2: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password1: password1.into(),
            password2: password2.into(),
        }
    }

    /// Check the form and return the email and password to create the user with
    pub fn clean(&self) -> Result<(&str, &str)> {
        if self.email.trim().is_empty() {
            return Err(Error::validation("Users must have an email address"));
        }
        if self.password1.is_empty() || self.password2.is_empty() {
            return Err(Error::validation("Both password fields are required"));
        }
        if self.password1 != self.password2 {
            return Err(Error::validation("The two password fields didn't match"));
        }
        Ok((&self.email, &self.password1))
    }
}
