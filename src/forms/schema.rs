// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Validation schemas for the auth form.

use crate::forms::credential::CredentialError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormType {
    SignIn,
    SignUp,
}

/// Raw form fields as entered. Fields left blank are empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthFormInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Validate)]
struct SignUpSchema {
    #[validate(length(min = 3))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 3))]
    password: String,
}

#[derive(Validate)]
struct SignInSchema {
    #[validate(email)]
    email: String,
    #[validate(length(min = 3))]
    password: String,
}

/// Input that passed its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedForm {
    SignUp {
        name: String,
        email: String,
        password: String,
    },
    SignIn {
        email: String,
        password: String,
    },
}

/// Why a form submission did not go through.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid fields: {}", fields.join(", "))]
    Invalid { fields: Vec<String> },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("identity token missing after sign-in")]
    MissingIdToken,

    #[error("{0}")]
    Rejected(String),

    #[error("could not reach the server: {0}")]
    Transport(String),
}

impl FormError {
    /// Message suitable for an error notification.
    pub fn user_message(&self) -> String {
        match self {
            FormError::Invalid { fields } => {
                format!("Please check the following fields: {}", fields.join(", "))
            }
            FormError::Credential(err) => err.user_message().to_string(),
            FormError::MissingIdToken => "Sign In failed".to_string(),
            FormError::Rejected(message) => message.clone(),
            FormError::Transport(_) => "There was an error: the server is unreachable".to_string(),
        }
    }
}

/// Validate `input` against the schema for `form_type`.
pub fn validate(form_type: FormType, input: &AuthFormInput) -> Result<ValidatedForm, FormError> {
    let email = input.email.trim().to_string();

    let result = match form_type {
        FormType::SignUp => {
            let schema = SignUpSchema {
                name: input.name.trim().to_string(),
                email,
                password: input.password.clone(),
            };
            schema.validate().map(|()| ValidatedForm::SignUp {
                name: schema.name,
                email: schema.email,
                password: schema.password,
            })
        }
        FormType::SignIn => {
            let schema = SignInSchema {
                email,
                password: input.password.clone(),
            };
            schema.validate().map(|()| ValidatedForm::SignIn {
                email: schema.email,
                password: schema.password,
            })
        }
    };

    result.map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        FormError::Invalid { fields }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, password: &str) -> AuthFormInput {
        AuthFormInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn sign_up_requires_name() {
        let err = validate(FormType::SignUp, &input("Al", "al@x.com", "secret")).unwrap_err();
        match err {
            FormError::Invalid { fields } => assert_eq!(fields, vec!["name"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sign_in_ignores_name() {
        let form = validate(FormType::SignIn, &input("", " ada@x.com ", "abc")).unwrap();
        assert_eq!(
            form,
            ValidatedForm::SignIn {
                email: "ada@x.com".to_string(),
                password: "abc".to_string(),
            }
        );
    }

    #[test]
    fn all_bad_fields_are_reported() {
        let err = validate(FormType::SignUp, &input("", "not-an-email", "x")).unwrap_err();
        match err {
            FormError::Invalid { fields } => {
                assert_eq!(fields, vec!["email", "name", "password"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn form_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&FormType::SignUp).unwrap(),
            "\"sign-up\""
        );
        assert_eq!(
            serde_json::from_str::<FormType>("\"sign-in\"").unwrap(),
            FormType::SignIn
        );
    }
}
