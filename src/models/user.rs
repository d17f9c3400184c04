//! User model, rights and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Rights level on one area of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rights {
    None = 0,
    Read = 1,
    Write = 2,
}

impl From<char> for Rights {
    fn from(c: char) -> Self {
        match c {
            'r' | 'R' => Rights::Read,
            'w' | 'W' => Rights::Write,
            _ => Rights::None,
        }
    }
}

impl From<Option<String>> for Rights {
    fn from(s: Option<String>) -> Self {
        s.and_then(|s| s.chars().next())
            .map(Rights::from)
            .unwrap_or(Rights::None)
    }
}

/// Account type slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountTypeSlug {
    Guest,
    Reader,
    Librarian,
    Admin,
}

impl AccountTypeSlug {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountTypeSlug::Guest => "guest",
            AccountTypeSlug::Reader => "reader",
            AccountTypeSlug::Librarian => "librarian",
            AccountTypeSlug::Admin => "admin",
        }
    }
}

impl std::fmt::Display for AccountTypeSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountTypeSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guest" => Ok(AccountTypeSlug::Guest),
            "reader" => Ok(AccountTypeSlug::Reader),
            "librarian" => Ok(AccountTypeSlug::Librarian),
            "admin" => Ok(AccountTypeSlug::Admin),
            _ => Err(format!("Invalid account type slug: {}", s)),
        }
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    login: String,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    account_type: String,
    catalog_rights: Option<String>,
    loans_rights: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            login: row.login,
            password: row.password,
            first_name: row.first_name,
            last_name: row.last_name,
            account_type: row.account_type.parse().unwrap_or(AccountTypeSlug::Guest),
            rights: UserRights {
                catalog: Rights::from(row.catalog_rights),
                loans: Rights::from(row.loans_rights),
            },
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: AccountTypeSlug,
    #[schema(value_type = Object)]
    pub rights: UserRights,
}

/// User rights structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRights {
    /// Books, authors, genres and copies
    pub catalog: Rights,
    /// Loans of copies: listing all borrowers, renewals
    pub loans: Rights,
}

impl Default for UserRights {
    fn default() -> Self {
        Self {
            catalog: Rights::None,
            loans: Rights::None,
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountTypeSlug,
    pub rights: UserRights,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks
    pub fn require_write_catalog(&self) -> Result<(), AppError> {
        if self.rights.catalog >= Rights::Write {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to edit the catalog".to_string()))
        }
    }

    /// The "can manage loans" capability: see every loan, renew loans
    pub fn require_manage_loans(&self) -> Result<(), AppError> {
        if self.rights.loans >= Rights::Write || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage loans".to_string()))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.account_type == AccountTypeSlug::Admin
    }
}
