use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mailer::ContactMessage;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicListQuery {
    /// Category id or slug.
    pub category: Option<String>,
    /// Subcategory id or slug.
    pub subcategory: Option<String>,
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page, 1-100. Default: 20.
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[schema(example = "Ravi")]
    pub first_name: Option<String>,
    #[schema(example = "ravi@example.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn validate(self) -> Result<ContactMessage, AppError> {
        let required = |v: Option<String>, name: &str| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        let first_name = required(self.first_name, "firstName")?;
        let email = required(self.email, "email")?;
        let message = required(self.message, "message")?;
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".into()));
        }
        Ok(ContactMessage {
            first_name,
            email,
            phone: self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            message,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContactResponse {
    #[schema(example = "Message received")]
    pub message: String,
}
