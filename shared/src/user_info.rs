use serde::{Serialize, Deserialize};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Anything that is not exactly "admin" is an ordinary tenant.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Identity supplied by the fronting auth layer. Passed explicitly to every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Request guard, backend only.
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for CurrentUser {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            let id = match headers.get_one(USER_ID_HEADER).map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => return Outcome::Error((Status::Unauthorized, ())),
            };

            let role = headers.get_one(USER_ROLE_HEADER)
                .map(Role::parse)
                .unwrap_or_default();

            Outcome::Success(CurrentUser { id, role })
        }
    }
}
