use shared::{CurrentUser, ErrorResponse};

/// Who is looking at the page, as reported by `/me`. Provided to every page via context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub user: Option<CurrentUser>,
    pub error: Option<ErrorResponse>,
}

impl Session {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user), error: None }
    }

    pub fn failed(error: ErrorResponse) -> Self {
        Self { user: None, error: Some(error) }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}
