use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;
use shared::user_info::{USER_ID_HEADER, USER_ROLE_HEADER};

pub struct CORS {
    allowed_origin: String,
}

impl CORS {
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self { allowed_origin: allowed_origin.into().trim_end_matches('/').to_string() }
    }

    /// Exact origin match; scheme and host are case-insensitive.
    pub fn allows(&self, origin: &str) -> bool {
        origin.trim_end_matches('/').eq_ignore_ascii_case(&self.allowed_origin)
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else { return };

        if self.allows(origin) {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, PATCH, OPTIONS"));
            res.set_header(Header::new(
                "Access-Control-Allow-Headers",
                format!("Content-Type, Authorization, {USER_ID_HEADER}, {USER_ROLE_HEADER}"),
            ));
            res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
