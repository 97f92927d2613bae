use rocket::{Request, catch, serde::json::Json};
use shared::{ErrorCode, ErrorResponse};

fn body(code: ErrorCode, message: &str) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(code, message))
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::InvalidInput, "Invalid request parameters.")
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::Unauthenticated, "Sign in to view and vote on polls.")
}

#[catch(403)]
pub fn forbidden(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::Unauthorized, "Only building admins can do that.")
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::NotFound, "The requested resource was not found.")
}

#[catch(409)]
pub fn conflict(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::Conflict, "The poll changed while saving. Please try again.")
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::InvalidInput, "The request body could not be read.")
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    body(ErrorCode::SystemError, "An internal server error occurred.")
}
