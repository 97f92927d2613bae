use rocket::{State, get, post, patch, http::Status, serde::json::Json};
use time::OffsetDateTime;
use tracing::instrument;
use shared::{models::*, user_info::CurrentUser};
use crate::{error::ApiError, processor::PollProcessor, utils::parse_poll_id};

pub struct AppState {
    pub processor: PollProcessor,
}

impl AppState {
    pub fn new(processor: PollProcessor) -> Self {
        Self { processor }
    }
}

#[get("/me")]
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
#[get("/votes?<sort>")]
pub async fn list_votes(
    state: &State<AppState>,
    user: CurrentUser,
    sort: Option<&str>,
) -> Result<Json<Vec<PollView>>, ApiError> {
    state.processor
        .list_polls(&user, SortSpec::parse(sort), OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
#[get("/votes/<id>")]
pub async fn get_vote(
    state: &State<AppState>,
    user: CurrentUser,
    id: &str,
) -> Result<Json<PollView>, ApiError> {
    let id = parse_poll_id(id)?;
    state.processor
        .get_poll(&user, id, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
#[post("/votes", format = "json", data = "<form>")]
pub async fn create_vote(
    state: &State<AppState>,
    user: CurrentUser,
    form: Json<PollForm>,
) -> Result<(Status, Json<Poll>), ApiError> {
    let poll = state.processor.create_poll(&user, &form.into_inner()).await?;
    Ok((Status::Created, Json(poll)))
}

#[instrument(skip(state, user, patch), fields(user_id = %user.id))]
#[patch("/votes/<id>", format = "json", data = "<patch>")]
pub async fn update_vote(
    state: &State<AppState>,
    user: CurrentUser,
    id: &str,
    patch: Json<PollPatch>,
) -> Result<Json<Poll>, ApiError> {
    let id = parse_poll_id(id)?;
    state.processor
        .edit_poll(&user, id, patch.into_inner())
        .await
        .map(Json)
}

#[instrument(skip(state, user, ballot), fields(user_id = %user.id))]
#[post("/votes/<id>/ballot", format = "json", data = "<ballot>")]
pub async fn cast_ballot(
    state: &State<AppState>,
    user: CurrentUser,
    id: &str,
    ballot: Json<CastBallotRequest>,
) -> Result<Json<PollView>, ApiError> {
    let id = parse_poll_id(id)?;
    state.processor
        .cast_vote(&user, id, &ballot.option, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[get("/summary")]
pub async fn summary(
    state: &State<AppState>,
    user: CurrentUser,
) -> Result<Json<ActivitySummary>, ApiError> {
    state.processor
        .summary(&user, OffsetDateTime::now_utc())
        .await
        .map(Json)
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
