#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    use rocket::http::{Header, Status};
    use rocket::local::asynchronous::Client;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use tracing_subscriber::EnvFilter;
    use uuid::Uuid;

    use shared::mutator::cast_or_change_vote;
    use shared::{
        ActivitySummary, CastBallotRequest, CurrentUser, ErrorCode, ErrorResponse, NewPoll, Poll,
        PollForm, PollPatch, PollStatus, PollUpdate, PollView, Role, SortSpec, USER_ID_HEADER,
        USER_ROLE_HEADER,
    };

    use crate::build_rocket;
    use crate::config::{AppConfig, DEFAULT_ALLOWED_ORIGIN, DEFAULT_MAX_WRITE_ATTEMPTS};
    use crate::error::ApiError;
    use crate::processor::PollProcessor;
    use crate::store::{MemoryStore, PollStore, StoreError};

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn admin() -> CurrentUser {
        CurrentUser::new("admin-1", Role::Admin)
    }

    fn tenant(id: &str) -> CurrentUser {
        CurrentUser::new(id, Role::User)
    }

    fn form(options: &[&str], deadline: OffsetDateTime) -> PollForm {
        PollForm {
            title: "Roof garden".into(),
            description: "What should go on the roof?".into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            deadline: Some(deadline),
        }
    }

    fn processor(store: Arc<dyn PollStore>) -> PollProcessor {
        PollProcessor::new(store, &AppConfig::default())
    }

    async fn seeded(options: &[&str], deadline: OffsetDateTime) -> (Arc<MemoryStore>, PollProcessor, Poll) {
        let store = Arc::new(MemoryStore::new());
        let processor = processor(store.clone());
        let poll = processor.create_poll(&admin(), &form(options, deadline)).await.unwrap();
        (store, processor, poll)
    }

    /// Lets another tenant's ballot land between the first read and the first write.
    struct RacingStore {
        inner: MemoryStore,
        raced: AtomicBool,
    }

    #[rocket::async_trait]
    impl PollStore for RacingStore {
        async fn list(&self, sort: SortSpec) -> Result<Vec<Poll>, StoreError> {
            self.inner.list(sort).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
            self.inner.get(id).await
        }

        async fn create(&self, poll: NewPoll) -> Result<Poll, StoreError> {
            self.inner.create(poll).await
        }

        async fn update(&self, id: Uuid, update: PollUpdate, expected_version: Option<i64>) -> Result<Poll, StoreError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                let current = self.inner.get(id).await?.ok_or(StoreError::NotFound)?;
                let votes = cast_or_change_vote(&current, "neighbor", &current.options[1], NOW);
                self.inner.update(id, PollUpdate::votes(votes), None).await?;
            }
            self.inner.update(id, update, expected_version).await
        }
    }

    /// Every conditional write loses.
    struct ContendedStore {
        inner: MemoryStore,
        attempts: AtomicU32,
    }

    #[rocket::async_trait]
    impl PollStore for ContendedStore {
        async fn list(&self, sort: SortSpec) -> Result<Vec<Poll>, StoreError> {
            self.inner.list(sort).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
            self.inner.get(id).await
        }

        async fn create(&self, poll: NewPoll) -> Result<Poll, StoreError> {
            self.inner.create(poll).await
        }

        async fn update(&self, _id: Uuid, _update: PollUpdate, expected_version: Option<i64>) -> Result<Poll, StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let expected = expected_version.unwrap_or_default();
            Err(StoreError::Conflict { expected, found: expected + 1 })
        }
    }

    #[tokio::test]
    async fn test_only_admins_manage_polls() {
        init_logging();
        let store = Arc::new(MemoryStore::new());
        let processor = processor(store.clone());

        let denied = processor.create_poll(&tenant("t-1"), &form(&["Yes", "No"], NOW + Duration::days(3))).await;
        assert!(matches!(denied, Err(ApiError::Forbidden)));
        assert!(store.list(SortSpec::default()).await.unwrap().is_empty());

        let poll = processor.create_poll(&admin(), &form(&[" Yes ", "No", ""], NOW + Duration::days(3))).await.unwrap();
        assert_eq!(poll.options, vec!["Yes", "No"]);
        assert_eq!(poll.status, PollStatus::Active);
        assert!(poll.votes.is_empty());

        let patch = PollPatch { title: Some("Hijacked".into()), ..PollPatch::default() };
        assert!(matches!(processor.edit_poll(&tenant("t-1"), poll.id, patch).await, Err(ApiError::Forbidden)));
        assert_eq!(store.get(poll.id).await.unwrap().unwrap().title, "Roof garden");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = Arc::new(MemoryStore::new());
        let processor = processor(store.clone());

        let one_option = processor.create_poll(&admin(), &form(&["Only", "  "], NOW + Duration::days(1))).await;
        assert!(matches!(one_option, Err(ApiError::Invalid(_))));

        let mut no_deadline = form(&["A", "B"], NOW);
        no_deadline.deadline = None;
        assert!(matches!(processor.create_poll(&admin(), &no_deadline).await, Err(ApiError::Invalid(_))));
        assert!(store.list(SortSpec::default()).await.unwrap().is_empty());

        // Rejected before the poll is even looked up.
        let blank = PollPatch { title: Some("   ".into()), ..PollPatch::default() };
        assert!(matches!(processor.edit_poll(&admin(), Uuid::new_v4(), blank).await, Err(ApiError::Invalid(_))));
        assert!(matches!(
            processor.edit_poll(&admin(), Uuid::new_v4(), PollPatch::default()).await,
            Err(ApiError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_cast_then_change_vote() {
        let (store, processor, poll) = seeded(&["Pool", "Garden", "Gym"], NOW + Duration::days(2)).await;

        let view = processor.cast_vote(&tenant("t-1"), poll.id, "Pool", NOW).await.unwrap();
        assert_eq!(view.my_choice.as_deref(), Some("Pool"));
        assert_eq!(view.total_votes, 1);

        processor.cast_vote(&tenant("t-2"), poll.id, "Gym", NOW).await.unwrap();
        let view = processor.cast_vote(&tenant("t-1"), poll.id, "Garden", NOW + Duration::hours(1)).await.unwrap();

        let counts: Vec<usize> = view.results.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![0, 1, 1]);
        assert_eq!(view.total_votes, 2);
        assert_eq!(view.my_choice.as_deref(), Some("Garden"));

        let stored = store.get(poll.id).await.unwrap().unwrap();
        assert_eq!(stored.votes.len(), 2);
        assert_eq!(stored.votes[0].user_id, "t-1");
        assert_eq!(stored.version, 4);
    }

    #[tokio::test]
    async fn test_closed_polls_reject_ballots() {
        let (store, processor, poll) = seeded(&["Yes", "No"], NOW + Duration::hours(1)).await;

        let late = processor.cast_vote(&tenant("t-1"), poll.id, "Yes", NOW + Duration::hours(1)).await;
        assert!(matches!(late, Err(ApiError::PollClosed)));
        assert_eq!(late.unwrap_err().status(), Status::Conflict);

        store.update(poll.id, PollUpdate { status: Some(PollStatus::Closed), ..PollUpdate::default() }, None).await.unwrap();
        assert!(matches!(processor.cast_vote(&tenant("t-1"), poll.id, "Yes", NOW).await, Err(ApiError::PollClosed)));
        assert!(store.get(poll.id).await.unwrap().unwrap().votes.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_option_and_missing_poll() {
        let (_, processor, poll) = seeded(&["Yes", "No"], NOW + Duration::days(1)).await;

        let wrong_case = processor.cast_vote(&tenant("t-1"), poll.id, "yes", NOW).await;
        assert!(matches!(wrong_case, Err(ApiError::UnknownOption(ref o)) if o == "yes"));

        let missing = processor.cast_vote(&tenant("t-1"), Uuid::new_v4(), "Yes", NOW).await;
        assert!(matches!(missing, Err(ApiError::NotFound)));
        assert!(matches!(processor.get_poll(&tenant("t-1"), Uuid::new_v4(), NOW).await, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn test_edit_deadline_reopens_poll() {
        let (_, processor, poll) = seeded(&["Yes", "No"], NOW - Duration::days(1)).await;
        assert!(!processor.get_poll(&tenant("t-1"), poll.id, NOW).await.unwrap().is_active);

        let patch = PollPatch { deadline: Some(NOW + Duration::days(5)), ..PollPatch::default() };
        let edited = processor.edit_poll(&admin(), poll.id, patch).await.unwrap();
        assert_eq!(edited.deadline, NOW + Duration::days(5));
        assert_eq!(edited.options, poll.options);

        let view = processor.cast_vote(&tenant("t-1"), poll.id, "No", NOW).await.unwrap();
        assert!(view.is_active);

        // Same values again: nothing to write, version untouched.
        let same = PollPatch { deadline: Some(NOW + Duration::days(5)), ..PollPatch::default() };
        let unchanged = processor.edit_poll(&admin(), poll.id, same).await.unwrap();
        assert_eq!(unchanged.version, view.poll.version);
    }

    #[tokio::test]
    async fn test_concurrent_ballot_is_not_lost() {
        init_logging();
        let store = Arc::new(RacingStore { inner: MemoryStore::new(), raced: AtomicBool::new(false) });
        let processor = processor(store.clone());
        let poll = processor.create_poll(&admin(), &form(&["Red", "Blue"], NOW + Duration::days(1))).await.unwrap();

        let view = processor.cast_vote(&tenant("t-1"), poll.id, "Red", NOW).await.unwrap();

        let voters: Vec<&str> = view.poll.votes.iter().map(|b| b.user_id.as_str()).collect();
        assert_eq!(voters, vec!["neighbor", "t-1"]);
        assert_eq!(view.total_votes, 2);
        assert_eq!(view.results[0].percentage, 50.0);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_after_retries() {
        let store = Arc::new(ContendedStore { inner: MemoryStore::new(), attempts: AtomicU32::new(0) });
        let config = AppConfig { max_write_attempts: 4, ..AppConfig::default() };
        let processor = PollProcessor::new(store.clone(), &config);
        let poll = processor.create_poll(&admin(), &form(&["Red", "Blue"], NOW + Duration::days(1))).await.unwrap();

        let result = processor.cast_vote(&tenant("t-1"), poll.id, "Red", NOW).await;
        assert!(matches!(result, Err(ApiError::Conflict)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 4);
        assert!(result.unwrap_err().to_response().is_retryable());
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(StoreError::Database("connection refused on 10.0.0.7".into()));
        assert_eq!(err.status(), Status::InternalServerError);
        let body = err.to_response();
        assert_eq!(body, ErrorResponse::new(ErrorCode::SystemError, "Failed to reach the poll store"));
        assert!(body.is_retryable());
    }

    #[tokio::test]
    async fn test_many_tenants_voting_at_once() {
        let (store, processor, poll) = seeded(&["Red", "Blue"], NOW + Duration::days(1)).await;
        let processor = Arc::new(processor);
        let poll_id = poll.id;

        // The memory store serializes writes, so every ballot must survive.
        let ballots = (0..8).map(|i| {
            let processor = processor.clone();
            async move {
                let option = if i % 2 == 0 { "Red" } else { "Blue" };
                processor.cast_vote(&tenant(&format!("t-{i}")), poll_id, option, NOW).await
            }
        });
        let results = futures::future::join_all(ballots).await;
        assert!(results.iter().all(Result::is_ok));

        let stored = store.get(poll_id).await.unwrap().unwrap();
        assert_eq!(stored.votes.len(), 8);
    }

    fn stored_poll(title: &str, deadline: OffsetDateTime, created_date: OffsetDateTime) -> Poll {
        Poll {
            id: Uuid::new_v4(),
            title: title.into(),
            description: "Building vote".into(),
            options: vec!["A".into(), "B".into()],
            deadline,
            status: PollStatus::Active,
            votes: Vec::new(),
            created_date,
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let open = stored_poll("Open", NOW + Duration::days(1), NOW - Duration::days(3));
        let closing = stored_poll("Closing", NOW + Duration::minutes(5), NOW - Duration::days(2));
        let closed = stored_poll("Closed", NOW - Duration::days(1), NOW - Duration::days(1));
        let store = Arc::new(MemoryStore::with_polls([closed.clone(), open.clone(), closing.clone()]));
        let processor = processor(store);

        processor.cast_vote(&tenant("t-1"), open.id, "A", NOW).await.unwrap();
        processor.cast_vote(&tenant("t-1"), closing.id, "B", NOW).await.unwrap();
        processor.cast_vote(&tenant("t-2"), open.id, "B", NOW).await.unwrap();

        let summary = processor.summary(&tenant("t-1"), NOW + Duration::minutes(10)).await.unwrap();
        assert_eq!(summary, ActivitySummary { active_polls: 1, my_ballots: 2 });

        let listed = processor.list_polls(&tenant("t-2"), SortSpec::CreatedAsc, NOW).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|v| v.poll.id).collect();
        assert_eq!(ids, vec![open.id, closing.id, closed.id]);
        assert_eq!(listed[0].my_choice.as_deref(), Some("B"));
        assert_eq!(listed[1].my_choice, None);

        let newest_first = processor.list_polls(&tenant("t-2"), SortSpec::CreatedDesc, NOW).await.unwrap();
        assert_eq!(newest_first[0].poll.id, closed.id);
    }

    fn secrets(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_config_from_secrets() {
        assert_eq!(AppConfig::from_lookup(|_| None), AppConfig::default());

        let config = AppConfig::from_lookup(secrets(&[
            ("MAX_WRITE_ATTEMPTS", " 5 "),
            ("ALLOWED_ORIGIN", "https://building.example"),
        ]));
        assert_eq!(config.max_write_attempts, 5);
        assert_eq!(config.allowed_origin, "https://building.example");

        for bad in ["0", "abc", "-1", ""] {
            let config = AppConfig::from_lookup(move |key| (key == "MAX_WRITE_ATTEMPTS").then(|| bad.to_string()));
            assert_eq!(config.max_write_attempts, DEFAULT_MAX_WRITE_ATTEMPTS, "value {bad:?}");
        }

        let config = AppConfig::from_lookup(secrets(&[("ALLOWED_ORIGIN", "   ")]));
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
    }

    #[tokio::test]
    async fn test_cors_only_for_configured_origin() {
        init_logging();
        let config = AppConfig { allowed_origin: "https://building.example".into(), ..AppConfig::default() };
        let client = Client::tracked(build_rocket(Arc::new(MemoryStore::new()), config))
            .await
            .expect("valid rocket instance");

        let response = client.get("/api/me")
            .header(as_user("t-1"))
            .header(Header::new("Origin", "https://building.example"))
            .dispatch()
            .await;
        assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), Some("https://building.example"));
        assert_eq!(response.headers().get_one("Access-Control-Allow-Credentials"), Some("true"));

        for origin in ["https://building.example.attacker.net", "https://building.example:8443", "http://building.example"] {
            let response = client.get("/api/me")
                .header(as_user("t-1"))
                .header(Header::new("Origin", origin))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
            assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None, "origin {origin}");
            assert_eq!(response.headers().get_one("Access-Control-Allow-Credentials"), None);
        }
    }

    async fn client() -> Client {
        init_logging();
        Client::tracked(build_rocket(Arc::new(MemoryStore::new()), AppConfig::default()))
            .await
            .expect("valid rocket instance")
    }

    fn as_user(id: &'static str) -> Header<'static> {
        Header::new(USER_ID_HEADER, id)
    }

    fn as_admin() -> Header<'static> {
        Header::new(USER_ROLE_HEADER, "admin")
    }

    #[tokio::test]
    async fn test_http_requires_identity() {
        let client = client().await;

        let response = client.get("/api/votes").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body: ErrorResponse = response.into_json().await.unwrap();
        assert_eq!(body.code, Some(ErrorCode::Unauthenticated));

        let response = client.get("/api/me").header(as_user("t-9")).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let me: CurrentUser = response.into_json().await.unwrap();
        assert_eq!(me, tenant("t-9"));
    }

    #[tokio::test]
    async fn test_http_poll_lifecycle() {
        let client = client().await;
        let deadline = OffsetDateTime::now_utc() + Duration::days(7);

        let response = client.post("/api/votes")
            .header(as_user("t-1"))
            .json(&form(&["Pool", "Gym"], deadline))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client.post("/api/votes")
            .header(as_user("admin-1"))
            .header(as_admin())
            .json(&form(&["Pool", "Gym"], deadline))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let poll: Poll = response.into_json().await.unwrap();

        let response = client.post(format!("/api/votes/{}/ballot", poll.id))
            .header(as_user("t-1"))
            .json(&CastBallotRequest { option: "Gym".into() })
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let view: PollView = response.into_json().await.unwrap();
        assert_eq!(view.my_choice.as_deref(), Some("Gym"));
        assert_eq!(view.results[1].percentage, 100.0);

        let response = client.post(format!("/api/votes/{}/ballot", poll.id))
            .header(as_user("t-1"))
            .json(&CastBallotRequest { option: "Sauna".into() })
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.patch(format!("/api/votes/{}", poll.id))
            .header(as_user("admin-1"))
            .header(as_admin())
            .json(&PollPatch { deadline: Some(OffsetDateTime::now_utc() - Duration::minutes(1)), ..PollPatch::default() })
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.post(format!("/api/votes/{}/ballot", poll.id))
            .header(as_user("t-2"))
            .json(&CastBallotRequest { option: "Pool".into() })
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);
        let body: ErrorResponse = response.into_json().await.unwrap();
        assert_eq!(body.code, Some(ErrorCode::PollClosed));

        let response = client.get("/api/votes?sort=-created_date").header(as_user("t-2")).dispatch().await;
        let listed: Vec<PollView> = response.into_json().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_active);
        assert_eq!(listed[0].total_votes, 1);

        let response = client.get("/api/summary").header(as_user("t-1")).dispatch().await;
        let summary: ActivitySummary = response.into_json().await.unwrap();
        assert_eq!(summary, ActivitySummary { active_polls: 0, my_ballots: 1 });
    }

    #[tokio::test]
    async fn test_http_bad_ids() {
        let client = client().await;

        let response = client.get("/api/votes/not-a-uuid").header(as_user("t-1")).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: ErrorResponse = response.into_json().await.unwrap();
        assert_eq!(body.code, Some(ErrorCode::InvalidInput));

        let response = client.get(format!("/api/votes/{}", Uuid::new_v4())).header(as_user("t-1")).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
