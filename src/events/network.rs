use crate::api::{Api, ApiError};
use crate::query::{Mutation, QueryCache};
use crate::state::State;
use anyhow::Result;
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Specify different network event types.
///
#[derive(Debug, Clone)]
pub enum Event {
    Me,
    SignIn { token: String },
    Mutate { submission: u64, mutation: Mutation },
}

/// Specify struct for managing state with network events.
///
pub struct Handler<'a> {
    state: &'a Arc<Mutex<State>>,
    api: &'a Api,
    cache: &'a QueryCache,
}

impl<'a> Handler<'a> {
    /// Return new instance with reference to state.
    ///
    pub fn new(state: &'a Arc<Mutex<State>>, api: &'a Api, cache: &'a QueryCache) -> Self {
        Handler { state, api, cache }
    }

    /// Handle network events by type.
    ///
    pub async fn handle(&mut self, event: Event) -> Result<()> {
        debug!("Processing network event '{:?}'...", event);
        match event {
            Event::Me => self.me().await?,
            Event::SignIn { token } => self.sign_in(token).await?,
            Event::Mutate {
                submission,
                mutation,
            } => self.mutate(submission, mutation).await?,
        }
        Ok(())
    }

    /// Update state with the signed-in operator.
    ///
    async fn me(&mut self) -> Result<()> {
        info!("Fetching operator profile...");
        let profile = self.api.me().await?;
        let mut state = self.state.lock().await;
        state.set_profile(profile);
        info!("Loaded operator profile.");
        Ok(())
    }

    /// Store the token, verify it against the profile endpoint and enter the
    /// dashboard. A rejected token is forgotten again.
    ///
    async fn sign_in(&mut self, token: String) -> Result<()> {
        info!("Verifying access token...");
        let session = self.api.session();
        if let Err(e) = session.sign_in(&token) {
            error!("Failed to store access token: {}", e);
            self.state.lock().await.sign_in_failed(e.to_string());
            return Ok(());
        }
        match self.api.me().await {
            Ok(profile) => {
                info!("Signed in.");
                self.state.lock().await.sign_in_succeeded(profile);
            }
            Err(e) => {
                warn!("Access token was not accepted: {}", e);
                session.sign_out();
                let message = match e {
                    ApiError::Unauthorized => "Access token was rejected".to_string(),
                    other => other.to_string(),
                };
                self.state.lock().await.sign_in_failed(message);
            }
        }
        Ok(())
    }

    /// Run a mutation through the cache so that its tags are invalidated on
    /// success, then report the outcome to the state under its submission id.
    ///
    async fn mutate(&mut self, submission: u64, mutation: Mutation) -> Result<()> {
        match mutation.execute(self.api, self.cache).await {
            Ok(_) => {
                info!("{} succeeded.", mutation.describe());
                self.state.lock().await.mutation_succeeded(submission, &mutation);
            }
            Err(e) => {
                error!("{} failed: {}", mutation.describe(), e);
                self.state
                    .lock()
                    .await
                    .mutation_failed(submission, &mutation, e.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Resource;
    use crate::query::{ListOptions, Tag};
    use crate::session::Session;
    use crate::state::{NotificationLevel, View};
    use crate::ui::Theme;
    use fake::{Fake, Faker};
    use httpmock::prelude::*;
    use serde_json::json;

    struct Fixture {
        api: Arc<Api>,
        cache: Arc<QueryCache>,
        state: Arc<Mutex<State>>,
    }

    fn fixture(server: &MockServer, token: Option<String>) -> Fixture {
        let session = Arc::new(Session::in_memory(token));
        let api = Arc::new(Api::new(&server.base_url(), session).unwrap());
        let cache = Arc::new(QueryCache::default());
        let state = State::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            ListOptions::default(),
            None,
            Theme::default(),
        );
        Fixture {
            api,
            cache,
            state: Arc::new(Mutex::new(state)),
        }
    }

    #[tokio::test]
    async fn test_me_sets_profile() {
        let server = MockServer::start_async().await;
        let name: String = Faker.fake();
        let me = server
            .mock_async(|when, then| {
                when.method(GET).path("/auth/me");
                then.status(200)
                    .json_body(json!({ "data": { "id": "u1", "name": name } }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/courses");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let f = fixture(&server, Some("token".to_string()));
        let mut handler = Handler::new(&f.state, &f.api, &f.cache);
        handler.handle(Event::Me).await.unwrap();

        me.assert_async().await;
        let state = f.state.lock().await;
        assert_eq!(state.profile().map(|p| p.field("name")), Some(name));
    }

    #[tokio::test]
    async fn test_sign_in_accepted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/me")
                    .header("Authorization", "Bearer good");
                then.status(200)
                    .json_body(json!({ "data": { "id": "u1", "name": "Ada" } }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/courses");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let f = fixture(&server, None);
        let mut handler = Handler::new(&f.state, &f.api, &f.cache);
        handler
            .handle(Event::SignIn {
                token: "good".to_string(),
            })
            .await
            .unwrap();

        assert!(f.api.session().is_authenticated());
        let state = f.state.lock().await;
        assert_eq!(state.current_view(), View::Dashboard);
        assert!(!state.is_signing_in());
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/auth/me");
                then.status(401).json_body(json!({ "message": "jwt malformed" }));
            })
            .await;

        let f = fixture(&server, None);
        let mut handler = Handler::new(&f.state, &f.api, &f.cache);
        handler
            .handle(Event::SignIn {
                token: "bad".to_string(),
            })
            .await
            .unwrap();

        assert!(!f.api.session().is_authenticated());
        assert_eq!(f.api.session().token(), None);
        let state = f.state.lock().await;
        assert_eq!(state.current_view(), View::Login);
        assert_eq!(state.auth_error(), Some("Access token was rejected"));
    }

    #[tokio::test]
    async fn test_mutation_success_invalidates_and_notifies() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/courses");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/courses/c1");
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;

        let f = fixture(&server, Some("token".to_string()));
        let mut invalidations = f.cache.subscribe();
        let mut handler = Handler::new(&f.state, &f.api, &f.cache);
        handler
            .handle(Event::Mutate {
                submission: 1,
                mutation: Mutation::delete(Resource::Courses, "c1"),
            })
            .await
            .unwrap();

        delete.assert_async().await;
        let invalidation = invalidations.recv().await.unwrap();
        assert!(invalidation.touches(&[Tag::Courses]));
        let state = f.state.lock().await;
        let last = state.notifications().last().unwrap();
        assert_eq!(last.level, NotificationLevel::Success);
        assert_eq!(last.message, "Delete course succeeded");
    }

    #[tokio::test]
    async fn test_mutation_failure_reports_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/courses");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/courses");
                then.status(422).json_body(json!({ "message": "Title taken" }));
            })
            .await;

        let f = fixture(&server, Some("token".to_string()));
        let mut invalidations = f.cache.subscribe();
        let mutation = Mutation::create(Resource::Courses, json!({ "title": "Rust" }));
        let mut handler = Handler::new(&f.state, &f.api, &f.cache);
        handler
            .handle(Event::Mutate {
                submission: 1,
                mutation,
            })
            .await
            .unwrap();

        assert!(invalidations.try_recv().is_err());
        let state = f.state.lock().await;
        let last = state.notifications().last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert!(last.message.contains("Title taken"));
    }
}
