use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use engine::{CreatePayload, UpdatePayload};

use super::AppState;
use crate::{view::ConfigurationView, ApiError};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePayload>, JsonRejection>,
) -> Result<Json<ConfigurationView>, ApiError> {
    let Json(payload) = payload?;
    let cfg = state.orchestrator.create(payload).await?;
    Ok(Json(cfg.into()))
}

pub async fn show(
    Path(repo): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ConfigurationView>, ApiError> {
    let cfg = state.orchestrator.get(&repo).await?;
    Ok(Json(cfg.into()))
}

/// The repository in the path wins; a different name in the body is rejected.
pub async fn update(
    Path(repo): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<UpdatePayload>, JsonRejection>,
) -> Result<Json<ConfigurationView>, ApiError> {
    let Json(mut payload) = payload?;

    match payload.repository.name.as_deref() {
        Some(name) if name != repo => {
            return Err(ApiError::BadRequest(format!(
                "repository name '{name}' does not match path '{repo}'"
            )));
        }
        _ => payload.repository.name = Some(repo),
    }

    let cfg = state.orchestrator.update(payload).await?;
    Ok(Json(cfg.into()))
}

pub async fn delete(
    Path(repo): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.delete(&repo).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use db::DbError;
    use engine::{Collaborators, RecordStore, ReleaseProcessOrchestrator};
    use provisioning::mock::{self, MockProvisioner};
    use provisioning::Configuration;

    use super::*;

    #[derive(Default)]
    struct HashStore(Mutex<HashMap<String, Configuration>>);

    #[async_trait]
    impl RecordStore for HashStore {
        async fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, DbError> {
            Ok(self.0.lock().unwrap().get(id).cloned())
        }

        async fn insert(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
            self.0.lock().unwrap().insert(cfg.id.clone(), cfg.clone());
            Ok(cfg.clone())
        }

        async fn update(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
            self.insert(cfg).await
        }

        async fn delete(&self, cfg: &Configuration) -> Result<(), DbError> {
            self.0.lock().unwrap().remove(&cfg.id);
            Ok(())
        }
    }

    fn state() -> (AppState, Arc<MockProvisioner>) {
        let provisioner = Arc::new(MockProvisioner::new());
        let orchestrator = ReleaseProcessOrchestrator::new(
            Collaborators::from_single(provisioner.clone()),
            Arc::new(HashStore::default()),
        );
        (AppState::new(orchestrator), provisioner)
    }

    #[tokio::test]
    async fn create_then_show_and_delete() {
        let (state, provisioner) = state();

        let Json(created) = create(
            State(state.clone()),
            Ok(Json(CreatePayload::new("repo-a", &["ci"]))),
        )
        .await
        .expect("create succeeds");
        assert_eq!(created.repository.name, "repo-a");
        assert_eq!(created.continuous_integration.provider.as_deref(), Some("jenkins"));

        let Json(shown) = show(Path("repo-a".into()), State(state.clone()))
            .await
            .expect("show succeeds");
        assert_eq!(shown, created);

        let status = delete(Path("repo-a".into()), State(state.clone()))
            .await
            .expect("delete succeeds");
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(provisioner.call_count(mock::UNSET_WORKFLOW), 1);

        let err = show(Path("repo-a".into()), State(state))
            .await
            .expect_err("gone after delete");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_takes_repository_from_path() {
        let (state, provisioner) = state();
        create(State(state.clone()), Ok(Json(CreatePayload::new("repo-a", &[]))))
            .await
            .expect("create succeeds");
        provisioner.clear_calls();

        let mut payload = UpdatePayload::default().with_threshold(90.0);
        payload.repository.name = None;
        let Json(updated) = update(Path("repo-a".into()), State(state), Ok(Json(payload)))
            .await
            .expect("update succeeds");

        assert_eq!(updated.code_coverage.pull_request_threshold, Some(90.0));
        assert_eq!(provisioner.calls(), vec![mock::UPDATE_THRESHOLD]);
    }

    #[tokio::test]
    async fn update_with_mismatched_name_is_rejected() {
        let (state, provisioner) = state();

        let err = update(
            Path("repo-a".into()),
            State(state),
            Ok(Json(UpdatePayload::for_repository("repo-b").with_technology("go"))),
        )
        .await
        .expect_err("names differ");

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(provisioner.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_create_payload_is_400() {
        let (state, provisioner) = state();

        let err = create(State(state), Ok(Json(CreatePayload::default())))
            .await
            .expect_err("name is required");

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(provisioner.calls().is_empty());
    }
}
