use std::sync::Arc;

use tracing::{debug, info, warn};

use super::MutationError;
use crate::api::{ApiError, UserApi};
use crate::cache::{CacheData, QueryCache, QueryKey};
use crate::form::{validate, FormState, ValidatedForm};
use crate::models::UserRecord;

/// Runs writes against the remote collection and keeps the cache honest.
///
/// Cache keys are invalidated strictly after the remote call returns
/// successfully.
#[derive(Clone)]
pub struct UserMutations {
    api: Arc<dyn UserApi>,
    cache: QueryCache,
}

impl UserMutations {
    pub fn new(api: Arc<dyn UserApi>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn validated(operation: &str, form: &FormState) -> Result<ValidatedForm, MutationError> {
        validate(form).map_err(|errors| {
            debug!(operation = operation, fields = errors.len(), "Form rejected by validation");
            MutationError::Validation(errors)
        })
    }

    fn failed(operation: &str, id: Option<&str>, err: ApiError) -> MutationError {
        warn!(
            operation = operation,
            id = id.unwrap_or("-"),
            kind = %err.kind(),
            error = %err,
            "Mutation failed"
        );
        MutationError::Api(err)
    }

    /// Validate, `POST /users`, then mark `["users"]` stale and seed the
    /// new record's detail key.
    pub async fn create_user(&self, form: &FormState) -> Result<UserRecord, MutationError> {
        let payload = Self::validated("create", form)?.create_payload();

        let user = self
            .api
            .create_user(&payload)
            .await
            .map_err(|e| Self::failed("create", None, e))?;

        self.cache.invalidate([&QueryKey::users()]);
        self.cache
            .write(QueryKey::user(user.id.as_str()), CacheData::Record(user.clone()));
        info!(id = %user.id, "User created");
        Ok(user)
    }

    /// Validate, `PUT /users/{id}`, then mark `["users"]` and
    /// `["users", id]` stale.
    pub async fn update_user(&self, id: &str, form: &FormState) -> Result<UserRecord, MutationError> {
        let payload = Self::validated("update", form)?.update_payload(id);

        let user = self
            .api
            .update_user(&payload)
            .await
            .map_err(|e| Self::failed("update", Some(id), e))?;

        self.cache
            .invalidate([&QueryKey::users(), &QueryKey::user(id)]);
        info!(id = %id, "User updated");
        Ok(user)
    }

    /// `DELETE /users/{id}`, then mark `["users"]` stale and forget
    /// `["users", id]`. A record that is already gone counts as deleted.
    pub async fn delete_user(&self, id: &str) -> Result<(), MutationError> {
        match self.api.delete_user(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(id = %id, "User already absent");
            }
            Err(e) => return Err(Self::failed("delete", Some(id), e)),
        }

        self.cache.invalidate([&QueryKey::users()]);
        self.cache.forget(&QueryKey::user(id));
        info!(id = %id, "User deleted");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
