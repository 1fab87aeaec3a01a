//! In-memory `UserApi` used by unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::{ApiError, UserApi};
use crate::models::{Address, CreatePayload, Geo, UpdatePayload, UserRecord};

pub(crate) fn sample_user(id: &str, name: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-0100".to_string(),
        company: "Acme".to_string(),
        website: None,
        address: Address {
            street: "1 Main St".to_string(),
            suite: None,
            city: "NYC".to_string(),
            zipcode: "10001".to_string(),
            geo: Geo::default(),
        },
    }
}

/// Records every call as `list`, `get:{id}`, `create`, `update:{id}`, `delete:{id}`.
///
/// A gated fake holds each request until `open_gate` releases it, after the
/// data it will return has been read.
pub(crate) struct FakeApi {
    users: Mutex<BTreeMap<String, UserRecord>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    failure: Mutex<Option<(u16, String)>>,
    gate: Option<Semaphore>,
}

impl FakeApi {
    pub(crate) fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(101),
            failure: Mutex::new(None),
            gate: None,
        }
    }

    pub(crate) fn gated(users: Vec<UserRecord>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(users)
        }
    }

    pub(crate) fn open_gate(&self, requests: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(requests);
        }
    }

    pub(crate) fn insert(&self, user: UserRecord) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    /// Every subsequent call fails with this status until cleared.
    pub(crate) fn fail_with(&self, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub(crate) fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some((404, message)) => Err(ApiError::NotFound(message)),
            Some((status, message)) => Err(ApiError::ServerError { status, message }),
            None => Ok(()),
        }
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl UserApi for FakeApi {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.record("list".to_string())?;
        let users: Vec<UserRecord> = self.users.lock().unwrap().values().cloned().collect();
        self.wait_gate().await;
        Ok(users)
    }

    async fn get_user(&self, id: &str) -> Result<UserRecord, ApiError> {
        self.record(format!("get:{}", id))?;
        let user = self.users.lock().unwrap().get(id).cloned();
        self.wait_gate().await;
        user.ok_or_else(|| ApiError::NotFound(format!("no user {}", id)))
    }

    async fn create_user(&self, payload: &CreatePayload) -> Result<UserRecord, ApiError> {
        self.record("create".to_string())?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let user = payload.user().clone().with_id(id);
        self.insert(user.clone());
        Ok(user)
    }

    async fn update_user(&self, payload: &UpdatePayload) -> Result<UserRecord, ApiError> {
        self.record(format!("update:{}", payload.id()))?;
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(payload.id()) {
            return Err(ApiError::NotFound(format!("no user {}", payload.id())));
        }
        let user = payload.user().clone().with_id(payload.id());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete:{}", id))?;
        self.users.lock().unwrap().remove(id);
        Ok(())
    }
}
