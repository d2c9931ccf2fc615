//! In-process record store used by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::user::{Profile, StoreError, UpdateUser, User, UserId, UserRepository};

/// Record store kept in a [`BTreeMap`], ordered by identifier.
///
/// Counts every call so tests can assert the store was not reached.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
    calls: AtomicUsize,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, profile: &Profile) -> Result<User, StoreError> {
        self.hit();
        let now = chrono::Utc::now();
        let user = User {
            id: UserId::generate(),
            profile: profile.clone(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        self.hit();
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.hit();
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &UserId,
        patch: &UpdateUser,
    ) -> Result<Option<User>, StoreError> {
        self.hit();
        let mut users = self.users.lock().unwrap();
        Ok(users.get_mut(id).map(|user| {
            if let Some(name) = &patch.name {
                user.profile.name = name.clone();
            }
            if let Some(email) = &patch.email {
                user.profile.email = Some(email.clone());
            }
            user.updated_at = chrono::Utc::now();
            user.clone()
        }))
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.hit();
        Ok(self.users.lock().unwrap().remove(id))
    }
}
