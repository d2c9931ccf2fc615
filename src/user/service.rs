use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{Cache, CacheError};
use crate::user::error::{Result, UserError};
use crate::user::{CreateUser, Profile, UpdateUser, User, UserId, UserRepository};

/// Cache key holding the whole collection.
pub const ALL_USERS_KEY: &str = "all_users";

/// Cache key holding a single user.
pub fn user_key(id: &UserId) -> String {
    format!("user_{id}")
}

/// User resource manager.
///
/// Reads go through the cache first, then the store on miss. The
/// `all_users` entry is only evicted on writes when
/// `invalidate_collection` is enabled; otherwise it may be stale until
/// it expires.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
    invalidate_collection: bool,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(repo: Arc<dyn UserRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            repo,
            cache,
            invalidate_collection: false,
        }
    }

    /// Also evict the `all_users` entry on create, update and remove.
    pub fn invalidate_collection(mut self, enabled: bool) -> Self {
        self.invalidate_collection = enabled;
        self
    }

    /// Create a user. The cache is left untouched.
    pub async fn create(&self, body: CreateUser) -> Result<User> {
        let user = self.repo.insert(&Profile::from(body)).await?;
        tracing::debug!(user_id = %user.id, "user created");

        self.evict_collection().await?;
        Ok(user)
    }

    /// Every user, served from cache when possible.
    pub async fn find_all(&self) -> Result<Vec<User>> {
        if let Some(users) = self.cached(ALL_USERS_KEY).await? {
            return Ok(users);
        }

        let users = self.repo.find_all().await?;
        self.store(ALL_USERS_KEY, &users).await?;
        Ok(users)
    }

    /// Find a user using its identifier.
    pub async fn find_one(&self, id: &str) -> Result<User> {
        let id = UserId::parse(id)?;
        let key = user_key(&id);

        if let Some(user) = self.cached(&key).await? {
            return Ok(user);
        }

        let user = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or(UserError::NotFound)?;
        self.store(&key, &user).await?;
        Ok(user)
    }

    /// Merge `patch` into the user, then overwrite its cache entry.
    pub async fn update(&self, id: &str, patch: UpdateUser) -> Result<User> {
        let id = UserId::parse(id)?;

        let user = self
            .repo
            .update_by_id(&id, &patch)
            .await?
            .ok_or(UserError::NotFound)?;
        self.store(&user_key(&id), &user).await?;
        self.evict_collection().await?;

        tracing::debug!(user_id = %id, "user updated");
        Ok(user)
    }

    /// Delete the user, then evict its cache entry.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let id = UserId::parse(id)?;

        self.repo
            .delete_by_id(&id)
            .await?
            .ok_or(UserError::NotFound)?;
        self.cache.delete(&user_key(&id)).await?;
        self.evict_collection().await?;

        tracing::debug!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await? {
            Some(value) => Ok(Some(
                serde_json::from_str(&value).map_err(CacheError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_string(value).map_err(CacheError::from)?;
        self.cache.set(key, value).await?;
        Ok(())
    }

    async fn evict_collection(&self) -> Result<()> {
        if self.invalidate_collection {
            self.cache.delete(ALL_USERS_KEY).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::user::memory::MemoryUserRepository;

    const ABSENT_ID: &str = "507f1f77bcf86cd799439011";
    const MALFORMED_IDS: [&str; 4] = ["", "not-a-valid-id", "123", "507f1f77bcf86cd79943901z"];

    fn service() -> (UserService, Arc<MemoryUserRepository>, Arc<MemoryCache>) {
        let repo = Arc::new(MemoryUserRepository::new());
        let cache = Arc::new(MemoryCache::new(Duration::ZERO, 1_000));
        let service = UserService::new(repo.clone(), cache.clone());
        (service, repo, cache)
    }

    fn body(name: &str) -> CreateUser {
        CreateUser {
            name: name.into(),
            email: None,
        }
    }

    fn rename(name: &str) -> UpdateUser {
        UpdateUser {
            name: Some(name.into()),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_store() {
        let (service, repo, _) = service();

        for id in MALFORMED_IDS {
            assert!(matches!(
                service.find_one(id).await,
                Err(UserError::InvalidArgument)
            ));
            assert!(matches!(
                service.update(id, rename("B")).await,
                Err(UserError::InvalidArgument)
            ));
            assert!(matches!(
                service.remove(id).await,
                Err(UserError::InvalidArgument)
            ));
        }

        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_absent_id_is_not_found() {
        let (service, _, _) = service();

        assert!(matches!(service.find_one(ABSENT_ID).await, Err(UserError::NotFound)));
        assert!(matches!(
            service.update(ABSENT_ID, rename("B")).await,
            Err(UserError::NotFound)
        ));
        assert!(matches!(service.remove(ABSENT_ID).await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let (service, _, cache) = service();

        let created = service.create(body("A")).await.unwrap();
        assert!(!created.id.as_str().is_empty());
        // Creation does not populate any entry.
        assert!(cache.get(&user_key(&created.id)).await.unwrap().is_none());

        let found = service.find_one(created.id.as_str()).await.unwrap();
        assert_eq!(found.profile.name, "A");
        assert_eq!(found, created);
        assert!(cache.get(&user_key(&created.id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_one_served_from_cache() {
        let (service, repo, _) = service();
        let created = service.create(body("A")).await.unwrap();

        service.find_one(created.id.as_str()).await.unwrap();
        let calls = repo.calls();
        let cached = service.find_one(created.id.as_str()).await.unwrap();

        assert_eq!(repo.calls(), calls);
        assert_eq!(cached, created);
    }

    #[tokio::test]
    async fn test_update_overwrites_cache() {
        let (service, _, _) = service();
        let created = service.create(body("A")).await.unwrap();

        // Warm the cache with the old value.
        service.find_one(created.id.as_str()).await.unwrap();

        let updated = service.update(created.id.as_str(), rename("B")).await.unwrap();
        assert_eq!(updated.profile.name, "B");

        let found = service.find_one(created.id.as_str()).await.unwrap();
        assert_eq!(found.profile.name, "B");
    }

    #[tokio::test]
    async fn test_remove_evicts_cache() {
        let (service, _, _) = service();
        let created = service.create(body("A")).await.unwrap();
        service.find_one(created.id.as_str()).await.unwrap();

        service.remove(created.id.as_str()).await.unwrap();

        assert!(matches!(
            service.find_one(created.id.as_str()).await,
            Err(UserError::NotFound)
        ));
        assert!(matches!(
            service.remove(created.id.as_str()).await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_find_all_twice_is_identical() {
        let (service, repo, _) = service();
        service.create(body("A")).await.unwrap();
        service.create(body("B")).await.unwrap();

        let first = service.find_all().await.unwrap();
        let calls = repo.calls();
        let second = service.find_all().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(repo.calls(), calls);
    }

    #[tokio::test]
    async fn test_collection_stays_stale_by_default() {
        let (service, _, _) = service();
        service.create(body("A")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);

        service.create(body("B")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_collection_invalidated_on_write_when_enabled() {
        let (service, _, _) = service();
        let service = service.invalidate_collection(true);

        let a = service.create(body("A")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);

        service.create(body("B")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 2);

        service.update(a.id.as_str(), rename("C")).await.unwrap();
        let names: Vec<_> = service
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.profile.name)
            .collect();
        assert!(names.contains(&"C".to_owned()));

        service.remove(a.id.as_str()).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }
}
