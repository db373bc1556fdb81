use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, FieldError};
use crate::models::user::{Experience, PortfolioItem, RecentActivity, User, UserResponse};
use crate::profile::images::{profile_image_key, ImageStore, ImageUpload};
use crate::repositories::UserRepository;
use crate::users::service::load_user;
use crate::users::validation::{check_full_name, finish};

pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewActivity {
    #[serde(default)]
    pub activity: String,
}

fn require(field: &str, label: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    }
}

/// Profile edits on a user's embedded lists and image. Every operation loads
/// the whole user, mutates it, and writes it back.
pub struct ProfileManager<'a> {
    users: &'a dyn UserRepository,
    images: &'a dyn ImageStore,
}

impl<'a> ProfileManager<'a> {
    pub fn new(users: &'a dyn UserRepository, images: &'a dyn ImageStore) -> Self {
        Self { users, images }
    }

    async fn modify<F>(&self, user_id: Uuid, edit: F) -> Result<UserResponse, AppError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut user = load_user(self.users, user_id).await?;
        edit(&mut user);
        user.updated_at = Utc::now();
        self.users.save(&user).await?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        if let Some(full_name) = &update.full_name {
            check_full_name(full_name, &mut errors);
        }
        finish(errors)?;

        let user = self
            .modify(user_id, |user| {
                if let Some(full_name) = update.full_name {
                    user.full_name = full_name.trim().to_string();
                }
                if let Some(bio) = update.bio {
                    user.bio = bio;
                }
                if let Some(skills) = update.skills {
                    user.skills = skills;
                }
            })
            .await?;
        info!("Updated profile of user {user_id}");
        Ok(user)
    }

    pub async fn add_experience(
        &self,
        user_id: Uuid,
        input: NewExperience,
    ) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        require("title", "Title", &input.title, &mut errors);
        require("company", "Company", &input.company, &mut errors);
        finish(errors)?;

        let experience = Experience {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            company: input.company.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            description: input.description,
            current: input.current,
        };
        let experience_id = experience.id;
        let user = self
            .modify(user_id, |user| user.experience.push(experience))
            .await?;
        info!("Added experience {experience_id} to user {user_id}");
        Ok(user)
    }

    pub async fn remove_experience(
        &self,
        user_id: Uuid,
        experience_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        self.modify(user_id, |user| {
            user.experience.retain(|item| item.id != experience_id)
        })
        .await
    }

    pub async fn add_portfolio_item(
        &self,
        user_id: Uuid,
        input: NewPortfolioItem,
    ) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        require("title", "Title", &input.title, &mut errors);
        require("description", "Description", &input.description, &mut errors);
        require("category", "Category", &input.category, &mut errors);
        finish(errors)?;

        let item = PortfolioItem {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            category: input.category.trim().to_string(),
            file_url: input.file_url,
            created_at: Utc::now(),
        };
        let item_id = item.id;
        let user = self
            .modify(user_id, |user| user.portfolio.push(item))
            .await?;
        info!("Added portfolio item {item_id} to user {user_id}");
        Ok(user)
    }

    pub async fn remove_portfolio_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        self.modify(user_id, |user| user.portfolio.retain(|item| item.id != item_id))
            .await
    }

    /// Newest first; only the most recent `RECENT_ACTIVITY_LIMIT` are kept.
    pub async fn add_recent_activity(
        &self,
        user_id: Uuid,
        input: NewActivity,
    ) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        require("activity", "Activity", &input.activity, &mut errors);
        finish(errors)?;

        let entry = RecentActivity {
            id: Uuid::new_v4(),
            activity: input.activity.trim().to_string(),
            timestamp: Utc::now(),
        };
        self.modify(user_id, |user| {
            user.recent_activity.insert(0, entry);
            user.recent_activity.truncate(RECENT_ACTIVITY_LIMIT);
        })
        .await
    }

    pub async fn remove_recent_activity(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        self.modify(user_id, |user| {
            user.recent_activity.retain(|entry| entry.id != activity_id)
        })
        .await
    }

    /// Stores the new image before pointing the user at it, then drops the
    /// previous object. A failed cleanup of the old object is only logged.
    pub async fn upload_image(
        &self,
        user_id: Uuid,
        upload: Option<ImageUpload>,
    ) -> Result<UserResponse, AppError> {
        let upload =
            upload.ok_or_else(|| AppError::Validation("No image file provided".to_string()))?;
        let extension = upload.validate()?;

        let mut user = load_user(self.users, user_id).await?;
        let key = profile_image_key(user_id, Utc::now().timestamp_millis(), extension);
        self.images
            .put(&key, upload.data, &upload.content_type)
            .await?;

        let previous = user.profile_image.replace(key.clone());
        user.updated_at = Utc::now();
        if let Err(err) = self.users.save(&user).await {
            if let Err(cleanup) = self.images.remove(&key).await {
                warn!("Failed to remove orphaned image {key}: {cleanup}");
            }
            return Err(err);
        }
        info!("Stored profile image {key} for user {user_id}");

        // Two uploads in the same millisecond share a key; the object was
        // overwritten in place and must stay.
        if let Some(previous) = previous.filter(|previous| *previous != key) {
            if let Err(err) = self.images.remove(&previous).await {
                warn!("Failed to remove previous profile image {previous}: {err}");
            }
        }
        Ok(user.into())
    }

    pub async fn delete_image(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let mut user = load_user(self.users, user_id).await?;
        if let Some(key) = user.profile_image.take() {
            self.images.remove(&key).await?;
            user.updated_at = Utc::now();
            self.users.save(&user).await?;
            info!("Deleted profile image {key} of user {user_id}");
        }
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::images::memory::MemoryImageStore;
    use crate::repositories::memory::MemoryStore;
    use bytes::Bytes;

    async fn seeded() -> (MemoryStore, MemoryImageStore, Uuid) {
        let store = MemoryStore::new();
        let user = User::new("Linus", "linus@example.com", "hash".to_string());
        UserRepository::insert(&store, &user).await.unwrap();
        (store, MemoryImageStore::default(), user.id)
    }

    fn png(name: &str) -> Option<ImageUpload> {
        Some(ImageUpload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG"),
        })
    }

    #[tokio::test]
    async fn test_recent_activity_is_capped_newest_first() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        let mut user = None;
        for n in 0..11 {
            user = Some(
                profiles
                    .add_recent_activity(id, NewActivity { activity: format!("event {n}") })
                    .await
                    .unwrap(),
            );
        }
        let activity = user.unwrap().recent_activity;
        assert_eq!(activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(activity[0].activity, "event 10");
        assert_eq!(activity[9].activity, "event 1");
        assert!(activity.iter().all(|a| a.activity != "event 0"));
    }

    #[tokio::test]
    async fn test_experience_add_and_remove() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        let user = profiles
            .add_experience(
                id,
                NewExperience {
                    title: " Maintainer ".to_string(),
                    company: "Kernel".to_string(),
                    start_date: Utc::now(),
                    end_date: None,
                    description: String::new(),
                    current: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(user.experience.len(), 1);
        assert_eq!(user.experience[0].title, "Maintainer");

        let unchanged = profiles.remove_experience(id, Uuid::new_v4()).await.unwrap();
        assert_eq!(unchanged.experience.len(), 1);

        let user = profiles
            .remove_experience(id, user.experience[0].id)
            .await
            .unwrap();
        assert!(user.experience.is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_requires_fields() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        let err = profiles
            .add_portfolio_item(
                id,
                NewPortfolioItem {
                    title: "Brochure".to_string(),
                    description: " ".to_string(),
                    category: String::new(),
                    file_url: None,
                },
            )
            .await
            .unwrap_err();
        let AppError::InvalidFields(fields) = err else {
            panic!("expected field errors, got {err:?}");
        };
        assert_eq!(fields.len(), 2);
    }

    #[tokio::test]
    async fn test_update_profile_on_missing_user_is_not_found() {
        let (store, images, _) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);
        let err = profiles
            .update_profile(Uuid::new_v4(), ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "User not found"));
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_image() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        let first = profiles.upload_image(id, png("a.png")).await.unwrap();
        let first_key = first.profile_image.unwrap();
        assert!(first_key.starts_with(&format!("profile-images/{id}_")));
        assert!(first_key.ends_with(".png"));

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = profiles.upload_image(id, png("b.png")).await.unwrap();
        let second_key = second.profile_image.unwrap();
        assert_ne!(first_key, second_key);
        assert_eq!(images.keys(), vec![second_key]);
    }

    #[tokio::test]
    async fn test_reupload_with_same_key_keeps_stored_object() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        for _ in 0..50 {
            let mut user = load_user(&store, id).await.unwrap();
            user.profile_image = Some(profile_image_key(
                id,
                Utc::now().timestamp_millis(),
                "png",
            ));
            store.save(&user).await.unwrap();

            let user = profiles.upload_image(id, png("me.png")).await.unwrap();
            let key = user.profile_image.unwrap();
            assert!(
                images.keys().contains(&key),
                "profile image {key} missing from {:?}",
                images.keys()
            );
        }
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_never_dangle() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        for _ in 0..20 {
            let user = profiles.upload_image(id, png("me.png")).await.unwrap();
            let key = user.profile_image.unwrap();
            assert_eq!(images.keys(), vec![key]);
        }
    }

    #[tokio::test]
    async fn test_upload_tolerates_failed_cleanup() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        profiles.upload_image(id, png("a.png")).await.unwrap();
        images.fail_removals();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let user = profiles.upload_image(id, png("b.png")).await.unwrap();
        assert!(user.profile_image.is_some());
        assert_eq!(images.keys().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);
        let err = profiles.upload_image(id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "No image file provided"));
        assert!(images.keys().is_empty());
    }

    #[tokio::test]
    async fn test_delete_image_clears_reference() {
        let (store, images, id) = seeded().await;
        let profiles = ProfileManager::new(&store, &images);

        profiles.upload_image(id, png("a.png")).await.unwrap();
        let user = profiles.delete_image(id).await.unwrap();
        assert!(user.profile_image.is_none());
        assert!(images.keys().is_empty());

        let again = profiles.delete_image(id).await.unwrap();
        assert!(again.profile_image.is_none());
    }
}
