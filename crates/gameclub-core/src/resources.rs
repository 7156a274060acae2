//! Typed CRUD clients for the GameClub REST collections.
//!
//! | Resource | Collection path |
//! |----------|-----------------|
//! | [`Game`] | `/games` |
//! | [`Team`] | `/teams` |
//! | [`Tournament`] | `/tournaments` |
//! | [`NewsArticle`] | `/news` |

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::service::{ApiService, ApiServiceExt};

/// A REST collection served under a fixed path.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub genre: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub game_id: u64,
    /// RFC3339 start time as sent by the API.
    pub starts_at: String,
    #[serde(default)]
    pub team_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize_pool: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Resource for Game {
    const COLLECTION: &'static str = "/games";
}

impl Resource for Team {
    const COLLECTION: &'static str = "/teams";
}

impl Resource for Tournament {
    const COLLECTION: &'static str = "/tournaments";
}

impl Resource for NewsArticle {
    const COLLECTION: &'static str = "/news";
}

/// Uniform list/get/create/update/delete client for one collection.
pub struct ResourceClient<R> {
    service: Arc<dyn ApiService>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(service: Arc<dyn ApiService>) -> Self {
        Self {
            service,
            _resource: PhantomData,
        }
    }

    pub fn collection_path(&self) -> &'static str {
        R::COLLECTION
    }

    fn item_path(id: u64) -> String {
        format!("{}/{id}", R::COLLECTION)
    }

    pub async fn list(&self) -> Result<Vec<R>, ApiError> {
        self.service.fetch_as(R::COLLECTION, None).await
    }

    pub async fn get(&self, id: u64) -> Result<R, ApiError> {
        let path = Self::item_path(id);
        self.service.fetch_as(&path, None).await
    }

    pub async fn create(&self, item: &R) -> Result<R, ApiError> {
        self.service.send_as(R::COLLECTION, item, None).await
    }

    pub async fn update(&self, id: u64, item: &R) -> Result<R, ApiError> {
        let path = Self::item_path(id);
        self.service.replace_as(&path, item, None).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let path = Self::item_path(id);
        self.service.remove(&path, None).await
    }
}

/// The four collection clients sharing one pipeline.
#[derive(Clone)]
pub struct GameClubApi {
    pub games: ResourceClient<Game>,
    pub teams: ResourceClient<Team>,
    pub tournaments: ResourceClient<Tournament>,
    pub news: ResourceClient<NewsArticle>,
}

impl GameClubApi {
    pub fn new(service: Arc<dyn ApiService>) -> Self {
        Self {
            games: ResourceClient::new(service.clone()),
            teams: ResourceClient::new(service.clone()),
            tournaments: ResourceClient::new(service.clone()),
            news: ResourceClient::new(service),
        }
    }
}
