// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::PodcastError;
use crate::http::{ApiRequest, ApiResponse, HttpClient};

use super::model::{Podcast, PodcastCreate, PodcastUpdate};

/// REST client for the podcasts of a search space.
///
/// Stateless: the bearer token is passed on every call, and each operation is
/// exactly one round trip with no retries.
#[derive(Clone)]
pub struct PodcastClient<C> {
    http: C,
    base_url: Url,
}

impl<C: HttpClient> PodcastClient<C> {
    /// A base URL without a trailing slash is treated as a directory
    pub fn new(http: C, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /searchspace/{id}/podcasts/`
    pub async fn create(
        &self,
        space_id: i64,
        data: &PodcastCreate,
        token: &str,
    ) -> Result<Podcast, PodcastError> {
        let url = self.collection_url(space_id)?;
        let body = serde_json::to_vec(data)?;
        let response = self
            .send(ApiRequest::new(Method::POST, url.clone(), token).with_json(body))
            .await?;
        decode(&url, &response)
    }

    /// `GET /searchspace/{id}/podcasts/`, in backend order
    pub async fn list(&self, space_id: i64, token: &str) -> Result<Vec<Podcast>, PodcastError> {
        let url = self.collection_url(space_id)?;
        let response = self
            .send(ApiRequest::new(Method::GET, url.clone(), token))
            .await?;
        decode(&url, &response)
    }

    /// `GET /searchspace/{id}/podcasts/{pid}`
    pub async fn get(
        &self,
        space_id: i64,
        podcast_id: i64,
        token: &str,
    ) -> Result<Podcast, PodcastError> {
        let url = self.item_url(space_id, podcast_id)?;
        let response = self
            .send(ApiRequest::new(Method::GET, url.clone(), token))
            .await?;
        decode(&url, &response)
    }

    /// `PUT /searchspace/{id}/podcasts/{pid}`
    pub async fn update(
        &self,
        space_id: i64,
        podcast_id: i64,
        data: &PodcastUpdate,
        token: &str,
    ) -> Result<Podcast, PodcastError> {
        let url = self.item_url(space_id, podcast_id)?;
        let body = serde_json::to_vec(data)?;
        let response = self
            .send(ApiRequest::new(Method::PUT, url.clone(), token).with_json(body))
            .await?;
        decode(&url, &response)
    }

    /// `DELETE /searchspace/{id}/podcasts/{pid}`
    pub async fn delete(
        &self,
        space_id: i64,
        podcast_id: i64,
        token: &str,
    ) -> Result<(), PodcastError> {
        let url = self.item_url(space_id, podcast_id)?;
        self.send(ApiRequest::new(Method::DELETE, url, token))
            .await?;
        Ok(())
    }

    /// `GET /searchspace/{id}/podcasts/{pid}/download`, raw audio bytes
    pub async fn download(
        &self,
        space_id: i64,
        podcast_id: i64,
        token: &str,
    ) -> Result<Bytes, PodcastError> {
        let url = self
            .collection_url(space_id)?
            .join(&format!("{podcast_id}/download"))?;
        let response = self
            .send(ApiRequest::new(Method::GET, url, token))
            .await?;
        Ok(response.body)
    }

    fn collection_url(&self, space_id: i64) -> Result<Url, PodcastError> {
        Ok(self
            .base_url
            .join(&format!("searchspace/{space_id}/podcasts/"))?)
    }

    fn item_url(&self, space_id: i64, podcast_id: i64) -> Result<Url, PodcastError> {
        Ok(self.collection_url(space_id)?.join(&podcast_id.to_string())?)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PodcastError> {
        let url = request.url.to_string();
        debug!(method = %request.method, %url, "podcast API request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| PodcastError::Request {
                url: url.clone(),
                source: e,
            })?;

        match response.status {
            404 => Err(PodcastError::NotFound { url }),
            status if !response.is_success() => Err(PodcastError::Status { url, status }),
            _ => Ok(response),
        }
    }
}

fn decode<T: DeserializeOwned>(url: &Url, response: &ApiResponse) -> Result<T, PodcastError> {
    serde_json::from_slice(&response.body).map_err(|e| PodcastError::Decode {
        url: url.to_string(),
        source: e,
    })
}
