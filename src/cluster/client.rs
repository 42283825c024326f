//! REST client for the cluster API

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::ClusterConfig;
use crate::error::{Result, StevedoreError};
use crate::manifest::service::Service;
use crate::manifest::workload::{ReplicationController, Scale};

/// Typed client for the resources the tool manages
pub struct ClusterClient {
    server: String,
    namespace: String,
    http: reqwest::Client,
}

impl ClusterClient {
    /// Create a client for the configured API server
    pub fn new(config: &ClusterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StevedoreError::Cluster(e.to_string()))?;

        Ok(Self {
            server: config.server.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            http,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn core_url(&self, resource: &str, name: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/v1/namespaces/{}/{}",
            self.server, self.namespace, resource
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        url
    }

    fn scale_url(&self, name: &str) -> String {
        format!(
            "{}/apis/extensions/v1beta1/namespaces/{}/replicationcontrollers/{}/scale",
            self.server, self.namespace, name
        )
    }

    pub async fn get_service(&self, name: &str) -> Result<Service> {
        self.get(&self.core_url("services", Some(name)), name).await
    }

    pub async fn create_service(&self, service: &Service) -> Result<Service> {
        self.post(&self.core_url("services", None), service).await
    }

    pub async fn delete_service(&self, name: &str) -> Result<()> {
        self.delete(&self.core_url("services", Some(name)), name).await
    }

    pub async fn get_controller(&self, name: &str) -> Result<ReplicationController> {
        self.get(&self.core_url("replicationcontrollers", Some(name)), name)
            .await
    }

    pub async fn create_controller(
        &self,
        controller: &ReplicationController,
    ) -> Result<ReplicationController> {
        self.post(&self.core_url("replicationcontrollers", None), controller)
            .await
    }

    pub async fn delete_controller(&self, name: &str) -> Result<()> {
        self.delete(&self.core_url("replicationcontrollers", Some(name)), name)
            .await
    }

    pub async fn get_scale(&self, name: &str) -> Result<Scale> {
        self.get(&self.scale_url(name), name).await
    }

    pub async fn update_scale(&self, name: &str, scale: &Scale) -> Result<Scale> {
        let response = self
            .http
            .put(self.scale_url(name))
            .json(scale)
            .send()
            .await
            .map_err(|e| StevedoreError::Cluster(e.to_string()))?;
        Self::decode(response, name).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, name: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StevedoreError::Cluster(e.to_string()))?;
        Self::decode(response, name).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StevedoreError::Cluster(e.to_string()))?;
        Self::decode(response, url).await
    }

    async fn delete(&self, url: &str, name: &str) -> Result<()> {
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| StevedoreError::Cluster(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StevedoreError::NotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(StevedoreError::Cluster(format!(
                "{}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StevedoreError::NotFound(what.to_string()));
        }
        if !response.status().is_success() {
            return Err(StevedoreError::Cluster(format!(
                "{}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StevedoreError::Cluster(e.to_string()))
    }
}
