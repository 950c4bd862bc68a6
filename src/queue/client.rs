use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use uuid::Uuid;

use super::error::QueueError;
use super::types::{JobStatusView, SubmitRequest, SubmitResponse};
use super::{JobDispatcher, JobHandle};

/// HTTP client for the queue gateway.
///
/// Submits jobs to `POST {base}/jobs` and reads status from
/// `GET {base}/jobs/{id}`.
#[derive(Debug, Clone)]
pub struct HttpQueueClient {
    client: Client,
    base_url: String,
}

impl HttpQueueClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_status(&self, id: &str) -> Result<JobStatusView, QueueError> {
        let url = format!("{}/jobs/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(QueueError::Gateway {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<JobStatusView>().await?)
    }
}

#[async_trait]
impl JobDispatcher for HttpQueueClient {
    async fn submit(
        &self,
        job_name: &str,
        payload: &str,
    ) -> Result<Box<dyn JobHandle>, QueueError> {
        let body = SubmitRequest {
            request_id: Uuid::new_v4().to_string(),
            job: job_name.to_string(),
            payload: payload.to_string(),
            submitted_at: Utc::now(),
        };
        let url = format!("{}/jobs", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(QueueError::Gateway {
                status: status.as_u16(),
                message,
            });
        }
        let submitted = response.json::<SubmitResponse>().await?;
        Ok(Box::new(HttpJobHandle {
            client: self.clone(),
            id: submitted.id,
            status: JobStatusView::default(),
        }))
    }
}

#[derive(Debug)]
struct HttpJobHandle {
    client: HttpQueueClient,
    id: String,
    status: JobStatusView,
}

#[async_trait]
impl JobHandle for HttpJobHandle {
    fn status(&self) -> &JobStatusView {
        &self.status
    }

    async fn sync(&mut self) -> Result<&JobStatusView, QueueError> {
        self.status = self.client.fetch_status(&self.id).await?;
        Ok(&self.status)
    }
}
