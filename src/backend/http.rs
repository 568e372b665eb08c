//! Blocking HTTP implementation of [`Backend`].
//!
//! Status handling mirrors the usual pattern: non-success responses become
//! [`BackendError::Status`] carrying the body, bodies are decoded through
//! [`crate::backend::wire`].

use std::path::Path;
#[cfg(feature = "network")]
use std::time::Duration;

use crate::backend::Backend;
use crate::backend::error::BackendError;
use crate::backend::progress::ProgressSink;
#[cfg(feature = "network")]
use crate::backend::progress::ProgressReader;
#[cfg(feature = "network")]
use crate::backend::wire::{self, CreateUnitRequest, GenerateRequest};
use crate::config::Config;
use crate::engine::tag::CancelToken;
use crate::quiz::model::{QuestionSet, QuestionStyle, SetId, Unit, UnitId};

#[cfg(feature = "network")]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    user_id: String,
    upload_timeout: Duration,
}

#[cfg(feature = "network")]
impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            upload_timeout: timeout * 10,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, BackendError> {
        if !resp.status().is_success() {
            return Err(BackendError::Status {
                status: resp.status().as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp)
    }

    fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, BackendError> {
        tracing::debug!(path, "GET");
        let resp = self.client.get(self.url(path)).query(query).send()?;
        Ok(Self::check(resp)?.text()?)
    }
}

#[cfg(feature = "network")]
impl Backend for HttpBackend {
    fn list_units(&self) -> Result<Vec<Unit>, BackendError> {
        let body = self.get_text("/units", &[("user_id", self.user_id.as_str())])?;
        wire::decode_units(&body)
    }

    fn create_unit(&self, title: &str) -> Result<Unit, BackendError> {
        tracing::debug!(title, "POST /units");
        let resp = self
            .client
            .post(self.url("/units"))
            .json(&CreateUnitRequest {
                user_id: &self.user_id,
                title,
            })
            .send()?;
        wire::decode_unit(&Self::check(resp)?.text()?)
    }

    fn upload(
        &self,
        unit: &UnitId,
        file: &Path,
        progress: ProgressSink,
        cancel: &CancelToken,
    ) -> Result<(), BackendError> {
        use reqwest::blocking::multipart::{Form, Part};

        let handle = std::fs::File::open(file)?;
        let len = handle.metadata()?.len();
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let reader = ProgressReader::new(handle, len, progress, cancel.clone());
        let part = Part::reader_with_length(reader, len).file_name(file_name);
        let form = Form::new()
            .part("file", part)
            .text("user_id", self.user_id.clone())
            .text("unit_id", unit.as_str().to_string());

        tracing::debug!(unit = %unit, bytes = len, "POST /upload");
        let sent = self
            .client
            .post(self.url("/upload"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send();
        match sent {
            Err(_) if cancel.is_cancelled() => Err(BackendError::Cancelled),
            Err(err) => Err(err.into()),
            // The response body carries no information the client uses.
            Ok(resp) => Self::check(resp).map(|_| ()),
        }
    }

    fn generate(
        &self,
        unit: &UnitId,
        topic: &str,
        style: QuestionStyle,
    ) -> Result<QuestionSet, BackendError> {
        tracing::debug!(unit = %unit, topic, style = style.as_str(), "POST /generate_questions_by_topic");
        let resp = self
            .client
            .post(self.url("/generate_questions_by_topic"))
            .json(&GenerateRequest {
                topic,
                style: style.as_str(),
                user_id: &self.user_id,
                unit_id: unit.as_str(),
            })
            .send()?;
        wire::decode_set(&Self::check(resp)?.text()?)
    }

    fn list_sets(&self, unit: &UnitId) -> Result<Vec<QuestionSet>, BackendError> {
        let body = self.get_text(
            "/question_sets",
            &[("user_id", self.user_id.as_str()), ("unit_id", unit.as_str())],
        )?;
        wire::decode_sets(&body)
    }

    fn search_sets(&self, unit: &UnitId, topic: &str) -> Result<Vec<QuestionSet>, BackendError> {
        let body = self.get_text(
            "/search_questions_by_topic",
            &[
                ("user_id", self.user_id.as_str()),
                ("unit_id", unit.as_str()),
                ("topic", topic),
            ],
        )?;
        wire::decode_sets(&body)
    }

    fn delete_set(&self, unit: &UnitId, set: &SetId) -> Result<(), BackendError> {
        tracing::debug!(unit = %unit, set = %set, "DELETE /question_sets");
        let resp = self
            .client
            .delete(self.url(&format!("/question_sets/{set}")))
            .query(&[("user_id", self.user_id.as_str()), ("unit_id", unit.as_str())])
            .send()?;
        Self::check(resp).map(|_| ())
    }
}

/// Stand-in used when the crate is built without the `network` feature:
/// every call fails with [`BackendError::Offline`].
#[cfg(not(feature = "network"))]
pub struct HttpBackend;

#[cfg(not(feature = "network"))]
impl HttpBackend {
    pub fn new(_config: &Config) -> Result<Self, BackendError> {
        Ok(Self)
    }
}

#[cfg(not(feature = "network"))]
impl Backend for HttpBackend {
    fn list_units(&self) -> Result<Vec<Unit>, BackendError> {
        Err(BackendError::Offline)
    }

    fn create_unit(&self, _title: &str) -> Result<Unit, BackendError> {
        Err(BackendError::Offline)
    }

    fn upload(
        &self,
        _unit: &UnitId,
        _file: &Path,
        _progress: ProgressSink,
        _cancel: &CancelToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::Offline)
    }

    fn generate(
        &self,
        _unit: &UnitId,
        _topic: &str,
        _style: QuestionStyle,
    ) -> Result<QuestionSet, BackendError> {
        Err(BackendError::Offline)
    }

    fn list_sets(&self, _unit: &UnitId) -> Result<Vec<QuestionSet>, BackendError> {
        Err(BackendError::Offline)
    }

    fn search_sets(&self, _unit: &UnitId, _topic: &str) -> Result<Vec<QuestionSet>, BackendError> {
        Err(BackendError::Offline)
    }

    fn delete_set(&self, _unit: &UnitId, _set: &SetId) -> Result<(), BackendError> {
        Err(BackendError::Offline)
    }
}

#[cfg(all(test, feature = "network"))]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = Config::default();
        config.api_base_url = "http://localhost:5000/".to_string();
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.url("/units"), "http://localhost:5000/units");
    }
}
