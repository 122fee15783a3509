use leonai_schema::{CreateMotionData, CreateUploadData, GraphqlRequest, UploadPolicyFields};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{GenerationJob, MotionResult, PollOutcome};
use crate::config::JobResolvedConfig;
use crate::error::{JobError, JobPhase, LeonardoError};
use crate::leonardo::multipart::MultipartBody;
use crate::leonardo::retry::{Authenticator, Reply, Retrier};
use crate::leonardo::session::SessionManager;
use crate::leonardo::transport::ApiRequest;
use crate::leonardo::wait::sleep_or_cancel;
use crate::utils::logging::preview;

/// MIME type for a supported source image extension (case-insensitive).
pub fn image_mime_type(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Drives one job through upload, submission, both poll phases and resolution.
/// Never retries on its own; resilience lives in the [`Retrier`].
pub(crate) struct JobDriver<'a> {
    pub retrier: &'a Retrier,
    pub session: &'a SessionManager,
    pub cfg: &'a JobResolvedConfig,
}

impl JobDriver<'_> {
    fn auth(&self) -> Option<&dyn Authenticator> {
        Some(self.session)
    }

    pub async fn upload(&self, path: &Path, cancel: &CancellationToken) -> Result<String, JobError> {
        let fail = |e: LeonardoError| JobError::new(JobPhase::Uploading, e);

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file_type = image_mime_type(&extension)
            .ok_or_else(|| fail(LeonardoError::UnsupportedFormat(extension.clone())))?;
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| fail(e.into()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");

        self.session
            .ensure_authenticated(cancel)
            .await
            .map_err(fail)?;

        let reply: Reply<CreateUploadData> = self
            .retrier
            .graphql(
                &GraphqlRequest::create_upload_init_image(file_type, &extension),
                self.auth(),
                cancel,
            )
            .await
            .map_err(fail)?;
        let target = reply.data.upload_init_image;
        if target.url.is_empty() {
            return Err(fail(LeonardoError::MissingField("uploadInitImage.url")));
        }
        if target.id.is_empty() {
            return Err(fail(LeonardoError::MissingField("uploadInitImage.id")));
        }

        let fields: UploadPolicyFields = match serde_json::from_str(&target.fields) {
            Ok(fields) => fields,
            Err(source) => {
                self.retrier.artifacts().write(&reply.raw).await;
                return Err(fail(LeonardoError::Decode {
                    target: "upload policy fields",
                    source,
                }));
            }
        };
        if fields.key.is_empty() {
            return Err(fail(LeonardoError::MissingField("uploadInitImage.fields.key")));
        }

        let form = fields
            .ordered()
            .into_iter()
            .fold(MultipartBody::builder(), |form, (name, value)| {
                form.text(name, value)
            })
            .file("file", filename, &contents)
            .finish();

        self.retrier
            .call_raw(&ApiRequest::post_multipart(target.url, form), None, cancel)
            .await
            .map_err(fail)?;

        info!(asset_id = %target.id, file = %filename, bytes = contents.len(), "Image uploaded");
        Ok(target.id)
    }

    pub async fn create_motion(
        &self,
        image_id: &str,
        motion_strength: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<MotionResult, JobError> {
        let fail = |e: LeonardoError| JobError::new(JobPhase::Submitting, e);
        let strength = motion_strength
            .filter(|s| *s > 0)
            .unwrap_or(self.cfg.motion_strength);

        self.session
            .ensure_authenticated(cancel)
            .await
            .map_err(fail)?;
        let user_id = self
            .session
            .user_id()
            .ok_or_else(|| fail(LeonardoError::Auth("no validated user id".into())))?
            .to_string();

        let reply: Reply<CreateMotionData> = self
            .retrier
            .graphql(
                &GraphqlRequest::create_motion_svd_generation_job(image_id, strength),
                self.auth(),
                cancel,
            )
            .await
            .map_err(fail)?;
        let submitted = reply.data.motion_svd_generation_job;
        if submitted.generation_id.is_empty() {
            return Err(fail(LeonardoError::Submission(format!(
                "no generation id in response: {}",
                preview(&reply.raw)
            )))
            .with_last_response(Some(reply.raw.as_slice())));
        }
        info!(
            generation_id = %submitted.generation_id,
            image_id,
            motion_strength = strength,
            api_credit_cost = ?submitted.api_credit_cost,
            "Motion job submitted"
        );

        let mut job = GenerationJob::new(submitted.generation_id);

        let status_query = GraphqlRequest::generation_statuses(job.generation_id());
        self.poll(
            &mut job,
            JobPhase::PollingStatus,
            &status_query,
            (self.cfg.status_poll, self.cfg.status_poll),
            GenerationJob::apply_status,
            cancel,
        )
        .await?;

        let feed_query = GraphqlRequest::generation_feed(&user_id, self.cfg.feed_limit);
        let entry = self
            .poll(
                &mut job,
                JobPhase::PollingFeed,
                &feed_query,
                (self.cfg.feed_first_wait, self.cfg.feed_poll),
                GenerationJob::apply_feed,
                cancel,
            )
            .await?;

        let result = job.resolve(&entry).map_err(|e| {
            JobError::new(JobPhase::Resolving, e).with_generation(job.generation_id())
        })?;
        info!(
            generation_id = %job.generation_id(),
            asset_id = %result.asset_id,
            url = %result.url,
            "Motion job resolved"
        );
        Ok(result)
    }

    /// Wait, query, apply, until `step` is done or fails. `waits` is
    /// `(first, every_next)`.
    async fn poll<T, R>(
        &self,
        job: &mut GenerationJob,
        phase: JobPhase,
        query: &GraphqlRequest,
        waits: (Duration, Duration),
        step: fn(&mut GenerationJob, &T) -> Result<PollOutcome<R>, LeonardoError>,
        cancel: &CancellationToken,
    ) -> Result<R, JobError>
    where
        T: DeserializeOwned + Default,
    {
        let (mut wait, every) = waits;
        let mut last: Option<Vec<u8>> = None;
        let mut polls = 0u32;

        loop {
            let fetched: Result<Reply<T>, LeonardoError> = async {
                sleep_or_cancel(wait, cancel).await?;
                self.session.ensure_authenticated(cancel).await?;
                self.retrier.graphql(query, self.auth(), cancel).await
            }
            .await;
            wait = every;

            let reply = match fetched {
                Ok(reply) => reply,
                Err(e) => {
                    if e.is_cancelled() {
                        warn!(
                            generation_id = %job.generation_id(),
                            %phase,
                            last_response = %last.as_deref().map(preview).unwrap_or_default(),
                            "Motion job cancelled"
                        );
                    }
                    return Err(JobError::new(phase, e)
                        .with_generation(job.generation_id())
                        .with_last_response(last.as_deref()));
                }
            };
            polls += 1;

            let outcome = step(job, &reply.data);
            last = Some(reply.raw);
            match outcome {
                Ok(PollOutcome::Continue) => {
                    debug!(
                        generation_id = %job.generation_id(),
                        status = %job.status(),
                        %phase,
                        polls,
                        "Generation not ready yet"
                    );
                }
                Ok(PollOutcome::Done(value)) => {
                    debug!(generation_id = %job.generation_id(), %phase, polls, "Poll phase finished");
                    return Ok(value);
                }
                Err(e) => {
                    return Err(JobError::new(phase, e)
                        .with_generation(job.generation_id())
                        .with_last_response(last.as_deref()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_extensions_case_insensitively() {
        assert_eq!(image_mime_type("jpg"), Some("image/jpeg"));
        assert_eq!(image_mime_type("JPEG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("png"), Some("image/png"));
        assert_eq!(image_mime_type("gif"), None);
        assert_eq!(image_mime_type(""), None);
    }
}
