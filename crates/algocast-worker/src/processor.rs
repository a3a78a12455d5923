//! Render job orchestration.
//!
//! One job runs start to finish: resolve the upload target, preflight the
//! narration, fetch assets into a scratch directory, render (scene pipeline
//! with a plain-video fallback), then publish locally or upload to Stream
//! and report back.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use validator::Validate;

use algocast_media::{publish_copy, FfmpegRunner, FfmpegSceneRenderer, CommandSceneRenderer, SceneRenderer};
use algocast_models::{playback_url_for, CallbackPayload, JobId, RenderPayload};
use algocast_storage::{infer_asset_filename, CallbackClient, TransferClient, TransferConfig};

use crate::assembly::{AssemblyReport, ClipAssembler};
use crate::backend::{FfmpegBackend, MediaBackend};
use crate::config::{RenderConfig, SceneRendererKind};
use crate::error::{AssemblyResult, WorkerError, WorkerResult};
use crate::loader::{load_events, load_sync_plan};
use crate::logging::JobLogger;
use crate::metrics;

/// Where a finished video ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutput {
    /// Uploaded to Stream and reported to the backend
    Stream { stream_uid: String, playback_url: String },
    /// Copied to the local output directory
    Local { path: PathBuf },
}

/// Files fetched for one job.
#[derive(Debug, Default)]
struct JobAssets {
    events: Option<PathBuf>,
    sync: Option<PathBuf>,
    audio: Vec<PathBuf>,
}

/// Runs render jobs.
pub struct JobProcessor {
    config: RenderConfig,
    transfer: TransferClient,
    callback: CallbackClient,
    backend: Arc<dyn MediaBackend>,
    renderer: Arc<dyn SceneRenderer>,
}

impl JobProcessor {
    /// Processor using ffmpeg and the configured scene renderer.
    pub fn new(config: RenderConfig, transfer_config: TransferConfig) -> WorkerResult<Self> {
        let runner = FfmpegRunner::new().with_optional_timeout(config.ffmpeg_timeout_secs);
        let backend = Arc::new(FfmpegBackend::new(runner.clone(), config.encoding.clone()));

        let renderer: Arc<dyn SceneRenderer> = match config.renderer {
            SceneRendererKind::Ffmpeg => Arc::new(
                FfmpegSceneRenderer::new(config.encoding.clone(), runner)
                    .with_font_file(config.font_file.clone()),
            ),
            SceneRendererKind::Command => {
                let program = config.render_command.clone().ok_or_else(|| {
                    WorkerError::config("SCENE_RENDERER=command requires SCENE_RENDER_COMMAND")
                })?;
                Arc::new(CommandSceneRenderer::new(program, config.encoding.clone(), runner))
            }
        };

        Self::with_media(config, transfer_config, backend, renderer)
    }

    /// Processor with explicit media collaborators.
    pub fn with_media(
        config: RenderConfig,
        transfer_config: TransferConfig,
        backend: Arc<dyn MediaBackend>,
        renderer: Arc<dyn SceneRenderer>,
    ) -> WorkerResult<Self> {
        Ok(Self {
            config,
            transfer: TransferClient::new(transfer_config.clone())?,
            callback: CallbackClient::new(transfer_config)?,
            backend,
            renderer,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Name of the scene renderer in use.
    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    /// Process a job, reporting any failure to the backend.
    pub async fn run(&self, payload: &RenderPayload) -> WorkerResult<RenderOutput> {
        let span = JobLogger::from_string(&payload.job_id, "render").create_span();
        match self.process(payload).instrument(span).await {
            Ok(output) => Ok(output),
            Err(e) => {
                self.report_failure(&payload.job_id, &e).await;
                Err(e)
            }
        }
    }

    /// Send the failure callback for `err`.
    pub async fn report_failure(&self, job_id: &str, err: &WorkerError) {
        metrics::record_job_failed(err.prefix());
        let logger = JobLogger::from_string(job_id, "render");
        logger.log_error(&err.to_string());

        if job_id.is_empty() {
            return;
        }
        self.callback
            .send_safe(job_id, &CallbackPayload::failed(err.callback_message()))
            .await;
    }

    /// Process a job without failure reporting.
    pub async fn process(&self, payload: &RenderPayload) -> WorkerResult<RenderOutput> {
        payload
            .validate()
            .map_err(|e| WorkerError::invalid_payload(e.to_string()))?;

        let job_id = payload.job_id();
        let logger = JobLogger::new(&job_id, "render");
        logger.log_start(&format!("{} narration clips", payload.assets.audio_urls.len()));

        let upload_url = self.resolve_upload_url(payload).await?;
        self.preflight(payload).await?;

        let scratch = self.scratch_dir(&job_id)?;
        let assets = self.fetch_assets(payload, scratch.path(), &logger).await?;

        let video = scratch.path().join("out.mp4");
        self.render_video(&assets, scratch.path(), &video, &logger).await?;

        let output = match upload_url {
            None => self.publish_local(&job_id, &video).await?,
            Some(url) => self.upload_and_report(&job_id, &url, &video, &logger).await?,
        };
        logger.log_completion(&format!("{:?}", output));
        Ok(output)
    }

    /// Upload target for the job; `None` in local mode.
    async fn resolve_upload_url(&self, payload: &RenderPayload) -> WorkerResult<Option<String>> {
        if self.config.skip_stream {
            return Ok(None);
        }
        if let Some(url) = &payload.stream.upload_url {
            return Ok(Some(url.clone()));
        }
        if !self.transfer.config().direct_upload_fallback {
            return Err(WorkerError::invalid_payload("stream.uploadURL missing"));
        }
        self.transfer
            .request_direct_upload()
            .await
            .map(Some)
            .map_err(|e| {
                WorkerError::invalid_payload(format!(
                    "missing stream.uploadURL and fallback failed: {}",
                    e
                ))
            })
    }

    /// HEAD the first narration clip to catch expired signed URLs early.
    async fn preflight(&self, payload: &RenderPayload) -> WorkerResult<()> {
        let first = payload
            .assets
            .audio_urls
            .first()
            .ok_or_else(|| WorkerError::validation("no audio files"))?;

        match self.transfer.head_status(first).await {
            Ok(status) if status.as_u16() == 200 => Ok(()),
            Ok(status) => Err(WorkerError::validation(format!(
                "first audio HEAD {}",
                status.as_u16()
            ))),
            Err(e) => Err(WorkerError::fetch(format!("audio HEAD failed: {}", e))),
        }
    }

    fn scratch_dir(&self, job_id: &JobId) -> WorkerResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        let prefix = format!("algocast-{}-", job_id);
        builder.prefix(&prefix);
        let dir = match &self.config.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Download JSON assets (best effort) and every narration clip (required).
    async fn fetch_assets(
        &self,
        payload: &RenderPayload,
        scratch: &Path,
        logger: &JobLogger,
    ) -> WorkerResult<JobAssets> {
        let a = &payload.assets;
        let mut assets = JobAssets::default();

        let json_assets = [
            ("events", Some(&a.events_url)),
            ("narration", Some(&a.narration_url)),
            ("complexity", Some(&a.complexity_url)),
            ("sync", a.sync_url.as_ref()),
        ];
        for (kind, url) in json_assets {
            let Some(url) = url else { continue };
            let dest = scratch.join(infer_asset_filename(url, &format!("{}.json", kind)));
            match self.transfer.download(url, &dest).await {
                Ok(_) => match kind {
                    "events" => assets.events = Some(dest),
                    "sync" => assets.sync = Some(dest),
                    _ => {}
                },
                Err(e) => logger.log_warning(&format!("{} asset fetch failed: {}", kind, e)),
            }
        }

        for (i, url) in a.audio_urls.iter().enumerate() {
            let name = infer_asset_filename(url, &format!("{:03}.mp3", i));
            let ext = Path::new(&name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("mp3");
            let dest = scratch.join(format!("{:03}.{}", i, ext));
            self.transfer
                .download(url, &dest)
                .await
                .map_err(|e| WorkerError::fetch(format!("audio {} download failed: {}", i, e)))?;
            assets.audio.push(dest);
        }

        if assets.audio.is_empty() {
            return Err(WorkerError::validation("no audio files"));
        }
        Ok(assets)
    }

    /// Scene pipeline when enabled and possible, plain video otherwise.
    async fn render_video(
        &self,
        assets: &JobAssets,
        scratch: &Path,
        output: &Path,
        logger: &JobLogger,
    ) -> WorkerResult<()> {
        let started = Instant::now();

        match (&assets.events, self.config.use_scenes) {
            (Some(events), true) => match self.render_scenes(events, assets, scratch, output, logger).await {
                Ok(report) => {
                    logger.log_progress(&format!(
                        "Rendered {} scenes with {}",
                        report.clips,
                        self.renderer.name()
                    ));
                    metrics::record_render_duration("scenes", started.elapsed().as_secs_f64());
                    return Ok(());
                }
                Err(e) => logger.log_warning(&format!("Scene pipeline failed, falling back: {}", e)),
            },
            (None, true) => logger.log_warning("No events file; rendering plain video"),
            (_, false) => {}
        }

        self.render_plain(assets, scratch, output).await?;
        metrics::record_render_duration("plain", started.elapsed().as_secs_f64());
        Ok(())
    }

    async fn render_scenes(
        &self,
        events: &Path,
        assets: &JobAssets,
        scratch: &Path,
        output: &Path,
        logger: &JobLogger,
    ) -> AssemblyResult<AssemblyReport> {
        let raw = load_events(events).await?;
        let sync_plan = match &assets.sync {
            Some(path) => load_sync_plan(path).await,
            None => None,
        };

        ClipAssembler::new(
            self.backend.as_ref(),
            self.renderer.as_ref(),
            self.config.budget(),
            scratch,
            logger,
        )
        .render_timeline(&raw, sync_plan.as_ref(), &assets.audio, output)
        .await
    }

    /// Background video over the whole narration.
    async fn render_plain(&self, assets: &JobAssets, scratch: &Path, output: &Path) -> WorkerResult<()> {
        let combined = scratch.join("combined.m4a");
        self.backend.concat_narration(&assets.audio, &combined).await?;

        let mut total = 0.0;
        for path in &assets.audio {
            total += self.backend.probe_duration(path).await;
        }
        self.backend.plain_video(total, &combined, output).await?;
        Ok(())
    }

    async fn publish_local(&self, job_id: &JobId, video: &Path) -> WorkerResult<RenderOutput> {
        let name = job_id.as_str();
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(WorkerError::invalid_payload(format!("jobId {:?} is not a valid file name", name)));
        }

        let dest = self.config.local_output_dir.join(format!("{}.mp4", name));
        publish_copy(video, &dest).await?;
        metrics::record_job_completed("local");
        Ok(RenderOutput::Local { path: dest })
    }

    async fn upload_and_report(
        &self,
        job_id: &JobId,
        upload_url: &str,
        video: &Path,
        logger: &JobLogger,
    ) -> WorkerResult<RenderOutput> {
        let uid = self
            .transfer
            .upload_video(self.config.upload_mode, upload_url, video)
            .await
            .map_err(|e| WorkerError::upload(e.to_string()))?;
        logger.log_progress(&format!("Uploaded stream video {}", uid));

        self.callback
            .send(job_id.as_str(), &CallbackPayload::done(uid.clone()))
            .await?;
        metrics::record_job_completed("stream");

        Ok(RenderOutput::Stream {
            playback_url: playback_url_for(&uid),
            stream_uid: uid,
        })
    }
}
