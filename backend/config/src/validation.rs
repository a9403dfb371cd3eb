//! Config validation: schema checks with user-friendly error messages.

use crate::schema::GifsmithConfig;
use anyhow::{bail, Result};
use std::path::Path;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit every warning and error through `tracing`. Call after the
    /// subscriber is installed or the events are dropped.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }

    /// Fail with every error joined into one message when the report has any.
    pub fn ensure_valid(&self, source: &Path) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        bail!(
            "invalid config at {}: {}",
            source.display(),
            self.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        )
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &GifsmithConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_discord(config, &mut report);
    validate_media(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_discord(config: &GifsmithConfig, report: &mut ValidationReport) {
    let token = config.discord.as_ref().and_then(|d| d.token.as_deref());
    match token {
        None => report.warn(
            "discord.token",
            "No token configured; DISCORD_TOKEN will be read from the environment",
        ),
        Some(t) if t.trim().is_empty() => report.error("discord.token", "Token cannot be empty"),
        Some(_) => {}
    }
}

fn validate_media(config: &GifsmithConfig, report: &mut ValidationReport) {
    let Some(media) = &config.media else { return };

    if media.frame_step == Some(0) {
        report.error("media.frameStep", "Must be at least 1");
    }
    if media.worker_pool_size == Some(0) {
        report.error("media.workerPoolSize", "Must be at least 1");
    }
    if let Some(fps) = media.video_fps {
        if fps == 0 || fps > 50 {
            report.error("media.videoFps", "Must be between 1 and 50");
        }
    }
    if media.fetch_timeout_secs == Some(0) {
        report.error("media.fetchTimeoutSecs", "Must be positive");
    }
    if media.video_deadline_secs == Some(0) {
        report.error("media.videoDeadlineSecs", "Must be positive");
    }
    if media.max_video_height == Some(0) {
        report.error("media.maxVideoHeight", "Must be positive");
    }
    if let Some(size) = media.font_size {
        if !size.is_finite() || size <= 0.0 {
            report.error("media.fontSize", "Must be positive");
        }
    }
    if let Some(path) = &media.font_path {
        if !Path::new(path).exists() {
            report.warn(
                "media.fontPath",
                format!("Font not found at {path}; captions will use the bundled font"),
            );
        }
    }
    if let Some(dir) = &media.temp_dir {
        if !Path::new(dir).is_dir() {
            report.error("media.tempDir", format!("{dir} is not a directory"));
        }
    }
}

fn validate_logging(config: &GifsmithConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if level.trim().is_empty() {
            report.error("logging.level", "Level cannot be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{DiscordConfig, MediaSettings};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Clone, Default)]
    struct LevelCounter {
        warnings: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
    }

    impl<S: Subscriber> Layer<S> for LevelCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            match *event.metadata().level() {
                Level::WARN => self.warnings.fetch_add(1, Ordering::SeqCst),
                Level::ERROR => self.errors.fetch_add(1, Ordering::SeqCst),
                _ => 0,
            };
        }
    }

    fn with_media(media: MediaSettings) -> GifsmithConfig {
        GifsmithConfig {
            discord: Some(DiscordConfig {
                token: Some("token".into()),
                guild_id: None,
            }),
            media: Some(media),
            logging: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let report = validate(&apply_all_defaults(with_media(MediaSettings::default())));
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn rejects_zero_step_and_pool() {
        let report = validate(&with_media(MediaSettings {
            frame_step: Some(0),
            worker_pool_size: Some(0),
            ..Default::default()
        }));
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"media.frameStep"));
        assert!(paths.contains(&"media.workerPoolSize"));
    }

    #[test]
    fn rejects_out_of_range_fps() {
        let report = validate(&with_media(MediaSettings {
            video_fps: Some(120),
            ..Default::default()
        }));
        assert!(!report.is_valid());
    }

    #[test]
    fn missing_font_is_only_a_warning() {
        let report = validate(&with_media(MediaSettings {
            font_path: Some("/definitely/not/here.ttf".into()),
            ..Default::default()
        }));
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.path == "media.fontPath"));
    }

    #[test]
    fn rejects_non_finite_font_size() {
        for size in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 0.0] {
            let report = validate(&with_media(MediaSettings {
                font_size: Some(size),
                ..Default::default()
            }));
            assert!(
                report.errors.iter().any(|e| e.path == "media.fontSize"),
                "{size} accepted"
            );
        }
    }

    #[test]
    fn log_reaches_an_installed_subscriber() {
        let report = validate(&GifsmithConfig {
            discord: None,
            media: Some(MediaSettings {
                font_path: Some("/definitely/not/here.ttf".into()),
                frame_step: Some(0),
                ..Default::default()
            }),
            logging: None,
        });
        assert_eq!(report.warnings.len(), 2);

        let counter = LevelCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        tracing::subscriber::with_default(subscriber, || report.log());
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 2);
        assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ensure_valid_names_every_error() {
        let report = validate(&with_media(MediaSettings {
            frame_step: Some(0),
            worker_pool_size: Some(0),
            ..Default::default()
        }));
        let err = report.ensure_valid(Path::new("gifsmith.yaml")).unwrap_err().to_string();
        assert!(err.starts_with("invalid config at gifsmith.yaml"));
        assert!(err.contains("media.frameStep"));
        assert!(err.contains("media.workerPoolSize"));

        assert!(validate(&with_media(MediaSettings::default()))
            .ensure_valid(Path::new("gifsmith.yaml"))
            .is_ok());
    }

    #[test]
    fn missing_token_warns() {
        let report = validate(&GifsmithConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.path == "discord.token"));
    }
}
