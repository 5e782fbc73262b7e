// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and resolution.
//!
//! Every setting is taken from the command line first, then from a
//! `URL2PDF_*` environment variable, then from a built-in default.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use url2pdf::RenderOptions;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// URL prefix the static directory is served under.
pub const STATIC_MOUNT: &str = "/static";

pub const ENV_ADDR: &str = "URL2PDF_ADDR";
pub const ENV_STATIC_DIR: &str = "URL2PDF_STATIC_DIR";
pub const ENV_ALLOWED_ORIGINS: &str = "URL2PDF_ALLOWED_ORIGINS";
pub const ENV_CHROME_PATH: &str = url2pdf::renderer::chromium::CHROME_PATH_ENV;
pub const ENV_RENDER_TIMEOUT: &str = "URL2PDF_RENDER_TIMEOUT_SECS";
pub const ENV_IMAGE_TIMEOUT: &str = "URL2PDF_IMAGE_TIMEOUT_SECS";
pub const ENV_MAX_SCROLL_STEPS: &str = "URL2PDF_MAX_SCROLL_STEPS";

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("at least one allowed origin is required")]
    NoOrigins,
}

/// Command-line overrides for `serve`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ServeArgs {
    /// Listen address (host:port). Env: URL2PDF_ADDR.
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// Directory PDFs are written to and served from. Env: URL2PDF_STATIC_DIR.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Origin allowed to call the API cross-origin. Can be repeated.
    /// Env: URL2PDF_ALLOWED_ORIGINS (comma-separated).
    #[arg(long = "allowed-origin")]
    pub allowed_origins: Vec<String>,

    /// Chrome/Chromium executable. Env: URL2PDF_CHROME_PATH.
    #[arg(long)]
    pub chrome_path: Option<PathBuf>,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Render tuning shared by `serve` and `render`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Upper bound for a whole render in seconds. Env: URL2PDF_RENDER_TIMEOUT_SECS.
    #[arg(long)]
    pub render_timeout_secs: Option<u64>,

    /// How long to wait for images in seconds. Env: URL2PDF_IMAGE_TIMEOUT_SECS.
    #[arg(long)]
    pub image_timeout_secs: Option<u64>,

    /// Maximum scroll steps while waiting for lazy content. Env: URL2PDF_MAX_SCROLL_STEPS.
    #[arg(long)]
    pub max_scroll_steps: Option<u32>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    pub allowed_origins: Vec<HeaderValue>,
    pub chrome_path: Option<PathBuf>,
    pub render: RenderOptions,
}

impl ServerConfig {
    /// Resolve against the process environment.
    pub fn resolve(args: &ServeArgs) -> Result<Self, ConfigError> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Resolve using `env` to look up environment variables.
    pub fn resolve_with(
        args: &ServeArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let addr = match pick(args.addr, &env, ENV_ADDR)? {
            Some(addr) => addr,
            None => parse(DEFAULT_ADDR, ENV_ADDR)?,
        };

        let static_dir = pick(args.static_dir.clone(), &env, ENV_STATIC_DIR)?
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let raw_origins: Vec<String> = if !args.allowed_origins.is_empty() {
            args.allowed_origins.clone()
        } else if let Some(list) = env(ENV_ALLOWED_ORIGINS) {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        } else {
            vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
        };
        let allowed_origins = parse_origins(&raw_origins)?;

        let chrome_path = pick(args.chrome_path.clone(), &env, ENV_CHROME_PATH)?;
        let render = resolve_render(&args.render, &env)?;

        Ok(Self {
            addr,
            static_dir,
            allowed_origins,
            chrome_path,
            render,
        })
    }
}

/// Build render options from flags and environment.
pub fn resolve_render(
    args: &RenderArgs,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<RenderOptions, ConfigError> {
    let mut options = RenderOptions::default();

    if let Some(secs) = pick(args.render_timeout_secs, env, ENV_RENDER_TIMEOUT)? {
        options.deadline = Duration::from_secs(nonzero(secs, ENV_RENDER_TIMEOUT)?);
    }
    if let Some(secs) = pick(args.image_timeout_secs, env, ENV_IMAGE_TIMEOUT)? {
        options.image_timeout = Duration::from_secs(secs);
    }
    if let Some(steps) = pick(args.max_scroll_steps, env, ENV_MAX_SCROLL_STEPS)? {
        options.max_scroll_steps = steps;
    }

    Ok(options)
}

fn parse_origins(raw: &[String]) -> Result<Vec<HeaderValue>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::NoOrigins);
    }
    raw.iter()
        .map(|origin| {
            if origin == "*" {
                return Err(ConfigError::Invalid {
                    key: ENV_ALLOWED_ORIGINS,
                    value: origin.clone(),
                    reason: "wildcard origins cannot be combined with credentials".to_string(),
                });
            }
            HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|e| ConfigError::Invalid {
                key: ENV_ALLOWED_ORIGINS,
                value: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn pick<T>(
    explicit: Option<T>,
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    if explicit.is_some() {
        return Ok(explicit);
    }
    match env(key) {
        Some(raw) if !raw.trim().is_empty() => parse(raw.trim(), key).map(Some),
        _ => Ok(None),
    }
}

fn parse<T>(raw: &str, key: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn nonzero(value: u64, key: &'static str) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve_with(&ServeArgs::default(), env_from(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.allowed_origins, vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)]);
        assert!(config.chrome_path.is_none());
        assert_eq!(config.render, RenderOptions::default());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = env_from(&[
            (ENV_ADDR, "0.0.0.0:9000"),
            (ENV_STATIC_DIR, "/var/lib/url2pdf"),
            (ENV_ALLOWED_ORIGINS, "https://a.example, https://b.example/,"),
            (ENV_RENDER_TIMEOUT, "30"),
            (ENV_MAX_SCROLL_STEPS, "7"),
        ]);
        let config = ServerConfig::resolve_with(&ServeArgs::default(), env).unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.static_dir, PathBuf::from("/var/lib/url2pdf"));
        assert_eq!(
            config.allowed_origins,
            vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("https://b.example"),
            ]
        );
        assert_eq!(config.render.deadline, Duration::from_secs(30));
        assert_eq!(config.render.max_scroll_steps, 7);
    }

    #[test]
    fn test_flags_override_env() {
        let args = ServeArgs {
            addr: Some("127.0.0.1:7000".parse().unwrap()),
            allowed_origins: vec!["https://app.example".to_string()],
            render: RenderArgs {
                image_timeout_secs: Some(3),
                ..RenderArgs::default()
            },
            ..ServeArgs::default()
        };
        let env = env_from(&[
            (ENV_ADDR, "0.0.0.0:9000"),
            (ENV_ALLOWED_ORIGINS, "https://other.example"),
            (ENV_IMAGE_TIMEOUT, "60"),
        ]);
        let config = ServerConfig::resolve_with(&args, env).unwrap();

        assert_eq!(config.addr.port(), 7000);
        assert_eq!(config.allowed_origins, vec![HeaderValue::from_static("https://app.example")]);
        assert_eq!(config.render.image_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = ServerConfig::resolve_with(
            &ServeArgs::default(),
            env_from(&[(ENV_MAX_SCROLL_STEPS, "lots")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_MAX_SCROLL_STEPS, .. }));

        let err = ServerConfig::resolve_with(
            &ServeArgs::default(),
            env_from(&[(ENV_RENDER_TIMEOUT, "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_RENDER_TIMEOUT, .. }));
    }

    #[test]
    fn test_wildcard_origin_rejected() {
        let err = ServerConfig::resolve_with(
            &ServeArgs::default(),
            env_from(&[(ENV_ALLOWED_ORIGINS, "*")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = ServerConfig::resolve_with(
            &ServeArgs::default(),
            env_from(&[(ENV_ALLOWED_ORIGINS, " , ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoOrigins));
    }
}
