// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page settle heuristics.
//!
//! Lazy-loading pages append content as the viewport moves, so the page is
//! scrolled in fixed steps until `document.body.scrollHeight` stops
//! changing. Images are then polled until each one reports a decoded,
//! non-empty bitmap.

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::RenderContext;
use crate::error::{Error, Result};
use crate::types::RenderOptions;

/// Total scrollable height of the document.
pub const HEIGHT_SCRIPT: &str = "document.body.scrollHeight";

/// True once every `<img>` has finished loading with a real bitmap.
pub const IMAGES_READY_SCRIPT: &str = "Array.from(document.images).every(function (img) { \
     return img.complete && (typeof img.naturalWidth == 'undefined' || img.naturalWidth > 0); \
     })";

/// Script scrolling the viewport down by `step_px`.
pub fn scroll_script(step_px: u32) -> String {
    format!("window.scrollBy(0, {step_px}); window.scrollY")
}

/// How the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Height did not change after the last step.
    Stable { steps: u32, height: u64 },
    /// Step budget used up while the page was still growing.
    Exhausted { steps: u32, height: u64 },
}

/// How the image wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageReadiness {
    Ready { polls: u32 },
    TimedOut { polls: u32 },
}

/// Scroll until the document height stabilises or the step budget runs out.
pub async fn scroll_until_stable(
    ctx: &dyn RenderContext,
    options: &RenderOptions,
) -> Result<SettleOutcome> {
    let scroll = scroll_script(options.scroll_step_px);
    let mut last_height = document_height(ctx).await?;

    for step in 1..=options.max_scroll_steps {
        ctx.execute_js(&scroll).await?;
        sleep(options.scroll_pause).await;

        let height = document_height(ctx).await?;
        if height == last_height {
            debug!(steps = step, height, "page height settled");
            return Ok(SettleOutcome::Stable {
                steps: step,
                height,
            });
        }
        last_height = height;
    }

    warn!(
        steps = options.max_scroll_steps,
        height = last_height,
        "page still growing after scroll budget, printing what has loaded"
    );
    Ok(SettleOutcome::Exhausted {
        steps: options.max_scroll_steps,
        height: last_height,
    })
}

/// Poll image readiness until all images load or the timeout elapses.
///
/// A timeout is not an error: the page is printed with whatever loaded.
pub async fn wait_for_images(
    ctx: &dyn RenderContext,
    options: &RenderOptions,
) -> Result<ImageReadiness> {
    let deadline = Instant::now() + options.image_timeout;
    let mut polls = 0;

    loop {
        polls += 1;
        if ctx.execute_js(IMAGES_READY_SCRIPT).await?.as_bool() == Some(true) {
            return Ok(ImageReadiness::Ready { polls });
        }
        if Instant::now() + options.image_poll_interval > deadline {
            warn!(
                polls,
                timeout_ms = options.image_timeout.as_millis() as u64,
                "some images may not have loaded, proceeding"
            );
            return Ok(ImageReadiness::TimedOut { polls });
        }
        sleep(options.image_poll_interval).await;
    }
}

async fn document_height(ctx: &dyn RenderContext) -> Result<u64> {
    let value = ctx.execute_js(HEIGHT_SCRIPT).await?;
    parse_height(&value)
}

fn parse_height(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .ok_or_else(|| Error::Render(format!("negative document height: {n}"))),
        // Pages with no <body> yet report null.
        Value::Null => Ok(0),
        other => Err(Error::Render(format!(
            "unexpected document height value: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height(&json!(1200)).unwrap(), 1200);
        assert_eq!(parse_height(&json!(1200.6)).unwrap(), 1201);
        assert_eq!(parse_height(&Value::Null).unwrap(), 0);
        assert!(parse_height(&json!(-1)).is_err());
        assert!(parse_height(&json!("tall")).is_err());
    }

    #[test]
    fn test_scroll_script_uses_step() {
        assert_eq!(scroll_script(750), "window.scrollBy(0, 750); window.scrollY");
    }
}
