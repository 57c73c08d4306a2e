//! Tracked surface resolution.

use backtop_platform::Host;

/// Candidates probed inside the active view, highest priority first:
/// the rendered preview, the live editor scroller, the generic content box.
pub const DEFAULT_SURFACE_CANDIDATES: [&str; 3] =
    [".markdown-preview-view", ".cm-scroller", ".view-content"];

/// Picks the scroll container whose position drives visibility
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSurfaceResolver {
    candidates: Vec<String>,
}

impl Default for ActiveSurfaceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_CANDIDATES)
    }
}

impl ActiveSurfaceResolver {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The first candidate in `view` that is rendered and can scroll.
    ///
    /// Only the first element matching each candidate selector is
    /// considered. `None` means there is nothing to track.
    pub fn resolve<H: Host>(&self, host: &H, view: Option<&H::Element>) -> Option<H::Element> {
        let view = view?;

        for selector in &self.candidates {
            let Some(element) = host.query(Some(view), selector) else {
                continue;
            };
            if !host.is_rendered(&element) {
                tracing::trace!("surface {} is not rendered", selector);
                continue;
            }
            match host.scroll_metrics(&element) {
                Ok(metrics) if metrics.can_scroll() => {
                    tracing::trace!("tracking surface {}", selector);
                    return Some(element);
                }
                Ok(_) => tracing::trace!("surface {} cannot scroll", selector),
                Err(err) => tracing::debug!("skipping surface {}: {}", selector, err),
            }
        }

        tracing::debug!("no scrollable surface in the active view");
        None
    }
}
