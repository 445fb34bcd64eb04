use serde::Serialize;

/// Line height used until the first successful layout measurement.
pub const DEFAULT_LINE_HEIGHT_PX: f64 = 20.0;

/// Layout metrics read from the raw-text editor's computed style.
///
/// Either value may be missing or unparsable (e.g. a `normal` line height).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutMetrics {
    pub line_height_px: Option<f64>,
    pub padding_left_px: Option<f64>,
}

/// Visible line window plus the metrics needed to place overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub visible_start_line: usize,
    pub visible_end_line: usize,
    pub line_height_px: f64,
    pub left_padding_px: f64,
    pub scroll_top_px: f64,
}

impl ViewportState {
    /// Vertical offset of `line` relative to the top of the viewport.
    pub fn line_top(&self, line: usize) -> f64 {
        line as f64 * self.line_height_px - self.scroll_top_px
    }

    /// Whether lines `start..=end` lie entirely outside the window.
    pub fn is_outside(&self, start: usize, end: usize) -> bool {
        end < self.visible_start_line || start > self.visible_end_line
    }
}

/// Tracks scroll position and line metrics for one view.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    line_height: f64,
    padding_left: f64,
    measured: bool,
    scroll_top: f64,
    client_height: Option<f64>,
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::with_default_line_height(DEFAULT_LINE_HEIGHT_PX)
    }
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker that assumes `line_height` until measured.
    pub fn with_default_line_height(line_height: f64) -> Self {
        let line_height = if valid_length(line_height) {
            line_height
        } else {
            DEFAULT_LINE_HEIGHT_PX
        };
        Self {
            line_height,
            padding_left: 0.0,
            measured: false,
            scroll_top: 0.0,
            client_height: None,
        }
    }

    /// Applies live layout metrics.
    ///
    /// An unusable line height keeps the previous value, which is the
    /// default only until a real measurement has succeeded. Padding falls
    /// back to zero.
    pub fn measure(&mut self, metrics: LayoutMetrics) {
        match metrics.line_height_px.filter(|h| valid_length(*h)) {
            Some(height) => {
                self.line_height = height;
                self.measured = true;
            }
            None => log::debug!(
                "line height unavailable, keeping {}px (measured: {})",
                self.line_height,
                self.measured
            ),
        }
        self.padding_left = metrics
            .padding_left_px
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0);
    }

    /// Records the current scroll offset and client height.
    pub fn scroll(&mut self, scroll_top: f64, client_height: f64) {
        self.scroll_top = if scroll_top.is_finite() {
            scroll_top.max(0.0)
        } else {
            0.0
        };
        self.client_height = client_height.is_finite().then_some(client_height.max(0.0));
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn padding_left(&self) -> f64 {
        self.padding_left
    }

    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// First and last visible line, `None` before the client height is known.
    pub fn visible_lines(&self) -> Option<(usize, usize)> {
        let height = self.client_height?;
        let start = (self.scroll_top / self.line_height).floor() as usize;
        let end = ((self.scroll_top + height) / self.line_height).ceil() as usize;
        Some((start, end))
    }

    pub fn state(&self) -> Option<ViewportState> {
        let (visible_start_line, visible_end_line) = self.visible_lines()?;
        Some(ViewportState {
            visible_start_line,
            visible_end_line,
            line_height_px: self.line_height,
            left_padding_px: self.padding_left,
            scroll_top_px: self.scroll_top,
        })
    }

    /// Line under vertical offset `y`, measured from the viewport top.
    pub fn line_at(&self, y: f64) -> usize {
        ((y + self.scroll_top) / self.line_height).floor().max(0.0) as usize
    }
}

fn valid_length(px: f64) -> bool {
    px.is_finite() && px > 0.0
}
