//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Colors for each kind of line kubeboot prints. Plain until [`Styles::colorize`].
#[derive(Default, Clone)]
pub struct Styles {
    /// Applied steps and finished commands (green)
    pub success: Style,
    /// Failed steps (red)
    pub error: Style,
    /// Step in progress (cyan)
    pub step: Style,
    /// Secondary detail
    pub dim: Style,
    /// Section titles
    pub header: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.error = Style::new().red();
        self.step = Style::new().cyan();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
