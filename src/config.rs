use serde::{Deserialize, Serialize};

/// Tunables of the analysis pipeline and chart layout.
///
/// Figure sizes are in inches, like matplotlib's `figsize`; the UI converts
/// them with [`AnalysisConfig::POINTS_PER_INCH`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows shown in the head-of-table preview.
    pub preview_rows: usize,
    /// Bin count of the column histogram and pairplot diagonals.
    pub histogram_bins: usize,
    /// Evaluation points of the KDE overlay.
    pub kde_points: usize,
    /// |z| above this counts as an outlier.
    pub zscore_threshold: f64,
    pub heatmap_size: [f32; 2],
    pub column_chart_size: [f32; 2],
    /// Rotation of count-plot category labels, in degrees.
    pub label_rotation_deg: f32,
}

impl AnalysisConfig {
    pub const POINTS_PER_INCH: f32 = 72.0;
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 20,
            kde_points: 200,
            zscore_threshold: 3.0,
            heatmap_size: [8.0, 6.0],
            column_chart_size: [8.0, 5.0],
            label_rotation_deg: 45.0,
        }
    }
}
