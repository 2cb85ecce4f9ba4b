//! Logging and debugging facilities for Arbor.
//!
//! This module provides:
//! - Target names for the `tracing` instrumentation used across the crates
//! - Formatting options for text renderings of trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Arbor uses the `tracing` crate for instrumentation. To see logs, install a
//! subscriber in your application:
//!
//! ```ignore
//! // with tracing-subscriber's `env-filter` feature
//! tracing_subscriber::fmt()
//!     .with_env_filter("arbor::model=debug,arbor::select=trace")
//!     .init();
//! ```

use serde::{Deserialize, Serialize};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "arbor_core::signal";
    /// Path pattern parsing and compilation.
    pub const PATTERN: &str = "arbor::pattern";
    /// Hierarchy traversal and selection.
    pub const SELECT: &str = "arbor::select";
    /// Backing store operations.
    pub const STORE: &str = "arbor::store";
    /// Tree model building and mutation.
    pub const MODEL: &str = "arbor::model";
    /// Configuration loading.
    pub const CONFIG: &str = "arbor::config";
    /// Performance spans.
    pub const PERF: &str = "arbor::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

/// Configuration for tree text output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show the value column next to each key.
    pub show_values: bool,
    /// Maximum depth to render (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_values: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output: keys only, ASCII branches.
    pub fn minimal() -> Self {
        Self {
            style: TreeStyle::Ascii,
            show_values: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a line at `depth` (1-based; depth 0 gets
    /// no prefix).
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of operations such as tree rebuilds.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
