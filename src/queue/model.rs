use serde::{Deserialize, Serialize};

use crate::merge::MergePolicy;
use crate::tokens::{ColorToken, FontToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueState {
    #[default]
    Empty,
    Pending,
}

/// A kit write that could not reach the host yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJob {
    #[serde(default)]
    pub colors_norm: Vec<ColorToken>,
    #[serde(default)]
    pub fonts_norm: Vec<FontToken>,
    #[serde(default)]
    pub mode: MergePolicy,
}

impl PendingJob {
    pub fn new(colors: Vec<ColorToken>, fonts: Vec<FontToken>, mode: MergePolicy) -> Self {
        Self {
            colors_norm: colors,
            fonts_norm: fonts,
            mode,
        }
    }
}
