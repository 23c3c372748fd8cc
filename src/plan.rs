use crate::error::{PipelineError, Result};
use std::path::Path;

/// Upper bound ffmpeg's `acrossfade` accepts for `d`.
pub const MAX_CROSSFADE_SECONDS: f64 = 60.0;

/// How many copies of a source are needed to cover a target duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPlan {
    pub base_duration: f64,
    pub target_duration: f64,
    /// Overlap between neighbouring copies; `None` for hard-cut video loops.
    pub crossfade_seconds: Option<f64>,
    pub loop_count: usize,
}

fn check_target(target_seconds: f64) -> Result<()> {
    if !target_seconds.is_finite() || target_seconds < 0.0 {
        return Err(PipelineError::InvalidTargetDuration {
            target: target_seconds,
        });
    }
    Ok(())
}

/// `acrossfade` treats `d=0` as unset and falls back to its sample-count
/// default, so only strictly positive overlaps up to the filter cap are usable.
pub fn check_crossfade(crossfade_seconds: f64) -> Result<()> {
    if !crossfade_seconds.is_finite()
        || crossfade_seconds <= 0.0
        || crossfade_seconds > MAX_CROSSFADE_SECONDS
    {
        return Err(PipelineError::InvalidCrossfade {
            crossfade: crossfade_seconds,
        });
    }
    Ok(())
}

fn check_base(source: &Path, base_duration: f64) -> Result<()> {
    if !base_duration.is_finite() || base_duration <= 0.0 {
        return Err(PipelineError::InvalidSourceDuration {
            path: source.to_path_buf(),
            duration: base_duration,
        });
    }
    Ok(())
}

impl LoopPlan {
    /// Hard-cut repetition: `ceil(target / base)` copies, never fewer than one.
    pub fn for_video(source: &Path, base_duration: f64, target_seconds: f64) -> Result<Self> {
        check_base(source, base_duration)?;
        check_target(target_seconds)?;

        let loop_count = if target_seconds <= base_duration {
            1
        } else {
            (target_seconds / base_duration).ceil() as usize
        };

        Ok(Self {
            base_duration,
            target_duration: target_seconds,
            crossfade_seconds: None,
            loop_count,
        })
    }

    /// Crossfaded repetition. Every seam eats `crossfade` seconds from both
    /// neighbours, so one extra copy is added on top of
    /// `ceil(target / (base - crossfade))`.
    pub fn for_audio(
        source: &Path,
        base_duration: f64,
        target_seconds: f64,
        crossfade_seconds: f64,
    ) -> Result<Self> {
        check_base(source, base_duration)?;
        check_target(target_seconds)?;
        check_crossfade(crossfade_seconds)?;

        if target_seconds <= base_duration {
            return Ok(Self {
                base_duration,
                target_duration: target_seconds,
                crossfade_seconds: None,
                loop_count: 1,
            });
        }

        let effective_unit = base_duration - crossfade_seconds;
        if effective_unit <= 0.0 {
            return Err(PipelineError::CrossfadeExceedsDuration {
                path: source.to_path_buf(),
                crossfade: crossfade_seconds,
                duration: base_duration,
            });
        }

        Ok(Self {
            base_duration,
            target_duration: target_seconds,
            crossfade_seconds: Some(crossfade_seconds),
            loop_count: (target_seconds / effective_unit).ceil() as usize + 1,
        })
    }

    /// The target fits inside one copy of the source, so no repetition is built.
    pub fn is_trim_only(&self) -> bool {
        self.target_duration <= self.base_duration
    }

    /// Seconds of new material each additional copy contributes.
    pub fn effective_unit(&self) -> f64 {
        self.base_duration - self.crossfade_seconds.unwrap_or(0.0)
    }

    pub fn crossfade_stages(&self) -> usize {
        match self.crossfade_seconds {
            Some(_) => self.loop_count.saturating_sub(1),
            None => 0,
        }
    }

    /// Length of the repeated material before the final trim.
    pub fn untrimmed_duration(&self) -> f64 {
        let copies = self.loop_count as f64;
        match self.crossfade_seconds {
            Some(cf) => copies * self.base_duration - (copies - 1.0) * cf,
            None => copies * self.base_duration,
        }
    }
}

pub fn hours_to_seconds(hours: u32) -> f64 {
    hours as f64 * 3600.0
}
