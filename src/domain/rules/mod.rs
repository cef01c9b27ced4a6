// Domain rules - Expected output duration

use crate::domain::model::*;

/// What the resolver needs to know about one registered input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputExtent {
    pub trim: Trim,
    /// Full length of the source before any trim
    pub total: TimeSpec,
}

impl InputExtent {
    pub fn new(trim: Trim, total: TimeSpec) -> Self {
        Self { trim, total }
    }

    /// Length this input contributes after its own trim
    pub fn effective_length(&self) -> TimeSpec {
        if let Some(duration) = self.trim.duration {
            return duration;
        }
        let start = self.trim.start.unwrap_or(TimeSpec::ZERO);
        match self.trim.stop {
            Some(stop) => stop - start,
            None => self.total - start,
        }
    }
}

/// Computes how long the output of a job is expected to be. The value is
/// the denominator for progress percentages.
pub struct DurationResolver;

impl DurationResolver {
    /// Resolve the expected output duration.
    ///
    /// Priority: explicit output duration, then output `stop - start`, then
    /// the longest input minus the output start. The result is never
    /// negative.
    pub fn resolve<I>(output: &Trim, inputs: I) -> TimeSpec
    where
        I: IntoIterator<Item = InputExtent>,
    {
        let resolved = if let Some(duration) = output.duration {
            duration
        } else if let Some(stop) = output.stop {
            stop - output.start.unwrap_or(TimeSpec::ZERO)
        } else {
            let longest = Self::longest_input(inputs);
            match output.start {
                Some(start) if start > longest => TimeSpec::ZERO,
                Some(start) => longest - start,
                None => longest,
            }
        };

        resolved.clamp_non_negative()
    }

    /// Maximum effective length across inputs, zero when there are none
    pub fn longest_input<I>(inputs: I) -> TimeSpec
    where
        I: IntoIterator<Item = InputExtent>,
    {
        inputs
            .into_iter()
            .map(|input| input.effective_length())
            .max()
            .unwrap_or(TimeSpec::ZERO)
    }
}

#[cfg(test)]
mod tests;
