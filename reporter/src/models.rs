use std::fmt;

/// What happened to one report step.
///
/// Steps never propagate errors to the caller. A missing input is `Skipped`,
/// anything that broke mid-step is `Failed` with the message that was logged,
/// and the run as a whole carries on either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Produced,
    Skipped(String),
    Failed(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Produced => write!(f, "produced"),
            StepOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            StepOutcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}
