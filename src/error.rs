use thiserror::Error;

/// Typed failures raised while loading data, building the model, or checking a plan.
///
/// Library functions return `anyhow::Result`; callers that need to branch on the
/// failure kind can recover it with `err.downcast_ref::<ZoneError>()`.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A malformed record in one of the input tables.
    #[error("[{source_name}] record {record}: {message}")]
    Parse { source_name: String, record: usize, message: String },

    /// A beat present in one input but absent from the other.
    #[error("missing data: {0}")]
    MissingData(String),

    /// An adjacency pair that only appears in one direction.
    #[error("asymmetric adjacency: '{a}' lists '{b}' but not the reverse")]
    AsymmetricAdjacency { a: String, b: String },

    /// A zone count outside `[1, n]`.
    #[error("invalid zone count {zones}: must be between 1 and the number of beats ({nodes})")]
    InvalidZoneCount { zones: usize, nodes: usize },

    /// A plan that violates one or more structural properties.
    #[error("invalid plan:\n  {}", .0.join("\n  "))]
    InvalidPlan(Vec<String>),
}

impl ZoneError {
    pub(crate) fn parse(source_name: &str, record: usize, message: impl Into<String>) -> Self {
        Self::Parse { source_name: source_name.to_string(), record, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_source_and_record() {
        let err = ZoneError::parse("workload", 3, "value 'abc' is not a number");
        assert_eq!(err.to_string(), "[workload] record 3: value 'abc' is not a number");
    }

    #[test]
    fn invalid_plan_lists_every_violation() {
        let err = ZoneError::InvalidPlan(vec!["zone 0 is empty".into(), "zone 1 is not contiguous".into()]);
        let text = err.to_string();
        assert!(text.contains("zone 0 is empty"));
        assert!(text.contains("zone 1 is not contiguous"));
    }

    #[test]
    fn typed_error_survives_anyhow_context() {
        use anyhow::Context;
        let result: anyhow::Result<()> = Err(ZoneError::MissingData("beat 'A'".into()))
            .context("[map::read] loading inputs");
        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<ZoneError>(), Some(ZoneError::MissingData(_))));
    }
}
