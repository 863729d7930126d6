use serde::Serialize;

/// The side channel that failed after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Degradation {
    Notify,
}

/// Result of a mutating operation.
///
/// `Failed` means nothing was written and no downstream effect ran.
/// `SucceededDegraded` means the write stands but a best-effort notification did not
/// go out. `id` is carried by operations that create a new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Succeeded {
        id: Option<i32>,
    },
    SucceededDegraded {
        id: Option<i32>,
        degraded: Degradation,
    },
    Failed {
        error: Option<String>,
    },
}

impl MutationOutcome {
    pub fn succeeded() -> Self {
        MutationOutcome::Succeeded { id: None }
    }

    pub fn created(id: i32) -> Self {
        MutationOutcome::Succeeded { id: Some(id) }
    }

    pub fn failed() -> Self {
        MutationOutcome::Failed { error: None }
    }

    pub fn failed_with(error: impl Into<String>) -> Self {
        MutationOutcome::Failed {
            error: Some(error.into()),
        }
    }

    /// Downgrades a success whose notification failed. Failures stay failures.
    pub fn degrade(self, degraded: Degradation) -> Self {
        match self {
            MutationOutcome::Succeeded { id } => MutationOutcome::SucceededDegraded { id, degraded },
            other => other,
        }
    }
}

/// Wire shape of [`MutationOutcome`]: `{ok, id?, degraded?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        match outcome {
            MutationOutcome::Succeeded { id } => Self {
                ok: true,
                id,
                degraded: None,
                error: None,
            },
            MutationOutcome::SucceededDegraded { id, degraded } => Self {
                ok: true,
                id,
                degraded: Some(degraded),
                error: None,
            },
            MutationOutcome::Failed { error } => Self {
                ok: false,
                id: None,
                degraded: None,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(outcome: MutationOutcome) -> serde_json::Value {
        serde_json::to_value(MutationResponse::from(outcome)).unwrap()
    }

    #[test]
    fn wire_shapes_match_the_result_table() {
        assert_eq!(wire(MutationOutcome::created(7)), json!({"ok": true, "id": 7}));
        assert_eq!(
            wire(MutationOutcome::created(7).degrade(Degradation::Notify)),
            json!({"ok": true, "id": 7, "degraded": "notify"})
        );
        assert_eq!(wire(MutationOutcome::succeeded()), json!({"ok": true}));
        assert_eq!(
            wire(MutationOutcome::succeeded().degrade(Degradation::Notify)),
            json!({"ok": true, "degraded": "notify"})
        );
        assert_eq!(wire(MutationOutcome::failed()), json!({"ok": false}));
        assert_eq!(
            wire(MutationOutcome::failed_with("node 3 not found")),
            json!({"ok": false, "error": "node 3 not found"})
        );
    }

    #[test]
    fn failures_are_never_degraded() {
        assert_eq!(
            MutationOutcome::failed().degrade(Degradation::Notify),
            MutationOutcome::failed()
        );
    }
}
