//! Scripted backends for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{ClassificationBackend, CriterionContext, ProviderError, Verdict};
use crate::models::{Confidence, Severity};

enum Behavior {
    Respond(Verdict),
    FailAlways,
    /// Fail only for remarks containing the marker.
    FailWhen(&'static str, Verdict),
    Hang(Duration),
}

pub(crate) struct FixedBackend {
    id: String,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FixedBackend {
    pub fn new(id: &str, severity: Severity, confidence: Confidence) -> Self {
        Self::with_behavior(
            id,
            Behavior::Respond(Verdict {
                severity,
                confidence,
                rationale: None,
            }),
        )
    }

    pub fn with_rationale(id: &str, severity: Severity, rationale: &str) -> Self {
        Self::with_behavior(
            id,
            Behavior::Respond(Verdict {
                severity,
                confidence: Confidence::High,
                rationale: Some(rationale.to_string()),
            }),
        )
    }

    pub fn failing(id: &str) -> Self {
        Self::with_behavior(id, Behavior::FailAlways)
    }

    pub fn failing_when(id: &str, marker: &'static str, severity: Severity) -> Self {
        Self::with_behavior(
            id,
            Behavior::FailWhen(
                marker,
                Verdict {
                    severity,
                    confidence: Confidence::Medium,
                    rationale: None,
                },
            ),
        )
    }

    pub fn hanging(id: &str, delay: Duration) -> Self {
        Self::with_behavior(id, Behavior::Hang(delay))
    }

    fn with_behavior(id: &str, behavior: Behavior) -> Self {
        Self {
            id: id.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationBackend for FixedBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        "fixed"
    }

    async fn classify(
        &self,
        remarks: &str,
        _context: &CriterionContext<'_>,
    ) -> Result<Verdict, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Respond(verdict) => Ok(verdict.clone()),
            Behavior::FailAlways => Err(ProviderError::Api {
                status: 503,
                body: "unavailable".to_string(),
            }),
            Behavior::FailWhen(marker, verdict) => {
                if remarks.contains(marker) {
                    Err(ProviderError::MalformedResponse("garbled".to_string()))
                } else {
                    Ok(verdict.clone())
                }
            }
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Err(ProviderError::Http("hung".to_string()))
            }
        }
    }
}
