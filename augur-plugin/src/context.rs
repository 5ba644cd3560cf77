//! Call context and reasoning chain

use augur_core::Value;
use serde::Serialize;

/// Single step recorded for external bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningStep {
    pub step_number: usize,
    pub stage: String,
    pub description: String,
    pub result: Value,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// Ordered record of the steps taken across calls
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReasoningChain {
    steps: Vec<ReasoningStep>,
}

impl ReasoningChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(
        &mut self,
        stage: impl Into<String>,
        description: impl Into<String>,
        result: Value,
        confidence: f64,
        evidence: Option<String>,
    ) -> &ReasoningStep {
        let step_number = self.steps.len() + 1;
        self.steps.push(ReasoningStep {
            step_number,
            stage: stage.into(),
            description: description.into(),
            result,
            confidence,
            evidence,
        });
        &self.steps[step_number - 1]
    }

    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_result(&self) -> Option<&Value> {
        self.steps.last().map(|s| &s.result)
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Render the chain as indented text
    pub fn summary(&self) -> String {
        let mut parts = vec!["Reasoning Chain Summary:".to_string()];
        for step in &self.steps {
            parts.push(format!("  Step {} ({}): {}", step.step_number, step.stage, step.description));
            parts.push(format!("    Result: {}", step.result));
            parts.push(format!("    Confidence: {:.2}", step.confidence));
            if let Some(ref evidence) = step.evidence {
                parts.push(format!("    Evidence: {}", evidence));
            }
        }
        parts.join("\n")
    }
}

/// Context passed to plugins
#[derive(Debug, Default)]
pub struct CallContext {
    pub tracing: bool,
    pub chain: ReasoningChain,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Append a step when tracing is enabled
    pub fn record_step(
        &mut self,
        stage: &str,
        description: String,
        result: Value,
        confidence: f64,
        evidence: Option<String>,
    ) {
        if self.tracing {
            self.chain.add_step(stage, description, result, confidence, evidence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_step_respects_tracing_flag() {
        let mut ctx = CallContext::new();
        ctx.record_step("stage", "ignored".to_string(), Value::Null, 0.0, None);
        assert!(ctx.chain.is_empty());

        let mut ctx = CallContext::new().with_tracing(true);
        ctx.record_step("stage", "kept".to_string(), Value::Number(13.0), 0.7, None);
        assert_eq!(ctx.chain.len(), 1);
        assert_eq!(ctx.chain.last_result(), Some(&Value::Number(13.0)));
    }

    #[test]
    fn test_step_numbers_are_sequential() {
        let mut chain = ReasoningChain::new();
        chain.add_step("a", "first", Value::Null, 0.0, None);
        let second = chain.add_step("b", "second", Value::Null, 0.5, Some("why".to_string()));
        assert_eq!(second.step_number, 2);
    }

    #[test]
    fn test_summary_lists_evidence() {
        let mut chain = ReasoningChain::new();
        chain.add_step("Pattern", "arithmetic", Value::Number(11.0), 0.95, Some("diff 3".to_string()));
        let summary = chain.summary();
        assert!(summary.contains("Step 1 (Pattern): arithmetic"));
        assert!(summary.contains("Confidence: 0.95"));
        assert!(summary.contains("Evidence: diff 3"));

        chain.clear();
        assert!(chain.is_empty());
    }
}
