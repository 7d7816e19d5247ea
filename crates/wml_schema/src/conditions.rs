//! If/ElseIf/Else chain tracking.
//!
//! Sibling conditions form a chain. The chain is reset by any sibling that is
//! neither a condition nor whitespace.

use wml_language::ConditionKind;

use crate::node::ConditionClause;

/// The state of a condition chain across one list of siblings.
#[derive(Clone, Debug, Default)]
pub struct ConditionChain {
    /// Clauses of the active chain, un-negated, in sibling order.
    active: Option<Vec<ConditionClause>>,
}

impl ConditionChain {
    /// Creates a chain with nothing active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the active chain.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Returns true if an `ElseIf` or `Else` may follow.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Advances over a condition sibling and returns the conditions its
    /// branch depends on.
    ///
    /// `own` is the sibling's clause (`None` for Else). Returns `None` if an
    /// `ElseIf` or `Else` has no active chain to follow.
    pub fn advance(
        &mut self,
        kind: ConditionKind,
        own: Option<ConditionClause>,
    ) -> Option<Vec<ConditionClause>> {
        match (kind, own) {
            (ConditionKind::If, Some(own)) => {
                self.active = Some(vec![own.clone()]);
                Some(vec![own])
            }
            (ConditionKind::ElseIf, Some(own)) => {
                let chain = self.active.as_mut()?;
                let mut conditions: Vec<_> = chain.iter().map(ConditionClause::negate).collect();
                conditions.push(own.clone());
                chain.push(own);
                Some(conditions)
            }
            (ConditionKind::Else, _) => {
                let chain = self.active.take()?;
                Some(chain.iter().map(ConditionClause::negate).collect())
            }
            (ConditionKind::If | ConditionKind::ElseIf, None) => None,
        }
    }
}
