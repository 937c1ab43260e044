use crate::error::AllocationError;
use snip_core::{ReadRepository, ShortCode};
use snip_generator::Generator;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Default number of candidates drawn before giving up.
pub const MAX_ATTEMPTS: u32 = 10;

/// Bounds how hard the allocator tries to find a free code.
///
/// With 62^6 codes a draw collides only when the table is enormous, so a
/// small fixed bound replaces unbounded loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct AllocationPolicy {
    #[builder(default = MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Remaining draws for one creation request.
///
/// A budget is shared by the existence pre-checks and by insert-time
/// collisions, so one request never draws more than `max_attempts`
/// candidates in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    max: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { max, used: 0 }
    }

    /// Consumes one attempt; `false` once the budget is spent.
    pub fn try_take(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.used
    }
}

/// Hands out short codes that were free in storage when checked.
///
/// The existence check is advisory: another writer may claim the same code
/// before our insert lands. The storage unique constraint is what actually
/// guarantees uniqueness, and callers must regenerate on
/// [`InsertOutcome::CodeCollision`](snip_core::InsertOutcome::CodeCollision).
#[derive(Debug)]
pub struct CodeAllocator<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    policy: AllocationPolicy,
}

impl<R, G> Clone for CodeAllocator<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            policy: self.policy,
        }
    }
}

impl<R: ReadRepository, G: Generator> CodeAllocator<R, G> {
    pub fn new(repository: Arc<R>, generator: Arc<G>, policy: AllocationPolicy) -> Self {
        Self {
            repository,
            generator,
            policy,
        }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// A fresh budget for one creation request.
    pub fn budget(&self) -> AttemptBudget {
        AttemptBudget::new(self.policy.max_attempts)
    }

    /// Draws candidates until one is free, using a fresh budget.
    pub async fn allocate(&self) -> Result<ShortCode, AllocationError> {
        let mut budget = self.budget();
        self.allocate_within(&mut budget).await
    }

    /// Draws candidates until one is free, charging each draw to `budget`.
    ///
    /// Storage errors are returned as-is; they are not retried.
    pub async fn allocate_within(
        &self,
        budget: &mut AttemptBudget,
    ) -> Result<ShortCode, AllocationError> {
        while budget.try_take() {
            let code: ShortCode = self.generator.generate().into();

            if !self.repository.exists_by_short_code(&code).await? {
                trace!(code = %code, attempt = budget.used(), "allocated short code");
                return Ok(code);
            }

            debug!(code = %code, attempt = budget.used(), "candidate short code already taken");
        }

        warn!(attempts = budget.used(), "short code generation exhausted");
        Err(AllocationError::Exhausted {
            attempts: budget.used(),
        })
    }
}
