use std::future::Future;
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, Query};
use sea_orm::{ConnectionTrait, DbErr, SqlErr};

use crate::errors::InternalError;
use crate::errors::internal::{ConflictError, DatabaseError};
use crate::types::internal::CodePrefix;

/// Candidates tried per generated code before giving up
pub const MAX_ATTEMPTS: u32 = 10;

/// Six-digit suffixes; 900,000 codes per prefix
pub const SUFFIX_RANGE: RangeInclusive<u32> = 100_000..=999_999;

/// Source of code suffixes
pub trait SuffixSampler: Send + Sync {
    /// A suffix inside `SUFFIX_RANGE`
    fn sample(&self) -> u32;
}

/// Uniform sampling from the thread-local RNG
#[derive(Debug, Default)]
pub struct RandomSampler;

impl SuffixSampler for RandomSampler {
    fn sample(&self) -> u32 {
        rand::rng().random_range(SUFFIX_RANGE)
    }
}

/// Collision-checked business codes of the form `PREFIX-NNNNNN`
///
/// Generation checks the target column and returns the first unused
/// candidate. The check narrows collisions but cannot close the window
/// before the insert, so the column's unique constraint stays authoritative
/// and inserts go through `retry_on_code_collision`.
#[derive(Clone)]
pub struct CodeGenerator {
    sampler: Arc<dyn SuffixSampler>,
}

impl CodeGenerator {
    pub fn new(sampler: Arc<dyn SuffixSampler>) -> Self {
        Self { sampler }
    }

    pub fn random() -> Self {
        Self::new(Arc::new(RandomSampler))
    }

    fn candidate(&self, prefix: CodePrefix) -> String {
        prefix.format(self.sampler.sample())
    }

    /// Generate a code unused in the prefix's target column
    ///
    /// # Returns
    /// * `Ok(code)` - First candidate not present in the table
    /// * `Err(ConflictError::CodeSpaceExhausted)` - `MAX_ATTEMPTS` candidates were taken
    pub async fn generate(
        &self,
        conn: &impl ConnectionTrait,
        prefix: CodePrefix,
    ) -> Result<String, InternalError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let code = self.candidate(prefix);
            if !Self::exists(conn, prefix, &code).await? {
                tracing::debug!("Generated {} on attempt {}", code, attempt);
                return Ok(code);
            }
            tracing::debug!("Code {} already taken (attempt {})", code, attempt);
        }

        tracing::error!(
            "Exhausted {} attempts generating a {} code",
            MAX_ATTEMPTS,
            prefix
        );
        Err(ConflictError::CodeSpaceExhausted {
            prefix: prefix.as_str().to_string(),
            attempts: MAX_ATTEMPTS,
        }
        .into())
    }

    async fn exists(
        conn: &impl ConnectionTrait,
        prefix: CodePrefix,
        code: &str,
    ) -> Result<bool, InternalError> {
        let (table, column) = prefix.target();
        let select = Query::select()
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("total"))
            .from(Alias::new(table))
            .and_where(Expr::col(Alias::new(column)).eq(code))
            .to_owned();

        let row = conn
            .query_one(conn.get_database_backend().build(&select))
            .await
            .map_err(|e| InternalError::database("code_exists", e))?;

        let total = match row {
            Some(row) => row
                .try_get::<i64>("", "total")
                .map_err(|e| InternalError::database("code_exists", e))?,
            None => 0,
        };
        Ok(total > 0)
    }
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator").finish_non_exhaustive()
    }
}

fn is_unique_violation(source: &DbErr) -> bool {
    matches!(source.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Whether an insert failed because a unique constraint was hit
///
/// Any unique violation counts, not only one on the code column. A user
/// insert that loses an email race is retried too; the next attempt's
/// duplicate email check then fails it with `DuplicateEmail`.
pub fn is_code_collision(err: &InternalError) -> bool {
    match err {
        InternalError::Database(DatabaseError::Operation { source, .. })
        | InternalError::Database(DatabaseError::TransactionCommit { source }) => {
            is_unique_violation(source)
        }
        _ => false,
    }
}

/// Run a code-allocating write, retrying when the insert loses a race
///
/// Each attempt should open its own transaction so a failed attempt rolls
/// back completely before the next one samples a new code.
pub async fn retry_on_code_collision<T, F, Fut>(
    prefix: CodePrefix,
    mut attempt: F,
) -> Result<T, InternalError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InternalError>>,
{
    for n in 1..=MAX_ATTEMPTS {
        match attempt().await {
            Err(err) if is_code_collision(&err) => {
                tracing::warn!("{} code collided on insert (attempt {}): {}", prefix, n, err);
            }
            other => return other,
        }
    }

    Err(ConflictError::CodeSpaceExhausted {
        prefix: prefix.as_str().to_string(),
        attempts: MAX_ATTEMPTS,
    }
    .into())
}
