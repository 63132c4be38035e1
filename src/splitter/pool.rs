//! Bounded pool of reusable tree-sitter parsers
//!
//! Parsers are created eagerly up to `initial_size` and lazily up to
//! `max_size`. A caller that finds every parser checked out blocks on a
//! condition variable until one is released (or its timeout elapses).
//! Releasing happens in the [`PooledParser`] guard's `Drop`, which resets the
//! parser before it becomes visible to the next caller.

use crate::error::PoolError;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tree_sitter::Parser;

/// Point-in-time view of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub created: usize,
    pub idle: usize,
    pub in_use: usize,
    pub max_size: usize,
}

struct PoolState {
    idle: Vec<Parser>,
    /// Parsers alive right now, idle or checked out
    created: usize,
    closed: bool,
}

pub struct ParserPool {
    state: Mutex<PoolState>,
    available: Condvar,
    max_size: usize,
}

fn poisoned<T>(err: PoisonError<T>) -> PoolError {
    PoolError::LockPoisoned(err.to_string())
}

impl ParserPool {
    /// Create a pool holding `initial_size` ready parsers (clamped to `max_size`)
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        let initial_size = initial_size.min(max_size);
        let idle: Vec<Parser> = (0..initial_size).map(|_| Parser::new()).collect();

        tracing::info!(
            "Parser pool ready: {} eager parser(s), max {}",
            initial_size,
            max_size
        );

        Self {
            state: Mutex::new(PoolState {
                idle,
                created: initial_size,
                closed: false,
            }),
            available: Condvar::new(),
            max_size,
        }
    }

    /// Check out a parser, waiting up to `timeout` (forever when `None`)
    pub fn acquire(&self, timeout: Option<Duration>) -> Result<PooledParser<'_>, PoolError> {
        let deadline = timeout.map(|limit| (limit, Instant::now() + limit));
        let mut state = self.state.lock().map_err(poisoned)?;

        loop {
            if state.closed {
                return Err(PoolError::Closed);
            }

            if let Some(parser) = state.idle.pop() {
                return Ok(PooledParser::new(self, parser));
            }

            if state.created < self.max_size {
                state.created += 1;
                tracing::debug!(
                    "Growing parser pool to {}/{}",
                    state.created,
                    self.max_size
                );
                drop(state);
                return Ok(PooledParser::new(self, Parser::new()));
            }

            state = match deadline {
                None => self.available.wait(state).map_err(poisoned)?,
                Some((limit, deadline)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        tracing::warn!("No parser released within {:?}", limit);
                        return Err(PoolError::Exhausted(limit));
                    }
                    let (guard, _) = self
                        .available
                        .wait_timeout(state, deadline - now)
                        .map_err(poisoned)?;
                    guard
                }
            };
        }
    }

    fn release(&self, mut parser: Parser) {
        if panic::catch_unwind(AssertUnwindSafe(|| parser.reset())).is_err() {
            tracing::warn!("Parser reset panicked; returning it to the pool anyway");
        }

        let mut state = self.lock_state();
        if state.closed {
            // Pool already destroyed: let this parser drop here
            state.created = state.created.saturating_sub(1);
            return;
        }
        state.idle.push(parser);
        drop(state);
        self.available.notify_one();
    }

    /// Drop every idle parser and refuse further acquisitions
    ///
    /// Parsers still checked out are dropped when their guards release them.
    /// Returns the number of parsers drained.
    pub fn destroy(&self) -> usize {
        let mut state = self.lock_state();
        if state.closed {
            tracing::warn!("Parser pool destroyed more than once");
            return 0;
        }
        state.closed = true;
        let drained = state.idle.len();
        state.idle.clear();
        state.created -= drained;
        let outstanding = state.created;
        drop(state);
        self.available.notify_all();

        tracing::info!(
            "Parser pool destroyed: {} parser(s) drained, {} still checked out",
            drained,
            outstanding
        );
        drained
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.lock_state();
        PoolStats {
            created: state.created,
            idle: state.idle.len(),
            in_use: state.created - state.idle.len(),
            max_size: self.max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // Release and bookkeeping must work even after a panic elsewhere poisoned the lock
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A parser checked out of a [`ParserPool`]; returned to the pool on drop
pub struct PooledParser<'p> {
    pool: &'p ParserPool,
    parser: Option<Parser>,
}

impl<'p> PooledParser<'p> {
    fn new(pool: &'p ParserPool, parser: Parser) -> Self {
        Self {
            pool,
            parser: Some(parser),
        }
    }
}

impl std::fmt::Debug for PooledParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledParser")
            .field("has_parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}

impl Deref for PooledParser<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        self.parser
            .as_ref()
            .expect("parser is present until the guard drops")
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        self.parser
            .as_mut()
            .expect("parser is present until the guard drops")
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        if let Some(parser) = self.parser.take() {
            self.pool.release(parser);
        }
    }
}
