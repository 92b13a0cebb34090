//! Parallel fetch coordinator
//!
//! Runs a named set of independent reads concurrently and hands back every
//! result by name, or the first error to arrive. Views usually need a few
//! unrelated pieces of data (a record and the records that reference it,
//! the option lists of a form); this keeps those lookups off the critical
//! path of one another.

use std::any::{type_name, Any};
use std::collections::HashSet;
use std::future::Future;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use indexmap::IndexMap;

use crate::error::{AppError, AppResult};

type Boxed = Box<dyn Any + Send>;

/// Builder for one concurrent batch of named reads
#[derive(Default)]
pub struct ParallelFetch<'a> {
    fetches: Vec<(&'static str, BoxFuture<'a, AppResult<Boxed>>)>,
}

impl<'a> ParallelFetch<'a> {
    pub fn new() -> Self {
        Self { fetches: Vec::new() }
    }

    /// Register a read under `name`. Nothing runs until [`run`](Self::run).
    pub fn add<T, F>(mut self, name: &'static str, fetch: F) -> Self
    where
        T: Send + 'static,
        F: Future<Output = AppResult<T>> + Send + 'a,
    {
        let fetch = async move { fetch.await.map(|value| Box::new(value) as Boxed) }.boxed();
        self.fetches.push((name, fetch));
        self
    }

    /// Launch every registered read and wait for all of them.
    ///
    /// The first failure wins and the remaining reads are dropped; no
    /// partial result is returned. `None` results are successes.
    pub async fn run(self) -> AppResult<Fetched> {
        let mut names = HashSet::with_capacity(self.fetches.len());
        for (name, _) in &self.fetches {
            if !names.insert(*name) {
                return Err(AppError::Internal(format!("Duplicate fetch name: {}", name)));
            }
        }

        let results = try_join_all(self.fetches.into_iter().map(|(name, fetch)| async move {
            tracing::debug!(fetch = name, "Fetch started");
            match fetch.await {
                Ok(value) => Ok((name, value)),
                Err(e) => {
                    tracing::debug!(fetch = name, error = %e, "Fetch failed");
                    Err(e)
                }
            }
        }))
        .await?;

        Ok(Fetched {
            entries: results.into_iter().collect(),
        })
    }
}

/// Results of a successful [`ParallelFetch`], keyed by name
pub struct Fetched {
    entries: IndexMap<&'static str, Boxed>,
}

impl Fetched {
    /// Move a result out by name, checking its type
    pub fn take<T: Any>(&mut self, name: &str) -> AppResult<T> {
        let value = self
            .entries
            .shift_remove(name)
            .ok_or_else(|| AppError::Internal(format!("No fetch named {}", name)))?;

        value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            AppError::Internal(format!("Fetch {} is not a {}", name, type_name::<T>()))
        })
    }
}
