use std::sync::Arc;

use parking_lot::RwLock;

use crate::command::Command;
use crate::engine::{Engine, QueryResult};
use crate::error::{Error, Result};
use crate::parser::parse;
use crate::tokenizer::tokenize;

/// A cloneable handle to one [Engine] shared between threads.
///
/// Row map and index updates are not atomic across the two structures, so
/// every mutating statement takes the write lock. `SELECT`s only take the read
/// lock and may run concurrently with each other.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<RwLock<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Tokenizes and parses outside the lock, then runs the command under the
    /// read lock (`SELECT`) or the write lock (everything else).
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let command = tokenize(sql).map_err(Error::from).and_then(parse)?;

        match command {
            Command::Select(select) => self.inner.read().query(&select),
            command => self.inner.write().run(command),
        }
    }

    /// Runs `f` with shared access to the engine.
    pub fn read<T>(&self, f: impl FnOnce(&Engine) -> T) -> T {
        f(&*self.inner.read())
    }
}
