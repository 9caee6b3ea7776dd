//! The boundary to a concrete store. The engine never talks to a store
//!  directly: it hands an [ExecutionPort] a CRUD request, a literal query or a
//!  translated filter and gets back a [RawResult].

use std::fmt::{Display, Formatter};

use crate::{
    translate::{Dialect, NativeFilter, Params},
    value::Value,
};

/// Opaque failure reported by a port.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOp {
    Save,
    DeleteById,
    Delete,
    DeleteAll,
    FindById,
    FindAll,
    ExistsById,
    Count,
}

impl CrudOp {
    /// Argument count the primitive takes.
    pub fn arity(&self) -> usize {
        match self {
            CrudOp::DeleteAll | CrudOp::FindAll | CrudOp::Count => 0,
            _ => 1,
        }
    }
}

impl Display for CrudOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrudOp::Save => "save",
            CrudOp::DeleteById => "deleteById",
            CrudOp::Delete => "delete",
            CrudOp::DeleteAll => "deleteAll",
            CrudOp::FindById => "findById",
            CrudOp::FindAll => "findAll",
            CrudOp::ExistsById => "existsById",
            CrudOp::Count => "count",
        };
        write!(f, "{name}")
    }
}

/// A builtin primitive. `argument` is the entity (`save`, `delete`) or the id
///  (`*ById`), and `None` for the zero-argument primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrudRequest<'a> {
    pub op: CrudOp,
    pub argument: Option<&'a Value>,
}

/// A forward-only source of rows. [Cursor::close] releases whatever the
///  cursor holds; the engine calls it exactly once.
pub trait Cursor<T> {
    fn next_row(&mut self) -> Option<Result<T, BackendError>>;

    fn close(&mut self) {}
}

/// Adapts an iterator of row results into a [Cursor] with nothing to release.
pub struct IterCursor<I>(pub I);

impl<T, I> Cursor<T> for IterCursor<I>
where
    I: Iterator<Item = Result<T, BackendError>>,
{
    fn next_row(&mut self) -> Option<Result<T, BackendError>> {
        self.0.next()
    }
}

pub enum RawResult<T> {
    Rows(Box<dyn Cursor<T>>),
    /// The store counted for us.
    Count(u64),
    /// The primitive produced nothing (deletes).
    Done,
}

impl<T: 'static> RawResult<T> {
    pub fn rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        RawResult::Rows(Box::new(IterCursor(rows.into_iter().map(Ok))))
    }

    pub fn cursor(cursor: impl Cursor<T> + 'static) -> Self {
        RawResult::Rows(Box::new(cursor))
    }

    pub fn single(row: T) -> Self {
        Self::rows(std::iter::once(row))
    }
}

impl<T> std::fmt::Debug for RawResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RawResult::Rows(_) => write!(f, "Rows(..)"),
            RawResult::Count(n) => write!(f, "Count({n})"),
            RawResult::Done => write!(f, "Done"),
        }
    }
}

/// A store gateway. Failures must be reported as [BackendError], never as an
///  empty result. Timeouts, cancellation and retries are the port's business.
pub trait ExecutionPort {
    type Item;

    fn execute_crud(&self, request: CrudRequest<'_>) -> Result<RawResult<Self::Item>, BackendError>;

    fn execute_literal(
        &self,
        dialect: Dialect,
        query: &str,
        params: &Params,
    ) -> Result<RawResult<Self::Item>, BackendError>;

    fn execute_filter(
        &self,
        dialect: Dialect,
        filter: &NativeFilter,
    ) -> Result<RawResult<Self::Item>, BackendError>;
}

impl<P: ExecutionPort + ?Sized> ExecutionPort for &P {
    type Item = P::Item;

    fn execute_crud(&self, request: CrudRequest<'_>) -> Result<RawResult<Self::Item>, BackendError> {
        (**self).execute_crud(request)
    }

    fn execute_literal(
        &self,
        dialect: Dialect,
        query: &str,
        params: &Params,
    ) -> Result<RawResult<Self::Item>, BackendError> {
        (**self).execute_literal(dialect, query, params)
    }

    fn execute_filter(
        &self,
        dialect: Dialect,
        filter: &NativeFilter,
    ) -> Result<RawResult<Self::Item>, BackendError> {
        (**self).execute_filter(dialect, filter)
    }
}
