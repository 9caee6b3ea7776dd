use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use crate::{
    port::{BackendError, CrudOp, CrudRequest, Cursor, ExecutionPort, RawResult},
    translate::{Dialect, NativeFilter, Params},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

/// One call as the port saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Crud {
        op: CrudOp,
        argument: Option<Value>,
    },
    Literal {
        dialect: Dialect,
        query: String,
        params: Params,
    },
    Filter {
        dialect: Dialect,
        filter: NativeFilter,
    },
}

enum Response<T> {
    Rows(Vec<T>),
    Count(u64),
    Fail(String),
}

/// An in-memory port that records every call and answers each one the same way.
pub struct RecordingPort<T> {
    calls: RefCell<Vec<Call>>,
    response: Response<T>,
}

impl<T: Clone + 'static> RecordingPort<T> {
    fn with(response: Response<T>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            response,
        }
    }

    pub fn returning(rows: Vec<T>) -> Self {
        Self::with(Response::Rows(rows))
    }

    pub fn counting(n: u64) -> Self {
        Self::with(Response::Count(n))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Response::Fail(message.to_string()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn respond(&self, call: Call) -> Result<RawResult<T>, BackendError> {
        self.calls.borrow_mut().push(call);
        match &self.response {
            Response::Rows(rows) => Ok(RawResult::rows(rows.clone())),
            Response::Count(n) => Ok(RawResult::Count(*n)),
            Response::Fail(message) => Err(BackendError::new(message.clone())),
        }
    }
}

impl<T: Clone + 'static> ExecutionPort for RecordingPort<T> {
    type Item = T;

    fn execute_crud(&self, request: CrudRequest<'_>) -> Result<RawResult<T>, BackendError> {
        self.respond(Call::Crud {
            op: request.op,
            argument: request.argument.cloned(),
        })
    }

    fn execute_literal(
        &self,
        dialect: Dialect,
        query: &str,
        params: &Params,
    ) -> Result<RawResult<T>, BackendError> {
        self.respond(Call::Literal {
            dialect,
            query: query.to_string(),
            params: params.clone(),
        })
    }

    fn execute_filter(
        &self,
        dialect: Dialect,
        filter: &NativeFilter,
    ) -> Result<RawResult<T>, BackendError> {
        self.respond(Call::Filter {
            dialect,
            filter: filter.clone(),
        })
    }
}

/// Counts rows handed out and `close` calls on the cursors it builds.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    pulled: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl Tracker {
    pub fn pulled(&self) -> usize {
        self.pulled.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    pub fn raw<T: 'static>(&self, rows: Vec<T>) -> RawResult<T> {
        self.raw_results(rows.into_iter().map(Ok).collect())
    }

    pub fn raw_results<T: 'static>(&self, rows: Vec<Result<T, BackendError>>) -> RawResult<T> {
        RawResult::cursor(TrackingCursor {
            rows: rows.into(),
            tracker: self.clone(),
        })
    }
}

struct TrackingCursor<T> {
    rows: VecDeque<Result<T, BackendError>>,
    tracker: Tracker,
}

impl<T> Cursor<T> for TrackingCursor<T> {
    fn next_row(&mut self) -> Option<Result<T, BackendError>> {
        let row = self.rows.pop_front()?;
        self.tracker.pulled.set(self.tracker.pulled.get() + 1);
        Some(row)
    }

    fn close(&mut self) {
        self.tracker.closed.set(self.tracker.closed.get() + 1);
    }
}
