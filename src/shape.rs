use crate::{
    descriptor::ReturnShape,
    error::{QueryContext, Result, ShapeError},
    port::{Cursor, RawResult},
};

/// The caller-visible result of an invocation.
pub enum Shaped<T> {
    Unit,
    Single(T),
    Optional(Option<T>),
    List(Vec<T>),
    /// Distinct values in first-seen order.
    Set(Vec<T>),
    Lazy(LazySequence<T>),
    Count(u64),
    Exists(bool),
}

impl<T: std::fmt::Debug> std::fmt::Debug for Shaped<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shaped::Unit => write!(f, "Unit"),
            Shaped::Single(v) => f.debug_tuple("Single").field(v).finish(),
            Shaped::Optional(v) => f.debug_tuple("Optional").field(v).finish(),
            Shaped::List(v) => f.debug_tuple("List").field(v).finish(),
            Shaped::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Shaped::Lazy(_) => write!(f, "Lazy(..)"),
            Shaped::Count(n) => f.debug_tuple("Count").field(n).finish(),
            Shaped::Exists(b) => f.debug_tuple("Exists").field(b).finish(),
        }
    }
}

/// Owns a cursor and guarantees it is closed exactly once: when it runs dry,
///  on the first error, or when dropped part way through.
struct Rows<T> {
    cursor: Option<Box<dyn Cursor<T>>>,
    context: QueryContext,
}

impl<T> Rows<T> {
    fn new(cursor: Box<dyn Cursor<T>>, context: QueryContext) -> Self {
        Self {
            cursor: Some(cursor),
            context,
        }
    }

    fn empty(context: QueryContext) -> Self {
        Self {
            cursor: None,
            context,
        }
    }

    fn next(&mut self) -> Option<Result<T>> {
        let cursor = self.cursor.as_mut()?;
        match cursor.next_row() {
            Some(Ok(row)) => Some(Ok(row)),
            Some(Err(e)) => {
                self.close();
                Some(Err(self.context.wrap(e)))
            }
            None => {
                self.close();
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }
}

impl<T> Drop for Rows<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// A single forward pass over a result. It can't be restarted; dropping it
///  before the end releases the underlying cursor.
pub struct LazySequence<T> {
    rows: Rows<T>,
}

impl<T> LazySequence<T> {
    /// Whether the underlying cursor is still held.
    pub fn is_open(&self) -> bool {
        self.rows.cursor.is_some()
    }
}

impl<T> Iterator for LazySequence<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl<T> std::iter::FusedIterator for LazySequence<T> {}

/// Adapts a raw port result to the declared shape.
///
/// #Notes
/// `UniqueSet` only asks for `PartialEq`, so duplicates are found by a linear
///  scan of the rows kept so far: O(n²) comparisons over n rows. Ports that
///  return large sets should de-duplicate on their side.
pub fn shape<T: PartialEq>(
    shape: ReturnShape,
    raw: RawResult<T>,
    context: QueryContext,
) -> Result<Shaped<T>> {
    match (shape, raw) {
        (ReturnShape::Count, RawResult::Count(n)) => Ok(Shaped::Count(n)),
        (ReturnShape::Exists, RawResult::Count(n)) => Ok(Shaped::Exists(n > 0)),
        (ReturnShape::Unit, RawResult::Count(_)) => Ok(Shaped::Unit),
        (shape, RawResult::Count(_)) => Err(ShapeError::Mismatch {
            shape,
            found: "a count",
        }
        .into()),
        (shape, RawResult::Done) => shape_rows(shape, Rows::empty(context)),
        (shape, RawResult::Rows(cursor)) => shape_rows(shape, Rows::new(cursor, context)),
    }
}

fn shape_rows<T: PartialEq>(shape: ReturnShape, mut rows: Rows<T>) -> Result<Shaped<T>> {
    Ok(match shape {
        ReturnShape::Single => match single(&mut rows)? {
            Some(row) => Shaped::Single(row),
            None => return Err(ShapeError::NotFound.into()),
        },
        ReturnShape::NullableSingle => Shaped::Optional(single(&mut rows)?),
        ReturnShape::OrderedList => {
            let mut out = Vec::new();
            while let Some(row) = rows.next() {
                out.push(row?);
            }
            Shaped::List(out)
        }
        ReturnShape::UniqueSet => {
            let mut out: Vec<T> = Vec::new();
            while let Some(row) = rows.next() {
                let row = row?;
                if !out.contains(&row) {
                    out.push(row);
                }
            }
            Shaped::Set(out)
        }
        ReturnShape::LazySequence => Shaped::Lazy(LazySequence { rows }),
        ReturnShape::Count => {
            let mut n = 0;
            while let Some(row) = rows.next() {
                row?;
                n += 1;
            }
            Shaped::Count(n)
        }
        ReturnShape::Exists => {
            let found = rows.next().transpose()?.is_some();
            rows.close();
            Shaped::Exists(found)
        }
        ReturnShape::Unit => {
            rows.close();
            Shaped::Unit
        }
    })
}

/// Reads at most two rows.
fn single<T>(rows: &mut Rows<T>) -> Result<Option<T>> {
    let Some(first) = rows.next().transpose()? else {
        return Ok(None);
    };
    if rows.next().transpose()?.is_some() {
        rows.close();
        return Err(ShapeError::AmbiguousSingleResult.into());
    }
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, QueryContext},
        port::BackendError,
        tests::Tracker,
        translate::Dialect,
    };

    fn cx() -> QueryContext {
        QueryContext::new(Dialect::AtNamed, "test", true)
    }

    #[test]
    fn nullable_single_over_empty() {
        let tracker = Tracker::default();
        let shaped = shape(ReturnShape::NullableSingle, tracker.raw(Vec::<i64>::new()), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Optional(None)));
        assert_eq!(tracker.closed(), 1);
    }

    #[test]
    fn single_over_empty_is_not_found() {
        let shaped = shape(ReturnShape::Single, RawResult::<i64>::Done, cx());
        assert!(matches!(
            shaped,
            Err(Error::ResultShape(ShapeError::NotFound))
        ));
    }

    #[test]
    fn single_over_two_is_ambiguous() {
        let tracker = Tracker::default();
        let shaped = shape(ReturnShape::Single, tracker.raw(vec![1, 2, 3]), cx());
        assert!(matches!(
            shaped,
            Err(Error::ResultShape(ShapeError::AmbiguousSingleResult))
        ));
        assert_eq!(tracker.pulled(), 2);
        assert_eq!(tracker.closed(), 1);
    }

    #[test]
    fn exists_short_circuits() {
        let tracker = Tracker::default();
        let shaped = shape(ReturnShape::Exists, tracker.raw(vec![1, 2, 3]), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Exists(true)));
        assert_eq!(tracker.pulled(), 1);
        assert_eq!(tracker.closed(), 1);

        let shaped = shape(ReturnShape::Exists, RawResult::<i64>::Count(0), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Exists(false)));
    }

    #[test]
    fn list_keeps_order_and_set_dedupes() {
        let shaped = shape(ReturnShape::OrderedList, RawResult::rows(vec![3, 1, 3, 2]), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::List(v) if v == [3, 1, 3, 2]));

        let shaped = shape(ReturnShape::UniqueSet, RawResult::rows(vec![3, 1, 3, 2, 1]), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Set(v) if v == [3, 1, 2]));
    }

    #[test]
    fn count_reported_or_counted() {
        let shaped = shape(ReturnShape::Count, RawResult::<i64>::Count(42), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Count(42)));

        let tracker = Tracker::default();
        let shaped = shape(ReturnShape::Count, tracker.raw(vec![1, 2, 3]), cx())
            .expect("a result");
        assert!(matches!(shaped, Shaped::Count(3)));
        assert_eq!(tracker.closed(), 1);

        let mismatch = shape(ReturnShape::OrderedList, RawResult::<i64>::Count(1), cx());
        assert!(matches!(
            mismatch,
            Err(Error::ResultShape(ShapeError::Mismatch { .. }))
        ));
    }

    #[test]
    fn lazy_sequence_releases_on_completion() {
        let tracker = Tracker::default();
        let Shaped::Lazy(mut lazy) =
            shape(ReturnShape::LazySequence, tracker.raw(vec![1, 2]), cx()).expect("a result")
        else {
            panic!("Expected a lazy sequence");
        };
        assert_eq!(tracker.pulled(), 0);
        assert!(lazy.is_open());
        assert_eq!(lazy.next().map(|r| r.ok()), Some(Some(1)));
        assert_eq!(lazy.next().map(|r| r.ok()), Some(Some(2)));
        assert!(lazy.next().is_none());
        assert!(!lazy.is_open());
        assert!(lazy.next().is_none());
        drop(lazy);
        assert_eq!(tracker.closed(), 1);
    }

    #[test]
    fn lazy_sequence_releases_when_abandoned() {
        let tracker = Tracker::default();
        let Shaped::Lazy(mut lazy) =
            shape(ReturnShape::LazySequence, tracker.raw(vec![1, 2, 3]), cx())
                .expect("a result")
        else {
            panic!("Expected a lazy sequence");
        };
        assert!(lazy.next().is_some());
        assert_eq!(tracker.closed(), 0);
        drop(lazy);
        assert_eq!(tracker.closed(), 1);
        assert_eq!(tracker.pulled(), 1);
    }

    #[test]
    fn lazy_sequence_releases_on_failure() {
        let tracker = Tracker::default();
        let raw = tracker.raw_results(vec![Ok(1), Err(BackendError::new("boom")), Ok(3)]);
        let Shaped::Lazy(lazy) = shape(ReturnShape::LazySequence, raw, cx()).expect("a result")
        else {
            panic!("Expected a lazy sequence");
        };
        let results: Vec<_> = lazy.collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(Error::Backend { .. })));
        assert_eq!(tracker.closed(), 1);
    }

    #[test]
    fn unit_releases_without_reading() {
        let tracker = Tracker::default();
        let shaped = shape(ReturnShape::Unit, tracker.raw(vec![1]), cx()).expect("a result");
        assert!(matches!(shaped, Shaped::Unit));
        assert_eq!(tracker.pulled(), 0);
        assert_eq!(tracker.closed(), 1);
    }
}
