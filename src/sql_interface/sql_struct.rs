use rusqlite::types::{FromSql, FromSqlError, ValueRef};
use thiserror::Error;

pub type ReconstructResult<T> = Result<T, ReconstructError>;

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("Database or query error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("Unable to convert column value: {0}")]
    ConversionError(#[from] FromSqlError),
    #[error("Not enough values in row iterator. Likely the schema is invalid, or the mapping machinery has a bug.")]
    NotEnoughValues,
}

/// A table that is joined onto the tables of the `FROM` clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    /// The expression going into `ON (...)`.
    pub on: &'static str,
}

pub trait SqlStruct
where
    Self: Sized,
{
    /// The tables this struct is stored in, or depends on.
    fn required_tables() -> Vec<&'static str>;

    /// Tables which have to be joined in order to build this struct.
    fn required_joins() -> Vec<Join> {
        Vec::new()
    }

    /// Returns all SQL expressions this struct needs in order to be built in
    /// [`SqlStruct::from_row`].
    fn select_exprs() -> Vec<&'static str>;

    /// Reconstructs the implementor of this trait from a row, following the schema of
    /// [`SqlStruct::select_exprs`] in the same order.
    fn from_row<'a>(row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self>;
}

/// A struct stored in a table that is left-joined onto another one, meaning the whole struct
/// might be missing for a row. Reconstructed through [`Option`].
pub trait JoinedSqlStruct: SqlStruct {
    /// How the table is joined.
    fn join() -> Join;

    /// An expression which is NULL if and only if there is no joined row.
    fn key_expr() -> &'static str;
}

impl<T: JoinedSqlStruct> SqlStruct for Option<T> {
    fn required_tables() -> Vec<&'static str> {
        // joined tables are not part of FROM
        Vec::new()
    }

    fn required_joins() -> Vec<Join> {
        let mut joins = T::required_joins();
        joins.insert(0, T::join());
        joins
    }

    fn select_exprs() -> Vec<&'static str> {
        let mut exprs = T::select_exprs();
        exprs.insert(0, T::key_expr());
        exprs
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        let key = row.next().ok_or(ReconstructError::NotEnoughValues)?;
        if matches!(key, ValueRef::Null) {
            // skip over the columns of the missing struct
            let expected = T::select_exprs().len();
            if row.take(expected).count() < expected {
                return Err(ReconstructError::NotEnoughValues);
            }
            return Ok(None);
        }

        T::from_row(row).map(Some)
    }
}

/// Takes the next value out of the row and converts it.
pub fn next_converted<'a, T: FromSql>(
    row: &mut impl Iterator<Item = ValueRef<'a>>,
) -> ReconstructResult<T> {
    let value = row.next().ok_or(ReconstructError::NotEnoughValues)?;
    Ok(T::column_result(value)?)
}

macro_rules! impl_sqlstruct_for_tuple {
    ($( ($( $generics:ident ),+ $(,)?) ),* $(,)?) => { $(
        // the comma is important, consider 1 generic
        impl<$( $generics ),*> SqlStruct for ( $( $generics, )* )
        where $(
            $generics: SqlStruct,
        )* {
            fn required_tables() -> Vec<&'static str> {
                [$( $generics::required_tables() ),*]
                    .into_iter()
                    .flatten()
                    .collect()
            }

            fn required_joins() -> Vec<Join> {
                [$( $generics::required_joins() ),*]
                    .into_iter()
                    .flatten()
                    .collect()
            }

            fn select_exprs() -> Vec<&'static str> {
                [$( $generics::select_exprs() ),*]
                    .into_iter()
                    .flatten()
                    .collect()
            }

            fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
                Ok(( $(
                    $generics::from_row((&mut row).take($generics::select_exprs().len()))? ,
                )* ))
            }
        }
    )* };
}

impl_sqlstruct_for_tuple!(
    (A,),
    (A, B),
    (A, B, C),
    (A, B, C, D),
    (A, B, C, D, E),
    (A, B, C, D, E, F),
);
