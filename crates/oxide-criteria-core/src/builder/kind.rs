//! Statement kind markers.
//!
//! All statement kinds share one builder type, [`StatementBuilder`]; its
//! kind parameter decides which clauses exist at all (joins, GROUP BY, SET,
//! ...) while the phase parameter decides which are legal next.

use super::StatementBuilder;
use crate::error::Result;
use crate::stmt::{
    DeleteStmt, RowSet, RowSetKind, ScalarSubQueryStmt, SelectStmt, StatementKind, SubQueryStmt,
    UpdateStmt, ValuesStmt,
};

mod sealed {
    pub trait Sealed {}
}

use sealed::Sealed;

/// Kind marker: top-level SELECT.
pub struct SelectKind;
/// Kind marker: sub-query.
pub struct SubQueryKind;
/// Kind marker: scalar sub-query.
pub struct ScalarKind;
/// Kind marker: VALUES statement.
pub struct ValuesKind;
/// Kind marker: single-table DELETE.
pub struct SingleDeleteKind;
/// Kind marker: multi-table DELETE.
pub struct MultiDeleteKind;
/// Kind marker: single-table UPDATE.
pub struct SingleUpdateKind;
/// Kind marker: multi-table UPDATE.
pub struct MultiUpdateKind;
/// Kind marker: a composite whose family is only known at run time.
pub struct AnyKind;

impl Sealed for SelectKind {}
impl Sealed for SubQueryKind {}
impl Sealed for ScalarKind {}
impl Sealed for ValuesKind {}
impl Sealed for SingleDeleteKind {}
impl Sealed for MultiDeleteKind {}
impl Sealed for SingleUpdateKind {}
impl Sealed for MultiUpdateKind {}
impl Sealed for AnyKind {}

/// A statement kind built with [`StatementBuilder`].
pub trait BuilderKind: Sealed + Sized {
    /// The kind recorded in the statement's context.
    const KIND: StatementKind;

    /// The handle produced by `prepare`.
    type Prepared;

    #[doc(hidden)]
    fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<Self::Prepared>;
}

/// The family of a prepared row set, as seen by the composer.
pub trait Family: Sealed {
    /// The handle produced when a composite of this family is prepared.
    type Output;

    #[doc(hidden)]
    fn wrap(row_set: RowSet) -> Self::Output;
}

/// A SELECT-family kind.
pub trait QueryKind: BuilderKind + Family<Output = <Self as BuilderKind>::Prepared> {
    /// The row-set family produced.
    const ROW_SET: RowSetKind;
}

/// Kinds that take FROM after their head clause.
pub trait FromCapable: BuilderKind {}
/// Kinds that accept joins.
pub trait JoinCapable: BuilderKind {}
/// Kinds that accept ORDER BY and LIMIT.
pub trait OrderCapable: BuilderKind {}
/// Kinds whose sources accept index hints.
pub trait IndexHintCapable: BuilderKind {}
/// UPDATE kinds.
pub trait UpdateKind: BuilderKind {}

macro_rules! query_kind {
    ($kind:ident, $row_set:ident, $handle:ident, $statement:ident) => {
        impl BuilderKind for $kind {
            const KIND: StatementKind = StatementKind::$statement;
            type Prepared = $handle;

            fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<$handle> {
                builder.assemble_query().map($handle::new)
            }
        }

        impl Family for $kind {
            type Output = $handle;

            fn wrap(row_set: RowSet) -> $handle {
                $handle::new(row_set)
            }
        }

        impl QueryKind for $kind {
            const ROW_SET: RowSetKind = RowSetKind::$row_set;
        }

        impl FromCapable for $kind {}
        impl JoinCapable for $kind {}
        impl OrderCapable for $kind {}
        impl IndexHintCapable for $kind {}
    };
}

query_kind!(SelectKind, Select, SelectStmt, SimpleSelect);
query_kind!(SubQueryKind, SubQuery, SubQueryStmt, SubQuery);
query_kind!(ScalarKind, ScalarSubQuery, ScalarSubQueryStmt, ScalarSubQuery);

impl Family for ValuesKind {
    type Output = ValuesStmt;

    fn wrap(row_set: RowSet) -> ValuesStmt {
        ValuesStmt::new(row_set)
    }
}

impl Family for AnyKind {
    type Output = RowSet;

    fn wrap(row_set: RowSet) -> RowSet {
        row_set
    }
}

impl BuilderKind for SingleDeleteKind {
    const KIND: StatementKind = StatementKind::SingleDelete;
    type Prepared = DeleteStmt;

    fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<DeleteStmt> {
        builder.assemble_delete()
    }
}

impl BuilderKind for MultiDeleteKind {
    const KIND: StatementKind = StatementKind::MultiDelete;
    type Prepared = DeleteStmt;

    fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<DeleteStmt> {
        builder.assemble_delete()
    }
}

impl BuilderKind for SingleUpdateKind {
    const KIND: StatementKind = StatementKind::SingleUpdate;
    type Prepared = UpdateStmt;

    fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<UpdateStmt> {
        builder.assemble_update()
    }
}

impl BuilderKind for MultiUpdateKind {
    const KIND: StatementKind = StatementKind::MultiUpdate;
    type Prepared = UpdateStmt;

    fn assemble<Ph, C>(builder: &mut StatementBuilder<Self, Ph, C>) -> Result<UpdateStmt> {
        builder.assemble_update()
    }
}

impl FromCapable for MultiDeleteKind {}
impl JoinCapable for MultiDeleteKind {}
impl IndexHintCapable for MultiDeleteKind {}

impl OrderCapable for SingleDeleteKind {}

impl OrderCapable for SingleUpdateKind {}
impl UpdateKind for SingleUpdateKind {}

impl JoinCapable for MultiUpdateKind {}
impl IndexHintCapable for MultiUpdateKind {}
impl UpdateKind for MultiUpdateKind {}
