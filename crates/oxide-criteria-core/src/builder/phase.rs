//! Typestate phase markers.
//!
//! A builder's phase parameter records which clauses have been written so
//! far. Each transition consumes the builder and returns it in the next
//! phase, so calling a clause out of order does not compile. The sealed
//! traits below group the phases from which a clause may be written.

use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

use sealed::Sealed;

/// Marker: nothing written yet; WITH is still possible.
pub struct Initial;
/// Marker: SELECT list (or DELETE targets, or UPDATE table) written.
pub struct Selected;
/// Marker: at least one table source registered.
pub struct Joined;
/// Marker: UPDATE table sources registered, SET pending.
pub struct Sources;
/// Marker: a join is waiting for its ON predicate; `P` is the phase
/// restored once it is given.
pub struct PendingOn<P>(PhantomData<P>);
/// Marker: at least one SET assignment written.
pub struct Assigned;
/// Marker: WHERE written.
pub struct Filtered;
/// Marker: GROUP BY written.
pub struct Grouped;
/// Marker: HAVING written.
pub struct Having;
/// Marker: WINDOW written.
pub struct Windowed;
/// Marker: ORDER BY written.
pub struct Ordered;
/// Marker: LIMIT written.
pub struct Limited;
/// Marker: a locking clause that still accepts `OF` and wait options.
pub struct Locking;
/// Marker: locking clause complete.
pub struct Locked;
/// Marker: at least one VALUES row written.
pub struct Rows;
/// Marker: a bracket or set operation, awaiting its trailing clauses.
pub struct Composed;

impl Sealed for Initial {}
impl Sealed for Selected {}
impl Sealed for Joined {}
impl Sealed for Sources {}
impl<P> Sealed for PendingOn<P> {}
impl Sealed for Assigned {}
impl Sealed for Filtered {}
impl Sealed for Grouped {}
impl Sealed for Having {}
impl Sealed for Windowed {}
impl Sealed for Ordered {}
impl Sealed for Limited {}
impl Sealed for Locking {}
impl Sealed for Locked {}
impl Sealed for Rows {}
impl Sealed for Composed {}

/// Phases that accept further joins.
pub trait JoinPhase: Sealed {}
impl JoinPhase for Joined {}
impl JoinPhase for Sources {}

/// Phases in which PARTITION and index hints apply to the last source.
pub trait HintPhase: Sealed {}
impl HintPhase for Joined {}
impl HintPhase for Sources {}
impl<P: JoinPhase> HintPhase for PendingOn<P> {}

/// Phases that accept VALUES rows.
pub trait RowPhase: Sealed {}
impl RowPhase for Initial {}
impl RowPhase for Rows {}

/// Phases that accept SET assignments.
pub trait AssignPhase: Sealed {}
impl AssignPhase for Selected {}
impl AssignPhase for Sources {}
impl AssignPhase for Assigned {}

/// Phases that accept WHERE predicates.
pub trait Filterable: Sealed {}
impl Filterable for Joined {}
impl Filterable for Assigned {}
impl Filterable for Filtered {}

/// Phases that accept GROUP BY.
pub trait Groupable: Sealed {}
impl Groupable for Joined {}
impl Groupable for Filtered {}

/// Phases that accept HAVING predicates.
pub trait HavingPhase: Sealed {}
impl HavingPhase for Joined {}
impl HavingPhase for Filtered {}
impl HavingPhase for Grouped {}
impl HavingPhase for Having {}

/// Phases that accept WINDOW definitions.
pub trait Windowable: Sealed {}
impl Windowable for Joined {}
impl Windowable for Filtered {}
impl Windowable for Grouped {}
impl Windowable for Having {}
impl Windowable for Windowed {}

/// Phases that accept ORDER BY.
pub trait Orderable: Sealed {}
impl Orderable for Joined {}
impl Orderable for Assigned {}
impl Orderable for Filtered {}
impl Orderable for Grouped {}
impl Orderable for Having {}
impl Orderable for Windowed {}
impl Orderable for Ordered {}
impl Orderable for Rows {}
impl Orderable for Composed {}

/// Phases that accept LIMIT.
pub trait Limitable: Sealed {}
impl Limitable for Joined {}
impl Limitable for Assigned {}
impl Limitable for Filtered {}
impl Limitable for Grouped {}
impl Limitable for Having {}
impl Limitable for Windowed {}
impl Limitable for Ordered {}
impl Limitable for Rows {}
impl Limitable for Composed {}

/// Phases that accept a locking clause.
pub trait Lockable: Sealed {}
impl Lockable for Joined {}
impl Lockable for Assigned {}
impl Lockable for Filtered {}
impl Lockable for Grouped {}
impl Lockable for Having {}
impl Lockable for Windowed {}
impl Lockable for Ordered {}
impl Lockable for Rows {}
impl Lockable for Composed {}
impl Lockable for Limited {}

/// Phases in which the statement is complete.
pub trait Preparable: Sealed {}
impl Preparable for Joined {}
impl Preparable for Assigned {}
impl Preparable for Filtered {}
impl Preparable for Grouped {}
impl Preparable for Having {}
impl Preparable for Windowed {}
impl Preparable for Ordered {}
impl Preparable for Rows {}
impl Preparable for Composed {}
impl Preparable for Limited {}
impl Preparable for Locking {}
impl Preparable for Locked {}
