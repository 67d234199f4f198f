//! Column-synchronized merge of two sparse operands.
//!
//! Both operands must already share the output shape.  Each column pair is
//! walked with two pointers over the sorted row indices; the op callback is
//! invoked once per union entry with an [`EntryType`](super::EntryType) tag
//! saying which side held the entry explicitly.

use super::EntryType;
use crate::algebra::{BorrowedCscMatrix, CscMatrix, ScalarT};

/// Merge two same-shape sparse matrices entrywise.  `f` receives
/// `(row, col, a_val, b_val, entry_type)` for every position stored in at
/// least one operand; absent positions contribute `T::zero()`.
///
/// The output is allocated at the union nnz upper bound and compacted to the
/// emitted count before returning.
pub(crate) fn merge_columns<T, U, F>(
    a: BorrowedCscMatrix<'_, T>,
    b: BorrowedCscMatrix<'_, T>,
    f: &F,
) -> CscMatrix<U>
where
    T: ScalarT,
    U: Copy + Default + PartialEq,
    F: Fn(usize, usize, T, T, EntryType) -> U,
{
    debug_assert!(a.m == b.m && a.n == b.n);
    let (m, n) = (a.m, a.n);

    let mut out = CscMatrix::<U>::spalloc((m, n), a.nnz() + b.nnz());

    let mut ptr = 0;
    for j in 0..n {
        out.colptr[j] = ptr;

        let mut ka = a.colptr[j];
        let mut kb = b.colptr[j];
        let enda = a.colptr[j + 1];
        let endb = b.colptr[j + 1];

        while ka < enda || kb < endb {
            // sentinel m sorts past every real row index
            let ra = if ka < enda { a.rowval[ka] } else { m };
            let rb = if kb < endb { b.rowval[kb] } else { m };

            let (row, va, vb, tag) = if ra == rb {
                let e = (ra, a.nzval[ka], b.nzval[kb], EntryType::Both);
                ka += 1;
                kb += 1;
                e
            } else if ra < rb {
                let e = (ra, a.nzval[ka], T::zero(), EntryType::LeftOnly);
                ka += 1;
                e
            } else {
                let e = (rb, T::zero(), b.nzval[kb], EntryType::RightOnly);
                kb += 1;
                e
            };

            out.rowval[ptr] = row;
            out.nzval[ptr] = f(row, j, va, vb, tag);
            ptr += 1;
        }
    }
    out.colptr[n] = ptr;

    // shrink from the union upper bound to the emitted count
    out.rowval.truncate(ptr);
    out.nzval.truncate(ptr);
    out
}
