#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`LdlFactor`](LdlFactor) operations
#[derive(Error, Debug)]
pub enum LdlError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
}

/// Settings for [`LdlFactor`](LdlFactor) and the solver built on it.
#[derive(Builder, Debug, Clone)]
pub struct CholSettings<T: ScalarT> {
    /// scaling of the AMD dense-row threshold
    #[builder(default = "1.0")]
    pub amd_dense_scale: f64,
    /// user-provided fill reducing ordering (AMD is used when absent)
    #[builder(default = "None", setter(strip_option))]
    pub perm: Option<Vec<usize>>,
    /// dynamic regularization of small pivots.  Off by default: a small or
    /// negative pivot is then reported as a factorization failure instead
    /// of being perturbed.
    #[builder(default = "false")]
    pub regularize_enable: bool,
    #[builder(default = "(1e-12).as_T()")]
    pub regularize_eps: T,
    #[builder(default = "(1e-7).as_T()")]
    pub regularize_delta: T,
    /// default iterative refinement steps applied by solve
    #[builder(default = "2")]
    pub refine_steps: usize,
}

impl<T> Default for CholSettings<T>
where
    T: ScalarT,
{
    fn default() -> CholSettings<T> {
        CholSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// $LDL^T$ factorization of a symmetric positive definite matrix held in
/// upper triangular CSC form.
///
/// Construction performs the symbolic analysis only: fill reducing ordering,
/// symmetric permutation and elimination tree.  Numeric values are streamed
/// in afterwards through [`update_values`](LdlFactor::update_values) (and
/// optionally [`offset_values`](LdlFactor::offset_values)), then
/// factored by [`refactor`](LdlFactor::refactor).  The symbolic objects are
/// reused across every refactorization, on the assumption that the caller
/// varies values but never the pattern.
#[derive(Debug)]
pub struct LdlFactor<T = f64> {
    // permutation vector
    pub perm: Vec<usize>,
    // inverse permutation
    #[allow(dead_code)] //Unused because we call ipermute in solve instead.  Keep anyway.
    iperm: Vec<usize>,
    // lower triangular factor
    pub L: CscMatrix<T>,
    // D and its inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    // workspace data
    workspace: LdlWorkspace<T>,
    // most recent refactor outcome
    factored: bool,
}

impl<T> LdlFactor<T>
where
    T: ScalarT,
{
    /// Symbolic analysis of `Ain`, which must be square upper triangular
    /// with a structurally nonzero diagonal.  No numeric factorization is
    /// performed; call [`refactor`](LdlFactor::refactor) once values are in
    /// place.
    pub fn new(Ain: &CscMatrix<T>, opts: &CholSettings<T>) -> Result<LdlFactor<T>, LdlError> {
        //sanity check on structure
        check_structure(Ain)?;

        let n = Ain.nrows();

        //Use AMD ordering if a user-provided ordering
        //is not supplied.   For no ordering at all, the
        //user would need to pass (0..n).collect() explicitly
        let (perm, iperm);
        if let Some(ref _perm) = opts.perm {
            iperm = _invperm(_perm)?;
            perm = _perm.clone();
        } else {
            (perm, iperm) = _get_amd_ordering(Ain, opts.amd_dense_scale);
        }

        //permute to (another) upper triangular matrix and store the
        //index mapping the input's entries to the permutation's entries
        let (A, AtoPAPt) = _permute_symmetric(Ain, &iperm);

        let workspace = LdlWorkspace::<T>::new(
            A,
            AtoPAPt,
            opts.regularize_enable,
            opts.regularize_eps,
            opts.regularize_delta,
        )?;

        //total nonzeros in factorization
        let sumLnz = workspace.Lnz.iter().sum();

        // allocate space for the L matrix row indices and data;
        // colptr is filled from the symbolic counts on each refactor
        let L = CscMatrix::spalloc((n, n), sumLnz);

        // allocate for D and D inverse in LDL^T
        let D = vec![T::zero(); n];
        let Dinv = vec![T::zero(); n];

        Ok(LdlFactor {
            perm,
            iperm,
            L,
            D,
            Dinv,
            workspace,
            factored: false,
        })
    }

    pub fn regularize_count(&self) -> usize {
        self.workspace.regularize_count
    }

    /// `true` after a successful [`refactor`](LdlFactor::refactor)
    pub fn is_factored(&self) -> bool {
        self.factored
    }

    // Solves Ax = b using LDL factors for A.
    // Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        assert!(self.factored);
        assert_eq!(b.len(), self.D.len());

        // permute b
        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);

        //solve in place with tmp as permuted RHS
        _solve(
            &self.L.colptr,
            &self.L.rowval,
            &self.L.nzval,
            &self.Dinv,
            tmp,
        );

        // inverse permutation to put unpermuted soln in b
        _ipermute(b, tmp, &self.perm);
    }

    /// Solves `Ux = b` in place, where `U = D^{1/2}(L+I)ᵀ` is the upper
    /// triangular Cholesky-style factor of the permuted system, and applies
    /// the inverse permutation.  This is the half of a full solve needed to
    /// draw from a distribution whose covariance is the system inverse.
    pub fn half_solve(&mut self, b: &mut [T]) {
        assert!(self.factored);
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);

        // scale by D^{-1/2}, then one transposed triangular solve
        for (t, d) in zip(tmp.iter_mut(), &self.Dinv) {
            *t *= T::sqrt(*d);
        }
        _ltsolve_unsafe(&self.L.colptr, &self.L.rowval, &self.L.nzval, tmp);

        _ipermute(b, tmp, &self.perm);
    }

    /// Diagonal of the Cholesky-style factor, `√D`, written in original
    /// (unpermuted) row order.
    pub fn sqrt_diagonal(&self, out: &mut [T]) {
        assert!(self.factored);
        assert_eq!(out.len(), self.D.len());
        for (i, &p) in self.perm.iter().enumerate() {
            out[p] = T::sqrt(self.D[i]);
        }
    }

    /// Overwrite values of the factorization target through the map from
    /// input-matrix entry positions to the permuted internal form.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        let nzval = &mut self.workspace.triuA.nzval; // post perm internal data
        let AtoPAPt = &self.workspace.AtoPAPt; //mapping from input matrix entries to triuA

        for (i, &idx) in indices.iter().enumerate() {
            nzval[AtoPAPt[idx]] = values[i];
        }
    }

    /// Add `offset` at the given input-matrix entry positions, used to fold
    /// a diagonal shift into the factorization target.
    pub fn offset_values(&mut self, indices: &[usize], offset: T) {
        let nzval = &mut self.workspace.triuA.nzval; // post perm internal data
        let AtoPAPt = &self.workspace.AtoPAPt; //mapping from input matrix entries to triuA

        for &idx in indices.iter() {
            nzval[AtoPAPt[idx]] += offset;
        }
    }

    /// Numeric refactorization with the current values.  A non-positive or
    /// non-finite pivot reports `NotPositiveDefinite`; the symbolic objects
    /// remain valid and a further refactor with new values may be attempted.
    pub fn refactor(&mut self) -> Result<(), LdlError> {
        self.factored = false;
        _factor(
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.workspace,
        )?;
        self.factored = true;
        Ok(())
    }
}

fn check_structure<T: ScalarT>(A: &CscMatrix<T>) -> Result<(), LdlError> {
    if !A.is_square() {
        return Err(LdlError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(LdlError::NotUpperTriangular);
    }

    //Error if A doesn't have at least one entry in every column
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(LdlError::EmptyColumn);
    }

    Ok(())
}

#[derive(Debug)]
struct LdlWorkspace<T> {
    // internal workspace data
    etree: Vec<usize>,
    Lnz: Vec<usize>,
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // The upper triangular matrix factorisation target
    // This is the post ordering PAPt of the original data
    triuA: CscMatrix<T>,

    // mapping from entries in the triu form
    // of the original input to the post ordering
    // triu form used for the factorization
    // this can be used when modifying entries
    // of the data matrix for refactoring
    AtoPAPt: Vec<usize>,

    //regularization parameters
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,

    // number of regularized entries in D
    regularize_count: usize,
}

impl<T> LdlWorkspace<T>
where
    T: ScalarT,
{
    pub fn new(
        triuA: CscMatrix<T>,
        AtoPAPt: Vec<usize>,
        regularize_enable: bool,
        regularize_eps: T,
        regularize_delta: T,
    ) -> Result<Self, LdlError> {
        let mut etree = vec![0; triuA.ncols()];
        let mut Lnz = vec![0; triuA.ncols()]; //nonzeros in each L column
        let mut iwork = vec![0; triuA.ncols() * 3];
        let bwork = vec![false; triuA.ncols()];
        let fwork = vec![T::zero(); triuA.ncols()];

        // compute elimination tree
        _etree(
            triuA.nrows(),
            &triuA.colptr,
            &triuA.rowval,
            &mut iwork,
            &mut Lnz,
            &mut etree,
        )?;

        Ok(Self {
            etree,
            Lnz,
            iwork,
            bwork,
            fwork,
            triuA,
            AtoPAPt,
            regularize_enable,
            regularize_eps,
            regularize_delta,
            regularize_count: 0,
        })
    }
}

fn _factor<T: ScalarT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut LdlWorkspace<T>,
) -> Result<(), LdlError> {
    let A = &workspace.triuA;

    _factor_inner(
        A.n,
        &A.colptr,
        &A.rowval,
        &A.nzval,
        &mut L.colptr,
        &mut L.rowval,
        &mut L.nzval,
        D,
        Dinv,
        &workspace.Lnz,
        &workspace.etree,
        &mut workspace.bwork,
        &mut workspace.iwork,
        &mut workspace.fwork,
        workspace.regularize_enable,
        workspace.regularize_eps,
        workspace.regularize_delta,
        &mut workspace.regularize_count,
    )
}

const LDL_UNKNOWN: usize = usize::MAX;
const LDL_USED: bool = true;
const LDL_UNUSED: bool = false;

// Compute the elimination tree for a matrix
// in compressed sparse column form.

fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) -> Result<usize, LdlError> {
    // zero out Lnz and work.  Set all etree values to unknown
    work.fill(0);
    Lnz.fill(0);
    etree.fill(LDL_UNKNOWN);

    // compute the elimination tree
    for j in 0..n {
        work[j] = j;
        for istart in Ai.iter().take(Ap[j + 1]).skip(Ap[j]) {
            let mut i = *istart;

            while work[i] != j {
                if etree[i] == LDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1; // nonzeros in this column
                work[i] = j;
                i = etree[i];
            }
        }
    }

    Ok(0)
}

// acceptability of a computed pivot for a positive definite target
fn _pivot_ok<T: ScalarT>(d: T) -> bool {
    d > T::zero() && d.is_finite()
}

//allow too_many_arguments since this follows the implementation
//of the C version of QDLDL.
#[allow(clippy::too_many_arguments)]
fn _factor_inner<T: ScalarT>(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    Ax: &[T],
    Lp: &mut [usize],
    Li: &mut [usize],
    Lx: &mut [T],
    D: &mut [T],
    Dinv: &mut [T],
    Lnz: &[usize],
    etree: &[usize],
    bwork: &mut [bool],
    iwork: &mut [usize],
    fwork: &mut [T],
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,
    regularize_count: &mut usize,
) -> Result<(), LdlError> {
    *regularize_count = 0;

    // partition working memory into pieces
    let y_markers = bwork;
    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);
    let y_vals = fwork;

    //set Lp to cumsum(Lnz), starting from zero
    Lp[0] = 0;
    let mut acc = 0;
    for (Lp, Lnz) in zip(&mut Lp[1..], Lnz) {
        *Lp = acc + Lnz;
        acc = *Lp;
    }

    //  set all y_idx to be 'unused' initially
    // in each column of L, the next available space
    // to start is just the first space in the column
    y_markers.fill(LDL_UNUSED);
    y_vals.fill(T::zero());
    D.fill(T::zero());
    next_colspace.copy_from_slice(&Lp[0..Lp.len() - 1]);

    // First element of the diagonal D.
    D[0] = Ax[0];
    if regularize_enable && D[0] < regularize_eps {
        D[0] = regularize_delta;
        *regularize_count += 1;
    }
    if !_pivot_ok(D[0]) {
        return Err(LdlError::NotPositiveDefinite);
    }
    Dinv[0] = T::recip(D[0]);

    // Start from second row (k=1) here. The upper LH corner is trivially 0
    // in L b/c we are only computing the subdiagonal elements
    for k in 1..n {
        // NB : For each k, we compute a solution to
        // y = L(0:(k-1),0:k-1))\b, where b is the kth
        // column of A that sits above the diagonal.
        // The solution y is then the kth row of L,
        // with an implied '1' at the diagonal entry.

        // number of nonzeros in this row of L
        let mut nnz_y = 0; // number of elements in this row

        // This loop determines where nonzeros
        // will go in the kth row of L, but doesn't
        // compute the actual values

        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i]; //we are working on this element of b

            // Initialize D[k] as the element of this column
            // corresponding to the diagonal place.  Don't use
            // this element as part of the elimination step
            // that computes the k^th row of L
            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i]; // initialise y(bidx) = b(bidx)

            // use the forward elimination tree to figure
            // out which elements must be eliminated after
            // this element of b
            let next_idx = bidx;

            if y_markers[next_idx] == LDL_UNUSED {
                //this y term not already visited

                y_markers[next_idx] = LDL_USED; //I touched this one
                elim_buffer[0] = next_idx; // It goes at the start of the current list
                let mut nnz_e = 1; //length of unvisited elimination path from here

                let mut next_idx = etree[bidx];

                while next_idx != LDL_UNKNOWN && next_idx < k {
                    if y_markers[next_idx] == LDL_USED {
                        break;
                    }

                    y_markers[next_idx] = LDL_USED; // I touched this one
                    elim_buffer[nnz_e] = next_idx; // It goes in the current list
                    next_idx = etree[next_idx]; // one step further along tree
                    nnz_e += 1; // the list is one longer than before
                }

                // now put the buffered elimination list into
                // my current ordering in reverse order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // This for loop places nonzeros values in the k^th row
        for i in (0..nnz_y).rev() {
            // which column are we working on?
            let cidx = y_idx[i];

            // loop along the elements in this
            // column of L and subtract to solve to y
            let tmp_idx = next_colspace[cidx];

            let y_vals_cidx = y_vals[cidx];

            let (f, l) = (Lp[cidx], tmp_idx);
            unsafe {
                //Safety : Here the Lij index comes from the rowval
                //field of the sparse L factor matrix, and should
                //always be bounded by the matrix dimension.
                for j in f..l {
                    let Lxj = *Lx.get_unchecked(j);
                    let Lij = *Li.get_unchecked(j);
                    *(y_vals.get_unchecked_mut(Lij)) -= Lxj * y_vals_cidx;
                }
            }

            // Now I have the cidx^th element of y = L\b.
            // so compute the corresponding element of
            // this row of L and put it into the right place
            Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
            D[k] -= y_vals_cidx * Lx[tmp_idx];

            // record which row it went into
            Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            // reset the y_vals and indices back to zero and LDL_UNUSED
            // once I'm done with them
            y_vals[cidx] = T::zero();
            y_markers[cidx] = LDL_UNUSED;
        }

        // apply dynamic regularization
        if regularize_enable && D[k] < regularize_eps {
            D[k] = regularize_delta;
            *regularize_count += 1;
        }

        // a non-positive pivot means the target lost positive
        // definiteness under the current values, so abort
        if !_pivot_ok(D[k]) {
            return Err(LdlError::NotPositiveDefinite);
        }

        // compute the inverse of the diagonal
        Dinv[k] = T::recip(D[k]);
    } //end for k

    Ok(())
}

// Solves (L+I)x = b, with x replacing b (with standard bounds checks)
#[allow(dead_code)]
fn _lsolve_safe<T: ScalarT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let (f, l) = (Lp[i], Lp[i + 1]);
        let Lx = &Lx[f..l];
        let Li = &Li[f..l];
        for (&Lij, &Lxj) in zip(Li, Lx) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b (with standard bounds checks)
#[allow(dead_code)]
fn _ltsolve_safe<T: ScalarT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let mut s = T::zero();
        let (f, l) = (Lp[i], Lp[i + 1]);
        let Lx = &Lx[f..l];
        let Li = &Li[f..l];
        for (&Lij, &Lxj) in zip(Li, Lx) {
            s += Lxj * x[Lij];
        }
        x[i] -= s;
    }
}

// -------------------------------------
// Versions of L\x and Lᵀ\x that use unchecked indexing.
//
// Safety : The values in colptr array Lp at the time this
// function is reached should be bounded by the sizes of the
// arrays in Lx and Li.  The length of x should be compatible
// with the row index entries in Li
// -------------------------------------

// Solves (L+I)x = b, with x replacing b.  Unchecked version
fn _lsolve_unsafe<T: ScalarT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    unsafe {
        for i in 0..x.len() {
            let xi = *x.get_unchecked(i);
            let f = *Lp.get_unchecked(i);
            let l = *Lp.get_unchecked(i + 1);
            for j in f..l {
                let Lxj = *Lx.get_unchecked(j);
                let Lij = *Li.get_unchecked(j);
                *(x.get_unchecked_mut(Lij)) -= Lxj * xi;
            }
        }
    }
}

// Solves (L+I)'x = b, with x replacing b.  Unchecked version.
fn _ltsolve_unsafe<T: ScalarT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    unsafe {
        for i in (0..x.len()).rev() {
            let mut s = T::zero();
            let f = *Lp.get_unchecked(i);
            let l = *Lp.get_unchecked(i + 1);
            for j in f..l {
                let Lxj = *Lx.get_unchecked(j);
                let Lij = *Li.get_unchecked(j);
                s += Lxj * (*x.get_unchecked(Lij));
            }
            *x.get_unchecked_mut(i) -= s;
        }
    }
}

// Solves Ax = b where A has given LDL factors, with x replacing b
fn _solve<T: ScalarT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    // We call the `unsafe`d version of the forward and backward substitution
    // functions here, since the matrix data should be well posed and x of
    // compatible dimensions.   For super safety or debugging purposes, there
    // are also `safe` versions implemented above.
    _lsolve_unsafe(Lp, Li, Lx, b);
    zip(b.iter_mut(), Dinv).for_each(|(b, d)| *b *= *d);
    _ltsolve_unsafe(Lp, Li, Lx, b);
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, LdlError> {
    let mut b = vec![0; p.len()];

    for (i, j) in p.iter().enumerate() {
        if *j < p.len() && b[*j] == 0 {
            b[*j] = i;
        } else {
            return Err(LdlError::InvalidPermutation);
        }
    }
    Ok(b)
}

// internal permutation and inverse permutation
// functions that require no memory allocations

fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a sparse symmetric matrix `A` (with only upper triangular entries), return
// permuted sparse symmetric matrix `P` (also only upper triangular) given the
// inverse permutation vector `iperm`."
fn _permute_symmetric<T: ScalarT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let (_m, n) = A.size();
    let mut P = CscMatrix::<T>::spalloc((n, n), A.nnz());

    // we will record a mapping of entries from A to PAPt
    let mut AtoPAPt = vec![0; A.nnz()];

    _permute_symmetric_inner(
        A,
        &mut AtoPAPt,
        iperm,
        &mut P.rowval,
        &mut P.colptr,
        &mut P.nzval,
    );
    (P, AtoPAPt)
}

// the main function without extra argument checks
// following the book: Timothy Davis - Direct Methods for Sparse Linear Systems

fn _permute_symmetric_inner<T: ScalarT>(
    A: &CscMatrix<T>,
    AtoPAPt: &mut [usize],
    iperm: &[usize],
    Pr: &mut [usize],
    Pc: &mut [usize],
    Pv: &mut [T],
) {
    // 1. count number of entries that each column of P will have
    let n = A.nrows();
    let mut num_entries = vec![0; n];
    let Ar = &A.rowval;
    let Ac = &A.colptr;
    let Av = &A.nzval;

    // count the number of upper-triangle entries in columns of P,
    // keeping in mind the row permutation
    for colA in 0..n {
        let colP = iperm[colA];
        // loop over entries of A in column A...
        for rowA in Ar.iter().take(Ac[colA + 1]).skip(Ac[colA]) {
            let rowP = iperm[*rowA];
            // ...and check if entry is upper triangular
            if *rowA <= colA {
                // determine to which column the entry belongs after permutation
                let col_idx = max(rowP, colP);
                num_entries[col_idx] += 1;
            }
        }
    }

    // 2. calculate permuted Pc = P.colptr from number of entries
    // Pc is one longer than num_entries here.
    Pc[0] = 0;
    let mut acc = 0;
    for (Pckp1, ne) in zip(&mut Pc[1..], &num_entries) {
        *Pckp1 = acc + ne;
        acc = *Pckp1;
    }
    // reuse this memory to keep track of free entries in rowval
    num_entries.copy_from_slice(&Pc[0..n]);

    // use alias
    let mut row_starts = num_entries;

    // 3. permute the row entries and position of corresponding nzval
    for colA in 0..n {
        let colP = iperm[colA];
        // loop over rows of A and determine where each row entry of A should be stored
        for rowA_idx in Ac[colA]..Ac[colA + 1] {
            let rowA = Ar[rowA_idx];
            // check if upper triangular
            if rowA <= colA {
                let rowP = iperm[rowA];
                // determine column to store the entry
                let col_idx = max(colP, rowP);

                // find next free location in rowval (this results in unordered columns in the rowval)
                let rowP_idx = row_starts[col_idx];

                // store rowval and nzval
                Pr[rowP_idx] = min(colP, rowP);
                Pv[rowP_idx] = Av[rowA_idx];

                //record this into the mapping vector
                AtoPAPt[rowA_idx] = rowP_idx;

                // increment next free location
                row_starts[col_idx] += 1;
            }
        }
    }
}

fn _get_amd_ordering<T: ScalarT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> (Vec<usize>, Vec<usize>) {
    // computes a permutation for A using AMD default parameters
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control).unwrap();
    (perm, iperm)
}

//configure tests of internals
#[path = "ldl_test.rs"]
#[cfg(test)]
mod test;
