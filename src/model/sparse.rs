//! Sparse vectors and matrices keyed by [`Identifier`].
//!
//! Absent keys are implicitly zero. A [`SparseMatrix`] keeps a row index and a
//! column index over one cell set; every mutation goes through both.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use serde::Serialize;

use super::Identifier;

/// Tolerance used when comparing accumulated floating-point mass.
pub const EPSILON: f64 = 1e-9;

// ============================================================================
// Cell
// ============================================================================

/// A numeric cell with an optional metadata tag.
///
/// The tag is fixed when the cell is first created; later writes to the same
/// key change only the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: f64,
    pub tag: Option<Identifier>,
}

impl Cell {
    pub fn new(value: f64) -> Self {
        Self { value, tag: None }
    }

    pub fn tagged(value: f64, tag: Identifier) -> Self {
        Self { value, tag: Some(tag) }
    }
}

// ============================================================================
// SparseVector
// ============================================================================

/// Mapping from identifier to cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseVector {
    cells: HashMap<Identifier, Cell>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: &str) -> f64 {
        self.cells.get(id).map_or(0.0, |c| c.value)
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    /// Accumulate `value` into the cell for `id`.
    pub fn add(&mut self, id: impl Into<Identifier>, value: f64) {
        self.cells
            .entry(id.into())
            .and_modify(|c| c.value += value)
            .or_insert_with(|| Cell::new(value));
    }

    /// Accumulate with a tag; the tag only sticks if the cell is new.
    pub fn add_tagged(&mut self, id: impl Into<Identifier>, value: f64, tag: Identifier) {
        match self.cells.entry(id.into()) {
            Entry::Occupied(mut e) => e.get_mut().value += value,
            Entry::Vacant(e) => {
                e.insert(Cell::tagged(value, tag));
            }
        }
    }

    /// Overwrite the value for `id`, keeping any existing tag.
    pub fn set(&mut self, id: impl Into<Identifier>, value: f64) {
        self.cells
            .entry(id.into())
            .and_modify(|c| c.value = value)
            .or_insert_with(|| Cell::new(value));
    }

    pub fn remove(&mut self, id: &str) -> Option<Cell> {
        self.cells.remove(id)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, f64)> {
        self.cells.iter().map(|(k, c)| (k, c.value))
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Identifier, &Cell)> {
        self.cells.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Identifier> {
        self.cells.keys()
    }

    pub fn sum(&self) -> f64 {
        self.cells.values().map(|c| c.value).sum()
    }

    /// Largest value, or `None` when empty.
    pub fn max(&self) -> Option<f64> {
        self.cells.values().map(|c| c.value).reduce(f64::max)
    }

    pub fn scale(&mut self, factor: f64) {
        for cell in self.cells.values_mut() {
            cell.value *= factor;
        }
    }

    /// Divide every value by the sum.
    ///
    /// Returns `false` and leaves the vector untouched when the sum is zero or
    /// not finite.
    pub fn normalize(&mut self) -> bool {
        let sum = self.sum();
        if sum == 0.0 || !sum.is_finite() {
            return false;
        }
        self.scale(1.0 / sum);
        true
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().map(|(k, v)| v * large.get(k)).sum()
    }

    /// Euclidean distance over the union of both key sets.
    pub fn euclidean_distance(&self, other: &SparseVector) -> f64 {
        let mut sq: f64 = self
            .iter()
            .map(|(k, v)| {
                let d = v - other.get(k);
                d * d
            })
            .sum();
        sq += other
            .iter()
            .filter(|(k, _)| !self.contains(k))
            .map(|(_, v)| v * v)
            .sum::<f64>();
        sq.sqrt()
    }

    /// Entries sorted by descending value, ties by identifier.
    pub fn sorted(&self) -> Vec<(&Identifier, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<K: Into<Identifier>> FromIterator<(K, f64)> for SparseVector {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut v = SparseVector::new();
        for (k, x) in iter {
            v.add(k, x);
        }
        v
    }
}

// ============================================================================
// SparseMatrix
// ============================================================================

/// Row → column → cell, with a parallel column → row index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SparseMatrix {
    rows: HashMap<Identifier, SparseVector>,
    #[serde(skip)]
    columns: HashMap<Identifier, SparseVector>,
}

impl SparseMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `value` into `(row, col)`.
    pub fn add(&mut self, row: impl Into<Identifier>, col: impl Into<Identifier>, value: f64) {
        let (row, col) = (row.into(), col.into());
        self.rows.entry(row.clone()).or_default().add(col.clone(), value);
        self.columns.entry(col).or_default().add(row, value);
    }

    /// Accumulate with a cell tag (fixed on first insertion).
    pub fn add_tagged(
        &mut self,
        row: impl Into<Identifier>,
        col: impl Into<Identifier>,
        value: f64,
        tag: Identifier,
    ) {
        let (row, col) = (row.into(), col.into());
        self.rows
            .entry(row.clone())
            .or_default()
            .add_tagged(col.clone(), value, tag.clone());
        self.columns.entry(col).or_default().add_tagged(row, value, tag);
    }

    pub fn get(&self, row: &str, col: &str) -> f64 {
        self.rows.get(row).map_or(0.0, |r| r.get(col))
    }

    pub fn row(&self, id: &str) -> Option<&SparseVector> {
        self.rows.get(id)
    }

    pub fn column(&self, id: &str) -> Option<&SparseVector> {
        self.columns.get(id)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Identifier, &SparseVector)> {
        self.rows.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Identifier, &SparseVector)> {
        self.columns.iter()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &Identifier> {
        self.rows.keys()
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &Identifier> {
        self.columns.keys()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of stored cells.
    pub fn nnz(&self) -> usize {
        self.rows.values().map(SparseVector::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.columns.clear();
    }

    /// Per-row sums.
    pub fn row_sums(&self) -> SparseVector {
        self.rows.iter().map(|(id, row)| (id.clone(), row.sum())).collect()
    }

    /// `vᵀ · M`: for every column `c`, `Σ_r v[r] · M[r][c]`.
    ///
    /// With rows as sources and columns as targets this pushes the mass in `v`
    /// one step along the edges.
    pub fn left_multiply(&self, v: &SparseVector) -> SparseVector {
        let mut out = SparseVector::new();
        for (col, column) in &self.columns {
            let x = column.dot(v);
            if x != 0.0 {
                out.set(col.clone(), x);
            }
        }
        out
    }

    /// `M · v`: for every row `r`, `Σ_c M[r][c] · v[c]`.
    pub fn multiply(&self, v: &SparseVector) -> SparseVector {
        let mut out = SparseVector::new();
        for (row, r) in &self.rows {
            let x = r.dot(v);
            if x != 0.0 {
                out.set(row.clone(), x);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vector(entries: &[(&str, f64)]) -> SparseVector {
        entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_add_accumulates() {
        let mut v = SparseVector::new();
        v.add("a", 1.0);
        v.add("a", 2.5);
        assert_eq!(v.get("a"), 3.5);
        assert_eq!(v.get("missing"), 0.0);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_tag_is_fixed_on_first_insert() {
        let mut v = SparseVector::new();
        v.add_tagged("a", 1.0, Identifier::new("wrapper"));
        v.add_tagged("a", 1.0, Identifier::new("document"));
        v.set("a", 7.0);
        let cell = v.cell("a").unwrap();
        assert_eq!(cell.value, 7.0);
        assert_eq!(cell.tag.as_ref().map(Identifier::as_str), Some("wrapper"));
    }

    #[test]
    fn test_normalize() {
        let mut v = vector(&[("a", 1.0), ("b", 3.0)]);
        assert!(v.normalize());
        assert!((v.get("a") - 0.25).abs() < EPSILON);
        assert!((v.sum() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_zero_vector_is_guarded() {
        let mut empty = SparseVector::new();
        assert!(!empty.normalize());

        let mut zeros = vector(&[("a", 0.0), ("b", 0.0)]);
        assert!(!zeros.normalize());
        assert_eq!(zeros.get("a"), 0.0);
    }

    #[test]
    fn test_dot_and_distance() {
        let a = vector(&[("x", 1.0), ("y", 2.0)]);
        let b = vector(&[("y", 3.0), ("z", 4.0)]);
        assert_eq!(a.dot(&b), 6.0);
        assert_eq!(b.dot(&a), 6.0);
        // (1-0)^2 + (2-3)^2 + (0-4)^2 = 18
        assert!((a.euclidean_distance(&b) - 18f64.sqrt()).abs() < EPSILON);
        assert_eq!(a.euclidean_distance(&a), 0.0);
    }

    #[test]
    fn test_sorted_descending() {
        let v = vector(&[("a", 1.0), ("b", 3.0), ("c", 3.0)]);
        let order: Vec<_> = v.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_matrix_views_agree() {
        let mut m = SparseMatrix::new();
        m.add("r1", "c1", 1.0);
        m.add("r1", "c2", 2.0);
        m.add("r2", "c1", 3.0);
        m.add("r1", "c1", 1.0);

        assert_eq!(m.get("r1", "c1"), 2.0);
        assert_eq!(m.column("c1").unwrap().get("r1"), 2.0);
        assert_eq!(m.column("c1").unwrap().get("r2"), 3.0);
        assert_eq!(m.nnz(), 3);

        let from_columns: usize = m.columns().map(|(_, c)| c.len()).sum();
        assert_eq!(from_columns, m.nnz());
        for (r, row) in m.rows() {
            for (c, x) in row.iter() {
                assert_eq!(m.column(c).unwrap().get(r), x);
            }
        }
    }

    #[test]
    fn test_left_and_right_multiply() {
        let mut m = SparseMatrix::new();
        m.add("a", "b", 0.5);
        m.add("a", "c", 0.5);
        m.add("b", "a", 1.0);

        let v = vector(&[("a", 1.0)]);
        let pushed = m.left_multiply(&v);
        assert_eq!(pushed.get("b"), 0.5);
        assert_eq!(pushed.get("c"), 0.5);
        assert_eq!(pushed.get("a"), 0.0);

        let pulled = m.multiply(&vector(&[("a", 2.0)]));
        assert_eq!(pulled.get("b"), 2.0);
        assert!(!pulled.contains("a"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(values in prop::collection::vec(0.001f64..1000.0, 1..20)) {
            let mut v: SparseVector = values
                .iter()
                .enumerate()
                .map(|(i, x)| (format!("k{i}"), *x))
                .collect();
            prop_assert!(v.normalize());
            let once = v.clone();
            prop_assert!(v.normalize());
            for (k, x) in once.iter() {
                prop_assert!((v.get(k) - x).abs() < 1e-12);
            }
            prop_assert!((v.sum() - 1.0).abs() < 1e-9);
        }
    }
}
