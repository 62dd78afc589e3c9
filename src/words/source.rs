//! Word source: the loaded spreadsheet grid and random draws from it.
//!
//! [`read_grid`] opens a headerless `.xlsx` workbook with `calamine` and turns
//! its first (or a named) worksheet into a [`TabularData`]: one `Vec<String>`
//! per row holding only the non-empty cells.  [`WordSource`] owns the grid
//! that is currently loaded and replaces it wholesale on every successful
//! load.
//!
//! # Sampling
//!
//! [`WordSource::pick_random`] draws a row uniformly, then a cell uniformly
//! from that row.  Rows with fewer words therefore give each of their words a
//! larger share than a flat draw over all cells would.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;

// ---------------------------------------------------------------------------
// WordSourceError
// ---------------------------------------------------------------------------

/// Errors raised while loading or drawing from the word grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WordSourceError {
    /// The file could not be read or is not a valid workbook.
    #[error("Failed to load Excel sheet: {0}")]
    Load(String),

    /// The workbook parsed fine but holds no usable rows.
    #[error("The Excel sheet is empty.")]
    Empty,

    /// A draw was attempted before any grid was loaded.
    #[error("No word sheet is loaded")]
    NotLoaded,
}

// ---------------------------------------------------------------------------
// TabularData
// ---------------------------------------------------------------------------

/// Immutable grid of cell values, rows of non-empty words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    rows: Vec<Vec<String>>,
}

impl TabularData {
    /// Build a grid from raw rows.
    ///
    /// Cells are trimmed; blank cells are dropped and rows left with no
    /// cells are dropped entirely.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_ref().trim().to_string())
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        Self { rows }
    }

    /// Rows that hold at least one word.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Total number of words across every row.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `true` when `word` appears in any cell.
    pub fn contains(&self, word: &str) -> bool {
        self.rows.iter().flatten().any(|cell| cell == word)
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reading
// ---------------------------------------------------------------------------

/// Read a headerless `.xlsx` workbook into a [`TabularData`].
///
/// `worksheet` selects a sheet by name; `None` takes the first sheet.
///
/// # Errors
///
/// - [`WordSourceError::Load`]: the file is missing, unreadable, not an
///   xlsx workbook, or the named worksheet does not exist.
///
/// Emptiness is *not* checked here; see [`WordSource::load_grid`].
pub fn read_grid(path: &Path, worksheet: Option<&str>) -> Result<TabularData, WordSourceError> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook::<Xlsx<BufReader<File>>, _>(path).map_err(|e| WordSourceError::Load(e.to_string()))?;

    let range = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|e| WordSourceError::Load(e.to_string()))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| WordSourceError::Load("workbook has no worksheets".into()))?
            .map_err(|e| WordSourceError::Load(e.to_string()))?,
    };

    let rows = range
        .rows()
        .map(|row| row.iter().filter_map(cell_text).collect::<Vec<_>>());

    Ok(TabularData::from_rows(rows))
}

/// Text shown for a single cell, `None` for blanks and error cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(format_number(*v)),
        Data::Bool(true) => Some("TRUE".into()),
        Data::Bool(false) => Some("FALSE".into()),
        Data::DateTime(v) => Some(format_number(v.as_f64())),
    }
}

/// Integral floats print without a fractional part (`3.0` → `"3"`).
fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// WordSource
// ---------------------------------------------------------------------------

/// Owns the currently loaded grid.
#[derive(Debug, Default)]
pub struct WordSource {
    data: Option<TabularData>,
    origin: Option<PathBuf>,
}

impl WordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and replace the loaded grid.
    ///
    /// On any error the previously loaded grid (if any) stays in place.
    pub fn load(&mut self, path: &Path, worksheet: Option<&str>) -> Result<(), WordSourceError> {
        let grid = read_grid(path, worksheet)?;
        self.load_grid(grid)?;
        self.origin = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the loaded grid with `grid`.
    ///
    /// # Errors
    ///
    /// - [`WordSourceError::Empty`]: `grid` has zero rows; nothing changes.
    pub fn load_grid(&mut self, grid: TabularData) -> Result<(), WordSourceError> {
        if grid.is_empty() {
            return Err(WordSourceError::Empty);
        }
        self.data = Some(grid);
        self.origin = None;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The grid currently loaded, if any.
    pub fn data(&self) -> Option<&TabularData> {
        self.data.as_ref()
    }

    /// Path of the workbook the grid came from (`None` for in-memory grids).
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Draw one word: a uniform row, then a uniform cell within it.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, WordSourceError> {
        let data = self.data.as_ref().ok_or(WordSourceError::NotLoaded)?;
        data.rows
            .choose(&mut *rng)
            .and_then(|row| row.choose(&mut *rng))
            .map(String::as_str)
            .ok_or(WordSourceError::Empty)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_xlsxwriter::Workbook;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn animals() -> TabularData {
        TabularData::from_rows(vec![
            vec!["cat", "dog"],
            vec!["fish"],
            vec!["bird", "mouse", "hamster"],
        ])
    }

    fn write_workbook(path: &Path, rows: &[&[&str]]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *cell).expect("write cell");
            }
        }
        workbook.save(path).expect("save workbook");
    }

    // --- TabularData ---

    #[test]
    fn from_rows_drops_blank_cells_and_rows() {
        let grid = TabularData::from_rows(vec![
            vec!["  cat ", "", "dog"],
            vec!["", "   "],
            vec!["fish"],
        ]);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell_count(), 3);
        assert_eq!(grid.rows()[0], vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }

    // --- WordSource ---

    #[test]
    fn starts_unloaded() {
        let source = WordSource::new();
        assert!(!source.is_loaded());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(source.pick_random(&mut rng), Err(WordSourceError::NotLoaded));
    }

    #[test]
    fn empty_grid_is_rejected_and_keeps_previous() {
        let mut source = WordSource::new();
        source.load_grid(animals()).unwrap();

        let err = source.load_grid(TabularData::default()).unwrap_err();
        assert_eq!(err, WordSourceError::Empty);
        assert!(source.is_loaded());
        assert_eq!(source.data().unwrap().row_count(), 3);
    }

    #[test]
    fn picks_stay_inside_the_grid() {
        let mut source = WordSource::new();
        source.load_grid(animals()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let word = source.pick_random(&mut rng).unwrap();
            assert!(source.data().unwrap().contains(word), "unexpected {word}");
        }
    }

    #[test]
    fn draw_is_row_first_then_cell() {
        // Row 1 holds a single word, so it should come up roughly a third of
        // the time rather than a sixth as a flat draw would give.
        let mut source = WordSource::new();
        source.load_grid(animals()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut counts: HashMap<String, usize> = HashMap::new();
        let draws = 6_000;
        for _ in 0..draws {
            let word = source.pick_random(&mut rng).unwrap().to_string();
            *counts.entry(word).or_default() += 1;
        }

        let fish = counts["fish"] as f64 / draws as f64;
        assert!((fish - 1.0 / 3.0).abs() < 0.05, "fish share was {fish}");
        let hamster = counts["hamster"] as f64 / draws as f64;
        assert!((hamster - 1.0 / 9.0).abs() < 0.04, "hamster share was {hamster}");
    }

    // --- read_grid / load ---

    #[test]
    fn load_reads_headerless_workbook() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("words.xlsx");
        write_workbook(&path, &[&["cat", "dog"], &["fish"]]);

        let mut source = WordSource::new();
        source.load(&path, None).expect("load");
        let data = source.data().unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.rows()[0][0], "cat");
        assert_eq!(source.origin(), Some(path.as_path()));
    }

    #[test]
    fn load_empty_workbook_reports_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("empty.xlsx");
        write_workbook(&path, &[]);

        let mut source = WordSource::new();
        assert_eq!(source.load(&path, None), Err(WordSourceError::Empty));
        assert!(!source.is_loaded());
    }

    #[test]
    fn load_missing_file_reports_load_error() {
        let mut source = WordSource::new();
        let err = source
            .load(Path::new("/nonexistent/words.xlsx"), None)
            .unwrap_err();
        assert!(matches!(err, WordSourceError::Load(_)));
    }

    #[test]
    fn load_garbage_file_reports_load_error_and_keeps_state() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let mut source = WordSource::new();
        source.load_grid(animals()).unwrap();
        let err = source.load(&path, None).unwrap_err();
        assert!(matches!(err, WordSourceError::Load(_)));
        assert_eq!(source.data().unwrap().cell_count(), 6);
    }

    #[test]
    fn unknown_worksheet_reports_load_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("words.xlsx");
        write_workbook(&path, &[&["cat"]]);

        let err = read_grid(&path, Some("NoSuchSheet")).unwrap_err();
        assert!(matches!(err, WordSourceError::Load(_)));
    }

    #[test]
    fn error_messages_match_dialog_text() {
        assert_eq!(WordSourceError::Empty.to_string(), "The Excel sheet is empty.");
        assert!(WordSourceError::Load("bad zip".into())
            .to_string()
            .starts_with("Failed to load Excel sheet"));
    }
}
