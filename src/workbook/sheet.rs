use crate::workbook::cell::Cell;

/// A worksheet read from a workbook: sparse cells plus the bounding box they span.
/// Cells arrive in document order (rows ascending, columns ascending within a row).
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Adds a cell to the sheet, updating the bounding box.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.is_none() { // First cell
            self.row_lower_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
        self.row_upper_bound = Some(row);
    }

    /// Materializes the sheet as a dense grid of optional cell references
    /// covering the full bounding box. Empty sheets yield an empty grid.
    pub(crate) fn grid(&self) -> Vec<Vec<Option<&Cell>>> {
        let (Some(row_lower), Some(row_upper), Some(col_lower), Some(col_upper)) = (
            self.row_lower_bound,
            self.row_upper_bound,
            self.col_lower_bound,
            self.col_upper_bound,
        ) else {
            return Vec::new();
        };

        let mut index = 0usize;
        let mut table = Vec::<Vec<Option<&Cell>>>::new();
        for row in row_lower..=row_upper {
            let mut record = Vec::<Option<&Cell>>::new();
            for col in col_lower..=col_upper {
                match self.cells.get(index) {
                    Some(cell) if row == cell.row && col == cell.col => {
                        record.push(Some(cell));
                        index += 1;
                    }
                    _ => record.push(None),
                }
            }
            table.push(record);
        }
        table
    }
}
