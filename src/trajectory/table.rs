// src/trajectory/table.rs
// Plain delimited numeric tables for pre-baked trajectories and seed dumps.

use nalgebra::DMatrix;
use std::path::Path;

use crate::PlanningError;
use crate::config::{PrebakedSource, TableOrientation};

/// Read a table as a (row × column) matrix, rounding every value to `precision` decimals
pub fn read_matrix(path: &Path, delimiter: char, precision: usize) -> Result<DMatrix<f64>, PlanningError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter_byte(delimiter)?)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PlanningError::Table(format!("{}: {}", path.display(), e)))?;

    let mut values = Vec::new();
    let mut columns = 0;
    let mut rows = 0;
    for record in reader.records() {
        let record = record.map_err(|e| PlanningError::Table(e.to_string()))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        for field in record.iter() {
            let value: f64 = field
                .parse()
                .map_err(|_| PlanningError::Table(format!("row {}: '{}' is not a number", rows + 1, field)))?;
            values.push(round_to(value, precision));
        }
        columns = record.len();
        rows += 1;
    }

    if rows == 0 {
        return Err(PlanningError::Table(format!("{} holds no rows", path.display())));
    }
    Ok(DMatrix::from_row_slice(rows, columns, &values))
}

/// Read a pre-baked source and orient it as (point × joint)
pub fn read_source(source: &PrebakedSource) -> Result<DMatrix<f64>, PlanningError> {
    let matrix = read_matrix(&source.path, source.delimiter, source.precision)?;
    log::info!(
        "Read {}x{} trajectory table from {}",
        matrix.nrows(),
        matrix.ncols(),
        source.path.display()
    );
    Ok(match source.orientation {
        TableOrientation::PointsAsRows => matrix,
        TableOrientation::PointsAsColumns => matrix.transpose(),
    })
}

/// Write `matrix` one row per line with `precision` decimals
pub fn write_matrix(
    path: &Path,
    matrix: &DMatrix<f64>,
    delimiter: char,
    precision: usize,
) -> Result<(), PlanningError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter_byte(delimiter)?)
        .from_path(path)
        .map_err(|e| PlanningError::Table(format!("{}: {}", path.display(), e)))?;

    for row in matrix.row_iter() {
        let fields: Vec<String> = row.iter().map(|v| format!("{:.*}", precision, v)).collect();
        writer
            .write_record(&fields)
            .map_err(|e| PlanningError::Table(e.to_string()))?;
    }
    writer.flush().map_err(|e| PlanningError::Table(e.to_string()))?;
    Ok(())
}

fn delimiter_byte(delimiter: char) -> Result<u8, PlanningError> {
    if !delimiter.is_ascii() {
        return Err(PlanningError::Table(format!("delimiter '{}' is not ASCII", delimiter)));
    }
    Ok(delimiter as u8)
}

fn round_to(value: f64, precision: usize) -> f64 {
    // beyond f64's ~15 significant digits rounding only adds error
    if precision >= 15 {
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}
