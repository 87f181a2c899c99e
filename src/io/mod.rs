use std::path::Path;
use thiserror::Error;

use crate::sparse::CscMatrix;

// Module declarations
pub mod matrix_market;

// Re-exports
pub use matrix_market::MatrixMarketLoader;

/// Errors that can occur while reading or writing matrix files
#[derive(Error, Debug)]
pub enum SinvIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid Matrix Market header: {0}")]
    InvalidHeader(String),

    #[error("Dense (array) Matrix Market files are not supported")]
    DenseFormat,

    #[error("Complex-valued matrices are not supported")]
    ComplexField,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid number format at line {line}: {value}")]
    InvalidNumber { line: usize, value: String },

    #[error("Missing required fields at line {line}")]
    MissingFields { line: usize },

    #[error("Entry ({row}, {col}) at line {line} is outside the declared matrix size")]
    IndexOutOfBounds { line: usize, row: usize, col: usize },
}

/// Convenience function to load any supported format based on file extension
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<CscMatrix, SinvIoError> {
    let path_ref = path.as_ref();
    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| SinvIoError::UnsupportedFormat("No file extension".to_string()))?;

    match extension.to_lowercase().as_str() {
        "mtx" => MatrixMarketLoader::load(path),
        _ => Err(SinvIoError::UnsupportedFormat(format!(
            "Unsupported extension: {extension}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_matrix_by_extension() -> Result<(), SinvIoError> {
        let mut temp_file = Builder::new().suffix(".mtx").tempfile()?;
        writeln!(temp_file, "%%MatrixMarket matrix coordinate real general")?;
        writeln!(temp_file, "2 2 2")?;
        writeln!(temp_file, "1 1 4.0")?;
        writeln!(temp_file, "2 2 5.0")?;

        let matrix = load_matrix(temp_file.path())?;
        assert_eq!(matrix.diagonal(), vec![4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn test_load_matrix_rejects_unknown_extension() {
        let result = load_matrix("matrix.g2o");
        assert!(matches!(result, Err(SinvIoError::UnsupportedFormat(_))));

        let result = load_matrix("matrix");
        assert!(matches!(result, Err(SinvIoError::UnsupportedFormat(_))));
    }
}
