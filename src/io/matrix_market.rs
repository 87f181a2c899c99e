use super::*;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::debug;

/// Loader and writer for Matrix Market coordinate files (`.mtx`).
///
/// Supported headers are `%%MatrixMarket matrix coordinate real|integer general|symmetric`.
/// Symmetric files store one triangle and are mirrored into a full matrix on load.
pub struct MatrixMarketLoader;

/// Line count above which entries are parsed in parallel
const PARALLEL_THRESHOLD: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

impl MatrixMarketLoader {
    /// Load a sparse matrix from a Matrix Market file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CscMatrix, SinvIoError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap).map_err(|e| SinvIoError::Parse {
            line: 0,
            message: format!("Invalid UTF-8: {e}"),
        })?;

        Self::parse_content(content)
    }

    /// Write a matrix in coordinate real format.
    ///
    /// With `symmetric`, only the lower triangle is written and the header says so;
    /// the caller is responsible for the matrix actually being symmetric.
    pub fn write<P: AsRef<Path>>(
        matrix: &CscMatrix,
        path: P,
        symmetric: bool,
    ) -> Result<(), SinvIoError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let (symmetry, entries): (&str, Vec<_>) = if symmetric {
            ("symmetric", matrix.triplets().filter(|&(i, j, _)| i >= j).collect())
        } else {
            ("general", matrix.triplets().collect())
        };

        writeln!(writer, "%%MatrixMarket matrix coordinate real {symmetry}")?;
        writeln!(
            writer,
            "{} {} {}",
            matrix.nrows(),
            matrix.ncols(),
            entries.len()
        )?;
        for (row, col, value) in entries {
            writeln!(writer, "{} {} {}", row + 1, col + 1, value)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn parse_content(content: &str) -> Result<CscMatrix, SinvIoError> {
        let mut lines = content.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| SinvIoError::InvalidHeader("empty file".to_string()))?;
        let symmetry = Self::parse_header(header)?;

        // size line: first line that is neither a comment nor blank
        let (size_line_num, size_line) = lines
            .by_ref()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .find(|(_, line)| !line.is_empty() && !line.starts_with('%'))
            .ok_or(SinvIoError::MissingFields { line: 2 })?;
        let (nrows, ncols, declared) = Self::parse_size(size_line, size_line_num)?;

        let entry_lines: Vec<(usize, &str)> = lines
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('%'))
            .collect();

        if entry_lines.len() != declared {
            return Err(SinvIoError::Parse {
                line: size_line_num,
                message: format!(
                    "header declares {declared} entries, file contains {}",
                    entry_lines.len()
                ),
            });
        }

        let parse = |&(line_num, line): &(usize, &str)| {
            Self::parse_entry(line, line_num, nrows, ncols)
        };
        let entries: Vec<(usize, usize, f64)> = if entry_lines.len() > PARALLEL_THRESHOLD {
            entry_lines.par_iter().map(parse).collect::<Result<_, _>>()?
        } else {
            entry_lines.iter().map(parse).collect::<Result<_, _>>()?
        };

        let mut triplets = entries;
        if symmetry == Symmetry::Symmetric {
            let mirrored: Vec<_> = triplets
                .iter()
                .filter(|&&(row, col, _)| row != col)
                .map(|&(row, col, value)| (col, row, value))
                .collect();
            triplets.extend(mirrored);
        }

        debug!(
            "Loaded Matrix Market file: {}x{}, {} stored entries ({:?})",
            nrows,
            ncols,
            triplets.len(),
            symmetry
        );

        CscMatrix::from_triplets(nrows, ncols, &triplets).map_err(|e| SinvIoError::Parse {
            line: size_line_num,
            message: e.to_string(),
        })
    }

    fn parse_header(header: &str) -> Result<Symmetry, SinvIoError> {
        let parts: Vec<String> = header
            .split_whitespace()
            .map(|part| part.to_lowercase())
            .collect();

        if parts.len() != 5 || parts[0] != "%%matrixmarket" || parts[1] != "matrix" {
            return Err(SinvIoError::InvalidHeader(header.to_string()));
        }

        match parts[2].as_str() {
            "coordinate" => {}
            "array" => return Err(SinvIoError::DenseFormat),
            other => return Err(SinvIoError::InvalidHeader(format!("format '{other}'"))),
        }

        match parts[3].as_str() {
            "real" | "double" | "integer" => {}
            "complex" => return Err(SinvIoError::ComplexField),
            "pattern" => {
                return Err(SinvIoError::UnsupportedFormat(
                    "pattern matrices carry no values".to_string(),
                ));
            }
            other => return Err(SinvIoError::InvalidHeader(format!("field '{other}'"))),
        }

        match parts[4].as_str() {
            "general" => Ok(Symmetry::General),
            "symmetric" => Ok(Symmetry::Symmetric),
            "hermitian" | "skew-symmetric" => Err(SinvIoError::UnsupportedFormat(format!(
                "{} matrices",
                parts[4]
            ))),
            other => Err(SinvIoError::InvalidHeader(format!("symmetry '{other}'"))),
        }
    }

    fn parse_size(line: &str, line_num: usize) -> Result<(usize, usize, usize), SinvIoError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(SinvIoError::MissingFields { line: line_num });
        }
        let nrows = Self::parse_index(parts[0], line_num)?;
        let ncols = Self::parse_index(parts[1], line_num)?;
        let nnz = Self::parse_index(parts[2], line_num)?;
        Ok((nrows, ncols, nnz))
    }

    /// Parse one `row col value` line into 0-based indices.
    fn parse_entry(
        line: &str,
        line_num: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<(usize, usize, f64), SinvIoError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(SinvIoError::MissingFields { line: line_num });
        }

        let row = Self::parse_index(parts[0], line_num)?;
        let col = Self::parse_index(parts[1], line_num)?;
        let value = parts[2]
            .parse::<f64>()
            .map_err(|_| SinvIoError::InvalidNumber {
                line: line_num,
                value: parts[2].to_string(),
            })?;

        if row == 0 || col == 0 || row > nrows || col > ncols {
            return Err(SinvIoError::IndexOutOfBounds {
                line: line_num,
                row,
                col,
            });
        }

        Ok((row - 1, col - 1, value))
    }

    fn parse_index(value: &str, line_num: usize) -> Result<usize, SinvIoError> {
        value.parse::<usize>().map_err(|_| SinvIoError::InvalidNumber {
            line: line_num,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_file(lines: &[&str]) -> Result<NamedTempFile, std::io::Error> {
        let mut temp_file = NamedTempFile::new()?;
        for line in lines {
            writeln!(temp_file, "{line}")?;
        }
        Ok(temp_file)
    }

    #[test]
    fn test_load_general() -> Result<(), SinvIoError> {
        let temp_file = write_file(&[
            "%%MatrixMarket matrix coordinate real general",
            "% a comment",
            "3 3 4",
            "1 1 2.0",
            "2 1 -1.0",
            "",
            "3 3 1e-2",
            "2 2 4",
        ])?;

        let matrix = MatrixMarketLoader::load(temp_file.path())?;
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.nnz(), 4);
        assert_eq!(matrix.get(1, 0), Some(-1.0));
        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.get(2, 2), Some(0.01));
        Ok(())
    }

    #[test]
    fn test_load_symmetric_mirrors() -> Result<(), SinvIoError> {
        let temp_file = write_file(&[
            "%%MatrixMarket matrix coordinate integer symmetric",
            "2 2 3",
            "1 1 2",
            "2 1 -1",
            "2 2 2",
        ])?;

        let matrix = MatrixMarketLoader::load(temp_file.path())?;
        assert_eq!(matrix.nnz(), 4);
        assert_eq!(matrix.get(0, 1), Some(-1.0));
        assert_eq!(matrix.get(1, 0), Some(-1.0));
        Ok(())
    }

    #[test]
    fn test_header_errors() -> Result<(), std::io::Error> {
        let cases: [(&str, fn(&SinvIoError) -> bool); 5] = [
            ("%%MatrixMarket matrix array real general", |e| {
                matches!(e, SinvIoError::DenseFormat)
            }),
            ("%%MatrixMarket matrix coordinate complex general", |e| {
                matches!(e, SinvIoError::ComplexField)
            }),
            ("%%MatrixMarket matrix coordinate pattern general", |e| {
                matches!(e, SinvIoError::UnsupportedFormat(_))
            }),
            ("%%MatrixMarket matrix coordinate real hermitian", |e| {
                matches!(e, SinvIoError::UnsupportedFormat(_))
            }),
            ("%%NotMatrixMarket", |e| {
                matches!(e, SinvIoError::InvalidHeader(_))
            }),
        ];

        for (header, expected) in cases {
            let temp_file = write_file(&[header, "1 1 1", "1 1 1.0"])?;
            let err = MatrixMarketLoader::load(temp_file.path()).unwrap_err();
            assert!(expected(&err), "{header}: got {err}");
        }
        Ok(())
    }

    #[test]
    fn test_entry_errors() -> Result<(), std::io::Error> {
        let header = "%%MatrixMarket matrix coordinate real general";

        let temp_file = write_file(&[header, "2 2 1", "1 x 1.0"])?;
        assert!(matches!(
            MatrixMarketLoader::load(temp_file.path()),
            Err(SinvIoError::InvalidNumber { line: 3, .. })
        ));

        let temp_file = write_file(&[header, "2 2 1", "3 1 1.0"])?;
        assert!(matches!(
            MatrixMarketLoader::load(temp_file.path()),
            Err(SinvIoError::IndexOutOfBounds { line: 3, row: 3, col: 1 })
        ));

        let temp_file = write_file(&[header, "2 2 2", "1 1 1.0"])?;
        assert!(matches!(
            MatrixMarketLoader::load(temp_file.path()),
            Err(SinvIoError::Parse { line: 2, .. })
        ));

        let temp_file = write_file(&[header, "2 2 1", "1 1"])?;
        assert!(matches!(
            MatrixMarketLoader::load(temp_file.path()),
            Err(SinvIoError::MissingFields { line: 3 })
        ));
        Ok(())
    }

    #[test]
    fn test_parallel_parse_large_file() -> Result<(), SinvIoError> {
        let n = PARALLEL_THRESHOLD + 100;
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "%%MatrixMarket matrix coordinate real general")?;
        writeln!(temp_file, "{n} {n} {n}")?;
        for i in 1..=n {
            writeln!(temp_file, "{i} {i} {i}.5")?;
        }

        let matrix = MatrixMarketLoader::load(temp_file.path())?;
        assert_eq!(matrix.nnz(), n);
        assert_eq!(matrix.get(0, 0), Some(1.5));
        assert_eq!(matrix.get(n - 1, n - 1), Some(n as f64 + 0.5));
        Ok(())
    }

    #[test]
    fn test_write_round_trip() -> Result<(), SinvIoError> {
        let matrix = CscMatrix::from_triplets(
            3,
            3,
            &[
                (0, 0, 0.1),
                (1, 0, 1.0 / 3.0),
                (0, 1, 1.0 / 3.0),
                (1, 1, 2.0),
                (2, 2, -7.25e-9),
            ],
        )
        .map_err(|e| SinvIoError::Parse {
            line: 0,
            message: e.to_string(),
        })?;

        for symmetric in [false, true] {
            let temp_file = NamedTempFile::new()?;
            MatrixMarketLoader::write(&matrix, temp_file.path(), symmetric)?;
            let loaded = MatrixMarketLoader::load(temp_file.path())?;
            assert_eq!(loaded, matrix);
        }
        Ok(())
    }
}
