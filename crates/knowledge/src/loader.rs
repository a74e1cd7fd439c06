//! CSV document loading.
//!
//! Every data row becomes one [`Document`]. Page content is the row rendered
//! as `header: value` lines in column order, which is what gets embedded
//! and what the chat model reads.

use crate::types::{Document, DocumentMetadata};
use catalog_qa_core::{AppError, AppResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How rows are turned into documents.
#[derive(Debug, Clone)]
pub struct CsvLoaderOptions {
    /// Field delimiter
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Column whose value becomes `metadata.source` instead of the file path
    pub source_column: Option<String>,

    /// Columns copied into `metadata.extra` and left out of the page content
    pub metadata_columns: Vec<String>,

    /// When non-empty, only these columns make up the page content
    pub content_columns: Vec<String>,
}

impl Default for CsvLoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            source_column: None,
            metadata_columns: Vec::new(),
            content_columns: Vec::new(),
        }
    }
}

/// Loads one CSV file.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
    options: CsvLoaderOptions,
}

/// Resolved column positions for one header row.
struct ColumnPlan {
    headers: Vec<String>,
    content: Vec<usize>,
    metadata: Vec<(String, usize)>,
    source: Option<usize>,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: CsvLoaderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvLoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and return one document per data row.
    pub fn load(&self) -> AppResult<Vec<Document>> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            AppError::Loader(format!("Failed to open {:?}: {}", self.path, e))
        })?;

        let documents = self.load_from_reader(file, &self.path.to_string_lossy())?;

        tracing::info!(
            path = %self.path.display(),
            rows = documents.len(),
            "Loaded CSV documents"
        );

        Ok(documents)
    }

    fn load_from_reader<R: Read>(&self, reader: R, source: &str) -> AppResult<Vec<Document>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header_record = reader
            .headers()
            .map_err(|e| AppError::Loader(format!("Failed to read header of {}: {}", source, e)))?;

        let headers: Vec<String> = header_record
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        if headers.is_empty() {
            return Err(AppError::Loader(format!("{} has no header row", source)));
        }

        let plan = self.plan_columns(headers, source)?;

        let mut documents = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                AppError::Loader(format!("Failed to read row {} of {}: {}", row, source, e))
            })?;

            if record.len() > plan.headers.len() {
                tracing::warn!(
                    row,
                    fields = record.len(),
                    columns = plan.headers.len(),
                    "Dropping surplus fields in {}",
                    source
                );
            }

            let value = |i: usize| record.get(i).unwrap_or("").trim();

            let page_content = plan
                .content
                .iter()
                .map(|&i| format!("{}: {}", plan.headers[i], value(i)))
                .collect::<Vec<_>>()
                .join("\n");

            let mut metadata = DocumentMetadata::new(
                plan.source.map(value).unwrap_or(source).to_string(),
                row,
            );
            for (name, i) in &plan.metadata {
                metadata.extra.insert(name.clone(), value(*i).to_string());
            }

            documents.push(Document::new(page_content, metadata));
        }

        Ok(documents)
    }

    fn plan_columns(&self, headers: Vec<String>, source: &str) -> AppResult<ColumnPlan> {
        let position = |name: &str| -> AppResult<usize> {
            headers
                .iter()
                .position(|h| h == name.trim())
                .ok_or_else(|| {
                    AppError::Loader(format!(
                        "Column '{}' not found in {} (columns: {})",
                        name,
                        source,
                        headers.join(", ")
                    ))
                })
        };

        let source_idx = self
            .options
            .source_column
            .as_deref()
            .map(position)
            .transpose()?;

        let metadata = self
            .options
            .metadata_columns
            .iter()
            .map(|name| position(name).map(|i| (name.trim().to_string(), i)))
            .collect::<AppResult<Vec<_>>>()?;

        let content = if self.options.content_columns.is_empty() {
            (0..headers.len()).collect::<Vec<_>>()
        } else {
            self.options
                .content_columns
                .iter()
                .map(|name| position(name))
                .collect::<AppResult<Vec<_>>>()?
        };
        let content = content
            .into_iter()
            .filter(|i| !metadata.iter().any(|(_, m)| m == i))
            .collect();

        Ok(ColumnPlan {
            headers,
            content,
            metadata,
            source: source_idx,
        })
    }
}

/// Load documents from files and directories.
///
/// Directories are walked for `*.csv` files (any case), sorted by path so
/// row order is stable between runs.
pub fn load_paths(paths: &[PathBuf], options: &CsvLoaderOptions) -> AppResult<Vec<Document>> {
    let mut documents = Vec::new();

    for file in expand_paths(paths)? {
        let loader = CsvLoader::new(file).with_options(options.clone());
        documents.extend(loader.load()?);
    }

    Ok(documents)
}

/// Expand directories into their CSV files.
pub fn expand_paths(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_csv(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();

            if found.is_empty() {
                tracing::warn!("No CSV files found under {:?}", path);
            }
            files.extend(found);
        } else {
            return Err(AppError::Loader(format!("Path does not exist: {:?}", path)));
        }
    }

    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
