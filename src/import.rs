//! Export snapshots and reconcile them back into remote storage.
//!
//! An import walks `Idle -> FileSelected -> ConflictCheck -> NoConflict |
//! ConflictDetected -> StrategyChosen -> Applying -> Done | Failed`. The file is
//! validated before any remote call. Applying is best effort: a failure midway
//! leaves whatever was already written in place.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;

use crate::backend::{BackendError, ListBackend};
use crate::codes::unique_list_code;
use crate::models::{Categories, ExportFile, ListData, ListItemPayload, ShoppingListDocument};
use crate::utils::{backend_error, run_bulk, validate_item_name};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// Always create a new list under a fresh code.
    NewCode,
    /// Replace the conflicting list's categories, name and items.
    Overwrite,
    /// Union categories (imported wins per key) and append imported items.
    Merge,
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStrategy::NewCode => "new_code",
            ImportStrategy::Overwrite => "overwrite",
            ImportStrategy::Merge => "merge",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    FileSelected,
    ConflictCheck,
    NoConflict,
    ConflictDetected,
    StrategyChosen(ImportStrategy),
    Applying,
    Done,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid import file: {0}")]
    Format(String),

    #[error("Strategy {0} is not available for this import")]
    StrategyUnavailable(ImportStrategy),

    #[error("Cannot {action} while import is {phase:?}")]
    InvalidPhase {
        action: &'static str,
        phase: ImportPhase,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ImportError {
    pub fn into_http(self) -> (StatusCode, String) {
        match self {
            ImportError::Format(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ImportError::StrategyUnavailable(_) | ImportError::InvalidPhase { .. } => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ImportError::Backend(e) => backend_error(e),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub list_id: String,
    pub list_code: String,
    pub strategy: ImportStrategy,
    pub items_created: usize,
}

/// Validates an export file. `items` must be present and an array, and every
/// item name must be acceptable as an atomic record.
pub fn parse_import_value(value: serde_json::Value) -> Result<ExportFile, ImportError> {
    match value.get("items") {
        Some(serde_json::Value::Array(_)) => {}
        _ => {
            return Err(ImportError::Format(
                "`items` must be present and be an array".to_string(),
            ));
        }
    }
    let file: ExportFile =
        serde_json::from_value(value).map_err(|e| ImportError::Format(e.to_string()))?;

    for (index, item) in file.items.iter().enumerate() {
        validate_item_name(&item.name)
            .map_err(|e| ImportError::Format(format!("item {}: {}", index, e)))?;
    }
    Ok(file)
}

pub fn parse_import_file(raw: &str) -> Result<ExportFile, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Format(e.to_string()))?;
    parse_import_value(value)
}

/// Key-wise union; on collision the imported entry replaces the existing one
/// entirely (its item list is not concatenated).
pub fn merge_categories(
    existing: Option<&Categories>,
    imported: Option<&Categories>,
) -> Option<Categories> {
    match (existing, imported) {
        (None, None) => None,
        (existing, imported) => {
            let mut merged = existing.cloned().unwrap_or_default();
            if let Some(imported) = imported {
                merged.extend(imported.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(merged)
        }
    }
}

pub struct ImportSession {
    phase: ImportPhase,
    file: Option<ExportFile>,
    conflict: Option<ShoppingListDocument>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        ImportSession {
            phase: ImportPhase::Idle,
            file: None,
            conflict: None,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&ExportFile> {
        self.file.as_ref()
    }

    pub fn conflict(&self) -> Option<&ShoppingListDocument> {
        self.conflict.as_ref()
    }

    /// A rejected file leaves the session where it was.
    pub fn select_file(&mut self, raw: &str) -> Result<(), ImportError> {
        let file = parse_import_file(raw)?;
        self.select_parsed(file);
        Ok(())
    }

    pub fn select_value(&mut self, value: serde_json::Value) -> Result<(), ImportError> {
        let file = parse_import_value(value)?;
        self.select_parsed(file);
        Ok(())
    }

    fn select_parsed(&mut self, file: ExportFile) {
        self.file = Some(file);
        self.conflict = None;
        self.phase = ImportPhase::FileSelected;
    }

    /// Looks for an existing list with the file's code.
    pub async fn check_conflict<B>(
        &mut self,
        backend: &B,
    ) -> Result<Option<&ShoppingListDocument>, ImportError>
    where
        B: ListBackend + ?Sized,
    {
        let file = match (&self.phase, &self.file) {
            (
                ImportPhase::FileSelected | ImportPhase::NoConflict | ImportPhase::ConflictDetected,
                Some(file),
            ) => file,
            _ => {
                return Err(ImportError::InvalidPhase {
                    action: "check for conflicts",
                    phase: self.phase,
                });
            }
        };

        self.phase = ImportPhase::ConflictCheck;
        let code = file.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let existing = match code {
            Some(code) => match backend.list_by_code(code).await {
                Ok(existing) => existing,
                Err(e) => {
                    self.phase = ImportPhase::Failed;
                    return Err(e.into());
                }
            },
            None => None,
        };

        self.phase = if existing.is_some() {
            ImportPhase::ConflictDetected
        } else {
            ImportPhase::NoConflict
        };
        self.conflict = existing;
        Ok(self.conflict.as_ref())
    }

    pub fn offered_strategies(&self) -> Vec<ImportStrategy> {
        match self.phase {
            ImportPhase::ConflictDetected => vec![
                ImportStrategy::NewCode,
                ImportStrategy::Overwrite,
                ImportStrategy::Merge,
            ],
            ImportPhase::NoConflict => vec![ImportStrategy::NewCode],
            _ => Vec::new(),
        }
    }

    pub fn choose(&mut self, strategy: ImportStrategy) -> Result<(), ImportError> {
        if !matches!(
            self.phase,
            ImportPhase::NoConflict | ImportPhase::ConflictDetected
        ) {
            return Err(ImportError::InvalidPhase {
                action: "choose a strategy",
                phase: self.phase,
            });
        }
        if !self.offered_strategies().contains(&strategy) {
            return Err(ImportError::StrategyUnavailable(strategy));
        }
        self.phase = ImportPhase::StrategyChosen(strategy);
        Ok(())
    }

    pub async fn apply<B>(&mut self, backend: &B) -> Result<ImportOutcome, ImportError>
    where
        B: ListBackend + ?Sized,
    {
        let (ImportPhase::StrategyChosen(strategy), Some(file)) = (self.phase, self.file.as_ref())
        else {
            return Err(ImportError::InvalidPhase {
                action: "apply",
                phase: self.phase,
            });
        };

        self.phase = ImportPhase::Applying;
        match apply_import(backend, file, self.conflict.as_ref(), strategy).await {
            Ok(outcome) => {
                self.phase = ImportPhase::Done;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, %strategy, "import failed");
                self.phase = ImportPhase::Failed;
                Err(e)
            }
        }
    }
}

/// Writes `file` to the remote under `strategy`.
///
/// `Overwrite` and `Merge` need the conflicting list; `NewCode` never touches it.
/// Imported items are always created as new atomic records, with no
/// de-duplication against what the target already holds.
pub async fn apply_import<B>(
    backend: &B,
    file: &ExportFile,
    conflict: Option<&ShoppingListDocument>,
    strategy: ImportStrategy,
) -> Result<ImportOutcome, ImportError>
where
    B: ListBackend + ?Sized,
{
    let target = match (strategy, conflict) {
        (ImportStrategy::NewCode, _) => {
            let code = unique_list_code(backend, file.code.as_deref()).await?;
            let data = ListData {
                items: Vec::new(),
                categories: file.categories.clone(),
                list_name: file.list_name.clone(),
            };
            backend.create_list(&code, &data).await?
        }
        (ImportStrategy::Overwrite, Some(existing)) => {
            let data = ListData {
                items: existing.data.items.clone(),
                categories: file.categories.clone(),
                list_name: file.list_name.clone(),
            };
            let updated = backend.update_list(&existing.id, &data).await?;

            let stale: Vec<String> = backend
                .atomic_items(&existing.id)
                .await?
                .into_iter()
                .map(|item| item.id)
                .collect();
            run_bulk(&stale, |id| async move { backend.delete_atomic_item(&id).await }).await?;
            updated
        }
        (ImportStrategy::Merge, Some(existing)) => {
            let data = ListData {
                items: existing.data.items.clone(),
                categories: merge_categories(
                    existing.data.categories.as_ref(),
                    file.categories.as_ref(),
                ),
                list_name: file.list_name.clone().or_else(|| existing.data.list_name.clone()),
            };
            backend.update_list(&existing.id, &data).await?
        }
        (strategy, None) => return Err(ImportError::StrategyUnavailable(strategy)),
    };

    let mut items_created = 0;
    for item in &file.items {
        backend.create_atomic_item(&target.id, item).await?;
        items_created += 1;
    }

    tracing::info!(
        list_code = %target.list_code,
        %strategy,
        items_created,
        "import applied"
    );
    Ok(ImportOutcome {
        list_id: target.id,
        list_code: target.list_code,
        strategy,
        items_created,
    })
}

/// Snapshot of a list with its atomic items, ready to be written to a file.
pub async fn export_list<B>(backend: &B, list_id: &str) -> Result<ExportFile, BackendError>
where
    B: ListBackend + ?Sized,
{
    let list = backend.get_list(list_id).await?;
    let items = backend.atomic_items(list_id).await?;
    let export_date = time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Ok(ExportFile {
        code: Some(list.list_code),
        list_name: list.data.list_name,
        categories: list.data.categories,
        items: items.iter().map(ListItemPayload::from).collect(),
        export_date: Some(export_date),
    })
}

/// `ShopList_<code>_<YYYY-MM-DD>.json`
pub fn export_file_name(code: &str, date: time::Date) -> String {
    format!(
        "ShopList_{}_{:04}-{:02}-{:02}.json",
        code,
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
