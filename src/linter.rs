//! Manifest linting - static analysis of resource manifest files.
//!
//! Checks manifest files for:
//! - JSON syntax errors and documents that are not manifests
//! - Malformed type expressions
//! - Operations that can never be registered (marker without verb, or verb without marker)
//! - Duplicate path/verb pairs
//! - Named types missing from the type catalog

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::definition::{Manifest, OperationDefinition, TypeCatalog};
use crate::loader::load_json;
use crate::scanner::compose_path;
use crate::typeref::TypeRef;
use crate::types::{json_type_name, HttpMethod};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/resources/0/operations/1/returns")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a manifest file or a directory of them.
///
/// Directories are searched recursively for `.json` files. With `strict`,
/// a file with warnings counts as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_manifest_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single manifest file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut lint = FileLint {
        file,
        diagnostics: Vec::new(),
    };

    if let Some(manifest) = lint.load() {
        lint.check_manifest(&manifest);
    }

    let diagnostics = lint.diagnostics;
    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

struct FileLint<'a> {
    file: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl FileLint<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: String, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path,
            message,
        });
    }

    fn load(&mut self) -> Option<Manifest> {
        let value = match load_json(self.file) {
            Ok(value) => value,
            Err(e) => {
                self.push(
                    Severity::Error,
                    "E001",
                    "/".to_string(),
                    format!("syntax error: {}", e),
                );
                return None;
            }
        };

        if !value.is_object() {
            self.push(
                Severity::Error,
                "E001",
                "/".to_string(),
                format!("manifest must be an object, got {}", json_type_name(&value)),
            );
            return None;
        }

        match serde_json::from_value::<Manifest>(value) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                self.push(
                    Severity::Error,
                    "E001",
                    "/".to_string(),
                    format!("not a manifest: {}", e),
                );
                None
            }
        }
    }

    fn check_manifest(&mut self, manifest: &Manifest) {
        let catalog = manifest.catalog();

        for (t, definition) in manifest.types.iter().enumerate() {
            let type_path = format!("/types/{}", t);
            if let Some(extends) = definition.extends.as_deref() {
                self.check_type(extends, &catalog, format!("{}/extends", type_path));
            }
            for (f, field) in definition.fields.iter().enumerate() {
                self.check_type(
                    &field.type_expr,
                    &catalog,
                    format!("{}/fields/{}/type", type_path, f),
                );
            }
        }

        let mut seen: HashMap<(String, HttpMethod), String> = HashMap::new();
        for (r, resource) in manifest.resources.iter().enumerate() {

            for (o, operation) in resource.operations.iter().enumerate() {
                let op_path = format!("/resources/{}/operations/{}", r, o);
                self.check_operation_types(operation, &catalog, &op_path);

                let verb = operation
                    .method
                    .or_else(|| operation.operation.as_ref()?.http_method);
                let Some(verb) = (match (&operation.operation, verb) {
                    (Some(_), Some(verb)) => Some(verb),
                    (Some(_), None) => {
                        self.push(
                            Severity::Warning,
                            "W001",
                            op_path.clone(),
                            format!(
                                "{}.{} has an operation marker but no http method",
                                resource.name, operation.name
                            ),
                        );
                        None
                    }
                    (None, Some(_)) => {
                        self.push(
                            Severity::Warning,
                            "W002",
                            op_path.clone(),
                            format!(
                                "{}.{} has an http method but no operation marker",
                                resource.name, operation.name
                            ),
                        );
                        None
                    }
                    (None, None) => None,
                }) else {
                    continue;
                };

                let path = compose_path(resource.path.as_deref(), operation.path.as_deref());
                let key = (path, verb);
                if let Some(first) = seen.get(&key) {
                    let message = format!("{} {} is already declared at {}", verb, key.0, first);
                    self.push(Severity::Warning, "W003", op_path, message);
                } else {
                    seen.insert(key, op_path);
                }
            }
        }
    }

    fn check_operation_types(
        &mut self,
        operation: &OperationDefinition,
        catalog: &TypeCatalog,
        op_path: &str,
    ) {
        if let Some(returns) = operation.returns.as_deref() {
            self.check_type(returns, catalog, format!("{}/returns", op_path));
        }
        for (p, parameter) in operation.parameters.iter().enumerate() {
            self.check_type(
                &parameter.type_expr,
                catalog,
                format!("{}/parameters/{}/type", op_path, p),
            );
        }

        let Some(marker) = operation.operation.as_ref() else {
            return;
        };
        if let Some(response) = marker.response.as_deref() {
            self.check_type(response, catalog, format!("{}/operation/response", op_path));
        }
        for (d, declared) in marker.responses.iter().enumerate() {
            if let Some(response) = declared.response.as_deref() {
                self.check_type(
                    response,
                    catalog,
                    format!("{}/operation/responses/{}/response", op_path, d),
                );
            }
        }
    }

    fn check_type(&mut self, expr: &str, catalog: &TypeCatalog, path: String) {
        let ty = match TypeRef::parse(expr) {
            Ok(ty) => ty,
            Err(e) => {
                self.push(Severity::Error, "E002", path, e.to_string());
                return;
            }
        };

        for name in ty.named_types() {
            if !catalog.contains(name) {
                self.push(
                    Severity::Warning,
                    "W004",
                    path.clone(),
                    format!("type \"{}\" is not in the type catalog", name),
                );
            }
        }
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_manifest_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_json(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_json(&path) {
            files.push(path);
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}
