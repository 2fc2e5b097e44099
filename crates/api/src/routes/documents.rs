//! Document upload and retrieval routes.
//!
//! Uploads pick a storage backend from the environment and provider
//! settings. Retrieval re-resolves the backend from the persisted
//! `storage_type` tag so a document written by one deployment shape can
//! be read by another.

use std::io::Write;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthBusiness, response::error_response};
use docbox_core::storage::{StorageError, select_for_record, select_for_upload};
use docbox_db::{DocumentRepository, NewDocument, entities::documents};
use docbox_shared::{AppError, PageRequest, PageResponse};

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/document/upload", post(upload_document))
        .route("/document/{account_id}", get(get_documents))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for document retrieval.
///
/// Pagination fields are inlined rather than nested because the query
/// deserializer cannot flatten structs with numeric fields.
#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    /// Retrieve a single document by id.
    pub doc_id: Option<i32>,
    /// With `doc_id`: return a direct URL instead of the content.
    #[serde(default)]
    pub url: bool,
    /// Bundle every document for the account into a zip archive.
    #[serde(default)]
    pub download_all: bool,
    /// Page number for the default listing (1-indexed).
    pub page: Option<u32>,
    /// Items per page for the default listing.
    pub per_page: Option<u32>,
}

impl DocumentQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response for an uploaded or listed document.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    /// Document id.
    pub id: i32,
    /// Account the document belongs to.
    pub account_id: String,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Storage kind tag the content lives under.
    pub storage_type: String,
    /// Upload timestamp (ISO 8601).
    pub created_at: String,
}

impl From<documents::Model> for DocumentResponse {
    fn from(doc: documents::Model) -> Self {
        Self {
            id: doc.id,
            account_id: doc.account_id,
            filename: doc.filename,
            content_type: doc.content_type,
            storage_type: doc.storage_type,
            created_at: doc.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Applies the configured per-call timeout around a storage operation.
async fn with_timeout<T>(
    secs: u64,
    operation: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(Duration::from_secs(secs), operation).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout { secs }),
    }
}

/// Maps a storage error to an HTTP response without echoing backend
/// details (which can carry credentials) to the client.
fn storage_error_response(e: &StorageError) -> Response {
    error!(error = %e, "Storage operation failed");
    let app_err = match e {
        StorageError::NotFound { .. } => {
            AppError::NotFound("Document content not found in storage".into())
        }
        StorageError::Timeout { .. } => AppError::Timeout("Storage operation timed out".into()),
        StorageError::Configuration(_) => {
            AppError::Storage("Storage provider is not configured".into())
        }
        StorageError::UnknownKind(_) => {
            AppError::Storage("Document has an unrecognized storage type".into())
        }
        StorageError::Backend(_) | StorageError::InvalidKey(_) => {
            AppError::Storage("Storage operation failed".into())
        }
    };
    error_response(&app_err)
}

fn database_error_response(e: &impl std::fmt::Display) -> Response {
    error!(error = %e, "Database operation failed");
    error_response(&AppError::Database("document catalog access failed".into()))
}

fn validation_error_response(message: &str) -> Response {
    error_response(&AppError::Validation(message.to_string()))
}

/// One part of the upload form, as extracted from the multipart body.
struct UploadForm {
    account_id: String,
    filename: String,
    content_type: String,
    content: Bytes,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut account_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        validation_error_response(&format!("Malformed multipart request: {e}"))
    })? {
        match field.name() {
            Some("account_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| validation_error_response("account_id must be text"))?;
                account_id = Some(value);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| validation_error_response("file field needs a filename"))?;
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| validation_error_response(&format!("Failed to read file: {e}")))?;
                file = Some((filename, content_type, content));
            }
            _ => {}
        }
    }

    let account_id = account_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| validation_error_response("account_id is required"))?;
    let (filename, content_type, content) =
        file.ok_or_else(|| validation_error_response("file is required"))?;

    Ok(UploadForm {
        account_id,
        filename,
        content_type,
        content,
    })
}

/// Builds a zip archive from downloaded documents, in memory.
fn build_archive(entries: &[(String, Bytes)]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        writer.start_file(name, options)?;
        writer.write_all(content)?;
    }

    Ok(writer.finish()?.into_inner())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/document/upload`
/// Uploads a document for an account.
async fn upload_document(
    State(state): State<AppState>,
    business: AuthBusiness,
    multipart: Multipart,
) -> Response {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let backend = match select_for_upload(&state.storage) {
        Ok(backend) => backend,
        Err(e) => return storage_error_response(&e),
    };

    let timeout_secs = state.storage.operation_timeout_secs;
    let result = match with_timeout(
        timeout_secs,
        backend.upload(
            form.content,
            &form.content_type,
            &form.account_id,
            &form.filename,
        ),
    )
    .await
    {
        Ok(result) => result,
        Err(e) => return storage_error_response(&e),
    };

    let repo = DocumentRepository::new((*state.db).clone());
    match repo
        .create(NewDocument {
            account_id: form.account_id,
            business_id: business.id(),
            filename: form.filename,
            content_type: form.content_type,
            storage_type: result.kind.as_str().to_string(),
            storage_key: result.key,
        })
        .await
    {
        Ok(doc) => {
            info!(
                document_id = doc.id,
                account_id = %doc.account_id,
                storage_type = %doc.storage_type,
                "Document uploaded"
            );
            (StatusCode::CREATED, Json(DocumentResponse::from(doc))).into_response()
        }
        Err(e) => database_error_response(&e),
    }
}

/// GET `/document/{account_id}`
/// Retrieves documents for an account.
///
/// - `?doc_id=N` downloads a single document (`&url=true` for a direct URL)
/// - `?download_all=true` bundles every document into a zip archive
/// - otherwise returns a paginated listing
async fn get_documents(
    State(state): State<AppState>,
    _business: AuthBusiness,
    Path(account_id): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Response {
    if let Some(doc_id) = query.doc_id {
        return get_single_document(&state, &account_id, doc_id, query.url).await;
    }

    if query.download_all {
        return download_all_documents(&state, &account_id).await;
    }

    list_documents(&state, &account_id, &query.page_request()).await
}

async fn get_single_document(
    state: &AppState,
    account_id: &str,
    doc_id: i32,
    want_url: bool,
) -> Response {
    let repo = DocumentRepository::new((*state.db).clone());
    let doc = match repo.find_by_id(doc_id, account_id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            return error_response(&AppError::NotFound("Document not found".into()));
        }
        Err(e) => return database_error_response(&e),
    };

    let backend = match select_for_record(&doc.storage_type, &state.storage) {
        Ok(backend) => backend,
        Err(e) => return storage_error_response(&e),
    };

    let timeout_secs = state.storage.operation_timeout_secs;

    if want_url {
        return match with_timeout(timeout_secs, backend.get_url(&doc.storage_key)).await {
            Ok(Some(url)) => (StatusCode::OK, Json(json!({ "url": url }))).into_response(),
            Ok(None) => error_response(&AppError::Validation(
                "This storage backend does not provide direct URLs".into(),
            )),
            Err(e) => storage_error_response(&e),
        };
    }

    match with_timeout(timeout_secs, backend.download(&doc.storage_key)).await {
        Ok(content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, doc.content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", doc.filename),
                ),
            ],
            content,
        )
            .into_response(),
        Err(e) => storage_error_response(&e),
    }
}

async fn download_all_documents(state: &AppState, account_id: &str) -> Response {
    let repo = DocumentRepository::new((*state.db).clone());
    let docs = match repo.list_all_by_account(account_id).await {
        Ok(docs) => docs,
        Err(e) => return database_error_response(&e),
    };

    if docs.is_empty() {
        return error_response(&AppError::NotFound(
            "No documents found for this account".into(),
        ));
    }

    let timeout_secs = state.storage.operation_timeout_secs;
    let mut entries = Vec::with_capacity(docs.len());
    for doc in docs {
        let backend = match select_for_record(&doc.storage_type, &state.storage) {
            Ok(backend) => backend,
            Err(e) => return storage_error_response(&e),
        };
        let content = match with_timeout(timeout_secs, backend.download(&doc.storage_key)).await {
            Ok(content) => content,
            Err(e) => return storage_error_response(&e),
        };
        entries.push((doc.filename, content));
    }

    let archive = match build_archive(&entries) {
        Ok(archive) => archive,
        Err(e) => {
            error!(error = %e, "Failed to build archive");
            return error_response(&AppError::Internal("archive bundling failed".into()));
        }
    };

    info!(account_id = %account_id, files = entries.len(), "Archive downloaded");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{account_id}_documents.zip\""),
            ),
        ],
        archive,
    )
        .into_response()
}

async fn list_documents(state: &AppState, account_id: &str, page: &PageRequest) -> Response {
    let repo = DocumentRepository::new((*state.db).clone());
    match repo
        .list_by_account(account_id, page.offset(), page.limit())
        .await
    {
        Ok((_, 0)) => error_response(&AppError::NotFound(
            "No documents found for this account".into(),
        )),
        Ok((docs, total)) => {
            let items: Vec<DocumentResponse> =
                docs.into_iter().map(DocumentResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => database_error_response(&e),
    }
}
