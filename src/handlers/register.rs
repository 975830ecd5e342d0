//! Registration handler: add a declared capability to the catalog and index.
//!
//! Registration is declarative only. The original intake pattern of
//! executing submitted source text and extracting the symbol is a trust
//! boundary violation and is not carried here: callers declare a name,
//! module, signature, and schema, and the external runner owns the code.

use crate::error::{AppError, Result};
use crate::registry::{Capability, DeclaredParameter, ParameterSchema, DEFAULT_MODULE};
use crate::state::AppState;
use crate::synthesis::{is_safe_identifier, is_safe_module_path};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Action name, also used as the imported symbol in synthesized code.
    pub name: String,
    /// Module the action is importable from (default: "automations").
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Declared call signature, in declaration order.
    #[serde(default)]
    pub signature: Vec<DeclaredParameter>,
    /// Explicit schema entries; these win over the declared signature.
    #[serde(default)]
    pub parameters: Option<ParameterSchema>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: String,
    pub action_name: String,
}

/// POST /register - Register a custom action.
///
/// Validates that every interpolated name is a plain identifier, then takes
/// the single-writer lock: the registry insert and the index append happen
/// under one guard so no read can observe a torn catalog.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    if !is_safe_identifier(&request.name) {
        return Err(AppError::Validation(format!(
            "Action name '{}' is not a valid identifier",
            request.name
        )));
    }
    let module = request
        .module
        .unwrap_or_else(|| DEFAULT_MODULE.to_string());
    if !is_safe_module_path(&module) {
        return Err(AppError::Validation(format!(
            "Module '{}' is not a valid module path",
            module
        )));
    }
    for declared in &request.signature {
        if !is_safe_identifier(&declared.name) {
            return Err(AppError::Validation(format!(
                "Parameter name '{}' is not a valid identifier",
                declared.name
            )));
        }
    }
    if let Some(schema) = &request.parameters {
        for name in schema.keys() {
            if !is_safe_identifier(name) {
                return Err(AppError::Validation(format!(
                    "Parameter name '{}' is not a valid identifier",
                    name
                )));
            }
        }
    }

    // Indexing embeds the new entry, so registration holds an encoder permit
    // like every other embedding caller.
    let _permit = tokio::time::timeout(Duration::from_secs(10), state.semaphore.acquire())
        .await
        .map_err(|_| {
            AppError::Resource("Service temporarily overloaded, please retry".to_string())
        })?
        .map_err(|_| AppError::Resource("Semaphore closed".to_string()))?;

    let service = Arc::clone(&state.service).write_owned().await;
    let capability = Capability {
        name: request.name.clone(),
        module,
        doc: String::new(),
        signature: request.signature,
    };
    let description = Some(request.description).filter(|d| !d.is_empty());
    let schema = request.parameters;

    let action_name = tokio::task::spawn_blocking(move || {
        let mut service = service;
        service.register(capability, None, description, schema)
    })
    .await
    .map_err(|e| AppError::Model(format!("Task join error: {}", e)))??;

    metrics::counter!("register_requests_total").increment(1);

    Ok(Json(RegisterResponse {
        status: "success",
        message: format!("Action {} registered successfully", action_name),
        action_name,
    }))
}
