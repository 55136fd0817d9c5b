use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WebError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Judge,
}

/// The authenticated key holder, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub role: Role,
    pub id: String,
}

#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashMap<String, Caller>>,
}

impl ApiKeys {
    /// `admin_keys` is a comma separated list of keys; `judge_keys` a comma
    /// separated list of `judge_id:key` pairs. Malformed judge entries are
    /// skipped with a warning.
    pub fn from_config(admin_keys: &str, judge_keys: &str) -> Self {
        let mut keys = HashMap::new();

        for key in split_list(admin_keys) {
            keys.insert(
                key.to_string(),
                Caller {
                    role: Role::Admin,
                    id: "admin".to_string(),
                },
            );
        }

        for pair in split_list(judge_keys) {
            match pair.split_once(':') {
                Some((id, key)) if !id.trim().is_empty() && !key.trim().is_empty() => {
                    keys.insert(
                        key.trim().to_string(),
                        Caller {
                            role: Role::Judge,
                            id: id.trim().to_string(),
                        },
                    );
                }
                _ => tracing::warn!("Ignoring malformed judge key entry (expected judge_id:key)"),
            }
        }

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn identify(&self, key: &str) -> Option<&Caller> {
        self.keys.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Only admin keys pass.
pub async fn require_admin(
    State(keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    authorize(&keys, &mut req, &[Role::Admin])?;
    Ok(next.run(req).await)
}

/// Judge and admin keys pass.
pub async fn require_judge(
    State(keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    authorize(&keys, &mut req, &[Role::Admin, Role::Judge])?;
    Ok(next.run(req).await)
}

fn authorize(keys: &ApiKeys, req: &mut Request, allowed: &[Role]) -> Result<(), WebError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(WebError::Unauthorized)?;

    let caller = keys.identify(token).cloned().ok_or_else(|| {
        tracing::warn!("Invalid API key attempt");
        WebError::Unauthorized
    })?;

    if !allowed.contains(&caller.role) {
        tracing::warn!(caller = %caller.id, path = %req.uri().path(), "Insufficient role");
        return Err(WebError::Forbidden(
            "This key is not allowed to perform this action".to_string(),
        ));
    }

    req.extensions_mut().insert(caller);
    Ok(())
}
