//! Mailing-list intake handler

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use journal_common::{db::Repository, errors::Result};

/// The only failure text that ever reaches the caller; field-level detail
/// stays in the server log.
const GENERIC_FAILURE_NOTICE: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// Form-encoded join request
#[derive(Debug, Deserialize, Validate)]
pub struct JoinForm {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub institution: String,

    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

#[derive(Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    pub message: String,
}

fn rejection_notice() -> JoinResponse {
    JoinResponse {
        ok: false,
        message: GENERIC_FAILURE_NOTICE.to_string(),
    }
}

/// Record a mailing-list join request.
///
/// Deliberately permissive: duplicates are accepted as separate records, and
/// a storage failure surfaces only as a generic notice, never the underlying
/// error.
pub async fn join(
    State(state): State<AppState>,
    Form(form): Form<JoinForm>,
) -> Result<Json<JoinResponse>> {
    if let Err(e) = form.validate() {
        tracing::warn!(error = %e, "Mailing-list join rejected by validation");
        return Ok(Json(rejection_notice()));
    }

    let repo = Repository::new(state.db.clone());

    match repo
        .create_join_request(
            form.first_name.clone(),
            form.last_name,
            form.email,
            form.institution,
            form.country,
        )
        .await
    {
        Ok(request) => {
            metrics::counter!("journal_join_requests_total").increment(1);
            tracing::info!(join_request_id = request.id, "Mailing-list join recorded");

            Ok(Json(JoinResponse {
                ok: true,
                message: format!(
                    "Thank you {}! You have successfully joined our mailing list.",
                    form.first_name
                ),
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to record mailing-list join");

            Ok(Json(rejection_notice()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str) -> JoinForm {
        JoinForm {
            first_name: "Alice".into(),
            last_name: "Lee".into(),
            email: email.into(),
            institution: "Oxford".into(),
            country: "United Kingdom".into(),
        }
    }

    #[test]
    fn malformed_email_fails_validation() {
        assert!(form("not-an-email").validate().is_err());
        assert!(form("alice@example.edu").validate().is_ok());
    }

    #[test]
    fn rejection_notice_carries_no_field_detail() {
        let err = form("not-an-email").validate().unwrap_err();
        // The validator message names the offending field; the notice must not
        assert!(err.to_string().contains("email"));

        let notice = rejection_notice();
        assert!(!notice.ok);
        assert_eq!(notice.message, GENERIC_FAILURE_NOTICE);
        assert!(!notice.message.contains("email"));
    }
}
