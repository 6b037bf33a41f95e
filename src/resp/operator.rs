use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use uuid::Uuid;

use crate::resp::problem::{catchers, Problem};

pub static BRANCH_HEADER: &str = "X-Branch-Id";
pub static ACTING_USER_HEADER: &str = "X-Acting-User";

/// Who is acting, and on behalf of which branch.
///
/// Every scheduling operation is scoped by these two values; they travel as
/// request headers instead of living in client-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorContext {
    pub branch_id: Uuid,
    pub acting_user_id: Uuid,
}

pub fn operator_problem(header: &str, detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::BadRequest, "Missing operator context.")
        .insert_str("header", header)
        .detail(detail)
        .clone()
}

fn header_uuid(req: &Request<'_>, header: &'static str) -> Result<Uuid, Problem> {
    let value = req
        .headers()
        .get_one(header)
        .ok_or_else(|| operator_problem(header, format!("No '{}' header.", header)))?;

    Uuid::parse_str(value.trim())
        .map_err(|_| operator_problem(header, format!("'{}' isn't a valid UUID.", header)))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OperatorContext {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let context = header_uuid(req, BRANCH_HEADER).and_then(|branch_id| {
            Ok(OperatorContext {
                branch_id,
                acting_user_id: header_uuid(req, ACTING_USER_HEADER)?,
            })
        });

        match context {
            Ok(it) => {
                tracing::trace!("operator {} on branch {}", it.acting_user_id, it.branch_id);
                Outcome::Success(it)
            }
            Err(problem) => {
                tracing::debug!("rejecting request without operator context: {}", problem);
                catchers::stash(req, &problem);
                Outcome::Error((Status::BadRequest, problem))
            }
        }
    }
}

pub mod doc {
    use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

    use super::{ACTING_USER_HEADER, BRANCH_HEADER};

    /// Documents the operator headers as API keys so Swagger UI can set them.
    #[derive(Clone, Copy)]
    pub struct OperatorHeaders;

    impl utoipa::Modify for OperatorHeaders {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "branch",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(BRANCH_HEADER))),
            );
            components.add_security_scheme(
                "operator",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ACTING_USER_HEADER))),
            );
        }
    }
}
