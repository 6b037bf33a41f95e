use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::error::{ScheduleError, StoreError};

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new(status: Status, type_uri: impl ToString, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: type_uri.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    fn into_json(self, instance: String) -> Map<String, Value> {
        let mut body = self.body;

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(String::from("status"), Value::from(self.status.code));
        body.insert(
            String::from("instance"),
            Value::from(self.instance_uri.unwrap_or(instance)),
        );

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        let body = self.into_json(req.uri().path().to_string());

        let body_string = serde_json::to_string(&body).map_err(|e| {
            tracing::error!("unable to serialize problem body: {}", e);
            Status::InternalServerError
        })?;

        Response::build()
            .status(status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use crate::schedule::Violation;
    use rocket::http::Status;

    pub static DOUBLE_BOOKING_TYPE: &str = "/problems/double-booking";
    pub static MISSING_REFERENCE_TYPE: &str = "/problems/missing-reference";

    #[inline]
    pub fn bad_field(field: &str, detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid request data.")
            .insert_str("field", field)
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn double_booking(violation: Violation) -> Problem {
        Problem::new(Status::Conflict, DOUBLE_BOOKING_TYPE, "Slot is already taken.")
            .insert("reason", violation)
            .detail(violation)
            .clone()
    }
}

/// Error catchers so failures outside handlers still answer with
/// `application/problem+json`.
pub mod catchers {
    use rocket::http::Status;
    use rocket::{Catcher, Request};

    use super::Problem;

    /// Remembers a guard's problem so the catcher can answer with it.
    pub fn stash(req: &Request<'_>, problem: &Problem) {
        req.local_cache(|| Some(problem.clone()));
    }

    fn stashed(req: &Request<'_>) -> Option<Problem> {
        req.local_cache(|| None::<Problem>).clone()
    }

    #[catch(400)]
    pub fn bad_request(req: &Request<'_>) -> Problem {
        stashed(req).unwrap_or_else(|| {
            Problem::new_untyped(Status::BadRequest, "Request couldn't be read.")
        })
    }

    #[catch(404)]
    pub fn not_found(_req: &Request<'_>) -> Problem {
        Problem::new_untyped(Status::NotFound, "Resource doesn't exist.")
    }

    #[catch(422)]
    pub fn unprocessable(_req: &Request<'_>) -> Problem {
        Problem::new_untyped(Status::UnprocessableEntity, "Request body is malformed.")
    }

    pub fn all() -> Vec<Catcher> {
        catchers![bad_request, not_found, unprocessable]
    }
}

impl From<ScheduleError> for Problem {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::MissingField(field) => problems::bad_field(field, &e),
            ScheduleError::InvalidField { field, ref detail } => {
                problems::bad_field(field, detail)
            }
            ScheduleError::MissingReference { kind, id } => Problem::new(
                Status::UnprocessableEntity,
                problems::MISSING_REFERENCE_TYPE,
                "Referenced record doesn't exist.",
            )
            .insert_str("kind", kind)
            .insert_str("id", id)
            .detail(&e)
            .clone(),
            ScheduleError::BreakSlot(id) => Problem::new_untyped(
                Status::UnprocessableEntity,
                "Break slots can't be assigned.",
            )
            .insert_str("time_slot_id", id)
            .detail(&e)
            .clone(),
            ScheduleError::DuplicateDay(weekday) => {
                Problem::new_untyped(Status::Conflict, "Class day already exists.")
                    .insert("weekday", weekday)
                    .detail(&e)
                    .clone()
            }
            ScheduleError::Rejected(violation) => problems::double_booking(violation),
            ScheduleError::ConcurrentConflict => Problem::new(
                Status::Conflict,
                problems::DOUBLE_BOOKING_TYPE,
                "Slot is already taken.",
            )
            .detail(&e)
            .clone(),
            ScheduleError::Store(store) => Problem::from(store),
        }
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        tracing::error!("store failure: {}", e);
        match e {
            StoreError::Database(e) => Problem::from(e),
            StoreError::Serialize(e) => Problem::from(e),
            StoreError::Deserialize(e) => Problem::from(e),
            StoreError::Duplicate(_) => {
                Problem::new_untyped(Status::Conflict, "Record already exists.")
            }
        }
    }
}

#[allow(dead_code)]
impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        fn mongodb_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "MongoDB failed while processing request.",
            )
        }

        fn access_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "Server was unable to access MongoDB.",
            )
        }

        fn bad_db_request() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "MongoDB was unable to process bad server request.",
            )
        }

        fn bson_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "There was a problem with handling MongoDB bson.",
            )
        }

        match e.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => bad_db_request(),
            ErrorKind::Authentication { .. } => access_problem(),
            ErrorKind::BsonDeserialization(_) => bson_problem(),
            ErrorKind::BsonSerialization(_) => bson_problem(),
            ErrorKind::BulkWrite(_) => bad_db_request(),
            ErrorKind::Command(_) => bad_db_request(),
            ErrorKind::DnsResolve { .. } => access_problem(),
            ErrorKind::Io(_) => mongodb_problem()
                .detail("An IO error occurred. The change might not have been stored.")
                .clone(),
            ErrorKind::ServerSelection { .. } => access_problem(),
            ErrorKind::InvalidTlsConfig { .. } => access_problem(),
            ErrorKind::Write(_) => mongodb_problem()
                .detail("A write error occurred. The change might not have been stored.")
                .clone(),
            ErrorKind::IncompatibleServer { .. } => access_problem(),
            _ => mongodb_problem(),
        }
    }
}

impl From<bson::de::Error> for Problem {
    fn from(_: bson::de::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(_: bson::ser::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while encoding BSON data.",
        )
    }
}
