//! Request bodies that may arrive as JSON or as `multipart/form-data`.
//!
//! Record endpoints accept either encoding so clients can attach images.
//! [`FormPayload`] normalises both into named values and offers typed
//! readers that distinguish an absent field from an explicit `null`.

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::{NaiveDate, NaiveTime};
use futures_util::StreamExt;
use futures_util::future::LocalBoxFuture;
use serde_json::{Map, Value};

use crate::domain::fields::FieldError;
use crate::domain::{Error, Gender, ImageChange, ImageKind, ImageUpload, PlantId};

/// Largest accepted file part.
pub const MAX_PART_BYTES: usize = 10 * 1024 * 1024;
/// Largest accepted text part.
pub const MAX_TEXT_PART_BYTES: usize = 64 * 1024;
/// Largest accepted multipart body, summed over every part.
pub const MAX_BODY_BYTES: usize = MAX_PART_BYTES + 1024 * 1024;

const FILE_FIELDS: [ImageKind; 3] = [ImageKind::Plant, ImageKind::Observation, ImageKind::Profile];

const NOT_NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

#[derive(Debug, Clone, PartialEq)]
enum FormValue {
    Json(Value),
    Text(String),
    File(Vec<u8>),
}

/// Named request values decoded from JSON or multipart input.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormPayload {
    values: HashMap<String, FormValue>,
}

impl FormPayload {
    /// Wrap a decoded JSON object.
    #[must_use]
    pub fn from_json(object: Map<String, Value>) -> Self {
        Self {
            values: object
                .into_iter()
                .map(|(name, value)| (name, FormValue::Json(value)))
                .collect(),
        }
    }

    /// Whether the client sent a value for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Text for a non-nullable field. Absent yields `None`.
    pub fn text(&self, name: &'static str) -> Result<Option<String>, FieldError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(FormValue::Json(Value::Null)) => Err(FieldError::invalid(name, NOT_NULL)),
            Some(value) => as_text(name, value).map(Some),
        }
    }

    /// Text for a nullable field. `null` yields `Some(None)`.
    pub fn nullable_text(&self, name: &'static str) -> Result<Option<Option<String>>, FieldError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(FormValue::Json(Value::Null)) => Ok(Some(None)),
            Some(value) => as_text(name, value).map(|text| Some(Some(text))),
        }
    }

    /// ISO `YYYY-MM-DD` date for a non-nullable field.
    pub fn date(&self, name: &'static str) -> Result<Option<NaiveDate>, FieldError> {
        self.text(name)?
            .map(|raw| parse_date(name, &raw))
            .transpose()
    }

    /// ISO date for a nullable field. Blank input clears the value.
    pub fn nullable_date(
        &self,
        name: &'static str,
    ) -> Result<Option<Option<NaiveDate>>, FieldError> {
        self.nullable(name, |raw| parse_date(name, raw))
    }

    /// `HH:MM[:SS[.ffffff]]` time for a non-nullable field.
    pub fn time(&self, name: &'static str) -> Result<Option<NaiveTime>, FieldError> {
        self.text(name)?
            .map(|raw| parse_time(name, &raw))
            .transpose()
    }

    /// Gender choice for a nullable field.
    pub fn gender(&self, name: &'static str) -> Result<Option<Option<Gender>>, FieldError> {
        self.nullable(name, Gender::parse)
    }

    /// Plant reference for a nullable field, given as a number or numeric
    /// text.
    pub fn plant_id(&self, name: &'static str) -> Result<Option<Option<PlantId>>, FieldError> {
        match self.values.get(name) {
            Some(FormValue::Json(Value::Number(number))) => number
                .as_i64()
                .map(|id| Some(Some(PlantId::new(id))))
                .ok_or_else(|| incorrect_pk(name)),
            _ => self.nullable(name, |raw| {
                raw.parse::<i64>()
                    .map(PlantId::new)
                    .map_err(|_| incorrect_pk(name))
            }),
        }
    }

    /// Image change for `kind`'s field.
    ///
    /// A file part replaces the image, `null` or an empty value clears it,
    /// and an absent field keeps it.
    pub fn image(&self, kind: ImageKind) -> Result<ImageChange, FieldError> {
        let name = kind.field();
        match self.values.get(name) {
            None => Ok(ImageChange::Keep),
            Some(FormValue::File(content)) if content.is_empty() => Ok(ImageChange::Clear),
            Some(FormValue::File(content)) => {
                ImageUpload::from_bytes(kind, content.clone()).map(ImageChange::Replace)
            }
            Some(FormValue::Json(Value::Null)) => Ok(ImageChange::Clear),
            Some(FormValue::Text(text)) if text.is_empty() => Ok(ImageChange::Clear),
            Some(FormValue::Json(Value::String(text))) if text.is_empty() => {
                Ok(ImageChange::Clear)
            }
            Some(_) => Err(FieldError::invalid(name, NOT_A_FILE)),
        }
    }

    fn nullable<T>(
        &self,
        name: &'static str,
        parse: impl FnOnce(&str) -> Result<T, FieldError>,
    ) -> Result<Option<Option<T>>, FieldError> {
        match self.nullable_text(name)? {
            None => Ok(None),
            Some(None) => Ok(Some(None)),
            Some(Some(raw)) if raw.trim().is_empty() => Ok(Some(None)),
            Some(Some(raw)) => parse(raw.trim()).map(|value| Some(Some(value))),
        }
    }
}

fn as_text(name: &'static str, value: &FormValue) -> Result<String, FieldError> {
    match value {
        FormValue::Text(text) | FormValue::Json(Value::String(text)) => Ok(text.clone()),
        FormValue::Json(Value::Number(number)) => Ok(number.to_string()),
        FormValue::Json(Value::Bool(flag)) => Ok(flag.to_string()),
        FormValue::Json(_) | FormValue::File(_) => Err(FieldError::invalid(name, NOT_A_STRING)),
    }
}

fn parse_date(name: &'static str, raw: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        FieldError::invalid(
            name,
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        )
    })
}

fn parse_time(name: &'static str, raw: &str) -> Result<NaiveTime, FieldError> {
    let raw = raw.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            FieldError::invalid(
                name,
                "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].",
            )
        })
}

fn incorrect_pk(name: &'static str) -> FieldError {
    FieldError::invalid(name, "Incorrect type. Expected pk value.")
}

fn malformed(reason: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed request body: {reason}"))
}

fn too_large(what: &str, limit: usize) -> Error {
    Error::invalid_request(format!("{what} exceeds the {limit} byte upload limit"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormPayload, Error> {
    let mut values = HashMap::new();
    let mut total = 0_usize;
    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(malformed)?;
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if values.contains_key(&name) {
            return Err(Error::invalid_field(
                &name,
                "duplicate",
                format!("{name} was sent more than once."),
            ));
        }
        let is_file = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .is_some();
        if is_file && !FILE_FIELDS.iter().any(|kind| kind.field() == name) {
            return Err(Error::invalid_field(
                &name,
                "unexpected_file",
                format!("{name} does not accept file uploads."),
            ));
        }
        let limit = if is_file {
            MAX_PART_BYTES
        } else {
            MAX_TEXT_PART_BYTES
        };

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            total += chunk.len();
            if total > MAX_BODY_BYTES {
                return Err(too_large("request body", MAX_BODY_BYTES));
            }
            if content.len() + chunk.len() > limit {
                return Err(too_large(&name, limit));
            }
            content.extend_from_slice(&chunk);
        }

        let value = if is_file {
            FormValue::File(content)
        } else {
            FormValue::Text(
                String::from_utf8(content)
                    .map_err(|_| Error::invalid_request(format!("{name} is not valid UTF-8")))?,
            )
        };
        values.insert(name, value);
    }
    Ok(FormPayload { values })
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

impl FromRequest for FormPayload {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req) {
            let multipart = Multipart::new(req.headers(), payload.take());
            return Box::pin(read_multipart(multipart));
        }
        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let body = body.await.map_err(malformed)?;
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Self::default());
            }
            serde_json::from_slice::<Map<String, Value>>(&body)
                .map(Self::from_json)
                .map_err(malformed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn json_payload(value: Value) -> FormPayload {
        match value {
            Value::Object(object) => FormPayload::from_json(object),
            other => panic!("expected object, got {other}"),
        }
    }

    fn multipart_payload(parts: Vec<(&str, FormValue)>) -> FormPayload {
        FormPayload {
            values: parts
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        }
    }

    #[rstest]
    fn absent_null_and_present_text_are_distinct() {
        let payload = json_payload(json!({ "note": null, "origin": "Peru" }));
        assert_eq!(payload.nullable_text("location").expect("absent"), None);
        assert_eq!(payload.nullable_text("note").expect("null"), Some(None));
        assert_eq!(
            payload.nullable_text("origin").expect("text"),
            Some(Some("Peru".to_owned()))
        );
    }

    #[rstest]
    fn null_is_rejected_for_required_text() {
        let payload = json_payload(json!({ "habitat": null }));
        let err = payload.text("habitat").expect_err("null rejected");
        assert_eq!(err.field(), "habitat");
    }

    #[rstest]
    #[case(json!({ "related_plant_id": 4 }), Some(Some(PlantId::new(4))))]
    #[case(json!({ "related_plant_id": "4" }), Some(Some(PlantId::new(4))))]
    #[case(json!({ "related_plant_id": null }), Some(None))]
    #[case(json!({ "related_plant_id": "" }), Some(None))]
    #[case(json!({}), None)]
    fn plant_ids_accept_numbers_and_numeric_text(
        #[case] body: Value,
        #[case] expected: Option<Option<PlantId>>,
    ) {
        let payload = json_payload(body);
        assert_eq!(payload.plant_id("related_plant_id").expect("id"), expected);
    }

    #[rstest]
    #[case(json!({ "related_plant_id": "fern" }))]
    #[case(json!({ "related_plant_id": 1.5 }))]
    fn plant_ids_reject_non_integers(#[case] body: Value) {
        let payload = json_payload(body);
        assert!(payload.plant_id("related_plant_id").is_err());
    }

    #[rstest]
    #[case("09:30", NaiveTime::from_hms_opt(9, 30, 0))]
    #[case("09:30:15", NaiveTime::from_hms_opt(9, 30, 15))]
    #[case("09:30:15.250", NaiveTime::from_hms_milli_opt(9, 30, 15, 250))]
    fn times_accept_iso_variants(#[case] raw: &str, #[case] expected: Option<NaiveTime>) {
        let payload = json_payload(json!({ "time": raw }));
        assert_eq!(payload.time("time").expect("time"), expected);
    }

    #[rstest]
    fn dates_reject_other_formats() {
        let payload = json_payload(json!({ "date": "01/06/2024" }));
        assert!(payload.date("date").is_err());
    }

    #[rstest]
    fn blank_birthdate_clears_it() {
        let payload = multipart_payload(vec![("birthdate", FormValue::Text(String::new()))]);
        assert_eq!(payload.nullable_date("birthdate").expect("blank"), Some(None));
    }

    #[rstest]
    fn image_field_maps_to_changes() {
        let payload = multipart_payload(vec![
            ("plant_image", FormValue::File(b"GIF89a-leaf".to_vec())),
            ("observation_image", FormValue::Text(String::new())),
        ]);
        assert!(matches!(
            payload.image(ImageKind::Plant).expect("file"),
            ImageChange::Replace(_)
        ));
        assert_eq!(
            payload.image(ImageKind::Observation).expect("blank"),
            ImageChange::Clear
        );
        assert_eq!(
            payload.image(ImageKind::Profile).expect("absent"),
            ImageChange::Keep
        );
    }

    #[rstest]
    #[case(json!({ "plant_image": "https://example.com/fern.png" }))]
    #[case(json!({ "plant_image": 12 }))]
    fn non_file_image_values_are_rejected(#[case] body: Value) {
        let payload = json_payload(body);
        let err = payload.image(ImageKind::Plant).expect_err("not a file");
        assert_eq!(err.field(), "plant_image");
    }

    #[rstest]
    fn non_image_files_are_rejected() {
        let payload = multipart_payload(vec![(
            "plant_image",
            FormValue::File(b"plain text".to_vec()),
        )]);
        assert!(payload.image(ImageKind::Plant).is_err());
    }

    const BOUNDARY: &str = "leafboundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            let disposition = match filename {
                Some(file) => format!("form-data; name=\"{name}\"; filename=\"{file}\""),
                None => format!("form-data; name=\"{name}\""),
            };
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn decode(body: Vec<u8>) -> Result<FormPayload, Error> {
        let (req, mut payload) = actix_web::test::TestRequest::post()
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_http_parts();
        FormPayload::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn rejects_bodies_over_the_total_limit() {
        let half = vec![b'x'; MAX_BODY_BYTES / 2 + 1];
        let mut plant = b"GIF89a".to_vec();
        plant.extend_from_slice(&half);
        let body = multipart_body(&[
            ("plant_image", Some("a.gif"), &plant),
            ("observation_image", Some("b.gif"), &plant),
        ]);
        let err = decode(body).await.expect_err("too large");
        assert!(err.message().contains("request body"), "{}", err.message());
    }

    #[actix_web::test]
    async fn rejects_oversized_text_parts() {
        let note = vec![b'n'; MAX_TEXT_PART_BYTES + 1];
        let err = decode(multipart_body(&[("note", None, &note)]))
            .await
            .expect_err("too large");
        assert!(err.message().starts_with("note exceeds"), "{}", err.message());
    }

    #[rstest]
    #[case(&[("avatar", Some("a.gif"), b"GIF89a".as_slice())], "avatar", "unexpected_file")]
    #[case(
        &[("note", None, b"one".as_slice()), ("note", None, b"two".as_slice())],
        "note",
        "duplicate"
    )]
    #[actix_web::test]
    async fn rejects_unknown_or_repeated_parts(
        #[case] parts: &[(&str, Option<&str>, &[u8])],
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = decode(multipart_body(parts)).await.expect_err("rejected");
        let details = err.details().expect("details");
        assert_eq!(details["field"], json!(field));
        assert_eq!(details["code"], json!(code));
    }

    #[actix_web::test]
    async fn extracts_multipart_bodies() {
        let boundary = "leafboundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"common_name\"\r\n\r\n\
             Fern\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"plant_image\"; filename=\"fern.gif\"\r\n\
             Content-Type: image/gif\r\n\r\n\
             GIF89a-frond\r\n\
             --{boundary}--\r\n"
        );
        let (req, mut payload) = actix_web::test::TestRequest::post()
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body)
            .to_http_parts();

        let form = FormPayload::from_request(&req, &mut payload)
            .await
            .expect("multipart decoded");
        assert_eq!(
            form.text("common_name").expect("text"),
            Some("Fern".to_owned())
        );
        assert!(matches!(
            form.image(ImageKind::Plant).expect("image"),
            ImageChange::Replace(_)
        ));
    }

    #[actix_web::test]
    async fn empty_bodies_decode_to_no_fields() {
        let (req, mut payload) = actix_web::test::TestRequest::patch().to_http_parts();
        let form = FormPayload::from_request(&req, &mut payload)
            .await
            .expect("empty body");
        assert_eq!(form, FormPayload::default());
    }

    #[actix_web::test]
    async fn rejects_non_object_json() {
        let (req, mut payload) = actix_web::test::TestRequest::post()
            .set_json(json!(["not", "an", "object"]))
            .to_http_parts();
        let err = FormPayload::from_request(&req, &mut payload)
            .await
            .expect_err("array rejected");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
