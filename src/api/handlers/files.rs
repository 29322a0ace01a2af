use crate::{
    types::{AppError, Result},
    validation::{FieldReader, ValidationErrors},
    AppState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which record an upload is linked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum UploadKind {
    UserImage,
    AnimalImage,
    TrainingLogVideo,
}

impl UploadKind {
    pub const NAMES: [&'static str; 3] = ["user-image", "animal-image", "training-log-video"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "user-image" => Some(Self::UserImage),
            "animal-image" => Some(Self::AnimalImage),
            "training-log-video" => Some(Self::TrainingLogVideo),
            _ => None,
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Self::UserImage => "User",
            Self::AnimalImage => "Animal",
            Self::TrainingLogVideo => "Training log",
        }
    }
}

/// Multipart form accepted by the upload route (documentation only)
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[serde(rename = "type")]
    kind: UploadKind,
    /// Id of the user, animal or training log to link
    id: String,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    #[serde(rename = "objectKey")]
    pub object_key: String,
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

/// The `file` part of an upload.
struct FilePart {
    bytes: Vec<u8>,
    content_type: String,
}

struct Upload {
    kind: UploadKind,
    id: String,
    file: FilePart,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(ValidationErrors::root(e.body_text()))
    }
}

/// Drains the form and validates it. Nothing is written anywhere until this
/// succeeds.
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut text_fields = Map::new();
    let mut file = None;
    let mut file_error = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            if field.file_name().is_none() {
                file_error = Some("expected a file");
                continue;
            }
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            file = Some(FilePart {
                bytes: bytes.to_vec(),
                content_type,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            text_fields.insert(name, Value::String(value));
        }
    }

    let mut fields = FieldReader::new(&text_fields);
    let kind = fields.one_of("type", &UploadKind::NAMES);
    let id = fields.non_empty_string("id");
    if file.is_none() {
        fields.reject("file", file_error.unwrap_or("is required"));
    }

    let parsed = match (kind.as_deref().and_then(UploadKind::from_name), id, file) {
        (Some(kind), Some(id), Some(file)) => Some(Upload { kind, id, file }),
        _ => None,
    };

    Ok(fields.finish(parsed)?)
}

/// Best-effort removal of a blob whose record link failed.
async fn discard_blob(state: &AppState, key: &str) {
    if let Err(e) = state.blobs.delete(key).await {
        warn!(object_key = %key, "failed to delete orphaned blob: {}", e);
    }
}

/// Upload an image or video and link it to a record
///
/// The blob is stored under a fresh key, then the target record's URL field
/// is updated. If the record does not exist or the update fails the blob is
/// deleted again.
#[utoipa::path(
    post,
    path = "/api/file/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored and linked", body = UploadResponse),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Target record not found"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let Upload { kind, id, file } = read_upload(multipart).await?;

    let object_key = Uuid::new_v4().to_string();
    state
        .blobs
        .put(&object_key, file.bytes, &file.content_type)
        .await?;
    let public_url = state.blobs.public_url(&object_key);

    let linked = match kind {
        UploadKind::UserImage => state.db.set_user_profile_picture(&id, &public_url).await,
        UploadKind::AnimalImage => state.db.set_animal_profile_picture(&id, &public_url).await,
        UploadKind::TrainingLogVideo => state.db.set_training_log_video(&id, &public_url).await,
    };

    match linked {
        Ok(true) => {
            info!(?kind, record_id = %id, object_key = %object_key, "upload linked");
            Ok(Json(UploadResponse {
                message: "uploaded".to_string(),
                object_key,
                public_url,
            }))
        }
        Ok(false) => {
            discard_blob(&state, &object_key).await;
            Err(AppError::NotFound(format!("{} not found", kind.entity())))
        }
        Err(e) => {
            discard_blob(&state, &object_key).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for name in UploadKind::NAMES {
            let kind = UploadKind::from_name(name).expect("known name");
            assert_eq!(
                serde_json::to_value(kind).expect("serialize"),
                Value::String(name.to_string())
            );
        }
        assert_eq!(UploadKind::from_name("avatar"), None);
    }

    #[test]
    fn test_response_keys() {
        let value = serde_json::to_value(UploadResponse {
            message: "uploaded".to_string(),
            object_key: "k".to_string(),
            public_url: "http://h/k".to_string(),
        })
        .expect("serialize");

        assert_eq!(value["objectKey"], "k");
        assert_eq!(value["publicURL"], "http://h/k");
    }
}
