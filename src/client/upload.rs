//! File uploads from a URL or a local file

use super::WikiClientGeneric;
use crate::{
    Error, Result,
    error::FailureKind,
    session::{FilePart, Transport},
    types::{ActionKind, ApiParams, UploadData, UploadRequest, UploadSource},
};
use serde_json::Value;
use tracing::{debug, info};

/// Warnings that mean the file is already on the wiki
const ALREADY_PRESENT: &[&str] = &[
    "duplicate",
    "exists",
    "duplicate-archive",
    "was-deleted",
    "page-exists",
    "exists-normalized",
];

impl<T: Transport> WikiClientGeneric<T> {
    /// Upload a file; the source is checked before a token is requested
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadData> {
        let action = ActionKind::Upload;
        self.session.require_login()?;

        let file = match &request.source {
            UploadSource::Url(url) => {
                let status = self.transport().probe(url).await?;
                debug!("Upload source {} answered HTTP {}", url, status);
                if !(200..400).contains(&status) {
                    return Err(Error::action(
                        action,
                        FailureKind::InvalidParameter,
                        format!("source {url} answered HTTP {status}"),
                    ));
                }
                None
            }
            UploadSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    Error::action(
                        action,
                        FailureKind::NotFound,
                        format!("cannot read {}: {e}", path.display()),
                    )
                })?;
                Some(FilePart {
                    field: "file".to_string(),
                    file_name: request.filename.clone(),
                    bytes,
                })
            }
        };

        let token = self.token(action, &request.file_title()).await?;
        let mut params = ApiParams::action("upload")
            .set("filename", request.filename.as_str())
            .set("comment", request.comment.as_str())
            .opt("text", request.text.as_deref())
            .flag("ignorewarnings", request.ignore_warnings)
            .set("token", token.value);
        if let UploadSource::Url(url) = &request.source {
            params = params.set("url", url.as_str());
        }

        let reply = match file {
            Some(file) => self.transport().post_multipart(&params, file).await?,
            None => self.transport().post(&params).await?,
        }
        .into_action_result(action)?;

        interpret_upload(&request.filename, &reply)
    }
}

fn interpret_upload(filename: &str, reply: &Value) -> Result<UploadData> {
    let action = ActionKind::Upload;
    let upload = reply.get("upload").ok_or_else(|| {
        Error::action(
            action,
            FailureKind::Generic,
            format!("reply has no 'upload' result: {reply}"),
        )
    })?;

    match upload.get("result").and_then(Value::as_str) {
        Some("Success") => {
            let info = upload.get("imageinfo").cloned().unwrap_or(Value::Null);
            let data: UploadData = serde_json::from_value(info)?;
            info!("Uploaded File:{}", filename);
            Ok(data)
        }
        Some("Warning") => {
            let warnings = upload.get("warnings").cloned().unwrap_or(Value::Null);
            let present = warnings
                .as_object()
                .is_some_and(|w| w.keys().any(|k| ALREADY_PRESENT.contains(&k.as_str())));
            let kind = if present {
                FailureKind::AlreadyDone
            } else {
                FailureKind::Generic
            };
            Err(Error::action(action, kind, format!("upload warnings: {warnings}")))
        }
        other => Err(Error::action(
            action,
            FailureKind::Generic,
            format!("upload of {filename} ended with {other:?}: {reply}"),
        )),
    }
}
