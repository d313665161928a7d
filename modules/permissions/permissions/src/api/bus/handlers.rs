use bytes::Bytes;
use permissions_sdk::{
    CheckRequest, CheckResponse, GrantRequest, ListRequest, ListResponse, PermissionsClient,
    PermissionsError, ResponseEnvelope, RevokeRequest, StatusResponse, subjects,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Reply sent when no better answer can be produced.
pub const INTERNAL_ERROR_BODY: &[u8] =
    br#"{"error":{"code":"internal_error","message":"Internal server error"}}"#;

/// Decode `payload` for `subject`, run the operation and encode the reply.
///
/// Always yields a reply body: decode failures become `invalid_payload`.
pub async fn dispatch(client: &dyn PermissionsClient, subject: &str, payload: &[u8]) -> Bytes {
    match subject {
        subjects::GRANT => {
            handle(payload, |req: GrantRequest| async move {
                client.grant(req).await.map(|()| StatusResponse::ok())
            })
            .await
        }
        subjects::REVOKE => {
            handle(payload, |req: RevokeRequest| async move {
                client.revoke(req).await.map(|()| StatusResponse::ok())
            })
            .await
        }
        subjects::CHECK => {
            handle(payload, |req: CheckRequest| async move {
                client
                    .check(req)
                    .await
                    .map(|allowed| CheckResponse { allowed })
            })
            .await
        }
        subjects::LIST => {
            handle(payload, |req: ListRequest| async move {
                client
                    .list(req)
                    .await
                    .map(|permissions| ListResponse { permissions })
            })
            .await
        }
        other => {
            error!(subject = other, "No handler for subject");
            Bytes::from_static(INTERNAL_ERROR_BODY)
        }
    }
}

async fn handle<Req, Resp, F, Fut>(payload: &[u8], op: F) -> Bytes
where
    Req: DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp, PermissionsError>>,
{
    let result = match serde_json::from_slice::<Req>(payload) {
        Ok(req) => op(req).await,
        Err(e) => {
            debug!(error = %e, "Malformed request payload");
            Err(PermissionsError::invalid_payload(format!(
                "Malformed request: {e}"
            )))
        }
    };

    encode(&ResponseEnvelope::from(result))
}

fn encode<T: Serialize>(body: &T) -> Bytes {
    match serde_json::to_vec(body) {
        Ok(raw) => Bytes::from(raw),
        Err(e) => {
            error!(error = %e, "Failed to encode reply");
            Bytes::from_static(INTERNAL_ERROR_BODY)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use permissions_sdk::{Permission, PermissionSet};
    use serde_json::{Value, json};

    use super::*;

    /// Records the last request and answers from canned results.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, line: String) {
            self.seen.lock().unwrap().push(line);
        }
    }

    #[async_trait]
    impl PermissionsClient for Recorder {
        async fn grant(&self, r: GrantRequest) -> Result<(), PermissionsError> {
            self.record(format!("grant {} {} {}", r.api_key, r.module, r.action));
            Ok(())
        }

        async fn revoke(&self, r: RevokeRequest) -> Result<(), PermissionsError> {
            self.record(format!("revoke {} {} {}", r.api_key, r.module, r.action));
            Err(PermissionsError::PermissionNotFound)
        }

        async fn check(&self, r: CheckRequest) -> Result<bool, PermissionsError> {
            self.record(format!("check {} {} {}", r.api_key, r.module, r.action));
            Ok(r.action == "read")
        }

        async fn list(&self, r: ListRequest) -> Result<PermissionSet, PermissionsError> {
            self.record(format!("list {}", r.api_key));
            Ok(vec![Permission::new("inventory", "read")].into())
        }
    }

    async fn call(client: &Recorder, subject: &str, body: &str) -> Value {
        let reply = dispatch(client, subject, body.as_bytes()).await;
        serde_json::from_slice(&reply).unwrap()
    }

    #[tokio::test]
    async fn grant_replies_status_ok() {
        let client = Recorder::default();
        let reply = call(
            &client,
            subjects::GRANT,
            r#"{"apiKey":"k1","module":"inventory","action":"read"}"#,
        )
        .await;

        assert_eq!(reply, json!({"status": "ok"}));
        assert_eq!(*client.seen.lock().unwrap(), vec!["grant k1 inventory read"]);
    }

    #[tokio::test]
    async fn check_and_list_shapes() {
        let client = Recorder::default();

        let reply = call(
            &client,
            subjects::CHECK,
            r#"{"apiKey":"k1","module":"inventory","action":"read"}"#,
        )
        .await;
        assert_eq!(reply, json!({"allowed": true}));

        let reply = call(&client, subjects::LIST, r#"{"apiKey":"k1"}"#).await;
        assert_eq!(
            reply,
            json!({"permissions": [{"module": "inventory", "action": "read"}]})
        );
    }

    #[tokio::test]
    async fn errors_use_the_error_envelope() {
        let client = Recorder::default();
        let reply = call(
            &client,
            subjects::REVOKE,
            r#"{"apiKey":"k1","module":"inventory","action":"read"}"#,
        )
        .await;

        assert_eq!(reply["error"]["code"], "permission_not_found");
        assert!(reply.get("status").is_none());
    }

    #[tokio::test]
    async fn missing_fields_reach_the_client_as_empty() {
        let client = Recorder::default();
        call(&client, subjects::CHECK, r#"{"apiKey":"k1"}"#).await;
        assert_eq!(*client.seen.lock().unwrap(), vec!["check k1  "]);
    }

    #[tokio::test]
    async fn undecodable_payload_is_invalid_payload() {
        let client = Recorder::default();

        for body in ["not json", "[1,2]", r#"{"apiKey":42}"#] {
            let reply = call(&client, subjects::GRANT, body).await;
            assert_eq!(reply["error"]["code"], "invalid_payload", "body: {body}");
            assert!(
                reply["error"]["message"]
                    .as_str()
                    .unwrap()
                    .starts_with("Malformed request")
            );
        }
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_subject_is_internal_error() {
        let client = Recorder::default();
        let reply = call(&client, "permissions.nope", "{}").await;
        assert_eq!(
            reply,
            json!({"error": {"code": "internal_error", "message": "Internal server error"}})
        );
    }
}
