//! Membership reference operation integration tests using wiremock
//!
//! Verifies the wire behavior of `src/membership.rs`:
//!
//! - `add_member` POSTs an `@odata.id` reference body to the group's
//!   `members/$ref` collection with a bearer token attached.
//! - `remove_member` issues a DELETE against the specific member's
//!   reference entry; a regression test asserts add and remove are distinct
//!   wire operations.
//! - Service conflict / not-found / transport responses map to the
//!   membership error taxonomy.
//! - An empty members collection is an empty `Vec`, not an error.

use std::sync::Arc;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirgraph::auth::{Credential, CredentialProvider};
use dirgraph::error::DirGraphError;
use dirgraph::membership::{MembershipReferenceClient, PrincipalReference};
use dirgraph::session::Session;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mounts a token endpoint on the mock server and builds a session whose
/// service base points at `{server}/v1.0`.
async fn make_session(server: &MockServer) -> Session {
    Mock::given(method("POST"))
        .and(path("/test-tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test_bearer_token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    let http = Arc::new(reqwest::Client::new());
    let credential =
        Credential::new("test-tenant", "test-client", "test-secret").expect("valid credential");
    let provider = Arc::new(
        CredentialProvider::new(Arc::clone(&http), credential, &server.uri())
            .expect("valid authority base"),
    );
    Session::new(
        http,
        provider,
        &format!("{}/v1.0", server.uri()),
        vec!["scope".to_string()],
    )
    .expect("valid service base")
}

/// Builds the canonical reference for `object_id` under the session's base.
fn principal(session: &Session, object_id: &str) -> PrincipalReference {
    PrincipalReference::directory_object(session.service_base(), object_id)
        .expect("valid object id")
}

// ---------------------------------------------------------------------------
// add_member
// ---------------------------------------------------------------------------

/// Adding posts the principal's canonical URI as an `@odata.id` reference
/// body, with the bearer token attached.
#[tokio::test]
async fn test_add_member_posts_reference_body() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/G/members/$ref"))
        .and(header("Authorization", "Bearer test_bearer_token"))
        .and(body_json(serde_json::json!({
            "@odata.id": format!("{}/v1.0/directoryObjects/user-1", server.uri())
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    MembershipReferenceClient::new(&session)
        .add_member("G", &member)
        .await
        .expect("add must succeed on 204");

    server.verify().await;
}

/// A duplicate add is reported by the service as a 400 with an "already
/// exist" message, which maps to a conflict.
#[tokio::test]
async fn test_duplicate_add_maps_to_conflict() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/G/members/$ref"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": "Request_BadRequest",
                "message": "One or more added object references already exist."
            }
        })))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .add_member("G", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipConflict(_))
    ));
}

/// An explicit 409 also maps to a conflict.
#[tokio::test]
async fn test_conflict_status_maps_to_conflict() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/G/members/$ref"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .add_member("G", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipConflict(_))
    ));
}

/// Adding to an unknown group maps to not-found.
#[tokio::test]
async fn test_add_to_unknown_group_maps_to_not_found() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/missing/members/$ref"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .add_member("missing", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipNotFound(_))
    ));
}

/// A server failure maps to the retryable transport kind.
#[tokio::test]
async fn test_server_failure_maps_to_transport() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/G/members/$ref"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .add_member("G", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipTransport(_))
    ));
}

// ---------------------------------------------------------------------------
// remove_member
// ---------------------------------------------------------------------------

/// Removal deletes the specific member's reference entry. The add endpoint
/// must receive nothing: add and remove are distinct wire operations.
#[tokio::test]
async fn test_remove_member_deletes_reference_entry() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/G/members/$ref"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1.0/groups/G/members/user-1/$ref"))
        .and(header("Authorization", "Bearer test_bearer_token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    MembershipReferenceClient::new(&session)
        .remove_member("G", &member)
        .await
        .expect("remove must succeed on 204");

    server.verify().await;
}

/// Removing a principal that was never a member maps to not-found.
#[tokio::test]
async fn test_remove_non_member_maps_to_not_found() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "stranger");

    Mock::given(method("DELETE"))
        .and(path("/v1.0/groups/G/members/stranger/$ref"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .remove_member("G", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// list_members
// ---------------------------------------------------------------------------

/// An empty members collection is an empty `Vec`, not an error.
#[tokio::test]
async fn test_list_members_of_empty_group_is_empty_vec() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/G/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": []
        })))
        .mount(&server)
        .await;

    let members = MembershipReferenceClient::new(&session)
        .list_members("G")
        .await
        .expect("empty group must list successfully");

    assert!(members.is_empty());
}

/// Listed member ids come back as canonical references in service order.
#[tokio::test]
async fn test_list_members_maps_ids_to_references() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/G/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "user-1"}, {"id": "user-2"}]
        })))
        .mount(&server)
        .await;

    let members = MembershipReferenceClient::new(&session)
        .list_members("G")
        .await
        .expect("list");

    let uris: Vec<&str> = members.iter().map(|m| m.uri()).collect();
    assert_eq!(
        uris,
        vec![
            format!("{}/v1.0/directoryObjects/user-1", server.uri()).as_str(),
            format!("{}/v1.0/directoryObjects/user-2", server.uri()).as_str(),
        ]
    );
}

/// Listing an unknown group maps to not-found.
#[tokio::test]
async fn test_list_members_of_unknown_group_maps_to_not_found() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/missing/members"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = MembershipReferenceClient::new(&session)
        .list_members("missing")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::MembershipNotFound(_))
    ));
}

/// An empty group id is rejected before any request is issued.
#[tokio::test]
async fn test_empty_group_id_is_rejected_without_io() {
    let server = MockServer::start().await;
    let session = make_session(&server).await;
    let member = principal(&session, "user-1");

    let err = MembershipReferenceClient::new(&session)
        .add_member("", &member)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DirGraphError>(),
        Some(DirGraphError::Validation(_))
    ));
    // Only mock mounted is the token endpoint; nothing may have hit it.
    assert!(server
        .received_requests()
        .await
        .expect("request recording enabled")
        .is_empty());
}
