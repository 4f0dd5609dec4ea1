//! Group membership as relationship-reference operations
//!
//! Directory memberships are many-to-many edges. Adding and removing a
//! member link or unlink two existing objects by identifier instead of
//! copying either object, so the application only needs permission on the
//! relationship collection, not on the full member object.
//!
//! Adding posts a reference-creation body to the group's `members/$ref`
//! collection; removing issues a DELETE against the specific member's
//! reference entry. These are deliberately distinct wire operations --
//! removal is never expressed as a second add.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{excerpt, DirGraphError, Result};
use crate::session::Session;

// ---------------------------------------------------------------------------
// PrincipalReference
// ---------------------------------------------------------------------------

/// A canonical URI identifying one directory object.
///
/// Used only as the payload of membership mutations; it is a reference,
/// never a copy of the object. The URI's final path segment is the object
/// identifier, which removal uses to address the reference entry.
///
/// # Examples
///
/// ```
/// use dirgraph::membership::PrincipalReference;
///
/// let base = url::Url::parse("https://graph.microsoft.com/v1.0").unwrap();
/// let principal = PrincipalReference::directory_object(&base, "abc-123").unwrap();
/// assert_eq!(
///     principal.uri(),
///     "https://graph.microsoft.com/v1.0/directoryObjects/abc-123"
/// );
/// assert_eq!(principal.object_id(), "abc-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalReference {
    uri: String,
}

impl PrincipalReference {
    /// Builds the canonical reference for a directory object id under the
    /// given service base.
    pub fn directory_object(service_base: &url::Url, object_id: &str) -> Result<Self> {
        if object_id.trim().is_empty() {
            return Err(
                DirGraphError::Validation("object id must not be empty".to_string()).into(),
            );
        }
        Ok(Self {
            uri: format!(
                "{}/directoryObjects/{}",
                service_base.as_str().trim_end_matches('/'),
                object_id,
            ),
        })
    }

    /// The canonical URI string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The object identifier: the final path segment of the URI.
    pub fn object_id(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Reference-creation payload for `members/$ref`.
#[derive(Debug, Serialize)]
struct ReferenceCreate<'a> {
    #[serde(rename = "@odata.id")]
    odata_id: &'a str,
}

/// One member entry as returned by the members collection.
#[derive(Debug, Deserialize)]
struct MemberObject {
    id: String,
}

/// Collection envelope used by listing endpoints.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

// ---------------------------------------------------------------------------
// MembershipReferenceClient
// ---------------------------------------------------------------------------

/// Issues membership mutations and listings over one [`Session`].
///
/// Stateless; the facade constructs one per call. The error taxonomy is
/// per-call: conflict and not-found are terminal for that call, transport
/// may be retried by the caller.
pub struct MembershipReferenceClient<'a> {
    session: &'a Session,
}

impl<'a> MembershipReferenceClient<'a> {
    /// Creates a client borrowing the given session.
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Adds a principal to a group's membership relationship collection.
    ///
    /// Issues `POST groups/{group_id}/members/$ref` with the principal's
    /// canonical URI as an `@odata.id` reference body.
    ///
    /// # Errors
    ///
    /// - [`DirGraphError::MembershipConflict`] when the service reports the
    ///   principal is already a member.
    /// - [`DirGraphError::MembershipNotFound`] when the group or the
    ///   referenced principal does not exist.
    /// - [`DirGraphError::MembershipTransport`] for network or auth
    ///   failures.
    pub async fn add_member(&self, group_id: &str, principal: &PrincipalReference) -> Result<()> {
        validate_group_id(group_id)?;
        let path = format!("groups/{}/members/$ref", group_id);
        let body = ReferenceCreate {
            odata_id: principal.uri(),
        };

        tracing::debug!(group = group_id, principal = principal.uri(), "adding member");
        let response = self
            .session
            .request(Method::POST, &path)
            .await?
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        check_mutation_response(response, group_id).await
    }

    /// Removes a principal's reference entry from a group.
    ///
    /// Issues `DELETE groups/{group_id}/members/{object_id}/$ref`, the
    /// genuine deletion of the membership edge. Same error taxonomy as
    /// [`add_member`](Self::add_member); not-found also covers "was not a
    /// member".
    pub async fn remove_member(
        &self,
        group_id: &str,
        principal: &PrincipalReference,
    ) -> Result<()> {
        validate_group_id(group_id)?;
        let path = format!("groups/{}/members/{}/$ref", group_id, principal.object_id());

        tracing::debug!(
            group = group_id,
            principal = principal.uri(),
            "removing member"
        );
        let response = self
            .session
            .request(Method::DELETE, &path)
            .await?
            .send()
            .await
            .map_err(transport_error)?;

        check_mutation_response(response, group_id).await
    }

    /// Lists the group's current members as canonical references.
    ///
    /// An empty collection is a valid result and yields an empty `Vec`.
    pub async fn list_members(&self, group_id: &str) -> Result<Vec<PrincipalReference>> {
        validate_group_id(group_id)?;
        let path = format!("groups/{}/members", group_id);

        let response = self
            .session
            .request(Method::GET, &path)
            .await?
            .query(&[("$select", "id")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(
                DirGraphError::MembershipNotFound(format!("group {}", group_id)).into(),
            );
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirGraphError::MembershipTransport(format!(
                "HTTP {}: {}",
                status,
                excerpt(&body, 256),
            ))
            .into());
        }

        let collection: Collection<MemberObject> = response.json().await.map_err(|e| {
            anyhow::anyhow!(DirGraphError::MembershipTransport(format!(
                "malformed members response: {}",
                e
            )))
        })?;

        collection
            .value
            .into_iter()
            .map(|member| PrincipalReference::directory_object(self.session.service_base(), &member.id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_group_id(group_id: &str) -> Result<()> {
    if group_id.trim().is_empty() {
        return Err(DirGraphError::Validation("group id must not be empty".to_string()).into());
    }
    Ok(())
}

fn transport_error(e: reqwest::Error) -> anyhow::Error {
    anyhow::anyhow!(DirGraphError::MembershipTransport(format!(
        "request failed: {}",
        e
    )))
}

/// Maps a mutation response status to the membership error taxonomy.
///
/// The service reports a duplicate add as HTTP 400 with an "already exist"
/// message in the error body; an explicit 409 is treated the same way.
async fn check_mutation_response(response: reqwest::Response, group_id: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        Err(DirGraphError::MembershipNotFound(format!(
            "group {} or referenced principal",
            group_id
        ))
        .into())
    } else if status == StatusCode::CONFLICT
        || (status == StatusCode::BAD_REQUEST && body.contains("already exist"))
    {
        Err(DirGraphError::MembershipConflict(excerpt(&body, 256).to_string()).into())
    } else {
        Err(DirGraphError::MembershipTransport(format!(
            "HTTP {}: {}",
            status,
            excerpt(&body, 256),
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> url::Url {
        url::Url::parse("https://graph.example.com/v1.0").unwrap()
    }

    // -----------------------------------------------------------------------
    // PrincipalReference
    // -----------------------------------------------------------------------

    #[test]
    fn test_directory_object_builds_canonical_uri() {
        let principal = PrincipalReference::directory_object(&base(), "abc-123").unwrap();
        assert_eq!(
            principal.uri(),
            "https://graph.example.com/v1.0/directoryObjects/abc-123"
        );
    }

    #[test]
    fn test_directory_object_rejects_empty_id() {
        assert!(PrincipalReference::directory_object(&base(), " ").is_err());
    }

    #[test]
    fn test_object_id_is_last_segment() {
        let principal = PrincipalReference::directory_object(&base(), "abc-123").unwrap();
        assert_eq!(principal.object_id(), "abc-123");
    }

    #[test]
    fn test_reference_create_serializes_odata_id() {
        let principal = PrincipalReference::directory_object(&base(), "abc").unwrap();
        let body = ReferenceCreate {
            odata_id: principal.uri(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "@odata.id": "https://graph.example.com/v1.0/directoryObjects/abc"
            })
        );
    }

    // -----------------------------------------------------------------------
    // Collection deserialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_collection_defaults_to_empty_value() {
        let collection: Collection<MemberObject> = serde_json::from_str("{}").unwrap();
        assert!(collection.value.is_empty());
    }

    #[test]
    fn test_collection_parses_member_ids() {
        let collection: Collection<MemberObject> = serde_json::from_str(
            r#"{"value": [{"id": "a"}, {"id": "b"}]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = collection.value.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    // -----------------------------------------------------------------------
    // validate_group_id
    // -----------------------------------------------------------------------

    #[test]
    fn test_validate_group_id_rejects_empty() {
        assert!(validate_group_id("").is_err());
        assert!(validate_group_id("   ").is_err());
        assert!(validate_group_id("G").is_ok());
    }
}
