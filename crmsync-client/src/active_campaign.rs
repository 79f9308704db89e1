//! ActiveCampaign API v3 client (reqwest-based).

use crate::api::{ContactListMembership, ContactTag, CrmApi, NewContact, RemoteList, RemoteTag};
use crate::config::CrmConfig;
use crate::error::{ApiError, ApiResult};
use crate::wire;
use async_trait::async_trait;
use crmsync_types::{ContactId, ContactTagId, ListId, ListStatus, TagId};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Error code the CRM attaches to a rejected contact email.
const INVALID_EMAIL_CODE: &str = "email_invalid";

/// HTTP client for the ActiveCampaign v3 API.
#[derive(Debug, Clone)]
pub struct ActiveCampaignClient {
    base_url: String,
    api_token: String,
    page_size: usize,
    client: Client,
}

impl ActiveCampaignClient {
    /// Creates a client from configuration.
    pub fn new(config: &CrmConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("crmsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, client))
    }

    /// Creates a client with a pre-built `reqwest::Client`.
    pub fn with_http_client(config: &CrmConfig, client: Client) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            page_size: config.page_size.max(1),
            client,
        }
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/3/{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Api-Token", &self.api_token)
            .header("Accept", "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        debug!("GET {path}");
        let response = self
            .authed(self.client.get(self.url(path)))
            .query(query)
            .send()
            .await?;
        parse_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {path}");
        let response = self
            .authed(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        parse_json(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        debug!("DELETE {path}");
        let response = self
            .authed(self.client.delete(self.url(path)))
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// Walks an offset-paginated collection endpoint.
    async fn get_all_pages<P, T>(
        &self,
        path: &str,
        split: impl Fn(P) -> (Vec<T>, Option<wire::PageMeta>),
    ) -> ApiResult<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let mut all = Vec::new();
        loop {
            let query = [
                ("limit", self.page_size.to_string()),
                ("offset", all.len().to_string()),
            ];
            let page: P = self.get(path, &query).await?;
            let (items, meta) = split(page);
            let fetched = items.len();
            all.extend(items);

            let total = meta.and_then(|m| m.total.parse::<usize>().ok());
            let done = match total {
                Some(total) => all.len() >= total,
                None => fetched < self.page_size,
            };
            if fetched == 0 || done {
                break;
            }
        }
        Ok(all)
    }
}

/// Turns a non-success response into an `ApiError`, recognizing the CRM's
/// invalid-email validation failure.
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<wire::ErrorBody>(&body).ok();
    let invalid_email = match &parsed {
        Some(parsed) => parsed
            .errors
            .iter()
            .any(|e| e.code.as_deref() == Some(INVALID_EMAIL_CODE)),
        None => body.contains(INVALID_EMAIL_CODE),
    };
    if invalid_email {
        let title = parsed
            .and_then(|p| {
                p.errors
                    .into_iter()
                    .find(|e| e.code.as_deref() == Some(INVALID_EMAIL_CODE))
                    .and_then(|e| e.title)
            })
            .unwrap_or(body);
        return Err(ApiError::InvalidContactIdentifier(title));
    }

    if status.as_u16() == 404 {
        return Err(ApiError::NotFound(body));
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::UnexpectedResponse(format!("{e}: {body}")))
}

#[async_trait]
impl CrmApi for ActiveCampaignClient {
    async fn find_contact_by_email(&self, email: &str) -> ApiResult<Option<ContactId>> {
        let found: wire::ContactList = self
            .get("contacts", &[("email", email.to_string())])
            .await?;
        Ok(found.contacts.into_iter().next().map(|c| ContactId::new(c.id)))
    }

    async fn create_contact(&self, contact: &NewContact) -> ApiResult<ContactId> {
        let request = wire::CreateContactRequest {
            contact: wire::ContactFields {
                email: &contact.email,
                first_name: &contact.first_name,
                last_name: &contact.last_name,
            },
        };
        let created: wire::CreateContactResponse = self.post("contacts", &request).await?;
        Ok(ContactId::new(created.contact.id))
    }

    async fn contact_lists(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactListMembership>> {
        let response: wire::ContactListsResponse = self
            .get(&format!("contacts/{contact_id}/contactLists"), &[])
            .await?;
        Ok(response
            .contact_lists
            .into_iter()
            .filter_map(|entry| {
                let Some(status) = entry.status.parse().ok().and_then(ListStatus::from_code) else {
                    debug!("Skipping list {} membership with status {}", entry.list, entry.status);
                    return None;
                };
                Some(ContactListMembership {
                    list_id: ListId::new(entry.list),
                    status,
                })
            })
            .collect())
    }

    async fn contact_tags(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactTag>> {
        let response: wire::ContactTagsResponse = self
            .get(&format!("contacts/{contact_id}/contactTags"), &[])
            .await?;
        Ok(response
            .contact_tags
            .into_iter()
            .map(|entry| ContactTag {
                id: ContactTagId::new(entry.id),
                tag_id: TagId::new(entry.tag),
            })
            .collect())
    }

    async fn apply_tag(&self, contact_id: &ContactId, tag_id: &TagId) -> ApiResult<()> {
        let request = wire::ApplyTagRequest {
            contact_tag: wire::ContactTagFields {
                contact: contact_id.as_str(),
                tag: tag_id.as_str(),
            },
        };
        let _: serde_json::Value = self.post("contactTags", &request).await?;
        Ok(())
    }

    async fn remove_contact_tag(&self, association_id: &ContactTagId) -> ApiResult<()> {
        self.delete(&format!("contactTags/{association_id}")).await
    }

    async fn set_list_status(
        &self,
        contact_id: &ContactId,
        list_id: &ListId,
        status: ListStatus,
    ) -> ApiResult<()> {
        let request = wire::SetListStatusRequest {
            contact_list: wire::ContactListFields {
                list: list_id.as_str(),
                contact: contact_id.as_str(),
                status: status.code(),
            },
        };
        let _: serde_json::Value = self.post("contactLists", &request).await?;
        Ok(())
    }

    async fn lists(&self) -> ApiResult<Vec<RemoteList>> {
        let entries = self
            .get_all_pages("lists", |page: wire::ListsPage| (page.lists, page.meta))
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| RemoteList {
                id: ListId::new(entry.id),
                name: entry.name,
            })
            .collect())
    }

    async fn tags(&self) -> ApiResult<Vec<RemoteTag>> {
        let entries = self
            .get_all_pages("tags", |page: wire::TagsPage| (page.tags, page.meta))
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| RemoteTag {
                id: TagId::new(entry.id),
                name: entry.tag,
            })
            .collect())
    }
}
