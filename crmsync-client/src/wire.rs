//! ActiveCampaign v3 request/response bodies.
//!
//! The API serializes numeric ids and status codes as JSON strings in most
//! responses but accepts (and occasionally returns) plain numbers, so every
//! such field goes through [`lenient_string`].

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactList {
    pub contacts: Vec<IdOnly>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactFields<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateContactRequest<'a> {
    pub contact: ContactFields<'a>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateContactResponse {
    pub contact: IdOnly,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactListEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub list: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactListsResponse {
    pub contact_lists: Vec<ContactListEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactTagEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tag: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactTagsResponse {
    pub contact_tags: Vec<ContactTagEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactTagFields<'a> {
    pub contact: &'a str,
    pub tag: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyTagRequest<'a> {
    pub contact_tag: ContactTagFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactListFields<'a> {
    pub list: &'a str,
    pub contact: &'a str,
    pub status: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetListStatusRequest<'a> {
    pub contact_list: ContactListFields<'a>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageMeta {
    #[serde(deserialize_with = "lenient_string")]
    pub total: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListsPage {
    pub lists: Vec<ListEntry>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsPage {
    pub tags: Vec<TagEntry>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}
