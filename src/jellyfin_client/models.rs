use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SystemInfo {
    pub server_name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: String,
    #[serde(default, deserialize_with = "crate::jellyfin_client::de::string_or_null")]
    pub name: String,
}

/// A catalog node: library view, folder, or file. Only `Id` is guaranteed.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteItem {
    pub id: String,
    #[serde(default, deserialize_with = "crate::jellyfin_client::de::string_or_null")]
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub overview: Option<String>,
    pub genres: Option<Vec<String>>,
    pub people: Option<Vec<Person>>,
    pub child_count: Option<i64>,
    pub container: Option<String>,
    pub path: Option<String>,
    pub date_created: Option<String>,
    pub collection_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub name: Option<String>,
    /// Person kind such as "Author" or "Artist"
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<RemoteItem>,
    pub total_record_count: Option<i64>,
    pub start_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    pub index: Option<i64>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub codec: Option<String>,
}

/// Servers answer either with a bare array or with an `Items` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AttachmentsResponse {
    List(Vec<Attachment>),
    Wrapped {
        #[serde(rename = "Items", default)]
        items: Vec<Attachment>,
    },
}

impl AttachmentsResponse {
    pub fn into_vec(self) -> Vec<Attachment> {
        match self {
            AttachmentsResponse::List(v) => v,
            AttachmentsResponse::Wrapped { items } => items,
        }
    }
}

/// Query string of `/Users/{userId}/Items`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_item_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_info_deserialize() {
        let json = r#"{ "ServerName": "media", "Version": "10.9.11", "Id": "f0a1", "OperatingSystem": "Linux" }"#;
        let info: SystemInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.server_name.as_deref(), Some("media"));
        assert_eq!(info.version.as_deref(), Some("10.9.11"));
    }

    #[test]
    fn items_deserialize_example() {
        let json = r#"{
    "Items": [
        {
            "Name": "Berserk",
            "ServerId": "4c5e0a7b",
            "Id": "a1b2c3",
            "IsFolder": true,
            "Type": "Folder",
            "ChildCount": 41,
            "Genres": ["Dark Fantasy"],
            "People": [{ "Name": "Kentaro Miura", "Id": "p1", "Type": "Author" }],
            "Overview": null,
            "DateCreated": "2023-04-01T10:15:30.0000000Z"
        },
        {
            "Name": null,
            "Id": "d4e5f6",
            "Type": "Book",
            "Container": "cbz",
            "Path": "/books/Berserk/Vol. 01.cbz"
        }
    ],
    "TotalRecordCount": 2,
    "StartIndex": 0
}"#;
        let parsed: ItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_record_count, Some(2));
        assert_eq!(parsed.items.len(), 2);
        let series = &parsed.items[0];
        assert_eq!(series.item_type.as_deref(), Some("Folder"));
        assert_eq!(series.child_count, Some(41));
        assert_eq!(series.people.as_ref().unwrap()[0].kind.as_deref(), Some("Author"));
        assert_eq!(series.overview, None);
        let book = &parsed.items[1];
        assert_eq!(book.name, "");
        assert_eq!(book.container.as_deref(), Some("cbz"));
        assert_eq!(book.genres, None);
    }

    #[test]
    fn item_with_only_id_deserializes() {
        let item: RemoteItem = serde_json::from_str(r#"{ "Id": "x" }"#).unwrap();
        assert_eq!(item.id, "x");
        assert_eq!(item.name, "");
        assert_eq!(item.item_type, None);
    }

    #[test]
    fn attachments_accept_both_shapes() {
        let bare = r#"[{ "Index": 0, "FileName": "001.jpg", "MimeType": "image/jpeg" }]"#;
        let wrapped = r#"{ "Items": [{ "Index": 2, "FileName": "cover.png" }] }"#;
        let a: AttachmentsResponse = serde_json::from_str(bare).unwrap();
        let b: AttachmentsResponse = serde_json::from_str(wrapped).unwrap();
        assert_eq!(a.into_vec()[0].file_name.as_deref(), Some("001.jpg"));
        assert_eq!(b.into_vec()[0].index, Some(2));
    }

    #[test]
    fn items_query_serializes_pascal_case_and_skips_unset() {
        let q = ItemsQuery {
            parent_id: Some("p".into()),
            recursive: Some(true),
            limit: Some(20),
            ..Default::default()
        };
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["ParentId"], "p");
        assert_eq!(v["Recursive"], true);
        assert_eq!(v["Limit"], 20);
        assert!(v.get("SearchTerm").is_none());
    }
}
