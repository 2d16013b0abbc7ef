//! GraphQL wire types / GraphQL 响应类型

use serde::{Deserialize, Serialize};

/// Book discovery response / 书卷查询响应
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlBooks {
    pub data: BooksData,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BooksData {
    #[serde(default, rename = "docSet")]
    pub doc_set: Option<GqlDocSet>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlDocSet {
    #[serde(default)]
    pub documents: Vec<GqlDocument>,
}

/// Document entry / 文档条目
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlDocument {
    pub id: String,
    #[serde(default, rename = "idParts")]
    pub id_parts: IdParts,
}

impl GqlDocument {
    pub fn is_book(&self) -> bool {
        self.id_parts.kind == "book"
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct IdParts {
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Block query response / 文本块查询响应
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlBlocks {
    pub data: BlocksData,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BlocksData {
    #[serde(default)]
    pub document: Option<GqlBookDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlBookDocument {
    #[serde(default, rename = "bookCode")]
    pub book_code: String,
    #[serde(default, rename = "mainSequence")]
    pub main_sequence: MainSequence,
}

impl GqlBookDocument {
    /// Tokens of all blocks, in order / 所有文本块的 token
    pub fn tokens(self) -> impl Iterator<Item = GqlBlockToken> {
        self.main_sequence
            .blocks
            .into_iter()
            .flat_map(|block| block.tokens)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MainSequence {
    #[serde(default)]
    pub blocks: Vec<GqlBlock>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GqlBlock {
    #[serde(default)]
    pub tokens: Vec<GqlBlockToken>,
}

/// Text token with its scope tags / 带作用域标签的文本 token
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct GqlBlockToken {
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_books_deserialize() {
        let value = json!({
            "data": { "docSet": { "documents": [
                { "id": "d1", "idParts": { "type": "book" } },
                { "id": "d2", "idParts": { "type": "glossary" } }
            ]}}
        });
        let books: GqlBooks = serde_json::from_value(value).unwrap();
        let docs = books.data.doc_set.unwrap().documents;
        assert_eq!(docs.len(), 2);
        assert!(docs[0].is_book());
        assert!(!docs[1].is_book());
    }

    #[test]
    fn test_books_missing_doc_set() {
        let books: GqlBooks = serde_json::from_value(json!({ "data": { "docSet": null } })).unwrap();
        assert!(books.data.doc_set.is_none());
    }

    #[test]
    fn test_blocks_flatten_tokens() {
        let value = json!({
            "data": { "document": {
                "bookCode": "MAT",
                "mainSequence": { "blocks": [
                    { "tokens": [ { "scopes": ["chapter/1", "verses/1"], "payload": "In" } ] },
                    { "tokens": [ { "scopes": ["chapter/1", "verses/2"], "payload": "And" } ] }
                ]}
            }}
        });
        let blocks: GqlBlocks = serde_json::from_value(value).unwrap();
        let document = blocks.data.document.unwrap();
        assert_eq!(document.book_code, "MAT");
        let payloads: Vec<String> = document.tokens().map(|t| t.payload).collect();
        assert_eq!(payloads, vec!["In", "And"]);
    }
}
