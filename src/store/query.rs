//! GraphQL query text builders / GraphQL 查询构建

/// Quote a value as a GraphQL string literal / 转义为 GraphQL 字符串
pub fn graphql_string(value: &str) -> String {
    // JSON string escaping is a valid subset of GraphQL string escaping
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// `withMatchingChars` filter for the given patterns / 构建匹配过滤参数
pub fn matching_chars_filter<S: AsRef<str>>(patterns: &[S]) -> String {
    let terms: Vec<String> = patterns.iter().map(|p| graphql_string(p.as_ref())).collect();
    format!("withMatchingChars: [{}]", terms.join(", "))
}

/// Book discovery query, documents in natural book order / 书卷查询
pub fn books_query(doc_set: &str, filter: &str) -> String {
    format!(
        r#"{{ docSet(id: {}) {{ documents({} allChars: true sortedBy: "paratext") {{ id idParts {{ type }} }} }} }}"#,
        graphql_string(doc_set),
        filter
    )
}

/// Per-book block query with chapter/verse scopes / 单卷文本块查询
pub fn blocks_query(book_id: &str, filter: &str) -> String {
    format!(
        r#"{{ document(id: {}) {{ bookCode: header(id: "bookCode") mainSequence {{ blocks({} allChars: true) {{ tokens(includeContext: true) {{ scopes(startsWith: ["chapter/" "verses/"]) payload }} }} }} }} }}"#,
        graphql_string(book_id),
        filter
    )
}
