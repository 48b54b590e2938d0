//! Tantivy-based search index module.
//!
//! Provides full-text search over available found items with field boosting.
//! Claimed items are dropped from the index; the deterministic list filter in
//! the API layer is a separate, exact-match path.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{FoundItemRecord, FoundStatus};

/// Field boost values; the item name dominates relevance.
const BOOST_NAME: f32 = 10.0;
const BOOST_DESCRIPTION: f32 = 7.0;
const BOOST_LOCATION: f32 = 4.0;

/// Search result with item id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub item_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    item_id: Field,
    name: Field,
    description: Field,
    location: Field,
}

/// Tantivy search index for found items.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        // Define schema
        let mut schema_builder = Schema::builder();
        let item_id = schema_builder.add_text_field("item_id", STORED);
        let name = schema_builder.add_text_field("name", TEXT | STORED);
        let description = schema_builder.add_text_field("description", TEXT);
        let location = schema_builder.add_text_field("location", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            item_id,
            name,
            description,
            location,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the found item collection.
    pub async fn rebuild(&self, items: &[FoundItemRecord]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        // Clear existing index
        writer.delete_all_documents()?;

        // Only available items are searchable
        let mut indexed = 0;
        for item in items {
            if item.status != FoundStatus::Available {
                continue;
            }
            let doc = self.create_document(item);
            writer.add_document(doc)?;
            indexed += 1;
        }

        writer.commit()?;

        // Reload reader to see new documents
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} found items", indexed);
        Ok(())
    }

    /// Index a single found item.
    pub async fn index_item(&self, item: &FoundItemRecord) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        // Delete existing document if any
        let term = tantivy::Term::from_field_text(self.fields.item_id, &item.id);
        writer.delete_term(term);

        if item.status == FoundStatus::Available {
            let doc = self.create_document(item);
            writer.add_document(doc)?;
        }
        writer.commit()?;

        // Reload reader
        self.reader.reload()?;

        Ok(())
    }

    /// Remove an item from the index (claimed or deleted).
    pub async fn remove_item(&self, item_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.item_id, item_id);
        writer.delete_term(term);
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search for found items matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        // Create query parser for all searchable fields
        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.name, self.fields.description, self.fields.location],
        );

        // Parse the user query
        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        // Create field-specific boosted queries
        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();

        let field_queries = [
            (self.fields.name, BOOST_NAME),
            (self.fields.description, BOOST_DESCRIPTION),
            (self.fields.location, BOOST_LOCATION),
        ];

        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        // Combine with OR semantics
        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        // Execute search with pagination
        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit + offset))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        // Extract results with pagination
        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let item_id = doc.get_first(self.fields.item_id)?.as_str()?.to_string();
                Some(SearchResult { item_id, score })
            })
            .collect();

        Ok(results)
    }

    /// Create a Tantivy document from a found item.
    fn create_document(&self, item: &FoundItemRecord) -> TantivyDocument {
        doc!(
            self.fields.item_id => item.id.clone(),
            self.fields.name => item.name.clone(),
            self.fields.description => item.description.clone(),
            self.fields.location => item.location.clone()
        )
    }
}
