//! Read options passed through to the driver's find

use bson::Document as BsonDocument;
use mongodb::options::FindOptions;

/// Options for a find: sort, skip, limit and projection
///
/// The values are handed to the server unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    sort: Option<BsonDocument>,
    projection: Option<BsonDocument>,
    skip: Option<u64>,
    limit: Option<i64>,
}

impl QueryOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sort order
    pub fn sort(mut self, sort: BsonDocument) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the fields to include or exclude
    pub fn projection(mut self, projection: BsonDocument) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Set the number of documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn get_sort(&self) -> Option<&BsonDocument> {
        self.sort.as_ref()
    }

    pub fn get_projection(&self) -> Option<&BsonDocument> {
        self.projection.as_ref()
    }

    pub fn get_skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn get_limit(&self) -> Option<i64> {
        self.limit
    }

    /// Narrow these options to a single result
    pub fn single(mut self) -> Self {
        self.limit = Some(1);
        self
    }

    /// Convert into the driver's find options
    pub fn into_find_options(self) -> FindOptions {
        let mut options = FindOptions::default();
        options.sort = self.sort;
        options.projection = self.projection;
        options.skip = self.skip;
        options.limit = self.limit;
        options
    }
}
