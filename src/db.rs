use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Client, Collection};

use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Todo, TodoUpdate};

const COLLECTION_NAME: &str = "todos";

/// Parses a well-formed ObjectId (exactly 24 hex digits). Anything else is
/// rejected here and never reaches the database.
pub fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Persistent todo collection. Id-based operations are single-document
/// atomic in every implementation.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_one(&self, todo: Todo) -> Result<Todo, StoreError>;

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Todo>, StoreError>;

    async fn find_one_and_delete(&self, id: ObjectId) -> Result<Option<Todo>, StoreError>;

    /// Applies `update` and returns the document as it is afterwards.
    async fn find_one_and_update(
        &self,
        id: ObjectId,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, StoreError>;

    /// Validates `text` and inserts a new incomplete todo.
    async fn create(&self, text: Option<String>) -> Result<Todo, StoreError> {
        let todo = Todo::new(text)?;
        self.insert_one(todo).await
    }

    /// Validates `update` and applies it. An update with no fields reads the
    /// document without writing.
    async fn update(&self, id: ObjectId, update: TodoUpdate) -> Result<Option<Todo>, StoreError> {
        let update = update.validated()?;
        if update.is_empty() {
            return self.find_by_id(id).await;
        }
        self.find_one_and_update(id, update).await
    }
}

#[derive(Clone, Debug)]
pub struct MongoDbClient {
    client: Client,
    database: String,
}

impl MongoDbClient {
    pub async fn new(config: &Config) -> Result<Self, StoreError> {
        let client_options = ClientOptions::parse(&config.mongodb_uri).await?;
        let client = Client::with_options(client_options)?;
        Ok(Self {
            client,
            database: config.database.clone(),
        })
    }

    /// Shuts down the connection pool.
    pub async fn close(self) {
        self.client.shutdown().await;
    }

    fn todos(&self) -> Collection<Todo> {
        let db = self.client.database(&self.database);
        db.collection(COLLECTION_NAME)
    }
}

#[async_trait]
impl TodoStore for MongoDbClient {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn insert_one(&self, todo: Todo) -> Result<Todo, StoreError> {
        let result = self.todos().insert_one(&todo, None).await?;
        Ok(Todo {
            id: result.inserted_id.as_object_id(),
            ..todo
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut cursor = self.todos().find(None, None).await?;
        let mut result: Vec<Todo> = Vec::new();
        while cursor.advance().await? {
            result.push(cursor.deserialize_current()?);
        }
        Ok(result)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Todo>, StoreError> {
        let todo = self.todos().find_one(doc! { "_id": id }, None).await?;
        Ok(todo)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_one_and_delete(&self, id: ObjectId) -> Result<Option<Todo>, StoreError> {
        let todo = self
            .todos()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?;
        Ok(todo)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_one_and_update(
        &self,
        id: ObjectId,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let todo = self
            .todos()
            .find_one_and_update(doc! { "_id": id }, update.to_set_document(), options)
            .await?;
        Ok(todo)
    }
}

#[cfg(test)]
pub use memory::MemoryTodoStore;
