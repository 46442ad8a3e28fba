use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Completion, Todo, TodoUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoDto {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,
}

impl From<&Todo> for TodoDto {
    fn from(value: &Todo) -> Self {
        Self {
            id: value.id.map(|id| id.to_hex()).unwrap_or_default(),
            text: value.text.clone(),
            completed: value.completed,
            completed_at: value.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoEnvelope {
    pub todo: TodoDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodosEnvelope {
    pub todos: Vec<TodoDto>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default, deserialize_with = "scalar_text")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "scalar_text")]
    pub text: Option<String>,
    pub completed: Option<bool>,
}

// Numbers and booleans are stored as their string form; objects and arrays
// are rejected.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "text must be a string, got {}",
            other
        ))),
    }
}

impl UpdateTodo {
    /// `now_ms` becomes `completedAt` when the payload marks the todo complete.
    pub fn into_update(self, now_ms: i64) -> TodoUpdate {
        TodoUpdate {
            text: self.text,
            completion: self
                .completed
                .map(|completed| Completion::from_flag(completed, now_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn todo_dto_uses_hex_id_and_camel_case() {
        let id = ObjectId::new();
        let todo = Todo {
            id: Some(id),
            text: "Test".to_string(),
            completed: true,
            completed_at: Some(5),
        };
        let json = serde_json::to_value(TodoDto::from(&todo)).unwrap();
        assert_eq!(json["id"], id.to_hex());
        assert_eq!(json["text"], "Test");
        assert_eq!(json["completed"], true);
        assert_eq!(json["completedAt"], 5);
    }

    #[test]
    fn incomplete_todo_serializes_null_completed_at() {
        let todo = Todo::new(Some("Test".to_string())).unwrap();
        let json = serde_json::to_value(TodoDto::from(&todo)).unwrap();
        assert!(json["completedAt"].is_null());
    }

    #[test]
    fn create_todo_accepts_missing_text() {
        let input: CreateTodo = serde_json::from_str("{}").unwrap();
        assert!(input.text.is_none());
    }

    #[test]
    fn scalar_text_is_stringified() {
        let input: CreateTodo = serde_json::from_str(r#"{"text":5}"#).unwrap();
        assert_eq!(input.text.as_deref(), Some("5"));
        let input: UpdateTodo = serde_json::from_str(r#"{"text":true}"#).unwrap();
        assert_eq!(input.text.as_deref(), Some("true"));
    }

    #[test]
    fn null_text_counts_as_missing() {
        let input: CreateTodo = serde_json::from_str(r#"{"text":null}"#).unwrap();
        assert!(input.text.is_none());
    }

    #[test]
    fn structured_text_is_rejected() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"text":{"a":1}}"#);
        assert!(result.is_err());
        let result: Result<UpdateTodo, _> = serde_json::from_str(r#"{"text":[1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_without_completed_leaves_completion_alone() {
        let input: UpdateTodo = serde_json::from_str(r#"{"text":"New"}"#).unwrap();
        let update = input.into_update(10);
        assert_eq!(update.text.as_deref(), Some("New"));
        assert_eq!(update.completion, None);
    }

    #[test]
    fn update_with_completed_true_stamps_now() {
        let input: UpdateTodo = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(
            input.into_update(10).completion,
            Some(Completion::Complete { at: 10 })
        );
    }

    #[test]
    fn update_with_completed_false_clears() {
        let input: UpdateTodo = serde_json::from_str(r#"{"completed":false}"#).unwrap();
        assert_eq!(input.into_update(10).completion, Some(Completion::Incomplete));
    }

    #[test]
    fn update_rejects_non_boolean_completed() {
        let result: Result<UpdateTodo, _> = serde_json::from_str(r#"{"completed":"yes"}"#);
        assert!(result.is_err());
    }
}
