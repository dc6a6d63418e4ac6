use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarksRecord {
    #[serde(rename = "rollNo")]
    pub roll_no: i32,
    pub maths: i32,
    pub science: i32,
    pub computer: i32,
}

impl UserRecord {
    pub fn new(username: String, password: String, status: String) -> Self {
        Self {
            username,
            password,
            status,
        }
    }
}

impl MarksRecord {
    pub fn new(roll_no: i32, maths: i32, science: i32, computer: i32) -> Self {
        Self {
            roll_no,
            maths,
            science,
            computer,
        }
    }
}

/// Serialize a record into a BSON document, keeping field order.
pub fn to_document<T: Serialize>(record: &T) -> AppResult<Document> {
    bson::to_document(record).map_err(AppError::persistence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn test_user_record_field_order() {
        let doc = to_document(&UserRecord::new(
            "alice".to_string(),
            "pw".to_string(),
            "1".to_string(),
        ))
        .unwrap();

        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, ["username", "password", "status"]);
        assert_eq!(doc.get_str("status").unwrap(), "1");
    }

    #[test]
    fn test_marks_record_uses_roll_no_key() {
        let doc = to_document(&MarksRecord::new(175, 80, 90, 95)).unwrap();

        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, ["rollNo", "maths", "science", "computer"]);
        assert_eq!(doc.get("rollNo"), Some(&Bson::Int32(175)));
        assert_eq!(doc.get_i32("computer").unwrap(), 95);
    }
}
