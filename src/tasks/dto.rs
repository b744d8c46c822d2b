use serde::Deserialize;

use super::repo_types::Priority;

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

/// Partial task fields. Anything else in the body, including `_id` and
/// `user`, is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_ignores_ownership_fields() {
        let req: UpdateTaskRequest = serde_json::from_str(
            r#"{"completed":true,"user":"someone-else","_id":"abc"}"#,
        )
        .unwrap();
        assert_eq!(req.completed, Some(true));
        assert!(req.title.is_none());
    }

    #[test]
    fn unknown_priority_fails_to_parse() {
        let res = serde_json::from_str::<CreateTaskRequest>(r#"{"title":"x","priority":"urgent"}"#);
        assert!(res.is_err());
    }
}
