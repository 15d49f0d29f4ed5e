//! Read-only stack enumeration
//!
//! Each helper is one projection of one client call.

use crate::error::Result;
use crate::provider::StackApi;
use crate::stack::StackSummary;

/// Whether `name` is among the currently active stacks
pub async fn exists<A: StackApi + ?Sized>(api: &A, name: &str) -> Result<bool> {
    let stacks = api.describe_stacks(None).await?;
    Ok(stacks.iter().any(|s| s.name == name))
}

/// Names of all active stacks
pub async fn list_active<A: StackApi + ?Sized>(api: &A) -> Result<Vec<String>> {
    let stacks = api.describe_stacks(None).await?;
    Ok(stacks.into_iter().map(|s| s.name).collect())
}

/// Every stack, including inactive and deleted ones
pub async fn list_all<A: StackApi + ?Sized>(api: &A) -> Result<Vec<StackSummary>> {
    api.list_stacks().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StackStatus;
    use crate::testing::{FakeStackApi, stack};

    #[tokio::test]
    async fn test_exists_and_list_active() {
        let api = FakeStackApi::new();
        api.add_stack(stack("base", "CREATE_COMPLETE"));
        api.add_stack(stack("pool-web", "UPDATE_IN_PROGRESS"));

        assert!(exists(&api, "base").await.unwrap());
        assert!(!exists(&api, "pool-db").await.unwrap());
        assert_eq!(
            list_active(&api).await.unwrap(),
            vec!["base".to_string(), "pool-web".to_string()]
        );
        assert_eq!(api.describe_calls(), 3);
    }

    #[tokio::test]
    async fn test_list_all_includes_deleted() {
        let api = FakeStackApi::new();
        api.add_summary(StackSummary {
            id: "arn:old".to_string(),
            name: "old".to_string(),
            status: StackStatus::from("DELETE_COMPLETE"),
            status_reason: None,
            creation_time: None,
            last_updated_time: None,
            deletion_time: Some(chrono::Utc::now()),
            template_description: None,
        });

        let all = list_all(&api).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].status.is_settled());
        assert_eq!(api.describe_calls(), 0);
    }
}
