//! Macro for convenient Cypher query construction.

/// Inline Cypher query with optional named parameters.
///
/// Expands to a [`Query`](crate::store::Query) with one `.param(..)` per
/// `name = value` pair; the identifier becomes the `$name` placeholder.
///
/// ```ignore
/// use classmates::store::cypher;
///
/// cypher!(
///     client,
///     "CREATE (c:Class {id: $id, title: $title})",
///     id = class.id,
///     title = &class.title
/// )
/// .run()
/// .await?;
/// ```
#[macro_export]
macro_rules! cypher {
    ($executor:expr, $statement:expr $(, $param:ident = $value:expr)* $(,)?) => {
        $crate::store::QueryExt::query(&$executor, $statement)
            $(.param(stringify!($param), $value))*
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::error::AppError;
    use crate::store::row::{Params, RowStream};
    use crate::store::traits::CypherExecutor;

    #[derive(Default)]
    struct RecordingExecutor {
        seen: Mutex<Vec<(String, Params)>>,
    }

    #[async_trait::async_trait]
    impl CypherExecutor for RecordingExecutor {
        async fn execute_cypher(
            &self,
            _cypher: &str,
            _params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
            self.seen.lock().unwrap().push((cypher.to_string(), params));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cypher_macro_no_params() {
        let executor = RecordingExecutor::default();
        cypher!(executor, "MATCH (n:Student) DETACH DELETE n")
            .run()
            .await
            .unwrap();

        let seen = executor.seen.lock().unwrap();
        assert_eq!(seen[0].0, "MATCH (n:Student) DETACH DELETE n");
        assert!(seen[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_cypher_macro_names_params_after_idents() {
        let executor = RecordingExecutor::default();
        let name = "Alice";
        cypher!(
            executor,
            "CREATE (s:Student {id: $id, name: $name})",
            id = 1,
            name = name,
        )
        .run()
        .await
        .unwrap();

        let seen = executor.seen.lock().unwrap();
        assert_eq!(seen[0].1["id"], serde_json::json!(1));
        assert_eq!(seen[0].1["name"], serde_json::json!("Alice"));
    }
}
