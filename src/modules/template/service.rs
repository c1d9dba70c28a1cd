use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::modules::template::model::TemplateTree;
use crate::modules::template::repository::TemplateRepository;

/// Upper bound on the enrichment round trip so a slow template store cannot
/// stall the message-page request it decorates.
const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Bulkhead-isolated batch loader for template trees.
///
/// Every failure mode (store error, timeout, nothing found) collapses to an
/// empty map. Callers cannot tell "load failed" from "no templates" and must
/// not need to.
#[derive(Clone)]
pub struct TemplateLoaderService<R>
where
    R: TemplateRepository + Send + Sync + 'static,
{
    template_repo: Arc<R>,
}

impl<R> TemplateLoaderService<R>
where
    R: TemplateRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(template_repo: Arc<R>) -> Self {
        TemplateLoaderService { template_repo }
    }

    /// Load every template referenced on a message page, keyed by
    /// `"name|language"` since the same name may exist in several languages.
    /// First wins on key conflict.
    pub async fn load_batch(
        &self,
        project_id: i64,
        names: &[String],
    ) -> HashMap<String, TemplateTree> {
        if names.is_empty() {
            return HashMap::new();
        }

        let fetch = self.template_repo.find_batch_by_project_and_names(project_id, names);
        let templates = match tokio::time::timeout(LOAD_TIMEOUT, fetch).await {
            Ok(Ok(templates)) => templates,
            Ok(Err(e)) => {
                log::warn!(
                    "Could not batch-load templates for project={project_id} names={names:?}: {e}. \
                     Messages will be returned without template detail."
                );
                return HashMap::new();
            }
            Err(_) => {
                log::warn!(
                    "Template batch load timed out for project={project_id} names={names:?}. \
                     Messages will be returned without template detail."
                );
                return HashMap::new();
            }
        };

        if templates.is_empty() {
            log::debug!("No templates found for project={project_id} names={names:?}");
            return HashMap::new();
        }

        let mut result: HashMap<String, TemplateTree> = HashMap::new();
        for tree in templates {
            let key = format!("{}|{}", tree.template.name, tree.template.language);
            result.entry(key).or_insert(tree);
        }

        log::debug!("Loaded {} templates for project={project_id}", result.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::api::error;
    use crate::modules::template::schema::TemplateEntity;

    struct MockTemplateRepository {
        trees: Vec<TemplateTree>,
        fail: bool,
        called: AtomicBool,
    }

    impl MockTemplateRepository {
        fn new(trees: Vec<TemplateTree>) -> Self {
            Self { trees, fail: false, called: AtomicBool::new(false) }
        }

        fn failing() -> Self {
            Self { trees: Vec::new(), fail: true, called: AtomicBool::new(false) }
        }
    }

    #[async_trait::async_trait]
    impl TemplateRepository for MockTemplateRepository {
        async fn find_batch_by_project_and_names(
            &self,
            _project_id: i64,
            _names: &[String],
        ) -> Result<Vec<TemplateTree>, error::SystemError> {
            self.called.store(true, Ordering::SeqCst);
            if self.fail {
                return Err(error::SystemError::DatabaseError("template store down".into()));
            }
            Ok(self.trees.clone())
        }
    }

    fn tree(id: i64, name: &str, language: &str) -> TemplateTree {
        TemplateTree {
            template: TemplateEntity {
                id,
                organization_id: None,
                project_id: 1,
                waba_account_id: None,
                name: name.to_string(),
                category: None,
                language: language.to_string(),
                status: None,
                created_at: None,
                updated_at: None,
                deleted_at: None,
            },
            components: Vec::new(),
        }
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_map() {
        let svc = TemplateLoaderService::with_dependencies(Arc::new(
            MockTemplateRepository::failing(),
        ));
        let map = svc.load_batch(1, &["order_confirmed".to_string()]).await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn empty_name_set_skips_the_store_entirely() {
        let repo = Arc::new(MockTemplateRepository::new(vec![tree(1, "a", "en")]));
        let svc = TemplateLoaderService::with_dependencies(repo.clone());
        let map = svc.load_batch(1, &[]).await;
        assert!(map.is_empty());
        assert!(!repo.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn templates_are_keyed_by_name_and_language() {
        let repo = Arc::new(MockTemplateRepository::new(vec![
            tree(1, "order_confirmed", "en"),
            tree(2, "order_confirmed", "hi"),
        ]));
        let svc = TemplateLoaderService::with_dependencies(repo);
        let map = svc.load_batch(1, &["order_confirmed".to_string()]).await;
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("order_confirmed|en").unwrap().template.id, 1);
        assert_eq!(map.get("order_confirmed|hi").unwrap().template.id, 2);
    }

    #[tokio::test]
    async fn first_template_wins_on_duplicate_key() {
        let repo = Arc::new(MockTemplateRepository::new(vec![
            tree(1, "promo", "en"),
            tree(9, "promo", "en"),
        ]));
        let svc = TemplateLoaderService::with_dependencies(repo);
        let map = svc.load_batch(1, &["promo".to_string()]).await;
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("promo|en").unwrap().template.id, 1);
    }
}
