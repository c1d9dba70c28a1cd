use crate::api::error;
use crate::modules::template::model::TemplateTree;

#[async_trait::async_trait]
pub trait TemplateRepository {
    /// Batch fetch: every non-deleted template matching the project and any
    /// of the names, with the full component/button/card tree assembled.
    /// One query per tree level, never one per row.
    async fn find_batch_by_project_and_names(
        &self,
        project_id: i64,
        names: &[String],
    ) -> Result<Vec<TemplateTree>, error::SystemError>;
}
