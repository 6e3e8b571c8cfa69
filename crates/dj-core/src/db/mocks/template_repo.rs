//! Mock implementation of AssetTemplateRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{AssetTemplateRepository, DbError};
use crate::models::{AssetTemplate, AssetTemplateUpdate};

#[derive(Default)]
pub struct MockAssetTemplateRepository {
    templates: Arc<RwLock<HashMap<Uuid, AssetTemplate>>>,
}

impl MockAssetTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<AssetTemplate>) -> Self {
        let map = templates.into_iter().map(|t| (t.id, t)).collect();
        Self {
            templates: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl AssetTemplateRepository for MockAssetTemplateRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DbError> {
        let templates = self.templates.read().await;
        let mut result: Vec<AssetTemplate> = templates
            .values()
            .filter(|t| include_inactive || t.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.template_name.cmp(&b.template_name));
        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetTemplate>, DbError> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let templates = self.templates.read().await;
        Ok(templates
            .values()
            .any(|t| Some(t.id) != exclude_id && t.template_name == name))
    }

    async fn create(&self, template: &AssetTemplate) -> Result<AssetTemplate, DbError> {
        if self.name_exists(&template.template_name, None).await? {
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: asset_templates.template_name ({})",
                template.template_name
            )));
        }
        self.templates
            .write()
            .await
            .insert(template.id, template.clone());
        Ok(template.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        update: AssetTemplateUpdate,
    ) -> Result<AssetTemplate, DbError> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("AssetTemplate", id))?;
        update.apply_to(template);
        Ok(template.clone())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let mut templates = self.templates.write().await;
        Ok(templates
            .get_mut(&id)
            .map(|t| t.is_active = active)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        Ok(self.templates.write().await.remove(&id).is_some())
    }
}
