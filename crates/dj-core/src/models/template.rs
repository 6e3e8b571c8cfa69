//! Reusable defaults for creating assets in bulk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{apply, apply_opt, apply_text};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetTemplate {
    pub id: Uuid,
    pub template_name: String,
    pub asset_type_id: Option<Uuid>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub service_id: Option<Uuid>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetTemplate {
    pub fn new(template_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_name: template_name.into(),
            asset_type_id: None,
            asset_name: None,
            brand: None,
            model: None,
            service_id: None,
            owner: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetTemplateUpdate {
    pub template_name: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub service_id: Option<Uuid>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl AssetTemplateUpdate {
    pub fn apply_to(self, template: &mut AssetTemplate) {
        apply(&mut template.template_name, self.template_name);
        apply_opt(&mut template.asset_type_id, self.asset_type_id);
        apply_text(&mut template.asset_name, self.asset_name);
        apply_text(&mut template.brand, self.brand);
        apply_text(&mut template.model, self.model);
        apply_opt(&mut template.service_id, self.service_id);
        apply_text(&mut template.owner, self.owner);
        apply_text(&mut template.notes, self.notes);
        apply(&mut template.is_active, self.is_active);
        template.updated_at = Utc::now();
    }
}
