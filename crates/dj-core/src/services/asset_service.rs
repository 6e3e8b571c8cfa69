//! Asset lifecycle: creation with code allocation, updates, soft deletion and
//! bulk creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{EventService, ServiceError, ServiceResult, Stores};
use crate::asset_code::{self, AssetCodeGenerator, AssetCodeParts};
use crate::db::{PagedResult, Pagination};
use crate::models::{
    Asset, AssetEvent, AssetEventType, AssetFilter, AssetStatus, AssetType, AssetUpdate, NewAsset,
};
use crate::validation::{InputValidator, MAX_NAME_LENGTH, MAX_NOTES_LENGTH};

/// Attempts at generate-and-insert before giving up on a code.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

pub const MAX_BULK_QUANTITY: u32 = 100;

/// Where a new asset came from, for events and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CreateSource {
    Api,
    Bulk,
    Import,
}

impl CreateSource {
    fn label(&self) -> &'static str {
        match self {
            CreateSource::Api => "api",
            CreateSource::Bulk => "bulk",
            CreateSource::Import => "import",
        }
    }
}

/// Creates `quantity` assets sharing the same fields. Fields left empty are
/// taken from the template when one is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub quantity: u32,
    pub template_id: Option<Uuid>,
    pub asset_name: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub is_dummy: bool,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub owner: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Inputs that decide an asset code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CodePreviewRequest {
    pub asset_type_id: Uuid,
    #[serde(default)]
    pub is_dummy: bool,
    pub purchase_date: Option<NaiveDate>,
    pub building_id: Option<Uuid>,
}

pub struct AssetService {
    stores: Stores,
    events: EventService,
    generator: AssetCodeGenerator,
    include_location: bool,
    allocation_lock: Mutex<()>,
}

impl AssetService {
    pub fn new(stores: Stores, generator: AssetCodeGenerator) -> Self {
        let events = EventService::new(stores.events.clone());
        Self {
            stores,
            events,
            generator,
            include_location: false,
            allocation_lock: Mutex::new(()),
        }
    }

    /// Adds the building code as the `LOC` segment of generated codes.
    pub fn with_location_codes(mut self, include_location: bool) -> Self {
        self.include_location = include_location;
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn events(&self) -> &EventService {
        &self.events
    }

    pub async fn list(
        &self,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> ServiceResult<PagedResult<Asset>> {
        let mut filter = filter.clone();
        if let Some(search) = filter.search.take() {
            if !search.trim().is_empty() {
                filter.search = Some(InputValidator::validate_search_query(&search)?);
            }
        }
        Ok(self.stores.assets.list_filtered(&filter, pagination).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Asset> {
        self.stores
            .assets
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Asset", id))
    }

    pub async fn get_by_code(&self, code: &str) -> ServiceResult<Asset> {
        let code = code.trim();
        self.stores
            .assets
            .get_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::not_found("Asset", code))
    }

    pub async fn get_by_serial(&self, serial_number: &str) -> ServiceResult<Asset> {
        let serial = InputValidator::validate_serial_number(serial_number)?;
        self.stores
            .assets
            .get_by_serial(&serial)
            .await?
            .ok_or_else(|| ServiceError::not_found("Asset", serial))
    }

    /// The code the next matching asset would get. Nothing is reserved.
    pub async fn preview_code(&self, request: &CodePreviewRequest) -> ServiceResult<String> {
        let asset_type = self.active_asset_type(request.asset_type_id).await?;
        let parts = self
            .code_parts(
                &asset_type,
                request.is_dummy,
                request.purchase_date,
                request.building_id,
            )
            .await?;
        Ok(self
            .generator
            .generate(self.stores.assets.as_ref(), &parts)
            .await?)
    }

    #[instrument(skip(self, new), fields(asset_type_id = %new.asset_type_id))]
    pub async fn create(&self, new: NewAsset, actor: Option<&str>) -> ServiceResult<Asset> {
        self.create_from(new, actor, CreateSource::Api).await
    }

    pub(crate) async fn create_from(
        &self,
        new: NewAsset,
        actor: Option<&str>,
        source: CreateSource,
    ) -> ServiceResult<Asset> {
        let (new, asset_type) = self.prepare(new).await?;
        self.insert_prepared(new, &asset_type, actor, source).await
    }

    /// Validates and normalizes a new asset and resolves its type.
    async fn prepare(&self, mut new: NewAsset) -> ServiceResult<(NewAsset, AssetType)> {
        new.asset_name = InputValidator::validate_name("assetName", &new.asset_name)?;
        new.owner = InputValidator::validate_owner(new.owner.as_deref())?;
        new.brand =
            InputValidator::validate_optional_text("brand", new.brand.as_deref(), MAX_NAME_LENGTH)?;
        new.model =
            InputValidator::validate_optional_text("model", new.model.as_deref(), MAX_NAME_LENGTH)?;
        new.notes = InputValidator::validate_optional_text(
            "notes",
            new.notes.as_deref(),
            MAX_NOTES_LENGTH,
        )?;
        new.serial_number = match new.serial_number.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(serial) => Some(InputValidator::validate_serial_number(serial)?),
        };

        let asset_type = self.active_asset_type(new.asset_type_id).await?;
        self.check_references(new.service_id, new.building_id).await?;

        if let Some(serial) = &new.serial_number {
            if self.stores.assets.serial_exists(serial, None).await? {
                return Err(ServiceError::Conflict(format!(
                    "Serial number '{}' is already registered",
                    serial
                )));
            }
        }

        if let Some(code) = new.asset_code.take() {
            let code = code.trim().to_uppercase();
            if !code.is_empty() {
                if !asset_code::is_valid(&code) {
                    return Err(ServiceError::Invalid(format!(
                        "Asset code '{}' does not match [DUM-]TYPE-YY-[LOC-]NNNNN",
                        code
                    )));
                }
                if self.stores.assets.code_exists(&code).await? {
                    return Err(ServiceError::Conflict(format!(
                        "Asset code '{}' already exists",
                        code
                    )));
                }
                new.asset_code = Some(code);
            }
        }

        Ok((new, asset_type))
    }

    async fn insert_prepared(
        &self,
        new: NewAsset,
        asset_type: &AssetType,
        actor: Option<&str>,
        source: CreateSource,
    ) -> ServiceResult<Asset> {
        let created = match new.asset_code.clone() {
            Some(code) => self.stores.assets.create(&Asset::from_new(new, code)).await?,
            None => self.insert_with_generated_code(new, asset_type).await?,
        };

        let (event_type, description) = match source {
            CreateSource::Import => (
                AssetEventType::Imported,
                format!("Imported from CSV as {}", created.asset_code),
            ),
            _ => (
                AssetEventType::Created,
                format!("Asset created with code {}", created.asset_code),
            ),
        };
        self.events
            .append(AssetEvent::new(created.id, event_type, description).performed_by(actor))
            .await;

        metrics::counter!("assets_created_total", "source" => source.label()).increment(1);
        info!(
            asset_id = %created.id,
            asset_code = %created.asset_code,
            source = source.label(),
            "Asset created"
        );
        Ok(created)
    }

    /// Generates a code and inserts, regenerating when a concurrent writer
    /// took the same code first.
    async fn insert_with_generated_code(
        &self,
        new: NewAsset,
        asset_type: &AssetType,
    ) -> ServiceResult<Asset> {
        let parts = self
            .code_parts(
                asset_type,
                new.is_dummy,
                new.purchase_date,
                new.building_id,
            )
            .await?;

        let _guard = self.allocation_lock.lock().await;
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self
                .generator
                .generate(self.stores.assets.as_ref(), &parts)
                .await?;
            let asset = Asset::from_new(new.clone(), code);

            match self.stores.assets.create(&asset).await {
                Ok(created) => return Ok(created),
                Err(e) if e.is_unique_violation() => {
                    if let Some(serial) = &asset.serial_number {
                        if self.stores.assets.serial_exists(serial, None).await? {
                            return Err(ServiceError::Conflict(format!(
                                "Serial number '{}' is already registered",
                                serial
                            )));
                        }
                    }
                    warn!(
                        attempt,
                        asset_code = %asset.asset_code,
                        "Asset code collision, regenerating"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ServiceError::CodeAllocationFailed(MAX_CODE_ATTEMPTS))
    }

    async fn code_parts(
        &self,
        asset_type: &AssetType,
        is_dummy: bool,
        purchase_date: Option<NaiveDate>,
        building_id: Option<Uuid>,
    ) -> ServiceResult<AssetCodeParts> {
        let location = match (self.include_location, building_id) {
            (true, Some(id)) => self.stores.buildings.get(id).await?.map(|b| b.code),
            _ => None,
        };
        Ok(
            AssetCodeParts::new(&asset_type.code, asset_code::year_for(purchase_date))
                .dummy(is_dummy)
                .at_location(location.as_deref()),
        )
    }

    async fn active_asset_type(&self, id: Uuid) -> ServiceResult<AssetType> {
        match self.stores.asset_types.get(id).await? {
            Some(t) if t.is_active => Ok(t),
            Some(t) => Err(ServiceError::Invalid(format!(
                "Asset type '{}' is inactive",
                t.code
            ))),
            None => Err(ServiceError::Invalid(format!("Unknown asset type {}", id))),
        }
    }

    async fn check_references(
        &self,
        service_id: Option<Uuid>,
        building_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        if let Some(id) = service_id {
            if self.stores.services.get(id).await?.is_none() {
                return Err(ServiceError::Invalid(format!("Unknown service {}", id)));
            }
        }
        if let Some(id) = building_id {
            if self.stores.buildings.get(id).await?.is_none() {
                return Err(ServiceError::Invalid(format!("Unknown building {}", id)));
            }
        }
        Ok(())
    }

    /// Applies a partial update and records one event per kind of change.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: Uuid,
        mut update: AssetUpdate,
        actor: Option<&str>,
    ) -> ServiceResult<Asset> {
        let before = self.get(id).await?;

        if let Some(name) = &update.asset_name {
            update.asset_name = Some(InputValidator::validate_name("assetName", name)?);
        }
        if let Some(owner) = &update.owner {
            update.owner = Some(
                InputValidator::validate_owner(Some(owner.as_str()))?.unwrap_or_default(),
            );
        }
        for (field, value, max) in [
            ("brand", &mut update.brand, MAX_NAME_LENGTH),
            ("model", &mut update.model, MAX_NAME_LENGTH),
            ("notes", &mut update.notes, MAX_NOTES_LENGTH),
        ] {
            if let Some(text) = value.as_deref() {
                *value = Some(
                    InputValidator::validate_optional_text(field, Some(text), max)?
                        .unwrap_or_default(),
                );
            }
        }
        if let Some(serial) = update.serial_number.as_deref().map(str::trim) {
            if serial.is_empty() {
                update.serial_number = Some(String::new());
            } else {
                let serial = InputValidator::validate_serial_number(serial)?;
                if self.stores.assets.serial_exists(&serial, Some(id)).await? {
                    return Err(ServiceError::Conflict(format!(
                        "Serial number '{}' is already registered",
                        serial
                    )));
                }
                update.serial_number = Some(serial);
            }
        }
        if let Some(type_id) = update.asset_type_id {
            self.active_asset_type(type_id).await?;
        }
        self.check_references(update.service_id, update.building_id)
            .await?;

        if update.is_empty() {
            return Ok(before);
        }

        let after = self.stores.assets.update(id, update).await?;
        self.record_changes(&before, &after, actor).await;
        debug!(asset_id = %id, "Asset updated");
        Ok(after)
    }

    async fn record_changes(&self, before: &Asset, after: &Asset, actor: Option<&str>) {
        if before.status != after.status {
            self.events
                .append(
                    AssetEvent::new(after.id, AssetEventType::StatusChanged, "Status changed")
                        .with_change(
                            Some(before.status.to_string()),
                            Some(after.status.to_string()),
                        )
                        .performed_by(actor),
                )
                .await;
        }
        if before.owner != after.owner {
            self.events
                .append(
                    AssetEvent::new(after.id, AssetEventType::OwnerChanged, "Owner changed")
                        .with_change(before.owner.clone(), after.owner.clone())
                        .performed_by(actor),
                )
                .await;
        }
        if before.service_id != after.service_id {
            let old = self.service_label(before.service_id).await;
            let new = self.service_label(after.service_id).await;
            self.events
                .append(
                    AssetEvent::new(after.id, AssetEventType::ServiceChanged, "Service changed")
                        .with_change(old, new)
                        .performed_by(actor),
                )
                .await;
        }

        let changed = changed_fields(before, after);
        if !changed.is_empty() {
            self.events
                .append(
                    AssetEvent::new(
                        after.id,
                        AssetEventType::Updated,
                        format!("Updated {}", changed.join(", ")),
                    )
                    .performed_by(actor),
                )
                .await;
        }
    }

    async fn service_label(&self, service_id: Option<Uuid>) -> Option<String> {
        let id = service_id?;
        match self.stores.services.get(id).await {
            Ok(Some(service)) => Some(service.code),
            _ => Some(id.to_string()),
        }
    }

    pub async fn deactivate(&self, id: Uuid, actor: Option<&str>) -> ServiceResult<Asset> {
        self.set_active(id, false, actor).await
    }

    pub async fn reactivate(&self, id: Uuid, actor: Option<&str>) -> ServiceResult<Asset> {
        self.set_active(id, true, actor).await
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        actor: Option<&str>,
    ) -> ServiceResult<Asset> {
        let mut asset = self.get(id).await?;
        if asset.is_active == active {
            return Ok(asset);
        }
        if !self.stores.assets.set_active(id, active).await? {
            return Err(ServiceError::not_found("Asset", id));
        }
        asset.is_active = active;

        let (event_type, description) = if active {
            (AssetEventType::Reactivated, "Asset reactivated")
        } else {
            (AssetEventType::Deactivated, "Asset deactivated")
        };
        self.events
            .append(AssetEvent::new(id, event_type, description).performed_by(actor))
            .await;
        info!(asset_id = %id, active, "Asset active flag changed");
        Ok(asset)
    }

    /// Hard delete. Events and lease contracts go with the asset.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.stores.assets.delete(id).await? {
            return Err(ServiceError::not_found("Asset", id));
        }
        info!(asset_id = %id, "Asset deleted");
        Ok(())
    }

    /// Creates `request.quantity` assets, each with its own generated code.
    ///
    /// Input is validated once up front. Creation stops at the first failure;
    /// assets created before it are kept.
    #[instrument(skip(self, request), fields(quantity = request.quantity))]
    pub async fn bulk_create(
        &self,
        request: BulkCreateRequest,
        actor: Option<&str>,
    ) -> ServiceResult<Vec<Asset>> {
        if !(1..=MAX_BULK_QUANTITY).contains(&request.quantity) {
            return Err(ServiceError::Invalid(format!(
                "Quantity must be between 1 and {}",
                MAX_BULK_QUANTITY
            )));
        }

        let template = match request.template_id {
            Some(id) => Some(
                self.stores
                    .templates
                    .get(id)
                    .await?
                    .filter(|t| t.is_active)
                    .ok_or_else(|| ServiceError::not_found("AssetTemplate", id))?,
            ),
            None => None,
        };
        let from_template = |pick: fn(&crate::models::AssetTemplate) -> Option<String>| {
            template.as_ref().and_then(pick)
        };

        let asset_type_id = request
            .asset_type_id
            .or_else(|| template.as_ref().and_then(|t| t.asset_type_id))
            .ok_or_else(|| ServiceError::Invalid("An asset type is required".to_string()))?;
        let asset_type = self.active_asset_type(asset_type_id).await?;

        let new = NewAsset {
            asset_code: None,
            asset_name: request
                .asset_name
                .or_else(|| from_template(|t| t.asset_name.clone()))
                .unwrap_or_else(|| asset_type.name.clone()),
            asset_type_id,
            status: request.status.unwrap_or_default(),
            is_dummy: request.is_dummy,
            service_id: request
                .service_id
                .or_else(|| template.as_ref().and_then(|t| t.service_id)),
            building_id: request.building_id,
            owner: request.owner.or_else(|| from_template(|t| t.owner.clone())),
            brand: request.brand.or_else(|| from_template(|t| t.brand.clone())),
            model: request.model.or_else(|| from_template(|t| t.model.clone())),
            serial_number: None,
            purchase_date: request.purchase_date,
            installation_date: request.installation_date,
            warranty_expiry: request.warranty_expiry,
            notes: request.notes.or_else(|| from_template(|t| t.notes.clone())),
        };
        let (new, asset_type) = self.prepare(new).await?;

        let mut created = Vec::with_capacity(request.quantity as usize);
        for _ in 0..request.quantity {
            let asset = self
                .insert_prepared(new.clone(), &asset_type, actor, CreateSource::Bulk)
                .await?;
            created.push(asset);
        }
        info!(count = created.len(), asset_type = %asset_type.code, "Bulk create finished");
        Ok(created)
    }
}

/// Names of the fields that differ, excluding those with their own events.
fn changed_fields(before: &Asset, after: &Asset) -> Vec<&'static str> {
    let mut changed = Vec::new();
    let mut check = |name: &'static str, differs: bool| {
        if differs {
            changed.push(name);
        }
    };
    check("assetName", before.asset_name != after.asset_name);
    check("assetType", before.asset_type_id != after.asset_type_id);
    check("building", before.building_id != after.building_id);
    check("brand", before.brand != after.brand);
    check("model", before.model != after.model);
    check("serialNumber", before.serial_number != after.serial_number);
    check("purchaseDate", before.purchase_date != after.purchase_date);
    check(
        "installationDate",
        before.installation_date != after.installation_date,
    );
    check("warrantyExpiry", before.warranty_expiry != after.warranty_expiry);
    check("notes", before.notes != after.notes);
    changed
}
