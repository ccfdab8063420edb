//! Store profiles and the sub-collection editor.
//!
//! A store carries two independent, id-addressed collections (branches and
//! listing images) plus scalar store information. Clients edit them through
//! one operation envelope:
//!
//! ```json
//! { "operation": "updateBranch", "branchId": "…", "branches": { "branchName": "…" } }
//! ```
//!
//! The envelope is converted once into a [`StoreCommand`], a closed set of
//! variants each carrying exactly the members it needs. Conversion validates
//! the payload, so a command that reaches [`StoreDetails::apply`] can only
//! fail on state it collides with (a duplicate id).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MutationError;
use crate::profile::{Profile, ProfileDocument};
use crate::types::{CurrencyCode, ElementId, Email, MAX_OPAQUE_ID_LENGTH, StoreProfileId};

/// A stored store profile.
pub type StoreProfile = Profile<StoreDetails>;

/// Scalar store information.
///
/// Also the creation payload of a store profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub store_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ownership_type: Option<String>,
    #[serde(default)]
    pub business_scale: Option<String>,
    #[serde(default)]
    pub store_location: Option<String>,
    #[serde(default)]
    pub store_phone: Option<String>,
    #[serde(default)]
    pub store_email: Option<Email>,
}

impl StoreInfo {
    /// Validate a creation payload.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::InvalidValue` if `storeName` is blank.
    pub fn validate(mut self) -> Result<Self, MutationError> {
        self.store_name = require_text("storeName", Some(&self.store_name))?;
        Ok(self)
    }
}

/// Partial update of [`StoreInfo`]; absent members are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfoPatch {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ownership_type: Option<String>,
    #[serde(default)]
    pub business_scale: Option<String>,
    #[serde(default)]
    pub store_location: Option<String>,
    #[serde(default)]
    pub store_phone: Option<String>,
    #[serde(default)]
    pub store_email: Option<Email>,
}

/// Editable fields of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchFields {
    pub branch_name: String,
    pub branch_location: String,
    #[serde(default)]
    pub gps_address: Option<String>,
    pub branch_phone: String,
    #[serde(default)]
    pub branch_email: Option<Email>,
}

/// A physical branch of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: ElementId,
    #[serde(flatten)]
    pub fields: BranchFields,
}

/// Editable fields of a listing image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub item_name: String,
    pub item_price: Decimal,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub available: bool,
}

/// A listing image: a picture of an item with its name and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    pub id: ElementId,
    #[serde(flatten)]
    pub fields: ImageFields,
}

/// Branch payload as submitted. Every member is optional so that a missing
/// one is reported by name instead of as a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub branch_location: Option<String>,
    #[serde(default)]
    pub gps_address: Option<String>,
    #[serde(default)]
    pub branch_phone: Option<String>,
    #[serde(default)]
    pub branch_email: Option<String>,
}

/// Image payload as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreImageInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// The operation envelope as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEnvelope {
    pub operation: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub branches: Option<BranchInput>,
    #[serde(default)]
    pub store_images: Option<StoreImageInput>,
    #[serde(default)]
    pub store_info: Option<StoreInfoPatch>,
}

/// A validated store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    AddBranch {
        id: Option<ElementId>,
        fields: BranchFields,
    },
    UpdateBranch {
        branch_id: ElementId,
        fields: BranchFields,
    },
    DeleteBranch {
        branch_id: ElementId,
    },
    AddImage {
        id: Option<ElementId>,
        fields: ImageFields,
    },
    UpdateImage {
        image_id: ElementId,
        fields: ImageFields,
    },
    DeleteImage {
        image_id: ElementId,
    },
    UpdateStoreInfo(StoreInfoPatch),
}

impl StoreCommand {
    /// Wire tag of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddBranch { .. } => "addBranch",
            Self::UpdateBranch { .. } => "updateBranch",
            Self::DeleteBranch { .. } => "deleteBranch",
            Self::AddImage { .. } => "addImage",
            Self::UpdateImage { .. } => "updateImage",
            Self::DeleteImage { .. } => "deleteImage",
            Self::UpdateStoreInfo(_) => "updateStoreInfo",
        }
    }
}

impl TryFrom<OperationEnvelope> for StoreCommand {
    type Error = MutationError;

    fn try_from(envelope: OperationEnvelope) -> Result<Self, Self::Error> {
        let OperationEnvelope {
            operation,
            branch_id,
            image_id,
            branches,
            store_images,
            store_info,
        } = envelope;
        let op = operation.as_str();

        let element_id = |raw: Option<String>, field: &'static str| {
            raw.as_deref()
                .and_then(ElementId::parse)
                .ok_or_else(|| MutationError::missing(op, field))
        };
        let branch = |input: Option<BranchInput>| {
            input
                .ok_or_else(|| MutationError::missing(op, "branches"))
                .and_then(BranchInput::validate)
        };
        let image = |input: Option<StoreImageInput>| {
            input
                .ok_or_else(|| MutationError::missing(op, "storeImages"))
                .and_then(StoreImageInput::validate)
        };

        match op {
            "addBranch" => {
                let (id, fields) = branch(branches)?;
                Ok(Self::AddBranch { id, fields })
            }
            "updateBranch" => {
                let branch_id = element_id(branch_id, "branchId")?;
                let (_, fields) = branch(branches)?;
                Ok(Self::UpdateBranch { branch_id, fields })
            }
            "deleteBranch" => Ok(Self::DeleteBranch {
                branch_id: element_id(branch_id, "branchId")?,
            }),
            "addImage" => {
                let (id, fields) = image(store_images)?;
                Ok(Self::AddImage { id, fields })
            }
            "updateImage" => {
                let image_id = element_id(image_id, "imageId")?;
                let (_, fields) = image(store_images)?;
                Ok(Self::UpdateImage { image_id, fields })
            }
            "deleteImage" => Ok(Self::DeleteImage {
                image_id: element_id(image_id, "imageId")?,
            }),
            "updateStoreInfo" => store_info
                .map(Self::UpdateStoreInfo)
                .ok_or_else(|| MutationError::missing(op, "storeInfo")),
            other => Err(MutationError::UnknownOperation(other.to_owned())),
        }
    }
}

fn require_text(field: &'static str, value: Option<&str>) -> Result<String, MutationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        Some(_) => Err(MutationError::invalid(field, "cannot be blank")),
        None => Err(MutationError::invalid(field, "is required")),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A blank or absent id asks for a generated one; an oversized id is an error.
fn proposed_id(value: Option<&str>) -> Result<Option<ElementId>, MutationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => ElementId::parse(raw).map(Some).ok_or_else(|| {
            MutationError::invalid(
                "id",
                format!("must be at most {MAX_OPAQUE_ID_LENGTH} characters"),
            )
        }),
    }
}

impl BranchInput {
    fn validate(self) -> Result<(Option<ElementId>, BranchFields), MutationError> {
        let branch_email = optional_text(self.branch_email)
            .map(|raw| Email::parse(&raw))
            .transpose()
            .map_err(|e| MutationError::invalid("branchEmail", e.to_string()))?;

        let fields = BranchFields {
            branch_name: require_text("branchName", self.branch_name.as_deref())?,
            branch_location: require_text("branchLocation", self.branch_location.as_deref())?,
            gps_address: optional_text(self.gps_address),
            branch_phone: require_text("branchPhone", self.branch_phone.as_deref())?,
            branch_email,
        };
        Ok((proposed_id(self.id.as_deref())?, fields))
    }
}

impl StoreImageInput {
    fn validate(self) -> Result<(Option<ElementId>, ImageFields), MutationError> {
        let item_price = self
            .item_price
            .ok_or_else(|| MutationError::invalid("itemPrice", "is required"))?;
        if item_price.is_sign_negative() {
            return Err(MutationError::invalid("itemPrice", "cannot be negative"));
        }

        let fields = ImageFields {
            url: require_text("url", self.url.as_deref())?,
            item_name: require_text("itemName", self.item_name.as_deref())?,
            item_price,
            currency: self.currency,
            available: self.available.unwrap_or(true),
        };
        Ok((proposed_id(self.id.as_deref())?, fields))
    }
}

/// Outcome of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The document changed and must be written back.
    Changed,
    /// The command addressed nothing (unknown id, identical values).
    Unchanged,
}

/// An element of an id-addressed collection.
trait Element {
    const COLLECTION: &'static str;
    type Fields: PartialEq;

    fn new(id: ElementId, fields: Self::Fields) -> Self;
    fn id(&self) -> &ElementId;
    fn fields_mut(&mut self) -> &mut Self::Fields;
}

impl Element for Branch {
    const COLLECTION: &'static str = "branch";
    type Fields = BranchFields;

    fn new(id: ElementId, fields: BranchFields) -> Self {
        Self { id, fields }
    }

    fn id(&self) -> &ElementId {
        &self.id
    }

    fn fields_mut(&mut self) -> &mut BranchFields {
        &mut self.fields
    }
}

impl Element for StoreImage {
    const COLLECTION: &'static str = "image";
    type Fields = ImageFields;

    fn new(id: ElementId, fields: ImageFields) -> Self {
        Self { id, fields }
    }

    fn id(&self) -> &ElementId {
        &self.id
    }

    fn fields_mut(&mut self) -> &mut ImageFields {
        &mut self.fields
    }
}

/// Append a new element, assigning an id when none was proposed.
fn insert<E: Element>(
    items: &mut Vec<E>,
    id: Option<ElementId>,
    fields: E::Fields,
) -> Result<Applied, MutationError> {
    let id = match id {
        Some(id) if items.iter().any(|e| e.id() == &id) => {
            return Err(MutationError::DuplicateId {
                collection: E::COLLECTION,
                id,
            });
        }
        Some(id) => id,
        None => ElementId::generate(),
    };
    items.push(E::new(id, fields));
    Ok(Applied::Changed)
}

/// Replace the fields of the element addressed by `id`, keeping its id.
fn replace<E: Element>(items: &mut [E], id: &ElementId, fields: E::Fields) -> Applied {
    match items.iter_mut().find(|e| e.id() == id) {
        Some(element) => {
            let slot = element.fields_mut();
            if *slot == fields {
                return Applied::Unchanged;
            }
            *slot = fields;
            Applied::Changed
        }
        None => Applied::Unchanged,
    }
}

fn remove<E: Element>(items: &mut Vec<E>, id: &ElementId) -> Applied {
    let before = items.len();
    items.retain(|e| e.id() != id);
    if items.len() == before {
        Applied::Unchanged
    } else {
        Applied::Changed
    }
}

/// The document body of a store profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetails {
    #[serde(flatten)]
    pub info: StoreInfo,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub store_images: Vec<StoreImage>,
}

impl ProfileDocument for StoreDetails {
    type Id = StoreProfileId;

    const KIND: &'static str = "store";
}

impl StoreDetails {
    /// A new store with empty collections.
    #[must_use]
    pub const fn new(info: StoreInfo) -> Self {
        Self {
            info,
            branches: Vec::new(),
            store_images: Vec::new(),
        }
    }

    /// Find a branch by id.
    #[must_use]
    pub fn branch(&self, id: &ElementId) -> Option<&Branch> {
        self.branches.iter().find(|b| &b.id == id)
    }

    /// Find a listing image by id.
    #[must_use]
    pub fn image(&self, id: &ElementId) -> Option<&StoreImage> {
        self.store_images.iter().find(|i| &i.id == id)
    }

    /// Apply exactly one command.
    ///
    /// Updates and deletes addressing an unknown id are no-ops. On error the
    /// document is left unchanged.
    ///
    /// # Errors
    ///
    /// - `MutationError::DuplicateId` if an add proposes an id already in use
    /// - `MutationError::InvalidValue` if a store info patch blanks `storeName`
    pub fn apply(&mut self, command: StoreCommand) -> Result<Applied, MutationError> {
        match command {
            StoreCommand::AddBranch { id, fields } => insert(&mut self.branches, id, fields),
            StoreCommand::UpdateBranch { branch_id, fields } => {
                Ok(replace(&mut self.branches, &branch_id, fields))
            }
            StoreCommand::DeleteBranch { branch_id } => Ok(remove(&mut self.branches, &branch_id)),
            StoreCommand::AddImage { id, fields } => insert(&mut self.store_images, id, fields),
            StoreCommand::UpdateImage { image_id, fields } => {
                Ok(replace(&mut self.store_images, &image_id, fields))
            }
            StoreCommand::DeleteImage { image_id } => {
                Ok(remove(&mut self.store_images, &image_id))
            }
            StoreCommand::UpdateStoreInfo(patch) => self.merge_info(patch),
        }
    }

    fn merge_info(&mut self, patch: StoreInfoPatch) -> Result<Applied, MutationError> {
        let mut info = self.info.clone();
        if let Some(name) = patch.store_name {
            info.store_name = require_text("storeName", Some(&name))?;
        }
        if let Some(description) = patch.description {
            info.description = Some(description);
        }
        if let Some(ownership) = patch.ownership_type {
            info.ownership_type = Some(ownership);
        }
        if let Some(scale) = patch.business_scale {
            info.business_scale = Some(scale);
        }
        if let Some(location) = patch.store_location {
            info.store_location = Some(location);
        }
        if let Some(phone) = patch.store_phone {
            info.store_phone = Some(phone);
        }
        if let Some(email) = patch.store_email {
            info.store_email = Some(email);
        }

        if info == self.info {
            return Ok(Applied::Unchanged);
        }
        self.info = info;
        Ok(Applied::Changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn store() -> StoreDetails {
        StoreDetails::new(StoreInfo {
            store_name: "Mama Put Provisions".to_owned(),
            description: None,
            ownership_type: Some("Sole proprietorship".to_owned()),
            business_scale: Some("Small".to_owned()),
            store_location: None,
            store_phone: None,
            store_email: None,
        })
    }

    fn command(value: serde_json::Value) -> Result<StoreCommand, MutationError> {
        let envelope: OperationEnvelope = serde_json::from_value(value).unwrap();
        StoreCommand::try_from(envelope)
    }

    fn add_branch(details: &mut StoreDetails, name: &str) -> ElementId {
        let cmd = command(json!({
            "operation": "addBranch",
            "branches": {
                "branchName": name,
                "branchLocation": "Ikeja",
                "branchPhone": "+2348000000000"
            }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Changed);
        details.branches.last().unwrap().id.clone()
    }

    #[test]
    fn test_add_branch_assigns_id() {
        let mut details = store();
        let id = add_branch(&mut details, "Ikeja");
        assert!(!id.as_str().is_empty());
        assert_eq!(details.branches.len(), 1);
        assert_eq!(details.branch(&id).unwrap().fields.branch_name, "Ikeja");
    }

    #[test]
    fn test_add_branch_with_blank_id_assigns_new_one() {
        let mut details = store();
        let cmd = command(json!({
            "operation": "addBranch",
            "branches": {
                "id": "",
                "branchName": "Yaba",
                "branchLocation": "Yaba",
                "branchPhone": "0800"
            }
        }))
        .unwrap();
        details.apply(cmd).unwrap();
        assert!(!details.branches[0].id.as_str().is_empty());
    }

    #[test]
    fn test_add_branch_duplicate_id_rejected() {
        let mut details = store();
        let id = add_branch(&mut details, "Ikeja");
        let cmd = command(json!({
            "operation": "addBranch",
            "branches": {
                "id": id.as_str(),
                "branchName": "Clone",
                "branchLocation": "Lekki",
                "branchPhone": "0800"
            }
        }))
        .unwrap();
        let before = details.clone();
        assert!(matches!(
            details.apply(cmd),
            Err(MutationError::DuplicateId { collection: "branch", .. })
        ));
        assert_eq!(details, before);
    }

    #[test]
    fn test_update_branch_keeps_id() {
        let mut details = store();
        let id = add_branch(&mut details, "Ikeja");
        let cmd = command(json!({
            "operation": "updateBranch",
            "branchId": id.as_str(),
            "branches": {
                "id": "ignored",
                "branchName": "Ikeja GRA",
                "branchLocation": "Ikeja",
                "branchPhone": "0800",
                "branchEmail": "gra@shop.ng"
            }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Changed);
        let branch = details.branch(&id).unwrap();
        assert_eq!(branch.fields.branch_name, "Ikeja GRA");
        assert_eq!(branch.fields.branch_email.as_ref().unwrap().as_str(), "gra@shop.ng");
    }

    #[test]
    fn test_update_unknown_branch_is_noop() {
        let mut details = store();
        add_branch(&mut details, "Ikeja");
        let before = details.clone();
        let cmd = command(json!({
            "operation": "updateBranch",
            "branchId": "does-not-exist",
            "branches": {
                "branchName": "Ghost",
                "branchLocation": "Nowhere",
                "branchPhone": "0"
            }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Unchanged);
        assert_eq!(details, before);
    }

    #[test]
    fn test_update_with_identical_fields_is_unchanged() {
        let mut details = store();
        let id = add_branch(&mut details, "Ikeja");
        let before = details.clone();
        let cmd = command(json!({
            "operation": "updateBranch",
            "branchId": id.as_str(),
            "branches": {
                "branchName": "Ikeja",
                "branchLocation": "Ikeja",
                "branchPhone": "+2348000000000"
            }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Unchanged);
        assert_eq!(details, before);
    }

    #[test]
    fn test_oversized_element_id_rejected() {
        let long_id = "b".repeat(MAX_OPAQUE_ID_LENGTH + 1);
        let err = command(json!({
            "operation": "addBranch",
            "branches": {
                "id": long_id,
                "branchName": "Lekki",
                "branchLocation": "Lekki",
                "branchPhone": "0800"
            }
        }))
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidValue { field: "id", .. }));

        let err = command(json!({
            "operation": "addImage",
            "storeImages": {
                "id": "i".repeat(MAX_OPAQUE_ID_LENGTH + 1),
                "url": "u",
                "itemName": "n",
                "itemPrice": "1"
            }
        }))
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidValue { field: "id", .. }));

        let mut details = store();
        let cmd = command(json!({
            "operation": "addBranch",
            "branches": {
                "id": "b".repeat(MAX_OPAQUE_ID_LENGTH),
                "branchName": "Lekki",
                "branchLocation": "Lekki",
                "branchPhone": "0800"
            }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Changed);
        assert_eq!(details.branches[0].id.as_str().len(), MAX_OPAQUE_ID_LENGTH);
    }

    #[test]
    fn test_delete_branch() {
        let mut details = store();
        let keep = add_branch(&mut details, "Ikeja");
        let drop = add_branch(&mut details, "Yaba");
        let cmd = command(json!({ "operation": "deleteBranch", "branchId": drop.as_str() }))
            .unwrap();
        assert_eq!(details.apply(cmd.clone()).unwrap(), Applied::Changed);
        assert_eq!(details.branches.len(), 1);
        assert_eq!(details.branches[0].id, keep);
        assert_eq!(details.apply(cmd).unwrap(), Applied::Unchanged);
    }

    #[test]
    fn test_image_lifecycle() {
        let mut details = store();
        let cmd = command(json!({
            "operation": "addImage",
            "storeImages": {
                "url": "https://cdn.example/tomatoes.jpg",
                "itemName": "Tomatoes (basket)",
                "itemPrice": "4500.00",
                "currency": "NGN"
            }
        }))
        .unwrap();
        details.apply(cmd).unwrap();
        let image = details.store_images[0].clone();
        assert!(image.fields.available);
        assert_eq!(image.fields.item_price, Decimal::new(450_000, 2));

        let cmd = command(json!({
            "operation": "updateImage",
            "imageId": image.id.as_str(),
            "storeImages": {
                "url": "https://cdn.example/tomatoes.jpg",
                "itemName": "Tomatoes (basket)",
                "itemPrice": 5000,
                "currency": "NGN",
                "available": false
            }
        }))
        .unwrap();
        details.apply(cmd).unwrap();
        assert!(!details.image(&image.id).unwrap().fields.available);

        let cmd = command(json!({ "operation": "deleteImage", "imageId": image.id.as_str() }))
            .unwrap();
        details.apply(cmd).unwrap();
        assert!(details.store_images.is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let mut details = store();
        let branch_id = add_branch(&mut details, "Ikeja");
        let cmd = command(json!({ "operation": "deleteImage", "imageId": branch_id.as_str() }))
            .unwrap();
        assert_eq!(details.apply(cmd).unwrap(), Applied::Unchanged);
        assert_eq!(details.branches.len(), 1);
    }

    #[test]
    fn test_update_store_info_merges() {
        let mut details = store();
        let cmd = command(json!({
            "operation": "updateStoreInfo",
            "storeInfo": { "description": "Fresh produce daily", "businessScale": "Medium" }
        }))
        .unwrap();
        assert_eq!(details.apply(cmd.clone()).unwrap(), Applied::Changed);
        assert_eq!(details.info.store_name, "Mama Put Provisions");
        assert_eq!(details.info.business_scale.as_deref(), Some("Medium"));
        assert_eq!(details.info.ownership_type.as_deref(), Some("Sole proprietorship"));
        assert_eq!(details.apply(cmd).unwrap(), Applied::Unchanged);
    }

    #[test]
    fn test_missing_required_members() {
        let cases = [
            (json!({ "operation": "addBranch" }), "branches"),
            (json!({ "operation": "updateBranch", "branches": {} }), "branchId"),
            (json!({ "operation": "deleteBranch", "branchId": "  " }), "branchId"),
            (json!({ "operation": "addImage" }), "storeImages"),
            (json!({ "operation": "updateImage", "imageId": "x" }), "storeImages"),
            (json!({ "operation": "deleteImage" }), "imageId"),
            (json!({ "operation": "updateStoreInfo" }), "storeInfo"),
        ];
        for (value, field) in cases {
            match command(value) {
                Err(MutationError::MissingField { field: missing, .. }) => {
                    assert_eq!(missing, field);
                }
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            command(json!({ "operation": "renameStore" })),
            Err(MutationError::UnknownOperation("renameStore".to_owned()))
        );
    }

    #[test]
    fn test_invalid_element_fields() {
        let err = command(json!({
            "operation": "addBranch",
            "branches": { "branchName": "X", "branchPhone": "0" }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            MutationError::InvalidValue { field: "branchLocation", .. }
        ));

        let err = command(json!({
            "operation": "addBranch",
            "branches": {
                "branchName": "X",
                "branchLocation": "Y",
                "branchPhone": "0",
                "branchEmail": "nope"
            }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            MutationError::InvalidValue { field: "branchEmail", .. }
        ));

        let err = command(json!({
            "operation": "addImage",
            "storeImages": { "url": "u", "itemName": "n", "itemPrice": "-1" }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            MutationError::InvalidValue { field: "itemPrice", .. }
        ));
    }

    #[test]
    fn test_wire_shape() {
        let mut details = store();
        let id = add_branch(&mut details, "Ikeja");
        let out = serde_json::to_value(&details).unwrap();
        assert_eq!(out["storeName"], "Mama Put Provisions");
        assert_eq!(out["branches"][0]["id"], id.as_str());
        assert_eq!(out["branches"][0]["branchName"], "Ikeja");
        assert_eq!(out["storeImages"], json!([]));

        let back: StoreDetails = serde_json::from_value(out).unwrap();
        assert_eq!(back, details);
    }
}
