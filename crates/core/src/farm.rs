//! Farm profiles and the production discriminator.
//!
//! A farm has exactly one production list, selected by its farm type. The
//! list lives inside [`ProductionDetail`], a sum type whose variant *is* the
//! farm type, so a farm can never carry a list that does not match its type.
//!
//! On the wire a farm is flat: `farmType` plus all seven list fields, with the
//! six inactive lists serialized as `[]`:
//!
//! ```json
//! {
//!   "farmName": "Green Acre",
//!   "farmType": "Poultry",
//!   "cropsGrown": [],
//!   "livestockProduced": [],
//!   "mixedCropsGrown": [],
//!   "aquacultureType": [],
//!   "nurseryType": [],
//!   "poultryType": ["broiler"],
//!   "othersType": []
//! }
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MutationError;
use crate::profile::{Profile, ProfileDocument};
use crate::types::{Email, FarmProfileId};

/// A stored farm profile.
pub type FarmProfile = Profile<FarmDetails>;

/// The kind of production a farm is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FarmType {
    CropFarming,
    Livestock,
    MixedFarming,
    Aquaculture,
    Nursery,
    Poultry,
    Others,
}

impl FarmType {
    /// Every farm type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::CropFarming,
        Self::Livestock,
        Self::MixedFarming,
        Self::Aquaculture,
        Self::Nursery,
        Self::Poultry,
        Self::Others,
    ];

    /// Name of the production list field mapped from this farm type.
    #[must_use]
    pub const fn list_field(self) -> &'static str {
        match self {
            Self::CropFarming => "cropsGrown",
            Self::Livestock => "livestockProduced",
            Self::MixedFarming => "mixedCropsGrown",
            Self::Aquaculture => "aquacultureType",
            Self::Nursery => "nurseryType",
            Self::Poultry => "poultryType",
            Self::Others => "othersType",
        }
    }

    /// Wire name of the farm type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CropFarming => "CropFarming",
            Self::Livestock => "Livestock",
            Self::MixedFarming => "MixedFarming",
            Self::Aquaculture => "Aquaculture",
            Self::Nursery => "Nursery",
            Self::Poultry => "Poultry",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for FarmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single active production list of a farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductionLists", into = "ProductionLists")]
pub enum ProductionDetail {
    CropFarming(Vec<String>),
    Livestock(Vec<String>),
    MixedFarming(Vec<String>),
    Aquaculture(Vec<String>),
    Nursery(Vec<String>),
    Poultry(Vec<String>),
    Others(Vec<String>),
}

impl ProductionDetail {
    /// An empty list for `farm_type`.
    #[must_use]
    pub fn empty(farm_type: FarmType) -> Self {
        Self::with_items(farm_type, Vec::new())
    }

    /// A list for `farm_type` holding `items`.
    #[must_use]
    pub fn with_items(farm_type: FarmType, items: Vec<String>) -> Self {
        match farm_type {
            FarmType::CropFarming => Self::CropFarming(items),
            FarmType::Livestock => Self::Livestock(items),
            FarmType::MixedFarming => Self::MixedFarming(items),
            FarmType::Aquaculture => Self::Aquaculture(items),
            FarmType::Nursery => Self::Nursery(items),
            FarmType::Poultry => Self::Poultry(items),
            FarmType::Others => Self::Others(items),
        }
    }

    /// The farm type this list belongs to.
    #[must_use]
    pub const fn farm_type(&self) -> FarmType {
        match self {
            Self::CropFarming(_) => FarmType::CropFarming,
            Self::Livestock(_) => FarmType::Livestock,
            Self::MixedFarming(_) => FarmType::MixedFarming,
            Self::Aquaculture(_) => FarmType::Aquaculture,
            Self::Nursery(_) => FarmType::Nursery,
            Self::Poultry(_) => FarmType::Poultry,
            Self::Others(_) => FarmType::Others,
        }
    }

    /// The active list's items.
    #[must_use]
    pub fn items(&self) -> &[String] {
        match self {
            Self::CropFarming(items)
            | Self::Livestock(items)
            | Self::MixedFarming(items)
            | Self::Aquaculture(items)
            | Self::Nursery(items)
            | Self::Poultry(items)
            | Self::Others(items) => items,
        }
    }

    fn into_items(self) -> Vec<String> {
        match self {
            Self::CropFarming(items)
            | Self::Livestock(items)
            | Self::MixedFarming(items)
            | Self::Aquaculture(items)
            | Self::Nursery(items)
            | Self::Poultry(items)
            | Self::Others(items) => items,
        }
    }

    fn items_mut(&mut self) -> &mut Vec<String> {
        match self {
            Self::CropFarming(items)
            | Self::Livestock(items)
            | Self::MixedFarming(items)
            | Self::Aquaculture(items)
            | Self::Nursery(items)
            | Self::Poultry(items)
            | Self::Others(items) => items,
        }
    }

    /// Items of the list named `field`: the active items for the active
    /// field, empty for the other six.
    #[must_use]
    pub fn list(&self, field: &str) -> &[String] {
        if field == self.farm_type().list_field() {
            self.items()
        } else {
            &[]
        }
    }
}

/// Flat wire shape of [`ProductionDetail`]: the type tag plus seven lists.
///
/// Absent and `null` lists both read as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductionLists {
    farm_type: FarmType,
    #[serde(default)]
    crops_grown: Option<Vec<String>>,
    #[serde(default)]
    livestock_produced: Option<Vec<String>>,
    #[serde(default)]
    mixed_crops_grown: Option<Vec<String>>,
    #[serde(default)]
    aquaculture_type: Option<Vec<String>>,
    #[serde(default)]
    nursery_type: Option<Vec<String>>,
    #[serde(default)]
    poultry_type: Option<Vec<String>>,
    #[serde(default)]
    others_type: Option<Vec<String>>,
}

impl ProductionLists {
    fn slot(&mut self, farm_type: FarmType) -> &mut Option<Vec<String>> {
        match farm_type {
            FarmType::CropFarming => &mut self.crops_grown,
            FarmType::Livestock => &mut self.livestock_produced,
            FarmType::MixedFarming => &mut self.mixed_crops_grown,
            FarmType::Aquaculture => &mut self.aquaculture_type,
            FarmType::Nursery => &mut self.nursery_type,
            FarmType::Poultry => &mut self.poultry_type,
            FarmType::Others => &mut self.others_type,
        }
    }

    fn take(&mut self, farm_type: FarmType) -> Vec<String> {
        self.slot(farm_type).take().unwrap_or_default()
    }
}

impl TryFrom<ProductionLists> for ProductionDetail {
    type Error = String;

    fn try_from(mut lists: ProductionLists) -> Result<Self, Self::Error> {
        let active = lists.farm_type;
        for farm_type in FarmType::ALL {
            if farm_type != active && !lists.take(farm_type).is_empty() {
                return Err(format!(
                    "`{}` must be empty for a {active} farm; only `{}` may be set",
                    farm_type.list_field(),
                    active.list_field()
                ));
            }
        }
        let items = lists.take(active);
        Ok(Self::with_items(active, items))
    }
}

impl From<ProductionDetail> for ProductionLists {
    fn from(detail: ProductionDetail) -> Self {
        let active = detail.farm_type();
        let mut lists = Self {
            farm_type: active,
            crops_grown: Some(Vec::new()),
            livestock_produced: Some(Vec::new()),
            mixed_crops_grown: Some(Vec::new()),
            aquaculture_type: Some(Vec::new()),
            nursery_type: Some(Vec::new()),
            poultry_type: Some(Vec::new()),
            others_type: Some(Vec::new()),
        };
        *lists.slot(active) = Some(detail.into_items());
        lists
    }
}

/// The document body of a farm profile.
///
/// Also the registration payload: a new farm is created from its basic
/// information plus an optional initial list for its farm type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetails {
    pub farm_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub farm_size: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<Email>,
    #[serde(flatten)]
    pub production: ProductionDetail,
}

impl ProfileDocument for FarmDetails {
    type Id = FarmProfileId;

    const KIND: &'static str = "farm";
}

/// Partial update of a farm's scalar fields, including its farm type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmBasicInfo {
    #[serde(default)]
    pub farm_type: Option<FarmType>,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub farm_size: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<Email>,
}

/// One array operation as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArrayUpdate {
    pub field: String,
    pub operation: String,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A farm mutation request: basic-info patch plus zero or more array updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdateRequest {
    #[serde(default)]
    pub basic_info: Option<FarmBasicInfo>,
    #[serde(default)]
    pub array_updates: Vec<ArrayUpdate>,
}

/// A validated operation on the active production list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListOperation {
    Add(String),
    Remove(i64),
    Update(i64, String),
}

impl ListOperation {
    fn parse(update: &ArrayUpdate) -> Result<Self, MutationError> {
        let op = update.operation.as_str();
        match op {
            "add" => {
                let value = update
                    .value
                    .clone()
                    .ok_or_else(|| MutationError::missing(op, "value"))?;
                Ok(Self::Add(value))
            }
            "remove" => {
                let index = update
                    .index
                    .ok_or_else(|| MutationError::missing(op, "index"))?;
                Ok(Self::Remove(index))
            }
            "update" => {
                let index = update
                    .index
                    .ok_or_else(|| MutationError::missing(op, "index"))?;
                let value = update
                    .value
                    .clone()
                    .ok_or_else(|| MutationError::missing(op, "value"))?;
                Ok(Self::Update(index, value))
            }
            other => Err(MutationError::UnknownOperation(other.to_owned())),
        }
    }

    /// Apply to `items`. Indexes outside `[0, len)` are a no-op.
    fn apply(self, items: &mut Vec<String>) {
        match self {
            Self::Add(value) => items.push(value),
            Self::Remove(index) => {
                if let Some(index) = in_bounds(index, items.len()) {
                    items.remove(index);
                }
            }
            Self::Update(index, value) => {
                if let Some(slot) = in_bounds(index, items.len()).and_then(|i| items.get_mut(i)) {
                    *slot = value;
                }
            }
        }
    }
}

fn in_bounds(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}

fn require_text(field: &'static str, value: &str) -> Result<String, MutationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MutationError::invalid(field, "cannot be blank"));
    }
    Ok(trimmed.to_owned())
}

impl FarmDetails {
    /// Validate a registration payload.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::InvalidValue` if `farmName` is blank.
    pub fn validate(mut self) -> Result<Self, MutationError> {
        self.farm_name = require_text("farmName", &self.farm_name)?;
        Ok(self)
    }

    /// The farm's current type.
    #[must_use]
    pub const fn farm_type(&self) -> FarmType {
        self.production.farm_type()
    }

    /// Run a mutation request through the production discriminator.
    ///
    /// The basic-info patch is applied first. If it changes the farm type, the
    /// production list is reset to an empty list of the new type. Every array
    /// update must then target the list of the resulting farm type; a single
    /// mismatch or malformed update rejects the whole request. Accepted updates
    /// are applied in submission order.
    ///
    /// Returns the updated document; `self` is untouched, so a rejected request
    /// leaves nothing half-applied.
    ///
    /// # Errors
    ///
    /// - `MutationError::FieldMismatch` if an update targets an inactive list
    /// - `MutationError::UnknownOperation` / `MissingField` for malformed updates
    /// - `MutationError::InvalidValue` if the patch blanks `farmName`
    pub fn apply_update(&self, request: &FarmUpdateRequest) -> Result<Self, MutationError> {
        let mut next = self.clone();

        if let Some(patch) = &request.basic_info {
            next.apply_basic_info(patch)?;
        }

        let farm_type = next.farm_type();
        let allowed = farm_type.list_field();

        let operations = request
            .array_updates
            .iter()
            .map(|update| {
                if update.field != allowed {
                    return Err(MutationError::FieldMismatch {
                        submitted: update.field.clone(),
                        allowed,
                        farm_type,
                    });
                }
                ListOperation::parse(update)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let items = next.production.items_mut();
        for operation in operations {
            operation.apply(items);
        }

        Ok(next)
    }

    fn apply_basic_info(&mut self, patch: &FarmBasicInfo) -> Result<(), MutationError> {
        if let Some(name) = &patch.farm_name {
            self.farm_name = require_text("farmName", name)?;
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(size) = &patch.farm_size {
            self.farm_size = Some(size.clone());
        }
        if let Some(phone) = &patch.contact_phone {
            self.contact_phone = Some(phone.clone());
        }
        if let Some(email) = &patch.contact_email {
            self.contact_email = Some(email.clone());
        }
        if let Some(farm_type) = patch.farm_type
            && farm_type != self.farm_type()
        {
            self.production = ProductionDetail::empty(farm_type);
        }
        Ok(())
    }
}
