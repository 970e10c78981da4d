//! The `Record` trait ties each entity type to its collection, id prefix,
//! draft and patch types. `AppStore` implements create/update/delete/get once,
//! generically, on top of these declarations.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::models::{
    AppData, Auction, AuctionDraft, AuctionPatch, Base, BaseDraft, BasePatch, Case, CaseDraft,
    CasePatch, CaseStatus, Charge, ChargeDraft, ChargePatch, Collection, Deep, DeepDraft,
    DeepPatch, Facade, FacadeDraft, FacadePatch, Gang, GangDraft, GangPatch, Investigation,
    InvestigationDraft, InvestigationPatch, InvestigationStatus, Meeting, MeetingDraft,
    MeetingPatch, Person, PersonDraft, PersonPatch, Vehicle, VehicleDraft, VehiclePatch,
};
use crate::validation::{require, validate_phone, validate_plate, ValidationError};

/// A record type managed by the store
pub trait Record: Clone + Debug + Serialize + DeserializeOwned {
    /// Collection holding records of this type
    const COLLECTION: Collection;
    /// Identifier prefix, e.g. "P" for people
    const PREFIX: &'static str;
    /// Entity tag written to the activity log, e.g. "Person"
    const ENTITY_TYPE: &'static str;
    /// Lower-case noun used in activity log actions
    const NOUN: &'static str;

    /// Caller-supplied fields of a new record (no id, no timestamp)
    type Draft;
    /// Partial update; `None` fields are left untouched
    type Patch;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;

    /// Builds the stored record from a draft plus the store-assigned id and time
    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Shallow merge of every present patch field
    fn apply_patch(&mut self, patch: Self::Patch);

    fn validate(&self) -> Result<(), ValidationError>;

    fn collection(data: &AppData) -> &Vec<Self>;
    fn collection_mut(data: &mut AppData) -> &mut Vec<Self>;
}

/// Replaces `target` when the patch carries a value
fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl Record for Person {
    const COLLECTION: Collection = Collection::People;
    const PREFIX: &'static str = "P";
    const ENTITY_TYPE: &'static str = "Person";
    const NOUN: &'static str = "person";

    type Draft = PersonDraft;
    type Patch = PersonPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: PersonDraft) -> Self {
        Self {
            id,
            full_name: draft.full_name,
            gang: draft.gang,
            hierarchy: draft.hierarchy,
            phone: draft.phone,
            attachments: draft.attachments,
            vehicle_ids: draft.vehicle_ids,
            deep: draft.deep,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: PersonPatch) {
        merge(&mut self.full_name, patch.full_name);
        merge(&mut self.gang, patch.gang);
        merge(&mut self.hierarchy, patch.hierarchy);
        merge(&mut self.phone, patch.phone);
        merge(&mut self.attachments, patch.attachments);
        merge(&mut self.vehicle_ids, patch.vehicle_ids);
        merge(&mut self.deep, patch.deep);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "fullName", &self.full_name)?;
        require(Self::ENTITY_TYPE, "gang", &self.gang)?;
        validate_phone(&self.phone)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.people
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.people
    }
}

impl Record for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;
    const PREFIX: &'static str = "V";
    const ENTITY_TYPE: &'static str = "Vehicle";
    const NOUN: &'static str = "vehicle";

    type Draft = VehicleDraft;
    type Patch = VehiclePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: VehicleDraft) -> Self {
        Self {
            id,
            plate: draft.plate,
            model: draft.model,
            attachments: draft.attachments,
            owner_id: draft.owner_id,
            gang_id: draft.gang_id,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: VehiclePatch) {
        merge(&mut self.plate, patch.plate);
        merge(&mut self.model, patch.model);
        merge(&mut self.attachments, patch.attachments);
        merge(&mut self.owner_id, patch.owner_id);
        merge(&mut self.gang_id, patch.gang_id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_plate(&self.plate)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.vehicles
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.vehicles
    }
}

impl Record for Gang {
    const COLLECTION: Collection = Collection::Gangs;
    const PREFIX: &'static str = "G";
    const ENTITY_TYPE: &'static str = "Gang";
    const NOUN: &'static str = "gang";

    type Draft = GangDraft;
    type Patch = GangPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: GangDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            color: draft.color,
            allied_gang_ids: draft.allied_gang_ids,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: GangPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.color, patch.color);
        merge(&mut self.allied_gang_ids, patch.allied_gang_ids);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "name", &self.name)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.gangs
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.gangs
    }
}

impl Record for Case {
    const COLLECTION: Collection = Collection::Cases;
    const PREFIX: &'static str = "C";
    const ENTITY_TYPE: &'static str = "Case";
    const NOUN: &'static str = "case";

    type Draft = CaseDraft;
    type Patch = CasePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: CaseDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            person_ids: draft.person_ids,
            vehicle_ids: draft.vehicle_ids,
            gang_ids: draft.gang_ids,
            attachments: draft.attachments,
            status: CaseStatus::Open,
            closed_reason: None,
            closed_at: None,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: CasePatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.vehicle_ids, patch.vehicle_ids);
        merge(&mut self.gang_ids, patch.gang_ids);
        merge(&mut self.attachments, patch.attachments);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "title", &self.title)?;
        require(Self::ENTITY_TYPE, "description", &self.description)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.cases
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.cases
    }
}

impl Record for Investigation {
    const COLLECTION: Collection = Collection::Investigations;
    const PREFIX: &'static str = "I";
    const ENTITY_TYPE: &'static str = "Investigation";
    const NOUN: &'static str = "investigation";

    type Draft = InvestigationDraft;
    type Patch = InvestigationPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: InvestigationDraft) -> Self {
        Self {
            id,
            title: draft.title,
            sections: draft.sections,
            person_ids: draft.person_ids,
            attachments: draft.attachments,
            status: InvestigationStatus::Active,
            closed_reason: None,
            closed_at: None,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: InvestigationPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.sections, patch.sections);
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.attachments, patch.attachments);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "title", &self.title)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.investigations
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.investigations
    }
}

impl Record for Charge {
    const COLLECTION: Collection = Collection::Charges;
    const PREFIX: &'static str = "CH";
    const ENTITY_TYPE: &'static str = "Charge";
    const NOUN: &'static str = "charge";

    type Draft = ChargeDraft;
    type Patch = ChargePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: ChargeDraft) -> Self {
        Self {
            id,
            person_ids: draft.person_ids,
            vehicle_ids: draft.vehicle_ids,
            gang_id: draft.gang_id,
            reason: draft.reason,
            status: draft.status,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: ChargePatch) {
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.vehicle_ids, patch.vehicle_ids);
        merge(&mut self.gang_id, patch.gang_id);
        merge(&mut self.reason, patch.reason);
        merge(&mut self.status, patch.status);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "reason", &self.reason)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.charges
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.charges
    }
}

impl Record for Base {
    const COLLECTION: Collection = Collection::Bases;
    const PREFIX: &'static str = "B";
    const ENTITY_TYPE: &'static str = "Base";
    const NOUN: &'static str = "base";

    type Draft = BaseDraft;
    type Patch = BasePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: BaseDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            gang_id: draft.gang_id,
            attachments: draft.attachments,
            metadata: draft.metadata,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: BasePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.gang_id, patch.gang_id);
        merge(&mut self.attachments, patch.attachments);
        merge(&mut self.metadata, patch.metadata);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "name", &self.name)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.bases
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.bases
    }
}

impl Record for Meeting {
    const COLLECTION: Collection = Collection::Meetings;
    const PREFIX: &'static str = "M";
    const ENTITY_TYPE: &'static str = "Meeting";
    const NOUN: &'static str = "meeting";

    type Draft = MeetingDraft;
    type Patch = MeetingPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: MeetingDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            person_ids: draft.person_ids,
            vehicle_ids: draft.vehicle_ids,
            gang_ids: draft.gang_ids,
            attachments: draft.attachments,
            meeting_date: draft.meeting_date,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: MeetingPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.vehicle_ids, patch.vehicle_ids);
        merge(&mut self.gang_ids, patch.gang_ids);
        merge(&mut self.attachments, patch.attachments);
        merge(&mut self.meeting_date, patch.meeting_date);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "title", &self.title)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.meetings
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.meetings
    }
}

impl Record for Deep {
    const COLLECTION: Collection = Collection::Deeps;
    const PREFIX: &'static str = "D";
    const ENTITY_TYPE: &'static str = "Deep";
    const NOUN: &'static str = "deep";

    type Draft = DeepDraft;
    type Patch = DeepPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: DeepDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            person_ids: draft.person_ids,
            gang_id: draft.gang_id,
            attachments: draft.attachments,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: DeepPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.gang_id, patch.gang_id);
        merge(&mut self.attachments, patch.attachments);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "title", &self.title)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.deeps
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.deeps
    }
}

impl Record for Auction {
    const COLLECTION: Collection = Collection::Auctions;
    const PREFIX: &'static str = "A";
    const ENTITY_TYPE: &'static str = "Auction";
    const NOUN: &'static str = "auction";

    type Draft = AuctionDraft;
    type Patch = AuctionPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: AuctionDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            entries: draft.entries,
            attachments: draft.attachments,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: AuctionPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.entries, patch.entries);
        merge(&mut self.attachments, patch.attachments);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "title", &self.title)?;
        if self.entries.is_empty() {
            return Err(ValidationError::NoAuctionEntries);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.gang_id.trim().is_empty() {
                return Err(ValidationError::InvalidAuctionEntry { index, reason: "missing gang" });
            }
            if entry.item.trim().is_empty() {
                return Err(ValidationError::InvalidAuctionEntry { index, reason: "missing item" });
            }
            if !(entry.amount.is_finite() && entry.amount > 0.0) {
                return Err(ValidationError::InvalidAuctionEntry {
                    index,
                    reason: "amount must be positive",
                });
            }
            if entry.gears.is_some_and(|g| !(g.is_finite() && g >= 0.0)) {
                return Err(ValidationError::InvalidAuctionEntry {
                    index,
                    reason: "gears must not be negative",
                });
            }
        }
        Ok(())
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.auctions
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.auctions
    }
}

impl Record for Facade {
    const COLLECTION: Collection = Collection::Facades;
    const PREFIX: &'static str = "F";
    const ENTITY_TYPE: &'static str = "Facade";
    const NOUN: &'static str = "facade";

    type Draft = FacadeDraft;
    type Patch = FacadePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: FacadeDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            gang_id: draft.gang_id,
            person_ids: draft.person_ids,
            attachments: draft.attachments,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: FacadePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.gang_id, patch.gang_id);
        merge(&mut self.person_ids, patch.person_ids);
        merge(&mut self.attachments, patch.attachments);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::ENTITY_TYPE, "name", &self.name)
    }

    fn collection(data: &AppData) -> &Vec<Self> {
        &data.facades
    }

    fn collection_mut(data: &mut AppData) -> &mut Vec<Self> {
        &mut data.facades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuctionEntry, Hierarchy};

    fn person() -> Person {
        Person::from_draft(
            "P-01".into(),
            Utc::now(),
            PersonDraft {
                full_name: "Carl Johnson".into(),
                gang: "Grove".into(),
                hierarchy: Hierarchy::Leader,
                phone: "555-010".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut p = person();
        let before = p.clone();

        p.apply_patch(PersonPatch {
            phone: Some("555-999".into()),
            ..Default::default()
        });

        assert_eq!(p.phone, "555-999");
        assert_eq!(p.full_name, before.full_name);
        assert_eq!(p.gang, before.gang);
        assert_eq!(p.hierarchy, before.hierarchy);
        assert_eq!(p.created_at, before.created_at);
    }

    #[test]
    fn test_patch_can_clear_optional_field() {
        let mut p = person();
        p.deep = Some("D-01".into());
        p.apply_patch(PersonPatch {
            deep: Some(None),
            ..Default::default()
        });
        assert_eq!(p.deep, None);
    }

    #[test]
    fn test_case_draft_starts_open() {
        let case = Case::from_draft(
            "C-01".into(),
            Utc::now(),
            CaseDraft {
                title: "Bank job".into(),
                description: "Fleeca".into(),
                ..Default::default()
            },
        );
        assert_eq!(case.status, CaseStatus::Open);
        assert!(case.closed_reason.is_none());
        assert!(case.validate().is_ok());
    }

    #[test]
    fn test_person_validation() {
        let mut p = person();
        assert!(p.validate().is_ok());
        p.phone = "5550100".into();
        assert!(matches!(p.validate(), Err(ValidationError::InvalidPhone(_))));
        p.full_name = " ".into();
        assert!(matches!(p.validate(), Err(ValidationError::MissingField { .. })));
    }

    #[test]
    fn test_person_needs_gang() {
        let mut p = person();
        p.gang = "  ".into();
        assert_eq!(
            p.validate(),
            Err(ValidationError::MissingField {
                entity: "Person",
                field: "gang",
            })
        );
    }

    #[test]
    fn test_auction_validation() {
        let mut auction = Auction::from_draft(
            "A-01".into(),
            Utc::now(),
            AuctionDraft {
                title: "Weapons".into(),
                ..Default::default()
            },
        );
        assert_eq!(auction.validate(), Err(ValidationError::NoAuctionEntries));

        auction.entries.push(AuctionEntry {
            gang_id: "G-01".into(),
            item: "Crate".into(),
            amount: 0.0,
            gears: None,
        });
        assert!(matches!(
            auction.validate(),
            Err(ValidationError::InvalidAuctionEntry { index: 0, .. })
        ));

        auction.entries[0].amount = 1500.0;
        assert!(auction.validate().is_ok());
        assert_eq!(auction.total(), 1500.0);

        auction.entries[0].gears = Some(-1.0);
        assert!(matches!(
            auction.validate(),
            Err(ValidationError::InvalidAuctionEntry { index: 0, .. })
        ));
        auction.entries[0].gears = Some(0.0);
        assert!(auction.validate().is_ok());
    }

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes = [
            Person::PREFIX,
            Vehicle::PREFIX,
            Gang::PREFIX,
            Case::PREFIX,
            Investigation::PREFIX,
            Charge::PREFIX,
            Base::PREFIX,
            Meeting::PREFIX,
            Deep::PREFIX,
            Auction::PREFIX,
            Facade::PREFIX,
        ];
        let unique: std::collections::HashSet<_> = prefixes.iter().collect();
        assert_eq!(unique.len(), prefixes.len());
    }
}
