//! The application store: owns every collection, writes through a backend and
//! keeps the activity log.
//!
//! Every mutation follows the same order: validate, write to the backend, and
//! only once the backend accepted the write update the in-memory collections,
//! append to the activity log and notify subscribers. A failed write leaves the
//! store exactly as it was.

use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::mpsc::Receiver;

use crate::activity::{self, Action};
use crate::db::{DatabaseBackend, MemoryBackend};
use crate::error::StoreError;
use crate::events::{ChangeKind, RemoteChange, StoreEvent, Subscribers};
use crate::export;
use crate::ids;
use crate::models::{
    ActivityLogEntry, AppData, Auction, Base, Case, CaseStatus, Charge, ChargeStatus, Collection,
    Deep, Facade, Gang, Investigation, InvestigationStatus, Investigator, Meeting, Person, Vehicle,
};
use crate::record::Record;
use crate::validation::{require, ValidationError};

pub type StoreResult<T> = Result<T, StoreError>;

pub struct AppStore {
    data: AppData,
    backend: Box<dyn DatabaseBackend>,
    subscribers: Subscribers,
}

impl AppStore {
    /// Loads the store from `backend`. A remembered investigator that is no
    /// longer on the roster is dropped from the session.
    pub fn open(backend: Box<dyn DatabaseBackend>) -> StoreResult<Self> {
        let mut data = backend.load()?;

        if let Some(id) = data.current_investigator.clone() {
            if data.get_investigator(&id).is_none() {
                log::warn!("Remembered investigator {} is not on the roster", id);
                data.current_investigator = None;
            }
        }

        log::debug!(
            "Opened {} store at {:?}",
            backend.backend_type(),
            backend.path()
        );

        Ok(Self {
            data,
            backend,
            subscribers: Subscribers::new(),
        })
    }

    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            data: AppData::new(),
            backend: Box::new(MemoryBackend::new()),
            subscribers: Subscribers::new(),
        }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn backend(&self) -> &dyn DatabaseBackend {
        self.backend.as_ref()
    }

    /// Registers a new listener for store events
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }

    /// Re-reads everything from the backend
    pub fn reload(&mut self) -> StoreResult<()> {
        self.data = self.backend.load()?;
        self.subscribers.publish(StoreEvent::Reloaded);
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn current_investigator(&self) -> Option<&Investigator> {
        self.data
            .current_investigator
            .as_deref()
            .and_then(|id| self.data.get_investigator(id))
    }

    pub fn set_current_investigator(&mut self, id: &str) -> StoreResult<()> {
        if self.data.get_investigator(id).is_none() {
            return Err(StoreError::UnknownInvestigator(id.to_string()));
        }

        self.backend.set_current_investigator(Some(id))?;
        self.data.current_investigator = Some(id.to_string());
        self.subscribers
            .publish(StoreEvent::SessionChanged(Some(id.to_string())));
        Ok(())
    }

    pub fn logout(&mut self) -> StoreResult<()> {
        self.backend.set_current_investigator(None)?;
        self.data.current_investigator = None;
        self.subscribers.publish(StoreEvent::SessionChanged(None));
        Ok(())
    }

    /// Replaces the whole roster. The session ends if the active investigator
    /// is not part of the new roster. An empty roster is rejected, since every
    /// load would reseed the default one.
    pub fn update_investigators(&mut self, investigators: Vec<Investigator>) -> StoreResult<()> {
        if investigators.is_empty() {
            return Err(ValidationError::EmptyRoster.into());
        }

        let values = investigators
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.backend
            .replace_collection(Collection::Investigators, &values)?;
        self.data.investigators = investigators;
        self.subscribers
            .publish(StoreEvent::CollectionReplaced(Collection::Investigators));

        let stale = self
            .data
            .current_investigator
            .as_deref()
            .is_some_and(|id| self.data.get_investigator(id).is_none());
        if stale {
            self.logout()?;
        }
        Ok(())
    }

    pub fn add_investigator(&mut self, name: &str) -> StoreResult<Investigator> {
        let name = name.trim();
        require("Investigator", "name", name)?;

        let investigator = Investigator {
            id: ids::allocate("INV", self.data.investigators.iter().map(|i| i.id.as_str())),
            name: name.to_string(),
            attachments: Vec::new(),
        };

        self.backend.insert_record(
            Collection::Investigators,
            &serde_json::to_value(&investigator)?,
        )?;
        self.data.investigators.push(investigator.clone());
        self.log_action(
            Action::Created.describe("investigator"),
            "Investigator",
            &investigator.id,
        );
        self.publish_record(Collection::Investigators, &investigator.id, ChangeKind::Inserted);
        Ok(investigator)
    }

    // =========================================================================
    // Generic record operations
    // =========================================================================

    pub fn list<R: Record>(&self) -> &[R] {
        R::collection(&self.data)
    }

    pub fn get<R: Record>(&self, id: &str) -> Option<&R> {
        R::collection(&self.data).iter().find(|r| r.id() == id)
    }

    /// Validates the draft, assigns the next id and a creation timestamp, and
    /// stores the record.
    pub fn create<R: Record>(&mut self, draft: R::Draft) -> StoreResult<R> {
        let id = ids::allocate(R::PREFIX, R::collection(&self.data).iter().map(|r| r.id()));
        let record = R::from_draft(id, Utc::now(), draft);
        record.validate()?;

        self.backend
            .insert_record(R::COLLECTION, &serde_json::to_value(&record)?)?;
        log::debug!("Created {} {}", R::NOUN, record.id());

        R::collection_mut(&mut self.data).push(record.clone());
        self.log_action(Action::Created.describe(R::NOUN), R::ENTITY_TYPE, record.id());
        self.publish_record(R::COLLECTION, record.id(), ChangeKind::Inserted);
        Ok(record)
    }

    /// Merges the present fields of `patch` into the record. Returns `None`
    /// without touching anything when the id is unknown.
    pub fn update<R: Record>(&mut self, id: &str, patch: R::Patch) -> StoreResult<Option<R>> {
        let Some(current) = self.get::<R>(id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply_patch(patch);
        updated.validate()?;

        self.replace(updated, Action::Updated).map(Some)
    }

    /// Removes the record. References held by other records are left as they
    /// are. Returns `false` when the id is unknown.
    pub fn delete<R: Record>(&mut self, id: &str) -> StoreResult<bool> {
        let Some(position) = R::collection(&self.data).iter().position(|r| r.id() == id) else {
            return Ok(false);
        };

        self.backend.delete_record(R::COLLECTION, id)?;
        log::debug!("Deleted {} {}", R::NOUN, id);

        R::collection_mut(&mut self.data).remove(position);
        self.log_action(Action::Deleted.describe(R::NOUN), R::ENTITY_TYPE, id);
        self.publish_record(R::COLLECTION, id, ChangeKind::Removed);
        Ok(true)
    }

    /// Writes an already validated record over the stored one with the same id
    fn replace<R: Record>(&mut self, record: R, action: Action) -> StoreResult<R> {
        self.backend
            .update_record(R::COLLECTION, record.id(), &serde_json::to_value(&record)?)?;
        log::debug!("{} {} {}", action, R::NOUN, record.id());

        if let Some(slot) = R::collection_mut(&mut self.data)
            .iter_mut()
            .find(|r| r.id() == record.id())
        {
            *slot = record.clone();
        }
        self.log_action(action.describe(R::NOUN), R::ENTITY_TYPE, record.id());
        self.publish_record(R::COLLECTION, record.id(), ChangeKind::Updated);
        Ok(record)
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Closes an open case for good. The reason must not be blank.
    pub fn close_case(&mut self, id: &str, reason: &str) -> StoreResult<Option<Case>> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(StoreError::EmptyCloseReason);
        }
        let Some(case) = self.get::<Case>(id) else {
            return Ok(None);
        };
        if case.status == CaseStatus::Closed {
            return Err(StoreError::AlreadyClosed(id.to_string()));
        }

        let mut closed = case.clone();
        closed.status = CaseStatus::Closed;
        closed.closed_reason = Some(reason.to_string());
        closed.closed_at = Some(Utc::now());

        self.replace(closed, Action::Closed).map(Some)
    }

    pub fn archive_investigation(
        &mut self,
        id: &str,
        reason: &str,
    ) -> StoreResult<Option<Investigation>> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(StoreError::EmptyCloseReason);
        }
        let Some(investigation) = self.get::<Investigation>(id) else {
            return Ok(None);
        };
        if investigation.status == InvestigationStatus::Archived {
            return Err(StoreError::InvalidTransition {
                entity: Investigation::NOUN,
                id: id.to_string(),
                action: "archive",
            });
        }

        let mut archived = investigation.clone();
        archived.status = InvestigationStatus::Archived;
        archived.closed_reason = Some(reason.to_string());
        archived.closed_at = Some(Utc::now());

        self.replace(archived, Action::Archived).map(Some)
    }

    pub fn reactivate_investigation(&mut self, id: &str) -> StoreResult<Option<Investigation>> {
        let Some(investigation) = self.get::<Investigation>(id) else {
            return Ok(None);
        };
        if investigation.status == InvestigationStatus::Active {
            return Err(StoreError::InvalidTransition {
                entity: Investigation::NOUN,
                id: id.to_string(),
                action: "reactivate",
            });
        }

        let mut active = investigation.clone();
        active.status = InvestigationStatus::Active;
        active.closed_reason = None;
        active.closed_at = None;

        self.replace(active, Action::Reactivated).map(Some)
    }

    pub fn resolve_charge(&mut self, id: &str) -> StoreResult<Option<Charge>> {
        let Some(charge) = self.get::<Charge>(id) else {
            return Ok(None);
        };
        if charge.status == ChargeStatus::Resolved {
            return Err(StoreError::InvalidTransition {
                entity: Charge::NOUN,
                id: id.to_string(),
                action: "resolve",
            });
        }

        let mut resolved = charge.clone();
        resolved.status = ChargeStatus::Resolved;

        self.replace(resolved, Action::Resolved).map(Some)
    }

    // =========================================================================
    // Activity log
    // =========================================================================

    /// Newest first, at most `ACTIVITY_LOG_CAPACITY` entries
    pub fn activity_log(&self) -> &[ActivityLogEntry] {
        &self.data.activity_logs
    }

    /// Appends an entry for the active investigator; does nothing when nobody
    /// is logged in. A log entry the backend refuses is dropped with a warning,
    /// the mutation it describes has already been stored.
    fn log_action(&mut self, action: String, entity_type: &str, entity_id: &str) {
        let Some(investigator) = self.current_investigator() else {
            return;
        };

        let entry = activity::new_entry(
            &self.data.activity_logs,
            investigator,
            action,
            entity_type,
            entity_id,
            Utc::now(),
        );

        let written = serde_json::to_value(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.backend.insert_record(Collection::ActivityLogs, &value));
        if let Err(e) = written {
            log::warn!("Activity log entry for {} not stored: {:#}", entity_id, e);
            return;
        }

        let id = entry.id.clone();
        for dropped in activity::push_entry(&mut self.data.activity_logs, entry) {
            // The YAML backend already trims on read, so a miss here is expected
            if let Err(e) = self
                .backend
                .delete_record(Collection::ActivityLogs, &dropped.id)
            {
                log::debug!("Old log entry {} not removed: {:#}", dropped.id, e);
            }
        }
        self.publish_record(Collection::ActivityLogs, &id, ChangeKind::Inserted);
    }

    // =========================================================================
    // Backup and sync
    // =========================================================================

    pub fn export_data(&self) -> StoreResult<String> {
        Ok(export::export_json(&self.data)?)
    }

    /// Replaces every collection with the content of a backup. A malformed
    /// backup is rejected as a whole and the store is left untouched.
    pub fn import_data(&mut self, json: &str) -> StoreResult<()> {
        let mut data = export::parse_backup(json).map_err(|e| {
            log::warn!("Rejected import: {:#}", e);
            StoreError::Import(format!("{:#}", e))
        })?;

        if let Some(id) = data.current_investigator.clone() {
            if data.get_investigator(&id).is_none() {
                data.current_investigator = None;
            }
        }

        self.backend.save(&data)?;
        log::info!("Imported backup with {} people", data.people.len());
        self.data = data;
        self.subscribers.publish(StoreEvent::Reloaded);
        Ok(())
    }

    /// Applies a change pushed by another client. The record replaces any
    /// local one with the same id (last write wins) and nothing is logged.
    pub fn apply_remote_change(&mut self, change: RemoteChange) -> StoreResult<()> {
        let collection: Collection = change
            .collection()
            .parse()
            .map_err(|_| StoreError::UnknownCollection(change.collection().to_string()))?;

        let data = &mut self.data;
        let outcome = match collection {
            Collection::Investigators => {
                apply_remote(&mut data.investigators, &change, |i| i.id.as_str())?
            }
            Collection::People => apply_remote(&mut data.people, &change, Person::id)?,
            Collection::Vehicles => apply_remote(&mut data.vehicles, &change, Vehicle::id)?,
            Collection::Gangs => apply_remote(&mut data.gangs, &change, Gang::id)?,
            Collection::Cases => apply_remote(&mut data.cases, &change, Case::id)?,
            Collection::Investigations => {
                apply_remote(&mut data.investigations, &change, Investigation::id)?
            }
            Collection::Charges => apply_remote(&mut data.charges, &change, Charge::id)?,
            Collection::Bases => apply_remote(&mut data.bases, &change, Base::id)?,
            Collection::Meetings => apply_remote(&mut data.meetings, &change, Meeting::id)?,
            Collection::Deeps => apply_remote(&mut data.deeps, &change, Deep::id)?,
            Collection::Auctions => apply_remote(&mut data.auctions, &change, Auction::id)?,
            Collection::Facades => apply_remote(&mut data.facades, &change, Facade::id)?,
            Collection::ActivityLogs => {
                let outcome = apply_remote(&mut data.activity_logs, &change, |e| e.id.as_str())?;
                data.normalize();
                outcome
            }
        };

        if let Some((id, kind)) = outcome {
            self.publish_record(collection, &id, kind);
        }
        Ok(())
    }

    fn publish_record(&mut self, collection: Collection, id: &str, kind: ChangeKind) {
        self.subscribers.publish(StoreEvent::Record {
            collection,
            id: id.to_string(),
            kind,
        });
    }
}

/// Upserts or removes one record of `records`; returns what changed, if
/// anything.
fn apply_remote<T, F>(
    records: &mut Vec<T>,
    change: &RemoteChange,
    id_of: F,
) -> StoreResult<Option<(String, ChangeKind)>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> &str,
{
    match change {
        RemoteChange::Upsert { record, .. } => {
            let incoming: T = serde_json::from_value(record.clone())?;
            let id = id_of(&incoming).to_string();
            match records.iter().position(|r| id_of(r) == id) {
                Some(index) => {
                    records[index] = incoming;
                    Ok(Some((id, ChangeKind::Updated)))
                }
                None => {
                    records.push(incoming);
                    Ok(Some((id, ChangeKind::Inserted)))
                }
            }
        }
        RemoteChange::Delete { id, .. } => {
            let before = records.len();
            records.retain(|r| id_of(r) != id.as_str());
            if records.len() == before {
                Ok(None)
            } else {
                Ok(Some((id.clone(), ChangeKind::Removed)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuctionDraft, AuctionEntry, CaseDraft, CasePatch, ChargeDraft, GangDraft,
        InvestigationDraft, PersonDraft, PersonPatch, VehicleDraft, VehiclePatch,
        ACTIVITY_LOG_CAPACITY,
    };
    use anyhow::Result;
    use serde_json::json;
    use std::path::Path;

    /// Loads fine, refuses every write
    struct FailingBackend;

    impl DatabaseBackend for FailingBackend {
        fn backend_type(&self) -> crate::db::BackendType {
            crate::db::BackendType::Memory
        }

        fn path(&self) -> &Path {
            Path::new(":failing:")
        }

        fn load(&self) -> Result<AppData> {
            Ok(AppData::new())
        }

        fn save(&self, _data: &AppData) -> Result<()> {
            anyhow::bail!("disk full")
        }

        fn set_current_investigator(&self, _id: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn person(name: &str, gang: &str) -> PersonDraft {
        PersonDraft {
            full_name: name.into(),
            gang: gang.into(),
            phone: "555-010".into(),
            ..Default::default()
        }
    }

    fn case(title: &str) -> CaseDraft {
        CaseDraft {
            title: title.into(),
            description: "Armed robbery at the Fleeca bank".into(),
            ..Default::default()
        }
    }

    fn logged_in() -> AppStore {
        let mut store = AppStore::in_memory();
        store.set_current_investigator("INV-03").unwrap();
        store
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut store = AppStore::in_memory();

        let first = store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();
        let second = store.create::<Person>(person("Sean Johnson", "Grove")).unwrap();
        let gang = store
            .create::<Gang>(GangDraft {
                name: "Grove".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(first.id, "P-01");
        assert_eq!(second.id, "P-02");
        assert_eq!(gang.id, "G-01");
        assert_eq!(store.get::<Person>("P-02").unwrap().full_name, "Sean Johnson");
        assert_eq!(store.list::<Person>().len(), 2);
    }

    #[test]
    fn test_create_stamps_created_at() {
        let mut store = AppStore::in_memory();
        let before = Utc::now();

        let person = store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();

        assert!(person.created_at >= before);
        assert!(person.created_at <= Utc::now());
    }

    #[test]
    fn test_create_writes_through_backend() {
        let mut store = AppStore::in_memory();
        store
            .create::<Vehicle>(VehicleDraft {
                plate: "ABC1D23".into(),
                ..Default::default()
            })
            .unwrap();

        let stored = store.backend().get_record(Collection::Vehicles, "V-01").unwrap();
        assert_eq!(stored.unwrap()["plate"], "ABC1D23");
    }

    #[test]
    fn test_validation_runs_before_write() {
        let mut store = AppStore::in_memory();
        let rx = store.subscribe();

        let err = store.create::<Person>(PersonDraft {
            full_name: "No Phone".into(),
            gang: "Grove".into(),
            phone: "12345".into(),
            ..Default::default()
        });

        assert!(matches!(
            err,
            Err(StoreError::Validation(ValidationError::InvalidPhone(_)))
        ));
        assert!(store.list::<Person>().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_backend_write_leaves_state_untouched() {
        let mut store = AppStore::open(Box::new(FailingBackend)).unwrap();
        store.set_current_investigator("INV-01").unwrap();
        let rx = store.subscribe();

        let result = store.create::<Case>(case("Bank job"));

        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert!(store.list::<Case>().is_empty());
        assert!(store.activity_log().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_update_merges_present_fields() {
        let mut store = AppStore::in_memory();
        store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();

        let updated = store
            .update::<Person>(
                "P-01",
                PersonPatch {
                    phone: Some("555-999".into()),
                    deep: Some(Some("D-01".into())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.full_name, "Carl Johnson");
        assert_eq!(updated.phone, "555-999");
        assert_eq!(updated.deep.as_deref(), Some("D-01"));

        let cleared = store
            .update::<Person>(
                "P-01",
                PersonPatch {
                    deep: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(cleared.deep.is_none());
        assert_eq!(cleared.created_at, updated.created_at);
    }

    #[test]
    fn test_update_rejects_invalid_merge() {
        let mut store = AppStore::in_memory();
        store
            .create::<Vehicle>(VehicleDraft {
                plate: "XYZ999".into(),
                ..Default::default()
            })
            .unwrap();

        let result = store.update::<Vehicle>(
            "V-01",
            VehiclePatch {
                plate: Some("   ".into()),
                ..Default::default()
            },
        );

        assert!(result.is_err());
        assert_eq!(store.get::<Vehicle>("V-01").unwrap().plate, "XYZ999");
    }

    #[test]
    fn test_missing_ids_are_no_ops() {
        let mut store = logged_in();

        let updated = store
            .update::<Case>("C-42", CasePatch::default())
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete::<Case>("C-42").unwrap());
        assert!(store.close_case("C-42", "done").unwrap().is_none());
        assert!(store.activity_log().is_empty());
    }

    #[test]
    fn test_delete_keeps_dangling_references() {
        let mut store = logged_in();
        store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();
        store
            .create::<Case>(CaseDraft {
                person_ids: vec!["P-01".into()],
                ..case("Bank job")
            })
            .unwrap();

        assert!(store.delete::<Person>("P-01").unwrap());
        assert!(!store.delete::<Person>("P-01").unwrap());

        assert!(store.get::<Person>("P-01").is_none());
        assert_eq!(store.get::<Case>("C-01").unwrap().person_ids, vec!["P-01"]);

        // the highest freed id is handed out again
        let again = store.create::<Person>(person("Big Smoke", "Grove")).unwrap();
        assert_eq!(again.id, "P-01");
    }

    #[test]
    fn test_close_case() {
        let mut store = logged_in();
        store.create::<Case>(case("Bank job")).unwrap();

        assert!(matches!(
            store.close_case("C-01", "   "),
            Err(StoreError::EmptyCloseReason)
        ));

        let closed = store.close_case("C-01", " Suspects arrested ").unwrap().unwrap();
        assert_eq!(closed.status, CaseStatus::Closed);
        assert_eq!(closed.closed_reason.as_deref(), Some("Suspects arrested"));
        assert!(closed.closed_at.is_some());

        assert!(matches!(
            store.close_case("C-01", "again"),
            Err(StoreError::AlreadyClosed(_))
        ));

        // editing a closed case keeps it closed
        let edited = store
            .update::<Case>(
                "C-01",
                CasePatch {
                    title: Some("Fleeca job".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(edited.status, CaseStatus::Closed);

        assert_eq!(store.activity_log()[1].action, "closed case");
    }

    #[test]
    fn test_investigation_archive_and_reactivate() {
        let mut store = AppStore::in_memory();
        store
            .create::<Investigation>(InvestigationDraft {
                title: "Arms trafficking".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(
            store.reactivate_investigation("I-01"),
            Err(StoreError::InvalidTransition { .. })
        ));

        let archived = store
            .archive_investigation("I-01", "No leads")
            .unwrap()
            .unwrap();
        assert_eq!(archived.status, InvestigationStatus::Archived);
        assert!(store.archive_investigation("I-01", "again").is_err());

        let active = store.reactivate_investigation("I-01").unwrap().unwrap();
        assert_eq!(active.status, InvestigationStatus::Active);
        assert!(active.closed_reason.is_none());
        assert!(active.closed_at.is_none());
    }

    #[test]
    fn test_resolve_charge() {
        let mut store = AppStore::in_memory();
        store
            .create::<Charge>(ChargeDraft {
                reason: "Unpaid fine".into(),
                person_ids: vec!["P-01".into()],
                ..Default::default()
            })
            .unwrap();

        let resolved = store.resolve_charge("CH-01").unwrap().unwrap();
        assert_eq!(resolved.status, ChargeStatus::Resolved);
        assert!(store.resolve_charge("CH-01").is_err());
    }

    #[test]
    fn test_auction_validation() {
        let mut store = AppStore::in_memory();
        assert!(store
            .create::<Auction>(AuctionDraft {
                title: "Weapons lot".into(),
                ..Default::default()
            })
            .is_err());

        let auction = store
            .create::<Auction>(AuctionDraft {
                title: "Weapons lot".into(),
                entries: vec![AuctionEntry {
                    gang_id: "G-01".into(),
                    item: "Rifle".into(),
                    amount: 1500.0,
                    gears: Some(12.0),
                }],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(auction.id, "A-01");
    }

    #[test]
    fn test_logging_requires_investigator() {
        let mut store = AppStore::in_memory();
        store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();
        assert!(store.activity_log().is_empty());

        store.set_current_investigator("INV-02").unwrap();
        store.create::<Person>(person("Sean Johnson", "Grove")).unwrap();

        let entry = &store.activity_log()[0];
        assert_eq!(entry.id, "LOG-01");
        assert_eq!(entry.investigator_id, "INV-02");
        assert_eq!(entry.investigator_name, "Luciano");
        assert_eq!(entry.action, "created person");
        assert_eq!(entry.entity_type, "Person");
        assert_eq!(entry.entity_id, "P-02");
    }

    #[test]
    fn test_activity_log_is_capped_newest_first() {
        let mut store = logged_in();
        store.create::<Person>(person("Carl Johnson", "Grove")).unwrap();

        for n in 0..110 {
            store
                .update::<Person>(
                    "P-01",
                    PersonPatch {
                        gang: Some(format!("Gang {}", n)),
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        let log = store.activity_log();
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(log[0].id, "LOG-111");
        assert_eq!(log[0].action, "updated person");
        assert_eq!(log[99].id, "LOG-12");

        let stored = store.backend().load().unwrap();
        assert_eq!(stored.activity_logs.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(stored.activity_logs[0].id, "LOG-111");
    }

    #[test]
    fn test_session() {
        let mut store = AppStore::in_memory();
        let rx = store.subscribe();

        assert!(matches!(
            store.set_current_investigator("INV-99"),
            Err(StoreError::UnknownInvestigator(_))
        ));

        store.set_current_investigator("INV-10").unwrap();
        assert_eq!(store.current_investigator().unwrap().name, "Lua");
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::SessionChanged(Some("INV-10".into()))
        );

        store.logout().unwrap();
        assert!(store.current_investigator().is_none());
        assert!(store.backend().load().unwrap().current_investigator.is_none());
    }

    #[test]
    fn test_investigator_roster() {
        let mut store = AppStore::in_memory();
        let added = store.add_investigator("  Kai ").unwrap();
        assert_eq!(added.id, "INV-11");
        assert_eq!(added.name, "Kai");
        assert!(store.add_investigator("   ").is_err());

        store.set_current_investigator("INV-11").unwrap();
        let roster: Vec<Investigator> = store.data().investigators[..3].to_vec();
        store.update_investigators(roster).unwrap();

        assert_eq!(store.data().investigators.len(), 3);
        assert!(store.current_investigator().is_none());
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let mut store = AppStore::in_memory();

        let result = store.update_investigators(Vec::new());

        assert!(matches!(
            result,
            Err(StoreError::Validation(ValidationError::EmptyRoster))
        ));
        assert_eq!(store.data().investigators.len(), 10);
        assert_eq!(store.backend().load().unwrap().investigators.len(), 10);
    }

    #[test]
    fn test_subscribers_see_record_changes() {
        let mut store = AppStore::in_memory();
        let rx = store.subscribe();

        store
            .create::<Gang>(GangDraft {
                name: "Ballas".into(),
                ..Default::default()
            })
            .unwrap();
        store.delete::<Gang>("G-01").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::Record {
                collection: Collection::Gangs,
                id: "G-01".into(),
                kind: ChangeKind::Inserted
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::Record {
                collection: Collection::Gangs,
                id: "G-01".into(),
                kind: ChangeKind::Removed
            }
        );
    }

    #[test]
    fn test_export_import() {
        let mut source = logged_in();
        source.create::<Case>(case("Bank job")).unwrap();
        let backup = source.export_data().unwrap();

        let mut target = AppStore::in_memory();
        target.import_data(&backup).unwrap();

        assert_eq!(target.get::<Case>("C-01").unwrap().title, "Bank job");
        assert_eq!(target.current_investigator().unwrap().id, "INV-03");
        assert_eq!(target.activity_log().len(), 1);
    }

    #[test]
    fn test_auction_gears_survive_import_and_export() {
        let mut store = AppStore::in_memory();
        let backup = json!({
            "auctions": [{
                "id": "A-01",
                "title": "Weapons lot",
                "entries": [{"gangId": "G-01", "item": "Rifle", "amount": 100, "gears": 5}],
                "createdAt": "2024-05-01T12:00:00Z"
            }]
        });

        store.import_data(&backup.to_string()).unwrap();
        assert_eq!(store.get::<Auction>("A-01").unwrap().entries[0].gears, Some(5.0));

        let exported: serde_json::Value =
            serde_json::from_str(&store.export_data().unwrap()).unwrap();
        assert_eq!(exported["auctions"][0]["entries"][0]["gears"], 5.0);
    }

    #[test]
    fn test_malformed_import_keeps_state() {
        let mut store = AppStore::in_memory();
        store.create::<Case>(case("Bank job")).unwrap();

        let result = store.import_data(r#"{"cases": [{"title": "no id"}]}"#);

        assert!(matches!(result, Err(StoreError::Import(_))));
        assert_eq!(store.list::<Case>().len(), 1);
        assert!(store.import_data("{{{").is_err());
        assert_eq!(store.list::<Case>().len(), 1);
    }

    #[test]
    fn test_remote_changes_last_write_wins() {
        let mut store = logged_in();
        store
            .create::<Gang>(GangDraft {
                name: "Ballas".into(),
                ..Default::default()
            })
            .unwrap();
        let log_len = store.activity_log().len();

        store
            .apply_remote_change(RemoteChange::Upsert {
                collection: "gangs".into(),
                record: json!({"id": "G-01", "name": "Vagos", "createdAt": "2024-05-01T12:00:00Z"}),
            })
            .unwrap();
        store
            .apply_remote_change(RemoteChange::Upsert {
                collection: "gangs".into(),
                record: json!({"id": "G-02", "name": "Families", "createdAt": "2024-05-01T12:00:00Z"}),
            })
            .unwrap();

        assert_eq!(store.get::<Gang>("G-01").unwrap().name, "Vagos");
        assert_eq!(store.list::<Gang>().len(), 2);

        store
            .apply_remote_change(RemoteChange::Delete {
                collection: "gangs".into(),
                id: "G-01".into(),
            })
            .unwrap();
        assert!(store.get::<Gang>("G-01").is_none());
        assert_eq!(store.activity_log().len(), log_len);

        assert!(matches!(
            store.apply_remote_change(RemoteChange::Delete {
                collection: "planes".into(),
                id: "X-01".into(),
            }),
            Err(StoreError::UnknownCollection(_))
        ));
    }
}
