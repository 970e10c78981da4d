use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ids;

/// Maximum number of activity log entries kept, newest first
pub const ACTIVITY_LOG_CAPACITY: usize = 100;

/// Names of the collections held in `AppData`, as used in backups and backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Investigators,
    People,
    Vehicles,
    Gangs,
    Cases,
    Investigations,
    Charges,
    Bases,
    Meetings,
    Deeps,
    Auctions,
    Facades,
    ActivityLogs,
}

impl Collection {
    pub const ALL: [Collection; 13] = [
        Collection::Investigators,
        Collection::People,
        Collection::Vehicles,
        Collection::Gangs,
        Collection::Cases,
        Collection::Investigations,
        Collection::Charges,
        Collection::Bases,
        Collection::Meetings,
        Collection::Deeps,
        Collection::Auctions,
        Collection::Facades,
        Collection::ActivityLogs,
    ];

    /// Key of this collection in the persisted JSON document
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Investigators => "investigators",
            Collection::People => "people",
            Collection::Vehicles => "vehicles",
            Collection::Gangs => "gangs",
            Collection::Cases => "cases",
            Collection::Investigations => "investigations",
            Collection::Charges => "charges",
            Collection::Bases => "bases",
            Collection::Meetings => "meetings",
            Collection::Deeps => "deeps",
            Collection::Auctions => "auctions",
            Collection::Facades => "facades",
            Collection::ActivityLogs => "activityLogs",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown collection: {}", s))
    }
}

/// A file or image attached to a record; `url` is opaque to the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Attachment {
    /// Creates an attachment with an `ATT-NN` id unique among `existing`
    pub fn new(existing: &[Attachment], name: String, url: String, kind: String) -> Self {
        Self {
            id: ids::allocate("ATT", existing.iter().map(|a| a.id.as_str())),
            name,
            url,
            kind,
        }
    }
}

/// A member of the investigation group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Investigator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// The roster seeded into an empty store
pub fn default_investigators() -> Vec<Investigator> {
    [
        "Hinata", "Luciano", "Miranda", "Lara", "Hiro", "Naira", "Miguel", "Eloa", "Noah", "Lua",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Investigator {
        id: ids::format_id("INV", i as u64 + 1),
        name: name.to_string(),
        attachments: Vec::new(),
    })
    .collect()
}

/// Rank of a person inside their gang
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hierarchy {
    #[serde(alias = "Lider", alias = "Líder")]
    Leader,
    #[serde(rename = "Sub-Leader", alias = "Sub-Lider", alias = "Sub-Líder")]
    SubLeader,
    #[default]
    #[serde(alias = "Membro")]
    Member,
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hierarchy::Leader => write!(f, "Leader"),
            Hierarchy::SubLeader => write!(f, "Sub-Leader"),
            Hierarchy::Member => write!(f, "Member"),
        }
    }
}

impl FromStr for Hierarchy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leader" | "lider" => Ok(Hierarchy::Leader),
            "sub-leader" | "subleader" | "sub-lider" => Ok(Hierarchy::SubLeader),
            "member" | "membro" => Ok(Hierarchy::Member),
            _ => anyhow::bail!("Invalid hierarchy: {}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub full_name: String,
    /// Gang *name* (not id); gang membership is resolved by name match
    #[serde(default)]
    pub gang: String,
    #[serde(default)]
    pub hierarchy: Hierarchy,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub full_name: String,
    pub gang: String,
    pub hierarchy: Hierarchy,
    pub phone: String,
    pub attachments: Vec<Attachment>,
    pub vehicle_ids: Vec<String>,
    pub deep: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub full_name: Option<String>,
    pub gang: Option<String>,
    pub hierarchy: Option<Hierarchy>,
    pub phone: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
    pub vehicle_ids: Option<Vec<String>>,
    pub deep: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gang_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDraft {
    pub plate: String,
    pub model: String,
    pub attachments: Vec<Attachment>,
    pub owner_id: Option<String>,
    pub gang_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub plate: Option<String>,
    pub model: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
    pub owner_id: Option<Option<String>>,
    pub gang_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Gang {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub allied_gang_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GangDraft {
    pub name: String,
    pub description: String,
    pub color: Option<String>,
    pub allied_gang_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GangPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<Option<String>>,
    pub allied_gang_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Open => write!(f, "open"),
            CaseStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for CaseStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(CaseStatus::Open),
            "closed" => Ok(CaseStatus::Closed),
            _ => anyhow::bail!("Unknown case status: {} (expected open or closed)", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default)]
    pub gang_ids: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a new case; the status always starts as `Open`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub person_ids: Vec<String>,
    pub vehicle_ids: Vec<String>,
    pub gang_ids: Vec<String>,
    pub attachments: Vec<Attachment>,
}

/// Editable case fields. Status changes only through `AppStore::close_case`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CasePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub person_ids: Option<Vec<String>>,
    pub vehicle_ids: Option<Vec<String>>,
    pub gang_ids: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvestigationStatus {
    #[default]
    Active,
    Archived,
}

impl fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvestigationStatus::Active => write!(f, "active"),
            InvestigationStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for InvestigationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(InvestigationStatus::Active),
            "archived" => Ok(InvestigationStatus::Archived),
            _ => anyhow::bail!(
                "Unknown investigation status: {} (expected active or archived)",
                s
            ),
        }
    }
}

/// A labelled block of free text inside an investigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub label: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Investigation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: InvestigationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestigationDraft {
    pub title: String,
    pub sections: Vec<Section>,
    pub person_ids: Vec<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestigationPatch {
    pub title: Option<String>,
    pub sections: Option<Vec<Section>>,
    pub person_ids: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    #[default]
    #[serde(alias = "pendente")]
    Pending,
    #[serde(alias = "resolvido")]
    Resolved,
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargeStatus::Pending => write!(f, "pending"),
            ChargeStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl FromStr for ChargeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendente" => Ok(ChargeStatus::Pending),
            "resolved" | "resolvido" => Ok(ChargeStatus::Resolved),
            _ => anyhow::bail!("Invalid charge status: {}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gang_id: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub status: ChargeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeDraft {
    pub person_ids: Vec<String>,
    pub vehicle_ids: Vec<String>,
    pub gang_id: Option<String>,
    pub reason: String,
    pub status: ChargeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargePatch {
    pub person_ids: Option<Vec<String>>,
    pub vehicle_ids: Option<Vec<String>>,
    pub gang_id: Option<Option<String>>,
    pub reason: Option<String>,
    pub status: Option<ChargeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gang_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseDraft {
    pub name: String,
    pub description: String,
    pub gang_id: Option<String>,
    pub attachments: Vec<Attachment>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub gang_id: Option<Option<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default)]
    pub gang_ids: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Free-form date as entered by the investigator
    #[serde(default)]
    pub meeting_date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingDraft {
    pub title: String,
    pub description: String,
    pub person_ids: Vec<String>,
    pub vehicle_ids: Vec<String>,
    pub gang_ids: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub meeting_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub person_ids: Option<Vec<String>>,
    pub vehicle_ids: Option<Vec<String>>,
    pub gang_ids: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub meeting_date: Option<String>,
}

/// An infiltration dossier on a gang
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gang_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepDraft {
    pub title: String,
    pub description: String,
    pub person_ids: Vec<String>,
    pub gang_id: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub person_ids: Option<Vec<String>>,
    pub gang_id: Option<Option<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

/// One bid of an auction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuctionEntry {
    pub gang_id: String,
    pub item: String,
    pub amount: f64,
    /// Gear count paid on top of the amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gears: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<AuctionEntry>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Sum of every entry amount
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Sum of every entry's gears; entries without gears count as zero
    pub fn total_gears(&self) -> f64 {
        self.entries.iter().filter_map(|e| e.gears).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuctionDraft {
    pub title: String,
    pub description: String,
    pub entries: Vec<AuctionEntry>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuctionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub entries: Option<Vec<AuctionEntry>>,
    pub attachments: Option<Vec<Attachment>>,
}

/// A front business operated by a gang
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Facade {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gang_id: Option<String>,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadeDraft {
    pub name: String,
    pub description: String,
    pub gang_id: Option<String>,
    pub person_ids: Vec<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub gang_id: Option<Option<String>>,
    pub person_ids: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

/// Who did what to which record, and when
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub investigator_id: String,
    pub investigator_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Every collection of the application, as persisted and exported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default = "default_investigators")]
    pub investigators: Vec<Investigator>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub gangs: Vec<Gang>,
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub investigations: Vec<Investigation>,
    #[serde(default)]
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub bases: Vec<Base>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub deeps: Vec<Deep>,
    #[serde(default)]
    pub auctions: Vec<Auction>,
    #[serde(default)]
    pub facades: Vec<Facade>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_investigator: Option<String>,
}

impl AppData {
    /// Creates an empty store with the default investigator roster
    pub fn new() -> Self {
        Self {
            investigators: default_investigators(),
            people: Vec::new(),
            vehicles: Vec::new(),
            gangs: Vec::new(),
            cases: Vec::new(),
            investigations: Vec::new(),
            charges: Vec::new(),
            bases: Vec::new(),
            meetings: Vec::new(),
            deeps: Vec::new(),
            auctions: Vec::new(),
            facades: Vec::new(),
            activity_logs: Vec::new(),
            current_investigator: None,
        }
    }

    /// Repairs data loaded from older or foreign stores: reseeds an empty
    /// investigator roster and restores the newest-first, capped activity log.
    pub fn normalize(&mut self) {
        if self.investigators.is_empty() {
            self.investigators = default_investigators();
        }

        self.activity_logs.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| ids::numeric_part(&b.id).cmp(&ids::numeric_part(&a.id)))
        });
        self.activity_logs.truncate(ACTIVITY_LOG_CAPACITY);
    }

    pub fn get_investigator(&self, id: &str) -> Option<&Investigator> {
        self.investigators.iter().find(|i| i.id == id)
    }

    /// Number of records in a collection
    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Investigators => self.investigators.len(),
            Collection::People => self.people.len(),
            Collection::Vehicles => self.vehicles.len(),
            Collection::Gangs => self.gangs.len(),
            Collection::Cases => self.cases.len(),
            Collection::Investigations => self.investigations.len(),
            Collection::Charges => self.charges.len(),
            Collection::Bases => self.bases.len(),
            Collection::Meetings => self.meetings.len(),
            Collection::Deeps => self.deeps.len(),
            Collection::Auctions => self.auctions.len(),
            Collection::Facades => self.facades.len(),
            Collection::ActivityLogs => self.activity_logs.len(),
        }
    }
}

impl Default for AppData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_investigators() {
        let roster = default_investigators();
        assert_eq!(roster.len(), 10);
        assert_eq!(roster[0].id, "INV-01");
        assert_eq!(roster[0].name, "Hinata");
        assert_eq!(roster[9].id, "INV-10");
        assert_eq!(roster[9].name, "Lua");
    }

    #[test]
    fn test_collection_keys_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert!("nope".parse::<Collection>().is_err());
    }

    #[test]
    fn test_hierarchy_serde_accepts_legacy_names() {
        let leader: Hierarchy = serde_json::from_str("\"Lider\"").unwrap();
        assert_eq!(leader, Hierarchy::Leader);
        let sub: Hierarchy = serde_json::from_str("\"Sub-Lider\"").unwrap();
        assert_eq!(sub, Hierarchy::SubLeader);
        assert_eq!(serde_json::to_string(&Hierarchy::SubLeader).unwrap(), "\"Sub-Leader\"");
        assert!(Hierarchy::Leader < Hierarchy::SubLeader);
        assert!(Hierarchy::SubLeader < Hierarchy::Member);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("open".parse::<CaseStatus>().unwrap(), CaseStatus::Open);
        assert_eq!("Closed".parse::<CaseStatus>().unwrap(), CaseStatus::Closed);
        assert!("archived".parse::<CaseStatus>().is_err());

        assert_eq!(
            "active".parse::<InvestigationStatus>().unwrap(),
            InvestigationStatus::Active
        );
        assert_eq!(
            "ARCHIVED".parse::<InvestigationStatus>().unwrap(),
            InvestigationStatus::Archived
        );
        assert!("closed".parse::<InvestigationStatus>().is_err());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let data: AppData = serde_json::from_str(r#"{"people": []}"#).unwrap();
        assert_eq!(data.investigators.len(), 10);
        assert!(data.cases.is_empty());
        assert!(data.activity_logs.is_empty());
    }

    #[test]
    fn test_person_json_shape() {
        let json = r#"{
            "id": "P-01",
            "fullName": "Carl Johnson",
            "gang": "Grove",
            "hierarchy": "Membro",
            "phone": "555-010",
            "createdAt": "2024-05-01T12:00:00Z"
        }"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.full_name, "Carl Johnson");
        assert_eq!(person.hierarchy, Hierarchy::Member);
        assert!(person.vehicle_ids.is_empty());

        let value = serde_json::to_value(&person).unwrap();
        assert!(value.get("fullName").is_some());
        assert!(value.get("deep").is_none());
    }

    #[test]
    fn test_normalize_orders_and_caps_log() {
        let mut data = AppData::new();
        data.investigators.clear();
        let ts = Utc::now();
        for n in 1..=120u64 {
            data.activity_logs.push(ActivityLogEntry {
                id: ids::format_id("LOG", n),
                investigator_id: "INV-01".into(),
                investigator_name: "Hinata".into(),
                action: "created person".into(),
                entity_type: "Person".into(),
                entity_id: "P-01".into(),
                timestamp: ts,
            });
        }

        data.normalize();

        assert_eq!(data.investigators.len(), 10);
        assert_eq!(data.activity_logs.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(data.activity_logs[0].id, "LOG-120");
        assert_eq!(data.activity_logs[99].id, "LOG-21");
    }

    #[test]
    fn test_attachment_ids() {
        let first = Attachment::new(&[], "photo".into(), "https://x/1.png".into(), "image".into());
        assert_eq!(first.id, "ATT-01");
        let second = Attachment::new(&[first], "doc".into(), "https://x/2".into(), "file".into());
        assert_eq!(second.id, "ATT-02");
    }
}
