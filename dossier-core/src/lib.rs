pub mod activity;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod export;
pub mod ids;
pub mod models;
pub mod project;
pub mod record;
pub mod search;
pub mod storage;
pub mod store;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use activity::Action;
pub use config::{get_config_path, Config};
pub use db::{create_backend, BackendType, DatabaseBackend};
pub use error::StoreError;
pub use events::{ChangeKind, RemoteChange, StoreEvent};
pub use models::{
    ActivityLogEntry, AppData, Attachment, Auction, AuctionDraft, AuctionEntry, AuctionPatch, Base,
    BaseDraft, BasePatch, Case, CaseDraft, CasePatch, CaseStatus, Charge, ChargeDraft, ChargePatch,
    ChargeStatus, Collection, Deep, DeepDraft, DeepPatch, Facade, FacadeDraft, FacadePatch, Gang,
    GangDraft, GangPatch, Hierarchy, Investigation, InvestigationDraft, InvestigationPatch,
    InvestigationStatus, Investigator, Meeting, MeetingDraft, MeetingPatch, Person, PersonDraft,
    PersonPatch, Section, Vehicle, VehicleDraft, VehiclePatch, ACTIVITY_LOG_CAPACITY,
};
pub use project::determine_data_path;
pub use record::Record;
pub use search::{filter, global_search, sort_by_id, Searchable};
pub use storage::Storage;
pub use store::{AppStore, StoreResult};
pub use validation::{format_phone, format_plate, ValidationError};
