//! Case-insensitive substring search over the record lists
//!
//! A record matches when the query is contained in at least one of its
//! searchable fields. Some fields belong to other records (a vehicle's owner
//! name, a base's gang name); they are resolved against the current data at
//! query time.

use crate::models::{
    AppData, Auction, Base, Case, Charge, Deep, Facade, Gang, Investigation, Meeting, Person,
    Vehicle,
};
use crate::ids;
use crate::record::Record;
use crate::views;

/// A record that can be matched against a search query
pub trait Searchable {
    /// Text fields the query is matched against
    fn search_fields<'a>(&'a self, data: &'a AppData) -> Vec<&'a str>;
}

impl Searchable for Person {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        vec![self.full_name.as_str(), self.id.as_str(), self.phone.as_str(), self.gang.as_str()]
    }
}

impl Searchable for Vehicle {
    fn search_fields<'a>(&'a self, data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.plate.as_str(), self.model.as_str(), self.id.as_str()];
        if let Some(owner) = views::person_by_id(data, self.owner_id.as_deref()) {
            fields.push(&owner.full_name);
        }
        fields
    }
}

impl Searchable for Gang {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        vec![self.name.as_str(), self.description.as_str(), self.id.as_str()]
    }
}

impl Searchable for Case {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        vec![self.title.as_str(), self.description.as_str(), self.id.as_str()]
    }
}

impl Searchable for Investigation {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.title.as_str(), self.id.as_str()];
        fields.extend(self.sections.iter().map(|s| s.content.as_str()));
        fields
    }
}

impl Searchable for Charge {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        vec![self.reason.as_str(), self.id.as_str()]
    }
}

impl Searchable for Base {
    fn search_fields<'a>(&'a self, data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str(), self.id.as_str()];
        if let Some(gang) = views::gang_by_id(data, self.gang_id.as_deref()) {
            fields.push(&gang.name);
        }
        fields
    }
}

impl Searchable for Meeting {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        vec![self.title.as_str(), self.description.as_str(), self.id.as_str()]
    }
}

impl Searchable for Deep {
    fn search_fields<'a>(&'a self, data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str(), self.id.as_str()];
        if let Some(gang) = views::gang_by_id(data, self.gang_id.as_deref()) {
            fields.push(&gang.name);
        }
        fields.extend(
            views::people_by_ids(data, &self.person_ids).map(|p| p.full_name.as_str()),
        );
        fields
    }
}

impl Searchable for Auction {
    fn search_fields<'a>(&'a self, _data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.title.as_str(), self.id.as_str()];
        fields.extend(self.entries.iter().map(|e| e.item.as_str()));
        fields
    }
}

impl Searchable for Facade {
    fn search_fields<'a>(&'a self, data: &'a AppData) -> Vec<&'a str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str(), self.id.as_str()];
        if let Some(gang) = views::gang_by_id(data, self.gang_id.as_deref()) {
            fields.push(&gang.name);
        }
        fields.extend(
            views::people_by_ids(data, &self.person_ids).map(|p| p.full_name.as_str()),
        );
        fields
    }
}

/// True when the case-folded `query` occurs in any searchable field.
/// An empty query matches everything.
pub fn matches_query<R: Searchable>(record: &R, data: &AppData, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record
        .search_fields(data)
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Records of `records` matching `query`, in their original order
pub fn filter<'a, R: Searchable>(records: &'a [R], data: &AppData, query: &str) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| matches_query(*r, data, query))
        .collect()
}

/// Orders records by the number in their id, so `P-10` follows `P-09`
/// and remote inserts land where they belong
pub fn sort_by_id<R: Record>(records: &mut [&R]) {
    records.sort_by_key(|r| ids::numeric_part(r.id()));
}

/// Hits of a search across every record list
#[derive(Debug, Default)]
pub struct GlobalSearchResults<'a> {
    pub people: Vec<&'a Person>,
    pub vehicles: Vec<&'a Vehicle>,
    pub gangs: Vec<&'a Gang>,
    pub cases: Vec<&'a Case>,
    pub investigations: Vec<&'a Investigation>,
    pub charges: Vec<&'a Charge>,
    pub bases: Vec<&'a Base>,
    pub meetings: Vec<&'a Meeting>,
    pub deeps: Vec<&'a Deep>,
    pub auctions: Vec<&'a Auction>,
    pub facades: Vec<&'a Facade>,
}

impl GlobalSearchResults<'_> {
    pub fn total(&self) -> usize {
        self.people.len()
            + self.vehicles.len()
            + self.gangs.len()
            + self.cases.len()
            + self.investigations.len()
            + self.charges.len()
            + self.bases.len()
            + self.meetings.len()
            + self.deeps.len()
            + self.auctions.len()
            + self.facades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Searches every list with the trimmed query. A blank query finds nothing.
pub fn global_search<'a>(data: &'a AppData, query: &str) -> GlobalSearchResults<'a> {
    let query = query.trim();
    if query.is_empty() {
        return GlobalSearchResults::default();
    }

    GlobalSearchResults {
        people: filter(&data.people, data, query),
        vehicles: filter(&data.vehicles, data, query),
        gangs: filter(&data.gangs, data, query),
        cases: filter(&data.cases, data, query),
        investigations: filter(&data.investigations, data, query),
        charges: filter(&data.charges, data, query),
        bases: filter(&data.bases, data, query),
        meetings: filter(&data.meetings, data, query),
        deeps: filter(&data.deeps, data, query),
        auctions: filter(&data.auctions, data, query),
        facades: filter(&data.facades, data, query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GangDraft, PersonDraft, Section, VehicleDraft};
    use chrono::Utc;

    fn sample() -> AppData {
        let now = Utc::now();
        let mut data = AppData::new();
        data.gangs.push(Gang::from_draft(
            "G-01".into(),
            now,
            GangDraft {
                name: "Ballas".into(),
                description: "Purple crew from Davis".into(),
                ..Default::default()
            },
        ));
        data.people.push(Person::from_draft(
            "P-01".into(),
            now,
            PersonDraft {
                full_name: "Carl Johnson".into(),
                gang: "Grove".into(),
                phone: "555-010".into(),
                ..Default::default()
            },
        ));
        data.people.push(Person::from_draft(
            "P-02".into(),
            now,
            PersonDraft {
                full_name: "Franklin Clinton".into(),
                gang: "Families".into(),
                phone: "555-777".into(),
                ..Default::default()
            },
        ));
        data.vehicles.push(Vehicle::from_draft(
            "V-01".into(),
            now,
            VehicleDraft {
                plate: "GROVE1".into(),
                model: "Greenwood".into(),
                owner_id: Some("P-01".into()),
                ..Default::default()
            },
        ));
        data
    }

    #[test]
    fn test_filter_is_case_insensitive_or_across_fields() {
        let data = sample();

        let by_name = filter(&data.people, &data, "CARL");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "P-01");

        let by_phone = filter(&data.people, &data, "777");
        assert_eq!(by_phone[0].id, "P-02");

        let by_id = filter(&data.people, &data, "p-0");
        assert_eq!(by_id.len(), 2);

        assert!(filter(&data.people, &data, "nobody").is_empty());
    }

    #[test]
    fn test_sort_by_id_orders_remote_inserts() {
        let mut data = sample();
        // Remote upserts can land ahead of the local records
        for id in ["P-10", "P-03"] {
            data.people.insert(
                0,
                Person::from_draft(
                    id.into(),
                    Utc::now(),
                    PersonDraft {
                        full_name: format!("Remote {}", id),
                        gang: "Grove".into(),
                        phone: "555-000".into(),
                        ..Default::default()
                    },
                ),
            );
        }

        let mut people = filter(&data.people, &data, "");
        sort_by_id(&mut people);
        let ids: Vec<&str> = people.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P-01", "P-02", "P-03", "P-10"]);
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let data = sample();
        assert_eq!(filter(&data.people, &data, "").len(), 2);
    }

    #[test]
    fn test_filter_does_not_trim() {
        let data = sample();
        assert!(filter(&data.people, &data, " Carl Johnson ").is_empty());
    }

    #[test]
    fn test_foreign_fields_are_resolved() {
        let mut data = sample();
        let hits = filter(&data.vehicles, &data, "johnson");
        assert_eq!(hits.len(), 1);

        // dangling owner: nothing to match against
        data.people.clear();
        assert!(filter(&data.vehicles, &data, "johnson").is_empty());
    }

    #[test]
    fn test_investigation_sections_are_searched() {
        let mut data = sample();
        data.investigations.push(Investigation::from_draft(
            "I-01".into(),
            Utc::now(),
            crate::models::InvestigationDraft {
                title: "Arms".into(),
                sections: vec![Section {
                    label: "Leads".into(),
                    content: "Warehouse near the docks".into(),
                }],
                ..Default::default()
            },
        ));

        assert_eq!(filter(&data.investigations, &data, "DOCKS").len(), 1);
    }

    #[test]
    fn test_global_search() {
        let data = sample();

        let results = global_search(&data, "  grove ");
        assert_eq!(results.people.len(), 1);
        assert_eq!(results.vehicles.len(), 1);
        assert!(results.gangs.is_empty());
        assert_eq!(results.total(), 2);

        assert!(global_search(&data, "   ").is_empty());
    }
}
