//! Read-only cross-reference lookups and dashboard figures

use crate::models::{
    AppData, Auction, Case, CaseStatus, ChargeStatus, Deep, Gang, InvestigationStatus, Meeting,
    Person, Vehicle,
};

pub fn person_by_id<'a>(data: &'a AppData, id: Option<&str>) -> Option<&'a Person> {
    let id = id?;
    data.people.iter().find(|p| p.id == id)
}

pub fn gang_by_id<'a>(data: &'a AppData, id: Option<&str>) -> Option<&'a Gang> {
    let id = id?;
    data.gangs.iter().find(|g| g.id == id)
}

pub fn vehicle_by_id<'a>(data: &'a AppData, id: &str) -> Option<&'a Vehicle> {
    data.vehicles.iter().find(|v| v.id == id)
}

/// People among `ids` that still exist; dangling ids are skipped
pub fn people_by_ids<'a>(
    data: &'a AppData,
    ids: &'a [String],
) -> impl Iterator<Item = &'a Person> + 'a {
    ids.iter()
        .filter_map(move |id| person_by_id(data, Some(id.as_str())))
}

/// Display name of a person reference, or a placeholder when it dangles
pub fn person_name<'a>(data: &'a AppData, id: &'a str) -> &'a str {
    person_by_id(data, Some(id))
        .map(|p| p.full_name.as_str())
        .unwrap_or("(unknown person)")
}

/// Display name of a gang reference, or a placeholder when it dangles
pub fn gang_name<'a>(data: &'a AppData, id: &'a str) -> &'a str {
    gang_by_id(data, Some(id))
        .map(|g| g.name.as_str())
        .unwrap_or("(unknown gang)")
}

/// Members of a gang, matched by gang *name*, leaders first
pub fn gang_members<'a>(data: &'a AppData, gang_id: &str) -> Vec<&'a Person> {
    let Some(gang) = gang_by_id(data, Some(gang_id)) else {
        return Vec::new();
    };

    let mut members: Vec<&Person> = data.people.iter().filter(|p| p.gang == gang.name).collect();
    members.sort_by_key(|p| p.hierarchy);
    members
}

/// Vehicles listed on a person; ids that no longer resolve are skipped
pub fn person_vehicles<'a>(data: &'a AppData, person_id: &str) -> Vec<&'a Vehicle> {
    person_by_id(data, Some(person_id))
        .map(|person| {
            person
                .vehicle_ids
                .iter()
                .filter_map(|id| vehicle_by_id(data, id))
                .collect()
        })
        .unwrap_or_default()
}

/// The records a case, meeting or other record points at. Every id keeps its
/// slot; `None` marks a dangling reference.
#[derive(Debug)]
pub struct References<'a> {
    pub people: Vec<(&'a str, Option<&'a Person>)>,
    pub vehicles: Vec<(&'a str, Option<&'a Vehicle>)>,
    pub gangs: Vec<(&'a str, Option<&'a Gang>)>,
}

fn resolve<'a>(
    data: &'a AppData,
    person_ids: &'a [String],
    vehicle_ids: &'a [String],
    gang_ids: &'a [String],
) -> References<'a> {
    References {
        people: person_ids
            .iter()
            .map(|id| (id.as_str(), person_by_id(data, Some(id.as_str()))))
            .collect(),
        vehicles: vehicle_ids
            .iter()
            .map(|id| (id.as_str(), vehicle_by_id(data, id)))
            .collect(),
        gangs: gang_ids
            .iter()
            .map(|id| (id.as_str(), gang_by_id(data, Some(id.as_str()))))
            .collect(),
    }
}

pub fn case_references<'a>(data: &'a AppData, case: &'a Case) -> References<'a> {
    resolve(data, &case.person_ids, &case.vehicle_ids, &case.gang_ids)
}

pub fn meeting_references<'a>(data: &'a AppData, meeting: &'a Meeting) -> References<'a> {
    resolve(data, &meeting.person_ids, &meeting.vehicle_ids, &meeting.gang_ids)
}

/// A deep points at people and at most one gang, never at vehicles
pub fn deep_references<'a>(data: &'a AppData, deep: &'a Deep) -> References<'a> {
    resolve(data, &deep.person_ids, &[], deep.gang_id.as_slice())
}

/// What one gang put into an auction
#[derive(Debug, Clone, PartialEq)]
pub struct GangTotal<'a> {
    pub gang_id: &'a str,
    pub amount: f64,
    pub gears: f64,
}

/// Per-gang amount and gear totals, in order of each gang's first entry
pub fn auction_totals_by_gang(auction: &Auction) -> Vec<GangTotal<'_>> {
    let mut totals: Vec<GangTotal> = Vec::new();
    for entry in &auction.entries {
        let gears = entry.gears.unwrap_or(0.0);
        match totals.iter_mut().find(|t| t.gang_id == entry.gang_id) {
            Some(total) => {
                total.amount += entry.amount;
                total.gears += gears;
            }
            None => totals.push(GangTotal {
                gang_id: &entry.gang_id,
                amount: entry.amount,
                gears,
            }),
        }
    }
    totals
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub open_cases: usize,
    pub closed_cases: usize,
    pub active_investigations: usize,
    pub archived_investigations: usize,
    pub people: usize,
    pub vehicles: usize,
    pub gangs: usize,
    pub bases: usize,
    pub pending_charges: usize,
}

pub fn stats(data: &AppData) -> Stats {
    Stats {
        open_cases: data
            .cases
            .iter()
            .filter(|c| c.status == CaseStatus::Open)
            .count(),
        closed_cases: data
            .cases
            .iter()
            .filter(|c| c.status == CaseStatus::Closed)
            .count(),
        active_investigations: data
            .investigations
            .iter()
            .filter(|i| i.status == InvestigationStatus::Active)
            .count(),
        archived_investigations: data
            .investigations
            .iter()
            .filter(|i| i.status == InvestigationStatus::Archived)
            .count(),
        people: data.people.len(),
        vehicles: data.vehicles.len(),
        gangs: data.gangs.len(),
        bases: data.bases.len(),
        pending_charges: data
            .charges
            .iter()
            .filter(|c| c.status == ChargeStatus::Pending)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuctionDraft, AuctionEntry, CaseDraft, DeepDraft, GangDraft, Hierarchy, PersonDraft,
        VehicleDraft,
    };
    use crate::store::AppStore;

    fn member(name: &str, gang: &str, hierarchy: Hierarchy) -> PersonDraft {
        PersonDraft {
            full_name: name.into(),
            gang: gang.into(),
            hierarchy,
            phone: "555-000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gang_members_ordered_by_hierarchy() {
        let mut store = AppStore::in_memory();
        store
            .create::<Gang>(GangDraft {
                name: "Ballas".into(),
                ..Default::default()
            })
            .unwrap();
        store.create::<Person>(member("Kane", "Ballas", Hierarchy::Member)).unwrap();
        store.create::<Person>(member("Big Bear", "Ballas", Hierarchy::SubLeader)).unwrap();
        store.create::<Person>(member("Carl", "Grove", Hierarchy::Leader)).unwrap();
        store.create::<Person>(member("Balla Boss", "Ballas", Hierarchy::Leader)).unwrap();

        let names: Vec<&str> = gang_members(store.data(), "G-01")
            .iter()
            .map(|p| p.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Balla Boss", "Big Bear", "Kane"]);
        assert!(gang_members(store.data(), "G-99").is_empty());
    }

    #[test]
    fn test_person_vehicles_skip_dangling() {
        let mut store = AppStore::in_memory();
        store
            .create::<Vehicle>(VehicleDraft {
                plate: "AAA111".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .create::<Person>(PersonDraft {
                vehicle_ids: vec!["V-01".into(), "V-07".into()],
                ..member("Carl", "Grove", Hierarchy::Member)
            })
            .unwrap();

        let vehicles = person_vehicles(store.data(), "P-01");
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].plate, "AAA111");
        assert!(person_vehicles(store.data(), "P-09").is_empty());
    }

    #[test]
    fn test_case_references_keep_dangling_slots() {
        let mut store = AppStore::in_memory();
        store.create::<Person>(member("Carl", "Grove", Hierarchy::Member)).unwrap();
        let case = store
            .create::<Case>(CaseDraft {
                title: "Bank job".into(),
                description: "Fleeca".into(),
                person_ids: vec!["P-01".into(), "P-05".into()],
                gang_ids: vec!["G-01".into()],
                ..Default::default()
            })
            .unwrap();

        let refs = case_references(store.data(), &case);
        assert_eq!(refs.people.len(), 2);
        assert!(refs.people[0].1.is_some());
        assert_eq!(refs.people[1], ("P-05", None));
        assert!(refs.gangs[0].1.is_none());
        assert_eq!(person_name(store.data(), "P-05"), "(unknown person)");
        assert_eq!(gang_name(store.data(), "G-01"), "(unknown gang)");
    }

    #[test]
    fn test_deep_references() {
        let mut store = AppStore::in_memory();
        store
            .create::<Gang>(GangDraft {
                name: "Vagos".into(),
                ..Default::default()
            })
            .unwrap();
        let deep = store
            .create::<Deep>(DeepDraft {
                title: "Inside the Vagos".into(),
                person_ids: vec!["P-03".into()],
                gang_id: Some("G-01".into()),
                ..Default::default()
            })
            .unwrap();

        let refs = deep_references(store.data(), &deep);
        assert!(refs.vehicles.is_empty());
        assert_eq!(refs.people, vec![("P-03", None)]);
        assert_eq!(refs.gangs.len(), 1);
        assert_eq!(refs.gangs[0].1.map(|g| g.name.as_str()), Some("Vagos"));
    }

    #[test]
    fn test_auction_totals_by_gang() {
        let mut store = AppStore::in_memory();
        let entry = |gang: &str, item: &str, amount: f64, gears: Option<f64>| AuctionEntry {
            gang_id: gang.into(),
            item: item.into(),
            amount,
            gears,
        };
        let auction = store
            .create::<Auction>(AuctionDraft {
                title: "Harbour lot".into(),
                entries: vec![
                    entry("G-02", "Rifle", 1000.0, Some(4.0)),
                    entry("G-01", "Vest", 250.0, None),
                    entry("G-02", "Ammo", 500.0, Some(1.0)),
                ],
                ..Default::default()
            })
            .unwrap();

        let totals = auction_totals_by_gang(&auction);
        assert_eq!(
            totals,
            vec![
                GangTotal {
                    gang_id: "G-02",
                    amount: 1500.0,
                    gears: 5.0,
                },
                GangTotal {
                    gang_id: "G-01",
                    amount: 250.0,
                    gears: 0.0,
                },
            ]
        );
        assert_eq!(auction.total(), 1750.0);
        assert_eq!(auction.total_gears(), 5.0);
    }

    #[test]
    fn test_stats() {
        let mut store = AppStore::in_memory();
        for title in ["One", "Two", "Three"] {
            store
                .create::<Case>(CaseDraft {
                    title: title.into(),
                    description: "x".into(),
                    ..Default::default()
                })
                .unwrap();
        }
        store.close_case("C-02", "solved").unwrap();
        store.create::<Person>(member("Carl", "Grove", Hierarchy::Member)).unwrap();

        let figures = stats(store.data());
        assert_eq!(figures.open_cases, 2);
        assert_eq!(figures.closed_cases, 1);
        assert_eq!(figures.people, 1);
        assert_eq!(figures.active_investigations, 0);
    }
}
