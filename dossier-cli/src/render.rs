use colored::{ColoredString, Colorize};

use dossier_core::views;
use dossier_core::{
    ActivityLogEntry, AppData, Attachment, Auction, Base, Case, CaseStatus, Charge, ChargeStatus,
    Deep, Facade, Gang, Investigation, InvestigationStatus, Meeting, Person, Record, Vehicle,
};

/// How a record is printed by `list` and `show`
pub trait Render: Record {
    /// One-line summary used in lists
    fn headline(&self, data: &AppData) -> String;

    /// Labelled fields for the detail view
    fn details(&self, data: &AppData) -> Vec<(&'static str, String)>;

    fn status(&self) -> Option<ColoredString> {
        None
    }

    fn attachments(&self) -> &[Attachment] {
        &[]
    }
}

fn join(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn people(data: &AppData, ids: &[String]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| format!("{} ({})", views::person_name(data, id), id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn gang(data: &AppData, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{} ({})", views::gang_name(data, id), id),
        None => "-".to_string(),
    }
}

fn gangs(data: &AppData, ids: &[String]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| gang(data, Some(id.as_str())))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn case_status(status: CaseStatus) -> ColoredString {
    match status {
        CaseStatus::Open => "open".green(),
        CaseStatus::Closed => "closed".red(),
    }
}

pub fn investigation_status(status: InvestigationStatus) -> ColoredString {
    match status {
        InvestigationStatus::Active => "active".green(),
        InvestigationStatus::Archived => "archived".yellow(),
    }
}

pub fn charge_status(status: ChargeStatus) -> ColoredString {
    match status {
        ChargeStatus::Pending => "pending".yellow(),
        ChargeStatus::Resolved => "resolved".green(),
    }
}

impl Render for Person {
    fn headline(&self, _data: &AppData) -> String {
        format!("{} [{} / {}] {}", self.full_name, or_dash(&self.gang), self.hierarchy, self.phone)
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let vehicles = views::person_vehicles(data, &self.id)
            .iter()
            .map(|v| format!("{} {} ({})", v.plate, v.model, v.id))
            .collect::<Vec<_>>();
        vec![
            ("Name", self.full_name.clone()),
            ("Gang", or_dash(&self.gang)),
            ("Hierarchy", self.hierarchy.to_string()),
            ("Phone", self.phone.clone()),
            ("Vehicle ids", join(&self.vehicle_ids)),
            ("Vehicles", if vehicles.is_empty() { "-".into() } else { vehicles.join(", ") }),
            ("Deep", self.deep.clone().unwrap_or_else(|| "-".into())),
        ]
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Vehicle {
    fn headline(&self, data: &AppData) -> String {
        let owner = views::person_by_id(data, self.owner_id.as_deref())
            .map(|p| p.full_name.as_str())
            .unwrap_or("-");
        format!("{} {} (owner: {})", self.plate, or_dash(&self.model), owner)
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let owner = match &self.owner_id {
            Some(id) => people(data, std::slice::from_ref(id)),
            None => "-".to_string(),
        };
        vec![
            ("Plate", self.plate.clone()),
            ("Model", or_dash(&self.model)),
            ("Owner", owner),
            ("Gang", gang(data, self.gang_id.as_deref())),
        ]
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Gang {
    fn headline(&self, data: &AppData) -> String {
        let members = views::gang_members(data, &self.id).len();
        format!("{} ({} members)", self.name, members)
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let members = views::gang_members(data, &self.id)
            .iter()
            .map(|p| format!("{} ({}, {})", p.full_name, p.hierarchy, p.id))
            .collect::<Vec<_>>();
        vec![
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Color", self.color.clone().unwrap_or_else(|| "-".into())),
            ("Allies", gangs(data, &self.allied_gang_ids)),
            ("Members", if members.is_empty() { "-".into() } else { members.join(", ") }),
        ]
    }
}

impl Render for Case {
    fn headline(&self, _data: &AppData) -> String {
        self.title.clone()
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let refs = views::case_references(data, self);
        let vehicles = refs
            .vehicles
            .iter()
            .map(|(id, v)| match v {
                Some(v) => format!("{} ({})", v.plate, id),
                None => format!("(unknown vehicle) ({})", id),
            })
            .collect::<Vec<_>>();
        let mut details = vec![
            ("Title", self.title.clone()),
            ("Description", or_dash(&self.description)),
            ("People", people(data, &self.person_ids)),
            ("Vehicles", if vehicles.is_empty() { "-".into() } else { vehicles.join(", ") }),
            ("Gangs", gangs(data, &self.gang_ids)),
        ];
        if let Some(reason) = &self.closed_reason {
            details.push(("Closed because", reason.clone()));
        }
        if let Some(at) = self.closed_at {
            details.push(("Closed at", at.format("%Y-%m-%d %H:%M").to_string()));
        }
        details
    }

    fn status(&self) -> Option<ColoredString> {
        Some(case_status(self.status))
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Investigation {
    fn headline(&self, _data: &AppData) -> String {
        format!("{} ({} sections)", self.title, self.sections.len())
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let mut details = vec![
            ("Title", self.title.clone()),
            ("People", people(data, &self.person_ids)),
        ];
        for section in &self.sections {
            details.push(("Section", format!("{}: {}", section.label, section.content)));
        }
        if let Some(reason) = &self.closed_reason {
            details.push(("Archived because", reason.clone()));
        }
        details
    }

    fn status(&self) -> Option<ColoredString> {
        Some(investigation_status(self.status))
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Charge {
    fn headline(&self, _data: &AppData) -> String {
        format!("{} ({} people)", self.reason, self.person_ids.len())
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        vec![
            ("Reason", self.reason.clone()),
            ("People", people(data, &self.person_ids)),
            ("Vehicles", join(&self.vehicle_ids)),
            ("Gang", gang(data, self.gang_id.as_deref())),
        ]
    }

    fn status(&self) -> Option<ColoredString> {
        Some(charge_status(self.status))
    }
}

impl Render for Base {
    fn headline(&self, data: &AppData) -> String {
        format!("{} [{}]", self.name, gang(data, self.gang_id.as_deref()))
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let mut details = vec![
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Gang", gang(data, self.gang_id.as_deref())),
        ];
        for (key, value) in &self.metadata {
            details.push(("Detail", format!("{}: {}", key, value)));
        }
        details
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Meeting {
    fn headline(&self, _data: &AppData) -> String {
        format!("{} ({})", self.title, or_dash(&self.meeting_date))
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let refs = views::meeting_references(data, self);
        let vehicles = refs
            .vehicles
            .iter()
            .map(|(id, v)| match v {
                Some(v) => format!("{} ({})", v.plate, id),
                None => format!("(unknown vehicle) ({})", id),
            })
            .collect::<Vec<_>>();
        vec![
            ("Title", self.title.clone()),
            ("Date", or_dash(&self.meeting_date)),
            ("Description", or_dash(&self.description)),
            ("People", people(data, &self.person_ids)),
            ("Vehicles", if vehicles.is_empty() { "-".into() } else { vehicles.join(", ") }),
            ("Gangs", gangs(data, &self.gang_ids)),
        ]
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Deep {
    fn headline(&self, data: &AppData) -> String {
        format!("{} [{}]", self.title, gang(data, self.gang_id.as_deref()))
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let refs = views::deep_references(data, self);
        let infiltrated = refs
            .people
            .iter()
            .map(|(id, p)| match p {
                Some(p) => format!("{} ({})", p.full_name, id),
                None => format!("(unknown person) ({})", id),
            })
            .collect::<Vec<_>>();
        vec![
            ("Title", self.title.clone()),
            ("Description", or_dash(&self.description)),
            ("Gang", gang(data, self.gang_id.as_deref())),
            ("Infiltrated", if infiltrated.is_empty() { "-".into() } else { infiltrated.join(", ") }),
        ]
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Auction {
    fn headline(&self, _data: &AppData) -> String {
        format!("{} ({} entries, total {:.2})", self.title, self.entries.len(), self.total())
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        let mut details = vec![
            ("Title", self.title.clone()),
            ("Description", or_dash(&self.description)),
        ];
        for entry in &self.entries {
            let gears = entry
                .gears
                .map(|g| format!(" + {} gears", g))
                .unwrap_or_default();
            details.push((
                "Entry",
                format!(
                    "{} - {} - {:.2}{}",
                    gang(data, Some(entry.gang_id.as_str())),
                    entry.item,
                    entry.amount,
                    gears
                ),
            ));
        }
        for total in views::auction_totals_by_gang(self) {
            details.push((
                "Gang total",
                format!(
                    "{} - {:.2} + {} gears",
                    gang(data, Some(total.gang_id)),
                    total.amount,
                    total.gears
                ),
            ));
        }
        details.push(("Total", format!("{:.2}", self.total())));
        details.push(("Total gears", self.total_gears().to_string()));
        details
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Render for Facade {
    fn headline(&self, data: &AppData) -> String {
        format!("{} [{}]", self.name, gang(data, self.gang_id.as_deref()))
    }

    fn details(&self, data: &AppData) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Gang", gang(data, self.gang_id.as_deref())),
            ("People", people(data, &self.person_ids)),
        ]
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

pub fn print_row<R: Render>(record: &R, data: &AppData) {
    match record.status() {
        Some(status) => println!(
            "{:<8} {:<10} {}",
            record.id().cyan(),
            status,
            record.headline(data)
        ),
        None => println!("{:<8} {}", record.id().cyan(), record.headline(data)),
    }
}

pub fn print_details<R: Render>(record: &R, data: &AppData) {
    println!("{} {}", R::ENTITY_TYPE.bold(), record.id().cyan().bold());
    if let Some(status) = record.status() {
        println!("  {:<16} {}", "Status:", status);
    }
    for (label, value) in record.details(data) {
        println!("  {:<16} {}", format!("{}:", label), value);
    }
    println!(
        "  {:<16} {}",
        "Created:",
        record.created_at().format("%Y-%m-%d %H:%M")
    );

    let attachments = record.attachments();
    if !attachments.is_empty() {
        println!("  {}", "Attachments:".bold());
        for a in attachments {
            println!("    {} {} [{}] {}", a.id, a.name, a.kind, a.url.blue());
        }
    }
}

pub fn print_log_entry(entry: &ActivityLogEntry) {
    println!(
        "{} {:<8} {} {} {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.id.dimmed(),
        entry.investigator_name.bold(),
        entry.action,
        entry.entity_id.cyan()
    );
}
