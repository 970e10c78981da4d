use anyhow::Result;
use inquire::{Confirm, Select, Text};

use dossier_core::{format_phone, CaseDraft, Hierarchy, Investigator, PersonDraft};

/// Prompts the user to pick the acting investigator
pub fn prompt_select_investigator(roster: &[Investigator]) -> Result<String> {
    if roster.is_empty() {
        anyhow::bail!("The investigator roster is empty");
    }

    let options: Vec<String> = roster
        .iter()
        .map(|i| format!("{} {}", i.id, i.name))
        .collect();

    let selection = Select::new("Who is investigating?", options).prompt()?;

    // The id is everything before the first space
    let id = selection.split(' ').next().unwrap_or_default();
    Ok(id.to_string())
}

/// Asks before a record is removed
pub fn confirm_delete(what: &str) -> Result<bool> {
    let confirm = Confirm::new(&format!("Delete {}? This cannot be undone.", what))
        .with_default(false)
        .prompt()?;
    Ok(confirm)
}

pub fn confirm_import(records: usize) -> Result<bool> {
    let confirm = Confirm::new(&format!(
        "Replace the current store with the backup ({} records)?",
        records
    ))
    .with_default(false)
    .prompt()?;
    Ok(confirm)
}

/// Prompts for the reason a case is closed or an investigation archived
pub fn prompt_reason(what: &str) -> Result<String> {
    let reason = Text::new(&format!("Why is {} being closed?", what)).prompt()?;
    Ok(reason)
}

/// Prompts the user for a new person
pub fn prompt_new_person() -> Result<PersonDraft> {
    let full_name = Text::new("Full name:").prompt()?;
    let gang = Text::new("Gang name:").prompt()?;

    let hierarchy_options = vec![Hierarchy::Member, Hierarchy::SubLeader, Hierarchy::Leader];
    let hierarchy = Select::new("Hierarchy:", hierarchy_options).prompt()?;

    let phone = Text::new("Phone (NNN-NNN):").prompt()?;

    let vehicles = Text::new("Vehicle ids, comma separated:").prompt()?;
    let vehicle_ids = vehicles
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(PersonDraft {
        full_name,
        gang,
        hierarchy,
        phone: format_phone(&phone),
        vehicle_ids,
        ..Default::default()
    })
}

/// Prompts the user for a new case
pub fn prompt_new_case() -> Result<CaseDraft> {
    let title = Text::new("Title:").prompt()?;

    // Use the Editor type for multiline input
    let description = inquire::Editor::new("Description:").prompt()?;

    let split = |s: String| -> Vec<String> {
        s.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let person_ids = split(Text::new("Person ids, comma separated:").prompt()?);
    let vehicle_ids = split(Text::new("Vehicle ids, comma separated:").prompt()?);
    let gang_ids = split(Text::new("Gang ids, comma separated:").prompt()?);

    Ok(CaseDraft {
        title,
        description,
        person_ids,
        vehicle_ids,
        gang_ids,
        ..Default::default()
    })
}
