mod cli;
mod prompts;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dossier_core::db::copy_store;
use dossier_core::export::{backup_file_name, parse_backup};
use dossier_core::views;
use dossier_core::{
    create_backend, determine_data_path, filter, format_phone, format_plate, get_config_path,
    global_search, sort_by_id, AppData, AppStore, Attachment, Auction, AuctionDraft,
    AuctionEntry, AuctionPatch, BackendType, Base, BaseDraft, BasePatch, Case, CaseDraft,
    CasePatch, CaseStatus, Charge, ChargeDraft, ChargePatch, ChargeStatus, Collection, Config,
    Deep, DeepDraft, DeepPatch, Facade, FacadeDraft, FacadePatch, Gang, GangDraft, GangPatch,
    Hierarchy, Investigation, InvestigationDraft, InvestigationPatch, InvestigationStatus,
    Meeting, MeetingDraft, MeetingPatch, Person, PersonDraft, PersonPatch, Record, Searchable,
    Section, Vehicle, VehicleDraft, VehiclePatch,
};

use crate::cli::{
    AttachArgs, AuctionCommand, AuctionFields, BaseCommand, BaseFields, CaseCommand, CaseFields,
    ChargeCommand, ChargeFields, Cli, Command, DeepCommand, DeepFields, FacadeCommand,
    FacadeFields, GangCommand, GangFields, InvestigationCommand, InvestigationFields,
    InvestigatorCommand, MeetingCommand, MeetingFields, PersonCommand, PersonFields,
    VehicleCommand, VehicleFields,
};
use crate::render::{print_details, print_log_entry, print_row, Render};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load(get_config_path()?)?;

    // Determine which store file to use
    let data_path = determine_data_path(cli.file.as_deref())?;
    let backend_type = match &cli.backend {
        Some(name) => Some(name.parse::<BackendType>()?),
        None => config.backend_type()?,
    };

    let backend = create_backend(&data_path, backend_type)
        .with_context(|| format!("Failed to open store at {:?}", data_path))?;
    let mut store = AppStore::open(backend)?;

    let session_command = matches!(cli.command, Command::Login { .. } | Command::Logout);
    if !session_command && store.current_investigator().is_none() {
        if let Some(id) = &config.investigator {
            if let Err(e) = store.set_current_investigator(id) {
                log::warn!("Ignoring default investigator from config: {}", e);
            }
        }
    }

    match &cli.command {
        Command::Login { investigator } => login(&mut store, investigator.as_deref())?,
        Command::Logout => {
            store.logout()?;
            println!("{}", "Logged out.".green());
        }
        Command::Whoami => match store.current_investigator() {
            Some(inv) => println!("{} {}", inv.id.cyan(), inv.name.bold()),
            None => println!("{}", "Not logged in.".yellow()),
        },
        Command::Investigator(cmd) => handle_investigator_command(cmd, &mut store)?,
        Command::Person(cmd) => handle_person_command(cmd, &mut store)?,
        Command::Vehicle(cmd) => handle_vehicle_command(cmd, &mut store)?,
        Command::Gang(cmd) => handle_gang_command(cmd, &mut store)?,
        Command::Case(cmd) => handle_case_command(cmd, &mut store)?,
        Command::Investigation(cmd) => handle_investigation_command(cmd, &mut store)?,
        Command::Charge(cmd) => handle_charge_command(cmd, &mut store)?,
        Command::Base(cmd) => handle_base_command(cmd, &mut store)?,
        Command::Meeting(cmd) => handle_meeting_command(cmd, &mut store)?,
        Command::Deep(cmd) => handle_deep_command(cmd, &mut store)?,
        Command::Auction(cmd) => handle_auction_command(cmd, &mut store)?,
        Command::Facade(cmd) => handle_facade_command(cmd, &mut store)?,
        Command::Search { query } => search(&store, query),
        Command::Log { limit } => {
            let entries = store.activity_log();
            if entries.is_empty() {
                println!("{}", "No activity recorded.".yellow());
            }
            for entry in entries.iter().take(*limit) {
                print_log_entry(entry);
            }
        }
        Command::Stats => print_stats(store.data()),
        Command::Export { output } => export(&store, output.as_deref())?,
        Command::Import { input, yes } => import(&mut store, input, *yes)?,
        Command::Migrate { target, to_backend } => {
            migrate(&store, &data_path, target, to_backend.as_deref())?
        }
    }

    Ok(())
}

fn login(store: &mut AppStore, who: Option<&str>) -> Result<()> {
    let id = match who {
        Some(who) => store
            .data()
            .investigators
            .iter()
            .find(|i| i.id.eq_ignore_ascii_case(who) || i.name.eq_ignore_ascii_case(who))
            .map(|i| i.id.clone())
            .unwrap_or_else(|| who.to_string()),
        None => prompts::prompt_select_investigator(&store.data().investigators)?,
    };

    store.set_current_investigator(&id)?;
    if let Some(inv) = store.current_investigator() {
        println!(
            "{} Logged in as {} ({}).",
            "✓".green(),
            inv.name.bold(),
            inv.id.cyan()
        );
    }
    Ok(())
}

fn handle_investigator_command(cmd: &InvestigatorCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        InvestigatorCommand::List => {
            let current = store.data().current_investigator.clone();
            for inv in &store.data().investigators {
                let marker = if current.as_deref() == Some(inv.id.as_str()) {
                    "*".green()
                } else {
                    " ".normal()
                };
                println!("{} {:<8} {}", marker, inv.id.cyan(), inv.name);
            }
        }
        InvestigatorCommand::Add { name } => {
            let inv = store.add_investigator(name)?;
            println!(
                "{} Investigator '{}' added as {}.",
                "✓".green(),
                inv.name,
                inv.id.cyan()
            );
        }
    }
    Ok(())
}

// Generic record helpers

fn not_found<R: Record>(id: &str) -> String {
    format!("{} {} not found", R::ENTITY_TYPE, id)
}

fn add_record<R: Render>(store: &mut AppStore, draft: R::Draft) -> Result<()> {
    if store.current_investigator().is_none() {
        log::warn!("No investigator logged in; the change will not be logged");
    }

    let record = store.create::<R>(draft)?;
    println!(
        "{} {} {} created successfully.",
        "✓".green(),
        R::ENTITY_TYPE,
        record.id().cyan()
    );
    Ok(())
}

/// Records matching the query and `keep`, ordered by id
fn listed_records<'a, R: Render + Searchable>(
    store: &'a AppStore,
    query: Option<&str>,
    keep: impl Fn(&R) -> bool,
) -> Vec<&'a R> {
    let mut records = filter(store.list::<R>(), store.data(), query.unwrap_or(""));
    records.retain(|&r| keep(r));
    sort_by_id(&mut records);
    records
}

fn list_records<R: Render + Searchable>(
    store: &AppStore,
    query: Option<&str>,
    keep: impl Fn(&R) -> bool,
) {
    let data = store.data();
    let records = listed_records(store, query, keep);

    if records.is_empty() {
        println!("{}", format!("No {} records found.", R::NOUN).yellow());
        return;
    }

    for record in records {
        print_row(record, data);
    }
}

fn show_record<'a, R: Render>(store: &'a AppStore, id: &str) -> Result<&'a R> {
    let record = store
        .get::<R>(id)
        .with_context(|| not_found::<R>(id))?;
    print_details(record, store.data());
    Ok(record)
}

/// Builds the patch from the stored record, then applies it
fn edit_record<R: Render>(
    store: &mut AppStore,
    id: &str,
    make_patch: impl FnOnce(&R) -> Result<R::Patch>,
) -> Result<()> {
    let existing = store
        .get::<R>(id)
        .with_context(|| not_found::<R>(id))?;
    let patch = make_patch(existing)?;

    let updated = store
        .update::<R>(id, patch)?
        .with_context(|| not_found::<R>(id))?;
    println!(
        "{} {} {} updated successfully.",
        "✓".green(),
        R::ENTITY_TYPE,
        updated.id().cyan()
    );
    Ok(())
}

fn delete_record<R: Render>(store: &mut AppStore, id: &str, skip_confirm: bool) -> Result<()> {
    let record = store
        .get::<R>(id)
        .with_context(|| not_found::<R>(id))?;

    println!("{}", format!("{} to delete:", R::ENTITY_TYPE).yellow());
    print_row(record, store.data());

    // Confirm deletion unless --yes flag is used
    if !skip_confirm && !prompts::confirm_delete(&format!("{} {}", R::NOUN, id))? {
        println!("{}", "Deletion cancelled.".yellow());
        return Ok(());
    }

    store.delete::<R>(id)?;
    println!("{}", format!("{} deleted successfully!", R::ENTITY_TYPE).green());
    Ok(())
}

// Field parsing

/// Trims comma separated ids and drops empty ones
fn ids(values: &Option<Vec<String>>) -> Option<Vec<String>> {
    values.as_ref().map(|v| {
        v.iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

/// `--clear-x` wins over a value; neither leaves the field untouched
fn optional(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

/// Appends the `--attach NAME=URL` attachments to `existing`
fn parse_attachments(existing: &[Attachment], args: &AttachArgs) -> Result<Vec<Attachment>> {
    let mut attachments = existing.to_vec();
    for raw in &args.attach {
        let (name, url) = raw
            .split_once('=')
            .with_context(|| format!("Invalid attachment '{}', expected NAME=URL", raw))?;
        let attachment = Attachment::new(
            &attachments,
            name.trim().to_string(),
            url.trim().to_string(),
            args.attach_type.clone(),
        );
        attachments.push(attachment);
    }
    Ok(attachments)
}

fn added_attachments(existing: &[Attachment], args: &AttachArgs) -> Result<Option<Vec<Attachment>>> {
    if args.attach.is_empty() {
        return Ok(None);
    }
    parse_attachments(existing, args).map(Some)
}

fn parse_sections(values: &[String]) -> Result<Vec<Section>> {
    values
        .iter()
        .map(|raw| {
            let (label, content) = raw
                .split_once('=')
                .with_context(|| format!("Invalid section '{}', expected LABEL=CONTENT", raw))?;
            Ok(Section {
                label: label.trim().to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

fn parse_metadata(values: &[String]) -> Result<BTreeMap<String, String>> {
    values
        .iter()
        .map(|raw| {
            let (key, value) = raw
                .split_once('=')
                .with_context(|| format!("Invalid metadata '{}', expected KEY=VALUE", raw))?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses `GANG_ID:ITEM:AMOUNT` with an optional trailing `:GEARS`
fn parse_entries(values: &[String]) -> Result<Vec<AuctionEntry>> {
    values
        .iter()
        .map(|raw| {
            let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
            let (gang_id, item, amount, gears) = match parts.as_slice() {
                [gang_id, item, amount] => (*gang_id, *item, *amount, None),
                [gang_id, item, amount, gears] => (*gang_id, *item, *amount, Some(*gears)),
                _ => anyhow::bail!(
                    "Invalid entry '{}', expected GANG_ID:ITEM:AMOUNT[:GEARS]",
                    raw
                ),
            };
            let amount = amount
                .parse::<f64>()
                .with_context(|| format!("Invalid amount '{}'", amount))?;
            let gears = gears
                .map(|g| {
                    g.parse::<f64>()
                        .with_context(|| format!("Invalid gears '{}'", g))
                })
                .transpose()?;
            Ok(AuctionEntry {
                gang_id: gang_id.to_string(),
                item: item.to_string(),
                amount,
                gears,
            })
        })
        .collect()
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

// People

fn person_draft(fields: &PersonFields) -> Result<PersonDraft> {
    Ok(PersonDraft {
        full_name: fields.name.clone().unwrap_or_default(),
        gang: fields.gang.clone().unwrap_or_default(),
        hierarchy: fields
            .hierarchy
            .as_deref()
            .map(str::parse::<Hierarchy>)
            .transpose()?
            .unwrap_or_default(),
        phone: fields.phone.as_deref().map(format_phone).unwrap_or_default(),
        attachments: parse_attachments(&[], &fields.attachments)?,
        vehicle_ids: ids(&fields.vehicles).unwrap_or_default(),
        deep: if fields.clear_deep { None } else { fields.deep.clone() },
    })
}

fn person_patch(person: &Person, fields: &PersonFields) -> Result<PersonPatch> {
    Ok(PersonPatch {
        full_name: fields.name.clone(),
        gang: fields.gang.clone(),
        hierarchy: fields
            .hierarchy
            .as_deref()
            .map(str::parse::<Hierarchy>)
            .transpose()?,
        phone: fields.phone.as_deref().map(format_phone),
        attachments: added_attachments(&person.attachments, &fields.attachments)?,
        vehicle_ids: ids(&fields.vehicles),
        deep: optional(&fields.deep, fields.clear_deep),
    })
}

fn handle_person_command(cmd: &PersonCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        PersonCommand::Add {
            fields,
            interactive,
        } => {
            let draft = if *interactive || fields.name.is_none() {
                prompts::prompt_new_person()?
            } else {
                person_draft(fields)?
            };
            add_record::<Person>(store, draft)?;
        }
        PersonCommand::List { query, gang } => {
            list_records::<Person>(store, query.as_deref(), |p| {
                gang.as_deref()
                    .map_or(true, |g| p.gang.eq_ignore_ascii_case(g.trim()))
            })
        }
        PersonCommand::Show { id } => {
            show_record::<Person>(store, id)?;
        }
        PersonCommand::Edit { id, fields } => {
            edit_record::<Person>(store, id, |p| person_patch(p, fields))?
        }
        PersonCommand::Delete { id, yes } => delete_record::<Person>(store, id, *yes)?,
        PersonCommand::Vehicles { id } => {
            let data = store.data();
            let person = store
                .get::<Person>(id)
                .with_context(|| not_found::<Person>(id))?;
            let vehicles = views::person_vehicles(data, &person.id);
            if vehicles.is_empty() {
                println!("{}", format!("{} has no vehicles.", person.full_name).yellow());
            }
            for vehicle in vehicles {
                print_row(vehicle, data);
            }
        }
    }
    Ok(())
}

// Vehicles

fn handle_vehicle_command(cmd: &VehicleCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        VehicleCommand::Add { fields } => {
            let draft = vehicle_draft(fields)?;
            add_record::<Vehicle>(store, draft)?;
        }
        VehicleCommand::List { query } => {
            list_records::<Vehicle>(store, query.as_deref(), |_| true)
        }
        VehicleCommand::Show { id } => {
            show_record::<Vehicle>(store, id)?;
        }
        VehicleCommand::Edit { id, fields } => {
            edit_record::<Vehicle>(store, id, |v| {
                Ok(VehiclePatch {
                    plate: fields.plate.as_deref().map(format_plate),
                    model: fields.model.clone(),
                    attachments: added_attachments(&v.attachments, &fields.attachments)?,
                    owner_id: optional(&fields.owner, fields.clear_owner),
                    gang_id: optional(&fields.gang, fields.clear_gang),
                })
            })?
        }
        VehicleCommand::Delete { id, yes } => delete_record::<Vehicle>(store, id, *yes)?,
    }
    Ok(())
}

fn vehicle_draft(fields: &VehicleFields) -> Result<VehicleDraft> {
    Ok(VehicleDraft {
        plate: fields.plate.as_deref().map(format_plate).unwrap_or_default(),
        model: fields.model.clone().unwrap_or_default(),
        attachments: parse_attachments(&[], &fields.attachments)?,
        owner_id: fields.owner.clone(),
        gang_id: fields.gang.clone(),
    })
}

// Gangs

fn handle_gang_command(cmd: &GangCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        GangCommand::Add { fields } => {
            add_record::<Gang>(store, gang_draft(fields))?;
        }
        GangCommand::List { query } => {
            list_records::<Gang>(store, query.as_deref(), |_| true)
        }
        GangCommand::Show { id } => {
            let gang = show_record::<Gang>(store, id)?;
            print_members(store.data(), gang);
        }
        GangCommand::Edit { id, fields } => edit_record::<Gang>(store, id, |_| {
            Ok(GangPatch {
                name: fields.name.clone(),
                description: fields.description.clone(),
                color: optional(&fields.color, fields.clear_color),
                allied_gang_ids: ids(&fields.allies),
            })
        })?,
        GangCommand::Delete { id, yes } => delete_record::<Gang>(store, id, *yes)?,
        GangCommand::Members { id } => {
            let gang = store
                .get::<Gang>(id)
                .with_context(|| not_found::<Gang>(id))?;
            print_members(store.data(), gang);
        }
    }
    Ok(())
}

fn gang_draft(fields: &GangFields) -> GangDraft {
    GangDraft {
        name: fields.name.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        color: if fields.clear_color {
            None
        } else {
            fields.color.clone()
        },
        allied_gang_ids: ids(&fields.allies).unwrap_or_default(),
    }
}

fn print_members(data: &AppData, gang: &Gang) {
    let members = views::gang_members(data, &gang.id);
    if members.is_empty() {
        println!("{}", format!("No members found for {}.", gang.name).yellow());
        return;
    }

    println!("{}", format!("Members of {}:", gang.name).bold());
    for person in members {
        println!(
            "  {:<8} {:<12} {}",
            person.id.cyan(),
            person.hierarchy.to_string(),
            person.full_name
        );
    }
}

// Cases

fn handle_case_command(cmd: &CaseCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        CaseCommand::Add {
            fields,
            interactive,
        } => {
            let draft = if *interactive || fields.title.is_none() {
                prompts::prompt_new_case()?
            } else {
                CaseDraft {
                    title: fields.title.clone().unwrap_or_default(),
                    description: fields.description.clone().unwrap_or_default(),
                    person_ids: ids(&fields.people).unwrap_or_default(),
                    vehicle_ids: ids(&fields.vehicles).unwrap_or_default(),
                    gang_ids: ids(&fields.gangs).unwrap_or_default(),
                    attachments: parse_attachments(&[], &fields.attachments)?,
                }
            };
            add_record::<Case>(store, draft)?;
        }
        CaseCommand::List { query, status } => {
            let status = status.as_deref().map(str::parse::<CaseStatus>).transpose()?;
            list_records::<Case>(store, query.as_deref(), |c| {
                status.map_or(true, |s| c.status == s)
            })
        }
        CaseCommand::Show { id } => {
            show_record::<Case>(store, id)?;
        }
        CaseCommand::Edit { id, fields } => {
            edit_record::<Case>(store, id, |c| case_patch(c, fields))?
        }
        CaseCommand::Delete { id, yes } => delete_record::<Case>(store, id, *yes)?,
        CaseCommand::Close { id, reason } => {
            let reason = match reason {
                Some(r) => r.clone(),
                None => prompts::prompt_reason(&format!("case {}", id))?,
            };
            let case = store
                .close_case(id, &reason)?
                .with_context(|| not_found::<Case>(id))?;
            println!("{} Case {} closed.", "✓".green(), case.id.cyan());
        }
    }
    Ok(())
}

fn case_patch(case: &Case, fields: &CaseFields) -> Result<CasePatch> {
    Ok(CasePatch {
        title: fields.title.clone(),
        description: fields.description.clone(),
        person_ids: ids(&fields.people),
        vehicle_ids: ids(&fields.vehicles),
        gang_ids: ids(&fields.gangs),
        attachments: added_attachments(&case.attachments, &fields.attachments)?,
    })
}

// Investigations

fn handle_investigation_command(cmd: &InvestigationCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        InvestigationCommand::Add { fields } => {
            let draft = investigation_draft(fields)?;
            add_record::<Investigation>(store, draft)?;
        }
        InvestigationCommand::List { query, status } => {
            let status = status
                .as_deref()
                .map(str::parse::<InvestigationStatus>)
                .transpose()?;
            list_records::<Investigation>(store, query.as_deref(), |i| {
                status.map_or(true, |s| i.status == s)
            })
        }
        InvestigationCommand::Show { id } => {
            show_record::<Investigation>(store, id)?;
        }
        InvestigationCommand::Edit { id, fields } => {
            edit_record::<Investigation>(store, id, |i| {
                Ok(InvestigationPatch {
                    title: fields.title.clone(),
                    sections: non_empty(parse_sections(&fields.sections)?),
                    person_ids: ids(&fields.people),
                    attachments: added_attachments(&i.attachments, &fields.attachments)?,
                })
            })?
        }
        InvestigationCommand::Delete { id, yes } => {
            delete_record::<Investigation>(store, id, *yes)?
        }
        InvestigationCommand::Archive { id, reason } => {
            let reason = match reason {
                Some(r) => r.clone(),
                None => prompts::prompt_reason(&format!("investigation {}", id))?,
            };
            let investigation = store
                .archive_investigation(id, &reason)?
                .with_context(|| not_found::<Investigation>(id))?;
            println!(
                "{} Investigation {} archived.",
                "✓".green(),
                investigation.id.cyan()
            );
        }
        InvestigationCommand::Reactivate { id } => {
            let investigation = store
                .reactivate_investigation(id)?
                .with_context(|| not_found::<Investigation>(id))?;
            println!(
                "{} Investigation {} is active again.",
                "✓".green(),
                investigation.id.cyan()
            );
        }
    }
    Ok(())
}

fn investigation_draft(fields: &InvestigationFields) -> Result<InvestigationDraft> {
    Ok(InvestigationDraft {
        title: fields.title.clone().unwrap_or_default(),
        sections: parse_sections(&fields.sections)?,
        person_ids: ids(&fields.people).unwrap_or_default(),
        attachments: parse_attachments(&[], &fields.attachments)?,
    })
}

// Charges

fn handle_charge_command(cmd: &ChargeCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        ChargeCommand::Add { fields } => {
            let draft = charge_draft(fields)?;
            add_record::<Charge>(store, draft)?;
        }
        ChargeCommand::List { query } => {
            list_records::<Charge>(store, query.as_deref(), |_| true)
        }
        ChargeCommand::Show { id } => {
            show_record::<Charge>(store, id)?;
        }
        ChargeCommand::Edit { id, fields } => edit_record::<Charge>(store, id, |_| {
            Ok(ChargePatch {
                person_ids: ids(&fields.people),
                vehicle_ids: ids(&fields.vehicles),
                gang_id: optional(&fields.gang, fields.clear_gang),
                reason: fields.reason.clone(),
                status: fields
                    .status
                    .as_deref()
                    .map(str::parse::<ChargeStatus>)
                    .transpose()?,
            })
        })?,
        ChargeCommand::Delete { id, yes } => delete_record::<Charge>(store, id, *yes)?,
        ChargeCommand::Resolve { id } => {
            let charge = store
                .resolve_charge(id)?
                .with_context(|| not_found::<Charge>(id))?;
            println!("{} Charge {} resolved.", "✓".green(), charge.id.cyan());
        }
    }
    Ok(())
}

fn charge_draft(fields: &ChargeFields) -> Result<ChargeDraft> {
    Ok(ChargeDraft {
        person_ids: ids(&fields.people).unwrap_or_default(),
        vehicle_ids: ids(&fields.vehicles).unwrap_or_default(),
        gang_id: fields.gang.clone(),
        reason: fields.reason.clone().unwrap_or_default(),
        status: fields
            .status
            .as_deref()
            .map(str::parse::<ChargeStatus>)
            .transpose()?
            .unwrap_or_default(),
    })
}

// Bases

fn handle_base_command(cmd: &BaseCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        BaseCommand::Add { fields } => {
            let draft = base_draft(fields)?;
            add_record::<Base>(store, draft)?;
        }
        BaseCommand::List { query } => {
            list_records::<Base>(store, query.as_deref(), |_| true)
        }
        BaseCommand::Show { id } => {
            show_record::<Base>(store, id)?;
        }
        BaseCommand::Edit { id, fields } => edit_record::<Base>(store, id, |b| {
            let metadata = parse_metadata(&fields.metadata)?;
            Ok(BasePatch {
                name: fields.name.clone(),
                description: fields.description.clone(),
                gang_id: optional(&fields.gang, fields.clear_gang),
                attachments: added_attachments(&b.attachments, &fields.attachments)?,
                metadata: if metadata.is_empty() {
                    None
                } else {
                    Some(metadata)
                },
            })
        })?,
        BaseCommand::Delete { id, yes } => delete_record::<Base>(store, id, *yes)?,
    }
    Ok(())
}

fn base_draft(fields: &BaseFields) -> Result<BaseDraft> {
    Ok(BaseDraft {
        name: fields.name.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        gang_id: fields.gang.clone(),
        attachments: parse_attachments(&[], &fields.attachments)?,
        metadata: parse_metadata(&fields.metadata)?,
    })
}

// Meetings

fn handle_meeting_command(cmd: &MeetingCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        MeetingCommand::Add { fields } => {
            let draft = meeting_draft(fields)?;
            add_record::<Meeting>(store, draft)?;
        }
        MeetingCommand::List { query } => {
            list_records::<Meeting>(store, query.as_deref(), |_| true)
        }
        MeetingCommand::Show { id } => {
            show_record::<Meeting>(store, id)?;
        }
        MeetingCommand::Edit { id, fields } => edit_record::<Meeting>(store, id, |m| {
            Ok(MeetingPatch {
                title: fields.title.clone(),
                description: fields.description.clone(),
                person_ids: ids(&fields.people),
                vehicle_ids: ids(&fields.vehicles),
                gang_ids: ids(&fields.gangs),
                attachments: added_attachments(&m.attachments, &fields.attachments)?,
                meeting_date: fields.date.clone(),
            })
        })?,
        MeetingCommand::Delete { id, yes } => delete_record::<Meeting>(store, id, *yes)?,
    }
    Ok(())
}

fn meeting_draft(fields: &MeetingFields) -> Result<MeetingDraft> {
    Ok(MeetingDraft {
        title: fields.title.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        person_ids: ids(&fields.people).unwrap_or_default(),
        vehicle_ids: ids(&fields.vehicles).unwrap_or_default(),
        gang_ids: ids(&fields.gangs).unwrap_or_default(),
        attachments: parse_attachments(&[], &fields.attachments)?,
        meeting_date: fields.date.clone().unwrap_or_default(),
    })
}

// Deeps

fn handle_deep_command(cmd: &DeepCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        DeepCommand::Add { fields } => {
            let draft = deep_draft(fields)?;
            add_record::<Deep>(store, draft)?;
        }
        DeepCommand::List { query } => {
            list_records::<Deep>(store, query.as_deref(), |_| true)
        }
        DeepCommand::Show { id } => {
            show_record::<Deep>(store, id)?;
        }
        DeepCommand::Edit { id, fields } => edit_record::<Deep>(store, id, |d| {
            Ok(DeepPatch {
                title: fields.title.clone(),
                description: fields.description.clone(),
                person_ids: ids(&fields.people),
                gang_id: optional(&fields.gang, fields.clear_gang),
                attachments: added_attachments(&d.attachments, &fields.attachments)?,
            })
        })?,
        DeepCommand::Delete { id, yes } => delete_record::<Deep>(store, id, *yes)?,
    }
    Ok(())
}

fn deep_draft(fields: &DeepFields) -> Result<DeepDraft> {
    Ok(DeepDraft {
        title: fields.title.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        person_ids: ids(&fields.people).unwrap_or_default(),
        gang_id: fields.gang.clone(),
        attachments: parse_attachments(&[], &fields.attachments)?,
    })
}

// Auctions

fn handle_auction_command(cmd: &AuctionCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        AuctionCommand::Add { fields } => {
            let draft = auction_draft(fields)?;
            add_record::<Auction>(store, draft)?;
        }
        AuctionCommand::List { query } => {
            list_records::<Auction>(store, query.as_deref(), |_| true)
        }
        AuctionCommand::Show { id } => {
            show_record::<Auction>(store, id)?;
        }
        AuctionCommand::Edit { id, fields } => edit_record::<Auction>(store, id, |a| {
            Ok(AuctionPatch {
                title: fields.title.clone(),
                description: fields.description.clone(),
                entries: non_empty(parse_entries(&fields.entries)?),
                attachments: added_attachments(&a.attachments, &fields.attachments)?,
            })
        })?,
        AuctionCommand::Delete { id, yes } => delete_record::<Auction>(store, id, *yes)?,
    }
    Ok(())
}

fn auction_draft(fields: &AuctionFields) -> Result<AuctionDraft> {
    Ok(AuctionDraft {
        title: fields.title.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        entries: parse_entries(&fields.entries)?,
        attachments: parse_attachments(&[], &fields.attachments)?,
    })
}

// Facades

fn handle_facade_command(cmd: &FacadeCommand, store: &mut AppStore) -> Result<()> {
    match cmd {
        FacadeCommand::Add { fields } => {
            let draft = facade_draft(fields)?;
            add_record::<Facade>(store, draft)?;
        }
        FacadeCommand::List { query } => {
            list_records::<Facade>(store, query.as_deref(), |_| true)
        }
        FacadeCommand::Show { id } => {
            show_record::<Facade>(store, id)?;
        }
        FacadeCommand::Edit { id, fields } => edit_record::<Facade>(store, id, |f| {
            Ok(FacadePatch {
                name: fields.name.clone(),
                description: fields.description.clone(),
                gang_id: optional(&fields.gang, fields.clear_gang),
                person_ids: ids(&fields.people),
                attachments: added_attachments(&f.attachments, &fields.attachments)?,
            })
        })?,
        FacadeCommand::Delete { id, yes } => delete_record::<Facade>(store, id, *yes)?,
    }
    Ok(())
}

fn facade_draft(fields: &FacadeFields) -> Result<FacadeDraft> {
    Ok(FacadeDraft {
        name: fields.name.clone().unwrap_or_default(),
        description: fields.description.clone().unwrap_or_default(),
        gang_id: fields.gang.clone(),
        person_ids: ids(&fields.people).unwrap_or_default(),
        attachments: parse_attachments(&[], &fields.attachments)?,
    })
}

// Search, stats and data transfer

fn print_group<R: Render>(title: &str, records: &[&R], data: &AppData) {
    if records.is_empty() {
        return;
    }
    println!("{}", format!("{} ({})", title, records.len()).bold());
    for record in records {
        print_row(*record, data);
    }
}

fn search(store: &AppStore, query: &str) {
    let data = store.data();
    let results = global_search(data, query);
    if results.is_empty() {
        println!("{}", format!("Nothing matches '{}'.", query.trim()).yellow());
        return;
    }

    print_group("People", &results.people, data);
    print_group("Vehicles", &results.vehicles, data);
    print_group("Gangs", &results.gangs, data);
    print_group("Cases", &results.cases, data);
    print_group("Investigations", &results.investigations, data);
    print_group("Charges", &results.charges, data);
    print_group("Bases", &results.bases, data);
    print_group("Meetings", &results.meetings, data);
    print_group("Deeps", &results.deeps, data);
    print_group("Auctions", &results.auctions, data);
    print_group("Facades", &results.facades, data);
}

fn print_stats(data: &AppData) {
    let figures = views::stats(data);
    println!("{}", "Dossier".bold());
    println!(
        "  Cases:          {} open, {} closed",
        figures.open_cases, figures.closed_cases
    );
    println!(
        "  Investigations: {} active, {} archived",
        figures.active_investigations, figures.archived_investigations
    );
    println!("  Pending charges: {}", figures.pending_charges);
    println!("  People:         {}", figures.people);
    println!("  Vehicles:       {}", figures.vehicles);
    println!("  Gangs:          {}", figures.gangs);
    println!("  Bases:          {}", figures.bases);
}

fn export(store: &AppStore, output: Option<&Path>) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(backup_file_name()));
    let json = store.export_data()?;

    fs::write(&path, json).with_context(|| format!("Failed to write backup to {:?}", path))?;
    println!("{} Backup written to {}", "✓".green(), path.display());
    Ok(())
}

fn import(store: &mut AppStore, input: &Path, skip_confirm: bool) -> Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read backup file: {:?}", input))?;

    if !skip_confirm {
        let backup = parse_backup(&json)?;
        let records = Collection::ALL.iter().map(|c| backup.count(*c)).sum();
        if !prompts::confirm_import(records)? {
            println!("{}", "Import cancelled.".yellow());
            return Ok(());
        }
    }

    store.import_data(&json)?;
    println!(
        "{} Store replaced with {}",
        "✓".green(),
        input.display()
    );
    Ok(())
}

fn migrate(
    store: &AppStore,
    source: &Path,
    target: &Path,
    to_backend: Option<&str>,
) -> Result<()> {
    let backend_type = to_backend.map(str::parse::<BackendType>).transpose()?;
    let target_backend = create_backend(target, backend_type)
        .with_context(|| format!("Failed to open target store at {:?}", target))?;

    println!(
        "Migrating {} ({}) to {} ({})...",
        source.display(),
        store.backend().backend_type(),
        target.display(),
        target_backend.backend_type()
    );
    let records = copy_store(store.backend(), target_backend.as_ref())?;
    println!("{} Migrated {} records.", "✓".green(), records);
    Ok(())
}
