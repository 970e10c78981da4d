use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Record keeping for an investigation group")]
pub struct Cli {
    /// Path to the store file (.yaml or .db)
    #[clap(long, global = true)]
    pub file: Option<PathBuf>,

    /// Storage backend: yaml or sqlite (default: from the file extension)
    #[clap(long, global = true)]
    pub backend: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick the investigator acting from now on
    Login {
        /// Investigator id (INV-03) or name; prompts when omitted
        investigator: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the active investigator
    Whoami,

    /// Manage the investigator roster
    #[clap(subcommand)]
    Investigator(InvestigatorCommand),

    /// People of interest
    #[clap(subcommand)]
    Person(PersonCommand),

    /// Vehicles
    #[clap(subcommand)]
    Vehicle(VehicleCommand),

    /// Gangs
    #[clap(subcommand)]
    Gang(GangCommand),

    /// Cases
    #[clap(subcommand)]
    Case(CaseCommand),

    /// Investigations
    #[clap(subcommand)]
    Investigation(InvestigationCommand),

    /// Charges
    #[clap(subcommand)]
    Charge(ChargeCommand),

    /// Gang bases
    #[clap(subcommand)]
    Base(BaseCommand),

    /// Meetings
    #[clap(subcommand)]
    Meeting(MeetingCommand),

    /// Infiltration dossiers
    #[clap(subcommand)]
    Deep(DeepCommand),

    /// Auctions
    #[clap(subcommand)]
    Auction(AuctionCommand),

    /// Front businesses
    #[clap(subcommand)]
    Facade(FacadeCommand),

    /// Search every record list
    Search {
        /// Text to look for (case-insensitive)
        query: String,
    },

    /// Show the activity log, newest first
    Log {
        /// Number of entries to show
        #[clap(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Dashboard counters
    Stats,

    /// Write a JSON backup of the whole store
    Export {
        /// Output file (default: dossier-backup-<date>.json)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace the whole store with a JSON backup
    Import {
        /// Backup file to read
        input: PathBuf,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Copy the store into another file, e.g. from YAML to SQLite
    Migrate {
        /// Destination store file
        target: PathBuf,

        /// Destination backend (default: from the target extension)
        #[clap(long = "to")]
        to_backend: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InvestigatorCommand {
    /// List the roster
    List,

    /// Add an investigator to the roster
    Add {
        /// Name of the investigator
        name: String,
    },
}

/// Attachments given as NAME=URL; repeat the flag for several
#[derive(Args, Debug, Default)]
pub struct AttachArgs {
    /// Attach a file or image as NAME=URL
    #[clap(long = "attach", value_name = "NAME=URL")]
    pub attach: Vec<String>,

    /// Attachment type tag for the files given with --attach
    #[clap(long = "attach-type", default_value = "link")]
    pub attach_type: String,
}

#[derive(Args, Debug, Default)]
pub struct PersonFields {
    /// Full name
    #[clap(long)]
    pub name: Option<String>,

    /// Gang name (membership is matched by name)
    #[clap(long)]
    pub gang: Option<String>,

    /// Leader, Sub-Leader or Member
    #[clap(long)]
    pub hierarchy: Option<String>,

    /// Phone number, NNN-NNN (digits are reformatted)
    #[clap(long)]
    pub phone: Option<String>,

    /// Vehicle ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub vehicles: Option<Vec<String>>,

    /// Deep (infiltration dossier) id
    #[clap(long)]
    pub deep: Option<String>,

    /// Remove the deep reference
    #[clap(long, conflicts_with = "deep")]
    pub clear_deep: bool,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Add a person
    Add {
        #[clap(flatten)]
        fields: PersonFields,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List people, optionally filtered
    List {
        /// Only show people matching this text
        #[clap(long, short = 'q')]
        query: Option<String>,

        /// Only show members of this gang (by name)
        #[clap(long)]
        gang: Option<String>,
    },

    /// Show a person
    Show { id: String },

    /// Edit a person; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: PersonFields,
    },

    /// Delete a person
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// List the vehicles of a person
    Vehicles { id: String },
}

#[derive(Args, Debug, Default)]
pub struct VehicleFields {
    /// Licence plate (upper-cased, at most 20 characters)
    #[clap(long)]
    pub plate: Option<String>,

    #[clap(long)]
    pub model: Option<String>,

    /// Owner person id
    #[clap(long)]
    pub owner: Option<String>,

    #[clap(long, conflicts_with = "owner")]
    pub clear_owner: bool,

    /// Gang id
    #[clap(long)]
    pub gang: Option<String>,

    #[clap(long, conflicts_with = "gang")]
    pub clear_gang: bool,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum VehicleCommand {
    /// Add a vehicle
    Add {
        #[clap(flatten)]
        fields: VehicleFields,
    },

    /// List vehicles, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a vehicle
    Show { id: String },

    /// Edit a vehicle; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: VehicleFields,
    },

    /// Delete a vehicle
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct GangFields {
    #[clap(long)]
    pub name: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    #[clap(long)]
    pub color: Option<String>,

    #[clap(long, conflicts_with = "color")]
    pub clear_color: bool,

    /// Allied gang ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub allies: Option<Vec<String>>,
}

#[derive(Subcommand, Debug)]
pub enum GangCommand {
    /// Add a gang
    Add {
        #[clap(flatten)]
        fields: GangFields,
    },

    /// List gangs, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a gang with its members
    Show { id: String },

    /// Edit a gang; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: GangFields,
    },

    /// Delete a gang
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// List the members of a gang, leaders first
    Members { id: String },
}

#[derive(Args, Debug, Default)]
pub struct CaseFields {
    #[clap(long)]
    pub title: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    /// Vehicle ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub vehicles: Option<Vec<String>>,

    /// Gang ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub gangs: Option<Vec<String>>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum CaseCommand {
    /// Open a new case
    Add {
        #[clap(flatten)]
        fields: CaseFields,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List cases, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,

        /// Only show cases with this status: open or closed
        #[clap(long)]
        status: Option<String>,
    },

    /// Show a case with its references
    Show { id: String },

    /// Edit a case; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: CaseFields,
    },

    /// Delete a case
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Close a case for good
    Close {
        id: String,

        /// Why the case is closed; prompts when omitted
        #[clap(long)]
        reason: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct InvestigationFields {
    #[clap(long)]
    pub title: Option<String>,

    /// Section as LABEL=CONTENT; repeat for several
    #[clap(long = "section", value_name = "LABEL=CONTENT")]
    pub sections: Vec<String>,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum InvestigationCommand {
    /// Start an investigation
    Add {
        #[clap(flatten)]
        fields: InvestigationFields,
    },

    /// List investigations, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,

        /// Only show investigations with this status: active or archived
        #[clap(long)]
        status: Option<String>,
    },

    /// Show an investigation
    Show { id: String },

    /// Edit an investigation; --section replaces every section
    Edit {
        id: String,

        #[clap(flatten)]
        fields: InvestigationFields,
    },

    /// Delete an investigation
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Archive an active investigation
    Archive {
        id: String,

        /// Why the investigation is archived; prompts when omitted
        #[clap(long)]
        reason: Option<String>,
    },

    /// Bring an archived investigation back
    Reactivate { id: String },
}

#[derive(Args, Debug, Default)]
pub struct ChargeFields {
    #[clap(long)]
    pub reason: Option<String>,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    /// Vehicle ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub vehicles: Option<Vec<String>>,

    /// Gang id
    #[clap(long)]
    pub gang: Option<String>,

    #[clap(long, conflicts_with = "gang")]
    pub clear_gang: bool,

    /// pending or resolved
    #[clap(long)]
    pub status: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ChargeCommand {
    /// Add a charge
    Add {
        #[clap(flatten)]
        fields: ChargeFields,
    },

    /// List charges, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a charge
    Show { id: String },

    /// Edit a charge; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: ChargeFields,
    },

    /// Delete a charge
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Mark a charge as resolved
    Resolve { id: String },
}

#[derive(Args, Debug, Default)]
pub struct BaseFields {
    #[clap(long)]
    pub name: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// Gang id
    #[clap(long)]
    pub gang: Option<String>,

    #[clap(long, conflicts_with = "gang")]
    pub clear_gang: bool,

    /// Extra detail as KEY=VALUE; repeat for several
    #[clap(long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Add a base
    Add {
        #[clap(flatten)]
        fields: BaseFields,
    },

    /// List bases, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a base
    Show { id: String },

    /// Edit a base; --meta replaces all metadata
    Edit {
        id: String,

        #[clap(flatten)]
        fields: BaseFields,
    },

    /// Delete a base
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct MeetingFields {
    #[clap(long)]
    pub title: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// When the meeting took place, free text
    #[clap(long)]
    pub date: Option<String>,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    /// Vehicle ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub vehicles: Option<Vec<String>>,

    /// Gang ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub gangs: Option<Vec<String>>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum MeetingCommand {
    /// Record a meeting
    Add {
        #[clap(flatten)]
        fields: MeetingFields,
    },

    /// List meetings, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a meeting with its references
    Show { id: String },

    /// Edit a meeting; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: MeetingFields,
    },

    /// Delete a meeting
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct DeepFields {
    #[clap(long)]
    pub title: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    /// Gang id
    #[clap(long)]
    pub gang: Option<String>,

    #[clap(long, conflicts_with = "gang")]
    pub clear_gang: bool,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum DeepCommand {
    /// Open an infiltration dossier
    Add {
        #[clap(flatten)]
        fields: DeepFields,
    },

    /// List deeps, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a deep
    Show { id: String },

    /// Edit a deep; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: DeepFields,
    },

    /// Delete a deep
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct AuctionFields {
    #[clap(long)]
    pub title: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// Bid as GANG_ID:ITEM:AMOUNT[:GEARS]; repeat for several
    #[clap(long = "entry", value_name = "GANG_ID:ITEM:AMOUNT[:GEARS]")]
    pub entries: Vec<String>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum AuctionCommand {
    /// Record an auction
    Add {
        #[clap(flatten)]
        fields: AuctionFields,
    },

    /// List auctions, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show an auction with its total
    Show { id: String },

    /// Edit an auction; --entry replaces every entry
    Edit {
        id: String,

        #[clap(flatten)]
        fields: AuctionFields,
    },

    /// Delete an auction
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct FacadeFields {
    #[clap(long)]
    pub name: Option<String>,

    #[clap(long)]
    pub description: Option<String>,

    /// Gang id
    #[clap(long)]
    pub gang: Option<String>,

    #[clap(long, conflicts_with = "gang")]
    pub clear_gang: bool,

    /// Person ids, comma separated
    #[clap(long, value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    #[clap(flatten)]
    pub attachments: AttachArgs,
}

#[derive(Subcommand, Debug)]
pub enum FacadeCommand {
    /// Add a front business
    Add {
        #[clap(flatten)]
        fields: FacadeFields,
    },

    /// List facades, optionally filtered
    List {
        #[clap(long, short = 'q')]
        query: Option<String>,
    },

    /// Show a facade
    Show { id: String },

    /// Edit a facade; only the given fields change
    Edit {
        id: String,

        #[clap(flatten)]
        fields: FacadeFields,
    },

    /// Delete a facade
    Delete {
        id: String,

        #[clap(long, short = 'y')]
        yes: bool,
    },
}
