mod docx;
mod export;
mod models;
mod pdf;
mod projection;
mod storage;
mod store;
mod tui;
mod versions;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use export::Contact;
use storage::Storage;
use store::{ResumeVersionPatch, Store};

#[derive(Parser)]
#[command(name = "tailor")]
#[command(about = "Resume composition - organize, version, and export your work history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize storage
    Init,

    /// Show the current resume name, unsaved-changes state, and counts
    Status,

    /// Print the current resume as plain text
    Show {
        #[command(flatten)]
        contact: ContactArgs,
    },

    /// Browse the current resume in a scrollable terminal preview
    Preview {
        #[command(flatten)]
        contact: ContactArgs,

        /// Minutes without a save before the preview shows a reminder
        #[arg(long, default_value_t = versions::DEFAULT_STALE_SAVE_MINUTES)]
        stale_after: i64,
    },

    /// Manage companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Manage positions within a company
    Position {
        #[command(subcommand)]
        command: PositionCommands,
    },

    /// Manage projects within a position
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage bullet points
    Bullet {
        #[command(subcommand)]
        command: BulletCommands,
    },

    /// Manage summaries
    Summary {
        #[command(subcommand)]
        command: SummaryCommands,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Manage education entries
    Education {
        #[command(subcommand)]
        command: EducationCommands,
    },

    /// Manage skills
    Skill {
        #[command(subcommand)]
        command: SkillCommands,
    },

    /// Manage certifications
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },

    /// Manage saved resume versions
    Version {
        #[command(subcommand)]
        command: VersionCommands,
    },

    /// Export the current resume
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Replace all data from an exported JSON file
    Import {
        /// Path to a tailor JSON export
        file: PathBuf,
    },
}

#[derive(Args)]
struct ContactArgs {
    /// Name on the contact header
    #[arg(long)]
    name: Option<String>,

    /// Email on the contact header
    #[arg(long)]
    email: Option<String>,

    /// Phone on the contact header
    #[arg(long)]
    phone: Option<String>,

    /// Location on the contact header
    #[arg(long)]
    location: Option<String>,
}

impl ContactArgs {
    fn resolve(self) -> Contact {
        let mut contact = Contact::default();
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(location) = self.location {
            contact.location = location;
        }
        contact
    }
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Add a company
    Add {
        /// Company name
        name: String,
    },

    /// List companies with their positions and projects
    List,

    /// Rename a company
    Rename {
        /// Company ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a company and every bullet under it
    Delete {
        /// Company ID
        id: String,
    },

    /// Toggle a company's visibility in the resume
    Toggle {
        /// Company ID
        id: String,
    },

    /// Reorder companies; list every company ID in the new order
    Reorder {
        /// Company IDs in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PositionCommands {
    /// Add a position to a company
    Add {
        /// Company ID
        company: String,

        /// Position title
        title: String,

        /// Start date, e.g. "Jan 2020"
        #[arg(short, long)]
        start: String,

        /// End date; omit for Present
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Update a position's title or dates
    Update {
        /// Company ID
        company: String,

        /// Position ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New start date
        #[arg(long)]
        start: Option<String>,

        /// New end date
        #[arg(long)]
        end: Option<String>,

        /// Clear the end date (position is current)
        #[arg(long)]
        present: bool,
    },

    /// Delete a position and every bullet under it
    Delete {
        /// Company ID
        company: String,

        /// Position ID
        id: String,
    },

    /// Reorder positions within a company
    Reorder {
        /// Company ID
        company: String,

        /// Position IDs in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a project to a position
    Add {
        /// Company ID
        company: String,

        /// Position ID
        position: String,

        /// Project name
        name: String,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Update a project's name or description
    Update {
        /// Company ID
        company: String,

        /// Position ID
        position: String,

        /// Project ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a project and every bullet under it
    Delete {
        /// Company ID
        company: String,

        /// Position ID
        position: String,

        /// Project ID
        id: String,
    },

    /// Toggle whether a project's heading shows in the resume
    Toggle {
        /// Company ID
        company: String,

        /// Position ID
        position: String,

        /// Project ID
        id: String,
    },
}

#[derive(Subcommand)]
enum BulletCommands {
    /// Add a bullet under a company/position/project
    Add {
        /// Company ID
        company: String,

        /// Position ID
        position: String,

        /// Project ID
        project: String,

        /// Bullet content
        content: String,

        /// Tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List bullets
    List,

    /// Show a bullet with its version history
    Show {
        /// Bullet ID
        id: String,
    },

    /// Edit the current version in place
    Patch {
        /// Bullet ID
        id: String,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// Replacement tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Save the edit as a new version and select it
    Revise {
        /// Bullet ID
        id: String,

        /// New content
        content: String,

        /// Replacement tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Select one of the bullet's existing versions
    PickVersion {
        /// Bullet ID
        id: String,

        /// Version label, e.g. v2
        version: String,
    },

    /// Toggle whether the bullet is included in the resume
    Toggle {
        /// Bullet ID
        id: String,
    },

    /// Delete a bullet
    Delete {
        /// Bullet ID
        id: String,
    },

    /// Reorder bullets globally; list every bullet ID in the new order
    Reorder {
        /// Bullet IDs in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SummaryCommands {
    /// Add a summary
    Add {
        /// Summary name
        name: String,

        /// Summary content
        content: String,
    },

    /// List summaries
    List,

    /// Edit the summary, optionally overwriting a specific version in place
    Patch {
        /// Summary ID
        id: String,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// Replacement tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Version label to overwrite in place
        #[arg(long)]
        version: Option<String>,
    },

    /// Save the edit as a new version and select it
    NewVersion {
        /// Summary ID
        id: String,

        /// New content
        content: String,

        /// Replacement tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Make this the resume's summary (deselects all others)
    Select {
        /// Summary ID
        id: String,
    },

    /// Select one of the summary's existing versions
    PickVersion {
        /// Summary ID
        id: String,

        /// Version label, e.g. v2
        version: String,
    },

    /// Delete a summary
    Delete {
        /// Summary ID
        id: String,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Add a tag
    Add {
        /// Tag name
        name: String,

        /// Hex color
        #[arg(short, long, default_value = "#3b82f6")]
        color: String,
    },

    /// List tags
    List,

    /// Delete a tag (references keep the name)
    Delete {
        /// Tag ID
        id: String,
    },
}

#[derive(Subcommand)]
enum EducationCommands {
    /// Add an education entry
    Add {
        /// Degree
        degree: String,

        /// Institution
        institution: String,

        /// Start date
        #[arg(short, long)]
        start: String,

        /// End date; omit for Present
        #[arg(short, long)]
        end: Option<String>,
    },

    /// List education entries
    List,

    /// Update an education entry
    Update {
        /// Education ID
        id: String,

        /// New degree
        #[arg(long)]
        degree: Option<String>,

        /// New institution
        #[arg(long)]
        institution: Option<String>,

        /// New start date
        #[arg(long)]
        start: Option<String>,

        /// New end date
        #[arg(long)]
        end: Option<String>,

        /// Clear the end date (still attending)
        #[arg(long)]
        present: bool,
    },

    /// Delete an education entry
    Delete {
        /// Education ID
        id: String,
    },
}

#[derive(Subcommand)]
enum SkillCommands {
    /// Add a skill
    Add {
        /// Skill name
        name: String,
    },

    /// List skills
    List,

    /// Rename a skill
    Update {
        /// Skill ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a skill
    Delete {
        /// Skill ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CertCommands {
    /// Add a certification
    Add {
        /// Certification name
        name: String,

        /// Issuer
        #[arg(short, long)]
        issuer: Option<String>,

        /// Date earned
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List certifications
    List,

    /// Update a certification
    Update {
        /// Certification ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New issuer
        #[arg(long)]
        issuer: Option<String>,

        /// New date
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a certification
    Delete {
        /// Certification ID
        id: String,
    },
}

#[derive(Subcommand)]
enum VersionCommands {
    /// Snapshot the current selection as a resume version
    Save {
        /// Version name; required unless --overwrite
        name: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Overwrite the version currently being edited instead of creating one
        #[arg(long)]
        overwrite: bool,
    },

    /// Update a saved version's name, description, or tags
    Update {
        /// Version ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Replacement tag name; repeat for more
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List saved versions
    List,

    /// Load a saved version over the current selection
    Load {
        /// Version ID
        id: String,

        /// Discard unsaved selection changes without asking
        #[arg(long)]
        force: bool,
    },

    /// Delete a saved version
    Delete {
        /// Version ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Export as a Section,Content CSV table
    Csv {
        /// Output path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export as PDF
    Pdf {
        /// Output path
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        contact: ContactArgs,
    },

    /// Export as DOCX
    Docx {
        /// Output path
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        contact: ContactArgs,
    },

    /// Export the whole data set as pretty-printed JSON
    Json {
        /// Output path; default is tailor_export_{date}.json in the current directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_tags(tags: Vec<String>) -> Option<Vec<String>> {
    if tags.is_empty() { None } else { Some(tags) }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        let storage = Storage::open()?;
        storage.init()?;
        println!("Storage initialized at {}", storage.path().display());
        return Ok(());
    }

    let mut store = Store::open()?;

    match cli.command {
        Commands::Init => unreachable!(),

        Commands::Status => {
            let data = store.data();
            println!("Resume: {}", data.current_editing.resume_name);
            match &data.current_editing.resume_version_id {
                Some(id) if data.resume_versions.iter().any(|v| v.id == *id) => {
                    println!("Editing saved version: {}", id);
                }
                Some(id) => println!("Editing saved version: {} (deleted)", id),
                None => println!("Editing: not yet saved as a version"),
            }
            let unsaved = versions::has_unsaved_changes(data);
            println!("Unsaved changes: {}", if unsaved { "yes" } else { "no" });
            match store.storage().last_saved()? {
                Some(stamp) => println!("Last saved: {}", stamp.to_rfc3339()),
                None => println!("Last saved: never"),
            }
            println!();
            println!("Companies:      {}", data.companies.len());
            println!("Bullets:        {} ({} selected)",
                data.bullets.len(),
                data.bullets.iter().filter(|b| b.is_selected).count());
            println!("Summaries:      {}", data.summaries.len());
            println!("Tags:           {}", data.tags.len());
            println!("Education:      {}", data.education.len());
            println!("Skills:         {}", data.skills.len());
            println!("Certifications: {}", data.certifications.len());
            println!("Saved versions: {}", data.resume_versions.len());
            println!();
            println!("Storage: {}", store.storage().path().display());
        }

        Commands::Show { contact } => {
            let view = projection::project_resume(store.data());
            print!("{}", export::to_text(&view, &contact.resolve()));
        }

        Commands::Preview {
            contact,
            stale_after,
        } => {
            tui::run_preview(&store, &contact.resolve(), chrono::Duration::minutes(stale_after))?;
        }

        Commands::Company { command } => match command {
            CompanyCommands::Add { name } => {
                let id = store.add_company(&name);
                println!("Added company '{}' ({})", name, id);
            }

            CompanyCommands::List => {
                let data = store.data();
                if data.companies.is_empty() {
                    println!("No companies yet.");
                }
                for company in &data.companies {
                    let hidden = if company.is_visible { "" } else { " [hidden]" };
                    println!("{}  {}{}", company.id, company.name, hidden);
                    for position in &company.positions {
                        println!(
                            "  {}  {} ({})",
                            position.id,
                            position.title,
                            projection::date_range(&position.start_date, position.end_date.as_deref())
                        );
                        for project in &position.projects {
                            let hidden = if project.is_visible { "" } else { " [hidden]" };
                            let bullets = data
                                .bullets
                                .iter()
                                .filter(|b| b.project_id == project.id)
                                .count();
                            println!(
                                "    {}  {} ({} bullet{}){}",
                                project.id,
                                project.name,
                                bullets,
                                if bullets == 1 { "" } else { "s" },
                                hidden
                            );
                        }
                    }
                }
            }

            CompanyCommands::Rename { id, name } => {
                store.rename_company(&id, &name)?;
                println!("Renamed company {} to '{}'", id, name);
            }

            CompanyCommands::Delete { id } => {
                store.delete_company(&id)?;
                println!("Deleted company {} and its bullets", id);
            }

            CompanyCommands::Toggle { id } => {
                let visible = store.toggle_company_visibility(&id)?;
                println!("Company {} is now {}", id, if visible { "visible" } else { "hidden" });
            }

            CompanyCommands::Reorder { ids } => {
                store.reorder_companies(&ids)?;
                println!("Reordered {} companies", ids.len());
            }
        },

        Commands::Position { command } => match command {
            PositionCommands::Add {
                company,
                title,
                start,
                end,
            } => {
                let id = store.add_position(&company, &title, &start, end.as_deref())?;
                println!("Added position '{}' ({})", title, id);
            }

            PositionCommands::Update {
                company,
                id,
                title,
                start,
                end,
                present,
            } => {
                store.update_position(
                    &company,
                    &id,
                    title.as_deref(),
                    start.as_deref(),
                    end.as_deref(),
                    present,
                )?;
                println!("Updated position {}", id);
            }

            PositionCommands::Delete { company, id } => {
                store.delete_position(&company, &id)?;
                println!("Deleted position {} and its bullets", id);
            }

            PositionCommands::Reorder { company, ids } => {
                store.reorder_positions(&company, &ids)?;
                println!("Reordered {} positions", ids.len());
            }
        },

        Commands::Project { command } => match command {
            ProjectCommands::Add {
                company,
                position,
                name,
                description,
            } => {
                let id = store.add_project(&company, &position, &name, description.as_deref())?;
                println!("Added project '{}' ({})", name, id);
            }

            ProjectCommands::Update {
                company,
                position,
                id,
                name,
                description,
            } => {
                store.update_project(&company, &position, &id, name.as_deref(), description.as_deref())?;
                println!("Updated project {}", id);
            }

            ProjectCommands::Delete {
                company,
                position,
                id,
            } => {
                store.delete_project(&company, &position, &id)?;
                println!("Deleted project {} and its bullets", id);
            }

            ProjectCommands::Toggle {
                company,
                position,
                id,
            } => {
                let visible = store.toggle_project_visibility(&company, &position, &id)?;
                println!("Project {} is now {}", id, if visible { "visible" } else { "hidden" });
            }
        },

        Commands::Bullet { command } => match command {
            BulletCommands::Add {
                company,
                position,
                project,
                content,
                tags,
            } => {
                let id = store.add_bullet(&company, &position, &project, &content, tags)?;
                println!("Added bullet {}", id);
            }

            BulletCommands::List => {
                let data = store.data();
                if data.bullets.is_empty() {
                    println!("No bullets yet.");
                } else {
                    println!("{:<22} {:<4} {:<5} {:<22} {}", "ID", "SEL", "VER", "PROJECT", "CONTENT");
                    println!("{}", "-".repeat(96));
                    for bullet in &data.bullets {
                        println!(
                            "{:<22} {:<4} {:<5} {:<22} {}",
                            truncate(&bullet.id, 20),
                            if bullet.is_selected { "*" } else { "" },
                            bullet.selected_version.as_deref().unwrap_or(&bullet.version),
                            truncate(&bullet.project_id, 20),
                            truncate(&projection::resolve_bullet_content(bullet), 40)
                        );
                    }
                }
            }

            BulletCommands::Show { id } => {
                let bullet = store
                    .data()
                    .bullets
                    .iter()
                    .find(|b| b.id == id)
                    .with_context(|| format!("Bullet '{}' not found", id))?;
                println!("Bullet {}", bullet.id);
                println!("Content: {}", projection::resolve_bullet_content(bullet));
                println!("Included in resume: {}", if bullet.is_selected { "yes" } else { "no" });
                if !bullet.tags.is_empty() {
                    println!("Tags: {}", bullet.tags.join(", "));
                }
                println!(
                    "Path: company {} / position {} / project {}",
                    bullet.company_id, bullet.position_id, bullet.project_id
                );
                println!("Created: {}", bullet.created_at);
                println!("Updated: {}", bullet.updated_at);
                if !bullet.versions.is_empty() {
                    println!("\nVersions:");
                    let current = bullet.selected_version.as_deref().unwrap_or(&bullet.version);
                    for version in &bullet.versions {
                        let marker = if version.version == current { "*" } else { " " };
                        println!("  {} {:<4} {}", marker, version.version, truncate(&version.content, 60));
                    }
                }
            }

            BulletCommands::Patch { id, content, tags } => {
                store.patch_bullet(&id, content.as_deref(), parse_tags(tags))?;
                println!("Patched bullet {}", id);
            }

            BulletCommands::Revise { id, content, tags } => {
                let label = store.revise_bullet(&id, &content, parse_tags(tags))?;
                println!("Saved bullet {} as {}", id, label);
            }

            BulletCommands::PickVersion { id, version } => {
                store.select_bullet_version(&id, &version)?;
                println!("Bullet {} now shows {}", id, version);
            }

            BulletCommands::Toggle { id } => {
                let selected = store.toggle_bullet_selection(&id)?;
                println!(
                    "Bullet {} is now {} the resume",
                    id,
                    if selected { "included in" } else { "excluded from" }
                );
            }

            BulletCommands::Delete { id } => {
                store.delete_bullet(&id)?;
                println!("Deleted bullet {}", id);
            }

            BulletCommands::Reorder { ids } => {
                store.reorder_bullets(&ids)?;
                println!("Reordered {} bullets", ids.len());
            }
        },

        Commands::Summary { command } => match command {
            SummaryCommands::Add { name, content } => {
                let id = store.add_summary(&name, &content);
                println!("Added summary '{}' ({})", name, id);
            }

            SummaryCommands::List => {
                let data = store.data();
                if data.summaries.is_empty() {
                    println!("No summaries yet.");
                } else {
                    println!("{:<22} {:<4} {:<5} {:<18} {}", "ID", "SEL", "VER", "NAME", "CONTENT");
                    println!("{}", "-".repeat(92));
                    for summary in &data.summaries {
                        println!(
                            "{:<22} {:<4} {:<5} {:<18} {}",
                            truncate(&summary.id, 20),
                            if summary.is_selected { "*" } else { "" },
                            summary.selected_version.as_deref().unwrap_or(&summary.version),
                            truncate(&summary.name, 16),
                            truncate(&summary.content, 40)
                        );
                    }
                }
            }

            SummaryCommands::Patch {
                id,
                content,
                tags,
                version,
            } => {
                store.patch_summary(&id, content.as_deref(), parse_tags(tags), version.as_deref())?;
                println!("Patched summary {}", id);
            }

            SummaryCommands::NewVersion { id, content, tags } => {
                let label = store.save_new_summary_version(&id, &content, parse_tags(tags))?;
                println!("Saved summary {} as {}", id, label);
            }

            SummaryCommands::Select { id } => {
                store.select_summary(&id)?;
                println!("Summary {} is now the resume's summary", id);
            }

            SummaryCommands::PickVersion { id, version } => {
                store.select_summary_version(&id, &version)?;
                println!("Summary {} now shows {}", id, version);
            }

            SummaryCommands::Delete { id } => {
                store.delete_summary(&id)?;
                println!("Deleted summary {}", id);
            }
        },

        Commands::Tag { command } => match command {
            TagCommands::Add { name, color } => {
                let duplicate = store
                    .data()
                    .tags
                    .iter()
                    .any(|t| t.name.eq_ignore_ascii_case(&name));
                if duplicate {
                    eprintln!("Warning: a tag named '{}' already exists", name);
                }
                let id = store.add_tag(&name, &color);
                println!("Added tag '{}' ({})", name, id);
            }

            TagCommands::List => {
                let data = store.data();
                if data.tags.is_empty() {
                    println!("No tags yet.");
                } else {
                    println!("{:<20} {:<20} {:<9} {}", "ID", "NAME", "COLOR", "CREATED");
                    println!("{}", "-".repeat(74));
                    for tag in &data.tags {
                        println!(
                            "{:<20} {:<20} {:<9} {}",
                            truncate(&tag.id, 18),
                            truncate(&tag.name, 18),
                            tag.color,
                            truncate(&tag.created_at, 19)
                        );
                    }
                }
            }

            TagCommands::Delete { id } => {
                store.delete_tag(&id)?;
                println!("Deleted tag {} (bullets keep the name)", id);
            }
        },

        Commands::Education { command } => match command {
            EducationCommands::Add {
                degree,
                institution,
                start,
                end,
            } => {
                let id = store.add_education(&degree, &institution, &start, end.as_deref());
                println!("Added education '{}' ({})", degree, id);
            }

            EducationCommands::List => {
                let data = store.data();
                if data.education.is_empty() {
                    println!("No education entries yet.");
                }
                for education in &data.education {
                    println!(
                        "{}  {} at {} ({})",
                        education.id,
                        education.degree,
                        education.institution,
                        projection::date_range(&education.start_date, education.end_date.as_deref())
                    );
                }
            }

            EducationCommands::Update {
                id,
                degree,
                institution,
                start,
                end,
                present,
            } => {
                store.update_education(
                    &id,
                    degree.as_deref(),
                    institution.as_deref(),
                    start.as_deref(),
                    end.as_deref(),
                    present,
                )?;
                println!("Updated education {}", id);
            }

            EducationCommands::Delete { id } => {
                store.delete_education(&id)?;
                println!("Deleted education {}", id);
            }
        },

        Commands::Skill { command } => match command {
            SkillCommands::Add { name } => {
                let id = store.add_skill(&name);
                println!("Added skill '{}' ({})", name, id);
            }

            SkillCommands::List => {
                let data = store.data();
                if data.skills.is_empty() {
                    println!("No skills yet.");
                }
                for skill in &data.skills {
                    println!("{}  {}", skill.id, skill.name);
                }
            }

            SkillCommands::Update { id, name } => {
                store.update_skill(&id, &name)?;
                println!("Updated skill {}", id);
            }

            SkillCommands::Delete { id } => {
                store.delete_skill(&id)?;
                println!("Deleted skill {}", id);
            }
        },

        Commands::Cert { command } => match command {
            CertCommands::Add { name, issuer, date } => {
                let id = store.add_certification(&name, issuer.as_deref(), date.as_deref());
                println!("Added certification '{}' ({})", name, id);
            }

            CertCommands::List => {
                let data = store.data();
                if data.certifications.is_empty() {
                    println!("No certifications yet.");
                }
                for cert in &data.certifications {
                    let issuer = cert.issuer.as_deref().unwrap_or("-");
                    let date = cert.date.as_deref().unwrap_or("-");
                    println!("{}  {} ({}, {})", cert.id, cert.name, issuer, date);
                }
            }

            CertCommands::Update {
                id,
                name,
                issuer,
                date,
            } => {
                store.update_certification(&id, name.as_deref(), issuer.as_deref(), date.as_deref())?;
                println!("Updated certification {}", id);
            }

            CertCommands::Delete { id } => {
                store.delete_certification(&id)?;
                println!("Deleted certification {}", id);
            }
        },

        Commands::Version { command } => match command {
            VersionCommands::Save {
                name,
                description,
                tags,
                overwrite,
            } => {
                if overwrite {
                    let id = versions::overwrite_current(&mut store)?;
                    println!("Overwrote resume version {}", id);
                } else {
                    let name = name
                        .context("A version name is required unless --overwrite is given")?;
                    let id = versions::save_as_new(&mut store, &name, description.as_deref(), tags)?;
                    println!("Saved resume version '{}' ({})", name, id);
                }
            }

            VersionCommands::Update {
                id,
                name,
                description,
                tags,
            } => {
                store.update_resume_version(
                    &id,
                    ResumeVersionPatch {
                        name,
                        description,
                        tags: parse_tags(tags),
                        ..Default::default()
                    },
                )?;
                println!("Updated resume version {}", id);
            }

            VersionCommands::List => {
                let data = store.data();
                if data.resume_versions.is_empty() {
                    println!("No saved versions yet.");
                } else {
                    let editing = data.current_editing.resume_version_id.as_deref();
                    println!("{:<20} {:<4} {:<24} {:<8} {}", "ID", "CUR", "NAME", "BULLETS", "UPDATED");
                    println!("{}", "-".repeat(80));
                    for version in &data.resume_versions {
                        println!(
                            "{:<20} {:<4} {:<24} {:<8} {}",
                            truncate(&version.id, 18),
                            if editing == Some(version.id.as_str()) { "*" } else { "" },
                            truncate(&version.name, 22),
                            version.selected_bullets.len(),
                            truncate(&version.updated_at, 19)
                        );
                    }
                }
            }

            VersionCommands::Load { id, force } => {
                versions::load_version(&mut store, &id, force)?;
                println!("Loaded resume version {}", id);
            }

            VersionCommands::Delete { id } => {
                store.delete_resume_version(&id)?;
                println!("Deleted resume version {}", id);
            }
        },

        Commands::Export { command } => match command {
            ExportCommands::Csv { out } => {
                let view = projection::project_resume(store.data());
                let csv = export::to_csv(&view)?;
                let path = out.unwrap_or_else(|| PathBuf::from(export::default_output_name("csv")));
                std::fs::write(&path, csv)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Exported CSV to {}", path.display());
            }

            ExportCommands::Pdf { out, contact } => {
                let view = projection::project_resume(store.data());
                let bytes = pdf::render_pdf(&view, &contact.resolve())?;
                let path = out.unwrap_or_else(|| PathBuf::from(export::default_output_name("pdf")));
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Exported PDF to {}", path.display());
            }

            ExportCommands::Docx { out, contact } => {
                let view = projection::project_resume(store.data());
                let bytes = docx::render_docx(&view, &contact.resolve())?;
                let path = out.unwrap_or_else(|| PathBuf::from(export::default_output_name("docx")));
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Exported DOCX to {}", path.display());
            }

            ExportCommands::Json { out } => {
                let path = match out {
                    Some(path) => {
                        let blob = serde_json::to_string_pretty(store.data())?;
                        std::fs::write(&path, blob)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        path
                    }
                    None => Storage::export_json(store.data(), std::path::Path::new("."))?,
                };
                println!("Exported data to {}", path.display());
            }
        },

        Commands::Import { file } => {
            let data = Storage::import_json(&file)?;
            let counts = format!(
                "{} companies, {} bullets, {} summaries, {} saved versions",
                data.companies.len(),
                data.bullets.len(),
                data.summaries.len(),
                data.resume_versions.len()
            );
            store.replace_data(data);
            println!("Imported {} ({})", file.display(), counts);
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
