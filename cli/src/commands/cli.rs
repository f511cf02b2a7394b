use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aura-agent", version, about = "Automate Aura.build across API and browser backends")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (overrides the configured log level).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Pin a backend: api, lux, browser-use, steel, agent-browser, or auto.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Run browser backends without a visible window.
    #[arg(long, global = true, conflicts_with = "headed")]
    pub headless: bool,

    /// Run browser backends with a visible window.
    #[arg(long, global = true)]
    pub headed: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a site/app from a prompt.
    Generate(GenerateArgs),
    /// Export a project's code or design.
    Export(ExportArgs),
    /// Create an empty project.
    Create {
        /// Project name.
        name: String,
    },
    /// Send a prompt to an existing project.
    Prompt(PromptArgs),
    /// Apply a named template to a project.
    Template(TemplateArgs),
    /// Execute an arbitrary typed task.
    Execute(ExecuteArgs),
    /// Probe every backend and print the health table.
    Health,
    /// Stream agent events (including captured API calls) as JSON lines.
    Intercept,
    /// Line-oriented prompt loop: each line becomes a generate task.
    Interactive,
    /// Start the HTTP server front-end.
    Serve(HttpServerArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// What to build.
    #[arg(long)]
    pub prompt: String,

    /// Optional name for the created project.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExportArgs {
    /// Project to export.
    pub project_id: String,

    /// Export format: html or figma.
    #[arg(long, default_value = "html")]
    pub format: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PromptArgs {
    /// Target project.
    pub project_id: String,

    /// Prompt text to send.
    #[arg(long)]
    pub text: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TemplateArgs {
    /// Target project.
    pub project_id: String,

    /// Template name to apply.
    #[arg(long)]
    pub template: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExecuteArgs {
    /// Task type, e.g. create_project, export_html, custom_action.
    #[arg(long = "task-type")]
    pub task_type: String,

    /// Task parameters as a JSON object.
    #[arg(long)]
    pub params: Option<String>,

    /// Print the execution plan without touching any backend.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct HttpServerArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}
