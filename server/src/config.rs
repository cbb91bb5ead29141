use std::ffi::OsString;
use std::path::Path;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about = "REST API for the todo list")]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5010)]
    pub port: u16,

    /// SQLite file path, `sqlite://<path>`, or `:memory:`.
    #[arg(long, env = "TODO_DATABASE_URL", default_value = "todos.db")]
    pub database_url: String,
}

impl Config {
    /// Reads `.env` from the working directory or a parent, if present, then
    /// parses flags. Variables already in the process environment win over
    /// the file; flags win over both.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// Like [`Config::load`] with an explicit env file and argument list.
    pub fn try_load_from<I, T>(env_file: &Path, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        dotenvy::from_path(env_file).ok();
        Self::try_parse_from(args)
    }
}
