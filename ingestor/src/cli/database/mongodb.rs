use clap::Args;

use crate::types::params::DatabaseArgs;

/// Parameters used to connect to MongoDB.
#[derive(Debug, Clone, Args)]
pub struct MongoDBCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "INGESTOR_MONGODB_CONNECTION_URL", long, default_value = "mongodb://localhost:27017")]
    pub mongodb_connection_url: String,

    /// The name of the database.
    #[arg(env = "INGESTOR_DATABASE_NAME", long, default_value = "bdc")]
    pub mongodb_database_name: String,
}

impl From<MongoDBCliArgs> for DatabaseArgs {
    fn from(args: MongoDBCliArgs) -> Self {
        Self { connection_uri: args.mongodb_connection_url, database_name: args.mongodb_database_name }
    }
}
