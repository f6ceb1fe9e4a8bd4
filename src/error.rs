use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not get database connection from pool: {0}")]
    Pool(String),
    #[error("error executing query: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("stored row is inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),
    #[error("error decoding response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("feed is not configured: {0}")]
    Disabled(&'static str),
}

#[derive(Error, Debug)]
pub enum EntryError {
    #[error("You have already joined this contest!")]
    AlreadyJoined,
    #[error("Contest not found")]
    ContestNotFound,
    #[error("Contest closed! Match has already started.")]
    MatchStarted,
    #[error("Contest is full")]
    ContestFull,
    #[error("User not found")]
    UserNotFound,
    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: i32, required: i32 },
    #[error("{0}")]
    InvalidTeam(&'static str),
    #[error("Cannot create/edit team after match has started")]
    TeamLocked,
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("failed to parse {name} from {value:?}")]
    Invalid { name: &'static str, value: String },
}
