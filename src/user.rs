// Single-call user queries: the user document, its stats, inventory and
// auth details, and the API status.

use crate::api::{ApiRequest, Transport};
use crate::error::RequestError;
use clap::ValueEnum;
use serde_json::{Map, Value};

pub fn fetch_user(transport: &(impl Transport + ?Sized)) -> Result<Value, RequestError> {
    transport.send(&ApiRequest::get("/api/v3/user"))
}

/// `GET /api/v3/status`; returns the reported status, normally `"up"`.
pub fn fetch_status(transport: &(impl Transport + ?Sized)) -> Result<String, RequestError> {
    let data = transport.send(&ApiRequest::get("/api/v3/status"))?;
    data.get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RequestError::MalformedBody("status response has no status".into()))
}

/// Select parts of the user document.
///
/// `filter` is a comma separated list of dotted key paths, for example
/// `"items.mounts, achievements.streak"`. The result maps each path to the
/// value found there, or to `{}` when the path does not resolve.
pub fn filter_user(user: &Value, filter: &str) -> Value {
    let mut result = Map::new();
    for path in filter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let found = path
            .split('.')
            .try_fold(user, |node, key| node.get(key))
            .cloned();
        if found.is_none() {
            tracing::debug!("didn't match anything with the filter {}", path);
        }
        result.insert(
            path.to_string(),
            found.unwrap_or_else(|| Value::Object(Map::new())),
        );
    }
    Value::Object(result)
}

/// Entries of `stats` shown by `get user-stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stat {
    #[value(alias = "health", alias = "healthpoints")]
    Hp,
    #[value(alias = "mana", alias = "mana-points", alias = "manapoints")]
    Mp,
    #[value(alias = "xp", alias = "experience")]
    Exp,
    #[value(alias = "gold")]
    Gp,
    #[value(alias = "level")]
    Lvl,
    Class,
    #[value(name = "maxMP", alias = "maxmp", alias = "maxMp")]
    MaxMp,
    All,
}

impl Stat {
    fn key(self) -> Option<&'static str> {
        match self {
            Stat::Hp => Some("hp"),
            Stat::Mp => Some("mp"),
            Stat::Exp => Some("exp"),
            Stat::Gp => Some("gp"),
            Stat::Lvl => Some("lvl"),
            Stat::Class => Some("class"),
            Stat::MaxMp => Some("maxMP"),
            Stat::All => None,
        }
    }
}

/// Groups of `items` shown by `get user-inventory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryGroup {
    #[value(alias = "pet")]
    Pets,
    #[value(alias = "mount")]
    Mounts,
    Eggs,
    Food,
    #[value(
        name = "hatchingPotions",
        alias = "hatchingpotions",
        alias = "hatchingPotion"
    )]
    HatchingPotions,
    Gear,
    Quests,
    #[value(name = "currentPet", alias = "currentpet")]
    CurrentPet,
    #[value(name = "currentMount", alias = "currentmount")]
    CurrentMount,
    #[value(name = "lastDrop", alias = "lastdrop")]
    LastDrop,
    All,
}

impl InventoryGroup {
    fn key(self) -> Option<&'static str> {
        match self {
            InventoryGroup::Pets => Some("pets"),
            InventoryGroup::Mounts => Some("mounts"),
            InventoryGroup::Eggs => Some("eggs"),
            InventoryGroup::Food => Some("food"),
            InventoryGroup::HatchingPotions => Some("hatchingPotions"),
            InventoryGroup::Gear => Some("gear"),
            InventoryGroup::Quests => Some("quests"),
            InventoryGroup::CurrentPet => Some("currentPet"),
            InventoryGroup::CurrentMount => Some("currentMount"),
            InventoryGroup::LastDrop => Some("lastDrop"),
            InventoryGroup::All => None,
        }
    }
}

/// Account details shown by `get user-auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthInfo {
    Username,
    #[value(alias = "e-mail", alias = "mail")]
    Email,
    Profilename,
    All,
}

/// `user.stats`, or one entry of it. Missing values come back as `null`.
pub fn select_stats(user: &Value, stat: Stat) -> Value {
    select(user.get("stats"), stat.key())
}

/// `user.items`, or one group of it. Missing values come back as `null`.
pub fn select_inventory(user: &Value, group: InventoryGroup) -> Value {
    select(user.get("items"), group.key())
}

/// `user.auth`, the local login name or email, or the profile name.
pub fn select_auth(user: &Value, info: AuthInfo) -> Value {
    let found = match info {
        AuthInfo::All => user.get("auth"),
        AuthInfo::Profilename => user.get("profile").and_then(|p| p.get("name")),
        AuthInfo::Username => user.pointer("/auth/local/username"),
        AuthInfo::Email => user.pointer("/auth/local/email"),
    };
    found.cloned().unwrap_or(Value::Null)
}

fn select(section: Option<&Value>, key: Option<&str>) -> Value {
    let found = match key {
        Some(key) => section.and_then(|s| s.get(key)),
        None => section,
    };
    found.cloned().unwrap_or(Value::Null)
}
