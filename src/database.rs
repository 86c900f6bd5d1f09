//! # Storage
//!
//! Per-guild prefixes, the global block list and the pledge roster.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Pledge roster table for the daily pledge sync
//! - 1.0.0: Prefixes and block list

use anyhow::{Context, Result};
use log::info;
use serenity::model::id::{GuildId, UserId};
use sqlite::{Connection, State};
use std::sync::Mutex;

/// Storage operations the bot core relies on.
///
/// Implementations must be cheap enough to call inline from event handlers.
pub trait Storage: Send + Sync {
    /// Effective prefix for the guild. Never empty.
    fn prefix(&self, guild_id: GuildId) -> Result<String>;
    fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> Result<()>;
    fn reset_prefix(&self, guild_id: GuildId) -> Result<()>;

    fn is_blocked(&self, user_id: UserId) -> Result<bool>;
    fn block(&self, user_id: UserId) -> Result<()>;
    /// Returns whether the user was on the block list
    fn unblock(&self, user_id: UserId) -> Result<bool>;

    fn pledge_tier(&self, user_id: UserId) -> Result<Option<u32>>;
    fn set_pledge(&self, user_id: UserId, tier: u32) -> Result<()>;
    fn remove_pledge(&self, user_id: UserId) -> Result<()>;
    fn pledged_users(&self) -> Result<Vec<UserId>>;
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS guild_prefixes (
        guild_id INTEGER PRIMARY KEY,
        prefix TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS blocked_users (
        user_id INTEGER PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS pledges (
        user_id INTEGER PRIMARY KEY,
        tier INTEGER NOT NULL
    );
";

/// SQLite-backed [`Storage`].
pub struct Database {
    connection: Mutex<Connection>,
    default_prefix: String,
}

impl Database {
    pub fn open(path: &str, default_prefix: &str) -> Result<Self> {
        if default_prefix.is_empty() {
            return Err(anyhow::anyhow!("Default prefix must not be empty"));
        }

        let connection =
            sqlite::open(path).with_context(|| format!("Failed to open database at {path}"))?;
        connection
            .execute(SCHEMA)
            .context("Failed to initialise database schema")?;

        info!("💾 Database ready at {path}");

        Ok(Self {
            connection: Mutex::new(connection),
            default_prefix: default_prefix.to_string(),
        })
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))?;
        f(&connection)
    }

    fn exists(&self, query: &str, id: u64) -> Result<bool> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare(query)?;
            statement.bind((1, id as i64))?;
            Ok(matches!(statement.next()?, State::Row))
        })
    }

    fn execute_with_id(&self, query: &str, id: u64) -> Result<()> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare(query)?;
            statement.bind((1, id as i64))?;
            while statement.next()? != State::Done {}
            Ok(())
        })
    }
}

impl Storage for Database {
    fn prefix(&self, guild_id: GuildId) -> Result<String> {
        let stored = self.with_connection(|conn| {
            let mut statement =
                conn.prepare("SELECT prefix FROM guild_prefixes WHERE guild_id = ?")?;
            statement.bind((1, guild_id.0 as i64))?;
            if let State::Row = statement.next()? {
                Ok(Some(statement.read::<String, _>(0)?))
            } else {
                Ok(None)
            }
        })?;

        Ok(stored
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| self.default_prefix.clone()))
    }

    fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> Result<()> {
        if prefix.is_empty() {
            return Err(anyhow::anyhow!("Prefix must not be empty"));
        }

        self.with_connection(|conn| {
            let mut statement = conn.prepare(
                "INSERT OR REPLACE INTO guild_prefixes (guild_id, prefix) VALUES (?, ?)",
            )?;
            statement.bind((1, guild_id.0 as i64))?;
            statement.bind((2, prefix))?;
            while statement.next()? != State::Done {}
            Ok(())
        })
    }

    fn reset_prefix(&self, guild_id: GuildId) -> Result<()> {
        self.execute_with_id("DELETE FROM guild_prefixes WHERE guild_id = ?", guild_id.0)
    }

    fn is_blocked(&self, user_id: UserId) -> Result<bool> {
        self.exists("SELECT 1 FROM blocked_users WHERE user_id = ?", user_id.0)
    }

    fn block(&self, user_id: UserId) -> Result<()> {
        self.execute_with_id(
            "INSERT OR IGNORE INTO blocked_users (user_id) VALUES (?)",
            user_id.0,
        )
    }

    fn unblock(&self, user_id: UserId) -> Result<bool> {
        let was_blocked = self.is_blocked(user_id)?;
        self.execute_with_id("DELETE FROM blocked_users WHERE user_id = ?", user_id.0)?;
        Ok(was_blocked)
    }

    fn pledge_tier(&self, user_id: UserId) -> Result<Option<u32>> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare("SELECT tier FROM pledges WHERE user_id = ?")?;
            statement.bind((1, user_id.0 as i64))?;
            if let State::Row = statement.next()? {
                let tier = statement.read::<i64, _>(0)?;
                Ok(Some(u32::try_from(tier).unwrap_or(0)))
            } else {
                Ok(None)
            }
        })
    }

    fn set_pledge(&self, user_id: UserId, tier: u32) -> Result<()> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare(
                "INSERT OR REPLACE INTO pledges (user_id, tier) VALUES (?, ?)",
            )?;
            statement.bind((1, user_id.0 as i64))?;
            statement.bind((2, i64::from(tier)))?;
            while statement.next()? != State::Done {}
            Ok(())
        })
    }

    fn remove_pledge(&self, user_id: UserId) -> Result<()> {
        self.execute_with_id("DELETE FROM pledges WHERE user_id = ?", user_id.0)
    }

    fn pledged_users(&self) -> Result<Vec<UserId>> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare("SELECT user_id FROM pledges")?;
            let mut users = Vec::new();
            while let State::Row = statement.next()? {
                users.push(UserId(statement.read::<i64, _>(0)? as u64));
            }
            Ok(users)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> Database {
        Database::open(":memory:", "$").unwrap()
    }

    #[test]
    fn test_prefix_defaults_and_overrides() {
        let db = database();
        let guild = GuildId(10);

        assert_eq!(db.prefix(guild).unwrap(), "$");

        db.set_prefix(guild, "!").unwrap();
        assert_eq!(db.prefix(guild).unwrap(), "!");

        db.set_prefix(guild, "?").unwrap();
        assert_eq!(db.prefix(guild).unwrap(), "?");

        db.reset_prefix(guild).unwrap();
        assert_eq!(db.prefix(guild).unwrap(), "$");
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let db = database();
        assert!(db.set_prefix(GuildId(1), "").is_err());
        assert!(Database::open(":memory:", "").is_err());
    }

    #[test]
    fn test_block_list() {
        let db = database();
        let user = UserId(99);

        assert!(!db.is_blocked(user).unwrap());
        db.block(user).unwrap();
        db.block(user).unwrap();
        assert!(db.is_blocked(user).unwrap());

        assert!(db.unblock(user).unwrap());
        assert!(!db.unblock(user).unwrap());
        assert!(!db.is_blocked(user).unwrap());
    }

    #[test]
    fn test_pledges() {
        let db = database();

        db.set_pledge(UserId(1), 1).unwrap();
        db.set_pledge(UserId(2), 3).unwrap();
        db.set_pledge(UserId(1), 2).unwrap();

        assert_eq!(db.pledge_tier(UserId(1)).unwrap(), Some(2));
        assert_eq!(db.pledge_tier(UserId(3)).unwrap(), None);

        let mut users = db.pledged_users().unwrap();
        users.sort();
        assert_eq!(users, vec![UserId(1), UserId(2)]);

        db.remove_pledge(UserId(2)).unwrap();
        assert_eq!(db.pledged_users().unwrap(), vec![UserId(1)]);
    }
}
