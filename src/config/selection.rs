//! Persisted agent selection backed by SQLite.
//!
//! Stores an enabled flag and a priority per agent id. Agents without a row
//! are enabled and keep their registry position as priority.

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

use crate::agents::Agent;

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub agent_id: String,
    pub enabled: bool,
    pub priority: i64,
}

pub struct AgentSelection {
    conn: Mutex<Connection>,
}

impl AgentSelection {
    /// Open or create the selection table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open selection database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS agent_selection (
                agent_id TEXT PRIMARY KEY,
                enabled  INTEGER NOT NULL,
                priority INTEGER NOT NULL
            )",
        )
        .context("failed to create agent_selection table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("selection database lock poisoned"))
    }

    /// Stored row for an agent, if any.
    pub fn get(&self, agent_id: &str) -> Result<Option<SelectionEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT agent_id, enabled, priority FROM agent_selection WHERE agent_id = ?1",
                [agent_id],
                |row| {
                    Ok(SelectionEntry {
                        agent_id: row.get(0)?,
                        enabled: row.get(1)?,
                        priority: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Upsert a full row.
    pub fn set(&self, entry: &SelectionEntry) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO agent_selection (agent_id, enabled, priority) VALUES (?1, ?2, ?3)
             ON CONFLICT(agent_id) DO UPDATE SET
                enabled = excluded.enabled,
                priority = excluded.priority",
            rusqlite::params![entry.agent_id, entry.enabled, entry.priority],
        )?;
        Ok(())
    }

    /// Enable or disable an agent, keeping its priority.
    pub fn set_enabled(&self, agents: &[Agent], agent_id: &str, enabled: bool) -> Result<()> {
        let mut entry = self.entry_or_default(agents, agent_id)?;
        entry.enabled = enabled;
        self.set(&entry)
    }

    /// Change an agent's priority, keeping its enabled flag. Lower runs first.
    pub fn set_priority(&self, agents: &[Agent], agent_id: &str, priority: i64) -> Result<()> {
        let mut entry = self.entry_or_default(agents, agent_id)?;
        entry.priority = priority;
        self.set(&entry)
    }

    /// Forget any stored row for the agent.
    pub fn reset(&self, agent_id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM agent_selection WHERE agent_id = ?1", [agent_id])?;
        Ok(())
    }

    /// Effective row for every agent, in registry order.
    pub fn entries(&self, agents: &[Agent]) -> Result<Vec<SelectionEntry>> {
        agents
            .iter()
            .map(|agent| self.entry_or_default(agents, &agent.id))
            .collect()
    }

    /// Enabled agents ordered by priority. Ties keep registry order.
    pub fn roster(&self, agents: &[Agent]) -> Result<Vec<Agent>> {
        let entries = self.entries(agents)?;
        let mut ranked: Vec<(i64, &Agent)> = agents
            .iter()
            .zip(entries)
            .filter(|(_, entry)| entry.enabled)
            .map(|(agent, entry)| (entry.priority, agent))
            .collect();
        ranked.sort_by_key(|(priority, _)| *priority);
        Ok(ranked.into_iter().map(|(_, agent)| agent.clone()).collect())
    }

    fn entry_or_default(&self, agents: &[Agent], agent_id: &str) -> Result<SelectionEntry> {
        let position = agents
            .iter()
            .position(|a| a.id == agent_id)
            .ok_or_else(|| anyhow!("unknown agent: {agent_id}"))?;
        Ok(self.get(agent_id)?.unwrap_or(SelectionEntry {
            agent_id: agent_id.to_string(),
            enabled: true,
            priority: position as i64,
        }))
    }
}
