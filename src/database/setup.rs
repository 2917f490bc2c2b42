use anyhow::{Context, Result};

use super::connection::DbConn;
use super::{players, scouts};

/// Drops and recreates all tables from the bundled schema.
pub fn reset_database(conn: &mut DbConn) -> Result<()> {
    let schema_sql = include_str!("schema.sql");

    for (idx, statement) in split_sql_statements(schema_sql).iter().enumerate() {
        conn.execute(statement, [])
            .with_context(|| format!("Failed to execute schema statement {}", idx + 1))?;
    }

    log::info!("Database schema reset successfully");
    Ok(())
}

/// Inserts a demo scout, tournament, and roster so a fresh database is
/// browsable without an external data load.
pub fn seed_demo_data(conn: &mut DbConn) -> Result<i64> {
    scouts::insert_scout(conn, "Demo Scout", "demo-token")?;

    let tournament_id = insert_tournament(conn, "Spring Invitational")?;

    let roster = [
        ("Alex Varga", "GK", 1, "Rapid Nine"),
        ("Jonas Keller", "DF", 4, "Rapid Nine"),
        ("Mateo Silva", "MF", 8, "Atletico Brezno"),
        ("Tomi Horvath", "FW", 9, "Atletico Brezno"),
        ("Luka Petric", "FW", 11, "FK Sava"),
    ];
    for (name, position, jersey, team) in roster {
        players::insert_player(conn, name, Some(position), Some(jersey), Some(team), None)?;
    }

    log::info!("Seeded demo data for tournament {tournament_id}");
    Ok(tournament_id)
}

fn insert_tournament(conn: &mut DbConn, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO tournaments (name) VALUES (?1)",
        rusqlite::params![name],
    )
    .context("Failed to insert tournament")?;
    Ok(conn.last_insert_rowid())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
