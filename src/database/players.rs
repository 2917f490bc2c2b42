use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::PlayerProfile;

const PLAYER_COLUMNS: &str = "id, name, position, jersey_number, team_name, photo_url, created_at";

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<PlayerProfile>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn insert_player(
    conn: &mut DbConn,
    name: &str,
    position: Option<&str>,
    jersey_number: Option<i64>,
    team_name: Option<&str>,
    photo_url: Option<&str>,
) -> Result<PlayerProfile> {
    let sql = format!(
        "INSERT INTO players (name, position, jersey_number, team_name, photo_url) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![name, position, jersey_number, team_name, photo_url],
        parse_player_row,
    )
    .context("Failed to insert player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerProfile> {
    Ok(PlayerProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        jersey_number: row.get(3)?,
        team_name: row.get(4)?,
        photo_url: row.get(5)?,
        created_at: row.get(6)?,
    })
}
