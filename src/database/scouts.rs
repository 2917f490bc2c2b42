use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::Scout;

pub fn find_by_token(conn: &mut DbConn, token: &str) -> Result<Option<Scout>> {
    let sql = "SELECT id, name FROM scouts WHERE api_token = ?1";

    conn.query_row(sql, params![token], parse_scout_row)
        .optional()
        .context("Failed to query scout by token")
}

pub fn insert_scout(conn: &mut DbConn, name: &str, api_token: &str) -> Result<Scout> {
    let sql = "INSERT INTO scouts (name, api_token) VALUES (?1, ?2) RETURNING id, name";

    conn.query_row(sql, params![name, api_token], parse_scout_row)
        .context("Failed to insert scout")
}

fn parse_scout_row(row: &rusqlite::Row) -> rusqlite::Result<Scout> {
    Ok(Scout {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
